//! `{{name}}` interpolation applied to resolved config messages.
//!
//! Custom variables are looked up by name; `{{ldctx.<attr>}}` reads from the
//! evaluation context. Unknown names render as the empty string. Single-brace
//! `{name}` placeholders pass through untouched.

use std::collections::BTreeMap;

use serde_json::Value;

use super::Context;

const CONTEXT_PREFIX: &str = "ldctx.";

pub fn render(template: &str, vars: &BTreeMap<String, String>, ctx: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            // Unterminated tag: keep the remainder verbatim.
            out.push_str(&rest[start..]);
            return out;
        };
        let name = after_open[..end].trim();
        out.push_str(&lookup(name, vars, ctx));
        rest = &after_open[end + 2..];
    }

    out.push_str(rest);
    out
}

fn lookup(name: &str, vars: &BTreeMap<String, String>, ctx: &Context) -> String {
    if let Some(attr) = name.strip_prefix(CONTEXT_PREFIX) {
        return match ctx.get(attr) {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
    }
    vars.get(name).cloned().unwrap_or_default()
}
