//! Single-brace `{name}` template filling with request fields.
//!
//! Runs after config resolution: the config service has already rendered its
//! own `{{...}}` variables, and whatever `{name}` placeholders remain are
//! filled here from the incoming request.

use std::collections::BTreeMap;

use crate::aiconfig::AiConfig;
use crate::generator::ThankYouRequest;
use crate::llm::ChatMessage;

const FALLBACK_SYSTEM: &str = "You are a helpful assistant that writes personalized wedding thank you notes.";
const FALLBACK_USER: &str = "Write a heartfelt thank you note for {gift_description} from {gift_giver_name}.";

/// Phrase used in the prompt for a relationship selected in the form.
pub fn relationship_label(relationship: &str) -> &str {
    match relationship {
        "family" => "family member",
        "friend" => "dear friend",
        "colleague" => "colleague",
        "family friend" => "family friend",
        other => other,
    }
}

/// Variables available to `{name}` placeholders.
///
/// Optional fields are present only when non-blank, so an unset
/// `{next_meeting}` stays visible in the prompt instead of becoming "".
pub fn template_variables(request: &ThankYouRequest) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::from([
        ("gift_description".to_string(), request.gift_description.clone()),
        ("gift_giver_name".to_string(), request.gift_giver_name.clone()),
        (
            "relationship".to_string(),
            relationship_label(&request.relationship).to_string(),
        ),
    ]);
    if let Some(notes) = request.additional_notes() {
        vars.insert("additional_notes".to_string(), notes.to_string());
    }
    if let Some(meeting) = request.next_meeting() {
        vars.insert("next_meeting".to_string(), meeting.to_string());
    }
    vars
}

/// Replace every `{name}` that has a variable; leave the rest verbatim.
///
/// One left-to-right pass: substituted values are never scanned again, so a
/// guest typing `{gift_giver_name}` into their notes gets it back literally.
pub fn fill(content: &str, vars: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after
            .find('}')
            .and_then(|close| vars.get(&after[..close]).map(|v| (v, close)));
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Fill every config message with request data, keeping order and roles.
/// A config without messages gets the built-in system + user pair.
pub fn build_personalized_messages(request: &ThankYouRequest, config: &AiConfig) -> Vec<ChatMessage> {
    let vars = template_variables(request);

    if config.messages.is_empty() {
        return vec![
            ChatMessage::system(FALLBACK_SYSTEM),
            ChatMessage::user(fill(FALLBACK_USER, &vars)),
        ];
    }

    config
        .messages
        .iter()
        .map(|m| ChatMessage::new(m.role, fill(&m.content, &vars)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    fn request() -> ThankYouRequest {
        ThankYouRequest {
            gift_giver_name: "Aunt Sarah".into(),
            gift_description: "beautiful crystal vase".into(),
            relationship: "family".into(),
            additional_notes: Some("  She helped plan our wedding ceremony  ".into()),
            next_meeting: Some("   ".into()),
        }
    }

    fn config(messages: Vec<ChatMessage>) -> AiConfig {
        AiConfig { enabled: true, model: None, provider: None, messages }
    }

    #[test]
    fn relationship_mapping() {
        assert_eq!(relationship_label("family"), "family member");
        assert_eq!(relationship_label("friend"), "dear friend");
        assert_eq!(relationship_label("colleague"), "colleague");
        assert_eq!(relationship_label("family friend"), "family friend");
        assert_eq!(relationship_label("neighbour"), "neighbour");
    }

    #[test]
    fn variables_skip_blank_optionals_and_trim() {
        let vars = template_variables(&request());
        assert_eq!(vars["relationship"], "family member");
        assert_eq!(vars["additional_notes"], "She helped plan our wedding ceremony");
        assert!(!vars.contains_key("next_meeting"));
    }

    #[test]
    fn fill_leaves_unknown_placeholders() {
        let vars = template_variables(&request());
        let out = fill("Dear {gift_giver_name}, see you {next_meeting}!", &vars);
        assert_eq!(out, "Dear Aunt Sarah, see you {next_meeting}!");
    }

    #[test]
    fn fill_replaces_every_occurrence() {
        let vars = template_variables(&request());
        assert_eq!(fill("{gift_giver_name} & {gift_giver_name}", &vars), "Aunt Sarah & Aunt Sarah");
    }

    #[test]
    fn fill_does_not_expand_placeholders_inside_values() {
        let mut req = request();
        req.additional_notes = Some("{gift_giver_name} said {relationship}".into());
        let vars = template_variables(&req);
        assert_eq!(
            fill("Notes: {additional_notes} / {gift_giver_name}", &vars),
            "Notes: {gift_giver_name} said {relationship} / Aunt Sarah"
        );
    }

    #[test]
    fn fill_handles_stray_braces() {
        let vars = template_variables(&request());
        assert_eq!(fill("{ {gift_giver_name}} {unclosed", &vars), "{ Aunt Sarah} {unclosed");
    }

    #[test]
    fn messages_keep_order_and_roles() {
        let cfg = config(vec![
            ChatMessage::system("You write for a {relationship}."),
            ChatMessage::user("Thank {gift_giver_name} for the {gift_description}. {additional_notes}"),
        ]);
        let msgs = build_personalized_messages(&request(), &cfg);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(msgs[0].content, "You write for a family member.");
        assert_eq!(
            msgs[1].content,
            "Thank Aunt Sarah for the beautiful crystal vase. She helped plan our wedding ceremony"
        );
    }

    #[test]
    fn empty_config_uses_builtin_messages() {
        let msgs = build_personalized_messages(&request(), &config(vec![]));
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert_eq!(
            msgs[1].content,
            "Write a heartfelt thank you note for beautiful crystal vase from Aunt Sarah."
        );
    }
}
