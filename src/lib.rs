// Library root, exposes internals for integration tests.
// The binary entry point is src/main.rs.

pub mod aiconfig;
pub mod bootstrap;
pub mod core;
pub mod events;
pub mod generator;
pub mod llm;
pub mod server;
pub mod template;

pub use bootstrap::logger;
pub use self::core::{config, error};

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use tokio::net::TcpListener;

    /// Serve `router` on an ephemeral local port and return its base URL.
    pub async fn serve(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }
}
