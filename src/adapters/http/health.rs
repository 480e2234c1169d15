//! Liveness endpoint for hosting platforms.
//!
//! Answers `GET /` and `GET /health` with `200 OK`. Shares no state with
//! the poll loop.

use std::net::{AddrParseError, IpAddr, SocketAddr};

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::domain::models::HealthConfig;

/// Liveness HTTP server.
pub struct HealthServer {
    config: HealthConfig,
}

impl HealthServer {
    pub fn new(config: HealthConfig) -> Self {
        Self { config }
    }

    /// Build the router.
    pub fn router() -> Router {
        Router::new()
            .route("/", get(health_check))
            .route("/health", get(health_check))
            .layer(TraceLayer::new_for_http())
    }

    /// Configured host and port; the host is an IPv4 or IPv6 literal.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip: IpAddr = self.config.host.parse()?;
        Ok(SocketAddr::new(ip, self.config.port))
    }

    /// Bind the configured address.
    pub async fn bind(&self) -> Result<TcpListener, Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(self.socket_addr()?).await?;
        Ok(listener)
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_with_shutdown<F>(
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        tracing::info!(addr = ?listener.local_addr().ok(), "health endpoint listening");
        axum::serve(listener, Self::router())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get_path(path: &str) -> (StatusCode, String) {
        let response = HealthServer::router()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_root_returns_ok() {
        let (status, body) = get_path("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_health_alias_returns_ok() {
        let (status, body) = get_path("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let (status, _) = get_path("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    fn server_on(host: &str, port: u16) -> HealthServer {
        HealthServer::new(HealthConfig {
            enabled: true,
            host: host.to_string(),
            port,
        })
    }

    #[test]
    fn test_socket_addr_accepts_ipv4_and_ipv6_hosts() {
        let v4 = server_on("0.0.0.0", 8080).socket_addr().unwrap();
        assert_eq!(v4.to_string(), "0.0.0.0:8080");

        let v6 = server_on("::", 8080).socket_addr().unwrap();
        assert!(v6.is_ipv6());
        assert_eq!(v6.to_string(), "[::]:8080");

        let loopback = server_on("::1", 9000).socket_addr().unwrap();
        assert_eq!(loopback.to_string(), "[::1]:9000");
    }

    #[test]
    fn test_socket_addr_rejects_hostnames() {
        assert!(server_on("localhost", 8080).socket_addr().is_err());
    }

    #[tokio::test]
    async fn test_serve_until_shutdown() {
        let server = server_on("127.0.0.1", 0);
        let listener = server.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(HealthServer::serve_with_shutdown(listener, async move {
            let _ = rx.await;
        }));

        let body = reqwest::get(format!("http://{addr}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "OK");

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
