//! Test server harness for E2E testing
//!
//! Provides `TestApiServer` for spawning real API server instances in tests.

use api_service::config::Config;
use api_service::observability::metrics::init_metrics_recorder;
use api_service::routes::{self, AppState, RouteModules};
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::postgres::PgPoolOptions;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Signing secret every harness server is configured with.
pub const TEST_JWT_SECRET: &str = "s3cr3t";

/// Database URL that never answers; `/api/health` reports it as unhealthy.
pub const UNREACHABLE_DATABASE_URL: &str = "postgresql://nobody@127.0.0.1:1/none";

/// The Prometheus recorder can only be installed once per process.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| init_metrics_recorder().expect("metrics recorder should install"))
        .clone()
}

/// Test harness for spawning the API server in E2E tests.
///
/// The pool connects lazily, so no database is needed unless a route
/// actually queries it.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_root() -> Result<(), anyhow::Error> {
///     let server = TestApiServer::spawn().await?;
///     let response = reqwest::get(format!("{}/api", server.url())).await?;
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestApiServer {
    addr: SocketAddr,
    config: Config,
    _handle: JoinHandle<()>,
}

impl TestApiServer {
    /// Spawn a server with no route modules mounted.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with(RouteModules::default(), &[]).await
    }

    /// Spawn a server with the given route modules and extra environment
    /// variables layered over the test defaults.
    ///
    /// The server binds to a random port on 127.0.0.1 and runs in the
    /// background until the harness is dropped.
    pub async fn spawn_with(
        modules: RouteModules,
        extra_vars: &[(&str, &str)],
    ) -> Result<Self, anyhow::Error> {
        let mut vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                UNREACHABLE_DATABASE_URL.to_string(),
            ),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
        ]);
        for (key, value) in extra_vars {
            vars.insert((*key).to_string(), (*value).to_string());
        }

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(500))
            .connect_lazy(&config.database_url)
            .map_err(|e| anyhow::anyhow!("Failed to create pool: {}", e))?;

        let state = Arc::new(AppState {
            pool,
            config: config.clone(),
        });

        let app = routes::build_routes(state, modules, metrics_handle());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for TestApiServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_spawns_successfully() -> Result<(), anyhow::Error> {
        let server = TestApiServer::spawn().await?;

        assert!(server.url().starts_with("http://127.0.0.1:"));

        let response = reqwest::get(format!("{}/api", server.url())).await?;
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await?, "API is running");

        Ok(())
    }

    #[tokio::test]
    async fn test_server_provides_addr() -> Result<(), anyhow::Error> {
        let server = TestApiServer::spawn().await?;

        let addr = server.addr();
        assert!(addr.ip().is_loopback());
        assert!(addr.port() > 0);
        assert_eq!(server.url(), format!("http://{}", addr));

        Ok(())
    }

    #[tokio::test]
    async fn test_extra_vars_reach_config() -> Result<(), anyhow::Error> {
        let server =
            TestApiServer::spawn_with(RouteModules::default(), &[("JWT_CLOCK_SKEW_SECONDS", "30")])
                .await?;

        assert_eq!(server.config().jwt_clock_skew_seconds, 30);

        Ok(())
    }
}
