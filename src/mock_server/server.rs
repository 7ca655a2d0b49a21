//! Mock HTTP server.
//!
//! Provides an axum-based HTTP server that answers requests from active
//! fixture stubs. It doubles as a plain-HTTP forward proxy, so a client
//! routed through it can request any `http://` URL.

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use super::config::ServerConfig;
use super::handlers;
use super::state::{self, MockState, SharedState};
use crate::error::Result;
use crate::models::{UrlPattern, Verb};
use crate::resolver::Responder;
use crate::traits::{StubBuilder, StubEngine, StubHandle};

/// An in-process interception engine for fixtures.
///
/// The server runs in the background. Requests that match no active stub
/// get the configured unmatched status.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Active stubs.
    state: SharedState,
}

impl MockServer {
    /// Start a server on a random local port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        Self::try_start(ServerConfig::default())
            .await
            .expect("Failed to start mock server")
    }

    /// Start a server with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn try_start(config: ServerConfig) -> Result<Self> {
        let state = MockState::new(config.unmatched_status).shared();
        let app = Self::create_router(state.clone());

        let listener = TcpListener::bind(config.bind_addr).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock server stopped");
            }
        });

        tracing::debug!(%addr, "Mock server listening");

        Ok(Self {
            url: format!("http://{}", addr),
            handle,
            state,
        })
    }

    /// Get the base URL of the server.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// A reqwest client that sends every `http://` request through this
    /// server, whatever its host.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .proxy(reqwest::Proxy::http(&self.url)?)
            .build()?;
        Ok(client)
    }

    /// Drop every active stub. Handles already returned keep their history.
    pub fn reset(&self) {
        let mut state = state::lock(&self.state);
        tracing::debug!(removed = state.len(), "Resetting mock server stubs");
        state.clear();
    }

    /// Number of active stubs.
    pub fn stub_count(&self) -> usize {
        state::lock(&self.state).len()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the axum router. Every request goes to the interceptor.
    pub(crate) fn create_router(state: SharedState) -> Router {
        Router::new()
            .fallback(handlers::intercept)
            .with_state(state)
    }
}

impl std::fmt::Debug for MockServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockServer")
            .field("url", &self.url)
            .field("stubs", &self.stub_count())
            .finish_non_exhaustive()
    }
}

/// A stub waiting for its response.
pub struct PendingStub {
    state: SharedState,
    verb: Verb,
    pattern: UrlPattern,
}

impl StubEngine for MockServer {
    type Builder = PendingStub;

    fn create_stub(&self, verb: Verb, pattern: UrlPattern) -> PendingStub {
        PendingStub {
            state: self.state.clone(),
            verb,
            pattern,
        }
    }
}

impl StubBuilder for PendingStub {
    fn set_response(self, responder: Responder) -> StubHandle {
        let handle = StubHandle::new(self.verb, self.pattern);
        state::lock(&self.state).add_stub(handle.clone(), responder);
        handle
    }
}
