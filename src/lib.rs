//! Named, reusable HTTP response fixtures for test suites.
//!
//! Declare request/response mocks once in a [`Catalog`], then activate the
//! subset a test needs. Activation returns a [`FixtureManager`] that holds
//! one live [`StubHandle`] per fixture name.
//!
//! # Quick Start
//!
//! ```no_run
//! use webfixtures::mock_server::MockServer;
//! use webfixtures::{Catalog, UrlPattern, Verb};
//!
//! # async fn example() -> webfixtures::Result<()> {
//! let catalog = Catalog::new("my-suite");
//! catalog.register_response(
//!     "get_example",
//!     Verb::Get,
//!     UrlPattern::regex("www.example.org")?,
//!     "Hello World",
//! );
//!
//! let server = MockServer::start().await;
//! let manager = catalog.activate(&server, &["get_example"])?;
//!
//! let client = server.client()?;
//! let body = client.get("http://www.example.org/").send().await?.text().await?;
//! assert_eq!(body, "Hello World");
//! assert!(manager.stub("get_example")?.was_requested(1));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`Catalog`] - one namespace of fixture definitions. Namespaces never
//!   share entries; see [`Catalog::derive`] and [`catalog::namespace`].
//! - [`resolver`] - turns a stored [`ResponseSource`] into a [`Responder`]
//!   bound to the activating manager.
//! - [`FixtureManager`] - the fixtures started by one activation.
//! - [`StubEngine`] - the seam to whatever intercepts HTTP. The
//!   `mock-server` feature (on by default) provides
//!   [`mock_server::MockServer`].
//!
//! # Configuration
//!
//! [`mock_server::ServerConfig::from_env`] reads:
//!
//! - `WEBFIXTURES_BIND_ADDR` (optional) - listen address (defaults to `127.0.0.1:0`)
//! - `WEBFIXTURES_UNMATCHED_STATUS` (optional) - status for unmatched requests (defaults to `501`)
//!
//! ```no_run
//! use webfixtures::mock_server::{MockServer, ServerConfig};
//!
//! # async fn example() -> webfixtures::Result<()> {
//! let server = MockServer::try_start(ServerConfig::from_env()?).await?;
//! println!("Intercepting through {}", server.url());
//! # Ok(())
//! # }
//! ```

pub mod catalog;
mod error;
mod manager;
mod models;
pub mod resolver;
mod traits;

#[cfg(feature = "mock-server")]
pub mod mock_server;

// Re-export core types
pub use catalog::{Catalog, FixtureDefinition};
pub use error::{FixtureError, Result};
pub use manager::{Activation, FixtureManager};
pub use resolver::{FixtureHandler, FixtureMethod, Responder, ResponseSource};

// Re-export the engine seam
pub use traits::{StubBuilder, StubEngine, StubHandle};

// Re-export models
pub use models::{RequestDescription, ResponseSpec, UrlPattern, Verb};
