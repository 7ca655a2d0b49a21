//! In-process HTTP interception engine.
//!
//! [`MockServer`] implements [`crate::StubEngine`]: activating fixtures
//! against it starts stubs that answer matching requests. Point a client at
//! it with [`MockServer::client`], which proxies every plain-`http://`
//! request through the server, or call [`MockServer::url`] directly.
//!
//! # Example
//!
//! ```no_run
//! use webfixtures::mock_server::MockServer;
//! use webfixtures::{Catalog, UrlPattern, Verb};
//!
//! # async fn example() -> webfixtures::Result<()> {
//! let catalog = Catalog::new("example");
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
//! let body = server
//!     .client()?
//!     .get("http://www.example.org/")
//!     .send()
//!     .await?
//!     .text()
//!     .await?;
//! assert_eq!(body, "Hello World");
//! assert!(manager.stub("get_example")?.was_requested(1));
//!
//! server.shutdown().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod handlers;
mod server;
mod state;

pub use config::ServerConfig;
pub use server::{MockServer, PendingStub};
