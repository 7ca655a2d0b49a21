//! Response sources and their resolution at activation time.
//!
//! A fixture stores a [`ResponseSource`]. When a [`FixtureManager`]
//! activates it, [`resolve`] turns that source into a [`Responder`]: literal
//! responses pass through unchanged, while handlers and methods are wrapped
//! so each call also receives the activating manager.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::manager::FixtureManager;
use crate::models::{RequestDescription, ResponseSpec};

/// A closure fixture handler. Receives the request and the manager that
/// activated it, so it can look up sibling fixtures.
pub type FixtureHandler =
    Arc<dyn Fn(&RequestDescription, &FixtureManager) -> ResponseSpec + Send + Sync>;

/// A method-style fixture handler, bound to the activating manager.
pub type FixtureMethod = fn(&FixtureManager, &RequestDescription) -> ResponseSpec;

/// Where a fixture's response comes from.
#[derive(Clone)]
pub enum ResponseSource {
    /// A literal response.
    Literal(ResponseSpec),
    /// A raw capture read from disk at registration time.
    File {
        path: PathBuf,
        raw: Vec<u8>,
        response: ResponseSpec,
    },
    /// A method bound to the manager at activation.
    Method(FixtureMethod),
    /// A closure called with the request and the activating manager.
    Handler(FixtureHandler),
}

impl ResponseSource {
    /// Wrap a closure as a handler source.
    pub fn handler<F>(f: F) -> Self
    where
        F: Fn(&RequestDescription, &FixtureManager) -> ResponseSpec + Send + Sync + 'static,
    {
        Self::Handler(Arc::new(f))
    }

    /// The literal response, if this source has one.
    pub fn literal(&self) -> Option<&ResponseSpec> {
        match self {
            Self::Literal(response) | Self::File { response, .. } => Some(response),
            Self::Method(_) | Self::Handler(_) => None,
        }
    }

    /// Whether the response is computed per request.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Method(_) | Self::Handler(_))
    }
}

impl fmt::Debug for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(response) => f.debug_tuple("Literal").field(response).finish(),
            Self::File { path, response, .. } => f
                .debug_struct("File")
                .field("path", path)
                .field("status", &response.status)
                .finish_non_exhaustive(),
            Self::Method(_) => f.write_str("Method(..)"),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

impl From<ResponseSpec> for ResponseSource {
    fn from(response: ResponseSpec) -> Self {
        Self::Literal(response)
    }
}

/// What a stub engine calls to answer a matched request.
#[derive(Clone)]
pub enum Responder {
    Static(ResponseSpec),
    Dynamic(Arc<dyn Fn(&RequestDescription) -> ResponseSpec + Send + Sync>),
}

impl Responder {
    /// Produce the response for `request`.
    pub fn respond(&self, request: &RequestDescription) -> ResponseSpec {
        match self {
            Self::Static(response) => response.clone(),
            Self::Dynamic(f) => f(request),
        }
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(response) => f.debug_tuple("Static").field(response).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Resolve `source` against the manager performing activation.
///
/// Called fresh for every activation: dynamic responders capture `manager`,
/// so two managers activating the same fixture get distinct responders.
pub fn resolve(source: &ResponseSource, manager: &FixtureManager) -> Responder {
    match source {
        ResponseSource::Literal(response) | ResponseSource::File { response, .. } => {
            Responder::Static(response.clone())
        }
        ResponseSource::Method(method) => {
            let method = *method;
            let manager = manager.clone();
            Responder::Dynamic(Arc::new(move |request| method(&manager, request)))
        }
        ResponseSource::Handler(handler) => {
            let handler = Arc::clone(handler);
            let manager = manager.clone();
            Responder::Dynamic(Arc::new(move |request| handler(request, &manager)))
        }
    }
}
