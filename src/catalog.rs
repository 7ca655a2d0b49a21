//! Fixture definition catalogs.
//!
//! A [`Catalog`] is one namespace of fixture definitions. Catalogs never
//! share entries: [`Catalog::derive`] starts a child namespace with its own
//! empty mapping, and [`namespace`] hands out one process-wide catalog per
//! key.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::error::{FixtureError, Result};
use crate::manager::FixtureManager;
use crate::models::{RequestDescription, ResponseSpec, UrlPattern, Verb};
use crate::resolver::{FixtureHandler, FixtureMethod, ResponseSource};
use crate::traits::StubEngine;

/// A registered fixture: what to intercept and how to answer.
#[derive(Debug, Clone)]
pub struct FixtureDefinition {
    pub verb: Verb,
    pub pattern: UrlPattern,
    pub response: ResponseSource,
}

/// One namespace of fixture definitions.
///
/// Registration and lookup lock an internal mutex, so a catalog can be
/// shared behind an `Arc` while tests set it up.
#[derive(Debug)]
pub struct Catalog {
    namespace: String,
    fixtures: Mutex<BTreeMap<String, FixtureDefinition>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            fixtures: Mutex::new(BTreeMap::new()),
        }
    }

    /// Create a child namespace named `"<parent>::<child>"`.
    ///
    /// The child starts empty and never sees this catalog's definitions.
    pub fn derive(&self, child: &str) -> Self {
        Self::new(format!("{}::{}", self.namespace, child))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Register a fixture from either a response value or a handler.
    ///
    /// A later registration under the same name replaces the earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::InvalidArgument`] unless exactly one of
    /// `response` and `handler` is supplied.
    pub fn register(
        &self,
        name: &str,
        verb: Verb,
        pattern: impl Into<UrlPattern>,
        response: Option<ResponseSpec>,
        handler: Option<FixtureHandler>,
    ) -> Result<()> {
        let source = match (response, handler) {
            (Some(response), None) => ResponseSource::Literal(response),
            (None, Some(handler)) => ResponseSource::Handler(handler),
            (None, None) => {
                return Err(FixtureError::InvalidArgument(
                    "expected either a response value or a callable, received neither"
                        .to_string(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(FixtureError::InvalidArgument(
                    "expected either a response value or a callable, received both".to_string(),
                ));
            }
        };

        self.insert(name, verb, pattern.into(), source);
        Ok(())
    }

    /// Register a fixture answering with a literal response.
    pub fn register_response(
        &self,
        name: &str,
        verb: Verb,
        pattern: impl Into<UrlPattern>,
        response: impl Into<ResponseSpec>,
    ) {
        self.insert(
            name,
            verb,
            pattern.into(),
            ResponseSource::Literal(response.into()),
        );
    }

    /// Register a fixture answered by a closure.
    ///
    /// The closure also receives the manager that activated the fixture.
    pub fn register_handler<F>(&self, name: &str, verb: Verb, pattern: impl Into<UrlPattern>, f: F)
    where
        F: Fn(&RequestDescription, &FixtureManager) -> ResponseSpec + Send + Sync + 'static,
    {
        self.insert(name, verb, pattern.into(), ResponseSource::handler(f));
    }

    /// Register a raw HTTP response capture read from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Io`] if the file cannot be read, or
    /// [`FixtureError::InvalidResponse`] if it is not a raw HTTP response.
    pub fn register_from_file(
        &self,
        name: &str,
        verb: Verb,
        pattern: impl Into<UrlPattern>,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let path = path.as_ref();
        let raw = std::fs::read(path)?;
        let response = ResponseSpec::raw(&raw)?;

        let source = ResponseSource::File {
            path: path.to_path_buf(),
            raw,
            response,
        };
        self.insert(name, verb, pattern.into(), source);
        Ok(())
    }

    /// Register a method-style handler bound to the activating manager.
    pub fn register_method(
        &self,
        name: &str,
        verb: Verb,
        pattern: impl Into<UrlPattern>,
        method: FixtureMethod,
    ) {
        self.insert(name, verb, pattern.into(), ResponseSource::Method(method));
    }

    /// Snapshot of every definition in this namespace.
    pub fn all(&self) -> BTreeMap<String, FixtureDefinition> {
        self.fixtures().clone()
    }

    /// Look up a single definition.
    pub fn get(&self, name: &str) -> Option<FixtureDefinition> {
        self.fixtures().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fixtures().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.fixtures().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.fixtures().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures().is_empty()
    }

    /// Remove every definition in this namespace.
    pub fn reset(&self) {
        let mut fixtures = self.fixtures();
        tracing::debug!(namespace = %self.namespace, removed = fixtures.len(), "Resetting catalog");
        fixtures.clear();
    }

    /// Activate `names` against `engine`. See [`FixtureManager::activate`].
    pub fn activate<E, S>(&self, engine: &E, names: &[S]) -> Result<FixtureManager>
    where
        E: StubEngine,
        S: AsRef<str>,
    {
        FixtureManager::activate(self, engine, names)
    }

    fn insert(&self, name: &str, verb: Verb, pattern: UrlPattern, response: ResponseSource) {
        tracing::debug!(
            namespace = %self.namespace,
            fixture = name,
            %verb,
            %pattern,
            dynamic = response.is_dynamic(),
            "Registering fixture"
        );

        self.fixtures().insert(
            name.to_string(),
            FixtureDefinition {
                verb,
                pattern,
                response,
            },
        );
    }

    // Definitions are plain data, so a poisoned lock is still usable.
    fn fixtures(&self) -> MutexGuard<'_, BTreeMap<String, FixtureDefinition>> {
        self.fixtures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The process-wide catalog for `key`, created empty on first use.
pub fn namespace(key: &str) -> Arc<Catalog> {
    static NAMESPACES: OnceLock<Mutex<HashMap<String, Arc<Catalog>>>> = OnceLock::new();

    let mut namespaces = NAMESPACES
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    namespaces
        .entry(key.to_string())
        .or_insert_with(|| Arc::new(Catalog::new(key)))
        .clone()
}
