//! Services: a path prefix, a one-time setup step, and the handlers mounted
//! under the prefix.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::handler::HandlerDescriptor;

type SetupFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type SetupFn<D> = Box<dyn FnOnce(D) -> SetupFuture + Send>;

/// A group of handlers sharing a prefix and a setup step.
///
/// `setup` receives the store handle and runs exactly once, before any of the
/// service's handlers are mounted.
pub struct Service<D> {
    prefix: String,
    handlers: HashMap<String, HandlerDescriptor>,
    setup: Option<SetupFn<D>>,
}

impl<D> Service<D> {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            handlers: HashMap::new(),
            setup: None,
        }
    }

    pub fn setup<F, Fut>(mut self, setup: F) -> Self
    where
        D: 'static,
        F: FnOnce(D) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.setup = Some(Box::new(move |store: D| -> SetupFuture { Box::pin(setup(store)) }));
        self
    }

    /// Register `descriptor` under `path`, replacing any previous handler there.
    pub fn handler(mut self, path: impl Into<String>, descriptor: HandlerDescriptor) -> Self {
        self.handlers.insert(path.into(), descriptor);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn handlers(&self) -> &HashMap<String, HandlerDescriptor> {
        &self.handlers
    }

    pub(crate) fn into_parts(
        self,
    ) -> (String, Option<SetupFn<D>>, HashMap<String, HandlerDescriptor>) {
        (self.prefix, self.setup, self.handlers)
    }
}

impl<D> core::fmt::Debug for Service<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Service")
            .field("prefix", &self.prefix)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("has_setup", &self.setup.is_some())
            .finish()
    }
}

/// Full mount path for `sub_path` under `prefix`.
///
/// Always starts with exactly one `/`; an empty prefix mounts at the root.
pub fn route_path(prefix: &str, sub_path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let sub_path = sub_path.trim_start_matches('/');
    if prefix.is_empty() {
        format!("/{sub_path}")
    } else {
        format!("/{prefix}/{sub_path}")
    }
}
