//! Handler descriptors: a handler plus the metadata used to mount it.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::extract::Request;
use axum::http::Method;
use axum::response::Response;

use grails_auth::Role;

pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Type-erased request handler.
pub type BoxHandler = Arc<dyn Fn(Request) -> HandlerFuture + Send + Sync>;

/// Who may call a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Requires a valid token whose user has one of these roles.
    Protected(HashSet<Role>),
}

/// A handler together with its methods and access rule.
#[derive(Clone)]
pub struct HandlerDescriptor {
    handler: BoxHandler,
    access: Access,
    methods: Vec<Method>,
}

impl HandlerDescriptor {
    /// Public handler answering `methods`.
    pub fn new(methods: impl IntoIterator<Item = Method>, handler: BoxHandler) -> Self {
        let mut unique = Vec::new();
        for method in methods {
            if !unique.contains(&method) {
                unique.push(method);
            }
        }
        Self {
            handler,
            access: Access::Public,
            methods: unique,
        }
    }

    pub fn get(handler: BoxHandler) -> Self {
        Self::new([Method::GET], handler)
    }

    pub fn post(handler: BoxHandler) -> Self {
        Self::new([Method::POST], handler)
    }

    /// Restrict the handler to authenticated users holding one of `roles`.
    pub fn protected<R>(mut self, roles: impl IntoIterator<Item = R>) -> Self
    where
        R: Into<Role>,
    {
        self.access = Access::Protected(roles.into_iter().map(Into::into).collect());
        self
    }

    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    pub fn is_protected(&self) -> bool {
        matches!(self.access, Access::Protected(_))
    }

    /// Allowed roles; `None` for public handlers.
    pub fn allowed_roles(&self) -> Option<&HashSet<Role>> {
        match &self.access {
            Access::Public => None,
            Access::Protected(roles) => Some(roles),
        }
    }

    /// Declared methods. OPTIONS is added at mount time, not here.
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

impl core::fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("access", &self.access)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}
