/*!
 * Method Handler Trait
 * Defines the interface for capability handlers and add-only registration
 */

use super::envelope::validate_method;
use super::sink::EventEmitter;
use super::types::{HandlerResult, RouterError, RouterResult};
use ahash::RandomState;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by every handler
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;

/// Per-call context handed to a handler
#[derive(Clone)]
pub struct CallContext {
    pub id: String,
    pub method: String,
    pub events: EventEmitter,
}

/// Trait for handling one method
pub trait MethodHandler: Send + Sync {
    /// Handle a call and return its result
    fn call(&self, ctx: CallContext, params: Value) -> HandlerFuture<'_>;
}

/// Adapter turning an async closure into a [`MethodHandler`]
pub struct FnHandler<F> {
    f: F,
}

impl<F, Fut> MethodHandler for FnHandler<F>
where
    F: Fn(CallContext, Value) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: CallContext, params: Value) -> HandlerFuture<'_> {
        Box::pin((self.f)(ctx, params))
    }
}

pub(super) type HandlerMap = HashMap<String, Arc<dyn MethodHandler>, RandomState>;

/// Builder for the method table
///
/// Registration is add-only: a name can be bound once and never replaced.
pub struct RouterBuilder {
    pub(super) handlers: Arc<HandlerMap>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(HashMap::with_hasher(RandomState::new())),
        }
    }

    /// Register a handler under `method`
    pub fn register(mut self, method: &str, handler: Arc<dyn MethodHandler>) -> RouterResult<Self> {
        validate_method(method)?;
        let handlers = Arc::make_mut(&mut self.handlers);
        if handlers.contains_key(method) {
            return Err(RouterError::DuplicateMethod(method.to_string()));
        }
        handlers.insert(method.to_string(), handler);
        Ok(self)
    }

    /// Register an async closure under `method`
    pub fn register_fn<F, Fut>(self, method: &str, f: F) -> RouterResult<Self>
    where
        F: Fn(CallContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register(method, Arc::new(FnHandler { f }))
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
