use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Request, Response};

use crate::error::TransportError;

/// Sends one request and yields its response (headers received).
#[async_trait]
pub trait Transport: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the request cannot be completed.
    async fn send(&self, request: Request) -> Result<Response, TransportError>;
}

/// Observes a request on its way through the chain.
///
/// Implementations must pass the request to `next` unmodified and return
/// whatever `next` returns, errors included.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// # Errors
    ///
    /// Returns whatever error `next` produced.
    async fn intercept(
        &self,
        request: Request,
        next: &dyn Transport,
    ) -> Result<Response, TransportError>;
}

/// One interceptor wrapped around the rest of the chain.
pub struct Layered {
    interceptor: Arc<dyn Interceptor>,
    next: Arc<dyn Transport>,
}

impl Layered {
    #[must_use]
    pub const fn new(interceptor: Arc<dyn Interceptor>, next: Arc<dyn Transport>) -> Self {
        Self { interceptor, next }
    }
}

#[async_trait]
impl Transport for Layered {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.interceptor.intercept(request, self.next.as_ref()).await
    }
}

/// Folds `interceptors` around `base`; the first interceptor is outermost.
#[must_use]
pub fn build_chain(
    base: Arc<dyn Transport>,
    interceptors: Vec<Arc<dyn Interceptor>>,
) -> Arc<dyn Transport> {
    interceptors
        .into_iter()
        .rev()
        .fold(base, |next, interceptor| {
            Arc::new(Layered::new(interceptor, next))
        })
}
