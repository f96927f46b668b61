//! Instrumented HTTP transport shared by the probe workers of one target.
mod chain;
mod client;
mod dns;
mod execution;
mod interceptors;


pub use chain::{Interceptor, Layered, Transport, build_chain};
pub use client::{ClientOptions, InstrumentedClient, PROBE_TIMEOUT, ReqwestTransport};
pub use dns::{DNS_DONE, TimingResolver};
pub use execution::drain_response_body;
pub use interceptors::{DurationInterceptor, InFlightInterceptor, RequestCounterInterceptor};
