//! Many-producer, single-consumer delivery of probe outcomes.
mod consumers;
mod policy;
mod rendezvous;


pub use consumers::{
    FanInHandles, FanInOutcome, FanInReceivers, ProbeSinks, consume_errors, consume_results,
    fan_in_channels, spawn_consumers,
};
pub use policy::{FailFast, FailureAction, FailureBudget, FailurePolicy, Isolate, build_policy};
pub use rendezvous::{Disconnected, RendezvousReceiver, RendezvousSender, rendezvous};
