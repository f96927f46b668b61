//! Core library for the `zombie` CLI.
//!
//! `zombie` probes a set of HTTP targets at jittered intervals to simulate
//! real-life traffic. Each target gets its own instrumented client and one
//! worker per configured replica; outcomes are funneled into structured logs
//! and Prometheus metrics, and a failure policy decides whether a probe
//! failure ends the run.
pub mod api;
pub mod args;
pub mod config;
pub mod domain;
pub mod entry;
pub mod error;
pub mod fanin;
pub mod http;
pub mod logger;
pub mod metrics;
pub mod probe;
pub mod shutdown_handlers;
