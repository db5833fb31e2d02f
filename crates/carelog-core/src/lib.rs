//! Core types and the pattern-detection engine for carelog.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! owns the domain model, the daily aggregators, the detectors and the
//! alert lifecycle, and reaches persistence only through [`store::CareStore`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod aggregate;
pub mod alert;
pub mod analysis;
pub mod cache;
pub mod checkin;
pub mod child;
pub mod combine;
pub mod date;
pub mod detect;
pub mod error;
pub mod guidance;
pub mod lifecycle;
pub mod stool;
pub mod store;

#[cfg(test)]
mod memory;

pub use analysis::{Analysis, Analyzer};
pub use error::{Error, Result};
pub use lifecycle::AlertLifecycle;
pub use store::CareStore;
