//! Ordered-provider fallback used by both chat completion and image generation.
//!
//! The chain is an explicit state machine ([`FailoverState`]) with a pure
//! transition function; [`FailoverEngine`] drives it against real or fake
//! providers.

pub mod engine;
pub mod state;

pub use engine::{AttemptOutcome, AttemptRecord, FailoverEngine, FailoverError, FailoverSuccess};
pub use state::{FailoverEvent, FailoverState, RetryPolicy};
