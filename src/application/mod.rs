//! Application layer: the payment lifecycle state machine and the session
//! that hosts it.
//!
//! [`machine::transition`] is a pure function from `(state, event)` to the next
//! state. [`session::SessionHandle`] runs it inside an actor-like task fed by
//! `tokio` channels, so a UI dispatches commands and renders from snapshots.

pub mod machine;
pub mod session;
