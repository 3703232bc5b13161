//! Doclassify Controller
//!
//! The request state machine a presentation layer drives. It owns the
//! document text and the single `RequestState` for a session, gates
//! submissions through the eligibility check, allows at most one request in
//! flight, and turns service responses into outcomes with the interpreter.
//!
//! Transitions:
//! - `submit`: `Idle | Settled` → `Validating` → `Requesting` → `Settled`.
//!   Too-short text returns to the prior state; a submit while busy is rejected.
//! - `edit`: any state, text only.
//! - `reset`: any state → `Idle`, abandoning a request in flight.

pub mod controller;

pub use controller::{RequestController, SubmitOutcome, DEFAULT_REQUEST_TIMEOUT};
