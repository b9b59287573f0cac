//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Cancellation (cancel.rs):
//!     CancelToken cloned into every long wait (transaction polling)
//!     → cancel() wakes all waiters at their next suspend point
//!
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → cancel the root token
//! ```
//!
//! # Design Decisions
//! - Cancellation is level-triggered: tokens created or awaited after
//!   cancel() observe it immediately
//! - Cancelling never rolls back a submitted transaction; it only stops
//!   waiting for its outcome

pub mod cancel;
pub mod signals;

pub use cancel::CancelToken;
