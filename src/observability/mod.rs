//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (handle, method, attempt)
//!     → metrics.rs (counters, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout, filtered by EnvFilter)
//!     → Prometheus exporter (optional, installed by the binary)
//! ```
//!
//! # Design Decisions
//! - Library code only emits; installing subscribers/exporters is the
//!   binary's job, so embedding applications keep control
//! - Metric updates are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
