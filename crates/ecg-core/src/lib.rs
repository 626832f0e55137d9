//! ECG-Core: Foundation types for ECG batch classification
//!
//! Batch container, record format parsing, and error types shared by the
//! processing pipeline.

pub mod error;
pub mod format;
pub mod signal_batch;

pub use error::{EcgError, EcgResult};
pub use format::*;
pub use signal_batch::*;
