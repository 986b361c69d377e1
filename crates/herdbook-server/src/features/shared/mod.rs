//! Shared utilities and types for feature modules
//!
//! - **fields**: tri-state JSON members for write payloads
//! - **validation**: per-field error accumulation and field cleaners

pub mod fields;
pub mod validation;

pub use fields::Field;
pub use validation::FieldErrors;
