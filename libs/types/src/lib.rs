//! Types library for the life expectancy stream
//!
//! This library provides the data model shared by the record emitter and the
//! decade statistics service, so both sides of the message channel agree on
//! one record shape and one wire format.
//!
//! # Modules
//! - `record`: Annual observations (`YearRecord`) and decade arithmetic
//! - `message`: JSON wire codec for channel messages
//! - `errors`: Record-level error taxonomy

// Public modules
pub mod record;
pub mod message;
pub mod errors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::record::*;
    pub use crate::message::*;
    pub use crate::errors::*;
}
