//! Record Emitter
//!
//! Producer side of the life expectancy stream. Loads the total, female and
//! male series from CSV, zips them into one `YearRecord` per year, and
//! publishes each as a JSON message on the ordered channel at a fixed pace.
//!
//! # Modules
//! - `config` — Data locations, stream name and pacing from the environment
//! - `source` — CSV series loading and zipping
//! - `publisher` — Paced publishing onto the message channel

pub mod config;
pub mod publisher;
pub mod source;
