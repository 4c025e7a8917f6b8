//! Decade Statistics Service
//!
//! Consumes annual life expectancy records from the message channel and
//! produces:
//! - One chart update per accepted record
//! - A decade report the moment each decade window closes
//! - Significant year-over-year drop flags as records arrive
//!
//! Records are processed strictly in arrival order by a single aggregator.
//! Only one decade window is open at a time; the year ordering of the
//! channel is what makes a single slot enough.
//!
//! # Architecture
//!
//! ```text
//!   Message Channel
//!        │
//!   ┌────▼─────┐
//!   │ Consumer │  ← Parses, counts and logs rejections
//!   └────┬─────┘
//!        │
//!  ┌─────▼──────┐
//!  │ Aggregator │  ← Decade window + drop detector
//!  └──┬──────┬──┘
//!     │      │
//! ┌───▼──┐ ┌─▼──────┐
//! │ Sink │ │ Report │
//! └──────┘ └────────┘
//! ```

pub mod aggregator;
pub mod anomaly;
pub mod config;
pub mod consumer;
pub mod events;
pub mod report;
pub mod sink;
pub mod window;
