//! Core types for My Reads.
//!
//! Holds the canonical book model, lenient field parsing for raw records,
//! timezone and locale helpers, display formatting, CLI settings and the
//! persisted "currently reading" state.

pub mod current_reading;
pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
