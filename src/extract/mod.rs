//! Listing extraction: markup → owned listing snapshots → validated events.

pub mod builder;
pub mod fields;
pub mod listing;
