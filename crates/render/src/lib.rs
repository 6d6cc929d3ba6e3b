//! `paperstack-render` — README generation.
//!
//! Consumes the final sorted collection and produces the Markdown table
//! section. Identity logic lives upstream; this crate only groups, filters,
//! and formats.

pub mod markdown;

pub use markdown::render_tables;
