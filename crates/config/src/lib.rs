//! `paperstack-config` — field schema, category list, and tool settings.
//!
//! Everything is an explicit value object built once at startup and passed by
//! reference; there is no ambient global configuration.

pub mod error;
pub mod schema;
pub mod settings;

pub use error::ConfigError;
pub use schema::{CategorySpec, FieldKind, FieldSpec, SchemaConfig, UNMAPPED_CATEGORY_RANK};
pub use settings::{Config, DatabaseConfig, PathsConfig, RenderConfig};
