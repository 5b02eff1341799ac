//! Configuration for quicklook.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults;
//! 2. a configuration file (TOML, YAML or JSON, by extension), either given
//!    explicitly or found at [`default_path`];
//! 3. `QUICKLOOK_*` environment variables (see [`ENV_PREFIX`]).
//!
//! ```toml
//! policy = "halt-on-first-error"
//!
//! [table]
//! delimiter = "\t"
//!
//! [output]
//! directory = "/cases/1234/quicklook"
//! write_images = true
//! ```

pub mod error;
mod load;
mod models;

pub use crate::load::{ENV_PREFIX, default_path};
pub use crate::models::{CacheConfig, Config, FailurePolicy, LogConfig, OutputConfig, TableConfig};
