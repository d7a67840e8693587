//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → RuleTableBuilder::from_config → RuleTable
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads and rebuilds the rule table
//!     → table sent over mpsc to the server
//!     → Dispatcher::publish swaps it in atomically
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Handlers are referenced by name; the application registers them

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{build_rule_table, load_config, load_rule_table, parse_config, ConfigError};
pub use schema::AppConfig;
pub use schema::RuleConfig;
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;
