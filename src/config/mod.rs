//! Configuration module for stardeps
//!
//! All configuration is built once at the boundary (CLI or embedding API) and
//! passed by value into the components that need it; no component reads
//! ambient process state directly.

mod types;
mod validation;

// Re-export types
pub use types::{
    ClientConfig, DependentType, HttpConfig, PackageMissPolicy, ScrapeOptions, SelectorConfig,
};

// Re-export validation
pub use validation::{validate_client_config, validate_options};
