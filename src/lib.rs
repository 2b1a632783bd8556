//! `StyleCast` - weather-driven outfit and accessory exploration
//!
//! This library provides the core functionality for deriving photo-search
//! keywords from weather conditions and user style preferences, plus the
//! web service that serves the explore page.

pub mod auth;
pub mod config;
pub mod error;
pub mod keywords;
pub mod models;
pub mod photos;
pub mod store;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use config::StyleCastConfig;
pub use error::StyleCastError;
pub use models::{Photo, Role, Style, User, WeatherObservation};
pub use photos::PhotoClient;
pub use store::Store;
pub use weather::WeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, StyleCastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
