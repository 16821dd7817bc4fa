//! Configuration module for the passport record scanner
//! Compile-time limits are generated from TOML by build.rs; user preferences live in `runtime`.

// Include generated constants from build.rs
include!(concat!(env!("OUT_DIR"), "/constants.rs"));

pub mod runtime;

pub use runtime::{
    ConfigError, LoggingPreferences, RuntimeConfig, ScannerPreferences, ValidationPreferences,
};
