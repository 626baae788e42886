//! # Error Handling
//!
//! This module defines the centralized error type for `pkg-dry`. It uses the
//! `thiserror` library to build a single `Error` enum covering every failure
//! mode of the engine, each variant carrying the context needed to explain the
//! failure to the user.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants map to the failure classes of the
//!   engine:
//!   - configuration problems (packager descriptors, mapping rules),
//!   - fragment loading and inheritance resolution,
//!   - unresolved `managed` dependency versions,
//!   - command-line arguments missing their value,
//!   - wrapped command failures,
//!   - pipeline units that cannot find the unit they act upon,
//!   - reconciliation, I/O and JSON errors.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! No error is retried. The binary turns any of them into exit code 1.

use thiserror::Error;

/// Main error type for pkg-dry operations
#[derive(Error, Debug)]
pub enum Error {
    /// A packager descriptor or one of its mapping rules is malformed or missing.
    #[error("Configuration error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Configuration {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// A parent fragment referenced through `inheritance.parentReference` could
    /// not be found or parsed.
    #[error("Unable to load descriptor '{reference}': {message}")]
    DescriptorLoad { reference: String, message: String },

    /// The `parentReference` chain loops back onto a fragment already visited.
    #[error("Cycle detected in descriptor inheritance: {cycle}")]
    CycleDetected { cycle: String },

    /// A dependency declared as `managed` has no entry in `dependencyManagement`.
    #[error("Package {key} must inherit a managed version but none is provided")]
    MissingManagedVersion { key: String },

    /// A flag expecting a value was the last token on the command line.
    #[error("The argument {argument} expects a value, but received nothing")]
    MissingArgumentValue { argument: String },

    /// More than one mapping rule claims the same argument.
    #[error("The argument {argument} is mapped by more than one rule")]
    AmbiguousMapping { argument: String },

    /// The wrapped command could not be spawned or exited unsuccessfully.
    #[error("Command failed: {command} ({status})")]
    ExternalCommand { command: String, status: String },

    /// A feature could not find the unit it needs to act upon.
    #[error("Required unit not found: {unit}")]
    RequiredUnitMissing { unit: String },

    /// Folding manifest changes back into the fragment failed.
    #[error("Reconciliation error: {message}")]
    Reconcile { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing or serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_configuration() {
        let error = Error::Configuration {
            message: "Unknown packager".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Configuration error"));
        assert!(display.contains("Unknown packager"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_configuration_with_hint() {
        let error = Error::Configuration {
            message: "Unknown packager foo".to_string(),
            hint: Some("Use one of npm, pnpm, yarn".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("hint:"));
        assert!(display.contains("Use one of npm"));
    }

    #[test]
    fn test_error_display_missing_managed_version() {
        let error = Error::MissingManagedVersion {
            key: "left-pad".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("left-pad"));
        assert!(display.contains("managed version"));
    }

    #[test]
    fn test_error_display_cycle_detected() {
        let error = Error::CycleDetected {
            cycle: "a -> b -> a".to_string(),
        };
        assert!(format!("{}", error).contains("a -> b -> a"));
    }

    #[test]
    fn test_error_display_required_unit_missing() {
        let error = Error::RequiredUnitMissing {
            unit: "DeleteManifest".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Required unit not found"));
        assert!(display.contains("DeleteManifest"));
    }

    #[test]
    fn test_error_display_external_command() {
        let error = Error::ExternalCommand {
            command: "npm install".to_string(),
            status: "exit status: 1".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("npm install"));
        assert!(display.contains("exit status: 1"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_error = serde_json::from_str::<serde_json::Value>("{unclosed").unwrap_err();
        let error: Error = json_error.into();
        assert!(format!("{}", error).contains("JSON error"));
    }
}
