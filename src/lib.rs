//! # pkg-dry Library
//!
//! This library provides the engine behind the `dry` command-line tool: it lets
//! a JavaScript project describe its `package.json` as a chain of inheriting
//! `package-dry.json` fragments and drives a package manager (npm, pnpm, yarn or
//! a custom one) over the merged result.
//!
//! ## Quick Example
//!
//! ```
//! use pkg_dry::merge::merge_chain;
//! use serde_json::json;
//!
//! // The child first, then its ancestors
//! let chain = vec![
//!     json!({"name": "child", "keywords": ["child"]}),
//!     json!({"name": "parent", "license": "MIT", "keywords": ["parent"]}),
//! ];
//! let merged = merge_chain(&chain);
//!
//! assert_eq!(merged["name"], "child");
//! assert_eq!(merged["license"], "MIT");
//! assert_eq!(merged["keywords"], json!(["parent", "child"]));
//! ```
//!
//! ## Core Concepts
//!
//! - **Descriptors (`descriptor`)**: fragments with their reserved
//!   `inheritance` and `dependencyManagement` sections, and the manifest built
//!   from them.
//! - **Inheritance (`inheritance`, `merge`, `dependency`)**: walks the parent
//!   references, installing the packages that ship the parents, and merges the
//!   chain into one manifest.
//! - **Reconciliation (`reconcile`, `diff`)**: folds the edits the package
//!   manager makes to `package.json` back into the fragment.
//! - **Packagers (`packager`, `arguments`)**: how each package manager is
//!   called and how `dry` flags translate to its flags.
//! - **Pipeline (`pipeline`)**: the phase-ordered steps and flag-activated
//!   features of one run.
//!
//! ## Execution Flow
//!
//! [`pipeline::execute`] runs the following lifecycle:
//!
//! 1.  **Configuration**: select the packager and activate features from the
//!     command line.
//! 2.  **Build fragment**: read `package-dry.json`.
//! 3.  **Build manifest**: resolve the inheritance chain and `managed` versions.
//! 4.  **Save**: write `package.json`.
//! 5.  **Execute**: run the package manager with the translated arguments.
//! 6.  **Reconcile**: report `package.json` edits to `package-dry.json`.
//! 7.  **Clean**: delete `package.json` unless asked to keep it.

pub mod arguments;
pub mod config;
pub mod dependency;
pub mod descriptor;
pub mod diff;
pub mod error;
pub mod filesystem;
pub mod inheritance;
pub mod logging;
pub mod merge;
pub mod output;
pub mod packager;
pub mod path;
pub mod pipeline;
pub mod reconcile;
pub mod runner;
