//! Shared test utilities for E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_fragment(fragments::STANDALONE);
//!     fixture.command().arg("install").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::fragments;
    pub use super::TestFixture;
}

/// Name of the packager descriptor written by [`TestFixture::new`]
pub const PACKAGER_FILE: &str = "fake-pm.json";

/// Name of the script standing in for the package manager
pub const PACKAGE_MANAGER_SCRIPT: &str = "fake-pm.sh";

/// Descriptor driving [`PACKAGE_MANAGER_SCRIPT`]; the install-parent command
/// records its arguments in `installed.txt`.
pub const PACKAGER_DESCRIPTOR: &str = r#"{
  "packageManager": "sh ./fake-pm.sh",
  "installParentCommandTemplate": "echo {0} > installed.txt",
  "mappedArguments": [
    {"arguments": ["-d"], "allowArgInInstallParentCommand": true, "mappedTo": ["--loud"]}
  ]
}"#;

/// Default package manager: records its arguments in `calls.txt`, fails on `fail`
pub const DEFAULT_SCRIPT: &str = r#"echo "$@" >> calls.txt
if [ "$1" = "fail" ]; then
  exit 3
fi
"#;

/// Common `package-dry.json` snippets.
#[allow(dead_code)]
pub mod fragments {
    /// A fragment without parent.
    pub const STANDALONE: &str = r#"{
  "name": "standalone",
  "version": "1.0.0"
}
"#;

    /// A child extending `./parent/package-dry.json`.
    pub const CHILD: &str = r#"{
  "name": "child",
  "inheritance": {
    "parentReference": "./parent/package-dry.json"
  },
  "dependencies": {
    "left-pad": "managed"
  }
}
"#;

    /// The parent of [`CHILD`].
    pub const PARENT: &str = r#"{
  "name": "parent",
  "license": "MIT",
  "scripts": {
    "test": "mocha"
  },
  "dependencyManagement": {
    "left-pad": "1.3.0"
  }
}
"#;
}

/// A temporary project directory with a fake package manager.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a project with the fake packager descriptor and default script.
    pub fn new() -> Self {
        let fixture = Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        };
        fixture
            .with_file(PACKAGER_FILE, PACKAGER_DESCRIPTOR)
            .with_script(DEFAULT_SCRIPT)
    }

    /// Write `package-dry.json`.
    pub fn with_fragment(self, content: &str) -> Self {
        self.with_file("package-dry.json", content)
    }

    /// Replace the fake package manager script.
    pub fn with_script(self, content: &str) -> Self {
        self.with_file(PACKAGE_MANAGER_SCRIPT, content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read a file of the project as JSON.
    #[allow(dead_code)]
    pub fn read_json(&self, path: &str) -> serde_json::Value {
        let text = std::fs::read_to_string(self.path().join(path)).expect("Failed to read file");
        serde_json::from_str(&text).expect("Invalid JSON")
    }

    /// A `dry` command running in this project with the fake packager.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dry");
        cmd.current_dir(self.path())
            .env("DRY_PACKAGER", PACKAGER_FILE)
            .env("NO_COLOR", "1")
            .env_remove("DRY_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
