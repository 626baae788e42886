//! # Command Configuration
//!
//! Turns the raw command line into a [`CommandConfig`]:
//!
//! 1.  `--dry-packager <key|path>` is taken out of the tokens. Without it the
//!     `DRY_PACKAGER` environment variable is used, then `npm`.
//! 2.  The packager descriptor is resolved (see [`PackagerDescriptor::resolve`]).
//! 3.  The remaining tokens go through the feature trigger pre-pass and the
//!     descriptor's argument translator, producing the arguments of the main
//!     command and of the install-parent command.

use log::debug;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::packager::{PackagerDescriptor, DEFAULT_PACKAGER};
use crate::pipeline::{activate_features, ExecutionUnit};

/// Option selecting the packager descriptor, never forwarded
pub const PACKAGER_OPTION: &str = "--dry-packager";

/// Environment variable selecting the packager descriptor
pub const PACKAGER_ENV: &str = "DRY_PACKAGER";

/// Everything a run needs to know about the command it wraps
#[derive(Debug, Clone)]
pub struct CommandConfig {
    working_dir: PathBuf,
    packager: PackagerDescriptor,
    proxy_args: Vec<String>,
    install_parent_args: Vec<String>,
}

impl CommandConfig {
    pub fn new<P: Into<PathBuf>>(
        working_dir: P,
        packager: PackagerDescriptor,
        proxy_args: Vec<String>,
        install_parent_args: Vec<String>,
    ) -> Self {
        Self {
            working_dir: working_dir.into(),
            packager,
            proxy_args,
            install_parent_args,
        }
    }

    /// Build the configuration from raw tokens, activating the features of
    /// `units` that are triggered on the way.
    ///
    /// `env_packager` is the value of [`PACKAGER_ENV`], if any.
    pub fn from_args(
        raw: Vec<String>,
        working_dir: &Path,
        env_packager: Option<String>,
        units: &mut [ExecutionUnit],
    ) -> Result<Self> {
        let (selected, tokens) = extract_packager(raw)?;
        let key = selected
            .or_else(|| env_packager.filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_PACKAGER.to_string());
        debug!("Using packager descriptor {}", key);

        let packager = PackagerDescriptor::resolve(working_dir, &key)?;
        let prepared = activate_features(units, packager.translator(), tokens)?;
        debug!("Proxy arguments: {:?}", prepared.proxy_args);
        debug!("Install-parent arguments: {:?}", prepared.install_parent_args);

        Ok(Self::new(
            working_dir,
            packager,
            prepared.proxy_args,
            prepared.install_parent_args,
        ))
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn packager(&self) -> &PackagerDescriptor {
        &self.packager
    }

    pub fn proxy_args(&self) -> &[String] {
        &self.proxy_args
    }

    pub fn install_parent_args(&self) -> &[String] {
        &self.install_parent_args
    }

    /// The main command line, `None` when there is nothing to forward
    pub fn proxy_command(&self) -> Option<String> {
        if self.proxy_args.is_empty() {
            None
        } else {
            Some(self.packager.proxy_command(&self.proxy_args))
        }
    }
}

/// Split the packager selection from the other tokens; the last one wins
pub fn extract_packager(raw: Vec<String>) -> Result<(Option<String>, Vec<String>)> {
    let mut selected = None;
    let mut tokens = Vec::with_capacity(raw.len());
    let mut iter = raw.into_iter();

    while let Some(token) = iter.next() {
        if token == PACKAGER_OPTION {
            let value = iter.next().ok_or_else(|| Error::MissingArgumentValue {
                argument: PACKAGER_OPTION.to_string(),
            })?;
            selected = Some(value);
        } else {
            tokens.push(token);
        }
    }

    Ok((selected, tokens))
}
