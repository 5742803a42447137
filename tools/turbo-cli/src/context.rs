//! CLI execution context.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use turbo_fulfillment::prelude::*;

use crate::config::CliConfig;
use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["turbo.toml", ".turbo.toml", "turbo.json"];

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Output handler.
    pub output: Output,
    /// Directory holding the config file (or the working directory).
    pub root: PathBuf,
    state_override: Option<PathBuf>,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, state_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, root) = if let Some(path) = config_path {
            let root = Path::new(path)
                .parent()
                .map(|p| cwd.join(p))
                .unwrap_or_else(|| cwd.clone());
            (CliConfig::load(path)?, root)
        } else {
            Self::find_config(&cwd).unwrap_or_else(|| (CliConfig::default(), cwd.clone()))
        };

        Ok(Self {
            config,
            output,
            state_override: state_path.map(|p| cwd.join(p)),
            root,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        debug!(path = %config_path.display(), "using config");
                        return Some((config, current));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Path of the JSON state file.
    pub fn state_path(&self) -> PathBuf {
        match &self.state_override {
            Some(path) => path.clone(),
            None => self.resolve_path(&self.config.shop.state_file),
        }
    }

    /// Resolve a path relative to the config directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.root.join(path)
        }
    }

    /// Take the exclusive lock guarding the state file.
    ///
    /// Blocks until no other `turbo` process holds it. Released when the
    /// returned file is dropped.
    pub fn lock_state(&self) -> Result<File> {
        let path = self.state_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let lock_path = path.with_extension("lock");
        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {}", lock_path.display()))?;
        lock.lock_exclusive()
            .with_context(|| format!("Failed to lock {}", lock_path.display()))?;
        debug!(path = %lock_path.display(), "state locked");
        Ok(lock)
    }

    /// Open the saved state, or seed a fresh one from the config.
    ///
    /// The state stays locked until the returned handle is dropped, so a
    /// concurrent command waits instead of overwriting this one's writes.
    pub fn open_store(&self) -> Result<StateHandle> {
        let lock = self.lock_state()?;
        let path = self.state_path();

        let store = if path.exists() {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read state file: {}", path.display()))?;
            MemoryStore::from_json(&json)
                .with_context(|| format!("Failed to parse state file: {}", path.display()))?
        } else {
            info!(path = %path.display(), "no saved state, seeding from config");
            self.config.seed_store()
        };

        Ok(StateHandle {
            store: Arc::new(store),
            path,
            _lock: lock,
        })
    }

    /// Build an engine over `store`. Alerts go to the log.
    pub fn engine(&self, store: &Arc<MemoryStore>) -> CommerceEngine {
        CommerceEngine::new(
            Repositories::from_store(Arc::clone(store)),
            Arc::new(LogNotifier),
            self.config.fulfillment.clone(),
        )
    }

    /// Store used when a command does not name one.
    pub fn default_store(&self) -> Option<&str> {
        self.config.stores.first().map(|s| s.id.as_str())
    }
}

/// Saved state, held under the state lock.
pub struct StateHandle {
    pub store: Arc<MemoryStore>,
    path: PathBuf,
    _lock: File,
}

impl StateHandle {
    /// Write the store back to the state file.
    ///
    /// The new contents go to a temporary file next to the state file and
    /// are renamed over it, so readers never see a partial write.
    pub fn save(&self) -> Result<()> {
        let json = self.store.to_json().context("Failed to serialize state")?;
        let dir = self
            .path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)
            .with_context(|| format!("Failed to write state file: {}", self.path.display()))?;
        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}
