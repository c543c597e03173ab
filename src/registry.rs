//! Named-config registry: registration, lifecycle hooks, dirty tracking.
//!
//! The registry owns a root directory, a codec, and a load policy, and maps
//! config names to live entries. Loading resets the config to defaults,
//! merges the file, runs the hooks, and rewrites the file when the merge
//! reports it stale; saving runs the pre-save hook and persists atomically.

use crate::codec::{Codec, JsonCodec, MergeOutcome};
use crate::error::RegistryError;
use crate::fields::Exposed;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Lifecycle hooks for a registered config type.
///
/// Every hook has a default; implement only what the type needs.
pub trait Config: Exposed + Default + Send + Sync + 'static {
    /// Restore every field to its default. Runs before each merge.
    fn reset_defaults(&mut self) {
        *self = Self::default();
    }

    /// Normalize or clamp merged values before they are used.
    fn validate(&mut self) {}

    /// Rebuild derived state after a load.
    fn after_load(&mut self) {}

    /// Fold derived state back into exposed fields before a save.
    fn before_save(&mut self) {}
}

struct Cell<T> {
    value: RwLock<T>,
    dirty: AtomicBool,
}

/// Cloneable handle to a registered config.
///
/// Handles share state with the registry entry they came from: values
/// merged by [`ConfigRegistry::load`] are visible through every handle, and
/// edits made through a handle are what [`ConfigRegistry::save`] persists.
pub struct ConfigHandle<T> {
    cell: Arc<Cell<T>>,
}

impl<T> Clone for ConfigHandle<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
        }
    }
}

// Opaque: T carries no Debug bound.
impl<T> fmt::Debug for ConfigHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigHandle").finish_non_exhaustive()
    }
}

impl<T: Config> ConfigHandle<T> {
    fn new(initial: T) -> Self {
        Self {
            cell: Arc::new(Cell {
                value: RwLock::new(initial),
                dirty: AtomicBool::new(false),
            }),
        }
    }

    /// Read the current value.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.value.read())
    }

    /// Mutate the value and mark it dirty for [`ConfigRegistry::save_dirty`].
    pub fn edit<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let result = f(&mut self.cell.value.write());
        self.cell.dirty.store(true, Ordering::Release);
        result
    }

    /// Clone the current value out.
    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.cell.value.read().clone()
    }

    /// Whether the config has edits that have not been saved.
    pub fn is_dirty(&self) -> bool {
        self.cell.dirty.load(Ordering::Acquire)
    }

    /// Flag the config for the next [`ConfigRegistry::save_dirty`] pass
    /// without editing it.
    pub fn mark_dirty(&self) {
        self.cell.dirty.store(true, Ordering::Release);
    }
}

/// What the registry needs from an entry without knowing its config type.
trait Entry<C: Codec>: Send + Sync {
    fn load(&self, codec: &C, path: &Path) -> Result<MergeOutcome, RegistryError>;
    fn save(&self, codec: &C, path: &Path) -> Result<(), RegistryError>;
    fn is_dirty(&self) -> bool;
}

struct Slot<T> {
    cell: Arc<Cell<T>>,
}

impl<T: Config, C: Codec> Entry<C> for Slot<T> {
    fn load(&self, codec: &C, path: &Path) -> Result<MergeOutcome, RegistryError> {
        let outcome = {
            let mut value = self.cell.value.write();
            value.reset_defaults();
            let outcome = codec.merge_into(path, &mut *value);
            value.validate();
            value.after_load();
            outcome
        };
        self.cell.dirty.store(false, Ordering::Release);

        if outcome.parse_error {
            warn!(path = %path.display(), "config file unusable, regenerating from defaults");
        }
        if outcome.needs_rewrite() {
            self.save(codec, path)?;
        }
        Ok(outcome)
    }

    fn save(&self, codec: &C, path: &Path) -> Result<(), RegistryError> {
        {
            let mut value = self.cell.value.write();
            value.before_save();
            codec.write(path, &*value)?;
        }
        self.cell.dirty.store(false, Ordering::Release);
        info!(path = %path.display(), "saved config");
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.cell.dirty.load(Ordering::Acquire)
    }
}

/// When registered configs get their initial load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Load (and regenerate a stale file) during `register`.
    #[default]
    Eager,
    /// Wait for an explicit `load` or `load_all`.
    Manual,
}

/// Registry of named configs sharing one root directory and codec.
pub struct ConfigRegistry<C: Codec = JsonCodec> {
    root: PathBuf,
    codec: C,
    policy: LoadPolicy,
    entries: RwLock<HashMap<String, Box<dyn Entry<C>>>>,
}

impl ConfigRegistry<JsonCodec> {
    /// Registry over `root` with the JSON codec and eager loading.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            codec: JsonCodec::new(),
            policy: LoadPolicy::Eager,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Start building a registry whose root defaults to the platform config
    /// directory for `app`.
    pub fn builder(app: impl Into<String>) -> RegistryBuilder<JsonCodec> {
        RegistryBuilder {
            app: app.into(),
            root: None,
            codec: JsonCodec::new(),
            policy: LoadPolicy::Eager,
        }
    }
}

impl<C: Codec> ConfigRegistry<C> {
    /// Register a config under `name` and hand back a shared handle.
    ///
    /// Duplicate names are rejected. Under [`LoadPolicy::Eager`] the config
    /// is loaded before returning, which also writes the file back when it
    /// was absent or stale; the entry stays registered if that load fails,
    /// so the caller may retry with [`ConfigRegistry::load`].
    pub fn register<T: Config>(
        &self,
        name: &str,
        initial: T,
    ) -> Result<ConfigHandle<T>, RegistryError> {
        let handle = ConfigHandle::new(initial);
        let slot = Box::new(Slot {
            cell: Arc::clone(&handle.cell),
        });
        {
            let mut entries = self.entries.write();
            if entries.contains_key(name) {
                return Err(RegistryError::Duplicate(name.to_string()));
            }
            entries.insert(name.to_string(), slot);
        }
        if self.policy == LoadPolicy::Eager {
            self.load(name)?;
        }
        Ok(handle)
    }

    /// Load one config from disk: reset to defaults, merge, run hooks, and
    /// regenerate the file when the merge reports it stale.
    pub fn load(&self, name: &str) -> Result<MergeOutcome, RegistryError> {
        let path = self.config_path(name);
        let entries = self.entries.read();
        let entry = entries
            .get(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;
        entry.load(&self.codec, &path)
    }

    /// Save one config to disk.
    pub fn save(&self, name: &str) -> Result<(), RegistryError> {
        let path = self.config_path(name);
        let entries = self.entries.read();
        let entry = entries
            .get(name)
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))?;
        entry.save(&self.codec, &path)
    }

    /// Load every registered config, in name order. Stops at the first
    /// failure.
    pub fn load_all(&self) -> Result<(), RegistryError> {
        for name in self.names() {
            self.load(&name)?;
        }
        Ok(())
    }

    /// Save every registered config, in name order.
    pub fn save_all(&self) -> Result<(), RegistryError> {
        for name in self.names() {
            self.save(&name)?;
        }
        Ok(())
    }

    /// Save only configs with unsaved edits.
    pub fn save_dirty(&self) -> Result<(), RegistryError> {
        for name in self.names() {
            let dirty = self
                .entries
                .read()
                .get(&name)
                .map(|entry| entry.is_dirty())
                .unwrap_or(false);
            if dirty {
                self.save(&name)?;
            }
        }
        Ok(())
    }

    /// Whether `name` is registered.
    pub fn is_registered(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Directory the registry persists into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a registered name. The codec extension is appended
    /// unless the name already carries it.
    pub fn config_path(&self, name: &str) -> PathBuf {
        let extension = self.codec.extension();
        if name.ends_with(extension) {
            self.root.join(name)
        } else {
            self.root.join(format!("{name}{extension}"))
        }
    }
}

/// Builder for [`ConfigRegistry`].
pub struct RegistryBuilder<C: Codec> {
    app: String,
    root: Option<PathBuf>,
    codec: C,
    policy: LoadPolicy,
}

impl<C: Codec> RegistryBuilder<C> {
    /// Override the root directory.
    pub fn root_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Swap in a different codec.
    pub fn codec<D: Codec>(self, codec: D) -> RegistryBuilder<D> {
        RegistryBuilder {
            app: self.app,
            root: self.root,
            codec,
            policy: self.policy,
        }
    }

    /// Set the load policy.
    pub fn policy(mut self, policy: LoadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the registry, resolving the default root if none was set.
    pub fn build(self) -> ConfigRegistry<C> {
        let root = self.root.unwrap_or_else(|| default_root(&self.app));
        ConfigRegistry {
            root,
            codec: self.codec,
            policy: self.policy,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

/// Platform config directory for `app`, falling back to `./<app>` when the
/// platform offers none.
fn default_root(app: &str) -> PathBuf {
    directories::ProjectDirs::from("", "", app)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(app))
}
