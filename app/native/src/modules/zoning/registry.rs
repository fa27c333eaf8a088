//! Zone registry: the settings collaborator.
//!
//! The registry owns the zone list and feature flags. The engine only ever
//! reads whole [`ZoneSettings`] snapshots and is told which setting changed
//! through keyed subscriptions; it never patches settings in place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::actor::{EngineHandle, EngineMessage};
use super::compositor::SubscriptionId;
use super::zone::Zone;
use crate::config::{self, ConfigWatcher, TimingConfig, ZoneSnapConfig};

// ============================================================================
// Setting Keys
// ============================================================================

/// Names of the settings the engine can subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    /// The zone list.
    Zones,
    /// Global zoning toggle.
    ZoningEnabled,
    /// Restore pre-snap geometry when leaving all zones.
    RestoreOnUntile,
    /// Auto-tile newly created windows.
    TileNewWindows,
    /// Hover highlight while dragging.
    HighlightOnHover,
    /// Settle delay and highlight interval.
    Timing,
}

impl SettingKey {
    /// Every key, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Zones,
        Self::ZoningEnabled,
        Self::RestoreOnUntile,
        Self::TileNewWindows,
        Self::HighlightOnHover,
        Self::Timing,
    ];

    /// Returns the key name as it appears in the configuration file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zones => "zones",
            Self::ZoningEnabled => "enabled",
            Self::RestoreOnUntile => "restoreOnUntile",
            Self::TileNewWindows => "tileNewWindows",
            Self::HighlightOnHover => "highlightOnHover",
            Self::Timing => "timing",
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.as_str()) }
}

// ============================================================================
// Settings Snapshot
// ============================================================================

/// A fully-formed snapshot of every setting the engine reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneSettings {
    /// Zones in priority order. Shared, so snapshots are cheap to clone.
    pub zones: Arc<[Zone]>,
    /// Global zoning toggle.
    pub zoning_enabled: bool,
    /// Restore pre-snap geometry when leaving all zones.
    pub restore_on_untile: bool,
    /// Auto-tile newly created windows.
    pub tile_new_windows: bool,
    /// Hover highlight while dragging.
    pub highlight_on_hover: bool,
    /// Timer settings.
    pub timing: TimingConfig,
}

impl Default for ZoneSettings {
    fn default() -> Self { Self::from(&ZoneSnapConfig::default()) }
}

impl From<&ZoneSnapConfig> for ZoneSettings {
    fn from(config: &ZoneSnapConfig) -> Self {
        Self {
            zones: config.zones.as_slice().into(),
            zoning_enabled: config.enabled,
            restore_on_untile: config.restore_on_untile,
            tile_new_windows: config.tile_new_windows,
            highlight_on_hover: config.highlight_on_hover,
            timing: config.timing,
        }
    }
}

impl ZoneSettings {
    /// Create settings with default flags and the given zones.
    #[must_use]
    pub fn with_zones(zones: Vec<Zone>) -> Self {
        Self {
            zones: zones.into(),
            ..Self::default()
        }
    }

    /// Keys whose values differ between `self` and `other`.
    #[must_use]
    pub fn changed_keys(&self, other: &Self) -> Vec<SettingKey> {
        SettingKey::ALL
            .into_iter()
            .filter(|key| match key {
                SettingKey::Zones => self.zones != other.zones,
                SettingKey::ZoningEnabled => self.zoning_enabled != other.zoning_enabled,
                SettingKey::RestoreOnUntile => self.restore_on_untile != other.restore_on_untile,
                SettingKey::TileNewWindows => self.tile_new_windows != other.tile_new_windows,
                SettingKey::HighlightOnHover => self.highlight_on_hover != other.highlight_on_hover,
                SettingKey::Timing => self.timing != other.timing,
            })
            .collect()
    }
}

// ============================================================================
// Registry Trait
// ============================================================================

/// Errors reported by a registry implementation.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The subscription token is unknown or was already released.
    #[error("unknown setting subscription {0:?}")]
    UnknownSubscription(SubscriptionId),
}

/// Source of zone settings and their change notifications.
pub trait ZoneRegistry {
    /// Current settings, as one consistent snapshot.
    fn snapshot(&self) -> ZoneSettings;

    /// Subscribe to changes of `key`.
    ///
    /// # Errors
    ///
    /// Implementations may refuse a subscription.
    fn subscribe(&mut self, key: SettingKey) -> Result<SubscriptionId, RegistryError>;

    /// Release a subscription.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownSubscription`] for stale tokens.
    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), RegistryError>;

    /// The zone list.
    fn zones(&self) -> Arc<[Zone]> { self.snapshot().zones }

    /// Whether zoning is enabled.
    fn zoning_enabled(&self) -> bool { self.snapshot().zoning_enabled }
}

/// Keyed subscription bookkeeping shared by the registry implementations.
#[derive(Debug, Default)]
struct Subscriptions {
    next_id: u64,
    keys: BTreeMap<SubscriptionId, SettingKey>,
}

impl Subscriptions {
    fn add(&mut self, key: SettingKey) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.keys.insert(id, key);
        id
    }

    fn remove(&mut self, id: SubscriptionId) -> Result<(), RegistryError> {
        self.keys.remove(&id).map(|_| ()).ok_or(RegistryError::UnknownSubscription(id))
    }

    fn is_subscribed(&self, key: SettingKey) -> bool { self.keys.values().any(|k| *k == key) }

    /// Keep only the keys someone subscribed to.
    fn filter(&self, keys: Vec<SettingKey>) -> Vec<SettingKey> {
        keys.into_iter().filter(|key| self.is_subscribed(*key)).collect()
    }

    fn len(&self) -> usize { self.keys.len() }
}

// ============================================================================
// Static Registry
// ============================================================================

/// In-memory registry. Changes are made with [`StaticRegistry::set`].
#[derive(Debug, Default)]
pub struct StaticRegistry {
    settings: ZoneSettings,
    subscriptions: Subscriptions,
}

impl StaticRegistry {
    /// Create a registry holding `settings`.
    #[must_use]
    pub fn new(settings: ZoneSettings) -> Self {
        Self {
            settings,
            subscriptions: Subscriptions::default(),
        }
    }

    /// Replace the settings wholesale.
    ///
    /// Returns the changed keys that have at least one subscriber; the caller
    /// delivers them to the engine.
    pub fn set(&mut self, settings: ZoneSettings) -> Vec<SettingKey> {
        let changed = self.settings.changed_keys(&settings);
        self.settings = settings;
        self.subscriptions.filter(changed)
    }

    /// Apply `update` to a copy of the settings and store the result.
    pub fn update(&mut self, update: impl FnOnce(&mut ZoneSettings)) -> Vec<SettingKey> {
        let mut settings = self.settings.clone();
        update(&mut settings);
        self.set(settings)
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize { self.subscriptions.len() }
}

impl ZoneRegistry for StaticRegistry {
    fn snapshot(&self) -> ZoneSettings { self.settings.clone() }

    fn subscribe(&mut self, key: SettingKey) -> Result<SubscriptionId, RegistryError> {
        Ok(self.subscriptions.add(key))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), RegistryError> {
        self.subscriptions.remove(id)
    }
}

// ============================================================================
// Config Registry
// ============================================================================

/// Registry backed by the JSONC configuration file.
///
/// Cloning is cheap; clones share the same settings and subscriptions, so the
/// file watcher thread can reload while the engine keeps its own handle.
#[derive(Clone, Debug)]
pub struct ConfigRegistry {
    path: Option<PathBuf>,
    settings: Arc<RwLock<ZoneSettings>>,
    subscriptions: Arc<Mutex<Subscriptions>>,
}

impl ConfigRegistry {
    /// Create a registry from an already-loaded configuration.
    #[must_use]
    pub fn new(config: &ZoneSnapConfig, path: Option<PathBuf>) -> Self {
        Self {
            path,
            settings: Arc::new(RwLock::new(ZoneSettings::from(config))),
            subscriptions: Arc::new(Mutex::new(Subscriptions::default())),
        }
    }

    /// Load the configuration from `custom_path` or the default locations.
    ///
    /// Missing or invalid files fall back to defaults.
    #[must_use]
    pub fn load(custom_path: Option<&Path>) -> Self {
        let (config, path) = config::load_or_default(custom_path);
        Self::new(&config, path)
    }

    /// The file backing this registry, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    /// Re-read the configuration file and swap in the new settings.
    ///
    /// A file that fails to parse keeps the current settings. Returns the
    /// changed keys that have at least one subscriber.
    pub fn reload(&self) -> Vec<SettingKey> {
        let Some(path) = self.path.as_deref() else {
            return Vec::new();
        };

        let next = match config::load_config_from_path(path) {
            Ok((config, _)) => ZoneSettings::from(&config),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "keeping previous settings");
                return Vec::new();
            }
        };

        let changed = {
            let mut settings = self.settings.write();
            let changed = settings.changed_keys(&next);
            *settings = next;
            changed
        };

        self.subscriptions.lock().filter(changed)
    }

    /// Watch the backing file and forward changed keys to the engine.
    ///
    /// Returns `None` when there is no file to watch or watching fails.
    #[must_use]
    pub fn watch(&self, handle: EngineHandle) -> Option<ConfigWatcher> {
        let path = self.path.clone()?;
        let registry = self.clone();

        let result = config::watch_config_file(&path, move || {
            for key in registry.reload() {
                tracing::info!(setting = %key, "setting changed");
                if let Err(err) = handle.send(EngineMessage::SettingChanged(key)) {
                    tracing::warn!(setting = %key, error = %err, "cannot notify engine");
                }
            }
        });

        match result {
            Ok(watcher) => Some(watcher),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to watch configuration");
                None
            }
        }
    }
}

impl ZoneRegistry for ConfigRegistry {
    fn snapshot(&self) -> ZoneSettings { self.settings.read().clone() }

    fn subscribe(&mut self, key: SettingKey) -> Result<SubscriptionId, RegistryError> {
        Ok(self.subscriptions.lock().add(key))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> Result<(), RegistryError> {
        self.subscriptions.lock().remove(id)
    }
}

// ============================================================================
// Tests
// ============================================================================
