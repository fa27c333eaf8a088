//! Configuration file watcher for hot-reloading.
//!
//! Watches the configuration file and invokes a callback once per burst of
//! changes. The watch stops when the returned [`ConfigWatcher`] is dropped.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::constants::CONFIG_DEBOUNCE_MS;

/// Guard that keeps a configuration watch alive.
pub struct ConfigWatcher {
    path: PathBuf,
    _watcher: RecommendedWatcher,
}

impl ConfigWatcher {
    /// The file being watched.
    #[must_use]
    pub fn path(&self) -> &Path { &self.path }
}

impl std::fmt::Debug for ConfigWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigWatcher").field("path", &self.path).finish_non_exhaustive()
    }
}

/// Starts watching the configuration file at `path`.
///
/// `on_change` runs on a background thread after the file has been quiet for
/// the debounce window, so a save that produces several events triggers a
/// single call.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created or the file's parent
/// directory cannot be watched.
pub fn watch_config_file<F>(path: &Path, mut on_change: F) -> Result<ConfigWatcher, notify::Error>
where
    F: FnMut() + Send + 'static,
{
    let config_filename = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    let (tx, rx) = mpsc::channel();

    let mut watcher: RecommendedWatcher = notify::recommended_watcher(tx)?;

    // Watch the parent directory to catch file replacements
    // (some editors save by writing to a temp file then renaming)
    let watch_path = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(path);
    watcher.watch(watch_path, RecursiveMode::NonRecursive)?;

    let debounce = Duration::from_millis(CONFIG_DEBOUNCE_MS);
    let watched = path.to_path_buf();

    std::thread::spawn(move || {
        let mut pending = false;

        loop {
            let event = if pending {
                match rx.recv_timeout(debounce) {
                    Ok(event) => event,
                    Err(mpsc::RecvTimeoutError::Timeout) => {
                        pending = false;
                        tracing::debug!(path = %watched.display(), "configuration file changed");
                        on_change();
                        continue;
                    }
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            } else {
                match rx.recv() {
                    Ok(event) => event,
                    // Channel closed, watcher dropped
                    Err(_) => break,
                }
            };

            match event {
                Ok(event) => {
                    let affects_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().is_some_and(|name| name == config_filename));

                    if affects_config {
                        pending = true;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "config watch error");
                }
            }
        }

        tracing::trace!(path = %watched.display(), "config watcher stopped");
    });

    Ok(ConfigWatcher {
        path: path.to_path_buf(),
        _watcher: watcher,
    })
}
