//! Application-wide constants.

/// Application name used in logs and CLI output.
pub const APP_NAME: &str = "zonesnap";

/// Directory name used under the user's config directories.
pub const APP_DIR_NAME: &str = "zonesnap";

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV_VAR: &str = "ZONESNAP_LOG";

/// Debounce window for configuration file change events, in milliseconds.
///
/// Some editors emit several events per save (write to temp, rename, chmod).
pub const CONFIG_DEBOUNCE_MS: u64 = 200;

/// Channel buffer size for the engine actor.
pub const CHANNEL_BUFFER_SIZE: usize = 256;

// ============================================================================
// Timing
// ============================================================================

/// Default wait before tiling a newly created window.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 100;

/// Upper bound for the settle delay.
pub const MAX_SETTLE_DELAY_MS: u64 = 5000;

/// Default re-arm interval of the hover highlight poll.
pub const DEFAULT_HIGHLIGHT_INTERVAL_MS: u64 = 50;

/// Lower bound for the highlight poll interval.
pub const MIN_HIGHLIGHT_INTERVAL_MS: u64 = 10;

/// Upper bound for the highlight poll interval.
pub const MAX_HIGHLIGHT_INTERVAL_MS: u64 = 1000;
