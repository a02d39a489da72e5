//! Switch protocol configuration.

use serde::{Deserialize, Serialize};

/// Switch protocol configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchingConfig {
    /// Delay in milliseconds before a queued switch is dispatched after the
    /// previous one completes. UX smoothing only, not a correctness knob.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Upper bound in seconds on a single plugin lifecycle hook. `0` disables
    /// the timeout.
    #[serde(default = "default_hook_timeout_secs")]
    pub hook_timeout_secs: u64,
    /// Fuel budget for a single wasm hook invocation.
    #[serde(default = "default_hook_fuel")]
    pub hook_fuel: u64,
}

impl Default for SwitchingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            hook_timeout_secs: default_hook_timeout_secs(),
            hook_fuel: default_hook_fuel(),
        }
    }
}

fn default_settle_delay_ms() -> u64 {
    100
}

fn default_hook_timeout_secs() -> u64 {
    30
}

fn default_hook_fuel() -> u64 {
    1_000_000_000
}
