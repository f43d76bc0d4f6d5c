//! Runtime configuration.

use sli_core::PoolConfig;

/// Interpreter configuration options.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Pause before every procedure step and consult the debug prompt.
    pub step_mode: bool,
    /// Drop a procedure frame before entering its last element.
    pub optimize_tail_recursion: bool,
    /// Growth policy of the per-type value pools.
    pub pools: PoolConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            step_mode: false,
            optimize_tail_recursion: true,
            pools: PoolConfig::default(),
        }
    }
}
