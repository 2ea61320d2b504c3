//! Configuration for the simplification pipeline.

/// Configuration for the simplification pipeline.
///
/// Controls the pipeline iteration bound, pass selection, and the policy for
/// instructions outside the modeled opcode set.
#[derive(Debug, Clone)]
pub struct SimplifyConfig {
    /// Maximum driver-and-passes iterations per method (default: 20).
    ///
    /// Each iteration runs the control-flow driver to a fixed point, then every
    /// enabled pass once. The pipeline stops early as soon as an iteration makes no
    /// change; the bound only matters as a backstop.
    pub max_iterations: usize,

    /// Abort a method with [`Error::UnsupportedOpcode`](crate::Error) instead of
    /// treating unmodeled instructions as opaque terminals (default: `false`).
    pub strict_unsupported: bool,

    /// Enable opaque-predicate resolution (default: `true`).
    pub enable_branch_folding: bool,

    /// Enable constant propagation folding (default: `true`).
    pub enable_constant_folding: bool,

    /// Enable unreachable-code removal (default: `true`).
    pub enable_dead_code_elimination: bool,

    /// Retain exception-handler entry addresses even when unreachable (default: `true`).
    ///
    /// Handler starts are referenced by the method's try/catch table, which lives
    /// outside the simplifier's view; removing them would break the container even
    /// when the driver proves them unreachable.
    pub retain_handler_targets: bool,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        SimplifyConfig {
            max_iterations: 20,
            strict_unsupported: false,
            enable_branch_folding: true,
            enable_constant_folding: true,
            enable_dead_code_elimination: true,
            retain_handler_targets: true,
        }
    }
}

impl SimplifyConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        SimplifyConfig::default()
    }

    /// A configuration with every rewriting pass disabled.
    ///
    /// The driver still runs, so reachability and resolved-branch information is
    /// still produced; the instruction stream is left untouched.
    #[must_use]
    pub fn analysis_only() -> Self {
        SimplifyConfig {
            enable_branch_folding: false,
            enable_constant_folding: false,
            enable_dead_code_elimination: false,
            ..SimplifyConfig::default()
        }
    }
}
