//! Built-in simplification passes.
//!
//! Passes run after the control-flow driver converged and operate as pure
//! read/transform steps over the materialized [`FlowAnalysis`], rewriting the
//! context's live instruction table. The pipeline runs them in order and re-runs the
//! driver whenever a pass reports a change, until the whole method is stable.
//!
//! | Pass | Description |
//! |------|-------------|
//! | [`BranchFoldingPass`] | Replaces branches with statically resolved guards by unconditional jumps |
//! | [`ConstantFoldingPass`] | Replaces operations with fully-constant inputs by constant loads |
//! | [`DeadCodePass`] | Removes instructions the driver proved unreachable |
//!
//! Every pass is idempotent: applied to its own output it reports no change, which
//! is what lets the pipeline detect the fixed point.

mod branch_folding;
mod constant_folding;
mod dead_code;

pub use branch_folding::BranchFoldingPass;
pub use constant_folding::ConstantFoldingPass;
pub use dead_code::DeadCodePass;

use crate::{
    simplify::{context::MethodContext, driver::FlowAnalysis},
    Result,
};

/// A rewriting pass over one method's live instruction table.
///
/// Passes must be thread-safe (`Send + Sync`): the batch layer runs distinct
/// methods' pipelines on a worker pool, sharing the pass objects.
pub trait MethodPass: Send + Sync {
    /// Unique name for diagnostics.
    fn name(&self) -> &'static str;

    /// Runs the pass against the given traversal result.
    ///
    /// Returns `true` if any operation was rewritten or removed. Rewrites keep the
    /// address (and size) of the operation they replace; events are recorded on the
    /// context's event log.
    ///
    /// # Errors
    ///
    /// Returns an error if the pass cannot process the method.
    fn run(&self, ctx: &mut MethodContext, flow: &FlowAnalysis) -> Result<bool>;

    /// Get a description of what this pass does.
    fn description(&self) -> &'static str {
        "No description available"
    }
}
