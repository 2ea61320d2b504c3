//! The worklist-driven control-flow discovery fixed point.
//!
//! Seeds the worklist with the method's entry, executes each popped operation against
//! the context's working state, joins the resulting state into every successor's
//! recorded entry state, and re-enqueues an address exactly when its entry state
//! changed. The symbolic lattice has finite height per register and the address set
//! is finite, so the fixed point terminates for any input, backward branches
//! included.
//!
//! The result is a [`FlowAnalysis`]: the reachable-address set, the per-address
//! entry-state snapshots, the resolved-branch log, and the materialized control-flow
//! edge list the simplification passes operate on.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    simplify::{
        context::MethodContext,
        op::{Successor, SuccessorSet},
        state::RegisterState,
    },
    Result,
};

/// The accumulated result of one traversal: everything the simplification passes
/// need, materialized so they can run as pure read/transform steps.
#[derive(Debug, Clone)]
pub struct FlowAnalysis {
    /// Addresses reachable from the entry.
    pub reachable: BTreeSet<u32>,
    /// The symbolic state at the entry of each reachable address.
    pub entry_states: BTreeMap<u32, RegisterState>,
    /// Branch/switch addresses whose guard resolved constant, mapped to the single
    /// reachable successor address.
    pub resolved_branches: BTreeMap<u32, u32>,
    /// The discovered control-flow edges, keyed by source address.
    pub edges: BTreeMap<u32, Vec<Successor>>,
}

impl FlowAnalysis {
    /// Whether an address was reached by the traversal.
    #[must_use]
    pub fn is_reachable(&self, address: u32) -> bool {
        self.reachable.contains(&address)
    }
}

/// Runs the reachability fixed point over the context's live instruction table.
///
/// Any prior traversal state is discarded first, so the driver can be re-run after
/// the passes rewrote the table; the event log is preserved across runs.
///
/// # Errors
///
/// Returns [`Error::MalformedMethod`](crate::Error) when the entry address or a
/// discovered successor address has no entry in the instruction table.
pub fn analyze(ctx: &mut MethodContext) -> Result<FlowAnalysis> {
    ctx.reset_traversal();

    let entry = ctx.entry();
    if !ctx.contains(entry) {
        return Err(malformed_method!(
            "entry address {} is not in the instruction table",
            entry
        ));
    }

    let initial = RegisterState::new(ctx.register_count());
    ctx.merge_entry_state(entry, &initial);
    ctx.push_pending(entry);

    let mut edges: BTreeMap<u32, Vec<Successor>> = BTreeMap::new();

    while let Some(address) = ctx.pop_pending() {
        let operation = match ctx.operation(address) {
            Some(op) => op.clone(),
            None => {
                return Err(malformed_method!(
                    "no instruction at worklist address {}",
                    address
                ))
            }
        };

        let entry_state = ctx
            .entry_state(address)
            .cloned()
            .unwrap_or_else(|| RegisterState::new(ctx.register_count()));
        ctx.set_state(entry_state.clone());
        ctx.mark_visited(address);

        let successors = operation.execute(ctx);
        let post_state = ctx.state().clone();

        // Exception edges merge the pre/post join: the throw may have happened
        // before any of the operation's effects.
        let exception_state = if has_exception_edge(&successors) {
            let mut joined = entry_state;
            joined.join_with(&post_state);
            Some(joined)
        } else {
            None
        };

        for successor in successors.targets() {
            let (target, incoming) = match successor {
                Successor::Address(a) => (*a, &post_state),
                Successor::Exception(a) => match &exception_state {
                    Some(state) => (*a, state),
                    None => continue,
                },
                Successor::MethodExit => continue,
            };

            if !ctx.contains(target) {
                return Err(malformed_method!(
                    "successor address {} of instruction {} is outside the instruction table",
                    target,
                    address
                ));
            }

            if ctx.merge_entry_state(target, incoming) || !ctx.is_visited(target) {
                ctx.push_pending(target);
            }
        }

        edges.insert(address, successors.targets().to_vec());
    }

    Ok(FlowAnalysis {
        reachable: ctx.visited().clone(),
        entry_states: ctx.entry_states().clone(),
        resolved_branches: ctx.resolved_branches().clone(),
        edges,
    })
}

fn has_exception_edge(successors: &SuccessorSet) -> bool {
    successors
        .targets()
        .iter()
        .any(|s| matches!(s, Successor::Exception(_)))
}
