//! Constant propagation folding.
//!
//! Arithmetic, comparison and move operations whose inputs are fully constant in the
//! recorded entry state compute the same value on every execution; this pass replaces
//! them with a direct constant load of that value. The destination register of the
//! replacement is the destination of the original, so the set of registers defined at
//! every point is preserved.
//!
//! Folding re-executes the candidate against its recorded entry state and only
//! rewrites when the execution has a single fall-through successor: an operation that
//! keeps an exception edge (an unfoldable division, a throwing load) is left alone,
//! since a constant load could erase a reachable handler edge.

use crate::{
    simplify::{
        context::MethodContext,
        driver::FlowAnalysis,
        events::Event,
        op::{OpKind, Operation, SuccessorSet},
        passes::MethodPass,
        value::ConstValue,
    },
    Result,
};

/// Replaces operations with fully-constant inputs by constant-materializing loads.
pub struct ConstantFoldingPass;

impl ConstantFoldingPass {
    /// The destination register of a foldable operation kind.
    fn fold_destination(kind: &OpKind) -> Option<u16> {
        match kind {
            OpKind::Move { dest, .. }
            | OpKind::Cmp { dest, .. }
            | OpKind::UnaryMath { dest, .. }
            | OpKind::BinaryMath { dest, .. } => Some(*dest),
            _ => None,
        }
    }
}

impl MethodPass for ConstantFoldingPass {
    fn name(&self) -> &'static str {
        "constant-folding"
    }

    fn run(&self, ctx: &mut MethodContext, flow: &FlowAnalysis) -> Result<bool> {
        let mut changed = false;

        for &address in &flow.reachable {
            let Some(operation) = ctx.operation(address) else {
                continue;
            };
            let Some(dest) = Self::fold_destination(operation.kind()) else {
                continue;
            };
            let Some(entry_state) = flow.entry_states.get(&address) else {
                continue;
            };

            // Re-execute against the recorded entry state; the working state is
            // scratch here, the next driver run resets it anyway.
            let operation = operation.clone();
            ctx.set_state(entry_state.clone());
            let successors = operation.execute(ctx);

            if successors != SuccessorSet::one(operation.fall_through()) {
                continue;
            }
            let Some(value) = ctx.read(dest).as_const().cloned() else {
                continue;
            };
            // Strings and classes re-trigger resolution when materialized, which
            // would add an exception edge the original move did not have.
            if matches!(value, ConstValue::String(_) | ConstValue::Class(_)) {
                continue;
            }

            ctx.replace(
                address,
                Operation::new(address, operation.size(), OpKind::Const { dest, value }),
            );
            ctx.events_mut().record(Event::InstructionFolded { address });
            changed = true;
        }

        Ok(changed)
    }

    fn description(&self) -> &'static str {
        "Replaces operations whose inputs are provably constant with constant loads"
    }
}
