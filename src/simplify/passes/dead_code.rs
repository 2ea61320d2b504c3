//! Unreachable-code removal.
//!
//! Every address the driver never visited is provably unreachable from the entry
//! under the current instruction table and is dropped from the emitted list. The one
//! exception is handler entry addresses: the try/catch table referencing them lives
//! outside the simplifier's view, so they are conservatively retained (configurable).

use std::collections::BTreeSet;

use crate::{
    simplify::{context::MethodContext, driver::FlowAnalysis, events::Event, passes::MethodPass},
    Result,
};

/// Removes instructions the driver proved unreachable.
pub struct DeadCodePass {
    retain_handler_targets: bool,
}

impl DeadCodePass {
    /// Creates the pass.
    ///
    /// With `retain_handler_targets` set, declared exception-handler entry addresses
    /// survive even when unreachable.
    #[must_use]
    pub fn new(retain_handler_targets: bool) -> Self {
        DeadCodePass {
            retain_handler_targets,
        }
    }
}

impl MethodPass for DeadCodePass {
    fn name(&self) -> &'static str {
        "dead-code"
    }

    fn run(&self, ctx: &mut MethodContext, flow: &FlowAnalysis) -> Result<bool> {
        let retained: BTreeSet<u32> = if self.retain_handler_targets {
            ctx.handler_addresses()
        } else {
            BTreeSet::new()
        };

        let dead: Vec<u32> = ctx
            .addresses()
            .into_iter()
            .filter(|address| !flow.is_reachable(*address) && !retained.contains(address))
            .collect();

        let changed = !dead.is_empty();
        for address in dead {
            ctx.remove(address);
            ctx.events_mut()
                .record(Event::UnreachableRemoved { address });
        }

        Ok(changed)
    }

    fn description(&self) -> &'static str {
        "Removes instructions that are unreachable from the method entry"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bytecode::{DecodedInstruction, MethodBody, Opcode, Operand, TryBlock},
        simplify::{config::SimplifyConfig, driver},
    };

    fn return_void(address: u32) -> DecodedInstruction {
        DecodedInstruction::modeled(address, 1, Opcode::ReturnVoid, Operand::None)
    }

    fn goto_over_dead_tail() -> MethodBody {
        // 0: goto :3
        // 1: nop          (dead)
        // 2: nop          (dead)
        // 3: return-void
        MethodBody::new(
            "m",
            1,
            vec![
                DecodedInstruction::modeled(0, 1, Opcode::Goto, Operand::Target { address: 3 }),
                DecodedInstruction::modeled(1, 1, Opcode::Nop, Operand::None),
                DecodedInstruction::modeled(2, 1, Opcode::Nop, Operand::None),
                return_void(3),
            ],
        )
    }

    #[test]
    fn unreachable_instructions_are_removed() {
        let body = goto_over_dead_tail();
        let mut ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();
        let flow = driver::analyze(&mut ctx).unwrap();

        assert!(DeadCodePass::new(true).run(&mut ctx, &flow).unwrap());

        assert_eq!(ctx.addresses(), vec![0, 3]);
        assert_eq!(ctx.events().removed_addresses(), vec![1, 2]);
    }

    #[test]
    fn second_run_removes_nothing() {
        let body = goto_over_dead_tail();
        let mut ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();
        let flow = driver::analyze(&mut ctx).unwrap();

        assert!(DeadCodePass::new(true).run(&mut ctx, &flow).unwrap());

        let flow = driver::analyze(&mut ctx).unwrap();
        assert!(!DeadCodePass::new(true).run(&mut ctx, &flow).unwrap());
    }

    #[test]
    fn unreachable_handler_entry_is_retained() {
        // The handler at 2 is unreachable (nothing in the try range throws), but the
        // try/catch table still references it.
        let body = MethodBody::new(
            "m",
            1,
            vec![
                DecodedInstruction::modeled(0, 1, Opcode::Nop, Operand::None),
                return_void(1),
                return_void(2),
            ],
        )
        .with_try_block(TryBlock::new(0, 1, vec![2]));
        let mut ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();
        let flow = driver::analyze(&mut ctx).unwrap();
        assert!(!flow.is_reachable(2));

        assert!(!DeadCodePass::new(true).run(&mut ctx, &flow).unwrap());
        assert!(ctx.contains(2));
    }

    #[test]
    fn handler_retention_can_be_disabled() {
        let body = MethodBody::new(
            "m",
            1,
            vec![
                DecodedInstruction::modeled(0, 1, Opcode::Nop, Operand::None),
                return_void(1),
                return_void(2),
            ],
        )
        .with_try_block(TryBlock::new(0, 1, vec![2]));
        let mut ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();
        let flow = driver::analyze(&mut ctx).unwrap();

        assert!(DeadCodePass::new(false).run(&mut ctx, &flow).unwrap());
        assert!(!ctx.contains(2));
    }
}
