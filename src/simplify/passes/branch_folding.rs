//! Opaque-predicate resolution.
//!
//! Obfuscators insert branches whose guard is always true or always false to grow
//! the apparent control flow. The driver's fixed point already proved which guards
//! are constant; this pass rewrites those branches so the shape becomes explicit: a
//! branch resolving away from its fall-through becomes a `goto`, and a branch
//! resolving to its own fall-through becomes a `nop`. The no-longer-reachable
//! alternate subtree is left for [`DeadCodePass`](crate::simplify::passes::DeadCodePass)
//! to prune on the next pipeline iteration.

use crate::{
    simplify::{
        context::MethodContext,
        driver::FlowAnalysis,
        events::Event,
        op::{OpKind, Operation},
        passes::MethodPass,
    },
    Result,
};

/// Replaces conditional branches and switches with statically resolved guards by an
/// unconditional jump (or no-op) to the proven target.
pub struct BranchFoldingPass;

impl MethodPass for BranchFoldingPass {
    fn name(&self) -> &'static str {
        "branch-folding"
    }

    fn run(&self, ctx: &mut MethodContext, flow: &FlowAnalysis) -> Result<bool> {
        let mut changed = false;

        for (&address, &resolved) in &flow.resolved_branches {
            let Some(operation) = ctx.operation(address) else {
                continue;
            };

            // Only live conditionals are rewritten; a previous iteration may already
            // have replaced this address.
            if !matches!(
                operation.kind(),
                OpKind::If { .. } | OpKind::Switch { .. }
            ) {
                continue;
            }

            let size = operation.size();
            let fall_through = operation.fall_through();

            let replacement = if resolved == fall_through {
                ctx.events_mut().record(Event::BranchFolded { address });
                Operation::new(address, size, OpKind::Nop)
            } else {
                ctx.events_mut().record(Event::BranchResolved {
                    address,
                    target: resolved,
                });
                Operation::new(address, size, OpKind::Goto { target: resolved })
            };

            ctx.replace(address, replacement);
            changed = true;
        }

        Ok(changed)
    }

    fn description(&self) -> &'static str {
        "Replaces branches whose guard is provably constant with unconditional jumps"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bytecode::{DecodedInstruction, Literal, MethodBody, Opcode, Operand},
        simplify::{config::SimplifyConfig, driver},
    };

    fn folded_method() -> MethodBody {
        // 0: const v0, 1
        // 2: if-nez v0, :6   (always taken)
        // 4: nop             (becomes unreachable)
        // 5: nop
        // 6: return-void
        MethodBody::new(
            "m",
            1,
            vec![
                DecodedInstruction::modeled(
                    0,
                    2,
                    Opcode::Const,
                    Operand::Literal {
                        dest: 0,
                        value: Literal::Int(1),
                    },
                ),
                DecodedInstruction::modeled(
                    2,
                    2,
                    Opcode::IfNez,
                    Operand::Test {
                        left: 0,
                        right: None,
                        target: 6,
                    },
                ),
                DecodedInstruction::modeled(4, 1, Opcode::Nop, Operand::None),
                DecodedInstruction::modeled(5, 1, Opcode::Nop, Operand::None),
                DecodedInstruction::modeled(6, 1, Opcode::ReturnVoid, Operand::None),
            ],
        )
    }

    #[test]
    fn resolved_branch_becomes_goto() {
        let body = folded_method();
        let mut ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();
        let flow = driver::analyze(&mut ctx).unwrap();

        let changed = BranchFoldingPass.run(&mut ctx, &flow).unwrap();
        assert!(changed);

        match ctx.operation(2).unwrap().kind() {
            OpKind::Goto { target } => assert_eq!(*target, 6),
            other => panic!("Expected goto, got {:?}", other),
        }
        assert_eq!(ctx.operation(2).unwrap().size(), 2, "size must be preserved");
        assert_eq!(ctx.events().resolved_branches(), vec![2]);
    }

    #[test]
    fn branch_resolving_to_fall_through_becomes_nop() {
        // 0: const v0, 0
        // 2: if-nez v0, :5   (never taken)
        // 4: return-void
        // 5: return-void
        let body = MethodBody::new(
            "m",
            1,
            vec![
                DecodedInstruction::modeled(
                    0,
                    2,
                    Opcode::Const,
                    Operand::Literal {
                        dest: 0,
                        value: Literal::Int(0),
                    },
                ),
                DecodedInstruction::modeled(
                    2,
                    2,
                    Opcode::IfNez,
                    Operand::Test {
                        left: 0,
                        right: None,
                        target: 5,
                    },
                ),
                DecodedInstruction::modeled(4, 1, Opcode::ReturnVoid, Operand::None),
                DecodedInstruction::modeled(5, 1, Opcode::ReturnVoid, Operand::None),
            ],
        );
        let mut ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();
        let flow = driver::analyze(&mut ctx).unwrap();

        assert!(BranchFoldingPass.run(&mut ctx, &flow).unwrap());
        assert!(matches!(ctx.operation(2).unwrap().kind(), OpKind::Nop));
    }

    #[test]
    fn second_run_is_idempotent() {
        let body = folded_method();
        let mut ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();
        let flow = driver::analyze(&mut ctx).unwrap();

        assert!(BranchFoldingPass.run(&mut ctx, &flow).unwrap());

        // Re-analysis of the rewritten table resolves nothing further to rewrite.
        let flow = driver::analyze(&mut ctx).unwrap();
        assert!(!BranchFoldingPass.run(&mut ctx, &flow).unwrap());
    }

    #[test]
    fn unknown_guard_is_untouched() {
        let body = MethodBody::new(
            "m",
            1,
            vec![
                DecodedInstruction::modeled(
                    0,
                    2,
                    Opcode::IfNez,
                    Operand::Test {
                        left: 0,
                        right: None,
                        target: 3,
                    },
                ),
                DecodedInstruction::modeled(2, 1, Opcode::ReturnVoid, Operand::None),
                DecodedInstruction::modeled(3, 1, Opcode::ReturnVoid, Operand::None),
            ],
        );
        let mut ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();
        let flow = driver::analyze(&mut ctx).unwrap();

        assert!(!BranchFoldingPass.run(&mut ctx, &flow).unwrap());
        assert!(matches!(ctx.operation(0).unwrap().kind(), OpKind::If { .. }));
    }
}
