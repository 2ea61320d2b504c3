//! The simplification core: symbolic execution, control-flow discovery, and the
//! rewriting pipeline.
//!
//! # Architecture
//!
//! ```text
//! decoded instructions ──▶ Operation factory ──▶ instruction table
//!                                                      │
//!                                                      ▼
//!                              ┌──────── control-flow driver ────────┐
//!                              │  worklist fixed point over symbolic │
//!                              │  states; discovers reachability,    │
//!                              │  resolved branches, CFG edges       │
//!                              └────────────────┬────────────────────┘
//!                                               ▼
//!                              ┌──────── simplification passes ──────┐
//!                              │  branch folding → constant folding  │
//!                              │  → dead code removal                │
//!                              └────────────────┬────────────────────┘
//!                                               │ changed? rerun driver
//!                                               ▼
//!                              revised instructions + address map + events
//! ```
//!
//! [`Simplifier`] owns the loop: it runs the driver to a fixed point, applies the
//! enabled passes, and repeats until an iteration makes no change (bounded by
//! [`SimplifyConfig::max_iterations`]). The whole pipeline is idempotent: feeding a
//! simplified method back in yields it unchanged.
//!
//! # Example
//!
//! ```rust
//! use dexsimplify::{simplify_method, DecodedInstruction, MethodBody, Opcode, Operand};
//!
//! let body = MethodBody::new(
//!     "Lcom/example/Foo;->bar()V",
//!     1,
//!     vec![DecodedInstruction::modeled(0, 1, Opcode::ReturnVoid, Operand::None)],
//! );
//! let simplified = simplify_method(&body)?;
//! assert!(!simplified.changed);
//! # Ok::<(), dexsimplify::Error>(())
//! ```

mod batch;
mod config;
mod context;
mod driver;
mod events;
mod op;
pub mod passes;
mod result;
mod state;
mod value;

pub use batch::{simplify_methods, BatchReport, MethodOutcome};
pub use config::SimplifyConfig;
pub use context::MethodContext;
pub use driver::{analyze, FlowAnalysis};
pub use events::{Event, EventLog};
pub use op::{OpKind, Operation, Successor, SuccessorSet};
pub use result::{AddressMap, MethodSimplification};
pub use state::RegisterState;
pub use value::{ConstValue, SymbolicValue};

use crate::{bytecode::MethodBody, Result};
use passes::{BranchFoldingPass, ConstantFoldingPass, DeadCodePass, MethodPass};

/// The per-method simplification pipeline.
///
/// Holds the configuration and the enabled passes; one instance can be shared
/// across threads and reused for any number of methods.
pub struct Simplifier {
    config: SimplifyConfig,
    passes: Vec<Box<dyn MethodPass>>,
}

impl Simplifier {
    /// Creates a pipeline with the passes the configuration enables.
    #[must_use]
    pub fn new(config: SimplifyConfig) -> Self {
        let mut passes: Vec<Box<dyn MethodPass>> = Vec::new();
        if config.enable_branch_folding {
            passes.push(Box::new(BranchFoldingPass));
        }
        if config.enable_constant_folding {
            passes.push(Box::new(ConstantFoldingPass));
        }
        if config.enable_dead_code_elimination {
            passes.push(Box::new(DeadCodePass::new(config.retain_handler_targets)));
        }
        Simplifier { config, passes }
    }

    /// Creates a pipeline with the default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Simplifier::new(SimplifyConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SimplifyConfig {
        &self.config
    }

    /// Names of the enabled passes, in execution order.
    #[must_use]
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Simplifies one method.
    ///
    /// Runs driver and passes until stable, then emits the revised instruction
    /// list (original address domain), the renumbering map, the final reachable
    /// set, and the event log.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMethod`](crate::Error) when the instruction stream
    /// is structurally invalid, and [`Error::UnsupportedOpcode`](crate::Error) in
    /// strict mode for instructions outside the modeled set. On error the caller is
    /// expected to emit the method's original instructions unchanged.
    pub fn simplify(&self, body: &MethodBody) -> Result<MethodSimplification> {
        let mut ctx = MethodContext::new(body, &self.config)?;
        let mut changed_any = false;

        let mut flow = driver::analyze(&mut ctx)?;
        for _ in 0..self.config.max_iterations {
            let mut changed = false;
            for pass in &self.passes {
                if pass.run(&mut ctx, &flow)? {
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            changed_any = true;
            flow = driver::analyze(&mut ctx)?;
        }

        let address_map = AddressMap::from_surviving(
            ctx.addresses()
                .into_iter()
                .filter_map(|a| ctx.operation(a).map(|op| (a, op.size()))),
        );

        Ok(MethodSimplification {
            name: ctx.name().clone(),
            instructions: ctx.to_instructions(),
            address_map,
            reachable: flow.reachable,
            events: ctx.events().clone(),
            changed: changed_any,
        })
    }
}

/// Simplifies one method with the default configuration.
///
/// # Errors
///
/// See [`Simplifier::simplify`].
pub fn simplify_method(body: &MethodBody) -> Result<MethodSimplification> {
    Simplifier::with_defaults().simplify(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{DecodedInstruction, Literal, Opcode, Operand};

    fn const_int(address: u32, dest: u16, value: i32) -> DecodedInstruction {
        DecodedInstruction::modeled(
            address,
            2,
            Opcode::Const,
            Operand::Literal {
                dest,
                value: Literal::Int(value),
            },
        )
    }

    fn return_void(address: u32) -> DecodedInstruction {
        DecodedInstruction::modeled(address, 1, Opcode::ReturnVoid, Operand::None)
    }

    #[test]
    fn default_pipeline_enables_all_passes() {
        let simplifier = Simplifier::with_defaults();
        assert_eq!(
            simplifier.pass_names(),
            vec!["branch-folding", "constant-folding", "dead-code"]
        );
    }

    #[test]
    fn trivial_method_is_unchanged() {
        let body = MethodBody::new("m", 1, vec![return_void(0)]);
        let simplified = simplify_method(&body).unwrap();

        assert!(!simplified.changed);
        assert_eq!(simplified.instructions, body.instructions);
        assert!(simplified.address_map.is_identity());
    }

    #[test]
    fn opaque_predicate_collapses_to_goto_and_prunes() {
        // 0: const v0, 1
        // 2: if-nez v0, :6   (opaque: always taken)
        // 4: nop
        // 5: nop
        // 6: return-void
        let body = MethodBody::new(
            "m",
            1,
            vec![
                const_int(0, 0, 1),
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
                return_void(6),
            ],
        );
        let simplified = Simplifier::with_defaults().simplify(&body).unwrap();

        assert!(simplified.changed);
        let mnemonics: Vec<&str> = simplified
            .instructions
            .iter()
            .map(|i| i.opcode.mnemonic())
            .collect();
        assert_eq!(mnemonics, vec!["const", "goto", "return-void"]);
        // 2 code units were removed ahead of the return at 6.
        assert_eq!(simplified.address_map.renumbered(6), Some(4));
    }

    #[test]
    fn pipeline_is_idempotent() {
        let body = MethodBody::new(
            "m",
            2,
            vec![
                const_int(0, 0, 5),
                const_int(2, 1, 5),
                DecodedInstruction::modeled(
                    4,
                    2,
                    Opcode::IfEq,
                    Operand::Test {
                        left: 0,
                        right: Some(1),
                        target: 8,
                    },
                ),
                DecodedInstruction::modeled(6, 1, Opcode::Nop, Operand::None),
                return_void(7),
                return_void(8),
            ],
        );
        let first = Simplifier::with_defaults().simplify(&body).unwrap();
        assert!(first.changed);

        let again = MethodBody::new("m", 2, first.instructions.clone());
        let second = Simplifier::with_defaults().simplify(&again).unwrap();

        assert!(!second.changed);
        assert_eq!(second.instructions, first.instructions);
    }

    #[test]
    fn analysis_only_config_never_rewrites() {
        let body = MethodBody::new(
            "m",
            1,
            vec![
                const_int(0, 0, 1),
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
                return_void(6),
            ],
        );
        let simplifier = Simplifier::new(SimplifyConfig::analysis_only());
        let simplified = simplifier.simplify(&body).unwrap();

        assert!(!simplified.changed);
        assert_eq!(simplified.instructions, body.instructions);
        // The analysis still proves the branch and the dead tail.
        assert!(!simplified.reachable.contains(&4));
    }
}
