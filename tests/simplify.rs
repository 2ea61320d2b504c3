//! End-to-end simplification pipeline tests with exact instruction verification.
//!
//! All tests follow the same pattern:
//! 1. Build a decoded method body by hand
//! 2. Run the full pipeline (driver fixed point + passes until stable)
//! 3. Verify the exact emitted instruction sequence, address map and events

use dexsimplify::{
    simplify_method, DecodedInstruction, Error, Literal, MethodBody, Opcode, Operand, Simplifier,
    SimplifyConfig, TryBlock,
};

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

fn nop(address: u32) -> DecodedInstruction {
    DecodedInstruction::modeled(address, 1, Opcode::Nop, Operand::None)
}

fn return_void(address: u32) -> DecodedInstruction {
    DecodedInstruction::modeled(address, 1, Opcode::ReturnVoid, Operand::None)
}

fn if_nez(address: u32, reg: u16, target: u32) -> DecodedInstruction {
    DecodedInstruction::modeled(
        address,
        2,
        Opcode::IfNez,
        Operand::Test {
            left: reg,
            right: None,
            target,
        },
    )
}

fn mnemonics(instructions: &[DecodedInstruction]) -> Vec<&str> {
    instructions.iter().map(|i| i.opcode.mnemonic()).collect()
}

#[test]
fn return_only_method_is_unchanged() {
    // A method consisting solely of a return at address 0.
    let body = MethodBody::new("m", 1, vec![return_void(0)]);

    let simplified = simplify_method(&body).unwrap();

    assert!(!simplified.changed);
    assert_eq!(simplified.instructions, body.instructions);
    assert_eq!(
        simplified.reachable.iter().copied().collect::<Vec<_>>(),
        vec![0]
    );
    assert!(simplified.events.resolved_branches().is_empty());
}

#[test]
fn constant_true_branch_is_resolved_and_untaken_side_pruned() {
    // 0: const v0, 1
    // 2: const v1, 0
    // 4: if-nez v0, :10   guard is compile-time true
    // 6: nop              fall-through side, exclusively reachable from the branch
    // 7: nop
    // 8: nop
    // 9: nop
    // 10: return-void
    let body = MethodBody::new(
        "m",
        2,
        vec![
            const_int(0, 0, 1),
            const_int(2, 1, 0),
            if_nez(4, 0, 10),
            nop(6),
            nop(7),
            nop(8),
            nop(9),
            return_void(10),
        ],
    );

    let simplified = simplify_method(&body).unwrap();

    assert!(simplified.changed);
    assert_eq!(
        mnemonics(&simplified.instructions),
        vec!["const", "const", "goto", "return-void"]
    );

    // Address 4 became a goto to 10; the jump target is preserved.
    let goto = &simplified.instructions[2];
    assert_eq!(goto.address, 4);
    assert_eq!(goto.operand, Operand::Target { address: 10 });

    // The branch resolution and every removed address are on the record.
    assert_eq!(simplified.events.resolved_branches(), vec![4]);
    assert_eq!(simplified.events.removed_addresses(), vec![6, 7, 8, 9]);

    // Four code units vanished ahead of the return.
    assert_eq!(simplified.address_map.renumbered(10), Some(6));
    assert_eq!(simplified.address_map.renumbered(6), None);
}

#[test]
fn unknown_guard_retains_both_successors() {
    // v0 is a parameter; the branch must keep both sides.
    let body = MethodBody::new(
        "m",
        1,
        vec![if_nez(0, 0, 3), return_void(2), return_void(3)],
    );

    let simplified = simplify_method(&body).unwrap();

    assert!(!simplified.changed);
    assert_eq!(
        mnemonics(&simplified.instructions),
        vec!["if-nez", "return-void", "return-void"]
    );
    assert!(simplified.reachable.contains(&2));
    assert!(simplified.reachable.contains(&3));
}

#[test]
fn unsupported_opcode_is_recorded_and_the_rest_still_simplifies() {
    // 0: nop
    // 1: <unmodeled odex opcode>
    // 3: const v0, 3
    // 5: const v1, 4
    // 7: add-int v2, v0, v1
    // 9: return-void
    let body = MethodBody::new(
        "m",
        3,
        vec![
            nop(0),
            DecodedInstruction::unmodeled(1, 2, "execute-inline", Operand::None),
            const_int(3, 0, 3),
            const_int(5, 1, 4),
            DecodedInstruction::modeled(
                7,
                2,
                Opcode::AddInt,
                Operand::Ternary {
                    dest: 2,
                    left: 0,
                    right: 1,
                },
            ),
            return_void(9),
        ],
    );

    let simplified = simplify_method(&body).unwrap();

    // The occurrence is reported exactly once.
    let unsupported = simplified.events.unsupported_opcodes();
    assert_eq!(unsupported.len(), 1);
    assert_eq!(unsupported[0].0, 1);
    assert_eq!(&*unsupported[0].1, "execute-inline");

    // The unmodeled instruction is passed through verbatim, and the constant
    // addition behind it still folded.
    assert_eq!(
        mnemonics(&simplified.instructions),
        vec!["nop", "execute-inline", "const", "const", "const", "return-void"]
    );
    assert_eq!(
        simplified.instructions[4].operand,
        Operand::Literal {
            dest: 2,
            value: Literal::Int(7),
        }
    );
}

#[test]
fn strict_mode_aborts_on_unsupported_opcode() {
    let body = MethodBody::new(
        "m",
        1,
        vec![
            DecodedInstruction::unmodeled(0, 1, "execute-inline", Operand::None),
            return_void(1),
        ],
    );
    let config = SimplifyConfig {
        strict_unsupported: true,
        ..SimplifyConfig::default()
    };

    let result = Simplifier::new(config).simplify(&body);
    assert!(matches!(
        result,
        Err(Error::UnsupportedOpcode { address: 0, .. })
    ));
}

#[test]
fn fixed_point_terminates_on_backward_branches() {
    // A loop whose counter stays unknown:
    // 0: if-eqz v0, :7
    // 2: add-int v1, v1, v0
    // 4: const v2, 1
    // 6: goto :0
    // 7: return-void
    let body = MethodBody::new(
        "m",
        3,
        vec![
            DecodedInstruction::modeled(
                0,
                2,
                Opcode::IfEqz,
                Operand::Test {
                    left: 0,
                    right: None,
                    target: 7,
                },
            ),
            DecodedInstruction::modeled(
                2,
                2,
                Opcode::AddInt,
                Operand::Ternary {
                    dest: 1,
                    left: 1,
                    right: 0,
                },
            ),
            const_int(4, 2, 1),
            DecodedInstruction::modeled(6, 1, Opcode::Goto, Operand::Target { address: 0 }),
            return_void(7),
        ],
    );

    let simplified = simplify_method(&body).unwrap();

    // Every address of the loop is reachable and nothing was removed.
    assert_eq!(simplified.instructions.len(), 5);
    assert!(simplified.reachable.contains(&0));
    assert!(simplified.reachable.contains(&7));
}

#[test]
fn pruning_is_sound_against_the_original_semantics() {
    let body = MethodBody::new(
        "m",
        2,
        vec![
            const_int(0, 0, 1),
            if_nez(2, 0, 8),
            nop(4),
            nop(5),
            DecodedInstruction::modeled(6, 1, Opcode::Goto, Operand::Target { address: 8 }),
            nop(7),
            return_void(8),
        ],
    );

    let simplified = simplify_method(&body).unwrap();
    let removed = simplified.events.removed_addresses();
    assert!(!removed.is_empty());

    // Re-run the driver over the original, unsimplified sequence: no removed
    // address may appear in its visited set.
    let analysis = Simplifier::new(SimplifyConfig::analysis_only())
        .simplify(&body)
        .unwrap();
    for address in removed {
        assert!(
            !analysis.reachable.contains(&address),
            "address {} was removed but is reachable under original semantics",
            address
        );
    }
}

#[test]
fn full_pipeline_is_idempotent() {
    let body = MethodBody::new(
        "m",
        3,
        vec![
            const_int(0, 0, 20),
            const_int(2, 1, 22),
            DecodedInstruction::modeled(
                4,
                2,
                Opcode::AddInt,
                Operand::Ternary {
                    dest: 2,
                    left: 0,
                    right: 1,
                },
            ),
            DecodedInstruction::modeled(
                6,
                2,
                Opcode::IfEqz,
                Operand::Test {
                    left: 2,
                    right: None,
                    target: 10,
                },
            ),
            return_void(8),
            nop(9),
            return_void(10),
        ],
    );

    let first = simplify_method(&body).unwrap();
    assert!(first.changed);

    let again = MethodBody::new("m", 3, first.instructions.clone());
    let second = simplify_method(&again).unwrap();

    assert!(!second.changed, "second run must be a no-op");
    assert_eq!(second.instructions, first.instructions);
    assert!(second.events.resolved_branches().is_empty());
    assert!(second.events.removed_addresses().is_empty());
}

#[test]
fn exception_handler_stays_reachable_through_throwing_division() {
    // 0: const v0, 7
    // 2: div-int v2, v0, v1   divisor unknown, may throw
    // 4: return-void
    // 5: move-exception v2    handler
    // 6: return-void
    let body = MethodBody::new(
        "m",
        3,
        vec![
            const_int(0, 0, 7),
            DecodedInstruction::modeled(
                2,
                2,
                Opcode::DivInt,
                Operand::Ternary {
                    dest: 2,
                    left: 0,
                    right: 1,
                },
            ),
            return_void(4),
            DecodedInstruction::modeled(5, 1, Opcode::MoveException, Operand::Unary { reg: 2 }),
            return_void(6),
        ],
    )
    .with_try_block(TryBlock::new(2, 4, vec![5]));

    let simplified = simplify_method(&body).unwrap();

    assert!(simplified.reachable.contains(&5));
    assert!(simplified.reachable.contains(&6));
    assert_eq!(simplified.instructions.len(), 5);
}

#[test]
fn unreachable_handler_entry_is_conservatively_retained() {
    // Nothing in the try range can throw, so the handler is unreachable; the
    // try/catch table outside the simplifier's view still references it.
    let body = MethodBody::new(
        "m",
        1,
        vec![nop(0), return_void(1), return_void(2)],
    )
    .with_try_block(TryBlock::new(0, 1, vec![2]));

    let simplified = simplify_method(&body).unwrap();

    assert!(!simplified.reachable.contains(&2));
    assert_eq!(simplified.instructions.len(), 3, "handler must be retained");
    assert!(simplified.events.removed_addresses().is_empty());
}

#[test]
fn switch_with_constant_selector_collapses() {
    // 0: const v0, 7
    // 2: sparse-switch v0, {1: 6, 7: 8}
    // 5: return-void       fall-through, unreachable
    // 6: return-void       case 1, unreachable
    // 8: return-void       case 7, the resolved target
    let body = MethodBody::new(
        "m",
        1,
        vec![
            const_int(0, 0, 7),
            DecodedInstruction::modeled(
                2,
                3,
                Opcode::SparseSwitch,
                Operand::Table {
                    selector: 0,
                    cases: vec![(1, 6), (7, 8)],
                },
            ),
            return_void(5),
            return_void(6),
            return_void(8),
        ],
    );

    let simplified = simplify_method(&body).unwrap();

    assert_eq!(
        mnemonics(&simplified.instructions),
        vec!["const", "goto", "return-void"]
    );
    assert_eq!(
        simplified.instructions[1].operand,
        Operand::Target { address: 8 }
    );
    assert_eq!(simplified.events.removed_addresses(), vec![5, 6]);
}

#[test]
fn malformed_branch_target_fails_the_method() {
    let body = MethodBody::new(
        "m",
        1,
        vec![
            DecodedInstruction::modeled(0, 1, Opcode::Goto, Operand::Target { address: 64 }),
            return_void(1),
        ],
    );

    let result = simplify_method(&body);
    assert!(matches!(result, Err(Error::MalformedMethod { .. })));
}

#[test]
fn wide_constants_fold_through_long_arithmetic() {
    // 0: const-wide v0, 40
    // 3: const-wide v2, 2
    // 6: add-long v4, v0, v2
    // 8: return-void
    let body = MethodBody::new(
        "m",
        6,
        vec![
            DecodedInstruction::modeled(
                0,
                3,
                Opcode::ConstWide,
                Operand::Literal {
                    dest: 0,
                    value: Literal::Wide(40),
                },
            ),
            DecodedInstruction::modeled(
                3,
                3,
                Opcode::ConstWide,
                Operand::Literal {
                    dest: 2,
                    value: Literal::Wide(2),
                },
            ),
            DecodedInstruction::modeled(
                6,
                2,
                Opcode::AddLong,
                Operand::Ternary {
                    dest: 4,
                    left: 0,
                    right: 2,
                },
            ),
            return_void(8),
        ],
    );

    let simplified = simplify_method(&body).unwrap();

    assert_eq!(
        mnemonics(&simplified.instructions),
        vec!["const-wide", "const-wide", "const-wide", "return-void"]
    );
    assert_eq!(
        simplified.instructions[2].operand,
        Operand::Literal {
            dest: 4,
            value: Literal::Wide(42),
        }
    );
}
