//! Symbolic execution semantics for each operation family.
//!
//! Each arm mutates the context's working state and returns the statically
//! determinable [`SuccessorSet`]. Unresolvable operands degrade to the unknown
//! lattice value and never fail; pruning only ever happens where knowledge is
//! proven. Guard resolutions are recorded on (and withdrawn from) the context's
//! resolved-branch map so the rewriting passes see exactly the branches that
//! survived the fixed point.

use crate::{
    bytecode::Opcode,
    simplify::{
        context::MethodContext,
        op::{OpKind, Operation, Successor, SuccessorSet},
        value::{ConstValue, SymbolicValue},
    },
};

impl Operation {
    /// Executes this operation against the method context.
    ///
    /// Reads of undefined registers yield `Unknown`, never an error. The returned set
    /// contains the fall-through and/or branch targets, exception-handler entries for
    /// throwing operations, and the method-exit sentinel where execution can leave
    /// the method.
    pub fn execute(&self, ctx: &mut MethodContext) -> SuccessorSet {
        match &self.kind {
            OpKind::Nop => self.fall(),

            OpKind::Move { op, dest, src } => {
                let value = ctx.read(*src).clone();
                self.write_sized(ctx, *dest, value, op.sets_wide_register());
                self.fall()
            }

            OpKind::MoveResult { op, dest } => {
                let value = ctx.result().clone();
                self.write_sized(ctx, *dest, value, op.sets_wide_register());
                self.fall()
            }

            OpKind::MoveException { dest } => {
                // The in-flight exception object is never tracked.
                ctx.write(*dest, SymbolicValue::Unknown);
                self.fall()
            }

            OpKind::Return { .. } => SuccessorSet::exit(),

            OpKind::Const { dest, value } => {
                let can_throw = matches!(value, ConstValue::String(_) | ConstValue::Class(_));
                self.write_sized(
                    ctx,
                    *dest,
                    SymbolicValue::Const(value.clone()),
                    value.is_wide(),
                );
                if can_throw {
                    self.throwing_fall(ctx)
                } else {
                    self.fall()
                }
            }

            OpKind::Monitor { .. } => self.throwing_fall(ctx),

            // The cast either succeeds and leaves the register untouched, or throws.
            OpKind::CheckCast { .. } => self.throwing_fall(ctx),

            OpKind::InstanceOf { dest, src, class } => {
                let value = match ctx.read(*src) {
                    SymbolicValue::Const(ConstValue::Null) => SymbolicValue::int(0),
                    SymbolicValue::Object { class: known } if known == class => {
                        SymbolicValue::int(1)
                    }
                    // A differing class could still be a subtype; no hierarchy here.
                    _ => SymbolicValue::Unknown,
                };
                ctx.write(*dest, value);
                self.throwing_fall(ctx)
            }

            OpKind::ArrayLength { dest, array } => {
                if is_known_null(ctx.read(*array)) {
                    return self.throw_successors(ctx);
                }
                ctx.write(*dest, SymbolicValue::Unknown);
                self.throwing_fall(ctx)
            }

            OpKind::NewInstance { dest, class } => {
                ctx.write(
                    *dest,
                    SymbolicValue::Object {
                        class: class.clone(),
                    },
                );
                self.throwing_fall(ctx)
            }

            OpKind::NewArray { dest, class, .. } => {
                ctx.write(
                    *dest,
                    SymbolicValue::Object {
                        class: class.clone(),
                    },
                );
                self.throwing_fall(ctx)
            }

            OpKind::Throw { .. } => self.throw_successors(ctx),

            OpKind::Goto { target } => SuccessorSet::one(*target),

            OpKind::Switch {
                selector, cases, ..
            } => match ctx.read(*selector).as_const().and_then(ConstValue::as_int) {
                Some(key) => {
                    let chosen = cases
                        .iter()
                        .find(|(case, _)| *case == key)
                        .map_or(self.fall_through(), |(_, target)| *target);
                    ctx.set_resolved(self.address, chosen);
                    SuccessorSet::one(chosen)
                }
                None => {
                    ctx.clear_resolved(self.address);
                    let mut set = SuccessorSet::new();
                    for (_, target) in cases {
                        set.push_address(*target);
                    }
                    set.push_address(self.fall_through());
                    set
                }
            },

            OpKind::Cmp {
                op,
                dest,
                left,
                right,
            } => {
                let folded = fold_cmp(*op, ctx.read(*left).as_const(), ctx.read(*right).as_const());
                ctx.write(
                    *dest,
                    folded.map_or(SymbolicValue::Unknown, SymbolicValue::int),
                );
                self.fall()
            }

            OpKind::If {
                op,
                left,
                right,
                target,
            } => {
                let lhs = ctx.read(*left).as_const().and_then(ConstValue::as_branch_int);
                let rhs = match right {
                    Some(reg) => ctx.read(*reg).as_const().and_then(ConstValue::as_branch_int),
                    // The `if-*z` forms compare against zero.
                    None => Some(0),
                };

                match (lhs, rhs) {
                    (Some(a), Some(b)) => match eval_test(*op, a, b) {
                        Some(taken) => {
                            let chosen = if taken { *target } else { self.fall_through() };
                            ctx.set_resolved(self.address, chosen);
                            SuccessorSet::one(chosen)
                        }
                        None => {
                            ctx.clear_resolved(self.address);
                            self.both_edges(*target)
                        }
                    },
                    _ => {
                        ctx.clear_resolved(self.address);
                        self.both_edges(*target)
                    }
                }
            }

            OpKind::ArrayGet { dest, array, .. } => {
                if is_known_null(ctx.read(*array)) {
                    return self.throw_successors(ctx);
                }
                // Array contents are never tracked.
                ctx.write(*dest, SymbolicValue::Unknown);
                self.throwing_fall(ctx)
            }

            OpKind::ArrayPut { array, .. } => {
                if is_known_null(ctx.read(*array)) {
                    return self.throw_successors(ctx);
                }
                self.throwing_fall(ctx)
            }

            OpKind::FieldGet { dest, object, .. } => {
                if let Some(object) = object {
                    if is_known_null(ctx.read(*object)) {
                        return self.throw_successors(ctx);
                    }
                }
                // Heap state is never tracked.
                ctx.write(*dest, SymbolicValue::Unknown);
                self.throwing_fall(ctx)
            }

            OpKind::FieldPut { object, .. } => {
                if let Some(object) = object {
                    if is_known_null(ctx.read(*object)) {
                        return self.throw_successors(ctx);
                    }
                }
                self.throwing_fall(ctx)
            }

            OpKind::Invoke { args, .. } => {
                // The callee may mutate any object reachable from its arguments.
                for arg in args {
                    ctx.write(*arg, SymbolicValue::Unknown);
                }
                ctx.set_result(SymbolicValue::Unknown);
                self.throwing_fall(ctx)
            }

            OpKind::UnaryMath { op, dest, src } => {
                let folded = fold_unary(*op, ctx.read(*src).as_const());
                let value = folded.map_or(SymbolicValue::Unknown, SymbolicValue::Const);
                self.write_sized(ctx, *dest, value, op.sets_wide_register());
                self.fall()
            }

            OpKind::BinaryMath {
                op,
                dest,
                left,
                right,
            } => {
                let lhs = ctx.read(*left).as_const().cloned();
                let rhs = ctx.read(*right).as_const().cloned();
                let divides = matches!(
                    *op,
                    Opcode::DivInt | Opcode::RemInt | Opcode::DivLong | Opcode::RemLong
                );

                if divides {
                    match divisor_state(rhs.as_ref()) {
                        // Division by a known zero always throws.
                        DivisorState::Zero => return self.throw_successors(ctx),
                        DivisorState::NonZero => {
                            let folded = fold_binary(*op, lhs.as_ref(), rhs.as_ref());
                            let value =
                                folded.map_or(SymbolicValue::Unknown, SymbolicValue::Const);
                            self.write_sized(ctx, *dest, value, op.sets_wide_register());
                            self.fall()
                        }
                        DivisorState::Unknown => {
                            self.write_sized(
                                ctx,
                                *dest,
                                SymbolicValue::Unknown,
                                op.sets_wide_register(),
                            );
                            self.throwing_fall(ctx)
                        }
                    }
                } else {
                    let folded = fold_binary(*op, lhs.as_ref(), rhs.as_ref());
                    let value = folded.map_or(SymbolicValue::Unknown, SymbolicValue::Const);
                    self.write_sized(ctx, *dest, value, op.sets_wide_register());
                    self.fall()
                }
            }

            OpKind::Unmodeled { .. } => {
                // Opaque semantics: assume every register and the result slot were
                // clobbered, and every edge (fall-through, handlers, exit) is live.
                ctx.clear_state();
                self.throwing_fall(ctx)
            }
        }
    }

    fn write_sized(&self, ctx: &mut MethodContext, dest: u16, value: SymbolicValue, wide: bool) {
        if wide {
            ctx.write_wide(dest, value);
        } else {
            ctx.write(dest, value);
        }
    }

    fn fall(&self) -> SuccessorSet {
        SuccessorSet::one(self.fall_through())
    }

    fn both_edges(&self, target: u32) -> SuccessorSet {
        let mut set = SuccessorSet::one(target);
        set.push_address(self.fall_through());
        set
    }

    /// The edges an exception raised here can take: every covering handler entry,
    /// plus the exit sentinel since handler catch types are not modeled.
    fn throw_successors(&self, ctx: &MethodContext) -> SuccessorSet {
        let mut set = SuccessorSet::new();
        for handler in ctx.exception_targets(self.address) {
            set.push(Successor::Exception(handler));
        }
        set.push(Successor::MethodExit);
        set
    }

    fn throwing_fall(&self, ctx: &MethodContext) -> SuccessorSet {
        let mut set = SuccessorSet::one(self.fall_through());
        for target in self.throw_successors(ctx).targets() {
            set.push(*target);
        }
        set
    }
}

fn is_known_null(value: &SymbolicValue) -> bool {
    matches!(
        value,
        SymbolicValue::Const(ConstValue::Null) | SymbolicValue::Const(ConstValue::Int(0))
    )
}

enum DivisorState {
    Zero,
    NonZero,
    Unknown,
}

fn divisor_state(divisor: Option<&ConstValue>) -> DivisorState {
    match divisor {
        Some(ConstValue::Int(0)) | Some(ConstValue::Long(0)) => DivisorState::Zero,
        Some(ConstValue::Int(_)) | Some(ConstValue::Long(_)) => DivisorState::NonZero,
        _ => DivisorState::Unknown,
    }
}

/// Evaluates an `if-*` guard over branch integers. `None` for an opcode that is not
/// a conditional test (cannot occur for factory-built operations).
fn eval_test(op: Opcode, a: i64, b: i64) -> Option<bool> {
    match op {
        Opcode::IfEq | Opcode::IfEqz => Some(a == b),
        Opcode::IfNe | Opcode::IfNez => Some(a != b),
        Opcode::IfLt | Opcode::IfLtz => Some(a < b),
        Opcode::IfGe | Opcode::IfGez => Some(a >= b),
        Opcode::IfGt | Opcode::IfGtz => Some(a > b),
        Opcode::IfLe | Opcode::IfLez => Some(a <= b),
        _ => None,
    }
}

fn fold_cmp(op: Opcode, left: Option<&ConstValue>, right: Option<&ConstValue>) -> Option<i32> {
    match (op, left?, right?) {
        (Opcode::CmpLong, ConstValue::Long(a), ConstValue::Long(b)) => {
            Some(ordering_to_int(a.cmp(b)))
        }
        (Opcode::CmplFloat, ConstValue::Float(a), ConstValue::Float(b)) => {
            // The `l` bias: NaN compares as less-than.
            Some(a.partial_cmp(b).map_or(-1, ordering_to_int))
        }
        (Opcode::CmpgFloat, ConstValue::Float(a), ConstValue::Float(b)) => {
            Some(a.partial_cmp(b).map_or(1, ordering_to_int))
        }
        (Opcode::CmplDouble, ConstValue::Double(a), ConstValue::Double(b)) => {
            Some(a.partial_cmp(b).map_or(-1, ordering_to_int))
        }
        (Opcode::CmpgDouble, ConstValue::Double(a), ConstValue::Double(b)) => {
            Some(a.partial_cmp(b).map_or(1, ordering_to_int))
        }
        _ => None,
    }
}

fn ordering_to_int(ordering: std::cmp::Ordering) -> i32 {
    match ordering {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    }
}

fn fold_unary(op: Opcode, value: Option<&ConstValue>) -> Option<ConstValue> {
    match (op, value?) {
        (Opcode::NegInt, ConstValue::Int(v)) => Some(ConstValue::Int(v.wrapping_neg())),
        (Opcode::NotInt, ConstValue::Int(v)) => Some(ConstValue::Int(!v)),
        (Opcode::NegLong, ConstValue::Long(v)) => Some(ConstValue::Long(v.wrapping_neg())),
        (Opcode::NotLong, ConstValue::Long(v)) => Some(ConstValue::Long(!v)),
        (Opcode::NegFloat, ConstValue::Float(v)) => Some(ConstValue::Float(-v)),
        (Opcode::NegDouble, ConstValue::Double(v)) => Some(ConstValue::Double(-v)),
        (Opcode::IntToLong, ConstValue::Int(v)) => Some(ConstValue::Long(i64::from(*v))),
        #[allow(clippy::cast_precision_loss)]
        (Opcode::IntToFloat, ConstValue::Int(v)) => Some(ConstValue::Float(*v as f32)),
        (Opcode::IntToDouble, ConstValue::Int(v)) => Some(ConstValue::Double(f64::from(*v))),
        #[allow(clippy::cast_possible_truncation)]
        (Opcode::LongToInt, ConstValue::Long(v)) => Some(ConstValue::Int(*v as i32)),
        // `as` saturates and maps NaN to zero, matching the runtime's conversion.
        #[allow(clippy::cast_possible_truncation)]
        (Opcode::FloatToInt, ConstValue::Float(v)) => Some(ConstValue::Int(*v as i32)),
        #[allow(clippy::cast_possible_truncation)]
        (Opcode::DoubleToInt, ConstValue::Double(v)) => Some(ConstValue::Int(*v as i32)),
        _ => None,
    }
}

fn fold_binary(
    op: Opcode,
    left: Option<&ConstValue>,
    right: Option<&ConstValue>,
) -> Option<ConstValue> {
    match (op, left?, right?) {
        (Opcode::AddInt, ConstValue::Int(a), ConstValue::Int(b)) => {
            Some(ConstValue::Int(a.wrapping_add(*b)))
        }
        (Opcode::SubInt, ConstValue::Int(a), ConstValue::Int(b)) => {
            Some(ConstValue::Int(a.wrapping_sub(*b)))
        }
        (Opcode::MulInt, ConstValue::Int(a), ConstValue::Int(b)) => {
            Some(ConstValue::Int(a.wrapping_mul(*b)))
        }
        // Division by zero is handled by the caller; MIN / -1 wraps.
        (Opcode::DivInt, ConstValue::Int(a), ConstValue::Int(b)) if *b != 0 => {
            Some(ConstValue::Int(a.wrapping_div(*b)))
        }
        (Opcode::RemInt, ConstValue::Int(a), ConstValue::Int(b)) if *b != 0 => {
            Some(ConstValue::Int(a.wrapping_rem(*b)))
        }
        (Opcode::AndInt, ConstValue::Int(a), ConstValue::Int(b)) => Some(ConstValue::Int(a & b)),
        (Opcode::OrInt, ConstValue::Int(a), ConstValue::Int(b)) => Some(ConstValue::Int(a | b)),
        (Opcode::XorInt, ConstValue::Int(a), ConstValue::Int(b)) => Some(ConstValue::Int(a ^ b)),
        // Shift distances use the low five bits only.
        (Opcode::ShlInt, ConstValue::Int(a), ConstValue::Int(b)) => {
            Some(ConstValue::Int(a << (b & 0x1f)))
        }
        (Opcode::ShrInt, ConstValue::Int(a), ConstValue::Int(b)) => {
            Some(ConstValue::Int(a >> (b & 0x1f)))
        }
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_wrap)]
        (Opcode::UshrInt, ConstValue::Int(a), ConstValue::Int(b)) => {
            Some(ConstValue::Int(((*a as u32) >> (b & 0x1f)) as i32))
        }

        (Opcode::AddLong, ConstValue::Long(a), ConstValue::Long(b)) => {
            Some(ConstValue::Long(a.wrapping_add(*b)))
        }
        (Opcode::SubLong, ConstValue::Long(a), ConstValue::Long(b)) => {
            Some(ConstValue::Long(a.wrapping_sub(*b)))
        }
        (Opcode::MulLong, ConstValue::Long(a), ConstValue::Long(b)) => {
            Some(ConstValue::Long(a.wrapping_mul(*b)))
        }
        (Opcode::DivLong, ConstValue::Long(a), ConstValue::Long(b)) if *b != 0 => {
            Some(ConstValue::Long(a.wrapping_div(*b)))
        }
        (Opcode::RemLong, ConstValue::Long(a), ConstValue::Long(b)) if *b != 0 => {
            Some(ConstValue::Long(a.wrapping_rem(*b)))
        }

        (Opcode::AddFloat, ConstValue::Float(a), ConstValue::Float(b)) => {
            Some(ConstValue::Float(a + b))
        }
        (Opcode::SubFloat, ConstValue::Float(a), ConstValue::Float(b)) => {
            Some(ConstValue::Float(a - b))
        }
        (Opcode::MulFloat, ConstValue::Float(a), ConstValue::Float(b)) => {
            Some(ConstValue::Float(a * b))
        }
        // Float division by zero yields an infinity or NaN, never a throw.
        (Opcode::DivFloat, ConstValue::Float(a), ConstValue::Float(b)) => {
            Some(ConstValue::Float(a / b))
        }

        (Opcode::AddDouble, ConstValue::Double(a), ConstValue::Double(b)) => {
            Some(ConstValue::Double(a + b))
        }
        (Opcode::SubDouble, ConstValue::Double(a), ConstValue::Double(b)) => {
            Some(ConstValue::Double(a - b))
        }
        (Opcode::MulDouble, ConstValue::Double(a), ConstValue::Double(b)) => {
            Some(ConstValue::Double(a * b))
        }
        (Opcode::DivDouble, ConstValue::Double(a), ConstValue::Double(b)) => {
            Some(ConstValue::Double(a / b))
        }

        _ => None,
    }
}
