//! Operations: decoded instructions with executable symbolic semantics.
//!
//! An [`Operation`] is the core's in-memory form of one instruction, pinned to its
//! address. The opcode-indexed dispatch of the original design is a closed tagged
//! variant here: [`OpKind`] has one arm per opcode family, [`Operation::build`] maps
//! every modeled [`Opcode`](crate::bytecode::Opcode) to an arm through a single
//! exhaustive match, and the execute dispatch matches the arms exhaustively as well.
//! The compiler enforces that no modeled opcode lacks semantics; only instructions
//! that arrive as [`OpcodeId::Unmodeled`] fall under the unsupported-opcode policy.

mod execute;

use std::sync::Arc;

use crate::{
    bytecode::{DecodedInstruction, Literal, Opcode, Operand, OpcodeId},
    simplify::value::ConstValue,
    Result,
};

/// One candidate next program point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successor {
    /// An in-method code-unit address reached by normal control transfer.
    Address(u32),
    /// A covering exception handler's entry address, reached by a throw. The state
    /// merged along this edge is the pre/post join, since the exception may occur
    /// before the operation's effects happened.
    Exception(u32),
    /// The method-exit sentinel (return, or an exception escaping the method).
    MethodExit,
}

impl Successor {
    /// The in-method address of this successor, if it has one.
    #[must_use]
    pub fn address(&self) -> Option<u32> {
        match self {
            Successor::Address(a) | Successor::Exception(a) => Some(*a),
            Successor::MethodExit => None,
        }
    }
}

/// The ordered set of program points an operation's execution can reach next.
///
/// Duplicates are permitted; the driver's queued-set makes repeated visits idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuccessorSet {
    targets: Vec<Successor>,
}

impl SuccessorSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        SuccessorSet::default()
    }

    /// A set containing only the method-exit sentinel.
    #[must_use]
    pub fn exit() -> Self {
        SuccessorSet {
            targets: vec![Successor::MethodExit],
        }
    }

    /// A set containing a single address.
    #[must_use]
    pub fn one(address: u32) -> Self {
        SuccessorSet {
            targets: vec![Successor::Address(address)],
        }
    }

    /// Appends a successor.
    pub fn push(&mut self, successor: Successor) {
        self.targets.push(successor);
    }

    /// Appends an address successor.
    pub fn push_address(&mut self, address: u32) {
        self.targets.push(Successor::Address(address));
    }

    /// The successors, in order.
    #[must_use]
    pub fn targets(&self) -> &[Successor] {
        &self.targets
    }

    /// Iterates over the in-method address successors (normal and exception edges),
    /// skipping the exit sentinel.
    pub fn addresses(&self) -> impl Iterator<Item = u32> + '_ {
        self.targets.iter().filter_map(Successor::address)
    }

    /// Whether the set contains the method-exit sentinel.
    #[must_use]
    pub fn exits(&self) -> bool {
        self.targets.contains(&Successor::MethodExit)
    }

    /// Number of successors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// The opcode-family payload of an [`Operation`].
///
/// Arms that cover several opcodes (the move family, the `if-*` tests, the math
/// families) carry the originating [`Opcode`] so the emitted instruction keeps its
/// exact identity.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum OpKind {
    Nop,
    Move {
        op: Opcode,
        dest: u16,
        src: u16,
    },
    MoveResult {
        op: Opcode,
        dest: u16,
    },
    MoveException {
        dest: u16,
    },
    Return {
        op: Opcode,
        reg: Option<u16>,
    },
    Const {
        dest: u16,
        value: ConstValue,
    },
    Monitor {
        op: Opcode,
        reg: u16,
    },
    CheckCast {
        reg: u16,
        class: Arc<str>,
    },
    InstanceOf {
        dest: u16,
        src: u16,
        class: Arc<str>,
    },
    ArrayLength {
        dest: u16,
        array: u16,
    },
    NewInstance {
        dest: u16,
        class: Arc<str>,
    },
    NewArray {
        dest: u16,
        length: u16,
        class: Arc<str>,
    },
    Throw {
        reg: u16,
    },
    Goto {
        target: u32,
    },
    Switch {
        op: Opcode,
        selector: u16,
        cases: Vec<(i32, u32)>,
    },
    Cmp {
        op: Opcode,
        dest: u16,
        left: u16,
        right: u16,
    },
    If {
        op: Opcode,
        left: u16,
        right: Option<u16>,
        target: u32,
    },
    ArrayGet {
        dest: u16,
        array: u16,
        index: u16,
    },
    ArrayPut {
        value: u16,
        array: u16,
        index: u16,
    },
    FieldGet {
        dest: u16,
        object: Option<u16>,
        field: Arc<str>,
    },
    FieldPut {
        value: u16,
        object: Option<u16>,
        field: Arc<str>,
    },
    Invoke {
        op: Opcode,
        method: Arc<str>,
        args: Vec<u16>,
    },
    UnaryMath {
        op: Opcode,
        dest: u16,
        src: u16,
    },
    BinaryMath {
        op: Opcode,
        dest: u16,
        left: u16,
        right: u16,
    },
    /// An instruction outside the modeled set, kept verbatim for re-emission and
    /// executed as an opaque terminal with maximal conservative successors.
    Unmodeled {
        mnemonic: Arc<str>,
        operand: Operand,
    },
}

/// One instruction with executable symbolic semantics, pinned to a fixed address.
///
/// Identity is `(address, mnemonic)`. An operation never changes in place; the
/// simplification passes replace it wholesale with a statically-equivalent operation
/// at the same address and size.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    address: u32,
    size: u32,
    kind: OpKind,
}

impl Operation {
    /// Creates an operation directly from its parts.
    ///
    /// Used by the rewriting passes; decoded input goes through [`Operation::build`].
    #[must_use]
    pub fn new(address: u32, size: u32, kind: OpKind) -> Self {
        Operation {
            address,
            size,
            kind,
        }
    }

    /// The code-unit address of this operation.
    #[must_use]
    pub fn address(&self) -> u32 {
        self.address
    }

    /// The size in code units.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The address of the next sequential instruction.
    #[must_use]
    pub fn fall_through(&self) -> u32 {
        self.address + self.size
    }

    /// The opcode-family payload.
    #[must_use]
    pub fn kind(&self) -> &OpKind {
        &self.kind
    }

    /// The modeled opcode, or `None` for an unmodeled instruction.
    #[must_use]
    pub fn opcode(&self) -> Option<Opcode> {
        match &self.kind {
            OpKind::Nop => Some(Opcode::Nop),
            OpKind::Move { op, .. }
            | OpKind::MoveResult { op, .. }
            | OpKind::Return { op, .. }
            | OpKind::Monitor { op, .. }
            | OpKind::Switch { op, .. }
            | OpKind::Cmp { op, .. }
            | OpKind::If { op, .. }
            | OpKind::Invoke { op, .. }
            | OpKind::UnaryMath { op, .. }
            | OpKind::BinaryMath { op, .. } => Some(*op),
            OpKind::MoveException { .. } => Some(Opcode::MoveException),
            OpKind::Const { value, .. } => Some(match value {
                ConstValue::Long(_) | ConstValue::Double(_) => Opcode::ConstWide,
                ConstValue::String(_) => Opcode::ConstString,
                ConstValue::Class(_) => Opcode::ConstClass,
                _ => Opcode::Const,
            }),
            OpKind::CheckCast { .. } => Some(Opcode::CheckCast),
            OpKind::InstanceOf { .. } => Some(Opcode::InstanceOf),
            OpKind::ArrayLength { .. } => Some(Opcode::ArrayLength),
            OpKind::NewInstance { .. } => Some(Opcode::NewInstance),
            OpKind::NewArray { .. } => Some(Opcode::NewArray),
            OpKind::Throw { .. } => Some(Opcode::Throw),
            OpKind::Goto { .. } => Some(Opcode::Goto),
            OpKind::ArrayGet { .. } => Some(Opcode::Aget),
            OpKind::ArrayPut { .. } => Some(Opcode::Aput),
            OpKind::FieldGet { object, .. } => Some(if object.is_some() {
                Opcode::Iget
            } else {
                Opcode::Sget
            }),
            OpKind::FieldPut { object, .. } => Some(if object.is_some() {
                Opcode::Iput
            } else {
                Opcode::Sput
            }),
            OpKind::Unmodeled { .. } => None,
        }
    }

    /// The mnemonic of this operation.
    #[must_use]
    pub fn mnemonic(&self) -> Arc<str> {
        match &self.kind {
            OpKind::Unmodeled { mnemonic, .. } => Arc::clone(mnemonic),
            // Every modeled kind maps back to its opcode.
            _ => match self.opcode() {
                Some(op) => Arc::from(op.mnemonic()),
                None => Arc::from("unknown"),
            },
        }
    }

    /// Maps one decoded instruction to its operation.
    ///
    /// Total over the modeled opcode set; the match below is exhaustive, so an opcode
    /// without semantics cannot compile. Pure construction with no side effects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMethod`](crate::Error) when the operand payload does
    /// not match the opcode's expected layout. Unmodeled opcodes construct an
    /// [`OpKind::Unmodeled`] operation; the strict/lenient policy decision belongs to
    /// the caller, not the factory.
    pub fn build(instruction: &DecodedInstruction) -> Result<Operation> {
        let address = instruction.address;
        let size = instruction.size;
        let operand = &instruction.operand;

        let op = match &instruction.opcode {
            OpcodeId::Unmodeled(mnemonic) => {
                return Ok(Operation::new(
                    address,
                    size,
                    OpKind::Unmodeled {
                        mnemonic: Arc::clone(mnemonic),
                        operand: operand.clone(),
                    },
                ));
            }
            OpcodeId::Modeled(op) => *op,
        };

        let kind = match op {
            Opcode::Nop => match operand {
                Operand::None => OpKind::Nop,
                _ => return Err(mismatch(op, address)),
            },

            Opcode::Move | Opcode::MoveWide | Opcode::MoveObject => match operand {
                Operand::Binary { dest, src } => OpKind::Move {
                    op,
                    dest: *dest,
                    src: *src,
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::MoveResult | Opcode::MoveResultWide | Opcode::MoveResultObject => {
                match operand {
                    Operand::Unary { reg } => OpKind::MoveResult { op, dest: *reg },
                    _ => return Err(mismatch(op, address)),
                }
            }

            Opcode::MoveException => match operand {
                Operand::Unary { reg } => OpKind::MoveException { dest: *reg },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::ReturnVoid => match operand {
                Operand::None => OpKind::Return { op, reg: None },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::Return | Opcode::ReturnWide | Opcode::ReturnObject => match operand {
                Operand::Unary { reg } => OpKind::Return {
                    op,
                    reg: Some(*reg),
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::Const => match operand {
                Operand::Literal {
                    dest,
                    value: Literal::Int(v),
                } => OpKind::Const {
                    dest: *dest,
                    value: ConstValue::Int(*v),
                },
                Operand::Literal {
                    dest,
                    value: Literal::Float(v),
                } => OpKind::Const {
                    dest: *dest,
                    value: ConstValue::Float(*v),
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::ConstWide => match operand {
                Operand::Literal {
                    dest,
                    value: Literal::Wide(v),
                } => OpKind::Const {
                    dest: *dest,
                    value: ConstValue::Long(*v),
                },
                Operand::Literal {
                    dest,
                    value: Literal::Double(v),
                } => OpKind::Const {
                    dest: *dest,
                    value: ConstValue::Double(*v),
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::ConstString => match operand {
                Operand::Literal {
                    dest,
                    value: Literal::String(s),
                } => OpKind::Const {
                    dest: *dest,
                    value: ConstValue::String(Arc::clone(s)),
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::ConstClass => match operand {
                Operand::Literal {
                    dest,
                    value: Literal::Class(c),
                } => OpKind::Const {
                    dest: *dest,
                    value: ConstValue::Class(Arc::clone(c)),
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::MonitorEnter | Opcode::MonitorExit => match operand {
                Operand::Unary { reg } => OpKind::Monitor { op, reg: *reg },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::CheckCast => match operand {
                Operand::Symbolic {
                    reg,
                    src: None,
                    descriptor,
                } => OpKind::CheckCast {
                    reg: *reg,
                    class: Arc::clone(descriptor),
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::InstanceOf => match operand {
                Operand::Symbolic {
                    reg,
                    src: Some(src),
                    descriptor,
                } => OpKind::InstanceOf {
                    dest: *reg,
                    src: *src,
                    class: Arc::clone(descriptor),
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::ArrayLength => match operand {
                Operand::Binary { dest, src } => OpKind::ArrayLength {
                    dest: *dest,
                    array: *src,
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::NewInstance => match operand {
                Operand::Symbolic {
                    reg,
                    src: None,
                    descriptor,
                } => OpKind::NewInstance {
                    dest: *reg,
                    class: Arc::clone(descriptor),
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::NewArray => match operand {
                Operand::Symbolic {
                    reg,
                    src: Some(length),
                    descriptor,
                } => OpKind::NewArray {
                    dest: *reg,
                    length: *length,
                    class: Arc::clone(descriptor),
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::Throw => match operand {
                Operand::Unary { reg } => OpKind::Throw { reg: *reg },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::Goto => match operand {
                Operand::Target { address: target } => OpKind::Goto { target: *target },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::PackedSwitch | Opcode::SparseSwitch => match operand {
                Operand::Table { selector, cases } => OpKind::Switch {
                    op,
                    selector: *selector,
                    cases: cases.clone(),
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::CmplFloat
            | Opcode::CmpgFloat
            | Opcode::CmplDouble
            | Opcode::CmpgDouble
            | Opcode::CmpLong => match operand {
                Operand::Ternary { dest, left, right } => OpKind::Cmp {
                    op,
                    dest: *dest,
                    left: *left,
                    right: *right,
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::IfEq
            | Opcode::IfNe
            | Opcode::IfLt
            | Opcode::IfGe
            | Opcode::IfGt
            | Opcode::IfLe => match operand {
                Operand::Test {
                    left,
                    right: Some(right),
                    target,
                } => OpKind::If {
                    op,
                    left: *left,
                    right: Some(*right),
                    target: *target,
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::IfEqz
            | Opcode::IfNez
            | Opcode::IfLtz
            | Opcode::IfGez
            | Opcode::IfGtz
            | Opcode::IfLez => match operand {
                Operand::Test {
                    left,
                    right: None,
                    target,
                } => OpKind::If {
                    op,
                    left: *left,
                    right: None,
                    target: *target,
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::Aget => match operand {
                Operand::Ternary { dest, left, right } => OpKind::ArrayGet {
                    dest: *dest,
                    array: *left,
                    index: *right,
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::Aput => match operand {
                Operand::Ternary { dest, left, right } => OpKind::ArrayPut {
                    value: *dest,
                    array: *left,
                    index: *right,
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::Iget => match operand {
                Operand::Symbolic {
                    reg,
                    src: Some(object),
                    descriptor,
                } => OpKind::FieldGet {
                    dest: *reg,
                    object: Some(*object),
                    field: Arc::clone(descriptor),
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::Iput => match operand {
                Operand::Symbolic {
                    reg,
                    src: Some(object),
                    descriptor,
                } => OpKind::FieldPut {
                    value: *reg,
                    object: Some(*object),
                    field: Arc::clone(descriptor),
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::Sget => match operand {
                Operand::Symbolic {
                    reg,
                    src: None,
                    descriptor,
                } => OpKind::FieldGet {
                    dest: *reg,
                    object: None,
                    field: Arc::clone(descriptor),
                },
                _ => return Err(mismatch(op, address)),
            },
            Opcode::Sput => match operand {
                Operand::Symbolic {
                    reg,
                    src: None,
                    descriptor,
                } => OpKind::FieldPut {
                    value: *reg,
                    object: None,
                    field: Arc::clone(descriptor),
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::InvokeVirtual
            | Opcode::InvokeSuper
            | Opcode::InvokeDirect
            | Opcode::InvokeStatic
            | Opcode::InvokeInterface => match operand {
                Operand::Call { method, args } => OpKind::Invoke {
                    op,
                    method: Arc::clone(method),
                    args: args.clone(),
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::NegInt
            | Opcode::NotInt
            | Opcode::NegLong
            | Opcode::NotLong
            | Opcode::NegFloat
            | Opcode::NegDouble
            | Opcode::IntToLong
            | Opcode::IntToFloat
            | Opcode::IntToDouble
            | Opcode::LongToInt
            | Opcode::FloatToInt
            | Opcode::DoubleToInt => match operand {
                Operand::Binary { dest, src } => OpKind::UnaryMath {
                    op,
                    dest: *dest,
                    src: *src,
                },
                _ => return Err(mismatch(op, address)),
            },

            Opcode::AddInt
            | Opcode::SubInt
            | Opcode::MulInt
            | Opcode::DivInt
            | Opcode::RemInt
            | Opcode::AndInt
            | Opcode::OrInt
            | Opcode::XorInt
            | Opcode::ShlInt
            | Opcode::ShrInt
            | Opcode::UshrInt
            | Opcode::AddLong
            | Opcode::SubLong
            | Opcode::MulLong
            | Opcode::DivLong
            | Opcode::RemLong
            | Opcode::AddFloat
            | Opcode::SubFloat
            | Opcode::MulFloat
            | Opcode::DivFloat
            | Opcode::AddDouble
            | Opcode::SubDouble
            | Opcode::MulDouble
            | Opcode::DivDouble => match operand {
                Operand::Ternary { dest, left, right } => OpKind::BinaryMath {
                    op,
                    dest: *dest,
                    left: *left,
                    right: *right,
                },
                _ => return Err(mismatch(op, address)),
            },
        };

        Ok(Operation::new(address, size, kind))
    }

    /// Converts this operation back into the decoded-instruction shape for emission.
    #[must_use]
    pub fn to_instruction(&self) -> DecodedInstruction {
        let (opcode, operand) = match &self.kind {
            OpKind::Nop => (OpcodeId::Modeled(Opcode::Nop), Operand::None),
            OpKind::Move { op, dest, src } => (
                OpcodeId::Modeled(*op),
                Operand::Binary {
                    dest: *dest,
                    src: *src,
                },
            ),
            OpKind::MoveResult { op, dest } => {
                (OpcodeId::Modeled(*op), Operand::Unary { reg: *dest })
            }
            OpKind::MoveException { dest } => (
                OpcodeId::Modeled(Opcode::MoveException),
                Operand::Unary { reg: *dest },
            ),
            OpKind::Return { op, reg } => (
                OpcodeId::Modeled(*op),
                match reg {
                    Some(reg) => Operand::Unary { reg: *reg },
                    None => Operand::None,
                },
            ),
            OpKind::Const { dest, value } => {
                let literal = match value {
                    ConstValue::Int(v) => Literal::Int(*v),
                    ConstValue::Long(v) => Literal::Wide(*v),
                    ConstValue::Float(v) => Literal::Float(*v),
                    ConstValue::Double(v) => Literal::Double(*v),
                    ConstValue::String(s) => Literal::String(Arc::clone(s)),
                    ConstValue::Class(c) => Literal::Class(Arc::clone(c)),
                    // Dalvik encodes the null reference as integer 0.
                    ConstValue::Null => Literal::Int(0),
                };
                (
                    OpcodeId::Modeled(self.opcode().unwrap_or(Opcode::Const)),
                    Operand::Literal {
                        dest: *dest,
                        value: literal,
                    },
                )
            }
            OpKind::Monitor { op, reg } => (OpcodeId::Modeled(*op), Operand::Unary { reg: *reg }),
            OpKind::CheckCast { reg, class } => (
                OpcodeId::Modeled(Opcode::CheckCast),
                Operand::Symbolic {
                    reg: *reg,
                    src: None,
                    descriptor: Arc::clone(class),
                },
            ),
            OpKind::InstanceOf { dest, src, class } => (
                OpcodeId::Modeled(Opcode::InstanceOf),
                Operand::Symbolic {
                    reg: *dest,
                    src: Some(*src),
                    descriptor: Arc::clone(class),
                },
            ),
            OpKind::ArrayLength { dest, array } => (
                OpcodeId::Modeled(Opcode::ArrayLength),
                Operand::Binary {
                    dest: *dest,
                    src: *array,
                },
            ),
            OpKind::NewInstance { dest, class } => (
                OpcodeId::Modeled(Opcode::NewInstance),
                Operand::Symbolic {
                    reg: *dest,
                    src: None,
                    descriptor: Arc::clone(class),
                },
            ),
            OpKind::NewArray {
                dest,
                length,
                class,
            } => (
                OpcodeId::Modeled(Opcode::NewArray),
                Operand::Symbolic {
                    reg: *dest,
                    src: Some(*length),
                    descriptor: Arc::clone(class),
                },
            ),
            OpKind::Throw { reg } => (
                OpcodeId::Modeled(Opcode::Throw),
                Operand::Unary { reg: *reg },
            ),
            OpKind::Goto { target } => (
                OpcodeId::Modeled(Opcode::Goto),
                Operand::Target { address: *target },
            ),
            OpKind::Switch {
                op,
                selector,
                cases,
            } => (
                OpcodeId::Modeled(*op),
                Operand::Table {
                    selector: *selector,
                    cases: cases.clone(),
                },
            ),
            OpKind::Cmp {
                op,
                dest,
                left,
                right,
            } => (
                OpcodeId::Modeled(*op),
                Operand::Ternary {
                    dest: *dest,
                    left: *left,
                    right: *right,
                },
            ),
            OpKind::If {
                op,
                left,
                right,
                target,
            } => (
                OpcodeId::Modeled(*op),
                Operand::Test {
                    left: *left,
                    right: *right,
                    target: *target,
                },
            ),
            OpKind::ArrayGet { dest, array, index } => (
                OpcodeId::Modeled(Opcode::Aget),
                Operand::Ternary {
                    dest: *dest,
                    left: *array,
                    right: *index,
                },
            ),
            OpKind::ArrayPut {
                value,
                array,
                index,
            } => (
                OpcodeId::Modeled(Opcode::Aput),
                Operand::Ternary {
                    dest: *value,
                    left: *array,
                    right: *index,
                },
            ),
            OpKind::FieldGet {
                dest,
                object,
                field,
            } => (
                OpcodeId::Modeled(if object.is_some() {
                    Opcode::Iget
                } else {
                    Opcode::Sget
                }),
                Operand::Symbolic {
                    reg: *dest,
                    src: *object,
                    descriptor: Arc::clone(field),
                },
            ),
            OpKind::FieldPut {
                value,
                object,
                field,
            } => (
                OpcodeId::Modeled(if object.is_some() {
                    Opcode::Iput
                } else {
                    Opcode::Sput
                }),
                Operand::Symbolic {
                    reg: *value,
                    src: *object,
                    descriptor: Arc::clone(field),
                },
            ),
            OpKind::Invoke { op, method, args } => (
                OpcodeId::Modeled(*op),
                Operand::Call {
                    method: Arc::clone(method),
                    args: args.clone(),
                },
            ),
            OpKind::UnaryMath { op, dest, src } => (
                OpcodeId::Modeled(*op),
                Operand::Binary {
                    dest: *dest,
                    src: *src,
                },
            ),
            OpKind::BinaryMath {
                op,
                dest,
                left,
                right,
            } => (
                OpcodeId::Modeled(*op),
                Operand::Ternary {
                    dest: *dest,
                    left: *left,
                    right: *right,
                },
            ),
            OpKind::Unmodeled { mnemonic, operand } => (
                OpcodeId::Unmodeled(Arc::clone(mnemonic)),
                operand.clone(),
            ),
        };

        DecodedInstruction {
            address: self.address,
            size: self.size,
            opcode,
            operand,
        }
    }
}

fn mismatch(op: Opcode, address: u32) -> crate::Error {
    malformed_method!(
        "operand layout does not match '{}' at address {}",
        op.mnemonic(),
        address
    )
}
