//! The decoded-instruction model the core consumes and emits.
//!
//! An external reader decodes the container format and hands the core one
//! [`MethodBody`] per method: instructions with resolved opcode identities, operand
//! values, addresses and sizes, plus the method's try/catch table. The same shapes are
//! used for the revised instruction list the simplifier hands back.

use std::sync::Arc;

use crate::bytecode::Opcode;

/// The resolved opcode identity of a decoded instruction.
///
/// Instructions inside the modeled set carry their [`Opcode`]; everything else arrives
/// as [`OpcodeId::Unmodeled`] with its mnemonic and is subject to the
/// unsupported-opcode policy.
#[derive(Debug, Clone, PartialEq)]
pub enum OpcodeId {
    /// An opcode the simplifier has semantics for.
    Modeled(Opcode),
    /// An opcode outside the modeled set.
    Unmodeled(Arc<str>),
}

impl OpcodeId {
    /// The textual mnemonic, regardless of whether the opcode is modeled.
    #[must_use]
    pub fn mnemonic(&self) -> &str {
        match self {
            OpcodeId::Modeled(op) => op.mnemonic(),
            OpcodeId::Unmodeled(name) => name,
        }
    }
}

/// A literal constant carried by a `const` family instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// 32-bit integer (also booleans, bytes, chars, shorts and null references).
    Int(i32),
    /// 64-bit integer.
    Wide(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Interned string constant.
    String(Arc<str>),
    /// Type descriptor constant (`const-class`).
    Class(Arc<str>),
}

/// The operand payload of a decoded instruction.
///
/// Layouts follow the Dalvik register conventions: `dest`/`reg` corresponds to the
/// format's register A, sources follow in order. For `aput`/`iput`/`sput` the first
/// register holds the value being stored, not a destination.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operands (`nop`, `return-void`).
    None,
    /// A single register (`throw vA`, `return vA`, `move-result vA`, `monitor-enter vA`).
    Unary {
        /// The register operand
        reg: u16,
    },
    /// Destination and source register (`move`, unary math, conversions, `array-length`).
    Binary {
        /// The destination register
        dest: u16,
        /// The source register
        src: u16,
    },
    /// Destination and two source registers (three-address math, `cmp`, `aget`/`aput`).
    Ternary {
        /// Register A: destination, or the value register for `aput`
        dest: u16,
        /// Register B: first source (the array register for `aget`/`aput`)
        left: u16,
        /// Register C: second source (the index register for `aget`/`aput`)
        right: u16,
    },
    /// Register plus literal constant (`const` family).
    Literal {
        /// The destination register
        dest: u16,
        /// The literal value
        value: Literal,
    },
    /// Register plus descriptor reference, with an optional second register
    /// (`check-cast`, `instance-of`, `new-instance`, `new-array`, field access).
    Symbolic {
        /// Register A: destination, or the value register for `iput`/`sput`
        reg: u16,
        /// Second register when the format has one: the object register for
        /// instance field access and `instance-of`, the length register for `new-array`
        src: Option<u16>,
        /// The referenced string/type/field descriptor
        descriptor: Arc<str>,
    },
    /// Unconditional branch target (`goto`).
    Target {
        /// The branch target address
        address: u32,
    },
    /// Conditional branch: guard register(s) plus taken target (`if-*`).
    Test {
        /// The first guard register
        left: u16,
        /// The second guard register; `None` for the zero-compare forms (`if-*z`)
        right: Option<u16>,
        /// The taken-branch target address
        target: u32,
    },
    /// Switch selector plus ordered key-to-target table (`packed-switch`, `sparse-switch`).
    Table {
        /// The selector register
        selector: u16,
        /// Ordered `(case key, target address)` pairs
        cases: Vec<(i32, u32)>,
    },
    /// Invocation: callee descriptor plus argument registers (`invoke-*`).
    Call {
        /// The callee method descriptor
        method: Arc<str>,
        /// The argument registers, in call order
        args: Vec<u16>,
    },
}

/// One decoded instruction at a fixed address.
///
/// Addresses are code-unit offsets within the method, unique and strictly increasing;
/// `size` is the instruction's extent in code units so removal maps can be computed.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedInstruction {
    /// Code-unit address of this instruction within the method.
    pub address: u32,
    /// Size in code units.
    pub size: u32,
    /// Resolved opcode identity.
    pub opcode: OpcodeId,
    /// Operand payload.
    pub operand: Operand,
}

impl DecodedInstruction {
    /// Creates an instruction with a modeled opcode.
    #[must_use]
    pub fn modeled(address: u32, size: u32, opcode: Opcode, operand: Operand) -> Self {
        DecodedInstruction {
            address,
            size,
            opcode: OpcodeId::Modeled(opcode),
            operand,
        }
    }

    /// Creates an instruction for an opcode outside the modeled set.
    #[must_use]
    pub fn unmodeled(
        address: u32,
        size: u32,
        mnemonic: impl Into<Arc<str>>,
        operand: Operand,
    ) -> Self {
        DecodedInstruction {
            address,
            size,
            opcode: OpcodeId::Unmodeled(mnemonic.into()),
            operand,
        }
    }
}

/// One entry of a method's try/catch table.
///
/// Any throwing instruction whose address lies in `[start, end)` gains every handler
/// start as an exception successor.
#[derive(Debug, Clone, PartialEq)]
pub struct TryBlock {
    /// First covered code-unit address (inclusive).
    pub start: u32,
    /// End of the covered range (exclusive).
    pub end: u32,
    /// Handler entry addresses, in catch-clause order.
    pub handlers: Vec<u32>,
}

impl TryBlock {
    /// Creates a try block covering `[start, end)` with the given handler entries.
    #[must_use]
    pub fn new(start: u32, end: u32, handlers: Vec<u32>) -> Self {
        TryBlock {
            start,
            end,
            handlers,
        }
    }

    /// Whether this block covers the given address.
    #[must_use]
    pub fn covers(&self, address: u32) -> bool {
        self.start <= address && address < self.end
    }
}

/// The decoded body of one method, as supplied by the external reader.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBody {
    /// Method name, used to key batch reports.
    pub name: Arc<str>,
    /// Number of declared registers; wide values occupy a register pair.
    pub register_count: u16,
    /// Entry address; defaults to the first instruction's address.
    pub entry: u32,
    /// The decoded instruction stream, in address order.
    pub instructions: Vec<DecodedInstruction>,
    /// The method's try/catch table.
    pub try_blocks: Vec<TryBlock>,
}

impl MethodBody {
    /// Creates a method body with the entry at the first instruction.
    #[must_use]
    pub fn new(
        name: impl Into<Arc<str>>,
        register_count: u16,
        instructions: Vec<DecodedInstruction>,
    ) -> Self {
        let entry = instructions.first().map_or(0, |i| i.address);
        MethodBody {
            name: name.into(),
            register_count,
            entry,
            instructions,
            try_blocks: Vec::new(),
        }
    }

    /// Overrides the entry address.
    #[must_use]
    pub fn with_entry(mut self, entry: u32) -> Self {
        self.entry = entry;
        self
    }

    /// Adds a try/catch table entry.
    #[must_use]
    pub fn with_try_block(mut self, block: TryBlock) -> Self {
        self.try_blocks.push(block);
        self
    }
}
