//! The closed opcode set the simplifier models, with per-opcode control-flow
//! and register-effect flags.
//!
//! Mnemonics follow the Dalvik convention (`move-result-wide`, `if-eqz`, ...) and are
//! derived from the variant names, so [`Opcode`] and its textual form can never drift
//! apart. The `/2addr` and `/lit` addressing variants of the arithmetic opcodes are
//! normalized into the three-register form by the external decoder and are not part of
//! this set.

use bitflags::bitflags;
use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

bitflags! {
    /// Static properties of an opcode that drive successor computation and rewriting.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpcodeFlags: u32 {
        /// Execution can fall through to the next instruction.
        const CAN_CONTINUE = 0x1;
        /// Execution can raise an exception, adding handler edges.
        const CAN_THROW = 0x2;
        /// The instruction defines a single (non-wide) register.
        const SETS_REGISTER = 0x4;
        /// The instruction defines a register pair (long/double).
        const SETS_WIDE_REGISTER = 0x8;
        /// The instruction writes the invocation result slot.
        const SETS_RESULT = 0x10;
        /// The instruction carries explicit branch targets.
        const IS_BRANCH = 0x20;
        /// The instruction ends the method (return family, throw).
        const IS_TERMINAL = 0x40;
    }
}

/// The modeled opcode set.
///
/// A closed enumeration: the factory and the execute dispatch match on it exhaustively,
/// so adding a variant without semantics is a compile error. Instructions outside this
/// set reach the core as [`OpcodeId::Unmodeled`](crate::bytecode::OpcodeId) and fall
/// under the unsupported-opcode policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
#[allow(missing_docs)]
pub enum Opcode {
    Nop,

    Move,
    MoveWide,
    MoveObject,
    MoveResult,
    MoveResultWide,
    MoveResultObject,
    MoveException,

    ReturnVoid,
    Return,
    ReturnWide,
    ReturnObject,

    Const,
    ConstWide,
    ConstString,
    ConstClass,

    MonitorEnter,
    MonitorExit,

    CheckCast,
    InstanceOf,
    ArrayLength,
    NewInstance,
    NewArray,

    Throw,
    Goto,
    PackedSwitch,
    SparseSwitch,

    CmplFloat,
    CmpgFloat,
    CmplDouble,
    CmpgDouble,
    CmpLong,

    IfEq,
    IfNe,
    IfLt,
    IfGe,
    IfGt,
    IfLe,
    IfEqz,
    IfNez,
    IfLtz,
    IfGez,
    IfGtz,
    IfLez,

    Aget,
    Aput,
    Iget,
    Iput,
    Sget,
    Sput,

    InvokeVirtual,
    InvokeSuper,
    InvokeDirect,
    InvokeStatic,
    InvokeInterface,

    NegInt,
    NotInt,
    NegLong,
    NotLong,
    NegFloat,
    NegDouble,

    IntToLong,
    IntToFloat,
    IntToDouble,
    LongToInt,
    FloatToInt,
    DoubleToInt,

    AddInt,
    SubInt,
    MulInt,
    DivInt,
    RemInt,
    AndInt,
    OrInt,
    XorInt,
    ShlInt,
    ShrInt,
    UshrInt,

    AddLong,
    SubLong,
    MulLong,
    DivLong,
    RemLong,

    AddFloat,
    SubFloat,
    MulFloat,
    DivFloat,

    AddDouble,
    SubDouble,
    MulDouble,
    DivDouble,
}

impl Opcode {
    /// The Dalvik-style mnemonic of this opcode.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        self.into()
    }

    /// Static control-flow and register-effect properties of this opcode.
    ///
    /// A pure table; the same opcode always reports the same flags.
    #[must_use]
    pub fn flags(self) -> OpcodeFlags {
        use Opcode::*;

        match self {
            Nop => OpcodeFlags::CAN_CONTINUE,

            Move | MoveObject | MoveResult | MoveResultObject | MoveException => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_REGISTER
            }
            MoveWide | MoveResultWide => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_WIDE_REGISTER
            }

            ReturnVoid | Return | ReturnWide | ReturnObject => OpcodeFlags::IS_TERMINAL,

            Const => OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_REGISTER,
            ConstWide => OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_WIDE_REGISTER,
            // String/class constants trigger resolution, which can throw.
            ConstString | ConstClass => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_REGISTER | OpcodeFlags::CAN_THROW
            }

            MonitorEnter | MonitorExit => OpcodeFlags::CAN_CONTINUE | OpcodeFlags::CAN_THROW,

            CheckCast | InstanceOf | ArrayLength | NewInstance | NewArray => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_REGISTER | OpcodeFlags::CAN_THROW
            }

            Throw => OpcodeFlags::IS_TERMINAL | OpcodeFlags::CAN_THROW,
            Goto => OpcodeFlags::IS_BRANCH,
            // A switch falls through when no case matches.
            PackedSwitch | SparseSwitch => OpcodeFlags::CAN_CONTINUE | OpcodeFlags::IS_BRANCH,

            CmplFloat | CmpgFloat | CmplDouble | CmpgDouble | CmpLong => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_REGISTER
            }

            IfEq | IfNe | IfLt | IfGe | IfGt | IfLe | IfEqz | IfNez | IfLtz | IfGez | IfGtz
            | IfLez => OpcodeFlags::CAN_CONTINUE | OpcodeFlags::IS_BRANCH,

            Aget | Iget | Sget => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_REGISTER | OpcodeFlags::CAN_THROW
            }
            Aput | Iput | Sput => OpcodeFlags::CAN_CONTINUE | OpcodeFlags::CAN_THROW,

            InvokeVirtual | InvokeSuper | InvokeDirect | InvokeStatic | InvokeInterface => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_RESULT | OpcodeFlags::CAN_THROW
            }

            NegInt | NotInt | NegFloat | IntToFloat | LongToInt | FloatToInt | DoubleToInt => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_REGISTER
            }
            NegLong | NotLong | NegDouble | IntToLong | IntToDouble => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_WIDE_REGISTER
            }

            AddInt | SubInt | MulInt | AndInt | OrInt | XorInt | ShlInt | ShrInt | UshrInt => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_REGISTER
            }
            DivInt | RemInt => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_REGISTER | OpcodeFlags::CAN_THROW
            }

            AddLong | SubLong | MulLong => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_WIDE_REGISTER
            }
            DivLong | RemLong => {
                OpcodeFlags::CAN_CONTINUE
                    | OpcodeFlags::SETS_WIDE_REGISTER
                    | OpcodeFlags::CAN_THROW
            }

            AddFloat | SubFloat | MulFloat | DivFloat => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_REGISTER
            }
            AddDouble | SubDouble | MulDouble | DivDouble => {
                OpcodeFlags::CAN_CONTINUE | OpcodeFlags::SETS_WIDE_REGISTER
            }
        }
    }

    /// Whether executing this opcode can raise an exception.
    #[must_use]
    pub fn can_throw(self) -> bool {
        self.flags().contains(OpcodeFlags::CAN_THROW)
    }

    /// Whether this opcode defines a wide (two-slot) register value.
    #[must_use]
    pub fn sets_wide_register(self) -> bool {
        self.flags().contains(OpcodeFlags::SETS_WIDE_REGISTER)
    }

    /// Whether this opcode ends the method.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self.flags().contains(OpcodeFlags::IS_TERMINAL)
    }
}
