//! The instruction-set model: opcodes, decoded instructions, and method bodies.
//!
//! This module defines the contract between the core and the external binary-format
//! reader/writer. The reader decodes a container file into [`MethodBody`] values; the
//! simplifier returns revised [`DecodedInstruction`] sequences in the same shapes.
//! Nothing in this module parses or serializes bytes.
//!
//! # Key Types
//! - [`Opcode`] - The closed set of modeled opcodes with [`OpcodeFlags`]
//! - [`OpcodeId`] - Modeled or unmodeled opcode identity of an instruction
//! - [`DecodedInstruction`] - One instruction at a fixed address
//! - [`Operand`] / [`Literal`] - Operand payloads
//! - [`MethodBody`] / [`TryBlock`] - Per-method input with its try/catch table

mod instruction;
mod opcode;

pub use instruction::{DecodedInstruction, Literal, MethodBody, Operand, OpcodeId, TryBlock};
pub use opcode::{Opcode, OpcodeFlags};
