//! # dexsimplify Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! functions from the dexsimplify library. Import this module to get quick access to
//! the essential types for method simplification.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dexsimplify operations
pub use crate::Error;

/// The result type used throughout dexsimplify
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Single-method simplification with default configuration
pub use crate::simplify::simplify_method;

/// Parallel batch simplification
pub use crate::simplify::simplify_methods;

/// The configurable per-method pipeline
pub use crate::simplify::Simplifier;

/// Pipeline configuration
pub use crate::simplify::SimplifyConfig;

// ================================================================================================
// Instruction Model
// ================================================================================================

/// Decoded-instruction input/output shapes
pub use crate::bytecode::{DecodedInstruction, Literal, MethodBody, Operand, OpcodeId, TryBlock};

/// The modeled opcode set and its flags
pub use crate::bytecode::{Opcode, OpcodeFlags};

// ================================================================================================
// Results and Diagnostics
// ================================================================================================

/// Simplification output
pub use crate::simplify::{AddressMap, MethodSimplification};

/// Batch output
pub use crate::simplify::{BatchReport, MethodOutcome};

/// Diagnostic events
pub use crate::simplify::{Event, EventLog};

// ================================================================================================
// Analysis Types
// ================================================================================================

/// The symbolic value lattice
pub use crate::simplify::{ConstValue, SymbolicValue};

/// Traversal results
pub use crate::simplify::{FlowAnalysis, Successor, SuccessorSet};
