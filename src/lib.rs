// Copyright 2025 The dexsimplify Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # dexsimplify
//!
//! A simplification engine for Dalvik method bytecode. Given the decoded instruction
//! sequence of one method, `dexsimplify` symbolically executes each instruction to
//! discover the reachable program points, builds the method's control-flow shape from
//! that, and applies simplification passes — constant folding, opaque-predicate
//! resolution, dead-branch elimination — to produce an equivalent but simpler
//! instruction stream. Obfuscators love opaque predicates and junk branches; this
//! crate proves them away.
//!
//! ## Features
//!
//! - **🔍 Symbolic execution** - Per-opcode semantics over a constant/unknown lattice
//!   with conservative degradation for everything the model does not track
//! - **⚡ Worklist fixed point** - Terminating control-flow discovery, backward
//!   branches and exception edges included
//! - **🧹 Simplification passes** - Opaque-predicate resolution, constant propagation
//!   folding, and sound unreachable-code removal
//! - **🧵 Method-granular parallelism** - Batch processing on a worker pool; methods
//!   share nothing
//! - **🛡️ Structured diagnostics** - Every resolved branch, fold, removal and
//!   unsupported opcode is reported as a value, never dropped
//!
//! ## Scope
//!
//! The core consumes instructions an external reader already decoded (opcodes,
//! operands, addresses resolved) and returns a revised instruction list plus a
//! renumbering map and diagnostics for an external writer. Parsing and serializing
//! the container format, command-line handling, and repackaging are collaborator
//! concerns and live outside this crate.
//!
//! ## Quick Start
//!
//! ```rust
//! use dexsimplify::prelude::*;
//!
//! // 0: const v0, 1
//! // 2: if-nez v0, :6    <- opaque predicate, always taken
//! // 4: nop              <- junk, unreachable once the branch is resolved
//! // 5: nop
//! // 6: return-void
//! let body = MethodBody::new(
//!     "Lcom/example/Foo;->bar()V",
//!     1,
//!     vec![
//!         DecodedInstruction::modeled(0, 2, Opcode::Const, Operand::Literal {
//!             dest: 0,
//!             value: Literal::Int(1),
//!         }),
//!         DecodedInstruction::modeled(2, 2, Opcode::IfNez, Operand::Test {
//!             left: 0,
//!             right: None,
//!             target: 6,
//!         }),
//!         DecodedInstruction::modeled(4, 1, Opcode::Nop, Operand::None),
//!         DecodedInstruction::modeled(5, 1, Opcode::Nop, Operand::None),
//!         DecodedInstruction::modeled(6, 1, Opcode::ReturnVoid, Operand::None),
//!     ],
//! );
//!
//! let simplified = simplify_method(&body)?;
//!
//! let mnemonics: Vec<&str> = simplified
//!     .instructions
//!     .iter()
//!     .map(|i| i.opcode.mnemonic())
//!     .collect();
//! assert_eq!(mnemonics, vec!["const", "goto", "return-void"]);
//! # Ok::<(), dexsimplify::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `dexsimplify` is organized into two modules:
//!
//! - [`bytecode`] - The instruction-set model shared with the external reader/writer:
//!   the closed [`Opcode`](bytecode::Opcode) set, decoded instructions, method bodies
//!   and try/catch tables
//! - [`simplify`] - The core: operations with executable semantics, the per-method
//!   context, the control-flow driver, and the pass pipeline
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). The error surface is small by
//! design: [`Error::MalformedMethod`] for structurally invalid input (fatal for that
//! method only) and [`Error::UnsupportedOpcode`] in strict mode. Everything else the
//! core cannot resolve degrades to the unknown lattice value and costs precision,
//! not correctness.
//!
//! ## Concurrency
//!
//! One method's simplification is inherently sequential (the fixed point's state
//! merges feed later executions), but methods are independent:
//! [`simplify_methods`](simplify::simplify_methods) fans a batch out over a worker
//! pool and collects per-method outcomes concurrently. Parallel and sequential runs
//! produce identical results.

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dexsimplify::prelude::*;
///
/// let body = MethodBody::new("Lcom/example/Foo;->id()V", 1, vec![
///     DecodedInstruction::modeled(0, 1, Opcode::ReturnVoid, Operand::None),
/// ]);
/// let simplified = simplify_method(&body)?;
/// assert!(!simplified.changed);
/// # Ok::<(), dexsimplify::Error>(())
/// ```
pub mod prelude;

/// The instruction-set model: opcodes, decoded instructions, method bodies.
///
/// Defines the contract between the core and the external binary-format
/// reader/writer. See [`bytecode`] for the key types.
pub mod bytecode;

/// The simplification core: symbolic execution, control-flow discovery, passes.
///
/// The main entry points are [`simplify::simplify_method`],
/// [`simplify::simplify_methods`] and the configurable [`simplify::Simplifier`].
pub mod simplify;

pub use bytecode::{
    DecodedInstruction, Literal, MethodBody, Opcode, OpcodeFlags, OpcodeId, Operand, TryBlock,
};
pub use error::Error;
pub use simplify::{
    simplify_method, simplify_methods, BatchReport, MethodOutcome, MethodSimplification,
    Simplifier, SimplifyConfig,
};

/// The result type used throughout this library.
pub type Result<T> = std::result::Result<T, Error>;
