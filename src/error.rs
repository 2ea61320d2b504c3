use std::sync::Arc;

use thiserror::Error;

macro_rules! malformed_method {
    // Single string version
    ($msg:expr) => {
        crate::Error::MalformedMethod {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::MalformedMethod {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The simplifier deliberately keeps its error surface small: everything the core cannot model
/// is either conservatively absorbed into the symbolic `Unknown` value (operand resolution) or
/// reported through the per-method event log (unsupported opcodes under the default policy).
/// Only conditions that make a method impossible to process faithfully become `Err` values.
///
/// # Error Categories
///
/// - [`Error::UnsupportedOpcode`] - An instruction has no modeled semantics (strict mode only)
/// - [`Error::MalformedMethod`] - The instruction stream is structurally invalid
///
/// # Examples
///
/// ```rust
/// use dexsimplify::{simplify_method, Error, MethodBody};
///
/// let body = MethodBody::new("broken", 1, Vec::new());
/// match simplify_method(&body) {
///     Ok(simplified) => println!("{} events", simplified.events.len()),
///     Err(Error::MalformedMethod { message, file, line }) => {
///         eprintln!("Malformed method: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An instruction has no modeled semantics.
    ///
    /// Under the default policy this is never returned: the offending instruction is treated
    /// as an opaque terminal with maximal conservative successors and the occurrence is
    /// recorded in the method's event log. With
    /// [`SimplifyConfig::strict_unsupported`](crate::SimplifyConfig) set, simplification of
    /// the method is aborted with this error instead.
    ///
    /// # Fields
    ///
    /// * `opcode` - The mnemonic of the unmodeled instruction
    /// * `address` - The code-unit address at which it appears
    #[error("Unsupported opcode '{opcode}' at address {address}")]
    UnsupportedOpcode {
        /// The mnemonic of the unmodeled instruction
        opcode: Arc<str>,
        /// The code-unit address at which the instruction appears
        address: u32,
    },

    /// The method's instruction stream is structurally invalid and cannot be processed.
    ///
    /// Raised when a successor address points outside the instruction table, the entry
    /// address is invalid, duplicate addresses appear, or an operand layout does not match
    /// its opcode. Fatal for that method only; callers are expected to emit the method's
    /// original instructions unchanged. The error includes the source location where the
    /// malformation was detected for debugging purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed method - {file}:{line}: {message}")]
    MalformedMethod {
        /// The message to be printed for the MalformedMethod error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}
