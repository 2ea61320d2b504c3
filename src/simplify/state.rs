//! The symbolic register file.
//!
//! One [`RegisterState`] models the method's registers plus the invocation result slot
//! at a single program point. The driver keeps one state per discovered address (the
//! entry state) and a working copy that operations mutate during execution; the
//! element-wise [`RegisterState::join_with`] merge is the single point where knowledge
//! from different paths meets.

use crate::simplify::value::SymbolicValue;

/// Symbolic state of all registers and the result slot at one program point.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterState {
    registers: Vec<SymbolicValue>,
    result: SymbolicValue,
}

impl RegisterState {
    /// Creates a state with every register and the result slot unknown.
    #[must_use]
    pub fn new(register_count: u16) -> Self {
        RegisterState {
            registers: vec![SymbolicValue::Unknown; usize::from(register_count)],
            result: SymbolicValue::Unknown,
        }
    }

    /// Number of registers tracked.
    #[must_use]
    pub fn register_count(&self) -> u16 {
        // Length was constructed from a u16.
        u16::try_from(self.registers.len()).unwrap_or(u16::MAX)
    }

    /// Reads a register. Out-of-range reads are unknown, never an error.
    #[must_use]
    pub fn read(&self, reg: u16) -> &SymbolicValue {
        static UNKNOWN: SymbolicValue = SymbolicValue::Unknown;
        self.registers.get(usize::from(reg)).unwrap_or(&UNKNOWN)
    }

    /// Writes a register. Out-of-range writes are dropped.
    pub fn write(&mut self, reg: u16, value: SymbolicValue) {
        if let Some(slot) = self.registers.get_mut(usize::from(reg)) {
            *slot = value;
        } else {
            debug_assert!(false, "register v{} out of range", reg);
        }
    }

    /// Writes a wide value: the payload lands in `reg`, and `reg + 1` is clobbered to
    /// unknown. Reads of a wide value go through the low slot only.
    pub fn write_wide(&mut self, reg: u16, value: SymbolicValue) {
        self.write(reg, value);
        if usize::from(reg) + 1 < self.registers.len() {
            self.write(reg + 1, SymbolicValue::Unknown);
        }
    }

    /// Reads the invocation result slot.
    #[must_use]
    pub fn result(&self) -> &SymbolicValue {
        &self.result
    }

    /// Writes the invocation result slot.
    pub fn set_result(&mut self, value: SymbolicValue) {
        self.result = value;
    }

    /// Degrades every register and the result slot to unknown.
    pub fn clear(&mut self) {
        for slot in &mut self.registers {
            *slot = SymbolicValue::Unknown;
        }
        self.result = SymbolicValue::Unknown;
    }

    /// Joins another state into this one element-wise.
    ///
    /// Returns `true` if any slot changed; the driver re-enqueues an address exactly
    /// when its entry state changed, which is the fixed-point check that guarantees
    /// termination.
    pub fn join_with(&mut self, other: &RegisterState) -> bool {
        debug_assert_eq!(self.registers.len(), other.registers.len());

        let mut changed = false;
        for (slot, incoming) in self.registers.iter_mut().zip(other.registers.iter()) {
            let joined = slot.join(incoming);
            if *slot != joined {
                *slot = joined;
                changed = true;
            }
        }

        let joined = self.result.join(&other.result);
        if self.result != joined {
            self.result = joined;
            changed = true;
        }

        changed
    }
}
