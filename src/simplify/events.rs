//! Diagnostic record of the edits and incidents of one simplification run.
//!
//! The core never logs to a side channel; everything a caller might want to report is
//! recorded here as a structured value and returned with the result. Each
//! unsupported-opcode occurrence appears exactly once.

use std::sync::Arc;

/// One recorded edit or incident.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A conditional branch or switch resolved to a single non-fall-through target and
    /// was replaced by an unconditional jump.
    BranchResolved {
        /// Address of the rewritten instruction
        address: u32,
        /// The statically resolved target
        target: u32,
    },
    /// A conditional branch or switch resolved to its own fall-through and was
    /// replaced by a no-op.
    BranchFolded {
        /// Address of the rewritten instruction
        address: u32,
    },
    /// An instruction with fully-constant inputs was replaced by a constant load.
    InstructionFolded {
        /// Address of the rewritten instruction
        address: u32,
    },
    /// An unreachable instruction was removed from the emitted list.
    UnreachableRemoved {
        /// Address of the removed instruction
        address: u32,
    },
    /// An instruction outside the modeled set was treated as an opaque terminal.
    UnsupportedOpcode {
        /// Address of the unmodeled instruction
        address: u32,
        /// Its mnemonic
        opcode: Arc<str>,
    },
}

/// Append-only log of [`Event`]s for one method.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        EventLog::default()
    }

    /// Appends an event.
    pub fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    /// All recorded events, in order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Addresses of branches resolved to a static target or folded to fall-through.
    #[must_use]
    pub fn resolved_branches(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::BranchResolved { address, .. } | Event::BranchFolded { address } => {
                    Some(*address)
                }
                _ => None,
            })
            .collect()
    }

    /// Addresses removed as unreachable.
    #[must_use]
    pub fn removed_addresses(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::UnreachableRemoved { address } => Some(*address),
                _ => None,
            })
            .collect()
    }

    /// The unsupported-opcode occurrences, as `(address, mnemonic)` pairs.
    #[must_use]
    pub fn unsupported_opcodes(&self) -> Vec<(u32, Arc<str>)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::UnsupportedOpcode { address, opcode } => {
                    Some((*address, Arc::clone(opcode)))
                }
                _ => None,
            })
            .collect()
    }

    /// Merges another log into this one, preserving order.
    pub fn absorb(&mut self, mut other: EventLog) {
        self.events.append(&mut other.events);
    }
}
