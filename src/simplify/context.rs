//! Per-method mutable state for traversal and rewriting.
//!
//! A [`MethodContext`] owns the live instruction table, the symbolic working state,
//! the visited set and worklist, the per-address entry states, and the event log. It
//! is created once per method, passed by unique borrow into each execution step (the
//! fixed-point merge is the single point of mutation), and discarded after the revised
//! instruction list is emitted. Nothing in it is shared between methods.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    sync::Arc,
};

use crate::{
    bytecode::{DecodedInstruction, MethodBody, TryBlock},
    simplify::{
        config::SimplifyConfig,
        events::{Event, EventLog},
        op::Operation,
        state::RegisterState,
        value::SymbolicValue,
    },
    Error, Result,
};

/// Per-method mutable execution and simplification state.
#[derive(Debug, Clone)]
pub struct MethodContext {
    name: Arc<str>,
    register_count: u16,
    entry: u32,
    table: BTreeMap<u32, Operation>,
    try_blocks: Vec<TryBlock>,

    state: RegisterState,
    entry_states: BTreeMap<u32, RegisterState>,
    visited: BTreeSet<u32>,
    worklist: VecDeque<u32>,
    queued: BTreeSet<u32>,
    resolved_branches: BTreeMap<u32, u32>,
    events: EventLog,
}

impl MethodContext {
    /// Builds the context for one method: every decoded instruction goes through the
    /// operation factory and lands in the instruction table keyed by address.
    ///
    /// Each instruction outside the modeled set is recorded in the event log exactly
    /// once here, independent of whether traversal ever reaches it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedMethod`] for duplicate addresses or operand-layout
    /// mismatches, and [`Error::UnsupportedOpcode`] for an unmodeled instruction when
    /// [`SimplifyConfig::strict_unsupported`] is set.
    pub fn new(body: &MethodBody, config: &SimplifyConfig) -> Result<Self> {
        let mut table = BTreeMap::new();
        let mut events = EventLog::new();

        for instruction in &body.instructions {
            let operation = Operation::build(instruction)?;

            if operation.opcode().is_none() {
                if config.strict_unsupported {
                    return Err(Error::UnsupportedOpcode {
                        opcode: operation.mnemonic(),
                        address: operation.address(),
                    });
                }
                events.record(Event::UnsupportedOpcode {
                    address: operation.address(),
                    opcode: operation.mnemonic(),
                });
            }

            if table.insert(instruction.address, operation).is_some() {
                return Err(malformed_method!(
                    "duplicate instruction address {}",
                    instruction.address
                ));
            }
        }

        Ok(MethodContext {
            name: Arc::clone(&body.name),
            register_count: body.register_count,
            entry: body.entry,
            table,
            try_blocks: body.try_blocks.clone(),
            state: RegisterState::new(body.register_count),
            entry_states: BTreeMap::new(),
            visited: BTreeSet::new(),
            worklist: VecDeque::new(),
            queued: BTreeSet::new(),
            resolved_branches: BTreeMap::new(),
            events,
        })
    }

    /// The method's name.
    #[must_use]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Number of declared registers.
    #[must_use]
    pub fn register_count(&self) -> u16 {
        self.register_count
    }

    /// The method's entry address.
    #[must_use]
    pub fn entry(&self) -> u32 {
        self.entry
    }

    // ---- instruction table ----

    /// The live operation at an address.
    #[must_use]
    pub fn operation(&self, address: u32) -> Option<&Operation> {
        self.table.get(&address)
    }

    /// Whether an address exists in the instruction table.
    #[must_use]
    pub fn contains(&self, address: u32) -> bool {
        self.table.contains_key(&address)
    }

    /// All live addresses, in order.
    #[must_use]
    pub fn addresses(&self) -> Vec<u32> {
        self.table.keys().copied().collect()
    }

    /// Replaces the operation at an address with a simplified one.
    ///
    /// The replacement must keep the address (and should keep the size, so the
    /// address domain stays intact).
    pub fn replace(&mut self, address: u32, operation: Operation) {
        debug_assert_eq!(operation.address(), address);
        self.table.insert(address, operation);
    }

    /// Removes the operation at an address from the emitted list.
    pub fn remove(&mut self, address: u32) -> Option<Operation> {
        self.table.remove(&address)
    }

    /// Emits the live instruction table as a decoded-instruction sequence, in
    /// address order.
    #[must_use]
    pub fn to_instructions(&self) -> Vec<DecodedInstruction> {
        self.table.values().map(Operation::to_instruction).collect()
    }

    // ---- symbolic state ----

    /// Reads a register from the working state.
    #[must_use]
    pub fn read(&self, reg: u16) -> &SymbolicValue {
        self.state.read(reg)
    }

    /// Writes a register in the working state.
    pub fn write(&mut self, reg: u16, value: SymbolicValue) {
        self.state.write(reg, value);
    }

    /// Writes a wide value in the working state.
    pub fn write_wide(&mut self, reg: u16, value: SymbolicValue) {
        self.state.write_wide(reg, value);
    }

    /// Reads the invocation result slot.
    #[must_use]
    pub fn result(&self) -> &SymbolicValue {
        self.state.result()
    }

    /// Writes the invocation result slot.
    pub fn set_result(&mut self, value: SymbolicValue) {
        self.state.set_result(value);
    }

    /// Degrades the whole working state to unknown.
    pub fn clear_state(&mut self) {
        self.state.clear();
    }

    /// The working state.
    #[must_use]
    pub fn state(&self) -> &RegisterState {
        &self.state
    }

    /// Replaces the working state (the driver loads each address's entry state
    /// before executing it).
    pub fn set_state(&mut self, state: RegisterState) {
        self.state = state;
    }

    // ---- entry states ----

    /// The recorded entry state for an address.
    #[must_use]
    pub fn entry_state(&self, address: u32) -> Option<&RegisterState> {
        self.entry_states.get(&address)
    }

    /// Joins a state into the recorded entry state for an address.
    ///
    /// Returns `true` when the recorded state changed (including the first time the
    /// address is seen), which is the driver's re-enqueue condition.
    pub fn merge_entry_state(&mut self, address: u32, incoming: &RegisterState) -> bool {
        match self.entry_states.get_mut(&address) {
            Some(existing) => existing.join_with(incoming),
            None => {
                self.entry_states.insert(address, incoming.clone());
                true
            }
        }
    }

    /// All recorded entry states.
    #[must_use]
    pub fn entry_states(&self) -> &BTreeMap<u32, RegisterState> {
        &self.entry_states
    }

    // ---- worklist / visited ----

    /// Pushes an address unless it is already pending.
    ///
    /// The invariant that the worklist never holds an out-of-table address is
    /// enforced by the driver, which validates successors before pushing.
    pub fn push_pending(&mut self, address: u32) {
        if self.queued.insert(address) {
            self.worklist.push_back(address);
        }
    }

    /// Pops the next pending address.
    pub fn pop_pending(&mut self) -> Option<u32> {
        let address = self.worklist.pop_front()?;
        self.queued.remove(&address);
        Some(address)
    }

    /// Marks an address as visited. An address never re-enters the unvisited state
    /// within one traversal.
    pub fn mark_visited(&mut self, address: u32) {
        self.visited.insert(address);
    }

    /// Whether an address has been visited in this traversal.
    #[must_use]
    pub fn is_visited(&self, address: u32) -> bool {
        self.visited.contains(&address)
    }

    /// The visited set.
    #[must_use]
    pub fn visited(&self) -> &BTreeSet<u32> {
        &self.visited
    }

    /// Clears all traversal state (visited, worklist, entry states, resolved
    /// branches) so a rewritten table can be re-analyzed with fresh knowledge.
    /// The event log survives across traversals.
    pub fn reset_traversal(&mut self) {
        self.visited.clear();
        self.worklist.clear();
        self.queued.clear();
        self.entry_states.clear();
        self.resolved_branches.clear();
        self.state = RegisterState::new(self.register_count);
    }

    // ---- resolved branches ----

    /// Records that the branch at `address` statically resolves to `target`.
    /// Later visits with weaker knowledge must clear the entry again.
    pub fn set_resolved(&mut self, address: u32, target: u32) {
        self.resolved_branches.insert(address, target);
    }

    /// Withdraws a resolution after the guard degraded to unknown.
    pub fn clear_resolved(&mut self, address: u32) {
        self.resolved_branches.remove(&address);
    }

    /// The statically resolved branches: address of the branch mapped to the single
    /// reachable successor address.
    #[must_use]
    pub fn resolved_branches(&self) -> &BTreeMap<u32, u32> {
        &self.resolved_branches
    }

    // ---- exception edges ----

    /// The handler entry addresses covering an address, in try/catch-clause order.
    #[must_use]
    pub fn exception_targets(&self, address: u32) -> Vec<u32> {
        let mut targets = Vec::new();
        for block in &self.try_blocks {
            if block.covers(address) {
                targets.extend_from_slice(&block.handlers);
            }
        }
        targets
    }

    /// All handler entry addresses declared by the method's try/catch table.
    #[must_use]
    pub fn handler_addresses(&self) -> BTreeSet<u32> {
        self.try_blocks
            .iter()
            .flat_map(|b| b.handlers.iter().copied())
            .collect()
    }

    // ---- events ----

    /// The event log.
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Mutable access to the event log for pass-side recording.
    pub fn events_mut(&mut self) -> &mut EventLog {
        &mut self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::{Opcode, Operand};

    fn single_return() -> MethodBody {
        MethodBody::new(
            "m",
            1,
            vec![DecodedInstruction::modeled(
                0,
                1,
                Opcode::ReturnVoid,
                Operand::None,
            )],
        )
    }

    #[test]
    fn duplicate_addresses_are_malformed() {
        let body = MethodBody::new(
            "m",
            1,
            vec![
                DecodedInstruction::modeled(0, 1, Opcode::Nop, Operand::None),
                DecodedInstruction::modeled(0, 1, Opcode::ReturnVoid, Operand::None),
            ],
        );
        let result = MethodContext::new(&body, &SimplifyConfig::default());
        assert!(matches!(result, Err(Error::MalformedMethod { .. })));
    }

    #[test]
    fn strict_mode_rejects_unmodeled() {
        let body = MethodBody::new(
            "m",
            1,
            vec![DecodedInstruction::unmodeled(
                0,
                1,
                "execute-inline",
                Operand::None,
            )],
        );
        let config = SimplifyConfig {
            strict_unsupported: true,
            ..SimplifyConfig::default()
        };
        let result = MethodContext::new(&body, &config);
        assert!(matches!(
            result,
            Err(Error::UnsupportedOpcode { address: 0, .. })
        ));
    }

    #[test]
    fn lenient_mode_records_unmodeled_once() {
        let body = MethodBody::new(
            "m",
            1,
            vec![
                DecodedInstruction::unmodeled(0, 1, "execute-inline", Operand::None),
                DecodedInstruction::modeled(1, 1, Opcode::ReturnVoid, Operand::None),
            ],
        );
        let ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();
        assert_eq!(ctx.events().unsupported_opcodes().len(), 1);
    }

    #[test]
    fn worklist_dedups_pending_addresses() {
        let mut ctx = MethodContext::new(&single_return(), &SimplifyConfig::default()).unwrap();
        ctx.push_pending(0);
        ctx.push_pending(0);
        assert_eq!(ctx.pop_pending(), Some(0));
        assert_eq!(ctx.pop_pending(), None);
    }

    #[test]
    fn merge_entry_state_reports_first_sighting_and_changes() {
        let mut ctx = MethodContext::new(&single_return(), &SimplifyConfig::default()).unwrap();

        let mut incoming = RegisterState::new(1);
        incoming.write(0, SymbolicValue::int(1));

        assert!(ctx.merge_entry_state(0, &incoming));
        assert!(!ctx.merge_entry_state(0, &incoming));

        let mut differing = RegisterState::new(1);
        differing.write(0, SymbolicValue::int(2));
        assert!(ctx.merge_entry_state(0, &differing));
        assert!(ctx.entry_state(0).unwrap().read(0).is_unknown());
    }

    #[test]
    fn exception_targets_follow_try_blocks() {
        let body = single_return().with_try_block(TryBlock::new(0, 1, vec![8, 12]));
        let ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();

        assert_eq!(ctx.exception_targets(0), vec![8, 12]);
        assert!(ctx.exception_targets(1).is_empty());
        assert_eq!(ctx.handler_addresses().len(), 2);
    }

    #[test]
    fn reset_traversal_keeps_events() {
        let body = MethodBody::new(
            "m",
            1,
            vec![
                DecodedInstruction::unmodeled(0, 1, "execute-inline", Operand::None),
                DecodedInstruction::modeled(1, 1, Opcode::ReturnVoid, Operand::None),
            ],
        );
        let mut ctx = MethodContext::new(&body, &SimplifyConfig::default()).unwrap();
        ctx.mark_visited(0);
        ctx.set_resolved(0, 1);

        ctx.reset_traversal();

        assert!(ctx.visited().is_empty());
        assert!(ctx.resolved_branches().is_empty());
        assert_eq!(ctx.events().len(), 1);
    }
}
