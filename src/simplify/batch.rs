//! Method-granular parallel simplification.
//!
//! Methods are independent units of work with no shared mutable state, so a worker
//! pool processes distinct methods' contexts in parallel with no synchronization
//! beyond the concurrent report map. Failed methods are never dropped: their
//! original instructions are carried in the outcome so the caller can emit them
//! unchanged.

use std::sync::Arc;

use dashmap::DashMap;
use rayon::prelude::*;

use crate::{
    bytecode::{DecodedInstruction, MethodBody},
    simplify::{config::SimplifyConfig, result::MethodSimplification, Simplifier},
    Error,
};

/// The outcome of simplifying one method in a batch.
#[derive(Debug)]
pub enum MethodOutcome {
    /// The pipeline ran to completion.
    Simplified(MethodSimplification),
    /// The pipeline aborted; the method's original instructions are passed through
    /// unchanged together with the error.
    Skipped {
        /// The unmodified input instructions, to be emitted as-is
        instructions: Vec<DecodedInstruction>,
        /// Why simplification was abandoned
        error: Error,
    },
}

impl MethodOutcome {
    /// The simplification result, if the pipeline completed.
    #[must_use]
    pub fn simplified(&self) -> Option<&MethodSimplification> {
        match self {
            MethodOutcome::Simplified(s) => Some(s),
            MethodOutcome::Skipped { .. } => None,
        }
    }
}

/// Per-method outcomes of a batch run, keyed by method name.
#[derive(Debug, Default)]
pub struct BatchReport {
    outcomes: DashMap<Arc<str>, MethodOutcome>,
}

impl BatchReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        BatchReport::default()
    }

    /// The outcome for a method.
    #[must_use]
    pub fn get(
        &self,
        name: &str,
    ) -> Option<dashmap::mapref::one::Ref<'_, Arc<str>, MethodOutcome>> {
        self.outcomes.get(name)
    }

    /// Number of processed methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether the report is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of methods the pipeline completed on.
    #[must_use]
    pub fn simplified_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|entry| entry.value().simplified().is_some())
            .count()
    }

    /// Number of methods passed through unchanged due to an error.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.len() - self.simplified_count()
    }

    /// Number of methods whose instruction stream actually changed.
    #[must_use]
    pub fn changed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|entry| entry.value().simplified().is_some_and(|s| s.changed))
            .count()
    }

    /// The underlying concurrent map, for iteration.
    #[must_use]
    pub fn outcomes(&self) -> &DashMap<Arc<str>, MethodOutcome> {
        &self.outcomes
    }
}

/// Simplifies a batch of methods on a worker pool.
///
/// Results are deterministic: each method's pipeline is sequential and methods share
/// nothing, so a parallel run produces exactly what a sequential run would.
#[must_use]
pub fn simplify_methods(bodies: &[MethodBody], config: &SimplifyConfig) -> BatchReport {
    let simplifier = Simplifier::new(config.clone());
    let report = BatchReport::new();

    bodies.par_iter().for_each(|body| {
        let outcome = match simplifier.simplify(body) {
            Ok(simplified) => MethodOutcome::Simplified(simplified),
            Err(error) => MethodOutcome::Skipped {
                instructions: body.instructions.clone(),
                error,
            },
        };
        report.outcomes.insert(Arc::clone(&body.name), outcome);
    });

    report
}
