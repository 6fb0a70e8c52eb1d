//! ソルバー境界

use crate::program::{Atom, Program};
use crate::SolverError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One answer set: the atoms true in it
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnswerSet {
    pub atoms: BTreeSet<Atom>,
}

impl AnswerSet {
    pub fn new(atoms: impl IntoIterator<Item = Atom>) -> Self {
        Self {
            atoms: atoms.into_iter().collect(),
        }
    }

    pub fn contains(&self, atom: &Atom) -> bool {
        self.atoms.contains(atom)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// Shared flag for stopping an in-flight solver call from another thread
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can guard the next call
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Upper bound on returned answer sets; 0 means all
    pub max_models: usize,
    pub timeout: Option<Duration>,
    pub cancel: CancelToken,
}

impl SolveOptions {
    pub fn first_model() -> Self {
        Self {
            max_models: 1,
            ..Self::default()
        }
    }

    pub fn deadline(&self, start: Instant) -> Option<Instant> {
        self.timeout.map(|t| start + t)
    }
}

/// Answer-set solver backend
pub trait Solver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Compute up to `options.max_models` answer sets of `program`.
    /// An empty result means the program has no answer set.
    fn solve(&self, program: &Program, options: &SolveOptions) -> Result<Vec<AnswerSet>, SolverError>;
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn solve(&self, program: &Program, options: &SolveOptions) -> Result<Vec<AnswerSet>, SolverError> {
        (**self).solve(program, options)
    }
}
