// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! The phased stimulus schedule.
//!
//! A [`Schedule`] is an ordered table of [`Phase`]s. Each phase runs for a
//! fixed number of iterations and draws one [`StimulusKind`] per iteration,
//! uniformly from its expanded table. Weights are implemented by repeating
//! a kind in that table.

use crate::{err::ScheduleError, stimulus::StimulusKind};
use rand::Rng;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phase {
    name: String,
    iterations: u64,
    table: Vec<StimulusKind>,
}

impl Phase {
    /// Creates a phase drawing each kind with probability proportional to
    /// its weight.
    pub fn weighted<S: Into<String>>(
        name: S,
        iterations: u64,
        weights: &[(StimulusKind, usize)],
    ) -> Result<Self, ScheduleError> {
        let name = name.into();
        if weights.is_empty() {
            return Err(ScheduleError::EmptyPhase(name));
        }
        if let Some(&(kind, _)) = weights.iter().find(|(_, weight)| *weight == 0) {
            return Err(ScheduleError::ZeroWeight { phase: name, kind });
        }
        let table = weights
            .iter()
            .flat_map(|&(kind, weight)| std::iter::repeat_n(kind, weight))
            .collect();
        Ok(Self {
            name,
            iterations,
            table,
        })
    }

    /// Creates a phase drawing uniformly from `kinds`, none of which may
    /// mutate the interval set.
    pub fn read_only<S: Into<String>>(
        name: S,
        iterations: u64,
        kinds: &[StimulusKind],
    ) -> Result<Self, ScheduleError> {
        let name = name.into();
        if let Some(&kind) = kinds.iter().find(|kind| kind.is_mutation()) {
            return Err(ScheduleError::MutationInReadOnlyPhase { phase: name, kind });
        }
        let weights: Vec<_> = kinds.iter().map(|&kind| (kind, 1)).collect();
        Self::weighted(name, iterations, &weights)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// The expanded draw table; duplicated entries carry the weights.
    #[inline]
    pub fn table(&self) -> &[StimulusKind] {
        &self.table
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.table.iter().all(|kind| !kind.is_mutation())
    }

    /// Returns how many table slots `kind` occupies.
    #[inline]
    pub fn weight_of(&self, kind: StimulusKind) -> usize {
        self.table.iter().filter(|&&k| k == kind).count()
    }

    /// Draws the stimulus kind for one iteration.
    #[inline]
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> StimulusKind {
        self.table[rng.random_range(0..self.table.len())]
    }
}

/// An ordered table of phases processed in sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    phases: Vec<Phase>,
}

impl Schedule {
    pub const STANDARD_GROWTH_ITERATIONS: u64 = 10_000;
    pub const STANDARD_CHURN_ITERATIONS: u64 = 10_000;
    pub const STANDARD_QUERY_ITERATIONS: u64 = 2_000;

    pub fn new(phases: Vec<Phase>) -> Result<Self, ScheduleError> {
        if phases.is_empty() {
            return Err(ScheduleError::NoPhases);
        }
        Ok(Self { phases })
    }

    /// The three-phase schedule: a growth phase with a strong preference for
    /// inserts, a churn phase with that preference weakened, and a final
    /// query-only phase that leaves the set untouched.
    pub fn standard(growth: u64, churn: u64, query: u64) -> Result<Self, ScheduleError> {
        use StimulusKind::*;
        let assertions: [(StimulusKind, usize); 3] =
            [(LookupAssert, 1), (FreeBottomUpAssert, 1), (FreeTopDownAssert, 1)];
        let mutations = |insert_weight: usize| -> [(StimulusKind, usize); 3] {
            [(Insert, insert_weight), (Remove, 1), (Adjust, 1)]
        };

        let growth_weights: Vec<_> = mutations(3).into_iter().chain(assertions).collect();
        let churn_weights: Vec<_> = mutations(2).into_iter().chain(assertions).collect();
        Self::new(vec![
            Phase::weighted("growth", growth, &growth_weights)?,
            Phase::weighted("churn", churn, &churn_weights)?,
            Phase::read_only(
                "query",
                query,
                &[LookupAssert, FreeBottomUpAssert, FreeTopDownAssert],
            )?,
        ])
    }

    #[inline]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn total_iterations(&self) -> u64 {
        self.phases.iter().map(Phase::iterations).sum()
    }

    /// Yields each phase with the range of iteration indices it covers.
    ///
    /// Iteration indices double as case ids and start at zero.
    pub fn entries(&self) -> impl Iterator<Item = (Range<u64>, &Phase)> + '_ {
        self.phases.iter().scan(0u64, |start, phase| {
            let range = *start..*start + phase.iterations();
            *start = range.end;
            Some((range, phase))
        })
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::standard(
            Self::STANDARD_GROWTH_ITERATIONS,
            Self::STANDARD_CHURN_ITERATIONS,
            Self::STANDARD_QUERY_ITERATIONS,
        )
        .expect("standard schedule is valid")
    }
}
