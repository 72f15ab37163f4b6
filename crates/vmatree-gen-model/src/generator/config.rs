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

use std::fmt::Display;

use rand::Rng;
use vmatree_gen_core::primitives::Interval;

use super::err::GeneratorConfigBuildError;
use crate::{oracle::UnboundedTopDown, schedule::Schedule};

/// Configuration for one generator run.
///
/// The defaults reproduce the reference test suite: a ten-million address
/// space, lookups probing up to 3000 addresses past its end, free queries
/// with sizes below one million and alignments up to `2^24`.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub(crate) address_space: Interval<u64>,
    pub(crate) lookup_overshoot: u64,
    pub(crate) max_align_log2: u32,
    pub(crate) size_range: Interval<u64>,
    pub(crate) high_spread: u64,
    pub(crate) schedule: Schedule,
    pub(crate) unbounded_top_down: UnboundedTopDown,
    pub(crate) seed: u64,
}

impl GeneratorConfig {
    pub const DEFAULT_ADDRESS_SPACE_LAST: u64 = 9_999_999;
    pub const DEFAULT_LOOKUP_OVERSHOOT: u64 = 3_000;
    pub const DEFAULT_MAX_ALIGN_LOG2: u32 = 24;
    pub const DEFAULT_MAX_SIZE: u64 = 999_999;
    pub const DEFAULT_HIGH_SPREAD: u64 = 1_000_000;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        address_space: Interval<u64>,
        lookup_overshoot: u64,
        max_align_log2: u32,
        size_range: Interval<u64>,
        high_spread: u64,
        schedule: Schedule,
        unbounded_top_down: UnboundedTopDown,
        seed: u64,
    ) -> Result<Self, GeneratorConfigBuildError> {
        if size_range.first() == 0 {
            return Err(GeneratorConfigBuildError::ZeroMinSize);
        }
        if max_align_log2 >= u64::BITS {
            return Err(GeneratorConfigBuildError::AlignExponentTooLarge(
                max_align_log2,
            ));
        }
        if address_space.last().checked_add(lookup_overshoot).is_none() {
            return Err(GeneratorConfigBuildError::LookupOvershootOverflow {
                space_last: address_space.last(),
                overshoot: lookup_overshoot,
            });
        }

        Ok(Self {
            address_space,
            lookup_overshoot,
            max_align_log2,
            size_range,
            high_spread,
            schedule,
            unbounded_top_down,
            seed,
        })
    }

    /// The range inserted and adjusted intervals are drawn from.
    #[inline]
    pub fn address_space(&self) -> Interval<u64> {
        self.address_space
    }

    #[inline]
    pub fn lookup_overshoot(&self) -> u64 {
        self.lookup_overshoot
    }

    /// The range lookup probes are drawn from: the address space extended
    /// by the overshoot, so that misses past the last interval are covered.
    #[inline]
    pub fn lookup_space(&self) -> Interval<u64> {
        Interval::new(
            self.address_space.first(),
            self.address_space.last() + self.lookup_overshoot,
        )
    }

    #[inline]
    pub fn max_align_log2(&self) -> u32 {
        self.max_align_log2
    }

    #[inline]
    pub fn size_range(&self) -> Interval<u64> {
        self.size_range
    }

    #[inline]
    pub fn high_spread(&self) -> u64 {
        self.high_spread
    }

    /// The range bounded `high` values are drawn from, centred on the top
    /// of the address space.
    #[inline]
    pub fn high_range(&self) -> Interval<u64> {
        let top = self.address_space.last();
        Interval::new(
            top.saturating_sub(self.high_spread),
            top.saturating_add(self.high_spread),
        )
    }

    #[inline]
    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    #[inline]
    pub fn unbounded_top_down(&self) -> UnboundedTopDown {
        self.unbounded_top_down
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            address_space: Interval::new(0, Self::DEFAULT_ADDRESS_SPACE_LAST),
            lookup_overshoot: Self::DEFAULT_LOOKUP_OVERSHOOT,
            max_align_log2: Self::DEFAULT_MAX_ALIGN_LOG2,
            size_range: Interval::new(1, Self::DEFAULT_MAX_SIZE),
            high_spread: Self::DEFAULT_HIGH_SPREAD,
            schedule: Schedule::default(),
            unbounded_top_down: UnboundedTopDown::default(),
            seed: 42,
        }
    }
}

impl Display for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phases: Vec<String> = self
            .schedule
            .phases()
            .iter()
            .map(|p| format!("{}={}", p.name(), p.iterations()))
            .collect();
        write!(
            f,
            "GeneratorConfig {{ \
             address_space: {}, lookup_overshoot: {}, max_align_log2: {}, \
             size_range: {}, high_spread: {}, phases: [{}], \
             unbounded_top_down: {:?}, seed: {} \
             }}",
            self.address_space,
            self.lookup_overshoot,
            self.max_align_log2,
            self.size_range,
            self.high_spread,
            phases.join(", "),
            self.unbounded_top_down,
            self.seed
        )
    }
}

/// Builder for `GeneratorConfig`.
///
/// Every field starts at its reference default except the seed, which is
/// drawn from the thread RNG unless [`GeneratorConfigBuilder::seed`] is set.
#[derive(Debug, Clone)]
pub struct GeneratorConfigBuilder {
    address_space: Interval<u64>,
    lookup_overshoot: u64,
    max_align_log2: u32,
    size_range: Interval<u64>,
    high_spread: u64,
    phase_lengths: (u64, u64, u64),
    schedule: Option<Schedule>,
    unbounded_top_down: UnboundedTopDown,
    seed: u64,
}

impl Default for GeneratorConfigBuilder {
    fn default() -> Self {
        let defaults = GeneratorConfig::default();
        Self {
            address_space: defaults.address_space,
            lookup_overshoot: defaults.lookup_overshoot,
            max_align_log2: defaults.max_align_log2,
            size_range: defaults.size_range,
            high_spread: defaults.high_spread,
            phase_lengths: (
                Schedule::STANDARD_GROWTH_ITERATIONS,
                Schedule::STANDARD_CHURN_ITERATIONS,
                Schedule::STANDARD_QUERY_ITERATIONS,
            ),
            schedule: None,
            unbounded_top_down: defaults.unbounded_top_down,
            seed: rand::rng().random(),
        }
    }
}

impl GeneratorConfigBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address_space(mut self, first: u64, last: u64) -> Self {
        self.address_space = Interval::new(first, last);
        self
    }
    pub fn lookup_overshoot(mut self, v: u64) -> Self {
        self.lookup_overshoot = v;
        self
    }
    pub fn max_align_log2(mut self, v: u32) -> Self {
        self.max_align_log2 = v;
        self
    }
    pub fn size_range(mut self, min: u64, max: u64) -> Self {
        self.size_range = Interval::new(min, max);
        self
    }
    pub fn high_spread(mut self, v: u64) -> Self {
        self.high_spread = v;
        self
    }

    /// Sets the iteration counts of the standard three-phase schedule.
    pub fn phase_lengths(mut self, growth: u64, churn: u64, query: u64) -> Self {
        self.phase_lengths = (growth, churn, query);
        self
    }

    /// Replaces the standard schedule altogether.
    pub fn schedule(mut self, v: Schedule) -> Self {
        self.schedule = Some(v);
        self
    }
    pub fn unbounded_top_down(mut self, v: UnboundedTopDown) -> Self {
        self.unbounded_top_down = v;
        self
    }
    pub fn random_seed(mut self) -> Self {
        self.seed = rand::rng().random();
        self
    }
    #[inline]
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    pub fn build(self) -> Result<GeneratorConfig, GeneratorConfigBuildError> {
        let schedule = match self.schedule {
            Some(schedule) => schedule,
            None => {
                let (growth, churn, query) = self.phase_lengths;
                Schedule::standard(growth, churn, query)?
            }
        };

        GeneratorConfig::new(
            self.address_space,
            self.lookup_overshoot,
            self.max_align_log2,
            self.size_range,
            self.high_spread,
            schedule,
            self.unbounded_top_down,
            self.seed,
        )
    }
}
