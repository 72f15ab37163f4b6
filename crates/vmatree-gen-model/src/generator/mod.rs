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

//! Randomised stimulus generation.
//!
//! [`StimulusGenerator`] keeps an [`IntervalSet`] mirror of the tree under
//! test. Every iteration it draws a stimulus kind from the current phase,
//! synthesises parameters that are legal against the mirror, applies
//! mutations to the mirror and computes the expected result of assertions.
//! Identical seeds yield identical streams.

mod config;
mod err;

pub use config::{GeneratorConfig, GeneratorConfigBuilder};
pub use err::GeneratorConfigBuildError;

use crate::{
    emit::Emitter,
    intervalset::IntervalSet,
    oracle::{Direction, FreeQuery, FreeRegionOracle},
    stimulus::{Stimulus, StimulusKind},
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, trace};
use vmatree_gen_core::primitives::Interval;

/// Per-kind counters of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindStats {
    pub drawn: u64,
    pub emitted: u64,
}

/// What a run produced.
///
/// A draw that could not be turned into a stimulus (an insert without room,
/// a remove or adjust on an empty set) counts as a miss. Misses still
/// consume a case id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    iterations: u64,
    emitted: u64,
    misses: u64,
    expected_match: u64,
    expected_no_match: u64,
    final_intervals: usize,
    per_kind: BTreeMap<&'static str, KindStats>,
}

impl RunStats {
    #[inline]
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    #[inline]
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    #[inline]
    pub fn expected_match(&self) -> u64 {
        self.expected_match
    }

    #[inline]
    pub fn expected_no_match(&self) -> u64 {
        self.expected_no_match
    }

    #[inline]
    pub fn final_intervals(&self) -> usize {
        self.final_intervals
    }

    #[inline]
    pub fn kind(&self, kind: StimulusKind) -> KindStats {
        self.per_kind.get(kind.name()).copied().unwrap_or_default()
    }

    fn record(&mut self, kind: StimulusKind, stimulus: Option<&Stimulus<u64>>) {
        self.iterations += 1;
        let entry = self.per_kind.entry(kind.name()).or_default();
        entry.drawn += 1;
        let Some(stimulus) = stimulus else {
            self.misses += 1;
            return;
        };
        entry.emitted += 1;
        self.emitted += 1;
        match stimulus.expects_match() {
            Some(true) => self.expected_match += 1,
            Some(false) => self.expected_no_match += 1,
            None => {}
        }
    }
}

pub struct StimulusGenerator<R = ChaCha8Rng> {
    config: GeneratorConfig,
    set: IntervalSet<u64>,
    oracle: FreeRegionOracle,
    rng: R,
    stats: RunStats,
}

impl From<GeneratorConfig> for StimulusGenerator {
    fn from(config: GeneratorConfig) -> Self {
        Self::new(config)
    }
}

impl StimulusGenerator {
    /// Creates a generator whose random stream is derived from the
    /// configured seed.
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed());
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> StimulusGenerator<R> {
    pub fn with_rng(config: GeneratorConfig, rng: R) -> Self {
        Self {
            oracle: FreeRegionOracle::new(config.unbounded_top_down()),
            set: IntervalSet::new(),
            stats: RunStats::default(),
            config,
            rng,
        }
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The mirror of the tree under test.
    #[inline]
    pub fn intervals(&self) -> &IntervalSet<u64> {
        &self.set
    }

    #[inline]
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Runs the whole schedule, handing every stimulus to `emitter` in
    /// order, and returns the statistics of the run.
    #[instrument(skip_all, fields(seed = self.config.seed()))]
    pub fn run<E: Emitter<u64>>(&mut self, emitter: &mut E) -> Result<RunStats, E::Error> {
        let schedule = self.config.schedule().clone();
        for (range, phase) in schedule.entries() {
            debug!(
                phase = phase.name(),
                first_case = range.start,
                iterations = phase.iterations(),
                intervals = self.set.len(),
                "Entering phase"
            );
            for case_id in range {
                let kind = phase.draw(&mut self.rng);
                if let Some(stimulus) = self.step(case_id, kind) {
                    emitter.emit(&stimulus)?;
                }
            }
        }
        emitter.finish()?;

        self.stats.final_intervals = self.set.len();
        info!(
            iterations = self.stats.iterations,
            emitted = self.stats.emitted,
            misses = self.stats.misses,
            intervals = self.stats.final_intervals,
            "Generation finished"
        );
        Ok(self.stats.clone())
    }

    /// Synthesises one stimulus of `kind` against the current state.
    ///
    /// Mutations are applied to the mirror before returning. `None` means
    /// the kind could not be realised in the current state.
    pub fn step(&mut self, case_id: u64, kind: StimulusKind) -> Option<Stimulus<u64>> {
        let stimulus = match kind {
            StimulusKind::Insert => self.insert(),
            StimulusKind::Remove => self.remove(),
            StimulusKind::Adjust => self.adjust(),
            StimulusKind::LookupAssert => Some(self.lookup(case_id)),
            StimulusKind::FreeBottomUpAssert => Some(self.free(case_id, Direction::BottomUp)),
            StimulusKind::FreeTopDownAssert => Some(self.free(case_id, Direction::TopDown)),
        };
        match &stimulus {
            Some(s) => trace!(case_id, stimulus = ?s, "Synthesised"),
            None => trace!(case_id, %kind, "Nothing to do"),
        }
        self.stats.record(kind, stimulus.as_ref());
        stimulus
    }

    /// Draws a sub-interval of `window`, choosing at random which bound is
    /// fixed first so that both short and long intervals appear.
    fn draw_within(&mut self, window: Interval<u64>) -> Interval<u64> {
        let (lo, hi) = (window.first(), window.last());
        if self.rng.random_bool(0.5) {
            let first = self.rng.random_range(lo..=hi);
            let last = self.rng.random_range(first..=hi);
            Interval::new(first, last)
        } else {
            let last = self.rng.random_range(lo..=hi);
            let first = self.rng.random_range(lo..=last);
            Interval::new(first, last)
        }
    }

    /// Picks an existing interval and a point inside it.
    fn pick_existing(&mut self) -> Option<(usize, u64)> {
        if self.set.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.set.len());
        let target = self.set[index];
        let point = self.rng.random_range(target.first()..=target.last());
        Some((index, point))
    }

    fn insert(&mut self) -> Option<Stimulus<u64>> {
        let index = self.rng.random_range(0..=self.set.len());
        let window = self.set.insert_window(index, self.config.address_space())?;
        let interval = self.draw_within(window);
        self.set.insert_at(index, interval);
        Some(Stimulus::Insert {
            first: interval.first(),
            last: interval.last(),
        })
    }

    fn remove(&mut self) -> Option<Stimulus<u64>> {
        let (index, point) = self.pick_existing()?;
        self.set.remove_at(index);
        Some(Stimulus::Remove { point })
    }

    fn adjust(&mut self) -> Option<Stimulus<u64>> {
        let (index, point) = self.pick_existing()?;
        let window = self.set.adjust_window(index, self.config.address_space())?;
        let interval = self.draw_within(window);
        self.set.replace_at(index, interval);
        Some(Stimulus::Adjust {
            point,
            first: interval.first(),
            last: interval.last(),
        })
    }

    /// Probes either a gap or an interval: an index is drawn over the gaps
    /// and the address is taken from that gap up to the end of the interval
    /// closing it, or up to the end of the lookup space past the tail.
    fn lookup(&mut self, case_id: u64) -> Stimulus<u64> {
        let space = self.config.lookup_space();
        let index = self.rng.random_range(0..=self.set.len());
        let hi = self.set.get(index).map_or(space.last(), |iv| iv.last());
        let lo = match index {
            0 => space.first(),
            _ => self.set[index - 1].last().saturating_add(1),
        }
        .min(hi);
        let address = self.rng.random_range(lo..=hi);
        Stimulus::LookupAssert {
            case_id,
            address,
            expected: self.set.lookup(address),
        }
    }

    fn free(&mut self, case_id: u64, direction: Direction) -> Stimulus<u64> {
        let query = self.draw_query(direction);
        Stimulus::FreeAssert {
            case_id,
            expected: self.oracle.find_free(&self.set, &query),
            query,
        }
    }

    fn draw_query(&mut self, direction: Direction) -> FreeQuery<u64> {
        let align = 1u64 << self.rng.random_range(0..=self.config.max_align_log2());
        let sizes = self.config.size_range();
        let size = self.rng.random_range(sizes.first()..=sizes.last());
        let space = self.config.address_space();
        let low = if self.rng.random_bool(0.5) {
            space.first()
        } else {
            self.rng.random_range(space.first()..=space.last())
        };
        // may fall below `low`; such queries must come back empty
        let high = if self.rng.random_bool(0.5) {
            None
        } else {
            let range = self.config.high_range();
            Some(self.rng.random_range(range.first()..=range.last()))
        };
        FreeQuery::from_parts(size, align, low, high, direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Phase, Schedule};

    fn small_config(seed: u64) -> GeneratorConfig {
        GeneratorConfigBuilder::new()
            .address_space(0, 4_095)
            .lookup_overshoot(64)
            .max_align_log2(5)
            .size_range(1, 96)
            .high_spread(512)
            .phase_lengths(400, 400, 300)
            .seed(seed)
            .build()
            .unwrap()
    }

    fn collect(config: GeneratorConfig) -> (Vec<Stimulus<u64>>, RunStats) {
        let mut generator = StimulusGenerator::new(config);
        let mut out = Vec::new();
        let stats = generator.run(&mut out).unwrap();
        (out, stats)
    }

    fn occupied(model: &[Interval<u64>], block: Interval<u64>) -> bool {
        model.iter().any(|iv| iv.overlaps(&block))
    }

    /// Straightforward scan for the answer of a free query.
    fn scan_free(model: &[Interval<u64>], query: &FreeQuery<u64>) -> Option<u64> {
        let high = query.high_or_sentinel();
        let fits = |a: u64| {
            a % query.align() == 0
                && a.checked_add(query.size() - 1).is_some_and(|end| end <= high)
                && !occupied(model, Interval::new(a, a + query.size() - 1))
        };
        match query.direction() {
            Direction::BottomUp => (query.low()..=high).find(|&a| fits(a)),
            Direction::TopDown => {
                let top = high.checked_sub(query.size() - 1)?;
                (query.low()..=top).rev().find(|&a| fits(a))
            }
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let (a, sa) = collect(small_config(7));
        let (b, sb) = collect(small_config(7));
        assert_eq!(a, b);
        assert_eq!(sa, sb);

        let (c, _) = collect(small_config(8));
        assert_ne!(a, c);
    }

    #[test]
    fn stats_account_for_every_iteration() {
        let config = small_config(11);
        let total = config.schedule().total_iterations();
        let (out, stats) = collect(config);

        assert_eq!(stats.iterations(), total);
        assert_eq!(stats.emitted() + stats.misses(), total);
        assert_eq!(stats.emitted(), out.len() as u64);
        let asserts = out.iter().filter(|s| s.case_id().is_some()).count() as u64;
        assert_eq!(stats.expected_match() + stats.expected_no_match(), asserts);
        let drawn: u64 = StimulusKind::ALL.iter().map(|&k| stats.kind(k).drawn).sum();
        assert_eq!(drawn, total);
    }

    #[test]
    fn case_ids_are_increasing_and_bounded() {
        let config = small_config(3);
        let total = config.schedule().total_iterations();
        let (out, _) = collect(config);
        let ids: Vec<u64> = out.iter().filter_map(Stimulus::case_id).collect();
        assert!(!ids.is_empty());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert!(ids.iter().all(|&id| id < total));
    }

    #[test]
    fn query_phase_does_not_mutate() {
        let config = small_config(5);
        let query_start = config.schedule().total_iterations() - 300;
        let mut generator = StimulusGenerator::new(config);
        let mut out = Vec::new();
        generator.run(&mut out).unwrap();

        let first_query = out
            .iter()
            .position(|s| s.case_id().is_some_and(|id| id >= query_start))
            .unwrap();
        assert!(out[first_query..].iter().all(|s| !s.kind().is_mutation()));
    }

    #[test]
    fn replay_agrees_with_naive_model() {
        let config = small_config(42);
        let lookup_last = config.lookup_space().last();
        let (out, _) = collect(config);

        let mut model: Vec<Interval<u64>> = Vec::new();
        for stimulus in &out {
            match *stimulus {
                Stimulus::Insert { first, last } => {
                    let iv = Interval::new(first, last);
                    assert!(last <= 4_095);
                    assert!(!occupied(&model, iv), "insert {} overlaps", iv);
                    model.push(iv);
                }
                Stimulus::Remove { point } => {
                    let at = model.iter().position(|iv| iv.contains(point)).unwrap();
                    model.swap_remove(at);
                }
                Stimulus::Adjust { point, first, last } => {
                    let at = model.iter().position(|iv| iv.contains(point)).unwrap();
                    model.swap_remove(at);
                    let iv = Interval::new(first, last);
                    assert!(!occupied(&model, iv), "adjust to {} overlaps", iv);
                    model.push(iv);
                }
                Stimulus::LookupAssert {
                    address, expected, ..
                } => {
                    assert!(address <= lookup_last);
                    let hit = model.iter().copied().find(|iv| iv.contains(address));
                    assert_eq!(expected, hit, "lookup {}", address);
                }
                Stimulus::FreeAssert {
                    query, expected, ..
                } => {
                    let unbounded_down =
                        query.direction() == Direction::TopDown && query.high().is_none();
                    if unbounded_down {
                        assert_eq!(expected, None);
                    } else {
                        assert_eq!(expected, scan_free(&model, &query), "{}", query);
                    }
                }
            }
        }
    }

    #[test]
    fn mirror_invariants_hold_after_every_step() {
        let mut generator = StimulusGenerator::new(small_config(9));
        let schedule = Schedule::new(vec![
            Phase::weighted(
                "mixed",
                2_000,
                &[
                    (StimulusKind::Insert, 3),
                    (StimulusKind::Remove, 1),
                    (StimulusKind::Adjust, 2),
                ],
            )
            .unwrap(),
        ])
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for (range, phase) in schedule.entries() {
            for case_id in range {
                generator.step(case_id, phase.draw(&mut rng));
                assert!(IntervalSet::<u64>::are_invariants_held(
                    generator.intervals().as_slice()
                ));
                assert!(generator.intervals().iter().all(|iv| iv.last() <= 4_095));
            }
        }
        assert!(!generator.intervals().is_empty());
    }

    #[test]
    fn misses_on_empty_or_full_state() {
        let config = GeneratorConfigBuilder::new()
            .address_space(0, 3)
            .seed(1)
            .build()
            .unwrap();
        let mut generator = StimulusGenerator::new(config);
        assert_eq!(generator.step(0, StimulusKind::Remove), None);
        assert_eq!(generator.step(1, StimulusKind::Adjust), None);

        // four single addresses fill the space at most; keep inserting
        for id in 2..200 {
            generator.step(id, StimulusKind::Insert);
        }
        let covered: u64 = generator.intervals().iter().map(|iv| iv.span() + 1).sum();
        assert!(covered <= 4);
        assert!(generator.stats().misses() >= 2);
        assert_eq!(generator.stats().kind(StimulusKind::Remove).emitted, 0);
    }

    #[test]
    fn lookup_on_empty_set_is_nil() {
        let mut generator = StimulusGenerator::new(small_config(2));
        for id in 0..50 {
            let Some(Stimulus::LookupAssert { expected, .. }) =
                generator.step(id, StimulusKind::LookupAssert)
            else {
                panic!("lookup must always produce an assertion");
            };
            assert_eq!(expected, None);
        }
    }

    #[test]
    fn draw_within_stays_inside_window() {
        let mut generator = StimulusGenerator::new(small_config(4));
        let window = Interval::new(100u64, 110);
        for _ in 0..500 {
            let iv = generator.draw_within(window);
            assert!(window.contains_interval(&iv));
        }
        let single = Interval::new(7u64, 7);
        assert_eq!(generator.draw_within(single), single);
    }
}
