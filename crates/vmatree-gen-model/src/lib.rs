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

//! # VMA Tree Stimulus Model (`vmatree-gen-model`)
//!
//! This crate generates randomised test stimuli for a VMA tree: a kernel
//! structure storing disjoint, closed address intervals that supports
//! insertion, removal, in-place adjustment, point lookup and aligned
//! free-region search in both directions.
//!
//! A reference model is kept in lockstep with the tree under test. Every
//! emitted mutation is applied to the model, and every emitted assertion
//! carries the result the model computed, so the consumer only has to replay
//! the stream against the real tree and count mismatches.
//!
//! ## Key Pieces
//!
//! - **`IntervalSet<A>`**: sorted, disjoint intervals with binary-search
//!   lookup and on-demand gap derivation.
//!
//! - **`FreeRegionOracle`**: the expected answer of
//!   `find_free_{bottomup,topdown}` for a `FreeQuery`.
//!
//! - **`Schedule`**: the phases of a run and the weighted tables stimulus
//!   kinds are drawn from.
//!
//! - **`StimulusGenerator`**: drives a seeded run and hands each
//!   `Stimulus` to an `Emitter`.
//!
//! - **`CallWriter` / `JsonLinesWriter`**: render stimuli as C harness
//!   statements or as JSON lines.

pub mod emit;
pub mod err;
pub mod generator;
pub mod intervalset;
pub mod oracle;
pub mod schedule;
pub mod stimulus;
