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

use crate::oracle::{Direction, FreeQuery};
use serde::Serialize;
use std::fmt::Display;
use vmatree_gen_core::{AddrVariable, primitives::Interval};

/// The operations the scheduler chooses between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StimulusKind {
    Insert,
    Remove,
    Adjust,
    LookupAssert,
    FreeBottomUpAssert,
    FreeTopDownAssert,
}

impl StimulusKind {
    pub const ALL: [StimulusKind; 6] = [
        StimulusKind::Insert,
        StimulusKind::Remove,
        StimulusKind::Adjust,
        StimulusKind::LookupAssert,
        StimulusKind::FreeBottomUpAssert,
        StimulusKind::FreeTopDownAssert,
    ];

    /// Returns `true` for kinds that change the interval set.
    #[inline]
    pub const fn is_mutation(self) -> bool {
        matches!(
            self,
            StimulusKind::Insert | StimulusKind::Remove | StimulusKind::Adjust
        )
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            StimulusKind::Insert => "insert",
            StimulusKind::Remove => "remove",
            StimulusKind::Adjust => "adjust",
            StimulusKind::LookupAssert => "lookup_assert",
            StimulusKind::FreeBottomUpAssert => "free_bottomup_assert",
            StimulusKind::FreeTopDownAssert => "free_topdown_assert",
        }
    }
}

impl Display for StimulusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One dispatched stimulus together with its ground truth.
///
/// Mutations carry only their arguments. Assertions carry the case id
/// used for failure attribution and the result the reference model
/// computed for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stimulus<A> {
    Insert {
        first: A,
        last: A,
    },
    Remove {
        point: A,
    },
    Adjust {
        point: A,
        first: A,
        last: A,
    },
    LookupAssert {
        case_id: u64,
        address: A,
        expected: Option<Interval<A>>,
    },
    FreeAssert {
        case_id: u64,
        query: FreeQuery<A>,
        expected: Option<A>,
    },
}

/// The flat shape of an emitted call: a name, an optional case id and the
/// positional unsigned arguments that follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call<A> {
    pub name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<u64>,
    pub args: Vec<A>,
}

impl<A: AddrVariable> Stimulus<A> {
    pub fn kind(&self) -> StimulusKind {
        match self {
            Stimulus::Insert { .. } => StimulusKind::Insert,
            Stimulus::Remove { .. } => StimulusKind::Remove,
            Stimulus::Adjust { .. } => StimulusKind::Adjust,
            Stimulus::LookupAssert { .. } => StimulusKind::LookupAssert,
            Stimulus::FreeAssert { query, .. } => match query.direction() {
                Direction::BottomUp => StimulusKind::FreeBottomUpAssert,
                Direction::TopDown => StimulusKind::FreeTopDownAssert,
            },
        }
    }

    #[inline]
    pub fn case_id(&self) -> Option<u64> {
        match self {
            Stimulus::LookupAssert { case_id, .. } | Stimulus::FreeAssert { case_id, .. } => {
                Some(*case_id)
            }
            _ => None,
        }
    }

    /// Returns `Some(true)` if an assertion expects a match, `Some(false)`
    /// if it expects nil, and `None` for mutations.
    #[inline]
    pub fn expects_match(&self) -> Option<bool> {
        match self {
            Stimulus::LookupAssert { expected, .. } => Some(expected.is_some()),
            Stimulus::FreeAssert { expected, .. } => Some(expected.is_some()),
            _ => None,
        }
    }

    /// Lowers the stimulus into the call the harness understands.
    ///
    /// An unbounded `high` is passed as the all-ones sentinel.
    pub fn to_call(&self) -> Call<A> {
        let (name, args) = match *self {
            Stimulus::Insert { first, last } => ("insert_node", vec![first, last]),
            Stimulus::Remove { point } => ("remove_node", vec![point]),
            Stimulus::Adjust { point, first, last } => ("adjust_node", vec![point, first, last]),
            Stimulus::LookupAssert {
                address, expected, ..
            } => match expected {
                Some(hit) => ("assert_lookup_eq", vec![address, hit.first(), hit.last()]),
                None => ("assert_lookup_nil", vec![address]),
            },
            Stimulus::FreeAssert {
                query, expected, ..
            } => {
                let mut args = vec![
                    query.size(),
                    query.align(),
                    query.low(),
                    query.high_or_sentinel(),
                ];
                let name = match (query.direction(), expected) {
                    (Direction::BottomUp, Some(_)) => "assert_bottomup_free_eq",
                    (Direction::BottomUp, None) => "assert_bottomup_free_nil",
                    (Direction::TopDown, Some(_)) => "assert_topdown_free_eq",
                    (Direction::TopDown, None) => "assert_topdown_free_nil",
                };
                args.extend(expected);
                (name, args)
            }
        };
        Call {
            name,
            case_id: self.case_id(),
            args,
        }
    }
}
