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

use vmatree_gen_core::primitives::Interval;

use crate::stimulus::StimulusKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalSetError<A> {
    Overlap {
        interval: Interval<A>,
        existing: Interval<A>,
    },
    NotContained(A),
}

impl<A: Display> Display for IntervalSetError<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use IntervalSetError::*;
        match self {
            Overlap { interval, existing } => write!(
                f,
                "IntervalSetError: {} overlaps existing interval {}",
                interval, existing
            ),
            NotContained(point) => {
                write!(f, "IntervalSetError: no interval contains {}", point)
            }
        }
    }
}

impl<A: Display + std::fmt::Debug> std::error::Error for IntervalSetError<A> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeQueryError<A> {
    ZeroSize,
    AlignNotPowerOfTwo(A),
}

impl<A: Display> Display for FreeQueryError<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use FreeQueryError::*;
        match self {
            ZeroSize => write!(f, "FreeQueryError: size must be greater than zero"),
            AlignNotPowerOfTwo(align) => {
                write!(f, "FreeQueryError: alignment {} is not a power of two", align)
            }
        }
    }
}

impl<A: Display + std::fmt::Debug> std::error::Error for FreeQueryError<A> {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    NoPhases,
    EmptyPhase(String),
    ZeroWeight { phase: String, kind: StimulusKind },
    MutationInReadOnlyPhase { phase: String, kind: StimulusKind },
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ScheduleError::*;
        match self {
            NoPhases => write!(f, "ScheduleError: a schedule needs at least one phase"),
            EmptyPhase(phase) => write!(f, "ScheduleError: phase `{}` has no stimuli", phase),
            ZeroWeight { phase, kind } => write!(
                f,
                "ScheduleError: stimulus {} in phase `{}` has zero weight",
                kind, phase
            ),
            MutationInReadOnlyPhase { phase, kind } => write!(
                f,
                "ScheduleError: read-only phase `{}` must not contain mutating stimulus {}",
                phase, kind
            ),
        }
    }
}

impl std::error::Error for ScheduleError {}

#[derive(Debug)]
pub enum EmitError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for EmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmitError::Io(e) => write!(f, "EmitError: {}", e),
            EmitError::Json(e) => write!(f, "EmitError: {}", e),
        }
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EmitError::Io(e) => Some(e),
            EmitError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for EmitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for EmitError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}
