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

use crate::err::ScheduleError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorConfigBuildError {
    Schedule(ScheduleError),
    ZeroMinSize,
    AlignExponentTooLarge(u32),
    LookupOvershootOverflow { space_last: u64, overshoot: u64 },
}

impl Display for GeneratorConfigBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use GeneratorConfigBuildError::*;
        match self {
            Schedule(e) => write!(f, "{}", e),
            ZeroMinSize => write!(f, "Free query sizes must start at 1"),
            AlignExponentTooLarge(k) => write!(
                f,
                "Alignment exponent {} does not fit into a 64-bit address",
                k
            ),
            LookupOvershootOverflow {
                space_last,
                overshoot,
            } => write!(
                f,
                "Lookup overshoot {} past address {} overflows",
                overshoot, space_last
            ),
        }
    }
}

impl From<ScheduleError> for GeneratorConfigBuildError {
    fn from(err: ScheduleError) -> Self {
        Self::Schedule(err)
    }
}

impl std::error::Error for GeneratorConfigBuildError {}
