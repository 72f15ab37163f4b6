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

//! Case emitters: turn dispatched stimuli into calls for the harness.

use crate::{err::EmitError, stimulus::Stimulus};
use serde::Serialize;
use std::{convert::Infallible, io::Write};
use vmatree_gen_core::AddrVariable;

/// Consumes one stimulus per emitted iteration.
pub trait Emitter<A> {
    type Error;

    fn emit(&mut self, stimulus: &Stimulus<A>) -> Result<(), Self::Error>;

    /// Called once after the last stimulus.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Collects stimuli in memory.
impl<A: Clone> Emitter<A> for Vec<Stimulus<A>> {
    type Error = Infallible;

    #[inline]
    fn emit(&mut self, stimulus: &Stimulus<A>) -> Result<(), Self::Error> {
        self.push(stimulus.clone());
        Ok(())
    }
}

/// Writes each stimulus as one C call statement, ready to be included into
/// the body of the harness' test function:
///
/// ```text
///     insert_node (100UL, 200UL);
///     num_failed += assert_lookup_eq (1, 150UL, 100UL, 200UL);
/// ```
#[derive(Debug)]
pub struct CallWriter<W> {
    out: W,
}

impl<W: Write> CallWriter<W> {
    #[inline]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<A: AddrVariable, W: Write> Emitter<A> for CallWriter<W> {
    type Error = EmitError;

    fn emit(&mut self, stimulus: &Stimulus<A>) -> Result<(), Self::Error> {
        let call = stimulus.to_call();
        self.out.write_all(b"\t")?;
        if call.case_id.is_some() {
            self.out.write_all(b"num_failed += ")?;
        }
        write!(self.out, "{} (", call.name)?;
        let mut sep = "";
        if let Some(case_id) = call.case_id {
            write!(self.out, "{}", case_id)?;
            sep = ", ";
        }
        for arg in &call.args {
            write!(self.out, "{}{}UL", sep, arg)?;
            sep = ", ";
        }
        self.out.write_all(b");\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.out.flush()?;
        Ok(())
    }
}

/// Writes each stimulus as one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesWriter<W> {
    out: W,
}

impl<W: Write> JsonLinesWriter<W> {
    #[inline]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[inline]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<A: AddrVariable + Serialize, W: Write> Emitter<A> for JsonLinesWriter<W> {
    type Error = EmitError;

    fn emit(&mut self, stimulus: &Stimulus<A>) -> Result<(), Self::Error> {
        serde_json::to_writer(&mut self.out, &stimulus.to_call())?;
        self.out.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Self::Error> {
        self.out.flush()?;
        Ok(())
    }
}
