// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Output formatting for cfdot
//!
//! Results are written as newline-delimited JSON: one compact value per
//! line, flushed as soon as it is written so streamed events show up
//! immediately. Errors never go to the result stream; [`report_error`]
//! writes them to stderr.

use crate::error::CfdotError;
use log::error;
use serde::Serialize;
use std::io::{self, Stdout, Write};

/// Writer for command results
#[derive(Debug)]
pub struct OutputHandler<W: Write = Stdout> {
    writer: W,
}

impl OutputHandler<Stdout> {
    /// Output handler writing to standard output
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> OutputHandler<W> {
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Write one value as a single JSON line and flush
    ///
    /// A value that cannot be encoded is logged and skipped. Write failures
    /// are returned.
    pub fn record<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> Result<(), CfdotError> {
        let line = match serde_json::to_string(value) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to encode output record: {e}");
                return Ok(());
            }
        };

        writeln!(self.writer, "{line}")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write every value of a list, one line each
    pub fn records<'a, T, I>(&mut self, values: I) -> Result<(), CfdotError>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        for value in values {
            self.record(value)?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Print an error to stderr, followed by usage text when given
pub fn report_error(err: &CfdotError, usage: Option<&str>) {
    let mut stderr = io::stderr().lock();
    // Nothing sensible is left to do if stderr itself fails
    let _ = writeln!(stderr, "error: {err}");
    if let Some(usage) = usage {
        let _ = writeln!(stderr);
        let _ = writeln!(stderr, "{usage}");
    }
}
