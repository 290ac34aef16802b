//! Record Encoder
//!
//! Turns catalog items into the simulator's line-oriented input format:
//!
//! ```text
//! <canonical_name> <dim_0> <dim_1> [<dim_2> [<dim_3>]]
//! ```
//!
//! A composite stage becomes one line per operation in a single block, so
//! the simulator times the whole block as one fused pipeline.

use std::fmt::Write as _;

use crate::catalog::{AliasTable, CompositeStage, WorkloadEntry};
use crate::{Error, Result};

/// Encoded simulator input plus the number of operations it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedInput {
    text: String,
    count: usize,
}

impl EncodedInput {
    /// Newline-terminated input file contents.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of records (the simulator's `-c` value).
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }
}

/// Encodes entries and stages, resolving operation aliases.
#[derive(Debug, Clone, Copy)]
pub struct RecordEncoder<'a> {
    aliases: &'a AliasTable,
}

impl<'a> RecordEncoder<'a> {
    /// Create an encoder over an alias table.
    #[must_use]
    pub const fn new(aliases: &'a AliasTable) -> Self {
        Self { aliases }
    }

    /// Encode a single operation as one line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the entry has fewer than 2 or more
    /// than 4 dimensions.
    pub fn encode_entry(&self, entry: &WorkloadEntry) -> Result<EncodedInput> {
        let mut text = String::new();
        self.write_line(&mut text, entry)?;
        Ok(EncodedInput { text, count: 1 })
    }

    /// Encode a fused stage as one line per operation, in stage order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] for the first malformed entry; nothing is
    /// returned for the rest of the stage.
    pub fn encode_stage(&self, stage: &CompositeStage) -> Result<EncodedInput> {
        let mut text = String::new();
        for entry in stage.entries() {
            self.write_line(&mut text, entry)?;
        }
        Ok(EncodedInput {
            text,
            count: stage.len(),
        })
    }

    fn write_line(&self, out: &mut String, entry: &WorkloadEntry) -> Result<()> {
        if !entry.is_well_formed() {
            return Err(Error::Encoding {
                op: entry.name().to_string(),
                dims: entry.dims().to_vec(),
            });
        }
        out.push_str(self.aliases.canonical_name(entry.name()));
        for dim in entry.dims() {
            // Writing to a String cannot fail.
            let _ = write!(out, " {dim}");
        }
        out.push('\n');
        Ok(())
    }
}
