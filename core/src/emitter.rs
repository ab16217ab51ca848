use std::io::Write;

use tracing::{debug, trace};

use crate::{descriptor::NodeDescriptor, error::EmitError};

/// Which descriptors of a table get emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    /// Only the head of the table.
    #[default]
    First,
    /// Every descriptor, blocks separated by an empty line.
    All,
}

/// Writes one `<type> <name>` line per field.
#[derive(Debug, Default, Clone, Copy)]
pub struct Emitter {
    selection: Selection,
}

impl Emitter {
    pub fn new(selection: Selection) -> Self {
        Emitter { selection }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected<'d>(
        &self,
        descriptors: &'d [NodeDescriptor],
    ) -> Result<&'d [NodeDescriptor], EmitError> {
        if descriptors.is_empty() {
            return Err(EmitError::NoDescriptors);
        }

        Ok(match self.selection {
            Selection::First => &descriptors[..1],
            Selection::All => descriptors,
        })
    }

    /// Upper bound on the bytes [`emit`](Self::emit) writes for `descriptors`.
    ///
    /// Each `<type> <name>\n` line is at most one byte longer than the
    /// signature text it came from, plus one separator line per block.
    pub fn output_bound(&self, descriptors: &[NodeDescriptor]) -> Result<usize, EmitError> {
        Ok(self
            .selected(descriptors)?
            .iter()
            .map(|descriptor| descriptor.field_signature.len() + 2)
            .sum())
    }

    /// Emits the selected descriptors and returns the number of field lines written.
    ///
    /// A descriptor's signature is checked in full before any of its lines is
    /// written, so a malformed signature never leaves a partial block behind.
    pub fn emit<W: Write + ?Sized>(
        &self,
        descriptors: &[NodeDescriptor],
        out: &mut W,
    ) -> Result<usize, EmitError> {
        let selected = self.selected(descriptors)?;
        let mut written = 0;
        let mut line = String::new();

        for (index, descriptor) in selected.iter().enumerate() {
            debug!(class_name = %descriptor.class_name, "emitting fields");

            let fields = descriptor.field_pairs()?;

            if index > 0 {
                out.write_all(b"\n")?;
            }

            for field in fields {
                line.clear();
                line.try_reserve(field.type_name.len() + field.field_name.len() + 2)?;
                line.push_str(field.type_name);
                line.push(' ');
                line.push_str(field.field_name);
                line.push('\n');

                trace!(%field, "field");
                out.write_all(line.as_bytes())?;
                written += 1;
            }
        }

        Ok(written)
    }
}
