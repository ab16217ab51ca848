use std::{error::Error, io::Write, path::Path};

use tracing::debug;

use crate::{
    config,
    descriptor::{self, NodeDescriptor},
    emitter::{Emitter, Selection},
    error::EmitError,
    render,
    sink::{self, Sink},
};

pub type GeneratorResult = Result<usize, Box<dyn Error>>;

/// Drives one generation: descriptors in, text out to a sink.
#[derive(Debug, Clone)]
pub struct Generator {
    emitter: Emitter,
    render: bool,
    base_name: String,
    sink: Sink,
}

impl Default for Generator {
    fn default() -> Self {
        Generator {
            emitter: Emitter::default(),
            render: false,
            base_name: "Expr".to_string(),
            sink: Sink::default(),
        }
    }
}

impl Generator {
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.emitter = Emitter::new(selection);
        self
    }

    /// Render full declarations instead of field lines.
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    pub fn with_sink(mut self, sink: Sink) -> Self {
        self.sink = sink;
        self
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn banner(&self) -> String {
        format!("Generating '{}' ...", sink::target_file_name(&self.base_name))
    }

    pub fn run_builtin(&self) -> GeneratorResult {
        self.run(&descriptor::builtin())
    }

    pub fn run_file<P: AsRef<Path>>(&self, path: P) -> GeneratorResult {
        let descriptors = config::load(path)?;
        self.run(&descriptors)
    }

    /// Returns the number of lines written.
    pub fn run(&self, descriptors: &[NodeDescriptor]) -> GeneratorResult {
        // The base name becomes both a file name and a type name.
        if !descriptor::is_type_name(&self.base_name) {
            return Err(EmitError::InvalidBaseName(self.base_name.clone()).into());
        }

        // Generate in full first so a failure never leaves a truncated file.
        let (output, lines) = if self.render {
            let source = render::define_ast(&self.base_name, descriptors)?;
            let lines = source.lines().count();
            (source.into_bytes(), lines)
        } else {
            let mut output = Vec::new();
            output
                .try_reserve(self.emitter.output_bound(descriptors)?)
                .map_err(EmitError::from)?;
            let lines = self.emitter.emit(descriptors, &mut output)?;
            (output, lines)
        };

        let mut writer = self.sink.open(&self.base_name)?;
        writer.write_all(&output)?;
        writer.flush()?;

        debug!(lines, render = self.render, "generation finished");
        Ok(lines)
    }
}
