//! Descriptor files.
//!
//! One node per line, written the way the node is declared:
//!
//! ```text
//! // Expressions
//! Binary   : Expr left, Token operator, Expr right
//! Grouping : Expr expression
//! ```

use std::{
    error::Error,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::descriptor::{self, NodeDescriptor};

/// The descriptor file does not exist.
#[derive(Debug, Error)]
#[error("cannot open descriptor file '{}'", .path.display())]
pub struct MissingInput {
    path: PathBuf,
    #[source]
    source: io::Error,
}

impl MissingInput {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[line {line}] Error: {kind}")]
pub struct ConfigError {
    line: usize,
    kind: ConfigErrorKind,
}

impl ConfigError {
    pub fn new(line: usize, kind: ConfigErrorKind) -> Self {
        ConfigError { line, kind }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigErrorKind {
    #[error("Expect ':' after node name.")]
    MissingSeparator,
    #[error("Invalid node name '{0}'.")]
    InvalidClassName(String),
    #[error("No node descriptors.")]
    Empty,
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<NodeDescriptor>, Box<dyn Error>> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| -> Box<dyn Error> {
        if source.kind() == io::ErrorKind::NotFound {
            Box::new(MissingInput {
                path: path.to_path_buf(),
                source,
            })
        } else {
            Box::new(source)
        }
    })?;
    let descriptors = parse(&source)?;

    debug!(path = %path.display(), count = descriptors.len(), "loaded descriptors");
    Ok(descriptors)
}

pub fn parse(source: &str) -> Result<Vec<NodeDescriptor>, ConfigError> {
    let mut descriptors = Vec::new();

    for (index, line) in source.lines().enumerate() {
        let line_num = index + 1;
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        let (class_name, signature) = line
            .split_once(':')
            .ok_or_else(|| ConfigError::new(line_num, ConfigErrorKind::MissingSeparator))?;

        let class_name = class_name.trim();
        if !descriptor::is_type_name(class_name) {
            return Err(ConfigError::new(
                line_num,
                ConfigErrorKind::InvalidClassName(class_name.to_string()),
            ));
        }

        descriptors.push(NodeDescriptor::new(class_name, signature.trim()));
    }

    if descriptors.is_empty() {
        let last_line = source.lines().count().max(1);
        return Err(ConfigError::new(last_line, ConfigErrorKind::Empty));
    }

    Ok(descriptors)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(start) => &line[..start],
        None => line,
    }
}
