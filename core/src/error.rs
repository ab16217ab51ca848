use std::{collections::TryReserveError, io};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("field {position} has type '{type_name}' but no name")]
    MissingFieldName { type_name: String, position: usize },
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("no node descriptors to generate")]
    NoDescriptors,
    #[error("malformed signature for '{class_name}'")]
    MalformedSignature {
        class_name: String,
        #[source]
        source: SignatureError,
    },
    #[error("node '{0}' is declared more than once")]
    DuplicateNode(String),
    #[error("invalid base name '{0}'")]
    InvalidBaseName(String),
    #[error("invalid node name '{0}'")]
    InvalidNodeName(String),
    #[error("invalid field name '{field_name}' in '{class_name}'")]
    InvalidFieldName {
        class_name: String,
        field_name: String,
    },
    #[error("field '{field_name}' is declared more than once in '{class_name}'")]
    DuplicateField {
        class_name: String,
        field_name: String,
    },
    #[error("out of memory while building output")]
    Allocation(#[from] TryReserveError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl EmitError {
    pub fn malformed(class_name: &str, source: SignatureError) -> Self {
        EmitError::MalformedSignature {
            class_name: class_name.to_string(),
            source,
        }
    }

    /// Process exit status for this error, following sysexits.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NoDescriptors
            | Self::MalformedSignature { .. }
            | Self::DuplicateNode(_)
            | Self::InvalidBaseName(_)
            | Self::InvalidNodeName(_)
            | Self::InvalidFieldName { .. }
            | Self::DuplicateField { .. } => 65,
            Self::Allocation(_) => 70,
            Self::Io(_) => 74,
        }
    }
}
