pub mod config;
pub mod descriptor;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod render;
pub mod sink;
pub mod tokens;

pub use crate::{
    descriptor::{FieldPair, NodeDescriptor},
    emitter::{Emitter, Selection},
    error::EmitError,
    generator::Generator,
};
