use std::fmt;

use crate::{
    error::EmitError,
    tokens::{self, Fields},
};

pub(crate) const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

// These cannot be raw identifiers.
pub(crate) const RESERVED: &[&str] = &["self", "Self", "super", "crate"];

/// A node type to generate: its name and the fields it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub class_name: String,
    pub field_signature: String,
}

impl NodeDescriptor {
    pub fn new(class_name: impl Into<String>, field_signature: impl Into<String>) -> Self {
        NodeDescriptor {
            class_name: class_name.into(),
            field_signature: field_signature.into(),
        }
    }

    /// Field pairs of this descriptor, in declaration order.
    pub fn fields(&self) -> Fields<'_> {
        tokens::fields(&self.field_signature)
    }

    /// All field pairs, or the first signature error.
    pub fn field_pairs(&self) -> Result<Vec<FieldPair<'_>>, EmitError> {
        let mut pairs = Vec::new();
        pairs.try_reserve(tokens::tokens(&self.field_signature).count() / 2 + 1)?;

        for field in self.fields() {
            let field = field.map_err(|source| EmitError::malformed(&self.class_name, source))?;
            pairs.push(field);
        }

        Ok(pairs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPair<'a> {
    pub type_name: &'a str,
    pub field_name: &'a str,
}

impl<'a> FieldPair<'a> {
    pub fn new(type_name: &'a str, field_name: &'a str) -> Self {
        FieldPair {
            type_name,
            field_name,
        }
    }
}

impl fmt::Display for FieldPair<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.type_name, self.field_name)
    }
}

/// The table used when no descriptor file is given.
pub fn builtin() -> Vec<NodeDescriptor> {
    vec![
        NodeDescriptor::new("Binary", "Expr left, Token operator, Expr right"),
        NodeDescriptor::new("Grouping", "Expr expression"),
        NodeDescriptor::new("Literal", "Expr expression"),
        NodeDescriptor::new("Token", "Token operator, Expr right"),
    ]
}

/// A letter or `_`, then letters, digits or `_`.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Names usable as a generated type or variant as written.
pub fn is_type_name(name: &str) -> bool {
    is_identifier(name) && !KEYWORDS.contains(&name) && !RESERVED.contains(&name)
}
