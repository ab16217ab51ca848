//! Rendering of a descriptor table as Rust source.
//!
//! The output has the shape of a hand-written interpreter AST: one enum with a
//! struct variant per node, a constructor per variant and a visitor trait.

use std::collections::{HashSet, TryReserveError};

use tracing::debug;

use crate::{
    descriptor::{self, FieldPair, NodeDescriptor, KEYWORDS, RESERVED},
    error::EmitError,
};

struct Node<'a> {
    name: &'a str,
    fields: Vec<FieldPair<'a>>,
}

/// Output buffer whose every growth goes through `try_reserve`.
#[derive(Default)]
struct Source {
    text: String,
}

impl Source {
    fn push(&mut self, pieces: &[&str]) -> Result<(), TryReserveError> {
        self.text
            .try_reserve(pieces.iter().map(|piece| piece.len()).sum())?;
        for piece in pieces {
            self.text.push_str(piece);
        }
        Ok(())
    }
}

/// Renders every descriptor as a variant of `base_name`.
pub fn define_ast(base_name: &str, descriptors: &[NodeDescriptor]) -> Result<String, EmitError> {
    if !descriptor::is_type_name(base_name) {
        return Err(EmitError::InvalidBaseName(base_name.to_string()));
    }
    if descriptors.is_empty() {
        return Err(EmitError::NoDescriptors);
    }

    let nodes = check_nodes(descriptors)?;
    debug!(base_name, nodes = nodes.len(), "rendering declarations");

    let mut source = Source::default();
    source.push(&["// Generated by astgen. Do not edit.\n\n"])?;
    render_enum(&mut source, base_name, &nodes)?;
    source.push(&["\n"])?;
    render_impl(&mut source, base_name, &nodes)?;
    source.push(&["\n"])?;
    render_visitor(&mut source, base_name)?;

    Ok(source.text)
}

fn check_nodes(descriptors: &[NodeDescriptor]) -> Result<Vec<Node<'_>>, EmitError> {
    let mut seen = HashSet::new();
    seen.try_reserve(descriptors.len())?;
    let mut nodes = Vec::new();
    nodes.try_reserve(descriptors.len())?;

    for entry in descriptors {
        let class_name = entry.class_name.as_str();
        if !descriptor::is_type_name(class_name) {
            return Err(EmitError::InvalidNodeName(class_name.to_string()));
        }
        if !seen.insert(class_name) {
            return Err(EmitError::DuplicateNode(class_name.to_string()));
        }

        let fields = entry.field_pairs()?;
        let mut field_names = HashSet::new();
        field_names.try_reserve(fields.len())?;
        for field in &fields {
            if !descriptor::is_identifier(field.field_name) {
                return Err(EmitError::InvalidFieldName {
                    class_name: class_name.to_string(),
                    field_name: field.field_name.to_string(),
                });
            }
            if !field_names.insert(field.field_name) {
                return Err(EmitError::DuplicateField {
                    class_name: class_name.to_string(),
                    field_name: field.field_name.to_string(),
                });
            }
        }

        nodes.push(Node {
            name: class_name,
            fields,
        });
    }

    Ok(nodes)
}

fn render_enum(source: &mut Source, base_name: &str, nodes: &[Node]) -> Result<(), EmitError> {
    source.push(&["#[derive(Debug, Clone)]\npub enum ", base_name, " {\n"])?;
    for node in nodes {
        if node.fields.is_empty() {
            source.push(&["    ", node.name, ",\n"])?;
            continue;
        }

        source.push(&["    ", node.name, " {\n"])?;
        for field in &node.fields {
            let [raw, name, suffix] = identifier(field.field_name);
            let [open, ty, close] = field_type(base_name, field.type_name);
            source.push(&[
                "        ", raw, name, suffix, ": ", open, ty, close, ",\n",
            ])?;
        }
        source.push(&["    },\n"])?;
    }
    source.push(&["}\n"])?;
    Ok(())
}

fn render_impl(source: &mut Source, base_name: &str, nodes: &[Node]) -> Result<(), EmitError> {
    source.push(&["impl ", base_name, " {\n"])?;
    for node in nodes {
        let constructor = snake_case(node.name)?;
        let [raw, name, suffix] = identifier(&constructor);
        source.push(&["    pub fn ", raw, name, suffix, "("])?;
        for (index, field) in node.fields.iter().enumerate() {
            let separator = if index > 0 { ", " } else { "" };
            let [raw, name, suffix] = identifier(field.field_name);
            let [open, ty, close] = field_type(base_name, field.type_name);
            source.push(&[separator, raw, name, suffix, ": ", open, ty, close])?;
        }
        source.push(&[") -> Self {\n"])?;

        if node.fields.is_empty() {
            source.push(&["        ", base_name, "::", node.name, "\n"])?;
        } else {
            source.push(&["        ", base_name, "::", node.name, " {\n"])?;
            for field in &node.fields {
                let [raw, name, suffix] = identifier(field.field_name);
                source.push(&["            ", raw, name, suffix, ",\n"])?;
            }
            source.push(&["        }\n"])?;
        }
        source.push(&["    }\n\n"])?;
    }

    let visit = snake_case(base_name)?;
    source.push(&[
        "    pub fn accept<V: ",
        base_name,
        "Visitor>(&self, visitor: &mut V) -> V::Result {\n",
    ])?;
    source.push(&["        visitor.visit_", visit.as_str(), "(self)\n"])?;
    source.push(&["    }\n}\n"])?;
    Ok(())
}

fn render_visitor(source: &mut Source, base_name: &str) -> Result<(), EmitError> {
    let visit = snake_case(base_name)?;
    let [raw, name, suffix] = identifier(&visit);
    source.push(&["pub trait ", base_name, "Visitor {\n"])?;
    source.push(&["    type Result;\n\n"])?;
    source.push(&[
        "    fn visit_", visit.as_str(), "(&mut self, ", raw, name, suffix, ": &", base_name,
        ") -> Self::Result;\n",
    ])?;
    source.push(&["}\n"])?;
    Ok(())
}

/// Recursive fields are boxed.
fn field_type<'a>(base_name: &'a str, type_name: &'a str) -> [&'a str; 3] {
    if type_name == base_name {
        ["Box<", base_name, ">"]
    } else {
        ["", type_name, ""]
    }
}

/// `name` split as raw prefix, name and suffix so it is a valid identifier.
fn identifier(name: &str) -> [&str; 3] {
    if RESERVED.contains(&name) {
        ["", name, "_"]
    } else if KEYWORDS.contains(&name) {
        ["r#", name, ""]
    } else {
        ["", name, ""]
    }
}

fn snake_case(name: &str) -> Result<String, TryReserveError> {
    let mut snake = String::new();
    snake.try_reserve(name.len())?;

    let mut previous: Option<char> = None;
    for c in name.chars() {
        if c.is_uppercase() {
            if previous.map_or(false, |p| p.is_lowercase() || p.is_ascii_digit()) {
                snake.try_reserve(1)?;
                snake.push('_');
            }
            for lower in c.to_lowercase() {
                snake.try_reserve(lower.len_utf8())?;
                snake.push(lower);
            }
        } else {
            snake.try_reserve(c.len_utf8())?;
            snake.push(c);
        }
        previous = Some(c);
    }
    Ok(snake)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::builtin;

    #[test]
    fn renders_enum_constructors_and_visitor() {
        let descriptors = [
            NodeDescriptor::new("Grouping", "Expr expression"),
            NodeDescriptor::new("Nil", ""),
        ];
        let expected = "\
// Generated by astgen. Do not edit.

#[derive(Debug, Clone)]
pub enum Expr {
    Grouping {
        expression: Box<Expr>,
    },
    Nil,
}

impl Expr {
    pub fn grouping(expression: Box<Expr>) -> Self {
        Expr::Grouping {
            expression,
        }
    }

    pub fn nil() -> Self {
        Expr::Nil
    }

    pub fn accept<V: ExprVisitor>(&self, visitor: &mut V) -> V::Result {
        visitor.visit_expr(self)
    }
}

pub trait ExprVisitor {
    type Result;

    fn visit_expr(&mut self, expr: &Expr) -> Self::Result;
}
";
        assert_eq!(define_ast("Expr", &descriptors).unwrap(), expected);
    }

    #[test]
    fn renders_the_whole_builtin_table() {
        let source = define_ast("Expr", &builtin()).unwrap();
        assert!(source.contains("    Binary {\n        left: Box<Expr>,\n        operator: Token,\n"));
        assert!(source.contains(
            "    pub fn binary(left: Box<Expr>, operator: Token, right: Box<Expr>) -> Self {\n"
        ));
        assert!(source.contains("    pub fn grouping(expression: Box<Expr>) -> Self {\n"));
        assert!(source.contains("    pub fn literal(expression: Box<Expr>) -> Self {\n"));
        assert!(source.contains("    pub fn token(operator: Token, right: Box<Expr>) -> Self {\n"));
    }

    #[test]
    fn escapes_keywords() {
        let descriptors = [
            NodeDescriptor::new("If", "Stmt condition, Token type"),
            NodeDescriptor::new("Super", "Token self"),
        ];
        let source = define_ast("Stmt", &descriptors).unwrap();
        assert!(source.contains("        r#type: Token,\n"));
        assert!(source.contains("    pub fn r#if(condition: Box<Stmt>, r#type: Token) -> Self {\n"));
        assert!(source.contains("        self_: Token,\n"));
        assert!(source.contains("    pub fn super_(self_: Token) -> Self {\n"));
    }

    #[test]
    fn snake_cases_compound_names() {
        assert_eq!(snake_case("Binary").unwrap(), "binary");
        assert_eq!(snake_case("GroupingExpr").unwrap(), "grouping_expr");
        assert_eq!(snake_case("Call2Args").unwrap(), "call2_args");
        assert_eq!(snake_case("IO").unwrap(), "io");
    }

    #[test]
    fn rejects_duplicate_nodes() {
        let descriptors = [
            NodeDescriptor::new("Binary", "Expr left, Expr right"),
            NodeDescriptor::new("Binary", "Expr left"),
        ];
        let err = define_ast("Expr", &descriptors).unwrap_err();
        assert!(matches!(err, EmitError::DuplicateNode(ref name) if name == "Binary"));
    }

    #[test]
    fn rejects_repeated_field_names() {
        let descriptors = [NodeDescriptor::new("Binary", "Expr left, Expr left")];
        let err = define_ast("Expr", &descriptors).unwrap_err();
        assert!(matches!(
            err,
            EmitError::DuplicateField { ref class_name, ref field_name }
                if class_name == "Binary" && field_name == "left"
        ));
    }

    #[test]
    fn rejects_field_names_that_are_not_identifiers() {
        for signature in ["Expr left-hand, Expr right", "Expr left, Expr 1x"] {
            let descriptors = [NodeDescriptor::new("Binary", signature)];
            let err = define_ast("Expr", &descriptors).unwrap_err();
            assert!(
                matches!(err, EmitError::InvalidFieldName { .. }),
                "{} was accepted",
                signature
            );
        }
    }

    #[test]
    fn rejects_reserved_node_names() {
        for name in ["Self", "crate", "match", "Not Valid"] {
            let descriptors = [NodeDescriptor::new(name, "Expr left")];
            let err = define_ast("Expr", &descriptors).unwrap_err();
            assert!(matches!(err, EmitError::InvalidNodeName(ref n) if n == name));
        }
    }

    #[test]
    fn rejects_invalid_base_names() {
        for base_name in ["Foo Bar", "../Escaped", "", "Self"] {
            let err = define_ast(base_name, &builtin()).unwrap_err();
            assert!(matches!(err, EmitError::InvalidBaseName(ref n) if n == base_name));
        }
    }

    #[test]
    fn rejects_malformed_signatures() {
        let descriptors = [NodeDescriptor::new("Unary", "Token")];
        let err = define_ast("Expr", &descriptors).unwrap_err();
        assert!(matches!(err, EmitError::MalformedSignature { .. }));
    }

    #[test]
    fn rejects_an_empty_table() {
        assert!(matches!(
            define_ast("Expr", &[]).unwrap_err(),
            EmitError::NoDescriptors
        ));
    }
}
