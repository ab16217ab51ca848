use astgen::{config, descriptor::builtin, EmitError, Emitter, NodeDescriptor, Selection};

fn emit(emitter: Emitter, descriptors: &[NodeDescriptor]) -> Result<String, EmitError> {
    let mut out = Vec::new();
    emitter.emit(descriptors, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn even_token_counts_give_half_as_many_lines() {
    let signatures = [
        "Expr left",
        "Expr left, Token operator",
        "Expr left, Token operator, Expr right",
        "Token name, Expr value, Token keyword, Expr object",
    ];

    for signature in signatures {
        let tokens: Vec<_> = astgen::tokens::tokens(signature).collect();
        let output = emit(Emitter::default(), &[NodeDescriptor::new("Node", signature)]).unwrap();
        let lines: Vec<_> = output.lines().collect();

        assert_eq!(lines.len(), tokens.len() / 2);
        for (line, pair) in lines.iter().zip(tokens.chunks(2)) {
            assert_eq!(*line, format!("{} {}", pair[0], pair[1]));
        }
    }
}

#[test]
fn emitting_twice_is_byte_identical() {
    let descriptors = builtin();
    let first = emit(Emitter::new(Selection::All), &descriptors).unwrap();
    let second = emit(Emitter::new(Selection::All), &descriptors).unwrap();

    assert_eq!(first, second);
    assert_eq!(descriptors, builtin());
}

#[test]
fn only_the_head_of_the_table_is_emitted_by_default() {
    let descriptors = config::parse(
        "\
Binary   : Expr left, Token operator, Expr right
Grouping : Expr expression
Literal  : Object value
Unary    : Token operator, Expr right
",
    )
    .unwrap();

    assert_eq!(
        emit(Emitter::default(), &descriptors).unwrap(),
        "Expr left\nToken operator\nExpr right\n"
    );
}

#[test]
fn all_selection_walks_the_whole_table() {
    let output = emit(Emitter::new(Selection::All), &builtin()).unwrap();
    assert_eq!(
        output,
        "\
Expr left
Token operator
Expr right

Expr expression

Expr expression

Token operator
Expr right
"
    );
}

#[test]
fn malformed_tail_stops_all_selection() {
    let descriptors = [
        NodeDescriptor::new("Grouping", "Expr expression"),
        NodeDescriptor::new("Unary", "Token operator, Expr"),
    ];
    let err = emit(Emitter::new(Selection::All), &descriptors).unwrap_err();
    assert_eq!(err.exit_code(), 65);
    assert!(matches!(
        err,
        EmitError::MalformedSignature { ref class_name, .. } if class_name == "Unary"
    ));
}
