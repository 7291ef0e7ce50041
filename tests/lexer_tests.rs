use jitterscript::lexer::token::TokenKind;

fn kinds(source: &str) -> Vec<TokenKind> {
    jitterscript::lexer::lex(source)
        .expect("lex should succeed")
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn lexes_assignment_with_compound_operator() {
    let tokens = kinds("total += 2.5;");
    assert_eq!(
        tokens,
        vec![
            TokenKind::Identifier("total".to_string()),
            TokenKind::PlusEqual,
            TokenKind::Number(2.5),
            TokenKind::Semicolon,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn lexes_global_names_with_dots() {
    let tokens = kinds("$jitterbit.scripting.while.max_iterations = 3");
    assert_eq!(
        tokens[0],
        TokenKind::GlobalIdentifier("$jitterbit.scripting.while.max_iterations".to_string())
    );
    assert_eq!(tokens[1], TokenKind::Equal);
    assert_eq!(tokens[2], TokenKind::Number(3.0));
}

#[test]
fn lexes_both_quote_styles_and_escapes() {
    let tokens = kinds("'it\\'s' + \"a\\tb\"");
    assert_eq!(tokens[0], TokenKind::String("it's".to_string()));
    assert_eq!(tokens[1], TokenKind::Plus);
    assert_eq!(tokens[2], TokenKind::String("a\tb".to_string()));
}

#[test]
fn lexes_number_forms() {
    let tokens = kinds("12 .5 1e3 2.5E-1");
    assert_eq!(
        &tokens[..4],
        &[
            TokenKind::Number(12.0),
            TokenKind::Number(0.5),
            TokenKind::Number(1000.0),
            TokenKind::Number(0.25),
        ]
    );
}

#[test]
fn distinguishes_single_and_double_logical_operators() {
    let tokens = kinds("a && b & c || d | e");
    assert!(tokens.contains(&TokenKind::AmpAmp));
    assert!(tokens.contains(&TokenKind::Amp));
    assert!(tokens.contains(&TokenKind::PipePipe));
    assert!(tokens.contains(&TokenKind::Pipe));
}

#[test]
fn skips_comments() {
    let tokens = kinds("x = 1; // trailing\n/* block\ncomment */ y = 2");
    let identifiers = tokens
        .iter()
        .filter(|kind| matches!(kind, TokenKind::Identifier(_)))
        .count();
    assert_eq!(identifiers, 2);
}

#[test]
fn lexes_only_inside_trans_block() {
    let tokens = jitterscript::lexer::lex("ignored text\n<trans>\nx = 1\n</trans>\ntrailing")
        .expect("lex should succeed");
    assert_eq!(tokens[0].kind, TokenKind::Identifier("x".to_string()));
    assert_eq!(tokens[0].line, 3);
    assert_eq!(tokens[0].column, 1);
}

#[test]
fn reports_missing_trans_close() {
    let err = jitterscript::lexer::lex("<trans> x = 1").expect_err("lex should fail");
    assert_eq!(err.message, "missing closing </trans> tag");
    assert_eq!((err.line, err.column), (1, 1));
}

#[test]
fn reports_unterminated_string_position() {
    let err = jitterscript::lexer::lex("x = 1;\ny = \"open").expect_err("lex should fail");
    assert_eq!(err.message, "unterminated string literal");
    assert_eq!((err.line, err.column), (2, 5));
}
