use mathseq::lexer::{self, token::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    lexer::lex(source)
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn keywords_and_identifiers() {
    assert_eq!(
        kinds("func let if else while return true false and or not"),
        vec![
            TokenKind::Func,
            TokenKind::Let,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::While,
            TokenKind::Return,
            TokenKind::True,
            TokenKind::False,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::Eof,
        ]
    );
    assert_eq!(
        kinds("int float bool sequence pattern"),
        vec![
            TokenKind::IntType,
            TokenKind::FloatType,
            TokenKind::BoolType,
            TokenKind::SequenceType,
            TokenKind::PatternType,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn print_is_a_plain_identifier() {
    let tokens = lexer::lex("print").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].lexeme, "print");
}

#[test]
fn arrow_and_minus() {
    assert_eq!(
        kinds("-> - -->"),
        vec![
            TokenKind::Arrow,
            TokenKind::Minus,
            TokenKind::Minus,
            TokenKind::Arrow,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn two_character_operators() {
    assert_eq!(
        kinds("== != <= >= < > ="),
        vec![
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Equal,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn bang_alone_is_rejected() {
    let error = lexer::lex("!").unwrap_err();
    assert!(error.message.contains("unexpected character '!'"));
}

#[test]
fn numbers_split_into_int_and_float() {
    let tokens = lexer::lex("42 3.14").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].lexeme, "42");
    assert_eq!(tokens[1].kind, TokenKind::Float);
    assert_eq!(tokens[1].lexeme, "3.14");
}

#[test]
fn dot_without_fraction_stays_outside_the_number() {
    // "3." lexes the 3, then trips over the bare dot.
    let error = lexer::lex("3.").unwrap_err();
    assert!(error.message.contains("unexpected character '.'"));
}

#[test]
fn string_lexeme_drops_the_quotes() {
    let tokens = lexer::lex("\"hello world\"").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Str);
    assert_eq!(tokens[0].lexeme, "hello world");
}

#[test]
fn unterminated_string_is_an_error() {
    let error = lexer::lex("\"oops").unwrap_err();
    assert!(error.message.contains("unterminated string literal"));
}

#[test]
fn comments_run_to_end_of_line() {
    assert_eq!(
        kinds("let # everything here vanishes\nx"),
        vec![TokenKind::Let, TokenKind::Identifier, TokenKind::Eof]
    );
}

#[test]
fn positions_track_lines_and_columns() {
    let tokens = lexer::lex("let\n  x").unwrap();
    assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
    assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
}
