//! Scanner integration tests.
//!
//! Verifies tokenization of the extended language, the lexical context
//! decisions and the error positions.

use expressive_diagnostics::ErrorKind;
use expressive_scanner::{tokenize, Token, TokenType, TokenValue, TokenizerOptions};

/// Helper: tokenize with default options.
fn scan_all(source: &str) -> Vec<Token> {
    tokenize(source, TokenizerOptions::default()).unwrap()
}

/// Helper: token types only.
fn scan_types(source: &str) -> Vec<TokenType> {
    scan_all(source).into_iter().map(|t| t.ty).collect()
}

fn module_options() -> TokenizerOptions {
    TokenizerOptions {
        module: true,
        strict: true,
        ..TokenizerOptions::default()
    }
}

// ============================================================================
// Basics
// ============================================================================

#[test]
fn test_empty_source() {
    assert!(scan_all("").is_empty());
    assert!(scan_all("   \n\t  ").is_empty());
}

#[test]
fn test_keywords_and_names() {
    let tokens = scan_all("cond async await foo of");
    let types: Vec<_> = tokens.iter().map(|t| t.ty).collect();
    assert_eq!(
        types,
        vec![TokenType::Cond, TokenType::Async, TokenType::Await, TokenType::Name, TokenType::Name]
    );
    assert_eq!(tokens[3].value, TokenValue::Str("foo".into()));
}

#[test]
fn test_unicode_identifier_and_escape() {
    let tokens = scan_all("ünïcode \\u0061bc");
    assert_eq!(tokens[0].value, TokenValue::Str("ünïcode".into()));
    assert_eq!(tokens[1].value, TokenValue::Str("abc".into()));
    // Offsets count characters, not bytes.
    assert_eq!(tokens[0].end, 7);
}

#[test]
fn test_escape_in_keyword_is_error() {
    let err = tokenize("\\u0069f", TokenizerOptions::default()).unwrap_err();
    assert!(err.message.starts_with("Escape sequence in keyword if"));
}

#[test]
fn test_token_locations() {
    let tokens = scan_all("a\n  b");
    assert_eq!(tokens[1].start, 4);
    assert_eq!(tokens[1].loc.start.line, 2);
    assert_eq!(tokens[1].loc.start.column, 2);
}

#[test]
fn test_start_line_option() {
    let options = TokenizerOptions { start_line: 10, ..TokenizerOptions::default() };
    let tokens = tokenize("a\nb", options).unwrap();
    assert_eq!(tokens[0].loc.start.line, 10);
    assert_eq!(tokens[1].loc.start.line, 11);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_operator_values() {
    let tokens = scan_all("a += b ||= c ?? d >>>= e === f");
    let ops: Vec<_> = tokens
        .iter()
        .filter(|t| t.ty != TokenType::Name)
        .map(|t| (t.ty, t.value.as_str().unwrap_or_default().to_string()))
        .collect();
    assert_eq!(
        ops,
        vec![
            (TokenType::Assign, "+=".to_string()),
            (TokenType::Assign, "||=".to_string()),
            (TokenType::NullishCoalescing, "??".to_string()),
            (TokenType::Assign, ">>>=".to_string()),
            (TokenType::Equality, "===".to_string()),
        ]
    );
}

#[test]
fn test_extended_punctuation() {
    use TokenType::*;
    assert_eq!(scan_types("x |> f"), vec![Name, Pipeline, Name]);
    assert_eq!(scan_types("a::b"), vec![Name, DoubleColon, Name]);
    assert_eq!(scan_types("::a.b"), vec![DoubleColon, Name, Dot, Name]);
    assert_eq!(scan_types("a[1:2]"), vec![Name, BracketL, Num, Colon, Num, BracketR]);
    assert_eq!(scan_types("(x) -> x"), vec![ParenL, Name, ParenR, ArrowThin, Name]);
    assert_eq!(scan_types("a ^= 2"), vec![Name, Assign, Num]);
    assert_eq!(scan_types("a | b & c"), vec![Name, BitwiseOr, Name, BitwiseAnd, Name]);
    assert_eq!(scan_types("~a"), vec![Tilde, Name]);
    assert_eq!(scan_types("...a"), vec![Ellipsis, Name]);
}

#[test]
fn test_question_dot_before_digit() {
    use TokenType::*;
    assert_eq!(scan_types("a?.b"), vec![Name, QuestionDot, Name]);
    assert_eq!(scan_types("a?.5:1"), vec![Name, Question, Num, Colon, Num]);
}

#[test]
fn test_html_comments_in_script_only() {
    use TokenType::*;
    assert_eq!(scan_types("a\n--> comment\nb"), vec![Name, Name]);
    assert_eq!(scan_types("a <!-- comment\nb"), vec![Name, Name]);
    let module = tokenize("a <!--b", module_options()).unwrap();
    let types: Vec<_> = module.iter().map(|t| t.ty).collect();
    assert_eq!(types, vec![Name, Relational, Bang, IncDec, Name]);
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn test_numeric_literals() {
    let values: Vec<_> = scan_all("42 3.14 .5 1e3 0xFF 0o17 0b101 017 019")
        .into_iter()
        .map(|t| t.value)
        .collect();
    assert_eq!(
        values,
        vec![
            TokenValue::Num(42.0),
            TokenValue::Num(3.14),
            TokenValue::Num(0.5),
            TokenValue::Num(1000.0),
            TokenValue::Num(255.0),
            TokenValue::Num(15.0),
            TokenValue::Num(5.0),
            TokenValue::Num(15.0),
            TokenValue::Num(19.0),
        ]
    );
}

#[test]
fn test_bigint_literals() {
    let tokens = scan_all("10n 0x1fn");
    assert_eq!(tokens[0].ty, TokenType::BigInt);
    assert_eq!(tokens[0].value, TokenValue::BigInt("10".into()));
    assert_eq!(tokens[1].value, TokenValue::BigInt("0x1f".into()));
}

#[test]
fn test_number_errors() {
    let err = tokenize("3in x", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.message, "Identifier directly after number");
    let err = tokenize("1e+", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.message, "Invalid number");
    let err = tokenize("0x", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.message, "Expected number in radix 16");
    let err = tokenize("017", module_options()).unwrap_err();
    assert_eq!(err.message, "Invalid number");
}

// ============================================================================
// Strings and templates
// ============================================================================

#[test]
fn test_string_escapes() {
    let tokens = scan_all(r#"'a\nb' "\x41B\u{43}" 'line\
cont'"#);
    assert_eq!(tokens[0].value, TokenValue::Str("a\nb".into()));
    assert_eq!(tokens[1].value, TokenValue::Str("ABC".into()));
    assert_eq!(tokens[2].value, TokenValue::Str("linecont".into()));
}

#[test]
fn test_unterminated_string() {
    let err = tokenize("x = 'abc", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.message, "Unterminated string constant");
    assert_eq!(err.pos, 4);
    assert!(err.is_unexpected_eof());

    let err = tokenize("'abc\n'", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Lexical);
}

#[test]
fn test_octal_escape_in_strict() {
    let err = tokenize("'\\101'", module_options()).unwrap_err();
    assert_eq!(err.message, "Octal literal in strict mode");
    assert_eq!(err.pos, 2);
    let tokens = scan_all("'\\101'");
    assert_eq!(tokens[0].value, TokenValue::Str("A".into()));
}

#[test]
fn test_template_tokens() {
    use TokenType::*;
    let tokens = scan_all("`a${b}c`");
    let types: Vec<_> = tokens.iter().map(|t| t.ty).collect();
    assert_eq!(types, vec![BackQuote, Template, DollarBraceL, Name, BraceR, Template, BackQuote]);
    assert_eq!(tokens[1].value, TokenValue::Template(Some("a".into())));
    assert_eq!(tokens[5].value, TokenValue::Template(Some("c".into())));
}

#[test]
fn test_template_crlf_normalized() {
    let tokens = scan_all("`a\r\nb`");
    assert_eq!(tokens[1].value, TokenValue::Template(Some("a\nb".into())));
}

#[test]
fn test_template_invalid_escape_has_no_cooked_value() {
    let tokens = scan_all("`\\unicode`");
    assert_eq!(tokens[1].value, TokenValue::Template(None));
}

#[test]
fn test_unterminated_template_points_at_backquote() {
    let err = tokenize("let s = `abc ${x} def", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.message, "Unterminated template");
    assert_eq!(err.pos, 8);
    assert_eq!(err.loc.column, 8);
    assert!(err.is_unexpected_eof());
}

// ============================================================================
// Lexical context
// ============================================================================

#[test]
fn test_regexp_after_operator() {
    let tokens = scan_all("x = /ab+c/gi");
    assert_eq!(tokens[2].ty, TokenType::Regexp);
    assert_eq!(
        tokens[2].value,
        TokenValue::RegExp { pattern: "ab+c".into(), flags: "gi".into() }
    );
}

#[test]
fn test_division_after_expression() {
    use TokenType::*;
    assert_eq!(scan_types("a / b / c"), vec![Name, Slash, Name, Slash, Name]);
    assert_eq!(scan_types("(a) / 2"), vec![ParenL, Name, ParenR, Slash, Num]);
}

#[test]
fn test_regexp_after_statement_paren() {
    use TokenType::*;
    assert_eq!(scan_types("if (a) /re/.test(b)")[4], Regexp);
}

#[test]
fn test_regexp_character_class() {
    let tokens = scan_all("x = /[/]/");
    assert_eq!(
        tokens[2].value,
        TokenValue::RegExp { pattern: "[/]".into(), flags: String::new() }
    );
}

#[test]
fn test_regexp_flag_errors() {
    let err = tokenize("/a/gg", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.message, "Duplicate regular expression flag");
    let err = tokenize("/a/q", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.message, "Invalid regular expression flag");
    let err = tokenize("/abc\n/", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.message, "Unterminated regular expression");
}

#[test]
fn test_block_after_function_expression() {
    use TokenType::*;
    // The `}` closing a function expression body ends an expression.
    let types = scan_types("x = function () {} / 2");
    assert_eq!(types[types.len() - 2], Slash);
}

// ============================================================================
// Comments and errors
// ============================================================================

#[test]
fn test_unterminated_comment() {
    let err = tokenize("a /* b", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.message, "Unterminated comment");
    assert_eq!(err.pos, 2);
    assert!(err.is_unexpected_eof());
}

#[test]
fn test_unexpected_character() {
    let err = tokenize("a = \u{00A7}", TokenizerOptions::default()).unwrap_err();
    assert_eq!(err.message, "Unexpected character '\u{00A7}'");
    assert_eq!(err.kind, ErrorKind::Lexical);
    assert_eq!(err.pos, 4);
}
