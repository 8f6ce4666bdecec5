//! expressive_diagnostics: Error messages and the syntax error type.
//!
//! Every user-facing error raised by the scanner and parser is built from a
//! [`DiagnosticMessage`] in the [`messages`] table, formatted with
//! [`format_message`] and located with a character offset.

use expressive_core::text::{get_line_info, Position};
use miette::SourceSpan;
use std::fmt;
use thiserror::Error;

/// Classification of a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unterminated literals, invalid escapes, invalid characters.
    Lexical,
    /// Unexpected or missing tokens, malformed declarations.
    Syntax,
    /// Duplicate exports, invalid left-hand sides, strict-mode violations.
    StaticSemantic,
    /// The input ended before the construct was complete.
    UnexpectedEof,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "lexical"),
            ErrorKind::Syntax => write!(f, "syntax"),
            ErrorKind::StaticSemantic => write!(f, "static-semantic"),
            ErrorKind::UnexpectedEof => write!(f, "unexpected-eof"),
        }
    }
}

/// A message template with a code and kind.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub kind: ErrorKind,
    /// The message template. May contain `{0}`, `{1}` placeholders.
    pub message: &'static str,
}

/// Format a message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// A fail-fast error raised while tokenizing or parsing.
///
/// `Display` renders the message, the character found at the error offset
/// and the `line:column` location.
#[derive(Debug, Clone, PartialEq, Error, miette::Diagnostic)]
#[error("{message} at {} ({loc})", describe_found(.found))]
pub struct SyntaxError {
    pub message: String,
    /// Character offset of the error.
    pub pos: u32,
    pub loc: Position,
    pub code: Option<u32>,
    pub kind: ErrorKind,
    /// The character at `pos`, `None` at end of input.
    pub found: Option<char>,
    #[label("here")]
    pub span: SourceSpan,
}

/// Result alias for fallible scanning and parsing.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

fn describe_found(found: &Option<char>) -> String {
    match found {
        Some(ch) => format!("'{}'", ch),
        None => "end of input".to_string(),
    }
}

impl SyntaxError {
    /// Build an error for `pos` in `input`.
    ///
    /// Errors at or past the end of the input are classified as
    /// [`ErrorKind::UnexpectedEof`] regardless of the message's own kind.
    pub fn new(input: &[char], pos: usize, message: &DiagnosticMessage, args: &[&str]) -> Self {
        let found = input.get(pos).copied();
        let kind = if found.is_none() {
            ErrorKind::UnexpectedEof
        } else {
            message.kind
        };
        Self {
            message: format_message(message.message, args),
            pos: pos as u32,
            loc: get_line_info(input, pos),
            code: Some(message.code),
            kind,
            found,
            span: SourceSpan::from((pos, usize::from(found.is_some()))),
        }
    }

    /// Shift the line of the location, for inputs that start past line 1.
    pub fn with_start_line(mut self, start_line: u32) -> Self {
        self.loc.line += start_line.saturating_sub(1);
        self
    }

    /// Mark an error raised on reaching the end of input while it is
    /// reported at an earlier offset, such as an unterminated template.
    pub fn incomplete(mut self) -> Self {
        self.kind = ErrorKind::UnexpectedEof;
        self
    }

    /// Whether more input could have completed the construct.
    #[inline]
    pub fn is_unexpected_eof(&self) -> bool {
        self.kind == ErrorKind::UnexpectedEof
    }
}

// ============================================================================
// Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Lexical, $msg:expr) => {
            DiagnosticMessage { code: $code, kind: ErrorKind::Lexical, message: $msg }
        };
        ($code:expr, Syntax, $msg:expr) => {
            DiagnosticMessage { code: $code, kind: ErrorKind::Syntax, message: $msg }
        };
        ($code:expr, StaticSemantic, $msg:expr) => {
            DiagnosticMessage { code: $code, kind: ErrorKind::StaticSemantic, message: $msg }
        };
    }

    // ========================================================================
    // Lexical errors (1000-1099)
    // ========================================================================
    pub const UNTERMINATED_COMMENT: DiagnosticMessage = diag!(1001, Lexical, "Unterminated comment");
    pub const UNTERMINATED_STRING: DiagnosticMessage = diag!(1002, Lexical, "Unterminated string constant");
    pub const UNTERMINATED_TEMPLATE: DiagnosticMessage = diag!(1003, Lexical, "Unterminated template");
    pub const UNTERMINATED_REGEXP: DiagnosticMessage = diag!(1004, Lexical, "Unterminated regular expression");
    pub const DUPLICATE_REGEXP_FLAG: DiagnosticMessage = diag!(1005, Lexical, "Duplicate regular expression flag");
    pub const INVALID_REGEXP_FLAG: DiagnosticMessage = diag!(1006, Lexical, "Invalid regular expression flag");
    pub const EXPECTED_NUMBER_IN_RADIX: DiagnosticMessage = diag!(1007, Lexical, "Expected number in radix {0}");
    pub const IDENTIFIER_AFTER_NUMBER: DiagnosticMessage = diag!(1008, Lexical, "Identifier directly after number");
    pub const INVALID_NUMBER: DiagnosticMessage = diag!(1009, Lexical, "Invalid number");
    pub const UNEXPECTED_CHARACTER: DiagnosticMessage = diag!(1010, Lexical, "Unexpected character '{0}'");
    pub const EXPECTING_UNICODE_ESCAPE: DiagnosticMessage = diag!(1011, Lexical, "Expecting Unicode escape sequence \\uXXXX");
    pub const INVALID_UNICODE_ESCAPE: DiagnosticMessage = diag!(1012, Lexical, "Invalid Unicode escape");
    pub const ESCAPE_IN_KEYWORD: DiagnosticMessage = diag!(1013, Lexical, "Escape sequence in keyword {0}");
    pub const CODE_POINT_OUT_OF_BOUNDS: DiagnosticMessage = diag!(1014, Lexical, "Code point out of bounds");
    pub const BAD_ESCAPE: DiagnosticMessage = diag!(1015, Lexical, "Bad character escape sequence");
    pub const OCTAL_IN_STRICT: DiagnosticMessage = diag!(1016, Lexical, "Octal literal in strict mode");
    pub const INVALID_TEMPLATE_ESCAPE: DiagnosticMessage = diag!(1017, Lexical, "Invalid escape sequence in template");

    // ========================================================================
    // Syntax errors (2000-2099)
    // ========================================================================
    pub const UNEXPECTED_TOKEN: DiagnosticMessage = diag!(2001, Syntax, "Unexpected token");
    pub const UNEXPECTED_TOKEN_EXPECTED: DiagnosticMessage = diag!(2002, Syntax, "Unexpected token, expected \"{0}\"");
    pub const REQUIRES_DECLARATIONS: DiagnosticMessage = diag!(2003, Syntax, "{0} requires declarations");
    pub const REQUIRES_ARGUMENT: DiagnosticMessage = diag!(2004, Syntax, "{0} requires argument");
    pub const COMPLEX_BINDING_REQUIRES_INIT: DiagnosticMessage = diag!(2005, Syntax, "Complex binding patterns require an initialization value");
    pub const MULTIPLE_DEFAULT_CLAUSES: DiagnosticMessage = diag!(2006, Syntax, "Multiple default clauses");
    pub const MISSING_CATCH_OR_FINALLY: DiagnosticMessage = diag!(2007, Syntax, "Missing catch or finally clause");
    pub const ILLEGAL_NEWLINE_AFTER_THROW: DiagnosticMessage = diag!(2008, Syntax, "Illegal newline after throw");
    pub const TRAILING_COMMA_AFTER_REST: DiagnosticMessage = diag!(2009, Syntax, "A trailing comma is not permitted after the rest element");
    pub const UNEXPECTED_KEYWORD_IN_BINDING: DiagnosticMessage = diag!(2010, Syntax, "Unexpected keyword in binding");
    pub const INVALID_COLLECTION_PATTERN: DiagnosticMessage = diag!(2011, Syntax, "Invalid pattern in CollectionPattern");
    pub const IMPORT_CALL_ARITY: DiagnosticMessage = diag!(2012, Syntax, "import() requires exactly one argument");
    pub const IMPORT_CALL_SPREAD: DiagnosticMessage = diag!(2013, Syntax, "... is not allowed in import()");
    pub const TAGGED_TEMPLATE_IN_OPTIONAL_CHAIN: DiagnosticMessage = diag!(2014, Syntax, "Tagged Template Literals are not allowed in optionalChain");
    pub const NEW_IN_OPTIONAL_CHAIN: DiagnosticMessage = diag!(2015, Syntax, "constructors in/after an Optional Chain are not allowed");
    pub const BIND_REQUIRES_MEMBER: DiagnosticMessage = diag!(2016, Syntax, "Binding should be performed on object property.");
    pub const AWAIT_STAR_REMOVED: DiagnosticMessage = diag!(2017, Syntax, "await* has been removed from the async functions proposal. Use Promise.all() instead.");
    pub const EXPORT_NOT_TOP_LEVEL: DiagnosticMessage = diag!(2018, Syntax, "Cannot use export without being in the top level");
    pub const IMPORT_EXPORT_ONLY_MODULE: DiagnosticMessage = diag!(2019, Syntax, "'import' and 'export' may appear only with 'sourceType: \"module\"'");
    pub const IMPORT_EXPORT_TOP_LEVEL: DiagnosticMessage = diag!(2020, Syntax, "'import' and 'export' may only appear at the top level");
    pub const SINGLE_EXPRESSION_BODY: DiagnosticMessage = diag!(2021, Syntax, "A single-expression body is not allowed here");
    pub const EXPONENT_AFTER_UNARY: DiagnosticMessage = diag!(2022, Syntax, "Illegal expression. Wrap left hand side or entire exponentiation in parentheses.");
    pub const DEFAULT_EXPORT_KIND: DiagnosticMessage = diag!(2023, Syntax, "Only expressions, functions or classes are allowed as the `default` export.");
    pub const ES2015_NAMED_IMPORTS: DiagnosticMessage = diag!(2024, Syntax, "ES2015 named imports do not destructure. Use another statement for destructuring after the import.");
    pub const IMPORT_META_OUTSIDE_MODULE: DiagnosticMessage = diag!(2025, Syntax, "import.meta may appear only with 'sourceType: \"module\"'");
    pub const INVALID_META_PROPERTY: DiagnosticMessage = diag!(2026, Syntax, "The only valid meta property for {0} is {0}.{1}");
    pub const MULTIPLE_REST: DiagnosticMessage = diag!(2027, Syntax, "Cannot have multiple rest elements when destructuring");
    pub const REST_NOT_LAST: DiagnosticMessage = diag!(2028, Syntax, "The rest element has to be the last element when destructuring");
    pub const MIXED_COLLECTION_ENTRIES: DiagnosticMessage = diag!(2029, Syntax, "Collection entries must either all have keys or all be bare values");

    // ========================================================================
    // Static-semantic errors (3000-3099)
    // ========================================================================
    pub const ARGUMENT_NAME_CLASH: DiagnosticMessage = diag!(3001, StaticSemantic, "Argument name clash in strict mode");
    pub const BINDING_MEMBER_EXPRESSION: DiagnosticMessage = diag!(3002, StaticSemantic, "Binding member expression");
    pub const INVALID_LHS: DiagnosticMessage = diag!(3003, StaticSemantic, "Invalid left-hand side in {0}");
    pub const BINDING_INVALID_LHS: DiagnosticMessage = diag!(3004, StaticSemantic, "Binding invalid left-hand side in {0}");
    pub const INVALID_REST_ARGUMENT: DiagnosticMessage = diag!(3005, StaticSemantic, "Invalid rest operator's argument");
    pub const DEFAULT_VALUE_OPERATOR: DiagnosticMessage = diag!(3006, StaticSemantic, "Only '=' operator can be used for specifying default value.");
    pub const PATTERN_GETTER_SETTER: DiagnosticMessage = diag!(3007, StaticSemantic, "Object pattern can't contain getter or setter");
    pub const PATTERN_METHODS: DiagnosticMessage = diag!(3008, StaticSemantic, "Object pattern can't contain methods");
    pub const PARENTHESIZED_PATTERN: DiagnosticMessage = diag!(3009, StaticSemantic, "You're trying to assign to a parenthesized expression, eg. instead of `({a}) = 0` use `({a} = 0)`");
    pub const INVALID_PARENTHESIZED_PATTERN: DiagnosticMessage = diag!(3010, StaticSemantic, "Invalid parenthesized assignment pattern");
    pub const DELETE_LOCAL_IN_STRICT: DiagnosticMessage = diag!(3011, StaticSemantic, "Deleting local variable in strict mode");
    pub const REDEFINITION_OF_PROTO: DiagnosticMessage = diag!(3012, StaticSemantic, "Redefinition of __proto__ property");
    pub const GETTER_ARITY: DiagnosticMessage = diag!(3013, StaticSemantic, "getter must not have any formal parameters");
    pub const SETTER_ARITY: DiagnosticMessage = diag!(3014, StaticSemantic, "setter must have exactly one formal parameter");
    pub const SETTER_REST: DiagnosticMessage = diag!(3015, StaticSemantic, "setter function argument must not be a rest parameter");
    pub const CONSTRUCTOR_GENERATOR: DiagnosticMessage = diag!(3016, StaticSemantic, "Constructor can't be a generator");
    pub const CONSTRUCTOR_ASYNC: DiagnosticMessage = diag!(3017, StaticSemantic, "Constructor can't be an async function");
    pub const CONSTRUCTOR_ACCESSOR: DiagnosticMessage = diag!(3018, StaticSemantic, "Constructor can't have get/set modifier");
    pub const DUPLICATE_CONSTRUCTOR: DiagnosticMessage = diag!(3019, StaticSemantic, "Duplicate constructor in the same class");
    pub const STATIC_PROTOTYPE: DiagnosticMessage = diag!(3020, StaticSemantic, "Classes may not have static property named prototype");
    pub const DUPLICATE_DEFAULT_EXPORT: DiagnosticMessage = diag!(3021, StaticSemantic, "Only one default export allowed per module.");
    pub const DUPLICATE_EXPORT: DiagnosticMessage = diag!(3022, StaticSemantic, "`{0}` has already been exported. Exported identifiers must be unique.");
    pub const NEW_TARGET_OUTSIDE_FUNCTION: DiagnosticMessage = diag!(3023, StaticSemantic, "new.target can only be used in functions");
    pub const SUPER_OUTSIDE_METHOD: DiagnosticMessage = diag!(3024, StaticSemantic, "super is only allowed in object methods and classes");
    pub const SUPER_CALL_OUTSIDE_CONSTRUCTOR: DiagnosticMessage = diag!(3025, StaticSemantic, "super() is only valid inside a class constructor. Make sure the method name is spelled exactly as 'constructor'.");
    pub const RETURN_OUTSIDE_FUNCTION: DiagnosticMessage = diag!(3026, StaticSemantic, "'return' outside of function");
    pub const AWAIT_OUTSIDE_ASYNC: DiagnosticMessage = diag!(3027, StaticSemantic, "'await' is only allowed within async functions");
    pub const NON_SIMPLE_PARAMETER_IN_STRICT: DiagnosticMessage = diag!(3028, StaticSemantic, "Non-simple parameter in strict mode");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_format_message() {
        assert_eq!(
            format_message(messages::UNEXPECTED_TOKEN_EXPECTED.message, &[";"]),
            "Unexpected token, expected \";\""
        );
        assert_eq!(
            format_message(messages::DUPLICATE_EXPORT.message, &["foo"]),
            "`foo` has already been exported. Exported identifiers must be unique."
        );
    }

    #[test]
    fn test_error_display_includes_char_and_location() {
        let input = chars("let x = 1\nlet y = @");
        let err = SyntaxError::new(&input, 18, &messages::UNEXPECTED_CHARACTER, &["@"]);
        assert_eq!(err.loc, Position::new(2, 8));
        assert_eq!(err.kind, ErrorKind::Lexical);
        assert_eq!(err.to_string(), "Unexpected character '@' at '@' (2:8)");
    }

    #[test]
    fn test_error_at_end_is_unexpected_eof() {
        let input = chars("f(");
        let err = SyntaxError::new(&input, 2, &messages::UNEXPECTED_TOKEN, &[]);
        assert!(err.is_unexpected_eof());
        assert_eq!(err.found, None);
        assert_eq!(err.to_string(), "Unexpected token at end of input (1:2)");
    }

    #[test]
    fn test_incomplete_keeps_position() {
        let input = chars("`abc");
        let err = SyntaxError::new(&input, 0, &messages::UNTERMINATED_TEMPLATE, &[]).incomplete();
        assert!(err.is_unexpected_eof());
        assert_eq!(err.pos, 0);
        assert_eq!(err.found, Some('`'));
    }

    #[test]
    fn test_start_line_shift() {
        let input = chars("@");
        let err = SyntaxError::new(&input, 0, &messages::UNEXPECTED_CHARACTER, &["@"]).with_start_line(5);
        assert_eq!(err.loc, Position::new(5, 0));
    }
}
