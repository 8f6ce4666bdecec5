//! Token types and their static metadata.
//!
//! Metadata is exposed through methods on [`TokenType`] rather than stored
//! in descriptor objects; context handling lives in [`crate::context`].

use std::fmt;

bitflags::bitflags! {
    /// Static properties of a token type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TokenFlags: u16 {
        const NONE        = 0;
        /// An expression may follow this token (so `/` starts a regexp).
        const BEFORE_EXPR = 1 << 0;
        /// This token may start an expression.
        const STARTS_EXPR = 1 << 1;
        const IS_LOOP     = 1 << 2;
        const IS_ASSIGN   = 1 << 3;
        const PREFIX      = 1 << 4;
        const POSTFIX     = 1 << 5;
        const RIGHT_ASSOC = 1 << 6;
        const KEYWORD     = 1 << 7;
    }
}

/// The type of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // ========================================================================
    // Literals and names
    // ========================================================================
    Num,
    BigInt,
    Regexp,
    String,
    Name,
    Eof,

    // ========================================================================
    // Punctuation
    // ========================================================================
    BracketL,
    BracketR,
    BraceL,
    BraceR,
    ParenL,
    ParenR,
    Comma,
    Semi,
    Colon,
    DoubleColon,
    Dot,
    Question,
    QuestionDot,
    /// `=>`
    Arrow,
    /// `->`
    ArrowThin,
    Template,
    Ellipsis,
    BackQuote,
    DollarBraceL,
    At,
    Hash,

    // ========================================================================
    // Operators
    // ========================================================================
    Eq,
    Assign,
    IncDec,
    Bang,
    Tilde,
    Pipeline,
    NullishCoalescing,
    LogicalOr,
    LogicalAnd,
    BitwiseOr,
    BitwiseAnd,
    Equality,
    Relational,
    BitShift,
    PlusMin,
    Modulo,
    Star,
    Slash,
    /// `^`, exponentiation in this language.
    Power,
    /// `**`
    Exponent,

    // ========================================================================
    // Keywords
    // ========================================================================
    Break,
    Case,
    Catch,
    Continue,
    Debugger,
    Default,
    Do,
    Else,
    Finally,
    For,
    Function,
    If,
    Return,
    Switch,
    Throw,
    Try,
    Var,
    Let,
    Const,
    While,
    With,
    New,
    This,
    Super,
    Class,
    Extends,
    Export,
    Import,
    Yield,
    Null,
    True,
    False,
    In,
    Instanceof,
    Typeof,
    Void,
    Delete,
    Cond,
    Async,
    Await,
}

impl TokenType {
    pub fn flags(self) -> TokenFlags {
        use TokenType::*;
        const BE: TokenFlags = TokenFlags::BEFORE_EXPR;
        const SE: TokenFlags = TokenFlags::STARTS_EXPR;
        const KW: TokenFlags = TokenFlags::KEYWORD;
        const PREFIX: TokenFlags = TokenFlags::PREFIX;
        const BE_SE: TokenFlags = BE.union(SE);
        match self {
            Num | BigInt | Regexp | String | Name => SE,
            Eof => TokenFlags::NONE,
            BracketL | BraceL | ParenL | DollarBraceL => BE_SE,
            BracketR | BraceR | ParenR | Dot | QuestionDot | Template | At | Hash => TokenFlags::NONE,
            Comma | Semi | Colon | DoubleColon | Question | Arrow | ArrowThin | Ellipsis => BE,
            BackQuote => SE,
            Eq | Assign => BE.union(TokenFlags::IS_ASSIGN),
            IncDec => PREFIX.union(TokenFlags::POSTFIX).union(SE),
            Bang | Tilde => BE_SE.union(PREFIX),
            Pipeline | NullishCoalescing | LogicalOr | LogicalAnd | BitwiseOr | BitwiseAnd
            | Equality | Relational | BitShift | Modulo | Star | Slash => BE,
            PlusMin => BE_SE.union(PREFIX),
            Power | Exponent => BE.union(TokenFlags::RIGHT_ASSOC),
            Break | Catch | Continue | Debugger | Finally | If | Switch | Try | Var | Let | Const
            | With | Class | Export | Async => KW,
            Case | Default | Else | Return | Extends => KW.union(BE),
            Do => KW.union(BE).union(TokenFlags::IS_LOOP),
            For | While => KW.union(TokenFlags::IS_LOOP),
            Function | Import | This | Super | Cond | Null | True | False => KW.union(SE),
            Throw => KW.union(BE_SE),
            New | Yield | Await => KW.union(BE_SE),
            In | Instanceof => KW.union(BE),
            Typeof | Void | Delete => KW.union(BE_SE).union(PREFIX),
        }
    }

    #[inline]
    pub fn before_expr(self) -> bool {
        self.flags().contains(TokenFlags::BEFORE_EXPR)
    }

    #[inline]
    pub fn starts_expr(self) -> bool {
        self.flags().contains(TokenFlags::STARTS_EXPR)
    }

    #[inline]
    pub fn is_assign(self) -> bool {
        self.flags().contains(TokenFlags::IS_ASSIGN)
    }

    #[inline]
    pub fn is_prefix(self) -> bool {
        self.flags().contains(TokenFlags::PREFIX)
    }

    #[inline]
    pub fn is_postfix(self) -> bool {
        self.flags().contains(TokenFlags::POSTFIX)
    }

    #[inline]
    pub fn is_right_assoc(self) -> bool {
        self.flags().contains(TokenFlags::RIGHT_ASSOC)
    }

    #[inline]
    pub fn is_loop(self) -> bool {
        self.flags().contains(TokenFlags::IS_LOOP)
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        self.flags().contains(TokenFlags::KEYWORD)
    }

    /// Binary operator precedence, if this token is a binary operator.
    pub fn binop(self) -> Option<u8> {
        use TokenType::*;
        match self {
            Pipeline => Some(0),
            NullishCoalescing | LogicalOr => Some(1),
            LogicalAnd => Some(2),
            BitwiseOr => Some(3),
            BitwiseAnd => Some(5),
            Equality => Some(6),
            Relational | In | Instanceof => Some(7),
            BitShift => Some(8),
            PlusMin => Some(9),
            Modulo | Star | Slash => Some(10),
            Power | Exponent => Some(11),
            _ => None,
        }
    }

    /// Human-readable label used in "expected" error messages.
    pub fn label(self) -> &'static str {
        use TokenType::*;
        match self {
            Num => "num",
            BigInt => "bigint",
            Regexp => "regexp",
            String => "string",
            Name => "name",
            Eof => "eof",
            BracketL => "[",
            BracketR => "]",
            BraceL => "{",
            BraceR => "}",
            ParenL => "(",
            ParenR => ")",
            Comma => ",",
            Semi => ";",
            Colon => ":",
            DoubleColon => "::",
            Dot => ".",
            Question => "?",
            QuestionDot => "?.",
            Arrow => "=>",
            ArrowThin => "->",
            Template => "template",
            Ellipsis => "...",
            BackQuote => "`",
            DollarBraceL => "${",
            At => "@",
            Hash => "#",
            Eq => "=",
            Assign => "_=",
            IncDec => "++/--",
            Bang => "!",
            Tilde => "~",
            Pipeline => "|>",
            NullishCoalescing => "??",
            LogicalOr => "||",
            LogicalAnd => "&&",
            BitwiseOr => "|",
            BitwiseAnd => "&",
            Equality => "==/!=",
            Relational => "</>",
            BitShift => "<</>>",
            PlusMin => "+/-",
            Modulo => "%",
            Star => "*",
            Slash => "/",
            Power => "^",
            Exponent => "**",
            other => other.keyword().unwrap_or("token"),
        }
    }

    /// The keyword text for keyword token types.
    pub fn keyword(self) -> Option<&'static str> {
        use TokenType::*;
        Some(match self {
            Break => "break",
            Case => "case",
            Catch => "catch",
            Continue => "continue",
            Debugger => "debugger",
            Default => "default",
            Do => "do",
            Else => "else",
            Finally => "finally",
            For => "for",
            Function => "function",
            If => "if",
            Return => "return",
            Switch => "switch",
            Throw => "throw",
            Try => "try",
            Var => "var",
            Let => "let",
            Const => "const",
            While => "while",
            With => "with",
            New => "new",
            This => "this",
            Super => "super",
            Class => "class",
            Extends => "extends",
            Export => "export",
            Import => "import",
            Yield => "yield",
            Null => "null",
            True => "true",
            False => "false",
            In => "in",
            Instanceof => "instanceof",
            Typeof => "typeof",
            Void => "void",
            Delete => "delete",
            Cond => "cond",
            Async => "async",
            Await => "await",
            _ => return None,
        })
    }

    /// Look up the keyword token type for a word.
    pub fn from_keyword(word: &str) -> Option<TokenType> {
        use TokenType::*;
        Some(match word {
            "break" => Break,
            "case" => Case,
            "catch" => Catch,
            "continue" => Continue,
            "debugger" => Debugger,
            "default" => Default,
            "do" => Do,
            "else" => Else,
            "finally" => Finally,
            "for" => For,
            "function" => Function,
            "if" => If,
            "return" => Return,
            "switch" => Switch,
            "throw" => Throw,
            "try" => Try,
            "var" => Var,
            "let" => Let,
            "const" => Const,
            "while" => While,
            "with" => With,
            "new" => New,
            "this" => This,
            "super" => Super,
            "class" => Class,
            "extends" => Extends,
            "export" => Export,
            "import" => Import,
            "yield" => Yield,
            "null" => Null,
            "true" => True,
            "false" => False,
            "in" => In,
            "instanceof" => Instanceof,
            "typeof" => Typeof,
            "void" => Void,
            "delete" => Delete,
            "cond" => Cond,
            "async" => Async,
            "await" => Await,
            _ => return None,
        })
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for word in ["cond", "async", "instanceof", "debugger"] {
            let ty = TokenType::from_keyword(word);
            assert_eq!(ty.and_then(TokenType::keyword), Some(word));
        }
        assert_eq!(TokenType::from_keyword("of"), None);
    }

    #[test]
    fn test_precedences() {
        assert_eq!(TokenType::Pipeline.binop(), Some(0));
        assert!(TokenType::LogicalOr.binop() < TokenType::LogicalAnd.binop());
        assert!(TokenType::BitwiseOr.binop() < TokenType::BitwiseAnd.binop());
        assert!(TokenType::PlusMin.binop() < TokenType::Star.binop());
        assert_eq!(TokenType::Power.binop(), TokenType::Exponent.binop());
        assert!(TokenType::Power.is_right_assoc());
        assert!(!TokenType::Star.is_right_assoc());
        assert_eq!(TokenType::Arrow.binop(), None);
    }

    #[test]
    fn test_flags() {
        assert!(TokenType::Return.before_expr());
        assert!(!TokenType::ParenR.before_expr());
        assert!(TokenType::Typeof.is_prefix());
        assert!(!TokenType::Throw.is_prefix());
        assert!(TokenType::IncDec.is_postfix());
        assert!(TokenType::Do.is_loop());
        assert!(TokenType::Assign.is_assign());
        assert!(TokenType::Cond.starts_expr());
        assert!(!TokenType::Name.is_keyword());
    }
}
