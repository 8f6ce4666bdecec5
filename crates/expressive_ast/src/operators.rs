//! Operator enums carried by expression nodes.
//!
//! Each operator knows its source text. Operators that exist only in the
//! source language (`|>`, `^`, `^=`) report `is_standard() == false`.

use serde::Serialize;

macro_rules! operator_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:expr),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            /// The operator's source text.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),*
                }
            }

            /// Parse an operator from its source text.
            pub fn from_text(text: &str) -> Option<Self> {
                match text {
                    $($text => Some($name::$variant),)*
                    _ => None,
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

operator_enum! {
    /// Operators of `BinaryExpression`.
    BinaryOperator {
        Pipeline => "|>",
        Equal => "==",
        NotEqual => "!=",
        StrictEqual => "===",
        StrictNotEqual => "!==",
        LessThan => "<",
        LessThanEqual => "<=",
        GreaterThan => ">",
        GreaterThanEqual => ">=",
        In => "in",
        Instanceof => "instanceof",
        ShiftLeft => "<<",
        ShiftRight => ">>",
        UnsignedShiftRight => ">>>",
        Add => "+",
        Subtract => "-",
        Multiply => "*",
        Divide => "/",
        Remainder => "%",
        Exponent => "**",
        Power => "^",
        BitwiseOr => "|",
        BitwiseAnd => "&",
    }
}

impl BinaryOperator {
    #[inline]
    pub fn is_standard(self) -> bool {
        !matches!(self, BinaryOperator::Pipeline | BinaryOperator::Power)
    }
}

operator_enum! {
    /// Operators of `LogicalExpression`.
    LogicalOperator {
        Or => "||",
        And => "&&",
        Nullish => "??",
    }
}

operator_enum! {
    /// Prefix operators of `UnaryExpression`.
    UnaryOperator {
        Minus => "-",
        Plus => "+",
        Not => "!",
        Tilde => "~",
        Typeof => "typeof",
        Void => "void",
        Delete => "delete",
    }
}

operator_enum! {
    /// Operators of `UpdateExpression`.
    UpdateOperator {
        Increment => "++",
        Decrement => "--",
    }
}

operator_enum! {
    /// Operators of `AssignmentExpression`.
    AssignmentOperator {
        Assign => "=",
        AddAssign => "+=",
        SubtractAssign => "-=",
        MultiplyAssign => "*=",
        DivideAssign => "/=",
        RemainderAssign => "%=",
        ExponentAssign => "**=",
        PowerAssign => "^=",
        ShiftLeftAssign => "<<=",
        ShiftRightAssign => ">>=",
        UnsignedShiftRightAssign => ">>>=",
        BitwiseOrAssign => "|=",
        BitwiseAndAssign => "&=",
        OrAssign => "||=",
        AndAssign => "&&=",
        NullishAssign => "??=",
    }
}

impl AssignmentOperator {
    #[inline]
    pub fn is_standard(self) -> bool {
        self != AssignmentOperator::PowerAssign
    }
}

operator_enum! {
    /// `var`, `let` or `const`.
    VarKind {
        Var => "var",
        Let => "let",
        Const => "const",
    }
}

operator_enum! {
    /// The kind of an object or class method.
    MethodKind {
        Method => "method",
        Get => "get",
        Set => "set",
        Constructor => "constructor",
    }
}

operator_enum! {
    /// Script or module goal.
    SourceType {
        Script => "script",
        Module => "module",
    }
}

impl Default for SourceType {
    fn default() -> Self {
        SourceType::Script
    }
}

impl<'de> serde::Deserialize<'de> for SourceType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <String as serde::Deserialize>::deserialize(deserializer)?;
        SourceType::from_text(&text)
            .ok_or_else(|| serde::de::Error::unknown_variant(&text, &["script", "module"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_text_round_trip() {
        for text in ["|>", "===", "instanceof", ">>>", "**", "^"] {
            let op = BinaryOperator::from_text(text);
            assert_eq!(op.map(BinaryOperator::as_str), Some(text));
        }
        assert_eq!(AssignmentOperator::from_text("??="), Some(AssignmentOperator::NullishAssign));
        assert_eq!(UnaryOperator::from_text("++"), None);
    }

    #[test]
    fn test_source_only_operators() {
        assert!(!BinaryOperator::Pipeline.is_standard());
        assert!(!BinaryOperator::Power.is_standard());
        assert!(BinaryOperator::Exponent.is_standard());
        assert!(!AssignmentOperator::PowerAssign.is_standard());
    }
}
