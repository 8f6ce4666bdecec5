//! Character classification for identifiers, whitespace and line breaks.
//!
//! ASCII is decided with direct comparisons. Above ASCII, `unicode-xid`
//! answers XID_Start / XID_Continue, and the small run-length tables below
//! add the ID_Start / ID_Continue code points that XID leaves out.

use unicode_xid::UnicodeXID;

/// Extra identifier-start code points, as alternating
/// (distance from the previous range end, range length) pairs.
const EXTRA_ID_START: &[u32] = &[
    0x2118, 1, // SCRIPT CAPITAL P
    0x15, 1, // ESTIMATED SYMBOL
    0xF6C, 2, // KATAKANA-HIRAGANA VOICED / SEMI-VOICED SOUND MARK
];

/// Extra identifier-continue code points, same encoding.
const EXTRA_ID_CONTINUE: &[u32] = &[
    0xB7, 1, // MIDDLE DOT
    0x2CF, 1, // GREEK ANO TELEIA
    0xFE1, 9, // ETHIOPIC DIGITS ONE..NINE
    0x668, 1, // NEW TAI LUE THAM DIGIT ONE
];

const ZWNJ: u32 = 0x200C;
const ZWJ: u32 = 0x200D;

/// Whether `code` falls in a run-length encoded set.
///
/// Walks the pairs accumulating the offset until it passes `code`.
fn is_in_set(code: u32, set: &[u32]) -> bool {
    let mut pos = 0u32;
    for pair in set.chunks_exact(2) {
        pos += pair[0];
        if pos > code {
            return false;
        }
        pos += pair[1];
        if pos > code {
            return true;
        }
    }
    false
}

/// Whether `code` may start an identifier.
#[inline]
pub fn is_identifier_start(code: u32) -> bool {
    if code < 0x80 {
        return matches!(code, 0x24 | 0x5F) || (code | 0x20).wrapping_sub(0x61) < 26;
    }
    char::from_u32(code).is_some_and(UnicodeXID::is_xid_start) || is_in_set(code, EXTRA_ID_START)
}

/// Whether `code` may continue an identifier.
#[inline]
pub fn is_identifier_char(code: u32) -> bool {
    if code < 0x80 {
        return is_identifier_start(code) || (0x30..=0x39).contains(&code);
    }
    code == ZWNJ
        || code == ZWJ
        || char::from_u32(code).is_some_and(UnicodeXID::is_xid_continue)
        || is_in_set(code, EXTRA_ID_START)
        || is_in_set(code, EXTRA_ID_CONTINUE)
}

#[inline]
pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Whitespace other than line terminators.
#[inline]
pub fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        ' ' | '\t'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{180E}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

#[inline]
pub fn is_digit(ch: char) -> bool {
    ch.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_identifiers() {
        for ch in ['a', 'Z', '$', '_'] {
            assert!(is_identifier_start(ch as u32), "{ch}");
        }
        assert!(!is_identifier_start('1' as u32));
        assert!(!is_identifier_start('#' as u32));
        assert!(is_identifier_char('1' as u32));
        assert!(!is_identifier_char('-' as u32));
        assert!(!is_identifier_start('[' as u32));
        assert!(!is_identifier_start('`' as u32));
    }

    #[test]
    fn test_unicode_identifiers() {
        assert!(is_identifier_start('é' as u32));
        assert!(is_identifier_start('λ' as u32));
        assert!(is_identifier_start(0x2118));
        assert!(is_identifier_start(0x212E));
        assert!(is_identifier_start(0x309B));
        assert!(is_identifier_start(0x309C));
        assert!(!is_identifier_start(0x309D - 0x60));
        assert!(is_identifier_char(ZWJ));
        assert!(is_identifier_char(0x00B7));
        assert!(is_identifier_char(0x1371));
        assert!(!is_identifier_start(0x2028));
    }

    #[test]
    fn test_run_length_set() {
        let set = [10, 2, 5, 1];
        assert!(!is_in_set(9, &set));
        assert!(is_in_set(10, &set));
        assert!(is_in_set(11, &set));
        assert!(!is_in_set(12, &set));
        assert!(is_in_set(17, &set));
        assert!(!is_in_set(18, &set));
    }

    #[test]
    fn test_whitespace_and_line_terminators() {
        assert!(is_whitespace('\u{3000}'));
        assert!(!is_whitespace('\n'));
        assert!(is_line_terminator('\u{2029}'));
        assert!(!is_line_terminator(' '));
    }
}
