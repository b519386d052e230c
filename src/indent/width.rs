//! Character width classification for leading whitespace.

/// The CJK ideographic space used as the indentation unit.
pub const FULLWIDTH_SPACE: char = '\u{3000}';

/// Width class of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharWidth {
    /// U+3000 IDEOGRAPHIC SPACE
    FullwidthSpace,
    /// U+0020 SPACE
    HalfwidthSpace,
    /// U+0009 CHARACTER TABULATION
    Tab,
    /// Everything else, visible or not
    Other,
}

/// Classify a character. Total over all code points.
pub fn classify(c: char) -> CharWidth {
    match c {
        FULLWIDTH_SPACE => CharWidth::FullwidthSpace,
        ' ' => CharWidth::HalfwidthSpace,
        '\t' => CharWidth::Tab,
        _ => CharWidth::Other,
    }
}

/// Check whether a character can be part of a leading indent.
pub fn is_indent_whitespace(c: char) -> bool {
    classify(c) != CharWidth::Other
}

/// Build an indent of `width` fullwidth spaces.
pub fn fullwidth_indent(width: usize) -> String {
    std::iter::repeat(FULLWIDTH_SPACE).take(width).collect()
}
