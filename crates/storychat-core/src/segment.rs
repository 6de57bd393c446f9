//! Splits raw message content into display blocks.
//!
//! Assistant replies mark paragraph boundaries with a literal `###`. The
//! first two parts of a reply run together; every later part starts after a
//! blank line.

/// Paragraph delimiter used by the backend in reply content
pub const DELIMITER: &str = "###";

/// One unit of rendered message content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayBlock {
    Text(String),
    Break,
}

/// Turn raw content into an ordered sequence of display blocks.
///
/// Breaks are keyed on the raw split position, so an empty part still counts
/// toward the index: `"a######c"` yields `a`, two breaks, `c`.
pub fn segment(content: &str) -> Vec<DisplayBlock> {
    let mut blocks = Vec::new();

    for (i, part) in content.split(DELIMITER).enumerate() {
        if part.is_empty() {
            continue;
        }
        if i > 1 {
            blocks.push(DisplayBlock::Break);
            blocks.push(DisplayBlock::Break);
        }
        blocks.push(DisplayBlock::Text(part.to_string()));
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use DisplayBlock::{Break, Text};

    fn text(s: &str) -> DisplayBlock {
        Text(s.to_string())
    }

    #[test]
    fn test_empty_content() {
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_no_delimiter() {
        assert_eq!(segment("hello"), vec![text("hello")]);
    }

    #[test]
    fn test_delimiter_only() {
        assert!(segment("###").is_empty());
    }

    #[test]
    fn test_two_parts_no_break() {
        assert_eq!(segment("a###b"), vec![text("a"), text("b")]);
    }

    #[test]
    fn test_third_part_gets_break() {
        assert_eq!(
            segment("a###b###c"),
            vec![text("a"), text("b"), Break, Break, text("c")]
        );
    }

    #[test]
    fn test_empty_middle_part_keeps_position() {
        assert_eq!(segment("a######c"), vec![text("a"), Break, Break, text("c")]);
    }

    #[test]
    fn test_leading_delimiter() {
        // Parts: "", "intro", "body" -> only "body" sits at index 2
        assert_eq!(
            segment("###intro###body"),
            vec![text("intro"), Break, Break, text("body")]
        );
    }

    #[test]
    fn test_breaks_once_per_part() {
        assert_eq!(
            segment("a###b###c###d"),
            vec![text("a"), text("b"), Break, Break, text("c"), Break, Break, text("d")]
        );
    }

    #[test]
    fn test_whitespace_parts_are_kept() {
        assert_eq!(segment("a### ###c"), vec![text("a"), text(" "), Break, Break, text("c")]);
    }

    #[test]
    fn test_idempotent() {
        let input = "Once###upon a time###there was###a reply";
        assert_eq!(segment(input), segment(input));
    }
}
