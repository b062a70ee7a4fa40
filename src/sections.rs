//! Section splitting for extracted text.
//!
//! A section is a block of text separated from its neighbours by at least one
//! blank line. Sections are the unit of narration and navigation, so blocks
//! that contain only whitespace are dropped.

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Split text into sections separated by blank lines.
pub fn split_sections(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    BLANK_LINE
        .split(&normalized)
        .filter(|section| !section.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_blank_lines() {
        let sections = split_sections("Intro text\n\nChapter one text\nsecond line");
        assert_eq!(
            sections,
            vec!["Intro text", "Chapter one text\nsecond line"]
        );
    }

    #[test]
    fn whitespace_only_lines_count_as_blank() {
        let sections = split_sections("one\n   \t\ntwo\n\n\n\nthree");
        assert_eq!(sections, vec!["one", "two", "three"]);
    }

    #[test]
    fn blank_input_has_no_sections() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("\n\n  \n\n").is_empty());
    }

    #[test]
    fn windows_line_endings_are_normalized() {
        let sections = split_sections("first\r\n\r\nsecond");
        assert_eq!(sections, vec!["first", "second"]);
    }
}
