//! Program-image parsing.
//!
//! The on-disk contract is preserved from the original simulator: ASCII
//! hexadecimal words, one per line, where the first word is the load (base)
//! address and every following word is a consecutive memory content starting
//! at that address. An optional `0x`/`0X` prefix is accepted and blank lines
//! are skipped.

use thiserror::Error;

/// Errors raised while parsing or loading a program image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// The image contains no words at all (not even a base address).
    #[error("program image is empty")]
    Empty,
    /// A line was not a 16-bit hexadecimal word.
    #[error("line {line}: invalid image word `{text}`")]
    InvalidWord {
        /// 1-based line number in the image source.
        line: usize,
        /// The offending line content.
        text: String,
    },
    /// The image extends past the end of backed memory.
    #[error("image of {words} words at base {base:#06x} does not fit in memory")]
    DoesNotFit {
        /// Load base address.
        base: u16,
        /// Number of content words in the image.
        words: usize,
    },
}

/// A parsed program image: a base address and the consecutive words to place
/// there.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Program {
    base: u16,
    words: Vec<u16>,
}

impl Program {
    /// Builds an image directly from a base address and word list.
    #[must_use]
    pub const fn from_words(base: u16, words: Vec<u16>) -> Self {
        Self { base, words }
    }

    /// Parses image source text: one hexadecimal word per line, base first.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Empty`] when no words are present and
    /// [`ImageError::InvalidWord`] for any malformed line.
    pub fn parse(source: &str) -> Result<Self, ImageError> {
        let mut base = None;
        let mut words = Vec::new();

        for (index, raw_line) in source.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            let digits = line
                .strip_prefix("0x")
                .or_else(|| line.strip_prefix("0X"))
                .unwrap_or(line);
            let word = u16::from_str_radix(digits, 16).map_err(|_| ImageError::InvalidWord {
                line: index + 1,
                text: raw_line.to_string(),
            })?;

            if base.is_none() {
                base = Some(word);
            } else {
                words.push(word);
            }
        }

        let base = base.ok_or(ImageError::Empty)?;
        Ok(Self { base, words })
    }

    /// Load base address (the first word of the image).
    #[must_use]
    pub const fn base(&self) -> u16 {
        self.base
    }

    /// Consecutive memory contents starting at the base address.
    #[must_use]
    pub fn words(&self) -> &[u16] {
        &self.words
    }
}

#[cfg(test)]
mod tests {
    use super::{ImageError, Program};

    #[test]
    fn parses_base_then_consecutive_words() {
        let program = Program::parse("3000\n1265\nC000\n").expect("valid image");
        assert_eq!(program.base(), 0x3000);
        assert_eq!(program.words(), &[0x1265, 0xC000]);
    }

    #[test]
    fn accepts_hex_prefix_and_blank_lines() {
        let program = Program::parse("0x3000\n\n  0XC000\n").expect("valid image");
        assert_eq!(program.base(), 0x3000);
        assert_eq!(program.words(), &[0xC000]);
    }

    #[test]
    fn base_only_image_is_valid_and_loads_nothing() {
        let program = Program::parse("3000\n").expect("valid image");
        assert_eq!(program.base(), 0x3000);
        assert!(program.words().is_empty());
    }

    #[test]
    fn empty_image_is_rejected() {
        assert_eq!(Program::parse(""), Err(ImageError::Empty));
        assert_eq!(Program::parse("\n  \n"), Err(ImageError::Empty));
    }

    #[test]
    fn malformed_word_reports_line_number() {
        let err = Program::parse("3000\nzz\n").expect_err("invalid word");
        assert_eq!(
            err,
            ImageError::InvalidWord {
                line: 2,
                text: "zz".to_string(),
            }
        );
    }

    #[test]
    fn words_wider_than_16_bits_are_rejected() {
        assert!(Program::parse("3000\n10000\n").is_err());
    }
}
