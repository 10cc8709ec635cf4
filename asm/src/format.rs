//! Renders an assembled image as the two textual output formats: one `0`/`1` string per
//! line, or a single concatenated stream with no separators.

use super32::{MemoryImage, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One 32-character binary string per line, most-significant bit first.
    Lines,
    /// All words concatenated with no separators.
    Stream,
}

fn word_to_binary(word: Word) -> String {
    format!("{:032b}", word)
}

pub fn format_image(image: &MemoryImage, mode: OutputMode) -> String {
    match mode {
        OutputMode::Lines => image
            .as_slice()
            .iter()
            .map(|&w| word_to_binary(w))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputMode::Stream => image.as_slice().iter().map(|&w| word_to_binary(w)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_mode_is_newline_separated_and_msb_first() {
        let image = MemoryImage::from(vec![1, 2]);
        let rendered = format_image(&image, OutputMode::Lines);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "00000000000000000000000000000001");
        assert_eq!(lines[1], "00000000000000000000000000000010");
    }

    #[test]
    fn stream_mode_has_no_separators() {
        let image = MemoryImage::from(vec![1, 2]);
        let rendered = format_image(&image, OutputMode::Stream);
        assert_eq!(rendered.len(), 64);
        assert!(!rendered.contains('\n'));
    }
}
