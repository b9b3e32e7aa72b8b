//! Message segmentation.
//!
//! Splits one generated reply into message-sized chunks at sentence-ending
//! punctuation, with a hard length cap for punctuation-free spans. Bracketed
//! emoticon/sticker tokens are never split apart.

use crate::types::Segment;

/// Punctuation that ends a segment (the split character stays with the
/// segment it terminates).
const DEFAULT_SPLIT_TOKENS: &[char] = &[
    '。', '．', '.', '！', '!', '？', '?', '；', ';', '…', '~', '～',
];

/// Marker pairs whose span must stay inside a single segment.
const MARKER_PAIRS: &[(char, char)] = &[('(', ')'), ('（', '）'), ('[', ']'), ('【', '】')];

/// Rule-based segmenter.
#[derive(Debug, Clone)]
pub struct Segmenter {
    max_len: usize,
    min_viable: usize,
    split_tokens: Vec<char>,
}

impl Segmenter {
    pub fn new(max_len: usize, min_viable: usize) -> Self {
        Self {
            max_len,
            min_viable,
            split_tokens: DEFAULT_SPLIT_TOKENS.to_vec(),
        }
    }

    /// Replaces the punctuation rule set.
    pub fn with_split_tokens(mut self, tokens: Vec<char>) -> Self {
        self.split_tokens = tokens;
        self
    }

    /// Segments `text` into ordered chunks.
    ///
    /// Empty (or whitespace-only) input yields no segments, signalling a
    /// no-op turn. Input at or under `max_len` chars is returned as a
    /// single segment equal to the input.
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        if text.chars().count() <= self.max_len {
            return vec![Segment::new(0, text)];
        }

        let mut chunks: Vec<String> = Vec::new();
        let mut buffer = String::new();
        let mut buffer_len = 0usize;
        let mut marker_depth = 0usize;
        let mut marker_open_at = 0usize;

        for ch in text.chars() {
            buffer.push(ch);
            buffer_len += 1;

            if MARKER_PAIRS.iter().any(|(open, _)| *open == ch) {
                if marker_depth == 0 {
                    marker_open_at = buffer_len;
                }
                marker_depth += 1;
            } else if MARKER_PAIRS.iter().any(|(_, close)| *close == ch) {
                marker_depth = marker_depth.saturating_sub(1);
            }

            if marker_depth > 0 {
                // An open span as long as the cap itself is an unmatched
                // bracket in practice; stop protecting it so the hard
                // length cap still holds.
                if buffer_len - marker_open_at < self.max_len {
                    continue;
                }
                marker_depth = 0;
            }

            let at_boundary = self.split_tokens.contains(&ch);
            if at_boundary || buffer_len >= self.max_len {
                Self::flush(&mut chunks, &mut buffer);
                buffer_len = 0;
            }
        }
        Self::flush(&mut chunks, &mut buffer);

        self.merge_trailing_fragment(&mut chunks);

        chunks
            .into_iter()
            .enumerate()
            .map(|(index, text)| Segment::new(index, text))
            .collect()
    }

    fn flush(chunks: &mut Vec<String>, buffer: &mut String) {
        let chunk = buffer.trim();
        if !chunk.is_empty() {
            chunks.push(chunk.to_string());
        }
        buffer.clear();
    }

    /// A trailing fragment shorter than the viable minimum reads as noise
    /// on its own bubble; fold it into the previous segment.
    fn merge_trailing_fragment(&self, chunks: &mut Vec<String>) {
        if chunks.len() < 2 {
            return;
        }
        let last_len = chunks
            .last()
            .map(|c| c.chars().count())
            .unwrap_or(0);
        if last_len >= self.min_viable {
            return;
        }
        if let Some(fragment) = chunks.pop() {
            if let Some(prev) = chunks.last_mut() {
                let needs_space = prev.chars().last().is_some_and(|c| c.is_ascii())
                    && fragment.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
                if needs_space {
                    prev.push(' ');
                }
                prev.push_str(&fragment);
            }
        }
    }
}
