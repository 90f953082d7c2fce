//! Sentence-aware text chunking.
//!
//! Splits long text into chunks of bounded character length for the
//! inference engine. Paragraph breaks always start a new chunk; inside a
//! paragraph whole sentences are packed greedily. A sentence is never cut,
//! so a single sentence longer than the limit becomes its own chunk.

use unicode_segmentation::UnicodeSegmentation;

/// Default maximum chunk length in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 300;

/// Splits `text` into ordered chunks of at most `max_chars` characters,
/// except where one sentence alone is longer.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();

    for paragraph in paragraphs(text) {
        let mut current = String::new();
        let mut current_len = 0usize;

        for sentence in paragraph.split_sentence_bounds() {
            let sentence = collapse_whitespace(sentence);
            if sentence.is_empty() {
                continue;
            }
            let sentence_len = sentence.chars().count();

            if current_len == 0 {
                current = sentence;
                current_len = sentence_len;
            } else if current_len + 1 + sentence_len <= max_chars {
                current.push(' ');
                current.push_str(&sentence);
                current_len += 1 + sentence_len;
            } else {
                chunks.push(std::mem::take(&mut current));
                current = sentence;
                current_len = sentence_len;
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }
    }

    chunks
}

/// Blank-line separated paragraphs.
fn paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line.trim());
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
