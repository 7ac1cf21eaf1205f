//! Overlapping text chunking for long documents

/// Characters removed by [`strip_delimiters`]
const DELIMITERS: &[char] = &[
    ',', '*', '#', '[', ']', '(', ')', '{', '}', '`', '~', '^', '=', '|',
];

/// Remove markup and table delimiters that confuse small models
pub fn strip_delimiters(text: &str) -> String {
    text.chars().filter(|c| !DELIMITERS.contains(c)).collect()
}

/// One window of a document's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Identifier of the originating document; empty for bare text
    pub document_id: String,

    /// Position of the chunk within its document
    pub index: usize,

    /// Offset of the first character (in chars, not bytes)
    pub start: usize,

    /// Offset one past the last character (in chars, not bytes)
    pub end: usize,

    /// Leading characters shared with the previous chunk
    pub overlap: usize,

    /// The chunk's text
    pub text: String,
}

impl TextChunk {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }

    /// The part of the chunk not already covered by the previous chunk
    pub fn fresh_text(&self) -> &str {
        match self.text.char_indices().nth(self.overlap) {
            Some((byte, _)) => &self.text[byte..],
            None => "",
        }
    }
}

/// Splits text into overlapping windows of bounded size
///
/// Each window starts `overlap` characters before the previous one ended.
/// A window ends at the best natural breakpoint in its second half
/// (paragraph, line, sentence, then any whitespace) and falls back to a
/// hard cut at `max_chunk_size`.
#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    max_chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new text chunker
    ///
    /// Callers validate `0 < max_chunk_size` and `overlap < max_chunk_size`
    /// through `ExtractorConfig::validate`; out-of-range values are clamped.
    pub fn new(max_chunk_size: usize, overlap: usize) -> Self {
        let max_chunk_size = max_chunk_size.max(1);
        Self {
            max_chunk_size,
            overlap: overlap.min(max_chunk_size - 1),
        }
    }

    /// Chunk the given text
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        self.chunk_document("", text)
    }

    /// Chunk the text of one document, tagging every chunk with its id
    pub fn chunk_document(&self, document_id: &str, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        if total <= self.max_chunk_size {
            return vec![TextChunk {
                document_id: document_id.to_string(),
                index: 0,
                start: 0,
                end: total,
                overlap: 0,
                text: text.to_string(),
            }];
        }

        // Byte offset of every char position, plus the end of the text
        let offsets: Vec<usize> = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();

        let mut chunks = Vec::new();
        let mut start = 0;
        let mut shared = 0;

        loop {
            let end = if total - start <= self.max_chunk_size {
                total
            } else {
                let hard_end = start + self.max_chunk_size;
                // Keep the next start strictly ahead of this one and avoid slivers
                let floor = (start + self.max_chunk_size / 2).max(start + self.overlap + 1);
                find_breakpoint(&chars, floor, hard_end).unwrap_or(hard_end)
            };

            chunks.push(TextChunk {
                document_id: document_id.to_string(),
                index: chunks.len(),
                start,
                end,
                overlap: shared,
                text: text[offsets[start]..offsets[end]].to_string(),
            });

            if end == total {
                break;
            }
            start = end - self.overlap;
            shared = self.overlap;
        }

        chunks
    }
}

/// Split `text` into chunk strings; see [`TextChunker`]
pub fn split_text(text: &str, max_chunk_size: usize, overlap: usize) -> Vec<String> {
    TextChunker::new(max_chunk_size, overlap)
        .chunk(text)
        .into_iter()
        .map(|c| c.text)
        .collect()
}

/// Latest end position in `[floor, ceiling]` that follows a natural break
fn find_breakpoint(chars: &[char], floor: usize, ceiling: usize) -> Option<usize> {
    let paragraph = |end: usize| end >= 2 && chars[end - 2] == '\n' && chars[end - 1] == '\n';
    let line = |end: usize| chars[end - 1] == '\n';
    let sentence = |end: usize| {
        end >= 2 && matches!(chars[end - 2], '.' | '!' | '?') && chars[end - 1].is_whitespace()
    };
    let whitespace = |end: usize| chars[end - 1].is_whitespace();

    let floor = floor.max(1);

    last_match(floor, ceiling, paragraph)
        .or_else(|| last_match(floor, ceiling, line))
        .or_else(|| last_match(floor, ceiling, sentence))
        .or_else(|| last_match(floor, ceiling, whitespace))
}

fn last_match(floor: usize, ceiling: usize, pred: impl Fn(usize) -> bool) -> Option<usize> {
    (floor..=ceiling).rev().find(|&end| pred(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(chunks: &[TextChunk]) -> String {
        chunks.iter().map(|c| c.fresh_text()).collect()
    }

    #[test]
    fn test_no_chunking_needed_for_small_text() {
        let chunker = TextChunker::new(100, 10);
        let text = "Short text here.";
        let chunks = chunker.chunk(text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].overlap, 0);
    }

    #[test]
    fn test_empty_text() {
        let chunks = TextChunker::new(100, 10).chunk("");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "");
    }

    #[test]
    fn test_exact_length_is_single_chunk() {
        let text = "a".repeat(100);
        assert_eq!(TextChunker::new(100, 10).chunk(&text).len(), 1);
    }

    #[test]
    fn test_raw_cut_without_breakpoints() {
        let text = "a".repeat(5000);
        let chunks = TextChunker::new(2000, 200).chunk(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].char_len(), 2000);
        assert_eq!(chunks[1].char_len(), 2000);
        assert_eq!(chunks[1].start, 1800);
        assert_eq!(chunks[2].start, 3600);
        assert_eq!(chunks[2].end, 5000);
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let text = "a".repeat(250);
        let chunks = TextChunker::new(100, 20).chunk(&text);

        for pair in chunks.windows(2) {
            assert_eq!(pair[0].end - pair[1].start, 20);
            assert_eq!(pair[1].overlap, 20);
        }
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let first = "a".repeat(60);
        let text = format!("{}\n\n{}", first, "b".repeat(80));
        let chunks = TextChunker::new(100, 0).chunk(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, format!("{}\n\n", first));
        assert_eq!(chunks[1].text, "b".repeat(80));
    }

    #[test]
    fn test_prefers_sentence_over_whitespace() {
        let text = format!("{}. {} {}", "a".repeat(55), "b".repeat(20), "c".repeat(60));
        let chunks = TextChunker::new(100, 0).chunk(&text);

        assert!(chunks[0].text.ends_with(". "));
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_ignores_breakpoints_in_first_half() {
        let text = format!("ab\n\n{}", "c".repeat(300));
        let chunks = TextChunker::new(100, 10).chunk(&text);

        assert_eq!(chunks[0].char_len(), 100);
    }

    #[test]
    fn test_multibyte_text_is_cut_on_char_boundaries() {
        let text = "é".repeat(250);
        let chunks = TextChunker::new(100, 10).chunk(&text);

        assert!(chunks.iter().all(|c| c.text.chars().count() <= 100));
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_chunk_document_tags_every_chunk() {
        let chunks = TextChunker::new(10, 2).chunk_document("paper.txt", &"x".repeat(25));
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.document_id == "paper.txt"));
        assert!(TextChunker::new(10, 2).chunk("short")[0].document_id.is_empty());
    }

    #[test]
    fn test_split_text_returns_strings() {
        let chunks = split_text(&"x".repeat(30), 10, 2);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.len() <= 10));
    }

    #[test]
    fn test_strip_delimiters() {
        assert_eq!(strip_delimiters("**Table [1]**, (a=b) | `c`"), "Table 1 ab  c");
    }
}
