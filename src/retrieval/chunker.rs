use serde::{Deserialize, Serialize};

use crate::error::ChunkError;

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    /// Character offset of the first character in the source text.
    pub origin_offset: usize,
}

/// Split `text` into contiguous, non-overlapping windows of `size` characters.
/// The last window holds the remainder.
pub fn chunk(text: &str, size: usize) -> Result<Vec<Chunk>, ChunkError> {
    if size == 0 {
        return Err(ChunkError::ZeroSize);
    }

    let mut chunks = Vec::new();
    let mut start_byte = 0usize;
    let mut start_char = 0usize;
    let mut taken = 0usize;

    for (byte_idx, _) in text.char_indices() {
        if taken == size {
            chunks.push(Chunk {
                content: text[start_byte..byte_idx].to_string(),
                origin_offset: start_char,
            });
            start_byte = byte_idx;
            start_char += size;
            taken = 0;
        }
        taken += 1;
    }

    if taken > 0 {
        chunks.push(Chunk {
            content: text[start_byte..].to_string(),
            origin_offset: start_char,
        });
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_nothing() {
        assert!(chunk("", 4).unwrap().is_empty());
    }

    #[test]
    fn zero_size_is_rejected() {
        assert_eq!(chunk("abc", 0), Err(ChunkError::ZeroSize));
    }

    #[test]
    fn remainder_goes_last() {
        let c = chunk("abcdefghij", 4).unwrap();
        let parts: Vec<_> = c.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(parts, vec!["abcd", "efgh", "ij"]);
        let offsets: Vec<_> = c.iter().map(|c| c.origin_offset).collect();
        assert_eq!(offsets, vec![0, 4, 8]);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let c = chunk("abcdef", 3).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c[1].content, "def");
    }

    #[test]
    fn partition_is_lossless_and_count_is_ceil() {
        let text = "Zvuk přenosu · 字幕 and plain ascii text, repeated. ".repeat(7);
        let len = text.chars().count();
        for size in [1usize, 2, 3, 7, 10, 64, len, len + 5] {
            let c = chunk(&text, size).unwrap();
            assert_eq!(c.len(), len.div_ceil(size), "size {size}");
            let joined: String = c.iter().map(|c| c.content.as_str()).collect();
            assert_eq!(joined, text);
            assert!(c.iter().all(|c| c.content.chars().count() <= size));
        }
    }
}
