//! Overlapping fixed-size text windows.
//!
//! Tiered splitting strategy:
//! 1. Break at paragraph boundaries (blank lines)
//! 2. Break at single newlines
//! 3. Break at word boundaries
//! 4. Last resort: hard cut at the character budget
//!
//! Fragments are then merged back into windows of at most [`CHUNK_SIZE`]
//! characters; when a window is flushed, up to [`CHUNK_OVERLAP`] trailing
//! characters are carried into the next window so adjacent chunks share
//! context. All sizes are counted in characters and every cut lands on a
//! UTF-8 character boundary.

use super::fetch::SourceDocument;

/// Target window size in characters.
pub const CHUNK_SIZE: usize = 800;

/// Maximum characters shared between adjacent windows.
pub const CHUNK_OVERLAP: usize = 80;

/// A bounded-length fragment of one source document.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub source_url: String,
}

/// Splits every document, preserving each chunk's origin URL.
pub fn split_documents(documents: &[SourceDocument]) -> Vec<Chunk> {
    documents.iter().flat_map(split_document).collect()
}

/// Splits one document into chunks tagged with its source URL.
///
/// A document no longer than [`CHUNK_SIZE`] yields exactly one chunk whose
/// text equals the document text.
pub fn split_document(document: &SourceDocument) -> Vec<Chunk> {
    split_text(&document.text, CHUNK_SIZE, CHUNK_OVERLAP)
        .into_iter()
        .map(|text| Chunk {
            text,
            source_url: document.source_url.clone(),
        })
        .collect()
}

/// Splits `text` into windows of at most `size` characters with up to
/// `overlap` characters shared between neighbors.
pub fn split_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    debug_assert!(overlap < size);

    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= size {
        return vec![text.to_string()];
    }

    let fragments = fragment(text, size);

    let mut chunks: Vec<String> = Vec::new();
    let mut window: Vec<&str> = Vec::new();
    let mut window_len = 0usize;

    for piece in fragments {
        let piece_len = char_len(piece);
        if window_len + piece_len > size && !window.is_empty() {
            chunks.push(window.concat());

            // Carry trailing fragments up to `overlap` chars into the next window.
            let mut carried: Vec<&str> = Vec::new();
            let mut carried_len = 0usize;
            for prev in window.iter().rev() {
                let prev_len = char_len(prev);
                if carried_len + prev_len > overlap {
                    break;
                }
                carried_len += prev_len;
                carried.push(prev);
            }
            carried.reverse();
            window = carried;
            window_len = carried_len;

            // Shrink the carry if the incoming piece would bust the budget.
            while window_len + piece_len > size && !window.is_empty() {
                let removed = window.remove(0);
                window_len -= char_len(removed);
            }
        }
        window.push(piece);
        window_len += piece_len;
    }

    if !window.is_empty() {
        chunks.push(window.concat());
    }

    chunks
        .into_iter()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Cuts `text` into fragments of at most `size` characters, preferring the
/// largest structural boundary available. Concatenating the fragments
/// reproduces `text` exactly.
fn fragment(text: &str, size: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    for paragraph in text.split_inclusive("\n\n") {
        if char_len(paragraph) <= size {
            pieces.push(paragraph);
            continue;
        }
        for line in paragraph.split_inclusive('\n') {
            if char_len(line) <= size {
                pieces.push(line);
                continue;
            }
            for word in line.split_inclusive(' ') {
                if char_len(word) <= size {
                    pieces.push(word);
                } else {
                    hard_split(word, size, &mut pieces);
                }
            }
        }
    }
    pieces
}

fn hard_split<'a>(text: &'a str, size: usize, out: &mut Vec<&'a str>) {
    let mut start = 0usize;
    let mut count = 0usize;
    for (idx, _) in text.char_indices() {
        if count == size {
            out.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
