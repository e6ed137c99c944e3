use crate::types::Chunk;

/// Greedy word wrap: whole words are packed into segments of at most
/// `max_width` characters, separated by single spaces. A word longer than
/// `max_width` becomes a chunk of its own and is never split.
pub fn chunk(text: &str, max_width: usize) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.chars().count();
        let needed = if current.is_empty() { word_width } else { current_width + 1 + word_width };

        if !current.is_empty() && needed > max_width {
            push_chunk(&mut chunks, std::mem::take(&mut current));
            current_width = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }

    if !current.is_empty() {
        push_chunk(&mut chunks, current);
    }

    chunks
}

fn push_chunk(chunks: &mut Vec<Chunk>, text: String) {
    let index = chunks.len();
    chunks.push(Chunk { index, text });
}
