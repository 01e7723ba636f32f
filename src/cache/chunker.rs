//! Chunker Module
//!
//! Splits serialized payload text into line-aligned chunks of bounded size.

// == Split Into Chunks ==
/// Splits `text` into an ordered sequence of chunks of at most `max_chars`
/// characters each.
///
/// Boundaries only ever fall between lines: joining the returned chunks with
/// `'\n'` reproduces `text` exactly. A chunk's size includes the newlines
/// between its own lines, so a chunk may be exactly `max_chars` long.
///
/// A single line longer than `max_chars` is never cut. It becomes a chunk of
/// its own, larger than the limit.
///
/// Empty input produces no chunks.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    if text.is_empty() {
        return chunks;
    }

    let mut current = String::new();
    let mut current_chars = 0usize;
    // Tracked separately from `current.is_empty()` so empty lines survive
    let mut current_lines = 0usize;

    for line in text.split('\n') {
        let line_chars = line.chars().count();

        if current_lines > 0 && current_chars + 1 + line_chars > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
            current_lines = 0;
        }

        if current_lines > 0 {
            current.push('\n');
            current_chars += 1;
        }
        current.push_str(line);
        current_chars += line_chars;
        current_lines += 1;
    }

    if current_lines > 0 {
        chunks.push(current);
    }

    chunks
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_has_no_chunks() {
        assert!(split_into_chunks("", 100).is_empty());
    }

    #[test]
    fn test_small_input_is_single_chunk() {
        let text = "{\n  \"a\": 1\n}";
        assert_eq!(split_into_chunks(text, 100), vec![text.to_string()]);
    }

    #[test]
    fn test_lines_are_never_split() {
        let text = "aaaa\nbbbb\ncccc";
        let chunks = split_into_chunks(text, 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb", "cccc"]);
    }

    #[test]
    fn test_exact_boundary_fits_in_one_chunk() {
        // "aaaa" + '\n' + "bbbb" is exactly 9 characters
        let chunks = split_into_chunks("aaaa\nbbbb", 9);
        assert_eq!(chunks, vec!["aaaa\nbbbb"]);

        // One more character tips it over
        let chunks = split_into_chunks("aaaa\nbbbbb", 9);
        assert_eq!(chunks, vec!["aaaa", "bbbbb"]);
    }

    #[test]
    fn test_line_exactly_at_limit_is_not_oversized() {
        let line = "x".repeat(10);
        let text = format!("{line}\n{line}");
        let chunks = split_into_chunks(&text, 10);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() == 10));
    }

    #[test]
    fn test_oversized_line_becomes_its_own_chunk() {
        // Line integrity wins over the size cap
        let long = "y".repeat(50);
        let text = format!("short\n{long}\ntail");
        let chunks = split_into_chunks(&text, 10);
        assert_eq!(chunks, vec!["short".to_string(), long, "tail".to_string()]);
    }

    #[test]
    fn test_empty_lines_round_trip() {
        let text = "\n\nabc\n\n";
        let chunks = split_into_chunks(text, 3);
        assert_eq!(chunks.join("\n"), text);
    }

    #[test]
    fn test_sizes_are_counted_in_characters() {
        // Each line is 3 characters but 6 bytes
        let text = "ééé\nééé";
        let chunks = split_into_chunks(text, 7);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let text: String = (0..500).map(|i| format!("line number {i}\n")).collect();
        assert_eq!(split_into_chunks(&text, 300), split_into_chunks(&text, 300));
    }
}
