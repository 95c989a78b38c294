//! Fuzz target for raw byte ingestion.
//!
//! Feeds arbitrary bytes through `insert_bytes_at` in small pieces and
//! checks that the stored text is always valid, scalar-aligned UTF-8.

#![no_main]

use gaptree::{GapBuffer, GapBufferOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let options = GapBufferOptions::default()
        .with_chunk_size(5)
        .with_initial_gap(3);
    let mut buffer = GapBuffer::with_options(options);

    for piece in data.chunks(7) {
        // Alternate between appending and prepending.
        let pos = if piece.first().is_some_and(|b| b % 2 == 0) {
            0
        } else {
            buffer.len()
        };
        buffer.insert_bytes_at(pos, piece).unwrap();
    }

    let text = buffer.get_text();
    assert_eq!(text.len(), buffer.len());
    for start in 0..=text.len().min(64) {
        let _ = buffer.get_text_range(start, text.len());
    }
    assert!(buffer.check_invariants().is_ok());
});
