//! Shared helpers for integration tests.

#![allow(clippy::nursery)] // Test infra prioritizes clarity over pedantry
#![allow(clippy::pedantic)] // Test infra prioritizes clarity over pedantry
#![allow(dead_code)] // Not every test binary uses every helper

use std::sync::Once;

use gaptree::{GapBuffer, GapBufferOptions};

/// Route `tracing` output through the test harness writer once per binary.
pub fn setup_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}

/// Buffer with small chunks and a small gap so every edit exercises
/// splitting, relocation and expansion.
pub fn cramped(chunk_size: usize, initial_gap: usize) -> GapBuffer {
    GapBuffer::with_options(
        GapBufferOptions::default()
            .with_chunk_size(chunk_size)
            .with_initial_gap(initial_gap),
    )
}

/// Assert layout invariants and that cached lengths agree with the text.
#[track_caller]
pub fn assert_consistent(buffer: &GapBuffer) {
    if let Err(violation) = buffer.check_invariants() {
        panic!("buffer invariant broken: {violation}");
    }
    let text = buffer.get_text();
    assert_eq!(buffer.len(), text.len(), "byte length");
    assert_eq!(buffer.rune_length(), text.chars().count(), "rune length");
}
