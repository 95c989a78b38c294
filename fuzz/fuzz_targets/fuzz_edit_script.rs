//! Fuzz target for gap buffer edit scripts.
//!
//! Replays arbitrary edits, including out-of-range and mid-scalar
//! positions, against a `String` model. Rejected edits must leave the
//! buffer unchanged and accepted ones must match the model.

#![no_main]

use arbitrary::Arbitrary;
use gaptree::{GapBuffer, GapBufferOptions};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Edit {
    Insert { pos: u16, text: String },
    InsertBytes { pos: u16, bytes: Vec<u8> },
    Delete { pos: u16, count: u16 },
    Replace { start: u16, end: u16, text: String },
    InsertRune { pos: u16, text: String },
    DeleteRune { pos: u16, count: u16 },
    Range { start: u16, end: u16 },
}

#[derive(Arbitrary, Debug)]
struct Script {
    chunk_size: u8,
    initial_gap: u8,
    edits: Vec<Edit>,
}

fuzz_target!(|script: Script| {
    let options = GapBufferOptions::default()
        .with_chunk_size(usize::from(script.chunk_size))
        .with_initial_gap(usize::from(script.initial_gap));
    let mut buffer = GapBuffer::with_options(options);
    let mut model = String::new();

    for edit in script.edits.into_iter().take(256) {
        match edit {
            Edit::Insert { pos, text } => {
                let pos = usize::from(pos);
                if buffer.insert_at(pos, &text).is_ok() {
                    model.insert_str(pos, &text);
                }
            }
            Edit::InsertBytes { pos, bytes } => {
                let pos = usize::from(pos);
                if buffer.insert_bytes_at(pos, &bytes).is_ok() {
                    let clean: String = bytes.utf8_chunks().map(|c| c.valid()).collect();
                    model.insert_str(pos, &clean);
                }
            }
            Edit::Delete { pos, count } => {
                let (pos, count) = (usize::from(pos), usize::from(count));
                if buffer.delete_at(pos, count).is_ok() {
                    model.replace_range(pos..pos + count, "");
                }
            }
            Edit::Replace { start, end, text } => {
                let (start, end) = (usize::from(start), usize::from(end));
                if buffer.replace(start, end, &text).is_ok() {
                    model.replace_range(start..end, &text);
                }
            }
            Edit::InsertRune { pos, text } => {
                let pos = usize::from(pos);
                if buffer.insert_rune_at(pos, &text).is_ok() {
                    let at = model.char_indices().nth(pos).map_or(model.len(), |(i, _)| i);
                    model.insert_str(at, &text);
                }
            }
            Edit::DeleteRune { pos, count } => {
                let (pos, count) = (usize::from(pos), usize::from(count));
                if buffer.delete_rune_at(pos, count).is_ok() {
                    let kept: String = model
                        .chars()
                        .enumerate()
                        .filter(|(i, _)| *i < pos || *i >= pos + count)
                        .map(|(_, c)| c)
                        .collect();
                    model = kept;
                }
            }
            Edit::Range { start, end } => {
                let _ = buffer.get_text_range(usize::from(start), usize::from(end));
            }
        }

        assert!(buffer.check_invariants().is_ok());
        assert_eq!(buffer.get_text(), model);
        assert_eq!(buffer.rune_length(), model.chars().count());
    }
});
