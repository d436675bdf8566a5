//! Line-oriented file format shared by the history and macro files.
//!
//! ```text
//! FileVersion 0.1
//! <n = argument count + 2>
//! <display line as typed>
//! <command display name>
//! <argument text>            (n - 2 lines)
//! ...
//! ```
//!
//! The macro file wraps groups of records in a block headed by the block's
//! total line count (including the count line itself and the trigger line)
//! followed by the trigger.

use crate::error::ConsoleError;

use super::macros::Macro;
use super::record::HistoryRecord;

pub const FILE_VERSION: &str = "FileVersion 0.1";

/// Decoded file contents. A malformed tail stops decoding; what was read
/// before it is kept.
#[derive(Debug)]
pub struct Decoded<T> {
    pub items: Vec<T>,
    pub malformed: Option<ConsoleError>,
}

fn one_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

fn record_line_count(record: &HistoryRecord) -> usize {
    record.argument_texts.len() + 3
}

fn encode_record(record: &HistoryRecord, out: &mut Vec<String>) {
    out.push((record.argument_texts.len() + 2).to_string());
    out.push(one_line(&record.display));
    out.push(one_line(&record.command_name));
    out.extend(record.argument_texts.iter().map(|a| one_line(a)));
}

fn finish(lines: Vec<String>) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

pub fn encode_history(records: &[HistoryRecord]) -> String {
    let mut lines = vec![FILE_VERSION.to_string()];
    for record in records {
        encode_record(record, &mut lines);
    }
    finish(lines)
}

pub fn encode_macros(macros: &[Macro]) -> String {
    let mut lines = vec![FILE_VERSION.to_string()];
    for m in macros {
        let block: usize = 2 + m.records.iter().map(record_line_count).sum::<usize>();
        lines.push(block.to_string());
        lines.push(one_line(&m.trigger));
        for record in &m.records {
            encode_record(record, &mut lines);
        }
    }
    finish(lines)
}

/// Split off and check the version line. Empty text decodes as nothing.
fn body<'t>(store: &str, text: &'t str) -> Result<Vec<&'t str>, ConsoleError> {
    let mut lines = text.lines();
    match lines.next() {
        None => Ok(Vec::new()),
        Some(first) if first.trim_end() == FILE_VERSION => Ok(lines.collect()),
        Some(first) => Err(ConsoleError::FormatVersion {
            store: store.to_string(),
            found: first.trim_end().to_string(),
        }),
    }
}

fn malformed(store: &str, line: usize, message: impl Into<String>) -> ConsoleError {
    ConsoleError::Malformed {
        store: store.to_string(),
        line,
        message: message.into(),
    }
}

/// Decode consecutive records from `lines`. `first_line` is the 1-based file
/// line number of `lines[0]`, used in error messages.
fn decode_records(store: &str, lines: &[&str], first_line: usize) -> Decoded<HistoryRecord> {
    let mut items = Vec::new();
    let mut i = 0;
    while let Some(header) = lines.get(i) {
        let line = first_line + i;
        let count = match header.trim().parse::<usize>() {
            Ok(n) if n >= 2 => n,
            _ => {
                return Decoded {
                    items,
                    malformed: Some(malformed(store, line, format!("bad line count '{header}'"))),
                }
            }
        };
        let Some(fields) = i.checked_add(count).and_then(|end| lines.get(i + 1..=end)) else {
            return Decoded {
                items,
                malformed: Some(malformed(store, line, "record runs past end of file")),
            };
        };
        if let [display, command, args @ ..] = fields {
            items.push(HistoryRecord::unresolved(
                *display,
                command.trim(),
                args.iter().map(|a| (*a).to_string()).collect(),
            ));
        }
        i += count + 1;
    }
    Decoded {
        items,
        malformed: None,
    }
}

pub fn decode_history(store: &str, text: &str) -> Result<Decoded<HistoryRecord>, ConsoleError> {
    let lines = body(store, text)?;
    Ok(decode_records(store, &lines, 2))
}

pub fn decode_macros(store: &str, text: &str) -> Result<Decoded<Macro>, ConsoleError> {
    let lines = body(store, text)?;
    let mut items = Vec::new();
    let mut i = 0;
    while let Some(header) = lines.get(i) {
        let line = i + 2;
        let block = match header.trim().parse::<usize>() {
            Ok(n) if n >= 2 => n,
            _ => {
                return Ok(Decoded {
                    items,
                    malformed: Some(malformed(store, line, format!("bad block size '{header}'"))),
                })
            }
        };
        let block_lines = i.checked_add(block).and_then(|end| lines.get(i..end));
        let Some([_, trigger, records @ ..]) = block_lines else {
            return Ok(Decoded {
                items,
                malformed: Some(malformed(store, line, "macro runs past end of file")),
            });
        };
        let decoded = decode_records(store, records, line + 2);
        items.push(Macro {
            trigger: trigger.trim().to_string(),
            records: decoded.items,
        });
        if decoded.malformed.is_some() {
            return Ok(Decoded {
                items,
                malformed: decoded.malformed,
            });
        }
        i += block;
    }
    Ok(Decoded {
        items,
        malformed: None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn record(display: &str, name: &str, args: &[&str]) -> HistoryRecord {
        HistoryRecord::unresolved(display, name, args.iter().map(|a| (*a).to_string()).collect())
    }

    #[test]
    fn history_layout_matches_the_file_format() {
        let text = encode_history(&[
            record("spawn slime 2", "Spawn", &["Slime", "2"]),
            record("Flash", "Flash", &[]),
        ]);
        assert_eq!(
            text,
            "FileVersion 0.1\n4\nspawn slime 2\nSpawn\nSlime\n2\n2\nFlash\nFlash\n"
        );
        let decoded = decode_history("h", &text).unwrap();
        assert!(decoded.malformed.is_none());
        assert_eq!(decoded.items.len(), 2);
        assert_eq!(decoded.items[0].argument_texts, vec!["Slime", "2"]);
        assert_eq!(decoded.items[1].command_name, "Flash");
    }

    #[test]
    fn macro_blocks_count_their_own_header() {
        let m = Macro {
            trigger: "F5".into(),
            records: vec![record("Echo hi", "Echo", &["hi"])],
        };
        let text = encode_macros(&[m.clone(), Macro { trigger: "F6".into(), ..m }]);
        assert_eq!(
            text,
            "FileVersion 0.1\n6\nF5\n3\nEcho hi\nEcho\nhi\n6\nF6\n3\nEcho hi\nEcho\nhi\n"
        );
        let decoded = decode_macros("m", &text).unwrap();
        assert_eq!(decoded.items.len(), 2);
        assert_eq!(decoded.items[1].trigger, "F6");
        assert_eq!(decoded.items[1].records[0].argument_texts, vec!["hi"]);
    }

    #[test]
    fn foreign_version_is_rejected() {
        let err = decode_history("h", "FileVersion 9\n2\na\nb\n").unwrap_err();
        assert!(matches!(err, ConsoleError::FormatVersion { found, .. } if found == "FileVersion 9"));
        assert!(decode_macros("m", "garbage").is_err());
    }

    #[test]
    fn empty_text_is_empty_history() {
        assert!(decode_history("h", "").unwrap().items.is_empty());
    }

    #[test]
    fn truncated_tail_keeps_earlier_records() {
        let decoded = decode_history("h", "FileVersion 0.1\n2\nA\nA\n4\nB\nB\n").unwrap();
        assert_eq!(decoded.items.len(), 1);
        assert!(matches!(
            decoded.malformed,
            Some(ConsoleError::Malformed { line: 5, .. })
        ));
        let decoded = decode_history("h", "FileVersion 0.1\nx\n").unwrap();
        assert!(decoded.items.is_empty());
        assert!(decoded.malformed.is_some());
    }

    #[test]
    fn oversized_counts_are_malformed() {
        let text = "FileVersion 0.1\n2\nA\nA\n18446744073709551615\nB\n";
        let decoded = decode_history("h", text).unwrap();
        assert_eq!(decoded.items.len(), 1);
        assert!(matches!(
            decoded.malformed,
            Some(ConsoleError::Malformed { line: 5, .. })
        ));

        let decoded = decode_macros(
            "m",
            "FileVersion 0.1\n5\nF1\n2\nA\nA\n18446744073709551615\nF2\n",
        )
        .unwrap();
        assert_eq!(decoded.items.len(), 1);
        assert!(decoded.malformed.is_some());

        let decoded = decode_macros(
            "m",
            "FileVersion 0.1\n5\nF1\n18446744073709551615\nA\nA\n",
        )
        .unwrap();
        assert_eq!(decoded.items.len(), 1);
        assert!(decoded.items[0].records.is_empty());
        assert!(decoded.malformed.is_some());
    }

    #[test]
    fn windows_line_endings_are_accepted() {
        let decoded = decode_history("h", "FileVersion 0.1\r\n2\r\nA\r\nA\r\n").unwrap();
        assert_eq!(decoded.items[0].command_name, "A");
    }
}
