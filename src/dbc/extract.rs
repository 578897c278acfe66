use crate::dbc::core::{
    ba_,
    line::{LineKind, classify},
};
use crate::types::{
    catalog::CatalogHead,
    errors::{DbcError, Result},
};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use encoding_rs::UTF_8;

/// One trimmed DBC line with its 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NumberedLine {
    pub line_no: usize,
    pub text: String,
}

/// DBC lines sorted into the worklists consumed by the catalog builder.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Database metadata, captured while reading.
    pub head: CatalogHead,
    /// One entry per `BO_` line followed by its `SG_` lines.
    pub message_blocks: Vec<Vec<NumberedLine>>,
    pub message_attributes: Vec<NumberedLine>,
    pub signal_attributes: Vec<NumberedLine>,
    pub value_tables: Vec<NumberedLine>,
}

/// Reads a DBC file and sorts its lines into worklists.
///
/// # Errors
/// - [`DbcError::FileNotFound`] if `path` does not exist.
/// - [`DbcError::Io`] on read failures.
/// - any error of [`extract_from_reader`].
pub fn extract_file(path: &Path) -> Result<Extracted> {
    if !path.exists() {
        log::error!("dbc file not found: <{}>", path.display());
        return Err(DbcError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file: File = File::open(path).map_err(|source| DbcError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    extract_from_reader(BufReader::new(file), path)
}

/// Streams DBC lines from `reader` and sorts them by statement kind.
///
/// Each line is decoded as UTF-8; malformed sequences are replaced with
/// U+FFFD and reported as a warning. `origin` is only used in diagnostics.
pub fn extract_from_reader<R: BufRead>(mut reader: R, origin: &Path) -> Result<Extracted> {
    log::debug!("start extracting dbc lines and store useful lines to lists");

    let mut out: Extracted = Extracted::default();
    let mut open_block: Vec<NumberedLine> = Vec::new();
    let mut raw_line: Vec<u8> = Vec::with_capacity(256);
    let mut line_no: usize = 0;

    loop {
        raw_line.clear();
        let read: usize = reader
            .read_until(b'\n', &mut raw_line)
            .map_err(|source| DbcError::Io {
                path: origin.to_path_buf(),
                source,
            })?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let (decoded, had_errors) = UTF_8.decode_with_bom_removal(&raw_line);
        if had_errors {
            log::warn!(
                "line {} contains characters that can not be decoded by 'utf-8': <{}>",
                line_no,
                decoded.trim()
            );
        }
        let text: &str = decoded.trim();
        if text.is_empty() {
            continue;
        }

        let kind: LineKind = classify(text);
        if kind != LineKind::Signal && !open_block.is_empty() {
            out.message_blocks.push(std::mem::take(&mut open_block));
        }

        let numbered = || NumberedLine {
            line_no,
            text: text.to_string(),
        };
        match kind {
            LineKind::Message => open_block.push(numbered()),
            LineKind::Signal => {
                if open_block.is_empty() {
                    log::error!("DBC, message data incorrect: <{text}>");
                    return Err(DbcError::OrphanSignal {
                        line_no,
                        line: text.to_string(),
                    });
                }
                open_block.push(numbered());
            }
            LineKind::MessageAttribute => out.message_attributes.push(numbered()),
            LineKind::SignalAttribute => out.signal_attributes.push(numbered()),
            LineKind::ValueTable => out.value_tables.push(numbered()),
            LineKind::BusType => {
                let bus_type: &str =
                    ba_::match_bus_type(text).ok_or_else(|| grammar_error(kind, line_no, text))?;
                out.head.bus_type = Some(bus_type.to_string());
            }
            LineKind::DbName => {
                let db_name: &str =
                    ba_::match_db_name(text).ok_or_else(|| grammar_error(kind, line_no, text))?;
                out.head.db_name = Some(db_name.to_string());
            }
            LineKind::Other => log::debug!("dbc line ignored: <{text}>"),
        }
    }

    // store the last "BO_" block
    if !open_block.is_empty() {
        out.message_blocks.push(open_block);
    }

    log::debug!(
        "extracted {} message block(s), {} message attribute(s), {} signal attribute(s), {} value table(s)",
        out.message_blocks.len(),
        out.message_attributes.len(),
        out.signal_attributes.len(),
        out.value_tables.len()
    );
    Ok(out)
}

pub(crate) fn grammar_error(kind: LineKind, line_no: usize, line: &str) -> DbcError {
    log::error!("DBC, {} can not be parsed: {}", kind.describe(), line);
    DbcError::Grammar {
        kind: kind.describe(),
        line_no,
        line: line.to_string(),
    }
}
