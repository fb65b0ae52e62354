//! Reading newline-delimited job input.

use crate::core::InputLine;
use crate::errors::{Error, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const STDIN_LABEL: &str = "<stdin>";

/// Read all non-blank lines from `reader`, numbering them from 1.
///
/// Line numbers count blank lines too, so they match what an editor shows.
/// A trailing `\r` is dropped. Each line is decoded on its own; a line that
/// is not valid UTF-8 is kept and rejected later by the job that maps it.
pub fn read_lines<R: BufRead>(mut reader: R, origin: &str) -> Result<Vec<InputLine>> {
    let origin: Arc<str> = Arc::from(origin);
    let mut lines = Vec::new();
    let mut buffer = Vec::new();
    let mut number = 0u64;

    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            break;
        }
        number += 1;

        let mut bytes = buffer.as_slice();
        if let Some(rest) = bytes.strip_suffix(b"\n") {
            bytes = rest;
        }
        if let Some(rest) = bytes.strip_suffix(b"\r") {
            bytes = rest;
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let line = InputLine::from_bytes(Arc::clone(&origin), number, bytes);
        if !line.is_valid_utf8() {
            tracing::debug!("{}:{} is not valid UTF-8", origin, number);
        }
        lines.push(line);
    }

    Ok(lines)
}

fn read_path(path: &Path) -> Result<Vec<InputLine>> {
    if path == Path::new("-") {
        return read_lines(io::stdin().lock(), STDIN_LABEL);
    }

    let file =
        File::open(path).map_err(|e| Error::io_with_path("Failed to open input", path, e))?;
    read_lines(BufReader::new(file), &path.display().to_string())
        .map_err(|e| match e {
            Error::Io { source, .. } => Error::io_with_path("Failed to read input", path, source),
            other => other,
        })
}

/// Read every input in order; no paths means stdin.
pub fn read_inputs(paths: &[PathBuf]) -> Result<Vec<InputLine>> {
    if paths.is_empty() {
        return read_lines(io::stdin().lock(), STDIN_LABEL);
    }

    let mut lines = Vec::new();
    for path in paths {
        let mut batch = read_path(path)?;
        tracing::debug!("Read {} records from {}", batch.len(), path.display());
        lines.append(&mut batch);
    }
    Ok(lines)
}
