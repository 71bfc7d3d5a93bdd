// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON Lines files for the pending-action journal and the record cache.
//!
//! Appends are fsynced one entry at a time. A process killed mid-append
//! leaves a final line without its newline. Readers skip that torn tail and
//! the next append truncates it, since its write never reported success.
//! Any other unparseable line is an error naming its line number.
//! Rewrites go through a sibling temp file and a rename, so a crash during
//! a queue drain leaves either the old or the new contents.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Appends a value as one line, fsyncing before returning.
pub fn append<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)?;

    trim_torn_tail(&mut file)?;
    writeln!(file, "{json}")?;
    file.sync_all()?;

    Ok(())
}

/// Reads every value, in file order.
///
/// Missing files read as empty. Blank lines are skipped.
pub fn read_all<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let terminated = content.ends_with('\n');
    let lines: Vec<&str> = content.lines().collect();
    let mut values = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(value) => values.push(value),
            Err(e) if !terminated && index + 1 == lines.len() => {
                warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "dropping torn final entry"
                );
            }
            Err(source) => {
                return Err(Error::CorruptLine {
                    line: index + 1,
                    source,
                })
            }
        }
    }

    Ok(values)
}

/// Replaces the file with `values`, atomically.
pub fn write_all<T: Serialize>(path: &Path, values: &[T]) -> Result<()> {
    let staging = staging_path(path);
    let mut file = File::create(&staging)?;

    for value in values {
        let json = serde_json::to_string(value)?;
        writeln!(file, "{json}")?;
    }
    file.sync_all()?;
    drop(file);

    fs::rename(&staging, path)?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Settle a final line that lacks its newline.
///
/// A complete entry gets its newline. Anything else is cut.
fn trim_torn_tail(file: &mut File) -> Result<()> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(());
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    if last[0] == b'\n' {
        return Ok(());
    }

    let mut content = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut content)?;
    let keep = content
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |newline| newline + 1);

    if serde_json::from_slice::<serde_json::Value>(&content[keep..]).is_ok() {
        file.write_all(b"\n")?;
    } else {
        file.set_len(keep as u64)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "jsonl_tests.rs"]
mod tests;
