//! `.properties` file patching.
//!
//! Entries are matched on their unescaped key. Updating an entry rewrites
//! only its value, so comments, ordering and the key's own spelling stay
//! as they were.

use crate::error::Result;
use crate::files::{read_file, write_atomic};
use log::debug;
use std::path::Path;

/// Sets `key` to `value` in the properties file at `path`, creating the file
/// when it does not exist.
pub fn upsert<P: AsRef<Path>>(path: P, key: &str, value: &str) -> Result<()> {
    let path = path.as_ref();
    let content = if path.exists() { read_file(path)? } else { String::new() };
    let patched = upsert_content(&content, key, value);

    if patched == content && path.exists() {
        debug!("'{}' already set in {}", key, path.display());
        return Ok(());
    }

    debug!("Setting '{}' in {}", key, path.display());
    write_atomic(path, patched.as_bytes())
}

/// Returns the unescaped value of `key`, if present.
pub fn get<P: AsRef<Path>>(path: P, key: &str) -> Result<Option<String>> {
    let content = read_file(path)?;
    let lines: Vec<&str> = content.lines().collect();

    Ok(entries(&lines).into_iter().rev().find(|entry| entry.key == key).map(|entry| {
        let mut raw = lines[entry.first][entry.value_start..].to_string();
        for line in &lines[entry.first + 1..=entry.last] {
            // Drop the continuation backslash and the next line's indentation.
            raw.pop();
            raw.push_str(line.trim_start());
        }
        unescape(&raw)
    }))
}

/// Applies [`upsert`] to file content.
pub fn upsert_content(content: &str, key: &str, value: &str) -> String {
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();
    let borrowed: Vec<&str> = content.lines().collect();

    // The last definition of a key is the effective one.
    match entries(&borrowed).into_iter().rev().find(|entry| entry.key == key) {
        Some(entry) => {
            let prefix = &borrowed[entry.first][..entry.value_start];
            // A bare key has no separator to keep.
            let separator = if entry.separated { "" } else { "=" };
            let updated = format!("{prefix}{separator}{}", escape_value(value));
            lines.drain(entry.first..=entry.last);
            lines.insert(entry.first, updated);
        }
        None => lines.push(format!("{}={}", escape_key(key), escape_value(value))),
    }

    let mut patched = lines.join(newline);
    patched.push_str(newline);
    patched
}

struct Entry {
    /// First and last physical line of the logical line.
    first: usize,
    last: usize,
    key: String,
    /// Byte offset of the value within the first line.
    value_start: usize,
    /// Whether a separator or whitespace follows the key.
    separated: bool,
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn entries(lines: &[&str]) -> Vec<Entry> {
    let mut found = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            index += 1;
            continue;
        }

        let first = index;
        while ends_with_continuation(lines[index]) && index + 1 < lines.len() {
            index += 1;
        }

        let (key, key_end, value_start) = split_key(line);
        found.push(Entry { first, last: index, key, value_start, separated: value_start > key_end });
        index += 1;
    }

    found
}

/// Splits a line into its unescaped key, the offset where the key ends and
/// the offset where the value starts.
fn split_key(line: &str) -> (String, usize, usize) {
    let start = line.len() - line.trim_start().len();
    let mut key_end = line.len();
    let mut escaped = false;

    for (offset, c) in line[start..].char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            key_end = start + offset;
            break;
        }
    }

    let key = unescape(&line[start..key_end]);

    let mut value_start = key_end;
    let rest = &line[key_end..];
    let after_space = rest.len() - rest.trim_start_matches([' ', '\t', '\x0c']).len();
    value_start += after_space;
    if let Some(separator) = line[value_start..].chars().next().filter(|c| *c == '=' || *c == ':') {
        value_start += separator.len_utf8();
        let rest = &line[value_start..];
        value_start += rest.len() - rest.trim_start_matches([' ', '\t', '\x0c']).len();
    }

    (key, key_end, value_start)
}

fn escape(text: &str, escape_all_spaces: bool) -> String {
    let mut escaped = String::with_capacity(text.len());
    for (index, c) in text.chars().enumerate() {
        match c {
            ' ' if escape_all_spaces || index == 0 => escaped.push_str("\\ "),
            '\\' | '=' | ':' | '#' | '!' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\t' => escaped.push_str("\\t"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\x0c' => escaped.push_str("\\f"),
            c if (' '..='~').contains(&c) => escaped.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    escaped.push_str(&format!("\\u{:04X}", unit));
                }
            }
        }
    }
    escaped
}

pub fn escape_key(key: &str) -> String {
    escape(key, true)
}

pub fn escape_value(value: &str) -> String {
    escape(value, false)
}

pub fn unescape(text: &str) -> String {
    let mut units: Vec<u16> = Vec::new();
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    let flush = |units: &mut Vec<u16>, result: &mut String| {
        if !units.is_empty() {
            result.push_str(&String::from_utf16_lossy(units));
            units.clear();
        }
    };

    while let Some(c) = chars.next() {
        if c != '\\' {
            flush(&mut units, &mut result);
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('u') => {
                let hex: String = (0..4).filter_map(|_| chars.next()).collect();
                match u16::from_str_radix(&hex, 16) {
                    Ok(unit) => units.push(unit),
                    Err(_) => {
                        flush(&mut units, &mut result);
                        result.push('u');
                        result.push_str(&hex);
                    }
                }
            }
            Some(other) => {
                flush(&mut units, &mut result);
                result.push(match other {
                    't' => '\t',
                    'n' => '\n',
                    'r' => '\r',
                    'f' => '\x0c',
                    other => other,
                });
            }
            None => flush(&mut units, &mut result),
        }
    }
    flush(&mut units, &mut result);
    result
}
