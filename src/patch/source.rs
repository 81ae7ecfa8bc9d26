//! Java source patching.
//!
//! Generated sources are edited line by line with regular expressions; the
//! [`SourcePatcher`] trait keeps callers independent of that approach.

use crate::error::{Error, Result};
use crate::files::{read_file, write_atomic};
use log::debug;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Edits annotation listings such as `@Listeners({"a", "b"})` in a source file.
pub trait SourcePatcher {
    /// Makes sure `import_statement` is present and `entry` is listed in the
    /// `@annotation(...)` of the class declared in `path`.
    fn patch_annotation_listing(
        &self,
        path: &Path,
        import_statement: &str,
        annotation: &str,
        entry: &str,
    ) -> Result<()>;
}

/// [`SourcePatcher`] based on line-oriented regular expressions.
#[derive(Debug, Default)]
pub struct RegexSourcePatcher;

impl RegexSourcePatcher {
    pub fn new() -> Self {
        Self
    }
}

impl SourcePatcher for RegexSourcePatcher {
    fn patch_annotation_listing(
        &self,
        path: &Path,
        import_statement: &str,
        annotation: &str,
        entry: &str,
    ) -> Result<()> {
        let content = read_file(path)?;
        let patched = patch_lines(&content, import_statement, annotation, entry).map_err(|e| match e {
            Unpatchable::NoClassDeclaration => Error::NoClassDeclarationError { path: path.to_path_buf() },
            Unpatchable::MalformedListing { line } => Error::ParseError {
                path: path.to_path_buf(),
                message: format!("@{annotation} listing starting on line {line} cannot be read"),
            },
        })?;

        debug!("Adding '{}' to @{} in {}", entry, annotation, path.display());
        write_atomic(path, patched.as_bytes())
    }
}

fn static_regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).unwrap_or_else(|e| panic!("{e}")))
}

fn package_regex() -> &'static Regex {
    static PACKAGE: OnceLock<Regex> = OnceLock::new();
    static_regex(&PACKAGE, r"^\s*package\s+[\w.]+\s*;")
}

fn class_regex() -> &'static Regex {
    static CLASS: OnceLock<Regex> = OnceLock::new();
    static_regex(
        &CLASS,
        r"^\s*(?:(?:public|protected|private|abstract|final|static|sealed)\s+)*class\s+[A-Za-z_$]",
    )
}

/// Matches the import line for `import_statement` with any spacing.
fn import_regex(import_statement: &str) -> Option<Regex> {
    let statement = import_statement.trim().trim_end_matches(';').trim();
    let name = statement.strip_prefix("import")?.trim();
    Regex::new(&format!(r"^\s*import\s+{}\s*;\s*$", regex::escape(name))).ok()
}

/// Why a source could not be patched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unpatchable {
    /// No class declaration to put a new listing in front of.
    NoClassDeclaration,
    /// An existing listing never closes or is not a list of strings.
    /// `line` is 1-based.
    MalformedListing { line: usize },
}

fn opening_regex(annotation: &str) -> Option<Regex> {
    Regex::new(&format!(r"@{}\s*\(", regex::escape(annotation))).ok()
}

/// Index of the line holding the `)` that closes the parenthesis opened at
/// byte `from` of line `start`.
fn closing_line(lines: &[String], start: usize, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quoted = false;
    let mut escaped = false;

    for (index, line) in lines.iter().enumerate().skip(start) {
        let text = if index == start { &line[from..] } else { line.as_str() };
        for c in text.chars() {
            if quoted {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => quoted = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => quoted = true,
                '(' => depth += 1,
                ')' => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
    }
    None
}

/// Matches `@Name(...)` listings: `@Name("a")`, `@Name({"a", "b"})` or
/// `@Name(value = {"a"})`. Group 1 holds the listed entries.
fn listing_regex(annotation: &str) -> Option<Regex> {
    Regex::new(&format!(
        r#"@{}\s*\(\s*(?:value\s*=\s*)?\{{?\s*([" .\w$,]*?)\s*\}}?\s*\)"#,
        regex::escape(annotation)
    ))
    .ok()
}

fn parse_entries(listing: &str) -> Vec<String> {
    listing
        .split(',')
        .map(|item| item.trim().trim_matches('"').trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn format_listing(annotation: &str, entries: &[String]) -> String {
    let quoted: Vec<String> = entries.iter().map(|entry| format!("\"{entry}\"")).collect();
    format!("@{}({{{}}})", annotation, quoted.join(", "))
}

/// Returns the patched content.
///
/// A listing spread over several lines is rewritten on the line it starts
/// on.
pub fn patch_lines(
    content: &str,
    import_statement: &str,
    annotation: &str,
    entry: &str,
) -> std::result::Result<String, Unpatchable> {
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    if let Some(import_re) = import_regex(import_statement) {
        if !lines.iter().any(|line| import_re.is_match(line)) {
            let position = match lines.iter().position(|line| package_regex().is_match(line)) {
                Some(package) if lines.get(package + 1).is_some_and(|l| l.trim().is_empty()) => {
                    package + 2
                }
                Some(package) => package + 1,
                None => 0,
            };
            let import_line = format!("{};", import_statement.trim().trim_end_matches(';'));
            lines.insert(position.min(lines.len()), import_line);
        }
    }

    let (Some(opening_re), Some(listing_re)) = (opening_regex(annotation), listing_regex(annotation))
    else {
        return Err(Unpatchable::MalformedListing { line: 1 });
    };
    let existing = lines
        .iter()
        .enumerate()
        .find_map(|(index, line)| opening_re.find(line).map(|found| (index, found.start())));

    match existing {
        Some((start, from)) => {
            let malformed = Unpatchable::MalformedListing { line: start + 1 };
            let end = closing_line(&lines, start, from).ok_or(malformed)?;
            let joined = lines[start..=end]
                .iter()
                .enumerate()
                .map(|(offset, line)| if offset == 0 { line.as_str() } else { line.trim() })
                .collect::<Vec<_>>()
                .join(" ");

            let mut entries = listing_re
                .captures(&joined)
                .map(|caps| parse_entries(&caps[1]))
                .ok_or(malformed)?;
            if !entries.iter().any(|existing| existing == entry) {
                entries.push(entry.to_string());
            }
            let listing = format_listing(annotation, &entries);
            let rewritten = listing_re.replace(&joined, regex::NoExpand(&listing)).into_owned();
            lines.splice(start..=end, [rewritten]);
        }
        None => {
            let class_index = lines
                .iter()
                .position(|line| class_regex().is_match(line))
                .ok_or(Unpatchable::NoClassDeclaration)?;
            let indent: String =
                lines[class_index].chars().take_while(|c| c.is_whitespace()).collect();
            let listing = format_listing(annotation, &[entry.to_string()]);
            lines.insert(class_index, format!("{indent}{listing}"));
        }
    }

    let mut patched = lines.join("\n");
    patched.push('\n');
    Ok(patched)
}
