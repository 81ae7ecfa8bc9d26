//! XML patching.
//!
//! Files are streamed event by event and written back unchanged except for
//! the inserted node, so comments, attribute order and whitespace survive.

use crate::error::{Error, Result};
use crate::files::{read_file, write_atomic};
use log::debug;
use quick_xml::escape::escape;
use quick_xml::events::{BytesEnd, Event};
use quick_xml::{Reader, Writer};
use std::path::Path;

const DEFAULT_INDENT: &str = "    ";

/// An element to be appended by [`upsert_element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
}

impl XmlElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), attributes: Vec::new(), text: None }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Serializes the element on a single line.
    pub fn to_xml(&self) -> String {
        let mut xml = format!("<{}", self.tag);
        for (name, value) in &self.attributes {
            xml.push_str(&format!(" {}=\"{}\"", name, escape(value.as_str())));
        }
        match &self.text {
            Some(text) => xml.push_str(&format!(">{}</{}>", escape(text.as_str()), self.tag)),
            None => xml.push_str("/>"),
        }
        xml
    }
}

/// Appends `element` as the last child of the element at `parent_path`.
///
/// `parent_path` lists tag names below the document root; an empty path
/// targets the root itself. The first match is used at every depth and
/// missing path elements are created. Existing equal elements are not
/// looked for: calling this twice adds two elements, so callers check
/// with [`find_by_attribute`] or [`child_texts`] first.
///
/// # Errors
/// * `Error::ParseError` if the file is not well-formed XML
/// * `Error::IoError` if the file cannot be read or replaced
pub fn upsert_element<P: AsRef<Path>>(
    path: P,
    parent_path: &[&str],
    element: &XmlElement,
) -> Result<()> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let patched = append_child(&content, parent_path, element)
        .map_err(|message| Error::ParseError { path: path.to_path_buf(), message })?;

    debug!("Appending <{}> to '{}' in {}", element.tag, parent_path.join("/"), path.display());
    write_atomic(path, patched.as_bytes())
}

/// Returns true if an element `tag` has attribute `attribute` equal to `value`.
pub fn find_by_attribute<P: AsRef<Path>>(
    path: P,
    tag: &str,
    attribute: &str,
    value: &str,
) -> Result<bool> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let parse_error = |message: String| Error::ParseError { path: path.to_path_buf(), message };

    let mut reader = Reader::from_str(&content);
    loop {
        match reader.read_event().map_err(|e| parse_error(e.to_string()))? {
            Event::Start(start) | Event::Empty(start) if start.name().as_ref() == tag.as_bytes() => {
                for attr in start.attributes() {
                    let attr = attr.map_err(|e| parse_error(e.to_string()))?;
                    if attr.key.as_ref() == attribute.as_bytes()
                        && attr.unescape_value().map_err(|e| parse_error(e.to_string()))? == value
                    {
                        return Ok(true);
                    }
                }
            }
            Event::Eof => return Ok(false),
            _ => {}
        }
    }
}

/// Returns the trimmed text of every `tag` child of the element at `parent_path`.
pub fn child_texts<P: AsRef<Path>>(path: P, parent_path: &[&str], tag: &str) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = read_file(path)?;
    let parse_error = |message: String| Error::ParseError { path: path.to_path_buf(), message };

    let mut reader = Reader::from_str(&content);
    // Number of path segments matched by each open element, None when off the path.
    let mut open: Vec<Option<usize>> = Vec::new();
    let mut captured: Option<String> = None;
    let mut texts = Vec::new();
    let mut parent_closed = false;

    loop {
        match reader.read_event().map_err(|e| parse_error(e.to_string()))? {
            Event::Start(start) => {
                let on_path = next_on_path(&open, parent_path, start.name().as_ref(), parent_closed);
                if open.last() == Some(&Some(parent_path.len()))
                    && !parent_closed
                    && start.name().as_ref() == tag.as_bytes()
                {
                    captured = Some(String::new());
                }
                open.push(on_path);
            }
            Event::Empty(start) => {
                if open.last() == Some(&Some(parent_path.len()))
                    && !parent_closed
                    && start.name().as_ref() == tag.as_bytes()
                {
                    texts.push(String::new());
                }
            }
            Event::Text(text) => {
                if let Some(buffer) = captured.as_mut() {
                    buffer.push_str(&text.unescape().map_err(|e| parse_error(e.to_string()))?);
                }
            }
            Event::CData(data) => {
                if let Some(buffer) = captured.as_mut() {
                    buffer.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                if let Some(text) = captured.take() {
                    texts.push(text.trim().to_string());
                } else if open.last() == Some(&Some(parent_path.len())) {
                    parent_closed = true;
                }
                open.pop();
            }
            Event::Eof => return Ok(texts),
            _ => {}
        }
    }
}

/// Path segments matched by an element named `name` opened below `open`.
fn next_on_path(open: &[Option<usize>], path: &[&str], name: &[u8], done: bool) -> Option<usize> {
    match open.last() {
        None => Some(0),
        Some(Some(matched)) if !done && *matched < path.len() && name == path[*matched].as_bytes() => {
            Some(matched + 1)
        }
        _ => None,
    }
}

fn write_err<E: std::fmt::Display>(e: E) -> String {
    e.to_string()
}

struct OpenElement {
    on_path: Option<usize>,
    indent: Option<String>,
    child_indent: Option<String>,
}

/// Indentation of the line an element starts on, given the whitespace
/// that precedes it.
fn line_indent(whitespace: &str) -> Option<String> {
    whitespace.rfind('\n').map(|i| whitespace[i + 1..].to_string())
}

struct Layout {
    newline: &'static str,
    unit: String,
}

impl Layout {
    /// `missing` path elements wrapping `element`, starting on a new line.
    fn fragment(&self, missing: &[&str], element: &XmlElement, indent: &str) -> String {
        let (nl, indent) = if self.newline.is_empty() { ("", "") } else { ("\n", indent) };
        match missing.split_first() {
            None => format!("{nl}{indent}{}", element.to_xml()),
            Some((tag, rest)) => {
                let inner = self.fragment(rest, element, &format!("{indent}{}", self.unit));
                format!("{nl}{indent}<{tag}>{inner}{nl}{indent}</{tag}>")
            }
        }
    }
}

fn append_child(
    content: &str,
    parent_path: &[&str],
    element: &XmlElement,
) -> std::result::Result<String, String> {
    let mut reader = Reader::from_str(content);
    let mut writer = Writer::new(Vec::new());
    let mut layout = Layout {
        newline: if content.contains('\n') { "\n" } else { "" },
        unit: String::new(),
    };
    let mut open: Vec<OpenElement> = Vec::new();
    let mut pending: Option<String> = None;
    let mut done = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{e} at position {}", reader.buffer_position()))?;

        match event {
            Event::Text(ref text) if text.iter().all(u8::is_ascii_whitespace) => {
                pending.get_or_insert_with(String::new).push_str(&String::from_utf8_lossy(text));
            }
            Event::Start(ref start) | Event::Empty(ref start) => {
                let indent = pending.as_deref().and_then(line_indent);
                if let Some(parent) = open.last_mut() {
                    if parent.child_indent.is_none() {
                        parent.child_indent = indent.clone();
                        if layout.unit.is_empty() {
                            let parent_indent = parent.indent.as_deref().unwrap_or_default();
                            if let Some(unit) = indent.as_deref().and_then(|i| i.strip_prefix(parent_indent)) {
                                layout.unit = unit.to_string();
                            }
                        }
                    }
                }

                let on_path = match open.last() {
                    None if done => None,
                    None => Some(0),
                    Some(parent) => match parent.on_path {
                        Some(matched)
                            if !done
                                && matched < parent_path.len()
                                && start.name().as_ref() == parent_path[matched].as_bytes() =>
                        {
                            Some(matched + 1)
                        }
                        _ => None,
                    },
                };

                if let Some(ws) = pending.take() {
                    writer.get_mut().extend_from_slice(ws.as_bytes());
                }

                if matches!(event, Event::Empty(_)) {
                    match on_path {
                        // An empty parent is expanded to hold the new child.
                        Some(matched) if !done => {
                            if layout.unit.is_empty() {
                                layout.unit = DEFAULT_INDENT.to_string();
                            }
                            let own = indent.unwrap_or_default();
                            let child = format!("{own}{}", layout.unit);
                            writer.write_event(Event::Start(start.clone())).map_err(write_err)?;
                            let fragment = layout.fragment(&parent_path[matched..], element, &child);
                            writer.get_mut().extend_from_slice(fragment.as_bytes());
                            if !layout.newline.is_empty() {
                                writer.get_mut().extend_from_slice(format!("\n{own}").as_bytes());
                            }
                            let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                            writer.write_event(Event::End(BytesEnd::new(name))).map_err(write_err)?;
                            done = true;
                        }
                        _ => writer.write_event(event.borrow()).map_err(write_err)?,
                    }
                } else {
                    open.push(OpenElement { on_path, indent, child_indent: None });
                    writer.write_event(event.borrow()).map_err(write_err)?;
                }
            }
            Event::End(_) => {
                let closing = open.pop().ok_or_else(|| "unexpected closing tag".to_string())?;
                match closing.on_path {
                    Some(matched) if !done => {
                        if layout.unit.is_empty() {
                            layout.unit = DEFAULT_INDENT.to_string();
                        }
                        let own = closing.indent.unwrap_or_default();
                        let child = closing
                            .child_indent
                            .unwrap_or_else(|| format!("{own}{}", layout.unit));
                        let fragment = layout.fragment(&parent_path[matched..], element, &child);
                        writer.get_mut().extend_from_slice(fragment.as_bytes());
                        let trailing = pending
                            .take()
                            .unwrap_or_else(|| format!("{}{}", layout.newline, own));
                        writer.get_mut().extend_from_slice(trailing.as_bytes());
                        done = true;
                    }
                    _ => {
                        if let Some(ws) = pending.take() {
                            writer.get_mut().extend_from_slice(ws.as_bytes());
                        }
                    }
                }
                writer.write_event(event.borrow()).map_err(write_err)?;
            }
            Event::Eof => {
                if let Some(ws) = pending.take() {
                    writer.get_mut().extend_from_slice(ws.as_bytes());
                }
                break;
            }
            other => {
                if let Some(ws) = pending.take() {
                    writer.get_mut().extend_from_slice(ws.as_bytes());
                }
                writer.write_event(other).map_err(write_err)?;
            }
        }
    }

    if !done {
        return Err("document has no root element".to_string());
    }

    String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
}
