//! Streaming XML traversal shared by the XML readers.
//!
//! [`parse_xml`] walks a document with `quick_xml` and reports element starts,
//! ends and text to an [`XmlHandler`] together with the current [`XmlPath`].
//! Handlers match paths with relative patterns, consuming the matched prefix:
//!
//! ```text
//! path: crossword-compiler/rectangular-puzzle/crossword/grid/cell
//! starts_with(["?", "rectangular-puzzle"])  -> true, cursor now at "crossword"
//! starts_with(["crossword", "grid"])        -> true, cursor now at "cell"
//! is_equal_to(["cell"])                     -> true
//! ```
//!
//! A pattern segment is an element name, `"?"` for any single element, or a
//! prefix followed by `*`.

use std::collections::HashMap;

use log::trace;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::crossword::types::error::{CrosswordError, Result};

/// Element names from the root down to the current element, plus a match cursor.
#[derive(Debug, Default)]
pub struct XmlPath {
    segments: Vec<String>,
    pos: usize,
}

impl XmlPath {
    fn push(&mut self, name: String) {
        self.segments.push(name);
    }

    fn pop(&mut self) {
        self.segments.pop();
    }

    /// Moves the match cursor back to the root and returns `self`.
    fn rewind(&mut self) -> &mut Self {
        self.pos = 0;
        self
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Name of the current (innermost) element.
    pub fn current(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    fn remaining(&self) -> &[String] {
        &self.segments[self.pos.min(self.segments.len())..]
    }

    /// Checks whether the unmatched part of the path begins with `names`.
    ///
    /// On success the cursor advances past the matched segments.
    pub fn starts_with(&mut self, names: &[&str]) -> bool {
        let remaining = self.remaining();
        if remaining.len() < names.len() {
            return false;
        }
        let matched = names
            .iter()
            .zip(remaining)
            .all(|(pattern, segment)| segment_matches(pattern, segment));
        if matched {
            self.pos += names.len();
        }
        matched
    }

    /// Checks whether the unmatched part of the path is exactly `names`.
    pub fn is_equal_to(&mut self, names: &[&str]) -> bool {
        self.remaining().len() == names.len() && self.starts_with(names)
    }

    /// Whether the whole path has been matched.
    pub fn is_dead_end(&mut self) -> bool {
        self.is_equal_to(&[])
    }
}

fn segment_matches(pattern: &str, segment: &str) -> bool {
    match pattern {
        "?" => true,
        _ => match pattern.strip_suffix('*') {
            Some(prefix) => segment.starts_with(prefix),
            None => pattern == segment,
        },
    }
}

/// An element start tag with its unescaped attributes.
#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: HashMap<String, String>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let attributes = start
            .attributes()
            .map(|attr_result| {
                let attr = attr_result
                    .map_err(|e| CrosswordError::caused_by(format!("Failed to parse XML attribute in <{}>", name), e))?;
                let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
                let value = attr
                    .unescape_value()
                    .map_err(|e| CrosswordError::caused_by(format!("Failed to decode XML value of '{}'", key), e))?
                    .into_owned();
                Ok((key, value))
            })
            .collect::<Result<HashMap<_, _>>>()?;

        Ok(Self { name, attributes })
    }

    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Parses an integer attribute; a missing or blank attribute is `None`.
    ///
    /// # Errors
    /// Returns [`CrosswordError::FormatCause`] if the value is not a number.
    pub fn int_value(&self, name: &str) -> Result<Option<i64>> {
        match self.string_value(name).map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => super::text::parse_int(value, name).map(Some),
        }
    }
}

/// Callbacks for [`parse_xml`]. The path cursor is rewound before each call.
pub trait XmlHandler {
    fn on_start(&mut self, path: &mut XmlPath, element: &XmlElement) -> Result<()>;

    /// Called for each non-blank text or CDATA run inside the current element.
    fn on_text(&mut self, _path: &mut XmlPath, _text: &str) -> Result<()> {
        Ok(())
    }

    /// Called before the current element is popped from the path.
    fn on_end(&mut self, _path: &mut XmlPath) -> Result<()> {
        Ok(())
    }
}

/// Streams `document` through `handler`.
///
/// # Errors
/// Returns [`CrosswordError::FormatCause`] for malformed XML, or whatever the
/// handler returns.
pub fn parse_xml<H: XmlHandler>(document: &str, handler: &mut H) -> Result<()> {
    let mut reader = Reader::from_str(document);
    reader.trim_text(true);
    let mut path = XmlPath::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let element = XmlElement::from_start(&e)?;
                path.push(element.name.clone());
                trace!("<{}> at depth {}", element.name, path.depth());
                handler.on_start(path.rewind(), &element)?;
            }
            Ok(Event::Empty(e)) => {
                let element = XmlElement::from_start(&e)?;
                path.push(element.name.clone());
                handler.on_start(path.rewind(), &element)?;
                handler.on_end(path.rewind())?;
                path.pop();
            }
            Ok(Event::End(_)) => {
                handler.on_end(path.rewind())?;
                path.pop();
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| CrosswordError::caused_by("Failed to decode XML text", err))?;
                if !text.trim().is_empty() {
                    handler.on_text(path.rewind(), &text)?;
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                handler.on_text(path.rewind(), &text)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CrosswordError::caused_by(
                    format!("Malformed XML at position {}", reader.buffer_position()),
                    e,
                ));
            }
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(names: &[&str]) -> XmlPath {
        let mut p = XmlPath::default();
        for name in names {
            p.push(name.to_string());
        }
        p
    }

    #[test]
    fn starts_with_advances_cursor() {
        let mut p = path(&["applet", "rectangular-puzzle", "crossword", "grid"]);
        assert!(p.starts_with(&["?", "rectangular-puzzle"]));
        assert!(!p.starts_with(&["grid"]));
        assert!(p.starts_with(&["cross*"]));
        assert!(p.is_equal_to(&["grid"]));
        assert!(p.is_dead_end());
    }

    #[test]
    fn is_equal_to_requires_exact_length() {
        let mut p = path(&["crossword", "across", "a1"]);
        assert!(!p.is_equal_to(&["crossword", "across"]));
        assert!(p.is_equal_to(&["crossword", "across", "?"]));
    }

    #[derive(Default)]
    struct Collector {
        starts: Vec<String>,
        texts: Vec<(String, String)>,
        ends: usize,
    }

    impl XmlHandler for Collector {
        fn on_start(&mut self, path: &mut XmlPath, element: &XmlElement) -> Result<()> {
            if path.is_equal_to(&["root", "item"]) {
                self.starts.push(element.string_value("id").unwrap_or_default().to_string());
            }
            Ok(())
        }

        fn on_text(&mut self, path: &mut XmlPath, text: &str) -> Result<()> {
            let name = path.current().unwrap_or_default().to_string();
            self.texts.push((name, text.to_string()));
            Ok(())
        }

        fn on_end(&mut self, _path: &mut XmlPath) -> Result<()> {
            self.ends += 1;
            Ok(())
        }
    }

    #[test]
    fn parse_reports_elements_and_text() {
        let doc = r#"<?xml version="1.0"?>
            <root>
              <item id="a &amp; b">first</item>
              <item id="2"/>
              <note><![CDATA[<raw>]]></note>
            </root>"#;
        let mut collector = Collector::default();
        parse_xml(doc, &mut collector).unwrap();

        assert_eq!(collector.starts, vec!["a & b", "2"]);
        assert_eq!(
            collector.texts,
            vec![("item".to_string(), "first".to_string()), ("note".to_string(), "<raw>".to_string())]
        );
        assert_eq!(collector.ends, 4);
    }

    #[test]
    fn malformed_document_is_a_format_error() {
        let mut collector = Collector::default();
        let result = parse_xml("<root><item></root>", &mut collector);
        assert!(matches!(result, Err(CrosswordError::FormatCause { .. })));
    }

    #[test]
    fn int_value_parses_and_rejects() {
        let mut element = XmlElement::default();
        element.attributes.insert("n".into(), " 12 ".into());
        element.attributes.insert("bad".into(), "x".into());
        assert_eq!(element.int_value("n").unwrap(), Some(12));
        assert_eq!(element.int_value("missing").unwrap(), None);
        assert!(element.int_value("bad").is_err());
    }
}
