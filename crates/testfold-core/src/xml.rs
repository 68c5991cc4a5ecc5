//! Forward-only element cursor over a streaming XML reader.
//!
//! The cursor hands out one [`Element`] at a time. After receiving a
//! non-empty element the caller either descends into it (calling
//! [`XmlCursor::next_child`] until it returns `None`) or skips it with
//! [`XmlCursor::skip`]. Every event is read exactly once; nothing behind the
//! current path is retained.

use std::io::BufRead;
use std::str::FromStr;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::errors::{ParseError, ParseResult};

/// A start tag with its attributes decoded.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    empty: bool,
}

impl Element {
    fn from_tag(tag: &BytesStart<'_>, empty: bool) -> ParseResult<Self> {
        let name = String::from_utf8_lossy(tag.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in tag.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            empty,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Self-closing tags have no children to visit.
    pub(crate) fn is_empty(&self) -> bool {
        self.empty
    }

    /// Attribute by local name. A default namespace declaration reads as `xmlns`.
    pub(crate) fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Non-blank attribute value.
    pub(crate) fn attr_non_empty(&self, key: &str) -> Option<&str> {
        self.attr(key).filter(|v| !v.trim().is_empty())
    }

    pub(crate) fn flag(&self, key: &str) -> bool {
        self.attr(key)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// Parse a numeric attribute. Absent means `None`; anything unparseable,
    /// negative or non-finite is a [`ParseError::MalformedField`].
    pub(crate) fn number<T>(&self, key: &str) -> ParseResult<Option<T>>
    where
        T: FromStr + PartialOrd + Default,
    {
        let Some(raw) = self.attr(key) else {
            return Ok(None);
        };
        match raw.trim().parse::<T>() {
            Ok(value) if value >= T::default() => Ok(Some(value)),
            _ => Err(ParseError::field(&self.name, key, raw)),
        }
    }

    /// Real-valued attribute, e.g. `assertCount="3.0"` or `time="0.015"`.
    pub(crate) fn real(&self, key: &str) -> ParseResult<Option<f64>> {
        match self.number::<f64>(key)? {
            Some(value) if !value.is_finite() => Err(ParseError::field(
                &self.name,
                key,
                self.attr(key).unwrap_or_default(),
            )),
            other => Ok(other),
        }
    }

    /// Count attribute such as `assertCount="3.0"`: read as a real number and
    /// truncated. Absent means 0.
    pub(crate) fn count(&self, key: &str) -> ParseResult<u64> {
        Ok(self.real(key)?.unwrap_or_default().trunc() as u64)
    }
}

/// Seconds to whole milliseconds, rounding half away from zero.
pub(crate) fn seconds_to_millis(seconds: f64) -> u64 {
    (seconds * 1000.0).round() as u64
}

pub(crate) struct XmlCursor<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    depth: usize,
}

impl<R: BufRead> XmlCursor<R> {
    pub(crate) fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            buf: Vec::new(),
            depth: 0,
        }
    }

    /// The document element.
    pub(crate) fn root(&mut self) -> ParseResult<Element> {
        if self.depth != 0 {
            return Err(ParseError::malformed("root requested inside the document"));
        }
        self.next_child()?
            .ok_or_else(|| ParseError::malformed("document has no root element"))
    }

    /// Next child element of the element currently open, or `None` once its
    /// end tag has been consumed.
    pub(crate) fn next_child(&mut self) -> ParseResult<Option<Element>> {
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(tag) => {
                    self.depth += 1;
                    return Element::from_tag(&tag, false).map(Some);
                }
                Event::Empty(tag) => return Element::from_tag(&tag, true).map(Some),
                Event::End(_) => {
                    if self.depth == 0 {
                        return Err(ParseError::malformed("unexpected end tag"));
                    }
                    self.depth -= 1;
                    return Ok(None);
                }
                Event::Eof => {
                    if self.depth != 0 {
                        return Err(ParseError::malformed(format!(
                            "unexpected end of document, {} element(s) left open",
                            self.depth
                        )));
                    }
                    return Ok(None);
                }
                _ => {}
            }
        }
    }

    /// Consume the rest of `element`'s subtree.
    pub(crate) fn skip(&mut self, element: &Element) -> ParseResult<()> {
        if element.is_empty() {
            return Ok(());
        }
        while let Some(child) = self.next_child()? {
            self.skip(&child)?;
        }
        Ok(())
    }

    /// Concatenated descendant text of `element`, trimmed. Consumes the subtree.
    pub(crate) fn text(&mut self, element: &Element) -> ParseResult<String> {
        let mut out = String::new();
        if element.is_empty() {
            return Ok(out);
        }
        let target = self.depth - 1;
        loop {
            self.buf.clear();
            match self.reader.read_event_into(&mut self.buf)? {
                Event::Start(_) => self.depth += 1,
                Event::End(_) => {
                    self.depth -= 1;
                    if self.depth == target {
                        break;
                    }
                }
                Event::Text(text) => out.push_str(&text.unescape()?),
                Event::CData(data) => out.push_str(&String::from_utf8_lossy(&data)),
                Event::Eof => {
                    return Err(ParseError::malformed(format!(
                        "unexpected end of document inside <{}>",
                        element.name()
                    )))
                }
                _ => {}
            }
        }
        Ok(out.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(xml: &str) -> XmlCursor<&[u8]> {
        XmlCursor::new(xml.as_bytes())
    }

    #[test]
    fn walks_children_and_skips_subtrees() {
        let mut c = cursor(r#"<root><a x="1"><deep><deeper/></deep></a><b/></root>"#);
        let root = c.root().unwrap();
        assert!(root.is("root"));

        let a = c.next_child().unwrap().unwrap();
        assert_eq!(a.attr("x"), Some("1"));
        c.skip(&a).unwrap();

        let b = c.next_child().unwrap().unwrap();
        assert!(b.is("b"));
        assert!(b.is_empty());

        assert!(c.next_child().unwrap().is_none());
        assert!(c.next_child().unwrap().is_none());
    }

    #[test]
    fn namespaced_names_use_local_part() {
        let mut c = cursor(r#"<g:report xmlns:g="http://www.gallio.org/"><g:testModel/></g:report>"#);
        let root = c.root().unwrap();
        assert!(root.is("report"));
        assert!(c.next_child().unwrap().unwrap().is("testModel"));
    }

    #[test]
    fn text_collects_nested_content() {
        let mut c = cursor("<root><t>one <b>two</b><![CDATA[ & three]]></t><after/></root>");
        c.root().unwrap();
        let t = c.next_child().unwrap().unwrap();
        assert_eq!(c.text(&t).unwrap(), "onetwo & three");
        assert!(c.next_child().unwrap().unwrap().is("after"));
    }

    #[test]
    fn unclosed_document_is_malformed() {
        let mut c = cursor("<root><a>");
        let root = c.root().unwrap();
        let err = c.skip(&root).unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument { .. }));
    }

    #[test]
    fn empty_document_has_no_root() {
        let err = cursor("   ").root().unwrap_err();
        assert!(matches!(err, ParseError::MalformedDocument { .. }));
    }

    #[test]
    fn numbers_reject_garbage_and_negatives() {
        let mut c = cursor(r#"<r a="1.5" b="abc" c="-2" d="NaN" e="7"/>"#);
        let r = c.root().unwrap();
        assert_eq!(r.real("a").unwrap(), Some(1.5));
        assert_eq!(r.number::<u32>("e").unwrap(), Some(7));
        assert_eq!(r.real("missing").unwrap(), None);
        assert!(r.real("b").is_err());
        assert!(r.real("c").is_err());
        assert!(r.real("d").is_err());
    }

    #[test]
    fn counts_accept_reals_and_truncate() {
        let mut c = cursor(r#"<r a="2" b="2.0" c="3.9" d="two"/>"#);
        let r = c.root().unwrap();
        assert_eq!(r.count("a").unwrap(), 2);
        assert_eq!(r.count("b").unwrap(), 2);
        assert_eq!(r.count("c").unwrap(), 3);
        assert_eq!(r.count("missing").unwrap(), 0);
        assert!(r.count("d").is_err());
    }

    #[test]
    fn millis_round_half_up() {
        assert_eq!(seconds_to_millis(0.010), 10);
        assert_eq!(seconds_to_millis(0.0156), 16);
        assert_eq!(seconds_to_millis(1.2344), 1234);
    }
}
