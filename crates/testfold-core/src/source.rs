use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;

use crate::errors::{ParseError, ParseResult, MEMORY_SOURCE};

/// Where a report is read from. Every [`ReportSource::open`] yields a fresh
/// reader positioned at the start of the document; the reader (and its file
/// handle) is released when the caller drops it.
///
/// Readers always yield UTF-8. A document in another charset, announced by a
/// byte order mark or by the `encoding` of its XML declaration, is decoded
/// while it is read.
#[derive(Debug, Clone, Copy)]
pub enum ReportSource<'a> {
    Path(&'a Path),
    Bytes(&'a [u8]),
}

impl<'a> ReportSource<'a> {
    pub fn open(&self) -> ParseResult<Box<dyn BufRead + 'a>> {
        let opened = match *self {
            ReportSource::Path(path) => {
                File::open(path).and_then(|file| to_utf8(BufReader::new(file)))
            }
            ReportSource::Bytes(bytes) => to_utf8(bytes),
        };
        opened.map_err(|source| ParseError::Io {
            path: self.location(),
            source,
        })
    }

    /// Location used in diagnostics.
    pub fn location(&self) -> PathBuf {
        match self {
            ReportSource::Path(path) => path.to_path_buf(),
            ReportSource::Bytes(_) => PathBuf::from(MEMORY_SOURCE),
        }
    }
}

fn to_utf8<'a, R: BufRead + 'a>(mut input: R) -> io::Result<Box<dyn BufRead + 'a>> {
    match declared_encoding(input.fill_buf()?) {
        Some(encoding) if encoding != UTF_8 => {
            tracing::debug!(encoding = encoding.name(), "decoding report to utf-8");
            let decoded = DecodeReaderBytesBuilder::new()
                .encoding(Some(encoding))
                .strip_bom(true)
                .build(input);
            Ok(Box::new(BufReader::new(decoded)))
        }
        _ => Ok(Box::new(input)),
    }
}

/// Charset from the byte order mark, else from the XML declaration.
fn declared_encoding(head: &[u8]) -> Option<&'static Encoding> {
    if let Some((encoding, _)) = Encoding::for_bom(head) {
        return Some(encoding);
    }
    let decl = head.strip_prefix(b"<?xml")?;
    let end = decl.windows(2).position(|w| w == b"?>")?;
    let decl = std::str::from_utf8(&decl[..end]).ok()?;
    let (_, rest) = decl.split_once("encoding")?;
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let label = rest[1..].split(quote).next()?;
    // A declaration readable as ASCII cannot be UTF-16.
    Encoding::for_label(label.as_bytes()).filter(|e| *e != UTF_16LE && *e != UTF_16BE)
}

impl<'a> From<&'a Path> for ReportSource<'a> {
    fn from(path: &'a Path) -> Self {
        ReportSource::Path(path)
    }
}

impl<'a> From<&'a [u8]> for ReportSource<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        ReportSource::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for ReportSource<'a> {
    fn from(xml: &'a str) -> Self {
        ReportSource::Bytes(xml.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    #[test]
    fn opens_files_and_buffers() -> anyhow::Result<()> {
        let mut tmp = tempfile::NamedTempFile::new()?;
        write!(tmp, "<root/>")?;

        let mut text = String::new();
        ReportSource::Path(tmp.path()).open()?.read_to_string(&mut text)?;
        assert_eq!(text, "<root/>");

        let mut again = String::new();
        ReportSource::from("<other/>").open()?.read_to_string(&mut again)?;
        assert_eq!(again, "<other/>");
        Ok(())
    }

    #[test]
    fn encoding_comes_from_bom_then_declaration() {
        assert_eq!(declared_encoding(b"\xFF\xFE<\0"), Some(UTF_16LE));
        assert_eq!(declared_encoding(b"\xFE\xFF\0<"), Some(UTF_16BE));
        assert_eq!(declared_encoding(b"\xEF\xBB\xBF<r/>"), Some(UTF_8));
        assert_eq!(
            declared_encoding(br#"<?xml version="1.0" encoding='ISO-8859-1'?><r/>"#)
                .map(Encoding::name),
            Some("windows-1252")
        );
        assert_eq!(declared_encoding(br#"<?xml version="1.0" encoding="utf-16"?>"#), None);
        assert_eq!(declared_encoding(br#"<?xml version="1.0"?><r/>"#), None);
        assert_eq!(declared_encoding(b"<r/>"), None);
    }

    #[test]
    fn latin1_documents_are_read_as_utf8() -> anyhow::Result<()> {
        let mut latin1 = br#"<?xml version="1.0" encoding="ISO-8859-1"?><r n="caf"#.to_vec();
        latin1.extend_from_slice(b"\xE9\"/>");

        let mut text = String::new();
        ReportSource::Bytes(&latin1).open()?.read_to_string(&mut text)?;
        assert!(text.ends_with(r#"<r n="café"/>"#), "{text}");
        Ok(())
    }

    #[test]
    fn utf16_documents_are_read_as_utf8() -> anyhow::Result<()> {
        let mut utf16 = vec![0xFF, 0xFE];
        for unit in "<r n=\"é\"/>".encode_utf16() {
            utf16.extend_from_slice(&unit.to_le_bytes());
        }

        let mut text = String::new();
        ReportSource::Bytes(&utf16).open()?.read_to_string(&mut text)?;
        assert_eq!(text, "<r n=\"é\"/>");
        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ReportSource::Path(Path::new("/definitely/not/here.xml"))
            .open()
            .err()
            .unwrap();
        match err {
            ParseError::Io { path, .. } => assert!(path.ends_with("here.xml")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
