//! Helpers shared by the AGI and MOMS extractors.

use std::borrow::Cow;

use crate::error::{Result, RivoError};

/// Removes the first `<!DOCTYPE ...>` declaration (case-insensitive, through
/// the first `>`). Skatteverket exports are known to carry one that strict XML
/// parsers reject.
pub(crate) fn strip_doctype(xml: &str) -> Cow<'_, str> {
    let bytes = xml.as_bytes();
    let mut i = 0;
    while i + 9 <= bytes.len() {
        if bytes[i] == b'<'
            && bytes[i + 1] == b'!'
            && bytes[i + 2..i + 9].eq_ignore_ascii_case(b"DOCTYPE")
        {
            if let Some(off) = bytes[i..].iter().position(|&b| b == b'>') {
                let mut out = String::with_capacity(xml.len());
                out.push_str(&xml[..i]);
                out.push_str(&xml[i + off + 1..]);
                return Cow::Owned(out);
            }
            break;
        }
        i += 1;
    }
    Cow::Borrowed(xml)
}

/// Nesting checks the streaming reader does not do itself: exactly one root
/// element, no content outside it, all elements closed at EOF. Violations are
/// `InvalidDocument`, matching what a DOM parser would reject.
#[derive(Default)]
pub(crate) struct DocShape {
    depth: usize,
    root_seen: bool,
}

impl DocShape {
    pub(crate) fn start(&mut self) -> Result<()> {
        if self.depth == 0 && self.root_seen {
            return Err(RivoError::InvalidDocument(
                "content after the root element".into(),
            ));
        }
        self.depth += 1;
        self.root_seen = true;
        Ok(())
    }

    pub(crate) fn empty(&mut self) -> Result<()> {
        if self.depth == 0 {
            if self.root_seen {
                return Err(RivoError::InvalidDocument(
                    "content after the root element".into(),
                ));
            }
            self.root_seen = true;
        }
        Ok(())
    }

    pub(crate) fn text(&self) -> Result<()> {
        if self.depth == 0 {
            return Err(RivoError::InvalidDocument(
                "text outside the root element".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn end(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn eof(&self) -> Result<()> {
        if self.depth != 0 {
            return Err(RivoError::InvalidDocument(
                "unexpected end of document".into(),
            ));
        }
        if !self.root_seen {
            return Err(RivoError::InvalidDocument("no root element".into()));
        }
        Ok(())
    }
}
