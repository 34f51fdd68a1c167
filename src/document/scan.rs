//! Image reference scanning.
//!
//! Two shapes are recognized:
//!
//! | Kind       | Shape                                   | Captured             |
//! |------------|-----------------------------------------|----------------------|
//! | `Markdown` | `![alt](url "title")`, `![alt](<url>)`  | alt, url, title      |
//! | `Html`     | `<img ... src="url" ...>`               | src value            |
//!
//! Everything outside these two shapes is left alone.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

/// `![alt](url "title")` with optional `<...>` around the url.
static MD_IMG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)!\[(?P<alt>[^\]]*)\]\(\s*(?:<(?P<angled>[^>\n]*)>|(?P<bare>[^)\s]+))?(?P<title>\s+(?:"[^"]*"|'[^']*'))?\s*\)"#,
    )
    .unwrap()
});

/// `<img ...>` with a quoted `src` attribute.
static HTML_IMG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')[^>]*?>"#)
        .unwrap()
});

/// Characters that would end the url early or change how it decodes.
const URL_RESERVED: &AsciiSet = &CONTROLS
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'"')
    .add(b'\'');

/// Reference syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Markdown,
    Html,
}

impl RefKind {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Markdown => &MD_IMG,
            Self::Html => &HTML_IMG,
        }
    }
}

/// A single image reference found in document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef<'t> {
    pub kind: RefKind,
    /// Full matched text
    pub span: &'t str,
    /// URL as written (without angle brackets)
    pub url: &'t str,
    /// Byte range of `url` inside `span`
    url_range: Range<usize>,
    /// Markdown only
    pub alt: Option<&'t str>,
    /// Markdown only, including leading whitespace and quotes
    pub title: Option<&'t str>,
    /// Markdown url was written as `<url>`
    angled: bool,
}

impl<'t> ImageRef<'t> {
    fn from_captures(kind: RefKind, caps: &Captures<'t>) -> Self {
        let whole = caps.get(0).expect("group 0 always participates");
        let offset = whole.start();

        let (url_match, angled) = match kind {
            RefKind::Markdown => match (caps.name("angled"), caps.name("bare")) {
                (Some(m), _) => (Some(m), true),
                (None, m) => (m, false),
            },
            RefKind::Html => (caps.name("dq").or_else(|| caps.name("sq")), false),
        };

        let (url, url_range) = match url_match {
            Some(m) => (m.as_str(), m.start() - offset..m.end() - offset),
            None => ("", 0..0),
        };

        Self {
            kind,
            span: whole.as_str(),
            url,
            url_range,
            alt: caps.name("alt").map(|m| m.as_str()),
            title: caps.name("title").map(|m| m.as_str()),
            angled,
        }
    }

    /// Rebuild the reference with `new_url`, keeping everything else.
    pub fn with_url(&self, new_url: &str) -> String {
        let new_url = escape_url(new_url);
        match self.kind {
            RefKind::Markdown => {
                let alt = self.alt.unwrap_or_default();
                let title = self.title.unwrap_or_default();
                let needs_brackets =
                    new_url.contains(|c: char| c.is_whitespace() || "()".contains(c));
                if self.angled || needs_brackets {
                    format!("![{alt}](<{new_url}>{title})")
                } else {
                    format!("![{alt}]({new_url}{title})")
                }
            }
            RefKind::Html => format!(
                "{}{}{}",
                &self.span[..self.url_range.start],
                new_url,
                &self.span[self.url_range.end..]
            ),
        }
    }
}

/// Percent-encode reserved characters, leaving ordinary paths readable.
fn escape_url(url: &str) -> Cow<'_, str> {
    let reserved = |b: u8| b.is_ascii_control() || b"%<>\"'".contains(&b);
    if url.bytes().any(reserved) {
        Cow::Owned(utf8_percent_encode(url, URL_RESERVED).to_string())
    } else {
        Cow::Borrowed(url)
    }
}

/// All references of `kind` in `text`, in source order.
#[cfg(test)]
pub fn scan(text: &str, kind: RefKind) -> Vec<ImageRef<'_>> {
    kind.regex()
        .captures_iter(text)
        .map(|caps| ImageRef::from_captures(kind, &caps))
        .collect()
}

/// Replace references of `kind` in `text`.
///
/// `f` returns the replacement text, or `None` to keep the original span.
pub fn replace_refs<'t>(
    text: &'t str,
    kind: RefKind,
    mut f: impl FnMut(&ImageRef<'_>) -> Option<String>,
) -> Cow<'t, str> {
    kind.regex().replace_all(text, |caps: &Captures<'_>| {
        let image = ImageRef::from_captures(kind, caps);
        f(&image).unwrap_or_else(|| image.span.to_string())
    })
}
