//! Event-based XML parsing for sitemap documents.
//!
//! Handles the two document shapes from the sitemap protocol: `urlset`
//! (standard sitemap) and `sitemapindex` (index of child sitemaps).
//! Unknown elements are skipped rather than rejected; entries without a
//! `<loc>` are dropped.

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;
use thiserror::Error;

/// Shape of a parsed sitemap document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SitemapKind {
    StandardSitemap,
    SitemapIndex,
    Unknown,
}

impl SitemapKind {
    /// Stable wire name for the kind.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StandardSitemap => "standard_sitemap",
            Self::SitemapIndex => "sitemap_index",
            Self::Unknown => "unknown",
        }
    }
}

/// One `<url>` (or `<sitemap>`) entry. Index entries only ever carry
/// `loc` and `lastmod`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlEntry {
    pub loc: String,
    pub lastmod: Option<String>,
    pub changefreq: Option<String>,
    pub priority: Option<String>,
}

/// A fully parsed sitemap.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapDocument {
    pub kind: SitemapKind,
    pub entries: Vec<UrlEntry>,
}

impl SitemapDocument {
    /// Bare URL list, in document order.
    #[inline]
    pub fn urls(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.loc.clone()).collect()
    }
}

#[derive(Error, Debug)]
pub enum SitemapParseError {
    #[error("XML parsing error: {0}")]
    Xml(String),
}

#[derive(Debug, Default)]
struct EntryBuilder {
    loc: Option<String>,
    lastmod: Option<String>,
    changefreq: Option<String>,
    priority: Option<String>,
}

impl EntryBuilder {
    fn build(self) -> Option<UrlEntry> {
        self.loc.map(|loc| UrlEntry {
            loc,
            lastmod: self.lastmod,
            changefreq: self.changefreq,
            priority: self.priority,
        })
    }
}

/// Parse sitemap XML into its kind and entries.
#[inline]
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, SitemapParseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut kind = SitemapKind::Unknown;
    let mut entries = Vec::new();
    let mut current: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SitemapParseError::Xml(e.to_string()))?;

        match event {
            Event::Start(start) => match local_name(start.name().as_ref()) {
                b"urlset" => kind = SitemapKind::StandardSitemap,
                b"sitemapindex" => kind = SitemapKind::SitemapIndex,
                b"url" | b"sitemap" if kind != SitemapKind::Unknown => {
                    current = Some(EntryBuilder::default());
                }
                b"loc" => field = Some(Field::Loc),
                b"lastmod" => field = Some(Field::Lastmod),
                b"changefreq" => field = Some(Field::Changefreq),
                b"priority" => field = Some(Field::Priority),
                _ => {}
            },
            Event::Text(text) => {
                if let (Some(entry), Some(field)) = (current.as_mut(), field) {
                    let value = text
                        .unescape()
                        .map_err(|e| SitemapParseError::Xml(e.to_string()))?
                        .trim()
                        .to_string();
                    if !value.is_empty() {
                        match field {
                            Field::Loc => entry.loc = Some(value),
                            Field::Lastmod => entry.lastmod = Some(value),
                            Field::Changefreq => entry.changefreq = Some(value),
                            Field::Priority => entry.priority = Some(value),
                        }
                    }
                }
            }
            Event::End(end) => match local_name(end.name().as_ref()) {
                b"url" | b"sitemap" => {
                    if let Some(builder) = current.take() {
                        if let Some(entry) = builder.build() {
                            entries.push(entry);
                        }
                    }
                }
                b"loc" | b"lastmod" | b"changefreq" | b"priority" => field = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    // Index entries never carry changefreq or priority.
    if kind == SitemapKind::SitemapIndex {
        for entry in &mut entries {
            entry.changefreq = None;
            entry.priority = None;
        }
    }

    Ok(SitemapDocument { kind, entries })
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Loc,
    Lastmod,
    Changefreq,
    Priority,
}

/// Strip any namespace prefix from an element name.
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map_or(name, |pos| &name[pos + 1..])
}
