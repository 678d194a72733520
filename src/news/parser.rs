// =============================================================================
// Feed Parser: RSS 2.0 / RSS 1.0 / Atom
// =============================================================================
//
// Pull-parses a feed document and collects `(title, link)` pairs in document
// order:
//   RSS   <item><title>..</title><link>..</link></item>
//   Atom  <entry><title>..</title><link href=".." rel="alternate"/></entry>
//
// Entries without a title are skipped. The whole document is read even after
// `limit` headlines are collected: a feed that is malformed anywhere, or
// ends with elements still open, yields an error and no headlines.
// =============================================================================

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::Headline;
use crate::error::FeedParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
}

#[derive(Debug, Default)]
struct EntryBuilder {
    title: String,
    link: String,
}

impl EntryBuilder {
    fn finish(self) -> Option<Headline> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return None;
        }
        Some(Headline {
            title,
            link: self.link.trim().to_string(),
        })
    }

    /// Atom links carry the URL in `href`; prefer `rel="alternate"` (or no
    /// rel) over enclosures and self links.
    fn take_href(&mut self, e: &BytesStart<'_>) -> Result<bool, FeedParseError> {
        let Some(href) = e.try_get_attribute("href")? else {
            return Ok(false);
        };
        let rel = match e.try_get_attribute("rel")? {
            Some(attr) => attr.unescape_value()?.into_owned(),
            None => "alternate".to_string(),
        };
        if rel == "alternate" && self.link.is_empty() {
            self.link = href.unescape_value()?.into_owned();
        }
        Ok(true)
    }
}

/// Parse up to `limit` headlines from a feed document.
pub fn parse_feed(xml: &str, limit: usize) -> Result<Vec<Headline>, FeedParseError> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut headlines = Vec::new();
    let mut root: Option<String> = None;
    let mut entry: Option<EntryBuilder> = None;
    let mut field: Option<Field> = None;
    let mut depth: usize = 0;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                depth += 1;
                let name = local_name(&e);
                if root.is_none() {
                    check_root(&name)?;
                    root = Some(name);
                    continue;
                }
                match name.as_str() {
                    "item" | "entry" => {
                        entry = Some(EntryBuilder::default());
                        field = None;
                    }
                    "title" if entry.is_some() => field = Some(Field::Title),
                    "link" => {
                        if let Some(b) = entry.as_mut() {
                            // RSS puts the URL in the element body; Atom in href.
                            if !b.take_href(&e)? {
                                field = Some(Field::Link);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                if root.is_none() {
                    check_root(&name)?;
                    root = Some(name);
                    continue;
                }
                if name == "link" {
                    if let Some(b) = entry.as_mut() {
                        b.take_href(&e)?;
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(f), Some(b)) = (field, entry.as_mut()) {
                    let text = t.unescape()?;
                    push_text(b, f, &text);
                }
            }
            Event::CData(c) => {
                if let (Some(f), Some(b)) = (field, entry.as_mut()) {
                    let bytes = c.into_inner();
                    push_text(b, f, &String::from_utf8_lossy(&bytes));
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                match name.as_str() {
                    "title" | "link" => field = None,
                    "item" | "entry" => {
                        let finished = entry.take().and_then(EntryBuilder::finish);
                        if let Some(h) = finished.filter(|_| headlines.len() < limit) {
                            headlines.push(h);
                        }
                        field = None;
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if root.is_none() {
        return Err(FeedParseError::UnknownFormat(String::new()));
    }
    if depth > 0 {
        return Err(FeedParseError::Truncated { open: depth });
    }

    Ok(headlines)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn check_root(name: &str) -> Result<(), FeedParseError> {
    match name {
        "rss" | "RDF" | "feed" => Ok(()),
        other => Err(FeedParseError::UnknownFormat(other.to_string())),
    }
}

fn push_text(b: &mut EntryBuilder, field: Field, text: &str) {
    match field {
        Field::Title => b.title.push_str(text),
        Field::Link => b.link.push_str(text),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Crypto Wire</title>
    <link>https://wire.example.com</link>
    <item>
      <title>XRP &amp; HBAR rally</title>
      <link>https://wire.example.com/a</link>
    </item>
    <item>
      <title><![CDATA[Ledger upgrade <live>]]></title>
      <link>https://wire.example.com/b</link>
    </item>
    <item>
      <link>https://wire.example.com/untitled</link>
    </item>
    <item>
      <title>Third story</title>
      <link>https://wire.example.com/c</link>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Ledger Blog</title>
  <link href="https://blog.example.org/" rel="alternate"/>
  <entry>
    <title>Council update</title>
    <link rel="enclosure" href="https://blog.example.org/audio.mp3"/>
    <link href="https://blog.example.org/council"/>
  </entry>
</feed>"#;

    #[test]
    fn parses_rss_items_skipping_channel_metadata() {
        let headlines = parse_feed(RSS, 10).unwrap();
        assert_eq!(headlines.len(), 3);
        assert_eq!(headlines[0].title, "XRP & HBAR rally");
        assert_eq!(headlines[0].link, "https://wire.example.com/a");
        assert_eq!(headlines[1].title, "Ledger upgrade <live>");
        assert_eq!(headlines[2].title, "Third story");
    }

    #[test]
    fn respects_limit() {
        let headlines = parse_feed(RSS, 2).unwrap();
        assert_eq!(headlines.len(), 2);
        assert_eq!(headlines[1].link, "https://wire.example.com/b");
        assert!(parse_feed(RSS, 0).unwrap().is_empty());
    }

    #[test]
    fn parses_atom_alternate_link() {
        let headlines = parse_feed(ATOM, 5).unwrap();
        assert_eq!(headlines.len(), 1);
        assert_eq!(headlines[0].title, "Council update");
        assert_eq!(headlines[0].link, "https://blog.example.org/council");
    }

    #[test]
    fn html_page_is_not_a_feed() {
        let err = parse_feed("<html><body>503</body></html>", 5).unwrap_err();
        assert!(matches!(err, FeedParseError::UnknownFormat(ref r) if r == "html"));
    }

    #[test]
    fn empty_document_is_not_a_feed() {
        assert!(parse_feed("", 5).is_err());
    }

    #[test]
    fn error_after_limit_still_rejects_whole_feed() {
        let broken = "<rss><channel>\
            <item><title>first</title><link>https://x.example.com/1</link></item>\
            <item><title>second</link></item>\
            </channel></rss>";
        assert!(matches!(parse_feed(broken, 1), Err(FeedParseError::Xml(_))));
        assert!(matches!(parse_feed(broken, 5), Err(FeedParseError::Xml(_))));
    }

    #[test]
    fn truncated_document_is_rejected() {
        let truncated = "<rss><channel><item><title>cut</title><link>https://x.example.com/1</link></item><item><title>half</title>";
        let err = parse_feed(truncated, 5).unwrap_err();
        assert!(matches!(err, FeedParseError::Truncated { open } if open > 0));
    }

    #[test]
    fn mismatched_tags_are_a_parse_error() {
        let broken = "<rss><channel><item><title>x</link></item></channel></rss>";
        assert!(matches!(parse_feed(broken, 5), Err(FeedParseError::Xml(_))));
    }
}
