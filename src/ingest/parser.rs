//! RSS 2.0 / Atom feed parsing into [`RawItem`]s.
//!
//! Each `<item>`/`<entry>` is deserialized on its own, so a malformed item
//! drops only itself. A body that does not look like a feed yields nothing.

use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use once_cell::sync::Lazy;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

use crate::ingest::extract::{extract_company, extract_location};
use crate::ingest::types::{FeedSource, RawItem};
use crate::ingest::{clean_text, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};

#[derive(Debug, Default, Deserialize)]
struct TextNode {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    description: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    guid: Option<TextNode>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<TextNode>,
    id: Option<String>,
    published: Option<String>,
    updated: Option<String>,
    summary: Option<TextNode>,
    content: Option<TextNode>,
}

static RE_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<item\b[^>]*>.*?</item>").expect("item regex"));
static RE_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<entry\b[^>]*>.*?</entry>").expect("entry regex"));
static RE_CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<category\b(?:[^>]*\bterm="([^"]*)")?[^>]*?(?:/>|>(.*?)</category>)"#)
        .expect("category regex")
});
static RE_ATOM_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?is)<link\b([^>]*)/?>"#).expect("atom link regex"));
static RE_HREF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bhref\s*=\s*"([^"]+)""#).expect("href regex"));
static RE_REL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\brel\s*=\s*"([^"]+)""#).expect("rel regex"));
static RE_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#?[A-Za-z0-9]{1,32};)?").expect("entity regex"));

/// Cheap prefix/substring check that the body is XML/RSS/Atom.
pub fn looks_like_feed(body: &str) -> bool {
    let t = body.trim_start_matches('\u{feff}').trim_start();
    if t.starts_with("<?xml") || t.starts_with("<rss") || t.starts_with("<feed") {
        return true;
    }
    let head = match t.char_indices().nth(2048) {
        Some((i, _)) => &t[..i],
        None => t,
    };
    head.contains("<rss") || head.contains("<feed") || head.contains("<channel")
}

/// Replace HTML-only named entities and bare ampersands so quick-xml accepts the chunk.
fn scrub_entities_for_xml(s: &str) -> String {
    RE_ENTITY
        .replace_all(s, |c: &regex::Captures| match c.get(1).map(|m| m.as_str()) {
            None => "&amp;".to_string(),
            Some(ent) if ent.starts_with('#') => format!("&{ent}"),
            Some(ent @ ("amp;" | "lt;" | "gt;" | "quot;" | "apos;")) => format!("&{ent}"),
            Some(ent) => {
                let decoded = html_escape::decode_html_entities(&format!("&{ent}")).to_string();
                if decoded.starts_with('&') {
                    // unknown entity name: keep it visible as text
                    format!("&amp;{ent}")
                } else {
                    decoded
                }
            }
        })
        .into_owned()
}

/// Parse a feed date: RFC 2822 (RSS), then RFC 3339 (Atom).
pub fn parse_feed_date(s: &str) -> Option<DateTime<Utc>> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    let parsed = OffsetDateTime::parse(t, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(t, &Rfc3339))
        .ok()
        .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), dt.nanosecond()));
    parsed.or_else(|| {
        DateTime::parse_from_rfc2822(t)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

fn feed_categories(chunk: &str) -> Vec<String> {
    RE_CATEGORY
        .captures_iter(chunk)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .map(|m| {
            let raw = m.as_str().trim();
            let raw = raw
                .strip_prefix("<![CDATA[")
                .and_then(|r| r.strip_suffix("]]>"))
                .unwrap_or(raw);
            clean_text(raw, 80)
        })
        .filter(|s| !s.is_empty())
        .collect()
}

fn atom_link(chunk: &str) -> Option<String> {
    let mut fallback = None;
    for c in RE_ATOM_LINK.captures_iter(chunk) {
        let attrs = c.get(1).map(|m| m.as_str()).unwrap_or_default();
        let Some(href) = RE_HREF.captures(attrs).and_then(|h| h.get(1)) else {
            continue;
        };
        let rel = RE_REL
            .captures(attrs)
            .and_then(|r| r.get(1))
            .map(|r| r.as_str())
            .unwrap_or("alternate");
        if rel == "alternate" {
            return Some(href.as_str().trim().to_string());
        }
        fallback.get_or_insert_with(|| href.as_str().trim().to_string());
    }
    fallback
}

/// Fields common to RSS items and Atom entries, before cleanup.
struct ItemFields {
    title: String,
    link: String,
    description: String,
    date: Option<String>,
    guid: Option<String>,
}

fn parse_rss_chunk(chunk: &str) -> Result<ItemFields, quick_xml::DeError> {
    let it: RssItem = from_str(chunk)?;
    Ok(ItemFields {
        title: it.title.unwrap_or_default(),
        link: it.link.unwrap_or_default(),
        description: it.description.unwrap_or_default(),
        date: it.pub_date,
        guid: it.guid.map(|g| g.value),
    })
}

fn parse_atom_chunk(chunk: &str) -> Result<ItemFields, quick_xml::DeError> {
    let e: AtomEntry = from_str(chunk)?;
    let description = e
        .content
        .filter(|c| !c.value.trim().is_empty())
        .or(e.summary)
        .map(|c| c.value)
        .unwrap_or_default();
    Ok(ItemFields {
        title: e.title.map(|t| t.value).unwrap_or_default(),
        link: atom_link(chunk).unwrap_or_default(),
        description,
        date: e.published.or(e.updated),
        guid: e.id,
    })
}

/// Parse one fetched feed body. Never fails; bad input yields fewer items.
pub fn parse_feed(body: &str, source: &FeedSource, fetched_at: DateTime<Utc>) -> Vec<RawItem> {
    let t0 = std::time::Instant::now();
    if !looks_like_feed(body) {
        tracing::warn!(source = %source.name, url = %source.url, "body is not an RSS/Atom feed");
        counter!("ingest_invalid_feeds_total").increment(1);
        return Vec::new();
    }

    let xml = scrub_entities_for_xml(body);
    let is_rss = RE_ITEM.is_match(&xml);
    let chunks: Vec<&str> = if is_rss {
        RE_ITEM.find_iter(&xml).map(|m| m.as_str()).collect()
    } else {
        RE_ENTRY.find_iter(&xml).map(|m| m.as_str()).collect()
    };

    let mut out = Vec::with_capacity(chunks.len());
    let mut dropped = 0u64;
    for chunk in chunks {
        let fields = if is_rss {
            parse_rss_chunk(chunk)
        } else {
            parse_atom_chunk(chunk)
        };
        let fields = match fields {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(source = %source.name, error = %e, "dropping malformed feed item");
                dropped += 1;
                continue;
            }
        };

        let title = clean_text(&fields.title, TITLE_MAX_CHARS);
        let link = fields.link.trim().to_string();
        if title.is_empty() && link.is_empty() {
            dropped += 1;
            continue;
        }
        let description = clean_text(&fields.description, DESCRIPTION_MAX_CHARS);
        let guid = fields
            .guid
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| if link.is_empty() { title.clone() } else { link.clone() });
        let published_at = fields
            .date
            .as_deref()
            .and_then(parse_feed_date)
            .unwrap_or(fetched_at);

        out.push(RawItem {
            company: extract_company(&source.name, &title, &description),
            location: extract_location(&source.name, &title, &description),
            feed_categories: feed_categories(chunk),
            title,
            link,
            description,
            published_at,
            guid,
            source_name: source.name.clone(),
            source_category_label: source.category.clone(),
        });
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_items_total").increment(out.len() as u64);
    counter!("ingest_items_dropped_total").increment(dropped);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn src() -> FeedSource {
        FeedSource::new("Remotive", "Software Development", "https://remotive.test/feed")
    }

    fn fetched() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn rejects_non_feed_bodies() {
        assert!(!looks_like_feed("<!doctype html><html><body>blocked</body></html>"));
        assert!(looks_like_feed("\u{feff}<?xml version=\"1.0\"?><rss/>"));
        assert!(parse_feed("{\"jobs\":[]}", &src(), fetched()).is_empty());
    }

    #[test]
    fn parses_rss_items_with_fallbacks() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Jobs</title>
<item>
  <title><![CDATA[Senior Rust Engineer at Ferrous &amp; Co]]></title>
  <link>https://remotive.test/jobs/1</link>
  <guid isPermaLink="false">remotive-1</guid>
  <pubDate>Mon, 06 Jan 2025 10:00:00 +0000</pubDate>
  <category>Software Development</category>
  <description><![CDATA[<p>Build&nbsp;things.</p><p>Location: Berlin, Germany</p>]]></description>
</item>
<item>
  <title>No guid here</title>
  <link>https://remotive.test/jobs/2</link>
  <pubDate>not a date</pubDate>
</item>
<item>
  <description>neither title nor link</description>
</item>
</channel></rss>"#;
        let items = parse_feed(xml, &src(), fetched());
        assert_eq!(items.len(), 2);

        let a = &items[0];
        assert_eq!(a.title, "Senior Rust Engineer at Ferrous & Co");
        assert_eq!(a.guid, "remotive-1");
        assert_eq!(a.company, "Ferrous & Co");
        assert_eq!(a.location, "Berlin");
        assert_eq!(a.feed_categories, vec!["Software Development".to_string()]);
        assert_eq!(
            a.published_at,
            Utc.with_ymd_and_hms(2025, 1, 6, 10, 0, 0).unwrap()
        );
        assert!(a.description.starts_with("Build things."));

        let b = &items[1];
        assert_eq!(b.guid, "https://remotive.test/jobs/2");
        assert_eq!(b.published_at, fetched());
        assert_eq!(b.company, "Unknown Company");
        assert_eq!(b.location, "Remote");
    }

    #[test]
    fn malformed_item_drops_only_itself() {
        let xml = r#"<rss><channel>
<item><title>Good one</title><link>https://x.test/1</link></item>
<item><title>Broken<title></item>
<item><title>Another</title><link>https://x.test/3</link></item>
</channel></rss>"#;
        let items = parse_feed(xml, &src(), fetched());
        let titles: Vec<_> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Good one", "Another"]);
    }

    #[test]
    fn parses_atom_entries() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Board</title>
  <entry>
    <title type="html">Product Designer (Remote)</title>
    <link rel="self" href="https://board.test/api/9"/>
    <link rel="alternate" href="https://board.test/jobs/9"/>
    <id>tag:board.test,2025:9</id>
    <updated>2025-02-01T08:30:00Z</updated>
    <summary>Design &lt;b&gt;great&lt;/b&gt; things</summary>
  </entry>
</feed>"#;
        let items = parse_feed(xml, &src(), fetched());
        assert_eq!(items.len(), 1);
        let e = &items[0];
        assert_eq!(e.link, "https://board.test/jobs/9");
        assert_eq!(e.guid, "tag:board.test,2025:9");
        assert_eq!(e.description, "Design great things");
        assert_eq!(
            e.published_at,
            Utc.with_ymd_and_hms(2025, 2, 1, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn rfc2822_with_named_zone_parses() {
        let d = parse_feed_date("Tue, 07 Jan 2025 12:00:00 GMT").unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2025, 1, 7, 12, 0, 0).unwrap());
        assert!(parse_feed_date("yesterday").is_none());
    }
}
