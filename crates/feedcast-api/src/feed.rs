//! Feed document parsing.

use feed_rs::model::Entry;
use feed_rs::parser::{self, ParseFeedError};
use feedcast_models::FeedItem;

/// Parses an RSS, Atom or JSON Feed document into relay items.
///
/// Entries keep document order. An entry's publication time falls back to
/// its update time; entries with neither are returned undated.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedItem>, ParseFeedError> {
    let feed = parser::parse(body)?;
    Ok(feed.entries.into_iter().map(to_item).collect())
}

fn to_item(entry: Entry) -> FeedItem {
    let title = entry.title.map(|t| t.content).unwrap_or_default();
    let link = entry
        .links
        .into_iter()
        .next()
        .map(|l| l.href)
        .unwrap_or_default();

    let mut item = FeedItem::new(title, link, entry.published.or(entry.updated));
    item.categories = entry.categories.into_iter().map(|c| c.term).collect();
    item
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>News</title>
    <link>https://example.com/</link>
    <description>Latest</description>
    <item>
      <title>Second</title>
      <link>https://example.com/2</link>
      <category>Sport, Auto</category>
      <pubDate>Tue, 02 Jan 2024 12:00:00 +0000</pubDate>
    </item>
    <item>
      <title>First</title>
      <link>https://example.com/1</link>
      <category>Politics</category>
      <category>World</category>
      <pubDate>Tue, 02 Jan 2024 10:00:00 +0000</pubDate>
    </item>
    <item>
      <title>Undated</title>
      <link>https://example.com/3</link>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss() {
        let items = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].title, "Second");
        assert_eq!(items[0].link, "https://example.com/2");
        assert_eq!(items[0].categories, vec!["Sport, Auto"]);
        assert_eq!(
            items[0].published,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap())
        );

        assert_eq!(items[1].categories, vec!["Politics", "World"]);
        assert_eq!(items[2].published, None);
    }

    #[test]
    fn test_atom_falls_back_to_updated() {
        let atom = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>News</title>
  <id>urn:feed</id>
  <updated>2024-01-02T13:00:00Z</updated>
  <entry>
    <title>Entry</title>
    <id>urn:entry</id>
    <link href="https://example.com/e"/>
    <updated>2024-01-02T13:00:00Z</updated>
    <category term="Tech"/>
  </entry>
</feed>"#;

        let items = parse_feed(atom.as_bytes()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].link, "https://example.com/e");
        assert_eq!(items[0].categories, vec!["Tech"]);
        assert_eq!(
            items[0].published,
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 13, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_reject_garbage() {
        assert!(parse_feed(b"definitely not a feed").is_err());
    }
}
