use rss::Channel;

use super::types::{FeedDocument, FeedItem};

/// Parse an RSS 2.0 body into a [`FeedDocument`].
///
/// Textual fields are HTML-entity-decoded after the XML parse: producers
/// commonly double-encode, and callers must not see raw `&amp;` sequences.
pub fn parse_document(xml: &[u8]) -> Result<FeedDocument, rss::Error> {
    let channel = Channel::read_from(xml)?;

    let items = channel
        .items()
        .iter()
        .map(|item| FeedItem {
            title: unescape(item.title().unwrap_or_default()),
            link: item.link().map(str::to_string),
            description: unescape(item.description().unwrap_or_default()),
            pub_date: item.pub_date().unwrap_or_default().to_string(),
        })
        .collect();

    Ok(FeedDocument {
        title: unescape(channel.title()),
        link: channel.link().to_string(),
        description: unescape(channel.description()),
        items,
    })
}

fn unescape(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}
