//! Plain-text decoding of provider strings.
//!
//! The trivia provider HTML-encodes its text (`&quot;`, `&#039;`, `&amp;` and
//! occasionally inline tags). Parsing the string as an HTML fragment and
//! collecting its text nodes gives exactly what a browser shows.

use scraper::Html;

/// Decode HTML entities and drop markup, returning the visible text.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains(['&', '<']) {
        return raw.to_string();
    }

    let fragment = Html::parse_fragment(raw);
    fragment.root_element().text().collect()
}
