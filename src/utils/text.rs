// src/utils/text.rs

//! Text helpers for message bodies.

use std::borrow::Cow;

use unicode_segmentation::UnicodeSegmentation;

/// Marker appended to a body that had to be shortened.
pub const ELLIPSIS: char = '…';

/// Escape the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// Shorten `text` to at most `max_chars` characters.
///
/// Cuts on a grapheme boundary so emoji and combining marks stay whole,
/// and ends a shortened body with [`ELLIPSIS`].
pub fn truncate_graphemes(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }
    if max_chars == 0 {
        return Cow::Borrowed("");
    }

    let budget = max_chars - 1;
    let mut used = 0;
    let mut end = 0;
    for (offset, grapheme) in text.grapheme_indices(true) {
        let width = grapheme.chars().count();
        if used + width > budget {
            break;
        }
        used += width;
        end = offset + grapheme.len();
    }

    let mut shortened = text[..end].trim_end().to_string();
    shortened.push(ELLIPSIS);
    Cow::Owned(shortened)
}

/// Shorten an HTML-formatted `text` to at most `max_chars` characters.
///
/// Tags and entities are kept whole, and tags still open at the cut are
/// closed after the [`ELLIPSIS`], so the result stays well-formed.
pub fn truncate_html(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }
    if max_chars == 0 {
        return Cow::Borrowed("");
    }

    let mut open: Vec<&str> = Vec::new();
    let mut used = 0;
    let mut end = 0;
    let mut offset = 0;

    while offset < text.len() {
        let unit = markup_unit(&text[offset..]);
        let mut next_open = open.clone();
        match tag_name(unit) {
            Some((name, true)) => {
                if next_open.last() == Some(&name) {
                    next_open.pop();
                }
            }
            Some((name, false)) => next_open.push(name),
            None => {}
        }

        let width = unit.chars().count();
        if used + width + 1 + closing_width(&next_open) > max_chars {
            break;
        }
        used += width;
        offset += unit.len();
        end = offset;
        open = next_open;
    }

    let mut shortened = text[..end].trim_end().to_string();
    shortened.push(ELLIPSIS);
    for name in open.iter().rev() {
        shortened.push_str(&format!("</{name}>"));
    }
    Cow::Owned(shortened)
}

/// The next indivisible piece of `text`: a tag, an entity or a grapheme.
fn markup_unit(text: &str) -> &str {
    if text.starts_with('<') {
        if let Some(close) = text.find('>') {
            return &text[..=close];
        }
    }
    if text.starts_with('&') {
        if let Some((semi, _)) = text.char_indices().take(12).find(|&(_, c)| c == ';') {
            let body = &text[1..semi];
            if !body.is_empty() && body.chars().all(|c| c.is_ascii_alphanumeric() || c == '#') {
                return &text[..=semi];
            }
        }
    }
    text.graphemes(true).next().unwrap_or(text)
}

/// Tag name and whether it closes, for `<b>`, `</b>` and `<a href=..>`.
fn tag_name(unit: &str) -> Option<(&str, bool)> {
    let inner = unit.strip_prefix('<')?.strip_suffix('>')?;
    if inner.ends_with('/') {
        return None;
    }
    let (inner, closing) = match inner.strip_prefix('/') {
        Some(rest) => (rest, true),
        None => (inner, false),
    };
    let name = inner.split_whitespace().next()?;
    Some((name, closing))
}

fn closing_width(open: &[&str]) -> usize {
    open.iter().map(|name| name.chars().count() + 3).sum()
}
