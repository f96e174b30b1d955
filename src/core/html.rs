// src/core/html.rs
// Thin helpers over `scraper` for the "label, then the value after it" style of markup.

use scraper::{ElementRef, Selector};

use super::sanitize::normalize_ws;
use crate::error::{Result, ScrapeError};

pub fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScrapeError::Selector { css, reason: e.to_string() })
}

/// Visible text of an element, whitespace-collapsed and trimmed.
pub fn text_of(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

/// `Some(text)` unless the element's text is empty.
pub fn non_empty_text(el: ElementRef<'_>) -> Option<String> {
    Some(text_of(el)).filter(|t| !t.is_empty())
}

/// First element inside `scope` matching `sel` whose text starts with `label`
/// (ASCII case-insensitive).
pub fn find_labelled<'a>(scope: ElementRef<'a>, sel: &Selector, label: &str) -> Option<ElementRef<'a>> {
    scope.select(sel).find(|el| starts_with_ci(&text_of(*el), label))
}

/// The first element matching `sel` that starts after `anchor` in document order.
/// Descendants of `anchor` count (they open after it does).
pub fn find_next<'a>(scope: ElementRef<'a>, anchor: ElementRef<'a>, sel: &Selector) -> Option<ElementRef<'a>> {
    find_next_where(scope, anchor, |el| sel.matches(el))
}

/// Like `find_next`, with an arbitrary predicate.
pub fn find_next_where<'a, P>(scope: ElementRef<'a>, anchor: ElementRef<'a>, pred: P) -> Option<ElementRef<'a>>
where
    P: Fn(&ElementRef<'a>) -> bool,
{
    find_next_until(scope, anchor, None, pred)
}

/// Like `find_next_where`, but gives up once `stop` opens.
pub fn find_next_until<'a, P>(
    scope: ElementRef<'a>,
    anchor: ElementRef<'a>,
    stop: Option<ElementRef<'a>>,
    pred: P,
) -> Option<ElementRef<'a>>
where
    P: Fn(&ElementRef<'a>) -> bool,
{
    let stop = stop.map(|el| el.id());
    scope
        .descendants()
        .skip_while(|node| node.id() != anchor.id())
        .skip(1)
        .take_while(|node| Some(node.id()) != stop)
        .filter_map(ElementRef::wrap)
        .find(|el| pred(el))
}

pub(crate) fn starts_with_ci(text: &str, prefix: &str) -> bool {
    text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}
