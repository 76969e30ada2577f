//! Ordered-fallback selectors.
//!
//! Each field owns a list of [`FieldSelector`]s tried in order; the first one
//! that yields non-empty text wins. Repeated items instead take the matches
//! of every selector in the list. Adding a layout means adding a table
//! entry, not a branch.

use std::collections::HashSet;

use regex::Regex;
use scraper::{ElementRef, Selector};
use tracing::warn;

use crate::error::StepError;

/// Text inside these elements is never treated as visible.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Read {
    /// Visible text, trimmed text nodes joined by single spaces.
    Text,
    /// Value of the named attribute.
    Attr(&'static str),
}

#[derive(Debug)]
pub enum FieldSelector {
    /// `<tag>` whose `attr` contains the substring `contains`.
    AttributeMatch {
        tag: &'static str,
        attr: &'static str,
        contains: &'static str,
        read: Read,
    },
    /// CSS path. `compiled` is `None` when the CSS was rejected.
    StructuralPath {
        css: &'static str,
        compiled: Option<Selector>,
        read: Read,
    },
    /// First visible text node matching `anchor`; the value is the first
    /// capture group of `capture` in that node or the text node right
    /// before it.
    TextPattern { anchor: Regex, capture: Regex },
}

impl FieldSelector {
    pub fn path(css: &'static str, read: Read) -> Self {
        FieldSelector::StructuralPath {
            css,
            compiled: compile(css),
            read,
        }
    }

    pub fn text(css: &'static str) -> Self {
        Self::path(css, Read::Text)
    }

    pub fn attribute(tag: &'static str, attr: &'static str, contains: &'static str, read: Read) -> Self {
        FieldSelector::AttributeMatch {
            tag,
            attr,
            contains,
            read,
        }
    }

    pub fn pattern(anchor: Regex, capture: Regex) -> Self {
        FieldSelector::TextPattern { anchor, capture }
    }

    /// Value extracted by this selector within `scope`, if any.
    pub fn apply(&self, scope: ElementRef<'_>) -> Option<String> {
        match self {
            FieldSelector::AttributeMatch { read, .. } | FieldSelector::StructuralPath { read, .. } => {
                self.select_all(scope).first().and_then(|el| read_value(*el, *read))
            }
            FieldSelector::TextPattern { anchor, capture } => {
                let nodes = visible_text_nodes(scope);
                let hit = nodes.iter().position(|t| anchor.is_match(t))?;
                let window = [Some(nodes[hit]), hit.checked_sub(1).map(|i| nodes[i])];
                window
                    .into_iter()
                    .flatten()
                    .find_map(|t| capture.captures(t).map(|c| c[1].to_string()))
            }
        }
    }

    /// Every element this selector matches within `scope`, in document order.
    pub fn select_all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        match self {
            FieldSelector::AttributeMatch {
                tag,
                attr,
                contains,
                ..
            } => scope
                .descendants()
                .filter_map(ElementRef::wrap)
                .filter(|el| {
                    let value = el.value();
                    value.name().eq_ignore_ascii_case(tag)
                        && value.attr(attr).is_some_and(|v| v.contains(contains))
                })
                .collect(),
            FieldSelector::StructuralPath { compiled, .. } => match compiled {
                Some(sel) => scope.select(sel).collect(),
                None => Vec::new(),
            },
            FieldSelector::TextPattern { .. } => Vec::new(),
        }
    }
}

/// First non-empty value across `selectors`, tried in order.
pub fn first_match(selectors: &[FieldSelector], scope: ElementRef<'_>) -> Option<String> {
    selectors.iter().find_map(|s| s.apply(scope))
}

/// Union of every selector's matches in `scope`, each element once, in
/// document order.
pub fn select_items<'a>(selectors: &[FieldSelector], scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let matched: HashSet<_> = selectors
        .iter()
        .flat_map(|s| s.select_all(scope))
        .map(|el| el.id())
        .collect();
    if matched.is_empty() {
        return Vec::new();
    }
    scope
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| matched.contains(&el.id()))
        .collect()
}

/// Visible text of an element: trimmed text nodes joined by a single space.
pub fn visible_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn read_value(el: ElementRef<'_>, read: Read) -> Option<String> {
    let value = match read {
        Read::Text => visible_text(el),
        Read::Attr(name) => el.value().attr(name)?.trim().to_string(),
    };
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn visible_text_nodes<'a>(scope: ElementRef<'a>) -> Vec<&'a str> {
    scope
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|p| p.value().as_element())
                .is_some_and(|e| HIDDEN_TAGS.contains(&e.name()));
            let text: &str = text;
            (!hidden && !text.trim().is_empty()).then_some(text)
        })
        .collect()
}

fn compile(css: &'static str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            let err = StepError::InvalidSelector {
                css: css.to_string(),
                reason: format!("{e:?}"),
            };
            warn!("{}", err);
            None
        }
    }
}
