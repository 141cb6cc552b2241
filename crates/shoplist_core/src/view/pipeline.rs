//! Filter, search and sort stages.
//!
//! Stages always run in the order status filter, search, sort. Sorting is
//! stable, so ties keep their filtered order.

use super::{FilterMode, SortMode, ViewControls};
use crate::model::item::Item;
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Derives the display projection for `items` under `controls`.
///
/// The input slice is only read; the result is a fresh vector.
pub fn apply(items: &[Item], controls: &ViewControls) -> Vec<Item> {
    let needle = controls.search.trim().to_lowercase();

    let mut view: Vec<Item> = items
        .iter()
        .filter(|item| matches_filter(item, controls.filter))
        .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    match controls.sort {
        SortMode::Created => view.sort_by_key(|item| item.created_at),
        SortMode::Name => view.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortMode::Status => view.sort_by_key(|item| item.done),
    }
    view
}

fn matches_filter(item: &Item, filter: FilterMode) -> bool {
    match filter {
        FilterMode::All => true,
        FilterMode::Pending => !item.done,
        FilterMode::Done => item.done,
    }
}

/// Locale-style name comparison.
///
/// Names compare in three levels: base letters ignoring accents and case,
/// then accents (unaccented first), then case (lowercase first). Identical
/// names compare equal.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented(a).cmp(accented(b)))
        .then_with(|| compare_case(a, b))
}

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn accented(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().flat_map(char::to_lowercase)
}

fn compare_case(a: &str, b: &str) -> Ordering {
    a.nfd()
        .zip(b.nfd())
        .map(|(left, right)| left.is_uppercase().cmp(&right.is_uppercase()))
        .find(|ordering| ordering.is_ne())
        .unwrap_or_else(|| a.nfd().count().cmp(&b.nfd().count()))
}
