//! Identifier ordering for license and exception documents.
//!
//! Documents are sorted the way a root-locale collator orders identifiers,
//! not by raw code points. "bzip2-1.0.6" must land between "BSD-2-Clause" and
//! "GPL-2.0", which plain byte order would not do.
//!
//! # Ordering rules
//!
//! - Primary: characters compared case-insensitively, grouped by class
//!   (whitespace < punctuation < symbols < digits < letters). Punctuation
//!   and ASCII symbols keep the root collator's own order inside their class,
//!   so `_` sorts before `-`; other symbols fall back to code point order
//! - Tertiary: on a primary tie, lowercase sorts before uppercase
//! - Final: raw code point order, so distinct strings never compare equal

use std::cmp::Ordering;

use crate::records::RegistryEntry;

/// Compare two identifiers with locale-style collation.
pub fn compare_ids(a: &str, b: &str) -> Ordering {
    primary(a)
        .cmp(primary(b))
        .then_with(|| tertiary(a).cmp(tertiary(b)))
        .then_with(|| a.cmp(b))
}

/// Sort entries by identifier using [`compare_ids`].
pub fn sort_by_id<T: RegistryEntry>(entries: &mut [T]) {
    entries.sort_by(|a, b| compare_ids(a.id(), b.id()));
}

/// Remove entries whose identifier already appeared earlier in the slice.
///
/// Returns the identifiers that were dropped, in the order encountered.
pub fn dedup_by_id<T: RegistryEntry>(entries: &mut Vec<T>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut dropped = Vec::new();
    entries.retain(|entry| {
        if seen.insert(entry.id().to_string()) {
            true
        } else {
            dropped.push(entry.id().to_string());
            false
        }
    });
    dropped
}

fn primary(s: &str) -> impl Iterator<Item = (u8, u32, char)> + '_ {
    s.chars().map(|c| {
        let (class, rank) = weight(c);
        (class, rank, c.to_lowercase().next().unwrap_or(c))
    })
}

fn tertiary(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.chars().map(char::is_uppercase)
}

/// Root-collation order of ASCII punctuation.
const PUNCTUATION: &str = "_-,;:!?.'\"()[]{}@*/\\&#%";

/// Root-collation order of ASCII symbols; anything else in the class ranks after.
const SYMBOLS: &str = "`^+<=>|~$";

fn weight(c: char) -> (u8, u32) {
    if c.is_whitespace() {
        return (0, 0);
    }
    if let Some(rank) = rank_in(PUNCTUATION, c) {
        return (1, rank);
    }
    if c.is_numeric() {
        return (3, 0);
    }
    if c.is_alphabetic() {
        return (4, 0);
    }
    match rank_in(SYMBOLS, c) {
        Some(rank) => (2, rank),
        None => (2, SYMBOLS.len() as u32 + u32::from(c)),
    }
}

fn rank_in(table: &str, c: char) -> Option<u32> {
    table.chars().position(|t| t == c).map(|i| i as u32)
}
