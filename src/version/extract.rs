//! Lifting version substrings out of arbitrary noisy text
//!
//! Web pages and installer metadata bury versions inside words like
//! "v2.5.1-x64" or "(build 1.2.3)". Extraction splits the text on spaces,
//! blanks every character that cannot be part of a version within each word,
//! and validates the surviving candidates with the model in
//! [`crate::version::model`].

use crate::version::model::{self, ValidationMode};

/// Finds the first valid version substring in `text`, scanning words forward
/// or, with `reversed`, from the last word backwards.
///
/// Returns `None` when nothing validates; that is a normal outcome, not an
/// error.
pub fn first_version_in(
    text: &str,
    treat_standalone_number_as_version: bool,
    reversed: bool,
) -> Option<String> {
    let mode = ValidationMode::strict(treat_standalone_number_as_version);
    let words: Vec<&str> = text.split(' ').collect();
    for i in 0..words.len() {
        let word = if reversed {
            words[words.len() - 1 - i]
        } else {
            words[i]
        };
        let blanked: String = word
            .chars()
            .map(|c| if c.is_ascii_digit() || c == '.' { c } else { ' ' })
            .collect();
        for candidate in blanked.split(' ') {
            let trimmed = trim_edge_dots(candidate);
            if model::is_version(trimmed, mode) {
                return Some(trimmed.to_string());
            }
        }
    }
    None
}

/// Removes the first located version from `text` and returns the remainder
/// together with the version itself.
///
/// With `remove_whole_word` unset, only the version substring is cut out of
/// its word. With it set, the whole word is dropped; when that word was the
/// last one and the word before it is a single non-alphanumeric separator
/// (as in "Inkscape - 1.3"), the separator is dropped too. When no version is
/// found the text comes back unchanged.
pub fn strip_first_version(
    text: &str,
    treat_standalone_number_as_version: bool,
    reversed: bool,
    remove_whole_word: bool,
) -> (String, Option<String>) {
    let Some(version) = first_version_in(text, treat_standalone_number_as_version, reversed)
    else {
        return (text.to_string(), None);
    };

    let words: Vec<&str> = text.split(' ').collect();
    let mut kept: Vec<String> = Vec::with_capacity(words.len());
    let mut removed = false;
    for (i, word) in words.iter().enumerate() {
        if removed || !word.contains(&version) {
            kept.push((*word).to_string());
            continue;
        }
        removed = true;
        if !remove_whole_word {
            let at = word.find(&version).unwrap_or(0);
            let mut rest = String::with_capacity(word.len() - version.len());
            rest.push_str(&word[..at]);
            rest.push_str(&word[at + version.len()..]);
            kept.push(rest);
        } else if i == words.len() - 1 && i > 0 {
            let separator_before = kept
                .last()
                .is_some_and(|w| w.len() == 1 && !w.chars().all(char::is_alphanumeric));
            if separator_before {
                kept.pop();
            }
        }
    }

    (kept.join(" ").trim().to_string(), Some(version))
}

/// Extracts every version in `text` and returns the newest one.
///
/// The first match is repeatedly removed until nothing validates, then the
/// collected candidates are reduced with pairwise comparison; extraction
/// order cannot affect the result.
pub fn latest_version_in(text: &str, treat_standalone_number_as_version: bool) -> Option<String> {
    let mut remaining = text.to_string();
    let mut found: Vec<String> = Vec::new();
    loop {
        let (rest, version) =
            strip_first_version(&remaining, treat_standalone_number_as_version, false, false);
        match version {
            Some(version) => {
                found.push(version);
                remaining = rest;
            }
            None => break,
        }
    }

    let mut candidates = found.into_iter();
    let mut latest = candidates.next()?;
    for candidate in candidates {
        if model::is_version_newer(&candidate, &latest, treat_standalone_number_as_version)
            .unwrap_or(false)
        {
            latest = candidate;
        }
    }
    Some(latest)
}

fn trim_edge_dots(candidate: &str) -> &str {
    let candidate = candidate.strip_prefix('.').unwrap_or(candidate);
    candidate.strip_suffix('.').unwrap_or(candidate)
}
