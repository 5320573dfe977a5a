//! Display-mask index sets for the hidden spelling modes.
//!
//! A masked position renders as `_` until the user has entered it.

use crate::settings::DisplayMode;
use rand::seq::SliceRandom;

const VOWELS: [char; 10] = ['a', 'e', 'i', 'o', 'u', 'A', 'E', 'I', 'O', 'U'];

pub fn vowel_indices(word: &str) -> Vec<usize> {
    word.chars()
        .enumerate()
        .filter(|(_, c)| VOWELS.contains(c))
        .map(|(i, _)| i)
        .collect()
}

pub fn consonant_indices(word: &str) -> Vec<usize> {
    word.chars()
        .enumerate()
        .filter(|(_, c)| c.is_ascii_alphabetic() && !VOWELS.contains(c))
        .map(|(i, _)| i)
        .collect()
}

pub fn letter_indices(word: &str) -> Vec<usize> {
    word.chars()
        .enumerate()
        .filter(|(_, c)| c.is_ascii_alphabetic())
        .map(|(i, _)| i)
        .collect()
}

/// A random strict majority of the letter positions.
pub fn random_indices_over_half(word: &str) -> Vec<usize> {
    let mut candidates = letter_indices(word);
    if candidates.is_empty() {
        return candidates;
    }
    let take = candidates.len() / 2 + 1;
    let mut rng = rand::thread_rng();
    candidates.shuffle(&mut rng);
    candidates.truncate(take);
    candidates.sort_unstable();
    candidates
}

pub fn hidden_indices(mode: DisplayMode, word: &str) -> Vec<usize> {
    match mode {
        DisplayMode::Full => Vec::new(),
        DisplayMode::HideVowels => vowel_indices(word),
        DisplayMode::HideConsonants => consonant_indices(word),
        DisplayMode::HideRandom => random_indices_over_half(word),
        DisplayMode::HideAll => letter_indices(word),
    }
}
