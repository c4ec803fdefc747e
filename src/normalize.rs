//! # Text Normalizer
//! Raw comment text → canonical token sequence.
//!
//! Pipeline (fixed order, each step is a public function):
//! 0. HTML entity decode
//! 1. strip URLs, @mentions and #hashtags (replaced by a space, no placeholder token)
//! 2. lowercase + diacritic fold, then collapse elongations (3+ repeated letters → 1)
//! 3. tokenize on whitespace/punctuation; emoji become standalone tokens
//! 4. slang → canonical substitution (multi-word canonicals expand to several tokens)
//!
//! Empty or whitespace-only input yields an empty sequence.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::error::InvalidInputError;
use crate::lexicon::LexiconStore;

static RE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:https?://|www\.)\S+").expect("url regex"));
static RE_MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"@[\w.]+").expect("mention regex"));
static RE_HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"#(\w+)").expect("hashtag regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Keep the word of a hashtag (`#mantap` → `mantap`) instead of dropping it.
    pub keep_hashtag_words: bool,
}

/// Turns raw comments into token sequences using the shared lexicon's slang table.
#[derive(Debug, Clone)]
pub struct Normalizer {
    lexicon: Arc<LexiconStore>,
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(lexicon: Arc<LexiconStore>, config: NormalizerConfig) -> Self {
        Self { lexicon, config }
    }

    pub fn normalize(&self, raw: &str) -> Vec<String> {
        if raw.trim().is_empty() {
            return Vec::new();
        }
        let decoded = decode_entities(raw);
        let stripped = strip_noise(&decoded, self.config.keep_hashtag_words);
        let folded = collapse_elongation(&fold_case(&stripped));
        substitute_slang(tokenize(&folded), &self.lexicon)
    }

    /// Byte-level entry for collaborators that hand over undecoded payloads.
    pub fn normalize_bytes(&self, raw: &[u8]) -> Result<Vec<String>, InvalidInputError> {
        let text = std::str::from_utf8(raw).map_err(|e| InvalidInputError::NotUtf8 {
            offset: e.valid_up_to(),
        })?;
        Ok(self.normalize(text))
    }
}

/// Decode HTML entities (`&amp;`, `&#64;`, `&nbsp;` …).
pub fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).to_string()
}

/// Remove URLs, @mentions and #hashtags. Removed spans become a single space so
/// neighbouring words never glue together.
pub fn strip_noise(s: &str, keep_hashtag_words: bool) -> String {
    let out = RE_URL.replace_all(s, " ");
    let out = RE_MENTION.replace_all(&out, " ");
    let out = if keep_hashtag_words {
        RE_HASHTAG.replace_all(&out, " $1 ")
    } else {
        RE_HASHTAG.replace_all(&out, " ")
    };
    out.into_owned()
}

/// Lowercase and strip diacritics (NFD, combining marks removed). Emoji
/// joiners go too, so elongation collapse sees the letters they separated.
pub fn fold_case(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c) && !is_emoji_joiner(*c))
        .collect()
}

/// Collapse runs of 3+ identical letters into a single letter.
/// Runs of two are kept (`tt` in `bgtt`, `ss` in `pliss`).
pub fn collapse_elongation(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        let mut run = 1usize;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        let keep = if c.is_alphabetic() && run >= 3 { 1 } else { run };
        out.extend(std::iter::repeat(c).take(keep));
    }
    out
}

/// Split on whitespace/punctuation. Hyphens between alphanumerics stay inside
/// the word (`kata-kata`), every emoji is its own token, pure numbers are dropped.
/// A pair of regional indicators is one flag token; a lone indicator is dropped.
pub fn tokenize(s: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if is_emoji_joiner(c) {
            continue;
        }
        if is_regional_indicator(c) {
            flush_word(&mut word, &mut tokens);
            if let Some(second) = chars.next_if(|n| is_regional_indicator(*n)) {
                tokens.push([c, second].iter().collect());
            }
        } else if is_emoji(c) {
            flush_word(&mut word, &mut tokens);
            tokens.push(c.to_string());
        } else if c.is_alphanumeric() {
            word.push(c);
        } else if c == '-'
            && !word.is_empty()
            && chars.peek().is_some_and(|n| n.is_alphanumeric())
        {
            word.push(c);
        } else {
            flush_word(&mut word, &mut tokens);
        }
    }
    flush_word(&mut word, &mut tokens);
    tokens
}

fn flush_word(word: &mut String, tokens: &mut Vec<String>) {
    if word.is_empty() {
        return;
    }
    if !word.chars().all(|c| c.is_ascii_digit()) {
        tokens.push(std::mem::take(word));
    } else {
        word.clear();
    }
}

/// Replace slang tokens with their canonical form; unknown tokens pass through.
pub fn substitute_slang(tokens: Vec<String>, lexicon: &LexiconStore) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for tok in tokens {
        match lexicon.slang(&tok) {
            Some(canonical) => out.extend(canonical.iter().cloned()),
            None => out.push(tok),
        }
    }
    out
}

/// Canonical token form of a lexicon key: the same folding and tokenization
/// comments go through, without slang substitution.
pub fn term_tokens(term: &str) -> Vec<String> {
    tokenize(&collapse_elongation(&fold_case(term)))
}

/// Pictographic characters that carry meaning on their own.
pub fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1F2FF
            | 0x1F300..=0x1F3FA
            | 0x1F400..=0x1FAFF
            | 0x2300..=0x23FF
            | 0x2600..=0x27BF
            | 0x2B00..=0x2BFF
            | 0x3030
            | 0x303D
    )
}

fn is_regional_indicator(c: char) -> bool {
    matches!(c as u32, 0x1F1E6..=0x1F1FF)
}

/// Zero-width joiner, variation selectors and skin-tone modifiers: glue, not content.
fn is_emoji_joiner(c: char) -> bool {
    matches!(c as u32, 0x200D | 0xFE00..=0xFE0F | 0x1F3FB..=0x1F3FF)
}
