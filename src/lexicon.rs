//! # Lexicon Store
//!
//! Immutable, category-partitioned term → weight mapping, loaded once at startup
//! from a versioned JSON file and shared read-only (`Arc<LexiconStore>`).
//!
//! ```json
//! {
//!   "version": 1,
//!   "polarity":     { "bagus": 2, "jelek": -2, "worth it": 2, "😍": 2 },
//!   "negators":     ["tidak", "bukan"],
//!   "intensifiers": { "sangat": { "factor": 1.5, "position": "before" }, "banget": 1.5 },
//!   "diminishers":  { "agak": 0.5 },
//!   "slang":        { "gak": "tidak", "makasih": "terima kasih" },
//!   "stopwords":    ["yang", "dan"]
//! }
//! ```
//!
//! - Keys go through the same folding as comments (lowercase, diacritics,
//!   elongation, tokenization); polarity keys additionally get slang applied,
//!   so `"gak suka"` is stored as `"tidak suka"`.
//! - Every category except `stopwords` is required. Nothing falls back to an
//!   empty lexicon: that would classify every comment as neutral.
//! - Slang canonicals must already be canonical and must not be slang keys
//!   themselves, which keeps normalization idempotent.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LexiconLoadError;
use crate::normalize::term_tokens;

pub const SUPPORTED_VERSION: u32 = 1;

const DEFAULT_STOPWORDS: &[&str] = &[
    "yang", "dan", "di", "ke", "dari", "ini", "itu", "untuk", "dengan", "ada", "saya", "aku",
    "kamu", "dia", "kita", "kami", "mereka", "juga", "sudah", "saja", "sih", "dong", "kok", "lho",
    "nya", "atau", "karena", "pada", "dalam", "akan", "bisa", "lagi", "sama", "tapi", "kalau",
    "jadi", "apa", "mau", "gimana", "kayak", "memang", "masih", "harus", "haha", "banget", "deh",
    "kak", "min", "yg", "udah", "aja",
];

/// Which side of a polarity term an intensifier/diminisher may sit on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierPosition {
    /// Precedes the term (`sangat bagus`).
    Before,
    /// Follows the term (`bagus banget`).
    After,
    #[default]
    Any,
}

impl ModifierPosition {
    pub fn allows_before(self) -> bool {
        matches!(self, Self::Before | Self::Any)
    }

    pub fn allows_after(self) -> bool {
        matches!(self, Self::After | Self::Any)
    }
}

/// Lexicon category of a term. Negator > intensifier > diminisher > polarity
/// when a word is listed in several categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermCategory {
    Polarity,
    Negator,
    Intensifier,
    Diminisher,
}

/// Scaling modifier as stored in the lexicon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scaling {
    pub factor: f64,
    pub position: ModifierPosition,
}

/// Role a token plays when it sits next to a polarity term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModifierRole {
    Negator,
    Intensifier(Scaling),
    Diminisher(Scaling),
}

/// Result of a tagged lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexiconEntry {
    pub term: String,
    /// Signed polarity weight, scaling factor for intensifiers/diminishers, -1 for negators.
    pub weight: f64,
    pub category: TermCategory,
}

/// Counts per category, logged at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LexiconStats {
    pub polarity: usize,
    pub negators: usize,
    pub intensifiers: usize,
    pub diminishers: usize,
    pub slang: usize,
    pub stopwords: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScaling {
    Factor(f64),
    Detailed {
        factor: f64,
        #[serde(default)]
        position: ModifierPosition,
    },
}

impl RawScaling {
    fn into_scaling(self) -> Scaling {
        match self {
            Self::Factor(factor) => Scaling {
                factor,
                position: ModifierPosition::Any,
            },
            Self::Detailed { factor, position } => Scaling { factor, position },
        }
    }
}

fn default_version() -> u32 {
    SUPPORTED_VERSION
}

#[derive(Debug, Deserialize)]
struct RawLexicon {
    #[serde(default = "default_version")]
    version: u32,
    polarity: Option<BTreeMap<String, f64>>,
    negators: Option<Vec<String>>,
    intensifiers: Option<BTreeMap<String, RawScaling>>,
    diminishers: Option<BTreeMap<String, RawScaling>>,
    slang: Option<BTreeMap<String, String>>,
    stopwords: Option<Vec<String>>,
}

/// Immutable lexicon. Safe to share across threads; there are no writers after load.
#[derive(Debug, Clone)]
pub struct LexiconStore {
    version: u32,
    polarity: HashMap<String, f64>,
    negators: HashSet<String>,
    intensifiers: HashMap<String, Scaling>,
    diminishers: HashMap<String, Scaling>,
    slang: HashMap<String, Vec<String>>,
    stopwords: HashSet<String>,
    max_phrase_len: usize,
}

impl LexiconStore {
    /// Load and validate a lexicon file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LexiconLoadError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| LexiconLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&raw)?;
        let stats = store.stats();
        info!(
            target: "lexicon",
            path = %path.display(),
            version = store.version,
            polarity = stats.polarity,
            negators = stats.negators,
            intensifiers = stats.intensifiers,
            diminishers = stats.diminishers,
            slang = stats.slang,
            "lexicon loaded"
        );
        Ok(store)
    }

    /// Parse and validate a lexicon from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, LexiconLoadError> {
        let raw: RawLexicon = serde_json::from_str(json)?;
        if raw.version != SUPPORTED_VERSION {
            return Err(LexiconLoadError::UnsupportedVersion {
                found: raw.version,
                supported: SUPPORTED_VERSION,
            });
        }

        let polarity = raw.polarity.ok_or(LexiconLoadError::MissingCategory {
            category: "polarity",
        })?;
        let negators = raw.negators.ok_or(LexiconLoadError::MissingCategory {
            category: "negators",
        })?;
        let intensifiers = raw.intensifiers.ok_or(LexiconLoadError::MissingCategory {
            category: "intensifiers",
        })?;
        let diminishers = raw.diminishers.ok_or(LexiconLoadError::MissingCategory {
            category: "diminishers",
        })?;
        let slang = raw.slang.ok_or(LexiconLoadError::MissingCategory { category: "slang" })?;

        if polarity.is_empty() {
            return Err(LexiconLoadError::EmptyCategory {
                category: "polarity",
            });
        }

        // Slang first: polarity keys are stored in their post-slang form.
        let slang = build_slang(slang)?;

        let mut store = Self {
            version: raw.version,
            polarity: HashMap::with_capacity(polarity.len()),
            negators: HashSet::with_capacity(negators.len()),
            intensifiers: HashMap::with_capacity(intensifiers.len()),
            diminishers: HashMap::with_capacity(diminishers.len()),
            slang,
            stopwords: HashSet::new(),
            max_phrase_len: 1,
        };

        for (term, weight) in polarity {
            if !weight.is_finite() {
                return Err(LexiconLoadError::InvalidWeight {
                    category: "polarity",
                    term,
                    weight,
                    reason: "weight must be finite",
                });
            }
            let tokens = store.canonical_key(&term);
            if tokens.is_empty() {
                warn!(target: "lexicon", %term, "polarity term has no word content; skipped");
                continue;
            }
            store.max_phrase_len = store.max_phrase_len.max(tokens.len());
            let key = tokens.join(" ");
            if store.polarity.insert(key.clone(), weight).is_some() {
                return Err(LexiconLoadError::DuplicateTerm {
                    category: "polarity",
                    term: key,
                });
            }
        }

        for term in negators {
            let key = store.single_word_key("negators", &term)?;
            if !store.negators.insert(key.clone()) {
                return Err(LexiconLoadError::DuplicateTerm {
                    category: "negators",
                    term: key,
                });
            }
        }

        for (term, raw_scaling) in intensifiers {
            let scaling = raw_scaling.into_scaling();
            if !(scaling.factor.is_finite() && scaling.factor > 1.0) {
                return Err(LexiconLoadError::InvalidWeight {
                    category: "intensifiers",
                    term,
                    weight: scaling.factor,
                    reason: "intensifier factor must be greater than 1",
                });
            }
            let key = store.single_word_key("intensifiers", &term)?;
            if store.intensifiers.insert(key.clone(), scaling).is_some() {
                return Err(LexiconLoadError::DuplicateTerm {
                    category: "intensifiers",
                    term: key,
                });
            }
        }

        for (term, raw_scaling) in diminishers {
            let scaling = raw_scaling.into_scaling();
            if !(scaling.factor.is_finite() && scaling.factor > 0.0 && scaling.factor < 1.0) {
                return Err(LexiconLoadError::InvalidWeight {
                    category: "diminishers",
                    term,
                    weight: scaling.factor,
                    reason: "diminisher factor must be between 0 and 1 (exclusive)",
                });
            }
            let key = store.single_word_key("diminishers", &term)?;
            if store.diminishers.insert(key.clone(), scaling).is_some() {
                return Err(LexiconLoadError::DuplicateTerm {
                    category: "diminishers",
                    term: key,
                });
            }
        }

        let stopwords: Vec<String> = match raw.stopwords {
            Some(list) => list,
            None => DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
        };
        // Stopwords are matched against normalized tokens, slang included.
        store.stopwords = stopwords
            .iter()
            .flat_map(|w| store.canonical_key(w))
            .collect();

        Ok(store)
    }

    /// Key as it would appear in a normalized comment: folded, tokenized, slang applied.
    fn canonical_key(&self, term: &str) -> Vec<String> {
        let mut out = Vec::new();
        for tok in term_tokens(term) {
            match self.slang.get(&tok) {
                Some(canonical) => out.extend(canonical.iter().cloned()),
                None => out.push(tok),
            }
        }
        out
    }

    fn single_word_key(
        &self,
        category: &'static str,
        term: &str,
    ) -> Result<String, LexiconLoadError> {
        let mut tokens = self.canonical_key(term);
        if tokens.len() != 1 {
            return Err(LexiconLoadError::MultiWordModifier {
                category,
                term: term.to_string(),
            });
        }
        Ok(tokens.remove(0))
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Signed weight of a polarity word or phrase (tokens joined by one space).
    pub fn polarity(&self, term: &str) -> Option<f64> {
        self.polarity.get(term).copied()
    }

    pub fn is_negator(&self, term: &str) -> bool {
        self.negators.contains(term)
    }

    pub fn intensifier(&self, term: &str) -> Option<Scaling> {
        self.intensifiers.get(term).copied()
    }

    pub fn diminisher(&self, term: &str) -> Option<Scaling> {
        self.diminishers.get(term).copied()
    }

    /// Modifier role of a token, by category priority.
    pub fn modifier(&self, term: &str) -> Option<ModifierRole> {
        if self.is_negator(term) {
            Some(ModifierRole::Negator)
        } else if let Some(s) = self.intensifier(term) {
            Some(ModifierRole::Intensifier(s))
        } else {
            self.diminisher(term).map(ModifierRole::Diminisher)
        }
    }

    /// Canonical replacement tokens for a slang token.
    pub fn slang(&self, term: &str) -> Option<&[String]> {
        self.slang.get(term).map(Vec::as_slice)
    }

    pub fn is_stopword(&self, term: &str) -> bool {
        self.stopwords.contains(term)
    }

    /// Longest polarity phrase, in tokens.
    pub fn max_phrase_len(&self) -> usize {
        self.max_phrase_len
    }

    /// Tagged lookup of an already-normalized term. Raw input is folded first,
    /// so `lookup("BAGUS")` and `lookup("bagus")` agree.
    pub fn lookup(&self, term: &str) -> Option<LexiconEntry> {
        let key = self.canonical_key(term).join(" ");
        let entry = |weight, category| LexiconEntry {
            term: key.clone(),
            weight,
            category,
        };
        match self.modifier(&key) {
            Some(ModifierRole::Negator) => Some(entry(-1.0, TermCategory::Negator)),
            Some(ModifierRole::Intensifier(s)) => Some(entry(s.factor, TermCategory::Intensifier)),
            Some(ModifierRole::Diminisher(s)) => Some(entry(s.factor, TermCategory::Diminisher)),
            None => self
                .polarity(&key)
                .map(|w| entry(w, TermCategory::Polarity)),
        }
    }

    pub fn stats(&self) -> LexiconStats {
        LexiconStats {
            polarity: self.polarity.len(),
            negators: self.negators.len(),
            intensifiers: self.intensifiers.len(),
            diminishers: self.diminishers.len(),
            slang: self.slang.len(),
            stopwords: self.stopwords.len(),
        }
    }
}

fn build_slang(
    raw: BTreeMap<String, String>,
) -> Result<HashMap<String, Vec<String>>, LexiconLoadError> {
    let mut slang: HashMap<String, Vec<String>> = HashMap::with_capacity(raw.len());

    for (term, canonical) in raw {
        let key_tokens = term_tokens(&term);
        let [key] = key_tokens.as_slice() else {
            // e.g. "!!" or "o k": no single token to match against
            warn!(target: "lexicon", %term, "slang key is not a single token; skipped");
            continue;
        };

        let parts: Vec<String> = canonical.split_whitespace().map(str::to_string).collect();
        if parts.is_empty() {
            return Err(LexiconLoadError::InvalidSlang {
                term,
                canonical,
                reason: "canonical form is empty",
            });
        }
        if parts.iter().any(|p| term_tokens(p).as_slice() != std::slice::from_ref(p)) {
            return Err(LexiconLoadError::InvalidSlang {
                term,
                canonical,
                reason: "canonical form must be lowercase words without punctuation or elongation",
            });
        }
        if parts.len() == 1 && &parts[0] == key {
            continue; // identity mapping
        }
        if slang.insert(key.clone(), parts).is_some() {
            return Err(LexiconLoadError::DuplicateTerm {
                category: "slang",
                term: key.clone(),
            });
        }
    }

    // No chains: a canonical word must not be rewritten again.
    let mut keys: Vec<&String> = slang.keys().collect();
    keys.sort();
    for key in keys {
        if let Some(part) = slang[key].iter().find(|p| slang.contains_key(*p)) {
            return Err(LexiconLoadError::InvalidSlang {
                term: key.clone(),
                canonical: slang[key].join(" "),
                reason: if part == key {
                    "canonical form contains its own slang key"
                } else {
                    "canonical form is itself a slang key"
                },
            });
        }
    }

    Ok(slang)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "polarity": { "Bagus": 2, "jelek": -2, "gak sesuai": -2, "worth it": 2 },
        "negators": ["tidak", "bukan"],
        "intensifiers": { "sangat": { "factor": 1.5, "position": "before" }, "banget": 1.5 },
        "diminishers": { "agak": 0.5 },
        "slang": { "gak": "tidak", "bgt": "banget", "sih": "sih", "u/": "untuk" }
    }"#;

    #[test]
    fn loads_and_normalizes_keys() {
        let lex = LexiconStore::from_json_str(MINIMAL).unwrap();
        assert_eq!(lex.polarity("bagus"), Some(2.0));
        assert_eq!(lex.polarity("tidak sesuai"), Some(-2.0), "slang applied to phrase keys");
        assert_eq!(lex.max_phrase_len(), 2);
        assert!(lex.is_negator("tidak"));
        assert_eq!(
            lex.intensifier("sangat").map(|s| s.position),
            Some(ModifierPosition::Before)
        );
        assert_eq!(
            lex.intensifier("banget").map(|s| s.position),
            Some(ModifierPosition::Any)
        );
        assert_eq!(lex.slang("bgt"), Some(&["banget".to_string()][..]));
        assert_eq!(lex.slang("sih"), None, "identity mappings are dropped");
        assert!(lex.is_stopword("yang"), "built-in stopwords when section is absent");
    }

    #[test]
    fn tagged_lookup_prefers_modifier_role() {
        let json = r#"{
            "polarity": { "kurang": -1, "bagus": 2 },
            "negators": ["tidak"],
            "intensifiers": {},
            "diminishers": { "kurang": 0.5 },
            "slang": {}
        }"#;
        let lex = LexiconStore::from_json_str(json).unwrap();
        let e = lex.lookup("KURANG").unwrap();
        assert_eq!(e.category, TermCategory::Diminisher);
        assert_eq!(lex.lookup("Bagus").unwrap().weight, 2.0);
        assert!(lex.lookup("meja").is_none());
    }

    #[test]
    fn missing_category_is_reported_by_name() {
        let json = r#"{ "polarity": { "bagus": 2 }, "negators": [], "intensifiers": {}, "slang": {} }"#;
        let err = LexiconStore::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            LexiconLoadError::MissingCategory { category: "diminishers" }
        ));
        assert_eq!(err.category(), "diminishers");
    }

    #[test]
    fn empty_polarity_is_rejected() {
        let json = r#"{ "polarity": {}, "negators": [], "intensifiers": {}, "diminishers": {}, "slang": {} }"#;
        assert!(matches!(
            LexiconStore::from_json_str(json),
            Err(LexiconLoadError::EmptyCategory { category: "polarity" })
        ));
    }

    #[test]
    fn duplicates_after_folding_are_rejected() {
        let json = r#"{ "polarity": { "bagus": 2, "BAGUUUS": 3 }, "negators": [], "intensifiers": {}, "diminishers": {}, "slang": {} }"#;
        match LexiconStore::from_json_str(json) {
            Err(LexiconLoadError::DuplicateTerm { category, term }) => {
                assert_eq!(category, "polarity");
                assert_eq!(term, "bagus");
            }
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn slang_chains_are_rejected() {
        let json = r#"{ "polarity": { "bagus": 2 }, "negators": [], "intensifiers": {}, "diminishers": {},
                        "slang": { "gk": "gak", "gak": "tidak" } }"#;
        assert!(matches!(
            LexiconStore::from_json_str(json),
            Err(LexiconLoadError::InvalidSlang { .. })
        ));
    }

    #[test]
    fn bad_factors_and_versions_are_rejected() {
        let json = r#"{ "polarity": { "bagus": 2 }, "negators": [], "intensifiers": { "sangat": 0.5 }, "diminishers": {}, "slang": {} }"#;
        assert!(matches!(
            LexiconStore::from_json_str(json),
            Err(LexiconLoadError::InvalidWeight { category: "intensifiers", .. })
        ));

        let json = r#"{ "version": 7, "polarity": { "bagus": 2 }, "negators": [], "intensifiers": {}, "diminishers": {}, "slang": {} }"#;
        assert!(matches!(
            LexiconStore::from_json_str(json),
            Err(LexiconLoadError::UnsupportedVersion { found: 7, .. })
        ));

        assert!(matches!(
            LexiconStore::from_json_str("{ not json"),
            Err(LexiconLoadError::Malformed(_))
        ));
    }

    #[test]
    fn multi_word_modifiers_are_rejected() {
        let json = r#"{ "polarity": { "bagus": 2 }, "negators": ["tidak sama sekali"], "intensifiers": {}, "diminishers": {}, "slang": {} }"#;
        assert!(matches!(
            LexiconStore::from_json_str(json),
            Err(LexiconLoadError::MultiWordModifier { category: "negators", .. })
        ));
    }
}
