// tests/lexicon_load.rs
//
// Lexicon files on disk: the shipped one loads, broken ones fail with the
// variant naming what is wrong, and the app refuses to start on them.

mod common;

use std::fs;

use indo_sentiment_analyzer::lexicon::TermCategory;
use indo_sentiment_analyzer::{AnalyzerConfig, LexiconLoadError, LexiconStore};

fn write_tmp(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lexicon.json");
    fs::write(&path, contents).unwrap();
    (dir, path)
}

#[test]
fn shipped_lexicon_loads_with_all_categories() {
    let lex = common::shipped_lexicon();
    let stats = lex.stats();
    assert!(stats.polarity > 50, "polarity: {}", stats.polarity);
    assert!(stats.negators >= 3);
    assert!(stats.intensifiers >= 3);
    assert!(stats.diminishers >= 1);
    assert!(stats.slang > 50);
    assert_eq!(lex.version(), 1);

    assert_eq!(lex.lookup("BAGUS").map(|e| e.weight), Some(2.0));
    assert_eq!(
        lex.lookup("tidak").map(|e| e.category),
        Some(TermCategory::Negator)
    );
    let via_slang = lex.lookup("gak").expect("slang resolves to its canonical term");
    assert_eq!(via_slang.term, "tidak");
    assert_eq!(lex.lookup("pengirimannya"), None);
    assert_eq!(lex.slang("makasih").map(|c| c.join(" ")), Some("terima kasih".into()));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = LexiconStore::load(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, LexiconLoadError::Io { .. }), "{err:?}");
    assert_eq!(err.category(), "file");
}

#[test]
fn malformed_json_is_rejected() {
    let (_dir, path) = write_tmp(r#"{ "polarity": { "bagus": "two" } "#);
    let err = LexiconStore::load(&path).unwrap_err();
    assert!(matches!(err, LexiconLoadError::Malformed(_)), "{err:?}");
}

#[test]
fn missing_category_is_named() {
    let (_dir, path) = write_tmp(
        r#"{ "polarity": { "bagus": 2 }, "negators": [], "intensifiers": {}, "slang": {} }"#,
    );
    let err = LexiconStore::load(&path).unwrap_err();
    assert_eq!(err.category(), "diminishers");
    assert!(matches!(err, LexiconLoadError::MissingCategory { .. }));
}

#[test]
fn empty_polarity_is_rejected() {
    let (_dir, path) = write_tmp(
        r#"{ "polarity": {}, "negators": [], "intensifiers": {}, "diminishers": {}, "slang": {} }"#,
    );
    let err = LexiconStore::load(&path).unwrap_err();
    assert!(matches!(err, LexiconLoadError::EmptyCategory { category: "polarity" }));
}

#[test]
fn app_refuses_to_start_on_broken_lexicon() {
    let (_dir, path) = write_tmp("[]");
    let mut config = AnalyzerConfig::default();
    config.lexicon.path = path;
    let err = indo_sentiment_analyzer::app(config).unwrap_err();
    assert!(
        err.downcast_ref::<LexiconLoadError>().is_some(),
        "lexicon error must be in the chain: {err:#}"
    );
}
