// tests/batch_properties.rs
//
// Randomized batches built from a small vocabulary of real-looking comment
// fragments. Checks properties rather than exact numbers.

mod common;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use indo_sentiment_analyzer::normalize::Normalizer;
use indo_sentiment_analyzer::{AnalyzerConfig, RawComment};

const FRAGMENTS: &[&str] = &[
    "bagus", "bgt", "gak", "jelek", "mantap", "😍", "❤️", "pengiriman", "lama", "sangat",
    "agak", "mahal", "murah", "tapi", "produknya", "baguuuus", "wkwkwk", "@budi",
    "https://shope.ee/abc", "#fyp", "kecewa", "sesuai", "tidak", "123", "org2", "u/",
    "makasih", "kak", "&amp;", "!!!", "ga", "worth", "it", "keren", "banget", "sekali",
    "Kereeen", "KECEWA", "😡", "👍🏽", "kata-kata", "lumayan",
];

fn random_comment(rng: &mut StdRng) -> String {
    let n = rng.random_range(0..10);
    (0..n)
        .map(|_| FRAGMENTS[rng.random_range(0..FRAGMENTS.len())])
        .collect::<Vec<_>>()
        .join(" ")
}

fn random_batch(seed: u64, n: usize) -> Vec<RawComment> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| RawComment::new(random_comment(&mut rng))).collect()
}

#[test]
fn percentages_sum_to_hundred() {
    let a = common::analyzer();
    for (seed, n) in [(1u64, 1usize), (2, 3), (3, 7), (4, 100), (5, 333)] {
        let s = a.analyze_batch(random_batch(seed, n)).summary();
        assert_eq!(s.total, n);
        assert_eq!(s.positive_count + s.negative_count + s.neutral_count, n);
        let sum = s.positive_pct + s.negative_pct + s.neutral_pct;
        assert!((sum - 100.0).abs() <= 0.15, "seed {seed}: pct sum {sum}");
    }
}

#[test]
fn parallel_matches_sequential_in_order() {
    let a = common::analyzer();
    let comments = random_batch(42, 257);
    let seq = a.analyze_batch(comments.clone());
    for workers in [2, 3, 8, 10_000, usize::MAX] {
        let par = a.analyze_batch_parallel(comments.clone(), workers);
        assert_eq!(par, seq, "workers = {workers}");
    }
}

#[test]
fn normalization_is_idempotent() {
    let lex = common::shipped_lexicon();
    let norm = Normalizer::new(lex, Default::default());
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let raw = random_comment(&mut rng);
        let once = norm.normalize(&raw);
        let twice = norm.normalize(&once.join(" "));
        assert_eq!(once, twice, "input: {raw:?}");
    }

    for raw in [
        "baa\u{200D}ag",
        "mantaa\u{FE0F}ap 👍🏽",
        "keren 🇮🇩🇮🇩 \u{1F1EE}",
        "seruu\u{1F3FB}u bgt",
    ] {
        let once = norm.normalize(raw);
        let twice = norm.normalize(&once.join(" "));
        assert_eq!(once, twice, "input: {raw:?}");
    }
}

#[test]
fn scores_are_rounded_and_labels_follow_sign() {
    let a = common::analyzer();
    for r in a.analyze_batch(random_batch(9, 200)).results {
        assert_eq!(r.score, (r.score * 1000.0).round() / 1000.0);
        let expected = a.classifier().classify(r.score);
        assert_eq!(r.label, expected);
    }
}

#[test]
fn report_covers_every_comment() {
    let a = common::analyzer();
    let batch = a.analyze_batch(random_batch(11, 120));
    let report = batch.report(a.lexicon(), &AnalyzerConfig::default().batch);

    let binned: usize = report.histogram.iter().map(|b| b.count).sum();
    assert_eq!(binned, 120);
    assert!(report.histogram.len() <= 20);
    assert!(report.top_words.len() <= 20);
    assert!(report
        .top_words
        .iter()
        .all(|w| w.word.chars().count() >= 3 && !a.lexicon().is_stopword(&w.word)));
    assert!(report
        .top_words
        .windows(2)
        .all(|w| w[0].count >= w[1].count));
}
