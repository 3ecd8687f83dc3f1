mod common;

use common::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use subscreen_core::{
    AccuracyReport, CancelToken, CanonicalKey, Corpus, CorpusBuilder, Evaluator, NoProgress,
    ScreenError, Stage, count_records,
};

fn build(records: Vec<Toy>, fingerprinter: &ToyFingerprinter) -> Corpus<Toy> {
    let mut builder = CorpusBuilder::<Toy>::new(fingerprinter, &ToyKeyer, &ToyFragmenter);
    for r in records {
        builder.add_record(r);
    }
    builder.finish()
}

/// 2 つの元構造が部分構造 "AB" を共有する
fn shared_substructure_records() -> Vec<Toy> {
    vec![
        Toy::new("ABC", &[1, 2, 3]).with_parts(vec![Toy::new("AB", &[1, 2]), Toy::new("BC", &[2, 3])]),
        Toy::new("ABD", &[1, 2, 4])
            .with_parts(vec![Toy::new("AB", &[1, 2, 9]), Toy::new("BD", &[2, 4])]),
    ]
}

#[test]
fn shared_fragments_are_deduplicated() {
    let fp = ToyFingerprinter::default();
    let corpus = build(shared_substructure_records(), &fp);

    assert_eq!(corpus.originals.len(), 2);
    assert_eq!(corpus.fragments.len(), 3);
    assert_eq!(corpus.stats.fragments_generated, 4);
    assert_eq!(corpus.stats.fragments_duplicate, 1);

    // 先に見つかった "AB" の指紋が残り、重複分は指紋計算すらしない
    let ab = corpus.fragments.get(&CanonicalKey::from("AB")).unwrap();
    assert!(!ab.fingerprint.get(9));
    assert_eq!(fp.calls(), 2 + 3);
}

#[test]
fn no_fragment_key_appears_twice() {
    let fp = ToyFingerprinter::default();
    let part = || Toy::new("XY", &[5]);
    let records = vec![
        Toy::new("XYZ", &[5, 6]).with_parts(vec![part(), part(), part()]),
        Toy::new("WXY", &[5, 7]).with_parts(vec![part()]),
    ];
    let corpus = build(records, &fp);
    let keys: Vec<_> = corpus.fragments.keys().cloned().collect();
    let mut dedup = keys.clone();
    dedup.dedup();
    assert_eq!(keys, dedup);
    assert_eq!(corpus.fragments.len(), 1);
    assert_eq!(corpus.stats.fragments_duplicate, 3);
}

#[test]
fn unkeyed_record_is_neither_original_nor_decomposed() {
    let fp = ToyFingerprinter::default();
    let records = vec![
        Toy::new("ABC", &[1, 2, 3]).with_parts(vec![Toy::new("AB", &[1, 2])]),
        Toy::unkeyed("QRS", &[7]).with_parts(vec![Toy::new("QR", &[7])]),
    ];
    let corpus = build(records, &fp);

    assert_eq!(corpus.originals.len(), 1);
    assert!(!corpus.fragments.contains_key(&CanonicalKey::from("QR")));
    assert_eq!(corpus.fragments.len(), 1);
    assert_eq!(corpus.stats.records, 2);
    assert_eq!(corpus.stats.originals_skipped, 1);
}

#[test]
fn unkeyed_fragment_is_skipped() {
    let fp = ToyFingerprinter::default();
    let records = vec![Toy::new("ABC", &[1, 2, 3])
        .with_parts(vec![Toy::unkeyed("AB", &[1]), Toy::new("BC", &[2, 3])])];
    let corpus = build(records, &fp);
    assert_eq!(corpus.fragments.len(), 1);
    assert_eq!(corpus.stats.fragments_skipped, 1);
}

#[test]
fn repeated_original_key_keeps_last_record() {
    let fp = ToyFingerprinter::default();
    let mut second = Toy::new("ABC", &[8]);
    second.text = "ABC-second".to_string();
    let corpus = build(vec![Toy::new("ABC", &[1]), second], &fp);
    assert_eq!(corpus.originals.len(), 1);
    assert_eq!(corpus.stats.originals_replaced, 1);
    let stored = corpus.originals.get(&CanonicalKey::from("ABC")).unwrap();
    assert_eq!(stored.structure.text, "ABC-second");
    assert!(stored.fingerprint.get(8));
}

#[test]
fn every_pair_is_classified_exactly_once() {
    let fp = ToyFingerprinter::default();
    let corpus = build(shared_substructure_records(), &fp);
    let outcome = Evaluator::new(&SubstringOracle).evaluate(&corpus).unwrap();
    let c = outcome.counters;
    assert_eq!(c.total, corpus.pair_count());
    assert_eq!(c.total, 3 * 2);
    assert!(c.is_consistent());
}

#[test]
fn oracle_is_called_with_original_as_container() {
    let fp = ToyFingerprinter::default();
    let records =
        vec![Toy::new("ABC", &[1, 2, 3]).with_parts(vec![Toy::new("AB", &[1, 2])])];
    let corpus = build(records, &fp);
    let outcome = Evaluator::new(&SubstringOracle).evaluate(&corpus).unwrap();
    // 逆向きに呼ぶと "AB" は "ABC" を含まないので偽陽性になる
    assert_eq!(outcome.counters.true_positive, 1);
    assert_eq!(outcome.counters.false_positive, 0);
}

#[test]
fn false_negative_is_observable() {
    let fp = ToyFingerprinter::default();
    // "AB" は "ABC" に含まれるが、指紋ビット 9 が元構造に無い
    let records =
        vec![Toy::new("ABC", &[1, 2, 3]).with_parts(vec![Toy::new("AB", &[1, 9])])];
    let corpus = build(records, &fp);
    let outcome = Evaluator::new(&SubstringOracle).evaluate(&corpus).unwrap();
    assert_eq!(outcome.counters.false_negative, 1);
    assert_eq!(outcome.false_negative_examples.len(), 1);
    assert_eq!(outcome.false_negative_examples[0].fragment, CanonicalKey::from("AB"));
    assert_eq!(outcome.false_negative_examples[0].original, CanonicalKey::from("ABC"));
}

#[test]
fn filter_always_passes_and_oracle_always_rejects() {
    let fp = ToyFingerprinter::default();
    // 空の指紋はすべての指紋の部分集合
    let records = vec![
        Toy::new("ABC", &[]).with_parts(vec![Toy::new("AB", &[]), Toy::new("BC", &[])]),
        Toy::new("XYZ", &[]).with_parts(vec![Toy::new("XY", &[])]),
    ];
    let corpus = build(records, &fp);
    let outcome = Evaluator::new(&NeverOracle).evaluate(&corpus).unwrap();
    let c = outcome.counters;
    assert_eq!(c.true_positive, 0);
    assert_eq!(c.false_positive, 3 * 2);
    assert_eq!(c.true_negative, 0);
    assert_eq!(c.false_negative, 0);

    let report = AccuracyReport::from_counters(c, 3);
    assert_eq!(report.accuracy.unwrap().to_string(), "0.000");
}

#[test]
fn empty_corpus_reports_undefined_accuracy() {
    let fp = ToyFingerprinter::default();
    let corpus = build(vec![Toy::new("ABC", &[1])], &fp);
    assert!(corpus.fragments.is_empty());
    let outcome = Evaluator::new(&SubstringOracle).evaluate(&corpus).unwrap();
    assert_eq!(outcome.counters.total, 0);
    let report = AccuracyReport::from_counters(outcome.counters, 3);
    assert!(report.accuracy.is_none());
}

fn random_records(seed: u64, n: usize) -> Vec<Toy> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let alphabet = ['A', 'B', 'C', 'D'];
    let word = |rng: &mut Xoshiro256PlusPlus, len: usize| -> String {
        (0..len).map(|_| alphabet[rng.random_range(0..alphabet.len())]).collect()
    };
    let bits = |rng: &mut Xoshiro256PlusPlus| -> Vec<usize> {
        (0..rng.random_range(0..6)).map(|_| rng.random_range(0..WIDTH)).collect()
    };
    (0..n)
        .map(|_| {
            let text = word(&mut rng, 6);
            let parts = (0..rng.random_range(0..4))
                .map(|_| {
                    let start = rng.random_range(0..4);
                    let len = rng.random_range(1..=2);
                    Toy::new(&text[start..start + len], &bits(&mut rng))
                })
                .collect();
            Toy::new(&text, &bits(&mut rng)).with_parts(parts)
        })
        .collect()
}

#[test]
fn parallel_and_sequential_evaluation_agree() {
    let fp = ToyFingerprinter::default();
    let corpus = build(random_records(7, 40), &fp);
    assert!(corpus.pair_count() > 0);

    let evaluator = Evaluator::new(&SubstringOracle).with_max_false_negative_examples(5);
    let sequential = evaluator.evaluate(&corpus).unwrap();
    let parallel = evaluator.evaluate_parallel(&corpus).unwrap();
    assert_eq!(sequential, parallel);
    assert_eq!(sequential.counters.total, corpus.pair_count());
    assert!(sequential.counters.is_consistent());
}

#[test]
fn cancelled_evaluation_returns_error() {
    let fp = ToyFingerprinter::default();
    let corpus = build(shared_substructure_records(), &fp);
    let cancel = CancelToken::new();
    cancel.cancel();
    let evaluator = Evaluator::new(&SubstringOracle).with_cancel(cancel);
    assert!(matches!(evaluator.evaluate(&corpus), Err(ScreenError::Cancelled)));
    assert!(matches!(evaluator.evaluate_parallel(&corpus), Err(ScreenError::Cancelled)));
}

#[test]
fn build_from_sources_reports_progress_per_source() {
    let reader = MemoryReader::default()
        .with_source("a.sdf", shared_substructure_records())
        .with_source("b.sdf", vec![Toy::new("XYZ", &[5])]);
    let sources = ["a.sdf", "b.sdf"];
    let total = count_records::<Toy, _, _>(&reader, &sources).unwrap();
    assert_eq!(total, 3);

    let fp = ToyFingerprinter::default();
    let progress = RecordingProgress::default();
    let corpus = CorpusBuilder::<Toy>::new(&fp, &ToyKeyer, &ToyFragmenter)
        .build_from_sources(&reader, &sources, total, &progress, &CancelToken::new())
        .unwrap();
    assert_eq!(corpus.originals.len(), 3);
    assert_eq!(progress.events_for(Stage::Generation), vec![(2, 3), (3, 3)]);

    Evaluator::new(&SubstringOracle).with_progress(&progress).evaluate(&corpus).unwrap();
    let analysis = progress.events_for(Stage::Analysis);
    assert_eq!(analysis.len(), corpus.fragments.len());
    assert_eq!(analysis.last(), Some(&(3, 3)));
}

#[test]
fn unreadable_source_is_fatal() {
    let reader = MemoryReader::default().with_source("a.sdf", shared_substructure_records());
    let sources = ["a.sdf", "missing.sdf"];
    assert!(matches!(count_records::<Toy, _, _>(&reader, &sources), Err(ScreenError::Io { .. })));

    let fp = ToyFingerprinter::default();
    let result = CorpusBuilder::<Toy>::new(&fp, &ToyKeyer, &ToyFragmenter).build_from_sources(
        &reader,
        &sources,
        2,
        &NoProgress,
        &CancelToken::new(),
    );
    assert!(matches!(result, Err(ScreenError::Io { .. })));
}

#[test]
fn cancelled_build_returns_error() {
    let reader = MemoryReader::default().with_source("a.sdf", shared_substructure_records());
    let cancel = CancelToken::new();
    cancel.cancel();
    let fp = ToyFingerprinter::default();
    let result = CorpusBuilder::<Toy>::new(&fp, &ToyKeyer, &ToyFragmenter)
        .build_from_sources(&reader, &["a.sdf"], 2, &NoProgress, &cancel);
    assert!(matches!(result, Err(ScreenError::Cancelled)));
}
