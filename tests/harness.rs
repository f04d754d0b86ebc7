//! Benchmark harness integration: matrices, records, persistence, and
//! run control.

use std::time::Duration;

use deltamin::{
    reduce_with_cancel, Algorithm, Benchmark, CacheKind, CancelToken, InnerReducer, ListInput,
    Node, RecordSet, ReduceConfig, Status, StringInput, TestCase, TreeModel, Verdict,
};

fn needs_two_markers(items: &Vec<u32>) -> Verdict {
    if items.contains(&40) && items.contains(&70) {
        Verdict::Fail
    } else {
        Verdict::Pass
    }
}

#[test]
fn matrix_emits_records_in_cell_order() {
    let mut benchmark = Benchmark::new(vec![TestCase::new(
        "markers",
        ListInput::new((0..100).collect()),
        vec![Algorithm::DdMin, Algorithm::TicTocMin, Algorithm::ProbDd],
        needs_two_markers,
    )
    .with_caches(vec![Some(CacheKind::Hash), Some(CacheKind::Tree)])]);

    let records = benchmark.run().unwrap();
    assert_eq!(records.len(), 6);

    let names: Vec<String> = records.iter().map(|r| r.reducer.clone()).collect();
    assert_eq!(
        names,
        ["ddmin", "ddmin", "tictocmin", "tictocmin", "probdd", "probdd"]
    );
    for record in records.iter() {
        assert_eq!(record.input, "markers");
        assert_eq!(record.initial_size, 100);
        assert_eq!(record.final_size, 2);
        assert_eq!(record.status, Status::Completed);
        assert!(record.queries > 0);
    }
}

#[test]
fn hierarchical_cells_run_on_tree_cases() {
    let tree = Node::branch(vec![
        Node::token("[").required(),
        Node::token("1"),
        Node::token("2"),
        Node::token("3"),
        Node::token("4"),
        Node::token("]").required(),
    ])
    .required();

    let mut benchmark = Benchmark::new(vec![TestCase::new(
        "bracketed",
        TreeModel::new(&tree),
        vec![
            Algorithm::Hdd(InnerReducer::DdMin),
            Algorithm::Hdd(InnerReducer::TicTocMin),
            Algorithm::DdMin,
        ],
        |s: &String| {
            if s.contains('3') {
                Verdict::Fail
            } else {
                Verdict::Pass
            }
        },
    )]);

    let records = benchmark.run().unwrap();
    assert_eq!(records.len(), 3);
    for record in records.iter() {
        assert_eq!(record.final_size, 1);
    }
    let names: Vec<String> = records.iter().map(|r| r.reducer.clone()).collect();
    assert_eq!(names, ["hdd(ddmin)", "hdd(tictocmin)", "ddmin"]);
}

#[test]
fn records_survive_a_disk_round_trip() {
    let mut benchmark = Benchmark::new(vec![TestCase::new(
        "markers",
        ListInput::new((0..50).collect()),
        vec![Algorithm::DdMin],
        needs_two_markers,
    )]);
    benchmark.run().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("records.json");
    benchmark.records().store(&path).unwrap();

    let loaded = RecordSet::load(&path).unwrap();
    assert_eq!(&loaded, benchmark.records());
}

#[test]
fn table_drops_uniform_identity_columns() {
    let mut benchmark = Benchmark::new(vec![TestCase::new(
        "markers",
        ListInput::new((0..60).collect()),
        vec![Algorithm::DdMin, Algorithm::TicTocMin],
        needs_two_markers,
    )]);
    benchmark.run().unwrap();

    let table = benchmark.records().to_table(true);
    assert!(table.contains("ddmin"));
    assert!(table.contains("tictocmin"));
    // One input and one cache across all rows: both columns vanish.
    assert!(!table.contains("markers"));
    assert!(!table.contains("hash"));

    let full_table = benchmark.records().to_table(false);
    assert!(full_table.contains("markers"));
    assert!(full_table.contains("hash"));
}

#[test]
fn validation_confirms_soundness_without_recording() {
    let benchmark = Benchmark::new(vec![TestCase::new(
        "markers",
        ListInput::new((0..40).collect()),
        vec![Algorithm::DdMin, Algorithm::TicTocMin, Algorithm::ProbDd],
        needs_two_markers,
    )]);

    let sound = benchmark.validate().unwrap();
    assert_eq!(sound.len(), 3);
    assert!(sound.into_iter().all(|s| s));
    assert!(benchmark.records().is_empty());
}

#[test]
fn per_cell_time_budget_reports_timeout() {
    let slow_oracle = |items: &Vec<u32>| {
        std::thread::sleep(Duration::from_millis(5));
        if items.contains(&8) {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    };

    let mut benchmark = Benchmark::with_config(
        vec![TestCase::new(
            "slow",
            ListInput::new((0..64).collect()),
            vec![Algorithm::DdMin],
            slow_oracle,
        )],
        ReduceConfig::default().with_time_budget(Duration::from_millis(20)),
    );

    let records = benchmark.run().unwrap();
    assert_eq!(records.len(), 1);
    let record = records.iter().next().unwrap();
    assert_eq!(record.status, Status::Timeout);
    // Whatever was returned still fails.
    assert!(record.final_size >= 1);
}

#[test]
fn cancellation_mid_run_yields_a_sound_partial_result() {
    let input = StringInput::chars("nnnnabcnnnn");
    let cancel = CancelToken::new();
    let trip = cancel.clone();
    let mut seen = 0u32;
    let oracle = move |s: &String| {
        seen += 1;
        if seen == 6 {
            trip.cancel();
        }
        if s.contains("abc") {
            Verdict::Fail
        } else {
            Verdict::Pass
        }
    };

    let result = reduce_with_cancel(
        &input,
        oracle,
        Algorithm::DdMin,
        &ReduceConfig::default(),
        cancel,
    )
    .unwrap();

    assert_eq!(result.status, Status::Cancelled);
    assert!(result.output.contains("abc"));
    assert!(result.final_size <= result.initial_size);
}

#[test]
fn lru_capped_cache_still_reduces_correctly() {
    let mut config = ReduceConfig::default();
    config.cache_capacity = Some(8);
    let mut benchmark = Benchmark::with_config(
        vec![TestCase::new(
            "capped",
            ListInput::new((0..30).collect()),
            vec![Algorithm::DdMin],
            needs_two_markers_small,
        )],
        config,
    );
    let records = benchmark.run().unwrap();
    let record = records.iter().next().unwrap();
    assert_eq!(record.final_size, 2);
    assert_eq!(record.status, Status::Completed);
}

fn needs_two_markers_small(items: &Vec<u32>) -> Verdict {
    if items.contains(&4) && items.contains(&27) {
        Verdict::Fail
    } else {
        Verdict::Pass
    }
}
