//! End-to-end pipeline tests: JSON ntuple in, parquet graph artifact out.

use std::path::Path;

use serde_json::{Map, Value, json};

use hhh_graph::config::{EntryWindow, GraphConfig};
use hhh_graph::data::schema;
use hhh_graph::data::writer::read_graph_file;
use hhh_graph::pipeline::{artifact_up_to_date, convert};

/// (pt, eta, phi, btag, jet_id, higgs_idx, hadron_flavor)
type Jet = (f64, f64, f64, f64, i64, i64, i64);

const PAD: Jet = (0.0, 0.0, 0.0, 0.0, 0, -1, 0);

fn event_json(jets: &[Jet], cfg: &GraphConfig) -> Value {
    let mut obj = Map::new();
    for slot in 0..cfg.n_obj {
        let i = slot + 1;
        let (pt, eta, phi, btag, jet_id, higgs_idx, flavor) =
            jets.get(slot).copied().unwrap_or(PAD);
        obj.insert(schema::branch(schema::JET_PT, i), json!(pt));
        obj.insert(schema::branch(schema::JET_ETA, i), json!(eta));
        obj.insert(schema::branch(schema::JET_PHI, i), json!(phi));
        obj.insert(schema::branch(schema::JET_BTAG, i), json!(btag));
        obj.insert(schema::branch(schema::JET_ID, i), json!(jet_id));
        obj.insert(schema::branch(schema::JET_HIGGS_IDX, i), json!(higgs_idx));
        obj.insert(schema::branch(schema::JET_HADRON_FLAVOR, i), json!(flavor));
    }
    for h in 1..=cfg.n_parents {
        obj.insert(schema::branch(schema::HIGGS_PT, h), json!(200.0 + h as f64));
        obj.insert(schema::branch(schema::HIGGS_ETA, h), json!(0.1 * h as f64));
        obj.insert(schema::branch(schema::HIGGS_PHI, h), json!(-0.2 * h as f64));
    }
    Value::Object(obj)
}

fn test_config() -> GraphConfig {
    GraphConfig {
        sources: vec!["events.json".to_string()],
        ..GraphConfig::default()
    }
}

/// Three-event fixture:
/// * event 0 – 10 slots, 4 below threshold; jets at slots 1 and 3 share
///   parent 2 with hadron flavor 5;
/// * event 1 – only 5 jets above threshold (dropped);
/// * event 2 – six good jets, one claiming parent 1 without b flavor.
fn write_fixture(root: &Path, cfg: &GraphConfig) {
    let event0 = vec![
        (150.0, 0.0, 0.0, 0.9, 6, 0, 5),
        (120.0, 0.5, 1.0, 0.95, 6, 2, 5),
        (15.0, 1.0, 2.0, 0.1, 0, -1, 0),
        (100.0, -0.5, -1.0, 0.9, 6, 2, 5),
        (80.0, 1.5, 2.5, 0.3, 6, -1, 0),
        (60.0, -1.5, -2.5, 0.4, 6, -1, 0),
        (40.0, 2.0, 3.0, 0.2, 6, -1, 0),
        PAD,
        PAD,
        (10.0, 0.2, 0.3, 0.0, 0, -1, 0),
    ];
    let event1 = vec![
        (100.0, 0.0, 0.0, 0.9, 6, 1, 5),
        (90.0, 0.1, 0.1, 0.9, 6, 1, 5),
        (80.0, 0.2, 0.2, 0.9, 6, 2, 5),
        (70.0, 0.3, 0.3, 0.9, 6, 2, 5),
        (60.0, 0.4, 0.4, 0.9, 6, 3, 5),
    ];
    let event2 = vec![
        (110.0, 0.0, 0.5, 0.9, 6, 1, 5),
        (105.0, 0.3, -0.5, 0.8, 6, 1, 4), // not b-flavored: match must vanish
        (95.0, -0.3, 1.5, 0.7, 6, 0, 5),
        (85.0, 0.6, -1.5, 0.6, 6, 0, 5),
        (75.0, -0.6, 2.5, 0.5, 6, 0, 0),
        (65.0, 0.9, -2.5, 0.4, 6, 0, 0),
    ];

    let body = Value::Array(vec![
        event_json(&event0, cfg),
        event_json(&event1, cfg),
        event_json(&event2, cfg),
    ]);
    let raw_dir = root.join("raw");
    std::fs::create_dir_all(&raw_dir).unwrap();
    std::fs::write(raw_dir.join("events.json"), body.to_string()).unwrap();
}

#[test]
fn full_conversion_produces_expected_records() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config();
    write_fixture(dir.path(), &cfg);

    let stats = convert(dir.path(), &cfg, EntryWindow::default()).unwrap();
    assert_eq!(stats.events_read, 3);
    assert_eq!(stats.events_dropped, 1);
    assert_eq!(stats.records_written, 2);

    let records = read_graph_file(&cfg.processed_path(dir.path())).unwrap();
    assert_eq!(records.len(), 2);

    // Event 0: 6 surviving jets → 30 directed edges, no self-loops.
    let rec0 = &records[0];
    assert_eq!(rec0.num_nodes(), 6);
    assert_eq!(rec0.num_edges(), 30);
    assert!(rec0.edge_index.iter().all(|&(a, b)| a != b));

    // The matched pair sat at slots 1 and 3; after the pt mask (slot 2
    // removed) they are nodes 1 and 2. Both directions labeled, nothing else.
    let labeled: Vec<(u32, u32)> = rec0
        .edge_index
        .iter()
        .zip(&rec0.edge_labels)
        .filter(|(_, &y)| y == 1)
        .map(|(&e, _)| e)
        .collect();
    assert_eq!(labeled, vec![(1, 2), (2, 1)]);

    // Event 2: the non-b "match" was neutralized, so no edge is labeled.
    let rec1 = &records[1];
    assert_eq!(rec1.num_nodes(), 6);
    assert!(rec1.edge_labels.iter().all(|&y| y == 0));
}

#[test]
fn node_features_follow_filtered_order() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config();
    write_fixture(dir.path(), &cfg);
    convert(dir.path(), &cfg, EntryWindow::default()).unwrap();

    let records = read_graph_file(&cfg.processed_path(dir.path())).unwrap();
    // Event 0's surviving pts in slot order.
    let expected_pt = [150.0f64, 120.0, 100.0, 80.0, 60.0, 40.0];
    for (row, pt) in records[0].node_features.iter().zip(expected_pt) {
        assert!((row[0] - pt.ln()).abs() < 1e-12);
    }
}

#[test]
fn entry_window_limits_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config();
    write_fixture(dir.path(), &cfg);

    let window = EntryWindow { start: Some(0), stop: Some(2) };
    let stats = convert(dir.path(), &cfg, window).unwrap();
    assert_eq!(stats.events_read, 2);
    assert_eq!(stats.records_written, 1);
}

#[test]
fn rerun_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config();
    write_fixture(dir.path(), &cfg);

    convert(dir.path(), &cfg, EntryWindow::default()).unwrap();
    let first = read_graph_file(&cfg.processed_path(dir.path())).unwrap();

    convert(dir.path(), &cfg, EntryWindow::default()).unwrap();
    let second = read_graph_file(&cfg.processed_path(dir.path())).unwrap();

    assert_eq!(first, second);
}

#[test]
fn up_to_date_artifact_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config();
    write_fixture(dir.path(), &cfg);

    assert!(!artifact_up_to_date(dir.path(), &cfg));
    convert(dir.path(), &cfg, EntryWindow::default()).unwrap();
    assert!(artifact_up_to_date(dir.path(), &cfg));

    std::fs::remove_file(cfg.processed_path(dir.path())).unwrap();
    assert!(!artifact_up_to_date(dir.path(), &cfg));
}

#[test]
fn fatal_load_error_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = test_config(); // raw/events.json never written

    let err = convert(dir.path(), &cfg, EntryWindow::default());
    assert!(err.is_err());
    assert!(!cfg.processed_path(dir.path()).exists());
}
