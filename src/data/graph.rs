use log::warn;

use super::model::{EventBatch, GraphRecord};
use crate::config::GraphConfig;
use crate::kinematics::pair_features;

// ---------------------------------------------------------------------------
// Graph Builder – one fully-connected (minus self-loops) graph per event
// ---------------------------------------------------------------------------

/// Build one [`GraphRecord`] per filtered event, in event order.
///
/// Pure and stateless per event. Events still below `min_jets` here are
/// skipped with a warning rather than failing the run (the filter should
/// have removed them already).
pub fn build_graphs(batch: &EventBatch, cfg: &GraphConfig) -> Vec<GraphRecord> {
    let mut records = Vec::with_capacity(batch.len());
    for i in 0..batch.len() {
        if batch.n_jets(i) < cfg.min_jets {
            warn!("less than {} jets; skipping event", cfg.min_jets);
            continue;
        }
        records.push(build_event_graph(batch, i));
    }
    records
}

/// Graph construction for a single event.
///
/// Edge enumeration is the row-major Cartesian product of the surviving-jet
/// indices with itself, self-pairs removed: (0,1), (0,2), .., (1,0), (1,2),
/// .. — the same ordering aligns edge features, indices and labels.
fn build_event_graph(batch: &EventBatch, i: usize) -> GraphRecord {
    let pt = &batch.jet_pt[i];
    let eta = &batch.jet_eta[i];
    let phi = &batch.jet_phi[i];
    let btag = &batch.jet_btag[i];
    let jet_id = &batch.jet_id[i];
    let higgs_idx = &batch.jet_higgs_idx[i];
    // Parent kinematics (batch.higgs_*) are carried through the batch for
    // future matching criteria; the current features and labels ignore them.

    let k = pt.len();

    // Node features fix the node index assignment: position in the filtered
    // arrays is the node id.
    let node_features: Vec<[f64; 5]> = (0..k)
        .map(|j| [pt[j].ln(), eta[j], phi[j], btag[j], jet_id[j]])
        .collect();

    // k may be 0 or 1 when min_jets is configured that low.
    let n_edges = k * k.saturating_sub(1);
    let mut edge_index = Vec::with_capacity(n_edges);
    let mut edge_features = Vec::with_capacity(n_edges);
    let mut edge_labels = Vec::with_capacity(n_edges);

    for a in 0..k {
        for b in 0..k {
            if a == b {
                continue;
            }
            edge_index.push((a as u32, b as u32));
            edge_features
                .push(pair_features(pt[a], eta[a], phi[a], pt[b], eta[b], phi[b]).as_array());
            // Matched pair: both jets point at the same (positive) parent.
            let matched = higgs_idx[a] > 0 && higgs_idx[a] == higgs_idx[b];
            edge_labels.push(matched as i64);
        }
    }

    GraphRecord {
        node_features,
        edge_index,
        edge_features,
        edge_labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A filtered six-jet event; jets 2 and 4 share parent 2.
    fn six_jet_batch() -> EventBatch {
        EventBatch {
            jet_pt: vec![vec![120.0, 100.0, 80.0, 60.0, 40.0, 25.0]],
            jet_eta: vec![vec![0.0, 0.5, -0.5, 1.2, -1.2, 2.0]],
            jet_phi: vec![vec![0.1, 1.0, -1.0, 2.5, -2.5, 3.0]],
            jet_btag: vec![vec![0.95, 0.9, 0.8, 0.7, 0.6, 0.5]],
            jet_id: vec![vec![6.0, 6.0, 6.0, 2.0, 2.0, 2.0]],
            jet_higgs_idx: vec![vec![0, 0, 2, 0, 2, 0]],
            jet_hadron_flavor: vec![vec![5; 6]],
            higgs_pt: vec![vec![250.0, 200.0, 150.0]],
            higgs_eta: vec![vec![0.0, 1.0, -1.0]],
            higgs_phi: vec![vec![0.5, -0.5, 2.0]],
        }
    }

    #[test]
    fn six_jets_make_thirty_edges_without_self_loops() {
        let records = build_graphs(&six_jet_batch(), &GraphConfig::default());
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.num_nodes(), 6);
        assert_eq!(rec.num_edges(), 6 * 5);
        assert!(rec.edge_index.iter().all(|&(a, b)| a != b));
        assert_eq!(rec.edge_features.len(), rec.num_edges());
        assert_eq!(rec.edge_labels.len(), rec.num_edges());
    }

    #[test]
    fn edge_enumeration_is_row_major() {
        let records = build_graphs(&six_jet_batch(), &GraphConfig::default());
        let idx = &records[0].edge_index;
        assert_eq!(idx[0], (0, 1));
        assert_eq!(idx[1], (0, 2));
        assert_eq!(idx[4], (0, 5));
        assert_eq!(idx[5], (1, 0));
        assert_eq!(*idx.last().unwrap(), (5, 4));
    }

    #[test]
    fn only_the_matched_pair_is_labeled_in_both_directions() {
        let records = build_graphs(&six_jet_batch(), &GraphConfig::default());
        let rec = &records[0];
        let labeled: Vec<(u32, u32)> = rec
            .edge_index
            .iter()
            .zip(&rec.edge_labels)
            .filter(|(_, &y)| y == 1)
            .map(|(&e, _)| e)
            .collect();
        assert_eq!(labeled, vec![(2, 4), (4, 2)]);
    }

    #[test]
    fn zero_match_index_never_labels() {
        // All jets unmatched: index 0 is the neutral sentinel, so even equal
        // indices must not produce a positive label.
        let mut batch = six_jet_batch();
        batch.jet_higgs_idx = vec![vec![0; 6]];
        let records = build_graphs(&batch, &GraphConfig::default());
        assert!(records[0].edge_labels.iter().all(|&y| y == 0));
    }

    #[test]
    fn node_features_are_log_pt_first() {
        let batch = six_jet_batch();
        let records = build_graphs(&batch, &GraphConfig::default());
        let x = &records[0].node_features;
        for (j, row) in x.iter().enumerate() {
            assert_eq!(row[0], batch.jet_pt[0][j].ln());
            assert_eq!(row[1], batch.jet_eta[0][j]);
            assert_eq!(row[2], batch.jet_phi[0][j]);
            assert_eq!(row[3], batch.jet_btag[0][j]);
            assert_eq!(row[4], batch.jet_id[0][j]);
        }
    }

    #[test]
    fn thin_event_is_skipped_not_failed() {
        let mut batch = six_jet_batch();
        // Truncate to 2 jets, bypassing the filter's guarantee.
        for col in [
            &mut batch.jet_pt,
            &mut batch.jet_eta,
            &mut batch.jet_phi,
            &mut batch.jet_btag,
            &mut batch.jet_id,
        ] {
            col[0].truncate(2);
        }
        batch.jet_higgs_idx[0].truncate(2);
        batch.jet_hadron_flavor[0].truncate(2);

        let records = build_graphs(&batch, &GraphConfig::default());
        assert!(records.is_empty());
    }

    #[test]
    fn zero_jet_event_with_no_minimum_builds_an_empty_graph() {
        let mut batch = six_jet_batch();
        for col in [
            &mut batch.jet_pt,
            &mut batch.jet_eta,
            &mut batch.jet_phi,
            &mut batch.jet_btag,
            &mut batch.jet_id,
        ] {
            col[0].clear();
        }
        batch.jet_higgs_idx[0].clear();
        batch.jet_hadron_flavor[0].clear();

        let cfg = GraphConfig {
            min_jets: 0,
            ..GraphConfig::default()
        };
        let records = build_graphs(&batch, &cfg);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].num_nodes(), 0);
        assert_eq!(records[0].num_edges(), 0);
    }

    #[test]
    fn rebuilding_is_deterministic() {
        let batch = six_jet_batch();
        let cfg = GraphConfig::default();
        assert_eq!(build_graphs(&batch, &cfg), build_graphs(&batch, &cfg));
    }
}
