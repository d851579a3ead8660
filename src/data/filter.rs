use log::debug;

use super::model::{ConversionStats, EventBatch};
use crate::config::GraphConfig;

// ---------------------------------------------------------------------------
// Event Filter – the ordered mask policy
// ---------------------------------------------------------------------------

/// Strip padded jets, drop thin events, and neutralize bogus parent matches.
///
/// The stages run in this exact order; later stages see already-trimmed
/// arrays, and one mask is applied to every jet column in lockstep so index
/// alignment holds at every step:
///
/// 1. remove jet slots with `pt <= min_jet_pt` (zero-padded slots included);
/// 2. drop whole events with fewer than `min_jets` surviving jets (parent
///    columns are row-filtered along);
/// 3. rewrite negative parent-match indices to 0 (originally unmatched);
/// 4. rewrite the match index to 0 wherever the hadron flavor is not 5, so
///    only genuine b-jet ghost-association matches survive.
///
/// An event losing every jet in stage 1 simply fails stage 2; that is not an
/// error.
pub fn filter_events(
    mut batch: EventBatch,
    cfg: &GraphConfig,
    stats: &mut ConversionStats,
) -> EventBatch {
    // Stage 1: per-slot pt mask, one mask per event, shared by all jet columns.
    let jet_masks: Vec<Vec<bool>> = batch
        .jet_pt
        .iter()
        .map(|row| row.iter().map(|&pt| pt > cfg.min_jet_pt).collect())
        .collect();
    stats.jets_removed += jet_masks
        .iter()
        .map(|m| m.iter().filter(|&&keep| !keep).count())
        .sum::<usize>();

    apply_jet_mask(&mut batch.jet_pt, &jet_masks);
    apply_jet_mask(&mut batch.jet_eta, &jet_masks);
    apply_jet_mask(&mut batch.jet_phi, &jet_masks);
    apply_jet_mask(&mut batch.jet_btag, &jet_masks);
    apply_jet_mask(&mut batch.jet_id, &jet_masks);
    apply_jet_mask(&mut batch.jet_higgs_idx, &jet_masks);
    apply_jet_mask(&mut batch.jet_hadron_flavor, &jet_masks);

    // Stage 2: event-level multiplicity mask, applied to every column.
    let keep: Vec<bool> = batch.jet_pt.iter().map(|row| row.len() >= cfg.min_jets).collect();
    let dropped = keep.iter().filter(|&&k| !k).count();
    if dropped > 0 {
        debug!("dropping {dropped} events with fewer than {} jets", cfg.min_jets);
    }
    stats.events_dropped += dropped;

    retain_events(&mut batch.jet_pt, &keep);
    retain_events(&mut batch.jet_eta, &keep);
    retain_events(&mut batch.jet_phi, &keep);
    retain_events(&mut batch.jet_btag, &keep);
    retain_events(&mut batch.jet_id, &keep);
    retain_events(&mut batch.jet_higgs_idx, &keep);
    retain_events(&mut batch.jet_hadron_flavor, &keep);
    retain_events(&mut batch.higgs_pt, &keep);
    retain_events(&mut batch.higgs_eta, &keep);
    retain_events(&mut batch.higgs_phi, &keep);

    // Stage 3: unmatched jets carry -1 in the source; 0 is the neutral
    // sentinel downstream.
    for row in &mut batch.jet_higgs_idx {
        for idx in row.iter_mut() {
            if *idx < 0 {
                *idx = 0;
            }
        }
    }

    // Stage 4: reject matches whose jet is not b-flavored, whatever stage 3
    // left in place.
    for (idx_row, flavor_row) in batch.jet_higgs_idx.iter_mut().zip(&batch.jet_hadron_flavor) {
        for (idx, &flavor) in idx_row.iter_mut().zip(flavor_row) {
            if flavor != 5 {
                *idx = 0;
            }
        }
    }

    batch
}

// ---------------------------------------------------------------------------
// Lockstep mask helpers
// ---------------------------------------------------------------------------

/// Apply one per-slot boolean mask per event to a jet column, preserving
/// order. Reused for every jet attribute so the columns stay aligned.
fn apply_jet_mask<T>(col: &mut [Vec<T>], masks: &[Vec<bool>]) {
    debug_assert_eq!(col.len(), masks.len());
    for (row, mask) in col.iter_mut().zip(masks) {
        debug_assert_eq!(row.len(), mask.len());
        let mut bits = mask.iter();
        row.retain(|_| *bits.next().unwrap());
    }
}

/// Row-filter a per-event column by an event-level keep mask.
fn retain_events<T>(col: &mut Vec<T>, keep: &[bool]) {
    debug_assert_eq!(col.len(), keep.len());
    let mut bits = keep.iter();
    col.retain(|_| *bits.next().unwrap());
}
