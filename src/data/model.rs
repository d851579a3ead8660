//! Core data types: the columnar event batch and the per-event graph record.

// ---------------------------------------------------------------------------
// EventBatch – struct-of-columns, one inner Vec per event
// ---------------------------------------------------------------------------

/// A batch of events as parallel per-event columns.
///
/// Fresh from the loader every jet column has exactly `n_obj` entries per
/// event (padded slots included); after filtering the jet rows are
/// variable-length. Index alignment across all jet columns, and across all
/// parent columns, is an invariant maintained by every transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventBatch {
    // Jet columns, one row per event.
    pub jet_pt: Vec<Vec<f64>>,
    pub jet_eta: Vec<Vec<f64>>,
    pub jet_phi: Vec<Vec<f64>>,
    pub jet_btag: Vec<Vec<f64>>,
    pub jet_id: Vec<Vec<f64>>,
    pub jet_higgs_idx: Vec<Vec<i64>>,
    pub jet_hadron_flavor: Vec<Vec<i64>>,

    // Parent (Higgs) columns, always n_parents wide.
    pub higgs_pt: Vec<Vec<f64>>,
    pub higgs_eta: Vec<Vec<f64>>,
    pub higgs_phi: Vec<Vec<f64>>,
}

impl EventBatch {
    /// Number of events in the batch.
    pub fn len(&self) -> usize {
        self.jet_pt.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jet_pt.is_empty()
    }

    /// Append another batch, preserving event order (sources concatenate in
    /// configured list order).
    pub fn extend(&mut self, other: EventBatch) {
        self.jet_pt.extend(other.jet_pt);
        self.jet_eta.extend(other.jet_eta);
        self.jet_phi.extend(other.jet_phi);
        self.jet_btag.extend(other.jet_btag);
        self.jet_id.extend(other.jet_id);
        self.jet_higgs_idx.extend(other.jet_higgs_idx);
        self.jet_hadron_flavor.extend(other.jet_hadron_flavor);
        self.higgs_pt.extend(other.higgs_pt);
        self.higgs_eta.extend(other.higgs_eta);
        self.higgs_phi.extend(other.higgs_phi);
    }

    /// Surviving-jet count of event `i`.
    pub fn n_jets(&self, i: usize) -> usize {
        self.jet_pt[i].len()
    }
}

// ---------------------------------------------------------------------------
// GraphRecord – one training example
// ---------------------------------------------------------------------------

/// One graph per event: k jet nodes, every ordered pair (i, j), i ≠ j, as a
/// directed edge. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRecord {
    /// Node features, one `[ln pt, eta, phi, btag, jet_id]` row per jet, in
    /// filtered-array order (this fixes node index assignment).
    pub node_features: Vec<[f64; 5]>,
    /// (source, target) node positions, row-major Cartesian order.
    pub edge_index: Vec<(u32, u32)>,
    /// Edge features aligned with `edge_index` (see `kinematics::PairFeatures`).
    pub edge_features: Vec<[f64; 7]>,
    /// 1 when both endpoints share the same positive parent index, else 0.
    pub edge_labels: Vec<i64>,
}

impl GraphRecord {
    pub fn num_nodes(&self) -> usize {
        self.node_features.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edge_index.len()
    }
}

// ---------------------------------------------------------------------------
// ConversionStats – the pipeline's diagnostic sink
// ---------------------------------------------------------------------------

/// Counters accumulated over one conversion run and returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionStats {
    /// Events materialized from all sources (after the entry window).
    pub events_read: usize,
    /// Padded / below-threshold jet slots stripped in filtering.
    pub jets_removed: usize,
    /// Events dropped for having fewer surviving jets than the minimum.
    pub events_dropped: usize,
    /// Graph records written to the artifact.
    pub records_written: usize,
}
