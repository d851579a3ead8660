//! Writes a small synthetic HHH→6b ntuple usable as pipeline input:
//! three Higgs per event, each decaying to two b-jets, plus a few soft or
//! untagged extras, padded to the fixed slot count.
//!
//! Usage: `generate-sample [ROOT] [N_EVENTS]` — writes
//! `ROOT/raw/GluGluToHHHTo6B_SM.parquet` (ROOT defaults to `.`).

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use hhh_graph::config::GraphConfig;
use hhh_graph::data::schema;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One generated jet before slot assignment.
#[derive(Clone, Copy)]
struct GenJet {
    pt: f64,
    eta: f64,
    phi: f64,
    btag: f64,
    jet_id: i64,
    higgs_idx: i64,
    hadron_flavor: i64,
}

fn wrap_phi(phi: f64) -> f64 {
    let mut p = phi;
    while p > std::f64::consts::PI {
        p -= 2.0 * std::f64::consts::PI;
    }
    while p <= -std::f64::consts::PI {
        p += 2.0 * std::f64::consts::PI;
    }
    p
}

fn generate_event(cfg: &GraphConfig, rng: &mut SimpleRng) -> (Vec<GenJet>, Vec<(f64, f64, f64)>) {
    let mut higgses = Vec::with_capacity(cfg.n_parents);
    let mut jets: Vec<GenJet> = Vec::new();

    for h in 1..=cfg.n_parents {
        let h_pt = 120.0 + 180.0 * rng.next_f64();
        let h_eta = rng.gauss(0.0, 1.2);
        let h_phi = wrap_phi(-std::f64::consts::PI + 2.0 * std::f64::consts::PI * rng.next_f64());
        higgses.push((h_pt, h_eta, h_phi));

        // Two b-jets close to the parent direction.
        for _ in 0..2 {
            jets.push(GenJet {
                pt: (h_pt / 2.0 + rng.gauss(0.0, 15.0)).max(5.0),
                eta: h_eta + rng.gauss(0.0, 0.4),
                phi: wrap_phi(h_phi + rng.gauss(0.0, 0.4)),
                btag: 0.7 + 0.3 * rng.next_f64(),
                jet_id: 6,
                higgs_idx: h as i64,
                hadron_flavor: 5,
            });
        }
    }

    // A few unmatched extras, some of them below the pt cut.
    let n_extra = (rng.next_u64() % 4) as usize;
    for _ in 0..n_extra {
        jets.push(GenJet {
            pt: 10.0 + 50.0 * rng.next_f64(),
            eta: rng.gauss(0.0, 2.0),
            phi: wrap_phi(-std::f64::consts::PI + 2.0 * std::f64::consts::PI * rng.next_f64()),
            btag: 0.4 * rng.next_f64(),
            jet_id: 6,
            higgs_idx: -1,
            hadron_flavor: if rng.next_f64() < 0.2 { 4 } else { 0 },
        });
    }

    // Hardest jet first, like a real ntuple; truncate or zero-pad to n_obj.
    jets.sort_by(|a, b| b.pt.total_cmp(&a.pt));
    jets.truncate(cfg.n_obj);
    while jets.len() < cfg.n_obj {
        jets.push(GenJet {
            pt: 0.0,
            eta: 0.0,
            phi: 0.0,
            btag: 0.0,
            jet_id: 0,
            higgs_idx: -1,
            hadron_flavor: 0,
        });
    }

    (jets, higgses)
}

fn main() {
    let mut args = std::env::args().skip(1);
    let root = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let n_events: usize = args
        .next()
        .map(|s| s.parse().expect("N_EVENTS must be an integer"))
        .unwrap_or(200);

    let cfg = GraphConfig::default();
    let mut rng = SimpleRng::new(42);

    // Column name → per-event values, filled in schema order.
    let mut float_cols: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut int_cols: BTreeMap<String, Vec<i64>> = BTreeMap::new();

    for _ in 0..n_events {
        let (jets, higgses) = generate_event(&cfg, &mut rng);

        for (slot, jet) in jets.iter().enumerate() {
            let i = slot + 1;
            let mut push_f = |template: &str, v: f64| {
                float_cols.entry(schema::branch(template, i)).or_default().push(v)
            };
            push_f(schema::JET_PT, jet.pt);
            push_f(schema::JET_ETA, jet.eta);
            push_f(schema::JET_PHI, jet.phi);
            push_f(schema::JET_BTAG, jet.btag);
            let mut push_i = |template: &str, v: i64| {
                int_cols.entry(schema::branch(template, i)).or_default().push(v)
            };
            push_i(schema::JET_ID, jet.jet_id);
            push_i(schema::JET_HIGGS_IDX, jet.higgs_idx);
            push_i(schema::JET_HADRON_FLAVOR, jet.hadron_flavor);
        }
        for (h, &(h_pt, h_eta, h_phi)) in higgses.iter().enumerate() {
            let i = h + 1;
            let mut push_f = |template: &str, v: f64| {
                float_cols.entry(schema::branch(template, i)).or_default().push(v)
            };
            push_f(schema::HIGGS_PT, h_pt);
            push_f(schema::HIGGS_ETA, h_eta);
            push_f(schema::HIGGS_PHI, h_phi);
        }
    }

    // Assemble the record batch in declared branch order.
    let mut fields = Vec::new();
    let mut arrays: Vec<ArrayRef> = Vec::new();
    for name in schema::all_branches(cfg.n_obj, cfg.n_parents) {
        if let Some(vals) = float_cols.remove(&name) {
            fields.push(Field::new(&name, DataType::Float64, false));
            arrays.push(Arc::new(Float64Array::from(vals)));
        } else {
            let vals = int_cols.remove(&name).expect("branch not generated");
            fields.push(Field::new(&name, DataType::Int64, false));
            arrays.push(Arc::new(Int64Array::from(vals)));
        }
    }
    let arrow_schema = Arc::new(Schema::new(fields));
    let batch =
        RecordBatch::try_new(arrow_schema.clone(), arrays).expect("Failed to create RecordBatch");

    let raw_dir = root.join("raw");
    std::fs::create_dir_all(&raw_dir).expect("Failed to create raw directory");
    let output_path = raw_dir.join(&cfg.sources[0]);
    let file = std::fs::File::create(&output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, arrow_schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {n_events} events ({} jet slots each) to {}",
        cfg.n_obj,
        output_path.display()
    );
}
