use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GraphConfig – every physics threshold and path, overridable without code
// ---------------------------------------------------------------------------

/// Conversion settings. Defaults reproduce the reference HHH→6b setup; any
/// subset of fields may be overridden from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Padded jet slots per event in the source ntuple.
    pub n_obj: usize,
    /// Jets at or below this pt are treated as padding and removed (GeV).
    pub min_jet_pt: f64,
    /// Events with fewer surviving jets than this are dropped.
    pub min_jets: usize,
    /// Generator-level parent (Higgs) candidates per event.
    pub n_parents: usize,
    /// Raw event files, resolved relative to `<root>/raw/`.
    pub sources: Vec<String>,
    /// Output artifact name, written under `<root>/processed/`.
    pub processed_name: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            n_obj: 10,
            min_jet_pt: 20.0,
            min_jets: 6,
            n_parents: 3,
            sources: vec!["GluGluToHHHTo6B_SM.parquet".to_string()],
            processed_name: "hhh_graph.parquet".to_string(),
        }
    }
}

impl GraphConfig {
    /// Read a config from a JSON file. Absent fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Load `<root>/config.json` when it exists, defaults otherwise.
    pub fn for_root(root: &Path) -> Result<Self> {
        let candidate = root.join("config.json");
        if candidate.is_file() {
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Absolute paths of the raw source files under `root`.
    pub fn raw_paths(&self, root: &Path) -> Vec<PathBuf> {
        self.sources.iter().map(|s| root.join("raw").join(s)).collect()
    }

    /// Absolute path of the output artifact under `root`.
    pub fn processed_path(&self, root: &Path) -> PathBuf {
        root.join("processed").join(&self.processed_name)
    }
}

// ---------------------------------------------------------------------------
// Entry window
// ---------------------------------------------------------------------------

/// Optional half-open `[start, stop)` event-index window applied per source.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryWindow {
    pub start: Option<usize>,
    pub stop: Option<usize>,
}

impl EntryWindow {
    /// Resolve against an actual row count, clamping both ends.
    /// `start >= n_rows` yields an empty range, not an error.
    pub fn resolve(&self, n_rows: usize) -> std::ops::Range<usize> {
        let start = self.start.unwrap_or(0).min(n_rows);
        let stop = self.stop.unwrap_or(n_rows).min(n_rows).max(start);
        start..stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_setup() {
        let cfg = GraphConfig::default();
        assert_eq!(cfg.n_obj, 10);
        assert_eq!(cfg.min_jet_pt, 20.0);
        assert_eq!(cfg.min_jets, 6);
        assert_eq!(cfg.n_parents, 3);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: GraphConfig = serde_json::from_str(r#"{"min_jets": 4}"#).unwrap();
        assert_eq!(cfg.min_jets, 4);
        assert_eq!(cfg.n_obj, 10);
        assert_eq!(cfg.sources, vec!["GluGluToHHHTo6B_SM.parquet"]);
    }

    #[test]
    fn window_clamps_to_row_count() {
        let w = EntryWindow { start: Some(5), stop: Some(100) };
        assert_eq!(w.resolve(10), 5..10);

        let w = EntryWindow { start: Some(20), stop: None };
        assert_eq!(w.resolve(10), 10..10);

        let w = EntryWindow::default();
        assert_eq!(w.resolve(10), 0..10);
    }
}
