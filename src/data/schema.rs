//! Branch-name templates of the flat event ntuple.
//!
//! Jet branches are numbered `jet1Pt .. jet{N_OBJ}Pt` and so on; parent
//! branches `genHiggs1Pt .. genHiggs{N_PARENTS}Pt`. Indices are 1-based in
//! the source.

/// Per-jet kinematic / identification branches (node-feature inputs).
pub const JET_PT: &str = "jet{i}Pt";
pub const JET_ETA: &str = "jet{i}Eta";
pub const JET_PHI: &str = "jet{i}Phi";
pub const JET_BTAG: &str = "jet{i}DeepFlavB";
pub const JET_ID: &str = "jet{i}JetId";

/// Per-jet truth branches (label inputs).
pub const JET_HIGGS_IDX: &str = "jet{i}HiggsMatchedIndex";
pub const JET_HADRON_FLAVOR: &str = "jet{i}HadronFlavour";

/// Generator-level parent (Higgs) branches.
pub const HIGGS_PT: &str = "genHiggs{i}Pt";
pub const HIGGS_ETA: &str = "genHiggs{i}Eta";
pub const HIGGS_PHI: &str = "genHiggs{i}Phi";

pub const JET_FEATURE_TEMPLATES: [&str; 5] = [JET_PT, JET_ETA, JET_PHI, JET_BTAG, JET_ID];
pub const JET_LABEL_TEMPLATES: [&str; 2] = [JET_HIGGS_IDX, JET_HADRON_FLAVOR];
pub const HIGGS_TEMPLATES: [&str; 3] = [HIGGS_PT, HIGGS_ETA, HIGGS_PHI];

/// Instantiate a template for slot `i` (1-based).
pub fn branch(template: &str, i: usize) -> String {
    template.replace("{i}", &i.to_string())
}

/// Every branch the loader expects, for schema validation and generators.
pub fn all_branches(n_obj: usize, n_parents: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(7 * n_obj + 3 * n_parents);
    for i in 1..=n_obj {
        for template in JET_FEATURE_TEMPLATES.iter().chain(JET_LABEL_TEMPLATES.iter()) {
            names.push(branch(template, i));
        }
    }
    for i in 1..=n_parents {
        for template in &HIGGS_TEMPLATES {
            names.push(branch(template, i));
        }
    }
    names
}
