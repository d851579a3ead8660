//! Pure kinematics over (pt, eta, phi) triples.
//!
//! Jets are treated as massless four-vectors. Everything here is an explicit
//! formula; no vector-math dependency.

use std::f64::consts::PI;

// ---------------------------------------------------------------------------
// Angular helpers
// ---------------------------------------------------------------------------

/// Wrap an azimuthal-angle difference into (−π, π].
pub fn delta_phi(phi_a: f64, phi_b: f64) -> f64 {
    let mut d = phi_a - phi_b;
    while d > PI {
        d -= 2.0 * PI;
    }
    while d <= -PI {
        d += 2.0 * PI;
    }
    d
}

/// Angular separation ΔR = sqrt(Δη² + Δφ²), Δφ wrapped.
pub fn delta_r(eta_a: f64, phi_a: f64, eta_b: f64, phi_b: f64) -> f64 {
    let deta = eta_a - eta_b;
    let dphi = delta_phi(phi_a, phi_b);
    (deta * deta + dphi * dphi).sqrt()
}

// ---------------------------------------------------------------------------
// Massless four-vector sum
// ---------------------------------------------------------------------------

/// Cartesian four-momentum sum of two massless (pt, eta, phi) vectors.
#[derive(Debug, Clone, Copy)]
pub struct PairSum {
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub e: f64,
}

impl PairSum {
    pub fn new(pt_a: f64, eta_a: f64, phi_a: f64, pt_b: f64, eta_b: f64, phi_b: f64) -> Self {
        let (px_a, py_a, pz_a, e_a) = massless_cartesian(pt_a, eta_a, phi_a);
        let (px_b, py_b, pz_b, e_b) = massless_cartesian(pt_b, eta_b, phi_b);
        PairSum {
            px: px_a + px_b,
            py: py_a + py_b,
            pz: pz_a + pz_b,
            e: e_a + e_b,
        }
    }

    /// Transverse momentum of the sum.
    pub fn pt(&self) -> f64 {
        (self.px * self.px + self.py * self.py).sqrt()
    }

    /// Invariant mass squared, E² − |p|².
    pub fn mass2(&self) -> f64 {
        self.e * self.e - (self.px * self.px + self.py * self.py + self.pz * self.pz)
    }

    /// Pseudorapidity of the sum: asinh(pz / pt).
    pub fn eta(&self) -> f64 {
        (self.pz / self.pt()).asinh()
    }

    /// Azimuthal angle of the sum, in (−π, π].
    pub fn phi(&self) -> f64 {
        self.py.atan2(self.px)
    }
}

/// (px, py, pz, E) for a massless (pt, eta, phi) vector; E = pt·cosh(η).
fn massless_cartesian(pt: f64, eta: f64, phi: f64) -> (f64, f64, f64, f64) {
    (pt * phi.cos(), pt * phi.sin(), pt * eta.sinh(), pt * eta.cosh())
}

// ---------------------------------------------------------------------------
// Pair features
// ---------------------------------------------------------------------------

/// The 7 derived features of an ordered jet pair, in output column order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairFeatures {
    pub log_delta_r: f64,
    pub log_mass2: f64,
    pub log_kt: f64,
    pub log_z: f64,
    pub log_pt_jj: f64,
    pub eta_jj: f64,
    pub phi_jj: f64,
}

/// Compute the edge features for the pair (a, b).
///
/// Logs are natural and unguarded: a coincident pair gives ΔR = 0 and hence
/// `log_delta_r = -inf`, matching the reference behavior. Negative arguments
/// propagate NaN.
pub fn pair_features(
    pt_a: f64,
    eta_a: f64,
    phi_a: f64,
    pt_b: f64,
    eta_b: f64,
    phi_b: f64,
) -> PairFeatures {
    let min_pt = pt_a.min(pt_b);
    let sum_pt = pt_a + pt_b;
    let sum = PairSum::new(pt_a, eta_a, phi_a, pt_b, eta_b, phi_b);

    let log_delta_r = delta_r(eta_a, phi_a, eta_b, phi_b).ln();
    PairFeatures {
        log_delta_r,
        log_mass2: sum.mass2().ln(),
        log_kt: min_pt.ln() + log_delta_r,
        log_z: (min_pt / sum_pt).ln(),
        log_pt_jj: sum.pt().ln(),
        eta_jj: sum.eta(),
        phi_jj: sum.phi(),
    }
}

impl PairFeatures {
    /// Column order used for the edge-feature matrix.
    pub fn as_array(&self) -> [f64; 7] {
        [
            self.log_delta_r,
            self.log_mass2,
            self.log_kt,
            self.log_z,
            self.log_pt_jj,
            self.eta_jj,
            self.phi_jj,
        ]
    }
}
