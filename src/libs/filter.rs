use crate::libs::hsp::{HitMap, Hsp};

/// Quality cutoffs applied to every hit.
///
/// All four comparisons are inclusive: a hit sitting exactly on a boundary
/// survives. An e-value of zero always passes.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub identity_min: f64,
    pub evalue_max: f64,
    pub coverage_min: f64,
    pub bitscore_min: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            identity_min: 25.0,
            evalue_max: 1e-25,
            coverage_min: 50.0,
            bitscore_min: 0.0,
        }
    }
}

/// One failing predicate is enough to reject a hit.
pub fn is_rejected(hsp: &Hsp, cutoffs: &Thresholds) -> bool {
    hsp.pident < cutoffs.identity_min
        || hsp.evalue > cutoffs.evalue_max
        || hsp.coverage < cutoffs.coverage_min
        || hsp.bitscore < cutoffs.bitscore_min
}

/// Returns a new map holding only the surviving hits; the input is untouched.
pub fn filter_hits(hits: &HitMap, cutoffs: &Thresholds) -> HitMap {
    hits.iter()
        .filter(|(_, hsp)| !is_rejected(hsp, cutoffs))
        .map(|(key, hsp)| (*key, hsp.clone()))
        .collect()
}
