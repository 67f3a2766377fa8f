use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::libs::hsp::{HitMap, Hsp};

/// Total order over hits for one query: highest bitscore first, ties broken
/// by lower e-value, then higher identity, then subject id. The final tie on
/// subject id makes selection reproducible across runs.
pub fn rank(a: &Hsp, b: &Hsp) -> Ordering {
    b.bitscore
        .partial_cmp(&a.bitscore)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            a.evalue
                .partial_cmp(&b.evalue)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| {
            b.pident
                .partial_cmp(&a.pident)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.subject_id.cmp(&b.subject_id))
}

/// Picks the single best hit per query id.
///
/// Queries with no hits are simply absent from the result.
pub fn select_best(hits: &HitMap) -> BTreeMap<String, Hsp> {
    let mut best: BTreeMap<String, Hsp> = BTreeMap::new();

    for hsp in hits.values() {
        match best.get(&hsp.query_id) {
            Some(current) if rank(hsp, current) != Ordering::Less => {}
            _ => {
                best.insert(hsp.query_id.clone(), hsp.clone());
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::hsp::parse_hits;

    #[test]
    fn test_best_by_bitscore() {
        let raw = "A,X,80,1e-50,90,500\nA,Y,80,1e-50,90,300\nB,Z,70,1e-40,85,200\n";
        let hits = parse_hits(raw).unwrap();
        let best = select_best(&hits);

        assert_eq!(best.len(), 2);
        assert_eq!(best["A"].subject_id, "X");
        assert_eq!(best["B"].subject_id, "Z");
    }

    #[test]
    fn test_tie_break_evalue() {
        let raw = "A,X,80,1e-60,90,500\nA,Y,80,1e-50,90,500\n";
        let hits = parse_hits(raw).unwrap();
        assert_eq!(select_best(&hits)["A"].subject_id, "X");
    }

    #[test]
    fn test_tie_break_identity() {
        let raw = "A,X,85,1e-50,90,500\nA,Y,80,1e-50,90,500\n";
        let hits = parse_hits(raw).unwrap();
        assert_eq!(select_best(&hits)["A"].subject_id, "X");
    }

    #[test]
    fn test_tie_break_subject_id() {
        let raw = "A,Y,80,1e-50,90,500\nA,X,80,1e-50,90,500\n";
        let hits = parse_hits(raw).unwrap();
        assert_eq!(select_best(&hits)["A"].subject_id, "X");
    }

    #[test]
    fn test_deterministic() {
        let raw = "A,Y,80,1e-50,90,500\nA,X,80,1e-50,90,500\nB,Z,70,1e-40,85,200\n";
        let hits = parse_hits(raw).unwrap();

        let first = select_best(&hits);
        for _ in 0..10 {
            assert_eq!(select_best(&hits), first);
        }
    }

    #[test]
    fn test_empty() {
        let hits = parse_hits("").unwrap();
        assert!(select_best(&hits).is_empty());
    }
}
