use std::collections::BTreeMap;
use std::io::Write;

use crate::libs::hsp::{fmt_evalue, Hsp};

/// A confirmed ortholog pair, carrying the forward hit's quality metrics
/// for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthologPair {
    pub query_id: String,
    pub subject_id: String,
    pub pident: f64,
    pub evalue: f64,
    pub coverage: f64,
    pub bitscore: f64,
}

impl OrthologPair {
    fn from_hit(hsp: &Hsp) -> Self {
        Self {
            query_id: hsp.query_id.clone(),
            subject_id: hsp.subject_id.clone(),
            pident: hsp.pident,
            evalue: hsp.evalue,
            coverage: hsp.coverage,
            bitscore: hsp.bitscore,
        }
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.query_id,
            self.subject_id,
            self.pident,
            fmt_evalue(self.evalue),
            self.coverage,
            self.bitscore
        )
    }
}

/// Cross-checks forward and reverse best hits and emits the pairs where both
/// directions agree.
///
/// `forward` maps query-proteome ids to their best subject hit; `reverse`
/// maps subject-proteome ids to their best query hit. A pair `(q, s)` is
/// emitted iff `forward[q]` points at `s` and `reverse[s]` points back at
/// `q`. One-sided best hits, typical where paralogs exist, are dropped
/// silently. Output is sorted by query id, then subject id.
pub fn match_pairs(
    forward: &BTreeMap<String, Hsp>,
    reverse: &BTreeMap<String, Hsp>,
) -> Vec<OrthologPair> {
    let mut pairs: Vec<OrthologPair> = Vec::new();

    for (query_id, fwd) in forward {
        if let Some(rev) = reverse.get(&fwd.subject_id) {
            if rev.subject_id == *query_id {
                pairs.push(OrthologPair::from_hit(fwd));
            }
        }
    }

    pairs.sort_by(|a, b| {
        a.query_id
            .cmp(&b.query_id)
            .then_with(|| a.subject_id.cmp(&b.subject_id))
    });

    pairs
}

/// Writes one CSV row per pair, no header.
pub fn write_report(pairs: &[OrthologPair], writer: &mut dyn Write) -> anyhow::Result<()> {
    for pair in pairs {
        writer.write_fmt(format_args!("{}\n", pair.to_csv_row()))?;
    }

    Ok(())
}
