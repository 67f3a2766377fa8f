use indexmap::IndexMap;

use crate::libs::error::RbhError;

/// One high-scoring segment pair from the aligner's tabular output.
///
/// Field order follows `-outfmt "10 qseqid sseqid pident evalue qcovhsp bitscore"`.
/// Records are immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Hsp {
    pub query_id: String,
    pub subject_id: String,
    pub pident: f64,
    pub evalue: f64,
    pub coverage: f64,
    pub bitscore: f64,
}

/// Hits keyed by content hash. Iteration order carries no meaning;
/// downstream consumers sort explicitly.
pub type HitMap = IndexMap<u64, Hsp>;

impl Hsp {
    /// Content-derived key over the full attribute tuple.
    ///
    /// Two textually distinct rows with identical values collapse to the
    /// same key, which deduplicates redundant aligner output.
    pub fn content_key(&self) -> u64 {
        let repr = format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.query_id, self.subject_id, self.pident, self.evalue, self.coverage, self.bitscore
        );
        xxhash_rust::xxh3::xxh3_64(repr.as_bytes())
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

/// Formats an e-value the way aligners print them.
pub fn fmt_evalue(evalue: f64) -> String {
    if evalue == 0.0 {
        "0".to_string()
    } else {
        format!("{:e}", evalue)
    }
}

fn parse_field(field: &str, name: &str, line_no: usize, line: &str) -> Result<f64, RbhError> {
    field
        .trim()
        .parse::<f64>()
        .map_err(|_| RbhError::MalformedRecord {
            line_no,
            line: line.to_string(),
            reason: format!("invalid {}", name),
        })
}

/// Parses raw comma-separated aligner output into a deduplicated [`HitMap`].
///
/// Blank lines are skipped. A later row identical in content to an earlier
/// one silently replaces it. Empty input yields an empty map.
pub fn parse_hits(raw: &str) -> Result<HitMap, RbhError> {
    let mut hits = HitMap::new();

    for (idx, line) in raw.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(',').collect();
        if fields.len() < 6 {
            return Err(RbhError::MalformedRecord {
                line_no,
                line: line.to_string(),
                reason: format!("expected 6 fields, got {}", fields.len()),
            });
        }

        let query_id = fields[0].trim().to_string();
        let subject_id = fields[1].trim().to_string();
        if query_id.is_empty() || subject_id.is_empty() {
            return Err(RbhError::MalformedRecord {
                line_no,
                line: line.to_string(),
                reason: "empty sequence id".to_string(),
            });
        }

        let hsp = Hsp {
            query_id,
            subject_id,
            pident: parse_field(fields[2], "percent identity", line_no, line)?,
            evalue: parse_field(fields[3], "e-value", line_no, line)?,
            coverage: parse_field(fields[4], "coverage", line_no, line)?,
            bitscore: parse_field(fields[5], "bitscore", line_no, line)?,
        };

        hits.insert(hsp.content_key(), hsp);
    }

    Ok(hits)
}
