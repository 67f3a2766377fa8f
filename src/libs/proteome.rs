use std::io::{BufRead, BufReader};

use indexmap::IndexMap;

use crate::libs::error::RbhError;

/// Loads a proteome FASTA file into a map from sequence id to the record's
/// FASTA text. The id is the header token after `>` up to the first
/// whitespace. Gzipped files are handled transparently.
pub fn load_proteome(path: &str) -> Result<IndexMap<String, String>, RbhError> {
    let p = std::path::Path::new(path);
    let file = std::fs::File::open(p).map_err(|_| RbhError::MissingInput {
        path: path.to_string(),
    })?;

    let reader: Box<dyn BufRead> = if p.extension() == Some(std::ffi::OsStr::new("gz")) {
        Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut fa_in = noodles_fasta::io::Reader::new(reader);
    let mut index: IndexMap<String, String> = IndexMap::new();

    for result in fa_in.records() {
        let record = result?;
        let id = String::from_utf8_lossy(record.name()).to_string();

        let mut buf: Vec<u8> = Vec::new();
        {
            let mut fa_out = noodles_fasta::io::writer::Builder::default()
                .set_line_base_count(usize::MAX)
                .build_from_writer(&mut buf);
            fa_out.write_record(&record)?;
        }

        index.insert(id, String::from_utf8_lossy(&buf).into_owned());
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_proteome() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b">p1 description text\nMKVL\n>p2\nMTTA\nGGSL\n")
            .unwrap();

        let index = load_proteome(file.path().to_str().unwrap()).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.contains_key("p1"));
        assert!(index["p1"].starts_with(">p1"));
        assert!(index["p1"].contains("MKVL"));
        assert!(index["p2"].contains("MTTAGGSL"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_proteome("no/such/file.fa").unwrap_err();
        match err {
            RbhError::MissingInput { path } => assert_eq!(path, "no/such/file.fa"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
