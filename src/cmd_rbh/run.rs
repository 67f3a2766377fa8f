use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use clap::*;

use rbh::libs::batch::{run_batch, BatchOptions};
use rbh::libs::blast::BlastConfig;
use rbh::libs::filter::Thresholds;
use rbh::libs::rbh::write_report;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("run")
        .about("Determines reciprocal best hit orthologs for query proteomes")
        .after_help(
            r###"
For every query FASTA file, this command searches the query against the
subject database and the subject proteome against the query database, keeps
hits passing the quality cutoffs, picks the best hit per sequence in each
direction, and reports a pair only when both directions agree.

One CSV report per query file is written into the output directory, named
`<query_stem>.rbh.csv`, with rows:

    query_id,subject_id,percent_identity,evalue,coverage,bitscore

Notes:
* `blastp` must be on PATH.
* Both databases must have been prepared beforehand (`makeblastdb`), and the
  proteome FASTA file must remain at the database path.
* A failing query file is reported and does not stop the others; the exit
  code is non-zero if any file failed.
* All cutoffs are inclusive; an e-value of 0 always passes.

Examples:
1. One query proteome:
   rbh run query.fa -s subject_db -r query_db -o out

2. Many query files, four at a time:
   rbh run queries/*.fa -s subject_db -r query_db -o out -p 4

3. Stricter cutoffs and a 10-minute budget per search:
   rbh run query.fa -s subject_db -r query_db --identity 40 --coverage 70 --timeout 600

"###,
        )
        .arg(
            Arg::new("queries")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("Query proteome FASTA file(s)"),
        )
        .arg(
            Arg::new("subject")
                .long("subject")
                .short('s')
                .required(true)
                .num_args(1)
                .help("Subject database path (proteome FASTA alongside its index)"),
        )
        .arg(
            Arg::new("query_db")
                .long("query-db")
                .short('r')
                .required(true)
                .num_args(1)
                .help("Query database path, searched in the reverse direction"),
        )
        .arg(
            Arg::new("outdir")
                .long("outdir")
                .short('o')
                .num_args(1)
                .default_value(".")
                .help("Output directory for per-file reports"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .num_args(1)
                .default_value("0")
                .value_parser(value_parser!(usize))
                .help("Number of query files processed concurrently. [0] for all cores"),
        )
        .arg(
            Arg::new("evalue")
                .long("evalue")
                .short('e')
                .num_args(1)
                .default_value("1e-25")
                .value_parser(value_parser!(f64))
                .help("Aligner expectation value cutoff"),
        )
        .arg(
            Arg::new("identity")
                .long("identity")
                .num_args(1)
                .default_value("25")
                .value_parser(value_parser!(f64))
                .help("Minimum percent identity"),
        )
        .arg(
            Arg::new("max_evalue")
                .long("max-evalue")
                .num_args(1)
                .default_value("1e-25")
                .value_parser(value_parser!(f64))
                .help("Maximum e-value kept after the search"),
        )
        .arg(
            Arg::new("coverage")
                .long("coverage")
                .num_args(1)
                .default_value("50")
                .value_parser(value_parser!(f64))
                .help("Minimum query coverage"),
        )
        .arg(
            Arg::new("bitscore")
                .long("bitscore")
                .num_args(1)
                .default_value("0")
                .value_parser(value_parser!(f64))
                .help("Minimum bit score"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .num_args(1)
                .default_value("0")
                .value_parser(value_parser!(u64))
                .help("Time budget per aligner invocation in seconds. [0] for none"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let queries: Vec<String> = args
        .get_many::<String>("queries")
        .unwrap()
        .cloned()
        .collect();
    let subject_db = args.get_one::<String>("subject").unwrap();
    let query_db = args.get_one::<String>("query_db").unwrap();
    let outdir = args.get_one::<String>("outdir").unwrap();

    let opt_parallel = *args.get_one::<usize>("parallel").unwrap();
    let opt_timeout = *args.get_one::<u64>("timeout").unwrap();

    let opts = BatchOptions {
        thresholds: Thresholds {
            identity_min: *args.get_one::<f64>("identity").unwrap(),
            evalue_max: *args.get_one::<f64>("max_evalue").unwrap(),
            coverage_min: *args.get_one::<f64>("coverage").unwrap(),
            bitscore_min: *args.get_one::<f64>("bitscore").unwrap(),
        },
        blast: BlastConfig {
            evalue: *args.get_one::<f64>("evalue").unwrap(),
            timeout: if opt_timeout == 0 {
                None
            } else {
                Some(Duration::from_secs(opt_timeout))
            },
            ..Default::default()
        },
        jobs: opt_parallel,
    };

    std::fs::create_dir_all(outdir)?;

    //----------------------------
    // Process
    //----------------------------
    let cancel = Arc::new(AtomicBool::new(false));
    let outcomes = run_batch(&queries, subject_db, query_db, &opts, cancel);

    let mut failed = 0;
    for (query_file, outcome) in &outcomes {
        match outcome {
            Ok(pairs) => {
                let stem = std::path::Path::new(query_file)
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| query_file.clone());
                let out_path = std::path::Path::new(outdir).join(format!("{}.rbh.csv", stem));

                let mut writer = rbh::writer(&out_path.to_string_lossy());
                write_report(pairs, &mut writer)?;

                println!("{}\tok\t{} pairs", query_file, pairs.len());
            }
            Err(e) => {
                failed += 1;
                println!("{}\tfailed\t{}", query_file, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} query files failed", failed, outcomes.len());
    }

    Ok(())
}
