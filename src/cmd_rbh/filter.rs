use clap::*;
use itertools::Itertools;
use std::io::{Read, Write};

use rbh::libs::filter::{filter_hits, Thresholds};
use rbh::libs::hsp::parse_hits;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("filter")
        .about("Applies quality cutoffs to saved tabular hits")
        .after_help(
            r###"
This command reads six-field tabular aligner output

    query_id,subject_id,percent_identity,evalue,coverage,bitscore

drops exact duplicate rows, rejects rows failing any cutoff, and writes the
survivors sorted by query id, subject id, then descending bit score. All
cutoffs are inclusive; an e-value of 0 always passes.

Useful for inspecting one search direction before a full `rbh run`.

Examples:
1. Default cutoffs:
   rbh filter hits.csv

2. From a pipe, stricter identity:
   blastp ... | rbh filter stdin --identity 40

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Input tabular hits file. [stdin] for pipe"),
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
                .help("Maximum e-value"),
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
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let mut reader = rbh::reader(args.get_one::<String>("infile").unwrap());
    let mut writer = rbh::writer(args.get_one::<String>("outfile").unwrap());

    let cutoffs = Thresholds {
        identity_min: *args.get_one::<f64>("identity").unwrap(),
        evalue_max: *args.get_one::<f64>("max_evalue").unwrap(),
        coverage_min: *args.get_one::<f64>("coverage").unwrap(),
        bitscore_min: *args.get_one::<f64>("bitscore").unwrap(),
    };

    //----------------------------
    // Process
    //----------------------------
    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;

    let hits = parse_hits(&raw)?;
    let kept = filter_hits(&hits, &cutoffs);

    for hsp in kept.values().sorted_by(|a, b| {
        a.query_id
            .cmp(&b.query_id)
            .then_with(|| a.subject_id.cmp(&b.subject_id))
            .then_with(|| {
                b.bitscore
                    .partial_cmp(&a.bitscore)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    }) {
        writer.write_fmt(format_args!("{}\n", hsp.to_csv_row()))?;
    }

    Ok(())
}
