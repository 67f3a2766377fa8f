use clap::*;
use std::io::{Read, Write};

use rbh::libs::best::select_best;
use rbh::libs::hsp::parse_hits;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("best")
        .about("Picks the best hit per query from saved tabular hits")
        .after_help(
            r###"
This command reads six-field tabular aligner output and writes a single row
per query id: the hit with the highest bit score. Ties are broken by lower
e-value, then higher percent identity, then subject id, so repeated runs on
the same input produce identical output.

No cutoffs are applied here; chain with `rbh filter` for that:

    rbh filter hits.csv | rbh best stdin

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Input tabular hits file. [stdin] for pipe"),
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
    let mut reader = rbh::reader(args.get_one::<String>("infile").unwrap());
    let mut writer = rbh::writer(args.get_one::<String>("outfile").unwrap());

    let mut raw = String::new();
    reader.read_to_string(&mut raw)?;

    let best = select_best(&parse_hits(&raw)?);

    // BTreeMap iterates in query id order
    for hsp in best.values() {
        writer.write_fmt(format_args!("{}\n", hsp.to_csv_row()))?;
    }

    Ok(())
}
