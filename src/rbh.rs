extern crate clap;
use clap::*;

mod cmd_rbh;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = Command::new("rbh")
        .version(crate_version!())
        .about("`rbh` - Reciprocal best hit ortholog detection between proteomes")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_rbh::run::make_subcommand())
        .subcommand(cmd_rbh::filter::make_subcommand())
        .subcommand(cmd_rbh::best::make_subcommand())
        .after_help(
            r###"Subcommands:

* run    - Full pipeline: search both directions, keep reciprocal best hits
* filter - Apply quality cutoffs to saved tabular hits
* best   - Pick the best hit per query from saved tabular hits

The external aligner (`blastp`) must be on PATH for `rbh run`, and both
proteome databases must have been prepared beforehand, with each database's
FASTA file kept at the database path itself.

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("run", sub_matches)) => cmd_rbh::run::execute(sub_matches),
        Some(("filter", sub_matches)) => cmd_rbh::filter::execute(sub_matches),
        Some(("best", sub_matches)) => cmd_rbh::best::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
