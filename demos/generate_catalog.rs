use chordist::exercise::Exercise;
use chordist::store::{default_catalog, save_catalog};
use chordist::theory::{parse_note, PitchClass};
use chordist::traits::DefinitionError;

use clap::Parser;

/// Write a seed catalog to a yaml file the trainer can open, for inspection
/// or hand editing before first use.
#[derive(Parser, Debug)]
#[clap(long_about = None)]
struct Args {
    /// The output file (inclusive).
    #[clap(short, long)]
    output: String,

    /// Keep only items rooted on these notes, e.g. "C Eb G#". Enharmonic
    /// spellings select the same root. Empty keeps the full catalog.
    #[clap()]
    roots: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut catalog = default_catalog();

    if !args.roots.is_empty() {
        let keep = args
            .roots
            .iter()
            .map(|r| parse_note(r))
            .collect::<Result<Vec<PitchClass>, DefinitionError>>()?;

        // The first expected note of any seeded exercise is its root.
        catalog.retain(|item| {
            let exercise = Exercise::from_item(item).expect("seeded definitions resolve");
            keep.contains(&exercise.expected()[0])
        });
    }

    save_catalog(&args.output, &catalog)?;
    println!("Wrote {} items to {}", catalog.len(), args.output);
    Ok(())
}
