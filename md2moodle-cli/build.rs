use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the numbering styles accepted by src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules
const NUMBERING_VALUES: &[&str] = &["none", "abc", "ABCD", "123"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("md2moodle")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert markdown quizzes to Moodle XML question banks")
        .arg_required_else_help(true)
        .arg(
            Arg::new("input")
                .help("Markdown quiz file")
                .required(true)
                .index(1)
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("numbering")
                .long("numbering")
                .help("Answer numbering shown by Moodle")
                .value_parser(clap::builder::PossibleValuesParser::new(NUMBERING_VALUES))
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .short('o')
                .help("Directory for the XML files")
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Path to a md2moodle.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the converted documents as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log conversion steps to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only report errors")
                .action(ArgAction::SetTrue),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "md2moodle", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "md2moodle", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "md2moodle", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
