// Command-line interface for md2moodle
//
// Converts a markdown quiz into Moodle XML question banks, one file per category, named
// `<input stem>-<category>.xml`. Files land next to the input unless an output directory is
// configured.
//
// Usage:
//  md2moodle <input> [--numbering <none|abc|ABCD|123>] [-o <dir>]   - Convert and write files
//  md2moodle <input> --json                                         - Print the documents as JSON
//
// Configuration:
//
// Settings are layered, later layers winning: the built-in defaults, `md2moodle.toml` in the
// working directory, the file given with --config, and finally the command line flags.
//
// Logging goes to stderr through tracing. Warnings are shown by default, -v shows the
// conversion steps, -q silences everything but errors. RUST_LOG is honored when neither
// flag is given.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use md2moodle_config::{ConfigError, Loader, QuizConfig, LOCAL_CONFIG_FILE};
use md2moodle_core::highlight::{PygmentizeOptions, PygmentizeRenderer};
use md2moodle_core::moodle_xml::{AnswerNumbering, XmlOptions};
use md2moodle_core::publish::{convert_file, publish, PublishSpec};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const NUMBERING_VALUES: [&str; 4] = ["none", "abc", "ABCD", "123"];

fn build_cli() -> Command {
    Command::new("md2moodle")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert markdown quizzes to Moodle XML question banks")
        .long_about(
            "md2moodle converts a markdown quiz into Moodle XML files, one per category.\n\n\
            Document format:\n  \
            # Category name\n  \
            * Question statement (markdown, `code`, $math$, ![alt](image.png))\n  \
            ```c{img}                  (code fence, {img} renders it as a picture)\n  \
            ```\n      \
            - wrong answer\n      \
            - !correct answer\n\n\
            Import the files in Moodle with \"Get category from file\" checked.\n\n\
            Examples:\n  \
            md2moodle quiz.md                     # Write quiz-<category>.xml next to quiz.md\n  \
            md2moodle quiz.md -o banks            # Write into ./banks\n  \
            md2moodle quiz.md --numbering 123     # Number answers 1., 2., 3.\n  \
            md2moodle quiz.md --json              # Print the XML documents as JSON"
        )
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
                .value_name("STYLE")
                .help("Answer numbering shown by Moodle")
                .value_parser(clap::builder::PossibleValuesParser::new(NUMBERING_VALUES))
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .short('o')
                .value_name("DIR")
                .help("Directory for the XML files (defaults to the input's directory)")
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a md2moodle.toml configuration file")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the converted documents as JSON instead of writing files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log conversion steps to stderr")
                .action(ArgAction::SetTrue)
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Only report errors, do not list written files")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    let matches = build_cli().get_matches();
    init_logging(&matches);

    let config = load_cli_config(&matches);
    let input = matches
        .get_one::<String>("input")
        .expect("input is required");

    let renderer = PygmentizeRenderer::new(PygmentizeOptions::from(&config.code_image));
    let mut spec =
        PublishSpec::new(input, &renderer).with_xml_options(XmlOptions::from(&config.output));
    if let Some(dir) = &config.output.directory {
        spec = spec.with_output_dir(dir);
    }
    debug!(
        input = %input,
        numbering = %spec.xml.answer_numbering,
        output_dir = ?spec.output_dir,
        font_size = renderer.options().font_size,
        fallback_lexer = %renderer.options().fallback_lexer,
        "starting conversion"
    );

    if matches.get_flag("json") {
        handle_json_command(&spec);
    } else {
        handle_publish_command(spec, matches.get_flag("quiet"));
    }
}

/// Convert and write one file per category, listing the written paths.
fn handle_publish_command(spec: PublishSpec<'_>, quiet: bool) {
    let written = publish(spec).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    if !quiet {
        for path in written {
            println!("{}", path.display());
        }
    }
}

/// Convert in memory and print the documents as a JSON array.
fn handle_json_command(spec: &PublishSpec<'_>) {
    let documents = convert_file(spec).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let json = serde_json::to_string_pretty(&documents).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });
    println!("{json}");
}

fn init_logging(matches: &ArgMatches) {
    let filter = if matches.get_flag("verbose") {
        EnvFilter::new("md2moodle=debug,md2moodle_core=debug")
    } else if matches.get_flag("quiet") {
        EnvFilter::new("md2moodle=error,md2moodle_core=error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("md2moodle=warn,md2moodle_core=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_cli_config(matches: &ArgMatches) -> QuizConfig {
    let loader = Loader::new().with_optional_file(LOCAL_CONFIG_FILE);
    let loader = match matches.get_one::<String>("config") {
        Some(path) => loader.with_file(path),
        None => loader,
    };

    apply_cli_overrides(loader, matches)
        .and_then(Loader::build)
        .unwrap_or_else(|err| {
            eprintln!("Failed to load configuration: {err}");
            std::process::exit(1);
        })
}

fn apply_cli_overrides(
    mut loader: Loader,
    matches: &ArgMatches,
) -> Result<Loader, ConfigError> {
    if let Some(numbering) = matches.get_one::<String>("numbering") {
        // Validated by clap, parsed here so config only ever sees known values
        let numbering: AnswerNumbering = numbering
            .parse()
            .map_err(ConfigError::Message)?;
        loader = loader.set_override("output.answer_numbering", numbering.as_str())?;
    }
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        loader = loader.set_override("output.directory", dir.as_str())?;
    }
    Ok(loader)
}
