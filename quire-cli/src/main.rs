// Command-line interface for quire
//
// This binary converts between the quire Markdown dialect, the editor HTML it
// renders to and the JSON block IR, and replays editor sessions for debugging.
//
// Usage:
//  quire <input> --to <format> [--from <format>] [--output <file>]  - Convert between formats (default)
//  quire convert <input> --to <format> [--from <format>] [-o <file>] - Same as above (explicit)
//  quire inspect <path> [<transform>]     - Show an intermediate stage (defaults to "ir-blocks")
//  quire check <path>                     - Report whether a file survives a round trip unchanged
//  quire session <script> [--initial <md>] - Replay a JSON-lines editing script
//  quire --list-formats                   - List conversion formats and transforms

use quire_cli::replay::{parse_script, Replay};
use quire_cli::transforms;

use clap::{Arg, ArgAction, Command, ValueHint};
use quire_babel::transforms::check_stability;
use quire_babel::FormatRegistry;
use quire_config::{Loader, QuireConfig, PROJECT_CONFIG};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["convert", "inspect", "check", "session", "help"];

fn build_cli() -> Command {
    Command::new("quire")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert and inspect quire Markdown, and replay editor sessions")
        .long_about(
            "quire works with the constrained Markdown dialect behind the rich-text editor.\n\n\
            Commands:\n  \
            - convert: Transform between markdown, html and json (default)\n  \
            - inspect: View intermediate stages (IR, events, HTML)\n  \
            - check:   Verify a Markdown file is at its round-trip fixed point\n  \
            - session: Replay host signals and user edits through the editor session\n\n\
            Examples:\n  \
            quire notes.md --to html                # Render editor HTML (stdout)\n  \
            quire page.html --to markdown -o out.md # Serialize editor HTML\n  \
            quire inspect notes.md events           # Show list-run events\n  \
            quire check notes.md                    # Round-trip stability",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats and transforms")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a quire.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect intermediate stages of a Markdown file")
                .arg(
                    Arg::new("path")
                        .help("Path to the Markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("Transform to apply. Defaults to 'ir-blocks'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between formats.\n\n\
                    Supported formats:\n  \
                    - markdown: quire Markdown (.md)\n  \
                    - html:     editor HTML (.html)\n  \
                    - json:     block IR (.json)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Check that a Markdown file survives render and serialize unchanged")
                .long_about(
                    "Renders the file to editor HTML and serializes it back, twice.\n\n\
                    Prints 'canonical' when the file is already at its fixed point.\n\
                    Otherwise prints the canonical form; exits 1 when the second pass\n\
                    still changes the text.",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the Markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("session")
                .about("Replay a JSON-lines editing script through an editor session")
                .arg(
                    Arg::new("script")
                        .help("Path to the script")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("initial")
                        .long("initial")
                        .value_name("PATH")
                        .help("Markdown file the editor is mounted with")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    // If the first argument is not a subcommand, treat it as `convert`
    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => {
            if args.len() > 1 && !args[1].starts_with('-') && !SUBCOMMANDS.contains(&args[1].as_str())
            {
                let mut new_args = vec![args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    if matches.get_flag("list-formats") {
        handle_list_formats_command();
        return;
    }

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let path = required(sub_matches, "path");
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or(transforms::DEFAULT_TRANSFORM);
            handle_inspect_command(path, transform);
        }
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            let from = match sub_matches.get_one::<String>("from") {
                Some(from) => from.to_string(),
                None => {
                    let registry = FormatRegistry::default();
                    match registry.detect_format_from_filename(input) {
                        Some(detected) => detected,
                        None => {
                            eprintln!("Error: Could not detect format from filename '{input}'");
                            eprintln!("Please specify --from explicitly");
                            std::process::exit(1);
                        }
                    }
                }
            };
            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(input, &from, to, output);
        }
        Some(("check", sub_matches)) => {
            handle_check_command(required(sub_matches, "path"));
        }
        Some(("session", sub_matches)) => {
            let script = required(sub_matches, "script");
            let initial = sub_matches.get_one::<String>("initial").map(|s| s.as_str());
            handle_session_command(script, initial, &config);
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn required<'a>(matches: &'a clap::ArgMatches, name: &str) -> &'a str {
    match matches.get_one::<String>(name) {
        Some(value) => value,
        None => {
            eprintln!("Error: missing argument '{name}'");
            std::process::exit(2);
        }
    }
}

fn read_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    })
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, transform: &str) {
    let source = read_source(path);
    let output = transforms::execute_transform(&source, transform).unwrap_or_else(|e| {
        eprintln!("Execution error: {e}");
        std::process::exit(1);
    });
    print!("{output}");
}

/// Handle the convert command
fn handle_convert_command(input: &str, from: &str, to: &str, output: Option<&str>) {
    let registry = FormatRegistry::default();

    for name in [from, to] {
        if let Err(e) = registry.get(name) {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    let source = read_source(input);
    let result = registry.convert(&source, from, to).unwrap_or_else(|e| {
        eprintln!("Conversion error: {e}");
        std::process::exit(1);
    });

    match output {
        Some(path) => fs::write(path, result).unwrap_or_else(|e| {
            eprintln!("Error writing file '{path}': {e}");
            std::process::exit(1);
        }),
        None => println!("{result}"),
    }
}

/// Handle the check command
fn handle_check_command(path: &str) {
    let source = read_source(path);
    let report = check_stability(&source);

    if !report.is_stable() {
        eprintln!("Unstable round trip in '{path}':");
        for (line, first, second) in report.differences() {
            eprintln!("  {line}: {first:?} -> {second:?}");
        }
        std::process::exit(1);
    }
    if report.is_canonical(&source) {
        println!("canonical");
    } else {
        println!("{}", report.first);
    }
}

/// Handle the session command
fn handle_session_command(script: &str, initial: Option<&str>, config: &QuireConfig) {
    let steps = parse_script(&read_source(script)).unwrap_or_else(|e| {
        eprintln!("Error in script '{script}': {e}");
        std::process::exit(1);
    });
    let initial = initial.map(read_source).unwrap_or_default();
    let base = Path::new(script)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Failed to start runtime: {e}");
            std::process::exit(1);
        });

    let stdout = std::io::stdout();
    let mut replay = Replay::new(config, &initial, base, stdout.lock());
    if let Err(e) = runtime.block_on(replay.run(steps)) {
        eprintln!("Replay failed: {e}");
        std::process::exit(1);
    }
}

/// Handle the list-formats command
fn handle_list_formats_command() {
    println!("Conversion formats:");
    let registry = FormatRegistry::default();
    for format_name in registry.list_formats() {
        println!("  {format_name}");
    }
    println!("\nInspect transforms:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }
}

fn load_cli_config(explicit_path: Option<&str>) -> QuireConfig {
    let loader = Loader::new().with_optional_file(PROJECT_CONFIG);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };
    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}
