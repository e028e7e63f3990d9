use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of the transforms from src/transforms.rs
// We need to duplicate this here since build scripts can't access src/ modules
const AVAILABLE_TRANSFORMS: &[&str] = &["ir-json", "ir-blocks", "events", "html", "markdown"];

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let path = |help: &'static str| {
        Arg::new("path")
            .help(help)
            .required(true)
            .index(1)
            .value_hint(ValueHint::FilePath)
    };

    let mut cmd = Command::new("quire")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert and inspect quire Markdown, and replay editor sessions")
        .arg_required_else_help(true)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats and transforms")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("inspect").arg(path("Path to the Markdown file")).arg(
                Arg::new("transform")
                    .index(2)
                    .value_parser(clap::builder::PossibleValuesParser::new(
                        AVAILABLE_TRANSFORMS,
                    )),
            ),
        )
        .subcommand(
            Command::new("convert")
                .arg(path("Input file path"))
                .arg(Arg::new("from").long("from"))
                .arg(Arg::new("to").long("to").required(true))
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("check").arg(path("Path to the Markdown file")))
        .subcommand(
            Command::new("session").arg(path("Path to the script")).arg(
                Arg::new("initial")
                    .long("initial")
                    .value_hint(ValueHint::FilePath),
            ),
        );

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "quire", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "quire", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "quire", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
