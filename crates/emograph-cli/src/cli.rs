//! Argument definitions

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

/// Build the `emograph` command
#[must_use]
pub fn build_cli() -> Command {
    Command::new("emograph")
        .version(emograph_core::VERSION)
        .about("Emograph blueprint tooling")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a blueprint file (YAML or JSON)")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Blueprint document"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .action(ArgAction::SetTrue)
                        .help("Treat the file as a { response, emograph_blueprint } document"),
                ),
        )
        .subcommand(
            Command::new("format")
                .about("Re-emit a YAML document for display")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("YAML document"),
                ),
        )
        .subcommand(
            Command::new("generate")
                .about("Run a fan-out against recorded generator output")
                .arg(
                    Arg::new("fixtures")
                        .long("fixtures")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("YAML list of output documents, served round-robin"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to system.yml"),
                )
                .arg(
                    Arg::new("prompt")
                        .long("prompt")
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to a prompt file"),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .value_parser(value_parser!(usize))
                        .help("Number of candidates to generate"),
                )
                .arg(
                    Arg::new("select")
                        .long("select")
                        .value_parser(value_parser!(usize))
                        .help("Candidate to select after generation"),
                )
                .arg(
                    Arg::new("idea")
                        .required(true)
                        .help("User input for the turn"),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn generate_arguments() {
        let matches = build_cli()
            .try_get_matches_from([
                "emograph", "generate", "--fixtures", "f.yml", "--count", "5", "--json", "a cat",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "generate");
        assert_eq!(args.get_one::<usize>("count"), Some(&5));
        assert!(args.get_flag("json"));
        assert_eq!(args.get_one::<String>("idea").map(String::as_str), Some("a cat"));
    }

    #[test]
    fn generate_requires_fixtures() {
        assert!(build_cli()
            .try_get_matches_from(["emograph", "generate", "idea"])
            .is_err());
    }
}
