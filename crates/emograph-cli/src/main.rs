//! `emograph` command-line entry point

use anyhow::Result;
use emograph_cli::{build_cli, commands, logging, GenerateArgs};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();
    logging::init(matches.get_flag("json"));

    let result: Result<String> = match matches.subcommand() {
        Some(("validate", args)) => match args.get_one::<PathBuf>("file") {
            Some(file) => commands::validate(file, args.get_flag("output")),
            None => Err(anyhow::anyhow!("missing <file>")),
        },
        Some(("format", args)) => match args.get_one::<PathBuf>("file") {
            Some(file) => commands::format(file),
            None => Err(anyhow::anyhow!("missing <file>")),
        },
        Some(("generate", args)) => {
            let generate = GenerateArgs {
                fixtures: args.get_one::<PathBuf>("fixtures").cloned().unwrap_or_default(),
                config: args.get_one::<PathBuf>("config").cloned(),
                prompt: args.get_one::<PathBuf>("prompt").cloned(),
                count: args.get_one::<usize>("count").copied(),
                select: args.get_one::<usize>("select").copied(),
                idea: args.get_one::<String>("idea").cloned().unwrap_or_default(),
            };
            commands::generate(generate).await
        }
        _ => Ok(String::new()),
    };

    match result {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}
