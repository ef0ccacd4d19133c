mod cli;
mod commands;

use std::process::ExitCode;

use cli::{CheckParams, CompileParams, DumpParams, build_cli};

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    commands::logging::init(matches.get_count("verbose"));

    let result = match matches.subcommand() {
        Some(("compile", m)) => commands::compile::run(CompileParams::from_matches(m).into()),
        Some(("check", m)) => commands::compile::run(CheckParams::from_matches(m).into()),
        Some(("dump", m)) => commands::dump::run(DumpParams::from_matches(m).into()),
        _ => unreachable!("clap should have caught this"),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
