//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so commands compose the same
//! definitions. Options that also live in `strata.toml` have no defaults here;
//! an absent flag leaves the config value alone.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Project config file (-c/--config).
pub fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Project config (defaults to ./strata.toml when present)")
}

/// Server schema SDL (--schema).
pub fn schema_arg() -> Arg {
    Arg::new("schema")
        .long("schema")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .help("Server schema file")
}

/// Source roots (--src), repeatable.
pub fn src_arg() -> Arg {
    Arg::new("src")
        .long("src")
        .value_name("DIR")
        .value_parser(value_parser!(PathBuf))
        .action(ArgAction::Append)
        .help("Directory searched for documents and tagged modules")
}

/// Compare instead of writing (--validate).
pub fn validate_arg() -> Arg {
    Arg::new("validate")
        .long("validate")
        .action(ArgAction::SetTrue)
        .help("Fail when generated files are out of date instead of writing them")
}

/// Single output directory (-o/--output).
pub fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("DIR")
        .value_parser(value_parser!(PathBuf))
        .help("Write every module here instead of next to its source")
}

/// Persist requests and write the query map (--persist-output).
pub fn persist_output_arg() -> Arg {
    Arg::new("persist_output")
        .long("persist-output")
        .value_name("PATH")
        .value_parser(value_parser!(PathBuf))
        .help("Persist request text and write the combined query map here")
}

/// Log verbosity (-v, repeatable).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .global(true)
        .help("Raise log verbosity (-v info, -vv debug, -vvv trace)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Transform pipeline to run before dumping (-p/--pipeline).
pub fn pipeline_arg() -> Arg {
    Arg::new("pipeline")
        .short('p')
        .long("pipeline")
        .value_name("NAME")
        .help("Dump the output of a pipeline (type-generation, query-execution, artifact)")
}

/// Definition to dump (positional).
pub fn definition_arg() -> Arg {
    Arg::new("definition")
        .value_name("DEFINITION")
        .help("Only print the definition with this name")
}
