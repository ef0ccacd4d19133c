//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! - `*Params` structs mirror command `*Args` but are populated from clap
//! - `from_matches()` extractors pull the relevant fields
//! - `Into<*Args>` impls bridge dispatch to command handlers

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::ProjectArgs;
use crate::commands::compile::CompileArgs;
use crate::commands::dump::DumpArgs;

/// Flags every project command shares.
pub struct ProjectParams {
    pub config: Option<PathBuf>,
    pub schema: Option<PathBuf>,
    pub src: Vec<PathBuf>,
    pub color: ColorChoice,
}

impl ProjectParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            config: m.get_one::<PathBuf>("config").cloned(),
            schema: m.get_one::<PathBuf>("schema").cloned(),
            src: m
                .get_many::<PathBuf>("src")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            color: parse_color(m),
        }
    }
}

impl From<ProjectParams> for ProjectArgs {
    fn from(p: ProjectParams) -> Self {
        Self {
            config: p.config,
            schema: p.schema,
            src: p.src,
            color: p.color.should_colorize(),
        }
    }
}

pub struct CompileParams {
    pub project: ProjectParams,
    pub validate: bool,
    pub output: Option<PathBuf>,
    pub persist_output: Option<PathBuf>,
}

impl CompileParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            project: ProjectParams::from_matches(m),
            validate: m.get_flag("validate"),
            output: m.get_one::<PathBuf>("output").cloned(),
            persist_output: m.get_one::<PathBuf>("persist_output").cloned(),
        }
    }
}

impl From<CompileParams> for CompileArgs {
    fn from(p: CompileParams) -> Self {
        Self {
            project: p.project.into(),
            validate: p.validate,
            output: p.output,
            persist_output: p.persist_output,
        }
    }
}

/// `check` is `compile` with validation forced on.
pub struct CheckParams(pub CompileParams);

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let mut params = CompileParams::from_matches(m);
        params.validate = true;
        Self(params)
    }
}

impl From<CheckParams> for CompileArgs {
    fn from(p: CheckParams) -> Self {
        p.0.into()
    }
}

pub struct DumpParams {
    pub project: ProjectParams,
    pub pipeline: Option<String>,
    pub definition: Option<String>,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            project: ProjectParams::from_matches(m),
            pipeline: m.get_one::<String>("pipeline").cloned(),
            definition: m.get_one::<String>("definition").cloned(),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            project: p.project.into(),
            pipeline: p.pipeline,
            definition: p.definition,
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
