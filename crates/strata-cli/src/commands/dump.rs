use strata_compiler::compiler::build_context;
use strata_compiler::context::CompilerContext;
use strata_compiler::ir::{print_definition, print_definitions};
use strata_compiler::reporter::TracingReporter;
use strata_compiler::transform::{Pipeline, Pipelines};
use strata_compiler::validate::RuleSet;
use strata_core::Colors;

use super::{Project, ProjectArgs, explain};

pub struct DumpArgs {
    pub project: ProjectArgs,
    pub pipeline: Option<String>,
    pub definition: Option<String>,
}

pub fn run(args: DumpArgs) -> anyhow::Result<()> {
    let pipelines = Pipelines::default();
    let pipeline = args
        .pipeline
        .as_deref()
        .map(|name| find_pipeline(&pipelines, name))
        .transpose()?;

    let color = args.project.color;
    let project = Project::load(args.project.config()?, color)?;
    let context =
        dump_context(&project, pipeline).map_err(|err| explain(err, &project.store, color))?;
    print!(
        "{}",
        render(&context, args.definition.as_deref(), Colors::new(color))?
    );
    Ok(())
}

pub fn find_pipeline<'p>(pipelines: &'p Pipelines, name: &str) -> anyhow::Result<&'p Pipeline> {
    pipelines.get(name).ok_or_else(|| {
        let known: Vec<&str> = pipelines.iter().map(Pipeline::name).collect();
        anyhow::anyhow!(
            "unknown pipeline '{name}' (expected one of: {})",
            known.join(", ")
        )
    })
}

/// The lowered context, or its transform through `pipeline`.
pub fn dump_context(
    project: &Project,
    pipeline: Option<&Pipeline>,
) -> strata_compiler::Result<CompilerContext> {
    let context = build_context(
        &project.store,
        &project.sources.schema,
        &project.sources.extensions,
        &RuleSet::builtin(),
        &project.config.lower_options(),
        &TracingReporter,
    )?;
    match pipeline {
        Some(pipeline) => pipeline.apply(&context, &TracingReporter),
        None => Ok(context),
    }
}

/// Every definition, or only the named one, as GraphQL text.
pub fn render(
    context: &CompilerContext,
    definition: Option<&str>,
    colors: Colors,
) -> anyhow::Result<String> {
    let Some(name) = definition else {
        return Ok(print_definitions(context.definitions()));
    };
    let Some(found) = context.get(name) else {
        anyhow::bail!("no definition named '{name}'");
    };
    let header = colors.paint(colors.dim, &format!("# {name}"));
    Ok(format!("{header}\n{}", print_definition(found)))
}
