use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use strata_compiler::codegen::{CodegenWriter, DigestPersister};
use strata_compiler::output::ChangeKind;
use strata_compiler::{CompileOutput, CompileRequest, Error, compile};
use strata_core::Colors;

use super::{Project, ProjectArgs, explain, from_cwd};

pub struct CompileArgs {
    pub project: ProjectArgs,
    pub validate: bool,
    pub output: Option<PathBuf>,
    pub persist_output: Option<PathBuf>,
}

pub fn run(args: CompileArgs) -> anyhow::Result<()> {
    let mut config = args.project.config()?;
    if let Some(output) = &args.output {
        config.output = Some(from_cwd(output)?);
    }
    if let Some(path) = &args.persist_output {
        config.persist_output = Some(from_cwd(path)?);
    }

    let color = args.project.color;
    let colors = Colors::new(color);
    let project = Project::load(config, color)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    match runtime.block_on(compile_project(&project, args.validate)) {
        Ok(output) => {
            print!("{}", render_summary(&output, project.config.root(), colors));
            Ok(())
        }
        Err(err) => {
            if let Error::Drift { files } = &err {
                eprint!("{}", render_drift(files, project.config.root(), colors));
            }
            Err(explain(err, &project.store, color))
        }
    }
}

/// One compile run over a loaded project.
pub async fn compile_project(
    project: &Project,
    validate_only: bool,
) -> strata_compiler::Result<CompileOutput> {
    let config = &project.config;

    let mut writer = CodegenWriter::new(config.writer_config(validate_only));
    if config.is_persisting() {
        writer = writer.persister(Arc::new(DigestPersister));
    }

    let mut request = CompileRequest::new(&project.store, project.sources.schema.clone(), writer)
        .extensions(project.sources.extensions.clone())
        .lower_options(config.lower_options());
    if let Some(path) = &config.persist_output {
        request = request.query_map_path(config.resolve(path));
    }

    compile(request).await
}

/// Changed files, one per line, then the totals.
pub fn render_summary(output: &CompileOutput, root: &Path, colors: Colors) -> String {
    let mut out = String::new();
    for directory in output.directories().values() {
        for change in directory.changes() {
            let color = match change.kind {
                ChangeKind::Created => colors.green,
                ChangeKind::Updated => colors.blue,
                ChangeKind::Deleted => colors.red,
                ChangeKind::Unchanged => continue,
            };
            let label = format!("{:<8}", kind_label(change.kind));
            let path = directory.path().join(&change.file);
            let _ = writeln!(
                out,
                "{} {}",
                colors.paint(color, &label),
                relative(&path, root).display()
            );
        }
    }
    let _ = writeln!(out, "{}", colors.paint(colors.dim, &output.summary().to_string()));
    out
}

fn render_drift(files: &[PathBuf], root: &Path, colors: Colors) -> String {
    let mut out = String::from("out of date:\n");
    for file in files {
        let path = relative(file, root).display().to_string();
        let _ = writeln!(out, "  {}", colors.paint(colors.red, &path));
    }
    out.push_str("run `strata compile` to update them\n");
    out
}

fn kind_label(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Created => "created",
        ChangeKind::Updated => "updated",
        ChangeKind::Unchanged => "unchanged",
        ChangeKind::Deleted => "deleted",
    }
}

fn relative<'p>(path: &'p Path, root: &Path) -> &'p Path {
    path.strip_prefix(root).unwrap_or(path)
}
