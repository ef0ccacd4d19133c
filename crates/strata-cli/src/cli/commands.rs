//! Command builders for the CLI.
//!
//! `check` shares every flag with `compile` and always validates, so
//! `--validate` is hidden there.

use clap::Command;

use super::args::*;

/// Flags shared by every command that loads a project.
fn with_project_args(cmd: Command) -> Command {
    cmd.arg(config_arg())
        .arg(schema_arg())
        .arg(src_arg())
        .arg(color_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("strata")
        .about("GraphQL artifact compiler")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose_arg())
        .subcommand(compile_command())
        .subcommand(check_command())
        .subcommand(dump_command())
}

/// Compile the project and reconcile generated directories.
pub fn compile_command() -> Command {
    let cmd = Command::new("compile")
        .about("Compile documents into generated modules")
        .after_help(
            r#"EXAMPLES:
  strata compile                                  # uses ./strata.toml
  strata compile --schema schema.graphql --src src
  strata compile --validate                       # exit 1 if anything would change
  strata compile --persist-output build/queries.json"#,
        )
        .arg(validate_arg())
        .arg(output_arg())
        .arg(persist_output_arg());
    with_project_args(cmd)
}

/// `compile --validate`.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Check that generated modules are up to date")
        .after_help(
            r#"EXAMPLES:
  strata check                    # in CI, after codegen was committed
  strata check --output gen/      # single output directory"#,
        )
        .arg(validate_arg().hide(true))
        .arg(output_arg())
        .arg(persist_output_arg());
    with_project_args(cmd)
}

/// Print lowered or transformed IR.
pub fn dump_command() -> Command {
    let cmd = Command::new("dump")
        .about("Print the IR of the project's definitions")
        .after_help(
            r#"EXAMPLES:
  strata dump                                  # lowered definitions
  strata dump ArtistPageQuery                  # one definition
  strata dump -p query-execution ArtistPageQuery"#,
        )
        .arg(pipeline_arg())
        .arg(definition_arg());
    with_project_args(cmd)
}
