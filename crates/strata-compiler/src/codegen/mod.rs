//! Turning artifacts into generated modules.
//!
//! Three collaborators sit behind traits and are injected into the
//! [`CodegenWriter`]: a [`TypeGenerator`] producing type declarations for a
//! definition, a [`ModuleFormatter`] assembling the final file, and an
//! optional async [`Persister`] that swaps request text for a stable id.
//! Defaults for each live here too.

mod module;
mod persist;
mod source_hash;
mod typescript;
mod writer;

#[cfg(test)]
mod codegen_tests;
#[cfg(test)]
mod writer_tests;

use std::collections::{BTreeMap, BTreeSet};

use crate::Result;
use crate::ir::Definition;
use crate::schema::Schema;

pub use module::JsModuleFormatter;
pub use persist::{DigestPersister, Persister};
pub use source_hash::{SOURCE_HASH_TAG, SourceHash};
pub use typescript::TypeScriptGenerator;
pub use writer::{CodegenWriter, WriterConfig};

/// Produces type declarations for one definition of the type-generation
/// context.
pub trait TypeGenerator: Send + Sync {
    fn generate(
        &self,
        definition: &Definition,
        schema: &Schema,
        config: &TypeGenConfig,
    ) -> Result<String>;
}

/// Assembles the text of one generated module.
pub trait ModuleFormatter: Send + Sync {
    fn format(&self, input: &ModuleInput<'_>) -> Result<String>;
}

/// How enum types are spelled in generated types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EnumStyle {
    /// Inline union of the value strings.
    #[default]
    Union,
    /// Imported from a per-enum module.
    Module,
}

/// How generated type declarations are exposed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// `export type ...`
    #[default]
    Export,
    /// `declare type ...`, for ambient declaration files.
    Declare,
}

#[derive(Clone, Debug)]
pub struct TypeGenConfig {
    /// GraphQL scalar name to target type.
    pub custom_scalars: BTreeMap<String, String>,
    pub enum_style: EnumStyle,
    /// Fragments that have generated modules. Spreads of other fragments are
    /// left out of fragment references.
    pub existing_fragment_names: BTreeSet<String>,
    /// Input object fields to emit. Empty means every field.
    pub input_field_allowlist: BTreeSet<String>,
    pub runtime_module: String,
    pub output_mode: OutputMode,
}

impl Default for TypeGenConfig {
    fn default() -> Self {
        Self {
            custom_scalars: BTreeMap::new(),
            enum_style: EnumStyle::default(),
            existing_fragment_names: BTreeSet::new(),
            input_field_allowlist: BTreeSet::new(),
            runtime_module: DEFAULT_RUNTIME_MODULE.to_string(),
            output_mode: OutputMode::default(),
        }
    }
}

pub const DEFAULT_RUNTIME_MODULE: &str = "strata-runtime";

/// Everything a formatter needs for one module.
#[derive(Clone, Debug)]
pub struct ModuleInput<'a> {
    pub module_name: &'a str,
    /// The artifact document, as pretty JSON.
    pub document_text: &'a str,
    pub type_text: &'a str,
    pub source_hash: &'a SourceHash,
    pub platform: Option<&'a str>,
    pub runtime_module: &'a str,
}
