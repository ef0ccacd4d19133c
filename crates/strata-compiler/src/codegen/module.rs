use std::fmt::Write;

use super::{ModuleFormatter, ModuleInput, SOURCE_HASH_TAG};
use crate::Result;

/// Emits an ES module: header, types, then the document as the default export.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsModuleFormatter;

impl ModuleFormatter for JsModuleFormatter {
    fn format(&self, input: &ModuleInput<'_>) -> Result<String> {
        let mut out = String::new();
        out.push_str("/**\n");
        out.push_str(" * @generated\n");
        let _ = writeln!(out, " * {SOURCE_HASH_TAG} {}", input.source_hash);
        if let Some(platform) = input.platform {
            let _ = writeln!(out, " * @platform {platform}");
        }
        out.push_str(" */\n\n");
        out.push_str("/* eslint-disable */\n\n");
        let _ = writeln!(
            out,
            "import type {{ GraphQLNode }} from \"{}\";\n",
            input.runtime_module
        );

        let types = input.type_text.trim_end();
        if !types.is_empty() {
            out.push_str(types);
            out.push_str("\n\n");
        }

        let _ = writeln!(out, "const node: GraphQLNode = {};\n", input.document_text.trim_end());
        let _ = writeln!(out, "(node as any).hash = \"{}\";\n", input.source_hash);
        out.push_str("export default node;\n");
        Ok(out)
    }
}
