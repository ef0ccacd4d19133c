//! Schema construction from SDL documents.
//!
//! Building runs in three passes over every registered document:
//! definitions first, then `extend` forms, then a reference check. Errors are
//! collected and reported together as [`Error::Schema`].

use indexmap::IndexMap;
use rowan::TextRange;

use super::{
    BUILTIN_SDL, CLIENT_SDL, DirectiveDef, FieldDef, InputValueDef, Schema, TypeDef, TypeKind,
    TypeRef,
};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::parser::ast::{
    Directive, FieldDefinition, InputValueDefinition, NamedType, TypeSystemDefinition, Value,
};
use crate::parser::cst::SyntaxKind;
use crate::parser::{self, Document, lexer};
use crate::source_map::{SourceId, SourceMap};
use crate::{Error, Result};

/// Incrementally collects SDL documents and turns them into a [`Schema`].
pub struct SchemaBuilder<'s> {
    sources: &'s SourceMap,
    base: Schema,
    documents: Vec<(SourceId, Document)>,
    diagnostics: Diagnostics,
    mark_extension: bool,
}

/// A type converted from one definition, plus where each member was declared.
struct Converted {
    ty: TypeDef,
    members: Vec<(String, TextRange)>,
}

impl<'s> SchemaBuilder<'s> {
    /// Start from the built-in scalars and directives.
    pub fn new(sources: &'s SourceMap) -> Self {
        Self {
            sources,
            base: Schema::builtin(),
            documents: Vec::new(),
            diagnostics: Diagnostics::new(),
            mark_extension: false,
        }
    }

    /// Start from an existing schema. Everything added is flagged as a client
    /// extension.
    pub fn extending(sources: &'s SourceMap, base: &Schema) -> Self {
        Self {
            sources,
            base: base.clone(),
            documents: Vec::new(),
            diagnostics: Diagnostics::new(),
            mark_extension: true,
        }
    }

    /// Parse a registered source and queue it for building.
    pub fn add_source(mut self, id: SourceId) -> Result<Self> {
        let (parse, diagnostics) = parser::parse(self.sources.content(id), id)?;
        self.diagnostics.extend(diagnostics);
        self.documents.push((id, parse.document()));
        Ok(self)
    }

    /// Queue an already parsed document. Only its type-system definitions
    /// are used.
    pub fn add_document(mut self, id: SourceId, document: Document) -> Self {
        self.documents.push((id, document));
        self
    }

    pub fn finish(mut self) -> Result<Schema> {
        if self.diagnostics.has_errors() {
            return Err(Error::Schema(self.diagnostics.filtered()));
        }

        let mut schema = std::mem::take(&mut self.base);
        let documents = std::mem::take(&mut self.documents);

        for (source, document) in &documents {
            for def in document.type_system_definitions() {
                if !def.is_extension() {
                    self.define(&mut schema, *source, &def);
                }
            }
        }
        for (source, document) in &documents {
            for def in document.type_system_definitions() {
                if def.is_extension() {
                    self.extend(&mut schema, *source, &def);
                }
            }
        }
        for (source, document) in &documents {
            for def in document.type_system_definitions() {
                self.check_references(&schema, *source, &def);
            }
        }

        if self.diagnostics.has_errors() {
            return Err(Error::Schema(self.diagnostics));
        }
        schema.resolve_default_roots();
        Ok(schema)
    }

    fn define(&mut self, schema: &mut Schema, source: SourceId, def: &TypeSystemDefinition) {
        match def {
            TypeSystemDefinition::Schema(schema_def) => {
                for root in schema_def.root_operations() {
                    let (Some(operation), Some(name)) = (
                        root.operation_type(),
                        root.named_type().and_then(|t| t.name()),
                    ) else {
                        continue;
                    };
                    let slot = match operation {
                        parser::OperationType::Query => &mut schema.query_type,
                        parser::OperationType::Mutation => &mut schema.mutation_type,
                        parser::OperationType::Subscription => &mut schema.subscription_type,
                    };
                    *slot = Some(name.text().to_string());
                }
            }
            TypeSystemDefinition::Directive(directive) => {
                let Some(name) = directive.name() else {
                    return;
                };
                if schema.directive(name.text()).is_some() {
                    self.diagnostics
                        .report(source, DiagnosticKind::DuplicateType, name.text_range())
                        .message(format!("@{}", name.text()))
                        .emit();
                    return;
                }
                let arguments = self.input_values(source, &directive.arguments());
                schema.insert_directive(DirectiveDef {
                    name: name.text().to_string(),
                    arguments,
                    locations: directive.locations(),
                    repeatable: directive.is_repeatable(),
                    is_client: self.mark_extension,
                });
            }
            _ => {
                let Some(name) = def.name() else {
                    return;
                };
                if let Some(existing) = schema.get_type(name.text()) {
                    let kind = existing.kind;
                    self.diagnostics
                        .report(source, DiagnosticKind::DuplicateType, name.text_range())
                        .message(name.text())
                        .hint(format!("use `extend {}` to add to it", kind.keyword()))
                        .emit();
                    return;
                }
                if let Some(converted) = self.convert(source, def) {
                    schema.insert_type(converted.ty);
                }
            }
        }
    }

    fn extend(&mut self, schema: &mut Schema, source: SourceId, def: &TypeSystemDefinition) {
        if let TypeSystemDefinition::Schema(_) = def {
            // `extend schema` may only add root types.
            self.define(schema, source, def);
            return;
        }
        let Some(name) = def.name() else {
            return;
        };
        let Some(Converted { ty: ext, members }) = self.convert(source, def) else {
            return;
        };
        let mark = self.mark_extension;
        let Some(target) = schema.type_mut(name.text()) else {
            self.diagnostics
                .report(source, DiagnosticKind::UnknownExtensionTarget, name.text_range())
                .message(name.text())
                .emit();
            return;
        };
        if target.kind != ext.kind {
            let message = format!(
                "`{}` is declared with `{}`, not `{}`",
                target.name,
                target.kind.keyword(),
                ext.kind.keyword()
            );
            self.diagnostics
                .report(source, DiagnosticKind::ExtensionKindMismatch, name.text_range())
                .message(message)
                .emit();
            return;
        }

        let range_of = |member: &str| {
            members
                .iter()
                .find(|(n, _)| n == member)
                .map(|(_, r)| *r)
                .unwrap_or_else(|| name.text_range())
        };

        for (field_name, mut field) in ext.fields {
            if target.fields.contains_key(&field_name) {
                self.diagnostics
                    .report(source, DiagnosticKind::DuplicateField, range_of(&field_name))
                    .message(format!("{}.{field_name}", target.name))
                    .emit();
                continue;
            }
            field.is_extension = mark;
            target.fields.insert(field_name, field);
        }
        for (field_name, mut field) in ext.input_fields {
            if target.input_fields.contains_key(&field_name) {
                self.diagnostics
                    .report(source, DiagnosticKind::DuplicateField, range_of(&field_name))
                    .message(format!("{}.{field_name}", target.name))
                    .emit();
                continue;
            }
            field.is_extension = mark;
            target.input_fields.insert(field_name, field);
        }
        for value in ext.enum_values {
            if target.enum_values.contains(&value) {
                self.diagnostics
                    .report(source, DiagnosticKind::DuplicateEnumValue, range_of(&value))
                    .message(format!("{}.{value}", target.name))
                    .emit();
                continue;
            }
            target.enum_values.push(value);
        }
        for interface in ext.interfaces {
            if !target.interfaces.contains(&interface) {
                target.interfaces.push(interface);
            }
        }
        for member in ext.members {
            if !target.members.contains(&member) {
                target.members.push(member);
            }
        }
    }

    /// Convert one type definition, reporting members declared twice in it.
    fn convert(&mut self, source: SourceId, def: &TypeSystemDefinition) -> Option<Converted> {
        let name = def.name()?;
        let kind = match def {
            TypeSystemDefinition::Scalar(_) => TypeKind::Scalar,
            TypeSystemDefinition::Object(_) => TypeKind::Object,
            TypeSystemDefinition::Interface(_) => TypeKind::Interface,
            TypeSystemDefinition::Union(_) => TypeKind::Union,
            TypeSystemDefinition::Enum(_) => TypeKind::Enum,
            TypeSystemDefinition::InputObject(_) => TypeKind::InputObject,
            TypeSystemDefinition::Schema(_) | TypeSystemDefinition::Directive(_) => return None,
        };

        let mut ty = TypeDef::new(name.text(), kind);
        ty.description = def.description();
        ty.is_extension = self.mark_extension;
        let mut members = Vec::new();

        let (fields, interfaces) = match def {
            TypeSystemDefinition::Object(obj) => (obj.fields(), obj.implements()),
            TypeSystemDefinition::Interface(iface) => (iface.fields(), iface.implements()),
            _ => (Vec::new(), Vec::new()),
        };
        ty.interfaces = type_names(&interfaces);
        for field in &fields {
            let Some(converted) = self.field(source, field) else {
                continue;
            };
            let range = field.name().map_or(field.text_range(), |t| t.text_range());
            if ty.fields.contains_key(&converted.name) {
                self.diagnostics
                    .report(source, DiagnosticKind::DuplicateField, range)
                    .message(format!("{}.{}", ty.name, converted.name))
                    .emit();
                continue;
            }
            members.push((converted.name.clone(), range));
            ty.fields.insert(converted.name.clone(), converted);
        }

        match def {
            TypeSystemDefinition::Union(union) => {
                ty.members = type_names(&union.members());
            }
            TypeSystemDefinition::Enum(enum_def) => {
                for value in enum_def.values() {
                    let Some(value_name) = value.name() else {
                        continue;
                    };
                    let text = value_name.text().to_string();
                    if ty.enum_values.contains(&text) {
                        self.diagnostics
                            .report(
                                source,
                                DiagnosticKind::DuplicateEnumValue,
                                value_name.text_range(),
                            )
                            .message(format!("{}.{text}", ty.name))
                            .emit();
                        continue;
                    }
                    members.push((text.clone(), value_name.text_range()));
                    ty.enum_values.push(text);
                }
            }
            TypeSystemDefinition::InputObject(input) => {
                let fields = input.fields();
                for field in &fields {
                    if let Some(name) = field.name() {
                        members.push((name.text().to_string(), name.text_range()));
                    }
                }
                ty.input_fields = self.input_values(source, &fields);
            }
            _ => {}
        }

        Some(Converted { ty, members })
    }

    fn field(&mut self, source: SourceId, field: &FieldDefinition) -> Option<FieldDef> {
        let name = field.name()?;
        let ty = TypeRef::from_ast(&field.ty()?)?;
        let mut def = FieldDef::new(name.text(), ty);
        def.arguments = self.input_values(source, &field.arguments());
        def.description = field.description();
        def.deprecation = deprecation(&field.directives());
        def.is_extension = self.mark_extension;
        Some(def)
    }

    fn input_values(
        &mut self,
        source: SourceId,
        values: &[InputValueDefinition],
    ) -> IndexMap<String, InputValueDef> {
        let mut out = IndexMap::new();
        for value in values {
            let (Some(name), Some(ty)) = (value.name(), value.ty()) else {
                continue;
            };
            let Some(ty) = TypeRef::from_ast(&ty) else {
                continue;
            };
            if out.contains_key(name.text()) {
                self.diagnostics
                    .report(source, DiagnosticKind::DuplicateField, name.text_range())
                    .message(name.text())
                    .emit();
                continue;
            }
            out.insert(
                name.text().to_string(),
                InputValueDef {
                    name: name.text().to_string(),
                    ty,
                    default_value: value.default_value().map(|v| value_text(&v)),
                    description: value.description(),
                    is_extension: self.mark_extension,
                },
            );
        }
        out
    }

    fn check_references(&mut self, schema: &Schema, source: SourceId, def: &TypeSystemDefinition) {
        for named in def.as_cst().descendants().filter_map(NamedType::cast) {
            let Some(name) = named.name() else {
                continue;
            };
            let parent = named.as_cst().parent().map(|p| p.kind());
            let Some(target) = schema.get_type(name.text()) else {
                self.diagnostics
                    .report(source, DiagnosticKind::UnknownSchemaType, name.text_range())
                    .message(name.text())
                    .emit();
                continue;
            };
            match parent {
                Some(SyntaxKind::ImplementsInterfaces) if target.kind != TypeKind::Interface => {
                    self.diagnostics
                        .report(source, DiagnosticKind::InvalidImplementedType, name.text_range())
                        .message(format!("`{}` is not an interface", name.text()))
                        .emit();
                }
                Some(SyntaxKind::UnionMemberTypes) if target.kind != TypeKind::Object => {
                    self.diagnostics
                        .report(source, DiagnosticKind::InvalidUnionMember, name.text_range())
                        .message(format!("`{}` is not an object type", name.text()))
                        .emit();
                }
                _ => {}
            }
        }
    }
}

impl Schema {
    /// A schema holding only built-in scalars and directives.
    pub fn builtin() -> Schema {
        let mut schema = Schema::default();
        for (sdl, is_client) in [(BUILTIN_SDL, false), (CLIENT_SDL, true)] {
            let Ok((parse, _)) = parser::parse(sdl, SourceId::default()) else {
                unreachable!("built-in SDL is small and well-formed");
            };
            for def in parse.document().type_system_definitions() {
                match &def {
                    TypeSystemDefinition::Scalar(_) => {
                        if let Some(name) = def.name() {
                            schema.insert_type(TypeDef::new(name.text(), TypeKind::Scalar));
                        }
                    }
                    TypeSystemDefinition::Directive(directive) => {
                        let Some(name) = directive.name() else {
                            continue;
                        };
                        let arguments = directive
                            .arguments()
                            .iter()
                            .filter_map(|arg| {
                                let name = arg.name()?.text().to_string();
                                let ty = TypeRef::from_ast(&arg.ty()?)?;
                                Some((
                                    name.clone(),
                                    InputValueDef {
                                        name,
                                        ty,
                                        default_value: arg.default_value().map(|v| value_text(&v)),
                                        description: None,
                                        is_extension: false,
                                    },
                                ))
                            })
                            .collect();
                        schema.insert_directive(DirectiveDef {
                            name: name.text().to_string(),
                            arguments,
                            locations: directive.locations(),
                            repeatable: directive.is_repeatable(),
                            is_client,
                        });
                    }
                    _ => {}
                }
            }
        }
        schema
    }
}

fn type_names(types: &[NamedType]) -> Vec<String> {
    types
        .iter()
        .filter_map(|t| t.name())
        .map(|t| t.text().to_string())
        .collect()
}

/// Source text of a value with surrounding trivia removed.
fn value_text(value: &Value) -> String {
    value.as_cst().text().to_string().trim().to_string()
}

fn deprecation(directives: &[Directive]) -> Option<String> {
    let deprecated = directives
        .iter()
        .find(|d| d.name().is_some_and(|n| n.text() == "deprecated"))?;
    let reason = deprecated
        .argument("reason")
        .and_then(|a| a.value())
        .and_then(|v| match v {
            Value::Scalar(s) => s.token().map(|t| lexer::string_value(t.text())),
            _ => None,
        });
    Some(reason.unwrap_or_else(|| "No longer supported".to_string()))
}

/// Build a schema from every source in `ids`.
pub fn build_schema(sources: &SourceMap, ids: &[SourceId]) -> Result<Schema> {
    let mut builder = SchemaBuilder::new(sources);
    for id in ids {
        builder = builder.add_source(*id)?;
    }
    builder.finish()
}
