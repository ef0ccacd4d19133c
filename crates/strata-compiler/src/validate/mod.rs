//! Document validation against a schema.
//!
//! Rules come in two flavors. Local rules look at one definition at a time
//! and never depend on each other. Global rules see the whole document set
//! (for name uniqueness and fragment graphs). Every rule writes into a shared
//! [`Diagnostics`]; nothing stops at the first problem.

pub mod rules;
pub mod visitor;


use indexmap::IndexMap;

use crate::diagnostics::Diagnostics;
use crate::document_store::Document;
use crate::parser::ast;
use crate::schema::Schema;
use crate::source_map::SourceId;
use crate::{Error, Result};

/// What a local rule sees: one executable definition.
pub struct LocalContext<'a> {
    pub schema: &'a Schema,
    pub source: SourceId,
    pub definition: &'a ast::Definition,
    /// All fragments of the document set, for rules that follow spreads.
    pub fragments: &'a FragmentIndex,
}

/// What a global rule sees: every document at once.
pub struct GlobalContext<'a> {
    pub schema: &'a Schema,
    pub documents: &'a [&'a Document],
    pub fragments: &'a FragmentIndex,
}

pub type LocalCheck = fn(&LocalContext<'_>, &mut Diagnostics);
pub type GlobalCheck = fn(&GlobalContext<'_>, &mut Diagnostics);

#[derive(Clone, Copy)]
pub struct LocalRule {
    pub name: &'static str,
    pub check: LocalCheck,
}

#[derive(Clone, Copy)]
pub struct GlobalRule {
    pub name: &'static str,
    pub check: GlobalCheck,
}

/// Ordered local and global rules.
#[derive(Clone, Default)]
pub struct RuleSet {
    local: Vec<LocalRule>,
    global: Vec<GlobalRule>,
}

impl RuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        Self {
            local: rules::LOCAL.to_vec(),
            global: rules::GLOBAL.to_vec(),
        }
    }

    pub fn local(mut self, name: &'static str, check: LocalCheck) -> Self {
        self.local.push(LocalRule { name, check });
        self
    }

    pub fn global(mut self, name: &'static str, check: GlobalCheck) -> Self {
        self.global.push(GlobalRule { name, check });
        self
    }

    /// Append `other` after these rules, keeping locals and globals apart.
    pub fn with(mut self, other: RuleSet) -> Self {
        self.local.extend(other.local);
        self.global.extend(other.global);
        self
    }

    pub fn local_rules(&self) -> &[LocalRule] {
        &self.local
    }

    pub fn global_rules(&self) -> &[GlobalRule] {
        &self.global
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("local", &self.local.iter().map(|r| r.name).collect::<Vec<_>>())
            .field("global", &self.global.iter().map(|r| r.name).collect::<Vec<_>>())
            .finish()
    }
}

/// Fragments of a document set by name. The first definition of a name wins.
#[derive(Debug, Default)]
pub struct FragmentIndex {
    fragments: IndexMap<String, (SourceId, ast::FragmentDefinition)>,
}

impl FragmentIndex {
    pub fn new(documents: &[&Document]) -> Self {
        let mut fragments = IndexMap::new();
        for doc in documents {
            for frag in doc.document().fragments() {
                if let Some(name) = frag.name() {
                    fragments
                        .entry(name.text().to_string())
                        .or_insert((doc.source(), frag));
                }
            }
        }
        Self { fragments }
    }

    pub fn get(&self, name: &str) -> Option<&(SourceId, ast::FragmentDefinition)> {
        self.fragments.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SourceId, &ast::FragmentDefinition)> {
        self.fragments
            .iter()
            .map(|(name, (source, frag))| (name.as_str(), *source, frag))
    }
}

pub struct Validator {
    rules: RuleSet,
}

impl Validator {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Run every rule over `documents`.
    ///
    /// Returns the warnings on success. Any error fails the whole set with
    /// every diagnostic, errors and warnings alike, in source order.
    pub fn validate(&self, documents: &[&Document], schema: &Schema) -> Result<Diagnostics> {
        let _span = tracing::debug_span!("validate", documents = documents.len()).entered();
        let fragments = FragmentIndex::new(documents);
        let mut diagnostics = Diagnostics::new();

        for doc in documents {
            for definition in doc.document().definitions() {
                if matches!(definition, ast::Definition::TypeSystem(_)) {
                    continue;
                }
                let ctx = LocalContext {
                    schema,
                    source: doc.source(),
                    definition: &definition,
                    fragments: &fragments,
                };
                for rule in &self.rules.local {
                    (rule.check)(&ctx, &mut diagnostics);
                }
            }
        }

        let ctx = GlobalContext {
            schema,
            documents,
            fragments: &fragments,
        };
        for rule in &self.rules.global {
            (rule.check)(&ctx, &mut diagnostics);
        }

        let diagnostics = diagnostics.sorted();
        if diagnostics.has_errors() {
            tracing::debug!(errors = diagnostics.error_count(), "validation failed");
            return Err(Error::Validation(diagnostics));
        }
        tracing::debug!(warnings = diagnostics.warning_count(), "validation passed");
        Ok(diagnostics)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(RuleSet::builtin())
    }
}
