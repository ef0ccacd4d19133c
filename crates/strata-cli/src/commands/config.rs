//! `strata.toml` project configuration.
//!
//! Every key is optional. Relative paths are resolved against the directory
//! holding the config file, or the working directory when there is none.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use strata_compiler::codegen::{EnumStyle, TypeGenConfig, WriterConfig};
use strata_compiler::lower::LowerOptions;

pub const CONFIG_FILE: &str = "strata.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumStyleSetting {
    #[default]
    Union,
    Module,
}

impl From<EnumStyleSetting> for EnumStyle {
    fn from(setting: EnumStyleSetting) -> Self {
        match setting {
            EnumStyleSetting::Union => EnumStyle::Union,
            EnumStyleSetting::Module => EnumStyle::Module,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Server schema SDL.
    pub schema: PathBuf,
    /// Roots searched for project documents.
    pub src: Vec<PathBuf>,
    /// Roots of shared documents that are referenced but never generated.
    pub base: Vec<PathBuf>,
    /// Client schema extension files.
    pub extensions: Vec<PathBuf>,
    /// Single output directory. Unset writes next to each source.
    pub output: Option<PathBuf>,
    pub generated_dir: String,
    pub artifact_extension: String,
    pub custom_scalars: BTreeMap<String, String>,
    pub enum_style: EnumStyleSetting,
    pub runtime_module: String,
    pub platform: Option<String>,
    /// Combined persisted-query map. Setting it turns persisting on.
    pub persist_output: Option<PathBuf>,
    pub manifest_name: String,
    /// File extensions searched under the source roots.
    pub include: Vec<String>,
    /// Directory names never descended into.
    pub exclude: Vec<String>,
    pub validate_names: bool,
    pub identity_interface: Option<String>,

    #[serde(skip)]
    root: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let writer = WriterConfig::default();
        Self {
            schema: PathBuf::from("schema.graphql"),
            src: vec![PathBuf::from("src")],
            base: Vec::new(),
            extensions: Vec::new(),
            output: None,
            generated_dir: writer.generated_dir().to_string(),
            artifact_extension: "ts".to_string(),
            custom_scalars: BTreeMap::new(),
            enum_style: EnumStyleSetting::default(),
            runtime_module: TypeGenConfig::default().runtime_module,
            platform: None,
            persist_output: None,
            manifest_name: writer.manifest_file_name().to_string(),
            include: ["graphql", "js", "jsx", "ts", "tsx"]
                .map(String::from)
                .to_vec(),
            exclude: vec!["node_modules".to_string()],
            validate_names: true,
            identity_interface: None,
            root: PathBuf::from("."),
        }
    }
}

impl ProjectConfig {
    /// Load `explicit`, or `strata.toml` in the working directory if present,
    /// or fall back to defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).is_file() => Self::load(Path::new(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.root = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `path` relative to the config directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn is_persisting(&self) -> bool {
        self.persist_output.is_some()
    }

    pub fn typegen_config(&self) -> TypeGenConfig {
        TypeGenConfig {
            custom_scalars: self.custom_scalars.clone(),
            enum_style: self.enum_style.into(),
            runtime_module: self.runtime_module.clone(),
            ..TypeGenConfig::default()
        }
    }

    pub fn writer_config(&self, validate_only: bool) -> WriterConfig {
        let mut config = WriterConfig::new()
            .generated_dir_name(&self.generated_dir)
            .extension(&self.artifact_extension)
            .manifest_name(&self.manifest_name)
            .validate_only(validate_only)
            .typegen(self.typegen_config());
        if let Some(output) = &self.output {
            config = config.output_dir(self.resolve(output));
        }
        if let Some(platform) = &self.platform {
            config = config.platform(platform);
        }
        config
    }

    pub fn lower_options(&self) -> LowerOptions {
        match &self.identity_interface {
            Some(interface) => LowerOptions::new().identity_interface(interface),
            None => LowerOptions::new(),
        }
    }

    /// Whether files with this extension are read as documents or modules.
    pub fn includes(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.include.iter().any(|i| i == ext))
    }

    /// Whether a directory with this name is skipped.
    pub fn excludes(&self, name: &str) -> bool {
        name == self.generated_dir || self.exclude.iter().any(|e| e == name)
    }
}
