use crate::api::DeclarativeViews;
use crate::attributes::AttributeKind;
use crate::compiler::stencil_compiler;
use crate::document::Document;
use crate::error::{DeclarativeError, Result};
use crate::naming::camel_to_dashed;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

const CONFIG_FILENAME: &str = "declarative-views.json";

/// An extra data attribute to register.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DataAttributeConfig {
    /// Dashed (`view-role`) or camel (`viewRole`) name, without `data-`.
    pub name: String,

    #[serde(default)]
    pub json: bool,
}

impl DataAttributeConfig {
    pub fn dashed_name(&self) -> String {
        camel_to_dashed(&self.name)
    }

    pub fn kind(&self) -> AttributeKind {
        if self.json {
            AttributeKind::Json
        } else {
            AttributeKind::Primitive
        }
    }
}

/// Service setup, stored in declarative-views.json
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeclarativeConfig {
    #[serde(default)]
    pub data_attributes: Vec<DataAttributeConfig>,

    /// Compile templates with the stencil compiler
    #[serde(default)]
    pub compile: bool,

    #[serde(default)]
    pub enforce_template_loading: bool,
}

impl DeclarativeConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(DeclarativeError::Io)?;
        let config: DeclarativeConfig =
            serde_json::from_str(&content).map_err(DeclarativeError::Serialization)?;
        debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(DeclarativeError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(DeclarativeError::Serialization)?;
        fs::write(config_path, content).map_err(DeclarativeError::Io)?;
        Ok(())
    }

    /// Registers attributes and switches on the configured features.
    ///
    /// Stops at the first attribute the registry rejects.
    pub fn apply<D: Document>(&self, views: &mut DeclarativeViews<D>) -> Result<()> {
        for attribute in &self.data_attributes {
            views.register_data_attribute(&attribute.dashed_name(), attribute.kind())?;
        }
        if self.compile {
            views.set_boxed_compiler(stencil_compiler());
        }
        if self.enforce_template_loading {
            views.enforce_template_loading();
        }
        Ok(())
    }
}
