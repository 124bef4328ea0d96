//! `LastUser.set`: per-user project settings.

use std::path::Path;

use super::{load_document, PackageError};
use crate::util::fs::FileSystem;
use crate::xml::{self, XmlDocument};

/// The settings this crate cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserSettings {
    /// `ConfigurationManager@ActiveConfigurationName`
    pub active_configuration: Option<String>,
    /// `Deployment@ActiveTarget`
    pub active_target: Option<String>,
}

impl UserSettings {
    pub fn from_document(document: &XmlDocument) -> Self {
        let root = &document.root;
        let non_empty = |v: &str| {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        };

        UserSettings {
            active_configuration: root
                .child("ConfigurationManager")
                .and_then(|c| c.attr("ActiveConfigurationName"))
                .and_then(non_empty),
            active_target: root
                .child("Deployment")
                .and_then(|d| d.attr("ActiveTarget"))
                .and_then(non_empty),
        }
    }

    pub fn parse(path: &Path, text: &str) -> Result<Self, PackageError> {
        let document = xml::parse(text).map_err(|source| PackageError::Xml {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_document(&document))
    }

    pub async fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, PackageError> {
        Ok(Self::from_document(&load_document(fs, path).await?))
    }
}
