//! Material and table preset loader.
//!
//! Loads physical properties from YAML files, so balls, cloths, cushions and
//! tables can be swapped without recompiling.
//!
//! ## Directory Structure
//!
//! ```text
//! materials/
//! ├── balls/
//! │   └── standard.yaml
//! ├── cloths/
//! │   └── worsted.yaml
//! ├── cushions/
//! │   └── k66.yaml
//! ├── tables/
//! │   └── standard.yaml
//! └── configs/
//!     ├── default.yaml
//!     └── marlow.yaml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::config::PhysicsConfig;
use crate::error::MaterialError;
use crate::table::PoolTable;
use crate::types::{BallProperties, ClothProperties, CushionProperties};

/// Preset loader rooted at a materials directory.
pub struct MaterialLoader {
    base_path: PathBuf,
}

impl MaterialLoader {
    /// Create a loader for `base_path`, which holds the `balls/`, `cloths/`,
    /// `cushions/`, `tables/` and `configs/` subdirectories.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load a ball by name (without .yaml extension).
    ///
    /// # Example
    /// ```ignore
    /// let loader = MaterialLoader::new("materials");
    /// let ball = loader.load_ball("standard")?;
    /// ```
    pub fn load_ball(&self, name: &str) -> Result<BallProperties, MaterialError> {
        self.load("balls", "ball", name)
    }

    pub fn load_cloth(&self, name: &str) -> Result<ClothProperties, MaterialError> {
        self.load("cloths", "cloth", name)
    }

    pub fn load_cushion(&self, name: &str) -> Result<CushionProperties, MaterialError> {
        self.load("cushions", "cushion", name)
    }

    pub fn load_table(&self, name: &str) -> Result<PoolTable, MaterialError> {
        self.load("tables", "table", name)
    }

    /// Load a complete simulation configuration.
    pub fn load_config(&self, name: &str) -> Result<PhysicsConfig, MaterialError> {
        self.load("configs", "config", name)
    }

    pub fn list_balls(&self) -> Result<Vec<String>, MaterialError> {
        self.list_presets("balls")
    }

    pub fn list_cloths(&self) -> Result<Vec<String>, MaterialError> {
        self.list_presets("cloths")
    }

    pub fn list_cushions(&self) -> Result<Vec<String>, MaterialError> {
        self.list_presets("cushions")
    }

    pub fn list_tables(&self) -> Result<Vec<String>, MaterialError> {
        self.list_presets("tables")
    }

    pub fn list_configs(&self) -> Result<Vec<String>, MaterialError> {
        self.list_presets("configs")
    }

    fn load<T: DeserializeOwned>(
        &self,
        subdir: &str,
        kind: &'static str,
        name: &str,
    ) -> Result<T, MaterialError> {
        let path = self.base_path.join(subdir).join(format!("{}.yaml", name));
        if !path.exists() {
            return Err(MaterialError::NotFound {
                kind,
                name: name.to_string(),
            });
        }
        let contents = fs::read_to_string(&path).map_err(|source| MaterialError::Io {
            path: path.clone(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| MaterialError::Parse { path, source })
    }

    fn list_presets(&self, subdir: &str) -> Result<Vec<String>, MaterialError> {
        let path = self.base_path.join(subdir);
        if !path.exists() {
            return Ok(vec![]);
        }
        let io_error = |source| MaterialError::Io {
            path: path.clone(),
            source,
        };

        let mut names = Vec::new();
        for entry in fs::read_dir(&path).map_err(io_error)? {
            let entry = entry.map_err(io_error)?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".yaml") {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================
