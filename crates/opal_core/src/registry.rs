//! Out-of-core object template registry.
//!
//! `ObjectBegin`/`ObjectEnd` scopes accumulate shapes into an open template.
//! Sealing a template writes it to its own file under the registry directory
//! and syncs it to disk before the name becomes visible, so a crash never
//! leaves a visible-but-truncated template behind. Only the name-to-file
//! index stays resident; template bodies are loaded back on demand.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use glam::Mat4;

use crate::error::{ImportError, ImportResult};
use crate::scene::{ObjectInstance, ShapeNode};

/// Template still being accumulated between `ObjectBegin` and `ObjectEnd`.
#[derive(Debug)]
struct OpenTemplate {
    name: String,
    shapes: Vec<ShapeNode>,
}

/// Resident index of sealed templates: name to registry file.
pub type RegistryIndex = HashMap<String, PathBuf>;

#[derive(Debug)]
pub struct TemplateRegistry {
    dir: PathBuf,
    sealed: RegistryIndex,
    open: Option<OpenTemplate>,
}

impl TemplateRegistry {
    pub fn new(dir: impl Into<PathBuf>) -> ImportResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            sealed: RegistryIndex::new(),
            open: None,
        })
    }

    /// Rebuild a registry from a saved index (snapshot resume).
    pub fn from_index(dir: impl Into<PathBuf>, sealed: RegistryIndex) -> Self {
        Self {
            dir: dir.into(),
            sealed,
            open: None,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn open_name(&self) -> Option<&str> {
        self.open.as_ref().map(|t| t.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sealed.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sealed.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sealed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sealed.is_empty()
    }

    pub fn index(&self) -> &RegistryIndex {
        &self.sealed
    }

    pub fn into_index(self) -> RegistryIndex {
        self.sealed
    }

    /// Open a new template scope.
    pub fn begin_template(&mut self, name: &str) -> ImportResult<()> {
        if let Some(open) = &self.open {
            return Err(ImportError::NestedObjectBegin(open.name.clone()));
        }
        if self.sealed.contains_key(name) {
            return Err(ImportError::DuplicateTemplate(name.to_string()));
        }
        self.open = Some(OpenTemplate {
            name: name.to_string(),
            shapes: Vec::new(),
        });
        Ok(())
    }

    /// Add a shape to the open template. Caller checks `is_open` first.
    pub fn add_shape(&mut self, shape: ShapeNode) {
        debug_assert!(self.open.is_some());
        if let Some(open) = &mut self.open {
            open.shapes.push(shape);
        }
    }

    /// Seal the open template: write it out, sync, then publish the name.
    pub fn end_template(&mut self) -> ImportResult<String> {
        let open = self.open.take().ok_or(ImportError::StrayObjectEnd)?;

        let path = self.dir.join(format!("tmpl_{:016x}.json", name_key(&open.name)));
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &open.shapes)?;
        writer.flush()?;
        // Durable before the name is published
        writer.get_ref().sync_all()?;

        log::debug!(
            "sealed template '{}' ({} shapes) at {}",
            open.name,
            open.shapes.len(),
            path.display()
        );
        self.sealed.insert(open.name.clone(), path);
        Ok(open.name)
    }

    /// Reference a sealed template at an instancing transform.
    pub fn instance(&self, name: &str, transform: Mat4) -> ImportResult<ObjectInstance> {
        if !self.sealed.contains_key(name) {
            return Err(ImportError::UnknownTemplate(name.to_string()));
        }
        Ok(ObjectInstance {
            template: name.to_string(),
            transform,
        })
    }

    /// Load a sealed template's shapes back from the registry directory.
    pub fn load(&self, name: &str) -> ImportResult<Vec<ShapeNode>> {
        let path = self
            .sealed
            .get(name)
            .ok_or_else(|| ImportError::UnknownTemplate(name.to_string()))?;
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }
}

fn name_key(name: &str) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::Hasher;
    let mut hasher = DefaultHasher::new();
    hasher.write(name.as_bytes());
    hasher.finish()
}
