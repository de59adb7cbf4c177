//! Content-addressed deduplication of heavyweight payloads.
//!
//! `intern` computes a canonical key over the payload's content and returns
//! a stable handle; interning the same content twice returns the first
//! handle without storing a second copy. Keys are order-independent where
//! the payload has unordered parts (parameter sets hash in sorted-name
//! order) and are computed incrementally, so a mesh is walked exactly once.
//!
//! The store never evicts; it lives for the whole import.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fs::{self, File};
use std::hash::Hasher;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ImportResult;
use crate::pbrt::{ParamSet, ParamValue};
use crate::scene::{MeshHandle, MeshPayload, TextureDesc};

/// Meshes at or above this vertex count are written through the out-of-core
/// store instead of staying resident.
pub const SPILL_VERTEX_THRESHOLD: usize = 1024;

/// Feed a payload's content into a hasher.
pub trait ContentHash {
    fn content_hash<H: Hasher>(&self, state: &mut H);
}

/// Canonical content key of a payload.
pub fn content_key<T: ContentHash>(value: &T) -> u64 {
    // DefaultHasher uses fixed keys, so content keys are reproducible
    let mut hasher = DefaultHasher::new();
    value.content_hash(&mut hasher);
    hasher.finish()
}

fn hash_f32<H: Hasher>(state: &mut H, v: f32) {
    state.write_u32(v.to_bits());
}

fn hash_vec3<H: Hasher>(state: &mut H, v: glam::Vec3) {
    hash_f32(state, v.x);
    hash_f32(state, v.y);
    hash_f32(state, v.z);
}

impl ContentHash for ParamValue {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ParamValue::Float(v) => {
                state.write_u8(0);
                state.write_usize(v.len());
                v.iter().for_each(|x| hash_f32(state, *x));
            }
            ParamValue::Int(v) => {
                state.write_u8(1);
                state.write_usize(v.len());
                v.iter().for_each(|x| state.write_i32(*x));
            }
            ParamValue::Bool(b) => {
                state.write_u8(2);
                state.write_u8(*b as u8);
            }
            ParamValue::String(s) => {
                state.write_u8(3);
                state.write(s.as_bytes());
            }
            ParamValue::Point(v) => {
                state.write_u8(4);
                state.write_usize(v.len());
                v.iter().for_each(|x| hash_vec3(state, *x));
            }
            ParamValue::Normal(v) => {
                state.write_u8(5);
                state.write_usize(v.len());
                v.iter().for_each(|x| hash_vec3(state, *x));
            }
            ParamValue::Rgb(v) => {
                state.write_u8(6);
                hash_vec3(state, *v);
            }
            ParamValue::Texture(s) => {
                state.write_u8(7);
                state.write(s.as_bytes());
            }
        }
    }
}

impl ContentHash for ParamSet {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        // Sorted names: the key must not depend on declaration order
        for name in self.sorted_names() {
            state.write(name.as_bytes());
            if let Some(value) = self.get(name) {
                value.content_hash(state);
            }
        }
    }
}

impl ContentHash for TextureDesc {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        state.write(self.value_type.as_bytes());
        state.write(self.class.as_bytes());
        self.params.content_hash(state);
    }
}

impl ContentHash for MeshPayload {
    fn content_hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.positions.len());
        self.positions.iter().for_each(|p| hash_vec3(state, *p));
        match &self.normals {
            Some(normals) => {
                state.write_u8(1);
                normals.iter().for_each(|n| hash_vec3(state, *n));
            }
            None => state.write_u8(0),
        }
        match &self.uvs {
            Some(uvs) => {
                state.write_u8(1);
                uvs.iter().for_each(|uv| {
                    hash_f32(state, uv[0]);
                    hash_f32(state, uv[1]);
                });
            }
            None => state.write_u8(0),
        }
        state.write_usize(self.indices.len());
        self.indices.iter().for_each(|i| state.write_u32(*i));
    }
}

/// In-memory deduplicating store for lightweight payloads (textures).
#[derive(Debug)]
pub struct DedupStore<T> {
    by_key: HashMap<u64, u32>,
    items: Vec<T>,
}

impl<T> Default for DedupStore<T> {
    fn default() -> Self {
        Self {
            by_key: HashMap::new(),
            items: Vec::new(),
        }
    }
}

impl<T: ContentHash> DedupStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a payload; a duplicate returns the existing id.
    pub fn intern(&mut self, payload: T) -> u32 {
        let key = content_key(&payload);
        if let Some(&id) = self.by_key.get(&key) {
            return id;
        }
        let id = self.items.len() as u32;
        self.items.push(payload);
        self.by_key.insert(key, id);
        id
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.items.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// One stored mesh: resident, or spilled to the out-of-core store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MeshEntry {
    Inline(MeshPayload),
    Spilled {
        path: PathBuf,
        vertex_count: usize,
        triangle_count: usize,
    },
}

impl MeshEntry {
    pub fn vertex_count(&self) -> usize {
        match self {
            MeshEntry::Inline(mesh) => mesh.vertex_count(),
            MeshEntry::Spilled { vertex_count, .. } => *vertex_count,
        }
    }

    pub fn triangle_count(&self) -> usize {
        match self {
            MeshEntry::Inline(mesh) => mesh.triangle_count(),
            MeshEntry::Spilled { triangle_count, .. } => *triangle_count,
        }
    }
}

/// Deduplicating mesh store with write-through spill for large payloads.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MeshStore {
    spill_dir: Option<PathBuf>,
    by_key: HashMap<u64, u32>,
    entries: Vec<MeshEntry>,
}

impl MeshStore {
    /// Store that keeps every mesh resident (tests, small scenes).
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Store that spills large meshes into `dir`.
    pub fn with_spill_dir(dir: impl Into<PathBuf>) -> ImportResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            spill_dir: Some(dir),
            ..Self::default()
        })
    }

    /// Intern a mesh payload, spilling it if it crosses the threshold.
    pub fn intern(&mut self, payload: MeshPayload) -> ImportResult<MeshHandle> {
        let key = content_key(&payload);
        if let Some(&id) = self.by_key.get(&key) {
            return Ok(MeshHandle(id));
        }

        let id = self.entries.len() as u32;
        let entry = match &self.spill_dir {
            Some(dir) if payload.vertex_count() >= SPILL_VERTEX_THRESHOLD => {
                let path = dir.join(format!("mesh_{:016x}.json", key));
                let file = File::create(&path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer(&mut writer, &payload)?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
                log::debug!(
                    "spilled mesh {} ({} vertices) to {}",
                    id,
                    payload.vertex_count(),
                    path.display()
                );
                MeshEntry::Spilled {
                    path,
                    vertex_count: payload.vertex_count(),
                    triangle_count: payload.triangle_count(),
                }
            }
            _ => MeshEntry::Inline(payload),
        };

        self.entries.push(entry);
        self.by_key.insert(key, id);
        Ok(MeshHandle(id))
    }

    pub fn entry(&self, handle: MeshHandle) -> Option<&MeshEntry> {
        self.entries.get(handle.0 as usize)
    }

    /// Full payload for a handle, reading spilled meshes back from disk.
    pub fn payload(&self, handle: MeshHandle) -> ImportResult<MeshPayload> {
        match self.entries.get(handle.0 as usize) {
            Some(MeshEntry::Inline(mesh)) => Ok(mesh.clone()),
            Some(MeshEntry::Spilled { path, .. }) => {
                let file = File::open(path)?;
                Ok(serde_json::from_reader(BufReader::new(file))?)
            }
            None => Err(std::io::Error::new(
                ErrorKind::NotFound,
                format!("mesh handle {} out of range", handle.0),
            )
            .into()),
        }
    }

    pub fn entries(&self) -> &[MeshEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
