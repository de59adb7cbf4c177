//! Opal Core - PBRT scene-description import for out-of-core rendering.
//!
//! This crate provides:
//!
//! - **Scene parsing**: tokenizer and statement reader for the PBRT text format
//! - **Scene construction**: graphics-state stack machine and scene-graph builder
//! - **Deduplication**: content-addressed stores for meshes and textures
//! - **Object templates**: out-of-core registry for instanced geometry
//! - **Configuration**: camera and film extraction, snapshots for resuming
//!
//! # Example
//!
//! ```ignore
//! use opal_core::builder::{load_pbrt_file, ImportOptions};
//! use opal_core::config::{extract_config, Selection};
//!
//! // Import a scene description
//! let loaded = load_pbrt_file("scene.pbrt", "scene_store", ImportOptions::default())?;
//! let config = extract_config(&loaded.scene, Selection::First)?;
//! println!("Imported {} shapes, {} instances at {}x{}",
//!     loaded.scene.shape_count(),
//!     loaded.scene.instance_count(),
//!     config.resolution.0,
//!     config.resolution.1);
//! ```

pub mod builder;
pub mod config;
pub mod dedup;
pub mod error;
pub mod pbrt;
pub mod registry;
pub mod scene;
pub mod snapshot;
pub mod state;

// Re-export commonly used types
pub use builder::{load_pbrt_file, load_pbrt_str, ImportOptions, LoadedScene, SceneBuilder};
pub use config::{extract_config, CameraConfig, Selection};
pub use error::{ImportError, ImportResult};
pub use scene::SceneGraph;
