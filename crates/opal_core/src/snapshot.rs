//! Intermediate scene snapshots.
//!
//! A snapshot captures a finished import (scene graph, mesh store, template
//! index) in one file so downstream passes can resume without re-parsing the
//! source document. Template bodies stay in the registry directory; the
//! snapshot only records the index that points at them.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::builder::LoadedScene;
use crate::dedup::MeshStore;
use crate::error::ImportResult;
use crate::registry::{RegistryIndex, TemplateRegistry};
use crate::scene::SceneGraph;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    scene: &'a SceneGraph,
    meshes: &'a MeshStore,
    template_dir: &'a Path,
    templates: &'a RegistryIndex,
}

#[derive(Deserialize)]
struct SnapshotOwned {
    scene: SceneGraph,
    meshes: MeshStore,
    template_dir: PathBuf,
    templates: RegistryIndex,
}

/// Write a snapshot of a finished import, synced to disk before returning.
pub fn save_snapshot(loaded: &LoadedScene, path: impl AsRef<Path>) -> ImportResult<()> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(
        &mut writer,
        &SnapshotRef {
            scene: &loaded.scene,
            meshes: &loaded.meshes,
            template_dir: loaded.templates.dir(),
            templates: loaded.templates.index(),
        },
    )?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    log::info!("snapshot written to {}", path.display());
    Ok(())
}

/// Resume a finished import from a snapshot file.
pub fn load_snapshot(path: impl AsRef<Path>) -> ImportResult<LoadedScene> {
    let file = File::open(path.as_ref())?;
    let snapshot: SnapshotOwned = serde_json::from_reader(BufReader::new(file))?;
    Ok(LoadedScene {
        scene: snapshot.scene,
        meshes: snapshot.meshes,
        templates: TemplateRegistry::from_index(snapshot.template_dir, snapshot.templates),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{load_pbrt_str, ImportOptions};

    #[test]
    fn test_snapshot_round_trip() {
        let dir = std::env::temp_dir().join(format!("opal_snapshot_{}", std::process::id()));
        std::fs::remove_dir_all(&dir).ok();

        let loaded = load_pbrt_str(
            r#"
            Camera "perspective" "float fov" [45]
            Film "image"
            WorldBegin
            ObjectBegin "tree"
            Shape "sphere" "float radius" [1]
            ObjectEnd
            ObjectInstance "tree"
            Shape "trianglemesh"
                "point P" [0 0 0  1 0 0  0 1 0]
                "integer indices" [0 1 2]
            WorldEnd
            "#,
            dir.join("store"),
            ImportOptions::default(),
        )
        .unwrap();

        let snapshot_path = dir.join("scene.snapshot.json");
        save_snapshot(&loaded, &snapshot_path).unwrap();
        let resumed = load_snapshot(&snapshot_path).unwrap();

        assert_eq!(resumed.scene.shape_count(), loaded.scene.shape_count());
        assert_eq!(resumed.scene.instance_count(), 1);
        assert_eq!(resumed.meshes.len(), loaded.meshes.len());
        // Template bodies are still reachable through the resumed index
        assert_eq!(resumed.templates.load("tree").unwrap().len(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }
}
