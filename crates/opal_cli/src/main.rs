//! Opal CLI - Import PBRT scene descriptions into the Opal scene format.
//!
//! Reads a `.pbrt` document (or resumes a previously written snapshot),
//! extracts the render configuration, and writes the normalized scene as
//! JSON alongside the out-of-core mesh and template stores.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use opal_core::builder::{load_pbrt_file, ImportOptions, LoadedScene};
use opal_core::config::{extract_config, CameraConfig, Selection};
use opal_core::dedup::MeshStore;
use opal_core::scene::{SceneGraph, ShapeNode};
use opal_core::snapshot::{load_snapshot, save_snapshot};

#[derive(Parser)]
#[command(name = "opal")]
#[command(about = "Import a PBRT scene description", long_about = None)]
struct Cli {
    /// Input scene: a .pbrt document, or a snapshot written with --intermediate
    input: PathBuf,

    /// Output scene file (JSON)
    #[arg(short, long)]
    out: PathBuf,

    /// Directory for spilled meshes and object templates
    /// (default: "<out>_store" next to the output file)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Write an intermediate snapshot here after the import finishes
    #[arg(long)]
    intermediate: Option<PathBuf>,

    /// Skip dangling material/texture/template references instead of aborting
    #[arg(long)]
    lenient: bool,

    /// Which declaration wins when a scene has several cameras or films:
    /// "first", a zero-based index, or "ask"
    #[arg(long, default_value = "first")]
    select: String,
}

/// The exported scene document.
#[derive(Serialize)]
struct ExportDoc<'a> {
    config: CameraConfig,
    scene: &'a SceneGraph,
    meshes: &'a MeshStore,
    /// Template bodies read back from the registry, by name
    templates: HashMap<String, Vec<ShapeNode>>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let cli = Cli::parse();
    let selection = parse_selection(&cli.select)?;

    let loaded = if is_pbrt(&cli.input) {
        let store = cli
            .store
            .clone()
            .unwrap_or_else(|| default_store_dir(&cli.out));
        log::info!("importing {}", cli.input.display());
        load_pbrt_file(&cli.input, &store, ImportOptions { lenient: cli.lenient })
            .with_context(|| format!("failed to import {}", cli.input.display()))?
    } else {
        log::info!("resuming snapshot {}", cli.input.display());
        load_snapshot(&cli.input)
            .with_context(|| format!("failed to resume {}", cli.input.display()))?
    };

    log::info!(
        "scene: {} shapes, {} instances, {} templates, {} unique meshes",
        loaded.scene.shape_count(),
        loaded.scene.instance_count(),
        loaded.templates.len(),
        loaded.meshes.len()
    );

    if let Some(path) = &cli.intermediate {
        save_snapshot(&loaded, path)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
    }

    let config = extract_config(&loaded.scene, selection)?;
    log::info!(
        "camera: {} fov {} at {}x{}",
        config.kind,
        config.fov,
        config.resolution.0,
        config.resolution.1
    );

    export(&loaded, config, &cli.out)
        .with_context(|| format!("failed to write {}", cli.out.display()))?;
    log::info!("wrote {}", cli.out.display());
    Ok(())
}

fn export(loaded: &LoadedScene, config: CameraConfig, out: &Path) -> Result<()> {
    let mut templates = HashMap::new();
    for name in loaded.templates.names() {
        templates.insert(name.to_string(), loaded.templates.load(name)?);
    }

    let file = File::create(out)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(
        &mut writer,
        &ExportDoc {
            config,
            scene: &loaded.scene,
            meshes: &loaded.meshes,
            templates,
        },
    )?;
    writer.flush()?;
    Ok(())
}

fn is_pbrt(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "pbrt")
}

fn default_store_dir(out: &Path) -> PathBuf {
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene".to_string());
    out.with_file_name(format!("{}_store", stem))
}

fn parse_selection(value: &str) -> Result<Selection> {
    match value {
        "first" => Ok(Selection::First),
        "ask" => Ok(Selection::Interactive),
        other => match other.parse::<usize>() {
            Ok(i) => Ok(Selection::Index(i)),
            Err(_) => bail!("invalid --select value '{}': expected \"first\", \"ask\", or an index", other),
        },
    }
}
