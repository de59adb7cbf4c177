//! Render-configuration extraction from an imported scene.
//!
//! Pulls the camera and film declarations out of the scene graph and
//! normalizes them into a single [`CameraConfig`]. Scenes may legally carry
//! several cameras or films; which one wins is a [`Selection`] policy
//! decided by the caller.

use std::io::{self, BufRead, Write};

use glam::Mat4;
use opal_math::Mat4Ext;
use serde::{Deserialize, Serialize};

use crate::error::{ImportError, ImportResult};
use crate::scene::{CameraRecord, ConfigRecord, SceneGraph};

const DEFAULT_FOV: f32 = 90.0;
const DEFAULT_RESOLUTION: (u32, u32) = (640, 480);

/// Policy for resolving multiple camera or film declarations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    /// Take the first declaration in document order.
    #[default]
    First,
    /// Take the declaration at this zero-based index.
    Index(usize),
    /// Prompt on the terminal.
    Interactive,
}

/// Normalized render configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraConfig {
    pub kind: String,
    pub resolution: (u32, u32),
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub camera_to_world: Mat4,
}

/// Extract the render configuration from an imported scene.
pub fn extract_config(scene: &SceneGraph, selection: Selection) -> ImportResult<CameraConfig> {
    if scene.cameras.is_empty() {
        return Err(ImportError::NoCameraDefined);
    }
    if scene.films.is_empty() {
        return Err(ImportError::NoFilmDefined);
    }

    let camera = pick(&scene.cameras, selection, "camera", describe_camera)?;
    let film = pick(&scene.films, selection, "film", describe_film)?;

    if camera.kind != "perspective" {
        return Err(ImportError::UnsupportedCamera(camera.kind.clone()));
    }

    let resolution = (
        film.params
            .int("xresolution")
            .map(|x| x as u32)
            .unwrap_or(DEFAULT_RESOLUTION.0),
        film.params
            .int("yresolution")
            .map(|y| y as u32)
            .unwrap_or(DEFAULT_RESOLUTION.1),
    );

    let camera_to_world = camera
        .world_to_camera
        .try_inverse()
        .ok_or(ImportError::SingularTransform)?;

    Ok(CameraConfig {
        kind: camera.kind.clone(),
        resolution,
        fov: camera.params.float("fov").unwrap_or(DEFAULT_FOV),
        camera_to_world,
    })
}

fn pick<'a, T>(
    items: &'a [T],
    selection: Selection,
    what: &'static str,
    describe: fn(&T) -> String,
) -> ImportResult<&'a T> {
    match selection {
        // An explicit index is bounds-checked even against a sole candidate
        Selection::Index(i) => items.get(i).ok_or(ImportError::AmbiguousSelection {
            what,
            count: items.len(),
        }),
        _ if items.len() == 1 => Ok(&items[0]),
        Selection::First => {
            log::warn!("{} {}s declared, using the first", items.len(), what);
            Ok(&items[0])
        }
        Selection::Interactive => prompt(items, what, describe),
    }
}

/// Terminal prompt for picking one of several declarations.
fn prompt<'a, T>(
    items: &'a [T],
    what: &'static str,
    describe: fn(&T) -> String,
) -> ImportResult<&'a T> {
    let stderr = io::stderr();
    let stdin = io::stdin();
    loop {
        {
            let mut out = stderr.lock();
            writeln!(out, "multiple {}s declared:", what)?;
            for (i, item) in items.iter().enumerate() {
                writeln!(out, "  [{}] {}", i, describe(item))?;
            }
            write!(out, "pick one: ")?;
            out.flush()?;
        }
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF on the terminal: nothing left to ask
            return Err(ImportError::AmbiguousSelection {
                what,
                count: items.len(),
            });
        }
        if let Ok(i) = line.trim().parse::<usize>() {
            if let Some(item) = items.get(i) {
                return Ok(item);
            }
        }
    }
}

fn describe_camera(camera: &CameraRecord) -> String {
    match camera.params.float("fov") {
        Some(fov) => format!("{} (fov {})", camera.kind, fov),
        None => camera.kind.clone(),
    }
}

fn describe_film(film: &ConfigRecord) -> String {
    format!(
        "{} {}x{}",
        film.kind,
        film.params.int("xresolution").unwrap_or(DEFAULT_RESOLUTION.0 as i32),
        film.params.int("yresolution").unwrap_or(DEFAULT_RESOLUTION.1 as i32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pbrt::{ParamSet, ParamValue};

    fn camera(fov: Option<f32>) -> CameraRecord {
        let mut params = ParamSet::new();
        if let Some(fov) = fov {
            params.insert("fov", ParamValue::Float(vec![fov]));
        }
        CameraRecord {
            kind: "perspective".to_string(),
            params,
            world_to_camera: Mat4::from_translation(glam::Vec3::new(0.0, 0.0, -5.0)),
        }
    }

    fn film(x: i32, y: i32) -> ConfigRecord {
        let mut params = ParamSet::new();
        params.insert("xresolution", ParamValue::Int(vec![x]));
        params.insert("yresolution", ParamValue::Int(vec![y]));
        ConfigRecord {
            directive: "Film".to_string(),
            kind: "image".to_string(),
            params,
        }
    }

    fn scene_with(cameras: Vec<CameraRecord>, films: Vec<ConfigRecord>) -> SceneGraph {
        SceneGraph {
            cameras,
            films,
            ..SceneGraph::default()
        }
    }

    #[test]
    fn test_extracts_camera_and_film() {
        let scene = scene_with(vec![camera(Some(45.0))], vec![film(800, 600)]);
        let config = extract_config(&scene, Selection::First).unwrap();
        assert_eq!(config.kind, "perspective");
        assert_eq!(config.fov, 45.0);
        assert_eq!(config.resolution, (800, 600));
        // camera_to_world inverts the recorded world-to-camera transform
        let translation = config.camera_to_world.w_axis;
        assert!((translation.z - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_fov_and_resolution_defaults() {
        let mut f = film(800, 600);
        f.params = ParamSet::new();
        let scene = scene_with(vec![camera(None)], vec![f]);
        let config = extract_config(&scene, Selection::First).unwrap();
        assert_eq!(config.fov, DEFAULT_FOV);
        assert_eq!(config.resolution, DEFAULT_RESOLUTION);
    }

    #[test]
    fn test_no_camera_is_an_error() {
        let scene = scene_with(vec![], vec![film(800, 600)]);
        assert!(matches!(
            extract_config(&scene, Selection::First),
            Err(ImportError::NoCameraDefined)
        ));
    }

    #[test]
    fn test_no_film_is_an_error() {
        let scene = scene_with(vec![camera(None)], vec![]);
        assert!(matches!(
            extract_config(&scene, Selection::First),
            Err(ImportError::NoFilmDefined)
        ));
    }

    #[test]
    fn test_unsupported_camera_kind() {
        let mut cam = camera(None);
        cam.kind = "orthographic".to_string();
        let scene = scene_with(vec![cam], vec![film(800, 600)]);
        assert!(matches!(
            extract_config(&scene, Selection::First),
            Err(ImportError::UnsupportedCamera(kind)) if kind == "orthographic"
        ));
    }

    #[test]
    fn test_index_selection_picks_and_bounds_checks() {
        let scene = scene_with(
            vec![camera(Some(30.0)), camera(Some(60.0))],
            vec![film(800, 600), film(800, 600)],
        );
        let config = extract_config(&scene, Selection::Index(1)).unwrap();
        assert_eq!(config.fov, 60.0);

        assert!(matches!(
            extract_config(&scene, Selection::Index(5)),
            Err(ImportError::AmbiguousSelection { what: "camera", count: 2 })
        ));
    }

    #[test]
    fn test_index_out_of_range_with_single_candidate() {
        let scene = scene_with(vec![camera(Some(45.0))], vec![film(800, 600)]);
        let config = extract_config(&scene, Selection::Index(0)).unwrap();
        assert_eq!(config.fov, 45.0);

        assert!(matches!(
            extract_config(&scene, Selection::Index(5)),
            Err(ImportError::AmbiguousSelection { what: "camera", count: 1 })
        ));
    }

    #[test]
    fn test_singular_world_to_camera() {
        let mut cam = camera(None);
        cam.world_to_camera = Mat4::ZERO;
        let scene = scene_with(vec![cam], vec![film(800, 600)]);
        assert!(matches!(
            extract_config(&scene, Selection::First),
            Err(ImportError::SingularTransform)
        ));
    }
}
