//! Statement-by-statement scene construction.
//!
//! The builder is a strict single-pass state machine: it consumes statements
//! in document order, maintains the graphics state stack, and routes shapes
//! either to the top-level scene graph or to the open object template. Any
//! violation of the grammar or a dangling reference aborts the import
//! immediately; lenient mode downgrades dangling references to warnings.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use opal_math::{look_at_world_to_camera, mat4_from_rows, rotate_degrees};

use crate::dedup::{DedupStore, MeshStore};
use crate::error::{ImportError, ImportResult};
use crate::pbrt::{ParamSet, Statement, StatementKind, StatementReader};
use crate::registry::TemplateRegistry;
use crate::scene::{
    AreaLight, CameraRecord, ConfigRecord, Geometry, LightNode, Material, MeshPayload,
    SceneGraph, ShapeNode, TextureDesc, TextureHandle,
};
use crate::state::{GraphicsStack, ScopeKind};

/// Import behavior switches.
#[derive(Copy, Clone, Debug, Default)]
pub struct ImportOptions {
    /// Downgrade dangling material/texture/template references to warnings
    /// instead of aborting.
    pub lenient: bool,
}

/// Everything a finished import produces.
#[derive(Debug)]
pub struct LoadedScene {
    pub scene: SceneGraph,
    pub meshes: MeshStore,
    pub templates: TemplateRegistry,
}

/// Builds a [`SceneGraph`] from a statement stream.
pub struct SceneBuilder {
    scene: SceneGraph,
    stack: GraphicsStack,
    meshes: MeshStore,
    textures: DedupStore<TextureDesc>,
    registry: TemplateRegistry,
    named_materials: HashMap<String, crate::scene::MaterialId>,
    /// Directory `Include` paths resolve against.
    base_dir: Option<PathBuf>,
    options: ImportOptions,
    in_world: bool,
    world_done: bool,
}

impl SceneBuilder {
    /// New builder with its spill and template stores rooted at `store_dir`.
    pub fn new(store_dir: impl AsRef<Path>, options: ImportOptions) -> ImportResult<Self> {
        let store_dir = store_dir.as_ref();
        Ok(Self {
            scene: SceneGraph::new(),
            stack: GraphicsStack::new(),
            meshes: MeshStore::with_spill_dir(store_dir.join("meshes"))?,
            textures: DedupStore::new(),
            registry: TemplateRegistry::new(store_dir.join("templates"))?,
            named_materials: HashMap::new(),
            base_dir: None,
            options,
            in_world: false,
            world_done: false,
        })
    }

    pub fn set_base_dir(&mut self, dir: impl Into<PathBuf>) {
        self.base_dir = Some(dir.into());
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Process one statement.
    pub fn ingest(&mut self, stmt: &Statement) -> ImportResult<()> {
        if stmt.kind.is_config() {
            return self.ingest_config(stmt);
        }

        match &stmt.kind {
            StatementKind::Include(path) => self.ingest_include(path),

            StatementKind::WorldBegin => {
                if self.in_world || self.world_done {
                    return Err(self.grammar_error(stmt, "duplicate WorldBegin"));
                }
                // The world block starts from a fresh coordinate frame
                self.stack.identity();
                self.in_world = true;
                Ok(())
            }
            StatementKind::WorldEnd => {
                if !self.in_world {
                    return Err(self.grammar_error(stmt, "WorldEnd without WorldBegin"));
                }
                if self.stack.depth() != 0 {
                    return Err(ImportError::UnclosedScope);
                }
                if self.registry.is_open() {
                    return Err(ImportError::UnclosedScope);
                }
                self.in_world = false;
                self.world_done = true;
                Ok(())
            }

            StatementKind::AttributeBegin => {
                self.stack.push(ScopeKind::Attribute);
                Ok(())
            }
            StatementKind::AttributeEnd => self.stack.pop(ScopeKind::Attribute),
            StatementKind::TransformBegin => {
                self.stack.push(ScopeKind::Transform);
                Ok(())
            }
            StatementKind::TransformEnd => self.stack.pop(ScopeKind::Transform),

            StatementKind::ObjectBegin(name) => {
                self.require_world(stmt)?;
                self.registry.begin_template(name)?;
                // Templates get an attribute scope of their own
                self.stack.push(ScopeKind::Attribute);
                Ok(())
            }
            StatementKind::ObjectEnd => {
                self.registry.end_template()?;
                self.stack.pop(ScopeKind::Attribute)
            }
            StatementKind::ObjectInstance(name) => {
                self.require_world(stmt)?;
                if self.registry.is_open() {
                    return Err(self.grammar_error(stmt, "ObjectInstance inside an open template"));
                }
                match self.registry.instance(name, self.stack.ctm()) {
                    Ok(instance) => {
                        self.scene.add_instance(instance);
                        Ok(())
                    }
                    Err(ImportError::UnknownTemplate(name)) if self.options.lenient => {
                        log::warn!("skipping instance of unknown template '{}'", name);
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }

            StatementKind::Identity => {
                self.stack.identity();
                Ok(())
            }
            StatementKind::Translate([x, y, z]) => {
                self.stack
                    .concat_transform(Mat4::from_translation(Vec3::new(*x, *y, *z)));
                Ok(())
            }
            StatementKind::Scale([x, y, z]) => {
                self.stack
                    .concat_transform(Mat4::from_scale(Vec3::new(*x, *y, *z)));
                Ok(())
            }
            StatementKind::Rotate([angle, x, y, z]) => {
                let rotation = rotate_degrees(*angle, Vec3::new(*x, *y, *z))
                    .ok_or_else(|| self.grammar_error(stmt, "Rotate requires a non-zero axis"))?;
                self.stack.concat_transform(rotation);
                Ok(())
            }
            StatementKind::LookAt(v) => {
                let eye = Vec3::new(v[0], v[1], v[2]);
                let look = Vec3::new(v[3], v[4], v[5]);
                let up = Vec3::new(v[6], v[7], v[8]);
                self.stack
                    .concat_transform(look_at_world_to_camera(eye, look, up));
                Ok(())
            }
            StatementKind::Transform(values) => {
                self.stack.set_transform(mat4_from_rows(values));
                Ok(())
            }
            StatementKind::ConcatTransform(values) => {
                self.stack.concat_transform(mat4_from_rows(values));
                Ok(())
            }
            StatementKind::CoordinateSystem(name) => {
                self.stack.bind_coordinate_system(name);
                Ok(())
            }
            StatementKind::CoordinateSystemTransform(name) => {
                match self.stack.apply_coordinate_system(name) {
                    Err(ImportError::UnknownCoordinateSystem(name)) if self.options.lenient => {
                        log::warn!("ignoring unknown coordinate system '{}'", name);
                        Ok(())
                    }
                    other => other,
                }
            }

            StatementKind::ReverseOrientation => {
                self.require_world(stmt)?;
                let state = self.stack.current_mut();
                state.reverse_orientation = !state.reverse_orientation;
                Ok(())
            }

            StatementKind::Material { kind, params } => {
                self.require_world(stmt)?;
                let id = self.define_material(kind, None, params)?;
                self.stack.current_mut().material = Some(id);
                Ok(())
            }
            StatementKind::MakeNamedMaterial { name, params } => {
                self.require_world(stmt)?;
                let kind = params
                    .string("type")
                    .ok_or_else(|| {
                        self.grammar_error(stmt, "MakeNamedMaterial requires a \"string type\" parameter")
                    })?
                    .to_string();
                let id = self.define_material(&kind, Some(name.clone()), params)?;
                self.named_materials.insert(name.clone(), id);
                Ok(())
            }
            StatementKind::NamedMaterial(name) => {
                self.require_world(stmt)?;
                match self.named_materials.get(name) {
                    Some(&id) => {
                        self.stack.current_mut().material = Some(id);
                        Ok(())
                    }
                    None if self.options.lenient => {
                        log::warn!("unknown named material '{}', using no material", name);
                        self.stack.current_mut().material = None;
                        Ok(())
                    }
                    None => Err(ImportError::UnknownMaterial(name.clone())),
                }
            }

            StatementKind::Texture {
                name,
                value_type,
                class,
                params,
            } => {
                self.require_world(stmt)?;
                let id = self.textures.intern(TextureDesc {
                    value_type: value_type.clone(),
                    class: class.clone(),
                    params: params.clone(),
                });
                self.stack.bind_texture(name, TextureHandle(id));
                Ok(())
            }

            StatementKind::LightSource { kind, params } => {
                self.require_world(stmt)?;
                self.scene.add_light(LightNode {
                    kind: kind.clone(),
                    params: params.clone(),
                    transform: self.stack.ctm(),
                });
                Ok(())
            }
            StatementKind::AreaLightSource { kind, params } => {
                self.require_world(stmt)?;
                self.stack.current_mut().area_light = Some(AreaLight {
                    kind: kind.clone(),
                    params: params.clone(),
                });
                Ok(())
            }

            StatementKind::Shape { kind, params } => {
                self.require_world(stmt)?;
                let geometry = self.build_geometry(stmt, kind, params)?;
                let state = self.stack.current();
                let shape = ShapeNode {
                    geometry,
                    transform: self.stack.ctm(),
                    material: state.material,
                    reverse_orientation: state.reverse_orientation,
                    emission: state.area_light.clone(),
                };
                if self.registry.is_open() {
                    self.registry.add_shape(shape);
                } else {
                    self.scene.add_shape(shape);
                }
                Ok(())
            }

            // is_config() handled above
            _ => Err(self.grammar_error(stmt, "unhandled statement")),
        }
    }

    /// Finish the import and hand out the accumulated stores.
    pub fn finish(mut self) -> ImportResult<LoadedScene> {
        if !self.world_done {
            return Err(ImportError::Parse {
                line: 0,
                message: "document ended before WorldEnd".to_string(),
            });
        }
        self.scene.textures = self.textures.into_items();
        Ok(LoadedScene {
            scene: self.scene,
            meshes: self.meshes,
            templates: self.registry,
        })
    }

    fn ingest_config(&mut self, stmt: &Statement) -> ImportResult<()> {
        if self.in_world || self.world_done {
            return Err(self.grammar_error(
                stmt,
                "config statement is only valid before WorldBegin",
            ));
        }
        match &stmt.kind {
            StatementKind::Camera { kind, params } => {
                // CTM at the Camera statement is world-to-camera
                self.scene.cameras.push(CameraRecord {
                    kind: kind.clone(),
                    params: params.clone(),
                    world_to_camera: self.stack.ctm(),
                });
            }
            StatementKind::Film { kind, params } => {
                self.scene.films.push(ConfigRecord {
                    directive: "Film".to_string(),
                    kind: kind.clone(),
                    params: params.clone(),
                });
            }
            StatementKind::Sampler { kind, params }
            | StatementKind::Filter { kind, params }
            | StatementKind::Integrator { kind, params }
            | StatementKind::Accelerator { kind, params } => {
                self.scene.config.push(ConfigRecord {
                    directive: stmt.kind.name().to_string(),
                    kind: kind.clone(),
                    params: params.clone(),
                });
            }
            _ => unreachable!("is_config covers exactly the directives above"),
        }
        Ok(())
    }

    fn ingest_include(&mut self, path: &str) -> ImportResult<()> {
        let resolved = match &self.base_dir {
            Some(base) => base.join(path),
            None => PathBuf::from(path),
        };
        log::debug!("including {}", resolved.display());
        let content = fs::read_to_string(&resolved)?;
        let display = resolved.display().to_string();
        let statements =
            StatementReader::read_all(&content).map_err(|e| ImportError::from(e).at(&display, 0))?;
        for stmt in &statements {
            self.ingest(stmt)
                .map_err(|e| e.at(&display, stmt.line))?;
        }
        Ok(())
    }

    fn define_material(
        &mut self,
        kind: &str,
        name: Option<String>,
        params: &ParamSet,
    ) -> ImportResult<crate::scene::MaterialId> {
        let mut textures = HashMap::new();
        for (param, tex_name) in params.texture_refs() {
            match self.stack.texture(tex_name) {
                Some(handle) => {
                    textures.insert(param.to_string(), handle);
                }
                None if self.options.lenient => {
                    log::warn!("material references unknown texture '{}'", tex_name);
                }
                None => return Err(ImportError::UnknownTexture(tex_name.to_string())),
            }
        }
        Ok(self.scene.add_material(Material {
            kind: kind.to_string(),
            name,
            params: params.clone(),
            textures,
        }))
    }

    fn build_geometry(
        &mut self,
        stmt: &Statement,
        kind: &str,
        params: &ParamSet,
    ) -> ImportResult<Geometry> {
        match kind {
            "trianglemesh" => {
                let positions = params
                    .vectors("P")
                    .ok_or_else(|| {
                        self.grammar_error(stmt, "trianglemesh requires a \"point P\" parameter")
                    })?
                    .to_vec();
                let indices: Vec<u32> = params
                    .ints("indices")
                    .ok_or_else(|| {
                        self.grammar_error(
                            stmt,
                            "trianglemesh requires an \"integer indices\" parameter",
                        )
                    })?
                    .iter()
                    .map(|&i| i as u32)
                    .collect();
                let normals = params.vectors("N").map(<[Vec3]>::to_vec);
                let uvs = params
                    .floats("uv")
                    .or_else(|| params.floats("st"))
                    .map(|v| v.chunks_exact(2).map(|c| [c[0], c[1]]).collect());
                let mesh = self.meshes.intern(MeshPayload {
                    positions,
                    normals,
                    uvs,
                    indices,
                })?;
                Ok(Geometry::TriangleMesh { mesh })
            }
            "sphere" => Ok(Geometry::Sphere {
                radius: params.float("radius").unwrap_or(1.0),
            }),
            "plymesh" => {
                let filename = params
                    .string("filename")
                    .ok_or_else(|| {
                        self.grammar_error(stmt, "plymesh requires a \"string filename\" parameter")
                    })?
                    .to_string();
                Ok(Geometry::PlyMesh { filename })
            }
            other => {
                log::debug!("passing through unrecognized shape type '{}'", other);
                Ok(Geometry::Other {
                    kind: other.to_string(),
                    params: params.clone(),
                })
            }
        }
    }

    fn require_world(&self, stmt: &Statement) -> ImportResult<()> {
        if self.in_world {
            Ok(())
        } else {
            Err(self.grammar_error(
                stmt,
                &format!("{} is only valid inside the world block", stmt.kind.name()),
            ))
        }
    }

    fn grammar_error(&self, stmt: &Statement, message: &str) -> ImportError {
        ImportError::Parse {
            line: stmt.line,
            message: message.to_string(),
        }
    }
}

/// Import a scene description from a string (tests, embedded content).
pub fn load_pbrt_str(
    content: &str,
    store_dir: impl AsRef<Path>,
    options: ImportOptions,
) -> ImportResult<LoadedScene> {
    let mut builder = SceneBuilder::new(store_dir, options)?;
    ingest_document(&mut builder, content, "<input>")?;
    builder.finish()
}

/// Import a scene description file.
///
/// `Include` statements resolve relative to the file's directory. Errors are
/// wrapped with the file path and statement line they surfaced at.
pub fn load_pbrt_file(
    path: impl AsRef<Path>,
    store_dir: impl AsRef<Path>,
    options: ImportOptions,
) -> ImportResult<LoadedScene> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let mut builder = SceneBuilder::new(store_dir, options)?;
    if let Some(parent) = path.parent() {
        builder.set_base_dir(parent);
    }
    ingest_document(&mut builder, &content, &path.display().to_string())?;
    builder.finish()
}

fn ingest_document(
    builder: &mut SceneBuilder,
    content: &str,
    path: &str,
) -> ImportResult<()> {
    let statements =
        StatementReader::read_all(content).map_err(|e| ImportError::from(e).at(path, 0))?;
    for stmt in &statements {
        builder.ingest(stmt).map_err(|e| e.at(path, stmt.line))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::MaterialId;

    fn temp_store(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("opal_builder_{}_{}", tag, std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    // The store directory is removed before this returns; tests that read
    // templates or spilled meshes back manage their own directory instead.
    fn load(tag: &str, content: &str) -> ImportResult<LoadedScene> {
        let dir = temp_store(tag);
        let result = load_pbrt_str(content, &dir, ImportOptions::default());
        std::fs::remove_dir_all(&dir).ok();
        result
    }

    fn load_lenient(tag: &str, content: &str) -> ImportResult<LoadedScene> {
        let dir = temp_store(tag);
        let result = load_pbrt_str(content, &dir, ImportOptions { lenient: true });
        std::fs::remove_dir_all(&dir).ok();
        result
    }

    const TRIANGLE: &str = r#"Shape "trianglemesh"
        "point P" [0 0 0  1 0 0  0 1 0]
        "integer indices" [0 1 2]"#;

    #[test]
    fn test_minimal_scene() {
        let loaded = load(
            "minimal",
            r#"
            LookAt 0 0 5  0 0 0  0 1 0
            Camera "perspective" "float fov" [45]
            Film "image" "integer xresolution" [800] "integer yresolution" [600]
            WorldBegin
            Shape "sphere" "float radius" [2]
            WorldEnd
            "#,
        )
        .unwrap();

        assert_eq!(loaded.scene.cameras.len(), 1);
        assert_eq!(loaded.scene.cameras[0].kind, "perspective");
        assert_eq!(loaded.scene.films.len(), 1);
        assert_eq!(loaded.scene.shape_count(), 1);
        assert!(matches!(
            loaded.scene.shapes[0].geometry,
            Geometry::Sphere { radius } if radius == 2.0
        ));
        // World block starts from identity, not the camera transform
        assert_eq!(loaded.scene.shapes[0].transform, Mat4::IDENTITY);
        assert_ne!(loaded.scene.cameras[0].world_to_camera, Mat4::IDENTITY);
    }

    #[test]
    fn test_attribute_scope_restores_material() {
        let loaded = load(
            "attr_restore",
            &format!(
                r#"
                WorldBegin
                Material "matte"
                AttributeBegin
                Material "metal"
                {TRIANGLE}
                AttributeEnd
                {TRIANGLE}
                WorldEnd
                "#
            ),
        )
        .unwrap();

        assert_eq!(loaded.scene.shapes[0].material, Some(MaterialId(1)));
        assert_eq!(loaded.scene.shapes[1].material, Some(MaterialId(0)));
    }

    #[test]
    fn test_transform_scope_keeps_material() {
        let loaded = load(
            "xform_keep",
            &format!(
                r#"
                WorldBegin
                TransformBegin
                Translate 1 2 3
                Material "matte"
                TransformEnd
                {TRIANGLE}
                WorldEnd
                "#
            ),
        )
        .unwrap();

        // TransformEnd restores only the transform
        assert_eq!(loaded.scene.shapes[0].material, Some(MaterialId(0)));
        assert_eq!(loaded.scene.shapes[0].transform, Mat4::IDENTITY);
    }

    #[test]
    fn test_identical_meshes_share_payload() {
        let loaded = load(
            "mesh_dedup",
            &format!(
                r#"
                WorldBegin
                {TRIANGLE}
                Translate 5 0 0
                {TRIANGLE}
                WorldEnd
                "#
            ),
        )
        .unwrap();

        assert_eq!(loaded.scene.shape_count(), 2);
        assert_eq!(loaded.meshes.len(), 1);
        let (a, b) = (&loaded.scene.shapes[0], &loaded.scene.shapes[1]);
        assert!(matches!(
            (&a.geometry, &b.geometry),
            (Geometry::TriangleMesh { mesh: ma }, Geometry::TriangleMesh { mesh: mb }) if ma == mb
        ));
        assert_ne!(a.transform, b.transform);
    }

    #[test]
    fn test_object_template_and_instances() {
        // Reads a sealed template back from the registry, so the store
        // directory has to outlive the import.
        let dir = temp_store("instances");
        let loaded = load_pbrt_str(
            &format!(
                r#"
                WorldBegin
                ObjectBegin "tree"
                {TRIANGLE}
                Shape "sphere" "float radius" [0.5]
                ObjectEnd
                ObjectInstance "tree"
                Translate 10 0 0
                ObjectInstance "tree"
                WorldEnd
                "#
            ),
            &dir,
            ImportOptions::default(),
        )
        .unwrap();

        // Template shapes are stored in the registry, not the scene
        assert_eq!(loaded.scene.shape_count(), 0);
        assert_eq!(loaded.scene.instance_count(), 2);
        assert_eq!(loaded.templates.load("tree").unwrap().len(), 2);
        assert_ne!(
            loaded.scene.instances[0].transform,
            loaded.scene.instances[1].transform
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_instance_of_unknown_template_fails() {
        let err = load(
            "unknown_tmpl",
            r#"
            WorldBegin
            ObjectInstance "ghost"
            WorldEnd
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ImportError::At { source, .. }
                if matches!(*source, ImportError::UnknownTemplate(ref n) if n == "ghost")
        ));
    }

    #[test]
    fn test_lenient_skips_unknown_references() {
        let loaded = load_lenient(
            "lenient",
            &format!(
                r#"
                WorldBegin
                ObjectInstance "ghost"
                NamedMaterial "nobody"
                {TRIANGLE}
                WorldEnd
                "#
            ),
        )
        .unwrap();
        assert_eq!(loaded.scene.instance_count(), 0);
        assert_eq!(loaded.scene.shapes[0].material, None);
    }

    #[test]
    fn test_area_light_attaches_to_shape() {
        let loaded = load(
            "area_light",
            r#"
            WorldBegin
            AttributeBegin
            AreaLightSource "diffuse" "rgb L" [10 10 10]
            Shape "sphere" "float radius" [1]
            AttributeEnd
            Shape "sphere" "float radius" [1]
            WorldEnd
            "#,
        )
        .unwrap();

        assert!(loaded.scene.shapes[0].emission.is_some());
        assert!(loaded.scene.shapes[1].emission.is_none());
        assert!(loaded.scene.lights.is_empty());
    }

    #[test]
    fn test_named_material_lookup() {
        let loaded = load(
            "named_mat",
            &format!(
                r#"
                WorldBegin
                MakeNamedMaterial "steel" "string type" "metal"
                Material "matte"
                NamedMaterial "steel"
                {TRIANGLE}
                WorldEnd
                "#
            ),
        )
        .unwrap();

        let id = loaded.scene.shapes[0].material.unwrap();
        let material = loaded.scene.material(id).unwrap();
        assert_eq!(material.kind, "metal");
        assert_eq!(material.name.as_deref(), Some("steel"));
    }

    #[test]
    fn test_texture_binding_resolves() {
        let loaded = load(
            "texture",
            &format!(
                r#"
                WorldBegin
                Texture "wood" "spectrum" "imagemap" "string filename" "wood.png"
                Material "matte" "texture Kd" "wood"
                {TRIANGLE}
                WorldEnd
                "#
            ),
        )
        .unwrap();

        assert_eq!(loaded.scene.textures.len(), 1);
        let material = &loaded.scene.materials[0];
        assert_eq!(material.textures.get("Kd"), Some(&TextureHandle(0)));
    }

    #[test]
    fn test_config_after_world_begin_fails() {
        let err = load(
            "late_config",
            r#"
            WorldBegin
            Camera "perspective"
            WorldEnd
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ImportError::At { source, .. } if matches!(*source, ImportError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_world_end_fails() {
        let err = load("no_world_end", "WorldBegin\n").unwrap_err();
        assert!(matches!(err, ImportError::Parse { .. }));
    }

    #[test]
    fn test_rotate_zero_axis_fails() {
        let err = load(
            "rotate_zero",
            r#"
            WorldBegin
            Rotate 45 0 0 0
            WorldEnd
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ImportError::At { source, .. } if matches!(*source, ImportError::Parse { .. })
        ));
    }

    #[test]
    fn test_unclosed_attribute_scope_fails() {
        let err = load(
            "unclosed",
            r#"
            WorldBegin
            AttributeBegin
            WorldEnd
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ImportError::At { source, .. } if matches!(*source, ImportError::UnclosedScope)
        ));
    }

    #[test]
    fn test_include_resolves_relative_to_file() {
        let dir = temp_store("include");
        std::fs::create_dir_all(&dir).unwrap();
        let inner = dir.join("geometry.pbrt");
        std::fs::write(&inner, format!("{TRIANGLE}\n")).unwrap();
        let main = dir.join("scene.pbrt");
        std::fs::write(
            &main,
            "WorldBegin\nInclude \"geometry.pbrt\"\nWorldEnd\n",
        )
        .unwrap();

        let loaded =
            load_pbrt_file(&main, dir.join("store"), ImportOptions::default()).unwrap();
        assert_eq!(loaded.scene.shape_count(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }
}
