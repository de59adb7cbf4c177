//! Scene graph types for the normalized import output.
//!
//! Nodes reference each other through stable integer handles, never through
//! pointers: shapes point at materials and interned mesh payloads by id,
//! instances point at object templates by name. The whole graph is
//! serde-serializable so the export and snapshot layers stay thin.

use std::collections::HashMap;

use glam::Mat4;
use serde::{Deserialize, Serialize};

use crate::pbrt::ParamSet;

/// Handle to a material owned by the scene graph.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// Handle to a top-level shape node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub u32);

/// Handle to an interned mesh payload in the deduplication store.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// Handle to an interned texture descriptor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Triangle-mesh geometry payload.
///
/// This is the heavyweight data the deduplication store keys on; scene nodes
/// only ever hold a [`MeshHandle`] to it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshPayload {
    pub positions: Vec<glam::Vec3>,
    pub normals: Option<Vec<glam::Vec3>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    /// Triangle indices, every 3 form a triangle
    pub indices: Vec<u32>,
}

impl MeshPayload {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Texture descriptor: declaration class plus its parameters.
///
/// The pixel data itself is external (an image path in the parameters); the
/// importer only normalizes and deduplicates the descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextureDesc {
    /// Declared value type (`float` or `spectrum`)
    pub value_type: String,
    /// Texture class (`imagemap`, `checkerboard`, `constant`, ...)
    pub class: String,
    pub params: ParamSet,
}

/// A material definition.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Material {
    /// Material type (`matte`, `metal`, `glass`, ...)
    pub kind: String,
    /// Name when declared via `MakeNamedMaterial`
    pub name: Option<String>,
    pub params: ParamSet,
    /// Texture-valued parameters resolved to interned handles
    pub textures: HashMap<String, TextureHandle>,
}

/// Area-light emission attached to shapes declared under it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AreaLight {
    pub kind: String,
    pub params: ParamSet,
}

/// Shape geometry variants.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Geometry {
    /// Inline triangle mesh, payload interned in the mesh store
    TriangleMesh { mesh: MeshHandle },

    Sphere { radius: f32 },

    /// External mesh file, carried by reference and never parsed here
    PlyMesh { filename: String },

    /// Shape type this importer has no special handling for
    Other { kind: String, params: ParamSet },
}

/// A shape node with the graphics state captured at declaration time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShapeNode {
    pub geometry: Geometry,
    pub transform: Mat4,
    pub material: Option<MaterialId>,
    pub reverse_orientation: bool,
    pub emission: Option<AreaLight>,
}

/// A non-area light source.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightNode {
    pub kind: String,
    pub params: ParamSet,
    pub transform: Mat4,
}

/// An instance of a sealed object template.
///
/// Carries only the template name and the instancing transform; the shape
/// list lives once in the template registry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectInstance {
    pub template: String,
    pub transform: Mat4,
}

/// A camera declaration with the world-to-camera transform at its statement.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CameraRecord {
    pub kind: String,
    pub params: ParamSet,
    pub world_to_camera: Mat4,
}

/// An opaque config directive (`Film`, `Sampler`, `Integrator`, ...).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub directive: String,
    pub kind: String,
    pub params: ParamSet,
}

/// The normalized scene graph.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SceneGraph {
    pub cameras: Vec<CameraRecord>,
    pub films: Vec<ConfigRecord>,
    /// Remaining config directives, kept verbatim for the downstream renderer
    pub config: Vec<ConfigRecord>,

    pub materials: Vec<Material>,
    /// Deduplicated texture descriptors, indexed by [`TextureHandle`]
    pub textures: Vec<TextureDesc>,

    pub shapes: Vec<ShapeNode>,
    pub lights: Vec<LightNode>,
    pub instances: Vec<ObjectInstance>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len() as u32);
        self.materials.push(material);
        id
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    pub fn add_shape(&mut self, shape: ShapeNode) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        self.shapes.push(shape);
        id
    }

    pub fn add_light(&mut self, light: LightNode) {
        self.lights.push(light);
    }

    pub fn add_instance(&mut self, instance: ObjectInstance) {
        self.instances.push(instance);
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_stable() {
        let mut scene = SceneGraph::new();
        let a = scene.add_material(Material {
            kind: "matte".to_string(),
            name: None,
            params: ParamSet::new(),
            textures: HashMap::new(),
        });
        let b = scene.add_material(Material {
            kind: "metal".to_string(),
            name: Some("steel".to_string()),
            params: ParamSet::new(),
            textures: HashMap::new(),
        });
        assert_eq!(a, MaterialId(0));
        assert_eq!(b, MaterialId(1));
        assert_eq!(scene.material(a).unwrap().kind, "matte");
        assert_eq!(scene.material(b).unwrap().name.as_deref(), Some("steel"));
    }

    #[test]
    fn test_mesh_payload_counts() {
        let mesh = MeshPayload {
            positions: vec![glam::Vec3::ZERO, glam::Vec3::X, glam::Vec3::Y],
            normals: None,
            uvs: None,
            indices: vec![0, 1, 2],
        };
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
    }
}
