//! Statement and parameter types for the PBRT language.
//!
//! A [`Statement`] is one parsed instruction from the scene document: a kind
//! tag plus its positional arguments and keyword [`ParamSet`]. Statements are
//! immutable once produced and consumed strictly in document order.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One typed keyword-argument value.
///
/// PBRT parameters carry a declared type (`"float fov" 45`); the reader maps
/// each declaration onto one of these variants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ParamValue {
    Float(Vec<f32>),
    Int(Vec<i32>),
    Bool(bool),
    String(String),
    /// `point`/`vector` values, grouped by three
    Point(Vec<Vec3>),
    /// `normal` values, grouped by three
    Normal(Vec<Vec3>),
    /// `rgb`/`color` triple
    Rgb(Vec3),
    /// Reference to a named texture
    Texture(String),
}

/// Keyword arguments of a statement: parameter name to typed value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamSet {
    params: HashMap<String, ParamValue>,
}

impl ParamSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.params.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// First float of a `float` parameter.
    pub fn float(&self, name: &str) -> Option<f32> {
        match self.params.get(name)? {
            ParamValue::Float(v) => v.first().copied(),
            _ => None,
        }
    }

    /// First integer of an `integer` parameter.
    pub fn int(&self, name: &str) -> Option<i32> {
        match self.params.get(name)? {
            ParamValue::Int(v) => v.first().copied(),
            _ => None,
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.params.get(name)? {
            ParamValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn floats(&self, name: &str) -> Option<&[f32]> {
        match self.params.get(name)? {
            ParamValue::Float(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn ints(&self, name: &str) -> Option<&[i32]> {
        match self.params.get(name)? {
            ParamValue::Int(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// `point` or `normal` values.
    pub fn vectors(&self, name: &str) -> Option<&[Vec3]> {
        match self.params.get(name)? {
            ParamValue::Point(v) | ParamValue::Normal(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Names of all parameters holding texture references.
    pub fn texture_refs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().filter_map(|(k, v)| match v {
            ParamValue::Texture(t) => Some((k.as_str(), t.as_str())),
            _ => None,
        })
    }

    /// Parameter names in deterministic (sorted) order.
    pub fn sorted_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.params.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.params.iter()
    }
}

/// The discriminated statement kinds of the PBRT grammar.
#[derive(Clone, Debug, PartialEq)]
pub enum StatementKind {
    Include(String),
    WorldBegin,
    WorldEnd,
    AttributeBegin,
    AttributeEnd,
    TransformBegin,
    TransformEnd,
    ObjectBegin(String),
    ObjectEnd,
    ObjectInstance(String),
    Identity,
    Translate([f32; 3]),
    Scale([f32; 3]),
    /// angle (degrees), axis x/y/z
    Rotate([f32; 4]),
    /// eye, look, up
    LookAt([f32; 9]),
    CoordinateSystem(String),
    CoordinateSystemTransform(String),
    /// 16 matrix elements, row-major
    Transform(Box<[f32; 16]>),
    ConcatTransform(Box<[f32; 16]>),
    Material { kind: String, params: ParamSet },
    NamedMaterial(String),
    MakeNamedMaterial { name: String, params: ParamSet },
    Texture {
        name: String,
        value_type: String,
        class: String,
        params: ParamSet,
    },
    LightSource { kind: String, params: ParamSet },
    AreaLightSource { kind: String, params: ParamSet },
    Shape { kind: String, params: ParamSet },
    ReverseOrientation,
    // Config directives (only valid before WorldBegin)
    Camera { kind: String, params: ParamSet },
    Sampler { kind: String, params: ParamSet },
    Film { kind: String, params: ParamSet },
    Filter { kind: String, params: ParamSet },
    Integrator { kind: String, params: ParamSet },
    Accelerator { kind: String, params: ParamSet },
}

impl StatementKind {
    /// Directive name as written in the document, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            StatementKind::Include(_) => "Include",
            StatementKind::WorldBegin => "WorldBegin",
            StatementKind::WorldEnd => "WorldEnd",
            StatementKind::AttributeBegin => "AttributeBegin",
            StatementKind::AttributeEnd => "AttributeEnd",
            StatementKind::TransformBegin => "TransformBegin",
            StatementKind::TransformEnd => "TransformEnd",
            StatementKind::ObjectBegin(_) => "ObjectBegin",
            StatementKind::ObjectEnd => "ObjectEnd",
            StatementKind::ObjectInstance(_) => "ObjectInstance",
            StatementKind::Identity => "Identity",
            StatementKind::Translate(_) => "Translate",
            StatementKind::Scale(_) => "Scale",
            StatementKind::Rotate(_) => "Rotate",
            StatementKind::LookAt(_) => "LookAt",
            StatementKind::CoordinateSystem(_) => "CoordinateSystem",
            StatementKind::CoordinateSystemTransform(_) => "CoordinateSystemTransform",
            StatementKind::Transform(_) => "Transform",
            StatementKind::ConcatTransform(_) => "ConcatTransform",
            StatementKind::Material { .. } => "Material",
            StatementKind::NamedMaterial(_) => "NamedMaterial",
            StatementKind::MakeNamedMaterial { .. } => "MakeNamedMaterial",
            StatementKind::Texture { .. } => "Texture",
            StatementKind::LightSource { .. } => "LightSource",
            StatementKind::AreaLightSource { .. } => "AreaLightSource",
            StatementKind::Shape { .. } => "Shape",
            StatementKind::ReverseOrientation => "ReverseOrientation",
            StatementKind::Camera { .. } => "Camera",
            StatementKind::Sampler { .. } => "Sampler",
            StatementKind::Film { .. } => "Film",
            StatementKind::Filter { .. } => "Filter",
            StatementKind::Integrator { .. } => "Integrator",
            StatementKind::Accelerator { .. } => "Accelerator",
        }
    }

    /// Whether this directive configures the render setup rather than the
    /// world block (grammar: config statements precede `WorldBegin`).
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            StatementKind::Camera { .. }
                | StatementKind::Sampler { .. }
                | StatementKind::Film { .. }
                | StatementKind::Filter { .. }
                | StatementKind::Integrator { .. }
                | StatementKind::Accelerator { .. }
        )
    }
}

/// One parsed instruction with its source line.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: usize,
}
