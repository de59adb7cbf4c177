//! Graphics-state stack machine.
//!
//! The current state is a value: pushing a scope clones the whole snapshot,
//! popping discards the top and restores the parent unchanged. There is no
//! shared mutable state between stack entries, so a scope can never leak
//! edits into its parent.
//!
//! `AttributeBegin`/`End` and `TransformBegin`/`End` share the push/pop
//! mechanism but differ in what the pop restores: attribute scope restores
//! the full snapshot, transform scope restores only the transform.

use std::collections::HashMap;

use glam::Mat4;

use crate::error::{ImportError, ImportResult};
use crate::scene::{AreaLight, MaterialId, TextureHandle};

/// What kind of scope a push opened.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Attribute,
    Transform,
}

impl ScopeKind {
    pub fn begin_name(&self) -> &'static str {
        match self {
            ScopeKind::Attribute => "AttributeBegin",
            ScopeKind::Transform => "TransformBegin",
        }
    }

    pub fn end_name(&self) -> &'static str {
        match self {
            ScopeKind::Attribute => "AttributeEnd",
            ScopeKind::Transform => "TransformEnd",
        }
    }
}

/// One graphics-state snapshot.
#[derive(Clone, Debug)]
pub struct GraphicsState {
    /// Current transform (object to world)
    pub ctm: Mat4,
    pub reverse_orientation: bool,
    pub material: Option<MaterialId>,
    /// Pending area-light emission, attached to subsequently declared shapes
    pub area_light: Option<AreaLight>,
    /// Named coordinate-system snapshots
    pub coordinate_systems: HashMap<String, Mat4>,
    /// Texture name bindings
    pub textures: HashMap<String, TextureHandle>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Mat4::IDENTITY,
            reverse_orientation: false,
            material: None,
            area_light: None,
            coordinate_systems: HashMap::new(),
            textures: HashMap::new(),
        }
    }
}

/// The stack of graphics-state snapshots.
#[derive(Debug, Default)]
pub struct GraphicsStack {
    current: GraphicsState,
    saved: Vec<(ScopeKind, GraphicsState)>,
}

impl GraphicsStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Open a scope: snapshot the current state.
    pub fn push(&mut self, scope: ScopeKind) {
        self.saved.push((scope, self.current.clone()));
    }

    /// Close a scope, restoring what the scope kind covers.
    pub fn pop(&mut self, scope: ScopeKind) -> ImportResult<()> {
        let (opened, snapshot) = self.saved.pop().ok_or(ImportError::StateUnderflow)?;
        if opened != scope {
            return Err(ImportError::MismatchedScope {
                opened: opened.begin_name(),
                closed: scope.end_name(),
            });
        }
        match scope {
            ScopeKind::Attribute => self.current = snapshot,
            ScopeKind::Transform => self.current.ctm = snapshot.ctm,
        }
        Ok(())
    }

    pub fn ctm(&self) -> Mat4 {
        self.current.ctm
    }

    /// `Identity`: reset the current transform.
    pub fn identity(&mut self) {
        self.current.ctm = Mat4::IDENTITY;
    }

    /// `Transform`: replace the current transform outright.
    pub fn set_transform(&mut self, m: Mat4) {
        self.current.ctm = m;
    }

    /// Compose an op on the right of the current transform (new = current * op).
    pub fn concat_transform(&mut self, m: Mat4) {
        self.current.ctm *= m;
    }

    /// `CoordinateSystem`: snapshot the current transform under `name`.
    pub fn bind_coordinate_system(&mut self, name: &str) {
        self.current
            .coordinate_systems
            .insert(name.to_string(), self.current.ctm);
    }

    /// `CoordinateSystemTransform`: restore a named snapshot.
    pub fn apply_coordinate_system(&mut self, name: &str) -> ImportResult<()> {
        let m = self
            .current
            .coordinate_systems
            .get(name)
            .copied()
            .ok_or_else(|| ImportError::UnknownCoordinateSystem(name.to_string()))?;
        self.current.ctm = m;
        Ok(())
    }

    pub fn bind_texture(&mut self, name: &str, handle: TextureHandle) {
        self.current.textures.insert(name.to_string(), handle);
    }

    pub fn texture(&self, name: &str) -> Option<TextureHandle> {
        self.current.textures.get(name).copied()
    }
}
