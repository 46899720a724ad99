//! Scene graph and hierarchical transforms.
//!
//! Nodes live in one ordered list. A node may name an earlier node as its parent, so world
//! matrices come out of a single front-to-back fold: `world = parent_world * local`.
//! The graph only does matrix math. GPU resources are referenced through the opaque
//! handle `H` and drawn by a [`crate::render::Renderer`].

use cgmath::{Deg, Matrix4, SquareMatrix, Vector3};
use log::warn;

use crate::error::GraphError;

/// Blade offset from the windmill hub, in the windmill's local space.
pub const BLADE_OFFSET: Vector3<f32> = Vector3::new(0.0, 7.0, -0.15);
pub const BLADE_SCALE: f32 = 0.3;

/// How a node's local matrix is produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LocalTransform {
    /// `Ry(180) * Rz(180) * T(translation)`. The translation is accumulated from input and the
    /// orientation fix is applied after it.
    Root { translation: Vector3<f32> },
    /// `S(scale) * T(offset) * Rz(angle) * Rz(180)`, with `angle` in degrees.
    Spinner {
        angle: f32,
        /// Degrees per second, subtracted from `angle` on every [`SceneGraph::advance`].
        rate: f32,
        offset: Vector3<f32>,
        scale: f32,
    },
    Fixed(Matrix4<f32>),
}

impl LocalTransform {
    pub fn root() -> Self {
        LocalTransform::Root {
            translation: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn blades(rate: f32) -> Self {
        LocalTransform::Spinner {
            angle: 0.0,
            rate,
            offset: BLADE_OFFSET,
            scale: BLADE_SCALE,
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        match *self {
            LocalTransform::Root { translation } => {
                Matrix4::from_angle_y(Deg(180.0))
                    * Matrix4::from_angle_z(Deg(180.0))
                    * Matrix4::from_translation(translation)
            }
            LocalTransform::Spinner {
                angle,
                offset,
                scale,
                ..
            } => {
                Matrix4::from_scale(scale)
                    * Matrix4::from_translation(offset)
                    * Matrix4::from_angle_z(Deg(angle))
                    * Matrix4::from_angle_z(Deg(180.0))
            }
            LocalTransform::Fixed(matrix) => matrix,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SceneNode<H> {
    pub name: String,
    pub handle: H,
    pub parent: Option<usize>,
    pub local: LocalTransform,
}

#[derive(Clone, Debug)]
pub struct SceneGraph<H> {
    nodes: Vec<SceneNode<H>>,
}

impl<H> Default for SceneGraph<H> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<H> SceneGraph<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo hierarchy: a windmill root carrying spinning blades.
    pub fn windmill(root: H, blades: H, spin_rate: f32) -> Self {
        let nodes = vec![
            SceneNode {
                name: "windmill".to_string(),
                handle: root,
                parent: None,
                local: LocalTransform::root(),
            },
            SceneNode {
                name: "blades".to_string(),
                handle: blades,
                parent: Some(0),
                local: LocalTransform::blades(spin_rate),
            },
        ];
        Self { nodes }
    }

    /// Append a node. A parent must already be in the graph.
    pub fn add_node(
        &mut self,
        name: &str,
        handle: H,
        parent: Option<usize>,
        local: LocalTransform,
    ) -> Result<usize, GraphError> {
        if let Some(parent) = parent {
            if parent >= self.nodes.len() {
                return Err(GraphError::ParentOutOfOrder {
                    name: name.to_string(),
                    parent,
                    len: self.nodes.len(),
                });
            }
        }
        self.nodes.push(SceneNode {
            name: name.to_string(),
            handle,
            parent,
            local,
        });
        Ok(self.nodes.len() - 1)
    }

    pub fn nodes(&self) -> &[SceneNode<H>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// World matrix of every node, in node order. Recomputed on every call.
    pub fn world_matrices(&self) -> Vec<Matrix4<f32>> {
        self.nodes.iter().fold(
            Vec::with_capacity(self.nodes.len()),
            |mut worlds: Vec<Matrix4<f32>>, node| {
                let local = node.local.matrix();
                let world = match node.parent {
                    Some(parent) => worlds[parent] * local,
                    None => local,
                };
                worlds.push(world);
                worlds
            },
        )
    }

    fn world_of(&self, index: usize) -> Matrix4<f32> {
        self.world_matrices()
            .get(index)
            .copied()
            .unwrap_or_else(Matrix4::identity)
    }

    /// World matrix of the first node, or identity for an empty graph.
    pub fn root_world(&self) -> Matrix4<f32> {
        self.world_of(0)
    }

    /// World matrix of the second node, or identity when there is none.
    pub fn child_world(&self) -> Matrix4<f32> {
        self.world_of(1)
    }

    /// Step every spinner by `dt_seconds` of wall-clock time.
    pub fn advance(&mut self, dt_seconds: f32) {
        if !dt_seconds.is_finite() || dt_seconds < 0.0 {
            warn!("Ignoring invalid frame time {dt_seconds}");
            return;
        }
        for node in self.nodes.iter_mut() {
            if let LocalTransform::Spinner { angle, rate, .. } = &mut node.local {
                *angle -= *rate * dt_seconds;
                *angle %= 360.0;
            }
        }
    }

    /// Add `degrees` to every spinner's angle.
    pub fn spin_boost(&mut self, degrees: f32) {
        for node in self.nodes.iter_mut() {
            if let LocalTransform::Spinner { angle, .. } = &mut node.local {
                *angle = (*angle + degrees) % 360.0;
            }
        }
    }

    /// Premultiply the accumulated root translation by `T(delta)`.
    pub fn translate_root(&mut self, delta: Vector3<f32>) {
        for node in self.nodes.iter_mut() {
            if let LocalTransform::Root { translation } = &mut node.local {
                *translation += delta;
            }
        }
    }

    /// Angle of the first spinner, if any.
    pub fn spin_angle(&self) -> Option<f32> {
        self.nodes.iter().find_map(|node| match node.local {
            LocalTransform::Spinner { angle, .. } => Some(angle),
            _ => None,
        })
    }

    pub fn root_translation(&self) -> Option<Vector3<f32>> {
        self.nodes.iter().find_map(|node| match node.local {
            LocalTransform::Root { translation } => Some(translation),
            _ => None,
        })
    }
}
