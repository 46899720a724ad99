//! Render pipelines.
//!
//! Every scene node is drawn by the same pipeline shape with its own shader: group 0 holds the
//! node uniform, group 1 the node texture and sampler, and the three vertex slots come from
//! [`crate::data_structures::mesh::GpuMesh::desc`].

pub mod basic;
