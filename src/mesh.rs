// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Triangle mesh buffers as handed over by the tracking subsystem

use nalgebra::{Point3, Vector3};

use crate::error::{Error, Result};

/// Triangle mesh with flat vertex buffers
///
/// Positions and normals are interleaved `(x, y, z)` triples; indices come in
/// groups of three. Normals are optional — reconstructed world meshes often
/// ship without them and leave normal generation to the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriangleMesh {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz), empty when the source provides none
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, index_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count * 3),
            normals: Vec::with_capacity(vertex_count * 3),
            indices: Vec::with_capacity(index_count),
        }
    }

    /// Build a mesh from raw buffers, checking their consistency
    pub fn from_buffers(positions: Vec<f32>, normals: Vec<f32>, indices: Vec<u32>) -> Result<Self> {
        let mesh = Self {
            positions,
            normals,
            indices,
        };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Add a vertex with normal
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f32>, normal: Vector3<f32>) {
        self.positions.push(position.x);
        self.positions.push(position.y);
        self.positions.push(position.z);

        self.normals.push(normal.x);
        self.normals.push(normal.y);
        self.normals.push(normal.z);
    }

    /// Add a vertex position without a normal
    #[inline]
    pub fn add_position(&mut self, position: Point3<f32>) {
        self.positions.push(position.x);
        self.positions.push(position.y);
        self.positions.push(position.z);
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.push(i0);
        self.indices.push(i1);
        self.indices.push(i2);
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Check if the mesh carries per-vertex normals
    #[inline]
    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty()
    }

    /// Get the index triple of one triangle
    #[inline]
    pub fn triangle(&self, tri: usize) -> (u32, u32, u32) {
        let base = tri * 3;
        (
            self.indices[base],
            self.indices[base + 1],
            self.indices[base + 2],
        )
    }

    /// Check structural consistency of the buffers
    ///
    /// Verifies that positions form whole `(x, y, z)` triples, that normals
    /// are either absent or match the vertex count, that indices form whole
    /// triangles, and that every index points at an existing vertex.
    pub fn validate(&self) -> Result<()> {
        if self.positions.len() % 3 != 0 {
            return Err(Error::MalformedBuffers(format!(
                "position buffer length {} is not a multiple of 3",
                self.positions.len()
            )));
        }
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(Error::MalformedBuffers(format!(
                "normal buffer length {} does not match position buffer length {}",
                self.normals.len(),
                self.positions.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(Error::MalformedBuffers(format!(
                "index buffer length {} is not a multiple of 3",
                self.indices.len()
            )));
        }

        let vertex_count = self.vertex_count();
        for &index in &self.indices {
            if index as usize >= vertex_count {
                return Err(Error::IndexOutOfBounds {
                    index,
                    vertex_count,
                });
            }
        }

        Ok(())
    }

    /// Calculate bounds (min, max)
    #[inline]
    pub fn bounds(&self) -> (Point3<f32>, Point3<f32>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f32::MAX, f32::MAX, f32::MAX);
        let mut max = Point3::new(f32::MIN, f32::MIN, f32::MIN);

        self.positions.chunks_exact(3).for_each(|chunk| {
            let (x, y, z) = (chunk[0], chunk[1], chunk[2]);
            min.x = min.x.min(x);
            min.y = min.y.min(y);
            min.z = min.z.min(z);
            max.x = max.x.max(x);
            max.y = max.y.max(y);
            max.z = max.z.max(z);
        });

        (min, max)
    }

    /// Clear the mesh
    #[inline]
    pub fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.indices.clear();
    }
}
