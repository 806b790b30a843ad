// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-frame snapshots from the tracking subsystem
//!
//! Platform adapters (scene meshing, scene understanding, or a plain stub)
//! sit behind the [`SnapshotSource`] trait and deliver batches of classified
//! mesh snapshots plus the ids of sources that vanished. The splitter only
//! ever consumes these batches synchronously.

use std::collections::VecDeque;
use std::time::Duration;

use crate::error::Result;
use crate::label::{Label, LabelDomain};
use crate::mesh::TriangleMesh;
use crate::trackable::{Pose, TrackableId};

/// One source mesh as observed in one frame
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeshSnapshot {
    /// Stable id of the source mesh
    pub source: TrackableId,
    /// The reconstructed geometry
    pub mesh: TriangleMesh,
    /// One label per triangle of `mesh`
    pub labels: Vec<Label>,
    /// Pose of the mesh in tracking space
    pub pose: Pose,
}

impl MeshSnapshot {
    /// Create a snapshot with an identity pose
    pub fn new(source: TrackableId, mesh: TriangleMesh, labels: Vec<Label>) -> Self {
        Self {
            source,
            mesh,
            labels,
            pose: Pose::identity(),
        }
    }

    /// Create a snapshot for a tracker without classification support
    ///
    /// Every triangle is tagged with the domain's default label, so the
    /// whole mesh surfaces as a single "unclassified" sub-mesh.
    pub fn unclassified(source: TrackableId, mesh: TriangleMesh, domain: &LabelDomain) -> Self {
        let labels = domain.default_labels(mesh.triangle_count());
        Self::new(source, mesh, labels)
    }

    /// Reposition the snapshot
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }
}

/// Everything a source reported for one refresh cycle
#[derive(Debug, Clone, Default)]
pub struct SnapshotBatch {
    /// Sources observed this cycle (new or refreshed)
    pub snapshots: Vec<MeshSnapshot>,
    /// Sources the tracker stopped reporting
    pub removed_sources: Vec<TrackableId>,
}

impl SnapshotBatch {
    /// Check whether the cycle observed anything at all
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty() && self.removed_sources.is_empty()
    }
}

/// Mesh level of detail requested from the platform query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LevelOfDetail {
    Coarse,
    #[default]
    Medium,
    Fine,
    Unlimited,
}

/// Settings for the upstream platform query
///
/// Handed explicitly to the snapshot source instead of living in ambient
/// global state, so two sources can run with different settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryConfig {
    /// Requested triangle density, 0.0 (coarsest) to 1.0 (finest)
    pub mesh_density: f32,
    /// Radius around the device within which meshes are computed, in meters
    pub bounding_radius: f32,
    /// Delay between refresh cycles; `None` computes a single cycle and stops
    pub refresh_interval: Option<Duration>,
    /// Requested mesh level of detail
    pub level_of_detail: LevelOfDetail,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            mesh_density: 0.5,
            bounding_radius: 10.0,
            refresh_interval: Some(Duration::from_secs(1)),
            level_of_detail: LevelOfDetail::Medium,
        }
    }
}

/// Supplier of per-cycle snapshot batches
///
/// Implementations wrap a platform SDK query or replay prerecorded frames.
/// `poll` runs one refresh cycle; a failed cycle is reported to the caller,
/// which is expected to drop the frame and poll again later.
pub trait SnapshotSource {
    fn poll(&mut self) -> Result<SnapshotBatch>;
}

/// In-memory source fed by the host
///
/// Stands in for platforms without a native meshing query and backs tests:
/// batches pushed by the host are handed out one per poll, in order.
#[derive(Debug, Default)]
pub struct StaticSnapshotSource {
    pending: VecDeque<SnapshotBatch>,
}

impl StaticSnapshotSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a batch for a later poll
    pub fn push_batch(&mut self, batch: SnapshotBatch) {
        self.pending.push_back(batch);
    }

    /// Number of batches not yet polled
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl SnapshotSource for StaticSnapshotSource {
    fn poll(&mut self) -> Result<SnapshotBatch> {
        Ok(self.pending.pop_front().unwrap_or_default())
    }
}
