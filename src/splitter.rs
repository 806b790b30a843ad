// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Splits classified source meshes into one sub-mesh per label
//!
//! The tracking subsystem reports whole reconstructed meshes; classifiers tag
//! each triangle with a category. [`MeshClassificationSplitter`] maintains one
//! derived [`ClassifiedMesh`] per `(source, label)` pair across frames and
//! reports the delta of every frame as explicit added/updated/removed sets,
//! so consumers need no engine callbacks to stay in sync.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::label::{Label, LabelDomain};
use crate::mesh::TriangleMesh;
use crate::snapshot::SnapshotBatch;
use crate::trackable::{ClassifiedMeshId, Pose, TrackableId};

/// One per-label sub-mesh of a source mesh
///
/// The vertex and normal buffers are full copies of the source buffers; only
/// the index buffer is restricted to the triangles carrying this label, so
/// unreferenced vertices remain in the buffer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassifiedMesh {
    /// Identifier of this sub-mesh, stable while its label persists
    pub id: ClassifiedMeshId,
    /// The source mesh this sub-mesh was split from
    pub source: TrackableId,
    /// The classification label shared by all triangles in `mesh`
    pub label: Label,
    /// Pose of the mesh in tracking space
    pub pose: Pose,
    /// The sub-mesh geometry
    pub mesh: TriangleMesh,
}

/// Record of a sub-mesh dropped because its label (or source) disappeared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovedMesh {
    pub source: TrackableId,
    pub label: Label,
    pub id: ClassifiedMeshId,
}

/// Delta between two successive frames of one source (or a batch of sources)
#[derive(Debug, Clone, Default)]
pub struct SplitDelta {
    /// Labels observed for the first time this frame
    pub added: Vec<ClassifiedMesh>,
    /// Labels already present last frame, refreshed in place
    pub updated: Vec<ClassifiedMesh>,
    /// Labels present last frame with no triangles this frame
    pub removed: Vec<RemovedMesh>,
}

impl SplitDelta {
    /// Check whether the frame changed anything
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed.is_empty()
    }

    fn merge(&mut self, other: SplitDelta) {
        self.added.extend(other.added);
        self.updated.extend(other.updated);
        self.removed.extend(other.removed);
    }
}

/// Maintains per-label sub-meshes for every tracked source mesh
///
/// Not internally synchronized: one frame is processed per call, and callers
/// must serialize calls per instance (the usual arrangement is one splitter
/// owned by the consumer that drains the snapshot channel).
#[derive(Debug)]
pub struct MeshClassificationSplitter {
    domain: LabelDomain,
    meshes: FxHashMap<TrackableId, FxHashMap<Label, ClassifiedMesh>>,
    /// Histogram scratch, one slot per label in the domain
    counts: Vec<usize>,
    next_id: u64,
}

impl MeshClassificationSplitter {
    /// Create a splitter for one label domain
    pub fn new(domain: LabelDomain) -> Self {
        let counts = vec![0; domain.len()];
        Self {
            domain,
            meshes: FxHashMap::default(),
            counts,
            next_id: 1,
        }
    }

    /// The label domain this splitter enumerates
    pub fn domain(&self) -> &LabelDomain {
        &self.domain
    }

    /// Total number of classified sub-meshes across all sources
    pub fn len(&self) -> usize {
        self.meshes.values().map(|per_label| per_label.len()).sum()
    }

    /// Check whether any sub-mesh is currently tracked
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Ingest one frame of a source mesh and report the resulting delta
    ///
    /// Labels are processed in domain enumeration order, so two calls with
    /// identical input produce identically ordered deltas. A label seen for
    /// the first time yields a fresh sub-mesh in `added`; a persisting label
    /// has its sub-mesh overwritten in place (same id) and lands in
    /// `updated`; a label with no triangles left is dropped into `removed`.
    ///
    /// The frame is validated as a whole before any state is touched: on
    /// error the previous state for `source` remains exactly as it was.
    pub fn update(
        &mut self,
        source: TrackableId,
        base_mesh: &TriangleMesh,
        labels: &[Label],
        pose: Pose,
    ) -> Result<SplitDelta> {
        if labels.len() != base_mesh.triangle_count() {
            return Err(Error::LabelCountMismatch {
                expected: base_mesh.triangle_count(),
                actual: labels.len(),
            });
        }
        base_mesh.validate()?;
        for &label in labels {
            if !self.domain.contains(label) {
                return Err(Error::LabelOutOfRange {
                    label: label.0,
                    domain_len: self.domain.len(),
                });
            }
        }

        self.counts.iter_mut().for_each(|c| *c = 0);
        for &label in labels {
            self.counts[label.index()] += 1;
        }

        let mut delta = SplitDelta::default();
        let per_label = self.meshes.entry(source).or_default();

        for label in self.domain.labels() {
            let face_count = self.counts[label.index()];
            if face_count == 0 {
                continue;
            }

            let mut indices = Vec::with_capacity(face_count * 3);
            for (tri, &tri_label) in labels.iter().enumerate() {
                if tri_label == label {
                    let (i0, i1, i2) = base_mesh.triangle(tri);
                    indices.push(i0);
                    indices.push(i1);
                    indices.push(i2);
                }
            }

            if let Some(existing) = per_label.get_mut(&label) {
                existing.mesh.positions.clone_from(&base_mesh.positions);
                existing.mesh.normals.clone_from(&base_mesh.normals);
                existing.mesh.indices = indices;
                existing.pose = pose;
                delta.updated.push(existing.clone());
            } else {
                let classified = ClassifiedMesh {
                    id: ClassifiedMeshId(self.next_id),
                    source,
                    label,
                    pose,
                    mesh: TriangleMesh {
                        positions: base_mesh.positions.clone(),
                        normals: base_mesh.normals.clone(),
                        indices,
                    },
                };
                self.next_id += 1;
                delta.added.push(classified.clone());
                per_label.insert(label, classified);
            }
        }

        // Labels present last frame with zero triangles now
        let mut stale: SmallVec<[Label; 8]> = per_label
            .keys()
            .copied()
            .filter(|label| self.counts[label.index()] == 0)
            .collect();
        stale.sort_unstable();
        for label in stale {
            if let Some(dropped) = per_label.remove(&label) {
                delta.removed.push(RemovedMesh {
                    source,
                    label,
                    id: dropped.id,
                });
            }
        }

        if per_label.is_empty() {
            self.meshes.remove(&source);
        }

        log::debug!(
            "split {source}: {} added, {} updated, {} removed",
            delta.added.len(),
            delta.updated.len(),
            delta.removed.len()
        );
        Ok(delta)
    }

    /// Drop every sub-mesh of a source the tracker no longer reports
    ///
    /// Unknown sources are a no-op and return an empty list.
    pub fn remove_source(&mut self, source: TrackableId) -> Vec<RemovedMesh> {
        let Some(per_label) = self.meshes.remove(&source) else {
            return Vec::new();
        };

        let mut removed: Vec<RemovedMesh> = per_label
            .into_values()
            .map(|classified| RemovedMesh {
                source,
                label: classified.label,
                id: classified.id,
            })
            .collect();
        removed.sort_unstable_by_key(|r| r.label);

        log::debug!("source {source} gone, dropped {} sub-meshes", removed.len());
        removed
    }

    /// Snapshot every tracked sub-mesh across all sources, ordered by id
    ///
    /// Pull-style counterpart to the per-frame deltas, for consumers joining
    /// after meshes were first reported.
    pub fn get_all(&self) -> Vec<ClassifiedMesh> {
        let mut all: Vec<ClassifiedMesh> = self
            .meshes
            .values()
            .flat_map(|per_label| per_label.values().cloned())
            .collect();
        all.sort_unstable_by_key(|classified| classified.id);
        all
    }

    /// Snapshot the sub-meshes of one source, ordered by label
    pub fn meshes_for(&self, source: TrackableId) -> Vec<ClassifiedMesh> {
        let Some(per_label) = self.meshes.get(&source) else {
            return Vec::new();
        };
        let mut meshes: Vec<ClassifiedMesh> = per_label.values().cloned().collect();
        meshes.sort_unstable_by_key(|classified| classified.label);
        meshes
    }

    /// Apply one polled batch: snapshots first, then source removals
    ///
    /// Snapshots are applied one at a time; a malformed snapshot aborts the
    /// rest of the batch, leaving the frames before it applied.
    pub fn apply_batch(&mut self, batch: SnapshotBatch) -> Result<SplitDelta> {
        let mut delta = SplitDelta::default();
        for snapshot in batch.snapshots {
            delta.merge(self.update(
                snapshot.source,
                &snapshot.mesh,
                &snapshot.labels,
                snapshot.pose,
            )?);
        }
        for source in batch.removed_sources {
            delta.removed.extend(self.remove_source(source));
        }
        Ok(delta)
    }
}
