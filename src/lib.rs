//! meshsplit
//!
//! Splits reconstructed scene meshes into per-classification sub-meshes and
//! tracks them across frames. Trackers hand over whole meshes with one label
//! per triangle; [`MeshClassificationSplitter`] partitions each mesh by label
//! and reports explicit added/updated/removed deltas between frames, plus a
//! pull-style [`MeshClassificationSplitter::get_all`] snapshot for consumers
//! joining late.

pub mod error;
pub mod label;
pub mod mesh;
pub mod poll;
pub mod snapshot;
pub mod splitter;
pub mod trackable;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};

pub use error::{Error, Result};
pub use label::{Label, LabelDomain};
pub use mesh::TriangleMesh;
pub use poll::SnapshotPoller;
pub use snapshot::{
    LevelOfDetail, MeshSnapshot, QueryConfig, SnapshotBatch, SnapshotSource, StaticSnapshotSource,
};
pub use splitter::{ClassifiedMesh, MeshClassificationSplitter, RemovedMesh, SplitDelta};
pub use trackable::{ClassifiedMeshId, Pose, TrackableId};
