// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end flow: snapshot source -> poller -> splitter

use std::thread;
use std::time::Duration;

use approx::assert_relative_eq;
use meshsplit::{
    Label, LabelDomain, LevelOfDetail, MeshClassificationSplitter, MeshSnapshot, Point3, Pose,
    QueryConfig, SnapshotBatch, SnapshotPoller, StaticSnapshotSource, TrackableId, TriangleMesh,
    Vector3,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two-quad patch: 6 vertices, 4 triangles
fn reconstructed_patch() -> TriangleMesh {
    let mut mesh = TriangleMesh::new();
    for i in 0..6 {
        mesh.add_vertex(
            Point3::new((i % 3) as f32, (i / 3) as f32, 0.0),
            Vector3::z(),
        );
    }
    mesh.add_triangle(0, 1, 3);
    mesh.add_triangle(1, 4, 3);
    mesh.add_triangle(1, 2, 4);
    mesh.add_triangle(2, 5, 4);
    mesh
}

fn labels(raw: &[u16]) -> Vec<Label> {
    raw.iter().map(|&l| Label(l)).collect()
}

#[test]
fn classified_lifecycle_across_frames() {
    init_logs();
    let domain = LabelDomain::arkit();
    let mut splitter = MeshClassificationSplitter::new(domain.clone());
    let source = TrackableId(0xdead, 0xbeef);
    let patch = reconstructed_patch();

    // Frame 1: three wall triangles, one floor triangle
    let frame1 = splitter
        .update(source, &patch, &labels(&[1, 1, 2, 1]), Pose::identity())
        .unwrap();
    assert_eq!(frame1.added.len(), 2);
    let wall = &frame1.added[0];
    let floor = &frame1.added[1];
    assert_eq!(domain.name(wall.label), Some("wall"));
    assert_eq!(domain.name(floor.label), Some("floor"));
    assert_eq!(wall.mesh.triangle_count(), 3);
    assert_eq!(floor.mesh.triangle_count(), 1);

    // Frame 2: the floor triangle got reclassified as wall
    let frame2 = splitter
        .update(source, &patch, &labels(&[1, 1, 1, 1]), Pose::identity())
        .unwrap();
    assert_eq!(frame2.updated.len(), 1);
    assert_eq!(frame2.updated[0].id, wall.id);
    assert_eq!(frame2.updated[0].mesh.triangle_count(), 4);
    assert_eq!(frame2.removed.len(), 1);
    assert_eq!(frame2.removed[0].id, floor.id);

    // The wall keeps its id, the floor is gone
    let all = splitter.get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, wall.id);

    // The tracker stops reporting the source entirely
    let removed = splitter.remove_source(source);
    assert_eq!(removed.len(), 1);
    assert_eq!(removed[0].id, wall.id);
    assert!(splitter.get_all().is_empty());
}

#[test]
fn batches_flow_from_source_through_poller_into_splitter() {
    init_logs();
    let domain = LabelDomain::scene_understanding();
    let source_id = TrackableId(1, 2);
    let patch = reconstructed_patch();

    let mut source = StaticSnapshotSource::new();
    source.push_batch(SnapshotBatch {
        snapshots: vec![MeshSnapshot::new(
            source_id,
            patch.clone(),
            labels(&[1, 1, 2, 2]),
        )],
        removed_sources: Vec::new(),
    });
    source.push_batch(SnapshotBatch {
        snapshots: Vec::new(),
        removed_sources: vec![source_id],
    });

    // Query settings are handed to the acquisition side explicitly
    let config = QueryConfig {
        mesh_density: 1.0,
        bounding_radius: 5.0,
        refresh_interval: Some(Duration::from_millis(1)),
        level_of_detail: LevelOfDetail::Fine,
    };
    assert_ne!(config, QueryConfig::default());

    let mut poller = SnapshotPoller::spawn(source, config);
    let mut splitter = MeshClassificationSplitter::new(domain);

    // Drain from the one thread that owns the splitter
    let mut saw_add = false;
    let mut saw_removal = false;
    for _ in 0..500 {
        for batch in poller.poll_batches() {
            let delta = splitter.apply_batch(batch).unwrap();
            saw_add |= !delta.added.is_empty();
            saw_removal |= !delta.removed.is_empty();
        }
        if saw_add && saw_removal {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }
    poller.stop();

    assert!(saw_add, "expected the first batch to add sub-meshes");
    assert!(saw_removal, "expected the second batch to remove the source");
    assert!(splitter.get_all().is_empty());
}

#[test]
fn snapshot_pose_is_carried_onto_sub_meshes() {
    init_logs();
    let domain = LabelDomain::scene_understanding();
    let mut splitter = MeshClassificationSplitter::new(domain);
    let patch = reconstructed_patch();

    let pose = Pose::translation(1.5, 0.0, -2.0);
    let snapshot = MeshSnapshot::new(TrackableId(3, 3), patch, labels(&[4, 4, 4, 4]))
        .with_pose(pose);

    let delta = splitter
        .apply_batch(SnapshotBatch {
            snapshots: vec![snapshot],
            removed_sources: Vec::new(),
        })
        .unwrap();

    assert_eq!(delta.added.len(), 1);
    let translation = delta.added[0].pose.translation.vector;
    assert_relative_eq!(translation.x, 1.5);
    assert_relative_eq!(translation.y, 0.0);
    assert_relative_eq!(translation.z, -2.0);
}

#[test]
fn unclassified_tracker_surfaces_whole_meshes() {
    init_logs();
    let domain = LabelDomain::unclassified();
    let mut splitter = MeshClassificationSplitter::new(domain.clone());
    let patch = reconstructed_patch();

    let snapshot = MeshSnapshot::unclassified(TrackableId(9, 9), patch.clone(), &domain);
    let delta = splitter
        .apply_batch(SnapshotBatch {
            snapshots: vec![snapshot],
            removed_sources: Vec::new(),
        })
        .unwrap();

    assert_eq!(delta.added.len(), 1);
    assert_eq!(delta.added[0].mesh.indices, patch.indices);
    assert_eq!(delta.added[0].mesh.positions, patch.positions);
}

#[test]
fn malformed_batch_keeps_earlier_frames_and_previous_state() {
    init_logs();
    let domain = LabelDomain::arkit();
    let mut splitter = MeshClassificationSplitter::new(domain);
    let patch = reconstructed_patch();
    let good = TrackableId(1, 1);
    let bad = TrackableId(2, 2);

    let result = splitter.apply_batch(SnapshotBatch {
        snapshots: vec![
            MeshSnapshot::new(good, patch.clone(), labels(&[1, 1, 1, 1])),
            // Label array too short for the mesh
            MeshSnapshot::new(bad, patch, labels(&[1, 1])),
        ],
        removed_sources: Vec::new(),
    });

    assert!(result.is_err());
    // The valid frame before the bad one was applied; the bad one was not
    assert_eq!(splitter.get_all().len(), 1);
    assert_eq!(splitter.get_all()[0].source, good);
}
