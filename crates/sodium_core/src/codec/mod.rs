//! Sodium Scene File codec.
//!
//! Converts between a [`Document`](crate::document::Document) and any
//! [`HostScene`](crate::host::HostScene).
//!
//! ## Supported host features
//!
//! - Empty, mesh and lamp objects in any hierarchy
//! - Meshes whose faces use the `none`, `walk` or `occluder` materials
//! - Spherical, shadowless, inverse-linear point and spot lamps
//! - Constant and linear keyframes with constant extrapolation
//!
//! Everything else is rejected on export with an [`UnsupportedFeature`]
//! naming the object.
//!
//! # Example
//!
//! ```ignore
//! use sodium_core::codec::{export_document, import_document, CodecConfig};
//! use sodium_core::memory::MemoryScene;
//!
//! let mut scene = MemoryScene::new();
//! import_document(&mut scene, &document)?;
//! let written = export_document(&mut scene, &CodecConfig::default())?;
//! ```

pub mod animation;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod light;
pub mod mesh;
pub mod transform;

pub use config::CodecConfig;
pub use error::*;
pub use export::{check_preconditions, export_document};
pub use import::{import_document, validate_document, ImportReport};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::*;
    use crate::host::{HostScene, ObjectData};
    use crate::memory::MemoryScene;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// A scene exercising every resource kind and a two-level hierarchy.
    fn level_document() -> Document {
        let mut document = Document::new(FrameRate::new(30, 1));

        let mut floor = MeshResource {
            locations: vec![
                [0.0, 0.0, 0.0],
                [4.0, 0.0, 0.0],
                [0.0, 0.0, 2.0],
                [4.0, 4.0, 0.0],
                [0.0, 4.0, 0.0],
            ],
            ..Default::default()
        };
        // Locations are listed in first-use order, occluder faces first
        floor.materials.insert(MaterialRole::Occluder, vec![vec![0, 1, 2]]);
        floor.materials.insert(MaterialRole::Walk, vec![vec![0, 1, 3, 4]]);
        document.data.meshes.insert("FloorMesh".to_string(), floor);

        document.data.lights.insert(
            "Torch".to_string(),
            LightResource {
                color: AnimatedProperty::fixed(&[1.0, 0.8, 0.6]),
                falloff: Falloff::Cone {
                    multiplier: AnimatedProperty::Scalar(vec![
                        Keyframe::constant(0.0, 1.0),
                        Keyframe::constant(12.0, 0.5),
                    ]),
                    negative: AnimatedProperty::Scalar(vec![Keyframe::constant(0.0, false)]),
                    radius: AnimatedProperty::fixed(&[20.0]),
                    spot_size: AnimatedProperty::fixed(&[0.9]),
                },
            },
        );

        let torch = SceneNode::new(NodeTransform {
            translation: AnimatedProperty::Vector(vec![
                vec![Keyframe::constant(0.0, 1.0)],
                vec![Keyframe::linear(0.0, 0.0), Keyframe::linear(30.0, 3.0)],
                vec![Keyframe::constant(0.0, 2.5)],
            ]),
            ..Default::default()
        })
        .with_data(DataKind::Light, "Torch");

        let floor = SceneNode::new(NodeTransform::fixed([0.0; 3], [0.0, 0.0, 0.5], [2.0, 2.0, 1.0]))
            .with_data(DataKind::Mesh, "FloorMesh")
            .with_child("Torch", torch);

        document.scene_nodes.insert("Floor".to_string(), floor);
        document.scene_nodes.insert(
            "Floor2".to_string(),
            SceneNode::new(NodeTransform::fixed([8.0, 0.0, 0.0], [0.0; 3], [1.0; 3]))
                .with_data(DataKind::Mesh, "FloorMesh"),
        );
        document
            .scene_nodes
            .insert("Marker".to_string(), SceneNode::new(NodeTransform::default()));
        document
    }

    #[test]
    fn test_import_then_export_is_identity() {
        init();
        let document = level_document();

        let mut scene = MemoryScene::new();
        let report = import_document(&mut scene, &document).unwrap();
        assert_eq!(report.objects, 4);
        assert_eq!(scene.mesh_count(), 1);
        assert_eq!(scene.light_count(), 1);
        assert!(scene.find_mesh("FloorMesh").is_some());
        assert!(scene.find_light("Torch").is_some());

        let exported = export_document(&mut scene, &CodecConfig::default()).unwrap();
        assert_eq!(exported, document);
    }

    #[test]
    fn test_frame_rate_survives_roundtrip() {
        let mut scene = MemoryScene::new();
        import_document(&mut scene, &Document::new(FrameRate::new(30, 1))).unwrap();
        assert_eq!(scene.frame_rate().fps(), 30.0);

        let exported = export_document(&mut scene, &CodecConfig::default()).unwrap();
        assert_eq!(exported.frames_per_second, FrameRate::new(30, 1));
    }

    #[test]
    fn test_second_import_reuses_materials() {
        let mut scene = MemoryScene::new();
        import_document(&mut scene, &level_document()).unwrap();
        import_document(&mut scene, &level_document()).unwrap();

        assert_eq!(scene.material_count(), 3);
        // Names collide, so the host renames the second batch
        assert!(scene.find_object("Floor.001").is_some());
        assert_eq!(scene.mesh_count(), 2);
    }

    #[test]
    fn test_static_shortcut_is_idempotent() {
        let mut document = Document::new(FrameRate::default());
        document.scene_nodes.insert(
            "Still".to_string(),
            SceneNode::new(NodeTransform::fixed([1.0, 2.0, 3.0], [0.0; 3], [1.0; 3])),
        );

        let mut scene = MemoryScene::new();
        import_document(&mut scene, &document).unwrap();
        let still = scene.find_object("Still").unwrap();
        assert!(scene.curves(crate::host::Target::Object(still)).unwrap().is_empty());
        assert_eq!(scene.object_data(still).unwrap(), ObjectData::Empty);

        let exported = export_document(&mut scene, &CodecConfig::default()).unwrap();
        assert_eq!(exported, document);
    }
}
