//! Host scene to document.
//!
//! The exporter walks every root object depth-first. Each visited object has
//! its parent-inverse folded into its local transform, then its transform,
//! data and children are written. Meshes and lights shared by several
//! objects are written once under their datablock name.

use crate::document::{DataKind, Document, NodeMap, Resources, SceneNode};
use crate::host::{HostScene, ObjectData, ObjectId};

use super::config::CodecConfig;
use super::error::{ExportResult, PreconditionError, UnsupportedFeature};
use super::light::describe_light;
use super::mesh::flatten_mesh;
use super::transform::{encode_transform, normalize_parent_inverse};

/// Traversal state for one export.
struct ExportContext<'a> {
    config: &'a CodecConfig,
    resources: Resources,
    normalized: usize,
}

/// Fail unless the scene is metric with a scale of 1.
pub fn check_preconditions<H: HostScene + ?Sized>(host: &H) -> Result<(), PreconditionError> {
    let units = host.unit_settings();
    if units.is_meters() {
        Ok(())
    } else {
        Err(PreconditionError::Units {
            system: units.system,
            scale: units.scale_length,
        })
    }
}

/// Describe the whole host scene as a document.
///
/// Takes the host mutably because parent-inverse normalization rewrites the
/// local transform of the objects it touches.
pub fn export_document<H: HostScene + ?Sized>(host: &mut H, config: &CodecConfig) -> ExportResult<Document> {
    check_preconditions(&*host)?;

    let mut context = ExportContext {
        config,
        resources: Resources::default(),
        normalized: 0,
    };

    let roots = host.root_objects();
    let scene_nodes = visit(host, &mut context, &roots)?;

    let document = Document {
        data: context.resources,
        frames_per_second: host.frame_rate(),
        scene_nodes,
    };
    log::info!(
        "Exported {} meshes, {} lights, {} objects at {} fps ({} normalized)",
        document.data.meshes.len(),
        document.data.lights.len(),
        document.node_count(),
        document.frames_per_second,
        context.normalized
    );
    Ok(document)
}

fn visit<H: HostScene + ?Sized>(
    host: &mut H,
    context: &mut ExportContext<'_>,
    objects: &[ObjectId],
) -> ExportResult<NodeMap> {
    let mut nodes = NodeMap::new();

    for &object in objects {
        if normalize_parent_inverse(host, object, context.config.parent_inverse_tolerance)? {
            log::warn!(
                "Object \"{}\" had a non-identity parent inverse, its local transform was rebuilt",
                host.object_name(object)?
            );
            context.normalized += 1;
        }

        let name = host.object_name(object)?.to_string();
        let mut node = SceneNode::new(encode_transform(&*host, object)?);

        match host.object_data(object)? {
            ObjectData::Empty => {}
            ObjectData::Mesh(mesh) => {
                let data = host.mesh_name(mesh)?.to_string();
                if !context.resources.meshes.contains_key(&data) {
                    let resource = flatten_mesh(&*host, &name, mesh)?;
                    log::debug!(
                        "Flattened mesh \"{}\": {} locations, {} polygons",
                        data,
                        resource.locations.len(),
                        resource.polygon_count()
                    );
                    context.resources.meshes.insert(data.clone(), resource);
                }
                node = node.with_data(DataKind::Mesh, data);
            }
            ObjectData::Light(light) => {
                let data = host.light_name(light)?.to_string();
                if !context.resources.lights.contains_key(&data) {
                    let resource = describe_light(&*host, &name, light)?;
                    log::debug!("Described {} light \"{}\"", resource.falloff.type_name(), data);
                    context.resources.lights.insert(data.clone(), resource);
                }
                node = node.with_data(DataKind::Light, data);
            }
            ObjectData::Other(kind) => {
                return Err(UnsupportedFeature::ObjectKind { object: name, kind }.into());
            }
        }

        let children = host.children(object)?;
        node.children = visit(host, context, &children)?;
        nodes.insert(name, node);
    }

    Ok(nodes)
}
