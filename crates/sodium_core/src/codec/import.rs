//! Document to host scene.
//!
//! Import runs in two passes. The first checks the whole document without
//! touching the host, so a bad file never leaves a half-built scene. The
//! second creates materials, then meshes, then lights, then walks the node
//! forest depth-first, binding each object to the resources it names.

use std::collections::HashMap;

use crate::document::{DataKind, Document, NodeMap, Resources, SceneNode};
use crate::host::{HostScene, LightId, MeshId, ObjectData, ObjectId, UnitSettings};

use super::error::{ImportResult, SchemaError};
use super::light::{build_light, validate_light};
use super::mesh::{build_mesh, validate_mesh, MaterialTable};
use super::transform::{decode_transform, validate_transform};

/// What an import created on the host.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub meshes: usize,
    pub lights: usize,
    pub objects: usize,
}

/// Resource lookup shared by every node of one import.
struct ImportContext {
    meshes: HashMap<String, MeshId>,
    lights: HashMap<String, LightId>,
    objects: usize,
}

/// The resource a node references, if any.
pub fn node_reference<'a>(name: &str, node: &'a SceneNode) -> Result<Option<(DataKind, &'a str)>, SchemaError> {
    match (node.kind, node.data.as_deref()) {
        (Some(kind), Some(data)) => Ok(Some((kind, data))),
        (None, None) => Ok(None),
        _ => Err(SchemaError::HalfReference {
            node: name.to_string(),
        }),
    }
}

/// Check everything import relies on before the host is touched.
pub fn validate_document(document: &Document) -> Result<(), SchemaError> {
    let rate = document.frames_per_second;
    if rate.numerator == 0 || rate.denominator == 0 {
        return Err(SchemaError::InvalidFrameRate {
            numerator: rate.numerator,
            denominator: rate.denominator,
        });
    }

    for (name, mesh) in &document.data.meshes {
        validate_mesh(name, mesh)?;
    }
    for (name, light) in &document.data.lights {
        validate_light(name, light)?;
    }
    validate_nodes(&document.data, &document.scene_nodes)
}

fn validate_nodes(resources: &Resources, nodes: &NodeMap) -> Result<(), SchemaError> {
    for (name, node) in nodes {
        if let Some((kind, data)) = node_reference(name, node)? {
            let exists = match kind {
                DataKind::Mesh => resources.meshes.contains_key(data),
                DataKind::Light => resources.lights.contains_key(data),
            };
            if !exists {
                return Err(SchemaError::DanglingReference {
                    node: name.clone(),
                    kind,
                    name: data.to_string(),
                });
            }
        }
        validate_transform(name, &node.transform)?;
        validate_nodes(resources, &node.children)?;
    }
    Ok(())
}

/// Build `document` into `host`.
pub fn import_document<H: HostScene + ?Sized>(host: &mut H, document: &Document) -> ImportResult<ImportReport> {
    validate_document(document)?;

    host.set_frame_rate(document.frames_per_second);
    host.set_unit_settings(UnitSettings::METERS);
    let materials = MaterialTable::ensure(host)?;

    let mut context = ImportContext {
        meshes: HashMap::new(),
        lights: HashMap::new(),
        objects: 0,
    };

    for (name, mesh) in &document.data.meshes {
        let id = build_mesh(host, name, mesh, &materials)?;
        context.meshes.insert(name.clone(), id);
    }
    for (name, light) in &document.data.lights {
        let id = build_light(host, name, light)?;
        context.lights.insert(name.clone(), id);
    }

    instantiate(host, &mut context, None, &document.scene_nodes)?;

    let report = ImportReport {
        meshes: context.meshes.len(),
        lights: context.lights.len(),
        objects: context.objects,
    };
    log::info!(
        "Imported {} meshes, {} lights, {} objects at {} fps",
        report.meshes,
        report.lights,
        report.objects,
        document.frames_per_second
    );
    Ok(report)
}

fn instantiate<H: HostScene + ?Sized>(
    host: &mut H,
    context: &mut ImportContext,
    parent: Option<ObjectId>,
    nodes: &NodeMap,
) -> ImportResult<()> {
    for (name, node) in nodes {
        let data = match node_reference(name, node)? {
            None => ObjectData::Empty,
            Some((kind, data)) => resolve(context, name, kind, data)?,
        };

        let object = host.create_object(name, data);
        host.set_parent(object, parent)?;
        decode_transform(host, object, &node.transform)?;
        context.objects += 1;
        log::debug!("Created object \"{}\" ({})", name, data.kind());

        instantiate(host, context, Some(object), &node.children)?;
    }
    Ok(())
}

fn resolve(context: &ImportContext, node: &str, kind: DataKind, name: &str) -> Result<ObjectData, SchemaError> {
    let data = match kind {
        DataKind::Mesh => context.meshes.get(name).copied().map(ObjectData::Mesh),
        DataKind::Light => context.lights.get(name).copied().map(ObjectData::Light),
    };
    data.ok_or_else(|| SchemaError::DanglingReference {
        node: node.to_string(),
        kind,
        name: name.to_string(),
    })
}
