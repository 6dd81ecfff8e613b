//! Node transform codec and parent-inverse normalization.
//!
//! The file format has no parent-inverse offset: a node's world pose is the
//! product of local transforms along its ancestry. Before a node is written
//! its parent-inverse is folded into its local transform.

use sodium_math::{Mat4, Mat4Ext};

use crate::document::NodeTransform;
use crate::host::{HostResult, HostScene, ObjectId, PropertyPath, Target};

use super::animation::{read_animation, validate_property, write_animation};
use super::error::{ExportResult, SchemaError};

/// Check the three transform properties of a node.
pub fn validate_transform(node: &str, transform: &NodeTransform) -> Result<(), SchemaError> {
    validate_property(node, "translation", &transform.translation, 3)?;
    validate_property(node, "rotation", &transform.rotation, 3)?;
    validate_property(node, "scale", &transform.scale, 3)
}

/// Install a node transform on a host object.
pub fn decode_transform<H: HostScene + ?Sized>(
    host: &mut H,
    object: ObjectId,
    transform: &NodeTransform,
) -> HostResult<()> {
    let target = Target::Object(object);
    read_animation(host, target, PropertyPath::Location, &transform.translation)?;
    read_animation(host, target, PropertyPath::RotationEuler, &transform.rotation)?;
    read_animation(host, target, PropertyPath::Scale, &transform.scale)
}

/// Read a host object's transform as a node transform.
pub fn encode_transform<H: HostScene + ?Sized>(
    host: &H,
    object: ObjectId,
) -> ExportResult<NodeTransform> {
    let name = host.object_name(object)?;
    let target = Target::Object(object);
    Ok(NodeTransform {
        rotation: write_animation(host, name, target, PropertyPath::RotationEuler)?,
        scale: write_animation(host, name, target, PropertyPath::Scale)?,
        translation: write_animation(host, name, target, PropertyPath::Location)?,
    })
}

/// Reset a non-identity parent-inverse while keeping the world pose.
///
/// Returns whether the object was changed.
pub fn normalize_parent_inverse<H: HostScene + ?Sized>(
    host: &mut H,
    object: ObjectId,
    tolerance: f32,
) -> HostResult<bool> {
    if host.parent_inverse(object)?.is_identity_within(tolerance) {
        return Ok(false);
    }

    let world = host.world_matrix(object)?;
    let parent_world = match host.parent(object)? {
        Some(parent) => host.world_matrix(parent)?,
        None => Mat4::IDENTITY,
    };

    host.set_parent_inverse(object, Mat4::IDENTITY)?;
    host.set_basis_matrix(object, parent_world.inverse() * world)?;
    Ok(true)
}
