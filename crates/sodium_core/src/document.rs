//! Sodium Scene File document model.
//!
//! These types mirror the JSON layout one-to-one and are (de)serialized with
//! serde. Struct fields are declared in alphabetical order of their JSON keys
//! and mappings are either a `BTreeMap` or sort on write, so serialized output
//! has sorted keys.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{Error as _, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Scene nodes keyed by object name.
pub type NodeMap = BTreeMap<String, SceneNode>;

/// One axis of an animated property: keyframes ordered by frame.
pub type Channel = Vec<Keyframe>;

/// A polygon as an ordered list of indices into `MeshResource::locations`.
pub type PolygonIndices = Vec<u32>;

/// Root of a Sodium Scene File.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Shared mesh and light resources
    pub data: Resources,

    /// Scene frame rate as a fraction
    pub frames_per_second: FrameRate,

    /// Root scene nodes
    pub scene_nodes: NodeMap,
}

impl Document {
    /// Create an empty document at the given frame rate.
    pub fn new(frames_per_second: FrameRate) -> Self {
        Self {
            data: Resources::default(),
            frames_per_second,
            scene_nodes: NodeMap::new(),
        }
    }

    /// Total node count across the whole forest.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &NodeMap) -> usize {
            nodes.values().map(|node| 1 + count(&node.children)).sum()
        }
        count(&self.scene_nodes)
    }
}

/// Frame rate expressed as `numerator / denominator` frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRate {
    pub denominator: u32,
    pub numerator: u32,
}

impl FrameRate {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            denominator,
            numerator,
        }
    }

    /// Frames per second as a real number.
    pub fn fps(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::new(24, 1)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Named resources shared between scene nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub lights: BTreeMap<String, LightResource>,

    #[serde(default)]
    pub meshes: BTreeMap<String, MeshResource>,
}

/// Which resource table a node's `data` name refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Light,
    Mesh,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Light => f.write_str("light"),
            DataKind::Mesh => f.write_str("mesh"),
        }
    }
}

/// One object instance in the hierarchy.
///
/// `kind` and `data` are stored as the flat `type` / `data` keys of the file
/// and must be either both present or both absent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    #[serde(default)]
    pub children: NodeMap,

    /// Name of the referenced resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    pub transform: NodeTransform,

    /// Table the referenced resource lives in
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<DataKind>,
}

impl SceneNode {
    /// Create a node with no resource and no children.
    pub fn new(transform: NodeTransform) -> Self {
        Self {
            children: NodeMap::new(),
            data: None,
            transform,
            kind: None,
        }
    }

    /// Bind this node to a named resource.
    pub fn with_data(mut self, kind: DataKind, name: impl Into<String>) -> Self {
        self.kind = Some(kind);
        self.data = Some(name.into());
        self
    }

    /// Add a child node.
    pub fn with_child(mut self, name: impl Into<String>, child: SceneNode) -> Self {
        self.children.insert(name.into(), child);
        self
    }
}

/// Local transform of a node; rotation is Euler XYZ in radians.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeTransform {
    pub rotation: AnimatedProperty,
    pub scale: AnimatedProperty,
    pub translation: AnimatedProperty,
}

impl NodeTransform {
    /// A static transform: one constant keyframe at frame 0 per axis.
    pub fn fixed(translation: [f32; 3], rotation: [f32; 3], scale: [f32; 3]) -> Self {
        Self {
            rotation: AnimatedProperty::fixed(&rotation),
            scale: AnimatedProperty::fixed(&scale),
            translation: AnimatedProperty::fixed(&translation),
        }
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self::fixed([0.0; 3], [0.0; 3], [1.0; 3])
    }
}

/// A keyframed value: a bare channel for scalars, a list of channels for vectors.
#[derive(Clone, Debug, PartialEq)]
pub enum AnimatedProperty {
    Scalar(Channel),
    Vector(Vec<Channel>),
}

impl AnimatedProperty {
    /// Wrap per-axis channels; a single axis becomes a bare scalar channel.
    pub fn from_axes(mut axes: Vec<Channel>) -> Self {
        if axes.len() == 1 {
            AnimatedProperty::Scalar(axes.remove(0))
        } else {
            AnimatedProperty::Vector(axes)
        }
    }

    /// One constant keyframe at frame 0 per value.
    pub fn fixed(values: &[f32]) -> Self {
        Self::from_axes(
            values
                .iter()
                .map(|&value| vec![Keyframe::constant(0.0, value)])
                .collect(),
        )
    }

    /// Channels in axis order.
    pub fn axes(&self) -> &[Channel] {
        match self {
            AnimatedProperty::Scalar(channel) => std::slice::from_ref(channel),
            AnimatedProperty::Vector(channels) => channels,
        }
    }

    pub fn axis_count(&self) -> usize {
        self.axes().len()
    }
}

impl Serialize for AnimatedProperty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AnimatedProperty::Scalar(channel) => channel.serialize(serializer),
            AnimatedProperty::Vector(channels) => channels.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for AnimatedProperty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Inspect the first element so keyframe errors keep their own message
        let value = serde_json::Value::deserialize(deserializer)?;
        let is_vector = value
            .as_array()
            .and_then(|items| items.first())
            .is_some_and(serde_json::Value::is_array);

        if is_vector {
            serde_json::from_value(value)
                .map(AnimatedProperty::Vector)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(AnimatedProperty::Scalar)
                .map_err(D::Error::custom)
        }
    }
}

/// A single keyframe of a channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    pub starts_on_frame: f32,

    #[serde(rename = "type")]
    pub kind: KeyframeKind,

    pub with_value: KeyValue,
}

impl Keyframe {
    pub fn new(starts_on_frame: f32, kind: KeyframeKind, with_value: impl Into<KeyValue>) -> Self {
        Self {
            starts_on_frame,
            kind,
            with_value: with_value.into(),
        }
    }

    pub fn constant(starts_on_frame: f32, with_value: impl Into<KeyValue>) -> Self {
        Self::new(starts_on_frame, KeyframeKind::Constant, with_value)
    }

    pub fn linear(starts_on_frame: f32, with_value: impl Into<KeyValue>) -> Self {
        Self::new(starts_on_frame, KeyframeKind::Linear, with_value)
    }
}

/// Interpolation from a keyframe to the next one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyframeKind {
    /// Hold the value until the next keyframe
    Constant,
    Linear,
}

/// Keyframe value; boolean properties are written as `true` / `false`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    Bool(bool),
    Number(f32),
}

impl KeyValue {
    /// Numeric value, with booleans as 0 / 1.
    pub fn as_f32(self) -> f32 {
        match self {
            KeyValue::Bool(true) => 1.0,
            KeyValue::Bool(false) => 0.0,
            KeyValue::Number(value) => value,
        }
    }
}

impl From<f32> for KeyValue {
    fn from(value: f32) -> Self {
        KeyValue::Number(value)
    }
}

impl From<bool> for KeyValue {
    fn from(value: bool) -> Self {
        KeyValue::Bool(value)
    }
}

/// Surface role of a mesh polygon. Only these three materials are loadable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialRole {
    None,
    Occluder,
    Walk,
}

impl MaterialRole {
    pub const ALL: [MaterialRole; 3] = [MaterialRole::None, MaterialRole::Occluder, MaterialRole::Walk];

    /// Material name as used in files and on the host.
    pub fn name(self) -> &'static str {
        match self {
            MaterialRole::None => "none",
            MaterialRole::Occluder => "occluder",
            MaterialRole::Walk => "walk",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }
}

impl fmt::Display for MaterialRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shared mesh geometry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshResource {
    /// Distinct vertex positions
    pub locations: Vec<[f32; 3]>,

    /// Polygons grouped by material
    pub materials: MaterialGroups,
}

impl MeshResource {
    pub fn polygon_count(&self) -> usize {
        self.materials.iter().map(|(_, polygons)| polygons.len()).sum()
    }
}

/// Polygons grouped by material role.
///
/// Groups keep the order their roles were first seen in, which is the order
/// importers assign material slots in. Serialized keys are always sorted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialGroups {
    groups: Vec<(MaterialRole, Vec<PolygonIndices>)>,
}

impl MaterialGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the polygons of `role`, appending the role if it is new.
    pub fn insert(&mut self, role: MaterialRole, polygons: Vec<PolygonIndices>) {
        match self.groups.iter_mut().find(|(existing, _)| *existing == role) {
            Some((_, group)) => *group = polygons,
            None => self.groups.push((role, polygons)),
        }
    }

    /// Append one polygon to the group of `role`.
    pub fn push_polygon(&mut self, role: MaterialRole, polygon: PolygonIndices) {
        match self.groups.iter_mut().find(|(existing, _)| *existing == role) {
            Some((_, group)) => group.push(polygon),
            None => self.groups.push((role, vec![polygon])),
        }
    }

    pub fn get(&self, role: MaterialRole) -> Option<&[PolygonIndices]> {
        self.groups
            .iter()
            .find(|(existing, _)| *existing == role)
            .map(|(_, polygons)| polygons.as_slice())
    }

    /// Groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (MaterialRole, &[PolygonIndices])> {
        self.groups.iter().map(|(role, polygons)| (*role, polygons.as_slice()))
    }

    /// Roles in first-seen order.
    pub fn roles(&self) -> impl Iterator<Item = MaterialRole> + '_ {
        self.groups.iter().map(|(role, _)| *role)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Serialize for MaterialGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut sorted: Vec<_> = self.groups.iter().collect();
        sorted.sort_by_key(|(role, _)| role.name());

        let mut map = serializer.serialize_map(Some(sorted.len()))?;
        for (role, polygons) in sorted {
            map.serialize_entry(role, polygons)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MaterialGroups {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct GroupsVisitor;

        impl<'de> Visitor<'de> for GroupsVisitor {
            type Value = MaterialGroups;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from material role to polygons")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut groups = MaterialGroups::new();
                while let Some((role, polygons)) = access.next_entry::<MaterialRole, Vec<PolygonIndices>>()? {
                    if groups.get(role).is_some() {
                        return Err(A::Error::custom(format!("duplicate material \"{role}\"")));
                    }
                    groups.insert(role, polygons);
                }
                Ok(groups)
            }
        }

        deserializer.deserialize_map(GroupsVisitor)
    }
}

/// Shared light definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightResource {
    pub color: AnimatedProperty,
    pub falloff: Falloff,
}

/// Light attenuation shape, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Falloff {
    /// Point light
    Sphere {
        multiplier: AnimatedProperty,
        negative: AnimatedProperty,
        radius: AnimatedProperty,
    },

    /// Spot light
    Cone {
        multiplier: AnimatedProperty,
        negative: AnimatedProperty,
        radius: AnimatedProperty,
        #[serde(rename = "spotSize")]
        spot_size: AnimatedProperty,
    },
}

impl Falloff {
    pub fn type_name(&self) -> &'static str {
        match self {
            Falloff::Sphere { .. } => "sphere",
            Falloff::Cone { .. } => "cone",
        }
    }
}

impl Serialize for Falloff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Written by hand so `type` lands in sorted position after the fields
        let mut map = serializer.serialize_map(None)?;
        match self {
            Falloff::Sphere {
                multiplier,
                negative,
                radius,
            } => {
                map.serialize_entry("multiplier", multiplier)?;
                map.serialize_entry("negative", negative)?;
                map.serialize_entry("radius", radius)?;
            }
            Falloff::Cone {
                multiplier,
                negative,
                radius,
                spot_size,
            } => {
                map.serialize_entry("multiplier", multiplier)?;
                map.serialize_entry("negative", negative)?;
                map.serialize_entry("radius", radius)?;
                map.serialize_entry("spotSize", spot_size)?;
            }
        }
        map.serialize_entry("type", self.type_name())?;
        map.end()
    }
}
