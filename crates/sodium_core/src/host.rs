//! Host scene capability interface.
//!
//! The codec never touches a content-creation application directly. It goes
//! through [`HostScene`], which exposes just enough of a host to create and
//! read objects, datablocks, properties and animation curves. Each host gets
//! its own adapter; [`crate::memory::MemoryScene`] is the in-memory one.

use std::fmt;

use sodium_math::{Mat4, Vec3};
use thiserror::Error;

use crate::document::FrameRate;

/// Handle to a scene object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub usize);

/// Handle to a mesh datablock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// Handle to a light datablock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightId(pub usize);

/// Handle to a material datablock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub usize);

/// Something that owns animatable properties and curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Object(ObjectId),
    Light(LightId),
}

/// Errors raised by a host adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Unknown {kind} handle {index}")]
    UnknownHandle { kind: &'static str, index: usize },

    #[error("\"{target}\" has no property \"{path}\"")]
    NoSuchProperty { target: String, path: PropertyPath },

    #[error("Property \"{path}\" expects a {expected} value")]
    TypeMismatch { path: PropertyPath, expected: ValueKind },

    #[error("Mesh \"{mesh}\" references vertex {index}, but only {count} exist")]
    MissingVertex { mesh: String, index: u32, count: usize },

    #[error("Cannot parent \"{child}\" to \"{parent}\", which is itself or one of its descendants")]
    ParentCycle { child: String, parent: String },
}

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

/// Animatable properties the codec reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyPath {
    /// Object translation
    Location,
    /// Object Euler XYZ rotation in radians
    RotationEuler,
    /// Object scale
    Scale,
    /// Light color
    Color,
    /// Light intensity multiplier
    Energy,
    /// Light subtracts instead of adds
    UseNegative,
    /// Light falloff radius
    Distance,
    /// Spot cone angle in radians
    SpotSize,
}

impl PropertyPath {
    /// Data path string as the host names it.
    pub fn data_path(self) -> &'static str {
        match self {
            PropertyPath::Location => "location",
            PropertyPath::RotationEuler => "rotation_euler",
            PropertyPath::Scale => "scale",
            PropertyPath::Color => "color",
            PropertyPath::Energy => "energy",
            PropertyPath::UseNegative => "use_negative",
            PropertyPath::Distance => "distance",
            PropertyPath::SpotSize => "spot_size",
        }
    }

    pub fn value_kind(self) -> ValueKind {
        match self {
            PropertyPath::Location
            | PropertyPath::RotationEuler
            | PropertyPath::Scale
            | PropertyPath::Color => ValueKind::Vector3,
            PropertyPath::UseNegative => ValueKind::Bool,
            PropertyPath::Energy | PropertyPath::Distance | PropertyPath::SpotSize => {
                ValueKind::Float
            }
        }
    }

    /// Number of animation channels (array indices) the property has.
    pub fn axis_count(self) -> usize {
        self.value_kind().axis_count()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.data_path())
    }
}

/// Shape of a property value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    Float,
    Bool,
    Vector3,
}

impl ValueKind {
    pub fn axis_count(self) -> usize {
        match self {
            ValueKind::Float | ValueKind::Bool => 1,
            ValueKind::Vector3 => 3,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Float => f.write_str("float"),
            ValueKind::Bool => f.write_str("boolean"),
            ValueKind::Vector3 => f.write_str("vector"),
        }
    }
}

/// A property value as stored on the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PropertyValue {
    Float(f32),
    Bool(bool),
    Vector3(Vec3),
}

impl PropertyValue {
    /// Build a value of `kind` from per-axis numbers. Booleans are `!= 0`.
    pub fn from_components(kind: ValueKind, components: &[f32]) -> Option<Self> {
        match (kind, components) {
            (ValueKind::Float, [value]) => Some(PropertyValue::Float(*value)),
            (ValueKind::Bool, [value]) => Some(PropertyValue::Bool(*value != 0.0)),
            (ValueKind::Vector3, [x, y, z]) => Some(PropertyValue::Vector3(Vec3::new(*x, *y, *z))),
            _ => None,
        }
    }

    /// Numeric value of one axis. Booleans read as 0 / 1.
    pub fn component(&self, axis: usize) -> Option<f32> {
        match (self, axis) {
            (PropertyValue::Float(value), 0) => Some(*value),
            (PropertyValue::Bool(value), 0) => Some(if *value { 1.0 } else { 0.0 }),
            (PropertyValue::Vector3(vector), 0..=2) => Some(vector[axis]),
            _ => None,
        }
    }
}

/// Host keyframe interpolation modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Constant,
    Linear,
    Bezier,
    Sine,
    Quad,
    Cubic,
    Bounce,
    Elastic,
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Interpolation::Constant => "CONSTANT",
            Interpolation::Linear => "LINEAR",
            Interpolation::Bezier => "BEZIER",
            Interpolation::Sine => "SINE",
            Interpolation::Quad => "QUAD",
            Interpolation::Cubic => "CUBIC",
            Interpolation::Bounce => "BOUNCE",
            Interpolation::Elastic => "ELASTIC",
        };
        f.write_str(name)
    }
}

/// What a curve does before its first and after its last keyframe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Extrapolation {
    /// Hold the end values
    #[default]
    Constant,
    /// Continue the end slopes
    Linear,
}

impl fmt::Display for Extrapolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extrapolation::Constant => f.write_str("CONSTANT"),
            Extrapolation::Linear => f.write_str("LINEAR"),
        }
    }
}

/// A keyframe on a host animation curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    pub frame: f32,
    pub value: f32,
    pub interpolation: Interpolation,
}

/// One animated channel of one property: `(path, axis)` identifies it.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationCurve {
    pub path: PropertyPath,
    pub axis: usize,
    pub extrapolation: Extrapolation,
    pub points: Vec<CurvePoint>,
}

impl AnimationCurve {
    pub fn new(path: PropertyPath, axis: usize) -> Self {
        Self {
            path,
            axis,
            extrapolation: Extrapolation::Constant,
            points: Vec::new(),
        }
    }

    /// Insert a keyframe, keeping points sorted by frame.
    ///
    /// A point on an already keyed frame replaces the existing one.
    pub fn insert(&mut self, point: CurvePoint) {
        match self
            .points
            .binary_search_by(|existing| existing.frame.total_cmp(&point.frame))
        {
            Ok(index) => self.points[index] = point,
            Err(index) => self.points.insert(index, point),
        }
    }

    pub fn with_point(mut self, frame: f32, value: f32, interpolation: Interpolation) -> Self {
        self.insert(CurvePoint {
            frame,
            value,
            interpolation,
        });
        self
    }

    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }
}

/// Host object kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Empty,
    Mesh,
    Lamp,
    Camera,
    Curve,
    Armature,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Empty => "EMPTY",
            ObjectKind::Mesh => "MESH",
            ObjectKind::Lamp => "LAMP",
            ObjectKind::Camera => "CAMERA",
            ObjectKind::Curve => "CURVE",
            ObjectKind::Armature => "ARMATURE",
        };
        f.write_str(name)
    }
}

/// Datablock an object instances.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectData {
    Empty,
    Mesh(MeshId),
    Light(LightId),
    /// A kind the codec does not translate
    Other(ObjectKind),
}

impl ObjectData {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ObjectData::Empty => ObjectKind::Empty,
            ObjectData::Mesh(_) => ObjectKind::Mesh,
            ObjectData::Light(_) => ObjectKind::Lamp,
            ObjectData::Other(kind) => *kind,
        }
    }
}

/// Scene unit systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitSystem {
    None,
    Metric,
    Imperial,
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::None => f.write_str("NONE"),
            UnitSystem::Metric => f.write_str("METRIC"),
            UnitSystem::Imperial => f.write_str("IMPERIAL"),
        }
    }
}

/// Scene length unit configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UnitSettings {
    pub system: UnitSystem,
    pub scale_length: f32,
}

impl UnitSettings {
    /// Metric with a scale of 1: one unit is one meter.
    pub const METERS: UnitSettings = UnitSettings {
        system: UnitSystem::Metric,
        scale_length: 1.0,
    };

    pub fn is_meters(&self) -> bool {
        self.system == UnitSystem::Metric && self.scale_length == 1.0
    }
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self::METERS
    }
}

/// Display settings applied to a material.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialPreset {
    pub diffuse_color: Vec3,
    pub diffuse_intensity: f32,
    pub specular_intensity: f32,
    pub alpha: f32,
    pub use_transparency: bool,
    pub emit: bool,
}

impl Default for MaterialPreset {
    fn default() -> Self {
        Self {
            diffuse_color: Vec3::splat(0.8),
            diffuse_intensity: 0.8,
            specular_intensity: 0.5,
            alpha: 1.0,
            use_transparency: false,
            emit: false,
        }
    }
}

/// A polygon of a host mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    /// Vertex indices in winding order
    pub vertices: Vec<u32>,

    /// Index into `MeshGeometry::material_slots`
    pub material_index: usize,
}

/// Host mesh datablock contents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshGeometry {
    pub vertices: Vec<Vec3>,
    pub polygons: Vec<Polygon>,

    /// Material per slot; a slot may be empty
    pub material_slots: Vec<Option<MaterialId>>,
}

impl MeshGeometry {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }
}

/// Host light types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Spot,
    Sun,
    Hemi,
    Area,
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LightKind::Point => "POINT",
            LightKind::Spot => "SPOT",
            LightKind::Sun => "SUN",
            LightKind::Hemi => "HEMI",
            LightKind::Area => "AREA",
        };
        f.write_str(name)
    }
}

/// Host shadow methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowMethod {
    NoShadow,
    RayShadow,
    BufferShadow,
}

impl fmt::Display for ShadowMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadowMethod::NoShadow => f.write_str("NOSHADOW"),
            ShadowMethod::RayShadow => f.write_str("RAY_SHADOW"),
            ShadowMethod::BufferShadow => f.write_str("BUFFER_SHADOW"),
        }
    }
}

/// Host light attenuation curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FalloffType {
    Constant,
    InverseLinear,
    InverseSquare,
    Custom,
    LinearQuadraticWeighted,
}

impl fmt::Display for FalloffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FalloffType::Constant => "CONSTANT",
            FalloffType::InverseLinear => "INVERSE_LINEAR",
            FalloffType::InverseSquare => "INVERSE_SQUARE",
            FalloffType::Custom => "CUSTOM_CURVE",
            FalloffType::LinearQuadraticWeighted => "LINEAR_QUADRATIC_WEIGHTED",
        };
        f.write_str(name)
    }
}

/// Host light datablock contents.
#[derive(Clone, Debug, PartialEq)]
pub struct LightData {
    pub kind: LightKind,
    pub color: Vec3,
    pub energy: f32,
    pub use_negative: bool,
    pub distance: f32,
    pub spot_size: f32,
    pub spot_blend: f32,
    pub use_sphere: bool,
    pub use_square: bool,
    pub use_halo: bool,
    pub shadow_method: ShadowMethod,
    pub falloff_type: FalloffType,
}

impl LightData {
    /// A light with the host's defaults for `kind`.
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            color: Vec3::ONE,
            energy: 1.0,
            use_negative: false,
            distance: 25.0,
            spot_size: 45f32.to_radians(),
            spot_blend: 0.15,
            use_sphere: false,
            use_square: false,
            use_halo: false,
            shadow_method: ShadowMethod::RayShadow,
            falloff_type: FalloffType::InverseSquare,
        }
    }
}

/// Capability interface over a host scene.
///
/// Handles passed in must come from the same host; adapters report stale or
/// foreign handles as [`HostError::UnknownHandle`].
pub trait HostScene {
    // Scene settings
    fn frame_rate(&self) -> FrameRate;
    fn set_frame_rate(&mut self, rate: FrameRate);
    fn unit_settings(&self) -> UnitSettings;
    fn set_unit_settings(&mut self, units: UnitSettings);

    // Materials
    fn find_material(&self, name: &str) -> Option<MaterialId>;
    fn create_material(&mut self, name: &str) -> MaterialId;
    fn apply_material_preset(&mut self, id: MaterialId, preset: MaterialPreset) -> HostResult<()>;
    fn material_name(&self, id: MaterialId) -> HostResult<&str>;

    // Datablocks
    fn create_mesh(&mut self, name: &str, geometry: MeshGeometry) -> MeshId;
    fn mesh(&self, id: MeshId) -> HostResult<&MeshGeometry>;
    fn mesh_name(&self, id: MeshId) -> HostResult<&str>;
    fn create_light(&mut self, name: &str, light: LightData) -> LightId;
    fn light(&self, id: LightId) -> HostResult<&LightData>;
    fn light_name(&self, id: LightId) -> HostResult<&str>;

    // Objects and hierarchy
    fn create_object(&mut self, name: &str, data: ObjectData) -> ObjectId;
    fn object_name(&self, id: ObjectId) -> HostResult<&str>;
    fn object_data(&self, id: ObjectId) -> HostResult<ObjectData>;
    fn set_parent(&mut self, child: ObjectId, parent: Option<ObjectId>) -> HostResult<()>;
    fn parent(&self, id: ObjectId) -> HostResult<Option<ObjectId>>;
    fn children(&self, id: ObjectId) -> HostResult<Vec<ObjectId>>;
    fn root_objects(&self) -> Vec<ObjectId>;

    // Transforms
    fn parent_inverse(&self, id: ObjectId) -> HostResult<Mat4>;
    fn set_parent_inverse(&mut self, id: ObjectId, matrix: Mat4) -> HostResult<()>;
    fn world_matrix(&self, id: ObjectId) -> HostResult<Mat4>;
    /// Replace the local location / rotation / scale with the decomposition of `matrix`.
    fn set_basis_matrix(&mut self, id: ObjectId, matrix: Mat4) -> HostResult<()>;

    // Properties and animation
    fn property(&self, target: Target, path: PropertyPath) -> HostResult<PropertyValue>;
    fn set_property(&mut self, target: Target, path: PropertyPath, value: PropertyValue) -> HostResult<()>;
    fn curve(&self, target: Target, path: PropertyPath, axis: usize) -> HostResult<Option<&AnimationCurve>>;
    /// Install a curve, replacing any existing curve for the same `(path, axis)`.
    fn add_curve(&mut self, target: Target, curve: AnimationCurve) -> HostResult<()>;

    /// Name of the object or datablock behind `target`.
    fn target_name(&self, target: Target) -> HostResult<&str> {
        match target {
            Target::Object(id) => self.object_name(id),
            Target::Light(id) => self.light_name(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_insert_keeps_frame_order() {
        let curve = AnimationCurve::new(PropertyPath::Location, 0)
            .with_point(10.0, 1.0, Interpolation::Linear)
            .with_point(0.0, 0.0, Interpolation::Linear)
            .with_point(5.0, 3.0, Interpolation::Constant)
            .with_point(10.0, 2.0, Interpolation::Linear);

        let frames: Vec<f32> = curve.points.iter().map(|p| p.frame).collect();
        assert_eq!(frames, vec![0.0, 5.0, 10.0]);
        assert_eq!(curve.points[2].value, 2.0);
    }

    #[test]
    fn test_property_components() {
        let value = PropertyValue::from_components(ValueKind::Vector3, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(value.component(2), Some(3.0));
        assert_eq!(value.component(3), None);

        assert_eq!(
            PropertyValue::from_components(ValueKind::Bool, &[2.0]),
            Some(PropertyValue::Bool(true))
        );
        assert_eq!(PropertyValue::Bool(true).component(0), Some(1.0));
        assert_eq!(PropertyValue::from_components(ValueKind::Float, &[1.0, 2.0]), None);
    }

    #[test]
    fn test_unit_settings() {
        assert!(UnitSettings::default().is_meters());
        let centimeters = UnitSettings {
            system: UnitSystem::Metric,
            scale_length: 0.01,
        };
        assert!(!centimeters.is_meters());
    }
}
