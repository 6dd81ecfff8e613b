//! In-memory host scene.
//!
//! `MemoryScene` implements [`HostScene`] over plain vectors. It is the host
//! used by the tests and the command line tool, and keeps names unique per
//! datablock kind the way content-creation hosts do (`Cube`, `Cube.001`, ...).

use sodium_math::{Mat4, Mat4Ext, Vec3};

use crate::document::FrameRate;
use crate::host::*;

#[derive(Clone, Debug)]
struct MemoryObject {
    name: String,
    data: ObjectData,
    parent: Option<ObjectId>,
    location: Vec3,
    rotation_euler: Vec3,
    scale: Vec3,
    parent_inverse: Mat4,
    curves: Vec<AnimationCurve>,
}

impl MemoryObject {
    fn basis(&self) -> Mat4 {
        Mat4::from_location_euler_scale(self.location, self.rotation_euler, self.scale)
    }
}

#[derive(Clone, Debug)]
struct MemoryLight {
    name: String,
    light: LightData,
    curves: Vec<AnimationCurve>,
}

#[derive(Clone, Debug)]
struct MemoryMaterial {
    name: String,
    preset: MaterialPreset,
}

/// A host scene held entirely in memory.
#[derive(Clone, Debug)]
pub struct MemoryScene {
    frame_rate: FrameRate,
    units: UnitSettings,
    objects: Vec<MemoryObject>,
    meshes: Vec<(String, MeshGeometry)>,
    lights: Vec<MemoryLight>,
    materials: Vec<MemoryMaterial>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    /// An empty scene at 24 fps in meters.
    pub fn new() -> Self {
        Self {
            frame_rate: FrameRate::default(),
            units: UnitSettings::METERS,
            objects: Vec::new(),
            meshes: Vec::new(),
            lights: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects.iter().position(|o| o.name == name).map(ObjectId)
    }

    pub fn find_mesh(&self, name: &str) -> Option<MeshId> {
        self.meshes.iter().position(|(n, _)| n == name).map(MeshId)
    }

    pub fn find_light(&self, name: &str) -> Option<LightId> {
        self.lights.iter().position(|l| l.name == name).map(LightId)
    }

    pub fn material_preset(&self, id: MaterialId) -> HostResult<MaterialPreset> {
        self.material_ref(id).map(|m| m.preset)
    }

    /// Mutable access to a light datablock's settings.
    pub fn light_mut(&mut self, id: LightId) -> HostResult<&mut LightData> {
        self.light_ref_mut(id).map(|l| &mut l.light)
    }

    /// Set an object's local location, rotation and scale.
    pub fn set_local_transform(
        &mut self,
        id: ObjectId,
        location: Vec3,
        rotation_euler: Vec3,
        scale: Vec3,
    ) -> HostResult<()> {
        let object = self.object_mut(id)?;
        object.location = location;
        object.rotation_euler = rotation_euler;
        object.scale = scale;
        Ok(())
    }

    /// Every curve installed on `target`.
    pub fn curves(&self, target: Target) -> HostResult<&[AnimationCurve]> {
        match target {
            Target::Object(id) => self.object_ref(id).map(|o| o.curves.as_slice()),
            Target::Light(id) => self.light_ref(id).map(|l| l.curves.as_slice()),
        }
    }

    fn object_ref(&self, id: ObjectId) -> HostResult<&MemoryObject> {
        self.objects.get(id.0).ok_or(HostError::UnknownHandle {
            kind: "object",
            index: id.0,
        })
    }

    fn object_mut(&mut self, id: ObjectId) -> HostResult<&mut MemoryObject> {
        self.objects.get_mut(id.0).ok_or(HostError::UnknownHandle {
            kind: "object",
            index: id.0,
        })
    }

    fn light_ref(&self, id: LightId) -> HostResult<&MemoryLight> {
        self.lights.get(id.0).ok_or(HostError::UnknownHandle {
            kind: "light",
            index: id.0,
        })
    }

    fn light_ref_mut(&mut self, id: LightId) -> HostResult<&mut MemoryLight> {
        self.lights.get_mut(id.0).ok_or(HostError::UnknownHandle {
            kind: "light",
            index: id.0,
        })
    }

    fn material_ref(&self, id: MaterialId) -> HostResult<&MemoryMaterial> {
        self.materials.get(id.0).ok_or(HostError::UnknownHandle {
            kind: "material",
            index: id.0,
        })
    }

    fn curves_mut(&mut self, target: Target) -> HostResult<&mut Vec<AnimationCurve>> {
        match target {
            Target::Object(id) => self.object_mut(id).map(|o| &mut o.curves),
            Target::Light(id) => self.light_ref_mut(id).map(|l| &mut l.curves),
        }
    }

    fn no_such_property(&self, target: Target, path: PropertyPath) -> HostError {
        HostError::NoSuchProperty {
            target: self.target_name(target).unwrap_or("?").to_string(),
            path,
        }
    }
}

/// First of `name`, `name.001`, `name.002`, ... not already taken.
fn unique_name<'a>(taken: impl Iterator<Item = &'a str> + Clone, name: &str) -> String {
    let is_taken = |candidate: &str| taken.clone().any(|existing| existing == candidate);
    if !is_taken(name) {
        return name.to_string();
    }
    (1..)
        .map(|n| format!("{name}.{n:03}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| name.to_string())
}

impl HostScene for MemoryScene {
    fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    fn set_frame_rate(&mut self, rate: FrameRate) {
        self.frame_rate = rate;
    }

    fn unit_settings(&self) -> UnitSettings {
        self.units
    }

    fn set_unit_settings(&mut self, units: UnitSettings) {
        self.units = units;
    }

    fn find_material(&self, name: &str) -> Option<MaterialId> {
        self.materials.iter().position(|m| m.name == name).map(MaterialId)
    }

    fn create_material(&mut self, name: &str) -> MaterialId {
        let name = unique_name(self.materials.iter().map(|m| m.name.as_str()), name);
        self.materials.push(MemoryMaterial {
            name,
            preset: MaterialPreset::default(),
        });
        MaterialId(self.materials.len() - 1)
    }

    fn apply_material_preset(&mut self, id: MaterialId, preset: MaterialPreset) -> HostResult<()> {
        let material = self.materials.get_mut(id.0).ok_or(HostError::UnknownHandle {
            kind: "material",
            index: id.0,
        })?;
        material.preset = preset;
        Ok(())
    }

    fn material_name(&self, id: MaterialId) -> HostResult<&str> {
        self.material_ref(id).map(|m| m.name.as_str())
    }

    fn create_mesh(&mut self, name: &str, geometry: MeshGeometry) -> MeshId {
        let name = unique_name(self.meshes.iter().map(|(n, _)| n.as_str()), name);
        self.meshes.push((name, geometry));
        MeshId(self.meshes.len() - 1)
    }

    fn mesh(&self, id: MeshId) -> HostResult<&MeshGeometry> {
        self.meshes.get(id.0).map(|(_, g)| g).ok_or(HostError::UnknownHandle {
            kind: "mesh",
            index: id.0,
        })
    }

    fn mesh_name(&self, id: MeshId) -> HostResult<&str> {
        self.meshes
            .get(id.0)
            .map(|(n, _)| n.as_str())
            .ok_or(HostError::UnknownHandle {
                kind: "mesh",
                index: id.0,
            })
    }

    fn create_light(&mut self, name: &str, light: LightData) -> LightId {
        let name = unique_name(self.lights.iter().map(|l| l.name.as_str()), name);
        self.lights.push(MemoryLight {
            name,
            light,
            curves: Vec::new(),
        });
        LightId(self.lights.len() - 1)
    }

    fn light(&self, id: LightId) -> HostResult<&LightData> {
        self.light_ref(id).map(|l| &l.light)
    }

    fn light_name(&self, id: LightId) -> HostResult<&str> {
        self.light_ref(id).map(|l| l.name.as_str())
    }

    fn create_object(&mut self, name: &str, data: ObjectData) -> ObjectId {
        let name = unique_name(self.objects.iter().map(|o| o.name.as_str()), name);
        self.objects.push(MemoryObject {
            name,
            data,
            parent: None,
            location: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            scale: Vec3::ONE,
            parent_inverse: Mat4::IDENTITY,
            curves: Vec::new(),
        });
        ObjectId(self.objects.len() - 1)
    }

    fn object_name(&self, id: ObjectId) -> HostResult<&str> {
        self.object_ref(id).map(|o| o.name.as_str())
    }

    fn object_data(&self, id: ObjectId) -> HostResult<ObjectData> {
        self.object_ref(id).map(|o| o.data)
    }

    fn set_parent(&mut self, child: ObjectId, parent: Option<ObjectId>) -> HostResult<()> {
        self.object_ref(child)?;
        if let Some(parent) = parent {
            // Walk up from the new parent; meeting the child means a cycle
            let mut ancestor = Some(parent);
            while let Some(current) = ancestor {
                if current == child {
                    return Err(HostError::ParentCycle {
                        child: self.object_ref(child)?.name.clone(),
                        parent: self.object_ref(parent)?.name.clone(),
                    });
                }
                ancestor = self.object_ref(current)?.parent;
            }
        }
        self.object_mut(child)?.parent = parent;
        Ok(())
    }

    fn parent(&self, id: ObjectId) -> HostResult<Option<ObjectId>> {
        self.object_ref(id).map(|o| o.parent)
    }

    fn children(&self, id: ObjectId) -> HostResult<Vec<ObjectId>> {
        self.object_ref(id)?;
        Ok(self
            .objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.parent == Some(id))
            .map(|(index, _)| ObjectId(index))
            .collect())
    }

    fn root_objects(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.parent.is_none())
            .map(|(index, _)| ObjectId(index))
            .collect()
    }

    fn parent_inverse(&self, id: ObjectId) -> HostResult<Mat4> {
        self.object_ref(id).map(|o| o.parent_inverse)
    }

    fn set_parent_inverse(&mut self, id: ObjectId, matrix: Mat4) -> HostResult<()> {
        self.object_mut(id)?.parent_inverse = matrix;
        Ok(())
    }

    fn world_matrix(&self, id: ObjectId) -> HostResult<Mat4> {
        let object = self.object_ref(id)?;
        let local = object.parent_inverse * object.basis();
        match object.parent {
            Some(parent) => Ok(self.world_matrix(parent)? * local),
            None => Ok(local),
        }
    }

    fn set_basis_matrix(&mut self, id: ObjectId, matrix: Mat4) -> HostResult<()> {
        let (location, rotation_euler, scale) = matrix.to_location_euler_scale();
        self.set_local_transform(id, location, rotation_euler, scale)
    }

    fn property(&self, target: Target, path: PropertyPath) -> HostResult<PropertyValue> {
        let value = match target {
            Target::Object(id) => {
                let object = self.object_ref(id)?;
                match path {
                    PropertyPath::Location => PropertyValue::Vector3(object.location),
                    PropertyPath::RotationEuler => PropertyValue::Vector3(object.rotation_euler),
                    PropertyPath::Scale => PropertyValue::Vector3(object.scale),
                    _ => return Err(self.no_such_property(target, path)),
                }
            }
            Target::Light(id) => {
                let light = &self.light_ref(id)?.light;
                match path {
                    PropertyPath::Color => PropertyValue::Vector3(light.color),
                    PropertyPath::Energy => PropertyValue::Float(light.energy),
                    PropertyPath::UseNegative => PropertyValue::Bool(light.use_negative),
                    PropertyPath::Distance => PropertyValue::Float(light.distance),
                    PropertyPath::SpotSize => PropertyValue::Float(light.spot_size),
                    _ => return Err(self.no_such_property(target, path)),
                }
            }
        };
        Ok(value)
    }

    fn set_property(&mut self, target: Target, path: PropertyPath, value: PropertyValue) -> HostResult<()> {
        let mismatch = HostError::TypeMismatch {
            path,
            expected: path.value_kind(),
        };
        let missing = self.no_such_property(target, path);

        match (target, value) {
            (Target::Object(id), PropertyValue::Vector3(vector)) => {
                let object = self.object_mut(id)?;
                match path {
                    PropertyPath::Location => object.location = vector,
                    PropertyPath::RotationEuler => object.rotation_euler = vector,
                    PropertyPath::Scale => object.scale = vector,
                    _ => return Err(missing),
                }
            }
            (Target::Object(_), _) => {
                return Err(if path.value_kind() == ValueKind::Vector3 { mismatch } else { missing })
            }
            (Target::Light(id), value) => {
                let light = &mut self.light_ref_mut(id)?.light;
                match (path, value) {
                    (PropertyPath::Color, PropertyValue::Vector3(color)) => light.color = color,
                    (PropertyPath::Energy, PropertyValue::Float(energy)) => light.energy = energy,
                    (PropertyPath::UseNegative, PropertyValue::Bool(negative)) => {
                        light.use_negative = negative
                    }
                    (PropertyPath::Distance, PropertyValue::Float(distance)) => {
                        light.distance = distance
                    }
                    (PropertyPath::SpotSize, PropertyValue::Float(size)) => light.spot_size = size,
                    (
                        PropertyPath::Location | PropertyPath::RotationEuler | PropertyPath::Scale,
                        _,
                    ) => return Err(missing),
                    _ => return Err(mismatch),
                }
            }
        }
        Ok(())
    }

    fn curve(&self, target: Target, path: PropertyPath, axis: usize) -> HostResult<Option<&AnimationCurve>> {
        Ok(self
            .curves(target)?
            .iter()
            .find(|curve| curve.path == path && curve.axis == axis))
    }

    fn add_curve(&mut self, target: Target, curve: AnimationCurve) -> HostResult<()> {
        let curves = self.curves_mut(target)?;
        match curves
            .iter_mut()
            .find(|existing| existing.path == curve.path && existing.axis == curve.axis)
        {
            Some(existing) => *existing = curve,
            None => curves.push(curve),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_made_unique() {
        let mut scene = MemoryScene::new();
        let a = scene.create_object("Cube", ObjectData::Empty);
        let b = scene.create_object("Cube", ObjectData::Empty);
        let c = scene.create_object("Cube", ObjectData::Empty);

        assert_eq!(scene.object_name(a).unwrap(), "Cube");
        assert_eq!(scene.object_name(b).unwrap(), "Cube.001");
        assert_eq!(scene.object_name(c).unwrap(), "Cube.002");

        // Different datablock kinds have separate namespaces
        let mesh = scene.create_mesh("Cube", MeshGeometry::default());
        assert_eq!(scene.mesh_name(mesh).unwrap(), "Cube");
    }

    #[test]
    fn test_hierarchy_queries() {
        let mut scene = MemoryScene::new();
        let root = scene.create_object("Root", ObjectData::Empty);
        let child = scene.create_object("Child", ObjectData::Empty);
        let other = scene.create_object("Other", ObjectData::Empty);
        scene.set_parent(child, Some(root)).unwrap();

        assert_eq!(scene.root_objects(), vec![root, other]);
        assert_eq!(scene.children(root).unwrap(), vec![child]);
        assert_eq!(scene.parent(child).unwrap(), Some(root));
        assert!(scene.set_parent(child, Some(ObjectId(99))).is_err());
    }

    #[test]
    fn test_parent_cycles_are_rejected() {
        let mut scene = MemoryScene::new();
        let root = scene.create_object("Root", ObjectData::Empty);
        let child = scene.create_object("Child", ObjectData::Empty);
        let grandchild = scene.create_object("Grandchild", ObjectData::Empty);
        scene.set_parent(child, Some(root)).unwrap();
        scene.set_parent(grandchild, Some(child)).unwrap();

        let err = scene.set_parent(root, Some(grandchild)).unwrap_err();
        assert_eq!(
            err,
            HostError::ParentCycle {
                child: "Root".to_string(),
                parent: "Grandchild".to_string(),
            }
        );
        assert!(matches!(
            scene.set_parent(child, Some(child)),
            Err(HostError::ParentCycle { .. })
        ));

        // The hierarchy is unchanged and still evaluates
        assert_eq!(scene.parent(root).unwrap(), None);
        assert_eq!(scene.root_objects(), vec![root]);
        assert!(scene.world_matrix(grandchild).is_ok());

        // Moving a node under a sibling branch is fine
        scene.set_parent(grandchild, Some(root)).unwrap();
        assert_eq!(scene.children(root).unwrap(), vec![child, grandchild]);
    }

    #[test]
    fn test_world_matrix_includes_parent_inverse() {
        let mut scene = MemoryScene::new();
        let parent = scene.create_object("Parent", ObjectData::Empty);
        let child = scene.create_object("Child", ObjectData::Empty);
        scene.set_parent(child, Some(parent)).unwrap();
        scene
            .set_local_transform(parent, Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO, Vec3::ONE)
            .unwrap();
        scene
            .set_local_transform(child, Vec3::new(0.0, 1.0, 0.0), Vec3::ZERO, Vec3::ONE)
            .unwrap();
        scene
            .set_parent_inverse(child, Mat4::from_translation(Vec3::new(-5.0, 0.0, 0.0)))
            .unwrap();

        let origin = scene.world_matrix(child).unwrap().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_properties_are_type_checked() {
        let mut scene = MemoryScene::new();
        let light = scene.create_light("Lamp", LightData::new(LightKind::Point));
        let target = Target::Light(light);

        scene
            .set_property(target, PropertyPath::Energy, PropertyValue::Float(3.0))
            .unwrap();
        assert_eq!(
            scene.property(target, PropertyPath::Energy).unwrap(),
            PropertyValue::Float(3.0)
        );

        let err = scene
            .set_property(target, PropertyPath::UseNegative, PropertyValue::Float(1.0))
            .unwrap_err();
        assert!(matches!(err, HostError::TypeMismatch { .. }));

        let err = scene.property(target, PropertyPath::Location).unwrap_err();
        assert!(matches!(err, HostError::NoSuchProperty { .. }));
    }

    #[test]
    fn test_add_curve_replaces_same_channel() {
        let mut scene = MemoryScene::new();
        let object = scene.create_object("Empty", ObjectData::Empty);
        let target = Target::Object(object);

        let first = AnimationCurve::new(PropertyPath::Location, 1).with_point(0.0, 1.0, Interpolation::Linear);
        let second = AnimationCurve::new(PropertyPath::Location, 1).with_point(0.0, 2.0, Interpolation::Linear);
        scene.add_curve(target, first).unwrap();
        scene.add_curve(target, second.clone()).unwrap();

        assert_eq!(scene.curves(target).unwrap().len(), 1);
        assert_eq!(scene.curve(target, PropertyPath::Location, 1).unwrap(), Some(&second));
        assert_eq!(scene.curve(target, PropertyPath::Location, 0).unwrap(), None);
    }
}
