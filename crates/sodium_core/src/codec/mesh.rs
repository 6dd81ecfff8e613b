//! Mesh codec.
//!
//! Files store each mesh as a list of distinct locations plus polygons
//! grouped by material role. Building creates host geometry with one
//! material slot per role in file order; flattening walks host polygons,
//! deduplicates their vertex positions by exact equality and regroups them.

use std::collections::{BTreeMap, HashMap};

use sodium_math::Vec3;

use crate::document::{MaterialGroups, MaterialRole, MeshResource, PolygonIndices};
use crate::host::{HostError, HostResult, HostScene, MaterialId, MaterialPreset, MeshGeometry, MeshId, Polygon};

use super::error::{ExportResult, SchemaError, UnsupportedFeature};

/// Viewport look the importer gives each role's material.
pub fn role_preset(role: MaterialRole) -> MaterialPreset {
    match role {
        MaterialRole::None => MaterialPreset {
            diffuse_color: Vec3::new(0.0, 0.0, 1.0),
            alpha: 0.25,
            use_transparency: true,
            emit: true,
            ..Default::default()
        },
        MaterialRole::Walk => MaterialPreset {
            diffuse_color: Vec3::new(0.0, 1.0, 0.0),
            alpha: 0.25,
            use_transparency: true,
            emit: true,
            ..Default::default()
        },
        MaterialRole::Occluder => MaterialPreset {
            diffuse_intensity: 1.0,
            specular_intensity: 0.0,
            ..Default::default()
        },
    }
}

/// Host materials for the three roles.
#[derive(Clone, Debug)]
pub struct MaterialTable {
    ids: BTreeMap<MaterialRole, MaterialId>,
}

impl MaterialTable {
    /// Find or create the role materials on the host and apply their presets.
    pub fn ensure<H: HostScene + ?Sized>(host: &mut H) -> HostResult<Self> {
        let mut ids = BTreeMap::new();
        for role in MaterialRole::ALL {
            let id = match host.find_material(role.name()) {
                Some(id) => id,
                None => host.create_material(role.name()),
            };
            host.apply_material_preset(id, role_preset(role))?;
            ids.insert(role, id);
        }
        Ok(Self { ids })
    }

    pub fn get(&self, role: MaterialRole) -> Option<MaterialId> {
        self.ids.get(&role).copied()
    }
}

/// Check polygon sizes and location indices.
pub fn validate_mesh(name: &str, mesh: &MeshResource) -> Result<(), SchemaError> {
    let count = mesh.locations.len();
    for (material, polygons) in mesh.materials.iter() {
        for polygon in polygons {
            if polygon.len() < 3 {
                return Err(SchemaError::DegeneratePolygon {
                    mesh: name.to_string(),
                    material,
                    count: polygon.len(),
                });
            }
            if let Some(&index) = polygon.iter().find(|&&index| index as usize >= count) {
                return Err(SchemaError::IndexOutOfBounds {
                    mesh: name.to_string(),
                    index,
                    count,
                });
            }
        }
    }
    Ok(())
}

/// Create the host mesh for a file mesh.
pub fn build_mesh<H: HostScene + ?Sized>(
    host: &mut H,
    name: &str,
    mesh: &MeshResource,
    materials: &MaterialTable,
) -> HostResult<MeshId> {
    let mut geometry = MeshGeometry {
        vertices: mesh.locations.iter().map(|&location| Vec3::from_array(location)).collect(),
        ..Default::default()
    };

    for (role, polygons) in mesh.materials.iter() {
        geometry.material_slots.push(materials.get(role));
        let material_index = geometry.material_slots.len() - 1;
        geometry.polygons.extend(polygons.iter().map(|indices| Polygon {
            vertices: indices.clone(),
            material_index,
        }));
    }

    log::debug!(
        "Built mesh \"{}\": {} vertices, {} polygons",
        name,
        geometry.vertex_count(),
        geometry.polygon_count()
    );
    Ok(host.create_mesh(name, geometry))
}

/// Deduplicating list of vertex positions.
///
/// Positions match only when `==` holds for every coordinate, so `0.0` and
/// `-0.0` match and NaN never does.
#[derive(Debug, Default)]
struct LocationTable {
    locations: Vec<[f32; 3]>,
    index: HashMap<[u32; 3], u32>,
}

impl LocationTable {
    fn index_of(&mut self, position: Vec3) -> u32 {
        let next = self.locations.len() as u32;
        if position.is_nan() {
            self.locations.push(position.to_array());
            return next;
        }

        // Adding 0.0 folds -0.0 onto 0.0
        let key = (position + Vec3::ZERO).to_array().map(f32::to_bits);
        if let Some(&existing) = self.index.get(&key) {
            return existing;
        }
        self.index.insert(key, next);
        self.locations.push(position.to_array());
        next
    }
}

/// Flatten a host mesh into a file mesh.
///
/// `object` names the scene object in error messages.
pub fn flatten_mesh<H: HostScene + ?Sized>(
    host: &H,
    object: &str,
    mesh: MeshId,
) -> ExportResult<MeshResource> {
    let geometry = host.mesh(mesh)?;
    let mut table = LocationTable::default();
    let mut materials = MaterialGroups::new();

    for polygon in &geometry.polygons {
        let material = geometry
            .material_slots
            .get(polygon.material_index)
            .copied()
            .flatten()
            .ok_or_else(|| UnsupportedFeature::MissingMaterial {
                object: object.to_string(),
            })?;
        let material_name = host.material_name(material)?;
        let role = MaterialRole::from_name(material_name).ok_or_else(|| UnsupportedFeature::Material {
            object: object.to_string(),
            material: material_name.to_string(),
        })?;

        let indices = polygon
            .vertices
            .iter()
            .map(|&vertex| {
                let position = geometry.vertices.get(vertex as usize).copied().ok_or_else(|| {
                    HostError::MissingVertex {
                        mesh: host.mesh_name(mesh).unwrap_or("?").to_string(),
                        index: vertex,
                        count: geometry.vertices.len(),
                    }
                })?;
                Ok(table.index_of(position))
            })
            .collect::<HostResult<PolygonIndices>>()?;

        materials.push_polygon(role, indices);
    }

    Ok(MeshResource {
        locations: table.locations,
        materials,
    })
}
