//! Codec error types.

use thiserror::Error;

use crate::document::{DataKind, MaterialRole};
use crate::host::{
    Extrapolation, FalloffType, HostError, Interpolation, LightKind, ObjectKind, ShadowMethod,
    UnitSystem,
};

/// A document that is well-formed JSON but not a loadable scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Invalid frame rate {numerator}/{denominator}")]
    InvalidFrameRate { numerator: u32, denominator: u32 },

    #[error("Node \"{node}\" has only one of \"type\" and \"data\"")]
    HalfReference { node: String },

    #[error("Node \"{node}\" references {kind} \"{name}\", which does not exist")]
    DanglingReference {
        node: String,
        kind: DataKind,
        name: String,
    },

    #[error("\"{owner}\" property \"{property}\" has {found} channel(s), expected {expected}")]
    AxisCount {
        owner: String,
        property: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("\"{owner}\" property \"{property}\" axis {axis} has no keyframes")]
    EmptyChannel {
        owner: String,
        property: &'static str,
        axis: usize,
    },

    #[error("\"{owner}\" property \"{property}\" axis {axis} has keyframes out of order at frame {frame}")]
    FrameOrder {
        owner: String,
        property: &'static str,
        axis: usize,
        frame: f32,
    },

    #[error("Mesh \"{mesh}\" references location {index}, but only {count} exist")]
    IndexOutOfBounds {
        mesh: String,
        index: u32,
        count: usize,
    },

    #[error("Mesh \"{mesh}\" has a \"{material}\" polygon with {count} vertices, at least 3 are required")]
    DegeneratePolygon {
        mesh: String,
        material: MaterialRole,
        count: usize,
    },
}

/// A host feature outside what the file format can carry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnsupportedFeature {
    #[error("Object \"{object}\" is a(n) \"{kind}\", which is not a supported type")]
    ObjectKind { object: String, kind: ObjectKind },

    #[error("Object \"{object}\" contains faces without materials, which is not supported")]
    MissingMaterial { object: String },

    #[error("Object \"{object}\" contains a material named \"{material}\", which is not supported")]
    Material { object: String, material: String },

    #[error("Object \"{object}\" is a lamp of type \"{kind}\", which is not supported")]
    LightKind { object: String, kind: LightKind },

    #[error("Object \"{object}\" contains unexpected extrapolation type \"{mode}\"")]
    Extrapolation { object: String, mode: Extrapolation },

    #[error("Object \"{object}\" contains unexpected interpolation type \"{mode}\"")]
    Interpolation { object: String, mode: Interpolation },

    #[error("Object \"{object}\" is non-spherical, which is not supported")]
    NonSpherical { object: String },

    #[error("Object \"{object}\" has a shadow (\"{method}\"), which is not supported")]
    Shadow { object: String, method: ShadowMethod },

    #[error("Object \"{object}\" has a falloff type of \"{falloff}\", which is not supported (use inverse linear)")]
    Falloff { object: String, falloff: FalloffType },

    #[error("Object \"{object}\" is a square spot, which is not supported")]
    SquareSpot { object: String },

    #[error("Object \"{object}\" has a spot blend of {blend}, only 1 is supported")]
    SpotBlend { object: String, blend: f32 },
}

/// Scene-wide settings the exporter requires before it walks anything.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreconditionError {
    #[error("The scene is not in meters (unit system \"{system}\", scale {scale})")]
    Units { system: UnitSystem, scale: f32 },
}

/// Errors that can occur while importing a scene file.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Errors that can occur while exporting a scene file.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("Unsupported: {0}")]
    Unsupported(#[from] UnsupportedFeature),

    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;
