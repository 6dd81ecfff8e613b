//! Sodium Core - Scene file codec for level layouts.
//!
//! This crate provides:
//!
//! - **Document model**: serde types for the Sodium Scene File JSON format
//! - **Host abstraction**: the `HostScene` trait and an in-memory `MemoryScene`
//! - **Codec**: import and export between documents and host scenes
//!
//! # Example
//!
//! ```ignore
//! use sodium_core::{export_scene_file, import_scene_file, CodecConfig, MemoryScene};
//!
//! let mut scene = MemoryScene::new();
//! let report = import_scene_file("level.json", &mut scene)?;
//! println!("Loaded {} meshes, {} objects", report.meshes, report.objects);
//!
//! export_scene_file("level.out.json", &mut scene, &CodecConfig::default())?;
//! ```

pub mod codec;
pub mod document;
pub mod file;
pub mod host;
pub mod memory;

// Re-export commonly used types
pub use codec::{CodecConfig, ExportError, ImportError, ImportReport};
pub use document::{Document, FrameRate};
pub use file::{export_scene_file, export_scene_to_string, import_scene_file, import_scene_from_str};
pub use host::HostScene;
pub use memory::MemoryScene;
