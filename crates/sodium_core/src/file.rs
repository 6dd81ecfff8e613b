//! Path and string entry points.

use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::codec::{
    export_document, import_document, CodecConfig, ExportResult, ImportReport, ImportResult,
};
use crate::document::Document;
use crate::host::HostScene;

/// Parse a scene document from JSON text.
pub fn parse_document(content: &str) -> ImportResult<Document> {
    Ok(serde_json::from_str(content)?)
}

/// Write a document as pretty JSON with sorted keys.
pub fn write_document(document: &Document, config: &CodecConfig) -> ExportResult<String> {
    let indent = " ".repeat(config.indent);
    let mut buffer = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent.as_bytes()));
    document.serialize(&mut serializer)?;

    let mut text = String::from_utf8_lossy(&buffer).into_owned();
    text.push('\n');
    Ok(text)
}

/// Import JSON text into `host`.
pub fn import_scene_from_str<H: HostScene + ?Sized>(content: &str, host: &mut H) -> ImportResult<ImportReport> {
    let document = parse_document(content)?;
    import_document(host, &document)
}

/// Import a scene file into `host`.
///
/// # Example
///
/// ```ignore
/// use sodium_core::{import_scene_file, MemoryScene};
///
/// let mut scene = MemoryScene::new();
/// let report = import_scene_file("level.json", &mut scene)?;
/// println!("Loaded {} objects", report.objects);
/// ```
pub fn import_scene_file<P: AsRef<Path>, H: HostScene + ?Sized>(
    path: P,
    host: &mut H,
) -> ImportResult<ImportReport> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    log::info!("Importing {}", path.display());
    import_scene_from_str(&content, host)
}

/// Export `host` as JSON text.
pub fn export_scene_to_string<H: HostScene + ?Sized>(host: &mut H, config: &CodecConfig) -> ExportResult<String> {
    let document = export_document(host, config)?;
    write_document(&document, config)
}

/// Export `host` to a scene file.
///
/// Nothing is written unless the whole scene exports.
pub fn export_scene_file<P: AsRef<Path>, H: HostScene + ?Sized>(
    path: P,
    host: &mut H,
    config: &CodecConfig,
) -> ExportResult<()> {
    let path = path.as_ref();
    let text = export_scene_to_string(host, config)?;
    std::fs::write(path, text)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{ExportError, ImportError, SchemaError};
    use crate::document::FrameRate;
    use crate::host::{LightData, LightKind, ObjectData};
    use crate::memory::MemoryScene;

    const CUBE: &str = r#"{
        "framesPerSecond": { "numerator": 30, "denominator": 1 },
        "data": {
            "meshes": {
                "CubeMesh": {
                    "locations": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
                    "materials": { "none": [[0, 1, 2]] }
                }
            },
            "lights": {}
        },
        "sceneNodes": {
            "Cube": {
                "type": "mesh",
                "data": "CubeMesh",
                "transform": {
                    "translation": [
                        [{ "type": "constant", "startsOnFrame": 0, "withValue": 0 }],
                        [{ "type": "constant", "startsOnFrame": 0, "withValue": 0 }],
                        [{ "type": "constant", "startsOnFrame": 0, "withValue": 0 }]
                    ],
                    "rotation": [
                        [{ "type": "constant", "startsOnFrame": 0, "withValue": 0 }],
                        [{ "type": "constant", "startsOnFrame": 0, "withValue": 0 }],
                        [{ "type": "constant", "startsOnFrame": 0, "withValue": 0 }]
                    ],
                    "scale": [
                        [{ "type": "constant", "startsOnFrame": 0, "withValue": 1 }],
                        [{ "type": "constant", "startsOnFrame": 0, "withValue": 1 }],
                        [{ "type": "constant", "startsOnFrame": 0, "withValue": 1 }]
                    ]
                },
                "children": {}
            }
        }
    }"#;

    #[test]
    fn test_import_cube_text() {
        let mut scene = MemoryScene::new();
        let report = import_scene_from_str(CUBE, &mut scene).unwrap();

        assert_eq!(report.meshes, 1);
        assert_eq!(report.objects, 1);
        assert!(scene.find_object("Cube").is_some());
        assert_eq!(scene.frame_rate(), FrameRate::new(30, 1));
    }

    #[test]
    fn test_output_is_sorted_and_indented() {
        let mut scene = MemoryScene::new();
        import_scene_from_str(CUBE, &mut scene).unwrap();
        let text = export_scene_to_string(&mut scene, &CodecConfig::default()).unwrap();

        assert!(text.starts_with("{\n    \"data\": {"), "{text}");
        let data = text.find("\"data\"").unwrap();
        let fps = text.find("\"framesPerSecond\"").unwrap();
        let nodes = text.find("\"sceneNodes\"").unwrap();
        assert!(data < fps && fps < nodes);
        assert!(text.find("\"denominator\"").unwrap() < text.find("\"numerator\"").unwrap());
        assert!(text.find("\"startsOnFrame\"").unwrap() < text.find("\"withValue\"").unwrap());

        let narrow = export_scene_to_string(&mut scene, &CodecConfig::default().with_indent(2)).unwrap();
        assert!(narrow.starts_with("{\n  \"data\": {"), "{narrow}");
    }

    #[test]
    fn test_text_roundtrip_is_stable() {
        let mut first = MemoryScene::new();
        import_scene_from_str(CUBE, &mut first).unwrap();
        let once = export_scene_to_string(&mut first, &CodecConfig::default()).unwrap();

        let mut second = MemoryScene::new();
        import_scene_from_str(&once, &mut second).unwrap();
        let twice = export_scene_to_string(&mut second, &CodecConfig::default()).unwrap();

        assert_eq!(once, twice);
        assert_eq!(parse_document(&once).unwrap(), parse_document(CUBE).unwrap());
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cube.json");
        let output = dir.path().join("out.json");
        std::fs::write(&input, CUBE).unwrap();

        let mut scene = MemoryScene::new();
        import_scene_file(&input, &mut scene).unwrap();
        export_scene_file(&output, &mut scene, &CodecConfig::default()).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert_eq!(parse_document(&written).unwrap(), parse_document(CUBE).unwrap());
    }

    #[test]
    fn test_failed_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.json");

        let mut scene = MemoryScene::new();
        let sun = scene.create_light("Sun", LightData::new(LightKind::Sun));
        scene.create_object("Sun", ObjectData::Light(sun));

        let err = export_scene_file(&output, &mut scene, &CodecConfig::default()).unwrap_err();
        assert!(matches!(err, ExportError::Unsupported(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = MemoryScene::new();
        let err = import_scene_file(dir.path().join("missing.json"), &mut scene).unwrap_err();
        assert!(matches!(err, ImportError::Io(_)));
    }

    #[test]
    fn test_malformed_documents() {
        let mut scene = MemoryScene::new();

        let err = import_scene_from_str("{ not json", &mut scene).unwrap_err();
        assert!(matches!(err, ImportError::Json(_)));

        let bad_index = CUBE.replace("[[0, 1, 2]]", "[[0, 1, 7]]");
        let err = import_scene_from_str(&bad_index, &mut scene).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Schema(SchemaError::IndexOutOfBounds { index: 7, .. })
        ));
        assert_eq!(scene.object_count(), 0);
    }
}
