//! Light codec.
//!
//! `sphere` falloff maps to a host point light and `cone` to a spot light.
//! Both must be spherical, shadowless and use inverse-linear falloff; spots
//! must also be round with a blend of exactly 1.

use crate::document::{AnimatedProperty, Falloff, LightResource};
use crate::host::{
    FalloffType, HostResult, HostScene, LightData, LightId, LightKind, PropertyPath, ShadowMethod,
    Target,
};

use super::animation::{read_animation, validate_property, write_animation};
use super::error::{ExportResult, SchemaError, UnsupportedFeature};

/// Check every animated property of a file light.
pub fn validate_light(name: &str, light: &LightResource) -> Result<(), SchemaError> {
    validate_property(name, "color", &light.color, 3)?;
    for (property, value) in falloff_properties(&light.falloff) {
        validate_property(name, property.0, value, 1)?;
    }
    Ok(())
}

/// File key and host path of each falloff property present.
fn falloff_properties(falloff: &Falloff) -> Vec<((&'static str, PropertyPath), &AnimatedProperty)> {
    match falloff {
        Falloff::Sphere {
            multiplier,
            negative,
            radius,
        } => vec![
            (("multiplier", PropertyPath::Energy), multiplier),
            (("negative", PropertyPath::UseNegative), negative),
            (("radius", PropertyPath::Distance), radius),
        ],
        Falloff::Cone {
            multiplier,
            negative,
            radius,
            spot_size,
        } => vec![
            (("multiplier", PropertyPath::Energy), multiplier),
            (("negative", PropertyPath::UseNegative), negative),
            (("radius", PropertyPath::Distance), radius),
            (("spotSize", PropertyPath::SpotSize), spot_size),
        ],
    }
}

/// Create the host light for a file light.
pub fn build_light<H: HostScene + ?Sized>(
    host: &mut H,
    name: &str,
    light: &LightResource,
) -> HostResult<LightId> {
    let mut data = match light.falloff {
        Falloff::Sphere { .. } => LightData::new(LightKind::Point),
        Falloff::Cone { .. } => {
            let mut spot = LightData::new(LightKind::Spot);
            spot.spot_blend = 1.0;
            spot.use_halo = true;
            spot
        }
    };
    data.use_sphere = true;
    data.shadow_method = ShadowMethod::NoShadow;
    data.falloff_type = FalloffType::InverseLinear;

    let id = host.create_light(name, data);
    let target = Target::Light(id);

    read_animation(host, target, PropertyPath::Color, &light.color)?;
    for ((_, path), value) in falloff_properties(&light.falloff) {
        read_animation(host, target, path, value)?;
    }

    log::debug!("Built {} light \"{}\"", light.falloff.type_name(), name);
    Ok(id)
}

/// Check a host light against the supported subset and describe it.
///
/// `object` names the scene object in error messages.
pub fn describe_light<H: HostScene + ?Sized>(
    host: &H,
    object: &str,
    light: LightId,
) -> ExportResult<LightResource> {
    let data = host.light(light)?;
    let unsupported =
        |feature: UnsupportedFeature| -> ExportResult<LightResource> { Err(feature.into()) };

    if !matches!(data.kind, LightKind::Point | LightKind::Spot) {
        return unsupported(UnsupportedFeature::LightKind {
            object: object.to_string(),
            kind: data.kind,
        });
    }
    if !data.use_sphere {
        return unsupported(UnsupportedFeature::NonSpherical {
            object: object.to_string(),
        });
    }
    if data.kind == LightKind::Spot && data.use_square {
        return unsupported(UnsupportedFeature::SquareSpot {
            object: object.to_string(),
        });
    }
    if data.shadow_method != ShadowMethod::NoShadow {
        return unsupported(UnsupportedFeature::Shadow {
            object: object.to_string(),
            method: data.shadow_method,
        });
    }
    if data.falloff_type != FalloffType::InverseLinear {
        return unsupported(UnsupportedFeature::Falloff {
            object: object.to_string(),
            falloff: data.falloff_type,
        });
    }
    if data.kind == LightKind::Spot && data.spot_blend != 1.0 {
        return unsupported(UnsupportedFeature::SpotBlend {
            object: object.to_string(),
            blend: data.spot_blend,
        });
    }

    let target = Target::Light(light);
    let color = write_animation(host, object, target, PropertyPath::Color)?;
    let multiplier = write_animation(host, object, target, PropertyPath::Energy)?;
    let negative = write_animation(host, object, target, PropertyPath::UseNegative)?;
    let radius = write_animation(host, object, target, PropertyPath::Distance)?;

    let falloff = if data.kind == LightKind::Spot {
        Falloff::Cone {
            multiplier,
            negative,
            radius,
            spot_size: write_animation(host, object, target, PropertyPath::SpotSize)?,
        }
    } else {
        Falloff::Sphere {
            multiplier,
            negative,
            radius,
        }
    };

    Ok(LightResource { color, falloff })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::error::ExportError;
    use crate::document::Keyframe;
    use crate::host::{AnimationCurve, Interpolation, PropertyValue};
    use crate::memory::MemoryScene;

    fn sphere() -> LightResource {
        LightResource {
            color: AnimatedProperty::fixed(&[1.0, 0.5, 0.25]),
            falloff: Falloff::Sphere {
                multiplier: AnimatedProperty::fixed(&[2.0]),
                negative: AnimatedProperty::Scalar(vec![Keyframe::constant(0.0, false)]),
                radius: AnimatedProperty::Scalar(vec![
                    Keyframe::linear(0.0, 10.0),
                    Keyframe::linear(48.0, 30.0),
                ]),
            },
        }
    }

    fn cone() -> LightResource {
        LightResource {
            color: AnimatedProperty::fixed(&[1.0, 1.0, 1.0]),
            falloff: Falloff::Cone {
                multiplier: AnimatedProperty::fixed(&[1.0]),
                negative: AnimatedProperty::Scalar(vec![Keyframe::constant(0.0, true)]),
                radius: AnimatedProperty::fixed(&[15.0]),
                spot_size: AnimatedProperty::fixed(&[0.75]),
            },
        }
    }

    #[test]
    fn test_build_point_light() {
        let mut scene = MemoryScene::new();
        let id = build_light(&mut scene, "Bulb", &sphere()).unwrap();
        let data = scene.light(id).unwrap();

        assert_eq!(data.kind, LightKind::Point);
        assert!(data.use_sphere);
        assert_eq!(data.shadow_method, ShadowMethod::NoShadow);
        assert_eq!(data.falloff_type, FalloffType::InverseLinear);
        assert_eq!(data.energy, 2.0);
        assert_eq!(data.distance, 10.0);

        let target = Target::Light(id);
        assert_eq!(scene.curves(target).unwrap().len(), 1);
        assert!(scene.curve(target, PropertyPath::Distance, 0).unwrap().is_some());
    }

    #[test]
    fn test_build_spot_light() {
        let mut scene = MemoryScene::new();
        let id = build_light(&mut scene, "Spot", &cone()).unwrap();
        let data = scene.light(id).unwrap();

        assert_eq!(data.kind, LightKind::Spot);
        assert_eq!(data.spot_blend, 1.0);
        assert!(data.use_halo);
        assert!(data.use_negative);
        assert_eq!(data.spot_size, 0.75);
    }

    #[test]
    fn test_lights_roundtrip() {
        for resource in [sphere(), cone()] {
            let mut scene = MemoryScene::new();
            let id = build_light(&mut scene, "Light", &resource).unwrap();
            assert_eq!(describe_light(&scene, "Light", id).unwrap(), resource);
        }
    }

    #[test]
    fn test_point_falloff_must_be_inverse_linear() {
        let mut scene = MemoryScene::new();
        let id = build_light(&mut scene, "Bulb", &sphere()).unwrap();
        scene.light_mut(id).unwrap().falloff_type = FalloffType::InverseSquare;

        let err = describe_light(&scene, "Lamp", id).unwrap_err();
        match err {
            ExportError::Unsupported(UnsupportedFeature::Falloff { object, falloff }) => {
                assert_eq!(object, "Lamp");
                assert_eq!(falloff, FalloffType::InverseSquare);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err_message(&scene, id).contains("INVERSE_SQUARE"));
    }

    fn err_message(scene: &MemoryScene, id: LightId) -> String {
        describe_light(scene, "Lamp", id).unwrap_err().to_string()
    }

    #[test]
    fn test_spot_preconditions() {
        let mut scene = MemoryScene::new();
        let id = build_light(&mut scene, "Spot", &cone()).unwrap();

        scene.light_mut(id).unwrap().use_square = true;
        assert!(err_message(&scene, id).contains("square"));
        scene.light_mut(id).unwrap().use_square = false;

        scene.light_mut(id).unwrap().spot_blend = 0.5;
        assert!(err_message(&scene, id).contains("spot blend"));
        scene.light_mut(id).unwrap().spot_blend = 1.0;

        scene.light_mut(id).unwrap().shadow_method = ShadowMethod::RayShadow;
        assert!(err_message(&scene, id).contains("shadow"));
        scene.light_mut(id).unwrap().shadow_method = ShadowMethod::NoShadow;

        scene.light_mut(id).unwrap().use_sphere = false;
        assert!(err_message(&scene, id).contains("non-spherical"));
    }

    #[test]
    fn test_other_light_kinds_are_rejected() {
        let mut scene = MemoryScene::new();
        let id = scene.create_light("Sun", LightData::new(LightKind::Sun));

        let err = describe_light(&scene, "Sun", id).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Unsupported(UnsupportedFeature::LightKind { kind: LightKind::Sun, .. })
        ));
    }

    #[test]
    fn test_boolean_curve_exports_as_bools() {
        let mut scene = MemoryScene::new();
        let id = build_light(&mut scene, "Bulb", &sphere()).unwrap();
        let target = Target::Light(id);
        scene
            .add_curve(
                target,
                AnimationCurve::new(PropertyPath::UseNegative, 0)
                    .with_point(0.0, 0.0, Interpolation::Constant)
                    .with_point(12.0, 1.0, Interpolation::Constant),
            )
            .unwrap();
        scene
            .set_property(target, PropertyPath::UseNegative, PropertyValue::Bool(false))
            .unwrap();

        let resource = describe_light(&scene, "Bulb", id).unwrap();
        let Falloff::Sphere { negative, .. } = resource.falloff else {
            panic!("expected a sphere falloff");
        };
        assert_eq!(
            negative,
            AnimatedProperty::Scalar(vec![
                Keyframe::constant(0.0, false),
                Keyframe::constant(12.0, true),
            ])
        );
    }

    #[test]
    fn test_validate_light() {
        let mut resource = sphere();
        assert!(validate_light("Bulb", &resource).is_ok());

        resource.color = AnimatedProperty::fixed(&[1.0]);
        assert!(matches!(
            validate_light("Bulb", &resource),
            Err(SchemaError::AxisCount { property: "color", .. })
        ));
    }
}
