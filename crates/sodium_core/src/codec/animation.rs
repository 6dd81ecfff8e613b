//! Animation curve codec.
//!
//! A file channel is a list of keyframes; a host channel is an
//! [`AnimationCurve`]. A channel holding a single `constant` keyframe on
//! frame 0 carries no motion, so the importer stores only its value and the
//! exporter writes that shape back for any property axis without a curve.

use crate::document::{AnimatedProperty, Channel, Keyframe, KeyframeKind, KeyValue};
use crate::host::{
    AnimationCurve, CurvePoint, Extrapolation, HostError, HostResult, HostScene, Interpolation,
    PropertyPath, PropertyValue, Target, ValueKind,
};

use super::error::{ExportError, ExportResult, SchemaError, UnsupportedFeature};

impl From<KeyframeKind> for Interpolation {
    fn from(kind: KeyframeKind) -> Self {
        match kind {
            KeyframeKind::Constant => Interpolation::Constant,
            KeyframeKind::Linear => Interpolation::Linear,
        }
    }
}

/// True for a channel that is a plain value with no motion.
pub fn is_static(channel: &Channel) -> bool {
    matches!(
        channel.as_slice(),
        [only] if only.kind == KeyframeKind::Constant && only.starts_on_frame == 0.0
    )
}

/// Check channel count, non-empty channels and strictly increasing frames.
pub fn validate_property(
    owner: &str,
    property: &'static str,
    value: &AnimatedProperty,
    expected_axes: usize,
) -> Result<(), SchemaError> {
    if value.axis_count() != expected_axes {
        return Err(SchemaError::AxisCount {
            owner: owner.to_string(),
            property,
            expected: expected_axes,
            found: value.axis_count(),
        });
    }

    for (axis, channel) in value.axes().iter().enumerate() {
        if channel.is_empty() {
            return Err(SchemaError::EmptyChannel {
                owner: owner.to_string(),
                property,
                axis,
            });
        }
        if let Some(pair) = channel
            .windows(2)
            .find(|pair| pair[1].starts_on_frame <= pair[0].starts_on_frame)
        {
            return Err(SchemaError::FrameOrder {
                owner: owner.to_string(),
                property,
                axis,
                frame: pair[1].starts_on_frame,
            });
        }
    }

    Ok(())
}

/// Install `value` on a host property.
///
/// Every non-static axis gets a curve holding its keyframes verbatim. The
/// property itself is then set to the first keyframe value of each axis, so
/// static axes still end up with their value.
pub fn read_animation<H: HostScene + ?Sized>(
    host: &mut H,
    target: Target,
    path: PropertyPath,
    value: &AnimatedProperty,
) -> HostResult<()> {
    let mut rest = Vec::with_capacity(value.axis_count());

    for (axis, channel) in value.axes().iter().enumerate() {
        let Some(first) = channel.first() else {
            continue;
        };
        rest.push(first.with_value.as_f32());

        if is_static(channel) {
            continue;
        }

        let mut curve = AnimationCurve::new(path, axis);
        for keyframe in channel {
            curve.insert(CurvePoint {
                frame: keyframe.starts_on_frame,
                value: keyframe.with_value.as_f32(),
                interpolation: keyframe.kind.into(),
            });
        }
        host.add_curve(target, curve)?;
    }

    let rest = PropertyValue::from_components(path.value_kind(), &rest).ok_or(
        HostError::TypeMismatch {
            path,
            expected: path.value_kind(),
        },
    )?;
    host.set_property(target, path, rest)
}

/// Read a host property, curves included, as a file property.
///
/// `object` names the scene object in error messages. Axes without a curve
/// become a single constant keyframe on frame 0 holding the current value.
pub fn write_animation<H: HostScene + ?Sized>(
    host: &H,
    object: &str,
    target: Target,
    path: PropertyPath,
) -> ExportResult<AnimatedProperty> {
    let is_boolean = path.value_kind() == ValueKind::Bool;
    let current = host.property(target, path)?;

    let mut axes = Vec::with_capacity(path.axis_count());
    for axis in 0..path.axis_count() {
        let channel = match host.curve(target, path, axis)? {
            Some(curve) if !curve.points.is_empty() => encode_curve(object, curve, is_boolean)?,
            _ => {
                let value = current.component(axis).ok_or(HostError::TypeMismatch {
                    path,
                    expected: path.value_kind(),
                })?;
                vec![Keyframe::constant(0.0, key_value(value, is_boolean))]
            }
        };
        axes.push(channel);
    }

    Ok(AnimatedProperty::from_axes(axes))
}

fn encode_curve(object: &str, curve: &AnimationCurve, is_boolean: bool) -> ExportResult<Channel> {
    if curve.extrapolation != Extrapolation::Constant {
        return Err(UnsupportedFeature::Extrapolation {
            object: object.to_string(),
            mode: curve.extrapolation,
        }
        .into());
    }

    curve
        .points
        .iter()
        .map(|point| {
            let kind = match point.interpolation {
                Interpolation::Constant => KeyframeKind::Constant,
                Interpolation::Linear => KeyframeKind::Linear,
                mode => {
                    return Err(ExportError::Unsupported(UnsupportedFeature::Interpolation {
                        object: object.to_string(),
                        mode,
                    }))
                }
            };
            Ok(Keyframe::new(point.frame, kind, key_value(point.value, is_boolean)))
        })
        .collect()
}

fn key_value(value: f32, is_boolean: bool) -> KeyValue {
    if is_boolean {
        KeyValue::Bool(value != 0.0)
    } else {
        KeyValue::Number(value)
    }
}
