use glam::{Mat3, Quat, Vec2, Vec3};

use super::{ImageSize, SolveCategory, direction, remap01, to_space, validate};
use crate::errors::{RetargetError, Result};
use crate::landmarks::{Landmark, face as idx};
use crate::pose::{EyeOpenness, FacePose, MouthShape};
use crate::settings::SolverSettings;

const CATEGORY: SolveCategory = SolveCategory::Face;

// Lid gap / eye width at which the eye reads fully closed and fully open.
const EYE_RATIO_CLOSED: f32 = 0.12;
const EYE_RATIO_OPEN: f32 = 0.28;

// Mouth measurements are relative to the inner eye-corner distance.
const MOUTH_OPEN_MIN: f32 = 0.05;
const MOUTH_OPEN_MAX: f32 = 0.85;
const MOUTH_NEUTRAL_WIDTH: f32 = 1.35;
const MOUTH_WIDE_RANGE: f32 = 0.55;
const MOUTH_PURSE_RANGE: f32 = 0.4;

pub(super) fn solve(
    landmarks: &[Landmark],
    image: ImageSize,
    settings: &SolverSettings,
) -> Result<FacePose> {
    validate(CATEGORY, landmarks, idx::POINT_COUNT)?;

    let aspect = image.aspect();
    let p = |i: usize| to_space(&landmarks[i], aspect);

    Ok(FacePose {
        head: head_rotation(p(idx::CHEEK_RIGHT), p(idx::CHEEK_LEFT), p(idx::CHIN), p(idx::FOREHEAD))?,
        eyes: eye_openness(&p, settings)?,
        mouth: mouth_shape(&p)?,
        pupil: if landmarks.len() >= idx::POINT_COUNT_WITH_IRIS {
            Some(pupil_offset(&p)?)
        } else {
            None
        },
    })
}

/// Euler rotation of the face plane relative to a camera-facing head.
fn head_rotation(cheek_right: Vec3, cheek_left: Vec3, chin: Vec3, forehead: Vec3) -> Result<Vec3> {
    let x = direction(CATEGORY, cheek_right, cheek_left, "cheek span")?;
    let up = direction(CATEGORY, chin, forehead, "face height")?;
    let z = x.cross(up);
    if z.length_squared() < 1e-8 {
        return Err(RetargetError::DegenerateGeometry {
            category: CATEGORY,
            detail: "face plane",
        });
    }
    let z = z.normalize();
    let y = z.cross(x);

    let rotation = Quat::from_mat3(&Mat3::from_cols(x, y, z));
    let (rx, ry, rz) = rotation.to_euler(glam::EulerRot::XYZ);
    Ok(Vec3::new(rx, ry, rz))
}

fn eye_openness(p: &impl Fn(usize) -> Vec3, settings: &SolverSettings) -> Result<EyeOpenness> {
    let eye = |outer: usize, inner: usize, upper: usize, lower: usize| -> Result<f32> {
        let width = p(outer).distance(p(inner));
        if width < super::MIN_SEGMENT {
            return Err(RetargetError::DegenerateGeometry {
                category: CATEGORY,
                detail: "eye width",
            });
        }
        let ratio = p(upper).distance(p(lower)) / width;
        let raw = remap01(ratio, EYE_RATIO_CLOSED, EYE_RATIO_OPEN);
        let (low, high) = settings.blink_thresholds;
        Ok(remap01(raw, low, high))
    };

    let mut left = eye(idx::LEFT_EYE_OUTER, idx::LEFT_EYE_INNER, idx::LEFT_EYE_UPPER, idx::LEFT_EYE_LOWER)?;
    let mut right = eye(idx::RIGHT_EYE_OUTER, idx::RIGHT_EYE_INNER, idx::RIGHT_EYE_UPPER, idx::RIGHT_EYE_LOWER)?;

    // Landmark noise makes the eyes flicker independently; link them unless
    // one is clearly winking.
    if (left - right).abs() < settings.blink_sync {
        let avg = (left + right) * 0.5;
        left = avg;
        right = avg;
    }

    Ok(EyeOpenness { left, right })
}

fn mouth_shape(p: &impl Fn(usize) -> Vec3) -> Result<MouthShape> {
    let eye_span = p(idx::RIGHT_EYE_INNER).distance(p(idx::LEFT_EYE_INNER));
    if eye_span < super::MIN_SEGMENT {
        return Err(RetargetError::DegenerateGeometry {
            category: CATEGORY,
            detail: "inner eye distance",
        });
    }

    let open = p(idx::UPPER_LIP).distance(p(idx::LOWER_LIP)) / eye_span;
    let width = p(idx::MOUTH_CORNER_RIGHT).distance(p(idx::MOUTH_CORNER_LEFT)) / eye_span;

    let y = remap01(open, MOUTH_OPEN_MIN, MOUTH_OPEN_MAX);
    let wide = ((width - MOUTH_NEUTRAL_WIDTH) / MOUTH_WIDE_RANGE).clamp(0.0, 1.0);
    let pursed = ((MOUTH_NEUTRAL_WIDTH - width) / MOUTH_PURSE_RANGE).clamp(0.0, 1.0);

    Ok(MouthShape {
        a: y * (1.0 - wide) * (1.0 - pursed),
        i: wide * (1.0 - y),
        e: wide * y,
        o: pursed * y,
        u: pursed * (1.0 - y),
    })
}

/// Mean iris displacement from the eye centres, in half eye-widths.
fn pupil_offset(p: &impl Fn(usize) -> Vec3) -> Result<Vec2> {
    let offset = |outer: usize, inner: usize, iris: usize| -> Result<Vec2> {
        let a = p(outer).truncate();
        let b = p(inner).truncate();
        let half = a.distance(b) * 0.5;
        if half < super::MIN_SEGMENT {
            return Err(RetargetError::DegenerateGeometry {
                category: CATEGORY,
                detail: "eye width",
            });
        }
        let center = (a + b) * 0.5;
        Ok((p(iris).truncate() - center) / half)
    };

    let left = offset(idx::LEFT_EYE_OUTER, idx::LEFT_EYE_INNER, idx::LEFT_IRIS)?;
    let right = offset(idx::RIGHT_EYE_OUTER, idx::RIGHT_EYE_INNER, idx::RIGHT_IRIS)?;
    Ok(((left + right) * 0.5).clamp(Vec2::NEG_ONE, Vec2::ONE))
}
