//! Shape annotation validation.
//!
//! Pure checks run on every incoming annotation before it is attached
//! to an image record. An image record must never contain an annotation
//! that would fail these checks at the time it was written.
//!
//! Rectangle fields are enforced structurally at decode time by the
//! tagged [`ShapeAnnotation`] type; the checks here cover what the type
//! system cannot: the polygon/segmentation minimum point count and the
//! shape being submitted under the list matching its kind.

use crate::error::{EngineError, EngineResult};
use crate::models::{ShapeAnnotation, ShapeKind};

/// Minimum number of outline points for polygon and segmentation shapes.
pub const MIN_OUTLINE_POINTS: usize = 3;

/// Validate a single shape annotation against the kind of the list it
/// was submitted under.
///
/// Polygon and segmentation shapes must have at least
/// [`MIN_OUTLINE_POINTS`] points. Rectangles carry no geometric
/// invariant beyond their required numeric fields.
pub fn validate(shape: &ShapeAnnotation, expected: ShapeKind) -> EngineResult<()> {
    if shape.kind() != expected {
        return Err(EngineError::InvalidAnnotation(format!(
            "expected a {} annotation, got {}",
            expected,
            shape.kind()
        )));
    }

    match shape {
        ShapeAnnotation::Rectangle { .. } => Ok(()),
        ShapeAnnotation::Polygon { points, .. }
        | ShapeAnnotation::Segmentation { points, .. } => {
            if points.len() < MIN_OUTLINE_POINTS {
                Err(EngineError::InvalidAnnotation(format!(
                    "{} must have at least {} points, got {}",
                    shape.kind(),
                    MIN_OUTLINE_POINTS,
                    points.len()
                )))
            } else {
                Ok(())
            }
        }
    }
}

/// Validate every shape in a list. The first failure aborts the whole
/// list so callers never persist a partially validated upload.
pub fn validate_all(shapes: &[ShapeAnnotation], expected: ShapeKind) -> EngineResult<()> {
    for shape in shapes {
        validate(shape, expected)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn polygon(points: Vec<Point>) -> ShapeAnnotation {
        ShapeAnnotation::Polygon {
            class_name: "roof".to_string(),
            class_id: 1.0,
            color: "#00ff00".to_string(),
            editable: true,
            points,
        }
    }

    fn rectangle() -> ShapeAnnotation {
        ShapeAnnotation::Rectangle {
            class_name: "cat".to_string(),
            class_id: 2.0,
            color: "#ff0000".to_string(),
            editable: false,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
            rotation: 0.0,
        }
    }

    fn pts(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point {
                x: i as f64,
                y: i as f64,
            })
            .collect()
    }

    #[test]
    fn test_polygon_too_few_points_rejected() {
        for n in 0..3 {
            let err = validate(&polygon(pts(n)), ShapeKind::Polygon).unwrap_err();
            assert!(matches!(err, EngineError::InvalidAnnotation(_)));
        }
    }

    #[test]
    fn test_polygon_three_points_accepted() {
        assert!(validate(&polygon(pts(3)), ShapeKind::Polygon).is_ok());
        assert!(validate(&polygon(pts(12)), ShapeKind::Polygon).is_ok());
    }

    #[test]
    fn test_segmentation_minimum_points() {
        let seg = ShapeAnnotation::Segmentation {
            class_name: "mask".to_string(),
            class_id: 3.0,
            color: "#0000ff".to_string(),
            editable: true,
            points: pts(2),
        };
        assert!(validate(&seg, ShapeKind::Segmentation).is_err());
    }

    #[test]
    fn test_rectangle_has_no_point_invariant() {
        assert!(validate(&rectangle(), ShapeKind::Rectangle).is_ok());
    }

    #[test]
    fn test_kind_mismatch_rejected() {
        let err = validate(&polygon(pts(4)), ShapeKind::Rectangle).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAnnotation(_)));
        assert!(validate(&rectangle(), ShapeKind::Polygon).is_err());
    }

    #[test]
    fn test_validate_all_stops_on_first_failure() {
        let shapes = vec![polygon(pts(3)), polygon(pts(2)), polygon(pts(5))];
        assert!(validate_all(&shapes, ShapeKind::Polygon).is_err());
        let good = vec![polygon(pts(3)), polygon(pts(5))];
        assert!(validate_all(&good, ShapeKind::Polygon).is_ok());
    }

    #[test]
    fn test_decode_rejects_missing_fields() {
        // Missing `width` must fail at the boundary, before validation.
        let raw = r##"{"kind":"rectangle","class_name":"cat","class_id":1.0,
                      "color":"#f00","editable":true,"x":0,"y":0,"height":5,"rotation":0}"##;
        assert!(serde_json::from_str::<ShapeAnnotation>(raw).is_err());
    }
}
