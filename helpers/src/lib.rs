pub mod buffer;
pub mod general;
pub mod geometry;



#[cfg(test)]
mod geometry_tests {
    use crate::geometry::{Point2d, Vector2d};
    use approx::assert_ulps_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_vector2d_from_heading() {
        assert_eq!(
            Vector2d::from_heading(FRAC_PI_2),
            Vector2d {
                dx: FRAC_PI_2.cos(),
                dy: 1.0
            }
        );
    }
    #[test]
    fn test_vector2d_sub_add() {
        let v1 = Vector2d { dx: 5.0, dy: 5.0 };
        let v2 = Vector2d { dx: 2.0, dy: -1.0 };
        assert_eq!(v1.sub(&v2), Vector2d { dx: 3.0, dy: 6.0 });
        assert_eq!(v1.add(&v2), Vector2d { dx: 7.0, dy: 4.0 });
    }
    #[test]
    fn test_vector2d_abs() {
        let v1 = Vector2d { dx: 3.0, dy: 4.0 };
        assert_ulps_eq!(v1.abs(), 5.0);
    }
    #[test]
    fn test_vector2d_normal_vector_points_left() {
        let heading = Vector2d { dx: 1.0, dy: 0.0 };
        assert_eq!(heading.normal_vector(), Vector2d { dx: 0.0, dy: 1.0 });
    }
    #[test]
    fn test_point2d_shift() {
        let p = Point2d { x: 1.0, y: 2.0 };
        assert_eq!(
            p.shift(&Vector2d { dx: -1.0, dy: 0.5 }),
            Point2d { x: 0.0, y: 2.5 }
        );
    }
}
