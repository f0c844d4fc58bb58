use approx::ulps_eq;

#[derive(Debug, Clone, Copy)]
pub struct Point2d {
    pub x: f64,
    pub y: f64,
}

impl Point2d {
    pub fn as_vector2d(&self) -> Vector2d {
        Vector2d {
            dx: self.x,
            dy: self.y,
        }
    }
    pub fn shift(&self, other: &Vector2d) -> Point2d {
        self.as_vector2d().add(other).as_point2d()
    }
}

impl PartialEq for Point2d {
    fn eq(&self, other: &Self) -> bool {
        ulps_eq!(self.x, other.x) && ulps_eq!(self.y, other.y)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Vector2d {
    pub dx: f64,
    pub dy: f64,
}

impl Vector2d {
    /// unit vector pointing in the direction of the heading angle theta (rad)
    pub fn from_heading(theta: f64) -> Vector2d {
        Vector2d {
            dx: theta.cos(),
            dy: theta.sin(),
        }
    }
    pub fn as_point2d(&self) -> Point2d {
        Point2d {
            x: self.dx,
            y: self.dy,
        }
    }
    pub fn sub(&self, other: &Self) -> Vector2d {
        Vector2d {
            dx: self.dx - other.dx,
            dy: self.dy - other.dy,
        }
    }
    pub fn add(&self, other: &Self) -> Vector2d {
        Vector2d {
            dx: self.dx + other.dx,
            dy: self.dy + other.dy,
        }
    }
    pub fn mult(&self, k: f64) -> Vector2d {
        Vector2d {
            dx: self.dx * k,
            dy: self.dy * k,
        }
    }
    pub fn abs(&self) -> f64 {
        (self.dx.powi(2) + self.dy.powi(2)).sqrt()
    }
    /// left-hand normal vector (rotated by +90deg)
    pub fn normal_vector(&self) -> Vector2d {
        Vector2d {
            dx: -self.dy,
            dy: self.dx,
        }
    }
}

impl PartialEq for Vector2d {
    fn eq(&self, other: &Self) -> bool {
        ulps_eq!(self.dx, other.dx) && ulps_eq!(self.dy, other.dy)
    }
}
