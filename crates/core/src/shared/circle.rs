/// A circle candidate returned by circle detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub center_x: f32,
    pub center_y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(center_x: f32, center_y: f32, radius: f32) -> Self {
        Self {
            center_x,
            center_y,
            radius,
        }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Circle {
        Circle {
            center_x: self.center_x + dx as f32,
            center_y: self.center_y + dy as f32,
            radius: self.radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_offset_keeps_radius() {
        let c = Circle::new(1.5, 2.5, 4.0).offset(10, 20);
        assert_relative_eq!(c.center_x, 11.5);
        assert_relative_eq!(c.center_y, 22.5);
        assert_relative_eq!(c.radius, 4.0);
    }
}
