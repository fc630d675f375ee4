/// Properties of an opened frame source.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    /// Nominal frame rate; 0 when the source does not report one.
    pub fps: f64,
    pub description: String,
}

impl SourceInfo {
    pub fn resolution(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_string() {
        let info = SourceInfo {
            width: 640,
            height: 480,
            fps: 30.0,
            description: "camera 0".to_string(),
        };
        assert_eq!(info.resolution(), "640x480");
    }

    #[test]
    fn test_clone_is_equal() {
        let info = SourceInfo {
            width: 320,
            height: 240,
            fps: 0.0,
            description: "frames/".to_string(),
        };
        assert_eq!(info.clone(), info);
    }
}
