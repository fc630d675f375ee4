/// An axis-aligned rectangle in frame pixel coordinates.
///
/// Detectors return regions in the coordinate space of the image they were
/// given; `offset` lifts a region found in a crop back into the full frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Region {
        Region {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Intersects the region with a `frame_w` x `frame_h` frame.
    ///
    /// Returns `None` when the intersection is empty.
    pub fn clamp_to(&self, frame_w: u32, frame_h: u32) -> Option<Region> {
        if self.is_empty() {
            return None;
        }
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = (self.x.saturating_add(self.width)).min(frame_w as i32);
        let y2 = (self.y.saturating_add(self.height)).min(frame_h as i32);

        let clamped = Region::new(x1, y1, x2 - x1, y2 - y1);
        if clamped.is_empty() {
            None
        } else {
            Some(clamped)
        }
    }
}
