/// Whether a pupil circle was seen in the most recent analyzed frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BlinkPhase {
    /// No circle in the previous frame (also the initial phase).
    #[default]
    EyesOpenOrUnknown,
    /// A circle was seen in the previous frame.
    CircleVisible,
}

/// Edge-triggered blink counter.
///
/// Counts rising edges of the per-frame "any circle detected" signal, so a
/// circle that stays visible for many consecutive frames counts once.
///
/// Note the polarity: a count happens when the pupil circle *appears*, not
/// when the eyelid closes. In practice the detector flickers once per blink
/// cycle, which is what gets counted.
#[derive(Clone, Debug, Default)]
pub struct BlinkTracker {
    phase: BlinkPhase,
    blink_count: u64,
}

impl BlinkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one frame's circle signal. Returns `true` if this frame
    /// produced a blink increment.
    pub fn update(&mut self, any_circle_detected: bool) -> bool {
        let rising = any_circle_detected && self.phase == BlinkPhase::EyesOpenOrUnknown;
        if rising {
            self.blink_count += 1;
        }
        self.phase = if any_circle_detected {
            BlinkPhase::CircleVisible
        } else {
            BlinkPhase::EyesOpenOrUnknown
        };
        rising
    }

    pub fn blink_count(&self) -> u64 {
        self.blink_count
    }

    pub fn phase(&self) -> BlinkPhase {
        self.phase
    }

    /// `circle_seen_prev_frame` in the edge-detector sense.
    pub fn circle_seen_prev_frame(&self) -> bool {
        self.phase == BlinkPhase::CircleVisible
    }
}
