//! Seek track geometry and the scrub drag flag

/// Fraction of the track under the pointer, clamped into `[0, 1]`.
///
/// Returns `None` when the track has no usable width or the offset is not a
/// number, so callers never divide by zero.
pub fn pointer_fraction(offset_x: f64, track_width: f64) -> Option<f64> {
    if !(track_width.is_finite() && track_width > 0.0) || !offset_x.is_finite() {
        return None;
    }
    Some((offset_x / track_width).clamp(0.0, 1.0))
}

/// Local "button held over the seek track" bookkeeping.
///
/// Level triggered: moves are honored only between a press and the next
/// release. Nothing outside the controller reads this.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrubState {
    dragging: bool,
}

impl ScrubState {
    pub fn press(&mut self) {
        self.dragging = true;
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}
