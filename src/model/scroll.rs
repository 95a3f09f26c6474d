use egui::Vec2;

/// The three scrollable regions of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    /// Fixed label column; scrolls vertically.
    Labels,
    /// Time header; scrolls horizontally.
    Header,
    /// Bar canvas; scrolls both ways.
    Canvas,
}

impl Pane {
    /// (horizontal, vertical) axes the pane owns.
    fn axes(self) -> (bool, bool) {
        match self {
            Pane::Labels => (false, true),
            Pane::Header => (true, false),
            Pane::Canvas => (true, true),
        }
    }
}

/// Shared scroll offset mirrored across the panes.
///
/// At the start of a frame [`ScrollSync::begin_frame`] fixes the offset every
/// pane is shown at. Each pane then reports where it actually ended up; a
/// report that moved away from that baseline on an axis the pane owns means
/// the user scrolled it, and becomes the shared value for the next frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollSync {
    offset: Vec2,
    baseline: Vec2,
}

impl ScrollSync {
    pub fn begin_frame(&mut self) -> Vec2 {
        self.baseline = self.offset;
        self.baseline
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn report(&mut self, pane: Pane, actual: Vec2) {
        let (horizontal, vertical) = pane.axes();
        if horizontal && (actual.x - self.baseline.x).abs() > 0.5 {
            self.offset.x = actual.x.max(0.0);
        }
        if vertical && (actual.y - self.baseline.y).abs() > 0.5 {
            self.offset.y = actual.y.max(0.0);
        }
    }

    /// Scroll horizontally so `x` sits near the left edge.
    pub fn reveal_x(&mut self, x: f32) {
        self.offset.x = (x - 40.0).max(0.0);
    }

    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.baseline = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_column_drives_vertical_only() {
        let mut sync = ScrollSync::default();
        sync.begin_frame();
        sync.report(Pane::Labels, Vec2::new(300.0, 120.0));
        assert_eq!(sync.offset(), Vec2::new(0.0, 120.0));
    }

    #[test]
    fn header_drives_horizontal_only() {
        let mut sync = ScrollSync::default();
        sync.begin_frame();
        sync.report(Pane::Header, Vec2::new(250.0, 80.0));
        assert_eq!(sync.offset(), Vec2::new(250.0, 0.0));
    }

    #[test]
    fn panes_still_at_baseline_do_not_undo_a_scroll() {
        let mut sync = ScrollSync::default();
        sync.begin_frame();
        sync.report(Pane::Labels, Vec2::ZERO);
        sync.report(Pane::Canvas, Vec2::new(40.0, 90.0));
        sync.report(Pane::Header, Vec2::ZERO);
        assert_eq!(sync.offset(), Vec2::new(40.0, 90.0));

        assert_eq!(sync.begin_frame(), Vec2::new(40.0, 90.0));
        sync.report(Pane::Labels, Vec2::new(0.0, 90.0));
        sync.report(Pane::Header, Vec2::new(40.0, 0.0));
        assert_eq!(sync.offset(), Vec2::new(40.0, 90.0));
    }
}
