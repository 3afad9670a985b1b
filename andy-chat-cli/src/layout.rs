//! Responsive layout state for the TUI

/// Whether the sidebar fits next to the transcript.
///
/// Seeded once from the terminal size and afterwards changed only by resize
/// events, so rendering never queries the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsiveLayout {
    min_width: u16,
    width: u16,
    sidebar_visible: bool,
}

impl ResponsiveLayout {
    pub fn new(min_width: u16, initial_width: u16) -> Self {
        Self {
            min_width,
            width: initial_width,
            sidebar_visible: initial_width >= min_width,
        }
    }

    /// Apply a resize event. Returns true when sidebar visibility flipped.
    pub fn on_resize(&mut self, width: u16) -> bool {
        self.width = width;
        let visible = width >= self.min_width;
        let changed = visible != self.sidebar_visible;
        self.sidebar_visible = visible;
        changed
    }

    pub fn sidebar_visible(&self) -> bool {
        self.sidebar_visible
    }

    pub fn width(&self) -> u16 {
        self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_visibility_follows_width() {
        assert!(ResponsiveLayout::new(100, 120).sidebar_visible());
        assert!(ResponsiveLayout::new(100, 100).sidebar_visible());
        assert!(!ResponsiveLayout::new(100, 99).sidebar_visible());
    }

    #[test]
    fn test_resize_toggles_sidebar() {
        let mut layout = ResponsiveLayout::new(100, 120);

        assert!(layout.on_resize(80));
        assert!(!layout.sidebar_visible());
        assert_eq!(layout.width(), 80);

        assert!(!layout.on_resize(90));
        assert!(layout.on_resize(140));
        assert!(layout.sidebar_visible());
    }
}
