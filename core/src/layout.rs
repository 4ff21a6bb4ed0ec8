use crate::geometry::Size;
use crate::model::Placement;

/// Viewports narrower than this render the card as a fixed bottom sheet.
pub const MOBILE_BREAKPOINT: f32 = 768.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    Desktop,
    Mobile,
}

pub fn layout_mode(viewport: Size) -> LayoutMode {
    if viewport.width < MOBILE_BREAKPOINT {
        LayoutMode::Mobile
    } else {
        LayoutMode::Desktop
    }
}

/// How the card is positioned for the current step. `Anchored` carries the
/// resolved viewport coordinates; `Sheet` is the fixed mobile layout and the
/// degraded fallback when no target geometry is known yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CardLayout {
    Anchored {
        x: f32,
        y: f32,
        placement: Placement,
    },
    Sheet,
}

impl CardLayout {
    pub fn is_anchored(&self) -> bool {
        matches!(self, CardLayout::Anchored { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_is_exclusive_on_the_desktop_side() {
        assert_eq!(layout_mode(Size::new(767.0, 900.0)), LayoutMode::Mobile);
        assert_eq!(layout_mode(Size::new(768.0, 900.0)), LayoutMode::Desktop);
    }
}
