use crate::model::Placement;

pub const PLACEMENT_OFFSET: f32 = 20.0;
pub const SHIFT_PADDING: f32 = 12.0;
pub const SPOTLIGHT_PADDING: f32 = 8.0;

/// Axis-aligned box in viewport coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height * 0.5
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolveOptions {
    /// Gap between the target edge and the card on the anchored side.
    pub offset: f32,
    /// Minimum distance kept between the card and the viewport edges when
    /// shifting along the cross axis.
    pub padding: f32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            offset: PLACEMENT_OFFSET,
            padding: SHIFT_PADDING,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolvedCard {
    pub x: f32,
    pub y: f32,
    pub placement: Placement,
}

/// Anchors a card of `card` size to `target`, preferring `preferred` but
/// flipping to the first fallback side whose main axis fits the viewport,
/// then shifting along the cross axis to stay `padding` px inside the
/// viewport. When no side fits, the unshifted, unflipped preferred position
/// is returned rather than an error.
pub fn resolve_card(
    target: Rect,
    card: Size,
    viewport: Size,
    preferred: Placement,
    options: ResolveOptions,
) -> ResolvedCard {
    let placement = if fits_main_axis(target, card, viewport, preferred, options.offset) {
        preferred
    } else {
        let fallback = fallback_order(preferred)
            .into_iter()
            .find(|side| fits_main_axis(target, card, viewport, *side, options.offset));
        match fallback {
            Some(side) => side,
            None => {
                let (x, y) = base_position(target, card, preferred, options.offset);
                return ResolvedCard {
                    x,
                    y,
                    placement: preferred,
                };
            }
        }
    };
    let (x, y) = base_position(target, card, placement, options.offset);
    let (x, y) = shift_cross_axis(x, y, card, viewport, placement, options.padding);
    ResolvedCard { x, y, placement }
}

/// Flip candidates for a preferred side: the opposite side first, then the
/// two perpendicular ones.
pub fn fallback_order(preferred: Placement) -> [Placement; 3] {
    match preferred {
        Placement::Bottom => [Placement::Top, Placement::Right, Placement::Left],
        Placement::Top => [Placement::Bottom, Placement::Right, Placement::Left],
        Placement::Left => [Placement::Right, Placement::Top, Placement::Bottom],
        Placement::Right => [Placement::Left, Placement::Top, Placement::Bottom],
    }
}

/// Target rectangle inflated by the scrim cut-out padding.
pub fn spotlight_rect(target: Rect, padding: f32) -> Rect {
    Rect {
        x: target.x - padding,
        y: target.y - padding,
        width: target.width + padding * 2.0,
        height: target.height + padding * 2.0,
    }
}

fn base_position(target: Rect, card: Size, placement: Placement, offset: f32) -> (f32, f32) {
    match placement {
        Placement::Top => (
            target.center_x() - card.width * 0.5,
            target.y - offset - card.height,
        ),
        Placement::Bottom => (target.center_x() - card.width * 0.5, target.bottom() + offset),
        Placement::Left => (
            target.x - offset - card.width,
            target.center_y() - card.height * 0.5,
        ),
        Placement::Right => (target.right() + offset, target.center_y() - card.height * 0.5),
    }
}

fn fits_main_axis(
    target: Rect,
    card: Size,
    viewport: Size,
    placement: Placement,
    offset: f32,
) -> bool {
    match placement {
        Placement::Top => target.y - offset - card.height >= 0.0,
        Placement::Bottom => target.bottom() + offset + card.height <= viewport.height,
        Placement::Left => target.x - offset - card.width >= 0.0,
        Placement::Right => target.right() + offset + card.width <= viewport.width,
    }
}

fn shift_cross_axis(
    x: f32,
    y: f32,
    card: Size,
    viewport: Size,
    placement: Placement,
    padding: f32,
) -> (f32, f32) {
    match placement {
        Placement::Top | Placement::Bottom => (
            clamp_span(x, card.width, viewport.width, padding),
            y,
        ),
        Placement::Left | Placement::Right => (
            x,
            clamp_span(y, card.height, viewport.height, padding),
        ),
    }
}

fn clamp_span(pos: f32, span: f32, limit: f32, padding: f32) -> f32 {
    let min = padding;
    let max = limit - span - padding;
    if max < min {
        // No room to honor the padding on both sides; leave the base position.
        return pos;
    }
    pos.clamp(min, max)
}
