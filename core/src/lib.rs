pub mod catalog;
pub mod engine;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod progress;
pub mod targeting;

pub use engine::{PageProbe, RenderModel, TourEngine, PROGRESS_SCOPE_PREFIX};
pub use geometry::{
    resolve_card, spotlight_rect, Rect, ResolveOptions, ResolvedCard, Size, PLACEMENT_OFFSET,
    SHIFT_PADDING, SPOTLIGHT_PADDING,
};
pub use layout::{layout_mode, CardLayout, LayoutMode, MOBILE_BREAKPOINT};
pub use model::{
    order_steps, Frequency, MatchType, Placement, Step, Targeting, Theme, Tour, TourStatus,
    TriggerType,
};
pub use progress::{NullProgressStore, ProgressStore, TourFlow, TourPhase};
pub use targeting::{evaluate_access, Eligibility, IneligibleReason, KeyStatus};
