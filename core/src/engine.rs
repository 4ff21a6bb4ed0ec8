use std::rc::Rc;

use crate::geometry::{self, Rect, ResolveOptions, Size, SPOTLIGHT_PADDING};
use crate::layout::{layout_mode, CardLayout, LayoutMode};
use crate::model::{Step, Tour};
use crate::progress::{ProgressStore, TourFlow, TourPhase};

pub const PROGRESS_SCOPE_PREFIX: &str = "michishirube.progress.";

/// Live-document queries the engine needs. Implemented over the real DOM in
/// the widget and over fixtures in tests.
pub trait PageProbe {
    fn element_rect(&self, selector: &str) -> Option<Rect>;
    fn viewport(&self) -> Size;
    fn current_url(&self) -> String;
}

/// Everything the presentation layer needs to draw one committed state of the
/// tour.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderModel {
    pub step: Step,
    pub step_index: usize,
    pub step_count: usize,
    pub progress_percent: f32,
    pub layout: CardLayout,
    pub target_rect: Option<Rect>,
    pub spotlight: Option<Rect>,
    pub mode: LayoutMode,
    pub is_last: bool,
}

/// Owns the runtime state of one mounted tour: the step flow, the last-known
/// target geometry, and the layout mode. Geometry refreshes are fenced by a
/// generation counter so a watch scheduled for an earlier step can never
/// overwrite the current one.
pub struct TourEngine {
    tour: Tour,
    steps: Vec<Step>,
    flow: TourFlow,
    page: Rc<dyn PageProbe>,
    options: ResolveOptions,
    card_size: Size,
    generation: u64,
    mode: LayoutMode,
    layout: CardLayout,
    last_rect: Option<Rect>,
}

impl TourEngine {
    pub fn new(
        tour: Tour,
        steps: Vec<Step>,
        page: Rc<dyn PageProbe>,
        store: Rc<dyn ProgressStore>,
    ) -> Self {
        let scope = format!("{PROGRESS_SCOPE_PREFIX}{}", tour.id);
        let flow = TourFlow::new(scope, steps.len(), store);
        let mode = layout_mode(page.viewport());
        Self {
            tour,
            steps,
            flow,
            page,
            options: ResolveOptions::default(),
            card_size: Size::new(320.0, 180.0),
            generation: 0,
            mode,
            layout: CardLayout::Sheet,
            last_rect: None,
        }
    }

    pub fn tour(&self) -> &Tour {
        &self.tour
    }

    pub fn phase(&self) -> TourPhase {
        self.flow.phase()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_step(&self) -> Option<&Step> {
        self.steps.get(self.flow.active_index()?)
    }

    pub fn start(&mut self) {
        self.transition(TourFlow::start);
    }

    pub fn next(&mut self) {
        self.transition(TourFlow::next);
    }

    pub fn back(&mut self) {
        self.transition(TourFlow::back);
    }

    pub fn skip(&mut self) {
        self.transition(TourFlow::skip);
    }

    /// Records the measured card size. Returns true when it changed and the
    /// anchored position should be recomputed.
    pub fn set_card_size(&mut self, size: Size) -> bool {
        if size == self.card_size || size.width <= 0.0 || size.height <= 0.0 {
            return false;
        }
        self.card_size = size;
        true
    }

    /// Recomputes layout mode and geometry for the active step. `generation`
    /// must be the value observed when the refresh was scheduled; a stale
    /// value means the step has moved on and the call is dropped. Returns
    /// whether a new state was committed.
    pub fn refresh(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        let Some(index) = self.flow.active_index() else {
            return false;
        };
        let Some(step) = self.steps.get(index) else {
            return false;
        };
        let viewport = self.page.viewport();
        self.mode = layout_mode(viewport);
        if let Some(rect) = self.page.element_rect(&step.selector) {
            self.last_rect = Some(rect);
        }
        self.layout = match self.mode {
            LayoutMode::Mobile => CardLayout::Sheet,
            LayoutMode::Desktop => match self.last_rect {
                Some(rect) => {
                    let resolved = geometry::resolve_card(
                        rect,
                        self.card_size,
                        viewport,
                        step.placement,
                        self.options,
                    );
                    CardLayout::Anchored {
                        x: resolved.x,
                        y: resolved.y,
                        placement: resolved.placement,
                    }
                }
                // Target never seen: hold whatever layout we had.
                None => self.layout,
            },
        };
        true
    }

    pub fn render_model(&self) -> Option<RenderModel> {
        let index = self.flow.active_index()?;
        let step = self.steps.get(index)?.clone();
        let count = self.flow.step_count();
        Some(RenderModel {
            step,
            step_index: index,
            step_count: count,
            progress_percent: (index + 1) as f32 / count as f32 * 100.0,
            layout: self.layout,
            target_rect: self.last_rect,
            spotlight: self
                .last_rect
                .map(|rect| geometry::spotlight_rect(rect, SPOTLIGHT_PADDING)),
            mode: self.mode,
            is_last: self.flow.is_last(),
        })
    }

    fn transition(&mut self, apply: impl FnOnce(&mut TourFlow)) {
        let before = self.flow.phase();
        apply(&mut self.flow);
        if self.flow.phase() != before {
            self.generation += 1;
        }
    }
}
