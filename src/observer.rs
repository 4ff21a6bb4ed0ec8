use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo::render::{request_animation_frame, AnimationFrame};

use michishirube_core::Rect;

/// Watches the active step's target element for position or size changes.
///
/// `on_change` runs once at start, then again on window resize, on scroll of
/// any ancestor (capture phase), and whenever the sampled rectangle differs
/// from the previous animation frame. Dropping the observer tears the whole
/// watch down; replacing one observer with another can never leak listeners.
pub(crate) struct TargetObserver {
    listeners: Vec<EventListener>,
    frame: Rc<RefCell<Option<AnimationFrame>>>,
    alive: Rc<Cell<bool>>,
}

impl TargetObserver {
    pub(crate) fn start(
        sample: Rc<dyn Fn() -> Option<Rect>>,
        on_change: Rc<dyn Fn()>,
    ) -> Self {
        on_change();
        let mut listeners = Vec::new();
        if let Some(window) = web_sys::window() {
            let hook = on_change.clone();
            listeners.push(EventListener::new(&window, "resize", move |_event| {
                hook();
            }));
            if let Some(document) = window.document() {
                let hook = on_change.clone();
                listeners.push(EventListener::new_with_options(
                    &document,
                    "scroll",
                    EventListenerOptions {
                        phase: EventListenerPhase::Capture,
                        passive: true,
                    },
                    move |_event| {
                        hook();
                    },
                ));
            }
        }
        let frame = Rc::new(RefCell::new(None));
        let alive = Rc::new(Cell::new(true));
        let last = Rc::new(RefCell::new(sample()));
        schedule_frame(&frame, &alive, last, sample, on_change);
        Self {
            listeners,
            frame,
            alive,
        }
    }

    pub(crate) fn stop(&mut self) {
        self.alive.set(false);
        self.frame.borrow_mut().take();
        self.listeners.clear();
    }
}

impl Drop for TargetObserver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn schedule_frame(
    frame: &Rc<RefCell<Option<AnimationFrame>>>,
    alive: &Rc<Cell<bool>>,
    last: Rc<RefCell<Option<Rect>>>,
    sample: Rc<dyn Fn() -> Option<Rect>>,
    on_change: Rc<dyn Fn()>,
) {
    let frame_slot = Rc::clone(frame);
    let alive_flag = Rc::clone(alive);
    let handle = request_animation_frame(move |_timestamp| {
        if !alive_flag.get() {
            return;
        }
        let current = sample();
        let changed = current != *last.borrow();
        if changed {
            *last.borrow_mut() = current;
            on_change();
        }
        // on_change may have torn the watch down; re-arm only while alive.
        if alive_flag.get() {
            schedule_frame(&frame_slot, &alive_flag, last, sample, on_change);
        }
    });
    *frame.borrow_mut() = Some(handle);
}
