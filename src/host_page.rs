use michishirube_core::{PageProbe, Rect, Size};

/// `PageProbe` over the live host document.
pub(crate) struct DomPage;

impl PageProbe for DomPage {
    fn element_rect(&self, selector: &str) -> Option<Rect> {
        let document = web_sys::window()?.document()?;
        let element = document.query_selector(selector).ok().flatten()?;
        let rect = element.get_bounding_client_rect();
        Some(Rect::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        ))
    }

    fn viewport(&self) -> Size {
        let Some(window) = web_sys::window() else {
            return Size::default();
        };
        let width = window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        Size::new(width as f32, height as f32)
    }

    fn current_url(&self) -> String {
        web_sys::window()
            .and_then(|window| window.location().href().ok())
            .unwrap_or_default()
    }
}
