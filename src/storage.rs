use michishirube_core::{Frequency, ProgressStore};
use web_sys::Storage;

const SHOWN_PREFIX: &str = "michishirube.shown.";
const VISITOR_KEY: &str = "michishirube.visitor";

fn local_storage() -> Option<Storage> {
    web_sys::window().and_then(|window| window.local_storage().ok().flatten())
}

fn session_storage() -> Option<Storage> {
    web_sys::window().and_then(|window| window.session_storage().ok().flatten())
}

/// Progress persistence in localStorage. Disabled or full storage degrades to
/// in-memory progress for the current page view.
pub(crate) struct LocalProgressStore;

impl ProgressStore for LocalProgressStore {
    fn read(&self, scope: &str) -> Option<String> {
        local_storage()?.get_item(scope).ok().flatten()
    }

    fn write(&self, scope: &str, value: &str) {
        let Some(storage) = local_storage() else {
            gloo::console::warn!("progress: storage unavailable, progress will not survive reloads");
            return;
        };
        if storage.set_item(scope, value).is_err() {
            gloo::console::warn!("progress: storage write failed");
        }
    }

    fn clear(&self, scope: &str) {
        let Some(storage) = local_storage() else {
            return;
        };
        let _ = storage.remove_item(scope);
    }
}

fn shown_store(frequency: Frequency) -> Option<Storage> {
    match frequency {
        Frequency::Always => None,
        Frequency::Once => local_storage(),
        Frequency::Session => session_storage(),
    }
}

pub(crate) fn already_shown(tour_id: &str, frequency: Frequency) -> bool {
    let key = format!("{SHOWN_PREFIX}{tour_id}");
    shown_store(frequency)
        .and_then(|storage| storage.get_item(&key).ok().flatten())
        .is_some()
}

pub(crate) fn mark_shown(tour_id: &str, frequency: Frequency) {
    let key = format!("{SHOWN_PREFIX}{tour_id}");
    let Some(storage) = shown_store(frequency) else {
        return;
    };
    let _ = storage.set_item(&key, "1");
}

/// Stable per-browser id for analytics events. Generated once and kept in
/// localStorage; a fresh id per page view is the degraded mode.
pub(crate) fn visitor_id() -> String {
    if let Some(id) = local_storage().and_then(|storage| storage.get_item(VISITOR_KEY).ok().flatten())
    {
        if !id.is_empty() {
            return id;
        }
    }
    let id = generate_visitor_id();
    if let Some(storage) = local_storage() {
        let _ = storage.set_item(VISITOR_KEY, &id);
    }
    id
}

fn generate_visitor_id() -> String {
    let stamp = js_sys::Date::now() as u64;
    let noise = (js_sys::Math::random() * 1e9) as u64;
    format!("v-{stamp:x}-{noise:x}")
}
