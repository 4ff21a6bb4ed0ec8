use std::rc::Rc;

use gloo::timers::callback::Timeout;
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, ShadowRootInit, ShadowRootMode};

use michishirube_core::{
    catalog, evaluate_access, order_steps, Eligibility, KeyStatus, PageProbe, Step, Tour,
    TriggerType,
};

use crate::backend::BackendClient;
use crate::boot_runtime::{self, BootState};
use crate::host_page::DomPage;
use crate::storage;
use crate::widget::{TourApp, TourAppProps};

pub(crate) const WIDGET_HOST_ID: &str = "michishirube-host";
const CONFIG_GLOBAL: &str = "__MICHISHIRUBE";

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct BootConfig {
    pub(crate) tour_id: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) endpoint: Option<String>,
    pub(crate) demo: bool,
}

/// Entry point. Reads the embed configuration once, refuses to double-mount,
/// and hands off to the async boot flow. Nothing here may throw into the host
/// page; every abort is a log line plus a terminal boot state.
pub(crate) fn run() {
    if boot_runtime::boot_state() != BootState::ColdStart {
        return;
    }
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    if document.get_element_by_id(WIDGET_HOST_ID).is_some() {
        gloo::console::warn!("boot: widget already mounted, ignoring second embed");
        return;
    }
    install_log_hook();
    let config = load_config(&document);
    let Some(tour_id) = config.tour_id.clone() else {
        gloo::console::error!("boot: no tour id configured, widget will not start");
        boot_runtime::set_boot_state(BootState::Failed);
        return;
    };
    if config.endpoint.is_none() && !config.demo {
        gloo::console::error!("boot: no backend endpoint configured, widget will not start");
        boot_runtime::set_boot_state(BootState::Failed);
        return;
    }
    boot_runtime::set_boot_state(BootState::LoadingTour);
    spawn_local(async move {
        boot_flow(config, tour_id).await;
    });
}

async fn boot_flow(config: BootConfig, tour_id: String) {
    let client = match config.endpoint.as_deref().filter(|_| !config.demo) {
        Some(endpoint) => match BackendClient::new(endpoint) {
            Ok(client) => Some(client),
            Err(error) => {
                gloo::console::error!(format!("boot: {error}"));
                boot_runtime::set_boot_state(BootState::Failed);
                return;
            }
        },
        None => None,
    };

    let (tour, mut steps) = match &client {
        Some(client) => {
            let tour = match client.fetch_tour(&tour_id).await {
                Ok(Some(tour)) => tour,
                Ok(None) => {
                    gloo::console::warn!(format!("boot: tour {tour_id} not found"));
                    boot_runtime::set_boot_state(BootState::Suppressed);
                    return;
                }
                Err(error) => {
                    gloo::console::error!(format!("boot: tour fetch failed: {error}"));
                    boot_runtime::set_boot_state(BootState::Failed);
                    return;
                }
            };
            let steps = match client.fetch_steps(&tour_id).await {
                Ok(steps) => steps,
                Err(error) => {
                    gloo::console::error!(format!("boot: step fetch failed: {error}"));
                    boot_runtime::set_boot_state(BootState::Failed);
                    return;
                }
            };
            (tour, steps)
        }
        None => catalog::demo_tour(),
    };

    if steps.is_empty() {
        gloo::console::warn!("boot: tour has no steps");
        boot_runtime::set_boot_state(BootState::Suppressed);
        return;
    }
    order_steps(&mut steps);

    boot_runtime::set_boot_state(BootState::CheckingAccess);
    let key_status = match (&client, &config.api_key) {
        (Some(client), Some(key)) => match client.validate_key(key).await {
            Ok(true) => KeyStatus::Valid,
            Ok(false) => KeyStatus::Invalid,
            Err(error) => {
                gloo::console::warn!(format!("boot: key validation unresolved: {error}"));
                KeyStatus::Unknown
            }
        },
        // No credential configured (or demo mode): implicitly valid.
        _ => KeyStatus::Valid,
    };

    let url = DomPage.current_url();
    match evaluate_access(key_status, tour.status, tour.targeting.as_ref(), &url) {
        Eligibility::Eligible => {}
        Eligibility::Pending => {
            gloo::console::log!("boot: access still pending, widget stays hidden");
            boot_runtime::set_boot_state(BootState::Suppressed);
            return;
        }
        Eligibility::Ineligible(reason) => {
            gloo::console::log!(format!("boot: not eligible ({reason})"));
            boot_runtime::set_boot_state(BootState::Suppressed);
            return;
        }
    }

    let frequency = tour
        .targeting
        .as_ref()
        .map(|rule| rule.frequency)
        .unwrap_or_default();
    if storage::already_shown(&tour.id, frequency) {
        gloo::console::log!("boot: tour already shown for this visitor");
        boot_runtime::set_boot_state(BootState::Suppressed);
        return;
    }

    let trigger = tour
        .targeting
        .as_ref()
        .map(|rule| (rule.trigger, rule.delay_ms))
        .unwrap_or((TriggerType::Pageload, None));
    match trigger {
        (TriggerType::Delay, delay_ms) => {
            let delay_ms = delay_ms.unwrap_or(0);
            Timeout::new(delay_ms, move || {
                mount_widget(tour, steps, client);
            })
            .forget();
        }
        (TriggerType::Click, _) => {
            // Click triggers are authored but not wired up yet; behave like
            // pageload so the tour is not silently lost.
            gloo::console::warn!("boot: click trigger not supported, mounting on pageload");
            mount_widget(tour, steps, client);
        }
        _ => mount_widget(tour, steps, client),
    }
}

fn mount_widget(tour: Tour, steps: Vec<Step>, client: Option<BackendClient>) {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return;
    };
    if document.get_element_by_id(WIDGET_HOST_ID).is_some() {
        return;
    }
    let Some(body) = document.body() else {
        gloo::console::error!("boot: host page has no body");
        boot_runtime::set_boot_state(BootState::Failed);
        return;
    };
    let Ok(container) = document.create_element("div") else {
        boot_runtime::set_boot_state(BootState::Failed);
        return;
    };
    container.set_id(WIDGET_HOST_ID);
    if body.append_child(&container).is_err() {
        boot_runtime::set_boot_state(BootState::Failed);
        return;
    }
    let shadow = match container.attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open)) {
        Ok(shadow) => shadow,
        Err(error) => {
            gloo::console::error!(format!(
                "boot: shadow root rejected: {}",
                error.as_string().unwrap_or_default()
            ));
            boot_runtime::set_boot_state(BootState::Failed);
            return;
        }
    };
    let Ok(root) = document.create_element("div") else {
        boot_runtime::set_boot_state(BootState::Failed);
        return;
    };
    if shadow.append_child(&root).is_err() {
        boot_runtime::set_boot_state(BootState::Failed);
        return;
    }

    let frequency = tour
        .targeting
        .as_ref()
        .map(|rule| rule.frequency)
        .unwrap_or_default();
    storage::mark_shown(&tour.id, frequency);

    boot_runtime::set_boot_state(BootState::Ready);
    yew::Renderer::<TourApp>::with_root_and_props(root, TourAppProps { tour, steps, client })
        .render();
}

fn install_log_hook() {
    boot_runtime::add_boot_state_hook(Rc::new(|state| {
        gloo::console::log!(format!("boot: {state:?}"));
    }));
}

fn load_config(document: &Document) -> BootConfig {
    if let Some(config) = load_global_config() {
        return config;
    }
    load_script_config(document).unwrap_or_default()
}

/// Host pages can configure the widget through a `window.__MICHISHIRUBE`
/// object set before the embed script loads.
fn load_global_config() -> Option<BootConfig> {
    let window = web_sys::window()?;
    let value = Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL)).ok()?;
    if value.is_null() || value.is_undefined() {
        return None;
    }
    let config = value.dyn_into::<js_sys::Object>().ok()?;
    let field = |name: &str| -> Option<String> {
        Reflect::get(&config, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.as_string())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let demo = Reflect::get(&config, &JsValue::from_str("demo"))
        .ok()
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    Some(BootConfig {
        tour_id: field("tourId"),
        api_key: field("apiKey"),
        endpoint: field("endpoint"),
        demo,
    })
}

/// Fallback: `data-*` attributes on the embedding script tag. The embed
/// loads as an async module, so `document.currentScript` is null by the time
/// this runs; the tag is found by its marker attribute instead.
fn load_script_config(document: &Document) -> Option<BootConfig> {
    let script: Element = document
        .query_selector("script[data-tour-id]")
        .ok()
        .flatten()?;
    let attribute = |name: &str| -> Option<String> {
        script
            .get_attribute(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let demo = attribute("data-demo").is_some_and(|value| value == "true");
    Some(BootConfig {
        tour_id: attribute("data-tour-id"),
        api_key: attribute("data-api-key"),
        endpoint: attribute("data-endpoint"),
        demo,
    })
}
