use serde::{Deserialize, Serialize};
use url::Url;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Headers, Request, RequestInit, Response};

use michishirube_core::{Step, Tour};

use crate::storage;

/// Thin client for the tour backend. Every method maps transport failures to
/// plain strings; callers decide whether a failure suppresses the widget or
/// is merely logged.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct BackendClient {
    base: Url,
}

#[derive(Deserialize)]
struct KeyVerdict {
    valid: bool,
}

#[derive(Serialize)]
struct EventRecord {
    #[serde(rename = "tourId")]
    tour_id: String,
    #[serde(rename = "visitorId")]
    visitor_id: String,
    event: String,
    #[serde(rename = "stepId", skip_serializing_if = "Option::is_none")]
    step_id: Option<String>,
}

impl BackendClient {
    pub(crate) fn new(base: &str) -> Result<Self, String> {
        let base = Url::parse(base).map_err(|error| format!("invalid endpoint: {error}"))?;
        Ok(Self { base })
    }

    fn api_url(&self, path: &str) -> Result<Url, String> {
        self.base
            .join(path)
            .map_err(|error| format!("invalid api path: {error}"))
    }

    /// `Ok(None)` means the tour does not exist; transport and decode
    /// problems are `Err`.
    pub(crate) async fn fetch_tour(&self, tour_id: &str) -> Result<Option<Tour>, String> {
        let url = self.api_url(&format!("api/tours/{tour_id}"))?;
        let Some(text) = fetch_text(url.as_str()).await? else {
            return Ok(None);
        };
        let tour = serde_json::from_str(&text)
            .map_err(|error| format!("tour decode failed: {error}"))?;
        Ok(Some(tour))
    }

    pub(crate) async fn fetch_steps(&self, tour_id: &str) -> Result<Vec<Step>, String> {
        let url = self.api_url(&format!("api/tours/{tour_id}/steps"))?;
        let Some(text) = fetch_text(url.as_str()).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&text).map_err(|error| format!("steps decode failed: {error}"))
    }

    pub(crate) async fn validate_key(&self, key: &str) -> Result<bool, String> {
        let mut url = self.api_url("api/keys/validate")?;
        url.query_pairs_mut().append_pair("key", key);
        let Some(text) = fetch_text(url.as_str()).await? else {
            return Ok(false);
        };
        let verdict: KeyVerdict = serde_json::from_str(&text)
            .map_err(|error| format!("key verdict decode failed: {error}"))?;
        Ok(verdict.valid)
    }

    /// Fire-and-forget analytics. A lost event is logged and dropped; it can
    /// never affect the tour.
    pub(crate) fn record_event(&self, tour_id: &str, event: &str, step_id: Option<&str>) {
        let record = EventRecord {
            tour_id: tour_id.to_string(),
            visitor_id: storage::visitor_id(),
            event: event.to_string(),
            step_id: step_id.map(|id| id.to_string()),
        };
        let url = match self.api_url("api/events") {
            Ok(url) => url,
            Err(error) => {
                gloo::console::warn!(format!("analytics: {error}"));
                return;
            }
        };
        spawn_local(async move {
            if let Err(error) = post_json(url.as_str(), &record).await {
                gloo::console::warn!(format!("analytics: event dropped: {error}"));
            }
        });
    }
}

fn js_err(error: JsValue) -> String {
    if let Some(value) = error.as_string() {
        return value;
    }
    format!("{error:?}")
}

async fn fetch_text(url: &str) -> Result<Option<String>, String> {
    let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_err)?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| "unexpected fetch response".to_string())?;
    if response.status() == 404 {
        return Ok(None);
    }
    if !response.ok() {
        return Err(format!("request failed with status {}", response.status()));
    }
    let text = JsFuture::from(response.text().map_err(js_err)?)
        .await
        .map_err(js_err)?;
    Ok(Some(text.as_string().unwrap_or_default()))
}

async fn post_json<T: Serialize>(url: &str, payload: &T) -> Result<(), String> {
    let body = serde_json::to_string(payload).map_err(|error| error.to_string())?;
    let headers = Headers::new().map_err(js_err)?;
    headers
        .set("content-type", "application/json")
        .map_err(js_err)?;
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_headers(&headers);
    init.set_body(&JsValue::from_str(&body));
    let request = Request::new_with_str_and_init(url, &init).map_err(js_err)?;
    let window = web_sys::window().ok_or_else(|| "window unavailable".to_string())?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| "unexpected fetch response".to_string())?;
    if !response.ok() {
        return Err(format!("request failed with status {}", response.status()));
    }
    Ok(())
}
