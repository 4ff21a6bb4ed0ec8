use std::cell::RefCell;
use std::rc::Rc;

use yew::prelude::*;

use michishirube_core::{
    CardLayout, PageProbe, Rect, RenderModel, Size, Step, Tour, TourEngine, TourPhase,
};

use crate::backend::BackendClient;
use crate::host_page::DomPage;
use crate::observer::TargetObserver;
use crate::storage::LocalProgressStore;

const WIDGET_CSS: &str = r#"
.tour-scrim {
    position: fixed;
    z-index: 2147483000;
    border-radius: 8px;
    pointer-events: none;
}
.tour-card {
    position: fixed;
    z-index: 2147483001;
    width: 320px;
    box-sizing: border-box;
    background: var(--tour-bg, #ffffff);
    color: var(--tour-text, #333333);
    padding: 20px;
    border-radius: var(--tour-radius, 16px);
    box-shadow: 0 20px 50px -10px rgba(0, 0, 0, 0.15);
    font-family: system-ui, sans-serif;
}
.tour-card.sheet {
    left: 16px;
    right: 16px;
    bottom: 16px;
    width: auto;
}
.tour-progress-track {
    width: 100%;
    height: 4px;
    background: #f0f0f0;
    border-radius: 2px;
    margin-bottom: 16px;
    overflow: hidden;
}
.tour-progress-fill {
    height: 100%;
    background: var(--tour-primary, #111111);
}
.tour-title {
    margin: 0 0 8px;
    font-size: 18px;
    font-weight: 700;
}
.tour-body {
    margin: 0 0 20px;
    color: #666666;
    line-height: 1.5;
    font-size: 14px;
}
.tour-controls {
    display: flex;
    align-items: center;
    gap: 8px;
}
.tour-button {
    cursor: pointer;
    border: none;
    padding: 8px 16px;
    border-radius: 6px;
    font-weight: 600;
    font-size: 13px;
    background: transparent;
}
.tour-skip {
    color: #999999;
    font-size: 12px;
    margin-right: auto;
}
.tour-back {
    color: #666666;
}
.tour-back:disabled {
    opacity: 0;
    pointer-events: none;
}
.tour-next {
    background: var(--tour-primary, #111111);
    color: #ffffff;
}
"#;

#[derive(Properties, PartialEq)]
pub(crate) struct TourAppProps {
    pub tour: Tour,
    pub steps: Vec<Step>,
    pub client: Option<BackendClient>,
}

#[function_component(TourApp)]
pub(crate) fn tour_app(props: &TourAppProps) -> Html {
    let engine = use_mut_ref(|| {
        let mut engine = TourEngine::new(
            props.tour.clone(),
            props.steps.clone(),
            Rc::new(DomPage),
            Rc::new(LocalProgressStore),
        );
        engine.start();
        engine
    });
    let model = use_state(|| engine.borrow().render_model());
    let card_ref = use_node_ref();
    let generation = engine.borrow().generation();

    {
        let engine = engine.clone();
        let client = props.client.clone();
        let tour_id = props.tour.id.clone();
        use_effect_with((), move |_| {
            if let Some(client) = &client {
                client.record_event(&tour_id, "tour_started", None);
            }
            record_transition(&client, &tour_id, &engine.borrow());
            || {}
        });
    }

    // One observer per step: the effect reruns whenever the engine generation
    // moves, dropping the previous watch. Refreshes scheduled by a superseded
    // watch carry its old generation and are dropped by the engine.
    {
        let engine = engine.clone();
        let model = model.clone();
        use_effect_with(generation, move |generation| {
            let generation = *generation;
            let phase = engine.borrow().phase();
            let observer = match phase {
                TourPhase::Active(_) => {
                    let selector = engine
                        .borrow()
                        .active_step()
                        .map(|step| step.selector.clone())
                        .unwrap_or_default();
                    let sample: Rc<dyn Fn() -> Option<Rect>> =
                        Rc::new(move || DomPage.element_rect(&selector));
                    let refresh: Rc<dyn Fn()> = {
                        let engine = engine.clone();
                        let model = model.clone();
                        Rc::new(move || {
                            let committed = engine.borrow_mut().refresh(generation);
                            if committed {
                                model.set(engine.borrow().render_model());
                            }
                        })
                    };
                    Some(TargetObserver::start(sample, refresh))
                }
                _ => None,
            };
            move || drop(observer)
        });
    }

    // The anchored position depends on the rendered card size, so measure it
    // after every render and recompute when it changed.
    {
        let engine = engine.clone();
        let model = model.clone();
        let card_ref = card_ref.clone();
        use_effect(move || {
            if let Some(element) = card_ref.cast::<web_sys::Element>() {
                let rect = element.get_bounding_client_rect();
                let size = Size::new(rect.width() as f32, rect.height() as f32);
                let mut engine_mut = engine.borrow_mut();
                if engine_mut.set_card_size(size) {
                    let generation = engine_mut.generation();
                    if engine_mut.refresh(generation) {
                        let next = engine_mut.render_model();
                        drop(engine_mut);
                        model.set(next);
                    }
                }
            }
            || {}
        });
    }

    let on_skip = transition_callback(&engine, &model, &props.client, &props.tour.id, TourEngine::skip);
    let on_back = transition_callback(&engine, &model, &props.client, &props.tour.id, TourEngine::back);
    let on_next = transition_callback(&engine, &model, &props.client, &props.tour.id, TourEngine::next);

    let Some(view) = (*model).clone() else {
        return html! {};
    };
    let theme = props.tour.theme.clone().unwrap_or_default();
    let theme_style = format!(
        "--tour-primary:{};--tour-bg:{};--tour-text:{};--tour-radius:{}px;",
        theme.primary_color, theme.background_color, theme.text_color, theme.border_radius
    );
    let card_style = match view.layout {
        CardLayout::Anchored { x, y, .. } => format!("{theme_style}left:{x}px;top:{y}px;"),
        CardLayout::Sheet => theme_style,
    };
    let sheet_class = matches!(view.layout, CardLayout::Sheet).then_some("sheet");
    let scrim = view
        .spotlight
        .filter(|_| theme.overlay_enabled)
        .map(|spot| {
            let style = format!(
                "left:{}px;top:{}px;width:{}px;height:{}px;box-shadow:0 0 0 200vmax rgba(0,0,0,{});",
                spot.x, spot.y, spot.width, spot.height, theme.overlay_opacity
            );
            html! { <div class="tour-scrim" style={style}></div> }
        });
    let progress_style = format!("width:{}%;", view.progress_percent);

    html! {
        <>
            <style>{ WIDGET_CSS }</style>
            { scrim }
            <div class={classes!("tour-card", sheet_class)} style={card_style} ref={card_ref}>
                <div class="tour-progress-track">
                    <div class="tour-progress-fill" style={progress_style}></div>
                </div>
                <h3 class="tour-title">{ view.step.title.clone() }</h3>
                <p class="tour-body">{ view.step.body.clone() }</p>
                <div class="tour-controls">
                    <button class="tour-button tour-skip" onclick={on_skip}>{ "Skip tour" }</button>
                    <button
                        class="tour-button tour-back"
                        onclick={on_back}
                        disabled={view.step_index == 0}
                    >
                        { "Back" }
                    </button>
                    <button class="tour-button tour-next" onclick={on_next}>
                        { if view.is_last { "Finish" } else { "Next" } }
                    </button>
                </div>
            </div>
        </>
    }
}

fn transition_callback(
    engine: &Rc<RefCell<TourEngine>>,
    model: &UseStateHandle<Option<RenderModel>>,
    client: &Option<BackendClient>,
    tour_id: &str,
    action: fn(&mut TourEngine),
) -> Callback<MouseEvent> {
    let engine = engine.clone();
    let model = model.clone();
    let client = client.clone();
    let tour_id = tour_id.to_string();
    Callback::from(move |_event: MouseEvent| {
        {
            let mut engine = engine.borrow_mut();
            action(&mut engine);
            let generation = engine.generation();
            engine.refresh(generation);
        }
        record_transition(&client, &tour_id, &engine.borrow());
        model.set(engine.borrow().render_model());
    })
}

fn record_transition(client: &Option<BackendClient>, tour_id: &str, engine: &TourEngine) {
    let Some(client) = client else {
        return;
    };
    match engine.phase() {
        TourPhase::Active(_) => {
            if let Some(step) = engine.active_step() {
                client.record_event(tour_id, "step_viewed", Some(&step.id));
            }
        }
        TourPhase::Finished => client.record_event(tour_id, "tour_completed", None),
        TourPhase::Skipped => client.record_event(tour_id, "tour_skipped", None),
        TourPhase::NotStarted => {}
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use console_error_panic_hook::set_once as set_panic_hook;
    use gloo::timers::future::TimeoutFuture;
    use michishirube_core::{Frequency, Placement, ProgressStore, TourStatus, PROGRESS_SCOPE_PREFIX};
    use wasm_bindgen_test::*;

    use crate::storage;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn progress_store_round_trips_via_local_storage() {
        set_panic_hook();
        let store = LocalProgressStore;
        let scope = format!("{PROGRESS_SCOPE_PREFIX}wasm-test");
        store.write(&scope, "2");
        assert_eq!(store.read(&scope).as_deref(), Some("2"));
        store.clear(&scope);
        assert_eq!(store.read(&scope), None);
    }

    #[wasm_bindgen_test]
    fn frequency_markers_round_trip() {
        set_panic_hook();
        assert!(!storage::already_shown("wasm-freq", Frequency::Always));
        storage::mark_shown("wasm-freq", Frequency::Once);
        assert!(storage::already_shown("wasm-freq", Frequency::Once));
        storage::mark_shown("wasm-freq", Frequency::Always);
        assert!(!storage::already_shown("wasm-freq", Frequency::Always));
    }

    #[wasm_bindgen_test]
    fn visitor_id_is_stable_across_reads() {
        set_panic_hook();
        let first = storage::visitor_id();
        let second = storage::visitor_id();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[wasm_bindgen_test]
    async fn mounts_and_renders_the_first_step() {
        set_panic_hook();
        let document = web_sys::window()
            .and_then(|window| window.document())
            .expect("document available");
        let body = document.body().expect("body available");
        let target = document.create_element("div").expect("create target");
        target.set_id("wasm-probe-target");
        body.append_child(&target).expect("append target");
        let root = document.create_element("div").expect("create root");
        body.append_child(&root).expect("append root");

        let tour = Tour {
            id: "wasm-tour".to_string(),
            name: "Wasm".to_string(),
            status: TourStatus::Active,
            targeting: None,
            theme: None,
        };
        let steps = vec![Step {
            id: "s1".to_string(),
            title: "Hello".to_string(),
            body: "World".to_string(),
            selector: "#wasm-probe-target".to_string(),
            placement: Placement::Bottom,
            order: 1,
        }];
        let _handle = yew::Renderer::<TourApp>::with_root_and_props(
            root.clone(),
            TourAppProps {
                tour,
                steps,
                client: None,
            },
        )
        .render();

        TimeoutFuture::new(50).await;
        let card = root
            .query_selector(".tour-card")
            .expect("query works")
            .expect("card rendered");
        assert!(card.text_content().unwrap_or_default().contains("Hello"));

        // The single-step tour shows Finish, not Next.
        let next = root
            .query_selector(".tour-next")
            .expect("query works")
            .expect("next button rendered");
        assert_eq!(next.text_content().unwrap_or_default(), "Finish");

        LocalProgressStore.clear(&format!("{PROGRESS_SCOPE_PREFIX}wasm-tour"));
    }
}
