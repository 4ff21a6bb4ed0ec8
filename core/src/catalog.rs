use crate::model::{Placement, Step, Tour, TourStatus};

pub const DEMO_TOUR_ID: &str = "demo-tour";

#[derive(Clone, Copy, Debug)]
pub struct DemoStep {
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub selector: &'static str,
    pub placement: Placement,
}

/// Built-in walkthrough served when the embed runs in demo mode, so the
/// widget can be tried on any page without a backend.
pub const DEMO_STEPS: &[DemoStep] = &[
    DemoStep {
        id: "demo-start",
        title: "Welcome aboard",
        body: "This button is where new visitors usually begin.",
        selector: "#get-started",
        placement: Placement::Bottom,
    },
    DemoStep {
        id: "demo-features",
        title: "Have a look around",
        body: "Everything the product can do is listed in this section.",
        selector: "#feature-list",
        placement: Placement::Right,
    },
    DemoStep {
        id: "demo-pricing",
        title: "When you are ready",
        body: "Plans start free and grow with you.",
        selector: "#pricing",
        placement: Placement::Left,
    },
];

pub fn demo_tour() -> (Tour, Vec<Step>) {
    let steps = DEMO_STEPS
        .iter()
        .enumerate()
        .map(|(index, entry)| Step {
            id: entry.id.to_string(),
            title: entry.title.to_string(),
            body: entry.body.to_string(),
            selector: entry.selector.to_string(),
            placement: entry.placement,
            order: index as u32 + 1,
        })
        .collect();
    let tour = Tour {
        id: DEMO_TOUR_ID.to_string(),
        name: "Demo tour".to_string(),
        status: TourStatus::Active,
        targeting: None,
        theme: None,
    };
    (tour, steps)
}
