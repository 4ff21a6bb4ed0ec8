use serde::{Deserialize, Serialize};

/// Side of the target element a step's card prefers to anchor on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourStatus {
    Draft,
    #[default]
    Active,
    Paused,
}

/// URL matching strategy of a targeting rule. The wire value stays a plain
/// string on `Targeting` so that a value this build does not know about still
/// decodes and is rejected at evaluation time, not at payload decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchType {
    Exact,
    Contains,
    Regex,
}

impl MatchType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "exact" => Some(Self::Exact),
            "contains" => Some(Self::Contains),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
    #[default]
    Pageload,
    Delay,
    Click,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Once,
    Session,
    #[default]
    Always,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Targeting {
    #[serde(rename = "urlMatchType")]
    pub match_type: String,
    #[serde(rename = "urlPattern")]
    pub pattern: String,
    #[serde(rename = "triggerType", default)]
    pub trigger: TriggerType,
    #[serde(rename = "triggerDelay", default)]
    pub delay_ms: Option<u32>,
    #[serde(default)]
    pub frequency: Frequency,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(rename = "primaryColor")]
    pub primary_color: String,
    #[serde(rename = "backgroundColor")]
    pub background_color: String,
    #[serde(rename = "textColor")]
    pub text_color: String,
    #[serde(rename = "borderRadius")]
    pub border_radius: f32,
    #[serde(rename = "overlayEnabled")]
    pub overlay_enabled: bool,
    #[serde(rename = "overlayOpacity")]
    pub overlay_opacity: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_color: "#111111".to_string(),
            background_color: "#ffffff".to_string(),
            text_color: "#333333".to_string(),
            border_radius: 16.0,
            overlay_enabled: true,
            overlay_opacity: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: TourStatus,
    #[serde(default)]
    pub targeting: Option<Targeting>,
    #[serde(default)]
    pub theme: Option<Theme>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub title: String,
    #[serde(rename = "content")]
    pub body: String,
    #[serde(rename = "targetSelector")]
    pub selector: String,
    #[serde(rename = "position", default)]
    pub placement: Placement,
    #[serde(default)]
    pub order: u32,
}

/// Sorts steps by their authored ordinal. Gaps and duplicates are fine; after
/// this pass navigation runs on list order and the ordinal is never read again.
pub fn order_steps(steps: &mut [Step]) {
    steps.sort_by_key(|step| step.order);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_decodes_backend_payload() {
        let raw = r##"{
            "id": "s1",
            "title": "Welcome",
            "content": "Start here.",
            "targetSelector": "#start",
            "position": "right",
            "order": 3
        }"##;
        let step: Step = serde_json::from_str(raw).expect("step decodes");
        assert_eq!(step.placement, Placement::Right);
        assert_eq!(step.selector, "#start");
        assert_eq!(step.order, 3);
    }

    #[test]
    fn unknown_match_type_survives_decode() {
        let raw = r#"{"urlMatchType": "glob", "urlPattern": "/app/*"}"#;
        let targeting: Targeting = serde_json::from_str(raw).expect("targeting decodes");
        assert_eq!(targeting.match_type, "glob");
        assert_eq!(MatchType::parse(&targeting.match_type), None);
        assert_eq!(targeting.trigger, TriggerType::Pageload);
        assert_eq!(targeting.frequency, Frequency::Always);
    }

    #[test]
    fn order_steps_tolerates_gaps_and_duplicates() {
        let mut steps = vec![
            step_with_order("b", 20),
            step_with_order("a", 5),
            step_with_order("c", 20),
        ];
        order_steps(&mut steps);
        let ids: Vec<&str> = steps.iter().map(|step| step.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    fn step_with_order(id: &str, order: u32) -> Step {
        Step {
            id: id.to_string(),
            title: String::new(),
            body: String::new(),
            selector: String::new(),
            placement: Placement::default(),
            order,
        }
    }
}
