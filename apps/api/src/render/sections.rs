//! Typed view of an insights object for rendering.
//!
//! Shape decisions are made once, here. Every nested field that the model may author as
//! either an object or plain text is an `#[serde(untagged)]` enum; every list accepts a
//! single value too. Structs are only ever read from JSON objects (`Record`), never
//! positionally from arrays. A section that still fails to decode is skipped with a warning so
//! rendering never fails on model-authored content.

use std::ops::Deref;

use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::insights::normalizer::{stringify, TestCategory};

/// Collapses newlines, tabs and repeated spaces into single spaces.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Leaf types
// ────────────────────────────────────────────────────────────────────────────

/// Any JSON value flattened to cleaned display text. `null` becomes empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayText(String);

impl DisplayText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => DisplayText::default(),
            other => DisplayText(clean_text(&stringify(other))),
        }
    }
}

impl<'de> Deserialize<'de> for DisplayText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(DisplayText::from_value(&value))
    }
}

/// A list of display strings. A bare scalar is read as a one-item list; empty items are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextList(pub Vec<DisplayText>);

impl TextList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayText> {
        self.0.iter()
    }

    pub fn joined(&self) -> String {
        self.0
            .iter()
            .map(DisplayText::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl<'de> Deserialize<'de> for TextList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = match Value::deserialize(deserializer)? {
            Value::Array(items) => items.iter().map(DisplayText::from_value).collect(),
            Value::Null => Vec::new(),
            other => vec![DisplayText::from_value(&other)],
        };
        Ok(TextList(items.into_iter().filter(|t| !t.is_empty()).collect()))
    }
}

/// A JSON object decoded into `T` by field name. Arrays and scalars are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record<T>(pub T);

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Record<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        serde_json::from_value(Value::Object(fields))
            .map(Record)
            .map_err(D::Error::custom)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Required sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BestField {
    pub field: DisplayText,
    pub reasoning: DisplayText,
    pub match_percentage: DisplayText,
    pub gujarat_opportunities: DisplayText,
    pub indian_market_outlook: DisplayText,
    pub specific_companies: TextList,
    pub salary_expectations: DisplayText,
    pub growth_potential: DisplayText,
    pub entry_requirements: DisplayText,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CareerRecommendation {
    pub job_role: DisplayText,
    pub industry: DisplayText,
    pub explanation: DisplayText,
    pub growth_potential: DisplayText,
    pub salary_range: DisplayText,
    pub gujarat_companies: TextList,
    pub required_skills: TextList,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoadmapPhase {
    pub duration: DisplayText,
    pub goals: TextList,
    pub skills_to_develop: TextList,
    pub resources: TextList,
    pub specific_actions: TextList,
    pub milestones: TextList,
    pub expertise_areas: TextList,
    pub entrepreneurship_opportunities: DisplayText,
}

/// A roadmap phase is either structured fields or a bare list of steps.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Phase {
    Structured(Record<RoadmapPhase>),
    Steps(TextList),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Roadmap {
    pub short_term: Option<Phase>,
    pub mid_term: Option<Phase>,
    pub long_term: Option<Phase>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StrengthDetail {
    pub strength: DisplayText,
    pub reasoning: DisplayText,
    pub career_application: DisplayText,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Strength {
    Detailed(Record<StrengthDetail>),
    Plain(DisplayText),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WeaknessDetail {
    pub weakness: DisplayText,
    pub reasoning: DisplayText,
    pub improvement_strategy: DisplayText,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Weakness {
    Detailed(Record<WeaknessDetail>),
    Plain(DisplayText),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResultAnalysis {
    pub strengths: Vec<Strength>,
    pub weaknesses: Vec<Weakness>,
}

// ────────────────────────────────────────────────────────────────────────────
// Optional sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SkillDetail {
    pub skill: DisplayText,
    pub importance: DisplayText,
    pub learning_resources: TextList,
    pub development_approach: DisplayText,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillItem {
    Detailed(Record<SkillDetail>),
    Plain(DisplayText),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SkillRecommendations {
    pub technical_skills: Vec<SkillItem>,
    pub soft_skills: Vec<SkillItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SkillGapDetail {
    pub skill: DisplayText,
    pub current_level: DisplayText,
    pub target_level: DisplayText,
    pub bridging_plan: DisplayText,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SkillGap {
    Detailed(Record<SkillGapDetail>),
    Plain(DisplayText),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlanDetail {
    pub career_position: DisplayText,
    pub key_achievements: TextList,
    pub expertise_areas: TextList,
    pub career_vision: DisplayText,
    pub entrepreneurial_potential: DisplayText,
}

/// A future plan is either structured fields or a free-text paragraph.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Plan {
    Structured(Record<PlanDetail>),
    Text(DisplayText),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FuturePlans {
    #[serde(rename = "3_year_plan")]
    pub three_year: Option<Plan>,
    #[serde(rename = "5_year_plan")]
    pub five_year: Option<Plan>,
    #[serde(rename = "10_year_plan")]
    pub ten_year: Option<Plan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HabitDetail {
    pub habit: DisplayText,
    pub purpose: DisplayText,
    pub implementation: DisplayText,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Habit {
    Detailed(Record<HabitDetail>),
    Plain(DisplayText),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CertificationDetail {
    pub name: DisplayText,
    pub provider: DisplayText,
    pub why_recommended: DisplayText,
    pub difficulty_level: DisplayText,
    pub estimated_duration: DisplayText,
    pub direct_enrollment_link: DisplayText,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Certification {
    Detailed(Record<CertificationDetail>),
    Plain(DisplayText),
}

// ────────────────────────────────────────────────────────────────────────────
// Report view
// ────────────────────────────────────────────────────────────────────────────

/// Everything the renderers need from an insights object. Absent sections are empty.
#[derive(Debug, Clone, Default)]
pub struct ReportView {
    pub best_field: Option<BestField>,
    pub career_recommendations: Vec<Record<CareerRecommendation>>,
    pub skill_recommendations: Option<SkillRecommendations>,
    pub skill_gaps: Vec<SkillGap>,
    pub roadmap: Option<Roadmap>,
    pub result_analysis: Option<ResultAnalysis>,
    pub future_plans: Option<FuturePlans>,
    pub daily_habits: Vec<Habit>,
    pub certifications: Vec<Certification>,
    /// Free-form key → text pairs, in model order.
    pub additional_insights: Vec<(String, DisplayText)>,
}

impl ReportView {
    /// Builds the view from any JSON value. Non-objects yield an empty view.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            warn!("Insights payload is not an object; rendering without AI sections");
            return ReportView::default();
        };

        ReportView {
            best_field: section(map, "best_field"),
            career_recommendations: list_section(map, "career_recommendations"),
            skill_recommendations: section(map, "skill_recommendations"),
            skill_gaps: list_section(map, "skill_gaps"),
            roadmap: section(map, "roadmap"),
            result_analysis: section(map, "result_analysis"),
            future_plans: section(map, "future_plans"),
            daily_habits: list_section(map, "daily_habits"),
            certifications: list_section(map, "certifications"),
            additional_insights: key_value_section(map, "additional_insights"),
        }
    }
}

fn section<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key)?;
    match serde_json::from_value::<Record<T>>(value.clone()) {
        Ok(Record(section)) => Some(section),
        Err(e) => {
            warn!("Skipping section '{key}' with unexpected shape: {e}");
            None
        }
    }
}

/// Decodes items one by one so a single odd item does not hide the rest.
fn list_section<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Vec<T> {
    let items = match map.get(key) {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::Null) | None => return Vec::new(),
        Some(single) => vec![single.clone()],
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping item in '{key}': {e}");
                None
            }
        })
        .collect()
}

fn key_value_section(map: &Map<String, Value>, key: &str) -> Vec<(String, DisplayText)> {
    match map.get(key) {
        Some(Value::Object(fields)) => fields
            .iter()
            .map(|(k, v)| (k.clone(), DisplayText::from_value(v)))
            .filter(|(_, v)| !v.is_empty())
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            let text = DisplayText::from_value(other);
            if text.is_empty() {
                Vec::new()
            } else {
                vec![(String::new(), text)]
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Raw test results
// ────────────────────────────────────────────────────────────────────────────

/// One line of the "detailed results" section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResultLine {
    pub name: String,
    pub value: String,
}

/// Display lines for the raw answers, in input order. Empty results are skipped.
pub fn test_result_lines(test_results: &Map<String, Value>) -> Vec<TestResultLine> {
    test_results
        .iter()
        .filter_map(|(id, value)| {
            let value = describe_result(value);
            if value.is_empty() {
                return None;
            }
            let name = TestCategory::lookup(id)
                .map(|c| c.display_name().to_string())
                .unwrap_or_else(|| id.clone());
            Some(TestResultLine { name, value })
        })
        .collect()
}

fn describe_result(value: &Value) -> String {
    match value {
        Value::Object(fields) => match fields.get("selected_option") {
            Some(selected) => DisplayText::from_value(selected).0,
            None => fields
                .iter()
                .map(|(k, v)| format!("{k}: {}", DisplayText::from_value(v).as_str()))
                .collect::<Vec<_>>()
                .join("; "),
        },
        other => DisplayText::from_value(other).0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a\n\tb   c\r\n"), "a b c");
    }

    #[test]
    fn test_plan_variants_decided_by_shape() {
        let view = ReportView::from_value(&json!({
            "future_plans": {
                "3_year_plan": {"career_position": "Lead Analyst", "key_achievements": ["A", "B"]},
                "5_year_plan": "Run a small consultancy"
            }
        }));
        let plans = view.future_plans.unwrap();
        match plans.three_year.unwrap() {
            Plan::Structured(detail) => {
                assert_eq!(detail.career_position.as_str(), "Lead Analyst");
                assert_eq!(detail.key_achievements.joined(), "A, B");
            }
            other => panic!("expected structured plan, got {other:?}"),
        }
        assert!(matches!(plans.five_year, Some(Plan::Text(ref t)) if t.as_str() == "Run a small consultancy"));
        assert!(plans.ten_year.is_none());
    }

    #[test]
    fn test_skill_items_accept_objects_and_strings() {
        let view = ReportView::from_value(&json!({
            "skill_recommendations": {
                "technical_skills": [{"skill": "SQL", "importance": "High"}, "Python"]
            }
        }));
        let skills = view.skill_recommendations.unwrap();
        assert_eq!(skills.technical_skills.len(), 2);
        assert!(matches!(&skills.technical_skills[0], SkillItem::Detailed(d) if d.skill.as_str() == "SQL"));
        assert!(matches!(&skills.technical_skills[1], SkillItem::Plain(t) if t.as_str() == "Python"));
        assert!(skills.soft_skills.is_empty());
    }

    #[test]
    fn test_text_list_accepts_single_values() {
        let view = ReportView::from_value(&json!({
            "best_field": {"field": "Data Science", "specific_companies": "TCS", "match_percentage": 92}
        }));
        let best = view.best_field.unwrap();
        assert_eq!(best.specific_companies.joined(), "TCS");
        assert_eq!(best.match_percentage.as_str(), "92");
        assert!(best.reasoning.is_empty());
    }

    #[test]
    fn test_missing_optional_sections_are_empty() {
        let view = ReportView::from_value(&json!({
            "best_field": {}, "roadmap": {}, "result_analysis": {}, "career_recommendations": []
        }));
        assert!(view.skill_recommendations.is_none());
        assert!(view.daily_habits.is_empty());
        assert!(view.certifications.is_empty());
        assert!(view.additional_insights.is_empty());
    }

    #[test]
    fn test_odd_shapes_do_not_fail() {
        let view = ReportView::from_value(&json!({
            "best_field": "just text",
            "career_recommendations": [{"job_role": "Analyst"}, 7, null],
            "roadmap": [1, 2],
            "daily_habits": "Read daily"
        }));
        assert!(view.best_field.is_none());
        assert!(view.roadmap.is_none());
        assert_eq!(view.career_recommendations.len(), 1);
        assert_eq!(view.daily_habits.len(), 1);
    }

    #[test]
    fn test_list_shaped_roadmap_phase_is_read_as_steps() {
        let view = ReportView::from_value(&json!({
            "roadmap": {
                "short_term": ["Complete foundational courses", "Build a portfolio", "Join communities"],
                "mid_term": {"duration": "6 months", "goals": ["Ship a project"]}
            }
        }));
        let roadmap = view.roadmap.unwrap();
        match roadmap.short_term.unwrap() {
            Phase::Steps(steps) => assert_eq!(
                steps.joined(),
                "Complete foundational courses, Build a portfolio, Join communities"
            ),
            other => panic!("expected steps, got {other:?}"),
        }
        match roadmap.mid_term.unwrap() {
            Phase::Structured(phase) => {
                assert_eq!(phase.duration.as_str(), "6 months");
                assert_eq!(phase.goals.joined(), "Ship a project");
            }
            other => panic!("expected structured phase, got {other:?}"),
        }
    }

    #[test]
    fn test_array_items_never_fill_struct_fields() {
        let view = ReportView::from_value(&json!({
            "career_recommendations": [["Data Analyst", "IT"], {"job_role": "Researcher"}],
            "daily_habits": [["Read", "Learn", "Daily"]],
            "best_field": ["Data Science", "Strong analytics"]
        }));
        assert_eq!(view.career_recommendations.len(), 1);
        assert_eq!(view.career_recommendations[0].job_role.as_str(), "Researcher");
        assert!(matches!(&view.daily_habits[0], Habit::Plain(t) if t.as_str() == "[\"Read\",\"Learn\",\"Daily\"]"));
        assert!(view.best_field.is_none());
    }

    #[test]
    fn test_non_object_payload_gives_empty_view() {
        let view = ReportView::from_value(&json!("nothing"));
        assert!(view.best_field.is_none());
    }

    #[test]
    fn test_additional_insights_keep_model_order() {
        let view = ReportView::from_value(&json!({
            "additional_insights": {"work_environment": "Quiet", "learning_style_tips": "Diagrams", "empty": ""}
        }));
        let keys: Vec<_> = view.additional_insights.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["work_environment", "learning_style_tips"]);
    }

    #[test]
    fn test_test_result_lines_use_display_names() {
        let results = json!({
            "mbtiScreen": "I recharge alone",
            "riasec": {"selected_option": "Building things", "test_type": "RIASEC"},
            "custom": {"score": 4},
            "lifeScreen": null
        });
        let lines = test_result_lines(results.as_object().unwrap());
        assert_eq!(
            lines,
            vec![
                TestResultLine { name: "MBTI Personality Type".into(), value: "I recharge alone".into() },
                TestResultLine { name: "RIASEC Career Interest".into(), value: "Building things".into() },
                TestResultLine { name: "custom".into(), value: "score: 4".into() },
            ]
        );
    }
}
