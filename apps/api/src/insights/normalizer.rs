//! Result Normalizer: turns per-test answer data into a canonical, ordered result set.
//!
//! Two steps, both pure:
//! 1. `structure_screen_answers`: front-end screen ids (`mbtiScreen`, ...) → canonical test
//!    ids with `selected_option` / `test_type` attributes. Unknown keys pass through.
//! 2. `normalize_results`: any mapping → `NormalizedResultSet`, stringifying attribute values.

use serde_json::{Map, Value};
use tracing::warn;

/// Attribute name used when a test result is a bare scalar.
pub const SCALAR_ATTRIBUTE: &str = "Result";

/// The assessment screens the front end knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestCategory {
    Mbti,
    MultipleIntelligence,
    BigFive,
    Riasec,
    DecisionMaking,
    LifeSituation,
    LearningStyle,
}

impl TestCategory {
    pub const ALL: [TestCategory; 7] = [
        TestCategory::Mbti,
        TestCategory::MultipleIntelligence,
        TestCategory::BigFive,
        TestCategory::Riasec,
        TestCategory::DecisionMaking,
        TestCategory::LifeSituation,
        TestCategory::LearningStyle,
    ];

    pub fn screen_id(&self) -> &'static str {
        match self {
            TestCategory::Mbti => "mbtiScreen",
            TestCategory::MultipleIntelligence => "intelligenceScreen",
            TestCategory::BigFive => "bigFiveScreen",
            TestCategory::Riasec => "riasecScreen",
            TestCategory::DecisionMaking => "decisionScreen",
            TestCategory::LifeSituation => "lifeScreen",
            TestCategory::LearningStyle => "varkScreen",
        }
    }

    pub fn canonical_id(&self) -> &'static str {
        match self {
            TestCategory::Mbti => "mbti_test",
            TestCategory::MultipleIntelligence => "multiple_intelligence",
            TestCategory::BigFive => "big_five",
            TestCategory::Riasec => "riasec",
            TestCategory::DecisionMaking => "decision_making",
            TestCategory::LifeSituation => "life_situation",
            TestCategory::LearningStyle => "learning_style",
        }
    }

    /// Instrument name embedded in the prompt as `test_type`.
    pub fn test_type(&self) -> &'static str {
        match self {
            TestCategory::Mbti => "Myers-Briggs Type Indicator",
            TestCategory::MultipleIntelligence => "Multiple Intelligence Assessment",
            TestCategory::BigFive => "Big Five Personality Assessment",
            TestCategory::Riasec => "RIASEC Career Interest Inventory",
            TestCategory::DecisionMaking => "Decision Making Style Assessment",
            TestCategory::LifeSituation => "Life Situation Assessment",
            TestCategory::LearningStyle => "VARK Learning Style Assessment",
        }
    }

    /// Heading used by the rendered report.
    pub fn display_name(&self) -> &'static str {
        match self {
            TestCategory::Mbti => "MBTI Personality Type",
            TestCategory::MultipleIntelligence => "Multiple Intelligence",
            TestCategory::BigFive => "Big Five Personality",
            TestCategory::Riasec => "RIASEC Career Interest",
            TestCategory::DecisionMaking => "Decision Making Style",
            TestCategory::LifeSituation => "Life Priorities",
            TestCategory::LearningStyle => "VARK Learning Style",
        }
    }

    pub fn from_screen_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.screen_id() == id)
    }

    /// Accepts either a screen id or a canonical id.
    pub fn lookup(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.screen_id() == id || c.canonical_id() == id)
    }
}

/// One completed test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentResult {
    pub test_identifier: String,
    /// Attribute name → stringified value, in input order.
    pub attributes: Vec<(String, String)>,
}

/// Test id → result, keys unique, input order preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedResultSet {
    results: Vec<AssessmentResult>,
}

impl NormalizedResultSet {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssessmentResult> {
        self.results.iter()
    }
}

#[cfg(test)]
impl NormalizedResultSet {
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, test_identifier: &str) -> Option<&AssessmentResult> {
        self.results
            .iter()
            .find(|r| r.test_identifier == test_identifier)
    }
}

/// Maps recognized screen ids onto canonical test entries. Anything else is kept verbatim.
///
/// A canonical id supplied directly wins over the screen answer for the same test.
pub fn structure_screen_answers(raw: &Map<String, Value>) -> Map<String, Value> {
    let mut structured = Map::new();
    for (key, value) in raw {
        let Some(category) = TestCategory::from_screen_id(key) else {
            structured.insert(key.clone(), value.clone());
            continue;
        };

        let canonical_id = category.canonical_id();
        if raw.contains_key(canonical_id) {
            warn!("Ignoring screen answer {key}: {canonical_id} is already present");
            continue;
        }

        let mut entry = Map::new();
        entry.insert("selected_option".to_string(), value.clone());
        entry.insert(
            "test_type".to_string(),
            Value::String(category.test_type().to_string()),
        );
        structured.insert(canonical_id.to_string(), Value::Object(entry));
    }
    structured
}

/// Normalizes every entry; never drops one.
pub fn normalize_results(raw: &Map<String, Value>) -> NormalizedResultSet {
    let results = raw
        .iter()
        .map(|(test_identifier, value)| {
            let attributes = match value {
                Value::Object(fields) => fields
                    .iter()
                    .map(|(name, v)| (name.clone(), stringify(v)))
                    .collect(),
                scalar => vec![(SCALAR_ATTRIBUTE.to_string(), stringify(scalar))],
            };
            AssessmentResult {
                test_identifier: test_identifier.clone(),
                attributes,
            }
        })
        .collect();

    NormalizedResultSet { results }
}

/// Strings are taken as-is; everything else is rendered as compact JSON text.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
