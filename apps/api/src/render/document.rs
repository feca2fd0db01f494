//! Report document model. One block list feeds both the markdown and the PDF renderer.

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::render::sections::{
    test_result_lines, BestField, CareerRecommendation, Certification, DisplayText, FuturePlans,
    Habit, Phase, Plan, Record, ReportView, ResultAnalysis, Roadmap, RoadmapPhase, SkillGap,
    SkillItem, SkillRecommendations, Strength, TextList, Weakness,
};

pub const REPORT_TITLE: &str = "Comprehensive Psychological Assessment Report";
pub const PLATFORM_NAME: &str = "AI-Powered Psychological Testing Platform";

const IMPORTANT_NOTES: [&str; 5] = [
    "This assessment is based on self-reported preferences and should be considered alongside other factors",
    "Results may change over time as you grow and develop new experiences",
    "Use these insights as a starting point for self-reflection and development",
    "Consider seeking professional guidance for major life or career decisions",
    "This tool is for educational and self-awareness purposes only",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStyle {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn regular(text: impl Into<String>) -> Self {
        Span { text: text.into(), style: SpanStyle::Regular }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Span { text: text.into(), style: SpanStyle::Bold }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Span { text: text.into(), style: SpanStyle::Italic }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Level 1 heading.
    Title(String),
    /// Level 2 heading.
    Section(String),
    /// Level 3 heading.
    Subsection(String),
    /// Level 4 heading.
    Heading(String),
    Paragraph(Vec<Span>),
    Bullet(Vec<Span>),
    Rule,
}

/// Builds the full report. `insights` is `None` when no AI insights were supplied.
pub fn build_document(
    test_results: &Map<String, Value>,
    insights: Option<&ReportView>,
    generated_at: NaiveDateTime,
) -> Vec<Block> {
    let mut doc = DocBuilder::default();

    doc.push(Block::Title(REPORT_TITLE.to_string()));
    doc.push(Block::Paragraph(vec![
        Span::bold("Report Generated: "),
        Span::regular(generated_at.format("%B %d, %Y").to_string()),
    ]));
    doc.push(Block::Paragraph(vec![
        Span::bold("Assessment Type: "),
        Span::regular("AI-Based Psychological Profile"),
    ]));
    doc.push(Block::Rule);

    if let Some(view) = insights {
        doc.push(Block::Section("AI-Powered Career Guidance".to_string()));
        doc.push(Block::Paragraph(vec![Span::italic(
            "Personalized recommendations based on your psychological assessment",
        )]));
        if let Some(best) = &view.best_field {
            doc.best_field(best);
        }
        doc.career_recommendations(&view.career_recommendations);
        if let Some(skills) = &view.skill_recommendations {
            doc.skill_recommendations(skills);
        }
        doc.skill_gaps(&view.skill_gaps);
        if let Some(roadmap) = &view.roadmap {
            doc.roadmap(roadmap);
        }
        if let Some(analysis) = &view.result_analysis {
            doc.result_analysis(analysis);
        }
        if let Some(plans) = &view.future_plans {
            doc.future_plans(plans);
        }
        doc.daily_habits(&view.daily_habits);
        doc.certifications(&view.certifications);
        doc.additional_insights(&view.additional_insights);
    }

    doc.push(Block::Section("Detailed Assessment Results".to_string()));
    for line in test_result_lines(test_results) {
        doc.push(Block::Subsection(line.name));
        doc.labeled("Result", line.value);
    }

    doc.push(Block::Rule);
    doc.push(Block::Section("Important Notes".to_string()));
    for note in IMPORTANT_NOTES {
        doc.push(Block::Bullet(vec![Span::regular(note)]));
    }
    doc.push(Block::Paragraph(vec![Span::italic(format!(
        "Report generated on {}",
        generated_at.format("%B %d, %Y at %I:%M %p")
    ))]));
    doc.push(Block::Paragraph(vec![Span::bold(PLATFORM_NAME)]));

    doc.blocks
}

#[derive(Default)]
struct DocBuilder {
    blocks: Vec<Block>,
}

impl DocBuilder {
    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// `**Label:** value`, skipped when the value is empty.
    fn labeled(&mut self, label: &str, value: impl AsRef<str>) {
        let value = value.as_ref();
        if value.is_empty() {
            return;
        }
        self.push(Block::Paragraph(vec![
            Span::bold(format!("{label}: ")),
            Span::regular(value),
        ]));
    }

    fn labeled_list(&mut self, label: &str, items: &TextList) {
        if !items.is_empty() {
            self.labeled(label, items.joined());
        }
    }

    /// Titled bullet list, skipped when empty.
    fn bullets(&mut self, label: &str, items: &TextList) {
        if items.is_empty() {
            return;
        }
        self.push(Block::Paragraph(vec![Span::bold(format!("{label}:"))]));
        for item in items.iter() {
            self.push(Block::Bullet(vec![Span::regular(item.as_str())]));
        }
    }

    fn best_field(&mut self, best: &BestField) {
        self.push(Block::Subsection("Best Career Field".to_string()));
        let field = if best.field.is_empty() { "N/A" } else { best.field.as_str() };
        self.push(Block::Paragraph(vec![Span::bold(field)]));
        if !best.match_percentage.is_empty() {
            self.push(Block::Paragraph(vec![Span::bold(format!(
                "Match Percentage: {}%",
                best.match_percentage.as_str().trim_end_matches('%')
            ))]));
        }
        self.labeled("Reasoning", best.reasoning.as_str());
        self.labeled("Opportunities in Gujarat", best.gujarat_opportunities.as_str());
        self.labeled("Indian Market Outlook", best.indian_market_outlook.as_str());
        self.labeled("Salary Expectations", best.salary_expectations.as_str());
        self.labeled_list("Recommended Companies", &best.specific_companies);
        self.labeled("Growth Potential", best.growth_potential.as_str());
        self.labeled("Entry Requirements", best.entry_requirements.as_str());
    }

    fn career_recommendations(&mut self, careers: &[Record<CareerRecommendation>]) {
        if careers.is_empty() {
            return;
        }
        self.push(Block::Subsection("Career Recommendations".to_string()));
        for (i, career) in careers.iter().enumerate() {
            let role = or_na(&career.job_role);
            self.push(Block::Heading(format!("{}. {role}", i + 1)));
            self.push(Block::Paragraph(vec![Span::italic(format!(
                "Industry: {}",
                or_na(&career.industry)
            ))]));
            self.labeled("Details", career.explanation.as_str());
            self.labeled("Salary Range", career.salary_range.as_str());
            self.labeled_list("Required Skills", &career.required_skills);
            self.labeled("Growth Potential", career.growth_potential.as_str());
            self.labeled_list("Companies in Gujarat", &career.gujarat_companies);
        }
    }

    fn skill_recommendations(&mut self, skills: &SkillRecommendations) {
        if skills.technical_skills.is_empty() && skills.soft_skills.is_empty() {
            return;
        }
        self.push(Block::Subsection("Skills & Learning Roadmap".to_string()));
        self.skill_list("Focus on Technical Skills", &skills.technical_skills);
        self.skill_list("Develop Soft Skills", &skills.soft_skills);
    }

    fn skill_list(&mut self, title: &str, items: &[SkillItem]) {
        if items.is_empty() {
            return;
        }
        self.push(Block::Heading(title.to_string()));
        for item in items {
            match item {
                SkillItem::Detailed(detail) => {
                    if detail.skill.is_empty() {
                        continue;
                    }
                    let mut spans = vec![Span::bold(detail.skill.as_str())];
                    if !detail.importance.is_empty() {
                        spans.push(Span::regular(format!(" ({})", detail.importance.as_str())));
                    }
                    if !detail.development_approach.is_empty() {
                        spans.push(Span::regular(format!(
                            " - {}",
                            detail.development_approach.as_str()
                        )));
                    }
                    if !detail.learning_resources.is_empty() {
                        spans.push(Span::regular(format!(
                            " - Resources: {}",
                            detail.learning_resources.joined()
                        )));
                    }
                    self.push(Block::Bullet(spans));
                }
                SkillItem::Plain(text) if !text.is_empty() => {
                    self.push(Block::Bullet(vec![Span::regular(text.as_str())]));
                }
                SkillItem::Plain(_) => {}
            }
        }
    }

    fn skill_gaps(&mut self, gaps: &[SkillGap]) {
        if gaps.is_empty() {
            return;
        }
        self.push(Block::Subsection("Skill Gaps".to_string()));
        for gap in gaps {
            match gap {
                SkillGap::Detailed(detail) if !detail.skill.is_empty() => {
                    let mut spans = vec![Span::bold(detail.skill.as_str())];
                    if !detail.current_level.is_empty() || !detail.target_level.is_empty() {
                        spans.push(Span::regular(format!(
                            " ({} -> {})",
                            or_na(&detail.current_level),
                            or_na(&detail.target_level)
                        )));
                    }
                    if !detail.bridging_plan.is_empty() {
                        spans.push(Span::regular(format!(": {}", detail.bridging_plan.as_str())));
                    }
                    self.push(Block::Bullet(spans));
                }
                SkillGap::Plain(text) if !text.is_empty() => {
                    self.push(Block::Bullet(vec![Span::regular(text.as_str())]));
                }
                _ => {}
            }
        }
    }

    fn roadmap(&mut self, roadmap: &Roadmap) {
        self.push(Block::Subsection("Learning Roadmap".to_string()));
        match &roadmap.short_term {
            Some(Phase::Structured(phase)) => {
                self.roadmap_phase("Short-Term Plan", "1-3 months", phase);
                self.bullets("Actions", &phase.specific_actions);
            }
            Some(Phase::Steps(steps)) => self.roadmap_steps("Short-Term Plan", "1-3 months", steps),
            None => {}
        }
        match &roadmap.mid_term {
            Some(Phase::Structured(phase)) => {
                self.roadmap_phase("Mid-Term Plan", "6-12 months", phase);
                self.bullets("Milestones", &phase.milestones);
            }
            Some(Phase::Steps(steps)) => self.roadmap_steps("Mid-Term Plan", "6-12 months", steps),
            None => {}
        }
        match &roadmap.long_term {
            Some(Phase::Structured(phase)) => {
                self.roadmap_phase("Long-Term Plan", "1-2 years", phase);
                self.labeled_list("Expertise Areas", &phase.expertise_areas);
                self.labeled(
                    "Entrepreneurship Opportunities",
                    phase.entrepreneurship_opportunities.as_str(),
                );
            }
            Some(Phase::Steps(steps)) => self.roadmap_steps("Long-Term Plan", "1-2 years", steps),
            None => {}
        }
    }

    fn roadmap_steps(&mut self, title: &str, duration: &str, steps: &TextList) {
        self.push(Block::Heading(format!("{title} ({duration})")));
        for step in steps.iter() {
            self.push(Block::Bullet(vec![Span::regular(step.as_str())]));
        }
    }

    fn roadmap_phase(&mut self, title: &str, default_duration: &str, phase: &RoadmapPhase) {
        let duration = if phase.duration.is_empty() {
            default_duration
        } else {
            phase.duration.as_str()
        };
        self.push(Block::Heading(format!("{title} ({duration})")));
        self.bullets("Goals", &phase.goals);
        self.labeled_list("Skills to Develop", &phase.skills_to_develop);
        self.labeled_list("Resources", &phase.resources);
    }

    fn result_analysis(&mut self, analysis: &ResultAnalysis) {
        if analysis.strengths.is_empty() && analysis.weaknesses.is_empty() {
            return;
        }
        self.push(Block::Subsection("Strengths & Areas for Improvement".to_string()));

        if !analysis.strengths.is_empty() {
            self.push(Block::Heading("Your Strengths".to_string()));
            for strength in &analysis.strengths {
                match strength {
                    Strength::Detailed(d) => self.detailed_entry(
                        &d.strength,
                        &d.reasoning,
                        "Career Application",
                        &d.career_application,
                    ),
                    Strength::Plain(text) => self.plain_bullet(text),
                }
            }
        }

        if !analysis.weaknesses.is_empty() {
            self.push(Block::Heading("Areas for Improvement".to_string()));
            for weakness in &analysis.weaknesses {
                match weakness {
                    Weakness::Detailed(d) => self.detailed_entry(
                        &d.weakness,
                        &d.reasoning,
                        "Improvement Strategy",
                        &d.improvement_strategy,
                    ),
                    Weakness::Plain(text) => self.plain_bullet(text),
                }
            }
        }
    }

    fn detailed_entry(
        &mut self,
        name: &DisplayText,
        reasoning: &DisplayText,
        note_label: &str,
        note: &DisplayText,
    ) {
        if name.is_empty() {
            return;
        }
        self.push(Block::Paragraph(vec![Span::bold(name.as_str())]));
        self.labeled("Reasoning", reasoning.as_str());
        if !note.is_empty() {
            self.push(Block::Paragraph(vec![Span::italic(format!(
                "{note_label}: {}",
                note.as_str()
            ))]));
        }
    }

    fn plain_bullet(&mut self, text: &DisplayText) {
        if !text.is_empty() {
            self.push(Block::Bullet(vec![Span::regular(text.as_str())]));
        }
    }

    fn future_plans(&mut self, plans: &FuturePlans) {
        if plans.three_year.is_none() && plans.five_year.is_none() && plans.ten_year.is_none() {
            return;
        }
        self.push(Block::Subsection("Future Growth Plans".to_string()));

        if let Some(plan) = &plans.three_year {
            self.push(Block::Heading("3-Year Plan".to_string()));
            match plan {
                Plan::Structured(d) => {
                    self.labeled("Expected Position", d.career_position.as_str());
                    self.labeled_list("Key Achievements", &d.key_achievements);
                }
                Plan::Text(text) => self.plain_paragraph(text),
            }
        }
        if let Some(plan) = &plans.five_year {
            self.push(Block::Heading("5-Year Plan".to_string()));
            match plan {
                Plan::Structured(d) => {
                    self.labeled("Senior Position", d.career_position.as_str());
                    self.labeled_list("Expertise Areas", &d.expertise_areas);
                }
                Plan::Text(text) => self.plain_paragraph(text),
            }
        }
        if let Some(plan) = &plans.ten_year {
            self.push(Block::Heading("10-Year Vision".to_string()));
            match plan {
                Plan::Structured(d) => {
                    self.labeled("Career Vision", d.career_vision.as_str());
                    self.labeled("Entrepreneurial Potential", d.entrepreneurial_potential.as_str());
                }
                Plan::Text(text) => self.plain_paragraph(text),
            }
        }
    }

    fn plain_paragraph(&mut self, text: &DisplayText) {
        if !text.is_empty() {
            self.push(Block::Paragraph(vec![Span::regular(text.as_str())]));
        }
    }

    fn daily_habits(&mut self, habits: &[Habit]) {
        if habits.is_empty() {
            return;
        }
        self.push(Block::Subsection("Daily Success Habits".to_string()));
        for habit in habits {
            match habit {
                Habit::Detailed(d) => {
                    if d.habit.is_empty() {
                        continue;
                    }
                    self.push(Block::Paragraph(vec![Span::bold(d.habit.as_str())]));
                    self.labeled("Purpose", d.purpose.as_str());
                    self.labeled("Implementation", d.implementation.as_str());
                }
                Habit::Plain(text) => self.plain_bullet(text),
            }
        }
    }

    fn certifications(&mut self, certifications: &[Certification]) {
        if certifications.is_empty() {
            return;
        }
        self.push(Block::Subsection("Recommended Certifications".to_string()));
        for cert in certifications {
            match cert {
                Certification::Detailed(d) => {
                    if d.name.is_empty() {
                        continue;
                    }
                    self.push(Block::Heading(d.name.as_str().to_string()));
                    if !d.provider.is_empty() {
                        self.push(Block::Paragraph(vec![Span::italic(format!(
                            "Provider: {}",
                            d.provider.as_str()
                        ))]));
                    }
                    self.labeled("Why Recommended", d.why_recommended.as_str());
                    self.labeled("Level", d.difficulty_level.as_str());
                    self.labeled("Duration", d.estimated_duration.as_str());
                    self.labeled("Enrollment", d.direct_enrollment_link.as_str());
                }
                Certification::Plain(text) => self.plain_bullet(text),
            }
        }
    }

    fn additional_insights(&mut self, insights: &[(String, DisplayText)]) {
        if insights.is_empty() {
            return;
        }
        self.push(Block::Subsection("Additional Insights".to_string()));
        for (key, text) in insights {
            if key.is_empty() {
                self.plain_paragraph(text);
            } else {
                self.labeled(&humanize_key(key), text.as_str());
            }
        }
    }
}

fn or_na(text: &DisplayText) -> &str {
    if text.is_empty() {
        "N/A"
    } else {
        text.as_str()
    }
}

/// `learning_style_tips` → `Learning Style Tips`.
fn humanize_key(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
