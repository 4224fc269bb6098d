//! Report analysis domain types.
//!
//! These mirror the JSON document the analysis service is asked to return,
//! so field names serialize in camelCase.

use serde::{Deserialize, Serialize};

/// The interpreted content of one medical report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Short, warm narrative of the overall condition.
    pub summary: String,
    /// Overall score, nominally 0-100.
    pub health_score: i32,
    /// Individual findings.
    #[serde(default)]
    pub indicators: Vec<Indicator>,
    /// Recommended next steps.
    #[serde(default)]
    pub action_plan: Vec<ActionItem>,
}

impl AnalysisResult {
    /// Health score clamped to the 0-100 range.
    #[must_use]
    pub fn clamped_score(&self) -> u8 {
        // clamp guarantees the value fits
        u8::try_from(self.health_score.clamp(0, 100)).unwrap_or(0)
    }

    /// Indicators whose status is not normal, critical first.
    #[must_use]
    pub fn attention_indicators(&self) -> Vec<&Indicator> {
        let mut flagged: Vec<&Indicator> = self
            .indicators
            .iter()
            .filter(|i| i.status.needs_attention())
            .collect();
        flagged.sort_by_key(|i| std::cmp::Reverse(i.status.severity()));
        flagged
    }

    /// Indicators within the normal range.
    #[must_use]
    pub fn normal_indicators(&self) -> Vec<&Indicator> {
        self.indicators
            .iter()
            .filter(|i| !i.status.needs_attention())
            .collect()
    }

    /// Action items ordered high priority first, preserving order within a priority.
    #[must_use]
    pub fn prioritized_actions(&self) -> Vec<&ActionItem> {
        let mut actions: Vec<&ActionItem> = self.action_plan.iter().collect();
        actions.sort_by_key(|a| a.priority.rank());
        actions
    }

    /// True when the service found nothing to report (e.g. the image was not a report).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty() && self.action_plan.is_empty()
    }
}

/// A single finding from the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Indicator {
    /// Original medical term as printed on the report.
    pub name: String,
    /// Value found on the report.
    pub value: String,
    pub status: IndicatorStatus,
    /// Everyday-life metaphor for the term.
    pub metaphor: String,
    /// What the result means for the patient.
    pub explanation: String,
}

/// Classification of an indicator.
///
/// Unknown values from the service are read as [`IndicatorStatus::Normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum IndicatorStatus {
    Normal,
    Warning,
    Critical,
}

impl IndicatorStatus {
    /// Whether the finding should be shown before normal ones.
    #[must_use]
    pub const fn needs_attention(self) -> bool {
        !matches!(self, Self::Normal)
    }

    const fn severity(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Warning => 1,
            Self::Critical => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Critical => "critical",
        }
    }
}

impl From<String> for IndicatorStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "warning" => Self::Warning,
            "critical" => Self::Critical,
            _ => Self::Normal,
        }
    }
}

impl std::fmt::Display for IndicatorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recommended next step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub title: String,
    pub description: String,
    pub priority: ActionPriority,
}

/// Urgency of an action item. Unknown values are read as `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ActionPriority {
    High,
    Medium,
    Low,
}

impl ActionPriority {
    const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl From<String> for ActionPriority {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

impl std::fmt::Display for ActionPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The three steps of the guided result narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStep {
    /// Health score and summary (the part that can be read aloud).
    Overview = 1,
    /// Indicator-by-indicator explanation.
    Details = 2,
    /// Action plan.
    Actions = 3,
}

impl ResultStep {
    /// All steps in presentation order.
    pub const ALL: [Self; 3] = [Self::Overview, Self::Details, Self::Actions];

    /// Step number, starting at 1.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Overview => Some(Self::Details),
            Self::Details => Some(Self::Actions),
            Self::Actions => None,
        }
    }

    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Overview => None,
            Self::Details => Some(Self::Overview),
            Self::Actions => Some(Self::Details),
        }
    }

    /// Heading shown for the step.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Overview => "身体状况小结",
            Self::Details => "重点指标解读",
            Self::Actions => "下一步怎么做？",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> AnalysisResult {
        serde_json::from_str(
            r#"{
                "summary": "您的身体状况总体良好，只是血压稍微有点高。",
                "healthScore": 85,
                "indicators": [
                    {"name": "ALT", "value": "30", "status": "normal",
                     "metaphor": "肝脏的清洁工", "explanation": "正常"},
                    {"name": "Systolic Blood Pressure", "value": "145", "status": "warning",
                     "metaphor": "水管里的水压", "explanation": "偏高"},
                    {"name": "Glucose", "value": "11.2", "status": "critical",
                     "metaphor": "血里的糖", "explanation": "明显偏高"}
                ],
                "actionPlan": [
                    {"title": "散步", "description": "晚饭后散步20分钟", "priority": "low"},
                    {"title": "复查血糖", "description": "一周内去医院", "priority": "high"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn deserializes_camel_case_document() {
        let result = sample_result();
        assert_eq!(result.health_score, 85);
        assert_eq!(result.indicators.len(), 3);
        assert_eq!(result.indicators[1].status, IndicatorStatus::Warning);
        assert_eq!(result.action_plan[1].priority, ActionPriority::High);
    }

    #[test]
    fn attention_indicators_put_critical_first() {
        let result = sample_result();
        let flagged: Vec<&str> = result
            .attention_indicators()
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(flagged, ["Glucose", "Systolic Blood Pressure"]);
        assert_eq!(result.normal_indicators().len(), 1);
    }

    #[test]
    fn prioritized_actions_sorts_high_first() {
        let result = sample_result();
        let titles: Vec<&str> = result
            .prioritized_actions()
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        assert_eq!(titles, ["复查血糖", "散步"]);
    }

    #[test]
    fn unknown_status_and_priority_fall_back() {
        let indicator: Indicator = serde_json::from_str(
            r#"{"name":"X","value":"1","status":"Borderline","metaphor":"","explanation":""}"#,
        )
        .unwrap();
        assert_eq!(indicator.status, IndicatorStatus::Normal);

        let action: ActionItem =
            serde_json::from_str(r#"{"title":"t","description":"d","priority":"urgent"}"#)
                .unwrap();
        assert_eq!(action.priority, ActionPriority::Medium);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"summary":"这不是医疗报告。","healthScore":0}"#).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn clamped_score_stays_in_range() {
        let mut result = sample_result();
        result.health_score = 140;
        assert_eq!(result.clamped_score(), 100);
        result.health_score = -3;
        assert_eq!(result.clamped_score(), 0);
    }

    #[test]
    fn result_steps_navigate_in_order() {
        assert_eq!(ResultStep::Overview.next(), Some(ResultStep::Details));
        assert_eq!(ResultStep::Actions.next(), None);
        assert_eq!(ResultStep::Overview.previous(), None);
        assert_eq!(ResultStep::Actions.previous(), Some(ResultStep::Details));
        assert_eq!(ResultStep::Details.number(), 2);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&IndicatorStatus::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
    }
}
