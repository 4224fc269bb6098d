//! Three-step narrative of an analysed report.

use std::fmt::Write as _;

use medreport_core::{ActionPriority, AnalysisResult, Indicator, IndicatorStatus, ResultStep};

/// Printed after every analysis.
pub const DISCLAIMER: &str = "AI解读仅供参考，不能替代专业医生的诊断。如有不适，请及时就医。";

const RULE: &str = "────────────────────────────────────────";

const fn status_label(status: IndicatorStatus) -> &'static str {
    match status {
        IndicatorStatus::Normal => "正常",
        IndicatorStatus::Warning => "需注意",
        IndicatorStatus::Critical => "需重视",
    }
}

const fn priority_label(priority: ActionPriority) -> &'static str {
    match priority {
        ActionPriority::High => "重要",
        ActionPriority::Medium => "建议",
        ActionPriority::Low => "可选",
    }
}

fn heading(out: &mut String, step: ResultStep) {
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "第{}步  {}", step.number(), step.title());
    let _ = writeln!(out, "{RULE}");
}

fn indicator_block(out: &mut String, indicator: &Indicator) {
    let _ = writeln!(
        out,
        "【{}】{}  ({})",
        status_label(indicator.status),
        indicator.name,
        indicator.value
    );
    let _ = writeln!(out, "  生活化比喻：{}", indicator.metaphor);
    let _ = writeln!(out, "  医生说：{}", indicator.explanation);
}

/// Render the result as plain text, one section per [`ResultStep`].
#[must_use]
pub fn render_report(result: &AnalysisResult) -> String {
    let mut out = String::new();
    let attention = result.attention_indicators();
    let normal = result.normal_indicators();

    for step in ResultStep::ALL {
        heading(&mut out, step);
        match step {
            ResultStep::Overview => {
                let _ = writeln!(out, "健康综合评分：{}", result.clamped_score());
                let _ = writeln!(out, "{}", result.summary);
                let _ = writeln!(
                    out,
                    "总指标数 {}项，需关注项 {}项",
                    result.indicators.len(),
                    attention.len()
                );
            }
            ResultStep::Details => {
                if attention.is_empty() {
                    let _ = writeln!(out, "真棒！没有发现明显的异常指标。");
                }
                for indicator in &attention {
                    indicator_block(&mut out, indicator);
                }
                if !normal.is_empty() {
                    let _ = writeln!(out, "正常指标 ({})", normal.len());
                    for indicator in &normal {
                        let _ = writeln!(out, "  · {}  {}", indicator.name, indicator.value);
                    }
                }
            }
            ResultStep::Actions => {
                for (index, action) in result.prioritized_actions().iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "{}. [{}] {}",
                        index + 1,
                        priority_label(action.priority),
                        action.title
                    );
                    let _ = writeln!(out, "   {}", action.description);
                }
                let _ = writeln!(out);
                let _ = writeln!(out, "免责声明：{DISCLAIMER}");
            }
        }
        let _ = writeln!(out);
    }

    out
}

/// Print the rendered result to stdout.
pub fn print_report(result: &AnalysisResult) {
    print!("{}", render_report(result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use medreport_core::ActionItem;

    fn indicator(name: &str, status: IndicatorStatus) -> Indicator {
        Indicator {
            name: name.to_string(),
            value: "1.0".to_string(),
            status,
            metaphor: "像水管".to_string(),
            explanation: "注意休息".to_string(),
        }
    }

    fn sample() -> AnalysisResult {
        AnalysisResult {
            summary: "您的身体状况总体良好".to_string(),
            health_score: 130,
            indicators: vec![
                indicator("血糖", IndicatorStatus::Normal),
                indicator("血压", IndicatorStatus::Warning),
                indicator("肌酐", IndicatorStatus::Critical),
            ],
            action_plan: vec![
                ActionItem {
                    title: "多喝水".to_string(),
                    description: "每天八杯".to_string(),
                    priority: ActionPriority::Low,
                },
                ActionItem {
                    title: "复查肾功能".to_string(),
                    description: "一个月内".to_string(),
                    priority: ActionPriority::High,
                },
            ],
        }
    }

    #[test]
    fn test_render_has_three_steps_in_order() {
        let text = render_report(&sample());
        let positions: Vec<usize> = ResultStep::ALL
            .iter()
            .map(|step| text.find(step.title()).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.ends_with(&format!("免责声明：{DISCLAIMER}\n\n")));
    }

    #[test]
    fn test_render_clamps_score_and_counts() {
        let text = render_report(&sample());
        assert!(text.contains("健康综合评分：100"));
        assert!(text.contains("总指标数 3项，需关注项 2项"));
    }

    #[test]
    fn test_critical_before_warning_and_high_priority_first() {
        let text = render_report(&sample());
        assert!(text.find("【需重视】肌酐").unwrap() < text.find("【需注意】血压").unwrap());
        assert!(text.contains("1. [重要] 复查肾功能"));
        assert!(text.contains("2. [可选] 多喝水"));
    }

    #[test]
    fn test_all_normal_report_praises() {
        let mut result = sample();
        result.indicators = vec![indicator("血糖", IndicatorStatus::Normal)];
        let text = render_report(&result);
        assert!(text.contains("没有发现明显的异常指标"));
        assert!(text.contains("正常指标 (1)"));
    }
}
