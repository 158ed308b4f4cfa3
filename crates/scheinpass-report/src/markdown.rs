//! Markdown rendering of student and cohort summaries.

use scheinpass_core::criteria::{CriterionSummary, ThresholdUnit};
use scheinpass_core::summary::{CohortSummary, StudentSummary, SummaryOutcome};

// Free-text cells would break the table row on a literal pipe.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn verdict(passed: bool) -> &'static str {
    if passed {
        "passed"
    } else {
        "not passed"
    }
}

fn format_needed(criterion: &CriterionSummary) -> String {
    match criterion.unit {
        ThresholdUnit::Percentage => format!("{:.0}%", criterion.needed * 100.0),
        ThresholdUnit::Absolute => format!("{:.1}", criterion.needed),
    }
}

fn format_achieved(criterion: &CriterionSummary) -> String {
    match criterion.total {
        Some(total) => format!("{:.1} / {:.1}", criterion.achieved, total),
        None => format!("{:.1}", criterion.achieved),
    }
}

/// Renders one student's summary as a markdown section.
pub fn student_summary_markdown(summary: &StudentSummary) -> String {
    let mut md = String::new();

    md.push_str(&format!(
        "## {} — {}\n\n",
        summary.student_id,
        verdict(summary.overall_passed)
    ));

    if summary.criteria.is_empty() {
        md.push_str("No criteria configured.\n");
        return md;
    }

    md.push_str("| Criterion | Achieved | Needed | Verdict |\n");
    md.push_str("|-----------|----------|--------|--------|\n");
    for criterion in &summary.criteria {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            criterion.identifier,
            format_achieved(criterion),
            format_needed(criterion),
            verdict(criterion.passed)
        ));
    }

    md
}

/// Renders a whole cohort run as a markdown document.
///
/// Rows are sorted by student id for stable output; the entry map itself
/// carries no ordering guarantee.
pub fn cohort_markdown(summary: &CohortSummary) -> String {
    let mut md = String::new();

    md.push_str("# Schein summary\n\n");
    md.push_str(&format!(
        "Run {} — {}\n\n",
        summary.run_id,
        summary.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!(
        "**{} passed, {} not passed, {} unevaluable**\n\n",
        summary.passed_count(),
        summary.failed_count(),
        summary.unevaluable_count()
    ));

    md.push_str("| Student | Status | Criteria passed |\n");
    md.push_str("|---------|--------|-----------------|\n");

    let mut entries: Vec<(&String, &SummaryOutcome)> = summary.entries.iter().collect();
    entries.sort_by_key(|(id, _)| id.as_str());

    for (student_id, outcome) in entries {
        match outcome {
            SummaryOutcome::Evaluated(student) => {
                let passed = student.criteria.iter().filter(|c| c.passed).count();
                md.push_str(&format!(
                    "| {} | {} | {} / {} |\n",
                    student_id,
                    verdict(student.overall_passed),
                    passed,
                    student.criteria.len()
                ));
            }
            SummaryOutcome::Unevaluable { reason } => {
                md.push_str(&format!(
                    "| {student_id} | unevaluable | {} |\n",
                    escape_cell(reason)
                ));
            }
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;

    fn criterion(identifier: &str, passed: bool) -> CriterionSummary {
        CriterionSummary {
            criterion_id: format!("{identifier}-1"),
            identifier: identifier.into(),
            passed,
            achieved: 8.0,
            needed: 0.8,
            total: Some(10.0),
            unit: ThresholdUnit::Percentage,
        }
    }

    fn student(id: &str, passed: bool) -> StudentSummary {
        StudentSummary {
            student_id: id.into(),
            overall_passed: passed,
            criteria: vec![criterion("attendance", passed)],
        }
    }

    #[test]
    fn student_markdown_lists_criteria() {
        let md = student_summary_markdown(&student("alice", true));
        assert!(md.contains("## alice — passed"));
        assert!(md.contains("| attendance | 8.0 / 10.0 | 80% | passed |"));
    }

    #[test]
    fn student_without_criteria() {
        let summary = StudentSummary {
            student_id: "bob".into(),
            overall_passed: true,
            criteria: vec![],
        };
        let md = student_summary_markdown(&summary);
        assert!(md.contains("No criteria configured."));
    }

    #[test]
    fn unevaluable_reason_escapes_pipes() {
        let mut entries = HashMap::new();
        entries.insert(
            "bob".to_string(),
            SummaryOutcome::Unevaluable {
                reason: "invalid grading data: at least one of 'points' | 'sub_exercise_points'"
                    .into(),
            },
        );

        let cohort = CohortSummary {
            run_id: Uuid::nil(),
            created_at: Utc::now(),
            entries,
            duration_ms: 1,
        };

        let md = cohort_markdown(&cohort);
        assert!(md.contains("'points' \\| 'sub_exercise_points'"));

        // Still a three-cell row: only the two separators between cells.
        let row = md.lines().find(|l| l.contains("bob")).unwrap();
        assert_eq!(row.matches(" | ").count(), 2);
    }

    #[test]
    fn cohort_markdown_sorted_with_totals() {
        let mut entries = HashMap::new();
        entries.insert(
            "zoe".to_string(),
            SummaryOutcome::Evaluated(student("zoe", false)),
        );
        entries.insert(
            "alice".to_string(),
            SummaryOutcome::Evaluated(student("alice", true)),
        );
        entries.insert(
            "bob".to_string(),
            SummaryOutcome::Unevaluable {
                reason: "invalid grading data".into(),
            },
        );

        let cohort = CohortSummary {
            run_id: Uuid::nil(),
            created_at: Utc::now(),
            entries,
            duration_ms: 3,
        };

        let md = cohort_markdown(&cohort);
        assert!(md.contains("**1 passed, 1 not passed, 1 unevaluable**"));

        let alice = md.find("| alice |").unwrap();
        let bob = md.find("| bob | unevaluable |").unwrap();
        let zoe = md.find("| zoe |").unwrap();
        assert!(alice < bob && bob < zoe);
    }
}
