use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use comfy_table::{Cell, Table};

use scheinpass_core::registry::CriteriaRegistry;
use scheinpass_core::summary::{
    CohortStores, CohortSummary, SummaryConfig, SummaryOutcome, SummaryService,
};
use scheinpass_report::{cohort_markdown, save_cohort_json};
use scheinpass_stores::{load_course, CourseData};

pub async fn execute(
    course: PathBuf,
    parallelism: usize,
    output: Option<PathBuf>,
    format: String,
) -> Result<()> {
    ensure!(parallelism >= 1, "parallelism must be at least 1");

    let formats: Vec<&str> = format.split(',').map(str::trim).collect();
    for f in &formats {
        ensure!(
            matches!(*f, "table" | "json" | "markdown"),
            "unknown format '{f}', expected table, json, or markdown"
        );
    }

    let data = load_course(&course)?;
    tracing::info!(
        course = %data.name,
        students = data.cohort.len(),
        "running cohort summary"
    );

    let registry = Arc::new(CriteriaRegistry::with_builtin_rules()?);
    let service = SummaryService::new(registry, SummaryConfig { parallelism });

    let stores = CohortStores {
        gradings: &data.store,
        criteria: &data.store,
        attendance: &data.store,
        presentations: &data.store,
    };
    let summary = service
        .summarize_cohort(&data.cohort, &data.course, &stores)
        .await?;

    for f in &formats {
        match *f {
            "table" => print_table(&data, &summary),
            "json" => match &output {
                Some(dir) => {
                    let path = dir.join("summary.json");
                    save_cohort_json(&summary, &path)?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&summary)?),
            },
            "markdown" => match &output {
                Some(dir) => {
                    let path = dir.join("summary.md");
                    std::fs::create_dir_all(dir)?;
                    std::fs::write(&path, cohort_markdown(&summary))
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => println!("{}", cohort_markdown(&summary)),
            },
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn print_table(data: &CourseData, summary: &CohortSummary) {
    let mut table = Table::new();
    table.set_header(vec!["Student", "Name", "Status", "Criteria passed"]);

    let mut entries: Vec<_> = summary.entries.iter().collect();
    entries.sort_by_key(|(id, _)| id.as_str());

    for (student_id, outcome) in entries {
        let name = data
            .student_names
            .get(student_id)
            .map(String::as_str)
            .unwrap_or("");
        match outcome {
            SummaryOutcome::Evaluated(student) => {
                let passed = student.criteria.iter().filter(|c| c.passed).count();
                table.add_row(vec![
                    Cell::new(student_id),
                    Cell::new(name),
                    Cell::new(if student.overall_passed {
                        "passed"
                    } else {
                        "not passed"
                    }),
                    Cell::new(format!("{passed} / {}", student.criteria.len())),
                ]);
            }
            SummaryOutcome::Unevaluable { reason } => {
                table.add_row(vec![
                    Cell::new(student_id),
                    Cell::new(name),
                    Cell::new("unevaluable"),
                    Cell::new(reason),
                ]);
            }
        }
    }

    println!("{table}");
    println!(
        "{} passed, {} not passed, {} unevaluable ({} ms)",
        summary.passed_count(),
        summary.failed_count(),
        summary.unevaluable_count(),
        summary.duration_ms
    );
}
