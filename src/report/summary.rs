//! Run summary report

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::{AnalysisRun, PipelineWarning};

/// Row counts of each stage of a run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub enrollment_rows: usize,
    pub course_rows: usize,
    pub students: usize,
    pub master_rows: usize,
    pub factors_present: usize,
    pub factors_missing: usize,
    pub warnings: usize,
}

impl RunSummary {
    pub fn from_run(run: &AnalysisRun) -> Self {
        let missing = run
            .warnings
            .iter()
            .find_map(|w| match w {
                PipelineWarning::MissingFactors { factors } => Some(factors.len()),
                _ => None,
            })
            .unwrap_or(0);
        let required = run.config.required_factors().len();

        Self {
            enrollment_rows: run.enrollment.height(),
            course_rows: run.courses.height(),
            students: run.summaries.len(),
            master_rows: run.master.height(),
            factors_present: required - missing,
            factors_missing: missing,
            warnings: run.warnings.len(),
        }
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Enrollment rows"),
            Cell::new(self.enrollment_rows),
        ]);
        table.add_row(vec![Cell::new("📚 Course rows"), Cell::new(self.course_rows)]);
        table.add_row(vec![Cell::new("🎓 Students"), Cell::new(self.students)]);
        table.add_row(vec![
            Cell::new("🔗 Master rows"),
            Cell::new(self.master_rows)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("✅ Factors present"),
            Cell::new(self.factors_present),
        ]);
        table.add_row(vec![
            Cell::new("❔ Factors missing"),
            Cell::new(self.factors_missing).fg(if self.factors_missing == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);
        table.add_row(vec![
            Cell::new("⚠️  Warnings"),
            Cell::new(self.warnings).fg(if self.warnings == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);

        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}
