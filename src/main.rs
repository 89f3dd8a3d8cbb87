//! ipklens: Student Records Analysis CLI Tool
//!
//! Loads a student-records workbook and reports descriptive tables, Spearman
//! correlations and linear regressions of survey factors against IPK.

use std::io::IsTerminal;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use ipklens::cli::{select_groups, Cli, Commands};
use ipklens::pipeline::{AnalysisConfig, AnalysisRun, FactorGroup};
use ipklens::report::{
    coefficient_table, cohort_table, correlation_table, export_report, export_tables,
    metric_table, print_table, status_table, trend_table, AnalysisReport, DescriptiveSection,
    RegressionEntry, RunSummary, StatusBreakdown,
};
use ipklens::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_failure, print_info, print_step_header, print_step_time, print_success,
    print_warnings,
};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AnalysisConfig::default();

    if let Some(Commands::Groups) = &cli.command {
        print_groups(&config);
        return Ok(());
    }

    let input = cli
        .input()
        .ok_or_else(|| anyhow::anyhow!("Input file is required. Use -i/--input to specify a file."))?
        .clone();
    let output_path = cli.output_path();

    let interactive = cli.groups.is_empty() && !cli.no_confirm && std::io::stdin().is_terminal();
    let groups: Vec<FactorGroup> = if interactive {
        select_groups(&config)?
    } else {
        cli.selected_groups(&config)?
    }
    .into_iter()
    .cloned()
    .collect();
    let regression_config = cli.regression_config();

    print_banner(env!("CARGO_PKG_VERSION"));
    let group_names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    print_config(
        &input,
        output_path.as_deref(),
        &group_names,
        regression_config.seed,
        regression_config.test_fraction,
    );

    // Step 1: Load workbook and build derived tables
    print_step_header(1, "Load & Prepare");
    let step_start = Instant::now();
    let spinner = create_spinner("Loading workbook...");
    let run = match AnalysisRun::from_path(&input, config) {
        Ok(run) => run,
        Err(err) => {
            finish_with_warning(&spinner, "Loading failed");
            return Err(err);
        }
    };
    finish_with_success(&spinner, "Workbook loaded");
    print_warnings(&run.warnings);
    let summary = RunSummary::from_run(&run);
    summary.display();
    print_step_time(step_start.elapsed());

    // Step 2: Descriptive tables
    print_step_header(2, "Descriptive Statistics");
    let cohort_counts = run.cohort_counts();
    let mean_ipk = run.mean_ipk_by_cohort();
    print_table("Students and mean IPK per cohort", &cohort_table(&cohort_counts, &mean_ipk));

    let trend = run.ips_trend(cli.trend_cohorts());
    print_table("Mean IPS per semester and cohort", &trend_table(&trend));

    let status_distribution = match cli.cohort.or_else(|| run.latest_cohort()) {
        Some(cohort) => {
            let shares = run.status_distribution(cohort);
            print_table(
                &format!("Graduation status, cohort {}", cohort),
                &status_table(&shares),
            );
            Some(StatusBreakdown { cohort, shares })
        }
        None => {
            print_info("No cohort information; status distribution skipped");
            None
        }
    };

    // Step 3: Spearman correlation
    print_step_header(3, "Spearman Correlation");
    let mut correlations = Vec::with_capacity(groups.len());
    for group in &groups {
        let report = run.correlation(group)?;
        print_table(&group.name, &correlation_table(&report));
        correlations.push(report);
    }

    // Step 4: Linear regression; a failed group does not stop the others
    print_step_header(4, "Multiple Linear Regression");
    let mut regressions = Vec::with_capacity(groups.len());
    for group in &groups {
        match run.regression(group, &regression_config) {
            Ok(report) => {
                print_table(&format!("{}: coefficients", group.name), &coefficient_table(&report));
                print_table(&format!("{}: evaluation", group.name), &metric_table(&report));
                regressions.push(RegressionEntry {
                    group: group.name.clone(),
                    result: Some(report),
                    error: None,
                });
            }
            Err(err) => {
                println!();
                print_failure(&err.to_string());
                regressions.push(RegressionEntry {
                    group: group.name.clone(),
                    result: None,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    // Step 5: Export
    if output_path.is_some() || cli.export_tables.is_some() {
        print_step_header(5, "Export");
    }
    if let Some(path) = &output_path {
        let report = AnalysisReport::new(
            &run,
            &input,
            regression_config,
            DescriptiveSection {
                cohort_counts,
                mean_ipk_by_cohort: mean_ipk,
                ips_trend: trend,
                status_distribution,
            },
            correlations,
            regressions,
        );
        export_report(&report, path)?;
        print_success(&format!("Report saved to {}", path.display()));
    }
    if let Some(dir) = &cli.export_tables {
        let written = export_tables(&run, dir)?;
        for path in written {
            print_success(&format!("Table saved to {}", path.display()));
        }
    }

    print_completion();
    Ok(())
}

fn print_groups(config: &AnalysisConfig) {
    for group in &config.factor_groups {
        println!();
        println!(
            "{} {}",
            style(&group.name).cyan().bold(),
            style(format!("({} factors)", group.factors.len())).dim()
        );
        for factor in &group.factors {
            println!("  {} {}", style("•").dim(), factor);
        }
    }
}
