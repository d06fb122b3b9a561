use super::open_project;
use crate::output::{cell, print_json, print_table};
use anyhow::Context;
use chrono::Utc;
use leadgen_core::report::PipelineReport;
use std::path::Path;

pub fn run(root: &Path, days: i64, json: bool) -> anyhow::Result<()> {
    let (_, store) = open_project(root)?;
    let report =
        PipelineReport::build(&store, Utc::now(), days).context("failed to build report")?;

    if json {
        return print_json(&report);
    }

    println!("Total companies: {}\n", report.total_companies);

    if !report.by_status.is_empty() {
        let rows = report
            .by_status
            .iter()
            .map(|s| vec![s.status.to_string(), s.count.to_string()])
            .collect();
        print_table(&["STATUS", "LEADS"], rows);
        println!();
    }

    if !report.by_industry.is_empty() {
        let rows = report
            .by_industry
            .iter()
            .map(|i| vec![cell(i.industry.as_deref()), i.count.to_string()])
            .collect();
        print_table(&["INDUSTRY", "COMPANIES"], rows);
        println!();
    }

    if report.upcoming.is_empty() {
        println!("No follow-ups due in the next {} days.", report.window_days);
        return Ok(());
    }
    println!(
        "Follow-ups due within {} days ({} overdue):",
        report.window_days,
        report.overdue().count()
    );
    let rows = report
        .upcoming
        .iter()
        .map(|u| {
            vec![
                u.next_action_date.format("%Y-%m-%d").to_string(),
                u.company_id.to_string(),
                u.company_name.clone(),
                u.status.to_string(),
                cell(u.next_action.as_deref()),
                cell(u.assigned_to.as_deref()),
            ]
        })
        .collect();
    print_table(
        &["DUE", "ID", "COMPANY", "STATUS", "ACTION", "ASSIGNED"],
        rows,
    );
    Ok(())
}
