use crate::model::{share, AggregatedStat, AuthorEntry, Settings, StatsOutput, Totals, SCHEMA_VERSION};
use anyhow::Result;
use chrono::Utc;
use console::style;
use std::fmt::Write as _;
use std::path::Path;

pub fn build_output(view: &[AggregatedStat], settings: &Settings, pathspec: &[String]) -> StatsOutput {
    StatsOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        repository_path: settings
            .repo
            .as_deref()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default(),
        pathspec: pathspec.to_vec(),
        sort_by: settings.sort_by,
        limit: (settings.count_limitation_enabled && settings.count_limitation > 0)
            .then_some(settings.count_limitation),
        totals: Totals::of(view),
        entries: view.iter().map(AuthorEntry::from).collect(),
    }
}

pub fn output_json(view: &[AggregatedStat], settings: &Settings, pathspec: &[String]) -> Result<()> {
    let output = build_output(view, settings, pathspec);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn output_ndjson(view: &[AggregatedStat]) -> Result<()> {
    for stat in view {
        println!("{}", serde_json::to_string(&AuthorEntry::from(stat))?);
    }
    Ok(())
}

/// `value` padded to the width of `total`, followed by its share.
fn cell(value: u64, total: u64) -> String {
    let width = total.to_string().len();
    let percent = format!("({}%)", share(value, total));
    format!("{value:<width$}{percent:>7}")
}

pub fn render_table(view: &[AggregatedStat]) -> String {
    let totals = Totals::of(view);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<30} {:>14} {:>16} {:>16} {:>16} {:>16}",
        style("Author").bold(),
        style("Commits").bold(),
        style("Files Changed").bold(),
        style("Insertions").bold(),
        style("Deletions").bold(),
        style("Lines Changed").bold()
    );
    let _ = writeln!(out, "{}", "─".repeat(113));
    for stat in view {
        let _ = writeln!(
            out,
            "{:<30} {:>14} {:>16} {:>16} {:>16} {:>16}",
            stat.author,
            cell(stat.commits, totals.commits),
            cell(stat.files_changed, totals.files_changed),
            cell(stat.insertions, totals.insertions),
            cell(stat.deletions, totals.deletions),
            cell(stat.lines_changed(), totals.lines_changed),
        );
    }
    out
}

pub fn output_table(view: &[AggregatedStat], settings: &Settings, title: Option<&str>) -> Result<()> {
    if let Some(title) = title {
        println!("{}", style(title).bold());
    }
    if view.is_empty() {
        println!("No commits to display");
        return Ok(());
    }

    print!("{}", render_table(view));

    let totals = Totals::of(view);
    println!(
        "\n{} {}  {} {}  sorted by {}",
        style("Total commits:").dim(),
        style(totals.commits).cyan(),
        style("Lines changed:").dim(),
        style(totals.lines_changed).cyan(),
        style(settings.sort_by).yellow()
    );
    Ok(())
}

pub fn output_empty_state() {
    println!("{}", style("No repository open.").bold());
    println!("Run `git-stats open [REPO]` to load one.");
}

pub fn output_error(repo: &Path, message: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), style(repo.display()).dim());
    eprintln!("{message}");
}
