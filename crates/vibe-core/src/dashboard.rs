//! Plain-ASCII terminal dashboard for a computed [`StatsSummary`].

use crate::stats::StatsSummary;
use crate::types::ProgressStatus;

const INNER_WIDTH: usize = 62;
const PANEL_WIDTH: usize = 54;
const SHOWN_PROJECTS: usize = 5;
const SHOWN_TECH: usize = 3;
const BAR_WIDTH: usize = 15;

/// `#` for the completed share of `width`, `-` for the rest.
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = (width * percent.min(100) as usize) / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

pub fn render_dashboard(stats: &StatsSummary) -> String {
    let mut out = Vec::new();
    let rule = format!("+{}+", "=".repeat(INNER_WIDTH));
    let blank = boxed("");

    out.push(rule.clone());
    out.push(format!("|{:^INNER_WIDTH$}|", " VIBECODING ANALYTICS DASHBOARD "));
    out.push(rule.clone());
    out.push(blank.clone());

    out.push(boxed("  OVERVIEW"));
    out.push(boxed(&format!("  +-- Total projects: {}", stats.total)));
    out.push(boxed(&format!("  +-- Complete:       {}", stats.complete)));
    out.push(boxed(&format!("  +-- In progress:    {}", stats.in_progress)));
    out.push(boxed(&format!("  +-- Paused:         {}", stats.paused)));
    out.push(blank.clone());

    if !stats.projects.is_empty() {
        let panel_rule = format!("|  +{}+  |", "-".repeat(PANEL_WIDTH + 2));
        out.push(boxed("  PROJECT PROGRESS"));
        out.push(panel_rule.clone());

        let shown = stats.projects.iter().take(SHOWN_PROJECTS);
        let count = shown.len();
        for (i, p) in shown.enumerate() {
            let name = clip(&p.name, 25);
            let phase = match p.snapshot.status {
                ProgressStatus::Complete => "[DONE]".to_string(),
                ProgressStatus::Deleted => "[DELETED]".to_string(),
                _ => clip(&p.snapshot.current_phase, 20),
            };
            let bar = progress_bar(p.snapshot.progress, BAR_WIDTH);

            out.push(panel(&format!("{}. {name}", i + 1)));
            out.push(panel(&format!(
                "   {bar} {:>3}%  |  {phase}",
                p.snapshot.progress
            )));
            if i + 1 < count {
                out.push(panel(""));
            }
        }

        out.push(panel_rule);
        out.push(blank.clone());
    }

    if !stats.top_tech.is_empty() {
        let total = stats.total.max(1);
        out.push(boxed("  POPULAR TECH STACK"));
        for (tech, count) in stats.top_tech.iter().take(SHOWN_TECH) {
            let percent = (*count as f64 / total as f64 * 100.0).round_ties_even() as u32;
            out.push(boxed(&format!(
                "  +-- {:<12} {} {:>3}%",
                clip(tech, 12),
                progress_bar(percent, BAR_WIDTH),
                percent
            )));
        }
        out.push(blank);
    }

    out.push(rule);
    let mut rendered = out.join("\n");
    rendered.push('\n');
    rendered
}

fn boxed(content: &str) -> String {
    format!("|{:<INNER_WIDTH$}|", clip(content, INNER_WIDTH))
}

fn panel(content: &str) -> String {
    format!("|  | {:<PANEL_WIDTH$} |  |", clip(content, PANEL_WIDTH))
}

fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
