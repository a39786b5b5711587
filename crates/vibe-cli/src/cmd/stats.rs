use crate::output::{print_json, print_table};
use vibe_core::stats::get_stats_summary;
use vibe_core::store::AnalyticsStore;

pub fn run(store: &AnalyticsStore, json: bool) -> anyhow::Result<()> {
    let stats = get_stats_summary(store);

    if json {
        print_json(&serde_json::json!({
            "total": stats.total,
            "complete": stats.complete,
            "in_progress": stats.in_progress,
            "paused": stats.paused,
            "top_tech": stats.top_tech,
            "type_counts": stats.type_counts,
        }))?;
        return Ok(());
    }

    println!(
        "Projects: {}   Complete: {}   In progress: {}   Paused: {}",
        stats.total, stats.complete, stats.in_progress, stats.paused
    );

    if !stats.top_tech.is_empty() {
        println!();
        println!("TOP TECH");
        let rows = stats
            .top_tech
            .iter()
            .map(|(tech, count)| vec![tech.clone(), count.to_string()])
            .collect();
        print_table(&["TECH", "PROJECTS"], rows);
    }

    if !stats.type_counts.is_empty() {
        println!();
        println!("PROJECT TYPES");
        let mut types: Vec<_> = stats.type_counts.iter().collect();
        types.sort_by(|a, b| b.1.cmp(a.1));
        let rows = types
            .into_iter()
            .map(|(t, count)| vec![t.clone(), count.to_string()])
            .collect();
        print_table(&["TYPE", "PROJECTS"], rows);
    }

    Ok(())
}
