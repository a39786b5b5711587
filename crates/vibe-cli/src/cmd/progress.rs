use crate::output::{print_json, print_table};
use vibe_core::aggregate::get_all_projects_progress;
use vibe_core::store::AnalyticsStore;

pub fn run(store: &AnalyticsStore, json: bool) -> anyhow::Result<()> {
    let rows = get_all_projects_progress(store);

    if json {
        return print_json(&rows);
    }

    if rows.is_empty() {
        println!("No tracked projects.");
        return Ok(());
    }

    let table = rows
        .iter()
        .map(|p| {
            vec![
                p.name.clone(),
                p.snapshot.status.to_string(),
                format!("{}%", p.snapshot.progress),
                format!("{}/{}", p.snapshot.done, p.snapshot.total),
                p.snapshot.current_phase.clone(),
                p.path.clone(),
            ]
        })
        .collect();
    print_table(&["NAME", "STATUS", "PROGRESS", "TASKS", "FOCUS", "PATH"], table);
    Ok(())
}
