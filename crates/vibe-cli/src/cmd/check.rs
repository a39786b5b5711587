use crate::output::print_json;
use std::path::Path;
use vibe_core::paths;
use vibe_core::progress::calculate_progress;
use vibe_core::store::AnalyticsStore;

pub fn run(store: &AnalyticsStore, path: &Path, json: bool) -> anyhow::Result<()> {
    let context = if path.is_dir() {
        paths::context_path(path)
    } else {
        path.to_path_buf()
    };
    let snapshot = calculate_progress(&context, store.sink());

    if json {
        return print_json(&snapshot);
    }

    println!("File:     {}", context.display());
    println!("Status:   {}", snapshot.status);
    println!(
        "Progress: {}% ({}/{} done, {} in progress)",
        snapshot.progress, snapshot.done, snapshot.total, snapshot.in_progress
    );
    println!("Focus:    {}", snapshot.current_phase);
    if let Some(detail) = &snapshot.error {
        println!("Detail:   {detail}");
    }
    Ok(())
}
