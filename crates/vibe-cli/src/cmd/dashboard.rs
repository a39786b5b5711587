use crate::output::print_json;
use vibe_core::dashboard::render_dashboard;
use vibe_core::stats::get_stats_summary;
use vibe_core::store::AnalyticsStore;

pub fn run(store: &AnalyticsStore, json: bool) -> anyhow::Result<()> {
    let stats = get_stats_summary(store);
    if json {
        return print_json(&stats);
    }
    print!("{}", render_dashboard(&stats));
    Ok(())
}
