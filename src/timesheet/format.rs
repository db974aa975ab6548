/// Render a minute count as `"{hours}h {minutes}m"`. Sign is dropped;
/// views prefix `+`/`-` themselves. Implemented once so every report
/// prints durations the same way.
pub fn format_minutes(minutes: i64) -> String {
    let magnitude = minutes.abs();
    format!("{}h {}m", magnitude / 60, magnitude % 60)
}
