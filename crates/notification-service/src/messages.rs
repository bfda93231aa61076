use sentinel_core::NotificationEvent;

/// Renders an event into a (title, body) pair of plain text. Channels
/// apply their own markup on top.
pub fn render(event: &NotificationEvent) -> (String, String) {
    match event {
        NotificationEvent::TopTenEntry { ticker, rank, score } => (
            "New in Top 10".to_string(),
            format!(
                "{ticker} has entered your top 10.\nPosition: #{rank}\nScore: {score:.0}/100"
            ),
        ),
        NotificationEvent::TopTenExit { ticker, score } => (
            "Dropped out of Top 10".to_string(),
            format!(
                "{ticker} has left your top 10.\nCurrent score: {score:.0}/100\n\
                 Worth reviewing whether the position still earns its place."
            ),
        ),
        NotificationEvent::ScoreShift {
            ticker,
            previous,
            current,
        } => {
            let direction = if current >= previous { "up" } else { "down" };
            (
                "Score change".to_string(),
                format!(
                    "{ticker} moved {direction}.\nPrevious score: {previous:.0}\n\
                     New score: {current:.0}\nChange: {delta:+.1}",
                    delta = current - previous
                ),
            )
        }
        NotificationEvent::BuyZoneEntry {
            ticker,
            previous_zone,
            score,
        } => (
            "Entry zone active".to_string(),
            format!(
                "{ticker} has moved into the favorable buy zone (was {prev}).\n\
                 Score: {score:.0}/100",
                prev = previous_zone.label()
            ),
        ),
        NotificationEvent::NewOpportunity {
            ticker,
            bucket,
            score,
        } => (
            format!("Radar opportunity ({bucket})"),
            format!(
                "{ticker} now qualifies in the {bucket} segment.\nScore: {score:.0}/100"
            ),
        ),
        NotificationEvent::CoverageLost { ticker, reason } => (
            "Data coverage lost".to_string(),
            format!(
                "{ticker} could not be scored this run.\nReason: {reason}\n\
                 The position is held but currently unmonitored."
            ),
        ),
    }
}

/// Renders the daily portfolio rollup: total value, overall return, and
/// the best-scored holdings.
pub fn render_summary(
    total_value: f64,
    return_pct: Option<f64>,
    top: &[(String, f64)],
) -> (String, String) {
    let mut body = format!("Total value: ${total_value:.0}\n");
    match return_pct {
        Some(pct) => body.push_str(&format!("Return: {pct:+.1}%\n")),
        None => body.push_str("Return: n/a\n"),
    }
    if !top.is_empty() {
        body.push_str("Top by score:\n");
        for (i, (ticker, score)) in top.iter().enumerate() {
            body.push_str(&format!("{}. {ticker}: {score:.0}/100\n", i + 1));
        }
    }
    ("Portfolio summary".to_string(), body)
}
