use jiff::SpanRelativeTo;

/// Accepts "30s", "5m", ISO 8601 durations such as "PT1M30S", or a plain number of seconds.
pub fn parse_duration(input: &str) -> Result<jiff::SignedDuration, String> {
    let duration = if let Ok(duration) = input.parse::<jiff::SignedDuration>() {
        duration
    } else if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        duration
    } else if let Ok(seconds) = input.parse::<i64>() {
        jiff::SignedDuration::from_secs(seconds)
    } else {
        return Err(format!("Invalid duration '{input}'"));
    };

    if !duration.is_positive() {
        return Err(format!("Duration must be positive, got '{input}'"));
    }

    Ok(duration)
}
