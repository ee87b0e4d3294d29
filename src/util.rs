/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Hit rate as a percentage, 0 when nothing has been typed.
pub fn accuracy_percent(hits: u32, typed: u32) -> f64 {
    match typed {
        0 => 0.0,
        total => round2(hits as f64 / total as f64 * 100.0),
    }
}
