/// Arithmetic mean, `None` for an empty slice.
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Pads a clock component to two digits ("7" -> "07").
pub fn pad2(value: u64) -> String {
    format!("{value:02}")
}
