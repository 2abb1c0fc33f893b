//! Small shared numeric helpers.

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Converts a nanosecond duration to milliseconds, rounded to two decimals.
pub fn nanos_to_millis(nanos: f64) -> f64 {
    round2(nanos * 1e-6)
}

/// Converts a microsecond duration to milliseconds.
pub fn micros_to_millis(micros: f64) -> f64 {
    micros / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(49.996), 50.0);
        assert_eq!(round2(25.004), 25.0);
        assert_eq!(round2(50.0), 50.0);
    }

    #[test]
    fn converts_latency_units() {
        assert_eq!(nanos_to_millis(1_500_000.0), 1.5);
        assert_eq!(micros_to_millis(2_000.0), 2.0);
    }
}
