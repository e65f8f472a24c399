/// Exponential moving average over a close-price series, index-aligned
/// with its input.
///
/// Seeded with the SMA of the first `length` closes; smoothing constant
/// `2 / (length + 1)`. The seed also front-pads indices `0..length-1`, so
/// the output has the same length as the input. Crossing checks against
/// the padded region compare against a constant, not a true EMA — callers
/// that scan historical indices must guard with `i >= length`.
///
/// If the input is shorter than `length` the series is returned unchanged;
/// callers must treat that as "insufficient data", not as a valid EMA.
pub fn ema(closes: &[f64], length: usize) -> Vec<f64> {
    assert!(length >= 1, "EMA length must be >= 1");
    if closes.len() < length {
        return closes.to_vec();
    }

    let multiplier = 2.0 / (length as f64 + 1.0);
    let seed = closes[..length].iter().sum::<f64>() / length as f64;

    let mut out = vec![seed; length]; // padding for 0..length-1, plus the seed itself
    let mut prev = seed;
    for &close in &closes[length..] {
        prev = (close - prev) * multiplier + prev;
        out.push(prev);
    }
    out
}
