//! Observation construction
//!
//! Layout: `window_size` normalized prices, then cash change, then the
//! position flag.

/// Build the observation vector.
///
/// Each windowed price is expressed as fractional change from the first
/// price in the window, so the first element is always 0. Callers guarantee
/// the first price is non-zero.
pub fn build_observation(
    window: &[f64],
    balance: f64,
    initial_balance: f64,
    shares_held: u8,
) -> Vec<f32> {
    let mut obs = Vec::with_capacity(window.len() + 2);

    if let Some(&base) = window.first() {
        obs.extend(window.iter().map(|price| (price / base - 1.0) as f32));
    }

    obs.push((balance / initial_balance - 1.0) as f32);
    obs.push(f32::from(shares_held));

    obs
}
