//! Derived fitness metrics.
//!
//! These are pure formulas. None of them guard their inputs: callers are
//! expected to validate ranges first (see [`crate::validate`]).

/// Millilitres of water recommended per kilogram of body weight
pub const WATER_ML_PER_KG: f64 = 33.0;

/// Estimate a one-rep-max with the Brzycki formula
///
/// `round(weight * 36 / (37 - reps))`. The formula is singular at 37 reps
/// (the result is infinite) and negative beyond it.
///
/// Halves round away from zero, so a negative estimate such as `-2.5`
/// becomes `-3.0` where a round-half-up rule would give `-2.0`. Only reps
/// above 37 produce negative estimates.
pub fn calculate_one_rep_max(weight: f64, reps: u32) -> f64 {
    (weight * (36.0 / (37.0 - f64::from(reps)))).round()
}

/// Estimate total daily energy expenditure with the Katch–McArdle formula
///
/// # Arguments
/// * `weight` - Body weight in kg
/// * `body_fat_percentage` - Body fat, 0–100
/// * `activity_level` - Activity multiplier, typically 1.2–1.9
pub fn calculate_tdee(weight: f64, body_fat_percentage: f64, activity_level: f64) -> f64 {
    let lean_mass = weight * (1.0 - body_fat_percentage / 100.0);
    let bmr = 370.0 + 21.6 * lean_mass;
    (bmr * activity_level).round()
}

/// Recommended daily water intake in millilitres
pub fn calculate_water_intake(weight: f64) -> f64 {
    (weight * WATER_ML_PER_KG).round()
}
