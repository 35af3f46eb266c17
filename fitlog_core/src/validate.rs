//! Input checks applied by callers before records reach the ledger.
//!
//! The ledger accepts any well-formed record. Front ends run these checks on
//! user input first so stored data keeps its numeric invariants.

use crate::{Error, Exercise, Measurement, Result};

/// Highest rep count the Brzycki estimate is defined for
pub const MAX_ONE_REP_MAX_REPS: u32 = 36;

fn invalid(reason: impl Into<String>) -> Error {
    Error::Validation(reason.into())
}

fn check_percentage(name: &str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) if !(0.0..=100.0).contains(&v) => {
            Err(invalid(format!("{} must be between 0 and 100", name)))
        }
        _ => Ok(()),
    }
}

fn check_non_negative(name: &str, value: Option<f64>) -> Result<()> {
    match value {
        // `!(v >= 0.0)` also rejects NaN
        Some(v) if !(v >= 0.0) => Err(invalid(format!("{} must not be negative", name))),
        _ => Ok(()),
    }
}

/// Validate a measurement entered by the user
///
/// Requires at least one reading, a positive weight if given,
/// non-negative masses and circumferences, and percentages in 0–100.
pub fn validate_measurement(m: &Measurement) -> Result<()> {
    if !m.has_readings() {
        return Err(invalid("fill in at least one measurement"));
    }

    if let Some(weight) = m.weight {
        if !(weight > 0.0) {
            return Err(invalid("weight must be a positive number"));
        }
    }

    check_percentage("water percentage", m.water_percentage)?;
    check_percentage("body fat percentage", m.body_fat_percentage)?;
    check_percentage("muscle percentage", m.muscle_percentage)?;
    check_percentage("bone percentage", m.bone_percentage)?;

    check_non_negative("water mass", m.water_mass)?;
    check_non_negative("body fat mass", m.body_fat_mass)?;
    check_non_negative("muscle mass", m.muscle_mass)?;
    check_non_negative("bone mass", m.bone_mass)?;
    check_non_negative("visceral fat", m.visceral_fat)?;
    check_non_negative("BMI", m.bmi)?;

    if let Some(circumferences) = &m.measurements {
        for (part, value) in circumferences.entries() {
            check_non_negative(part.key(), value)?;
        }
    }

    Ok(())
}

/// Validate the inputs of a strength set
pub fn validate_lift(name: &str, weight: f64, reps: u32) -> Result<()> {
    if name.trim().is_empty() {
        return Err(invalid("exercise name is required"));
    }
    check_non_negative("weight", Some(weight))?;
    validate_reps(reps)
}

/// Reps must fall where the one-rep-max estimate is defined
pub fn validate_reps(reps: u32) -> Result<()> {
    if reps == 0 || reps > MAX_ONE_REP_MAX_REPS {
        return Err(invalid(format!(
            "reps must be between 1 and {}",
            MAX_ONE_REP_MAX_REPS
        )));
    }
    Ok(())
}

pub fn validate_exercise(exercise: &Exercise) -> Result<()> {
    if exercise.id.trim().is_empty() {
        return Err(invalid("exercise id is required"));
    }
    validate_lift(&exercise.name, exercise.weight, exercise.reps)
}

/// Validate an activity multiplier
pub fn validate_activity_level(value: f64) -> Result<()> {
    if !(value > 0.0) {
        return Err(invalid("activity level must be a positive multiplier"));
    }
    Ok(())
}
