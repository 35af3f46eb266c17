//! Body composition arithmetic.
//!
//! Scales report some components as a mass and others as a percentage of
//! body weight. Given the weight these convert either way, rounded to one
//! decimal place.

use crate::calc::calculate_tdee;
use crate::Measurement;

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Mass in kg of a component that makes up `percentage` of `weight`
pub fn mass_from_percentage(weight: f64, percentage: f64) -> f64 {
    round_tenth(weight * percentage / 100.0)
}

/// Percentage of `weight` made up by `mass`
///
/// Returns `None` for a non-positive weight.
pub fn percentage_from_mass(weight: f64, mass: f64) -> Option<f64> {
    if weight <= 0.0 {
        return None;
    }
    Some(round_tenth(mass / weight * 100.0))
}

fn fill_pair(weight: f64, mass: &mut Option<f64>, percentage: &mut Option<f64>) {
    match (*mass, *percentage) {
        (None, Some(pct)) => *mass = Some(mass_from_percentage(weight, pct)),
        (Some(kg), None) => *percentage = percentage_from_mass(weight, kg),
        _ => {}
    }
}

impl Measurement {
    /// Complete each mass/percentage pair where only one side is recorded
    ///
    /// Does nothing unless a weight is present.
    pub fn fill_composition(&mut self) {
        let Some(weight) = self.weight else {
            return;
        };
        fill_pair(weight, &mut self.water_mass, &mut self.water_percentage);
        fill_pair(weight, &mut self.body_fat_mass, &mut self.body_fat_percentage);
        fill_pair(weight, &mut self.muscle_mass, &mut self.muscle_percentage);
        fill_pair(weight, &mut self.bone_mass, &mut self.bone_percentage);
    }

    /// TDEE from this record's weight and body fat, if both are present
    pub fn derive_tdee(&self, activity_level: f64) -> Option<f64> {
        Some(calculate_tdee(
            self.weight?,
            self.body_fat_percentage?,
            activity_level,
        ))
    }
}
