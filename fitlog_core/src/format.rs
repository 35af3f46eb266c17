//! Display helpers and spreadsheet export.

use crate::{BodyPart, Measurement, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// `dd.mm.yyyy`
pub fn format_date_short(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// `dd.mm.yyyy, HH:MM`
pub fn format_date_time(at: NaiveDateTime) -> String {
    at.format("%d.%m.%Y, %H:%M").to_string()
}

impl BodyPart {
    /// Human-readable name of the body part
    pub fn label(self) -> &'static str {
        match self {
            BodyPart::Chest => "Chest",
            BodyPart::Waist => "Waist",
            BodyPart::Hips => "Hips",
            BodyPart::Arms => "Biceps",
            BodyPart::Forearms => "Forearm",
            BodyPart::Thighs => "Thigh",
            BodyPart::Calves => "Calf",
            BodyPart::Neck => "Neck",
        }
    }
}

/// Label for a serialized circumference key, or the key itself if unknown
pub fn measurement_label(key: &str) -> &str {
    BodyPart::ALL
        .iter()
        .find(|part| part.key() == key)
        .map_or(key, |part| part.label())
}

/// A flattened measurement for CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    weight: Option<f64>,
    water_mass: Option<f64>,
    water_percentage: Option<f64>,
    body_fat_mass: Option<f64>,
    body_fat_percentage: Option<f64>,
    muscle_mass: Option<f64>,
    muscle_percentage: Option<f64>,
    bone_mass: Option<f64>,
    bone_percentage: Option<f64>,
    visceral_fat: Option<f64>,
    bmi: Option<f64>,
    total_score: Option<f64>,
    tdee: Option<f64>,
    chest: Option<f64>,
    waist: Option<f64>,
    hips: Option<f64>,
    arms: Option<f64>,
    forearms: Option<f64>,
    thighs: Option<f64>,
    calves: Option<f64>,
    neck: Option<f64>,
    notes: Option<String>,
}

impl From<&Measurement> for CsvRow {
    fn from(m: &Measurement) -> Self {
        let c = m.measurements.clone().unwrap_or_default();
        CsvRow {
            date: m.date.to_string(),
            weight: m.weight,
            water_mass: m.water_mass,
            water_percentage: m.water_percentage,
            body_fat_mass: m.body_fat_mass,
            body_fat_percentage: m.body_fat_percentage,
            muscle_mass: m.muscle_mass,
            muscle_percentage: m.muscle_percentage,
            bone_mass: m.bone_mass,
            bone_percentage: m.bone_percentage,
            visceral_fat: m.visceral_fat,
            bmi: m.bmi,
            total_score: m.total_score,
            tdee: m.tdee,
            chest: c.chest,
            waist: c.waist,
            hips: c.hips,
            arms: c.arms,
            forearms: c.forearms,
            thighs: c.thighs,
            calves: c.calves,
            neck: c.neck,
            notes: m.notes.clone(),
        }
    }
}

/// Render measurements as CSV with a header row, in the order given
pub fn measurements_to_csv<'a, I>(measurements: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Measurement>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    let mut count = 0;
    for m in measurements {
        writer.serialize(CsvRow::from(m))?;
        count += 1;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|e| crate::Error::Other(format!("Failed to finish CSV: {}", e)))?;
    tracing::debug!("Rendered {} measurements as CSV", count);
    String::from_utf8(bytes).map_err(|e| crate::Error::Other(format!("CSV is not UTF-8: {}", e)))
}
