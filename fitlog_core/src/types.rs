//! Core domain types for the Fitlog ledger.
//!
//! This module defines the records persisted by the ledger:
//! - Measurements (keyed by calendar date) and their body-part circumferences
//! - Strength exercises (keyed by an opaque id) with a derived one-rep-max
//!
//! Field names serialize in camelCase so persisted slots and export
//! documents stay compatible with existing data files.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Dates
// ============================================================================

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps keep only their calendar date in the offset they were written in.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| Error::Validation(format!("invalid date '{}'", raw)))
}

fn deserialize_calendar_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(serde::de::Error::custom)
}

/// JSON has no infinity, so a one-rep-max estimated at 37 reps is written as
/// `null`; read it back as the infinite estimate it came from.
fn deserialize_one_rep_max<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

// ============================================================================
// Measurement Types
// ============================================================================

/// Body-part circumferences in centimetres
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circumferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hips: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forearms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thighs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calves: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neck: Option<f64>,
}

impl Circumferences {
    /// All circumferences paired with the body part they belong to
    pub fn entries(&self) -> [(BodyPart, Option<f64>); 8] {
        [
            (BodyPart::Chest, self.chest),
            (BodyPart::Waist, self.waist),
            (BodyPart::Hips, self.hips),
            (BodyPart::Arms, self.arms),
            (BodyPart::Forearms, self.forearms),
            (BodyPart::Thighs, self.thighs),
            (BodyPart::Calves, self.calves),
            (BodyPart::Neck, self.neck),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, value)| value.is_none())
    }
}

/// A circumference site on the body
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Chest,
    Waist,
    Hips,
    Arms,
    Forearms,
    Thighs,
    Calves,
    Neck,
}

impl BodyPart {
    pub const ALL: [BodyPart; 8] = [
        BodyPart::Chest,
        BodyPart::Waist,
        BodyPart::Hips,
        BodyPart::Arms,
        BodyPart::Forearms,
        BodyPart::Thighs,
        BodyPart::Calves,
        BodyPart::Neck,
    ];

    /// Key used for this body part in serialized records
    pub fn key(self) -> &'static str {
        match self {
            BodyPart::Chest => "chest",
            BodyPart::Waist => "waist",
            BodyPart::Hips => "hips",
            BodyPart::Arms => "arms",
            BodyPart::Forearms => "forearms",
            BodyPart::Thighs => "thighs",
            BodyPart::Calves => "calves",
            BodyPart::Neck => "neck",
        }
    }
}

/// One day's body measurements
///
/// Only `date` is required. Every other field is recorded when the user
/// filled it in and omitted from the serialized form otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_mass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat_mass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_fat_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_mass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub muscle_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bone_mass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bone_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visceral_fat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tdee: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Circumferences>,
}

impl Measurement {
    /// An empty record for the given date
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            weight: None,
            water_mass: None,
            water_percentage: None,
            body_fat_mass: None,
            body_fat_percentage: None,
            muscle_mass: None,
            muscle_percentage: None,
            bone_mass: None,
            bone_percentage: None,
            visceral_fat: None,
            bmi: None,
            total_score: None,
            notes: None,
            tdee: None,
            measurements: None,
        }
    }

    /// Whether any numeric reading (top-level or circumference) is present
    pub fn has_readings(&self) -> bool {
        let scalars = [
            self.weight,
            self.water_mass,
            self.water_percentage,
            self.body_fat_mass,
            self.body_fat_percentage,
            self.muscle_mass,
            self.muscle_percentage,
            self.bone_mass,
            self.bone_percentage,
            self.visceral_fat,
            self.bmi,
            self.total_score,
            self.tdee,
        ];
        scalars.iter().any(Option::is_some)
            || self
                .measurements
                .as_ref()
                .map_or(false, |c| !c.is_empty())
    }
}

// ============================================================================
// Exercise Types
// ============================================================================

/// A strength-training set
///
/// `calculated_one_rep_max` is fixed when the record is written and is not
/// recomputed if `weight` or `reps` change later. A non-finite estimate is
/// stored as `null` and reads back as `f64::INFINITY`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub date: NaiveDate,
    pub weight: f64,
    pub reps: u32,
    #[serde(deserialize_with = "deserialize_one_rep_max")]
    pub calculated_one_rep_max: f64,
}

impl Exercise {
    /// Build an exercise record, deriving its one-rep-max with the Brzycki formula
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        date: NaiveDate,
        weight: f64,
        reps: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date,
            weight,
            reps,
            calculated_one_rep_max: crate::calc::calculate_one_rep_max(weight, reps),
        }
    }
}
