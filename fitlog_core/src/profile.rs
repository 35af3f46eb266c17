//! User profile persistence.
//!
//! The profile feeds the TDEE calculation with an activity multiplier. It is
//! stored in its own slot next to the ledger collections.

use crate::storage::{LedgerStore, Slot};
use crate::Result;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// An activity multiplier with its description
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ActivityLevel {
    pub value: f64,
    pub label: String,
}

static ACTIVITY_LEVELS: Lazy<Vec<ActivityLevel>> = Lazy::new(|| {
    [
        (1.2, "Sedentary (little or no exercise)"),
        (1.375, "Light activity (light exercise 1-3 days a week)"),
        (1.55, "Moderate activity (moderate exercise 3-5 days a week)"),
        (1.725, "High activity (hard exercise 6-7 days a week)"),
        (1.9, "Very high activity (athlete or physical job)"),
    ]
    .into_iter()
    .map(|(value, label)| ActivityLevel {
        value,
        label: label.into(),
    })
    .collect()
});

/// The standard activity multipliers, least active first
pub fn activity_levels() -> &'static [ActivityLevel] {
    ACTIVITY_LEVELS.as_slice()
}

/// Find the preset with this multiplier
pub fn activity_level_for(value: f64) -> Option<&'static ActivityLevel> {
    ACTIVITY_LEVELS
        .iter()
        .find(|level| (level.value - value).abs() < 1e-9)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub gender: Gender,
    pub age: u32,
    pub activity_level: ActivityLevel,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            age: 30,
            activity_level: ACTIVITY_LEVELS[2].clone(),
        }
    }
}

/// Fields to change on a profile; `None` keeps the current value
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub gender: Option<Gender>,
    pub age: Option<u32>,
    pub activity_level: Option<ActivityLevel>,
}

impl UserProfile {
    /// Load the profile from a store
    ///
    /// Returns the default profile if none was saved or the saved one is
    /// corrupted.
    pub fn load<S: LedgerStore>(store: &S) -> Result<Self> {
        let Some(contents) = store.read_slot(Slot::UserProfile)? else {
            tracing::info!("No saved profile, using default profile");
            return Ok(Self::default());
        };

        match serde_json::from_str::<UserProfile>(&contents) {
            Ok(profile) => Ok(profile),
            Err(e) => {
                tracing::warn!("Failed to parse saved profile: {}. Using defaults.", e);
                Ok(Self::default())
            }
        }
    }

    pub fn save<S: LedgerStore>(&self, store: &mut S) -> Result<()> {
        let contents = serde_json::to_string(self)?;
        store.write_slot(Slot::UserProfile, &contents)?;
        tracing::debug!("Saved user profile");
        Ok(())
    }

    /// Apply `update` over the stored profile and save the result
    pub fn update<S: LedgerStore>(store: &mut S, update: ProfileUpdate) -> Result<Self> {
        let mut profile = Self::load(store)?;
        if let Some(gender) = update.gender {
            profile.gender = gender;
        }
        if let Some(age) = update.age {
            profile.age = age;
        }
        if let Some(activity_level) = update.activity_level {
            profile.activity_level = activity_level;
        }
        profile.save(store)?;
        Ok(profile)
    }
}
