//! The fitness ledger: measurements keyed by date, exercises keyed by id.
//!
//! Every mutating operation writes the affected collection through to the
//! injected [`LedgerStore`] before returning. The in-memory collection is
//! only replaced once that write has succeeded, so a failed write leaves the
//! ledger as it was.

use crate::merge::fold_by_date;
use crate::storage::{LedgerStore, Slot};
use crate::{Exercise, Measurement, Result};
use chrono::NaiveDate;

/// In-memory collections backed by a store
#[derive(Debug)]
pub struct FitnessLedger<S: LedgerStore> {
    pub(crate) store: S,
    pub(crate) measurements: Vec<Measurement>,
    pub(crate) exercises: Vec<Exercise>,
    has_seen_intro: bool,
}

impl<S: LedgerStore> FitnessLedger<S> {
    /// Load the ledger from its store
    ///
    /// Missing slots start empty; corrupted slots are logged and start empty.
    /// Stored measurements that fall on the same calendar day are merged.
    pub fn open(store: S) -> Result<Self> {
        let stored: Vec<Measurement> = store.read_collection(Slot::Measurements)?;
        let stored_count = stored.len();
        let measurements = fold_by_date(stored);
        if measurements.len() != stored_count {
            tracing::warn!(
                "Merged {} stored measurements sharing a date",
                stored_count - measurements.len()
            );
        }

        let exercises: Vec<Exercise> = store.read_collection(Slot::Exercises)?;
        let has_seen_intro = store
            .read_slot(Slot::HasSeenIntro)?
            .map_or(false, |raw| raw.trim() == "true");

        tracing::info!(
            "Loaded ledger: {} measurements, {} exercises",
            measurements.len(),
            exercises.len()
        );

        Ok(Self {
            store,
            measurements,
            exercises,
            has_seen_intro,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ------------------------------------------------------------------
    // Measurements
    // ------------------------------------------------------------------

    /// Measurements in stored order
    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// Record a measurement, merging into any existing record for its date
    pub fn add_measurement(&mut self, measurement: Measurement) -> Result<()> {
        let mut measurements = self.measurements.clone();
        match measurements.iter_mut().find(|m| m.date == measurement.date) {
            Some(existing) => {
                tracing::debug!("Merging measurement into {}", existing.date);
                existing.merge_from(measurement);
            }
            None => {
                tracing::debug!("Adding measurement for {}", measurement.date);
                measurements.push(measurement);
            }
        }
        self.commit_measurements(measurements)
    }

    /// Remove the measurement for `date`, if there is one
    pub fn delete_measurement(&mut self, date: NaiveDate) -> Result<()> {
        let mut measurements = self.measurements.clone();
        measurements.retain(|m| m.date != date);
        self.commit_measurements(measurements)
    }

    /// Measurements ordered most recent first
    pub fn sorted_measurements(&self) -> Vec<&Measurement> {
        let mut sorted: Vec<&Measurement> = self.measurements.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
        sorted
    }

    pub fn measurement_on(&self, date: NaiveDate) -> Option<&Measurement> {
        self.measurements.iter().find(|m| m.date == date)
    }

    /// The most recent measurement
    pub fn latest_measurement(&self) -> Option<&Measurement> {
        self.measurements.iter().max_by_key(|m| m.date)
    }

    pub fn clear_measurements(&mut self) -> Result<()> {
        self.commit_measurements(Vec::new())
    }

    // ------------------------------------------------------------------
    // Exercises
    // ------------------------------------------------------------------

    /// Exercises in insertion order
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Append an exercise (ids are not deduplicated)
    pub fn add_exercise(&mut self, exercise: Exercise) -> Result<()> {
        tracing::debug!("Adding exercise {} ({})", exercise.id, exercise.name);
        let mut exercises = self.exercises.clone();
        exercises.push(exercise);
        self.commit_exercises(exercises)
    }

    /// Replace the exercise with the same id
    ///
    /// Returns `Ok(false)` without touching storage when no exercise has
    /// that id.
    pub fn update_exercise(&mut self, exercise: Exercise) -> Result<bool> {
        let Some(index) = self.exercises.iter().position(|e| e.id == exercise.id) else {
            tracing::debug!("No exercise with id {} to update", exercise.id);
            return Ok(false);
        };

        let mut exercises = self.exercises.clone();
        exercises[index] = exercise;
        self.commit_exercises(exercises)?;
        Ok(true)
    }

    /// Remove the exercise with `id`, if there is one
    pub fn delete_exercise(&mut self, id: &str) -> Result<()> {
        let mut exercises = self.exercises.clone();
        exercises.retain(|e| e.id != id);
        self.commit_exercises(exercises)
    }

    /// History of one exercise by name (case-insensitive), most recent first
    pub fn exercises_named(&self, name: &str) -> Vec<&Exercise> {
        let needle = name.trim().to_lowercase();
        let mut history: Vec<&Exercise> = self
            .exercises
            .iter()
            .filter(|e| e.name.trim().to_lowercase() == needle)
            .collect();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        history
    }

    /// Empty both collections
    ///
    /// Measurements are cleared first; if clearing exercises then fails,
    /// measurements stay cleared in memory and in storage.
    pub fn clear_all_data(&mut self) -> Result<()> {
        self.commit_measurements(Vec::new())?;
        self.commit_exercises(Vec::new())
    }

    // ------------------------------------------------------------------
    // Onboarding flag
    // ------------------------------------------------------------------

    pub fn has_seen_intro(&self) -> bool {
        self.has_seen_intro
    }

    pub fn set_has_seen_intro(&mut self, value: bool) -> Result<()> {
        self.store
            .write_slot(Slot::HasSeenIntro, if value { "true" } else { "false" })?;
        self.has_seen_intro = value;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Persist `measurements`, then adopt them
    pub(crate) fn commit_measurements(&mut self, measurements: Vec<Measurement>) -> Result<()> {
        self.store
            .write_collection(Slot::Measurements, &measurements)?;
        self.measurements = measurements;
        Ok(())
    }

    /// Persist `exercises`, then adopt them
    pub(crate) fn commit_exercises(&mut self, exercises: Vec<Exercise>) -> Result<()> {
        self.store.write_collection(Slot::Exercises, &exercises)?;
        self.exercises = exercises;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::FailingStore;
    use crate::storage::{JsonDirStore, MemoryStore};
    use crate::Circumferences;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn weighed(date: &str, weight: f64) -> Measurement {
        Measurement {
            weight: Some(weight),
            ..Measurement::new(day(date))
        }
    }

    fn ledger() -> FitnessLedger<MemoryStore> {
        crate::logging::init_test();
        FitnessLedger::open(MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_add_new_measurement() {
        let mut ledger = ledger();
        let mut m = weighed("2024-02-20", 70.0);
        m.notes = Some("Test measurement".into());

        ledger.add_measurement(m.clone()).unwrap();
        assert_eq!(ledger.measurements(), &[m]);
    }

    #[test]
    fn test_same_date_fields_union() {
        let mut ledger = ledger();
        ledger.add_measurement(weighed("2024-02-20", 70.0)).unwrap();
        ledger
            .add_measurement(Measurement {
                body_fat_percentage: Some(20.0),
                ..Measurement::new(day("2024-02-20"))
            })
            .unwrap();

        assert_eq!(
            ledger.measurements(),
            &[Measurement {
                weight: Some(70.0),
                body_fat_percentage: Some(20.0),
                ..Measurement::new(day("2024-02-20"))
            }]
        );
    }

    #[test]
    fn test_same_date_nested_merge() {
        let mut ledger = ledger();
        ledger.add_measurement(weighed("2024-02-20", 70.0)).unwrap();
        ledger
            .add_measurement(Measurement {
                measurements: Some(Circumferences {
                    chest: Some(100.0),
                    waist: Some(80.0),
                    ..Circumferences::default()
                }),
                ..Measurement::new(day("2024-02-20"))
            })
            .unwrap();

        let expected = serde_json::json!([{
            "date": "2024-02-20",
            "weight": 70.0,
            "measurements": { "chest": 100.0, "waist": 80.0 }
        }]);
        assert_eq!(serde_json::to_value(ledger.measurements()).unwrap(), expected);
    }

    #[test]
    fn test_adding_twice_is_idempotent() {
        let mut ledger = ledger();
        let m = Measurement {
            body_fat_mass: Some(14.0),
            measurements: Some(Circumferences {
                calves: Some(37.5),
                ..Circumferences::default()
            }),
            ..weighed("2024-02-20", 70.0)
        };
        ledger.add_measurement(m.clone()).unwrap();
        ledger.add_measurement(m.clone()).unwrap();
        assert_eq!(ledger.measurements(), &[m]);
    }

    #[test]
    fn test_one_record_per_date() {
        let mut ledger = ledger();
        let dates = ["2024-02-20", "2024-02-21", "2024-02-20", "2024-02-22", "2024-02-21"];
        for (i, date) in dates.iter().enumerate() {
            ledger.add_measurement(weighed(date, 70.0 + i as f64)).unwrap();
        }

        assert_eq!(ledger.measurements().len(), 3);
        assert_eq!(ledger.measurement_on(day("2024-02-20")).unwrap().weight, Some(72.0));
        assert_eq!(ledger.measurement_on(day("2024-02-21")).unwrap().weight, Some(74.0));
    }

    #[test]
    fn test_delete_measurement() {
        let mut ledger = ledger();
        ledger.add_measurement(weighed("2024-02-20", 70.0)).unwrap();
        ledger.delete_measurement(day("2024-02-20")).unwrap();
        assert!(ledger.measurements().is_empty());
    }

    #[test]
    fn test_delete_missing_measurement_is_noop() {
        let mut ledger = ledger();
        ledger.add_measurement(weighed("2024-02-20", 70.0)).unwrap();
        let before = ledger.measurements().to_vec();

        ledger.delete_measurement(day("2023-01-01")).unwrap();
        assert_eq!(ledger.measurements(), before.as_slice());
    }

    #[test]
    fn test_sorted_measurements_descending_without_reordering() {
        let mut ledger = ledger();
        ledger.add_measurement(weighed("2024-02-21", 71.0)).unwrap();
        ledger.add_measurement(weighed("2024-01-05", 73.0)).unwrap();
        ledger.add_measurement(weighed("2024-03-01", 69.0)).unwrap();

        let sorted: Vec<NaiveDate> = ledger.sorted_measurements().iter().map(|m| m.date).collect();
        assert_eq!(sorted, vec![day("2024-03-01"), day("2024-02-21"), day("2024-01-05")]);

        let stored: Vec<NaiveDate> = ledger.measurements().iter().map(|m| m.date).collect();
        assert_eq!(stored, vec![day("2024-02-21"), day("2024-01-05"), day("2024-03-01")]);

        assert_eq!(ledger.latest_measurement().unwrap().date, day("2024-03-01"));
    }

    #[test]
    fn test_clear_measurements() {
        let mut ledger = ledger();
        ledger.add_measurement(weighed("2024-02-20", 70.0)).unwrap();
        ledger.add_measurement(weighed("2024-02-21", 71.0)).unwrap();
        ledger
            .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
            .unwrap();

        ledger.clear_measurements().unwrap();
        assert!(ledger.measurements().is_empty());
        assert_eq!(ledger.exercises().len(), 1);
        assert_eq!(ledger.store().get(Slot::Measurements), Some("[]"));
    }

    #[test]
    fn test_exercises_share_dates_and_ids() {
        let mut ledger = ledger();
        ledger
            .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
            .unwrap();
        ledger
            .add_exercise(Exercise::new("2", "Bench", day("2024-02-20"), 80.0, 8))
            .unwrap();
        ledger
            .add_exercise(Exercise::new("2", "Bench", day("2024-02-21"), 82.5, 6))
            .unwrap();

        assert_eq!(ledger.exercises().len(), 3);
    }

    #[test]
    fn test_update_exercise_replaces_wholesale() {
        let mut ledger = ledger();
        ledger
            .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
            .unwrap();

        let replacement = Exercise::new("1", "Front Squat", day("2024-02-22"), 80.0, 3);
        assert!(ledger.update_exercise(replacement.clone()).unwrap());
        assert_eq!(ledger.exercises(), &[replacement]);
    }

    #[test]
    fn test_update_unknown_exercise_reports_not_found() {
        let mut ledger = ledger();
        ledger
            .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
            .unwrap();
        let writes = ledger.store().writes();

        let stray = Exercise::new("missing", "Deadlift", day("2024-02-20"), 140.0, 3);
        assert!(!ledger.update_exercise(stray).unwrap());
        assert_eq!(ledger.exercises().len(), 1);
        assert_eq!(ledger.exercises()[0].id, "1");
        assert_eq!(ledger.store().writes(), writes);
    }

    #[test]
    fn test_delete_exercise() {
        let mut ledger = ledger();
        ledger
            .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
            .unwrap();
        ledger.delete_exercise("nope").unwrap();
        assert_eq!(ledger.exercises().len(), 1);

        ledger.delete_exercise("1").unwrap();
        assert!(ledger.exercises().is_empty());
    }

    #[test]
    fn test_exercises_named_most_recent_first() {
        let mut ledger = ledger();
        ledger
            .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
            .unwrap();
        ledger
            .add_exercise(Exercise::new("2", "Bench", day("2024-02-21"), 80.0, 8))
            .unwrap();
        ledger
            .add_exercise(Exercise::new("3", "squat ", day("2024-02-23"), 105.0, 5))
            .unwrap();

        let ids: Vec<&str> = ledger
            .exercises_named("SQUAT")
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    #[test]
    fn test_clear_all_data() {
        let mut ledger = ledger();
        ledger.add_measurement(weighed("2024-02-20", 70.0)).unwrap();
        ledger
            .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
            .unwrap();

        ledger.clear_all_data().unwrap();
        assert!(ledger.measurements().is_empty());
        assert!(ledger.exercises().is_empty());
        assert_eq!(ledger.store().get(Slot::Exercises), Some("[]"));
    }

    #[test]
    fn test_every_mutation_writes_through() {
        let mut ledger = ledger();
        ledger.add_measurement(weighed("2024-02-20", 70.0)).unwrap();
        ledger.delete_measurement(day("2024-02-20")).unwrap();
        ledger
            .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
            .unwrap();
        ledger.delete_exercise("1").unwrap();
        assert_eq!(ledger.store().writes(), 4);
    }

    #[test]
    fn test_state_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let mut ledger = FitnessLedger::open(JsonDirStore::new(temp_dir.path())).unwrap();
            ledger.add_measurement(weighed("2024-02-20", 70.0)).unwrap();
            ledger
                .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
                .unwrap();
            ledger.set_has_seen_intro(true).unwrap();
        }

        let reopened = FitnessLedger::open(JsonDirStore::new(temp_dir.path())).unwrap();
        assert_eq!(reopened.measurements(), &[weighed("2024-02-20", 70.0)]);
        assert_eq!(reopened.exercises()[0].calculated_one_rep_max, 113.0);
        assert!(reopened.has_seen_intro());
    }

    #[test]
    fn test_open_with_corrupted_slots_starts_empty() {
        let store = MemoryStore::new()
            .with_slot(Slot::Measurements, "{ not valid }")
            .with_slot(Slot::Exercises, r#"[{"id":"1","name":"Squat","date":"2024-02-20","weight":100,"reps":5,"calculatedOneRepMax":113}]"#)
            .with_slot(Slot::HasSeenIntro, "nonsense");

        let ledger = FitnessLedger::open(store).unwrap();
        assert!(ledger.measurements().is_empty());
        assert_eq!(ledger.exercises().len(), 1);
        assert!(!ledger.has_seen_intro());
    }

    #[test]
    fn test_open_merges_stored_records_sharing_a_day() {
        let store = MemoryStore::new().with_slot(
            Slot::Measurements,
            r#"[
                {"date":"2024-02-20T08:00:00Z","weight":70},
                {"date":"2024-02-21","weight":71},
                {"date":"2024-02-20T20:00:00Z","bodyFatPercentage":20}
            ]"#,
        );

        let ledger = FitnessLedger::open(store).unwrap();
        assert_eq!(ledger.measurements().len(), 2);
        let merged = ledger.measurement_on(day("2024-02-20")).unwrap();
        assert_eq!(merged.weight, Some(70.0));
        assert_eq!(merged.body_fat_percentage, Some(20.0));
    }

    #[test]
    fn test_open_keeps_good_records_next_to_bad_ones() {
        let store = MemoryStore::new().with_slot(
            Slot::Exercises,
            r#"[
                {"id":"1","name":"Squat","date":"2024-02-20","weight":100,"reps":5,"calculatedOneRepMax":113},
                {"id":"2","name":"Row","date":"someday","weight":60,"reps":8,"calculatedOneRepMax":75},
                {"id":"3","name":"Bench","date":"2024-02-21","weight":80,"reps":8,"calculatedOneRepMax":96}
            ]"#,
        );

        let ledger = FitnessLedger::open(store).unwrap();
        let ids: Vec<&str> = ledger.exercises().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_exercise_at_37_reps_survives_reopen() {
        let temp_dir = tempfile::tempdir().unwrap();
        {
            let mut ledger = FitnessLedger::open(JsonDirStore::new(temp_dir.path())).unwrap();
            ledger
                .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
                .unwrap();
            ledger
                .add_exercise(Exercise::new("2", "Curl", day("2024-02-20"), 10.0, 37))
                .unwrap();
        }

        let reopened = FitnessLedger::open(JsonDirStore::new(temp_dir.path())).unwrap();
        assert_eq!(reopened.exercises().len(), 2);
        assert_eq!(reopened.exercises()[0].calculated_one_rep_max, 113.0);
        assert!(reopened.exercises()[1].calculated_one_rep_max.is_infinite());
    }

    #[test]
    fn test_failed_write_leaves_ledger_unchanged() {
        let mut ledger = FitnessLedger::open(FailingStore::new(MemoryStore::new())).unwrap();
        ledger.add_measurement(weighed("2024-02-20", 70.0)).unwrap();
        ledger
            .add_exercise(Exercise::new("1", "Squat", day("2024-02-20"), 100.0, 5))
            .unwrap();

        ledger.store.fail_writes_to(Slot::Measurements);
        ledger.store.fail_writes_to(Slot::Exercises);
        ledger.store.fail_writes_to(Slot::HasSeenIntro);

        assert!(ledger.add_measurement(weighed("2024-02-20", 72.0)).is_err());
        assert!(ledger.add_measurement(weighed("2024-02-21", 71.0)).is_err());
        assert!(ledger.delete_measurement(day("2024-02-20")).is_err());
        assert_eq!(ledger.measurements(), &[weighed("2024-02-20", 70.0)]);

        let replacement = Exercise::new("1", "Front Squat", day("2024-02-22"), 80.0, 3);
        assert!(ledger.update_exercise(replacement).is_err());
        assert!(ledger.delete_exercise("1").is_err());
        assert!(ledger.clear_all_data().is_err());
        assert_eq!(ledger.exercises().len(), 1);
        assert_eq!(ledger.exercises()[0].name, "Squat");

        assert!(ledger.set_has_seen_intro(true).is_err());
        assert!(!ledger.has_seen_intro());
    }
}
