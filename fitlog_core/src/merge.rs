//! Field-wise union merge for measurement records.
//!
//! Two records for the same date combine by taking each incoming field that
//! is present and keeping the existing value otherwise. Circumferences merge
//! key by key instead of replacing the whole sub-structure.

use crate::{Circumferences, Measurement};

fn overlay<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

impl Circumferences {
    /// Overwrite every circumference present in `incoming`
    pub fn merge_from(&mut self, incoming: Circumferences) {
        overlay(&mut self.chest, incoming.chest);
        overlay(&mut self.waist, incoming.waist);
        overlay(&mut self.hips, incoming.hips);
        overlay(&mut self.arms, incoming.arms);
        overlay(&mut self.forearms, incoming.forearms);
        overlay(&mut self.thighs, incoming.thighs);
        overlay(&mut self.calves, incoming.calves);
        overlay(&mut self.neck, incoming.neck);
    }
}

impl Measurement {
    /// Union `incoming` into this record
    ///
    /// The date is left as is; callers only merge records that share one.
    pub fn merge_from(&mut self, incoming: Measurement) {
        overlay(&mut self.weight, incoming.weight);
        overlay(&mut self.water_mass, incoming.water_mass);
        overlay(&mut self.water_percentage, incoming.water_percentage);
        overlay(&mut self.body_fat_mass, incoming.body_fat_mass);
        overlay(&mut self.body_fat_percentage, incoming.body_fat_percentage);
        overlay(&mut self.muscle_mass, incoming.muscle_mass);
        overlay(&mut self.muscle_percentage, incoming.muscle_percentage);
        overlay(&mut self.bone_mass, incoming.bone_mass);
        overlay(&mut self.bone_percentage, incoming.bone_percentage);
        overlay(&mut self.visceral_fat, incoming.visceral_fat);
        overlay(&mut self.bmi, incoming.bmi);
        overlay(&mut self.total_score, incoming.total_score);
        overlay(&mut self.notes, incoming.notes);
        overlay(&mut self.tdee, incoming.tdee);

        if let Some(circumferences) = incoming.measurements {
            self.measurements
                .get_or_insert_with(Circumferences::default)
                .merge_from(circumferences);
        }
    }
}

/// Collapse records sharing a date with the union merge, keeping first-seen order
pub fn fold_by_date(records: Vec<Measurement>) -> Vec<Measurement> {
    let mut folded: Vec<Measurement> = Vec::with_capacity(records.len());
    for record in records {
        match folded.iter_mut().find(|m| m.date == record.date) {
            Some(existing) => existing.merge_from(record),
            None => folded.push(record),
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 20).unwrap()
    }

    #[test]
    fn test_incoming_fields_overwrite() {
        let mut existing = Measurement::new(day());
        existing.weight = Some(70.0);
        existing.notes = Some("morning".into());

        let mut incoming = Measurement::new(day());
        incoming.weight = Some(71.5);

        existing.merge_from(incoming);
        assert_eq!(existing.weight, Some(71.5));
        assert_eq!(existing.notes.as_deref(), Some("morning"));
    }

    #[test]
    fn test_circumferences_merge_key_by_key() {
        let mut existing = Measurement::new(day());
        existing.measurements = Some(Circumferences {
            chest: Some(100.0),
            waist: Some(80.0),
            ..Circumferences::default()
        });

        let mut incoming = Measurement::new(day());
        incoming.measurements = Some(Circumferences {
            waist: Some(79.0),
            neck: Some(38.0),
            ..Circumferences::default()
        });

        existing.merge_from(incoming);
        let circ = existing.measurements.unwrap();
        assert_eq!(circ.chest, Some(100.0));
        assert_eq!(circ.waist, Some(79.0));
        assert_eq!(circ.neck, Some(38.0));
        assert_eq!(circ.hips, None);
    }

    #[test]
    fn test_absent_circumferences_keep_existing() {
        let mut existing = Measurement::new(day());
        existing.measurements = Some(Circumferences {
            hips: Some(95.0),
            ..Circumferences::default()
        });

        let mut incoming = Measurement::new(day());
        incoming.body_fat_percentage = Some(20.0);

        existing.merge_from(incoming);
        assert_eq!(existing.measurements.unwrap().hips, Some(95.0));
        assert_eq!(existing.body_fat_percentage, Some(20.0));
    }

    #[test]
    fn test_fold_by_date_keeps_first_seen_order() {
        let other = NaiveDate::from_ymd_opt(2024, 2, 21).unwrap();
        let mut a = Measurement::new(day());
        a.weight = Some(70.0);
        let mut b = Measurement::new(other);
        b.weight = Some(71.0);
        let mut c = Measurement::new(day());
        c.body_fat_percentage = Some(20.0);

        let folded = fold_by_date(vec![a, b, c]);
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0].date, day());
        assert_eq!(folded[0].weight, Some(70.0));
        assert_eq!(folded[0].body_fat_percentage, Some(20.0));
        assert_eq!(folded[1].date, other);
    }

    #[test]
    fn test_merge_with_self_is_identity() {
        let mut m = Measurement::new(day());
        m.weight = Some(70.0);
        m.measurements = Some(Circumferences {
            arms: Some(35.0),
            ..Circumferences::default()
        });

        let mut merged = m.clone();
        merged.merge_from(m.clone());
        assert_eq!(merged, m);
    }
}
