//! Weigh-in reminder scheduling.
//!
//! Only computes when the next reminder is due; delivering it is up to the
//! platform's notification service.

use crate::{Error, Result};
use chrono::{DateTime, TimeZone};

/// Identifier of the daily weigh-in reminder
pub const WEIGHT_REMINDER_ID: u32 = 1;

/// A scheduled notification
#[derive(Clone, Debug)]
pub struct Reminder<Tz: TimeZone> {
    pub id: u32,
    pub title: String,
    pub body: String,
    pub at: DateTime<Tz>,
}

/// Tomorrow at `hour`:00 in the time zone of `now`
pub fn next_weight_reminder<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> Result<DateTime<Tz>> {
    let tomorrow = now
        .date_naive()
        .succ_opt()
        .ok_or_else(|| Error::Other("no day after the current date".into()))?;
    let at = tomorrow
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| Error::Config(format!("invalid reminder hour {}", hour)))?;

    now.timezone()
        .from_local_datetime(&at)
        .earliest()
        .ok_or_else(|| Error::Other(format!("{} does not exist in the local time zone", at)))
}

/// The weigh-in reminder due after `now`
pub fn weight_reminder<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> Result<Reminder<Tz>> {
    Ok(Reminder {
        id: WEIGHT_REMINDER_ID,
        title: "Time to weigh in".into(),
        body: "Don't forget to log your weight today!".into(),
        at: next_weight_reminder(now, hour)?,
    })
}
