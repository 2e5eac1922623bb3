//! Specialist on-call schedule.
//!
//! A schedule row covers the window `[start_date 08:00, start_date+1 08:00)`.
//! Every lookup by wall-clock time goes through `service_day`, so a call
//! at 03:00 on the 29th is answered by the roster that started on the 28th.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use crate::models::{OnCallEntry, OnCallInput, Specialist, SpecialistOnCall};
use crate::store::{non_blank, require_fields, Repository, StoreError};

/// Hour at which one on-call window hands over to the next.
pub const ROLLOVER_HOUR: u32 = 8;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Calendar day whose window contains `at`.
pub fn service_day(at: NaiveDateTime) -> NaiveDate {
    let date = at.date();
    if at.hour() < ROLLOVER_HOUR {
        date.pred_opt().unwrap_or(date)
    } else {
        date
    }
}

/// Start (inclusive) and end (exclusive) of the window opened on `start_date`.
pub fn window(start_date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let handover = NaiveTime::from_hms_opt(ROLLOVER_HOUR, 0, 0).unwrap_or_default();
    let start = start_date.and_time(handover);
    let end = start_date
        .checked_add_days(Days::new(1))
        .unwrap_or(start_date)
        .and_time(handover);
    (start, end)
}

/// Resolve a path parameter to a service day. A bare date names the
/// service day directly; a date-time goes through the 08:00 rollover.
pub fn parse_service_day(raw: &str) -> Result<NaiveDate, StoreError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(service_day)
        .ok_or_else(|| {
            StoreError::Validation(format!(
                "Invalid date '{raw}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM"
            ))
        })
}

pub fn list_on_call(
    repo: &dyn Repository<SpecialistOnCall>,
) -> Result<Vec<SpecialistOnCall>, StoreError> {
    repo.list()
}

pub fn find_on_call(
    repo: &dyn Repository<SpecialistOnCall>,
    id: u32,
) -> Result<SpecialistOnCall, StoreError> {
    repo.get(id)?
        .ok_or_else(|| StoreError::not_found("on_call", id))
}

/// Schedules whose window opened on `day`.
pub fn on_call_for_service_day(
    repo: &dyn Repository<SpecialistOnCall>,
    day: NaiveDate,
) -> Result<Vec<SpecialistOnCall>, StoreError> {
    repo.filter(&|s| s.start_date == day)
}

/// Schedules covering the instant `at`.
pub fn on_call_at(
    repo: &dyn Repository<SpecialistOnCall>,
    at: NaiveDateTime,
) -> Result<Vec<SpecialistOnCall>, StoreError> {
    on_call_for_service_day(repo, service_day(at))
}

pub fn on_call_by_specialist(
    repo: &dyn Repository<SpecialistOnCall>,
    specialist_id: u32,
) -> Result<Vec<SpecialistOnCall>, StoreError> {
    repo.filter(&|s| s.specialist_id == specialist_id)
}

/// Roster in force at `now`, joined with the specialist directory and
/// grouped by department.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayOnCall {
    pub service_day: NaiveDate,
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    pub total: usize,
    pub departments: BTreeMap<String, Vec<OnCallEntry>>,
}

pub fn today_on_call(
    schedules: &dyn Repository<SpecialistOnCall>,
    specialists: &dyn Repository<Specialist>,
    now: NaiveDateTime,
) -> Result<TodayOnCall, StoreError> {
    let day = service_day(now);
    let entries = join_specialists(specialists, on_call_for_service_day(schedules, day)?)?;

    let mut departments: BTreeMap<String, Vec<OnCallEntry>> = BTreeMap::new();
    for entry in entries {
        departments
            .entry(entry.department.clone())
            .or_default()
            .push(entry);
    }

    let (window_start, window_end) = window(day);
    Ok(TodayOnCall {
        service_day: day,
        window_start,
        window_end,
        total: departments.values().map(Vec::len).sum(),
        departments,
    })
}

/// Attach specialist details to schedule rows. Rows pointing at a
/// deleted specialist are kept with a placeholder name.
pub fn join_specialists(
    specialists: &dyn Repository<Specialist>,
    schedules: Vec<SpecialistOnCall>,
) -> Result<Vec<OnCallEntry>, StoreError> {
    schedules
        .into_iter()
        .map(|schedule| {
            let specialist = specialists.get(schedule.specialist_id)?;
            let specialist_name = specialist
                .as_ref()
                .map(|s| s.name.clone())
                .unwrap_or_else(|| format!("Unknown (#{})", schedule.specialist_id));
            Ok(OnCallEntry {
                schedule_id: schedule.id,
                specialist_id: schedule.specialist_id,
                specialist_name,
                specialist,
                department: schedule.department,
                start_date: schedule.start_date,
            })
        })
        .collect()
}

pub fn add_on_call(
    repo: &dyn Repository<SpecialistOnCall>,
    input: OnCallInput,
) -> Result<SpecialistOnCall, StoreError> {
    let department = non_blank(input.department.as_deref());

    let mut missing = Vec::new();
    if input.specialist_id.is_none() {
        missing.push("specialistId");
    }
    if input.start_date.is_none() {
        missing.push("startDate");
    }
    if department.is_none() {
        missing.push("department");
    }
    require_fields(missing)?;

    let (Some(specialist_id), Some(start_date), Some(department)) =
        (input.specialist_id, input.start_date, department)
    else {
        return Err(StoreError::Validation("Incomplete on-call schedule".into()));
    };

    let schedule = repo.insert(SpecialistOnCall {
        id: 0,
        specialist_id,
        start_date,
        department: department.to_string(),
    })?;
    tracing::info!(
        id = schedule.id,
        specialist_id,
        %start_date,
        "On-call schedule added"
    );
    Ok(schedule)
}

pub fn update_on_call(
    repo: &dyn Repository<SpecialistOnCall>,
    id: u32,
    input: OnCallInput,
) -> Result<SpecialistOnCall, StoreError> {
    repo.modify(id, &mut |schedule| {
        if let Some(specialist_id) = input.specialist_id {
            schedule.specialist_id = specialist_id;
        }
        if let Some(start_date) = input.start_date {
            schedule.start_date = start_date;
        }
        if let Some(department) = input.department.as_deref() {
            schedule.department = non_blank(Some(department))
                .ok_or_else(|| StoreError::Validation("department cannot be empty".into()))?
                .to_string();
        }
        Ok(())
    })
}

pub fn delete_on_call(
    repo: &dyn Repository<SpecialistOnCall>,
    id: u32,
) -> Result<SpecialistOnCall, StoreError> {
    repo.delete(id)
}
