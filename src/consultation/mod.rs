//! Consultation log: ER-to-specialist call records.
//!
//! CRUD, the "by X" lookups, free-text search and the combined filter
//! live here. Aggregates are in `stats`, CSV/PDF output in `export`.

pub mod export;
pub mod stats;

use chrono::{Days, NaiveDate, NaiveTime, Utc};

use crate::models::{
    ConsultationFilter, ConsultationLog, ConsultationLogInput, Outcome, ResponseTime, Shift,
    Specialist,
};
use crate::store::{non_blank, require_fields, Repository, StoreError};

/// Window used by `recent_logs` when the caller gives none.
pub const DEFAULT_RECENT_DAYS: u32 = 7;

pub fn list_logs(repo: &dyn Repository<ConsultationLog>) -> Result<Vec<ConsultationLog>, StoreError> {
    repo.list()
}

pub fn find_log(
    repo: &dyn Repository<ConsultationLog>,
    id: u32,
) -> Result<ConsultationLog, StoreError> {
    repo.get(id)?
        .ok_or_else(|| StoreError::not_found("consultation_log", id))
}

pub fn logs_by_date(
    repo: &dyn Repository<ConsultationLog>,
    date: NaiveDate,
) -> Result<Vec<ConsultationLog>, StoreError> {
    repo.filter(&|log| log.date == date)
}

pub fn logs_by_shift(
    repo: &dyn Repository<ConsultationLog>,
    shift: Shift,
) -> Result<Vec<ConsultationLog>, StoreError> {
    repo.filter(&|log| log.shift == shift)
}

pub fn logs_by_er_doctor(
    repo: &dyn Repository<ConsultationLog>,
    doctor_id: u32,
) -> Result<Vec<ConsultationLog>, StoreError> {
    repo.filter(&|log| log.er_doctor_id == doctor_id)
}

pub fn logs_by_specialist(
    repo: &dyn Repository<ConsultationLog>,
    specialist_id: u32,
) -> Result<Vec<ConsultationLog>, StoreError> {
    repo.filter(&|log| log.specialist_id == specialist_id)
}

pub fn logs_by_outcome(
    repo: &dyn Repository<ConsultationLog>,
    outcome: Outcome,
) -> Result<Vec<ConsultationLog>, StoreError> {
    repo.filter(&|log| log.outcome == outcome)
}

pub fn urgent_logs(
    repo: &dyn Repository<ConsultationLog>,
) -> Result<Vec<ConsultationLog>, StoreError> {
    repo.filter(&|log| log.urgent)
}

/// Logs dated within `[start, end]`, both ends inclusive.
pub fn logs_in_range(
    repo: &dyn Repository<ConsultationLog>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<ConsultationLog>, StoreError> {
    if end < start {
        return Err(StoreError::Validation(format!(
            "Range end {end} is before start {start}"
        )));
    }
    repo.filter(&|log| log.date >= start && log.date <= end)
}

/// Logs dated on or after `today - days`.
pub fn recent_logs(
    repo: &dyn Repository<ConsultationLog>,
    days: u32,
    today: NaiveDate,
) -> Result<Vec<ConsultationLog>, StoreError> {
    let cutoff = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    repo.filter(&|log| log.date >= cutoff)
}

/// Case-insensitive substring search over patient id, specialty,
/// outcome and date.
pub fn search_logs(
    repo: &dyn Repository<ConsultationLog>,
    term: &str,
) -> Result<Vec<ConsultationLog>, StoreError> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return repo.list();
    }
    repo.filter(&|log| {
        log.patient_id.to_lowercase().contains(&needle)
            || log.specialty.to_lowercase().contains(&needle)
            || log.outcome.as_str().contains(&needle)
            || log.date.to_string().contains(&needle)
    })
}

pub fn filter_logs(
    repo: &dyn Repository<ConsultationLog>,
    filter: &ConsultationFilter,
) -> Result<Vec<ConsultationLog>, StoreError> {
    repo.filter(&|log| matches_filter(log, filter))
}

fn matches_filter(log: &ConsultationLog, filter: &ConsultationFilter) -> bool {
    filter.shift.map_or(true, |s| log.shift == s)
        && filter.outcome.map_or(true, |o| log.outcome == o)
        && filter.urgent.map_or(true, |u| log.urgent == u)
        && filter.from.map_or(true, |from| log.date >= from)
        && filter.to.map_or(true, |to| log.date <= to)
        && filter.doctor.map_or(true, |d| log.er_doctor_id == d)
        && filter.specialist.map_or(true, |s| log.specialist_id == s)
}

/// Parse an `HH:MM` clock time.
fn parse_clock(field: &str, value: &str) -> Result<NaiveTime, StoreError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        StoreError::Validation(format!("{field} must be HH:MM, got '{value}'"))
    })
}

/// Minutes from the call to the specialist's arrival. Arrival earlier
/// than the call means the specialist arrived after midnight.
pub fn minutes_between(called: NaiveTime, arrived: NaiveTime) -> u32 {
    let delta = (arrived - called).num_minutes();
    let minutes = if delta < 0 { delta + 24 * 60 } else { delta };
    u32::try_from(minutes).unwrap_or(0)
}

fn derive_response_time(
    time_called: &str,
    arrival_time: Option<&str>,
) -> Result<ResponseTime, StoreError> {
    let Some(arrival) = arrival_time else {
        return Ok(ResponseTime::unknown());
    };
    let called = parse_clock("timeCalled", time_called)?;
    let arrived = parse_clock("arrivalTime", arrival)?;
    Ok(ResponseTime::minutes(minutes_between(called, arrived)))
}

/// Create a log. The specialty falls back to the specialist's department
/// and the response time to the call-to-arrival gap when not given.
pub fn add_log(
    repo: &dyn Repository<ConsultationLog>,
    specialists: &dyn Repository<Specialist>,
    input: ConsultationLogInput,
) -> Result<ConsultationLog, StoreError> {
    let time_called = non_blank(input.time_called.as_deref());
    let patient_id = non_blank(input.patient_id.as_deref());

    let mut missing = Vec::new();
    if input.date.is_none() {
        missing.push("date");
    }
    if input.shift.is_none() {
        missing.push("shift");
    }
    if input.er_doctor_id.is_none() {
        missing.push("erDoctorId");
    }
    if time_called.is_none() {
        missing.push("timeCalled");
    }
    if input.specialist_id.is_none() {
        missing.push("specialistId");
    }
    if patient_id.is_none() {
        missing.push("patientId");
    }
    if input.outcome.is_none() {
        missing.push("outcome");
    }
    require_fields(missing)?;

    let (
        Some(date),
        Some(shift),
        Some(er_doctor_id),
        Some(time_called),
        Some(specialist_id),
        Some(patient_id),
        Some(outcome),
    ) = (
        input.date,
        input.shift,
        input.er_doctor_id,
        time_called,
        input.specialist_id,
        patient_id,
        input.outcome,
    )
    else {
        return Err(StoreError::Validation("Incomplete consultation log".into()));
    };

    parse_clock("timeCalled", time_called)?;
    let arrival_time = non_blank(input.arrival_time.as_deref());
    if let Some(arrival) = arrival_time {
        parse_clock("arrivalTime", arrival)?;
    }

    let response_time = match input.response_time {
        Some(rt) if rt.is_known() => rt,
        _ => derive_response_time(time_called, arrival_time)?,
    };

    let specialty = match non_blank(input.specialty.as_deref()) {
        Some(s) => s.to_string(),
        None => specialists
            .get(specialist_id)?
            .map(|s| s.department)
            .unwrap_or_default(),
    };

    let log = repo.insert(ConsultationLog {
        id: 0,
        date,
        shift,
        er_doctor_id,
        time_called: time_called.to_string(),
        specialist_id,
        specialty,
        arrival_time: arrival_time.map(str::to_string),
        response_time,
        patient_id: patient_id.to_string(),
        outcome,
        urgent: input.urgent.unwrap_or(false),
        notes: input.notes,
        created_at: Utc::now(),
        updated_at: None,
    })?;

    tracing::info!(
        id = log.id,
        outcome = %log.outcome,
        urgent = log.urgent,
        "Consultation log added"
    );
    Ok(log)
}

/// Apply a partial update. The id is never changed. Moving either clock
/// without an explicit response time re-derives it.
pub fn update_log(
    repo: &dyn Repository<ConsultationLog>,
    id: u32,
    input: ConsultationLogInput,
) -> Result<ConsultationLog, StoreError> {
    repo.modify(id, &mut |log| {
        if let Some(date) = input.date {
            log.date = date;
        }
        if let Some(shift) = input.shift {
            log.shift = shift;
        }
        if let Some(doctor) = input.er_doctor_id {
            log.er_doctor_id = doctor;
        }
        if let Some(called) = input.time_called.as_deref() {
            parse_clock("timeCalled", called)?;
            log.time_called = called.trim().to_string();
        }
        if let Some(specialist) = input.specialist_id {
            log.specialist_id = specialist;
        }
        if let Some(specialty) = input.specialty.as_deref() {
            log.specialty = specialty.trim().to_string();
        }
        if let Some(arrival) = input.arrival_time.as_deref() {
            match non_blank(Some(arrival)) {
                Some(arrival) => {
                    parse_clock("arrivalTime", arrival)?;
                    log.arrival_time = Some(arrival.to_string());
                }
                None => log.arrival_time = None,
            }
        }
        match input.response_time {
            Some(rt) => log.response_time = rt,
            None if input.time_called.is_some() || input.arrival_time.is_some() => {
                log.response_time =
                    derive_response_time(&log.time_called, log.arrival_time.as_deref())?;
            }
            None => {}
        }
        if let Some(patient) = input.patient_id.as_deref() {
            log.patient_id = non_blank(Some(patient))
                .ok_or_else(|| StoreError::Validation("patientId cannot be empty".into()))?
                .to_string();
        }
        if let Some(outcome) = input.outcome {
            log.outcome = outcome;
        }
        if let Some(urgent) = input.urgent {
            log.urgent = urgent;
        }
        if input.notes.is_some() {
            log.notes = input.notes.clone();
        }
        log.updated_at = Some(Utc::now());
        Ok(())
    })
}

pub fn delete_log(
    repo: &dyn Repository<ConsultationLog>,
    id: u32,
) -> Result<ConsultationLog, StoreError> {
    let removed = repo.delete(id)?;
    tracing::info!(id, "Consultation log deleted");
    Ok(removed)
}
