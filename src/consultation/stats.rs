//! Aggregate statistics over consultation logs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::ConsultationLog;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorCount {
    pub doctor_id: u32,
    pub doctor_name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationStatistics {
    pub total: usize,
    pub admitted: usize,
    pub urgent: usize,
    pub dama: usize,
    /// Rounded integer percentage of admitted logs.
    pub admission_rate: u32,
    pub urgent_rate: u32,
    pub dama_rate: u32,
    pub by_shift: BTreeMap<String, usize>,
    pub by_specialty: BTreeMap<String, usize>,
    pub by_outcome: BTreeMap<String, usize>,
    /// Busiest doctor first.
    pub by_doctor: Vec<DoctorCount>,
    /// Mean minutes over logs with a known response time.
    pub average_response_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseTimeStats {
    /// Logs with a usable response time.
    pub count: usize,
    pub average: f64,
    pub min: u32,
    pub max: u32,
    pub median: f64,
}

/// `round(100 * part / total)`, or 0 for an empty set.
pub fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 * 100.0) / total as f64).round() as u32
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn known_minutes(logs: &[ConsultationLog]) -> Vec<u32> {
    logs.iter()
        .filter_map(|log| log.response_time.as_minutes())
        .collect()
}

/// Mean response time in minutes, skipping logs without one. Returns 0
/// when no log qualifies.
pub fn average_response_time(logs: &[ConsultationLog]) -> f64 {
    let minutes = known_minutes(logs);
    if minutes.is_empty() {
        return 0.0;
    }
    let sum: u64 = minutes.iter().map(|&m| u64::from(m)).sum();
    round_tenths(sum as f64 / minutes.len() as f64)
}

pub fn response_time_stats(logs: &[ConsultationLog]) -> ResponseTimeStats {
    let mut minutes = known_minutes(logs);
    if minutes.is_empty() {
        return ResponseTimeStats {
            count: 0,
            average: 0.0,
            min: 0,
            max: 0,
            median: 0.0,
        };
    }
    minutes.sort_unstable();

    let count = minutes.len();
    let median = if count % 2 == 0 {
        (f64::from(minutes[count / 2 - 1]) + f64::from(minutes[count / 2])) / 2.0
    } else {
        f64::from(minutes[count / 2])
    };

    ResponseTimeStats {
        count,
        average: average_response_time(logs),
        min: minutes[0],
        max: minutes[count - 1],
        median: round_tenths(median),
    }
}

/// Overview statistics. `doctor_name` resolves ER doctor ids for the
/// per-doctor breakdown.
pub fn statistics(
    logs: &[ConsultationLog],
    doctor_name: &dyn Fn(u32) -> String,
) -> ConsultationStatistics {
    let total = logs.len();
    let admitted = logs.iter().filter(|l| l.outcome.is_admitted()).count();
    let urgent = logs.iter().filter(|l| l.urgent).count();
    let dama = logs.iter().filter(|l| l.outcome.is_dama()).count();

    let mut by_shift = BTreeMap::new();
    let mut by_specialty = BTreeMap::new();
    let mut by_outcome = BTreeMap::new();
    let mut per_doctor: BTreeMap<u32, usize> = BTreeMap::new();

    for log in logs {
        *by_shift.entry(log.shift.as_str().to_string()).or_insert(0) += 1;
        let specialty = if log.specialty.is_empty() {
            "Unspecified".to_string()
        } else {
            log.specialty.clone()
        };
        *by_specialty.entry(specialty).or_insert(0) += 1;
        *by_outcome.entry(log.outcome.as_str().to_string()).or_insert(0) += 1;
        *per_doctor.entry(log.er_doctor_id).or_insert(0) += 1;
    }

    let mut by_doctor: Vec<DoctorCount> = per_doctor
        .into_iter()
        .map(|(doctor_id, count)| DoctorCount {
            doctor_id,
            doctor_name: doctor_name(doctor_id),
            count,
        })
        .collect();
    by_doctor.sort_by(|a, b| b.count.cmp(&a.count).then(a.doctor_id.cmp(&b.doctor_id)));

    ConsultationStatistics {
        total,
        admitted,
        urgent,
        dama,
        admission_rate: percentage(admitted, total),
        urgent_rate: percentage(urgent, total),
        dama_rate: percentage(dama, total),
        by_shift,
        by_specialty,
        by_outcome,
        by_doctor,
        average_response_time: average_response_time(logs),
    }
}
