use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Record;

use super::enums::{Outcome, Shift};
use super::response_time::ResponseTime;

/// One ER-to-specialist consultation: who called, when the specialist
/// arrived and what happened to the patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationLog {
    pub id: u32,
    pub date: NaiveDate,
    pub shift: Shift,
    pub er_doctor_id: u32,
    /// `HH:MM`
    pub time_called: String,
    pub specialist_id: u32,
    pub specialty: String,
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub response_time: ResponseTime,
    pub patient_id: String,
    pub outcome: Outcome,
    #[serde(default)]
    pub urgent: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for ConsultationLog {
    const ENTITY: &'static str = "consultation_log";

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }
}

/// Create/update payload. Create requires date, shift, erDoctorId,
/// timeCalled, specialistId, patientId and outcome.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationLogInput {
    pub date: Option<NaiveDate>,
    pub shift: Option<Shift>,
    pub er_doctor_id: Option<u32>,
    pub time_called: Option<String>,
    pub specialist_id: Option<u32>,
    pub specialty: Option<String>,
    pub arrival_time: Option<String>,
    pub response_time: Option<ResponseTime>,
    pub patient_id: Option<String>,
    pub outcome: Option<Outcome>,
    pub urgent: Option<bool>,
    pub notes: Option<String>,
}
