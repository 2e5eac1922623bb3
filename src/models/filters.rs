use chrono::NaiveDate;
use serde::Deserialize;

use super::enums::{Outcome, Shift};

/// Combined consultation-log filter. Every present field must match.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationFilter {
    pub shift: Option<Shift>,
    pub outcome: Option<Outcome>,
    pub urgent: Option<bool>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub doctor: Option<u32>,
    pub specialist: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct DoctorFilter {
    pub search: Option<String>,
}
