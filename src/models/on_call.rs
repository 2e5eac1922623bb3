use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::store::Record;

use super::specialist::Specialist;

/// One specialist covering one department for the 24-hour window that
/// opens at 08:00 on `start_date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistOnCall {
    pub id: u32,
    pub specialist_id: u32,
    pub start_date: NaiveDate,
    pub department: String,
}

impl Record for SpecialistOnCall {
    const ENTITY: &'static str = "on_call";

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnCallInput {
    pub specialist_id: Option<u32>,
    pub start_date: Option<NaiveDate>,
    pub department: Option<String>,
}

/// Schedule entry joined with its specialist. `specialist` is `None`
/// when the schedule points at a specialist that no longer exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnCallEntry {
    pub schedule_id: u32,
    pub specialist_id: u32,
    pub specialist_name: String,
    pub specialist: Option<Specialist>,
    pub department: String,
    pub start_date: NaiveDate,
}
