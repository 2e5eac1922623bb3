//! Sample roster loaded at startup when seeding is enabled.
//!
//! Dates are relative to the current service day so that the on-call
//! board and the recent-log views have something to show.

use chrono::{Days, NaiveDate};

use crate::consultation::add_log;
use crate::doctors::add_doctor;
use crate::models::{
    ConsultationLog, ConsultationLogInput, Doctor, DoctorInput, OnCallInput, Outcome, Shift,
    Specialist, SpecialistInput, SpecialistOnCall,
};
use crate::on_call::add_on_call;
use crate::specialists::add_specialist;

use super::{Repository, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub doctors: usize,
    pub specialists: usize,
    pub on_call: usize,
    pub consultation_logs: usize,
}

const DOCTORS: &[(&str, &str, &str)] = &[
    ("Sarah Lee", "Attending", "555-0101"),
    ("Omar Haddad", "Resident", "555-0102"),
    ("Grace Mensah", "Attending", "555-0103"),
];

const SPECIALISTS: &[(&str, &str, &str)] = &[
    ("Daniel Okafor", "Cardiology", "555-0201"),
    ("Priya Raman", "Neurology", "555-0202"),
    ("Marc Tremblay", "General Surgery", "555-0203"),
    ("Aiko Tanaka", "Orthopedics", "555-0204"),
];

fn email(name: &str) -> String {
    format!("{}@er.example", name.to_lowercase().replace(' ', "."))
}

fn days_before(day: NaiveDate, n: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(n)).unwrap_or(day)
}

/// Fill empty repositories with sample data. `today` is the current
/// service day.
pub fn seed_sample_data(
    today: NaiveDate,
    doctors: &dyn Repository<Doctor>,
    specialists: &dyn Repository<Specialist>,
    on_call: &dyn Repository<SpecialistOnCall>,
    logs: &dyn Repository<ConsultationLog>,
) -> Result<SeedSummary, StoreError> {
    for (name, position, phone) in DOCTORS {
        add_doctor(
            doctors,
            DoctorInput {
                name: Some(name.to_string()),
                email: Some(email(name)),
                phone: Some(phone.to_string()),
                position: Some(position.to_string()),
            },
        )?;
    }

    let mut specialist_rows = Vec::new();
    for (name, department, phone) in SPECIALISTS {
        specialist_rows.push(add_specialist(
            specialists,
            SpecialistInput {
                name: Some(name.to_string()),
                email: Some(email(name)),
                phone: Some(phone.to_string()),
                department: Some(department.to_string()),
            },
        )?);
    }

    for specialist in &specialist_rows {
        for offset in [0, 1] {
            add_on_call(
                on_call,
                OnCallInput {
                    specialist_id: Some(specialist.id),
                    start_date: Some(days_before(today, offset)),
                    department: Some(specialist.department.clone()),
                },
            )?;
        }
    }

    let samples = [
        (0, Shift::Morning, 1, "09:15", 1, Some("09:35"), "ER-1001", Outcome::Admitted, true),
        (1, Shift::Evening, 2, "18:40", 2, Some("19:25"), "ER-1002", Outcome::Discharged, false),
        (2, Shift::Night, 3, "02:05", 3, Some("02:20"), "ER-1003", Outcome::Admitted, true),
        (3, Shift::Morning, 1, "11:00", 4, None, "ER-1004", Outcome::PatientReferred, false),
        (5, Shift::Night, 2, "23:50", 1, Some("00:30"), "ER-1005", Outcome::Dama, false),
    ];
    for (ago, shift, doctor, called, specialist, arrived, patient, outcome, urgent) in samples {
        add_log(
            logs,
            specialists,
            ConsultationLogInput {
                date: Some(days_before(today, ago)),
                shift: Some(shift),
                er_doctor_id: Some(doctor),
                time_called: Some(called.to_string()),
                specialist_id: Some(specialist),
                arrival_time: arrived.map(str::to_string),
                patient_id: Some(patient.to_string()),
                outcome: Some(outcome),
                urgent: Some(urgent),
                ..Default::default()
            },
        )?;
    }

    let summary = SeedSummary {
        doctors: doctors.count()?,
        specialists: specialists.count()?,
        on_call: on_call.count()?,
        consultation_logs: logs.count()?,
    };
    tracing::info!(
        doctors = summary.doctors,
        specialists = summary.specialists,
        on_call = summary.on_call,
        consultation_logs = summary.consultation_logs,
        "Sample data seeded"
    );
    Ok(summary)
}
