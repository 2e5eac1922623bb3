//! Consulting specialist directory.

use crate::models::{Specialist, SpecialistInput};
use crate::store::{non_blank, require_fields, Repository, StoreError};

pub fn list_specialists(
    repo: &dyn Repository<Specialist>,
) -> Result<Vec<Specialist>, StoreError> {
    repo.list()
}

pub fn find_specialist(
    repo: &dyn Repository<Specialist>,
    id: u32,
) -> Result<Specialist, StoreError> {
    repo.get(id)?
        .ok_or_else(|| StoreError::not_found("specialist", id))
}

pub fn specialists_by_department(
    repo: &dyn Repository<Specialist>,
    department: &str,
) -> Result<Vec<Specialist>, StoreError> {
    let department = department.trim();
    repo.filter(&|s| s.department.eq_ignore_ascii_case(department))
}

pub fn add_specialist(
    repo: &dyn Repository<Specialist>,
    input: SpecialistInput,
) -> Result<Specialist, StoreError> {
    let name = non_blank(input.name.as_deref());
    let department = non_blank(input.department.as_deref());

    let mut missing = Vec::new();
    if name.is_none() {
        missing.push("name");
    }
    if department.is_none() {
        missing.push("department");
    }
    require_fields(missing)?;
    let (Some(name), Some(department)) = (name, department) else {
        return Err(StoreError::Validation("Incomplete specialist".into()));
    };

    let record = Specialist {
        id: 0,
        name: name.to_string(),
        email: input.email.clone(),
        phone: input.phone.clone(),
        department: department.to_string(),
    };
    repo.insert(record)
}

pub fn update_specialist(
    repo: &dyn Repository<Specialist>,
    id: u32,
    input: SpecialistInput,
) -> Result<Specialist, StoreError> {
    repo.modify(id, &mut |specialist| {
        if let Some(name) = input.name.as_deref() {
            specialist.name = non_blank(Some(name))
                .ok_or_else(|| StoreError::Validation("name cannot be empty".into()))?
                .to_string();
        }
        if let Some(department) = input.department.as_deref() {
            specialist.department = non_blank(Some(department))
                .ok_or_else(|| StoreError::Validation("department cannot be empty".into()))?
                .to_string();
        }
        if input.email.is_some() {
            specialist.email = input.email.clone();
        }
        if input.phone.is_some() {
            specialist.phone = input.phone.clone();
        }
        Ok(())
    })
}

pub fn delete_specialist(
    repo: &dyn Repository<Specialist>,
    id: u32,
) -> Result<Specialist, StoreError> {
    repo.delete(id)
}

/// Display name for a specialist id, with a placeholder for dangling ids.
pub fn specialist_display_name(repo: &dyn Repository<Specialist>, id: u32) -> String {
    match repo.get(id) {
        Ok(Some(specialist)) => specialist.name,
        _ => format!("Unknown (#{id})"),
    }
}
