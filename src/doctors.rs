//! ER doctor directory.

use chrono::Utc;

use crate::models::{Doctor, DoctorInput};
use crate::store::{non_blank, require_fields, Repository, StoreError};

pub fn list_doctors(repo: &dyn Repository<Doctor>) -> Result<Vec<Doctor>, StoreError> {
    repo.list()
}

pub fn find_doctor(repo: &dyn Repository<Doctor>, id: u32) -> Result<Doctor, StoreError> {
    repo.get(id)?
        .ok_or_else(|| StoreError::not_found("doctor", id))
}

/// Case-insensitive substring match on the doctor's name.
pub fn search_doctors(
    repo: &dyn Repository<Doctor>,
    term: &str,
) -> Result<Vec<Doctor>, StoreError> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return repo.list();
    }
    repo.filter(&|d| d.name.to_lowercase().contains(&needle))
}

pub fn add_doctor(
    repo: &dyn Repository<Doctor>,
    input: DoctorInput,
) -> Result<Doctor, StoreError> {
    let name = non_blank(input.name.as_deref());
    require_fields(if name.is_none() { vec!["name"] } else { vec![] })?;
    let Some(name) = name else {
        return Err(StoreError::Validation("Incomplete doctor".into()));
    };

    repo.insert(Doctor {
        id: 0,
        name: name.to_string(),
        email: input.email,
        phone: input.phone,
        position: input.position,
        created_at: Utc::now(),
        updated_at: None,
    })
}

pub fn update_doctor(
    repo: &dyn Repository<Doctor>,
    id: u32,
    input: DoctorInput,
) -> Result<Doctor, StoreError> {
    repo.modify(id, &mut |doctor| {
        if let Some(name) = input.name.as_deref() {
            let name = non_blank(Some(name))
                .ok_or_else(|| StoreError::Validation("name cannot be empty".into()))?;
            doctor.name = name.to_string();
        }
        if input.email.is_some() {
            doctor.email = input.email.clone();
        }
        if input.phone.is_some() {
            doctor.phone = input.phone.clone();
        }
        if input.position.is_some() {
            doctor.position = input.position.clone();
        }
        doctor.updated_at = Some(Utc::now());
        Ok(())
    })
}

pub fn delete_doctor(repo: &dyn Repository<Doctor>, id: u32) -> Result<Doctor, StoreError> {
    repo.delete(id)
}

/// Display name for a doctor id. Logs may reference doctors that were
/// deleted, so a missing id yields a placeholder instead of an error.
pub fn doctor_display_name(repo: &dyn Repository<Doctor>, id: u32) -> String {
    match repo.get(id) {
        Ok(Some(doctor)) => doctor.name,
        _ => format!("Unknown (#{id})"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRepository;

    fn input(name: &str) -> DoctorInput {
        DoctorInput {
            name: Some(name.into()),
            email: Some(format!("{}@er.example", name.to_lowercase().replace(' ', "."))),
            ..Default::default()
        }
    }

    #[test]
    fn add_requires_name() {
        let repo = MemoryRepository::new();
        let err = add_doctor(&repo, DoctorInput::default()).unwrap_err();
        assert!(err.to_string().contains("name"));

        let err = add_doctor(&repo, input("   ")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn add_then_find_returns_same_doctor() {
        let repo = MemoryRepository::new();
        let created = add_doctor(&repo, input("Sarah Lee")).unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(find_doctor(&repo, 1).unwrap(), created);
    }

    #[test]
    fn update_changes_only_present_fields() {
        let repo = MemoryRepository::new();
        add_doctor(&repo, input("Sarah Lee")).unwrap();
        let updated = update_doctor(
            &repo,
            1,
            DoctorInput {
                phone: Some("555-0101".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.name, "Sarah Lee");
        assert_eq!(updated.phone.as_deref(), Some("555-0101"));
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn update_rejects_blank_name() {
        let repo = MemoryRepository::new();
        add_doctor(&repo, input("Sarah Lee")).unwrap();
        let err = update_doctor(&repo, 1, input(" ")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(find_doctor(&repo, 1).unwrap().name, "Sarah Lee");
    }

    #[test]
    fn search_is_case_insensitive() {
        let repo = MemoryRepository::new();
        add_doctor(&repo, input("Sarah Lee")).unwrap();
        add_doctor(&repo, input("Omar Haddad")).unwrap();
        let found = search_doctors(&repo, "HADD").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Omar Haddad");
        assert_eq!(search_doctors(&repo, "").unwrap().len(), 2);
    }

    #[test]
    fn display_name_tolerates_dangling_id() {
        let repo = MemoryRepository::new();
        add_doctor(&repo, input("Sarah Lee")).unwrap();
        assert_eq!(doctor_display_name(&repo, 1), "Sarah Lee");
        assert_eq!(doctor_display_name(&repo, 9), "Unknown (#9)");
    }

    #[test]
    fn delete_missing_is_not_found() {
        let repo: MemoryRepository<Doctor> = MemoryRepository::new();
        assert!(matches!(
            delete_doctor(&repo, 3).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
