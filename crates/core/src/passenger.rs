//! Single passenger creation request and field rules shared with bulk import.

use serde::Deserialize;
use validator::{Validate, ValidateEmail};

use crate::bulk_import::PassengerCandidate;

/// Role assigned to every passenger account.
pub const PASSENGER_ROLE: &str = "passenger";

/// Base URL for generated avatars; the email is appended as the seed.
pub const AVATAR_BASE_URL: &str = "https://i.pravatar.cc/150?u=";

/// Body of `POST /api/v1/passengers`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPassenger {
    #[validate(email(message = "Correo electrónico inválido"))]
    pub email: String,
    #[validate(length(min = 1, message = "La contraseña es obligatoria"))]
    pub password: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 1, max = 50))]
    pub phone: String,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    #[validate(length(min = 1, max = 50))]
    pub employee_id: String,
    #[validate(length(min = 1, max = 500))]
    pub home_address: String,
}

impl From<NewPassenger> for PassengerCandidate {
    fn from(p: NewPassenger) -> Self {
        Self {
            email: p.email.trim().to_string(),
            password: p.password,
            full_name: p.full_name.trim().to_string(),
            phone: p.phone.trim().to_string(),
            department: p.department.trim().to_string(),
            employee_id: p.employee_id.trim().to_string(),
            home_address: p.home_address.trim().to_string(),
        }
    }
}

/// Whether `email` is syntactically acceptable for an account.
pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

/// Avatar URL derived from the account email.
pub fn avatar_url_for(email: &str) -> String {
    format!("{AVATAR_BASE_URL}{email}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> NewPassenger {
        NewPassenger {
            email: " ana@corp.com ".into(),
            password: "secret1".into(),
            full_name: "Ana Ruiz".into(),
            phone: "555-0101".into(),
            department: "Logística".into(),
            employee_id: "E-001".into(),
            home_address: "Calle 1".into(),
        }
    }

    #[test]
    fn email_check() {
        assert!(is_valid_email("ana@corp.com"));
        assert!(!is_valid_email("ana.corp.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn empty_department_fails_validation() {
        let mut req = request();
        req.email = "ana@corp.com".into();
        req.department = String::new();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("department"));
    }

    #[test]
    fn conversion_trims_everything_but_the_password() {
        let mut req = request();
        req.password = " spaced ".into();
        let candidate = PassengerCandidate::from(req);
        assert_eq!(candidate.email, "ana@corp.com");
        assert_eq!(candidate.password, " spaced ");
    }

    #[test]
    fn avatar_is_seeded_by_email() {
        assert_eq!(
            avatar_url_for("ana@corp.com"),
            "https://i.pravatar.cc/150?u=ana@corp.com"
        );
    }
}
