use serde::Serialize;

use crate::features::shared::fields::Field;
use crate::features::shared::validation::{
    clean_optional, min_length_message, FieldErrors, BLANK, NULL, REQUIRED,
};

pub const NAME_MAX_LENGTH: usize = 255;
pub const EMAIL_MAX_LENGTH: usize = 255;
pub const PHONE_MAX_LENGTH: usize = 16;
pub const PASSWORD_MIN_LENGTH: usize = 5;

pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const DUPLICATE_EMAIL: &str = "user with this email already exists.";
pub const BAD_CREDENTIALS: &str = "Unable to authenticate with provided credentials";

/// Body of `POST /users/token`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Password as typed; whitespace is significant and never trimmed
pub(crate) fn clean_password(errors: &mut FieldErrors, field: &str, value: Field<String>) -> String {
    match value {
        Field::Missing => {
            errors.add(field, REQUIRED);
            String::new()
        },
        Field::Null => {
            errors.add(field, NULL);
            String::new()
        },
        Field::Value(password) => {
            if password.is_empty() {
                errors.add(field, BLANK);
            } else if password.chars().count() < PASSWORD_MIN_LENGTH {
                errors.add(field, min_length_message(PASSWORD_MIN_LENGTH));
            }
            password
        },
    }
}

/// Phone is optional; blank and null both store no number
pub(crate) fn clean_phone(errors: &mut FieldErrors, value: Field<String>) -> Option<String> {
    let value = match value {
        Field::Null => return None,
        other => other,
    };
    let phone = clean_optional(errors, "phone", value, PHONE_MAX_LENGTH);
    (!phone.is_empty()).then_some(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_password() {
        let mut errors = FieldErrors::new();
        assert_eq!(clean_password(&mut errors, "password", Field::Value(" pass word ".into())), " pass word ");
        assert!(errors.is_empty());

        clean_password(&mut errors, "password", Field::Value("abcd".into()));
        assert_eq!(errors.get("password").unwrap(), [min_length_message(5)]);
    }

    #[test]
    fn test_clean_phone() {
        let mut errors = FieldErrors::new();
        assert_eq!(clean_phone(&mut errors, Field::Null), None);
        assert_eq!(clean_phone(&mut errors, Field::Value("  ".into())), None);
        assert_eq!(clean_phone(&mut errors, Field::Value("+27 82 555".into())).as_deref(), Some("+27 82 555"));
        assert!(errors.is_empty());

        clean_phone(&mut errors, Field::Value("0".repeat(17)));
        assert!(errors.contains("phone"));
    }
}
