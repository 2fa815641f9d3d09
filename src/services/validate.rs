use crate::error::FieldErrors;
use crate::services::error::ServiceError;

pub const USER_NAME_MAX: usize = 50;
pub const NAME_MAX: usize = 100;
pub const TEXT_MAX: usize = 500;
pub const TITLE_MAX: usize = 200;
pub const LONG_TEXT_MAX: usize = 1000;
pub const MISC_TYPE_MAX: usize = 100;

/// Collects per-field problems; `finish` turns them into one error
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blank, at most `max` characters
    pub fn required(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.trim().is_empty() {
            self.reject(field, "must not be empty".to_string());
        } else {
            self.max_len(field, value, max);
        }
        self
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) -> &mut Self {
        if value.chars().count() > max {
            self.reject(field, format!("must be at most {} characters", max));
        }
        self
    }

    pub fn optional_max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
        if let Some(value) = value {
            self.max_len(field, value, max);
        }
        self
    }

    pub fn check(&mut self, field: &str, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.reject(field, message.to_string());
        }
        self
    }

    fn reject(&mut self, field: &str, message: String) {
        self.errors.entry(field.to_string()).or_insert(message);
    }

    pub fn finish(&mut self) -> Result<(), ServiceError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ServiceError::Validation(std::mem::take(&mut self.errors)))
        }
    }
}

/// For required name/title fields an empty update means "leave unchanged"
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_every_failing_field() {
        let err = Validator::new()
            .required("name", "  ", 100)
            .max_len("description", &"x".repeat(501), 500)
            .required("notes", "fine", 500)
            .finish()
            .unwrap_err();

        match err {
            ServiceError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields["name"], "must not be empty");
                assert!(fields.contains_key("description"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        assert!(Validator::new().required("name", &"世".repeat(100), 100).finish().is_ok());
        assert!(Validator::new().required("name", &"世".repeat(101), 100).finish().is_err());
    }

    #[test]
    fn empty_update_values_mean_unchanged() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("Ardent".to_string())), Some("Ardent".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
