// Common validation types

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Require a syntactically plausible email address
    pub fn check_email(&mut self, field: &str, email: &str) {
        let looks_valid = email.contains('@')
            && email.rsplit('@').next().map_or(false, |d| d.contains('.'))
            && !email.starts_with('@')
            && !email.ends_with('@');
        if !looks_valid {
            self.add_error(field, "must be a valid email address");
        }
    }

    pub fn check_not_empty(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add_error(field, "is required");
        }
    }

    pub fn check_min_length(&mut self, field: &str, value: &str, min: usize) {
        if value.len() < min {
            self.add_error(field, &format!("must be at least {} characters", min));
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        let mut result = ValidationResult::new();
        result.check_email("email", "user@example.com");
        assert!(result.is_valid);

        let mut result = ValidationResult::new();
        result.check_email("email", "not-an-email");
        assert!(!result.is_valid);

        let mut result = ValidationResult::new();
        result.check_email("email", "@example.com");
        assert!(!result.is_valid);
    }

    #[test]
    fn test_min_length() {
        let mut result = ValidationResult::new();
        result.check_min_length("password", "short", 8);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].field, "password");

        let mut result = ValidationResult::new();
        result.check_min_length("password", "long enough", 8);
        assert!(result.is_valid);
    }

    #[test]
    fn test_errors_accumulate() {
        let mut result = ValidationResult::new();
        result.check_not_empty("name", "  ");
        result.check_email("email", "bad");
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
    }
}
