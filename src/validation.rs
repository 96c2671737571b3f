/// Validates an email address shape: local@domain with a dotted domain
pub fn validate_email(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() {
        return Err("Email must contain a local part and a domain".to_string());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Email domain is invalid".to_string());
    }
    if value.contains(char::is_whitespace) {
        return Err("Email cannot contain whitespace".to_string());
    }
    Ok(())
}

/// Validates a username: 3 to 32 chars, alphanumeric plus underscore
pub fn validate_username(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.len() < 3 || value.len() > 32 {
        return Err("Username must be between 3 and 32 characters".to_string());
    }
    if !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("Username may only contain letters, digits and underscores".to_string());
    }
    Ok(())
}

/// Validates a password before hashing
pub fn validate_password(value: &str) -> Result<(), String> {
    if value.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }
    if value.len() > 72 {
        // bcrypt truncates input beyond 72 bytes
        return Err("Password must be at most 72 characters".to_string());
    }
    Ok(())
}

/// Validates the shape of a multiple-choice question
pub fn validate_question(
    prompt: &str,
    options: &[String],
    correct_option: i32,
    marks: i32,
) -> Result<(), String> {
    if prompt.trim().is_empty() {
        return Err("Question prompt cannot be empty".to_string());
    }
    if options.len() < 2 {
        return Err("A question needs at least two options".to_string());
    }
    if options.iter().any(|o| o.trim().is_empty()) {
        return Err("Question options cannot be empty".to_string());
    }
    if correct_option < 0 || correct_option as usize >= options.len() {
        return Err("Correct option index is out of range".to_string());
    }
    if marks <= 0 {
        return Err("Marks must be positive".to_string());
    }
    Ok(())
}

/// Validates exam timing and pass mark fields
pub fn validate_exam(title: &str, duration_minutes: i32, pass_percentage: i32) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Exam title cannot be empty".to_string());
    }
    if duration_minutes <= 0 {
        return Err("Exam duration must be positive".to_string());
    }
    if !(0..=100).contains(&pass_percentage) {
        return Err("Pass percentage must be between 0 and 100".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert_eq!(validate_email("student@example.com"), Ok(()));
        assert_eq!(
            validate_email(""),
            Err("Email cannot be empty".to_string())
        );
        assert_eq!(
            validate_email("no-at-sign"),
            Err("Email must contain a local part and a domain".to_string())
        );
        assert_eq!(
            validate_email("user@nodot"),
            Err("Email domain is invalid".to_string())
        );
        assert_eq!(
            validate_email("user@domain."),
            Err("Email domain is invalid".to_string())
        );
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("exam_taker_1"), Ok(()));
        assert_eq!(
            validate_username("ab"),
            Err("Username must be between 3 and 32 characters".to_string())
        );
        assert_eq!(
            validate_username("bad name"),
            Err("Username may only contain letters, digits and underscores".to_string())
        );
    }

    #[test]
    fn test_validate_password() {
        assert_eq!(validate_password("longenough"), Ok(()));
        assert_eq!(
            validate_password("short"),
            Err("Password must be at least 8 characters".to_string())
        );
        assert_eq!(
            validate_password(&"x".repeat(73)),
            Err("Password must be at most 72 characters".to_string())
        );
    }

    #[test]
    fn test_validate_question() {
        let options = vec!["Paris".to_string(), "Rome".to_string()];
        assert_eq!(validate_question("Capital of France?", &options, 0, 2), Ok(()));
        assert_eq!(
            validate_question("", &options, 0, 2),
            Err("Question prompt cannot be empty".to_string())
        );
        assert_eq!(
            validate_question("Capital?", &["Paris".to_string()], 0, 2),
            Err("A question needs at least two options".to_string())
        );
        assert_eq!(
            validate_question("Capital?", &options, 2, 2),
            Err("Correct option index is out of range".to_string())
        );
        assert_eq!(
            validate_question("Capital?", &options, -1, 2),
            Err("Correct option index is out of range".to_string())
        );
        assert_eq!(
            validate_question("Capital?", &options, 0, 0),
            Err("Marks must be positive".to_string())
        );
    }

    #[test]
    fn test_validate_exam() {
        assert_eq!(validate_exam("Banking Prelims Mock 1", 90, 40), Ok(()));
        assert_eq!(
            validate_exam("", 90, 40),
            Err("Exam title cannot be empty".to_string())
        );
        assert_eq!(
            validate_exam("Mock", 0, 40),
            Err("Exam duration must be positive".to_string())
        );
        assert_eq!(
            validate_exam("Mock", 90, 101),
            Err("Pass percentage must be between 0 and 100".to_string())
        );
    }
}
