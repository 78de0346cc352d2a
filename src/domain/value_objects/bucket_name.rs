use crate::domain::errors::ValidationError;

/// A validated bucket name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    /// Create a new BucketName with validation.
    ///
    /// The remote service accepts lowercase letters, digits, hyphens,
    /// underscores and dots, up to 100 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyBucketName);
        }

        if value.len() > 100 {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max: 100,
            });
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase()
                && !c.is_ascii_digit()
                && c != '-'
                && c != '_'
                && c != '.'
            {
                return Err(ValidationError::BucketNameInvalidCharacter(c));
            }
        }

        Ok(Self(value))
    }

    /// Get the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
