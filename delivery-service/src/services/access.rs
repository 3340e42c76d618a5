/// Access-control boundary for segment delivery
///
/// Token issuance and real validation belong to an external collaborator;
/// this seam only decides whether a delivery request may proceed. One
/// trait, one implementation per deployment, injected at construction.

/// Decides whether a segment request's token is acceptable
pub trait AccessValidator: Send + Sync {
    fn validate(&self, token: Option<&str>) -> bool;
}

/// Default validator
///
/// When tokens are not required, everything passes. When required, the
/// token must be present and non-empty; anything stronger is delegated
/// upstream before requests reach this service.
pub struct TokenValidator {
    required: bool,
}

impl TokenValidator {
    pub fn new(required: bool) -> Self {
        Self { required }
    }
}

impl AccessValidator for TokenValidator {
    fn validate(&self, token: Option<&str>) -> bool {
        if !self.required {
            return true;
        }
        token.is_some_and(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissive_when_not_required() {
        let validator = TokenValidator::new(false);
        assert!(validator.validate(None));
        assert!(validator.validate(Some("")));
        assert!(validator.validate(Some("abc")));
    }

    #[test]
    fn test_required_rejects_missing_or_empty() {
        let validator = TokenValidator::new(true);
        assert!(!validator.validate(None));
        assert!(!validator.validate(Some("")));
        assert!(validator.validate(Some("abc")));
    }
}
