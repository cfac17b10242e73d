use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Cash flows and terms must align in number")]
    LengthMismatch { cash_flows: usize, terms: usize },
    #[error("All inputs must be positive")]
    NonPositiveSchedule,
    #[error("Provide at least one bond option")]
    NoBonds,
    #[error("Bond details must be positive")]
    InvalidBond { index: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LadderError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Critical error: {0}")]
    Unexpected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_distinct() {
        let messages = [
            ValidationError::LengthMismatch {
                cash_flows: 2,
                terms: 3,
            }
            .to_string(),
            ValidationError::NonPositiveSchedule.to_string(),
            ValidationError::NoBonds.to_string(),
            ValidationError::InvalidBond { index: 0 }.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn ladder_error_wraps_validation_message_verbatim() {
        let err: LadderError = ValidationError::NoBonds.into();
        assert_eq!(err.to_string(), "Provide at least one bond option");
    }

    #[test]
    fn unexpected_error_uses_generic_prefix() {
        let err = LadderError::Unexpected("invalid float literal".to_string());
        assert_eq!(err.to_string(), "Critical error: invalid float literal");
    }
}
