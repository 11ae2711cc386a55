/// Crate-wide result alias.
pub type SlidereelResult<T> = Result<T, SlidereelError>;

/// Crate-wide error type.
///
/// Variants map onto the pipeline's failure taxonomy: `Validation` covers
/// malformed requests and invariant breaches (a client-side problem),
/// `Resolution` covers asset-reference resolution, and `Render` covers
/// engine stage failures and timeouts (server-side, fatal for the job).
#[derive(thiserror::Error, Debug)]
pub enum SlidereelError {
    /// Malformed request body or broken model invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Asset reference could not be resolved into a render source.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Rendering-engine stage failed or timed out.
    #[error("render error: {0}")]
    Render(String),

    /// Serialization or deserialization failure at a boundary.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other underlying failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidereelError {
    /// Build a [`SlidereelError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SlidereelError::Resolution`].
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Build a [`SlidereelError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`SlidereelError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` when this error is the caller's fault (bad request)
    /// rather than a pipeline failure.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Serde(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            SlidereelError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            SlidereelError::resolution("x")
                .to_string()
                .contains("resolution error:")
        );
        assert!(
            SlidereelError::render("x")
                .to_string()
                .contains("render error:")
        );
        assert!(
            SlidereelError::serde("x")
                .to_string()
                .contains("serialization error:")
        );
    }

    #[test]
    fn client_error_split() {
        assert!(SlidereelError::validation("x").is_client_error());
        assert!(SlidereelError::serde("x").is_client_error());
        assert!(!SlidereelError::render("x").is_client_error());
        assert!(!SlidereelError::resolution("x").is_client_error());
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = SlidereelError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
