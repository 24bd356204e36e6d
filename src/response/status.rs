//! Status line value object.

use axum::http::StatusCode;

/// A response status line: numeric code and optional reason phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStatus {
    pub code: u16,
    pub reason: Option<String>,
}

impl HttpStatus {
    pub fn new(code: u16, reason: Option<String>) -> Self {
        Self { code, reason }
    }

    /// The explicit reason, else the canonical one for the code.
    pub fn reason_or_canonical(&self) -> Option<&str> {
        self.reason.as_deref().or_else(|| {
            StatusCode::from_u16(self.code)
                .ok()
                .and_then(|code| code.canonical_reason())
        })
    }
}

impl From<u16> for HttpStatus {
    fn from(code: u16) -> Self {
        Self { code, reason: None }
    }
}

impl From<StatusCode> for HttpStatus {
    fn from(code: StatusCode) -> Self {
        Self {
            code: code.as_u16(),
            reason: None,
        }
    }
}

impl std::fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason_or_canonical() {
            Some(reason) => write!(f, "{} {}", self.code, reason),
            None => write!(f, "{}", self.code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(HttpStatus::from(404).to_string(), "404 Not Found");
        assert_eq!(HttpStatus::new(200, Some("Fine".into())).to_string(), "200 Fine");
        assert_eq!(HttpStatus::from(299).to_string(), "299");
    }
}
