use rand::Rng;
use rand::distr::Alphanumeric;

/// Request/response header carrying the correlation id.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

const MAX_LEN: usize = 128;
const SUFFIX_LEN: usize = 9;

/// Identifier tying together every log line of one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// `req-<unix millis>-<9 random lowercase alphanumerics>`.
    pub fn generate() -> Self {
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(SUFFIX_LEN)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();
        Self(format!("req-{}-{suffix}", chrono::Utc::now().timestamp_millis()))
    }

    /// Reuse the caller's id when it is usable as a header value and log
    /// field; otherwise mint a new one.
    pub fn from_header(value: Option<&str>) -> Self {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= MAX_LEN && v.bytes().all(|b| b.is_ascii_graphic()))
            .map(|v| Self(v.to_string()))
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_have_request_shape() {
        let id = CorrelationId::generate();
        let parts: Vec<&str> = id.as_str().splitn(3, '-').collect();
        assert_eq!(parts[0], "req");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(CorrelationId::generate(), id);
    }

    #[test]
    fn caller_id_is_reused_when_usable() {
        assert_eq!(CorrelationId::from_header(Some(" abc-123 ")).as_str(), "abc-123");
        assert!(CorrelationId::from_header(None).as_str().starts_with("req-"));
        assert!(CorrelationId::from_header(Some("")).as_str().starts_with("req-"));
        assert!(CorrelationId::from_header(Some("has space")).as_str().starts_with("req-"));
        assert!(CorrelationId::from_header(Some(&"x".repeat(200))).as_str().starts_with("req-"));
    }
}
