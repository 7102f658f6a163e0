use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised by the HTTP-facing parts of the crate.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// The request never produced a response.
    #[error("Request to {service} failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{service} request failed with status {status}: {body}")]
    Status {
        service: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse {service} response: {message}")]
    Parse {
        service: &'static str,
        message: String,
    },

    #[error("{service} response is missing `{field}`")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },

    #[error("No coordinates found for '{0}'")]
    NoResults(String),

    #[error("No usable forecast data from {0}")]
    NoForecast(&'static str),

    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    #[error("No API key configured for provider '{0}'")]
    NotConfigured(&'static str),
}

impl WeatherError {
    pub(crate) fn parse(service: &'static str, message: impl ToString) -> Self {
        Self::Parse {
            service,
            message: message.to_string(),
        }
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;

/// Keep error messages readable when a service returns an HTML error page.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn truncate_cuts_on_char_boundary() {
        let body = "é".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
