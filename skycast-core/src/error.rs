use thiserror::Error;

/// Failure taxonomy for a single pipeline run.
///
/// Every variant is terminal for the run that raised it and never fatal to the
/// process: the dashboard stays interactive and a previously published view
/// stays visible. No failure class is retried automatically.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No API key available; rejected before any request is issued.
    #[error("no OpenWeather API key is configured")]
    MissingCredential,

    /// The search input failed validation; rejected before any request is issued.
    #[error("invalid search input: {0}")]
    InvalidInput(String),

    /// The geocoder returned no match, or an endpoint answered 404.
    #[error("city '{0}' was not found")]
    NotFound(String),

    /// 429 from the upstream service.
    #[error("the weather service is rate limiting requests")]
    RateLimited,

    /// 401 from the upstream service.
    #[error("the weather service rejected the API key")]
    Unauthorized,

    /// No response at all: connect failure or the 10 second timeout elapsed.
    #[error("no response from the weather service")]
    NetworkUnreachable,

    /// A 2xx response whose body was missing or not decodable.
    #[error("unusable response from the weather service: {0}")]
    UpstreamMalformed(String),

    /// Any other upstream failure, carrying the upstream message.
    #[error("weather lookup failed: {0}")]
    Unknown(String),
}

impl QueryError {
    /// Message for the dashboard notice area.
    ///
    /// Fixed per variant; upstream text leaks through only for `Unknown`.
    pub fn user_message(&self) -> String {
        match self {
            QueryError::MissingCredential => {
                "API key is missing. Run `skycast configure` or set OPENWEATHER_API_KEY."
                    .to_string()
            }
            QueryError::InvalidInput(message) => message.clone(),
            QueryError::NotFound(query) => format!(
                "City \"{query}\" not found. Please check the spelling or try a different city name."
            ),
            QueryError::RateLimited => "Too many requests. Please try again later.".to_string(),
            QueryError::Unauthorized => {
                "Invalid API key. Please check your configuration.".to_string()
            }
            QueryError::NetworkUnreachable => {
                "No response received from weather service. Please check your internet connection."
                    .to_string()
            }
            QueryError::UpstreamMalformed(_) => "Failed to fetch weather data.".to_string(),
            QueryError::Unknown(detail) => format!("Error: {detail}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_echoes_the_query() {
        let err = QueryError::NotFound("Atlantis".to_string());
        assert!(err.user_message().contains("\"Atlantis\""));
    }

    #[test]
    fn unauthorized_message_is_fixed() {
        let err = QueryError::Unauthorized;
        assert_eq!(
            err.user_message(),
            "Invalid API key. Please check your configuration."
        );
    }

    #[test]
    fn invalid_input_message_passes_through() {
        let err = QueryError::InvalidInput("Please enter a city name".to_string());
        assert_eq!(err.user_message(), "Please enter a city name");
    }

    #[test]
    fn only_unknown_carries_upstream_text() {
        let err = QueryError::Unknown("status 500: boom".to_string());
        assert!(err.user_message().contains("boom"));

        let err = QueryError::UpstreamMalformed("truncated body".to_string());
        assert!(!err.user_message().contains("truncated body"));
    }
}
