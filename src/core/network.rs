use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Exposes the globally configured ureq Agent for timing-document requests.
pub fn get_agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .timeout_global(Some(REQUEST_TIMEOUT))
        .build()
        .into()
}
