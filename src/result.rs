extern crate anyhow;
extern crate thiserror;

pub type DashResult<T> = anyhow::Result<T>;

pub fn make_error(msg: &str) -> anyhow::Error {
    return anyhow::anyhow!("{}", msg);
}

// Everything that can go wrong while loading arrivals for a station. These
// never escape the dashboard: they only move it into the error state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {}", .status.map(|s| format!("status {}", s)).unwrap_or_else(|| "no response".to_string()))]
    Http { status: Option<u16> },

    #[error("API error: {message}")]
    Api { message: String },

    #[error("Unreadable response: {message}")]
    Decode { message: String },
}
