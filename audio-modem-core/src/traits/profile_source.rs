use crate::models::error::ModemError;

/// Where the profile document comes from.
///
/// `fetch` runs on a background thread and may block.
pub trait ProfileSource: Send + Sync {
    /// Return the raw profile document stored at `location`.
    fn fetch(&self, location: &str) -> Result<String, ModemError>;
}
