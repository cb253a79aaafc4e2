use crate::core::error::SyncError;

/// Rejects blank required fields, naming all of them in one message
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), SyncError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Invalid(format!("Missing fields: {}", missing.join(", "))))
    }
}
