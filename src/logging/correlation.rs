//! Correlation id generation

use uuid::Uuid;

/// Generate a new correlation id using UUID v4
///
/// Assigned when a call is dispatched and used to find the in-flight debug
/// record again when the call completes.
///
/// # Examples
///
/// ```
/// use knowhub::logging::generate_correlation_id;
///
/// let id = generate_correlation_id();
/// assert_eq!(id.len(), 36);
/// ```
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}
