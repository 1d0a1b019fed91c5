//! Correlation id generation for bridge messages.

use uuid::Uuid;

/// Generates a fresh, process-unique correlation id for a `BridgeMessage`.
///
/// UUID v4 is sufficient here: the only requirement (§3) is uniqueness for
/// the lifetime of a host process, not orderability.
pub fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = new_message_id();
        let b = new_message_id();
        assert_ne!(a, b);
    }
}
