//! Registration ID generator.

use uuid::Uuid;

/// Generates identifiers for registry entries.
pub struct IdGenerator;

impl IdGenerator {
    /// Generates a unique registration ID for a published record.
    ///
    /// # Returns
    /// A UUID v4 string.
    pub fn registration_id() -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_id_is_unique() {
        assert_ne!(IdGenerator::registration_id(), IdGenerator::registration_id());
    }
}
