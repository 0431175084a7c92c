//! ANSI SQL platform.

use super::{feature, FeatureSet, Platform};

/// A platform following ANSI SQL, used when the target system is unknown.
#[derive(Debug, Clone)]
pub struct GenericPlatform {
    features: FeatureSet,
}

impl GenericPlatform {
    /// Creates the generic platform.
    #[must_use]
    pub fn new() -> Self {
        let features = FeatureSet::new()
            .with(feature::CREATE_TABLE_IF_NOT_EXISTS, true)
            .with(feature::CREATE_TABLE_TEMPORARY, true)
            .with(feature::CREATE_TABLE_INLINE_AUTOINCREMENT, false)
            .with(feature::DROP_TABLE_IF_EXISTS, true)
            .with(feature::DROP_TABLE_CASCADE, true)
            .with(feature::INSERT_DEFAULT_VALUES, true)
            .with(feature::INSERT_EMPTY_VALUES, false)
            .with(feature::JOIN_RIGHT, true)
            .with(feature::JOIN_FULL, true)
            .with(feature::JOIN_NATURAL, true)
            .with(feature::LITERAL_BOOLEAN_KEYWORDS, true)
            .with(feature::SELECT_LIMIT_OFFSET, false)
            .with(feature::STATEMENT_RETURNING, false);
        Self { features }
    }
}

impl Default for GenericPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for GenericPlatform {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn features(&self) -> &FeatureSet {
        &self.features
    }
}
