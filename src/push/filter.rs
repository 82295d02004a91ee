use crate::types::preferences::Preferences;

use std::collections::BTreeSet;
use time::Time;

/// Eligibility of a subscriber for a flash-sale event at a given local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashSaleFilter {
    categories: BTreeSet<String>,
    at: Time,
}

impl FlashSaleFilter {
    pub fn new<I, C>(categories: I, at: Time) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            categories: categories.into_iter().map(Into::into).collect(),
            at,
        }
    }

    /// An empty category filter on the subscriber side means "everything".
    pub fn matches(&self, preferences: &Preferences) -> bool {
        preferences.flash_sales_enabled
            && (preferences.category_filter.is_empty()
                || !preferences.category_filter.is_disjoint(&self.categories))
            && !preferences.quiet_hours.contains(self.at)
    }
}
