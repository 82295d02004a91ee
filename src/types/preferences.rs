use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::Time;
use time::macros::time;

pub const DEFAULT_CATEGORY: &str = "electronics";

/// Delivery policy attached to every subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    #[serde(rename = "categories")]
    pub category_filter: BTreeSet<String>,
    pub quiet_hours: QuietHours,
    #[serde(rename = "flashSales")]
    pub flash_sales_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            category_filter: BTreeSet::from([DEFAULT_CATEGORY.to_string()]),
            quiet_hours: QuietHours::default(),
            flash_sales_enabled: true,
        }
    }
}

impl Preferences {
    /// Flat fields are replaced, `quietHours` is merged field by field and
    /// `categories` is replaced as a whole set.
    pub fn apply(&mut self, patch: &PreferencesPatch) {
        if let Some(categories) = &patch.category_filter {
            self.category_filter = categories.clone();
        }
        if let Some(quiet_hours) = &patch.quiet_hours {
            self.quiet_hours.apply(quiet_hours);
        }
        if let Some(enabled) = patch.flash_sales_enabled {
            self.flash_sales_enabled = enabled;
        }
    }

    pub fn merged(&self, patch: &PreferencesPatch) -> Self {
        let mut merged = self.clone();
        merged.apply(patch);
        merged
    }
}

/// Local wall-clock window, `[start, end)`, wrapping past midnight when
/// `start > end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHours {
    pub enabled: bool,
    #[serde(with = "hhmm")]
    pub start: Time,
    #[serde(with = "hhmm")]
    pub end: Time,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: false,
            start: time!(22:00),
            end: time!(08:00),
        }
    }
}

impl QuietHours {
    pub fn contains(&self, at: Time) -> bool {
        if !self.enabled {
            return false;
        }
        if self.start <= self.end {
            at >= self.start && at < self.end
        } else {
            at >= self.start || at < self.end
        }
    }

    pub fn apply(&mut self, patch: &QuietHoursPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(end) = patch.end {
            self.end = end;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    #[serde(
        rename = "categories",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category_filter: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_hours: Option<QuietHoursPatch>,
    #[serde(
        rename = "flashSales",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub flash_sales_enabled: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuietHoursPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, with = "hhmm::option", skip_serializing_if = "Option::is_none")]
    pub start: Option<Time>,
    #[serde(default, with = "hhmm::option", skip_serializing_if = "Option::is_none")]
    pub end: Option<Time>,
}

mod hhmm {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Time;
    use time::format_description::BorrowedFormatItem;
    use time::macros::format_description;

    const FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]");
    /// Also takes single-digit hours such as `9:00`.
    const PARSE_FORMAT: &[BorrowedFormatItem<'static>] =
        format_description!("[hour padding:none]:[minute]");

    fn parse(raw: &str) -> Result<Time, time::error::Parse> {
        Time::parse(raw.trim(), PARSE_FORMAT)
    }

    pub(super) fn serialize<S: Serializer>(value: &Time, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = value.format(FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Time, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use time::Time;

        pub(crate) fn serialize<S: Serializer>(
            value: &Option<Time>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Time>, D::Error> {
            let raw = Option::<String>::deserialize(deserializer)?;
            raw.map(|raw| super::parse(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}
