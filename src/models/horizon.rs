use serde::{Deserialize, Serialize};

/// Forward-looking forecast window. Variant order matches window length so
/// `Ord` picks the longest selected horizon as the purchase-order driver.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Horizon {
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    SevenDays,
    #[serde(rename = "1mo")]
    #[strum(serialize = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    #[strum(serialize = "3mo")]
    ThreeMonths,
}

impl Horizon {
    pub fn days(self) -> i64 {
        match self {
            Horizon::SevenDays => 7,
            Horizon::OneMonth => 30,
            Horizon::ThreeMonths => 90,
        }
    }

    /// Column-name suffix used by the tabular exports (`base_qty_7d`,
    /// `forecast_qty_1mo`, ...).
    pub fn label(self) -> &'static str {
        match self {
            Horizon::SevenDays => "7d",
            Horizon::OneMonth => "1mo",
            Horizon::ThreeMonths => "3mo",
        }
    }

    pub fn from_days(days: i64) -> Option<Self> {
        match days {
            7 => Some(Horizon::SevenDays),
            30 => Some(Horizon::OneMonth),
            90 => Some(Horizon::ThreeMonths),
            _ => None,
        }
    }

    pub fn all() -> [Horizon; 3] {
        [Horizon::SevenDays, Horizon::OneMonth, Horizon::ThreeMonths]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn longest_horizon_wins_ordering() {
        let mut horizons = vec![Horizon::OneMonth, Horizon::SevenDays, Horizon::ThreeMonths];
        horizons.sort();
        assert_eq!(horizons.last(), Some(&Horizon::ThreeMonths));
    }

    #[test]
    fn labels_round_trip() {
        for horizon in Horizon::all() {
            assert_eq!(Horizon::from_str(horizon.label()).ok(), Some(horizon));
            assert_eq!(Horizon::from_days(horizon.days()), Some(horizon));
        }
    }
}
