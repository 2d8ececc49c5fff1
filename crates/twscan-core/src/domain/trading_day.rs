use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset};

use crate::ValidationError;

/// Calendar date in the exchange's local time zone (Asia/Taipei, UTC+8).
///
/// Taiwan observes no daylight saving, so a fixed offset is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradingDay(Date);

fn exchange_offset() -> UtcOffset {
    UtcOffset::from_hms(8, 0, 0).expect("static +08:00 offset is valid")
}

impl TradingDay {
    /// Today's calendar date at the exchange, derived from UTC now.
    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().to_offset(exchange_offset()).date())
    }

    /// Exchange-local date of a provider Unix timestamp (seconds).
    pub fn from_unix_timestamp(value: i64) -> Result<Self, ValidationError> {
        let instant = OffsetDateTime::from_unix_timestamp(value)
            .map_err(|_| ValidationError::TimestampOutOfRange { value })?;
        Ok(Self(instant.to_offset(exchange_offset()).date()))
    }

    /// Parse an ISO `YYYY-MM-DD` date.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidTradingDay {
            value: input.to_owned(),
        };

        let mut parts = input.trim().splitn(3, '-');
        let year: i32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let month: u8 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;
        let day: u8 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(invalid)?;

        let month = Month::try_from(month).map_err(|_| invalid())?;
        let date = Date::from_calendar_date(year, month, day).map_err(|_| invalid())?;
        Ok(Self(date))
    }

    pub fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub fn checked_add_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(Duration::days(days)).map(Self)
    }

    pub fn into_inner(self) -> Date {
        self.0
    }
}

impl Display for TradingDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            self.0.month() as u8,
            self.0.day()
        )
    }
}

impl Serialize for TradingDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TradingDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
