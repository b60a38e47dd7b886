use chrono::{FixedOffset, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::{OffsetComponents, OffsetName};
use serde_with::DeserializeFromStr;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

#[derive(Clone, Debug, PartialEq)]
pub struct ZoneOffset {
    zone: Zone,
    pub utc_offset_secs: i32,
    pub dst_offset_secs: i32,
    pub id: String,
    pub name: Option<String>,
}

impl Offset for ZoneOffset {
    fn fix(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_secs + self.dst_offset_secs)
            .unwrap_or_else(|| Utc.fix())
    }
}

impl Display for ZoneOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name.as_deref().unwrap_or(self.id.as_str()))
    }
}

/// Timezone a picker interprets its selection in.
#[derive(Clone, Debug, Default, DeserializeFromStr, PartialEq)]
pub enum Zone {
    #[default]
    Local,
    Iana(chrono_tz::Tz),
}

impl Zone {
    const LOCAL_ID: &'static str = "Localtime";

    pub fn utc() -> Self {
        Self::Iana(chrono_tz::UTC)
    }

    pub fn id(&self) -> &str {
        match self {
            Zone::Local => Self::LOCAL_ID,
            Zone::Iana(tz) => tz.name(),
        }
    }

    /// Resolves a wall clock time in this zone.
    ///
    /// Ambiguous times (DST fold) resolve to the earlier instant, times inside
    /// a DST gap are shifted forward by the length of a typical gap.
    pub fn resolve_local(&self, local: &NaiveDateTime) -> Result<chrono::DateTime<Zone>> {
        if let Some(dt) = self.from_local_datetime(local).earliest() {
            return Ok(dt);
        }

        let shifted = *local + chrono::Duration::hours(1);
        self.from_local_datetime(&shifted).earliest().ok_or_else(|| {
            Error::new(
                ErrorKind::NonexistentTime,
                &format!("'{}' in zone '{}'", local, self.id()),
            )
        })
    }

    fn local_offset(&self, offset: FixedOffset) -> ZoneOffset {
        ZoneOffset {
            zone: self.clone(),
            utc_offset_secs: offset.local_minus_utc(),
            dst_offset_secs: 0,
            id: Self::LOCAL_ID.to_owned(),
            name: None,
        }
    }

    fn iana_offset(&self, offset: &<chrono_tz::Tz as TimeZone>::Offset) -> ZoneOffset {
        ZoneOffset {
            zone: self.clone(),
            utc_offset_secs: offset.base_utc_offset().num_seconds() as i32,
            dst_offset_secs: offset.dst_offset().num_seconds() as i32,
            id: offset.tz_id().to_owned(),
            name: Some(offset.abbreviation().to_owned()),
        }
    }
}

impl TimeZone for Zone {
    type Offset = ZoneOffset;

    fn from_offset(offset: &Self::Offset) -> Self {
        offset.zone.clone()
    }

    fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<Self::Offset> {
        match self {
            Zone::Local => chrono::Local
                .offset_from_local_date(local)
                .map(|offs| self.local_offset(offs)),
            Zone::Iana(tz) => tz
                .offset_from_local_date(local)
                .map(|offs| self.iana_offset(&offs)),
        }
    }

    fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<Self::Offset> {
        match self {
            Zone::Local => chrono::Local
                .offset_from_local_datetime(local)
                .map(|offs| self.local_offset(offs)),
            Zone::Iana(tz) => tz
                .offset_from_local_datetime(local)
                .map(|offs| self.iana_offset(&offs)),
        }
    }

    fn offset_from_utc_date(&self, utc: &NaiveDate) -> Self::Offset {
        match self {
            Zone::Local => self.local_offset(chrono::Local.offset_from_utc_date(utc)),
            Zone::Iana(tz) => self.iana_offset(&tz.offset_from_utc_date(utc)),
        }
    }

    fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> Self::Offset {
        match self {
            Zone::Local => self.local_offset(chrono::Local.offset_from_utc_datetime(utc)),
            Zone::Iana(tz) => self.iana_offset(&tz.offset_from_utc_datetime(utc)),
        }
    }
}

impl FromStr for Zone {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let lowercase = s.to_lowercase();

        if matches!(lowercase.as_str(), "localtime" | "local" | "system") {
            Ok(Zone::Local)
        } else if let Ok(tz) = s.parse::<chrono_tz::Tz>() {
            Ok(Zone::Iana(tz))
        } else {
            Err(Error::new(
                ErrorKind::TimezoneError,
                &format!("Timezone '{}' not recognized", s),
            ))
        }
    }
}

impl Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn iana_zone() {
        let dt = naive(2020, 9, 8, 8, 0);
        let chronotz = "Europe/Berlin"
            .parse::<chrono_tz::Tz>()
            .expect("'Europe/Berlin' is a valid IANA timezone");

        let zone = Zone::Iana(chronotz);

        assert_eq!(chronotz.from_utc_datetime(&dt), zone.from_utc_datetime(&dt));
        assert_eq!(zone.from_utc_datetime(&dt).offset().to_string(), "CEST");
    }

    #[test]
    fn parse_names() {
        assert_eq!(Zone::from_str("local").unwrap(), Zone::Local);
        assert_eq!(Zone::from_str("Localtime").unwrap(), Zone::Local);
        assert_eq!(Zone::from_str("UTC").unwrap(), Zone::utc());
        assert!(Zone::from_str("Mars/Olympus_Mons").is_err());
    }

    #[test]
    fn resolve_dst_gap_and_fold() {
        let zone = Zone::from_str("Europe/Berlin").unwrap();

        // 2021-03-28 02:30 does not exist in Berlin
        let dt = zone.resolve_local(&naive(2021, 3, 28, 2, 30)).unwrap();
        assert_eq!(dt.naive_local(), naive(2021, 3, 28, 3, 30));

        // 2021-10-31 02:30 exists twice, the earlier one is CEST
        let dt = zone.resolve_local(&naive(2021, 10, 31, 2, 30)).unwrap();
        assert_eq!(dt.offset().fix().local_minus_utc(), 2 * 3600);
    }
}
