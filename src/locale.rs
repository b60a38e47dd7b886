use chrono::{Datelike, Month, NaiveDate, Weekday};
use itertools::Itertools;
use phf::phf_map;
use serde_with::DeserializeFromStr;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

use crate::calendar::WeekLayout;
use crate::error::{Error, ErrorKind, Result};

/// Order of the date components in a locale's numeric date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateOrder {
    DayMonthYear,
    MonthDayYear,
    YearMonthDay,
}

#[derive(Debug)]
pub struct LocaleData {
    pub tag: &'static str,
    pub first_day: Weekday,
    /// Monday first
    pub weekdays_short: [&'static str; 7],
    /// Monday first
    pub weekdays_long: [&'static str; 7],
    pub months: [&'static str; 12],
    pub today_label: &'static str,
    pub date_format: &'static str,
    pub date_order: DateOrder,
    pub date_separator: char,
    /// Template with `{weekday}`, `{day}`, `{month}` and `{year}` placeholders.
    pub full_date: &'static str,
}

const EN_WEEKDAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const EN_WEEKDAYS_LONG: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

static LOCALES: phf::Map<&'static str, LocaleData> = phf_map! {
    "en_US" => LocaleData {
        tag: "en_US",
        first_day: Weekday::Sun,
        weekdays_short: EN_WEEKDAYS_SHORT,
        weekdays_long: EN_WEEKDAYS_LONG,
        months: EN_MONTHS,
        today_label: "Today: ",
        date_format: "%m/%d/%Y",
        date_order: DateOrder::MonthDayYear,
        date_separator: '/',
        full_date: "{weekday}, {month} {day}, {year}",
    },
    "en_GB" => LocaleData {
        tag: "en_GB",
        first_day: Weekday::Mon,
        weekdays_short: EN_WEEKDAYS_SHORT,
        weekdays_long: EN_WEEKDAYS_LONG,
        months: EN_MONTHS,
        today_label: "Today: ",
        date_format: "%d/%m/%Y",
        date_order: DateOrder::DayMonthYear,
        date_separator: '/',
        full_date: "{weekday}, {day} {month} {year}",
    },
    "de_DE" => LocaleData {
        tag: "de_DE",
        first_day: Weekday::Mon,
        weekdays_short: ["Mo", "Di", "Mi", "Do", "Fr", "Sa", "So"],
        weekdays_long: [
            "Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag", "Sonntag",
        ],
        months: [
            "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
            "Oktober", "November", "Dezember",
        ],
        today_label: "Heute: ",
        date_format: "%d.%m.%Y",
        date_order: DateOrder::DayMonthYear,
        date_separator: '.',
        full_date: "{weekday}, {day}. {month} {year}",
    },
    "fr_FR" => LocaleData {
        tag: "fr_FR",
        first_day: Weekday::Mon,
        weekdays_short: ["lun.", "mar.", "mer.", "jeu.", "ven.", "sam.", "dim."],
        weekdays_long: [
            "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
        ],
        months: [
            "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août",
            "septembre", "octobre", "novembre", "décembre",
        ],
        today_label: "Aujourd'hui : ",
        date_format: "%d/%m/%Y",
        date_order: DateOrder::DayMonthYear,
        date_separator: '/',
        full_date: "{weekday} {day} {month} {year}",
    },
    "es_ES" => LocaleData {
        tag: "es_ES",
        first_day: Weekday::Mon,
        weekdays_short: ["lun", "mar", "mié", "jue", "vie", "sáb", "dom"],
        weekdays_long: [
            "lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo",
        ],
        months: [
            "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto",
            "septiembre", "octubre", "noviembre", "diciembre",
        ],
        today_label: "Hoy: ",
        date_format: "%d/%m/%Y",
        date_order: DateOrder::DayMonthYear,
        date_separator: '/',
        full_date: "{weekday}, {day} de {month} de {year}",
    },
    "it_IT" => LocaleData {
        tag: "it_IT",
        first_day: Weekday::Mon,
        weekdays_short: ["lun", "mar", "mer", "gio", "ven", "sab", "dom"],
        weekdays_long: [
            "lunedì", "martedì", "mercoledì", "giovedì", "venerdì", "sabato", "domenica",
        ],
        months: [
            "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
            "settembre", "ottobre", "novembre", "dicembre",
        ],
        today_label: "Oggi: ",
        date_format: "%d/%m/%Y",
        date_order: DateOrder::DayMonthYear,
        date_separator: '/',
        full_date: "{weekday} {day} {month} {year}",
    },
};

static LANGUAGE_DEFAULTS: phf::Map<&'static str, &'static str> = phf_map! {
    "en" => "en_US",
    "de" => "de_DE",
    "fr" => "fr_FR",
    "es" => "es_ES",
    "it" => "it_IT",
    "c" => "en_US",
    "posix" => "en_US",
};

const FALLBACK_TAG: &str = "en_US";

#[derive(Clone, Copy, Debug, DeserializeFromStr)]
pub struct Locale(&'static LocaleData);

impl Locale {
    /// Locale of the process environment, `en_US` if none is set or known.
    pub fn system() -> Self {
        let from_env = ["LC_ALL", "LC_TIME", "LANG"]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|value| !value.is_empty());

        match from_env.as_deref().map(Locale::from_str) {
            Some(Ok(locale)) => locale,
            Some(Err(e)) => {
                log::debug!("{}, falling back to {}", e, FALLBACK_TAG);
                Locale::fallback()
            }
            None => Locale::fallback(),
        }
    }

    pub fn fallback() -> Self {
        Locale(&LOCALES[FALLBACK_TAG])
    }

    /// Tags of the built-in locales, sorted.
    pub fn available() -> impl Iterator<Item = &'static str> {
        LOCALES.keys().copied().sorted()
    }

    pub fn tag(&self) -> &'static str {
        self.0.tag
    }

    pub fn first_day(&self) -> Weekday {
        self.0.first_day
    }

    pub fn week_layout(&self) -> WeekLayout {
        WeekLayout::new(self.first_day())
    }

    pub fn weekday_short(&self, weekday: Weekday) -> &'static str {
        self.0.weekdays_short[weekday.num_days_from_monday() as usize]
    }

    pub fn weekday_long(&self, weekday: Weekday) -> &'static str {
        self.0.weekdays_long[weekday.num_days_from_monday() as usize]
    }

    pub fn month_name(&self, month: Month) -> &'static str {
        self.0.months[month.number_from_month() as usize - 1]
    }

    pub fn today_label(&self) -> &'static str {
        self.0.today_label
    }

    pub fn date_format(&self) -> &'static str {
        self.0.date_format
    }

    pub fn date_order(&self) -> DateOrder {
        self.0.date_order
    }

    pub fn date_separator(&self) -> char {
        self.0.date_separator
    }

    pub fn format_full_date(&self, date: NaiveDate) -> String {
        let month = num_traits::FromPrimitive::from_u32(date.month())
            .map(|m: Month| self.month_name(m))
            .unwrap_or_default();

        self.0
            .full_date
            .replace("{weekday}", self.weekday_long(date.weekday()))
            .replace("{day}", &date.day().to_string())
            .replace("{month}", month)
            .replace("{year}", &date.year().to_string())
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::system()
    }
}

impl PartialEq for Locale {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag()
    }
}

impl Eq for Locale {}

impl FromStr for Locale {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        // Strip encoding and modifier, e.g. `de_DE.UTF-8@euro`
        let name = s
            .split(|c: char| c == '.' || c == '@')
            .next()
            .unwrap_or_default()
            .replace('-', "_");

        let mut parts = name.splitn(2, '_');
        let language = parts.next().unwrap_or_default().to_lowercase();
        let region = parts.next().map(str::to_uppercase);

        let tag = match region {
            Some(region) => format!("{}_{}", language, region),
            None => language.clone(),
        };

        LOCALES
            .get(tag.as_str())
            .or_else(|| {
                LANGUAGE_DEFAULTS
                    .get(language.as_str())
                    .and_then(|tag| LOCALES.get(*tag))
            })
            .map(Locale)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::LocaleParse,
                    &format!(
                        "Locale '{}' not supported (available: {})",
                        s,
                        Locale::available().join(", ")
                    ),
                )
            })
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags() {
        assert_eq!(Locale::from_str("de_DE").unwrap().tag(), "de_DE");
        assert_eq!(Locale::from_str("de-DE").unwrap().tag(), "de_DE");
        assert_eq!(Locale::from_str("de_DE.UTF-8").unwrap().tag(), "de_DE");
        assert_eq!(Locale::from_str("fr").unwrap().tag(), "fr_FR");
        // Unknown region falls back to the language default
        assert_eq!(Locale::from_str("en_AU").unwrap().tag(), "en_US");
        assert_eq!(Locale::from_str("C").unwrap().tag(), "en_US");
        assert!(Locale::from_str("xx_YY")
            .unwrap_err()
            .to_string()
            .contains("de_DE, en_GB, en_US, es_ES, fr_FR, it_IT"));
    }

    #[test]
    fn first_day_of_week() {
        assert_eq!(Locale::from_str("en_US").unwrap().first_day(), Weekday::Sun);
        assert_eq!(Locale::from_str("en_GB").unwrap().first_day(), Weekday::Mon);
        assert_eq!(Locale::from_str("de_DE").unwrap().first_day(), Weekday::Mon);
    }

    #[test]
    fn full_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

        let de = Locale::from_str("de_DE").unwrap();
        assert_eq!(de.format_full_date(date), "Donnerstag, 29. Februar 2024");

        let us = Locale::from_str("en_US").unwrap();
        assert_eq!(us.format_full_date(date), "Thursday, February 29, 2024");
    }

    #[test]
    fn weekday_names() {
        let de = Locale::from_str("de").unwrap();
        assert_eq!(de.weekday_short(Weekday::Wed), "Mi");
        assert_eq!(de.weekday_long(Weekday::Sun), "Sonntag");
        assert_eq!(de.month_name(Month::March), "März");
    }
}
