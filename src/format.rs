use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use nom::{
    branch::alt,
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map_res, opt},
    sequence::{preceded, tuple},
    IResult,
};
use serde_with::DeserializeFromStr;
use std::fmt::Display;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};
use crate::locale::{DateOrder, Locale};

pub const DEFAULT_TIME_FORMAT: &str = "%H:%M";

/// Which parts of the selection the picker shows and accepts.
#[derive(Clone, Copy, Debug, DeserializeFromStr, PartialEq, Eq)]
pub enum DisplayMode {
    DateOnly,
    TimeOnly,
    DateAndTime,
}

impl DisplayMode {
    pub fn shows_date(&self) -> bool {
        matches!(self, DisplayMode::DateOnly | DisplayMode::DateAndTime)
    }

    pub fn shows_time(&self) -> bool {
        matches!(self, DisplayMode::TimeOnly | DisplayMode::DateAndTime)
    }
}

impl Default for DisplayMode {
    fn default() -> Self {
        DisplayMode::DateAndTime
    }
}

impl FromStr for DisplayMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "date" | "date-only" => Ok(DisplayMode::DateOnly),
            "time" | "time-only" => Ok(DisplayMode::TimeOnly),
            "datetime" | "date-and-time" | "date-time" => Ok(DisplayMode::DateAndTime),
            _ => Err(Error::new(
                ErrorKind::DisplayModeParse,
                &format!("'{}' (expected date, time or datetime)", s),
            )),
        }
    }
}

impl Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayMode::DateOnly => write!(f, "date"),
            DisplayMode::TimeOnly => write!(f, "time"),
            DisplayMode::DateAndTime => write!(f, "datetime"),
        }
    }
}

/// Patterns used to render the text field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextFormat {
    pub date_format: String,
    pub time_format: String,
}

impl TextFormat {
    pub fn for_locale(locale: &Locale) -> Self {
        TextFormat {
            date_format: locale.date_format().to_owned(),
            time_format: DEFAULT_TIME_FORMAT.to_owned(),
        }
    }

    pub fn format<Tz>(&self, date: &DateTime<Tz>, mode: DisplayMode) -> String
    where
        Tz: chrono::TimeZone,
        Tz::Offset: Display,
    {
        match mode {
            DisplayMode::DateOnly => date.format(&self.date_format).to_string(),
            DisplayMode::TimeOnly => date.format(&self.time_format).to_string(),
            DisplayMode::DateAndTime => format!(
                "{} {}",
                date.format(&self.date_format),
                date.format(&self.time_format)
            ),
        }
    }

    /// Reads back text written by [`TextFormat::format`].
    pub fn parse(&self, text: &str, mode: DisplayMode) -> Option<ParsedInput> {
        match mode {
            DisplayMode::DateOnly => NaiveDate::parse_from_str(text, &self.date_format)
                .ok()
                .map(|date| ParsedInput::Local {
                    date: Some(date),
                    time: None,
                }),
            DisplayMode::TimeOnly => NaiveTime::parse_from_str(text, &self.time_format)
                .ok()
                .map(|time| ParsedInput::Local {
                    date: None,
                    time: Some(time),
                }),
            DisplayMode::DateAndTime => {
                let pattern = format!("{} {}", self.date_format, self.time_format);
                NaiveDateTime::parse_from_str(text, &pattern)
                    .ok()
                    .map(|dt| ParsedInput::Local {
                        date: Some(dt.date()),
                        time: Some(dt.time()),
                    })
            }
        }
    }
}

/// Result of parsing user typed text. Missing parts keep their current value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParsedInput {
    /// A complete timestamp with its own UTC offset
    Timestamp(DateTime<chrono::FixedOffset>),
    Local {
        date: Option<NaiveDate>,
        time: Option<NaiveTime>,
    },
}

fn number(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>())(input)
}

fn year(input: &str) -> IResult<&str, i32> {
    map_res(
        tuple((opt(char('-')), digit1)),
        |(sign, digits): (Option<char>, &str)| {
            digits
                .parse::<i32>()
                .map(|y| if sign.is_some() { -y } else { y })
        },
    )(input)
}

fn iso_date(input: &str) -> IResult<&str, (i32, u32, u32)> {
    let (input, (y, _, m, _, d)) = tuple((year, char('-'), number, char('-'), number))(input)?;
    Ok((input, (y, m, d)))
}

fn locale_date(
    order: DateOrder,
    separator: char,
) -> impl Fn(&str) -> IResult<&str, (i32, u32, u32)> {
    move |input| match order {
        DateOrder::DayMonthYear => {
            let (input, (d, _, m, _, y)) =
                tuple((number, char(separator), number, char(separator), year))(input)?;
            Ok((input, (y, m, d)))
        }
        DateOrder::MonthDayYear => {
            let (input, (m, _, d, _, y)) =
                tuple((number, char(separator), number, char(separator), year))(input)?;
            Ok((input, (y, m, d)))
        }
        DateOrder::YearMonthDay => {
            let (input, (y, _, m, _, d)) =
                tuple((year, char(separator), number, char(separator), number))(input)?;
            Ok((input, (y, m, d)))
        }
    }
}

fn time(input: &str) -> IResult<&str, (u32, u32, u32)> {
    let (input, (h, _, m, s)) = tuple((
        number,
        char(':'),
        number,
        opt(preceded(char(':'), number)),
    ))(input)?;
    Ok((input, (h, m, s.unwrap_or(0))))
}

fn to_date((y, m, d): (i32, u32, u32), text: &str) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| {
        Error::new(
            ErrorKind::DateParse,
            &format!("'{}' is not a calendar date", text),
        )
    })
}

fn to_time((h, m, s): (u32, u32, u32), text: &str) -> Result<NaiveTime> {
    NaiveTime::from_hms_opt(h, m, s).ok_or_else(|| {
        Error::new(
            ErrorKind::TimeParse,
            &format!("'{}' is not a time of day", text),
        )
    })
}

/// Parses text typed into the picker's field.
///
/// Text in the field's own `format` is tried first. Otherwise accepts RFC 3339
/// timestamps, ISO dates (`2024-02-29`), dates in the locale's order and
/// separator, each optionally followed by `HH:MM[:SS]`. In time-only mode only
/// a time of day is accepted.
pub fn parse_input(
    text: &str,
    locale: &Locale,
    format: &TextFormat,
    mode: DisplayMode,
) -> Result<ParsedInput> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err(Error::new(ErrorKind::DateParse, "empty input"));
    }

    if let Some(parsed) = format.parse(trimmed, mode) {
        return Ok(parsed);
    }

    if mode == DisplayMode::TimeOnly {
        let (_, parts) = all_consuming(time)(trimmed).map_err(|_| {
            Error::new(
                ErrorKind::TimeParse,
                &format!("'{}' (expected HH:MM)", trimmed),
            )
        })?;
        return Ok(ParsedInput::Local {
            date: None,
            time: Some(to_time(parts, trimmed)?),
        });
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ParsedInput::Timestamp(timestamp));
    }

    let date_parser = alt((
        iso_date,
        locale_date(locale.date_order(), locale.date_separator()),
    ));
    let result = all_consuming(tuple((
        preceded(space0, date_parser),
        opt(preceded(space1, time)),
        space0,
    )))(trimmed);

    match result {
        Ok((_, (date_parts, time_parts, _))) => Ok(ParsedInput::Local {
            date: Some(to_date(date_parts, trimmed)?),
            time: time_parts.map(|t| to_time(t, trimmed)).transpose()?,
        }),
        Err(_) => Err(Error::new(
            ErrorKind::DateParse,
            &format!(
                "'{}' (expected {} or YYYY-MM-DD)",
                trimmed,
                expected_pattern(locale)
            ),
        )),
    }
}

fn expected_pattern(locale: &Locale) -> String {
    let sep = locale.date_separator();
    match locale.date_order() {
        DateOrder::DayMonthYear => format!("DD{}MM{}YYYY", sep, sep),
        DateOrder::MonthDayYear => format!("MM{}DD{}YYYY", sep, sep),
        DateOrder::YearMonthDay => format!("YYYY{}MM{}DD", sep, sep),
    }
}
