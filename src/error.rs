use nom;
use std::convert::From;
use std::error;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ErrorKind {
    DateParse,
    TimeParse,
    InvalidDay,
    NoSelection,
    NonexistentTime,
    LocaleParse,
    TimezoneError,
    ColorParse,
    DisplayModeParse,
    ConfigParse,
    IOError(io::Error),
}

impl Error {
    pub fn new(kind: ErrorKind, msg: &str) -> Self {
        Error {
            kind,
            message: Some(msg.to_owned()),
        }
    }

    pub fn with_msg(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }

    /// Whether the error stems from text the user typed.
    pub fn is_input_error(&self) -> bool {
        matches!(self.kind, ErrorKind::DateParse | ErrorKind::TimeParse)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(io_error: io::Error) -> Error {
        Error::from(ErrorKind::IOError(io_error))
    }
}

impl From<chrono::ParseError> for Error {
    fn from(parse_error: chrono::ParseError) -> Error {
        Error::new(
            ErrorKind::DateParse,
            format!("Could not parse timestamp: {}", parse_error).as_str(),
        )
    }
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for Error {
    fn from(error: nom::Err<E>) -> Self {
        Error::new(
            ErrorKind::DateParse,
            &format!("Error while parsing: {}", error),
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::new(ErrorKind::ConfigParse, &error.to_string())
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        if let ErrorKind::IOError(err) = err.kind {
            err
        } else {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                err.message.unwrap_or_else(|| "invalid input".to_owned()),
            )
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.kind.as_str(), msg),
            None => write!(f, "{}", self.kind.as_str()),
        }
    }
}

impl error::Error for Error {}

impl ErrorKind {
    pub fn as_str(&self) -> String {
        match self {
            ErrorKind::DateParse => "invalid date format".to_owned(),
            ErrorKind::TimeParse => "invalid time format".to_owned(),
            ErrorKind::InvalidDay => "day does not exist in displayed month".to_owned(),
            ErrorKind::NoSelection => "no date selected".to_owned(),
            ErrorKind::NonexistentTime => "local time does not exist in timezone".to_owned(),
            ErrorKind::LocaleParse => "unknown locale".to_owned(),
            ErrorKind::TimezoneError => "invalid timezone".to_owned(),
            ErrorKind::ColorParse => "invalid color".to_owned(),
            ErrorKind::DisplayModeParse => "invalid display mode".to_owned(),
            ErrorKind::ConfigParse => "invalid configuration".to_owned(),
            ErrorKind::IOError(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_message() {
        let err = Error::from(ErrorKind::NoSelection);
        assert_eq!(err.to_string(), "no date selected");

        let err = Error::new(ErrorKind::DateParse, "'32.01.2024'");
        assert_eq!(err.to_string(), "invalid date format: '32.01.2024'");
        assert!(err.is_input_error());
    }

    #[test]
    fn io_roundtrip_keeps_io_kind() {
        let err = Error::from(io::Error::from(io::ErrorKind::NotFound));
        let io_err: io::Error = err.into();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
    }
}
