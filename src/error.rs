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
    InvalidDate,
    RenderFailure,
    SessionClosed,
    OutOfRange,
    InvalidRange,
    DuplicateSession,
    DateParse,
    CommandParse,
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

    pub fn is_invalid_date(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidDate)
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

impl From<toml::de::Error> for Error {
    fn from(toml_error: toml::de::Error) -> Error {
        Error::new(
            ErrorKind::ConfigParse,
            &format!("Could not parse config: {}", toml_error),
        )
    }
}

impl<E: std::fmt::Debug> From<nom::Err<E>> for Error {
    fn from(error: nom::Err<E>) -> Self {
        Error::new(
            ErrorKind::CommandParse,
            &format!("Error while parsing: {}", error),
        )
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match (err.kind, err.message) {
            (ErrorKind::IOError(err), _) => err,
            (_, Some(message)) => io::Error::new(io::ErrorKind::InvalidInput, message),
            (kind, None) => io::Error::new(io::ErrorKind::InvalidInput, kind.as_str()),
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
            ErrorKind::InvalidDate => "invalid date".to_owned(),
            ErrorKind::RenderFailure => "unable to display dialog".to_owned(),
            ErrorKind::SessionClosed => "dialog session already closed".to_owned(),
            ErrorKind::OutOfRange => "date not selectable".to_owned(),
            ErrorKind::InvalidRange => "invalid date range".to_owned(),
            ErrorKind::DuplicateSession => "dialog already shown".to_owned(),
            ErrorKind::DateParse => "invalid date format".to_owned(),
            ErrorKind::CommandParse => "invalid command".to_owned(),
            ErrorKind::ConfigParse => "invalid config".to_owned(),
            ErrorKind::IOError(err) => err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_and_without_message() {
        assert_eq!(Error::from(ErrorKind::SessionClosed).to_string(), "dialog session already closed");
        assert_eq!(
            Error::new(ErrorKind::InvalidDate, "2017-02-30").to_string(),
            "invalid date: 2017-02-30"
        );
    }

    #[test]
    fn into_io_error_keeps_io_kind() {
        let err = Error::from(io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(io::Error::from(err).kind(), io::ErrorKind::NotFound);

        let err = Error::new(ErrorKind::RenderFailure, "terminal too small");
        let io_err = io::Error::from(err);
        assert_eq!(io_err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(io_err.to_string(), "terminal too small");

        let io_err = io::Error::from(Error::from(ErrorKind::SessionClosed));
        assert_eq!(io_err.to_string(), "dialog session already closed");
    }
}
