use std::{io, num::TryFromIntError};
use quick_xml::events::attributes::AttrError;
use png::EncodingError;

#[derive(Debug)]
pub struct Error {
    pub message: String,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<quick_xml::Error> for Error {
    fn from(value: quick_xml::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<AttrError> for Error {
    fn from(value: AttrError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<TryFromIntError> for Error {
    fn from(value: TryFromIntError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<EncodingError> for Error {
    fn from(value: EncodingError) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error {
            message: value.to_string()
        }
    }
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error {
            message: value
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
