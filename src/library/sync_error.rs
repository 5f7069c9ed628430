use reqwest::Error as ReqwestError;
use std::{fmt, io};

#[derive(Debug)]
pub enum SyncError {
    FetchError(String),
    ParseError(String),
    IoError(io::Error),
    HttpError(ReqwestError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyncError::FetchError(s) => write!(f, "Unable to fetch games list: {}", s),
            SyncError::ParseError(s) => write!(f, "Games list parse error: {}", s),
            SyncError::IoError(e) => write!(f, "IO error: {}", e),
            SyncError::HttpError(e) => write!(f, "HTTP error: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::IoError(e) => Some(e),
            SyncError::HttpError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for SyncError {
    fn from(error: io::Error) -> Self {
        SyncError::IoError(error)
    }
}

impl From<ReqwestError> for SyncError {
    fn from(error: ReqwestError) -> Self {
        SyncError::HttpError(error)
    }
}

impl From<quick_xml::Error> for SyncError {
    fn from(error: quick_xml::Error) -> Self {
        SyncError::ParseError(error.to_string())
    }
}
