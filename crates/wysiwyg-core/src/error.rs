use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    UnknownCommand = 1,
    InvalidLink = 2,
    InvalidArguments = 3,
    Io = 4,
    InvalidContent = 5,
    Validation = 6,
    Config = 7,
}

impl ExitCode {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Success),
            1 => Some(Self::UnknownCommand),
            2 => Some(Self::InvalidLink),
            3 => Some(Self::InvalidArguments),
            4 => Some(Self::Io),
            5 => Some(Self::InvalidContent),
            6 => Some(Self::Validation),
            7 => Some(Self::Config),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum EditError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("Invalid URL: '{0}'")]
    InvalidLinkUrl(String),

    #[error("the link command requires a URL")]
    MissingLink,

    #[error("selection {start}..{end} no longer matches the buffer")]
    StaleSelection { start: usize, end: usize },

    #[error("malformed import file: {0}")]
    MalformedImport(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("invalid content source: {0}")]
    InvalidContent(String),

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

impl EditError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::UnknownCommand(_) => ExitCode::UnknownCommand,
            Self::InvalidLinkUrl(_) | Self::MissingLink => ExitCode::InvalidLink,
            Self::StaleSelection { .. } => ExitCode::Validation,
            Self::MalformedImport(_) | Self::InvalidContent(_) => ExitCode::InvalidContent,
            Self::InvalidArguments(_) => ExitCode::InvalidArguments,
            Self::Io(_) => ExitCode::Io,
        }
    }
}

pub type EditResult<T> = Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_round_trip_through_u8() {
        for code in [
            ExitCode::Success,
            ExitCode::UnknownCommand,
            ExitCode::InvalidLink,
            ExitCode::Config,
        ] {
            assert_eq!(ExitCode::from_u8(code as u8), Some(code));
        }
        assert_eq!(ExitCode::from_u8(42), None);
    }

    #[test]
    fn link_errors_share_exit_code() {
        assert_eq!(
            EditError::InvalidLinkUrl("ftp://x".into()).exit_code(),
            EditError::MissingLink.exit_code()
        );
    }
}
