use refwire_core::{ClientError, EncodeError, RequestError};
use refwire_server::ServerError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("invalid argument: {0}")]
    Argument(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Request(_) | Self::Argument(_) => 2,
            Self::Client(ClientError::Request(_)) => 2,
            Self::Client(ClientError::Status { .. }) => 3,
            Self::Client(ClientError::Decode(_)) => 4,
            Self::Client(ClientError::Encode(_)) => 4,
            Self::Client(ClientError::Transport(_)) => 6,
            Self::Encode(_) | Self::Serialization(_) => 4,
            Self::Server(_) | Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_queries_and_bad_arguments_exit_with_two() {
        assert_eq!(CliError::from(RequestError::BlankTicker).exit_code(), 2);
        assert_eq!(CliError::Argument(String::from("x")).exit_code(), 2);
    }

    #[test]
    fn server_status_exits_with_three() {
        let error = CliError::from(ClientError::Status {
            status: 500,
            body: String::from("{}"),
        });
        assert_eq!(error.exit_code(), 3);
    }
}
