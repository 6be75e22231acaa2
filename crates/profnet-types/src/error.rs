/// A stored value that does not map onto one of the domain enums.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown connection status '{0}'")]
    ConnectionStatus(String),
    #[error("unknown message status '{0}'")]
    MessageStatus(String),
    #[error("delete flag out of range: {0}")]
    DeleteFlag(i64),
}
