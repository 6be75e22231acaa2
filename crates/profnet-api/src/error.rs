/// Everything a flow can refuse or fail with. Store failures carry the
/// underlying message text only.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("user '{0}' already exists")]
    UserExists(String),
    #[error("invalid login or password")]
    InvalidCredentials,
    #[error("user '{0}' does not exist")]
    UserNotFound(String),
    #[error("you cannot search for yourself")]
    CannotSearchSelf,
    #[error("you cannot connect with yourself")]
    SelfConnection,
    #[error("{0} is already your friend")]
    AlreadyFriends(String),
    #[error("a connection request between you and {0} is already pending")]
    RequestPending(String),
    #[error("{0} is not within three levels of connection")]
    NotWithinReach(String),
    #[error("no pending connection request from {0}")]
    NoPendingRequest(String),
    #[error("message is too long ({len} characters, limit is {limit})")]
    MessageTooLong { len: usize, limit: usize },
    #[error("message {0} not found")]
    MessageNotFound(i64),
    #[error("invalid date '{0}', expected YYYY/MM/DD")]
    InvalidDate(String),
    #[error("end date {end} is before start date {start}")]
    DateOrder { start: String, end: String },
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type FlowResult<T> = Result<T, FlowError>;
