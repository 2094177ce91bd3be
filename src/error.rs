use thiserror::Error;

/// SDK Error type
#[derive(Error, Debug)]
pub enum Error {
    /// Amount string failed the decimal input pattern
    #[error("Invalid amount: {0:?}")]
    InputFormat(String),

    /// User declined to sign a submission in the wallet
    #[error("Signing rejected in wallet: {0}")]
    SubmissionRejected(String),

    /// Approval declined by the user
    #[error("Approval rejected: {0}")]
    ApprovalRejected(String),

    /// Approval accepted by the wallet but failed to submit or reverted
    #[error("Approval failed: {0}")]
    ApprovalFailed(String),

    /// Action (swap, liquidity, send) declined by the user
    #[error("Transaction rejected: {0}")]
    ActionRejected(String),

    /// Action accepted by the wallet but failed to submit or reverted
    #[error("Transaction failed: {0}")]
    ActionFailed(String),

    /// Requested amount exceeds the balance snapshot
    #[error("Insufficient {symbol} balance: requested {requested}, available {available}")]
    InsufficientBalance {
        symbol: String,
        requested: String,
        available: String,
    },

    /// Recipient address failed format or checksum validation
    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    /// No connected account
    #[error("No wallet connected")]
    NotConnected,

    /// RPC client error
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Wallet error
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Contract interaction error
    #[error("Contract error: {0}")]
    Contract(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

/// Machine-checkable error classification, paired with the user-facing
/// message when a flow error is handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputFormat,
    SubmissionRejected,
    ApprovalRejected,
    ApprovalFailed,
    ActionRejected,
    ActionFailed,
    InsufficientBalance,
    InvalidRecipient,
    NotConnected,
    Rpc,
    Wallet,
    Config,
    Contract,
    Serialization,
    Io,
    Other,
}

impl Error {
    /// Classify the error without losing the message
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InputFormat(_) => ErrorKind::InputFormat,
            Error::SubmissionRejected(_) => ErrorKind::SubmissionRejected,
            Error::ApprovalRejected(_) => ErrorKind::ApprovalRejected,
            Error::ApprovalFailed(_) => ErrorKind::ApprovalFailed,
            Error::ActionRejected(_) => ErrorKind::ActionRejected,
            Error::ActionFailed(_) => ErrorKind::ActionFailed,
            Error::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Error::InvalidRecipient(_) => ErrorKind::InvalidRecipient,
            Error::NotConnected => ErrorKind::NotConnected,
            Error::Rpc(_) => ErrorKind::Rpc,
            Error::Wallet(_) => ErrorKind::Wallet,
            Error::Config(_) => ErrorKind::Config,
            Error::Contract(_) => ErrorKind::Contract,
            Error::Serialization(_) => ErrorKind::Serialization,
            Error::Io(_) => ErrorKind::Io,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Single user-visible string for inline display
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn to_flow_error(&self) -> FlowError {
        FlowError {
            kind: self.kind(),
            message: self.user_message(),
        }
    }
}

/// Error value exposed through `FlowStatus`: never a raw provider error,
/// always a kind plus a display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowError {
    pub kind: ErrorKind,
    pub message: String,
}

impl std::fmt::Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
