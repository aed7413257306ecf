use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TPM error: {0}")]
    Tss(#[from] tss_esapi::Error),

    #[error("malformed session file: {0}")]
    SessionFormat(#[from] serde_json::Error),

    #[error("unsupported session file version {0}")]
    SessionVersion(u32),

    #[error("session is not a policy or trial session")]
    NotAPolicySession,

    #[error("the TPM did not return a session handle")]
    NoSessionHandle,
}

pub type Result<T> = std::result::Result<T, Error>;
