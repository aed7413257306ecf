use std::{fmt, fs::File, path::{Path, PathBuf}};

use serde_derive::{Deserialize, Serialize};
use tss_esapi::{
    constants::SessionType,
    handles::SessionHandle,
    interface_types::{
        algorithm::HashingAlgorithm,
        session_handles::{AuthSession, PolicySession},
    },
    structures::SymmetricDefinition,
    utils::TpmsContext,
    Context,
};

use crate::result::{Error, Result};

pub const SESSION_FILE_VERSION: u32 = 1;

/// The TPM session type recorded in a session file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Hmac,
    Policy,
    Trial,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self {
            SessionKind::Hmac => "hmac",
            SessionKind::Policy => "policy",
            SessionKind::Trial => "trial",
        };
        write!(f, "{}", value)
    }
}

impl From<SessionKind> for SessionType {
    fn from(value: SessionKind) -> Self {
        match value {
            SessionKind::Hmac => SessionType::Hmac,
            SessionKind::Policy => SessionType::Policy,
            SessionKind::Trial => SessionType::Trial,
        }
    }
}

/// Hash algorithm a session authorizes with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlg {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
    Sm3_256,
}

impl fmt::Display for HashAlg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self {
            HashAlg::Sha1 => "sha1",
            HashAlg::Sha256 => "sha256",
            HashAlg::Sha384 => "sha384",
            HashAlg::Sha512 => "sha512",
            HashAlg::Sm3_256 => "sm3_256",
        };
        write!(f, "{}", value)
    }
}

impl From<HashAlg> for HashingAlgorithm {
    fn from(value: HashAlg) -> Self {
        match value {
            HashAlg::Sha1 => HashingAlgorithm::Sha1,
            HashAlg::Sha256 => HashingAlgorithm::Sha256,
            HashAlg::Sha384 => HashingAlgorithm::Sha384,
            HashAlg::Sha512 => HashingAlgorithm::Sha512,
            HashAlg::Sm3_256 => HashingAlgorithm::Sm3_256,
        }
    }
}

/// On-disk representation of a saved session.
///
/// The TPM's saved context blob does not record which kind of session it
/// belongs to or which hash it authorizes with, so both are stored next
/// to it in order to reconstruct a typed session on restore.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub version: u32,
    pub kind: SessionKind,
    pub auth_hash: HashAlg,
    pub context: TpmsContext,
}

impl SessionData {
    /// Reads a session file, checking the format version before anything
    /// gets near the TPM.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let data: SessionData = serde_json::from_reader(file)?;
        if data.version != SESSION_FILE_VERSION {
            return Err(Error::SessionVersion(data.version));
        }
        Ok(data)
    }

    pub fn store(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// A live authorization session, together with the file it was restored
/// from, if any.
///
/// The TPM accepts a saved session context only once, so restoring a
/// session invalidates its file until the session is closed, which saves
/// a fresh context back to the same file.
#[derive(Debug)]
pub struct Session {
    handle: AuthSession,
    kind: SessionKind,
    auth_hash: HashAlg,
    path: Option<PathBuf>,
}

impl Session {
    /// Starts a fresh unbound, unsalted session of the given kind.
    pub fn start(context: &mut Context, kind: SessionKind, auth_hash: HashAlg) -> Result<Self> {
        let Some(handle) = context.start_auth_session(
            None,
            None,
            None,
            kind.into(),
            SymmetricDefinition::AES_128_CFB,
            auth_hash.into(),
        )? else {
            return Err(Error::NoSessionHandle);
        };
        Ok(Session { handle, kind, auth_hash, path: None })
    }

    /// Reinstates a session previously saved to a file.
    pub fn restore(context: &mut Context, path: &Path) -> Result<Self> {
        let data = SessionData::load(path)?;
        let object = context.context_load(data.context)?;
        let Some(handle) = AuthSession::create(data.kind.into(), object.into(), data.auth_hash.into()) else {
            return Err(Error::NoSessionHandle);
        };
        log::info!("restored {} {} session from \"{}\"", data.auth_hash, data.kind, path.display());
        Ok(Session {
            handle,
            kind: data.kind,
            auth_hash: data.auth_hash,
            path: Some(path.to_path_buf()),
        })
    }

    /// Saves the session's context and writes a session file for it to
    /// the given path. Saving moves the session out of the TPM, so this
    /// consumes the session.
    pub fn save(self, context: &mut Context, path: &Path) -> Result<()> {
        let saved = context.context_save(SessionHandle::from(self.handle).into())?;
        let data = SessionData {
            version: SESSION_FILE_VERSION,
            kind: self.kind,
            auth_hash: self.auth_hash,
            context: saved,
        };
        data.store(path)?;
        log::info!("saved {} session to \"{}\"", self.kind, path.display());
        Ok(())
    }

    /// Releases the session. A file-backed session is saved back to its
    /// file, anything else is flushed from the TPM.
    pub fn close(self, context: &mut Context) -> Result<()> {
        match self.path.clone() {
            Some(path) => self.save(context, &path),
            None => {
                context.flush_context(SessionHandle::from(self.handle).into())?;
                Ok(())
            },
        }
    }

    /// The session as a policy session, for use with policy commands.
    /// Trial sessions qualify, hmac sessions do not.
    pub fn policy_session(&self) -> Result<PolicySession> {
        PolicySession::try_from(self.handle).map_err(|_| Error::NotAPolicySession)
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn auth_hash(&self) -> HashAlg {
        self.auth_hash
    }
}
