use tss_esapi::{structures::Digest, Context};

use crate::{result::Result, session::Session};

/// Extends the session's policy with a locality assertion.
///
/// The TPM itself validates the locality byte: zero never authorizes
/// anything and is rejected outright, and an extended locality cannot be
/// combined with an earlier locality assertion.
pub fn build_policy_locality(context: &mut Context, session: &Session, locality: u8) -> Result<()> {
    let policy_session = session.policy_session()?;
    context.execute_without_session(|ctx| ctx.policy_locality(policy_session, locality.into()))?;
    Ok(())
}

/// Reads back the digest the session's policy has accumulated so far.
pub fn get_digest(context: &mut Context, session: &Session) -> Result<Digest> {
    let policy_session = session.policy_session()?;
    let digest = context.execute_without_session(|ctx| ctx.policy_get_digest(policy_session))?;
    Ok(digest)
}
