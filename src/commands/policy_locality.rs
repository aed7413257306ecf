use std::path::Path;

use tss_esapi::Context;

use crate::{policy, result::Result, session::Session, tpm};

pub fn run(
    tcti: &str,
    session_path: &Path,
    locality: u8,
    out_path: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    let mut context = tpm::open_context(tcti).map_err(|e| {
        log::error!("failed to connect to the TPM using TCTI \"{}\": {}", tcti, e);
        e
    })?;

    let session = Session::restore(&mut context, session_path).map_err(|e| {
        log::error!("could not restore session from \"{}\": {}", session_path.display(), e);
        e
    })?;

    // The session must be released whether or not the policy steps
    // succeed, and a failed release must not go unnoticed either.
    let result = apply_locality(&mut context, &session, locality, out_path, quiet);
    let stop = session.close(&mut context).map_err(|e| {
        log::error!("could not release the session: {}", e);
        e
    });
    result.and(stop)
}

fn apply_locality(
    context: &mut Context,
    session: &Session,
    locality: u8,
    out_path: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    policy::build_policy_locality(context, session, locality).map_err(|e| {
        log::error!("could not add locality {} to the session policy: {}", locality, e);
        e
    })?;

    let digest = policy::get_digest(context, session).map_err(|e| {
        log::error!("could not retrieve the session policy digest: {}", e);
        e
    })?;

    if !quiet {
        println!("{}", hex::encode(digest.as_slice()));
    }

    if let Some(path) = out_path {
        std::fs::write(path, digest.as_slice()).map_err(|e| {
            log::error!("failed to save policy digest to \"{}\": {}", path.display(), e);
            e
        })?;
    }

    Ok(())
}
