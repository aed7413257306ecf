use std::{path::Path, str::FromStr};

use tss_esapi::{Context, TctiNameConf};

use crate::result::Result;

/// Opens an ESAPI context over the given TCTI.
pub fn open_context(tcti: &str) -> Result<Context> {
    let tcti_cfg = TctiNameConf::from_str(tcti)?;
    let context = Context::new(tcti_cfg)?;
    Ok(context)
}

/// Picks the TCTI to talk to: an explicit flag wins, then the TCTI
/// environment variable, then the system TPM.
pub fn resolve_tcti(flag: Option<&str>) -> String {
    match flag {
        Some(tcti) => tcti.to_string(),
        None => match std::env::var("TCTI") {
            Ok(val) => val,
            Err(_) => if Path::new("/dev/tpmrm0").exists() {
                "device:/dev/tpmrm0"
            } else {
                "device:/dev/tpm0"
            }
            .to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_tcti_flag_wins() {
        assert_eq!(
            resolve_tcti(Some("swtpm:host=localhost,port=2321")),
            "swtpm:host=localhost,port=2321",
        );
    }

    #[test]
    fn garbled_tcti_does_not_open() {
        assert!(open_context("not a tcti").is_err());
    }
}

#[cfg(all(test, feature = "swtpm-tests"))]
mod swtpm_tests {
    use testutil::tpm::SwTpm;
    use super::*;

    #[test]
    fn context_opens_against_a_live_tpm() {
        let swtpm = SwTpm::new();
        open_context(&swtpm.tcti).unwrap();
    }
}
