use std::path::PathBuf;
use clap::{Parser, Subcommand};


#[derive(Parser)]
#[derive(Debug)]
#[command(version, about, long_about = None)]
/// Inspect and manipulate TPM2 policy sessions.
pub struct Opts {
    #[command(subcommand)]
    pub command: Command,

    /// TCTI to use when talking to the TPM.
    /// May be either "device:/path/to/tpm" or "swtpm:host=...,port=...".
    /// Defaults to the TCTI environment variable, falling back to the
    /// system TPM if the variable is not set.
    #[arg(short = 'T', long)]
    pub tcti: Option<String>,

    /// Print debugging information and non-critical TPM warnings.
    #[arg(short, long, default_value = "false")]
    pub debug: bool,

    /// Don't print the policy digest to standard output.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

#[derive(Subcommand)]
#[derive(Debug)]
pub enum Command {
    /// Restrict a policy session to a set of localities.
    #[command(alias = "policylocality")]
    PolicyLocality {
        /// Path to the file holding the session to update.
        #[arg(short = 'S', long)]
        session: PathBuf,

        /// File to write the updated policy digest to.
        #[arg(short, long)]
        out_policy_file: Option<PathBuf>,

        /// Locality to restrict the session to.
        /// Values below 32 form a bitmask over localities 0 through 4,
        /// higher values select a single extended locality.
        /// Accepts decimal, hexadecimal ("0x" prefix) and octal
        /// (leading zero) notation.
        #[arg(value_name = "LOCALITY", value_parser = parse_locality)]
        locality: u8,
    },
}

fn parse_locality(value: &str) -> std::result::Result<u8, String> {
    let parsed = if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else if value.len() > 1 && value.starts_with('0') {
        u8::from_str_radix(&value[1..], 8)
    } else {
        value.parse::<u8>()
    };
    parsed.map_err(|_| format!("\"{}\" is not a number between 0 and 255", value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locality_accepts_decimal_hex_and_octal() {
        assert_eq!(parse_locality("0"), Ok(0));
        assert_eq!(parse_locality("3"), Ok(3));
        assert_eq!(parse_locality("255"), Ok(255));
        assert_eq!(parse_locality("0x1f"), Ok(31));
        assert_eq!(parse_locality("0X20"), Ok(32));
        assert_eq!(parse_locality("010"), Ok(8));
    }

    #[test]
    fn locality_rejects_garbage_and_out_of_range_values() {
        assert!(parse_locality("").is_err());
        assert!(parse_locality("potato").is_err());
        assert!(parse_locality("3potato").is_err());
        assert!(parse_locality("-1").is_err());
        assert!(parse_locality("256").is_err());
        assert!(parse_locality("0x100").is_err());
        assert!(parse_locality("08").is_err());
    }

    #[test]
    fn policy_locality_parses_all_options() {
        let opts = Opts::try_parse_from([
            "tpm2ctl", "policy-locality", "-S", "session.json", "-o", "policy.bin", "0x1f",
        ]).unwrap();
        let Command::PolicyLocality { session, out_policy_file, locality } = opts.command;
        assert_eq!(session, PathBuf::from("session.json"));
        assert_eq!(out_policy_file, Some(PathBuf::from("policy.bin")));
        assert_eq!(locality, 31);
    }

    #[test]
    fn policy_locality_works_without_an_output_file() {
        let opts = Opts::try_parse_from([
            "tpm2ctl", "policy-locality", "--session", "session.json", "4",
        ]).unwrap();
        let Command::PolicyLocality { session, out_policy_file, locality } = opts.command;
        assert_eq!(session, PathBuf::from("session.json"));
        assert_eq!(out_policy_file, None);
        assert_eq!(locality, 4);
    }

    #[test]
    fn policy_locality_answers_to_its_squashed_alias() {
        let opts = Opts::try_parse_from([
            "tpm2ctl", "policylocality", "-S", "session.json", "2",
        ]).unwrap();
        let Command::PolicyLocality { locality, .. } = opts.command;
        assert_eq!(locality, 2);
    }

    #[test]
    fn session_file_is_required() {
        assert!(Opts::try_parse_from(["tpm2ctl", "policy-locality", "3"]).is_err());
    }

    #[test]
    fn exactly_one_locality_is_required() {
        assert!(Opts::try_parse_from(["tpm2ctl", "policy-locality", "-S", "s.json"]).is_err());
        assert!(Opts::try_parse_from(["tpm2ctl", "policy-locality", "-S", "s.json", "3", "4"]).is_err());
    }

    #[test]
    fn malformed_localities_are_rejected() {
        assert!(Opts::try_parse_from(["tpm2ctl", "policy-locality", "-S", "s.json", "256"]).is_err());
        assert!(Opts::try_parse_from(["tpm2ctl", "policy-locality", "-S", "s.json", "locality"]).is_err());
    }
}
