use clap::Parser;
use tpm2ctl::{args::{Command, Opts}, tpm::resolve_tcti};

fn main() {
    let opts = Opts::parse();
    stderrlog::new()
        .verbosity(if opts.debug { log::Level::Trace } else { log::Level::Warn })
        .init()
        .unwrap();

    let tcti = resolve_tcti(opts.tcti.as_deref());
    let result = match opts.command {
        Command::PolicyLocality { session, out_policy_file, locality } => {
            tpm2ctl::commands::policy_locality::run(
                &tcti,
                &session,
                locality,
                out_policy_file.as_deref(),
                opts.quiet,
            )
        },
    };

    if result.is_err() {
        std::process::exit(1);
    }
}
