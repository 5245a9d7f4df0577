//! Satchel - encrypted configuration for provisioning pipelines.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use satchel::cli::{execute, output, Cli};
use satchel::core::constants;
use satchel::core::context::InvocationContext;
use satchel::error::{Error, KeyError, PolicyError};

fn main() {
    let cli = Cli::parse();

    let ctx = InvocationContext::detect(cli.quiet);
    output::set_quiet(ctx.is_quiet());

    // Tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(constants::ENV_LOG).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("satchel=debug")
        } else {
            EnvFilter::new("satchel=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).without_time())
        .init();

    if let Err(e) = execute(cli.command) {
        let suggestion = match &e {
            Error::Policy(PolicyError::Missing(_)) => Some("run: satchel init"),
            Error::Key(KeyError::NoKeyAvailable { .. }) => {
                Some("run: satchel init (or set SATCHEL_AGE_KEY)")
            }
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
