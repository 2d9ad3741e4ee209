use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter for a given `-v` count.
fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info,casdoor_sdk=info",
        2 => "info,casdoor_sdk=debug,casdoor_http=debug",
        _ => "trace",
    }
}

/// An explicit `-v` overrides `RUST_LOG`; without it `RUST_LOG` applies, then `warn`.
fn filter(verbose: u8) -> EnvFilter {
    if verbose > 0 {
        return EnvFilter::new(default_directive(verbose));
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(0)))
}

/// Install a stderr subscriber; stdout is reserved for command output.
pub fn init(verbose: u8) {
    let filter = filter(verbose);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
