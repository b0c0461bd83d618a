use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingSettings;

pub fn init_logging(settings: &LoggingSettings, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("avrctl=debug,zbus=info")
    } else {
        EnvFilter::try_new(&settings.filter).unwrap_or_else(|e| {
            eprintln!("avrctl: invalid log filter {:?}: {e}", settings.filter);
            EnvFilter::new("avrctl=info")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
