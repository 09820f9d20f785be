use {
    clap::Parser,
    teller::{Teller, config::TellerConfig, logging::init_logging},
    tracing::error,
};

#[derive(Parser)]
#[command(version, about = "Withdrawal service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = match TellerConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config file {}: {e}", cli.config);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.log_dir, config.debug) {
        eprintln!("Error: failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let mut app = match Teller::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.run().await {
        error!("Teller failed to run: {}", e);
        std::process::exit(1);
    }
}
