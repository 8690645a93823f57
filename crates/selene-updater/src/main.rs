use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use selene_updater::{Channel, Updater, UpdaterConfig, logging, serve};

#[derive(Parser)]
#[command(name = "selene-updater")]
#[command(about = "Update descriptors for the Selene client, served from Nexus")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ~/.config/selene-updater/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve a channel once and print its descriptor
    Resolve {
        /// Channel to resolve (stable, experimental)
        channel: Channel,
    },

    /// Show the effective upstream configuration
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match UpdaterConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.log);

    match cli.command {
        Commands::Serve { host, port } => {
            // CLI flags override config
            if host.is_some() {
                config.server.host = host;
            }
            if port.is_some() {
                config.server.port = port;
            }
            cmd_serve(&config)
        }
        Commands::Resolve { channel } => cmd_resolve(&config, channel),
        Commands::Config => cmd_config(&config),
    }
}

fn cmd_serve(config: &UpdaterConfig) -> ExitCode {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start runtime");
            return ExitCode::FAILURE;
        }
    };
    match rt.block_on(serve::run(config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

fn cmd_resolve(config: &UpdaterConfig, channel: Channel) -> ExitCode {
    let updater = Updater::from_config(config);
    let descriptor = match updater.latest(channel) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            eprintln!("Failed to resolve {}: {}", channel, e);
            return ExitCode::FAILURE;
        }
    };
    match serde_json::to_string_pretty(&descriptor) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to encode descriptor: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_config(config: &UpdaterConfig) -> ExitCode {
    let upstream = &config.upstream;
    let rewriter = upstream.rewriter();
    println!(
        "listen:      {}:{}",
        config.server.host(),
        config.server.port()
    );
    println!("route:       /{}/{{channel}}/latest.json", config.server.prefix());
    println!("search:      {}", upstream.search_url());
    println!("artifact:    {}:{}", upstream.group(), upstream.artifact());
    println!("public base: {}", upstream.public_base());
    println!(
        "rewrite:     {} -> {}",
        rewriter.internal_repositories().join(", "),
        rewriter.public_repository()
    );
    for channel in Channel::all() {
        println!(
            "channel:     {} -> {}",
            channel,
            config.channels.repository(*channel)
        );
    }
    ExitCode::SUCCESS
}
