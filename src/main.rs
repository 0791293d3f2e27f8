use std::{path::Path, sync::Arc};

use axum::{Router, http::StatusCode, middleware};
use clap::Parser;
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};
use rulegate::{
    RouteRulesEngine,
    adapters::{
        HttpClientAdapter, create_route_rules_layer, request_id_middleware,
        request_timing_middleware,
    },
    config::{ServerConfigValidator, loader::load_config, models::ServerConfig},
    tracing_setup,
    utils::shutdown_signal,
};

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    #[clap(subcommand)]
    command: Option<Commands>,

    #[clap(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Validate configuration file
    Validate {
        /// Configuration file to validate
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Initialize a new configuration file
    Init {
        /// Output path for the new config file
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
    /// Start the gateway server (default)
    Serve {
        /// Configuration file to use
        #[clap(short, long, default_value = "config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    let (command, config_path) = match args.command {
        Some(Commands::Validate { config }) => ("validate", config),
        Some(Commands::Init { config }) => ("init", config),
        Some(Commands::Serve { config }) => ("serve", config),
        None => ("serve", args.config), // Default to serve with config from args
    };

    match command {
        "validate" => {
            return validate_config_command(&config_path).await;
        }
        "init" => {
            return init_config_command(&config_path).await;
        }
        "serve" => {
            // Continue with normal server startup
        }
        _ => unreachable!(),
    }

    tracing_setup::init_tracing().map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Loading configuration from {config_path}");
    let config = load_config(&config_path)
        .await
        .wrap_err_with(|| format!("Failed to load configuration from {config_path}"))?;

    ServerConfigValidator::validate(&config)
        .map_err(|e| eyre!("Invalid configuration: {}", e))?;

    serve(config).await
}

async fn serve(config: ServerConfig) -> Result<()> {
    let http_client = Arc::new(HttpClientAdapter::new().wrap_err("Failed to create HTTP client")?);
    let engine = Arc::new(RouteRulesEngine::new(&config, http_client));

    tracing::info!(
        "Rule engine ready: {} pattern(s), base path '{}'",
        config.rules.len(),
        config.base_path
    );

    let app = Router::new()
        .fallback(handler_404)
        .layer(middleware::from_fn(create_route_rules_layer(engine)))
        .layer(middleware::from_fn(request_timing_middleware))
        .layer(middleware::from_fn(request_id_middleware));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {}", config.listen_addr))?;

    tracing::info!("Listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    tracing::info!("Server shut down cleanly");
    Ok(())
}

/// Requests that no rule redirected or proxied fall through here.
async fn handler_404() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "No route configured for this path")
}

async fn validate_config_command(config_path: &str) -> Result<()> {
    println!("🔍 Validating configuration file: {config_path}");

    if !Path::new(config_path).exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' not found");
        std::process::exit(1);
    }

    let config = match load_config(config_path).await {
        Ok(config) => {
            println!("✅ Configuration parsing: OK");
            config
        }
        Err(e) => {
            eprintln!("❌ Configuration parsing failed:");
            eprintln!("   {e}");
            std::process::exit(1);
        }
    };

    match ServerConfigValidator::validate(&config) {
        Ok(()) => {
            println!("✅ Configuration validation: OK");
            println!();
            println!("📋 Configuration Summary:");
            println!("   • Listen Address: {}", config.listen_addr);
            println!("   • Base Path: {}", config.base_path);
            println!("   • Rules: {}", config.rules.len());
            println!();
            println!("🎉 Configuration is valid and ready to use!");
            Ok(())
        }
        Err(e) => {
            eprintln!("❌ Configuration validation failed:");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

async fn init_config_command(config_path: &str) -> Result<()> {
    let path = Path::new(config_path);
    if path.exists() {
        eprintln!("❌ Error: Configuration file '{config_path}' already exists");
        std::process::exit(1);
    }

    let default_config = r#"# Rulegate Configuration

# The address to listen on
listen_addr = "127.0.0.1:8080"

# Base path stripped from every incoming request before rule matching
base_path = "/"

# Example rule: inject response headers below a prefix
[rules."/assets/**".headers]
cache-control = "public, max-age=31536000"

# Example rule: permanent redirect with wildcard rewrite
[rules."/blog/**".redirect]
to = "/news/**"
status_code = 301

# Example rule: proxy a subtree to an upstream service
[rules."/api/**".proxy]
to = "http://localhost:3000/**"
"#;

    tokio::fs::write(path, default_config)
        .await
        .context("Failed to write config file")?;
    println!("✅ Created default configuration at: {config_path}");
    println!("   Run 'rulegate serve --config {config_path}' to start the server");
    Ok(())
}
