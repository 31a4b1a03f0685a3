//! garagebill server and CLI

use clap::Parser;
use garagebill::{
    cli::{Cli, Command, generate_config_template},
    config::Config,
    fallback::{CallOptions, FallbackClient},
    handlers::{self, AppState},
    shared::first_json_object,
    telemetry,
};
use std::net::SocketAddr;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Template generation needs no config file
    if let Some(Command::Config { output }) = &cli.command {
        match output {
            Some(path) => {
                std::fs::write(path, generate_config_template())?;
                eprintln!("Wrote configuration template to {}", path);
            }
            None => print!("{}", generate_config_template()),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::from_file(&cli.config)?;
    telemetry::init(&config.observability.log_level);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Complete {
            prompt,
            max_tokens,
            temperature,
            json,
        } => {
            let client = FallbackClient::from_config(&config)?;
            let options = CallOptions {
                schema_hint: None,
                max_tokens,
                temperature,
            };
            match client.call_with_fallback(&prompt, options).await {
                Ok(response) => {
                    if json {
                        match first_json_object(&response.content) {
                            Some(value) => {
                                println!("{}", serde_json::to_string_pretty(&value)?)
                            }
                            None => {
                                eprintln!(
                                    "No JSON object in output from {}/{}",
                                    response.provider, response.model
                                );
                                return Ok(ExitCode::FAILURE);
                            }
                        }
                    } else {
                        println!("{}", response.content);
                    }
                    eprintln!("-- {}/{}", response.provider, response.model);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    eprintln!("All LLM providers failed:\n{}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Check => {
            let client = FallbackClient::from_config(&config)?;
            let report = client.check_availability().await;
            for entry in &report {
                match &entry.error {
                    None => println!("ok    {}", entry.config),
                    Some(err) => println!("fail  {}: {}", entry.config, err),
                }
            }
            if report.iter().any(|a| a.available) {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Config { .. } => Ok(ExitCode::SUCCESS),
    }
}

async fn serve(config: Config) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let state = AppState::new(&config)?;

    let configured = state.client().list_available().len();
    tracing::info!(
        chain_length = state.client().chain().len(),
        configured = configured,
        "Fallback chain loaded"
    );
    if configured == 0 {
        tracing::warn!(
            "No provider credentials set; every completion will fail until one is configured"
        );
    }

    let app = handlers::app(state);

    let addr = SocketAddr::from((
        config
            .server
            .host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| std::net::IpAddr::from([0, 0, 0, 0])),
        config.server.port,
    ));

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(ExitCode::SUCCESS)
}
