use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use dockside_config::Config;
use dockside_sdk::{Client, Context, RemoveOptions, ServiceInspectOptions};
use serde::Serialize;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Path to the config file, `dockside.toml` is used when present
    #[clap(long, global = true)]
    config: Option<String>,

    /// Engine host, takes precedence over the config file and `DOCKSIDE_HOST`
    #[clap(long, global = true)]
    host: Option<String>,

    /// Deadline for the whole command in seconds
    #[clap(long, global = true)]
    timeout: Option<u64>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage containers
    #[clap(subcommand)]
    Container(ContainerCommands),
    /// Manage swarm services
    #[clap(subcommand)]
    Service(ServiceCommands),
    /// Check that the engine is reachable
    Ping,
}

#[derive(Subcommand)]
enum ContainerCommands {
    /// Remove a container
    Rm(ContainerRemoveArgs),
    /// Display low-level information on a container
    Inspect(ContainerInspectArgs),
}

#[derive(Subcommand)]
enum ServiceCommands {
    /// Display low-level information on a service
    Inspect(ServiceInspectArgs),
    /// Remove a service
    Rm(ServiceRemoveArgs),
}

#[derive(Parser)]
struct ContainerRemoveArgs {
    /// Container name or ID
    id: String,

    /// Remove anonymous volumes associated with the container
    #[clap(short, long)]
    volumes: bool,

    /// Force the removal of a running container
    #[clap(short, long)]
    force: bool,

    /// Remove the specified link
    #[clap(short, long)]
    link: bool,
}

#[derive(Parser)]
struct ContainerInspectArgs {
    /// Container name or ID
    id: String,

    /// Display total file sizes
    #[clap(short, long)]
    size: bool,

    /// Print the response body as received from the engine
    #[clap(long)]
    raw: bool,
}

#[derive(Parser)]
struct ServiceInspectArgs {
    /// Service name or ID
    id: String,

    /// Fill in default values for unset fields
    #[clap(long)]
    insert_defaults: bool,

    /// Print the response body as received from the engine
    #[clap(long)]
    raw: bool,
}

#[derive(Parser)]
struct ServiceRemoveArgs {
    /// Service name or ID
    id: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");

            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_system_env()?;

    if let Some(host) = cli.host {
        config.engine.host = host;
    }

    let client = Client::from_config(&config.engine)?;

    let ctx = match cli.timeout {
        Some(timeout) => Context::with_timeout(Duration::from_secs(timeout)),
        None => Context::background(),
    };
    cancel_on_ctrl_c(ctx.clone());

    match cli.command {
        Commands::Container(ContainerCommands::Rm(args)) => {
            let options = RemoveOptions {
                remove_volumes: args.volumes,
                remove_links: args.link,
                force: args.force,
            };

            client.container_remove(&ctx, &args.id, options).await?;

            log::info!("Container removed");
            print_line(args.id.trim());
        }
        Commands::Container(ContainerCommands::Inspect(args)) => {
            let (container, raw) = client
                .container_inspect_with_raw(&ctx, &args.id, args.size)
                .await?;

            print_inspect(&container, &raw, args.raw)?;
        }
        Commands::Service(ServiceCommands::Inspect(args)) => {
            let options = ServiceInspectOptions {
                insert_defaults: args.insert_defaults,
            };

            let (service, raw) = client
                .service_inspect_with_raw(&ctx, &args.id, options)
                .await?;

            print_inspect(&service, &raw, args.raw)?;
        }
        Commands::Service(ServiceCommands::Rm(args)) => {
            client.service_remove(&ctx, &args.id).await?;

            log::info!("Service removed");
            print_line(args.id.trim());
        }
        Commands::Ping => {
            let ping = client.ping(&ctx).await?;

            log::info!(
                "Engine is reachable, API version: {}",
                ping.api_version.as_deref().unwrap_or("unknown")
            );
            print_line("OK");
        }
    }

    Ok(())
}

/// Cancels `ctx` on the first Ctrl-C so the in-flight request is aborted
fn cancel_on_ctrl_c(ctx: Context) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, cancelling request");

            ctx.cancel();
        }
    });
}

fn print_inspect<T: Serialize>(
    value: &T,
    raw_body: &[u8],
    raw: bool,
) -> Result<(), serde_json::Error> {
    if raw {
        print_line(String::from_utf8_lossy(raw_body).trim_end());
    } else {
        print_line(&serde_json::to_string_pretty(value)?);
    }

    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_line(line: &str) {
    println!("{line}");
}
