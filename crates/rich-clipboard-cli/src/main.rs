//! rich-clipboard CLI: run the clipboard daemon or call it.

use std::net::SocketAddr;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use rich_clipboard_daemon::{setup, Config};
use rich_clipboard_protocol::ChannelClient;
use rich_clipboard_types::{ClipboardSnapshot, Method, MethodCall, MethodResponse, Mime, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "rich-clipboard",
    about = "MIME-keyed access to the system clipboard",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Daemon address, overriding the configured bind and port.
    #[arg(short, long, global = true)]
    addr: Option<SocketAddr>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the clipboard daemon in the foreground.
    Serve,

    /// Print the clipboard as a MIME → content map.
    Get,

    /// Replace the clipboard contents.
    Set {
        /// Plain text (`text/plain`).
        #[arg(short, long)]
        text: Option<String>,

        /// HTML markup (`text/html`).
        #[arg(long)]
        html: Option<String>,
    },

    /// List the native formats on the clipboard.
    Types,

    /// Print the number of clipboard items.
    Count,

    /// Call a method by name with JSON arguments.
    Call {
        /// Method name, e.g. `getData` or `RichClipboard.getData`.
        method: String,

        /// Arguments as JSON.
        #[arg(long, default_value = "null")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = setup::load_config(cli.config.as_deref())?;

    let default_level = match cli.command {
        Commands::Serve => config.daemon.log_level.as_str(),
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr = match cli.addr {
        Some(addr) => addr,
        None => config.socket_addr()?,
    };

    let call: MethodCall = match cli.command {
        Commands::Serve => return serve(&config, addr).await,
        Commands::Get => Method::GetData.into(),
        Commands::Set { text, html } => MethodCall::set_data(snapshot_from(text, html)?),
        Commands::Types => Method::GetAvailableTypes.into(),
        Commands::Count => Method::GetItemCount.into(),
        Commands::Call { method, args } => {
            let arguments: Value =
                serde_json::from_str(&args).context("arguments are not valid JSON")?;
            MethodCall::new(method).with_arguments(arguments)
        }
    };

    let mut client = ChannelClient::connect(addr)
        .await
        .with_context(|| format!("is the daemon running on {addr}?"))?;
    let response = client.call(&call).await?;
    client.close().await?;

    if let Some(json) = render(response)? {
        println!("{json}");
    }
    Ok(())
}

#[cfg(feature = "system")]
async fn serve(config: &Config, addr: SocketAddr) -> anyhow::Result<()> {
    use rich_clipboard_daemon::{Daemon, DaemonEvent};

    tracing::info!(addr = %addr, "starting rich-clipboard daemon");
    let clipboard = setup::system_clipboard(config)?;
    let dispatcher = setup::build_dispatcher(config, clipboard);
    let mut daemon = Daemon::bind_addr(addr, dispatcher).await?;

    let shutdown = daemon.event_sender();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown.send(DaemonEvent::Shutdown).await;
        }
    });

    daemon.run().await?;
    Ok(())
}

#[cfg(not(feature = "system"))]
async fn serve(_config: &Config, _addr: SocketAddr) -> anyhow::Result<()> {
    bail!("built without system clipboard support; rebuild with the `system` feature")
}

fn snapshot_from(text: Option<String>, html: Option<String>) -> anyhow::Result<ClipboardSnapshot> {
    let Some(text) = text else {
        bail!("--text is required; the clipboard is only replaced when plain text is given");
    };
    let mut snapshot = ClipboardSnapshot::text(text);
    if let Some(html) = html {
        snapshot.insert(Mime::TextHtml, html);
    }
    Ok(snapshot)
}

/// JSON for a successful response; `None` when there is nothing to print.
fn render(response: MethodResponse) -> anyhow::Result<Option<String>> {
    match response {
        MethodResponse::Success(Value::Null) => Ok(None),
        MethodResponse::Success(value) => Ok(Some(serde_json::to_string_pretty(&value)?)),
        MethodResponse::Error { code, message } => bail!("{code}: {message}"),
        MethodResponse::NotImplemented => bail!(
            "method not implemented; known methods: {}",
            Method::ALL.map(Method::name).join(", ")
        ),
    }
}
