use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{OptionExt, Result, WrapErr};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use oxicord_reconcile::application::{Client, ClientEvent, EventName, SideEffectFailure};
use oxicord_reconcile::domain::entities::AuthToken;
use oxicord_reconcile::infrastructure::{
    AppConfig, CliArgs, DiscordRestClient, GatewayFrame, StorageManager,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn create_client(args: &CliArgs, config: &AppConfig) -> Result<Client> {
    let token = args.token.clone().and_then(|raw| {
        let token = AuthToken::new(raw);
        if token.is_none() {
            warn!("Ignoring malformed token");
        }
        token
    });

    if let Some(token) = &token {
        info!(token = %token.masked(), "Using configured token");
    }

    let rest = Arc::new(DiscordRestClient::new(config.api.base_url.clone(), token)?);
    let mut client = Client::new(config.client_options(), rest);
    register_listeners(&mut client);
    Ok(client)
}

fn register_listeners(client: &mut Client) {
    client.on(EventName::Ready, |event| {
        if let ClientEvent::Ready {
            user_id,
            guild_count,
        } = event
        {
            info!(user_id = %user_id, guild_count, "Ready");
        }
    });

    client.on(EventName::MessageCreate, |event| {
        if let Some(message) = event.message() {
            info!(
                message_id = %message.id(),
                channel_id = %message.channel_id(),
                "Message received"
            );
        }
    });

    for name in [EventName::MessageAck, EventName::ChannelPinsAck] {
        client.on(name, move |event| {
            if let ClientEvent::ReadState(state) = event {
                info!(
                    event = %name,
                    read_state = %state.id(),
                    mentions = state.mention_count(),
                    "Read state updated"
                );
            }
        });
    }

    for name in [EventName::ChannelCreate, EventName::ChannelDelete] {
        client.on(name, move |event| {
            if let ClientEvent::Channel { channel_id, .. } = event {
                info!(event = %name, channel_id = %channel_id, "Channel changed");
            }
        });
    }

    for name in [EventName::GuildCreate, EventName::GuildDelete] {
        client.on(name, move |event| {
            if let ClientEvent::Guild(guild) = event {
                info!(
                    event = %name,
                    guild_id = %guild.id(),
                    unavailable = guild.is_unavailable(),
                    "Guild changed"
                );
            }
        });
    }
}

fn report_failure(failure: &SideEffectFailure) {
    error!(task = %failure.task, error = %failure.error, "Side effect failed");
}

async fn replay<R>(
    client: &mut Client,
    input: R,
    failures: &mut mpsc::UnboundedReceiver<SideEffectFailure>,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut dispatched = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.wrap_err("failed to read input")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let frame = match GatewayFrame::parse(&line) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(error = %e, "Skipping frame");
                        continue;
                    }
                };

                let Some((event_type, data)) = frame.into_dispatch() else {
                    debug!("Skipping non-dispatch frame");
                    continue;
                };

                client.dispatch(&event_type, &data);
                dispatched += 1;
            }
            Some(failure) = failures.recv() => report_failure(&failure),
        }
    }

    Ok(dispatched)
}

async fn open_input(path: Option<&Path>) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    Ok(match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .wrap_err_with(|| format!("failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(
        version = oxicord_reconcile::VERSION,
        "Starting {}",
        oxicord_reconcile::NAME
    );

    let mut client = create_client(&args, &config)?;
    let mut failures = client
        .take_side_effect_failures()
        .ok_or_eyre("side-effect failure sink already taken")?;

    let input = open_input(args.input.as_deref()).await?;
    let dispatched = replay(&mut client, input, &mut failures).await?;

    let state = client.state();
    info!(
        dispatched,
        channels = state.channels().len(),
        guilds = state.guilds().len(),
        read_states = state.read_states().len(),
        "Input exhausted, waiting for side effects"
    );
    drop(client);

    while let Some(failure) = failures.recv().await {
        report_failure(&failure);
    }

    info!("Shutdown complete");
    Ok(())
}
