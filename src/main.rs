use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use stock_viewer::models::Surface;
use stock_viewer::{Gateway, PlottersRenderer, Viewer, ViewerConfig, ViewerHandle};

mod commands;

struct Handler;

/// Everything a command needs to talk to the viewer
#[derive(Clone)]
pub struct ViewerContext {
    pub viewer: ViewerHandle,
    pub config: ViewerConfig,
    pub surface: Surface,
}

impl TypeMapKey for ViewerContext {
    type Value = ViewerContext;
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        commands::handle_message(&ctx, &msg).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected!", ready.user.name);

        debug!("Checking Discord rate limit status...");
        match ctx.http.get_current_user().await {
            Ok(_) => info!("No rate limit detected - Bot is fully ready!"),
            Err(e) => warn!("Failed to check rate limit status: {}", e),
        }
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let mut filter = EnvFilter::from_default_env();
    for directive in ["stock_viewer=debug", "serenity=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("📈 Starting Stock Viewer 3000...");

    let config = match ViewerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };
    info!("Using {:?} gateway, refresh every {} s", config.gateway, config.refresh_interval.as_secs());

    let token = match std::env::var("DISCORD_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            error!("DISCORD_TOKEN not set");
            return;
        }
    };

    let (viewer, viewer_task) = Viewer::new(
        Gateway::from_config(&config),
        PlottersRenderer::new(),
        config.refresh_interval,
    )
    .spawn();

    let intents = GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGES;

    let mut client = match Client::builder(&token, intents).event_handler(Handler).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create client: {}", e);
            viewer.shutdown().await;
            return;
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<ViewerContext>(ViewerContext {
            viewer: viewer.clone(),
            surface: Surface::new(config.chart_width, config.chart_height),
            config,
        });
    }

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            shard_manager.shutdown_all().await;
        }
    });

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    viewer.shutdown().await;
    if let Err(e) = viewer_task.await {
        warn!("Viewer task ended abnormally: {}", e);
    }
}
