use std::time::Duration;

use serenity::all::CreateEmbedFooter;
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use stock_viewer::utils::Table;

use crate::ViewerContext;

const FIRST_REFRESH_WAIT: Duration = Duration::from_secs(10);

pub async fn execute(ctx: &Context, msg: &Message, viewer: &ViewerContext) -> Result<(), String> {
    let mut state = viewer.viewer.watchlist();
    if state.refreshed_at.is_none() && state.error.is_none() {
        tracing::debug!("Watchlist not loaded yet, waiting for first refresh");
        if let Ok(Ok(loaded)) =
            tokio::time::timeout(FIRST_REFRESH_WAIT, viewer.viewer.wait_for_watchlist()).await
        {
            state = loaded;
        }
    }

    let selection = viewer.viewer.selection();
    let table = Table::watchlist(&state.stocks, selection.symbol());

    let description = if table.is_empty() {
        "No stocks loaded yet.".to_string()
    } else {
        table.render()
    };

    let mut embed = CreateEmbed::default()
        .title("📋 Watchlist")
        .description(description)
        .color(0x00b0f4);

    if let Some(error) = &state.error {
        embed = embed.field("⚠️ Refresh failed", error, false);
    }

    if let Some(refreshed_at) = state.refreshed_at {
        embed = embed.footer(CreateEmbedFooter::new(format!(
            "Updated {} UTC • refreshes every {} s • {}",
            refreshed_at.format("%H:%M:%S"),
            viewer.config.refresh_interval.as_secs(),
            selection.period.label(),
        )));
    }

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

pub async fn refresh(ctx: &Context, msg: &Message, viewer: &ViewerContext) -> Result<(), String> {
    viewer.viewer.refresh_now().await.map_err(|e| e.to_string())?;
    tracing::info!("🔄 Manual watchlist refresh requested by {}", msg.author.id);

    let embed = CreateEmbed::default()
        .title("🔄 Refreshing")
        .description("Fetching the latest quotes. Use `$watchlist` to see them.")
        .color(0x00b0f4);

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
