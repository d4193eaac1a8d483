use serenity::all::{CreateAttachment, CreateEmbedFooter};
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use stock_viewer::models::Period;

use crate::ViewerContext;

/// `$chart <SYMBOL> [period]`
pub async fn execute(ctx: &Context, msg: &Message, viewer: &ViewerContext, args: &[&str]) -> Result<(), String> {
    tracing::info!("📈 Chart command from user {} with args: {:?}", msg.author.id, args);

    let Some(&symbol) = args.first() else {
        return Err("Usage: `$chart <SYMBOL> [period]`\nSee `$periods` for the available periods.".to_string());
    };
    let period = args
        .get(1)
        .map(|p| p.parse::<Period>())
        .transpose()
        .map_err(|e| e.to_string())?;

    show(ctx, msg, viewer, Some(symbol), period).await
}

/// `$period <period>`
pub async fn period(ctx: &Context, msg: &Message, viewer: &ViewerContext, args: &[&str]) -> Result<(), String> {
    let Some(&arg) = args.first() else {
        return Err("Usage: `$period <period>`\nSee `$periods` for the available periods.".to_string());
    };
    let period = arg.parse::<Period>().map_err(|e| e.to_string())?;

    if viewer.viewer.selection().stock.is_none() {
        viewer.viewer.set_period(period).await.map_err(|e| e.to_string())?;
        let embed = CreateEmbed::default()
            .title("🕒 Period Set")
            .description(format!(
                "Charts will show **{}**. Pick a stock with `$chart <SYMBOL>`.",
                period.label()
            ))
            .color(0x00b0f4);
        msg.channel_id
            .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
            .await
            .map_err(|e| e.to_string())?;
        return Ok(());
    }

    show(ctx, msg, viewer, None, Some(period)).await
}

/// `$hide`
pub async fn hide(ctx: &Context, msg: &Message, viewer: &ViewerContext) -> Result<(), String> {
    viewer.viewer.hide_panel().await.map_err(|e| e.to_string())?;

    let embed = CreateEmbed::default()
        .title("🙈 Chart Hidden")
        .description("The chart panel was closed. `$chart` shows it again.")
        .color(0x00b0f4);

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}

async fn show(
    ctx: &Context,
    msg: &Message,
    viewer: &ViewerContext,
    symbol: Option<&str>,
    period: Option<Period>,
) -> Result<(), String> {
    if let Err(e) = msg.channel_id.broadcast_typing(ctx.http.as_ref()).await {
        tracing::warn!("Failed to broadcast typing: {}", e);
    }

    let handle = &viewer.viewer;
    let mounted = handle.show_panel(viewer.surface).await.map_err(|e| e.to_string())?;
    let selected = handle.select(symbol, period).await.map_err(|e| e.to_string())?;

    let state = match selected.or(mounted) {
        Some(generation) => handle
            .wait_for_panel_timeout(generation, viewer.config.chart_timeout)
            .await
            .map_err(|e| e.to_string())?,
        None => handle.panel(),
    };

    if let Some(error) = state.error {
        return Err(error);
    }
    let Some(chart) = state.chart else {
        return Err("No chart to show. Pick a stock with `$chart <SYMBOL>`.".to_string());
    };

    let mut embed = CreateEmbed::default()
        .title(format!("📈 {} • {}", chart.symbol, chart.period.label()))
        .image("attachment://chart.png")
        .footer(CreateEmbedFooter::new(format!("{} data points", chart.series.len())));

    match handle.selection().stock {
        Some(stock) if stock.symbol == chart.symbol => {
            embed = embed
                .field("Price", stock.price_display(), true)
                .field("Change", stock.change_display(), true)
                .color(stock.trend().color());
        }
        _ => embed = embed.color(0x00b0f4),
    }

    let attachment = CreateAttachment::bytes(chart.image.as_ref().clone(), "chart.png");
    msg.channel_id
        .send_message(
            ctx,
            serenity::builder::CreateMessage::default()
                .embed(embed)
                .add_file(attachment),
        )
        .await
        .map_err(|e| e.to_string())?;

    tracing::info!("✅ Sent {} chart for {} ({})", chart.period, chart.symbol, chart.chart_id);
    Ok(())
}
