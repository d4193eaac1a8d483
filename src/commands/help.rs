use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::Context;

use stock_viewer::models::Period;

pub async fn execute(ctx: &Context, msg: &Message) -> Result<(), String> {
    let embed = CreateEmbed::default()
        .title("📖 Stock Viewer Commands")
        .description("A watchlist of live quotes with a price chart for the stock and period you pick.")
        .color(0x00b0f4)
        .field(
            "📋 Watchlist",
            "`$watchlist` (`$wl`) - Show the watchlist\n`$refresh` - Refresh quotes now",
            false,
        )
        .field(
            "📈 Charts",
            "`$chart <SYMBOL> [period]` - Select a stock and show its chart\n`$period <period>` - Change the chart period\n`$periods` - List available periods\n`$hide` - Hide the chart panel",
            false,
        )
        .field(
            "⚡ Rate Limiting",
            "Per-user cooldown on every command",
            false,
        );

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| format!("Failed to send help message: {}", e))?;

    Ok(())
}

pub async fn periods(ctx: &Context, msg: &Message) -> Result<(), String> {
    let lines: Vec<String> = Period::ALL
        .iter()
        .map(|period| format!("`{}` - {}", period.as_str(), period.label()))
        .collect();

    let embed = CreateEmbed::default()
        .title("🕒 Chart Periods")
        .description(lines.join("\n"))
        .field("Aliases", "`1d`, `7d`/`1w`, `30d`/`1m`, `6m`, `1y`", false)
        .color(0x00b0f4);

    msg.channel_id
        .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
        .await
        .map_err(|e| e.to_string())?;

    Ok(())
}
