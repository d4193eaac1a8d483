pub mod chart;
pub mod help;
pub mod watchlist;

use serenity::model::channel::Message;
use serenity::prelude::Context;

use stock_viewer::utils::check_cooldown;

use crate::ViewerContext;

pub async fn handle_message(ctx: &Context, msg: &Message) {
    if msg.author.bot {
        return;
    }

    // Parse command and arguments
    let parts: Vec<&str> = msg.content.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return;
    };
    if !is_command(command) {
        return;
    }

    let viewer = match viewer_context(ctx).await {
        Ok(viewer) => viewer,
        Err(e) => {
            tracing::error!("{}", e);
            return;
        }
    };

    if let Err((remaining, should_warn)) =
        check_cooldown(msg.author.id.get(), command, viewer.config.command_cooldown).await
    {
        if should_warn {
            let _ = msg.channel_id.send_message(
                ctx,
                serenity::builder::CreateMessage::default().embed(
                    serenity::builder::CreateEmbed::default()
                        .title("Command Cooldown")
                        .description(format!("⏳ Please wait {} seconds before using this command again.", remaining))
                        .color(0xffa500)
                )
            ).await;
        }
        return;
    }

    let result = match command {
        "$help" => help::execute(ctx, msg).await,
        "$periods" => help::periods(ctx, msg).await,
        "$watchlist" | "$wl" => watchlist::execute(ctx, msg, &viewer).await,
        "$refresh" => watchlist::refresh(ctx, msg, &viewer).await,
        "$chart" => chart::execute(ctx, msg, &viewer, args).await,
        "$period" => chart::period(ctx, msg, &viewer, args).await,
        "$hide" => chart::hide(ctx, msg, &viewer).await,
        _ => return,
    };

    if let Err(e) = result {
        tracing::warn!("❌ Error executing command {}: {}", command, e);

        let user_message = if e.contains("429") || e.contains("rate limit") {
            "⚠️ **Rate Limited**: Discord is rate limiting us. Please try again in a moment.".to_string()
        } else if e.is_empty() {
            "❌ An error occurred while executing the command.".to_string()
        } else {
            format!("❌ {}", e)
        };

        let embed = serenity::builder::CreateEmbed::default()
            .title("Command Error")
            .description(user_message)
            .color(0xff0000);

        let _ = msg.channel_id
            .send_message(ctx, serenity::builder::CreateMessage::default().embed(embed))
            .await;
    }
}

fn is_command(word: &str) -> bool {
    matches!(
        word,
        "$help" | "$periods" | "$watchlist" | "$wl" | "$refresh" | "$chart" | "$period" | "$hide"
    )
}

async fn viewer_context(ctx: &Context) -> Result<ViewerContext, String> {
    let data = ctx.data.read().await;
    data.get::<ViewerContext>()
        .cloned()
        .ok_or_else(|| "Viewer not initialized".to_string())
}
