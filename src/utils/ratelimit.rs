use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use lazy_static::lazy_static;
use tokio::sync::Mutex;

lazy_static! {
    static ref COMMAND_COOLDOWNS: Mutex<HashMap<(u64, String), u64>> =
        Mutex::new(HashMap::new());

    // Last time a user was told about an active cooldown, so retries stay quiet
    static ref COOLDOWN_WARNINGS: Mutex<HashMap<(u64, String), u64>> =
        Mutex::new(HashMap::new());
}

/// Check if a user can run a command again.
///
/// Returns `Err((remaining_seconds, should_warn))` while the cooldown is
/// active; `should_warn` is true only for the first blocked attempt.
pub async fn check_cooldown(user_id: u64, command: &str, cooldown: Duration) -> Result<(), (u64, bool)> {
    let cooldown_secs = cooldown.as_secs();
    if cooldown_secs == 0 {
        return Ok(());
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let key = (user_id, command.to_string());

    let mut cooldowns = COMMAND_COOLDOWNS.lock().await;
    match cooldowns.get(&key) {
        Some(&last_time) if now.saturating_sub(last_time) < cooldown_secs => {
            let remaining = cooldown_secs - now.saturating_sub(last_time);

            let mut warnings = COOLDOWN_WARNINGS.lock().await;
            let should_warn = match warnings.get(&key) {
                Some(&last_warning) => last_warning < last_time,
                None => true,
            };
            if should_warn {
                warnings.insert(key, now);
            }

            Err((remaining, should_warn))
        }
        _ => {
            cooldowns.insert(key, now);
            Ok(())
        }
    }
}
