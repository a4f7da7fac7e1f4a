//! Configuration validation functions.

use super::defaults::DEV_JWT_SECRET;
use super::Config;

/// Reject configurations the server cannot run with.
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("server.port must be non-zero");
    }

    let secret = config.security.jwt_secret.trim();
    if secret.is_empty() {
        anyhow::bail!(
            "security.jwt_secret must not be empty \
             (set JWT_SECRET or SUNNY_SAYS__SECURITY__JWT_SECRET)"
        );
    }
    if is_production_mode() && secret == DEV_JWT_SECRET {
        anyhow::bail!(
            "\nCRITICAL: the built-in development JWT secret is not allowed in production!\n\
             ===================================================================\n\
             export JWT_SECRET=\"$(openssl rand -hex 32)\"\n\
             ===================================================================\n"
        );
    }
    if secret.len() < 16 && secret != DEV_JWT_SECRET {
        eprintln!(
            "\nWARNING: JWT secret is very short ({} chars).\n\
             Recommended: At least 32 characters.\n",
            secret.len()
        );
    }

    if config.security.max_message_size == 0 {
        anyhow::bail!("security.max_message_size must be greater than zero");
    }
    if config.security.outbound_queue_capacity == 0 {
        anyhow::bail!("security.outbound_queue_capacity must be greater than zero");
    }

    let matchmaking = &config.matchmaking;
    if matchmaking.waiting_timeout_secs == 0 {
        anyhow::bail!("matchmaking.waiting_timeout_secs must be greater than zero");
    }
    if matchmaking.cleanup_interval_secs == 0 {
        anyhow::bail!("matchmaking.cleanup_interval_secs must be greater than zero");
    }
    if matchmaking.stale_room_secs == 0 {
        anyhow::bail!("matchmaking.stale_room_secs must be greater than zero");
    }

    Ok(())
}

/// `SUNNY_SAYS_ENV=production` (or `prod`).
pub fn is_production_mode() -> bool {
    std::env::var("SUNNY_SAYS_ENV")
        .map(|mode| matches!(mode.trim().to_lowercase().as_str(), "production" | "prod"))
        .unwrap_or(false)
}
