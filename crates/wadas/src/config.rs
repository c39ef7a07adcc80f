//! Connection resolution: config file profile + CLI flag overrides.
//!
//! Core never sees profiles; it receives a built `ConsoleConfig` and the
//! login credentials.

use secrecy::SecretString;

use wadas_config::{Config, Profile};
use wadas_core::ConsoleConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything needed to open a console and log in.
pub struct Connection {
    pub profile_name: String,
    pub config: ConsoleConfig,
    pub username: String,
    pub password: SecretString,
}

/// Name of the profile this invocation targets.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Resolve the connection from the config file, falling back to
/// `--server` / `--username` alone when no profile matches.
pub fn resolve(global: &GlobalOpts) -> Result<Connection, CliError> {
    let cfg = wadas_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.server.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: wadas_config::config_path().display().to_string(),
            });
        }
    };
    apply_overrides(&mut profile, global);

    let config = wadas_config::profile_to_console_config(&profile, &cfg.defaults)?;
    let username = wadas_config::resolve_username(&profile, &profile_name)?;
    let password = wadas_config::resolve_password(&profile, &profile_name)?;

    Ok(Connection {
        profile_name,
        config,
        username,
        password,
    })
}

/// Layer flag values over a profile.
fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
}
