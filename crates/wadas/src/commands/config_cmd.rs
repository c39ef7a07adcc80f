//! Config subcommand handlers.

use dialoguer::{Confirm, Input, Password, Select};

use wadas_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::active_profile_name;
use crate::error::CliError;
use crate::output;

/// Map a dialoguer failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),

        ConfigCommand::Show => {
            let mut cfg = wadas_config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.password.is_some() {
                    profile.password = Some("********".into());
                }
            }
            let rendered = toml::to_string_pretty(&cfg).map_err(|e| CliError::Render(e.to_string()))?;
            output::print_output(&rendered, global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword => {
            let cfg = wadas_config::load_config_or_default();
            let profile_name = active_profile_name(global, &cfg);
            let password = Password::new()
                .with_prompt(format!("Password for profile '{profile_name}'"))
                .interact()
                .map_err(prompt_err)?;
            wadas_config::store_password(&profile_name, &password)?;
            output::print_success(
                &format!("Password stored in system keyring for '{profile_name}'"),
                global.color,
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = wadas_config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
                available.sort_unstable();
                return Err(CliError::ProfileNotFound {
                    available: available.join(", "),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            wadas_config::save_config(&cfg)?;
            output::print_success(
                &format!("Default profile set to '{name}'"),
                global.color,
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(
                &wadas_config::config_path().display().to_string(),
                global.quiet,
            );
            Ok(())
        }
    }
}

/// Interactive wizard: one profile, password in keyring or plaintext.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let config_path = wadas_config::config_path();
    eprintln!("WADAS admin console: configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let server: String = Input::new()
        .with_prompt("Web server URL")
        .default("https://localhost:8443".into())
        .interact_text()
        .map_err(prompt_err)?;
    url_check(&server)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(prompt_err)?;

    let password = Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(prompt_err)?;
    if username.is_empty() || password.is_empty() {
        return Err(CliError::Validation {
            field: "credentials".into(),
            reason: "username and password cannot be empty".into(),
        });
    }

    let store_choices = &[
        "Store password in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let password_field = if store_selection == 0 {
        wadas_config::store_password(&profile_name, &password)?;
        eprintln!("   Password stored in system keyring");
        None
    } else {
        Some(password)
    };

    let insecure = Confirm::new()
        .with_prompt("Accept self-signed TLS certificates?")
        .default(false)
        .interact()
        .map_err(prompt_err)?;

    let mut cfg: Config = wadas_config::load_config_or_default();
    cfg.profiles.insert(
        profile_name.clone(),
        Profile {
            server,
            username: Some(username),
            password: password_field,
            insecure: insecure.then_some(true),
            ..Profile::default()
        },
    );
    if cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }

    let path = wadas_config::save_config(&cfg)?;
    output::print_success(
        &format!("Profile '{profile_name}' saved to {}", path.display()),
        global.color,
        global.quiet,
    );
    Ok(())
}

fn url_check(raw: &str) -> Result<(), CliError> {
    match raw.parse::<url::Url>() {
        Ok(_) => Ok(()),
        Err(e) => Err(CliError::Validation {
            field: "server".into(),
            reason: format!("invalid URL '{raw}': {e}"),
        }),
    }
}
