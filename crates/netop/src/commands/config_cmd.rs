//! Config subcommand handlers.

use std::fmt::Write as _;

use dialoguer::{Confirm, Input, Password, Select};

use netop_config::IdentitySection;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for identity in cfg.profiles.values_mut().filter_map(|p| p.identity.as_mut()) {
        if identity.client_secret.is_some() {
            identity.client_secret = Some(MASK.into());
        }
    }
    cfg
}

/// TOML-like listing of a (redacted) config.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "default_profile = \"{}\"", cfg.default_profile_name());
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        if p.demo {
            let _ = writeln!(out, "demo = true");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ref id) = p.identity {
            let _ = writeln!(out);
            let _ = writeln!(out, "[profiles.{name}.identity]");
            let _ = writeln!(out, "domain = \"{}\"", id.domain);
            let _ = writeln!(out, "client_id = \"{}\"", id.client_id);
            let _ = writeln!(out, "audience = \"{}\"", id.audience);
            let _ = writeln!(out, "redirect_uri = \"{}\"", id.redirect_uri);
            if let Some(ref secret) = id.client_secret {
                let _ = writeln!(out, "client_secret = \"{secret}\"");
            }
            if let Some(ref env) = id.client_secret_env {
                let _ = writeln!(out, "client_secret_env = \"{env}\"");
            }
            if let Some(ref scope) = id.scope {
                let _ = writeln!(out, "scope = \"{scope}\"");
            }
        }
    }

    out.trim_end().to_owned()
}

fn save(cfg: &Config) -> Result<std::path::PathBuf, CliError> {
    Ok(config::save_config(cfg)?)
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt(label: &str, default: Option<&str>) -> Result<String, CliError> {
    let mut input = Input::<String>::new().with_prompt(label);
    if let Some(default) = default {
        input = input.default(default.to_owned());
    }
    input.interact_text().map_err(prompt_err)
}

/// Ask where the client secret should live. Returns the plaintext value
/// only when the user chose to keep it in the config file.
fn prompt_client_secret(profile_name: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "No client secret (public client)",
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Client secret")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    if selection == 0 {
        return Ok(None);
    }

    let secret = Password::new()
        .with_prompt("Client secret")
        .interact()
        .map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::validation("client_secret", "secret cannot be empty"));
    }

    if selection == 1 {
        netop_config::store_client_secret(profile_name, &secret)?;
        eprintln!("   Client secret stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

fn prompt_identity(profile_name: &str) -> Result<IdentitySection, CliError> {
    let domain = prompt("Identity domain", None)?;
    let client_id = prompt("Client ID", None)?;
    let audience = prompt("API audience", Some("https://api.netop.cloud"))?;
    let redirect_uri = prompt("Redirect URI", Some("http://localhost:5173"))?;
    let client_secret = prompt_client_secret(profile_name)?;

    Ok(IdentitySection {
        domain,
        client_id,
        audience,
        redirect_uri,
        client_secret,
        client_secret_env: None,
        scope: None,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let path = config::config_path();
            eprintln!("netop configuration wizard");
            eprintln!("   Config path: {}\n", path.display());

            let mut cfg = config::load_config_or_default();
            let profile_name = prompt("Profile name", Some("default"))?;
            let api_url = prompt("API URL", Some(netop_api::client::DEFAULT_BASE_URL))?;
            url::Url::parse(&api_url)
                .map_err(|e| CliError::validation("api_url", format!("invalid URL: {e}")))?;

            let demo = Confirm::new()
                .with_prompt("Use the built-in demo dataset for this profile?")
                .default(false)
                .interact()
                .map_err(prompt_err)?;
            let identity = if demo {
                None
            } else {
                Some(prompt_identity(&profile_name)?)
            };

            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    api_url,
                    demo,
                    timeout: None,
                    identity,
                },
            );
            cfg.default_profile = Some(profile_name.clone());

            let written = save(&cfg)?;
            eprintln!("\nConfiguration written to {}", written.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Next: netop auth login");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config()?);
            let out = output::render_single(global.output, &cfg, format_config, |c| {
                c.default_profile_name().to_owned()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config()?;
            let active = config::active_profile_name(global, &cfg);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: netop config init");
            } else {
                let lines: Vec<String> = cfg
                    .profiles
                    .keys()
                    .map(|name| {
                        if *name == active {
                            format!("{name} *")
                        } else {
                            name.clone()
                        }
                    })
                    .collect();
                output::print_output(&lines.join("\n"), global.quiet);
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }
            cfg.default_profile = Some(name.clone());
            save(&cfg)?;
            eprintln!("Default profile set to '{name}'");
            Ok(())
        }

        // ── SetSecret ──────────────────────────────────────────────
        ConfigCommand::SetSecret { profile } => {
            let cfg = config::load_config()?;
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if config::find_profile(&cfg, &name)?.identity.is_none() {
                return Err(CliError::Config {
                    message: format!("profile '{name}' has no identity section"),
                });
            }
            let secret = Password::new()
                .with_prompt("Client secret")
                .interact()
                .map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::validation("client_secret", "secret cannot be empty"));
            }
            netop_config::store_client_secret(&name, &secret)?;
            eprintln!("Client secret for '{name}' stored in system keyring");
            Ok(())
        }
    }
}
