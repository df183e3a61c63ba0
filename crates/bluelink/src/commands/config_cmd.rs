//! Config subcommand handlers.

use std::path::Path;

use dialoguer::{Input, Select};
use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, SecretString};

use bluelink_config::{Config, Profile, SecretKind};
use bluelink_core::Dialect;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::{CliError, prompt_err};
use crate::output;

const REDACTED: &str = "********";

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(global),
        ConfigCommand::Show => show(global),
        ConfigCommand::Path => {
            println!("{}", config::config_path(global).display());
            Ok(())
        }
        ConfigCommand::SetSecret { secret } => set_secret(secret.into(), global),
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_path(global);
    if is_json(&path) {
        return Err(CliError::Config {
            message: format!(
                "{} is a JSON file; the wizard only writes TOML (pass --config with a .toml path)",
                path.display()
            ),
        });
    }

    eprintln!("Blue Link configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    let mut cfg = if path.exists() {
        bluelink_config::load_config_from(&path)?
    } else {
        Config::default()
    };

    // 1. Profile name
    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default(config::active_profile_name(global, &cfg))
        .interact_text()
        .map_err(prompt_err)?;

    // 2. Dialect
    let dialect_choices = &[
        "Mobile API (client id and secret)",
        "Owners portal (web session)",
    ];
    let dialect = match Select::new()
        .with_prompt("Gateway dialect")
        .items(dialect_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?
    {
        0 => Dialect::Token,
        _ => Dialect::Session,
    };

    // 3. Gateway URL, blank keeps the dialect default
    let base_url: String = Input::new()
        .with_prompt("Gateway URL (blank for default)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let base_url = if base_url.trim().is_empty() {
        None
    } else {
        url::Url::parse(base_url.trim()).map_err(|e| CliError::Validation {
            field: "base_url".into(),
            reason: format!("invalid URL: {e}"),
        })?;
        Some(base_url.trim().to_owned())
    };

    // 4. Account identity
    let username = required_input("Username")?;
    let vin = required_input("VIN")?;
    let client_id = if dialect == Dialect::Token {
        Some(required_input("Client id")?)
    } else {
        None
    };

    // 5. Secrets
    let store_choices = &[
        "Store secrets in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let use_keyring = Select::new()
        .with_prompt("Where to store the password and PIN?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?
        == 0;

    let mut profile = Profile {
        dialect,
        base_url,
        username: Some(username),
        vin: Some(vin),
        client_id,
        ..Profile::default()
    };

    let mut kinds = vec![SecretKind::Password, SecretKind::Pin];
    if dialect == Dialect::Token {
        kinds.push(SecretKind::ClientSecret);
    }
    for kind in kinds {
        let value = prompt_secret(kind)?;
        if use_keyring {
            bluelink_config::store_secret(&profile_name, kind, value.expose_secret())?;
            eprintln!("   ✓ {kind} stored in system keyring");
        } else {
            let plain = Some(value.expose_secret().to_owned());
            match kind {
                SecretKind::Password => profile.password = plain,
                SecretKind::Pin => profile.pin = plain,
                SecretKind::ClientSecret => profile.client_secret = plain,
            }
        }
    }

    // 6. Merge and write
    cfg.profiles.insert(profile_name.clone(), profile);
    if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }
    bluelink_config::save_config_to(&cfg, &path)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Profile: {profile_name}");
    eprintln!("\n  Test it: bluelink login -p {profile_name}");
    Ok(())
}

fn required_input(prompt: &str) -> Result<String, CliError> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(prompt_err)?;
    let value = value.trim().to_owned();
    if value.is_empty() {
        return Err(CliError::Validation {
            field: prompt.to_lowercase(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(value)
}

fn prompt_secret(kind: SecretKind) -> Result<SecretString, CliError> {
    let value = rpassword::prompt_password(format!("{kind}: ")).map_err(prompt_err)?;
    if value.is_empty() {
        return Err(CliError::Validation {
            field: kind.to_string(),
            reason: "cannot be empty".into(),
        });
    }
    Ok(SecretString::from(value))
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

// ── Show ────────────────────────────────────────────────────────────

fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config(global)?;
    redact(&mut cfg);

    let out = match global.output {
        OutputFormat::Table | OutputFormat::Plain => {
            toml::to_string_pretty(&cfg).map_err(|e| CliError::Config {
                message: format!("failed to render config: {e}"),
            })?
        }
        OutputFormat::Json => output::render_json(&cfg),
        OutputFormat::Yaml => output::render_yaml(&cfg),
    };
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Mask every plaintext secret in place.
fn redact(cfg: &mut Config) {
    for profile in cfg.profiles.values_mut() {
        for secret in [
            &mut profile.password,
            &mut profile.pin,
            &mut profile.client_secret,
        ] {
            if let Some(value) = secret.as_mut() {
                value.zeroize();
                *secret = Some(REDACTED.into());
            }
        }
    }
}

// ── Set secret ──────────────────────────────────────────────────────

fn set_secret(kind: SecretKind, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config(global).unwrap_or_default();
    let profile_name = config::active_profile_name(global, &cfg);

    let value = prompt_secret(kind)?;
    bluelink_config::store_secret(&profile_name, kind, value.expose_secret())?;

    if !global.quiet {
        eprintln!("✓ {kind} stored in system keyring for profile '{profile_name}'");
    }
    Ok(())
}
