//! Vehicle command handlers.

use bluelink_core::{BlueLink, BlueLinkConfig, CommandReply, Identity, StartMode};
use serde::Serialize;

use crate::cli::{GlobalOpts, StartArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Views ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct LoginView {
    vin: String,
    registration_id: String,
    generation: String,
    brand: String,
    dialect: String,
    gateway: String,
    #[serde(skip)]
    connection: Vec<(&'static str, String)>,
}

#[derive(Serialize)]
struct CommandView {
    command: &'static str,
    service: String,
    result: &'static str,
}

#[derive(Serialize)]
struct LocationView {
    latitude: f64,
    longitude: f64,
    known: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────

pub fn show_login(
    identity: &Identity,
    conn: &BlueLinkConfig,
    global: &GlobalOpts,
) {
    let view = LoginView {
        vin: identity.vin.clone(),
        registration_id: identity.registration_id.clone(),
        generation: identity.vehicle_generation.clone(),
        brand: identity.brand_indicator.clone(),
        dialect: conn.dialect.to_string(),
        gateway: conn.base_url.to_string(),
        connection: config::describe(conn),
    };
    let out = output::render_single(
        global.output,
        &view,
        |v| {
            let mut fields = vec![
                ("VIN", v.vin.clone()),
                ("Registration", v.registration_id.clone()),
                ("Generation", v.generation.clone()),
                ("Brand", v.brand.clone()),
            ];
            fields.extend(v.connection.iter().cloned());
            output::render_fields(&fields)
        },
        |v| v.vin.clone(),
    );
    output::print_output(&out, global.quiet);
}

pub async fn lock(bluelink: &mut BlueLink, global: &GlobalOpts) -> Result<(), CliError> {
    let reply = bluelink.lock().await?;
    report("lock", &reply, global);
    Ok(())
}

pub async fn unlock(bluelink: &mut BlueLink, global: &GlobalOpts) -> Result<(), CliError> {
    let reply = bluelink.unlock().await?;
    report("unlock", &reply, global);
    Ok(())
}

pub async fn start(
    bluelink: &mut BlueLink,
    args: &StartArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mode = match args.preset {
        Some(preset) => StartMode::Preset(preset.into()),
        None => StartMode::Climate {
            outdoor_temp: args.temp,
            defrost: args.defrost,
        },
    };
    let reply = bluelink.start(mode).await?;
    report("start", &reply, global);
    Ok(())
}

pub async fn stop(bluelink: &mut BlueLink, global: &GlobalOpts) -> Result<(), CliError> {
    let reply = bluelink.stop().await?;
    report("stop", &reply, global);
    Ok(())
}

pub async fn find(bluelink: &mut BlueLink, global: &GlobalOpts) -> Result<(), CliError> {
    let coords = bluelink.find().await?;
    if !coords.is_known() && !global.quiet {
        eprintln!("vehicle location unavailable");
    }

    let view = LocationView {
        latitude: coords.latitude,
        longitude: coords.longitude,
        known: coords.is_known(),
    };
    let out = output::render_single(
        global.output,
        &view,
        |v| {
            output::render_fields(&[
                ("Latitude", v.latitude.to_string()),
                ("Longitude", v.longitude.to_string()),
            ])
        },
        |v| format!("{},{}", v.latitude, v.longitude),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Print an accepted command.
fn report(
    command: &'static str,
    reply: &CommandReply,
    global: &GlobalOpts,
) {
    let view = CommandView {
        command,
        service: reply.service.to_string(),
        result: "success",
    };
    let color = output::should_color();
    let out = output::render_single(
        global.output,
        &view,
        |v| {
            output::render_fields(&[
                ("Command", v.command.to_owned()),
                ("Result", output::status_label(true, color)),
            ])
        },
        |v| v.result.to_owned(),
    );
    output::print_output(&out, global.quiet);
}
