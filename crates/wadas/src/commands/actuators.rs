//! Actuator command handlers.

use tabled::Tabled;
use wadas_core::{Actuator, ActuatorCommand, ActuatorDetail, Console, LoadOutcome};

use crate::cli::{ActuatorsArgs, ActuatorsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ActuatorRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    actuator_type: String,
    #[tabled(rename = "Last Seen")]
    last_update: String,
}

impl From<&Actuator> for ActuatorRow {
    fn from(a: &Actuator) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            actuator_type: a.actuator_type.clone(),
            last_update: a
                .last_update
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
        }
    }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

fn detail(d: &ActuatorDetail) -> String {
    let mut lines = vec![
        format!("ID:          {}", d.id),
        format!("Name:        {}", d.name),
        format!("Type:        {}", d.actuator_type),
        format!("Enabled:     {}", d.enabled),
        format!("Created:     {}", or_dash(d.creation_date)),
        format!("Last Update: {}", or_dash(d.last_update)),
        format!("Temperature: {}", or_dash(d.temperature.map(|t| format!("{t:.1} °C")))),
        format!("Humidity:    {}", or_dash(d.humidity.map(|h| format!("{h:.0}%")))),
        format!("Battery:     {}", or_dash(d.battery_status.map(|b| format!("{b:.0}%")))),
    ];
    if let Some(deleted) = d.deletion_date {
        lines.push(format!("Deleted:     {deleted}"));
    }
    if let Some(ref log) = d.log {
        lines.push(String::new());
        lines.push("Log:".into());
        lines.push(log.clone());
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: ActuatorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (id, command) = match args.command {
        ActuatorsCommand::List => return list(console, global).await,
        ActuatorsCommand::Show { id } => return show(console, &id, global).await,
        ActuatorsCommand::Test { id } => (id, ActuatorCommand::Test),
        ActuatorsCommand::Reboot { id } => (id, ActuatorCommand::Reboot),
        ActuatorsCommand::RefreshLog { id } => (id, ActuatorCommand::RefreshLog),
    };

    let view = console.actuator(id);
    view.send_command(command).await?;
    util::settle(console, view.state().error)?;
    output::print_success(
        &format!("Sent '{command}' to actuator {}", view.id()),
        global.color,
        global.quiet,
    );

    // refresh_log reloads the record; show what came back
    if command == ActuatorCommand::RefreshLog {
        if let Some(detail) = view.state().value {
            print_detail(&detail, global)?;
        }
    }
    Ok(())
}

async fn list(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    let view = console.actuators();
    view.load().await;
    let state = view.state();
    util::settle(console, state.error)?;

    let actuators = state.value.unwrap_or_default();
    let out = output::render_list(
        global.output,
        &actuators,
        |a| ActuatorRow::from(a),
        |a| a.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn show(console: &Console, id: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let view = console.actuator(id);
    if view.load().await == LoadOutcome::Rejected {
        return Err(CliError::Validation {
            field: "id".into(),
            reason: "actuator id must not be blank".into(),
        });
    }
    let state = view.state();
    util::settle(console, state.error)?;

    match state.value {
        Some(detail) => print_detail(&detail, global),
        None => Err(CliError::NotFound {
            message: format!("Actuator '{id}' not found"),
            list_command: "actuators list".into(),
        }),
    }
}

fn print_detail(detail: &ActuatorDetail, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(global.output, detail, self::detail, |d| d.id.to_string())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
