//! Detection and actuation event handlers: paged listing, CSV export and
//! filter options.

use tabled::Tabled;
use wadas_core::{
    ActuationEvent, ActuationFilters, Console, DetectionEvent, DetectionFilters, ListController,
    ListSource, LoadOutcome, ViewState,
};

use crate::cli::{
    ActuationFilterArgs, ActuationsArgs, ActuationsCommand, DetectionFilterArgs, DetectionsArgs,
    DetectionsCommand, ExportArgs, GlobalOpts, OutputFormat,
};
use crate::error::CliError;
use crate::output;

use super::util;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct DetectionRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Camera")]
    camera_id: u64,
    #[tabled(rename = "Detected")]
    detected: u32,
    #[tabled(rename = "Classified")]
    classified: String,
    #[tabled(rename = "Time")]
    timestamp: String,
}

impl From<&DetectionEvent> for DetectionRow {
    fn from(e: &DetectionEvent) -> Self {
        Self {
            id: e.id,
            camera_id: e.camera_id,
            detected: e.detected_animals,
            classified: e
                .classified_animals
                .iter()
                .map(|c| format!("{} ({:.0}%)", c.animal, c.probability * 100.0))
                .collect::<Vec<_>>()
                .join(", "),
            timestamp: e.timestamp.format(TIME_FORMAT).to_string(),
        }
    }
}

#[derive(Tabled)]
struct ActuationRow {
    #[tabled(rename = "Actuator")]
    actuator: String,
    #[tabled(rename = "Type")]
    actuator_type: String,
    #[tabled(rename = "Command")]
    command: String,
    #[tabled(rename = "Detection")]
    detection_event_id: u64,
    #[tabled(rename = "Time")]
    timestamp: String,
}

impl From<&ActuationEvent> for ActuationRow {
    fn from(e: &ActuationEvent) -> Self {
        Self {
            actuator: e.actuator.name.clone(),
            actuator_type: e.actuator.actuator_type.clone(),
            command: e.command.clone(),
            detection_event_id: e.detection_event_id,
            timestamp: e.timestamp.format(TIME_FORMAT).to_string(),
        }
    }
}

// ── Filter translation ──────────────────────────────────────────────

fn detection_filters(args: DetectionFilterArgs) -> Result<DetectionFilters, CliError> {
    Ok(DetectionFilters {
        camera_ids: args.cameras.into_iter().collect(),
        classified_animals: args.animals.into_iter().collect(),
        start: util::parse_instant("since", args.range.since.as_deref())?,
        end: util::parse_instant("until", args.range.until.as_deref())?,
    })
}

fn actuation_filters(args: ActuationFilterArgs) -> Result<ActuationFilters, CliError> {
    Ok(ActuationFilters {
        actuator_types: args.actuator_types.into_iter().collect(),
        commands: args.commands.into_iter().collect(),
        start: util::parse_instant("since", args.range.since.as_deref())?,
        end: util::parse_instant("until", args.range.until.as_deref())?,
    })
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle_detections(
    console: &Console,
    args: DetectionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let list = console.detection_events();
    match args.command {
        DetectionsCommand::List { filter, page } => {
            let state = load_page(console, &list, detection_filters(filter)?, page.page).await?;
            let out = output::render_list(
                global.output,
                &state.items,
                |e| DetectionRow::from(e),
                |e| e.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            print_footer(&state, global);
            Ok(())
        }
        DetectionsCommand::Export { filter, export } => {
            export_events(console, &list, detection_filters(filter)?, &export, global).await
        }
        DetectionsCommand::Options => {
            list.initialize().await;
            util::settle(console, list.state().error)?;
            let out = output::render_single(
                global.output,
                &list.options(),
                |o| {
                    let cameras = o
                        .cameras
                        .iter()
                        .map(|c| format!("{} ({})", c.name, c.id))
                        .collect::<Vec<_>>();
                    format!(
                        "Cameras: {}\nAnimals: {}",
                        cameras.join(", "),
                        o.animals.join(", ")
                    )
                },
                |o| o.animals.join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

pub async fn handle_actuations(
    console: &Console,
    args: ActuationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let list = console.actuation_events();
    match args.command {
        ActuationsCommand::List { filter, page } => {
            let state = load_page(console, &list, actuation_filters(filter)?, page.page).await?;
            let out = output::render_list(
                global.output,
                &state.items,
                |e| ActuationRow::from(e),
                |e| format!("{}\t{}", e.actuator.id, e.detection_event_id),
            )?;
            output::print_output(&out, global.quiet);
            print_footer(&state, global);
            Ok(())
        }
        ActuationsCommand::Export { filter, export } => {
            export_events(console, &list, actuation_filters(filter)?, &export, global).await
        }
        ActuationsCommand::Options => {
            list.initialize().await;
            util::settle(console, list.state().error)?;
            let out = output::render_single(
                global.output,
                &list.options(),
                |o| {
                    format!(
                        "Actuator types: {}\nCommands:       {}",
                        o.actuator_types.join(", "),
                        o.commands.join(", ")
                    )
                },
                |o| o.commands.join("\n"),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

// ── Shared flow ─────────────────────────────────────────────────────

/// Apply `filters` (landing on page 1), then move to `page`.
async fn load_page<S: ListSource>(
    console: &Console,
    list: &ListController<S>,
    filters: S::Filters,
    page: u32,
) -> Result<ViewState<S::Item>, CliError> {
    list.apply_filters(filters).await;
    util::settle(console, list.state().error)?;

    if page != 1 && list.go_to_page(page).await == LoadOutcome::Rejected {
        return Err(CliError::Validation {
            field: "page".into(),
            reason: format!("must be between 1 and {}", list.state().total_pages.max(1)),
        });
    }
    let state = list.state();
    util::settle(console, state.error.clone())?;
    Ok(state)
}

async fn export_events<S: ListSource>(
    console: &Console,
    list: &ListController<S>,
    filters: S::Filters,
    export: &ExportArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    list.apply_filters(filters).await;
    util::settle(console, list.state().error)?;

    let sink = util::export_sink(export.dest.as_deref());
    let spinner = util::spinner("Exporting events...", global.quiet);
    let result = list.export_current(&sink).await;
    spinner.finish_and_clear();

    let path = result?;
    output::print_success(
        &format!("Exported to {}", path.display()),
        global.color,
        global.quiet,
    );
    Ok(())
}

fn print_footer<T>(state: &ViewState<T>, global: &GlobalOpts) {
    if !matches!(global.output, OutputFormat::Table) {
        return;
    }
    output::print_hint(
        &format!(
            "Page {} of {} ({} events)",
            state.current_page,
            state.total_pages.max(1),
            state.total_count
        ),
        global.color,
        global.quiet,
    );
}
