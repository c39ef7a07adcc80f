//! Camera command handlers.

use tabled::Tabled;
use wadas_core::{Camera, Console};

use crate::cli::{CamerasArgs, CamerasCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct CameraRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    camera_type: String,
    #[tabled(rename = "Enabled")]
    enabled: bool,
    #[tabled(rename = "Actuators")]
    actuators: String,
}

impl From<&Camera> for CameraRow {
    fn from(c: &Camera) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            camera_type: c.camera_type.clone(),
            enabled: c.enabled,
            actuators: c
                .actuators
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

pub async fn handle(
    console: &Console,
    args: CamerasArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CamerasCommand::List => {
            let view = console.cameras();
            view.load().await;
            let state = view.state();
            util::settle(console, state.error)?;

            let cameras = state.value.unwrap_or_default();
            let out = output::render_list(
                global.output,
                &cameras,
                |c| CameraRow::from(c),
                |c| c.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
