//! App settings handlers.

use netop_core::{AppSettings, AppSettingsPatch, Session};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand};
use crate::error::CliError;
use crate::output;

fn detail(s: &AppSettings) -> String {
    let flag = |on: bool| if on { "on" } else { "off" }.to_owned();
    output::detail_lines(&[
        ("Dark mode", flag(s.dark_mode)),
        ("Auto refresh", flag(s.auto_refresh)),
        ("Notifications", flag(s.notifications_enabled)),
        ("Sound", flag(s.sound_enabled)),
        ("Vibration", flag(s.vibration_enabled)),
    ])
}

fn print(settings: &AppSettings, global: &GlobalOpts) {
    let out = output::render_single(global.output, settings, detail, |s| {
        serde_json::to_string(s).unwrap_or_default()
    });
    output::print_output(&out, global.quiet);
}

pub async fn handle(
    session: &Session,
    args: SettingsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let data = session.data();

    match args.command {
        SettingsCommand::Show => {
            let settings = data.app_settings().await?;
            print(&settings, global);
            Ok(())
        }

        SettingsCommand::Set {
            dark_mode,
            auto_refresh,
            notifications,
            sound,
            vibration,
        } => {
            let patch = AppSettingsPatch {
                dark_mode,
                auto_refresh,
                notifications_enabled: notifications,
                sound_enabled: sound,
                vibration_enabled: vibration,
            };
            let settings = data.update_app_settings(&patch).await?;
            print(&settings, global);
            Ok(())
        }
    }
}
