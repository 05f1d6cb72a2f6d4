use std::path::PathBuf;
use std::process::exit;

use clap::{CommandFactory, Parser};

use pclview::{ViewerApp, ViewerConfig};

/// OBJ point cloud viewer.
#[derive(Parser)]
#[command(name = "pclview", version, about)]
struct Cli {
    /// OBJ file to open at startup. Without it the viewer starts with
    /// an empty scene and files are opened from the UI.
    obj: Option<PathBuf>,

    /// Disable the settings overlay.
    #[arg(long)]
    no_ui: bool,

    /// Frame rate target.
    #[arg(long, default_value_t = 60)]
    fps: u32,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.no_ui && cli.obj.is_none() {
        eprintln!("error: --no-ui requires an OBJ file argument");
        eprintln!();
        eprintln!("{}", Cli::command().render_usage());
        exit(2);
    }

    let config = ViewerConfig {
        ui_enabled: !cli.no_ui,
        target_fps: cli.fps.max(1),
        ..Default::default()
    };

    let mut app = ViewerApp::new(config);

    if let Some(path) = &cli.obj {
        if let Err(err) = app.load_obj(path) {
            eprintln!("error: {}", err);
            exit(1);
        }
    }

    app.run();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn usage_names_the_binary() {
        let usage = Cli::command().render_usage().to_string();
        assert!(usage.contains("pclview"));
    }
}
