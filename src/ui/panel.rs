//! The viewer settings panel.

use std::path::{Path, PathBuf};

use crate::gfx::scene::{DrawMode, ShadingSettings};

/// A scene change requested from the panel, applied by the app at a
/// safe point in the frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    /// Load the given OBJ file, replacing the scene.
    Open(PathBuf),
    /// Reload the currently loaded file.
    Reload,
}

/// Builds the settings window and returns any requested action.
pub fn settings_panel(
    ui: &imgui::Ui,
    shading: &mut ShadingSettings,
    loaded: Option<&Path>,
    stats: (usize, u32),
) -> Option<PanelAction> {
    let mut action = None;

    ui.window("Viewer Settings")
        .size([320.0, 420.0], imgui::Condition::FirstUseEver)
        .position([10.0, 10.0], imgui::Condition::FirstUseEver)
        .build(|| {
            match loaded {
                Some(path) => ui.text_wrapped(format!("File: {}", path.display())),
                None => ui.text_disabled("No file loaded"),
            }
            let (shapes, vertices) = stats;
            ui.text(format!("{} shape(s), {} vertices", shapes, vertices));

            if ui.button("Open OBJ...") {
                let picked = rfd::FileDialog::new()
                    .add_filter("Wavefront OBJ", &["obj"])
                    .pick_file();
                if let Some(path) = picked {
                    action = Some(PanelAction::Open(path));
                }
            }
            if loaded.is_some() {
                ui.same_line();
                if ui.button("Reload") {
                    action = Some(PanelAction::Reload);
                }
            }

            ui.separator();

            let labels: Vec<&str> = DrawMode::ALL.iter().map(DrawMode::label).collect();
            let mut mode_index = DrawMode::ALL
                .iter()
                .position(|mode| *mode == shading.draw_mode)
                .unwrap_or(0);
            if ui.combo_simple_string("Draw mode", &mut mode_index, &labels) {
                shading.draw_mode = DrawMode::ALL[mode_index];
            }

            ui.input_float3("Light direction", &mut shading.light_dir)
                .build();
            ui.slider("Light intensity", 0.0, 5.0, &mut shading.light_intensity);
            ui.color_edit4("Light color", &mut shading.light_color);
            ui.color_edit4("Ambient color", &mut shading.ambient_color);
            ui.color_edit4("Point color", &mut shading.diffuse_color);

            ui.separator();

            ui.slider("Point scale", 1.0, 100.0, &mut shading.point_scale);
            ui.slider("Size falloff", 0.0, 2.0, &mut shading.point_exponent);

            ui.separator();

            ui.checkbox("Show bounding box", &mut shading.show_bounds);
            if shading.show_bounds {
                ui.color_edit4("Box color", &mut shading.wire_color);
            }
        });

    action
}
