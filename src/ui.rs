use egui::Context;

/// Menu overlay state. Visibility is driven by pointer-lock transitions; the
/// play button only *requests* the lock, the platform layer reports whether
/// it was granted.
pub struct MenuOverlay {
    pub visible: bool,
    start_requested: bool,
}

impl Default for MenuOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuOverlay {
    pub fn new() -> Self {
        Self { visible: true, start_requested: false }
    }

    /// True once per click on the play button.
    pub fn take_start_request(&mut self) -> bool {
        std::mem::take(&mut self.start_requested)
    }
}

/// Build the complete UI and return egui output
pub fn build_ui(
    egui_ctx: &Context,
    raw_input: egui::RawInput,
    menu: &mut MenuOverlay,
    pointer_locked: bool,
) -> egui::FullOutput {
    egui_ctx.run(raw_input, |ctx| {
        if menu.visible {
            draw_intro_card(ctx, menu);
        }
        if pointer_locked {
            draw_crosshair(ctx);
        }
    })
}

fn draw_intro_card(ctx: &Context, menu: &mut MenuOverlay) {
    egui::Window::new("Gallery")
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Virtual Exhibition");
                ui.add_space(8.0);
                ui.label("WASD or arrow keys to walk, mouse to look around.");
                ui.label("Esc brings this menu back.");
                ui.add_space(12.0);
                if ui.button("Enter the gallery").clicked() {
                    menu.start_requested = true;
                }
            });
        });
}

fn draw_crosshair(ctx: &Context) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::TOP, egui::Id::new("crosshair")));
    let center = ctx.available_rect().center();
    let size = 10.0;
    painter.line_segment(
        [
            egui::Pos2::new(center.x - size, center.y),
            egui::Pos2::new(center.x + size, center.y),
        ],
        egui::Stroke::new(1.0, egui::Color32::WHITE),
    );
    painter.line_segment(
        [
            egui::Pos2::new(center.x, center.y - size),
            egui::Pos2::new(center.x, center.y + size),
        ],
        egui::Stroke::new(1.0, egui::Color32::WHITE),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_request_is_consumed_once() {
        let mut menu = MenuOverlay::new();
        assert!(menu.visible, "menu starts visible");
        assert!(!menu.take_start_request());

        menu.start_requested = true;
        assert!(menu.take_start_request());
        assert!(!menu.take_start_request(), "request resets after being read");
    }
}
