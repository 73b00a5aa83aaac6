//! Top toolbar panel with entity commands and a frame-rate readout.

use crate::ecs::{Entity, Name, Transform, World, set_parent};
use crate::time::Time;

pub(crate) fn toolbar_panel(
    ctx: &egui::Context,
    world: &mut World,
    selected: &mut Option<Entity>,
) {
    egui::TopBottomPanel::top("editor_toolbar").show(ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.label("fafnir editor");
            ui.separator();

            if ui.button("New Entity").clicked() {
                let entity = world.spawn((Transform::default(), Name::new("New Entity")));
                *selected = Some(entity);
            }

            let parent = *selected;
            if ui
                .add_enabled(parent.is_some(), egui::Button::new("New Child"))
                .clicked()
            {
                if let Some(parent) = parent {
                    let child = world.spawn((Transform::default(), Name::new("New Child")));
                    if set_parent(world, child, parent).is_ok() {
                        *selected = Some(child);
                    }
                }
            }

            ui.separator();

            if ui
                .add_enabled(selected.is_some(), egui::Button::new("Delete"))
                .clicked()
            {
                if let Some(entity) = selected.take() {
                    world.despawn_recursive(entity);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label("F12 to toggle");
                ui.separator();
                if let Some(time) = world.get_resource::<Time>() {
                    ui.label(format!("{:.0} fps", time.fps()));
                }
            });
        });
    });
}
