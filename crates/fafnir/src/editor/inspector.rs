//! Component inspector panel on the right side of the editor.
//!
//! Transform edits go through the local fields, so a parented entity moves
//! in its parent's space and the next transform pass propagates the change.

use crate::camera::Camera;
use crate::ecs::{Entity, Name, Parent, Transform, World, remove_parent};
use crate::math::{EulerRot, Quat};
use crate::render::MeshRenderer;

/// Draws editable fields for the selected entity's components.
pub(crate) fn inspector_panel(ctx: &egui::Context, world: &mut World, selected: Option<Entity>) {
    egui::SidePanel::right("inspector_panel")
        .default_width(280.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Inspector");
            ui.separator();

            let Some(entity) = selected else {
                ui.label("No entity selected");
                return;
            };

            ui.label(format!("Entity {entity}"));
            if let Some(name) = world.get_mut::<Name>(entity) {
                ui.horizontal(|ui| {
                    ui.label("Name:");
                    ui.text_edit_singleline(&mut name.0);
                });
            }
            if let Some(parent) = world.get::<Parent>(entity).copied() {
                ui.horizontal(|ui| {
                    ui.label(format!("Parent: {}", parent.0));
                    if ui.button("Detach").clicked() {
                        remove_parent(world, entity);
                    }
                });
            }
            ui.separator();

            transform_section(ui, world, entity);
            camera_section(ui, world, entity);
            mesh_section(ui, world, entity);

            // Everything else gets a read-only header.
            for type_name in world.component_names(entity) {
                let short = short_type_name(type_name);
                if matches!(
                    short,
                    "Name" | "Parent" | "Transform" | "Camera" | "MeshRenderer"
                ) {
                    continue;
                }
                egui::CollapsingHeader::new(short)
                    .default_open(false)
                    .show(ui, |ui| {
                        ui.label("(read-only view)");
                    });
            }
        });
}

fn transform_section(ui: &mut egui::Ui, world: &mut World, entity: Entity) {
    let Some(transform) = world.get_mut::<Transform>(entity) else {
        return;
    };
    egui::CollapsingHeader::new("Transform")
        .default_open(true)
        .show(ui, |ui| {
            let mut changed = false;

            ui.label("Position");
            ui.horizontal(|ui| {
                changed |= drag(ui, &mut transform.local_position.x, 0.1, "X: ");
                changed |= drag(ui, &mut transform.local_position.y, 0.1, "Y: ");
                changed |= drag(ui, &mut transform.local_position.z, 0.1, "Z: ");
            });

            let (mut yaw, mut pitch, mut roll) = transform.local_rotation.to_euler(EulerRot::YXZ);
            yaw = yaw.to_degrees();
            pitch = pitch.to_degrees();
            roll = roll.to_degrees();
            ui.label("Rotation (deg)");
            let mut rotated = false;
            ui.horizontal(|ui| {
                rotated |= drag(ui, &mut yaw, 0.5, "Y: ");
                rotated |= drag(ui, &mut pitch, 0.5, "X: ");
                rotated |= drag(ui, &mut roll, 0.5, "Z: ");
            });
            if rotated {
                transform.local_rotation = Quat::from_euler(
                    EulerRot::YXZ,
                    yaw.to_radians(),
                    pitch.to_radians(),
                    roll.to_radians(),
                );
                changed = true;
            }

            ui.label("Scale");
            ui.horizontal(|ui| {
                changed |= drag(ui, &mut transform.local_scale.x, 0.01, "X: ");
                changed |= drag(ui, &mut transform.local_scale.y, 0.01, "Y: ");
                changed |= drag(ui, &mut transform.local_scale.z, 0.01, "Z: ");
            });

            if changed {
                transform.matrix_dirty = true;
            }

            // Resolved pose from the last transform pass.
            ui.label(format!(
                "World: ({:.2}, {:.2}, {:.2})",
                transform.position.x, transform.position.y, transform.position.z
            ));
        });
}

fn camera_section(ui: &mut egui::Ui, world: &mut World, entity: Entity) {
    let Some(camera) = world.get_mut::<Camera>(entity) else {
        return;
    };
    egui::CollapsingHeader::new("Camera")
        .default_open(true)
        .show(ui, |ui| {
            ui.add(
                egui::DragValue::new(&mut camera.fov)
                    .speed(0.5)
                    .range(10.0..=170.0)
                    .prefix("FOV: "),
            );
            ui.horizontal(|ui| {
                ui.add(egui::DragValue::new(&mut camera.near).speed(0.01).prefix("Near: "));
                ui.add(egui::DragValue::new(&mut camera.far).speed(1.0).prefix("Far: "));
            });
            ui.checkbox(&mut camera.orthographic, "Orthographic");
            if camera.orthographic {
                ui.add(egui::DragValue::new(&mut camera.ortho_size).speed(0.1).prefix("Size: "));
            }
            ui.checkbox(&mut camera.is_main, "Main camera");
        });
}

fn mesh_section(ui: &mut egui::Ui, world: &mut World, entity: Entity) {
    let Some(renderer) = world.get_mut::<MeshRenderer>(entity) else {
        return;
    };
    egui::CollapsingHeader::new("MeshRenderer")
        .default_open(true)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label("Color:");
                ui.color_edit_button_rgba_unmultiplied(&mut renderer.color);
            });
            ui.checkbox(&mut renderer.visible, "Visible");
        });
}

fn drag(ui: &mut egui::Ui, value: &mut f32, speed: f64, prefix: &str) -> bool {
    ui.add(egui::DragValue::new(value).speed(speed).prefix(prefix))
        .changed()
}

fn short_type_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}
