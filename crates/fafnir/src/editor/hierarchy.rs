//! Scene tree panel on the left side of the editor.

use crate::ecs::{Children, Entity, Name, Parent, Tag, World};

/// Draws the tree of live entities. Returns the selection after clicks.
pub(crate) fn hierarchy_panel(
    ctx: &egui::Context,
    world: &World,
    selected: Option<Entity>,
) -> Option<Entity> {
    let mut new_selected = selected;

    egui::SidePanel::left("hierarchy_panel")
        .default_width(200.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Hierarchy");
            ui.separator();

            // Roots are entities without a parent. A dangling parent link
            // counts as a root so the entity stays reachable in the tree.
            let mut roots: Vec<Entity> = world
                .entities()
                .into_iter()
                .filter(|&entity| match world.get::<Parent>(entity) {
                    Some(parent) => !world.is_alive(parent.0),
                    None => true,
                })
                .collect();
            roots.sort_by_key(|entity| entity.index());

            egui::ScrollArea::vertical().show(ui, |ui| {
                for &root in &roots {
                    draw_entity_row(ui, world, root, &mut new_selected, 0);
                }
            });
        });

    new_selected
}

fn draw_entity_row(
    ui: &mut egui::Ui,
    world: &World,
    entity: Entity,
    selected: &mut Option<Entity>,
    depth: usize,
) {
    let label = display_name(world, entity);
    let children: &[Entity] = world
        .get::<Children>(entity)
        .map(|c| c.0.as_slice())
        .unwrap_or(&[]);

    if children.is_empty() {
        ui.horizontal(|ui| {
            ui.add_space(18.0);
            select_label(ui, selected, entity, &label);
        });
        return;
    }

    let id = ui.make_persistent_id(entity.index());
    egui::collapsing_header::CollapsingState::load_with_default_open(ui.ctx(), id, depth < 2)
        .show_header(ui, |ui| {
            select_label(ui, selected, entity, &label);
        })
        .body(|ui| {
            for &child in children {
                if world.is_alive(child) {
                    draw_entity_row(ui, world, child, selected, depth + 1);
                }
            }
        });
}

fn select_label(ui: &mut egui::Ui, selected: &mut Option<Entity>, entity: Entity, label: &str) {
    if ui.selectable_label(*selected == Some(entity), label).clicked() {
        *selected = Some(entity);
    }
}

fn display_name(world: &World, entity: Entity) -> String {
    if let Some(name) = world.get::<Name>(entity) {
        format!("{} ({})", name.0, entity.index())
    } else if let Some(tag) = world.get::<Tag>(entity) {
        format!("[{}] ({})", tag.0, entity.index())
    } else {
        format!("Entity {}", entity.index())
    }
}
