//! # Tile Renderer
//!
//! Dirty-tile partial redraw of the game view, plus the HUD strip above it.
//!
//! Only cells in the model's dirty set are repainted. Floors are drawn with
//! their own colors; everything stacked on a floor keeps its foreground and
//! takes the floor's background. The player is drawn after the stack, and
//! trees on the player's cell are drawn over the player.

use crate::constants::{BORDER, TOP_OFFSET};
use crate::game::store::TileInstance;
use crate::game::tiles::{ids, LogicalLayer};
use crate::game::{GameModel, Position};
use crate::rendering::{map_view_size, ColorTable, Rgb, Style, Surface};

/// Paints one frame of the game view and returns how many cells were repainted.
pub fn paint_frame(surface: &mut dyn Surface, model: &mut GameModel, colors: &ColorTable) -> usize {
    let (width, height) = map_view_size(surface.size());

    if model.full_redraw || model.scroll_delta != Position::origin() {
        if model.full_redraw {
            surface.clear(colors.background("black"));
            surface.draw_border(colors.text("border"));
        }
        for y in model.camera.y..model.camera.y + height {
            for x in model.camera.x..model.camera.x + width {
                model.dirty.insert(Position::new(x, y));
            }
        }
        model.full_redraw = false;
    }
    model.scroll_delta = Position::origin();

    let mut painted = 0;
    for &world in &model.dirty {
        let local = world - model.camera;
        if local.x < 0 || local.y < 0 || local.x >= width || local.y >= height {
            continue;
        }
        paint_cell(surface, model, colors, world, local.x + BORDER, local.y + TOP_OFFSET);
        painted += 1;
    }
    model.dirty.clear();

    draw_hud(surface, model, colors);
    painted
}

/// Screen cell of a world position for the given camera.
pub fn world_to_screen(world: Position, camera: Position) -> (i32, i32) {
    (world.x - camera.x + BORDER, world.y - camera.y + TOP_OFFSET)
}

fn paint_cell(surface: &mut dyn Surface, model: &GameModel, colors: &ColorTable, world: Position, col: i32, row: i32) {
    let base = colors.background("black");
    surface.erase(col, row, base);

    let flashing = model
        .action_flash
        .is_some_and(|flash| flash.position == world);
    let player_here = model.player.position() == world;

    let mut floor_bg = if flashing { colors.background("flash") } else { base };
    if let Some(record) = model.store.record(world) {
        if let Some(floor) = record.floor() {
            let definition = floor.definition();
            if !flashing {
                floor_bg = colors.background(definition.background);
            }
            surface.put(col, row, definition.glyph, Style::new(colors.get(definition.foreground), floor_bg));
        }

        for layer in LogicalLayer::STACKED {
            for instance in record.layer(layer) {
                if player_here && instance.is(ids::TREE_TOP) {
                    continue;
                }
                draw_over(surface, colors, instance, floor_bg, col, row);
            }
        }
    } else if flashing {
        surface.erase(col, row, floor_bg);
    }

    if !player_here {
        return;
    }
    let player = &model.player;
    surface.put(col, row, player.glyph, Style::new(colors.get(&player.foreground), floor_bg).bold());

    if let Some(record) = model.store.record(world) {
        for layer in LogicalLayer::STACKED {
            for instance in record.layer(layer) {
                if instance.is(ids::TREE_TRUNK) || instance.is(ids::TREE_TOP) {
                    draw_over(surface, colors, instance, floor_bg, col, row);
                }
            }
        }
    }
}

fn draw_over(surface: &mut dyn Surface, colors: &ColorTable, instance: &TileInstance, floor_bg: Rgb, col: i32, row: i32) {
    let definition = instance.definition();
    surface.put(col, row, definition.glyph, Style::new(colors.get(definition.foreground), floor_bg));
}

fn draw_hud(surface: &mut dyn Surface, model: &GameModel, colors: &ColorTable) {
    let (cols, _) = surface.size();
    let base = colors.background("black");
    for row in BORDER..TOP_OFFSET {
        for col in BORDER..cols - BORDER {
            surface.erase(col, row, base);
        }
    }

    let player = &model.player;
    let text = colors.text("hud");
    let stats = format!(
        "{}  HP {}  Lv {}  Wood {}  Stone {}  Gold {}",
        player.name, player.hp, player.level, player.wood, player.stone, player.gold
    );
    surface.print(BORDER + 1, BORDER, &stats, text);

    let mode = if model.context.is_editor() { "EDITOR" } else { "PLAY" };
    let mode = if model.debug.ignore_collisions {
        format!("{} [debug]", mode)
    } else {
        mode.to_string()
    };
    let mode_col = cols - BORDER - 1 - mode.chars().count() as i32;
    surface.print(mode_col, BORDER, &mode, colors.text("highlight").bold());

    let detail = match model.palette_selection() {
        Some(selection) if model.context.is_editor() => format!(
            "Item: {} ({}/{})",
            selection,
            model.editor_index + 1,
            model.editor_palette.len()
        ),
        _ => format!("Pos ({}, {})  Facing {:?}", player.x, player.y, player.facing),
    };
    surface.print(BORDER + 1, BORDER + 1, &detail, text);
}
