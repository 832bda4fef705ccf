/*
 * UI Module
 *
 * This module builds the egui overlay for the viewer. It is read-only with
 * respect to the simulation: it shows frame timing, the latest tick
 * statistics and how many boids the published index finds near the cursor.
 */

use nannou_egui::{egui, Egui};

use crate::app::FrameInfo;
use crate::debug::TickStats;

// Update the overlay for this frame
pub fn update_ui(
    egui: &mut Egui,
    frame_info: &FrameInfo,
    stats: &TickStats,
    boids_len: usize,
    seed: u64,
    near_cursor: usize,
    show_view_radius: &mut bool,
) {
    let ctx = egui.begin_frame();

    egui::Window::new("Simulation")
        .default_pos([10.0, 10.0])
        .show(&ctx, |ui| {
            ui.label(format!("FPS: {:.1}", frame_info.fps));
            ui.label(format!(
                "Frame time: {:.2} ms",
                frame_info.frame_time.as_secs_f64() * 1000.0
            ));

            ui.separator();

            ui.label(format!("Boids: {}", boids_len));
            ui.label(format!("Seed: {}", seed));
            ui.label(format!("Ticks: {}", stats.ticks));
            ui.label(format!("Last tick: {:.2} ms", stats.last_tick_ms()));
            ui.label(format!(
                "Index entries: {} ({} ghosts)",
                stats.index_entries, stats.ghost_entries
            ));

            ui.separator();

            ui.label(format!("Boids near cursor: {}", near_cursor));
            ui.checkbox(show_view_radius, "Show view radius (R)");
        });
}
