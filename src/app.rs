/*
 * Application Module
 *
 * This module defines the viewer's model and its nannou lifecycle: window
 * creation, per-frame overlay updates and shutting the tick driver down when
 * the window closes.
 *
 * The simulation ticks on its own thread; the viewer only ever reads the
 * published state through the simulation's lock-guarded accessors.
 */

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use nannou::prelude::*;
use nannou_egui::Egui;
use tracing::{info, warn};

use crate::driver::TickDriver;
use crate::input;
use crate::renderer;
use crate::simulation::Simulation;
use crate::ui;

// nannou's model function can't capture, so the simulation is handed over here
static LAUNCH: OnceLock<Arc<Simulation>> = OnceLock::new();

// Frame timing shown in the overlay
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInfo {
    pub fps: f32,
    pub frame_time: Duration,
}

// Main model for the viewer
pub struct Model {
    pub simulation: Arc<Simulation>,
    pub driver: Option<TickDriver>,
    pub egui: Egui,
    pub frame_info: FrameInfo,
    // Cursor in window coordinates (origin at the center, y up)
    pub mouse_position: Vec2,
    pub show_view_radius: bool,
}

impl Model {
    // Cursor position on the simulation plane
    pub fn cursor_on_plane(&self) -> ::glam::Vec2 {
        let params = self.simulation.params();
        ::glam::Vec2::new(
            self.mouse_position.x + params.width / 2.0,
            self.mouse_position.y + params.height / 2.0,
        )
    }
}

/// Open the window and block until it closes. The tick driver is started
/// once the window exists and stopped on exit.
pub fn run(simulation: Arc<Simulation>) {
    if LAUNCH.set(simulation).is_err() {
        warn!("viewer already launched in this process");
        return;
    }
    nannou::app(model).update(update).exit(exit).run();
}

// Initialize the model
fn model(app: &App) -> Model {
    let simulation = match LAUNCH.get() {
        Some(simulation) => Arc::clone(simulation),
        None => panic!("viewer started without a simulation"),
    };
    let params = simulation.params();

    let window_id = app
        .new_window()
        .title("Boids")
        .size(params.width as u32, params.height as u32)
        .view(renderer::view)
        .mouse_moved(input::mouse_moved)
        .key_pressed(input::key_pressed)
        .raw_event(input::raw_window_event)
        .build()
        .expect("failed to build window");

    let window = app.window(window_id).expect("window vanished right after creation");
    let egui = Egui::from_window(&window);

    // Ticks only start once there is something to show them on
    let driver = match TickDriver::start(Arc::clone(&simulation)) {
        Ok(driver) => Some(driver),
        Err(err) => {
            warn!(%err, "could not start tick driver, showing a frozen flock");
            None
        }
    };

    Model {
        simulation,
        driver,
        egui,
        frame_info: FrameInfo::default(),
        mouse_position: Vec2::ZERO,
        show_view_radius: false,
    }
}

// Update the model
fn update(app: &App, model: &mut Model, update: Update) {
    model.frame_info.fps = app.fps();
    model.frame_info.frame_time = update.since_last;

    let cursor = model.cursor_on_plane();
    let view_radius = model.simulation.params().view_radius;
    let near_cursor = model.simulation.neighbors_of(cursor, view_radius).len();
    let stats = model.simulation.stats();

    ui::update_ui(
        &mut model.egui,
        &model.frame_info,
        &stats,
        model.simulation.len(),
        model.simulation.seed(),
        near_cursor,
        &mut model.show_view_radius,
    );
}

// Stop ticking before the process exits
fn exit(_app: &App, mut model: Model) {
    if let Some(driver) = model.driver.take() {
        driver.stop();
    }
    info!(ticks = model.simulation.stats().ticks, "viewer closed");
}
