/*
 * Input Module
 *
 * This module handles user input events for the viewer: cursor tracking for
 * the neighbor probe, a key toggle for the view radius ring, and forwarding
 * raw events to egui.
 */

use nannou::prelude::*;

use crate::app::Model;

// Mouse moved event handler
pub fn mouse_moved(_app: &App, model: &mut Model, pos: Point2) {
    model.mouse_position = Vec2::new(pos.x, pos.y);
}

// R toggles the view radius ring around the cursor
pub fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    if key == Key::R {
        model.show_view_radius = !model.show_view_radius;
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
