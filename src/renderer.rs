/*
 * Renderer Module
 *
 * This module draws the flock. Each boid is a small triangle pointing along
 * its velocity, colored by its flocking group. Positions live on the plane
 * [0, width) x [0, height); the window is centered on the plane.
 *
 * Boids are read under the simulation's read lock for the time it takes to
 * queue the draw commands, so every frame shows a single published tick.
 */

use nannou::prelude::*;

use crate::app::Model;
use crate::boid::{Boid, BoidColor};
use crate::BOID_SIZE;

// Angle between the heading and each rear vertex
const REAR_ANGLE: f32 = 2.3;

pub fn color_of(color: BoidColor) -> Srgb<u8> {
    match color {
        BoidColor::Gray => GRAY,
        BoidColor::DarkOrange => DARKORANGE,
        BoidColor::CornflowerBlue => CORNFLOWERBLUE,
        BoidColor::YellowGreen => YELLOWGREEN,
    }
}

// Render the model
pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    draw.background().color(BLACK);

    let params = model.simulation.params();
    let offset = vec2(params.width / 2.0, params.height / 2.0);
    let thickness = params.poly_thickness;

    model.simulation.read_boids(|boids| {
        for boid in boids {
            draw_boid(&draw, boid, offset, thickness);
        }
    });

    if model.show_view_radius {
        draw.ellipse()
            .xy(model.mouse_position)
            .radius(params.view_radius)
            .no_fill()
            .stroke(rgba(1.0, 1.0, 1.0, 0.4))
            .stroke_weight(1.0);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        tracing::warn!(?err, "failed to draw frame");
    }
    if let Err(err) = model.egui.draw_to_frame(&frame) {
        tracing::warn!(?err, "failed to draw overlay");
    }
}

fn draw_boid(draw: &Draw, boid: &Boid, offset: Vec2, thickness: f32) {
    let center = vec2(boid.position.x, boid.position.y) - offset;
    let angle = boid.velocity.y.atan2(boid.velocity.x);
    let vertex = |a: f32| center + vec2(a.cos(), a.sin()) * BOID_SIZE;
    let points = [vertex(angle), vertex(angle - REAR_ANGLE), vertex(angle + REAR_ANGLE)];
    let color = color_of(boid.color);

    if thickness > 0.0 {
        draw.polygon()
            .no_fill()
            .stroke(color)
            .stroke_weight(thickness)
            .points(points);
    } else {
        draw.polygon().color(color).points(points);
    }
}
