//! # Game Engine
//!
//! The per-frame loop of a running game scene:
//! input, dispatch, camera, world tick, render, pacing.

use crate::config::GameSettings;
use crate::constants::{DEAD_ZONE, TARGET_FPS};
use crate::game::actions::dispatch;
use crate::game::state::GameModel;
use crate::game::Position;
use crate::input::InputSource;
use crate::rendering::Renderer;
use crate::TerraResult;
use log::{debug, info};
use std::time::{Duration, Instant};

/// Sleeps away whatever is left of each frame's time slice.
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame_duration: Option<Duration>,
    frame_start: Instant,
}

impl FramePacer {
    /// Pacer for `fps` frames per second. Zero disables sleeping.
    pub fn new(fps: u32) -> Self {
        Self {
            frame_duration: (fps > 0).then(|| Duration::from_secs(1) / fps),
            frame_start: Instant::now(),
        }
    }

    pub fn frame_duration(&self) -> Option<Duration> {
        self.frame_duration
    }

    /// Waits until the current frame has used its slice, then starts the next.
    pub fn wait(&mut self) {
        if let Some(duration) = self.frame_duration {
            let elapsed = self.frame_start.elapsed();
            if elapsed < duration {
                std::thread::sleep(duration - elapsed);
            }
        }
        self.frame_start = Instant::now();
    }
}

/// Drives a [`GameModel`] frame by frame.
#[derive(Debug, Clone)]
pub struct GameEngine {
    dead_zone: i32,
    pacer: FramePacer,
    frames: u64,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(DEAD_ZONE, TARGET_FPS)
    }
}

impl GameEngine {
    pub fn new(dead_zone: i32, fps: u32) -> Self {
        Self {
            dead_zone,
            pacer: FramePacer::new(fps),
            frames: 0,
        }
    }

    pub fn from_settings(settings: &GameSettings) -> Self {
        Self::new(settings.dead_zone, settings.target_fps)
    }

    /// Frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one frame without pacing.
    ///
    /// Returns whether the model asked to quit.
    pub fn step<F>(&mut self, model: &mut GameModel, frontend: &mut F) -> TerraResult<bool>
    where
        F: Renderer + InputSource,
    {
        let actions = frontend.poll_actions()?;
        let had_actions = !actions.is_empty();
        for action in actions {
            let outcome = dispatch(action, model, frontend);
            if outcome.quit_requested {
                break;
            }
        }

        let delta = model.update_camera(frontend.visible_size(), self.dead_zone);
        if delta != Position::origin() {
            debug!("Camera scrolled by ({}, {})", delta.x, delta.y);
        }
        model.tick_world(had_actions);
        frontend.render_frame(model)?;

        self.frames += 1;
        Ok(model.should_quit)
    }

    /// Runs frames until the model asks to quit.
    pub fn run<F>(&mut self, model: &mut GameModel, frontend: &mut F) -> TerraResult<()>
    where
        F: Renderer + InputSource,
    {
        info!("Game scene started");
        model.center_camera(frontend.visible_size());
        model.request_full_redraw();
        while !self.step(model, frontend)? {
            self.pacer.wait();
        }
        info!("Game scene ended after {} frames", self.frames);
        Ok(())
    }
}
