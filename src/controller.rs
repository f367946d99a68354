//! Session lifecycle: `Idle -> Running -> Idle`.
//!
//! The controller is a single-owner state machine. Remote calls are the only
//! suspension points, and the poll timer is awaited by the same loop that
//! runs the poll, so two polls never overlap.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::clock::{has_ended, remaining_time};
use crate::error::WorkoutError;
use crate::hits::HitSummary;
use crate::remote::WorkoutRemote;
use crate::runtime::PollTimer;
use crate::session::{Phase, SessionState};
use crate::surface::{ButtonLabel, Notice, WorkoutSurface};
use crate::validation::FieldValidity;
use crate::workout::{SessionSnapshot, WorkoutForm};

/// What a single poll did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Snapshot applied, the workout continues.
    Updated,
    /// The deadline passed; polling stopped and the controller is idle again.
    Ended,
    /// Nothing to poll for.
    Skipped,
}

pub struct SessionController<R, S> {
    remote: R,
    surface: S,
    state: SessionState,
}

impl<R: WorkoutRemote, S: WorkoutSurface> SessionController<R, S> {
    pub fn new(remote: R, mut surface: S, poll_interval: Duration) -> Self {
        surface.set_inputs_enabled(true);
        surface.set_button(ButtonLabel::Start, true);
        Self {
            remote,
            surface,
            state: SessionState::new(PollTimer::new(poll_interval)),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.phase == Phase::Running
    }

    pub fn is_polling(&self) -> bool {
        self.state.poller.is_active()
    }

    pub fn is_stop_pending(&self) -> bool {
        self.state.stop_pending
    }

    pub fn summary(&self) -> &HitSummary {
        &self.state.summary
    }

    pub fn remaining(&self) -> Option<&str> {
        self.state.remaining.as_deref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Re-checks the form and pushes the per-field indicators. While idle the
    /// start button follows the result.
    pub fn refresh_validation(&mut self, form: &WorkoutForm) -> bool {
        let validity = FieldValidity::of(form);
        for (field, valid) in validity.iter() {
            self.surface.set_field_valid(field, valid);
        }
        if self.state.phase == Phase::Idle {
            self.surface
                .set_button(ButtonLabel::Start, validity.all_valid());
        }
        validity.all_valid()
    }

    /// Start when idle, stop when running.
    pub async fn toggle(&mut self, form: &WorkoutForm) -> Result<(), WorkoutError> {
        match self.state.phase {
            Phase::Idle => self.start(form).await,
            Phase::Running => self.stop().await,
        }
    }

    /// Validates the form, asks the server to start and begins polling.
    ///
    /// An invalid form changes nothing. Otherwise a leftover poll timer is
    /// cancelled before the request, so calling this while already running
    /// replaces the poller instead of adding a second one.
    pub async fn start(&mut self, form: &WorkoutForm) -> Result<(), WorkoutError> {
        self.refresh_validation(form);
        let config = form.to_session_config().inspect_err(|err| {
            debug!(field = %err.field, reason = %err.reason, "start blocked by validation");
        })?;

        self.cancel_polling();

        info!(
            minutes = config.time,
            mode = %config.mode,
            "starting workout"
        );
        if let Err(err) = self.remote.start(&config).await {
            warn!(error = %err, "start request failed");
            self.state.phase = Phase::Idle;
            self.surface.set_inputs_enabled(true);
            self.surface.set_button(ButtonLabel::Start, true);
            self.surface
                .show_notice(Notice::error(format!("Could not start workout: {err}")));
            return Err(err.into());
        }

        self.surface.set_inputs_enabled(false);
        self.state.poller.start();
        self.state.phase = Phase::Running;
        self.state.stop_pending = false;
        self.reset_outputs();
        self.surface.set_button(ButtonLabel::Stop, true);
        self.surface.show_notice(Notice::info("Workout started"));
        Ok(())
    }

    /// Resolves at the next poll tick. Pending forever while not polling.
    pub async fn next_tick(&mut self) {
        self.state.poller.tick().await;
    }

    /// Fetches one snapshot and renders it.
    ///
    /// A failed fetch leaves the timer armed so the next tick tries again.
    pub async fn poll(&mut self) -> Result<PollOutcome, WorkoutError> {
        if self.state.phase != Phase::Running || !self.state.poller.is_active() {
            return Ok(PollOutcome::Skipped);
        }

        let snapshot = match self.remote.fetch().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "poll failed, waiting for next tick");
                self.surface
                    .show_notice(Notice::error(format!("Lost contact with bag: {err}")));
                return Err(err.into());
            }
        };

        let rendered = self.apply_snapshot(&snapshot);

        if has_ended(snapshot.deadline, snapshot.server_time) {
            self.finish();
            rendered?;
            return Ok(PollOutcome::Ended);
        }

        rendered?;
        Ok(PollOutcome::Updated)
    }

    fn apply_snapshot(&mut self, snapshot: &SessionSnapshot) -> Result<(), WorkoutError> {
        let summary =
            match HitSummary::from_events(&snapshot.correct_hits, &snapshot.incorrect_hits) {
                Ok(summary) => summary,
                Err(err) => {
                    error!(error = %err, "snapshot rejected");
                    self.surface
                        .show_notice(Notice::error(format!("Bad data from bag: {err}")));
                    return Err(err.into());
                }
            };

        let remaining = remaining_time(snapshot.deadline, snapshot.server_time);
        debug!(
            remaining = %remaining,
            hits = summary.total_hits(),
            misses = summary.total_misses(),
            "snapshot"
        );

        self.surface.set_remaining_time(Some(&remaining));
        for row in &summary.rows {
            self.surface.set_direction_stats(row);
        }
        self.state.remaining = Some(remaining);
        self.state.summary = summary;
        Ok(())
    }

    /// Blanks the countdown and zeroes every direction so nothing from the
    /// previous workout shows before the first snapshot arrives.
    fn reset_outputs(&mut self) {
        let summary = HitSummary::empty();
        self.surface.set_remaining_time(None);
        for row in &summary.rows {
            self.surface.set_direction_stats(row);
        }
        self.state.remaining = None;
        self.state.summary = summary;
    }

    /// Deadline reached without a user stop.
    fn finish(&mut self) {
        self.cancel_polling();
        self.surface.set_inputs_enabled(true);
        self.state.phase = Phase::Idle;
        self.surface.set_button(ButtonLabel::Start, true);
        self.surface.show_notice(Notice::info("Workout finished"));
        info!(
            hits = self.state.summary.total_hits(),
            misses = self.state.summary.total_misses(),
            "workout finished"
        );
    }

    /// First half of a stop: polling ends right away and the button shows the
    /// stop is in progress. Safe to call more than once.
    pub fn begin_stop(&mut self) {
        if self.state.phase != Phase::Running {
            return;
        }
        self.cancel_polling();
        self.state.stop_pending = true;
        self.surface.set_button(ButtonLabel::Stopping, false);
    }

    /// Ends the workout on the server.
    ///
    /// Inputs come back only once the server acknowledged; a failed stop
    /// leaves them disabled and keeps the controller running so the user can
    /// retry.
    pub async fn stop(&mut self) -> Result<(), WorkoutError> {
        if self.state.phase != Phase::Running {
            return Ok(());
        }
        self.begin_stop();

        info!("stopping workout");
        match self.remote.stop().await {
            Ok(()) => {
                self.state.stop_pending = false;
                self.state.phase = Phase::Idle;
                self.surface.set_inputs_enabled(true);
                self.surface.set_button(ButtonLabel::Start, true);
                self.surface.show_notice(Notice::info("Workout stopped"));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "stop request failed");
                self.surface.set_button(ButtonLabel::Stop, true);
                self.surface
                    .show_notice(Notice::error(format!("Stop did not complete: {err}")));
                Err(err.into())
            }
        }
    }

    /// Asks the bag to recalibrate. Does not touch the lifecycle.
    pub async fn recalibrate(&mut self) -> Result<(), WorkoutError> {
        info!("recalibration requested");
        match self.remote.recalibrate().await {
            Ok(()) => {
                self.surface.show_notice(Notice::info("Calibrated"));
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "calibration failed");
                self.surface
                    .show_notice(Notice::error(format!("Calibration failed: {err}")));
                Err(err.into())
            }
        }
    }

    /// Drops the poll timer. No-op when nothing is polling.
    pub fn cancel_polling(&mut self) {
        if self.state.poller.cancel() {
            debug!("polling cancelled");
        }
    }
}
