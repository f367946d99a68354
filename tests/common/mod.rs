// Test doubles shared by the headless integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sparpi::hits::{Direction, DirectionStats, HitEvent};
use sparpi::remote::WorkoutRemote;
use sparpi::session::SessionConfig;
use sparpi::surface::{ButtonLabel, Notice, SurfaceState, WorkoutSurface};
use sparpi::validation::Field;
use sparpi::workout::{Frequencies, SessionSnapshot, WorkoutForm, WorkoutMode};
use sparpi::RemoteError;

/// Ordered record of remote calls and surface updates.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Canned outcome for a mutation.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Ok,
    Status(u16),
    Timeout,
}

impl Reply {
    fn into_result(self) -> Result<(), RemoteError> {
        match self {
            Reply::Ok => Ok(()),
            Reply::Status(code) => Err(status(code)),
            Reply::Timeout => Err(RemoteError::Timeout),
        }
    }
}

fn status(code: u16) -> RemoteError {
    RemoteError::Status(reqwest::StatusCode::from_u16(code).unwrap())
}

#[derive(Default)]
struct Script {
    start: VecDeque<Reply>,
    fetch: VecDeque<Result<SessionSnapshot, u16>>,
    stop: VecDeque<Reply>,
    calibrate: VecDeque<Reply>,
    stop_delay: Duration,
    configs: Vec<SessionConfig>,
}

/// Remote that answers from queues. Empty mutation queues answer `Ok`; an
/// empty fetch queue times out.
#[derive(Clone)]
pub struct ScriptedRemote {
    script: Arc<Mutex<Script>>,
    log: CallLog,
}

impl ScriptedRemote {
    pub fn new(log: CallLog) -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            log,
        }
    }

    pub fn on_start(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().start.push_back(reply);
        self
    }

    pub fn on_fetch(&self, snapshot: SessionSnapshot) -> &Self {
        self.script.lock().unwrap().fetch.push_back(Ok(snapshot));
        self
    }

    pub fn on_fetch_status(&self, code: u16) -> &Self {
        self.script.lock().unwrap().fetch.push_back(Err(code));
        self
    }

    pub fn on_stop(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().stop.push_back(reply);
        self
    }

    pub fn on_calibrate(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().calibrate.push_back(reply);
        self
    }

    pub fn stop_takes(&self, delay: Duration) -> &Self {
        self.script.lock().unwrap().stop_delay = delay;
        self
    }

    pub fn configs(&self) -> Vec<SessionConfig> {
        self.script.lock().unwrap().configs.clone()
    }

    pub fn calls(&self, name: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.as_str() == name)
            .count()
    }

    fn record(&self, entry: &str) {
        self.log.lock().unwrap().push(entry.to_string());
    }
}

#[async_trait]
impl WorkoutRemote for ScriptedRemote {
    async fn start(&self, config: &SessionConfig) -> Result<(), RemoteError> {
        self.record("remote:start");
        let reply = {
            let mut script = self.script.lock().unwrap();
            script.configs.push(config.clone());
            script.start.pop_front().unwrap_or(Reply::Ok)
        };
        reply.into_result()
    }

    async fn fetch(&self) -> Result<SessionSnapshot, RemoteError> {
        self.record("remote:fetch");
        let next = self.script.lock().unwrap().fetch.pop_front();
        match next {
            Some(Ok(snapshot)) => Ok(snapshot),
            Some(Err(code)) => Err(status(code)),
            None => Err(RemoteError::Timeout),
        }
    }

    async fn stop(&self) -> Result<(), RemoteError> {
        self.record("remote:stop");
        let (reply, delay) = {
            let mut script = self.script.lock().unwrap();
            (script.stop.pop_front().unwrap_or(Reply::Ok), script.stop_delay)
        };
        tokio::time::sleep(delay).await;
        self.record("remote:stop:done");
        reply.into_result()
    }

    async fn recalibrate(&self) -> Result<(), RemoteError> {
        self.record("remote:calibrate");
        let reply = self
            .script
            .lock()
            .unwrap()
            .calibrate
            .pop_front()
            .unwrap_or(Reply::Ok);
        reply.into_result()
    }
}

/// `SurfaceState` that also logs lifecycle-relevant updates.
pub struct RecordingSurface {
    pub state: SurfaceState,
    log: CallLog,
}

impl RecordingSurface {
    pub fn new(log: CallLog) -> Self {
        Self {
            state: SurfaceState::default(),
            log,
        }
    }
}

impl WorkoutSurface for RecordingSurface {
    fn set_remaining_time(&mut self, text: Option<&str>) {
        self.state.set_remaining_time(text);
    }

    fn set_direction_stats(&mut self, stats: &DirectionStats) {
        self.state.set_direction_stats(stats);
    }

    fn set_inputs_enabled(&mut self, enabled: bool) {
        self.log
            .lock()
            .unwrap()
            .push(format!("surface:inputs_enabled={enabled}"));
        self.state.set_inputs_enabled(enabled);
    }

    fn set_field_valid(&mut self, field: Field, valid: bool) {
        self.state.set_field_valid(field, valid);
    }

    fn set_button(&mut self, label: ButtonLabel, enabled: bool) {
        self.log
            .lock()
            .unwrap()
            .push(format!("surface:button={label}/{enabled}"));
        self.state.set_button(label, enabled);
    }

    fn show_notice(&mut self, notice: Notice) {
        self.state.show_notice(notice);
    }
}

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn position(log: &CallLog, entry: &str) -> usize {
    log.lock()
        .unwrap()
        .iter()
        .position(|e| e == entry)
        .unwrap_or_else(|| panic!("{entry} not in log"))
}

pub fn valid_form() -> WorkoutForm {
    WorkoutForm::new("1:00", WorkoutMode::Random, Frequencies { r: 50, c: 25, l: 25 })
}

pub fn snapshot(deadline: f64, server_time: f64) -> SessionSnapshot {
    SessionSnapshot {
        deadline,
        server_time,
        correct_hits: Vec::new(),
        incorrect_hits: Vec::new(),
    }
}

pub fn snapshot_with_hits(
    deadline: f64,
    server_time: f64,
    correct: &[(Direction, f64)],
    incorrect: &[(Direction, f64)],
) -> SessionSnapshot {
    let to_events = |list: &[(Direction, f64)]| {
        list.iter()
            .map(|(direction, time)| HitEvent::new(*direction, *time))
            .collect()
    };
    SessionSnapshot {
        deadline,
        server_time,
        correct_hits: to_events(correct),
        incorrect_hits: to_events(incorrect),
    }
}
