//! Frame-loop consumer of drop outcomes
//!
//! A `Session` owns the board and every ball in flight. Outcome requests run
//! on worker threads and report back through a channel; the frame loop only
//! ever polls that channel, so a slow or failed request never stalls the
//! balls already falling.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::{PhysicsConfig, PlinkoConfig};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::{ConfigError, PlinkoError, PlinkoResult};
use crate::outcome::{DropOutcome, DropResponse, MultiplierTable, OutcomeService};
use crate::sim::{Ball, Board, SimEvent, StepSource, reconcile, tick};

type PendingOutcome = PlinkoResult<DropResponse>;

/// Default cap on outcome requests awaiting a response
pub const DEFAULT_MAX_IN_FLIGHT: usize = 64;

/// Result of one finished drop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropReport {
    pub ball_id: u32,
    /// Sink the ball actually landed in
    pub sink: usize,
    /// Sink the outcome decided on
    pub expected_sink: usize,
    /// Multiplier of the sink the ball landed in
    pub multiplier: f64,
}

impl DropReport {
    pub fn payout(&self, stake: f64) -> f64 {
        stake * self.multiplier
    }

    /// Did the simulation agree with the outcome?
    pub fn reconciled(&self) -> bool {
        self.sink == self.expected_sink
    }
}

pub struct Session {
    board: Board,
    physics: PhysicsConfig,
    table: Arc<MultiplierTable>,
    balls: Vec<Ball>,
    next_ball_id: u32,
    /// Fixed timestep accumulator
    accumulator: f32,
    tx: Sender<PendingOutcome>,
    rx: Receiver<PendingOutcome>,
    in_flight: usize,
    max_in_flight: usize,
    /// Keep settled balls around (e.g. for a renderer) instead of pruning
    retain_settled: bool,
    escaped: usize,
}

impl Session {
    pub fn new(config: &PlinkoConfig) -> Result<Self, ConfigError> {
        let board = Board::from_config(config)?;
        let (tx, rx) = mpsc::channel();
        log::info!(
            "Session ready: {} rows, {} sinks, table v{}",
            config.board.rows,
            board.sinks().len(),
            config.table.version
        );
        Ok(Self {
            board,
            physics: config.physics.clone(),
            table: Arc::new(config.table.clone()),
            balls: Vec::new(),
            next_ball_id: 1,
            accumulator: 0.0,
            tx,
            rx,
            in_flight: 0,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            retain_settled: false,
            escaped: 0,
        })
    }

    pub fn with_retained_balls(mut self) -> Self {
        self.retain_settled = true;
        self
    }

    /// Limit how many requests may wait on a response at once
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn table(&self) -> &MultiplierTable {
        &self.table
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Balls still falling
    pub fn active_balls(&self) -> usize {
        self.balls.iter().filter(|b| b.is_active()).count()
    }

    /// Requests sent but not yet drained
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn escaped(&self) -> usize {
        self.escaped
    }

    /// Nothing pending and nothing falling
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.active_balls() == 0
    }

    /// Ask the service for an outcome without blocking the caller
    ///
    /// The ball appears on a later `update` once the response arrives. Every
    /// accepted request sends exactly one result back, even if the service
    /// panics. Fails without sending anything when `max_in_flight` requests
    /// are already pending or no worker thread can be started.
    pub fn request_drop(&mut self, service: Arc<dyn OutcomeService>) -> PlinkoResult<()> {
        if self.in_flight >= self.max_in_flight {
            return Err(PlinkoError::OutcomeRequestFailed(format!(
                "{} requests already pending",
                self.in_flight
            )));
        }

        let tx = self.tx.clone();
        thread::Builder::new()
            .name("outcome-request".into())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| service.request_outcome()))
                    .unwrap_or_else(|payload| {
                        Err(PlinkoError::OutcomeRequestFailed(format!(
                            "outcome service panicked: {}",
                            panic_message(payload.as_ref())
                        )))
                    });
                // Receiver gone means the session was dropped; nothing to report to
                let _ = tx.send(result);
            })
            .map_err(|e| PlinkoError::OutcomeRequestFailed(format!("no worker thread: {e}")))?;

        self.in_flight += 1;
        Ok(())
    }

    /// Handle one resolved request: spawn on success, log and drop on failure
    pub fn complete_request(&mut self, result: PendingOutcome) -> Option<u32> {
        let outcome = result.and_then(|response| response.into_outcome(&self.table));
        match outcome {
            Ok(outcome) => Some(self.spawn_ball(&outcome)),
            Err(e) => {
                log::error!("Drop request failed, no ball spawned: {e}");
                None
            }
        }
    }

    /// Add a ball steered toward the outcome's bin
    pub fn spawn_ball(&mut self, outcome: &DropOutcome) -> u32 {
        let config = self.board.config();
        let source = StepSource::for_outcome(outcome, config);
        if matches!(source, StepSource::DerivedFromOffset(_)) {
            log::debug!("No pattern for bin {}, deriving steps from offset", outcome.bin_index);
        }
        let steps = reconcile(&source, config);

        let id = self.next_ball_id;
        self.next_ball_id += 1;
        self.balls.push(Ball::new(id, &self.board, steps, outcome.bin_index));
        log::debug!("Spawned ball {} for bin {} (x{})", id, outcome.bin_index, outcome.multiplier);
        id
    }

    /// Drain every request that has resolved so far
    pub fn poll_requests(&mut self) -> Vec<u32> {
        let mut spawned = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(result) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    spawned.extend(self.complete_request(result));
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        spawned
    }

    /// Block until every outstanding request resolves or `timeout` passes
    ///
    /// For headless drivers only; a frame loop should rely on `update`.
    pub fn wait_for_requests(&mut self, timeout: Duration) -> Vec<u32> {
        let deadline = Instant::now() + timeout;
        let mut spawned = Vec::new();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(result) => {
                    self.in_flight -= 1;
                    spawned.extend(self.complete_request(result));
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                    log::warn!("Gave up waiting on {} outcome requests", self.in_flight);
                    break;
                }
            }
        }
        spawned
    }

    /// Per-frame entry point: drain requests, then run fixed substeps
    pub fn update(&mut self, frame_dt: f32) -> Vec<DropReport> {
        self.poll_requests();

        // Cap dt so a stalled frame cannot trigger a burst of substeps
        self.accumulator += frame_dt.min(0.1);

        let mut reports = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            reports.extend(self.step());
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        reports
    }

    /// Advance one fixed timestep
    pub fn step(&mut self) -> Vec<DropReport> {
        let events = tick(&self.board, &self.physics, &mut self.balls, SIM_DT);
        if events.is_empty() {
            return Vec::new();
        }

        let mut reports = Vec::with_capacity(events.len());
        for event in events {
            match event {
                SimEvent::Settled { ball_id, sink } => {
                    if let Some(report) = self.report(ball_id, sink) {
                        reports.push(report);
                    }
                }
                SimEvent::Escaped { .. } => self.escaped += 1,
            }
        }

        if !self.retain_settled {
            self.balls.retain(Ball::is_active);
        }
        reports
    }

    /// Step until all balls have finished or `max_steps` runs out
    pub fn run_until_settled(&mut self, max_steps: usize) -> Vec<DropReport> {
        let mut reports = Vec::new();
        for _ in 0..max_steps {
            if self.active_balls() == 0 {
                break;
            }
            reports.extend(self.step());
        }
        reports
    }

    fn report(&self, ball_id: u32, sink: usize) -> Option<DropReport> {
        let ball = self.balls.iter().find(|b| b.id == ball_id)?;
        let multiplier = self.board.sink(sink)?.multiplier;
        Some(DropReport {
            ball_id,
            sink,
            expected_sink: ball.expected_sink,
            multiplier,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
