use std::{
    panic,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    algo::{CycleRecord, LinearSarsa, LinearSarsaConfig, SampleAverage, SemiGradientSarsa, UpdateRule},
    ensure_config,
    env::Environment,
    error::{Error, Result},
    exploration::{ActionSelector, Choice, Estimates},
    state::{State, StateConfig},
};

/// Configuration for one run of the learning loop
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// Number of cycles to run, or `None` to run until stopped
    ///
    /// **Default**: `None`
    pub iterations: Option<u64>,
    /// Time the environment is given to react between acting and observing
    ///
    /// **Default**: 100 ms
    pub interval: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: None,
            interval: Duration::from_millis(100),
        }
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Completed cycles, each ending in an update
    pub cycles: u64,
    /// Cycles whose action the environment failed to perform
    pub failed_actions: u64,
    /// Sum of the rewards observed
    pub total_reward: f64,
}

/// Copy of a learner's statistics for inspection
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Action ids, starting with the no-op
    pub action_ids: Vec<String>,
    /// Pick count per action
    pub counts: Vec<u64>,
    /// Share of all picks per action
    pub distribution: Vec<f64>,
    pub estimates: Estimates,
    /// Feature names, starting with the bias
    pub feature_names: Vec<String>,
    /// Last observed feature vector
    pub features: Vec<f64>,
    /// Last observed raw return
    pub returns: f64,
}

/// Everything a cycle reads or mutates, guarded by a single mutex
struct Engine<E, S, U> {
    env: E,
    state: State,
    selector: S,
    rule: U,
}

impl<E, S, U> Engine<E, S, U>
where
    E: Environment,
    S: ActionSelector,
    U: UpdateRule<S>,
{
    fn snapshot(&self) -> Snapshot {
        let table = self.selector.table();
        Snapshot {
            action_ids: table.ids().to_vec(),
            counts: table.counts().to_vec(),
            distribution: table.distribution(),
            estimates: self.selector.estimates(),
            feature_names: self.state.names().to_vec(),
            features: self.state.as_slice().to_vec(),
            returns: self.state.returns(),
        }
    }
}

struct Worker {
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Result<RunReport>>,
}

/// Runs the decide/act/observe/update cycle of a selector and its paired update rule on a
/// background thread
///
/// A learner is either idle or running a single background loop. Every cycle:
/// 1. performs the pending action (a failure to perform it is logged and learning continues),
/// 2. sleeps for the configured interval,
/// 3. re-reads the state and computes the reward as the change in return,
/// 4. chooses the next action and applies the update rule to the action just taken.
///
/// Cancellation is checked before each cycle, so a cycle in flight when [`stop`](Self::stop) is
/// called completes its update first. A failed read ends the run with
/// [`Error::EnvironmentUnavailable`], leaving the statistics as of the last completed update.
///
/// ### Generics
/// - `E` - The [`Environment`] being driven
/// - `S` - The [`ActionSelector`] deciding on actions
/// - `U` - The [`UpdateRule`] paired with the selector
pub struct Learner<E, S, U> {
    engine: Arc<Mutex<Engine<E, S, U>>>,
    worker: Option<Worker>,
}

/// Learner for state-independent value estimates, e.g. [`EpsilonGreedy`](crate::exploration::EpsilonGreedy) or [`Ucb`](crate::exploration::Ucb)
pub type BanditLearner<E, S> = Learner<E, S, SampleAverage>;

/// Learner for a linear action-value function trained with semi-gradient SARSA
pub type SarsaLearner<E> = Learner<E, LinearSarsa, SemiGradientSarsa>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<E, S, U> Learner<E, S, U>
where
    E: Environment + 'static,
    S: ActionSelector + 'static,
    U: UpdateRule<S> + 'static,
{
    /// Create an idle learner
    ///
    /// The state is not read until a run starts.
    pub fn new(env: E, state_config: StateConfig, selector: S, rule: U) -> Result<Self> {
        let state = State::new(state_config)?;
        if let Estimates::Weights(weights) = selector.estimates() {
            ensure_config!(
                weights.iter().all(|row| row.len() == state.len()),
                "selector expects a different feature vector length than the {} configured",
                state.len()
            );
        }
        Ok(Self {
            engine: Arc::new(Mutex::new(Engine {
                env,
                state,
                selector,
                rule,
            })),
            worker: None,
        })
    }

    /// Whether a background loop is still executing
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Begin running the cycle on a background thread
    ///
    /// A run already in progress is stopped first; its outcome is logged and discarded.
    ///
    /// **Errors** with [`Error::Configuration`] if the interval is zero, in which case any
    /// current run is left untouched.
    pub fn start(&mut self, config: RunConfig) -> Result<()> {
        ensure_config!(!config.interval.is_zero(), "`interval` must be non-zero");

        match self.stop() {
            Ok(Some(report)) => log::debug!("restarting after {} cycles", report.cycles),
            Err(e) => log::warn!("discarding outcome of previous run: {e}"),
            Ok(None) => {}
        }

        log::info!(
            "starting learner: {} iterations, interval {:?}",
            config
                .iterations
                .map_or_else(|| String::from("unbounded"), |n| n.to_string()),
            config.interval
        );

        let cancel = Arc::new(AtomicBool::new(false));
        let handle = {
            let engine = Arc::clone(&self.engine);
            let cancel = Arc::clone(&cancel);
            thread::spawn(move || run(&*engine, &*cancel, &config))
        };
        self.worker = Some(Worker { cancel, handle });
        Ok(())
    }

    /// Request cancellation and block until the background loop has exited
    ///
    /// **Returns** the report of the stopped run, or `None` if the learner was idle. A run that
    /// had already ended with an error returns that error.
    pub fn stop(&mut self) -> Result<Option<RunReport>> {
        let Some(worker) = self.worker.take() else {
            return Ok(None);
        };
        worker.cancel.store(true, Ordering::Release);
        join(worker.handle).map(Some)
    }

    /// Block until the current run finishes on its own
    ///
    /// Never returns for an unbounded run that does not fail; use [`stop`](Self::stop) for those.
    pub fn wait(&mut self) -> Result<Option<RunReport>> {
        match self.worker.take() {
            Some(worker) => join(worker.handle).map(Some),
            None => Ok(None),
        }
    }

    /// Copy the current statistics
    pub fn snapshot(&self) -> Snapshot {
        lock(&self.engine).snapshot()
    }

    /// Inspect the selector while holding the statistics lock
    pub fn with_selector<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&lock(&self.engine).selector)
    }
}

impl<E> SarsaLearner<E>
where
    E: Environment + 'static,
{
    /// Create an idle learner whose linear selector matches the configured feature vector
    pub fn linear_sarsa(
        env: E,
        state_config: StateConfig,
        action_ids: Vec<String>,
        config: LinearSarsaConfig,
        rule: SemiGradientSarsa,
    ) -> Result<Self> {
        let features = State::new(state_config.clone())?.len();
        let selector = LinearSarsa::new(action_ids, features, config)?;
        Self::new(env, state_config, selector, rule)
    }
}

impl<E, S, U> Drop for Learner<E, S, U> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancel.store(true, Ordering::Release);
            if let Ok(Err(e)) = worker.handle.join() {
                log::debug!("learner dropped after failed run: {e}");
            }
        }
    }
}

fn join(handle: JoinHandle<Result<RunReport>>) -> Result<RunReport> {
    match handle.join() {
        Ok(result) => result,
        Err(payload) => panic::resume_unwind(payload),
    }
}

fn run<E, S, U>(
    engine: &Mutex<Engine<E, S, U>>,
    cancel: &AtomicBool,
    config: &RunConfig,
) -> Result<RunReport>
where
    E: Environment,
    S: ActionSelector,
    U: UpdateRule<S>,
{
    let mut report = RunReport::default();

    let mut pending = {
        let mut guard = lock(engine);
        let eng = &mut *guard;
        if let Err(e) = eng.state.refresh(&mut eng.env) {
            log::error!("could not read initial state: {e}");
            return Err(e);
        }
        eng.selector.choose(&eng.state)
    };

    while !cancel.load(Ordering::Acquire) && config.iterations.map_or(true, |n| report.cycles < n) {
        let state = {
            let mut guard = lock(engine);
            let eng = &mut *guard;
            log::debug!(
                "taking action {} ({})",
                pending.action,
                eng.selector.table().id(pending.action).unwrap_or("?")
            );
            match eng.selector.take_action(&mut eng.env, pending.action) {
                // Rejected before the pick was counted
                Err(e @ Error::Configuration { .. }) => return Err(e),
                Err(e) => {
                    log::warn!("{e}; treating as no-op");
                    report.failed_actions += 1;
                }
                Ok(()) => {}
            }
            eng.state.clone()
        };

        thread::sleep(config.interval);

        let mut guard = lock(engine);
        let eng = &mut *guard;
        if let Err(e) = eng.state.refresh(&mut eng.env) {
            eng.selector.table_mut().retract(pending.action);
            log::error!("stopping after {} cycles: {e}", report.cycles);
            return Err(e);
        }

        let reward = eng.state.returns() - state.returns();
        let next: Choice = eng.selector.choose(&eng.state);
        log::debug!(
            "reward {reward} for estimate {:?}, next action {}",
            pending.value,
            next.action
        );

        let record = CycleRecord {
            state: &state,
            action: pending.action,
            value: pending.value,
            reward,
            next_state: &eng.state,
            next,
        };
        eng.rule.update(&mut eng.selector, &record);

        report.cycles += 1;
        report.total_reward += reward;
        pending = next;
    }

    log::info!(
        "learner finished after {} cycles ({} failed actions, total reward {})",
        report.cycles,
        report.failed_actions,
        report.total_reward
    );
    Ok(report)
}
