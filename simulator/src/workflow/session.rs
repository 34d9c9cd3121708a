use crate::gui_bridge::model::VisualizationModel;
use crate::workflow::config::SimulatorConfig;
use firewatch_core::clock::SystemClock;
use firewatch_core::lifecycle::MapLayers;
use firewatch_core::prelude::{Clock, RandomSource};
use firewatch_core::{ConsoleEvent, Effect, FireConsole};
use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const ACTIVITY_LIMIT: usize = 20;

pub type LiveSession = Session<StdRng, SystemClock>;
pub type SharedSession = Arc<Mutex<LiveSession>>;

/// A console plus the map layers and activity log derived from its effects.
pub struct Session<R, C> {
    console: FireConsole<R, C>,
    layers: MapLayers,
    activity: VecDeque<String>,
    status: String,
}

impl<R: RandomSource, C: Clock> Session<R, C> {
    pub fn new(console: FireConsole<R, C>) -> Self {
        Self {
            console,
            layers: MapLayers::default(),
            activity: VecDeque::with_capacity(ACTIVITY_LIMIT),
            status: "Draw a rectangle to select an area.".into(),
        }
    }

    pub fn dispatch(&mut self, event: ConsoleEvent) -> Vec<Effect> {
        debug!("dispatch {:?}", event);
        let effects = self.console.dispatch(event);
        self.layers.apply_all(&effects);
        for effect in &effects {
            debug!("effect {:?}", effect);
            if let Effect::Notify { message } = effect {
                self.status = message.clone();
                self.push_activity(message.clone());
            }
        }
        effects
    }

    pub fn push_activity(&mut self, entry: String) {
        self.activity.push_back(entry);
        while self.activity.len() > ACTIVITY_LIMIT {
            self.activity.pop_front();
        }
    }

    pub fn console(&self) -> &FireConsole<R, C> {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut FireConsole<R, C> {
        &mut self.console
    }

    pub fn layers(&self) -> &MapLayers {
        &self.layers
    }

    pub fn activity(&self) -> impl Iterator<Item = &String> {
        self.activity.iter()
    }

    pub fn model(&self) -> VisualizationModel {
        VisualizationModel {
            snapshot: self.console.snapshot(),
            layers: self.layers.clone(),
            status: self.status.clone(),
            activity: self.activity.iter().cloned().collect(),
            metrics: self.console.metrics().snapshot(),
        }
    }
}

pub fn build_console(config: &SimulatorConfig) -> anyhow::Result<FireConsole<StdRng, SystemClock>> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    Ok(FireConsole::new(config.console.clone(), rng, SystemClock)?)
}

pub fn shared(session: LiveSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

pub fn lock(session: &SharedSession) -> MutexGuard<'_, LiveSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}
