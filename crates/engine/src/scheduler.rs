//! Background schedulers for the engine's four cadences.
//!
//! Every timer is an explicit, cancelable task handle owned by the scheduler:
//! the hourly alert cycle, the daily prediction/suggestion cycle, the
//! randomized request generator and the sub-second expiry sweep that
//! implements the 3-second TTLs. Tick bodies take wall-clock time and call
//! the same synchronous state functions tests call with virtual time.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::service::Magasin;

/// Periods for the recurring cycles.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    pub alerts_period: Duration,
    pub predictions_period: Duration,
    /// The generator re-draws its period in this range before every tick.
    pub generation_min: Duration,
    pub generation_max: Duration,
    pub sweep_period: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            alerts_period: Duration::from_secs(60 * 60),
            predictions_period: Duration::from_secs(24 * 60 * 60),
            generation_min: Duration::from_secs(10),
            generation_max: Duration::from_secs(30),
            sweep_period: Duration::from_millis(500),
        }
    }
}

/// Owns the background tasks for one engine session.
///
/// Tasks stop on `shutdown()` and are aborted when the scheduler is dropped,
/// so a session teardown never leaks timers. Each task gets its own `Notify`:
/// `notify_one` stores a permit, so a shutdown issued mid-tick is picked up
/// at the next `notified().await` instead of being lost.
pub struct Scheduler {
    shutdowns: Vec<Arc<Notify>>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn start(magasin: Arc<Magasin>, config: SchedulerConfig) -> Self {
        let mut scheduler = Self {
            shutdowns: Vec::new(),
            handles: Vec::new(),
        };

        // Alert cycle: hourly, with an immediate first tick (startup run).
        {
            let magasin = magasin.clone();
            let period = config.alerts_period;
            scheduler.spawn(move |shutdown| async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = shutdown.notified() => break,
                        _ = interval.tick() => {
                            magasin.refresh_alerts(Utc::now());
                            tracing::debug!("cycle d'alertes exécuté");
                        }
                    }
                }
            });
        }

        // Prediction + suggestion cycle: daily, immediate first tick.
        {
            let magasin = magasin.clone();
            let period = config.predictions_period;
            scheduler.spawn(move |shutdown| async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = shutdown.notified() => break,
                        _ = interval.tick() => {
                            let now = Utc::now();
                            magasin.refresh_predictions(now);
                            magasin.refresh_suggestions(now);
                            tracing::debug!("cycle de prédictions exécuté");
                        }
                    }
                }
            });
        }

        // Request generator: randomized period, probabilistic tick.
        {
            let magasin = magasin.clone();
            let (min, max) = (config.generation_min, config.generation_max);
            scheduler.spawn(move |shutdown| async move {
                loop {
                    let delay = rand::thread_rng().gen_range(min..=max);
                    tokio::select! {
                        _ = shutdown.notified() => break,
                        _ = tokio::time::sleep(delay) => {
                            if let Some(id) = magasin.tick_generation(Utc::now()) {
                                tracing::debug!(%id, "demande générée automatiquement");
                            }
                        }
                    }
                }
            });
        }

        // Expiry sweep: drives the 3-second deadlines.
        {
            let magasin = magasin.clone();
            let period = config.sweep_period;
            scheduler.spawn(move |shutdown| async move {
                let mut interval = tokio::time::interval(period);
                interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = shutdown.notified() => break,
                        _ = interval.tick() => {
                            magasin.sweep(Utc::now());
                        }
                    }
                }
            });
        }

        tracing::info!("ordonnanceur démarré (4 tâches)");
        scheduler
    }

    fn spawn<F, Fut>(&mut self, task: F)
    where
        F: FnOnce(Arc<Notify>) -> Fut,
        Fut: core::future::Future<Output = ()> + Send + 'static,
    {
        let shutdown = Arc::new(Notify::new());
        self.handles.push(tokio::spawn(task(shutdown.clone())));
        self.shutdowns.push(shutdown);
    }

    /// Ask every task to stop after its current tick.
    pub fn shutdown(&self) {
        for shutdown in &self.shutdowns {
            shutdown.notify_one();
        }
    }

    /// Wait for all tasks to finish (call `shutdown` first).
    pub async fn join(mut self) {
        for handle in self.handles.drain(..) {
            let _ = handle.await;
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}
