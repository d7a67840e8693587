//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_rule_table;
use crate::handler::resolver::HandlerResolver;
use crate::routing::table::RuleTable;

/// A watcher that rebuilds the rule table when the configuration file changes.
pub struct ConfigWatcher {
    path: PathBuf,
    verifier: Option<Arc<dyn HandlerResolver>>,
    update_tx: mpsc::UnboundedSender<RuleTable>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for rebuilt rule tables.
    pub fn new(path: &Path, verifier: Option<Arc<dyn HandlerResolver>>) -> (Self, mpsc::UnboundedReceiver<RuleTable>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                verifier,
                update_tx,
            },
            update_rx,
        )
    }

    /// Load the file and send the rebuilt table. A failure keeps the current table.
    pub fn reload(&self) -> bool {
        match load_rule_table(&self.path, self.verifier.clone()) {
            Ok(table) => {
                tracing::info!(path = ?self.path, rules = table.rules().len(), "Rule table rebuilt");
                self.update_tx.send(table).is_ok()
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to reload config. Keeping current rule table.");
                false
            }
        }
    }

    /// Start watching the file in a background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Config file change detected, reloading...");
                        self.reload();
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
