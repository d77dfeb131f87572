// src/services/state.rs
use log::info;
use serde::Serialize;
use tokio::sync::watch;

use crate::models::TickerSymbol;

/// The active ticker plus the submission that set it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub symbol: Option<TickerSymbol>,
    pub generation: u64,
}

impl Selection {
    pub fn is_active(&self) -> bool {
        self.symbol.is_some()
    }
}

/// Single-slot application state. Last write wins; writers are serialized by
/// the channel and every reader sees the latest submission.
pub struct DashboardState {
    tx: watch::Sender<Selection>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Selection {
            symbol: None,
            generation: 0,
        });
        DashboardState { tx }
    }

    /// Records a user submission. Blank input clears the selection.
    pub fn submit(&self, raw: &str) -> Selection {
        let symbol = TickerSymbol::normalize(raw);
        let mut written = None;
        self.tx.send_modify(|selection| {
            selection.symbol = symbol;
            selection.generation += 1;
            written = Some(selection.clone());
        });
        let selection = written.unwrap_or_else(|| self.current());
        match &selection.symbol {
            Some(symbol) => info!("Selected {} (generation {})", symbol, selection.generation),
            None => info!("Selection cleared (generation {})", selection.generation),
        }
        selection
    }

    pub fn current(&self) -> Selection {
        self.tx.borrow().clone()
    }

    /// False once a newer submission has replaced `selection`.
    pub fn is_current(&self, selection: &Selection) -> bool {
        self.tx.borrow().generation == selection.generation
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.tx.subscribe()
    }
}
