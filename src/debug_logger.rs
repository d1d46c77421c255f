// Debug logging module for asynchronous planning-decision logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the game loop. Each planning decision is written to a JSONL file.

use log::{error, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::types::{Coord, Direction};

/// One planning decision as written to, and read back from, the JSONL log
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanLogEntry {
    pub tick: u64,
    pub head: Coord,
    pub heading: Option<Direction>,
    pub target: Coord,
    pub obstacles: Vec<Coord>,
    pub primary_move: Option<Direction>,
    pub emergency_move: Option<Direction>,
    pub timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return DebugLogger::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                DebugLogger {
                    file: Arc::new(Mutex::new(Some(file))),
                    enabled: true,
                }
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                DebugLogger::disabled()
            }
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a planning decision asynchronously (fire-and-forget).
    /// The timestamp is filled in here. Outside a tokio runtime the entry is dropped.
    pub fn log_decision(&self, mut entry: PlanLogEntry) {
        if !self.enabled {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, dropping debug log entry for tick {}", entry.tick);
            return;
        };

        entry.timestamp = chrono::Utc::now().to_rfc3339();
        let file_handle = self.file.clone();

        runtime.spawn(async move {
            Self::log_decision_internal(file_handle, entry).await;
        });
    }

    /// Internal async function that performs the actual file write
    async fn log_decision_internal(file_handle: Arc<Mutex<Option<File>>>, entry: PlanLogEntry) {
        let mut file_guard = file_handle.lock().await;

        if let Some(file) = file_guard.as_mut() {
            match serde_json::to_string(&entry) {
                Ok(json_line) => {
                    let line_with_newline = format!("{}\n", json_line);
                    if let Err(e) = file.write_all(line_with_newline.as_bytes()).await {
                        error!("Failed to write debug log entry: {}", e);
                    } else if let Err(e) = file.flush().await {
                        error!("Failed to flush debug log: {}", e);
                    }
                }
                Err(e) => {
                    error!("Failed to serialize debug log entry: {}", e);
                }
            }
        }
    }
}
