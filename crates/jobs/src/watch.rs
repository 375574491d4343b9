//! Shared debounced file watching.
//!
//! Editors and config management tools write files in bursts (truncate,
//! write, rename); reload work starts only after the burst has been
//! quiet for the debounce window.

use std::path::Path;
use std::time::Duration;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Coalescing window for bursts of filesystem events.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

fn is_relevant(event: &Event) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
}

/// Watch one file and yield once per debounced change burst, until the
/// token fires. The caller runs its reload between yields.
pub struct FileWatch {
    // Held so the notify backend stays alive.
    _watcher: notify::RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<Result<Event, notify::Error>>,
    shutdown: CancellationToken,
}

impl FileWatch {
    pub fn new(path: &str, shutdown: CancellationToken) -> notify::Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watcher =
            notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
                let _ = tx.send(res);
            })?;
        watcher.watch(Path::new(path), RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            rx,
            shutdown,
        })
    }

    /// Wait for the next debounced change. `None` means shutdown or a
    /// dead watcher.
    pub async fn changed(&mut self) -> Option<()> {
        // Wait for one relevant event.
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return None,
                event = self.rx.recv() => match event? {
                    Ok(event) if is_relevant(&event) => break,
                    Ok(_) => {}
                    Err(e) => error!(error = %e, "File watcher error"),
                },
            }
        }

        // Then swallow the rest of the burst.
        loop {
            let quiet = tokio::time::sleep(DEBOUNCE);
            tokio::pin!(quiet);
            tokio::select! {
                _ = self.shutdown.cancelled() => return None,
                _ = &mut quiet => {
                    debug!("File change burst settled");
                    return Some(());
                }
                event = self.rx.recv() => match event {
                    None => return None,
                    Some(Ok(_)) | Some(Err(_)) => continue,
                },
            }
        }
    }
}
