// Input sources for the dashboard. Keyboard, resize and OS signals all land in
// one mpsc channel so the dashboard handles them one at a time.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc;

pub const INPUT_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// External termination request (SIGINT/SIGTERM).
    Terminate,
    /// The terminal input stream failed and cannot be read any more.
    Lost(String),
}

impl InputEvent {
    pub fn is_quit(&self) -> bool {
        match self {
            InputEvent::Terminate => true,
            InputEvent::Key(key) => is_quit_key(key),
            InputEvent::Resize(..) | InputEvent::Lost(_) => false,
        }
    }
}

fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

pub fn input_channel() -> (mpsc::Sender<InputEvent>, mpsc::Receiver<InputEvent>) {
    mpsc::channel(INPUT_CHANNEL_CAPACITY)
}

/// Reads terminal events on a dedicated thread. crossterm's read is blocking, so the
/// thread polls with `poll_interval` and exits once the receiving side is dropped.
pub fn spawn_reader(
    tx: mpsc::Sender<InputEvent>,
    poll_interval: Duration,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("input-reader".into())
        .spawn(move || {
            while !tx.is_closed() {
                let forwarded = match event::poll(poll_interval) {
                    Ok(false) => continue,
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) => InputEvent::Key(key),
                        Ok(Event::Resize(w, h)) => InputEvent::Resize(w, h),
                        Ok(_) => continue,
                        Err(e) => InputEvent::Lost(e.to_string()),
                    },
                    Err(e) => InputEvent::Lost(e.to_string()),
                };
                let lost = matches!(forwarded, InputEvent::Lost(_));
                if lost {
                    tracing::error!(event = ?forwarded, "terminal input failed");
                }
                if tx.blocking_send(forwarded).is_err() || lost {
                    break;
                }
            }
            tracing::debug!("Input reader exiting");
        })
}

/// Waits for SIGINT or SIGTERM and forwards a single [`InputEvent::Terminate`].
pub async fn forward_shutdown_signal(tx: mpsc::Sender<InputEvent>) {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
    let _ = tx.send(InputEvent::Terminate).await;
}
