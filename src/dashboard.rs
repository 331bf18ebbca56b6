use crate::input::InputEvent;
use crate::render::{Theme, draw, render};
use crate::sampler::SnapshotReceiver;
use crate::snapshot::{DisplayState, MetricSnapshot};
use std::io;
use thiserror::Error;
use tokio::sync::mpsc;
use tui::{Terminal, backend::Backend};

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("render surface unusable: {0}")]
    Io(#[from] io::Error),
    #[error("terminal input lost: {0}")]
    InputLost(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Starting,
    AwaitingFirstSnapshot,
    Running,
    Terminated,
}

/// Sole owner of the render surface and of [`DisplayState`].
///
/// Every mutation goes through `&mut self`, and [`Dashboard::run`] handles one
/// event at a time, so a redraw can never observe a half-applied snapshot.
pub struct Dashboard<B: Backend> {
    terminal: Terminal<B>,
    theme: Theme,
    display: DisplayState,
    state: ControllerState,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(terminal: Terminal<B>, theme: Theme) -> Self {
        Self {
            terminal,
            theme,
            display: DisplayState::NoData,
            state: ControllerState::Starting,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Paints the "no data yet" view. Only has an effect in `Starting`.
    pub fn start(&mut self) -> Result<(), DashboardError> {
        if self.state != ControllerState::Starting {
            return Ok(());
        }
        self.terminal.clear()?;
        self.redraw()?;
        self.transition(ControllerState::AwaitingFirstSnapshot);
        Ok(())
    }

    pub fn on_snapshot(&mut self, snapshot: MetricSnapshot) -> Result<(), DashboardError> {
        if self.state == ControllerState::Terminated {
            return Ok(());
        }
        self.display = DisplayState::from(snapshot);
        if self.state != ControllerState::Running {
            self.transition(ControllerState::Running);
        }
        self.redraw()?;
        Ok(())
    }

    pub fn on_input(&mut self, event: InputEvent) -> Result<(), DashboardError> {
        if self.state == ControllerState::Terminated {
            return Ok(());
        }
        if event.is_quit() {
            tracing::info!(?event, "quit requested");
            return self.terminate();
        }
        match event {
            InputEvent::Resize(..) => self.redraw()?,
            InputEvent::Lost(reason) => return Err(DashboardError::InputLost(reason)),
            InputEvent::Key(_) | InputEvent::Terminate => {}
        }
        Ok(())
    }

    /// Drives the dashboard until a quit event arrives.
    ///
    /// Snapshots and input are merged here, one at a time. If the sampler goes away the
    /// last snapshot stays on screen and only input is awaited.
    pub async fn run(
        &mut self,
        mut snapshots: SnapshotReceiver,
        mut input: mpsc::Receiver<InputEvent>,
    ) -> Result<(), DashboardError> {
        self.start()?;
        let mut sampler_alive = true;

        while self.state != ControllerState::Terminated {
            tokio::select! {
                changed = snapshots.changed(), if sampler_alive => match changed {
                    Ok(()) => {
                        let latest = snapshots.borrow_and_update().clone();
                        if let Some(snapshot) = latest {
                            self.on_snapshot(snapshot)?;
                        }
                    }
                    Err(_) => {
                        tracing::warn!("sampler stopped; no further updates");
                        sampler_alive = false;
                    }
                },
                event = input.recv() => match event {
                    Some(event) => self.on_input(event)?,
                    None => return Err(DashboardError::InputLost("input channel closed".into())),
                },
            }
        }
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), DashboardError> {
        self.transition(ControllerState::Terminated);
        self.terminal.clear()?;
        self.terminal.show_cursor()?;
        Ok(())
    }

    fn redraw(&mut self) -> io::Result<()> {
        let view = render(&self.display);
        self.terminal.draw(|f| draw(f, &view, &self.theme))?;
        Ok(())
    }

    fn transition(&mut self, next: ControllerState) {
        tracing::debug!(from = ?self.state, to = ?next, "dashboard state");
        self.state = next;
    }
}
