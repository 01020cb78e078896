use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;
use volley_shared::frame::Frame;
use volley_shared::protocol::{ClientMsg, WelcomeMsg, PROTOCOL_VERSION};
use volley_shared::roster::ROSTER;
use volley_shared::rotation::{AnimationState, FormationState};
use volley_shared::table::PositionTable;

use crate::config::ServerConfig;
use crate::machine::{run_until, RotationStateMachine};
use crate::render::BroadcastRenderer;

/// Commands from connections and in-process callers to the loop task
pub enum LoopCommand {
    Join {
        response: oneshot::Sender<WelcomeMsg>,
    },
    Control {
        msg: ClientMsg,
        response: oneshot::Sender<AnimationState>,
    },
    Snapshot {
        response: oneshot::Sender<AnimationState>,
    },
}

/// Control surface of a running loop task.
#[derive(Clone)]
pub struct LoopHandle {
    tx: mpsc::Sender<LoopCommand>,
}

impl LoopHandle {
    pub fn new(tx: mpsc::Sender<LoopCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> LoopCommand,
    ) -> Result<T, String> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx
            .send(make(resp_tx))
            .await
            .map_err(|_| "animation loop has stopped".to_string())?;
        resp_rx
            .await
            .map_err(|_| "animation loop dropped the request".to_string())
    }

    pub async fn join(&self) -> Result<WelcomeMsg, String> {
        self.request(|response| LoopCommand::Join { response }).await
    }

    pub async fn control(&self, msg: ClientMsg) -> Result<AnimationState, String> {
        self.request(|response| LoopCommand::Control { msg, response })
            .await
    }

    pub async fn next(&self) -> Result<AnimationState, String> {
        self.control(ClientMsg::Next).await
    }

    pub async fn prev(&self) -> Result<AnimationState, String> {
        self.control(ClientMsg::Prev).await
    }

    pub async fn go_to(
        &self,
        rotation: i64,
        formation: FormationState,
    ) -> Result<AnimationState, String> {
        self.control(ClientMsg::GoTo {
            rotation,
            formation,
        })
        .await
    }

    pub async fn toggle_play(&self) -> Result<AnimationState, String> {
        self.control(ClientMsg::TogglePlay).await
    }

    pub async fn snapshot(&self) -> Result<AnimationState, String> {
        self.request(|response| LoopCommand::Snapshot { response })
            .await
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Run the animation loop. Owns the state machine; ends when every
/// [`LoopHandle`] is dropped.
pub async fn run_animation_loop(
    mut cmd_rx: mpsc::Receiver<LoopCommand>,
    frame_tx: broadcast::Sender<Frame>,
    config: ServerConfig,
) {
    let mut machine = RotationStateMachine::new(PositionTable::standard(), config.animation);
    let mut renderer = BroadcastRenderer::new(frame_tx);
    let start = Instant::now();
    machine.render_if_dirty(&mut renderer);

    loop {
        let deadline = machine
            .next_deadline_ms()
            .map(|ms| start + Duration::from_millis(ms));

        tokio::select! {
            _ = sleep_until_deadline(deadline) => {
                run_until(&mut machine, elapsed_ms(start), &mut renderer);
            }

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                // Timers that came due first take effect before the command.
                run_until(&mut machine, elapsed_ms(start), &mut renderer);
                match cmd {
                    LoopCommand::Join { response } => {
                        let welcome = WelcomeMsg {
                            protocol_version: PROTOCOL_VERSION,
                            server_version: env!("CARGO_PKG_VERSION").to_string(),
                            roster: ROSTER.to_vec(),
                            table: machine.table().clone(),
                            config: *machine.config(),
                            frame: machine.frame(),
                        };
                        let _ = response.send(welcome);
                    }
                    LoopCommand::Control { msg, response } => {
                        let state = machine.apply(&msg);
                        machine.render_if_dirty(&mut renderer);
                        let _ = response.send(state);
                    }
                    LoopCommand::Snapshot { response } => {
                        let _ = response.send(machine.state());
                    }
                }
            }
        }
    }

    machine.shutdown();
    tracing::info!("Animation loop ended");
}
