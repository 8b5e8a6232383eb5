pub mod estimator;
pub mod protocol;
pub mod session;
pub mod tracker;
pub mod types;

use anyhow::Result;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use protocol::FeedParser;
use session::{ExerciseSession, SessionConfig};
use types::{MotionReading, RepResult};

/// Commands forwarded to the feed task.
enum SessionCommand {
    Reset,
    Configure(SessionConfig),
}

/// Client for a wearable streaming the text sample feed over TCP.
///
/// Owns a background task that decodes the feed and drives one
/// [`ExerciseSession`]. The latest reading is published through a watch
/// channel; repetition results queue up in completion order.
pub struct SensorClient {
    reading_rx: watch::Receiver<MotionReading>,
    rep_rx: mpsc::UnboundedReceiver<RepResult>,
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    _task: JoinHandle<()>,
}

impl SensorClient {
    /// Connect to the sensor's feed endpoint and start processing.
    pub async fn connect(endpoint: &str, config: SessionConfig) -> Result<Self> {
        let session = ExerciseSession::new(config)?;

        info!(%endpoint, "Connecting to motion sensor");
        let stream = TcpStream::connect(endpoint).await?;
        info!("Connected to motion sensor");

        let (reading_tx, reading_rx) = watch::channel(MotionReading::default());
        let (rep_tx, rep_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(feed_loop(stream, session, reading_tx, rep_tx, command_rx));

        Ok(Self {
            reading_rx,
            rep_rx,
            command_tx,
            _task: task,
        })
    }

    /// Create a client with no sensor attached, for development without
    /// the wearable. It publishes nothing and completes no repetitions.
    pub fn mock() -> Self {
        info!("Creating mock sensor client");
        let (reading_tx, reading_rx) = watch::channel(MotionReading::default());
        let (rep_tx, rep_rx) = mpsc::unbounded_channel();
        let (command_tx, _command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            // Hold the senders so the receivers stay open.
            let _channels = (reading_tx, rep_tx);
            let _ = tokio::signal::ctrl_c().await;
        });

        Self {
            reading_rx,
            rep_rx,
            command_tx,
            _task: task,
        }
    }

    /// Watch handle onto the latest angle/momentum reading, for display
    /// loops that poll independently of repetition events.
    pub fn readings(&self) -> watch::Receiver<MotionReading> {
        self.reading_rx.clone()
    }

    /// Next completed repetition, in completion order. Resolves to `None`
    /// once the feed task has shut down.
    pub async fn next_rep(&mut self) -> Option<RepResult> {
        self.rep_rx.recv().await
    }

    /// Abandon any repetition in flight and restart the session state.
    pub fn reset(&self) {
        let _ = self.command_tx.send(SessionCommand::Reset);
    }

    /// Swap in new thresholds and smoothing, effective from the next
    /// frame. Invalid combinations are rejected inside the feed task and
    /// logged; the previous configuration stays active.
    pub fn configure(&self, config: SessionConfig) {
        let _ = self.command_tx.send(SessionCommand::Configure(config));
    }
}

/// Background task: read the socket, decode the feed, run the session.
async fn feed_loop(
    mut stream: TcpStream,
    mut session: ExerciseSession,
    reading_tx: watch::Sender<MotionReading>,
    rep_tx: mpsc::UnboundedSender<RepResult>,
    mut command_rx: mpsc::UnboundedReceiver<SessionCommand>,
) {
    let mut parser = FeedParser::new();
    let mut buf = [0u8; 4096];
    let mut frame_count: u64 = 0;

    loop {
        tokio::select! {
            result = stream.read(&mut buf) => {
                match result {
                    Ok(0) => {
                        warn!("Sensor connection closed");
                        break;
                    }
                    Ok(n) => {
                        parser.push_data(&buf[..n]);

                        while let Some(decoded) = parser.next_frame() {
                            let frame = match decoded {
                                Ok(frame) => frame,
                                Err(e) => {
                                    trace!(?e, "Skipping undecodable feed line");
                                    continue;
                                }
                            };

                            match session.update(&frame) {
                                Ok(tick) => {
                                    let _ = reading_tx.send(tick.reading);
                                    if let Some(rep) = tick.rep {
                                        if rep_tx.send(rep).is_err() {
                                            debug!("Rep receiver dropped, stopping feed task");
                                            return;
                                        }
                                    }
                                }
                                Err(e) => {
                                    warn!(?e, "Dropping invalid sample frame");
                                }
                            }

                            frame_count += 1;
                            if frame_count % 1000 == 0 {
                                debug!(frame_count, "Feed frames processed");
                            }
                        }
                    }
                    Err(e) => {
                        error!(?e, "Sensor read error");
                        break;
                    }
                }
            }
            Some(command) = command_rx.recv() => {
                match command {
                    SessionCommand::Reset => {
                        info!("Session reset");
                        session.reset();
                    }
                    SessionCommand::Configure(config) => {
                        match session.configure(config) {
                            Ok(()) => info!("Session reconfigured"),
                            Err(e) => warn!(?e, "Rejected session reconfiguration"),
                        }
                    }
                }
            }
        }
    }
}
