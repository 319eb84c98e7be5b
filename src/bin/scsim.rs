use scsim::bus::{BusMessage, SoftwareBus};
use scsim::{parse_command, CommandResponse, SimConfig, SimEngine};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, Mutex};
use tokio::time;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

const TCP_PORT: u16 = 8080;
const TELEMETRY_BROADCAST_BUFFER_SIZE: usize = 256;

/// Publishes telemetry packets as JSON lines to every connected client.
/// Collaborator messages have no consumer here and are only traced.
struct BroadcastBus {
    telemetry_tx: broadcast::Sender<String>,
}

impl SoftwareBus for BroadcastBus {
    fn transmit(&mut self, topic_id: u32, msg: BusMessage) {
        match msg {
            BusMessage::MgmtTlm(_) | BusMessage::ModelTlm(_) => match serde_json::to_string(&msg) {
                Ok(line) => {
                    // No receivers is normal when nobody is connected
                    let _ = self.telemetry_tx.send(line);
                }
                Err(e) => warn!("Failed to serialize telemetry: {}", e),
            },
            other => debug!("Bus topic 0x{:04X}: {:?}", topic_id, other),
        }
    }
}

type SharedEngine = Arc<Mutex<SimEngine<BroadcastBus>>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("🛰️  Spacecraft Behavior Simulator");
    println!("=================================");

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    let tick_period = Duration::from_millis(config.tick_period_ms);

    let (telemetry_tx, _) = broadcast::channel(TELEMETRY_BROADCAST_BUFFER_SIZE);
    let bus = BroadcastBus {
        telemetry_tx: telemetry_tx.clone(),
    };
    let engine: SharedEngine = Arc::new(Mutex::new(SimEngine::new(config, bus)?));

    let tcp_engine = Arc::clone(&engine);
    let tcp_telemetry_tx = telemetry_tx.clone();
    let tcp_server = tokio::spawn(async move {
        if let Err(e) = start_tcp_server(tcp_engine, tcp_telemetry_tx).await {
            error!("TCP server error: {}", e);
        }
    });

    let mut interval = time::interval(tick_period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                let mut engine_guard = engine.lock().await;
                engine_guard.execute();
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    engine.lock().await.stop_simulation();
    tcp_server.abort();
    println!("🚀 Spacecraft simulator stopped");

    Ok(())
}

async fn start_tcp_server(
    engine: SharedEngine,
    telemetry_tx: broadcast::Sender<String>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", TCP_PORT)).await?;
    info!("🌐 TCP server listening on port {}", TCP_PORT);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("🔗 New client connected: {}", addr);
                let client_engine = Arc::clone(&engine);
                let client_telemetry_rx = telemetry_tx.subscribe();

                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, client_engine, client_telemetry_rx).await {
                        warn!("Client {} error: {}", addr, e);
                    }
                    info!("🔌 Client {} disconnected", addr);
                });
            }
            Err(e) => error!("Failed to accept connection: {}", e),
        }
    }
}

async fn handle_client(
    stream: TcpStream,
    engine: SharedEngine,
    mut telemetry_rx: broadcast::Receiver<String>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let (reader, writer) = stream.into_split();
    let mut buf_reader = BufReader::new(reader);
    let writer = Arc::new(Mutex::new(writer));

    let telemetry_writer = Arc::clone(&writer);
    let telemetry_task = tokio::spawn(async move {
        loop {
            let line = match telemetry_rx.recv().await {
                Ok(line) => line,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Client lagged, dropped {} telemetry packets", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            let mut writer_guard = telemetry_writer.lock().await;
            if let Err(e) = writer_guard.write_all(format!("{line}\n").as_bytes()).await {
                warn!("Failed to send telemetry: {}", e);
                break;
            }
        }
    });

    let mut line = String::new();
    loop {
        line.clear();
        match buf_reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let response = match parse_command(trimmed) {
                    Ok(command) => {
                        info!("📨 Received command: {:?}", command);
                        engine.lock().await.handle_command(command)
                    }
                    Err(e) => {
                        error!("Failed to parse command: {}", e);
                        CommandResponse::invalid(format!("Invalid command format: {e}"))
                    }
                };

                let response_json = serde_json::to_string(&response)?;
                {
                    let mut writer_guard = writer.lock().await;
                    writer_guard.write_all(response_json.as_bytes()).await?;
                    writer_guard.write_all(b"\n").await?;
                }
                info!("📤 Sent response: {}", response_json);
            }
            Err(e) => {
                error!("Error reading from client: {}", e);
                break;
            }
        }
    }

    telemetry_task.abort();
    Ok(())
}
