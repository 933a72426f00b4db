//! Load test for the session server.
//!
//! Spawns multiple fake WebSocket clients that:
//! - Connect, join a room, and spawn one entity each
//! - Periodically send position updates for their entity
//! - Receive and count room broadcasts
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]
//!
//! Options:
//!   --clients N      Number of clients to spawn (default: 100)
//!   --rooms N        Number of rooms to spread clients across (default: 10)
//!   --duration S     Test duration in seconds (default: 30)
//!   --update-rate R  Entity updates per second per client (default: 10)
//!   --url URL        Server URL (default: ws://127.0.0.1:9001/session)

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

// === Protocol types (minimal subset) ===

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome { entities: Vec<serde_json::Value> },
    #[serde(rename = "entity_spawned")]
    EntitySpawned {},
    #[serde(rename = "entity_updated")]
    EntityUpdated {},
    #[serde(rename = "entity_removed")]
    EntityRemoved {},
}

// === Metrics ===

struct Metrics {
    connected: AtomicU64,
    messages_received: AtomicU64,
    spawns_seen: AtomicU64,
    updates_seen: AtomicU64,
    removes_seen: AtomicU64,
    updates_sent: AtomicU64,
    errors: AtomicU64,
    welcome_entities_seen: AtomicU64,
    welcomes_received: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

impl Metrics {
    fn new() -> Self {
        Self {
            connected: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            spawns_seen: AtomicU64::new(0),
            updates_seen: AtomicU64::new(0),
            removes_seen: AtomicU64::new(0),
            updates_sent: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            welcome_entities_seen: AtomicU64::new(0),
            welcomes_received: AtomicU64::new(0),
            latency_sum_ms: AtomicU64::new(0),
            latency_count: AtomicU64::new(0),
        }
    }
}

// === Client task ===

async fn run_client(
    client_id: u32,
    room_id: String,
    url: String,
    update_rate: f64,
    duration: Duration,
    metrics: Arc<Metrics>,
) {
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if client_id < 5 {
                eprintln!("Client {} failed to connect: {}", client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    let connect_latency = connect_start.elapsed();
    metrics
        .latency_sum_ms
        .fetch_add(connect_latency.as_millis() as u64, Ordering::Relaxed);
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    let join = format!(
        r#"{{"type":"join","roomId":"{}","clientId":"load_{}"}}"#,
        room_id, client_id
    );
    if ws.send(Message::Text(join.into())).await.is_err() {
        metrics.errors.fetch_add(1, Ordering::Relaxed);
        metrics.connected.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    // Wait for the welcome snapshot before doing anything else
    let got_welcome = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(msg) = ws.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                    if let Ok(ServerMsg::Welcome { entities }) =
                        serde_json::from_str::<ServerMsg>(&text)
                    {
                        metrics.welcomes_received.fetch_add(1, Ordering::Relaxed);
                        metrics
                            .welcome_entities_seen
                            .fetch_add(entities.len() as u64, Ordering::Relaxed);
                        return true;
                    }
                }
                Ok(Message::Close(_)) | Err(_) => return false,
                _ => {}
            }
        }
        false
    })
    .await;

    if !matches!(got_welcome, Ok(true)) {
        if client_id < 3 {
            eprintln!("Client {} never got a welcome", client_id);
        }
        metrics.errors.fetch_add(1, Ordering::Relaxed);
        metrics.connected.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    let entity_id = format!("load_crate_{}", client_id);
    let spawn = format!(
        r#"{{"type":"spawn_entity","roomId":"{}","entity":{{"entityId":"{}","assetId":"crate","transform":{{"position":{{"x":0.0,"y":1.0,"z":0.0}},"rotation":{{"x":0.0,"y":0.0,"z":0.0}},"scale":{{"x":1.0,"y":1.0,"z":1.0}}}}}}}}"#,
        room_id, entity_id
    );
    if ws.send(Message::Text(spawn.into())).await.is_err() {
        metrics.errors.fetch_add(1, Ordering::Relaxed);
        metrics.connected.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    let update_interval = if update_rate > 0.0 {
        Duration::from_secs_f64(1.0 / update_rate)
    } else {
        Duration::from_secs(3600) // Effectively never
    };

    let mut update_timer = tokio::time::interval(update_interval);
    update_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let test_end = Instant::now() + duration;
    let mut rng_state: u64 = client_id as u64 * 12345 + 67890;

    loop {
        if Instant::now() >= test_end {
            break;
        }

        tokio::select! {
            _ = update_timer.tick() => {
                // Simple LCG for random positions
                rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
                let x = ((rng_state >> 32) as f64 / u32::MAX as f64) * 20.0 - 10.0;
                let z = ((rng_state >> 16) as f64 / u32::MAX as f64) * 20.0 - 10.0;

                let update = format!(
                    r#"{{"type":"update_entity","roomId":"{}","entityId":"{}","transform":{{"position":{{"x":{:.2},"y":1.0,"z":{:.2}}}}}}}"#,
                    room_id, entity_id, x, z
                );
                if ws.send(Message::Text(update.into())).await.is_ok() {
                    metrics.updates_sent.fetch_add(1, Ordering::Relaxed);
                } else {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        if let Ok(server_msg) = serde_json::from_str::<ServerMsg>(&text) {
                            match server_msg {
                                ServerMsg::EntitySpawned {} => {
                                    metrics.spawns_seen.fetch_add(1, Ordering::Relaxed);
                                }
                                ServerMsg::EntityUpdated {} => {
                                    metrics.updates_seen.fetch_add(1, Ordering::Relaxed);
                                }
                                ServerMsg::EntityRemoved {} => {
                                    metrics.removes_seen.fetch_add(1, Ordering::Relaxed);
                                }
                                _ => {}
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        if client_id < 3 {
                            eprintln!("Client {} error: {}", client_id, e);
                        }
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(_) => {}
                }
            }
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut num_clients: u32 = 100;
    let mut num_rooms: u32 = 10;
    let mut duration_secs: u64 = 30;
    let mut update_rate: f64 = 10.0;
    let mut url = "ws://127.0.0.1:9001/session".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" => {
                i += 1;
                num_clients = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(100);
            }
            "--rooms" => {
                i += 1;
                num_rooms = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(10);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            "--update-rate" => {
                i += 1;
                update_rate = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(10.0);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            _ => {}
        }
        i += 1;
    }

    println!("=== Session Server Load Test ===");
    println!("Clients: {}", num_clients);
    println!("Rooms: {}", num_rooms);
    println!("Duration: {}s", duration_secs);
    println!("Update rate: {}/s per client", update_rate);
    println!("URL: {}", url);
    println!();

    let metrics = Arc::new(Metrics::new());
    let duration = Duration::from_secs(duration_secs);

    // Spawn all clients
    let mut handles = Vec::with_capacity(num_clients as usize);

    println!("Spawning {} clients...", num_clients);
    let spawn_start = Instant::now();

    for client_id in 0..num_clients {
        let url = url.clone();
        let room_id = format!("load_room_{}", client_id % num_rooms.max(1));
        let metrics = Arc::clone(&metrics);

        handles.push(tokio::spawn(async move {
            run_client(client_id, room_id, url, update_rate, duration, metrics).await;
        }));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    println!("All clients spawned in {:?}", spawn_start.elapsed());
    println!();

    // Print stats periodically
    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();

        loop {
            interval.tick().await;
            let elapsed = start.elapsed().as_secs();
            if elapsed >= duration_secs + 5 {
                break;
            }

            let connected = metrics_clone.connected.load(Ordering::Relaxed);
            let msgs = metrics_clone.messages_received.load(Ordering::Relaxed);
            let spawns = metrics_clone.spawns_seen.load(Ordering::Relaxed);
            let updates = metrics_clone.updates_seen.load(Ordering::Relaxed);
            let sent = metrics_clone.updates_sent.load(Ordering::Relaxed);
            let errors = metrics_clone.errors.load(Ordering::Relaxed);

            println!(
                "[{:3}s] connected={}, msgs={}, spawns={}, updates={}, sent={}, errors={}",
                elapsed, connected, msgs, spawns, updates, sent, errors
            );
        }
    });

    // Wait for all clients to finish
    for handle in handles {
        let _ = handle.await;
    }

    stats_handle.abort();

    // Final stats
    println!();
    println!("=== Final Results ===");
    let msgs = metrics.messages_received.load(Ordering::Relaxed);
    let spawns = metrics.spawns_seen.load(Ordering::Relaxed);
    let updates = metrics.updates_seen.load(Ordering::Relaxed);
    let removes = metrics.removes_seen.load(Ordering::Relaxed);
    let sent = metrics.updates_sent.load(Ordering::Relaxed);
    let errors = metrics.errors.load(Ordering::Relaxed);
    let welcomes = metrics.welcomes_received.load(Ordering::Relaxed);
    let welcome_entities = metrics.welcome_entities_seen.load(Ordering::Relaxed);
    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);

    println!("Total messages received: {}", msgs);
    println!("Total entity_spawned messages: {}", spawns);
    println!("Total entity_updated messages: {}", updates);
    println!("Total entity_removed messages: {}", removes);
    println!("Total updates sent: {}", sent);
    println!("Total errors: {}", errors);
    println!(
        "Average welcome snapshot size: {}",
        if welcomes > 0 {
            welcome_entities / welcomes
        } else {
            0
        }
    );

    if latency_count > 0 {
        println!("Average connect latency: {}ms", latency_sum / latency_count);
    }

    let msgs_per_sec = msgs as f64 / duration_secs as f64;
    let updates_per_client = updates as f64 / num_clients as f64;

    println!();
    println!("Messages/sec (total): {:.0}", msgs_per_sec);
    println!("entity_updated per client: {:.0}", updates_per_client);
}
