//! Interactive relay client.
//!
//! Joins a room on a Kokuban relay and broadcasts every line typed at the
//! prompt to the other members. Reconnects automatically after drops.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kokuban-client -- --room-id room-42 --user-id u1 --user-name Alice
//! cargo run --bin kokuban-client -- -r room-42 -i u2 -n Bob --url ws://127.0.0.1:3000/ws
//! ```

use std::time::Duration;

use chrono::Local;
use clap::Parser;
use kokuban_client::{
    ConnectionStatus, ReconnectPolicy, RelayCallbacks, RelayClient, RelayClientConfig,
    formatter::MessageFormatter,
    ui::{parse_payload, redisplay_prompt},
};
use kokuban_shared::logger::setup_logger;
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(name = "kokuban-client")]
#[command(about = "Interactive client for the Kokuban room relay", long_about = None)]
struct Args {
    /// Relay WebSocket URL
    #[arg(short = 'u', long, env = "RELAY_URL", default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Room to join
    #[arg(short = 'r', long)]
    room_id: String,

    /// User identifier sent with every broadcast
    #[arg(short = 'i', long)]
    user_id: String,

    /// Display name shown to the other members
    #[arg(short = 'n', long)]
    user_name: String,

    /// Seconds to wait before reconnecting
    #[arg(long, default_value = "3")]
    reconnect_secs: u64,
}

fn build_callbacks(user_name: &str) -> RelayCallbacks {
    let prompt_on_joined = user_name.to_string();
    let prompt_on_message = user_name.to_string();
    let prompt_on_user_joined = user_name.to_string();
    let prompt_on_user_left = user_name.to_string();

    RelayCallbacks::new()
        .on_joined(move |room_id, participants| {
            print!("{}", MessageFormatter::format_room_joined(room_id, participants));
            redisplay_prompt(&prompt_on_joined);
        })
        .on_message(move |data, _user_id, from| {
            print!(
                "{}",
                MessageFormatter::format_broadcast(from, &data, Local::now())
            );
            redisplay_prompt(&prompt_on_message);
        })
        .on_user_joined(move |_user_id, name, participants| {
            print!(
                "{}",
                MessageFormatter::format_user_joined(name, participants, Local::now())
            );
            redisplay_prompt(&prompt_on_user_joined);
        })
        .on_user_left(move |_user_id, name, participants| {
            print!(
                "{}",
                MessageFormatter::format_user_left(name, participants, Local::now())
            );
            redisplay_prompt(&prompt_on_user_left);
        })
}

/// Spawn a blocking thread for rustyline (synchronous readline)
fn spawn_readline(user_name: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", user_name);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = RelayClientConfig::new(&args.url, &args.room_id, &args.user_id, &args.user_name)
        .with_reconnect_policy(ReconnectPolicy::Fixed(Duration::from_secs(
            args.reconnect_secs,
        )));
    let client = RelayClient::start(config, build_callbacks(&args.user_name));

    println!(
        "\nYou are '{}' in room '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
        args.user_name, args.room_id
    );

    // Print connection status changes
    let mut state = client.subscribe();
    let user_name_for_status = args.user_name.clone();
    let status_task = tokio::spawn(async move {
        let mut last_status: Option<ConnectionStatus> = None;
        while state.changed().await.is_ok() {
            let status = state.borrow_and_update().status;
            if last_status != Some(status) {
                last_status = Some(status);
                print!("{}", MessageFormatter::format_status(status));
                redisplay_prompt(&user_name_for_status);
            }
        }
    });

    let mut input_rx = spawn_readline(args.user_name.clone());
    while let Some(line) = input_rx.recv().await {
        if client.broadcast(parse_payload(&line)) {
            print!("{}", MessageFormatter::format_sent_confirmation(Local::now()));
        } else {
            print!("{}", MessageFormatter::format_not_connected());
        }
    }

    status_task.abort();
    client.shutdown().await;
    tracing::info!("Client stopped");
}
