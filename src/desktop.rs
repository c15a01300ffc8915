//! Desktop host - Tauri commands for frontend communication

use std::sync::Mutex;

use tauri::State;

use crate::game_server::{Command, Direction, GameServer, ServerStats, SessionSnapshot};

/// Start or restart a race, optionally overriding track length and duration
#[tauri::command]
fn start_race(
    server: State<'_, Mutex<GameServer>>,
    track_length: Option<f32>,
    race_seconds: Option<u32>,
) -> Result<SessionSnapshot, String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.configure(track_length, race_seconds)?;
    server.start_race();
    Ok(server.get_snapshot())
}

/// Continue after a win
#[tauri::command]
fn next_level(server: State<'_, Mutex<GameServer>>) -> Result<SessionSnapshot, String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.next_level()?;
    Ok(server.get_snapshot())
}

/// Forward a keydown event's `key`
#[tauri::command]
fn handle_key(server: State<'_, Mutex<GameServer>>, key: String) -> Result<bool, String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    Ok(server.handle_key(&key))
}

/// Any engine command posted as JSON, e.g. `{"command":"next_level"}`
#[tauri::command]
fn send_command(
    server: State<'_, Mutex<GameServer>>,
    command: Command,
) -> Result<SessionSnapshot, String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.apply(command)?;
    Ok(server.get_snapshot())
}

/// On-screen arrow buttons
#[tauri::command]
fn steer(server: State<'_, Mutex<GameServer>>, direction: Direction) -> Result<(), String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.steer(direction);
    Ok(())
}

#[tauri::command]
fn adjust_speed(server: State<'_, Mutex<GameServer>>, delta: i8) -> Result<(), String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.adjust_speed(delta);
    Ok(())
}

/// Run all timers due since the last poll and return the current state
#[tauri::command]
fn tick(server: State<'_, Mutex<GameServer>>) -> Result<SessionSnapshot, String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    Ok(server.tick())
}

/// Get current snapshot without advancing the simulation
#[tauri::command]
fn get_snapshot(server: State<'_, Mutex<GameServer>>) -> Result<SessionSnapshot, String> {
    let server = server.lock().map_err(|e| e.to_string())?;
    Ok(server.get_snapshot())
}

#[tauri::command]
fn get_stats(server: State<'_, Mutex<GameServer>>) -> Result<ServerStats, String> {
    let server = server.lock().map_err(|e| e.to_string())?;
    Ok(server.get_stats())
}

#[tauri::command]
fn pause_race(server: State<'_, Mutex<GameServer>>) -> Result<(), String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.pause();
    log::info!("Race paused");
    Ok(())
}

#[tauri::command]
fn resume_race(server: State<'_, Mutex<GameServer>>) -> Result<(), String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.resume();
    log::info!("Race resumed");
    Ok(())
}

/// Drop back to idle; the race view was closed
#[tauri::command]
fn reset_race(server: State<'_, Mutex<GameServer>>) -> Result<(), String> {
    let mut server = server.lock().map_err(|e| e.to_string())?;
    server.reset();
    log::info!("Race reset");
    Ok(())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .manage(Mutex::new(GameServer::default()))
        .setup(|app| {
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }
            log::info!("Tech Racing game server initialized");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            start_race,
            next_level,
            handle_key,
            send_command,
            steer,
            adjust_speed,
            tick,
            get_snapshot,
            get_stats,
            pause_race,
            resume_race,
            reset_race,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
