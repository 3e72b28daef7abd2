//! Save games and statistics export

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::session::GameSession;
use super::state::{GameState, GameStats};

/// Current save format
pub const SAVE_VERSION: u32 = 1;

#[derive(Serialize)]
struct SaveFileRef<'a> {
    version: u32,
    saved_at: NaiveDateTime,
    session: &'a GameSession,
}

#[derive(Deserialize)]
struct SaveFile {
    version: u32,
    session: GameSession,
}

#[derive(Deserialize)]
struct SaveHeader {
    version: u32,
}

pub fn save_game(session: &GameSession, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = SaveFileRef {
        version: SAVE_VERSION,
        saved_at: Local::now().naive_local(),
        session,
    };
    let content = serde_json::to_string_pretty(&file)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Saved game to: {}", path.display());
    Ok(())
}

pub fn load_game(path: &Path) -> Result<GameSession> {
    if !path.exists() {
        bail!("No save file at {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let header: SaveHeader = serde_json::from_str(&content).context("Save file is damaged")?;
    if header.version > SAVE_VERSION {
        bail!(
            "Save file version {} is newer than this game supports ({})",
            header.version,
            SAVE_VERSION
        );
    }

    let file: SaveFile = serde_json::from_str(&content).context("Save file is damaged")?;
    tracing::info!(
        "Loaded save version {} from: {}",
        file.version,
        path.display()
    );
    Ok(file.session)
}

#[derive(Serialize)]
struct StatsExport<'a> {
    game_state: &'a GameState,
    export_time: NaiveDateTime,
    statistics: &'a GameStats,
}

/// Write the player state and statistics as JSON
pub fn export_statistics(state: &GameState, path: &Path) -> Result<()> {
    let export = StatsExport {
        game_state: state,
        export_time: Local::now().naive_local(),
        statistics: &state.stats,
    };
    let content = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Exported statistics to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("delivery-sim-save-{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_save_and_load() {
        let dir = temp_dir("round-trip");
        let path = dir.join("savegame.json");
        let mut session = GameSession::with_seed("Saver", 1);
        session.state.finances.delivery_coins = 321.5;
        session.state.stats.complaints = 2;
        let id = session.board.available()[0].order_id.clone();
        session.accept_order(&id).unwrap();

        save_game(&session, &path).unwrap();
        let loaded = load_game(&path).unwrap();
        assert_eq!(loaded.state, session.state);
        assert_eq!(loaded.board.active().len(), 1);
        assert_eq!(loaded.clock.day(), 1);
        assert_eq!(loaded.messages().len(), session.messages().len());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_save() {
        let dir = temp_dir("missing");
        let err = load_game(&dir.join("savegame.json")).unwrap_err();
        assert!(err.to_string().contains("No save file"));
    }

    #[test]
    fn test_newer_version_refused() {
        let dir = temp_dir("newer");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("savegame.json");
        std::fs::write(&path, r#"{ "version": 99, "session": {} }"#).unwrap();
        let err = load_game(&path).unwrap_err();
        assert!(err.to_string().contains("newer"));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_export_statistics() {
        let dir = temp_dir("export");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("stats.json");
        let mut state = GameState::new("Exporter");
        state.stats.successful_deliveries = 7;
        export_statistics(&state, &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["statistics"]["successful_deliveries"], 7);
        assert_eq!(value["game_state"]["player_name"], "Exporter");
        assert!(value["export_time"].is_string());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
