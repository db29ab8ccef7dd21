//! Append-only score log. One record per logged dart; the header row is
//! written once when the sink file is newly created.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use dartvision_board::Dart;
use serde::Serialize;
use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, Serialize)]
pub struct DartRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub game_id: Uuid,
    pub player_name: String,
    pub base: i32,
    pub multiplier: u8,
    pub loc_x: f32,
    pub loc_y: f32,
    pub correctly_detected: Option<bool>,
}

impl DartRecord {
    pub fn new(game_id: Uuid, player_name: &str, dart: &Dart) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            game_id,
            player_name: player_name.to_string(),
            base: dart.base,
            multiplier: dart.multiplier,
            loc_x: dart.location.x,
            loc_y: dart.location.y,
            correctly_detected: dart.correctly_detected,
        }
    }
}

/// Where logged darts end up. A dart that fails to log must be surfaced to
/// the caller, never silently dropped.
pub trait ScoreSink {
    fn append(&mut self, record: &DartRecord) -> Result<(), SinkError>;
}

pub struct CsvScoreLog {
    path: PathBuf,
}

impl CsvScoreLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

const HEADER: &str = "id,date,game_id,player_name,base,multiplier,loc_x,loc_y,correctly_detected";

impl ScoreSink for CsvScoreLog {
    fn append(&mut self, record: &DartRecord) -> Result<(), SinkError> {
        let write_header = !self.path.exists();

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if write_header {
            writeln!(file, "{HEADER}")?;
        }

        let detected = match record.correctly_detected {
            Some(true) => "true",
            Some(false) => "false",
            None => "",
        };
        writeln!(
            file,
            "{},{},{},{},{},{},{},{},{}",
            record.id,
            record.timestamp.to_rfc3339(),
            record.game_id,
            record.player_name,
            record.base,
            record.multiplier,
            record.loc_x,
            record.loc_y,
            detected
        )?;
        Ok(())
    }
}
