//! Target store module.
//! The CSV file at CSV_PATH is the single source of truth between runs:
//! written wholesale by the fetch pipeline and re-written by the opener
//! after every batch. Header:
//! id,name,x,y,player,points,rank,distance,url_to_open,opened

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::rank::Target;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{} not found", .path.display())]
    NotFound { path: PathBuf },
    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("store could not be read: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes all rows, replacing whatever was at `path`.
pub fn save(path: &Path, targets: &[Target]) -> Result<(), StoreError> {
    let mut writer = csv::Writer::from_path(path)?;
    for target in targets {
        writer.serialize(target)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Vec<Target>, StoreError> {
    if !path.exists() {
        return Err(StoreError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut targets = Vec::new();
    for row in reader.deserialize() {
        targets.push(row?);
    }
    Ok(targets)
}

/// What the shell's status line shows while a store exists.
#[derive(Debug, PartialEq)]
pub struct Status {
    pub remaining: usize,
    pub min_distance: Option<f64>,
}

pub fn status(targets: &[Target]) -> Status {
    let remaining = targets.iter().filter(|t| !t.opened).count();
    let min_distance = targets
        .iter()
        .filter(|t| !t.opened)
        .map(|t| t.distance)
        .min_by(|a, b| a.total_cmp(b));
    Status {
        remaining,
        min_distance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn target(id: u64, distance: f64, opened: bool) -> Target {
        Target {
            id,
            name: format!("Dorf {id}"),
            x: 500 + id as i64,
            y: 500,
            player: id,
            points: 100,
            rank: 1,
            distance,
            url_to_open: format!("https://de1.die-staemme.de/game.php?screen=place&x={}&y=500&spy=5", 500 + id),
            opened,
        }
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        let targets = vec![
            target(1, 1.5, false),
            target(2, 2.25, true),
            Target {
                name: "Dorf, mit \"Anführungszeichen\"".to_string(),
                ..target(3, 7.0710678118654755, false)
            },
        ];

        save(&path, &targets).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, targets);
    }

    #[test]
    fn test_header_row_matches_store_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        save(&path, &[target(1, 1.0, false)]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(
            header,
            "id,name,x,y,player,points,rank,distance,url_to_open,opened"
        );
        assert!(text.lines().nth(1).unwrap().ends_with("false"));
    }

    #[test]
    fn test_save_overwrites_previous_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.csv");
        save(&path, &[target(1, 1.0, true), target(2, 2.0, true)]).unwrap();
        save(&path, &[target(9, 9.0, false)]).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 9);
        assert!(!loaded[0].opened);
    }

    #[test]
    fn test_load_missing_store_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("urls.csv")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_status_counts_unopened_and_min_distance() {
        let targets = vec![
            target(1, 1.0, true),
            target(2, 2.0, false),
            target(3, 3.0, false),
        ];
        assert_eq!(
            status(&targets),
            Status {
                remaining: 2,
                min_distance: Some(2.0),
            }
        );
    }

    #[test]
    fn test_status_when_everything_is_opened() {
        let targets = vec![target(1, 1.0, true)];
        assert_eq!(
            status(&targets),
            Status {
                remaining: 0,
                min_distance: None,
            }
        );
    }
}
