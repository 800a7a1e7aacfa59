//! Ranking module.
//! Turns census rows into the target list: Euclidean distance to the home
//! coordinate, one village per player (their closest), sorted closest
//! first, each with the rally-point URL to open.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::census::Village;
use crate::config::Config;

/// One persisted target row. Field order is the CSV column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u64,
    pub name: String,
    pub x: i64,
    pub y: i64,
    pub player: u64,
    pub points: u64,
    pub rank: u64,
    pub distance: f64,
    pub url_to_open: String,
    pub opened: bool,
}

/// URL of the place screen with five spies preselected.
pub fn place_url(world: u32, x: i64, y: i64, config: &Config) -> String {
    format!(
        "https://{}{}.{}/game.php?screen=place&x={}&y={}&spy=5",
        config.country, world, config.country_url, x, y
    )
}

/// Keeps each player's closest village and sorts by distance.
///
/// A player's equal-distance villages resolve to the earlier feed row (the
/// scan only replaces on strictly smaller distance). Feed order itself is
/// not stable across downloads, so re-fetching can pick a different winner.
pub fn rank(
    villages: Vec<Village>,
    home_x: i64,
    home_y: i64,
    world: u32,
    config: &Config,
) -> Vec<Target> {
    let mut closest: Vec<(f64, Village)> = Vec::new();
    let mut slot_by_player: HashMap<u64, usize> = HashMap::new();

    for village in villages {
        let dist = distance(village.x, village.y, home_x, home_y);
        match slot_by_player.get(&village.player) {
            Some(&slot) => {
                if dist < closest[slot].0 {
                    closest[slot] = (dist, village);
                }
            }
            None => {
                slot_by_player.insert(village.player, closest.len());
                closest.push((dist, village));
            }
        }
    }

    closest.sort_by(|a, b| a.0.total_cmp(&b.0));

    closest
        .into_iter()
        .map(|(dist, village)| Target {
            id: village.id,
            name: village.name,
            x: village.x,
            y: village.y,
            player: village.player,
            points: village.points,
            rank: village.rank,
            distance: dist,
            url_to_open: place_url(world, village.x, village.y, config),
            opened: false,
        })
        .collect()
}

fn distance(x: i64, y: i64, home_x: i64, home_y: i64) -> f64 {
    let dx = (x - home_x) as f64;
    let dy = (y - home_y) as f64;
    (dx * dx + dy * dy).sqrt()
}
