//! Census feed module.
//! Downloads a world's village.txt.gz, gunzips it and parses the rows.
//! The feed is WINDOWS-1252 text, headerless CSV with the fixed columns
//! id,name,x,y,player,points,rank. Village names are form-encoded (`+` is a
//! space, `%XX` escapes are Latin-1 bytes). Villages owned by player 0 are
//! barbarian villages and get dropped here, they are never spy targets.

use std::io::Read;
use std::time::Duration;

use encoding_rs::WINDOWS_1252;
use flate2::read::GzDecoder;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;

const TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("census download failed with HTTP status {status}")]
    Download { status: u16 },
    #[error("census request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("census feed could not be decoded: {0}")]
    Decode(String),
}

/// One census row, name already decoded.
#[derive(Clone, Debug, PartialEq)]
pub struct Village {
    pub id: u64,
    pub name: String,
    pub x: i64,
    pub y: i64,
    pub player: u64,
    pub points: u64,
    pub rank: u64,
}

/// Column order of the raw feed.
#[derive(Deserialize)]
struct RawRow {
    id: u64,
    name: String,
    x: i64,
    y: i64,
    player: u64,
    points: u64,
    rank: u64,
}

pub fn feed_url(world: u32, config: &Config) -> String {
    format!(
        "https://{}{}.{}/map/village.txt.gz",
        config.country, world, config.country_url
    )
}

/// Downloads and parses the census for one world. Any failure aborts the
/// whole fetch; nothing is persisted from here.
pub async fn download(world: u32, config: &Config) -> Result<Vec<Village>, FetchError> {
    let body = request_feed(&feed_url(world, config)).await?;
    parse_feed(&body)
}

async fn request_feed(url: &str) -> Result<Vec<u8>, FetchError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()?;

    let response = client.get(url).send().await?;
    let status = response.status().as_u16();
    if status != 200 {
        return Err(FetchError::Download { status });
    }

    Ok(response.bytes().await?.to_vec())
}

fn parse_feed(gz: &[u8]) -> Result<Vec<Village>, FetchError> {
    let mut raw = Vec::new();
    GzDecoder::new(gz)
        .read_to_end(&mut raw)
        .map_err(|e| FetchError::Decode(format!("gzip: {e}")))?;
    let (text, _, _) = WINDOWS_1252.decode(&raw);
    parse_rows(&text)
}

fn parse_rows(text: &str) -> Result<Vec<Village>, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(text.as_bytes());

    let mut villages = Vec::new();
    for row in reader.deserialize::<RawRow>() {
        let row = row.map_err(|e| FetchError::Decode(format!("row: {e}")))?;
        if row.player == 0 {
            continue;
        }
        villages.push(Village {
            id: row.id,
            name: decode_name(&row.name),
            x: row.x,
            y: row.y,
            player: row.player,
            points: row.points,
            rank: row.rank,
        });
    }
    Ok(villages)
}

/// `Gro%DFes+Dorf` -> `Großes Dorf`. The `%XX` escapes carry Latin-1
/// bytes, so escaped names take a second WINDOWS-1252 pass after percent
/// decoding. Names without escapes are already decoded body text and must
/// not be re-decoded.
fn decode_name(raw: &str) -> String {
    let with_spaces = raw.replace('+', " ");
    if !with_spaces.contains('%') {
        return with_spaces;
    }
    let bytes: Vec<u8> = percent_decode_str(&with_spaces).collect();
    WINDOWS_1252.decode(&bytes).0.into_owned()
}
