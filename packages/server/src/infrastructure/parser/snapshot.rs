//! Server list document to [`Snapshot`].
//!
//! Elements are addressed by position, not by tag name:
//! the root's first element child is the server list, each of its children is a server,
//! whose first child carries the server attributes and whose optional second child holds
//! the roster.

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use roxmltree::{Document, Node};

use super::{AttributeError, convert, elements, required, required_parsed};
use crate::domain::{CountryCode, Player, Server, ServerId, Snapshot, SnapshotError, Username};

/// Parse a server list document.
///
/// A malformed required field rejects the whole document. Problems local to one server or
/// player are logged and skipped: a bad server or player country is dropped, a player with
/// an invalid username is left out and a repeated username keeps its first entry.
pub fn parse_snapshot(xml: &str, fetched_at: DateTime<Utc>) -> Result<Snapshot, SnapshotError> {
    let doc = Document::parse(xml).map_err(|e| SnapshotError::Document(e.to_string()))?;
    let list = elements(doc.root_element())
        .next()
        .ok_or_else(|| SnapshotError::MissingElement {
            path: "servers".to_string(),
        })?;

    let servers = elements(list)
        .enumerate()
        .map(|(index, node)| parse_server(node, index))
        .collect::<Result<Vec<_>, _>>()?;

    Snapshot::new(servers, fetched_at)
}

fn parse_server(node: Node<'_, '_>, index: usize) -> Result<Server, SnapshotError> {
    let path = format!("servers/server[{index}]");
    let mut children = elements(node);

    let info = children.next().ok_or_else(|| SnapshotError::MissingElement {
        path: format!("{path}/server-info"),
    })?;
    let info_path = format!("{path}/server-info");
    let at = |e: AttributeError| e.at(&info_path);

    let id = ServerId::new(required_parsed(info, "id").map_err(at)?);
    let name = required(info, "name").map_err(at)?.to_string();
    let country_code = match CountryCode::new(info.attribute("country_code").unwrap_or_default()) {
        Ok(code) => Some(code),
        Err(e) => {
            tracing::warn!("Ignoring country of server {} at {}: {}", id, info_path, e);
            None
        }
    };
    let current_track = info.attribute("current_track").unwrap_or_default().to_string();
    let current_players = required_parsed(info, "current_players").map_err(at)?;
    let max_players = required_parsed(info, "max_players").map_err(at)?;
    let game_mode = required_parsed(info, "game_mode").map_err(at)?;
    let difficulty = required_parsed(info, "difficulty").map_err(at)?;
    let password_protected = required(info, "password")
        .and_then(|raw| convert("password", raw, parse_flag))
        .map_err(at)?;
    let ip = Ipv4Addr::from(required_parsed::<u32>(info, "ip").map_err(at)?);
    let port = required_parsed(info, "port").map_err(at)?;

    let players = match children.next() {
        Some(roster) => parse_roster(roster, &path)?,
        None => Vec::new(),
    };

    Ok(Server {
        id,
        name,
        country_code,
        current_track,
        current_players,
        max_players,
        game_mode,
        difficulty,
        password_protected,
        ip,
        port,
        players,
    })
}

/// Players in roster order. Invalid usernames are skipped and a repeated username keeps
/// its first entry.
fn parse_roster(roster: Node<'_, '_>, server_path: &str) -> Result<Vec<Player>, SnapshotError> {
    let mut players: Vec<Player> = Vec::new();
    for (i, node) in elements(roster).enumerate() {
        let path = format!("{server_path}/players/player-info[{i}]");
        let Some(player) = parse_player(node, &path)? else {
            continue;
        };
        if players.iter().any(|p| p.username == player.username) {
            tracing::warn!("Ignoring repeated player {} at {}", player.username, path);
            continue;
        }
        players.push(player);
    }
    Ok(players)
}

/// `Ok(None)` when the username is present but not a valid username
fn parse_player(node: Node<'_, '_>, path: &str) -> Result<Option<Player>, SnapshotError> {
    let raw = required(node, "username").map_err(|e| e.at(path))?;
    let username = match Username::new(raw.to_string()) {
        Ok(username) => username,
        Err(e) => {
            tracing::warn!("Ignoring player at {}: {}", path, e);
            return Ok(None);
        }
    };
    let user_id = required_parsed(node, "user-id").map_err(|e| e.at(path))?;

    let country_code = node
        .attribute("country-code")
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| match CountryCode::new(raw) {
            Ok(code) => Some(code),
            Err(e) => {
                tracing::warn!("Ignoring country of {} at {}: {}", username, path, e);
                None
            }
        });

    Ok(Some(Player::new(username, user_id, country_code)))
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim() {
        "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        other => Err(format!("expected a boolean flag, got {other:?}")),
    }
}
