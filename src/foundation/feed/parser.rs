//! Streaming parser for the community games list feed.
//!
//! The feed is an XML document with one `<game>` element per owned game:
//!
//! ```xml
//! <gamesList>
//!   <games>
//!     <game>
//!       <appID>440</appID>
//!       <name><![CDATA[Team Fortress 2]]></name>
//!       <logo><![CDATA[https://.../440/capsule_184x69.jpg]]></logo>
//!       <hoursOnRecord>1,024.5</hoursOnRecord>
//!     </game>
//!   </games>
//! </gamesList>
//! ```
//!
//! Every child element of a `<game>` becomes one entry of a [`GameRecord`],
//! keyed by tag name, holding the raw text content untrimmed.

use crate::library::SyncError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;

/// Element that opens a new record.
const GAME_TAG: &str = "game";

/// Raw field mapping of a single game, as found in the feed.
pub type GameRecord = HashMap<String, String>;

enum State {
    Idle,
    InGame,
}

/// Parses the raw feed bytes into one record per `<game>` element, in feed order.
///
/// Text and CDATA content accumulates until the closing tag of the element
/// it belongs to. Malformed documents fail with [`SyncError::ParseError`].
pub fn parse_game_feed(bytes: &[u8]) -> Result<Vec<GameRecord>, SyncError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    let mut records: Vec<GameRecord> = Vec::new();
    let mut state = State::Idle;
    let mut text = String::new();
    let mut open_tags: Vec<String> = Vec::new();
    let mut seen_root = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                seen_root = true;
                text.clear();
                if tag == GAME_TAG {
                    state = State::InGame;
                    records.push(GameRecord::new());
                }
                open_tags.push(tag);
            }
            Event::End(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match open_tags.pop() {
                    Some(open) if open == tag => {}
                    Some(open) => {
                        return Err(SyncError::ParseError(format!(
                            "mismatched tag: expected </{}>, found </{}>",
                            open, tag
                        )))
                    }
                    None => {
                        return Err(SyncError::ParseError(format!(
                            "unexpected closing tag </{}>",
                            tag
                        )))
                    }
                }

                if tag == GAME_TAG {
                    state = State::Idle;
                } else if let (State::InGame, Some(record)) = (&state, records.last_mut()) {
                    record.insert(tag, std::mem::take(&mut text));
                }
                text.clear();
            }
            Event::Empty(e) => {
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                seen_root = true;
                if let (State::InGame, Some(record)) = (&state, records.last_mut()) {
                    if tag != GAME_TAG {
                        record.insert(tag, String::new());
                    }
                }
                text.clear();
            }
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(&e.into_inner())),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(SyncError::ParseError("no element found".to_string()));
    }
    if let Some(open) = open_tags.last() {
        return Err(SyncError::ParseError(format!(
            "document ended inside <{}>",
            open
        )));
    }

    Ok(records)
}
