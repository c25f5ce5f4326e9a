//! The client's handlers and the standard router that wires them up.
//!
//! | Tag | Effect |
//! |---|---|
//! | HELO | log the lobby profile, set `in_lobby` |
//! | GO | lobby → game, reply GOK then NEXTREADY |
//! | TAIKYOKU, INIT | nothing |
//! | T (own seat) | reply with the strategy's discard |
//! | D with `t` | reply with the strategy's call decision |
//! | AGARI, RYUUKYOKU | `owari` ends the match, otherwise NEXTREADY |

use std::sync::Arc;

use percent_encoding::percent_decode_str;
use tenhou_protocol::{tags, Action, PaiTag, ProtocolError};
use tracing::{debug, info, warn};

use crate::router::{ActionRouter, HandlerResult, Outgoing};
use crate::{rank, SessionFlags, Strategy};

/// The local client's seat index.
pub const OWN_SEAT: i64 = 0;

impl ActionRouter {
    /// A router with every handler the client needs, asking `strategy` for
    /// draw and call decisions.
    pub fn standard(strategy: Arc<dyn Strategy>) -> Self {
        let on_call = Arc::clone(&strategy);
        Self::new()
            .on(tags::HELO, handle_helo)
            .on(tags::GO, handle_go)
            .on(tags::TAIKYOKU, handle_inert)
            .on(tags::INIT, handle_inert)
            .on(tags::DRAW, move |action: &Action, _: &SessionFlags| {
                handle_draw(strategy.as_ref(), action)
            })
            .on(tags::DISCARD, move |action: &Action, _: &SessionFlags| {
                handle_discard(on_call.as_ref(), action)
            })
            .on(tags::AGARI, handle_round_end)
            .on(tags::RYUUKYOKU, handle_round_end)
    }
}

/// Lobby entry acknowledged.
pub fn handle_helo(action: &Action, flags: &SessionFlags) -> HandlerResult {
    let uname = action.get_str("uname")?;
    let name = percent_decode_str(&uname).decode_utf8_lossy();

    if action.contains("PF4") {
        let profile = LobbyProfile::parse(&action.get_list("PF4")?)?;
        info!(
            user = %name,
            rank = profile.rank.name,
            points = profile.points,
            rating = profile.rating,
            "entered lobby: {name} {} {}/{} {}",
            profile.rank.name,
            profile.points,
            profile.rank.promotion,
            profile.rating,
        );
    } else {
        info!(user = %name, "entered lobby: {name}");
    }

    flags.enter_lobby();
    Ok(Vec::new())
}

/// Match found: acknowledge, then signal ready.
pub fn handle_go(_action: &Action, flags: &SessionFlags) -> HandlerResult {
    flags.enter_game();
    info!("match found");
    Ok(vec![
        Outgoing::immediate(Action::gok()),
        Outgoing::paced(Action::next_ready()),
    ])
}

/// Match and round setup. Nothing to track for the default strategy.
pub fn handle_inert(action: &Action, _flags: &SessionFlags) -> HandlerResult {
    debug!(tag = action.tag(), "noted");
    Ok(Vec::new())
}

/// A draw by any seat; only our own draws get a reply.
pub fn handle_draw(strategy: &dyn Strategy, action: &Action) -> HandlerResult {
    if draw_actor(action)? != OWN_SEAT {
        return Ok(Vec::new());
    }
    if !action.contains("pai") {
        warn!("own draw without a tile id, not discarding");
        return Ok(Vec::new());
    }
    let pai = action.get_int("pai")?;
    Ok(strategy.on_draw(pai).map(Outgoing::paced).into_iter().collect())
}

/// The drawing seat. A bare `T` that reached the handler before
/// derivation has no `actor` field yet, so the seat comes from the tag.
fn draw_actor(action: &Action) -> Result<i64, ProtocolError> {
    if action.contains("actor") {
        return action.get_int("actor");
    }
    PaiTag::parse(action.tag())
        .map(|tag| tag.actor as i64)
        .ok_or_else(|| ProtocolError::FieldType {
            key: "actor".to_owned(),
            expected: "an integer",
        })
}

/// A discard; when it can be claimed the server attaches `t`.
pub fn handle_discard(strategy: &dyn Strategy, action: &Action) -> HandlerResult {
    if !action.contains("t") {
        return Ok(Vec::new());
    }
    Ok(strategy
        .on_call_offer(action)
        .map(Outgoing::paced)
        .into_iter()
        .collect())
}

/// A round ended by a win (AGARI) or a draw (RYUUKYOKU).
pub fn handle_round_end(action: &Action, flags: &SessionFlags) -> HandlerResult {
    if action.contains("owari") {
        flags.finish_game();
        info!(tag = action.tag(), "match over");
        return Ok(Vec::new());
    }
    debug!(tag = action.tag(), "round over");
    Ok(vec![Outgoing::paced(Action::next_ready())])
}

/// The `PF4` attribute of HELO: `rank,points,rating,...`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LobbyProfile {
    rank: &'static rank::Rank,
    points: i64,
    rating: i64,
}

impl LobbyProfile {
    fn parse(fields: &[String]) -> Result<Self, ProtocolError> {
        let malformed = |expected| ProtocolError::FieldType {
            key: "PF4".to_owned(),
            expected,
        };
        let [rank_id, points, rating, ..] = fields else {
            return Err(malformed("rank,points,rating"));
        };

        let rank = rank_id
            .parse()
            .ok()
            .and_then(rank::lookup)
            .ok_or_else(|| malformed("a known rank id"))?;
        let points = points
            .parse()
            .map_err(|_| malformed("integer points"))?;
        // Ratings come as "1500.00"; the log shows the integer part.
        let rating = rating
            .parse::<f64>()
            .map_err(|_| malformed("a numeric rating"))?
            .trunc() as i64;

        Ok(Self {
            rank,
            points,
            rating,
        })
    }
}
