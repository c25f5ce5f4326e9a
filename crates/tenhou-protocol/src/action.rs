//! The [`Action`] message type and Pai-tag derivation.
//!
//! Every message on the wire is a flat JSON object with a `tag` key, e.g.
//!
//! ```text
//! {"tag":"HELO","uname":"NoName","PF4":"9,0,1500.00,..."}
//! {"tag":"T52"}
//! {"tag":"E34","t":"1"}
//! ```
//!
//! The server sends almost every attribute as a string, so the typed
//! accessors ([`Action::get_int`] and friends) convert on read instead of
//! trusting the JSON type.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ProtocolError;

/// Seat letters for draw tags, in seat order.
pub const DRAW_ACTORS: &str = "TUVW";

/// Seat letters for discard tags, in seat order.
pub const DISCARD_ACTORS: &str = "DEFGdefg";

// ---------------------------------------------------------------------------
// PaiTag
// ---------------------------------------------------------------------------

/// Whether a Pai tag reports a draw or a discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaiKind {
    Draw,
    Discard,
}

impl PaiKind {
    /// The tag a derived action carries afterwards.
    pub fn canonical_tag(self) -> &'static str {
        match self {
            Self::Draw => "T",
            Self::Discard => "D",
        }
    }
}

/// A tag whose first character names the actor's seat and whose remaining
/// characters (if any) are the tile id.
///
/// `T52` is "seat 0 drew tile 52", `F` is "seat 2 discarded" with the tile
/// hidden, `e34` is "seat 5 in the discard set discarded tile 34". The
/// actor is the letter's index within [`DRAW_ACTORS`] or [`DISCARD_ACTORS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaiTag {
    pub kind: PaiKind,
    pub actor: usize,
    pub pai: Option<i64>,
}

impl PaiTag {
    /// Parses `tag`, returning `None` unless it is one actor letter
    /// followed only by ASCII digits.
    pub fn parse(tag: &str) -> Option<Self> {
        let mut chars = tag.chars();
        let letter = chars.next()?;
        let digits = chars.as_str();
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        // Both sets are ASCII, so the byte offset from `find` is the
        // character index.
        let (kind, actor) = if let Some(i) = DRAW_ACTORS.find(letter) {
            (PaiKind::Draw, i)
        } else if let Some(i) = DISCARD_ACTORS.find(letter) {
            (PaiKind::Discard, i)
        } else {
            return None;
        };

        let pai = if digits.is_empty() {
            None
        } else {
            Some(digits.parse().ok()?)
        };

        Some(Self { kind, actor, pai })
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// One protocol message: an ordered key/value map that always has a `tag`.
///
/// Serialization goes through `Map<String, Value>` so a decoded object
/// without a string `tag` is rejected instead of producing a tagless
/// action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Action(Map<String, Value>);

impl Action {
    /// Creates an action holding only `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("tag".to_owned(), Value::String(tag.into()));
        Self(fields)
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a field. Use [`new`](Self::new) to set the tag.
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_owned(), value.into());
    }

    /// The message type, e.g. `"HELO"` or `"T52"` (before derivation).
    pub fn tag(&self) -> &str {
        self.0.get("tag").and_then(Value::as_str).unwrap_or_default()
    }

    /// Whether `key` is present, whatever its value.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Raw access to a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of fields, `tag` included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: an action has at least its tag.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reads a field as a string. Numbers are rendered in decimal.
    ///
    /// # Errors
    /// [`ProtocolError::FieldType`] if the key is absent or holds
    /// something other than a string or number.
    pub fn get_str(&self, key: &str) -> Result<String, ProtocolError> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(ProtocolError::field(key, "a string")),
        }
    }

    /// Reads a field as an integer. Decimal strings are parsed.
    ///
    /// # Errors
    /// [`ProtocolError::FieldType`] if the key is absent or the value is
    /// not an integer (a float like `1500.5` is rejected).
    pub fn get_int(&self, key: &str) -> Result<i64, ProtocolError> {
        let parsed = match self.0.get(key) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| ProtocolError::field(key, "an integer"))
    }

    /// Reads a field as a list of strings.
    ///
    /// A JSON array of strings is returned as-is; a string is split on
    /// commas, which is how the server packs lists (`"9,0,1500.00"`).
    ///
    /// # Errors
    /// [`ProtocolError::FieldType`] if the key is absent or holds neither
    /// form.
    pub fn get_list(&self, key: &str) -> Result<Vec<String>, ProtocolError> {
        if let Some(Value::Array(items)) = self.0.get(key) {
            return items
                .iter()
                .map(|v| v.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| ProtocolError::field(key, "a list of strings"));
        }
        Ok(self.get_str(key)?.split(',').map(str::to_owned).collect())
    }

    /// Checks whether the tag is a Pai tag and, if so, derives the actor
    /// and tile from it.
    ///
    /// On a match the tag is rewritten to `T` or `D`, `actor` is set to the
    /// seat index, and `pai` is set when the tag carried digits. Returns
    /// `false` without touching the action when the tag doesn't match.
    ///
    /// Calling this again on a derived action is a no-op that still
    /// returns `true`: a bare `T`/`D` with an `actor` already stored was
    /// derived before, and re-parsing it would reset the seat to 0.
    pub fn is_pai_tag(&mut self) -> bool {
        let Some(pai_tag) = PaiTag::parse(self.tag()) else {
            return false;
        };
        if self.is_derived() {
            return true;
        }

        self.insert("tag", pai_tag.kind.canonical_tag());
        self.insert("actor", pai_tag.actor as u64);
        if let Some(pai) = pai_tag.pai {
            self.insert("pai", pai);
        }
        true
    }

    fn is_derived(&self) -> bool {
        matches!(self.tag(), "T" | "D") && self.contains("actor")
    }
}

impl TryFrom<Map<String, Value>> for Action {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        match fields.get("tag") {
            Some(Value::String(_)) => Ok(Self(fields)),
            Some(_) => Err("`tag` is not a string".into()),
            None => Err("missing `tag`".into()),
        }
    }
}

impl From<Action> for Map<String, Value> {
    fn from(action: Action) -> Self {
        action.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}
