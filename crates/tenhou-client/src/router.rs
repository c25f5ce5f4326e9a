//! Tag-based dispatch of decoded actions to handlers.

use std::collections::HashMap;
use std::fmt;

use tenhou_protocol::Action;

use crate::{ClientError, SessionFlags};

/// When an outgoing action may be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Right away.
    Immediate,
    /// After a random 1–2 s delay ([`crate::pace::human_delay`]).
    Human,
}

/// An action a handler wants sent, in order, after it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub action: Action,
    pub pacing: Pacing,
}

impl Outgoing {
    pub fn immediate(action: Action) -> Self {
        Self {
            action,
            pacing: Pacing::Immediate,
        }
    }

    pub fn paced(action: Action) -> Self {
        Self {
            action,
            pacing: Pacing::Human,
        }
    }
}

/// What every handler returns: the replies to send, or a fatal error.
pub type HandlerResult = Result<Vec<Outgoing>, ClientError>;

/// A handler for one tag. Runs synchronously on the session loop.
pub type Handler = Box<dyn Fn(&Action, &SessionFlags) -> HandlerResult + Send + Sync>;

/// Maps lower-cased tags to handlers.
///
/// A tag with no entry is ignored: the protocol has many message types an
/// automated player doesn't care about, so "unhandled" is the normal case.
/// [`ActionRouter::new`] is the empty registry where every tag is a no-op;
/// [`ActionRouter::standard`](crate::handlers) fills in the client's
/// handlers. Any entry can be replaced with [`on`](Self::on).
#[derive(Default)]
pub struct ActionRouter {
    handlers: HashMap<String, Handler>,
}

impl ActionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `tag` (case-insensitive), replacing any
    /// previous entry.
    #[must_use]
    pub fn on<F>(mut self, tag: &str, handler: F) -> Self
    where
        F: Fn(&Action, &SessionFlags) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers
            .insert(tag.to_lowercase(), Box::new(handler));
        self
    }

    /// Whether `tag` has a handler (without Pai-tag derivation).
    pub fn handles(&self, tag: &str) -> bool {
        self.handlers.contains_key(&tag.to_lowercase())
    }

    /// Routes `action` to its handler and returns the handler's replies.
    ///
    /// Lookup order:
    /// 1. the tag as received (lower-cased);
    /// 2. if that misses and the tag is a Pai tag, the canonical `t`/`d`
    ///    after derivation (which rewrites `action` in place);
    /// 3. otherwise nothing happens and no replies are returned.
    pub fn dispatch(
        &self,
        action: &mut Action,
        flags: &SessionFlags,
    ) -> HandlerResult {
        if let Some(handler) = self.lookup(action.tag()) {
            return handler(action, flags);
        }
        if action.is_pai_tag() {
            if let Some(handler) = self.lookup(action.tag()) {
                return handler(action, flags);
            }
        }
        tracing::trace!(tag = action.tag(), "no handler, ignoring");
        Ok(Vec::new())
    }

    fn lookup(&self, tag: &str) -> Option<&Handler> {
        self.handlers.get(&tag.to_lowercase())
    }
}

impl fmt::Debug for ActionRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> =
            self.handlers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("ActionRouter").field("tags", &tags).finish()
    }
}
