//! Session role selection from the page query string

use serde::Deserialize;
use tracing::warn;

use crate::game::Role;

/// Query parameters the page understands; others are ignored
#[derive(Debug, Default, Deserialize)]
struct ModeQuery {
    join: Option<String>,
    watch: Option<String>,
}

/// How this client takes part in a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// First player: asks the relay to open a new game
    Create,
    /// Second player joining with a join key
    Join(String),
    /// Read-only spectator with a watch key
    Watch(String),
}

impl SessionMode {
    /// `?join=<key>` joins, `?watch=<key>` watches, anything else creates.
    /// A join key wins over a watch key. Names and values are form-decoded.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let ModeQuery { join, watch } = match serde_urlencoded::from_str(query) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Unreadable query string, creating a new game");
                ModeQuery::default()
            }
        };

        match (join, watch) {
            (Some(key), _) => Self::Join(key),
            (None, Some(key)) => Self::Watch(key),
            (None, None) => Self::Create,
        }
    }

    /// Role of the locally controlled ship; spectators have none
    pub fn local_role(&self) -> Option<Role> {
        match self {
            Self::Create => Some(Role::A),
            Self::Join(_) => Some(Role::B),
            Self::Watch(_) => None,
        }
    }

    pub fn is_spectator(&self) -> bool {
        matches!(self, Self::Watch(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_query() {
        assert_eq!(SessionMode::from_query(""), SessionMode::Create);
        assert_eq!(SessionMode::from_query("?foo=1"), SessionMode::Create);
        assert_eq!(
            SessionMode::from_query("?join=abc"),
            SessionMode::Join("abc".into())
        );
        assert_eq!(
            SessionMode::from_query("watch=xyz&x=1"),
            SessionMode::Watch("xyz".into())
        );
        assert_eq!(
            SessionMode::from_query("?watch=w&join=j"),
            SessionMode::Join("j".into())
        );
    }

    #[test]
    fn test_from_query_decodes_keys() {
        assert_eq!(
            SessionMode::from_query("?join=ab%2Dcd"),
            SessionMode::Join("ab-cd".into())
        );
        assert_eq!(
            SessionMode::from_query("?%77atch=k"),
            SessionMode::Watch("k".into())
        );
        assert_eq!(
            SessionMode::from_query("?join=a+b"),
            SessionMode::Join("a b".into())
        );
        assert_eq!(
            SessionMode::from_query("?join="),
            SessionMode::Join(String::new())
        );
    }

    #[test]
    fn test_roles() {
        assert_eq!(SessionMode::Create.local_role(), Some(Role::A));
        assert_eq!(SessionMode::Join("k".into()).local_role(), Some(Role::B));
        assert_eq!(SessionMode::Watch("k".into()).local_role(), None);
        assert!(SessionMode::Watch("k".into()).is_spectator());
    }
}
