//! Simulated login session.
//!
//! There is no real credential check: a login succeeds when the e-mail and
//! password match an entry of the built-in trainer roster.

use crate::model::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Anonymous,
    Authenticating { email: String },
    Authenticated(User),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(u) => Some(u),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

struct Trainer {
    id: &'static str,
    email: &'static str,
    password: &'static str,
    name: &'static str,
}

const DEMO_PASSWORD: &str = "pokemon123";

const ROSTER: &[Trainer] = &[
    Trainer {
        id: "1",
        email: "ash@pokemon.com",
        password: DEMO_PASSWORD,
        name: "Ash Ketchum",
    },
    Trainer {
        id: "2",
        email: "misty@pokemon.com",
        password: DEMO_PASSWORD,
        name: "Misty",
    },
    Trainer {
        id: "3",
        email: "brock@pokemon.com",
        password: DEMO_PASSWORD,
        name: "Brock",
    },
    Trainer {
        id: "4",
        email: "pikachu@pokemon.com",
        password: DEMO_PASSWORD,
        name: "Pikachu",
    },
    Trainer {
        id: "5",
        email: "professor@pokemon.com",
        password: DEMO_PASSWORD,
        name: "Professor Oak",
    },
];

/// Match credentials against the roster.
pub fn verify(email: &str, password: &str) -> Option<User> {
    ROSTER
        .iter()
        .find(|t| t.email == email.trim() && t.password == password)
        .map(|t| User {
            id: t.id.to_string(),
            email: t.email.to_string(),
            name: t.name.to_string(),
        })
}

/// E-mail addresses accepted by `verify`, for help output.
pub fn roster_emails() -> impl Iterator<Item = &'static str> {
    ROSTER.iter().map(|t| t.email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_matches_roster() {
        let u = verify(" misty@pokemon.com", "pokemon123").unwrap();
        assert_eq!(u.name, "Misty");
        assert!(verify("misty@pokemon.com", "wrong").is_none());
        assert!(verify("gary@pokemon.com", "pokemon123").is_none());
    }

    #[test]
    fn roster_has_five_trainers() {
        assert_eq!(roster_emails().count(), 5);
    }
}
