use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Which interval the session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Focus,
    Break,
}

impl Mode {
    /// The interval that follows this one.
    pub fn next(self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::Break => "break",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Cosmetic plant grown alongside the sessions.
///
/// Picked once when the record is first created and kept for the lifetime
/// of that record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Fern,
    Sapling,
    Sprout,
    Bamboo,
}

impl Species {
    pub const ALL: [Species; 4] = [
        Species::Fern,
        Species::Sapling,
        Species::Sprout,
        Species::Bamboo,
    ];

    pub fn random() -> Self {
        Self::ALL
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(Species::Fern)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Species::Fern => "fern",
            Species::Sapling => "sapling",
            Species::Sprout => "sprout",
            Species::Bamboo => "bamboo",
        }
    }
}
