//! Identity and per-side types shared by the state model and messages.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Which of the two seats a participant occupies.
///
/// The host holds administrative authority (starting the game, revealing,
/// advancing, correcting coins); the guest can only act on its own seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Host,
    Guest,
}

impl Role {
    /// Both roles, host first.
    pub const BOTH: [Role; 2] = [Role::Host, Role::Guest];

    /// The seat on the other side of the table.
    pub fn other(self) -> Self {
        match self {
            Self::Host => Self::Guest,
            Self::Guest => Self::Host,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Guest => write!(f, "guest"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// One value per seat.
///
/// Serializes as `{ "host": …, "guest": … }`. Indexing by [`Role`] keeps
/// per-player updates free of `if host { … } else { … }` ladders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sides<T> {
    pub host: T,
    pub guest: T,
}

impl<T> Sides<T> {
    pub fn new(host: T, guest: T) -> Self {
        Self { host, guest }
    }

    /// Applies `f` to each side, keeping the pairing.
    pub fn map<U>(self, mut f: impl FnMut(Role, T) -> U) -> Sides<U> {
        Sides {
            host: f(Role::Host, self.host),
            guest: f(Role::Guest, self.guest),
        }
    }
}

impl<T: Clone> Sides<T> {
    /// The same value on both sides.
    pub fn both(value: T) -> Self {
        Self {
            host: value.clone(),
            guest: value,
        }
    }
}

impl<T> Index<Role> for Sides<T> {
    type Output = T;

    fn index(&self, role: Role) -> &T {
        match role {
            Role::Host => &self.host,
            Role::Guest => &self.guest,
        }
    }
}

impl<T> IndexMut<Role> for Sides<T> {
    fn index_mut(&mut self, role: Role) -> &mut T {
        match role {
            Role::Host => &mut self.host,
            Role::Guest => &mut self.guest,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomCode / ClientId
// ---------------------------------------------------------------------------

/// The short, human-shareable code that names a room.
///
/// Deserialization goes through [`RoomCode::parse`], so a code that
/// arrives over the wire has already been validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Longest code accepted.
    pub const MAX_LEN: usize = 32;

    /// Validates a room code: 1 to [`MAX_LEN`](Self::MAX_LEN) ASCII
    /// letters, digits, `-` or `_`.
    pub fn parse(code: &str) -> Result<Self, ProtocolError> {
        let valid = !code.is_empty()
            && code.len() <= Self::MAX_LEN
            && code
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if valid {
            Ok(Self(code.to_owned()))
        } else {
            Err(ProtocolError::InvalidRoomCode(code.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identity of a participant's connection or local client.
///
/// The relay derives it from the socket's connection id; the
/// shared-storage backing generates one per client. The core only ever
/// compares identities for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClientId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Power-ups
// ---------------------------------------------------------------------------

/// A single-use per-player modifier.
///
/// Only [`Drs`](Self::Drs) (doubles the coin delta) and
/// [`HardTyres`](Self::HardTyres) (caps loss and upside) change scoring.
/// The rest are presentational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Powerup {
    Drs,
    SafetyCar,
    RedFlag,
    HardTyres,
    Undercut,
    TeamRadio,
}

impl Powerup {
    pub const ALL: [Powerup; 6] = [
        Powerup::Drs,
        Powerup::SafetyCar,
        Powerup::RedFlag,
        Powerup::HardTyres,
        Powerup::Undercut,
        Powerup::TeamRadio,
    ];
}

/// Availability of each of the six power-ups for one player.
///
/// A flag goes from `true` to `false` when spent and only returns to
/// `true` through an explicit reset; moving to the next question does not
/// restore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerupFlags {
    pub drs: bool,
    #[serde(rename = "safety-car")]
    pub safety_car: bool,
    #[serde(rename = "red-flag")]
    pub red_flag: bool,
    #[serde(rename = "hard-tyres")]
    pub hard_tyres: bool,
    pub undercut: bool,
    #[serde(rename = "team-radio")]
    pub team_radio: bool,
}

impl PowerupFlags {
    /// Every power-up still available.
    pub fn full() -> Self {
        Self {
            drs: true,
            safety_car: true,
            red_flag: true,
            hard_tyres: true,
            undercut: true,
            team_radio: true,
        }
    }

    fn slot(&mut self, powerup: Powerup) -> &mut bool {
        match powerup {
            Powerup::Drs => &mut self.drs,
            Powerup::SafetyCar => &mut self.safety_car,
            Powerup::RedFlag => &mut self.red_flag,
            Powerup::HardTyres => &mut self.hard_tyres,
            Powerup::Undercut => &mut self.undercut,
            Powerup::TeamRadio => &mut self.team_radio,
        }
    }

    pub fn is_available(&self, powerup: Powerup) -> bool {
        match powerup {
            Powerup::Drs => self.drs,
            Powerup::SafetyCar => self.safety_car,
            Powerup::RedFlag => self.red_flag,
            Powerup::HardTyres => self.hard_tyres,
            Powerup::Undercut => self.undercut,
            Powerup::TeamRadio => self.team_radio,
        }
    }

    /// Marks `powerup` as used. Returns `false` if it was already spent.
    pub fn spend(&mut self, powerup: Powerup) -> bool {
        std::mem::replace(self.slot(powerup), false)
    }

    /// Number of power-ups still available.
    pub fn remaining(&self) -> usize {
        Powerup::ALL
            .iter()
            .filter(|p| self.is_available(**p))
            .count()
    }
}

impl Default for PowerupFlags {
    fn default() -> Self {
        Self::full()
    }
}

/// Risk tier chosen for a confidence-round guess.
///
/// Softer tyres are faster and riskier: a narrower tolerance for a larger
/// multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tyre {
    Soft,
    Medium,
    Hard,
}
