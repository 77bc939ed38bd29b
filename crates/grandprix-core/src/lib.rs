//! The synchronous heart of a Grand Prix room.
//!
//! Everything here is a plain function over plain values: no runtime, no
//! I/O, no locks. Both room backings (the live relay and the
//! shared-storage poller) call the same functions, so identical inputs
//! produce identical rooms regardless of transport.
//!
//! - [`apply`]: the reducer: `(room, message, sender) → room`.
//! - [`assign_role`]: decides whether a newcomer sits as host or guest.
//! - [`RoundCatalog`] / [`Catalog`]: the externally supplied round list
//!   the reducer indexes into.
//! - [`scoring`]: coin deltas per round type, with power-up modifiers.

mod catalog;
mod error;
mod reducer;
mod seat;
pub mod scoring;

pub use catalog::{
    Catalog, ConfidenceQuestion, MatchQuestion, QuestionRef, RaceQuestion, Round,
    RoundCatalog, Tolerances, VideoQuestion,
};
pub use error::{CatalogError, SeatError};
pub use reducer::{apply, Sender};
pub use seat::{assign_role, SeatPolicy};
