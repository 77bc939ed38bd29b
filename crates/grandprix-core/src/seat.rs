//! Seat assignment for a newcomer.

use grandprix_protocol::{ClientId, Role, Room, RoomCode};
use serde::{Deserialize, Serialize};

use crate::SeatError;

/// What to do with a third participant when both seats are connected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeatPolicy {
    /// Refuse with [`SeatError::RoomFull`].
    #[default]
    Reject,
    /// Seat the newcomer as a second guest. Both guests then act on the
    /// same seat.
    ShareGuest,
}

/// Decides the role of `requester` in the room stored at `slot`, creating
/// the room if it does not exist yet.
///
/// Rules, first match wins:
/// 1. No room: create one with `requester` as host.
/// 2. `requester` already owns the host seat: host again.
/// 3. Host seat disconnected: `requester` takes it over.
/// 4. Guest seat disconnected: `requester` becomes guest.
/// 5. Both connected: `policy` decides.
///
/// Rule 2 runs before the vacancy checks, unlike a plain "first free
/// seat" order. A host re-requesting while the guest seat is empty stays
/// host instead of being handed the guest seat.
///
/// Any change is written back into `slot`; the caller persists it.
pub fn assign_role(
    slot: &mut Option<Room>,
    code: &RoomCode,
    requester: &ClientId,
    policy: SeatPolicy,
) -> Result<Role, SeatError> {
    match slot {
        Some(room) => seat_in(room, requester, policy),
        None => {
            let mut room = Room::new(code.clone(), requester.clone());
            room.players.host.connected = true;
            *slot = Some(room);
            tracing::debug!(room = %code, client = %requester, "room created");
            Ok(Role::Host)
        }
    }
}

fn seat_in(room: &mut Room, requester: &ClientId, policy: SeatPolicy) -> Result<Role, SeatError> {
    if room.host_connection == *requester {
        room.players.host.connected = true;
        return Ok(Role::Host);
    }

    if !room.players.host.connected {
        room.host_connection = requester.clone();
        room.players.host.connected = true;
        tracing::debug!(room = %room.id, client = %requester, "host seat taken over");
        return Ok(Role::Host);
    }

    if !room.players.guest.connected {
        room.players.guest.connected = true;
        return Ok(Role::Guest);
    }

    match policy {
        SeatPolicy::ShareGuest => {
            tracing::warn!(room = %room.id, client = %requester, "room full, sharing guest seat");
            Ok(Role::Guest)
        }
        SeatPolicy::Reject => Err(SeatError::RoomFull(room.id.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> RoomCode {
        RoomCode::parse("PIT1").unwrap()
    }

    #[test]
    fn test_assign_role_empty_slot_creates_room_as_host() {
        let mut slot = None;
        let role = assign_role(&mut slot, &code(), &"a".into(), SeatPolicy::Reject).unwrap();
        assert_eq!(role, Role::Host);
        let room = slot.unwrap();
        assert_eq!(room.host_connection, ClientId::from("a"));
        assert!(room.players.host.connected);
        assert!(!room.players.guest.connected);
    }

    #[test]
    fn test_assign_role_second_requester_becomes_guest() {
        let mut slot = None;
        assign_role(&mut slot, &code(), &"a".into(), SeatPolicy::Reject).unwrap();
        let role = assign_role(&mut slot, &code(), &"b".into(), SeatPolicy::Reject).unwrap();
        assert_eq!(role, Role::Guest);
        assert!(slot.unwrap().is_full());
    }

    #[test]
    fn test_assign_role_third_requester_rejected_under_default_policy() {
        let mut slot = None;
        assign_role(&mut slot, &code(), &"a".into(), SeatPolicy::default()).unwrap();
        assign_role(&mut slot, &code(), &"b".into(), SeatPolicy::default()).unwrap();
        let before = slot.clone();
        let err = assign_role(&mut slot, &code(), &"c".into(), SeatPolicy::default());
        assert!(matches!(err, Err(SeatError::RoomFull(_))));
        assert_eq!(slot, before);
    }

    #[test]
    fn test_assign_role_third_requester_shares_guest_when_allowed() {
        let mut slot = None;
        assign_role(&mut slot, &code(), &"a".into(), SeatPolicy::ShareGuest).unwrap();
        assign_role(&mut slot, &code(), &"b".into(), SeatPolicy::ShareGuest).unwrap();
        let role = assign_role(&mut slot, &code(), &"c".into(), SeatPolicy::ShareGuest).unwrap();
        assert_eq!(role, Role::Guest);
    }

    #[test]
    fn test_assign_role_disconnected_host_seat_taken_over() {
        let mut slot = None;
        assign_role(&mut slot, &code(), &"a".into(), SeatPolicy::Reject).unwrap();
        assign_role(&mut slot, &code(), &"b".into(), SeatPolicy::Reject).unwrap();
        if let Some(room) = slot.as_mut() {
            room.players.host.connected = false;
        }
        let role = assign_role(&mut slot, &code(), &"c".into(), SeatPolicy::Reject).unwrap();
        assert_eq!(role, Role::Host);
        assert_eq!(slot.unwrap().host_connection, ClientId::from("c"));
    }

    #[test]
    fn test_assign_role_host_identity_reaffirmed_when_full() {
        let mut slot = None;
        assign_role(&mut slot, &code(), &"a".into(), SeatPolicy::Reject).unwrap();
        assign_role(&mut slot, &code(), &"b".into(), SeatPolicy::Reject).unwrap();
        let role = assign_role(&mut slot, &code(), &"a".into(), SeatPolicy::Reject).unwrap();
        assert_eq!(role, Role::Host);
    }

    #[test]
    fn test_assign_role_host_identity_never_steals_guest_seat() {
        let mut slot = None;
        assign_role(&mut slot, &code(), &"a".into(), SeatPolicy::Reject).unwrap();
        let role = assign_role(&mut slot, &code(), &"a".into(), SeatPolicy::Reject).unwrap();
        assert_eq!(role, Role::Host);
        assert!(!slot.unwrap().players.guest.connected);
    }
}
