//! The room reducer.
//!
//! [`apply`] is the only way room state changes after seat assignment.
//! It is total: a message the sender is not allowed to send, or one that
//! carries nothing to apply, yields an unchanged copy of the room.

use grandprix_protocol::{ClientId, GameStatus, Message, PowerupFlags, Role, Room, RoundPhase};

use crate::RoundCatalog;

/// Who sent a message, as established when the sender was seated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sender {
    pub id: ClientId,
    pub role: Role,
}

impl Sender {
    pub fn new(id: impl Into<ClientId>, role: Role) -> Self {
        Self { id: id.into(), role }
    }

    /// Whether this sender currently owns the host seat of `room`.
    ///
    /// Holding the host role is not enough: a former host whose seat was
    /// taken over has lost its authority.
    pub fn is_host_of(&self, room: &Room) -> bool {
        self.role == Role::Host && self.id == room.host_connection
    }
}

/// Computes the room that results from `sender` sending `msg`.
pub fn apply<C>(room: &Room, msg: &Message, sender: &Sender, catalog: &C) -> Room
where
    C: RoundCatalog + ?Sized,
{
    let mut next = room.clone();
    if !authorized(room, msg, sender) {
        tracing::debug!(
            room = %room.id,
            client = %sender.id,
            role = %sender.role,
            kind = msg.kind(),
            "message ignored"
        );
        return next;
    }
    transition(&mut next, msg, sender, catalog);
    next
}

fn authorized(room: &Room, msg: &Message, sender: &Sender) -> bool {
    if msg.is_host_only() {
        return sender.is_host_of(room);
    }
    match msg.declared_player() {
        Some(Role::Guest) => sender.role == Role::Guest,
        Some(Role::Host) => {
            if sender.role != Role::Host {
                return false;
            }
            let reclaim = matches!(msg, Message::Join { .. } | Message::Reconnect { .. })
                && !room.players.host.connected;
            sender.is_host_of(room) || reclaim
        }
        // Session and snapshot frames never change the room.
        None => false,
    }
}

fn transition<C>(room: &mut Room, msg: &Message, sender: &Sender, catalog: &C)
where
    C: RoundCatalog + ?Sized,
{
    match msg {
        Message::Join { player, name } => {
            seat_connected(room, *player, sender);
            room.players[*player].name = name.clone();
        }
        Message::Reconnect { player } => seat_connected(room, *player, sender),
        Message::Disconnect { player } => room.players[*player].connected = false,

        Message::PlaceBet { player, amount } => room.bets[*player] = *amount,
        Message::SubmitAnswer { player, answer } => {
            room.answers[*player] = Some(answer.clone());
        }
        Message::ActivatePowerup { player, powerup } => {
            if room.active_powerups[*player].is_none()
                && room.players[*player].powerups.spend(*powerup)
            {
                room.active_powerups[*player] = Some(*powerup);
            }
        }
        Message::PressBuzzer { player } => {
            if room.buzzed_player.is_none() {
                room.buzzed_player = Some(*player);
            }
        }

        Message::StartGame => {
            room.status = GameStatus::Playing;
            room.current_round = 0;
            room.current_question = 0;
            room.round_phase = RoundPhase::Betting;
        }
        Message::RevealQuestion | Message::ForceReveal => room.round_phase = RoundPhase::Reveal,
        Message::AdvanceRound => advance(room, catalog),
        Message::GameEnded | Message::EndGame => room.status = GameStatus::Finished,

        Message::JumpRound { round } => {
            room.current_round = *round;
            room.current_question = 0;
            room.round_phase = RoundPhase::Betting;
        }
        Message::JumpQuestion { question } => {
            room.current_question = *question;
            room.round_phase = RoundPhase::Betting;
        }
        Message::SetCoins { host, guest } => {
            room.players.host.coins = *host;
            room.players.guest.coins = *guest;
        }
        Message::ResetPowerups => {
            room.players.host.powerups = PowerupFlags::full();
            room.players.guest.powerups = PowerupFlags::full();
        }
        Message::SkipQuestion => {
            room.current_question = room.current_question.saturating_add(1);
            room.reset_question_state();
        }

        Message::Hello { .. }
        | Message::Welcome { .. }
        | Message::Error { .. }
        | Message::StateRequest
        | Message::StateUpdate { .. } => {}
    }
}

/// Marks `player` connected, moving the host identity to `sender` when it
/// reclaims a vacant host seat.
fn seat_connected(room: &mut Room, player: Role, sender: &Sender) {
    if player == Role::Host && room.host_connection != sender.id {
        tracing::info!(room = %room.id, client = %sender.id, "host seat reclaimed");
        room.host_connection = sender.id.clone();
    }
    room.players[player].connected = true;
}

/// Moves to the next question, rolling over into the next round when the
/// current one is exhausted, and finishing the game past the last round.
fn advance<C>(room: &mut Room, catalog: &C)
where
    C: RoundCatalog + ?Sized,
{
    room.current_question = room.current_question.saturating_add(1);
    let questions = catalog.question_count(room.current_round).unwrap_or(0);
    if room.current_question >= questions {
        room.current_round = room.current_round.saturating_add(1);
        room.current_question = 0;
        if room.current_round >= catalog.round_count() {
            room.status = GameStatus::Finished;
        }
    }
    room.reset_question_state();
}

#[cfg(test)]
mod tests {
    use grandprix_protocol::{Answer, Powerup, RoomCode, Sides, Tyre, DEFAULT_BET, STARTING_COINS};

    use super::*;

    const ROUNDS: [usize; 4] = [5, 5, 3, 1];

    fn host() -> Sender {
        Sender::new("h", Role::Host)
    }

    fn guest() -> Sender {
        Sender::new("g", Role::Guest)
    }

    fn room() -> Room {
        let mut room = Room::new(RoomCode::parse("PIT1").unwrap(), "h".into());
        room.players.host.connected = true;
        room.players.guest.connected = true;
        room
    }

    fn run(room: &Room, msg: Message, sender: &Sender) -> Room {
        apply(room, &msg, sender, &ROUNDS)
    }

    #[test]
    fn test_apply_advance_within_round_moves_question() {
        let mut r = room();
        r.bets.host = 40;
        r.buzzed_player = Some(Role::Guest);
        let next = run(&r, Message::AdvanceRound, &host());
        assert_eq!((next.current_round, next.current_question), (0, 1));
        assert_eq!(next.round_phase, RoundPhase::Betting);
        assert_eq!(next.bets, Sides::both(DEFAULT_BET));
        assert_eq!(next.buzzed_player, None);
    }

    #[test]
    fn test_apply_advance_past_last_question_rolls_round() {
        let mut r = room();
        r.current_question = 4;
        let next = run(&r, Message::AdvanceRound, &host());
        assert_eq!((next.current_round, next.current_question), (1, 0));
        assert_eq!(next.status, GameStatus::Lobby);
    }

    #[test]
    fn test_apply_five_advances_walk_first_round() {
        let mut r = room();
        r.status = GameStatus::Playing;
        for expected in 1..5 {
            r = run(&r, Message::AdvanceRound, &host());
            assert_eq!((r.current_round, r.current_question), (0, expected));
        }
        r = run(&r, Message::AdvanceRound, &host());
        assert_eq!((r.current_round, r.current_question), (1, 0));
        assert_eq!(r.status, GameStatus::Playing);
    }

    #[test]
    fn test_apply_advance_past_last_round_finishes() {
        let mut r = room();
        r.status = GameStatus::Playing;
        r.current_round = 3;
        let next = run(&r, Message::AdvanceRound, &host());
        assert_eq!(next.current_round, 4);
        assert_eq!(next.status, GameStatus::Finished);
    }

    #[test]
    fn test_apply_advance_from_out_of_range_round_finishes() {
        let mut r = room();
        r.status = GameStatus::Playing;
        r.current_round = 99;
        let next = run(&r, Message::AdvanceRound, &host());
        assert_eq!(next.current_round, 100);
        assert_eq!(next.status, GameStatus::Finished);
    }

    #[test]
    fn test_apply_guest_admin_message_is_noop() {
        let r = room();
        let next = run(&r, Message::SetCoins { host: 0, guest: 9999 }, &guest());
        assert_eq!(next, r);
    }

    #[test]
    fn test_apply_stale_host_loses_authority() {
        let mut r = room();
        r.host_connection = "new-host".into();
        let next = run(&r, Message::StartGame, &host());
        assert_eq!(next, r);
    }

    #[test]
    fn test_apply_player_message_for_other_seat_is_noop() {
        let r = room();
        let next = run(&r, Message::PlaceBet { player: Role::Host, amount: 50 }, &guest());
        assert_eq!(next, r);
        let next = run(&r, Message::PlaceBet { player: Role::Guest, amount: 50 }, &host());
        assert_eq!(next, r);
    }

    #[test]
    fn test_apply_place_bet_records_amount() {
        let next = run(&room(), Message::PlaceBet { player: Role::Guest, amount: 35 }, &guest());
        assert_eq!(next.bets.guest, 35);
        assert_eq!(next.bets.host, DEFAULT_BET);
    }

    #[test]
    fn test_apply_submit_answer_overwrites() {
        let first = Answer::Confidence { guess: 70, tyre: Tyre::Soft };
        let second = Answer::Confidence { guess: 78, tyre: Tyre::Hard };
        let r = run(&room(), Message::SubmitAnswer { player: Role::Host, answer: first }, &host());
        let r = run(&r, Message::SubmitAnswer { player: Role::Host, answer: second.clone() }, &host());
        assert_eq!(r.answers.host, Some(second));
    }

    #[test]
    fn test_apply_buzzer_first_press_wins() {
        let r = run(&room(), Message::PressBuzzer { player: Role::Guest }, &guest());
        let r = run(&r, Message::PressBuzzer { player: Role::Host }, &host());
        assert_eq!(r.buzzed_player, Some(Role::Guest));
    }

    #[test]
    fn test_apply_buzzer_host_first_then_later_presses_are_noop() {
        let first = run(&room(), Message::PressBuzzer { player: Role::Host }, &host());
        assert_eq!(first.buzzed_player, Some(Role::Host));

        let second = run(&first, Message::PressBuzzer { player: Role::Guest }, &guest());
        assert_eq!(second, first);
        let third = run(&second, Message::PressBuzzer { player: Role::Host }, &host());
        assert_eq!(third, first);
    }

    #[test]
    fn test_apply_powerup_is_single_use_across_questions() {
        let activate = Message::ActivatePowerup { player: Role::Host, powerup: Powerup::Drs };
        let r = run(&room(), activate.clone(), &host());
        assert_eq!(r.active_powerups.host, Some(Powerup::Drs));
        assert!(!r.players.host.powerups.drs);

        let r = run(&r, Message::AdvanceRound, &host());
        assert_eq!(r.active_powerups.host, None);
        let r = run(&r, activate, &host());
        assert_eq!(r.active_powerups.host, None);
    }

    #[test]
    fn test_apply_second_powerup_same_question_is_noop() {
        let r = run(
            &room(),
            Message::ActivatePowerup { player: Role::Guest, powerup: Powerup::Drs },
            &guest(),
        );
        let next = run(
            &r,
            Message::ActivatePowerup { player: Role::Guest, powerup: Powerup::HardTyres },
            &guest(),
        );
        assert_eq!(next, r);
        assert!(next.players.guest.powerups.hard_tyres);
    }

    #[test]
    fn test_apply_reset_powerups_restores_both() {
        let mut r = room();
        r.players.host.powerups.spend(Powerup::Drs);
        r.players.guest.powerups.spend(Powerup::TeamRadio);
        let next = run(&r, Message::ResetPowerups, &host());
        assert_eq!(next.players.host.powerups, PowerupFlags::full());
        assert_eq!(next.players.guest.powerups, PowerupFlags::full());
    }

    #[test]
    fn test_apply_start_game_resets_indices() {
        let mut r = room();
        r.current_round = 2;
        r.current_question = 2;
        r.round_phase = RoundPhase::Results;
        let next = run(&r, Message::StartGame, &host());
        assert_eq!(next.status, GameStatus::Playing);
        assert_eq!((next.current_round, next.current_question), (0, 0));
        assert_eq!(next.round_phase, RoundPhase::Betting);
        assert_eq!(next.players.host.coins, STARTING_COINS);
    }

    #[test]
    fn test_apply_jump_round_resets_question() {
        let mut r = room();
        r.current_question = 3;
        r.round_phase = RoundPhase::Reveal;
        let next = run(&r, Message::JumpRound { round: 2 }, &host());
        assert_eq!((next.current_round, next.current_question), (2, 0));
        assert_eq!(next.round_phase, RoundPhase::Betting);
    }

    #[test]
    fn test_apply_jump_question_keeps_round_unclamped() {
        let mut r = room();
        r.current_round = 1;
        let next = run(&r, Message::JumpQuestion { question: 42 }, &host());
        assert_eq!((next.current_round, next.current_question), (1, 42));
    }

    #[test]
    fn test_apply_skip_question_does_not_roll_round() {
        let mut r = room();
        r.current_question = 4;
        r.answers.guest = Some(Answer::Race { clicks: 50 });
        let next = run(&r, Message::SkipQuestion, &host());
        assert_eq!((next.current_round, next.current_question), (0, 5));
        assert_eq!(next.answers.guest, None);
    }

    #[test]
    fn test_apply_skip_question_saturates_at_max_index() {
        let mut r = room();
        r.current_question = usize::MAX;
        let next = run(&r, Message::SkipQuestion, &host());
        assert_eq!(next.current_question, usize::MAX);
    }

    #[test]
    fn test_apply_reveal_and_force_reveal_set_phase() {
        let r = run(&room(), Message::RevealQuestion, &host());
        assert_eq!(r.round_phase, RoundPhase::Reveal);
        let r = run(&room(), Message::ForceReveal, &host());
        assert_eq!(r.round_phase, RoundPhase::Reveal);
    }

    #[test]
    fn test_apply_end_game_finishes() {
        let r = run(&room(), Message::EndGame, &host());
        assert_eq!(r.status, GameStatus::Finished);
        let r = run(&room(), Message::GameEnded, &host());
        assert_eq!(r.status, GameStatus::Finished);
    }

    #[test]
    fn test_apply_join_sets_name_and_connected() {
        let mut r = room();
        r.players.guest.connected = false;
        let next = run(&r, Message::Join { player: Role::Guest, name: "Lando".into() }, &guest());
        assert_eq!(next.players.guest.name, "Lando");
        assert!(next.players.guest.connected);
    }

    #[test]
    fn test_apply_disconnect_and_reconnect_toggle_flag() {
        let r = run(&room(), Message::Disconnect { player: Role::Guest }, &guest());
        assert!(!r.players.guest.connected);
        let r = run(&r, Message::Reconnect { player: Role::Guest }, &guest());
        assert!(r.players.guest.connected);
    }

    #[test]
    fn test_apply_host_join_reclaims_vacant_seat() {
        let mut r = room();
        r.players.host.connected = false;
        let newcomer = Sender::new("h2", Role::Host);
        let next = run(&r, Message::Join { player: Role::Host, name: "Max".into() }, &newcomer);
        assert_eq!(next.host_connection, ClientId::from("h2"));
        assert!(next.players.host.connected);
    }

    #[test]
    fn test_apply_host_join_cannot_steal_connected_seat() {
        let r = room();
        let intruder = Sender::new("h2", Role::Host);
        let next = run(&r, Message::Join { player: Role::Host, name: "X".into() }, &intruder);
        assert_eq!(next, r);
    }

    #[test]
    fn test_apply_session_frames_are_noop() {
        let r = room();
        let code = RoomCode::parse("PIT1").unwrap();
        for msg in [
            Message::Hello { version: 1, room: code },
            Message::StateRequest,
            Message::state_update(&r, 7),
        ] {
            assert_eq!(run(&r, msg.clone(), &host()), r);
            assert_eq!(run(&r, msg, &guest()), r);
        }
    }
}
