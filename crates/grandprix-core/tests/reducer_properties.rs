//! Randomized message sequences against the reducer.
//!
//! A seeded RNG drives both seats with a mix of legal and illegal
//! messages; after every step the room must still satisfy the
//! authority and power-up rules.

use grandprix_core::{apply, assign_role, SeatPolicy, Sender};
use grandprix_protocol::{
    Answer, GameStatus, Message, Powerup, Role, Room, RoomCode, RoundPhase, Tyre,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ROUNDS: [usize; 4] = [5, 5, 3, 1];

fn seated_room() -> (Room, Sender, Sender) {
    let code = RoomCode::parse("SEED").unwrap();
    let mut slot = None;
    let host = assign_role(&mut slot, &code, &"host-1".into(), SeatPolicy::Reject).unwrap();
    let guest = assign_role(&mut slot, &code, &"guest-1".into(), SeatPolicy::Reject).unwrap();
    (
        slot.unwrap(),
        Sender::new("host-1", host),
        Sender::new("guest-1", guest),
    )
}

fn random_message(rng: &mut StdRng) -> Message {
    let player = if rng.random::<bool>() { Role::Host } else { Role::Guest };
    let powerup = Powerup::ALL[rng.random_range(0..Powerup::ALL.len())];
    match rng.random_range(0..18) {
        0 => Message::Join { player, name: "P".into() },
        1 => Message::Disconnect { player },
        2 => Message::Reconnect { player },
        3 => Message::PlaceBet { player, amount: rng.random_range(-20..200) },
        4 => Message::SubmitAnswer {
            player,
            answer: Answer::Confidence { guess: rng.random_range(0..100), tyre: Tyre::Soft },
        },
        5 => Message::ActivatePowerup { player, powerup },
        6 => Message::PressBuzzer { player },
        7 => Message::StartGame,
        8 => Message::RevealQuestion,
        9 => Message::AdvanceRound,
        10 => Message::JumpRound { round: rng.random_range(0..6) },
        11 => Message::JumpQuestion { question: rng.random_range(0..8) },
        12 => Message::SetCoins { host: rng.random_range(-50..500), guest: rng.random_range(-50..500) },
        13 => Message::ResetPowerups,
        14 => Message::SkipQuestion,
        15 => Message::ForceReveal,
        16 => Message::EndGame,
        _ => Message::StateRequest,
    }
}

fn host_side_unchanged(before: &Room, after: &Room) -> bool {
    before.host_connection == after.host_connection
        && before.status == after.status
        && before.current_round == after.current_round
        && before.current_question == after.current_question
        && before.round_phase == after.round_phase
        && before.players.host == after.players.host
        && before.players.guest.coins == after.players.guest.coins
        && before.bets.host == after.bets.host
        && before.answers.host == after.answers.host
        && before.active_powerups.host == after.active_powerups.host
}

#[test]
fn test_random_guest_messages_never_touch_host_state() {
    let mut rng = StdRng::seed_from_u64(0x6770);
    let (mut room, _, guest) = seated_room();
    for _ in 0..2_000 {
        let msg = random_message(&mut rng);
        let next = apply(&room, &msg, &guest, &ROUNDS);
        assert!(host_side_unchanged(&room, &next), "guest changed host state with {msg:?}");
        room = next;
    }
}

#[test]
fn test_random_sequences_only_reset_restores_powerups() {
    let mut rng = StdRng::seed_from_u64(42);
    let (mut room, host, guest) = seated_room();
    for _ in 0..5_000 {
        let msg = random_message(&mut rng);
        let sender = if rng.random::<bool>() { &host } else { &guest };
        let next = apply(&room, &msg, sender, &ROUNDS);

        for role in Role::BOTH {
            for p in Powerup::ALL {
                let restored = !room.players[role].powerups.is_available(p)
                    && next.players[role].powerups.is_available(p);
                if restored {
                    assert_eq!(msg, Message::ResetPowerups);
                }
            }
            if let Some(active) = next.active_powerups[role] {
                if room.active_powerups[role] != Some(active) {
                    assert!(room.players[role].powerups.is_available(active));
                    assert!(!next.players[role].powerups.is_available(active));
                }
            }
        }
        if room.buzzed_player.is_some() && next.buzzed_player != room.buzzed_player {
            assert!(next.buzzed_player.is_none(), "buzzer overwritten by {msg:?}");
        }
        room = next;
    }
}

#[test]
fn test_full_game_walkthrough_finishes() {
    let (mut room, host, _) = seated_room();
    room = apply(&room, &Message::StartGame, &host, &ROUNDS);
    assert_eq!(room.status, GameStatus::Playing);

    let total: usize = ROUNDS.iter().sum();
    for step in 1..=total {
        room = apply(&room, &Message::AdvanceRound, &host, &ROUNDS);
        assert_eq!(room.round_phase, RoundPhase::Betting);
        if step < total {
            assert_eq!(room.status, GameStatus::Playing, "finished early at step {step}");
        }
    }
    assert_eq!(room.status, GameStatus::Finished);
    assert_eq!(room.current_round, ROUNDS.len());
}
