//! Relay routing: create, join, watch, replay and fan-out

use std::sync::Arc;

use uuid::Uuid;

use ship_duel::game::{Player, Role};
use ship_duel::relay::{Connection, GameRegistry, Inbound, RelayError, Seat};
use ship_duel::util::rate_limit::PlayerRateLimiter;
use ship_duel::ws::protocol::{Event, PlayerSnapshot};

fn init(join: Option<&str>, watch: Option<&str>, player: Option<PlayerSnapshot>) -> Event {
    Event::Init {
        join: join.map(String::from),
        watch: watch.map(String::from),
        player,
    }
}

fn decode(frame: &str) -> PlayerSnapshot {
    match Event::from_json(frame).unwrap() {
        Event::Play { player } => player,
        other => panic!("expected play, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_echoes_client_keys() {
    let registry = GameRegistry::new();
    let attached = registry
        .attach(init(Some("J"), Some("W"), Some(Player::spawn(Role::A).snapshot())))
        .unwrap();

    assert_eq!(attached.seat, Seat::Creator);
    assert_eq!(attached.replies, vec![init(Some("J"), Some("W"), None)]);
    assert_eq!(registry.active_games(), 1);
    assert!(attached.game.latest(Role::A).is_some());
}

#[tokio::test]
async fn test_create_without_keys_generates_them() {
    let registry = GameRegistry::new();
    let attached = registry.attach(init(None, None, None)).unwrap();

    let Event::Init {
        join: Some(join),
        watch: Some(watch),
        ..
    } = &attached.replies[0]
    else {
        panic!("expected init reply");
    };
    assert_eq!(join, &attached.game.join_key);
    assert_eq!(watch, &attached.game.watch_key);
    assert_ne!(join, watch);
}

#[tokio::test]
async fn test_duplicate_keys_rejected() {
    let registry = GameRegistry::new();
    let _first = registry.attach(init(Some("J"), Some("W"), None)).unwrap();

    let err = registry
        .attach(init(Some("J"), Some("W2"), None))
        .err()
        .unwrap();
    assert_eq!(err, RelayError::KeyInUse);
    assert_eq!(registry.active_games(), 1);
}

#[tokio::test]
async fn test_shared_watch_key_rejected_without_leaking_join_key() {
    let registry = GameRegistry::new();
    let first = registry.attach(init(Some("J1"), Some("W"), None)).unwrap();

    let err = registry
        .attach(init(Some("J2"), Some("W"), None))
        .err()
        .unwrap();
    assert_eq!(err, RelayError::KeyInUse);
    assert_eq!(registry.active_games(), 1);

    // J2 was released, W still belongs to the first game
    assert_eq!(
        registry.attach(init(Some("J2"), None, None)).err().unwrap(),
        RelayError::GameNotFound
    );
    let spectator = registry.attach(init(None, Some("W"), None)).unwrap();
    assert_eq!(spectator.game.id, first.game.id);
}

#[tokio::test]
async fn test_unknown_keys_not_found() {
    let registry = GameRegistry::new();
    let join = registry.attach(init(Some("missing"), None, None)).err().unwrap();
    let watch = registry.attach(init(None, Some("missing"), None)).err().unwrap();

    assert_eq!(join, RelayError::GameNotFound);
    assert_eq!(join.to_string(), "Game not found.");
    assert_eq!(watch, RelayError::GameNotFound);
}

#[tokio::test]
async fn test_first_event_must_be_init() {
    let registry = GameRegistry::new();
    let err = registry.attach(Event::Win).err().unwrap();
    assert_eq!(err, RelayError::ExpectedInit);
}

#[tokio::test]
async fn test_join_replays_and_announces() {
    let registry = GameRegistry::new();
    let creator_snapshot = Player::spawn(Role::A).snapshot();
    let mut creator = registry
        .attach(init(Some("J"), Some("W"), Some(creator_snapshot.clone())))
        .unwrap();

    let joiner_snapshot = Player::spawn(Role::B).snapshot();
    let joiner = registry
        .attach(init(Some("J"), None, Some(joiner_snapshot.clone())))
        .unwrap();

    assert_eq!(joiner.seat, Seat::Joiner);
    assert_eq!(
        joiner.replies,
        vec![Event::Play {
            player: creator_snapshot
        }]
    );

    let frame = creator.rx.recv().await.unwrap();
    assert_eq!(decode(&frame), joiner_snapshot);
}

#[tokio::test]
async fn test_play_fans_out_to_everyone() {
    let registry = GameRegistry::new();
    let mut creator = registry.attach(init(Some("J"), Some("W"), None)).unwrap();
    let mut joiner = registry.attach(init(Some("J"), None, None)).unwrap();
    let mut spectator = registry.attach(init(None, Some("W"), None)).unwrap();
    assert_eq!(spectator.seat, Seat::Spectator);

    let mut moved = Player::spawn(Role::A);
    moved.x += 5.0;
    let reached = registry
        .relay(
            &creator.game,
            Seat::Creator,
            Event::Play {
                player: moved.snapshot(),
            },
        )
        .unwrap();
    assert_eq!(reached, 3);

    for rx in [&mut creator.rx, &mut joiner.rx, &mut spectator.rx] {
        assert_eq!(decode(&rx.recv().await.unwrap()).x, moved.x);
    }
    assert_eq!(creator.game.latest(Role::A), Some(moved.snapshot()));
}

#[tokio::test]
async fn test_late_spectator_sees_latest_state_only() {
    let registry = GameRegistry::new();
    let creator = registry.attach(init(Some("J"), Some("W"), None)).unwrap();

    let mut player = Player::spawn(Role::A);
    for _ in 0..3 {
        player.x += 5.0;
        registry
            .relay(&creator.game, Seat::Creator, Event::Play { player: player.snapshot() })
            .unwrap();
    }

    let spectator = registry.attach(init(None, Some("W"), None)).unwrap();
    assert_eq!(
        spectator.replies,
        vec![Event::Play {
            player: player.snapshot()
        }]
    );
}

#[tokio::test]
async fn test_only_play_events_are_relayed() {
    let registry = GameRegistry::new();
    let creator = registry.attach(init(Some("J"), Some("W"), None)).unwrap();
    let spectator = registry.attach(init(None, Some("W"), None)).unwrap();

    assert_eq!(
        registry.relay(&creator.game, Seat::Creator, Event::Win),
        Err(RelayError::ExpectedPlay)
    );
    assert_eq!(
        registry.relay(
            &spectator.game,
            Seat::Spectator,
            Event::Play {
                player: Player::spawn(Role::A).snapshot()
            }
        ),
        Err(RelayError::SpectatorsCannotPlay)
    );
}

#[tokio::test]
async fn test_creator_leaving_removes_keys() {
    let registry = GameRegistry::new();
    let creator = registry.attach(init(Some("J"), Some("W"), None)).unwrap();
    let joiner = registry.attach(init(Some("J"), None, None)).unwrap();

    registry.detach(&joiner.game, joiner.seat);
    assert_eq!(registry.active_games(), 1);

    registry.detach(&creator.game, creator.seat);
    assert_eq!(registry.active_games(), 0);
    assert_eq!(
        registry.attach(init(None, Some("W"), None)).err().unwrap(),
        RelayError::GameNotFound
    );
}

fn frame(event: &Event) -> String {
    event.to_json().unwrap()
}

#[tokio::test]
async fn test_connection_rejects_non_init_first_frame() {
    let games = Arc::new(GameRegistry::new());

    let play = frame(&Event::Play {
        player: Player::spawn(Role::A).snapshot(),
    });
    let rejection = Connection::open(Uuid::new_v4(), games.clone(), &play)
        .err()
        .unwrap();
    assert_eq!(rejection, Event::error("Expected an init event."));

    let garbage = Connection::open(Uuid::new_v4(), games.clone(), "not json")
        .err()
        .unwrap();
    assert!(matches!(garbage, Event::Error { .. }));
    assert_eq!(games.active_games(), 0);
}

#[tokio::test]
async fn test_connection_relays_and_rejects_frames() {
    let games = Arc::new(GameRegistry::new());
    let mut creator = Connection::open(
        Uuid::new_v4(),
        games.clone(),
        &frame(&init(Some("J"), Some("W"), None)),
    )
    .unwrap();
    assert_eq!(creator.replies, vec![init(Some("J"), Some("W"), None)]);

    let play = frame(&Event::Play {
        player: Player::spawn(Role::A).snapshot(),
    });
    assert_eq!(creator.connection.on_frame(&play), Inbound::Relayed(1));
    assert!(creator.rx.recv().await.is_ok());

    assert_eq!(
        creator.connection.on_frame(&frame(&Event::Win)),
        Inbound::Rejected(Event::error("Expected a play event."))
    );
}

#[tokio::test]
async fn test_connection_spectator_frames_ignored() {
    let games = Arc::new(GameRegistry::new());
    let _creator = Connection::open(
        Uuid::new_v4(),
        games.clone(),
        &frame(&init(Some("J"), Some("W"), None)),
    )
    .unwrap();
    let spectator = Connection::open(
        Uuid::new_v4(),
        games.clone(),
        &frame(&init(None, Some("W"), None)),
    )
    .unwrap();

    assert_eq!(spectator.connection.seat(), Seat::Spectator);
    let play = frame(&Event::Play {
        player: Player::spawn(Role::B).snapshot(),
    });
    assert_eq!(spectator.connection.on_frame(&play), Inbound::Ignored);
    assert_eq!(spectator.connection.game().latest(Role::B), None);
}

#[tokio::test]
async fn test_connection_rate_limit_drops_excess() {
    let games = Arc::new(GameRegistry::new());
    let creator = Connection::open_with_limiter(
        Uuid::new_v4(),
        games.clone(),
        &frame(&init(Some("J"), Some("W"), None)),
        PlayerRateLimiter::with_limit(2),
    )
    .unwrap();

    let play = frame(&Event::Play {
        player: Player::spawn(Role::A).snapshot(),
    });
    let outcomes: Vec<Inbound> = (0..4).map(|_| creator.connection.on_frame(&play)).collect();
    assert_eq!(
        outcomes.iter().filter(|o| **o == Inbound::RateLimited).count(),
        2
    );
}

#[tokio::test]
async fn test_closing_creator_connection_removes_keys() {
    let games = Arc::new(GameRegistry::new());
    let creator = Connection::open(
        Uuid::new_v4(),
        games.clone(),
        &frame(&init(Some("J"), Some("W"), None)),
    )
    .unwrap();
    let joiner = Connection::open(
        Uuid::new_v4(),
        games.clone(),
        &frame(&init(Some("J"), None, None)),
    )
    .unwrap();

    joiner.connection.close();
    assert_eq!(games.active_games(), 1);

    creator.connection.close();
    assert_eq!(games.active_games(), 0);
    assert_eq!(
        games.attach(init(Some("J"), None, None)).err().unwrap(),
        RelayError::GameNotFound
    );
}
