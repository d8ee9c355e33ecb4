use crossing_core::{Board, Direction, GameEvent, Phase, PhaseMessage, Transition};
use crossing_engine::{Clock, Context, Controller, PhaseRequest, Signal};
use crossing_system_session::{Config, Session};

fn started(config: Config) -> (Session, Context) {
    let mut ctx = Context::new(Board::default(), Clock::default());
    let mut session = Session::new(config);
    session.create(&mut ctx).expect("session starts");
    (session, ctx)
}

fn deliver(session: &mut Session, ctx: &mut Context, event: GameEvent) {
    let _ = session
        .dispatch(&Signal::Event(event), ctx)
        .expect("session handlers never fail");
}

fn hop(progress: bool) -> GameEvent {
    GameEvent::Hop {
        direction: Direction::Up,
        progress,
    }
}

#[test]
fn create_publishes_the_opening_state() {
    let (_session, mut ctx) = started(Config::default());

    assert_eq!(
        ctx.bus.drain(),
        vec![GameEvent::SessionChanged {
            level: 1,
            score: 0,
            lives: 3,
        }]
    );
}

#[test]
fn only_progress_hops_score() {
    let (mut session, mut ctx) = started(Config::new(3, 100, 10));
    let _ = ctx.bus.drain();

    deliver(&mut session, &mut ctx, hop(true));
    deliver(&mut session, &mut ctx, hop(false));
    deliver(&mut session, &mut ctx, hop(true));

    assert_eq!(session.score(), 20);
    assert_eq!(ctx.bus.len(), 2);
}

#[test]
fn win_scales_bonus_by_level_and_resets() {
    let (mut session, mut ctx) = started(Config::new(3, 100, 10));
    let _ = ctx.bus.drain();

    deliver(&mut session, &mut ctx, GameEvent::Win);
    deliver(&mut session, &mut ctx, GameEvent::Win);

    assert_eq!(session.level(), 3);
    assert_eq!(session.score(), 300);
    assert_eq!(
        ctx.bus.drain(),
        vec![
            GameEvent::SessionChanged {
                level: 2,
                score: 100,
                lives: 3,
            },
            GameEvent::Reset,
            GameEvent::SessionChanged {
                level: 3,
                score: 300,
                lives: 3,
            },
            GameEvent::Reset,
        ]
    );
}

#[test]
fn losing_a_spare_life_resets_the_board() {
    let (mut session, mut ctx) = started(Config::new(2, 100, 10));
    let _ = ctx.bus.drain();

    deliver(&mut session, &mut ctx, GameEvent::Die);

    assert_eq!(session.lives(), 1);
    assert_eq!(
        ctx.bus.drain(),
        vec![
            GameEvent::SessionChanged {
                level: 1,
                score: 0,
                lives: 1,
            },
            GameEvent::Reset,
        ]
    );
    assert!(ctx.phase_requests().is_empty());
}

#[test]
fn last_life_requests_game_over_exactly_once() {
    let (mut session, mut ctx) = started(Config::new(2, 100, 10));
    deliver(&mut session, &mut ctx, hop(true));
    deliver(&mut session, &mut ctx, GameEvent::Win);
    deliver(&mut session, &mut ctx, GameEvent::Die);
    let _ = ctx.bus.drain();

    deliver(&mut session, &mut ctx, GameEvent::Die);
    deliver(&mut session, &mut ctx, GameEvent::Die);
    deliver(&mut session, &mut ctx, GameEvent::Win);

    assert!(session.is_finished());
    assert_eq!(session.lives(), 0);
    assert_eq!(
        ctx.phase_requests(),
        &[PhaseRequest {
            phase: Phase::GameOver,
            transition: Transition::Soft,
            message: PhaseMessage::new().with_score(110).with_level(2),
        }]
    );
    assert!(!ctx.bus.drain().contains(&GameEvent::Reset));
}
