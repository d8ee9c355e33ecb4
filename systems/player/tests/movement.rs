use crossing_core::{Board, CellCoord, Direction, GameEvent, Key};
use crossing_engine::{Clock, Context, Controller, Signal};
use crossing_system_player::Player;
use crossing_world::{EntityKind, EntitySpec, Scope};
use glam::Vec2;

fn setup() -> (Player, Context) {
    let mut ctx = Context::new(Board::new(5, 3, 32.0, 0.0), Clock::default());
    let mut player = Player::new();
    player.create(&mut ctx).expect("player spawns");
    (player, ctx)
}

fn press(player: &mut Player, ctx: &mut Context, key: Key) {
    let _ = player
        .dispatch(&Signal::Key(key), ctx)
        .expect("movement never fails");
}

fn deliver(player: &mut Player, ctx: &mut Context, event: GameEvent) {
    let _ = player
        .dispatch(&Signal::Event(event), ctx)
        .expect("event handling never fails");
}

fn hop(direction: Direction, progress: bool) -> GameEvent {
    GameEvent::Hop {
        direction,
        progress,
    }
}

#[test]
fn spawns_on_the_start_cell() {
    let (player, ctx) = setup();

    assert_eq!(player.cell(), CellCoord::new(2, 0));
    let id = player.entity().expect("chicken entity");
    let entity = ctx.objects.get(id).expect("chicken is registered");
    assert_eq!(entity.kind(), EntityKind::Player);
    assert_eq!(entity.position(), Vec2::new(64.0, 64.0));
}

#[test]
fn pressing_up_on_the_top_row_is_ignored() {
    let (mut player, mut ctx) = setup();
    press(&mut player, &mut ctx, Key::Up);
    press(&mut player, &mut ctx, Key::Up);
    assert_eq!(player.cell(), CellCoord::new(2, 2));
    let _ = ctx.bus.drain();

    press(&mut player, &mut ctx, Key::Up);

    assert_eq!(player.cell(), CellCoord::new(2, 2));
    assert!(ctx.bus.is_empty());
}

#[test]
fn progress_is_reported_once_per_new_row() {
    let (mut player, mut ctx) = setup();

    press(&mut player, &mut ctx, Key::Up);
    press(&mut player, &mut ctx, Key::Down);
    press(&mut player, &mut ctx, Key::Char('w'));
    press(&mut player, &mut ctx, Key::Right);

    assert_eq!(
        ctx.bus.drain(),
        vec![
            hop(Direction::Up, true),
            hop(Direction::Down, false),
            hop(Direction::Up, false),
            hop(Direction::Right, false),
        ]
    );
}

#[test]
fn shifted_wasd_moves_like_lowercase() {
    let (mut player, mut ctx) = setup();

    press(&mut player, &mut ctx, Key::Char('W'));
    assert_eq!(player.cell(), CellCoord::new(2, 1));
    press(&mut player, &mut ctx, Key::Char('D'));
    assert_eq!(player.cell(), CellCoord::new(3, 1));
    press(&mut player, &mut ctx, Key::Char('A'));
    assert_eq!(player.cell(), CellCoord::new(2, 1));
    press(&mut player, &mut ctx, Key::Char('S'));
    assert_eq!(player.cell(), CellCoord::new(2, 0));

    assert_eq!(ctx.bus.drain().len(), 4);
}

#[test]
fn sideways_moves_are_clamped_to_the_board() {
    let (mut player, mut ctx) = setup();

    for _ in 0..4 {
        press(&mut player, &mut ctx, Key::Left);
    }

    assert_eq!(player.cell(), CellCoord::new(0, 0));
    assert_eq!(ctx.bus.len(), 2);
}

#[test]
fn vehicle_contact_posts_die_once_until_reset() {
    let (mut player, mut ctx) = setup();
    let mut traffic = Scope::new();
    let _ = traffic.create(
        &mut ctx.objects,
        EntitySpec::new(EntityKind::Vehicle, Vec2::new(60.0, 64.0), Vec2::splat(32.0))
            .collidable(),
    );

    player.tick(&mut ctx).expect("tick succeeds");
    player.tick(&mut ctx).expect("tick succeeds");
    assert_eq!(ctx.bus.drain(), vec![GameEvent::Die]);

    press(&mut player, &mut ctx, Key::Up);
    assert!(ctx.bus.is_empty());

    deliver(&mut player, &mut ctx, GameEvent::Reset);
    player.tick(&mut ctx).expect("tick succeeds");
    assert_eq!(ctx.bus.drain(), vec![GameEvent::Die]);
}

#[test]
fn reaching_the_goal_posts_win() {
    let (mut player, mut ctx) = setup();
    let mut level = Scope::new();
    let _ = level.create(
        &mut ctx.objects,
        EntitySpec::new(EntityKind::Goal, Vec2::ZERO, Vec2::new(160.0, 32.0)).collidable(),
    );
    press(&mut player, &mut ctx, Key::Up);
    press(&mut player, &mut ctx, Key::Up);
    let _ = ctx.bus.drain();

    player.tick(&mut ctx).expect("tick succeeds");

    assert_eq!(ctx.bus.drain(), vec![GameEvent::Win]);
}

#[test]
fn touching_edges_are_not_a_collision() {
    let (mut player, mut ctx) = setup();
    let mut traffic = Scope::new();
    let _ = traffic.create(
        &mut ctx.objects,
        EntitySpec::new(EntityKind::Vehicle, Vec2::new(64.0, 32.0), Vec2::splat(32.0))
            .collidable(),
    );

    player.tick(&mut ctx).expect("tick succeeds");

    assert!(ctx.bus.is_empty());
}

#[test]
fn reset_returns_to_start_and_clears_progress() {
    let (mut player, mut ctx) = setup();
    press(&mut player, &mut ctx, Key::Up);
    press(&mut player, &mut ctx, Key::Left);
    let _ = ctx.bus.drain();

    deliver(&mut player, &mut ctx, GameEvent::Reset);
    press(&mut player, &mut ctx, Key::Up);

    assert_eq!(player.cell(), CellCoord::new(2, 1));
    assert_eq!(ctx.bus.drain(), vec![hop(Direction::Up, true)]);
}

#[test]
fn disabled_movement_ignores_input_until_enabled() {
    let (mut player, mut ctx) = setup();

    deliver(&mut player, &mut ctx, GameEvent::DisableMovement);
    press(&mut player, &mut ctx, Key::Up);
    assert_eq!(player.cell(), CellCoord::new(2, 0));
    assert!(player.is_frozen());

    deliver(&mut player, &mut ctx, GameEvent::EnableMovement);
    press(&mut player, &mut ctx, Key::Up);
    assert_eq!(player.cell(), CellCoord::new(2, 1));
}

#[test]
fn destroy_removes_the_chicken() {
    let (mut player, mut ctx) = setup();

    player.destroy(&mut ctx).expect("destroy succeeds");

    assert!(ctx.objects.is_empty());
}
