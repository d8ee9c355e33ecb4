use std::time::Duration;

use crossing_core::{Board, GameEvent};
use crossing_engine::{Clock, Context, Controller, Signal};
use crossing_system_hud::{score_line, FpsCounter, Popup, ScoreText};
use crossing_world::EntityKind;

fn context() -> Context {
    Context::new(Board::default(), Clock::new(Duration::from_millis(100)))
}

fn popup_text(ctx: &Context) -> Option<(String, bool)> {
    ctx.objects
        .iter()
        .find(|entity| entity.kind() == EntityKind::Text)
        .map(|entity| (entity.text().unwrap_or_default().to_owned(), entity.is_visible()))
}

#[test]
fn score_text_follows_session_changes() {
    let mut ctx = context();
    let mut hud = ScoreText::new();
    hud.create(&mut ctx).expect("score text spawns");

    let event = GameEvent::SessionChanged {
        level: 2,
        score: 150,
        lives: 1,
    };
    let handled = hud
        .dispatch(&Signal::Event(event), &mut ctx)
        .expect("update succeeds");

    assert!(handled);
    let id = hud.text().expect("text entity");
    assert_eq!(
        ctx.objects.get(id).and_then(|entity| entity.text()),
        Some(score_line(2, 150, 1).as_str())
    );
}

#[test]
fn popup_freezes_input_while_visible() {
    let mut ctx = context();
    let mut popup = Popup::new(Duration::from_millis(150));
    popup.create(&mut ctx).expect("popup spawns");
    assert_eq!(popup_text(&ctx), Some((String::new(), false)));

    let _ = popup
        .dispatch(&Signal::Event(GameEvent::Die), &mut ctx)
        .expect("popup shows");

    assert!(popup.is_showing());
    assert_eq!(popup_text(&ctx), Some(("Splat!".to_owned(), true)));
    assert_eq!(ctx.bus.drain(), vec![GameEvent::DisableMovement]);

    ctx.clock.advance(Duration::from_millis(100));
    popup.tick(&mut ctx).expect("tick succeeds");
    assert!(popup.is_showing());
    assert!(ctx.bus.is_empty());

    ctx.clock.advance(Duration::from_millis(100));
    popup.tick(&mut ctx).expect("tick succeeds");
    assert!(!popup.is_showing());
    assert_eq!(popup_text(&ctx).map(|(_, visible)| visible), Some(false));
    assert_eq!(ctx.bus.drain(), vec![GameEvent::EnableMovement]);
}

#[test]
fn popup_win_banner_differs_from_die() {
    let mut ctx = context();
    let mut popup = Popup::default();
    popup.create(&mut ctx).expect("popup spawns");

    let _ = popup
        .dispatch(&Signal::Event(GameEvent::Win), &mut ctx)
        .expect("popup shows");

    assert_eq!(popup_text(&ctx), Some(("Crossed!".to_owned(), true)));
}

#[test]
fn fps_counter_reports_the_clock() {
    let mut ctx = context();
    let mut counter = FpsCounter::new();
    counter.create(&mut ctx).expect("counter spawns");

    for _ in 0..10 {
        ctx.clock.advance(Duration::from_millis(25));
        counter.tick(&mut ctx).expect("tick succeeds");
    }

    let text = ctx
        .objects
        .iter()
        .find_map(|entity| entity.text())
        .expect("fps text");
    assert_eq!(text, "40 FPS");
}
