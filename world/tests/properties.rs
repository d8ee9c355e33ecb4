//! Property tests for wrap-around and collision invariants.

use std::time::Duration;

use crossing_world::{EntityKind, EntitySpec, Objects, Scope, Wrap};
use glam::Vec2;
use proptest::prelude::*;

const SPAN: f32 = 480.0;

fn coordinate() -> impl Strategy<Value = f32> {
    (-2_000i32..2_000i32).prop_map(|value| value as f32 * 0.5)
}

fn extent() -> impl Strategy<Value = f32> {
    (1i32..400i32).prop_map(|value| value as f32 * 0.5)
}

fn speed() -> impl Strategy<Value = f32> {
    prop_oneof![(1i32..500i32), (-500i32..-1i32)].prop_map(|value| value as f32)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn wrap_preserves_lane(
        x in coordinate(),
        y in coordinate(),
        width in extent(),
        height in extent(),
        velocity in speed(),
        millis in 0u64..100,
    ) {
        let mut objects = Objects::new();
        let mut scope = Scope::new();
        let id = scope.create(
            &mut objects,
            EntitySpec::new(EntityKind::Vehicle, Vec2::new(x, y), Vec2::new(width, height))
                .with_velocity(Vec2::new(velocity, 0.0))
                .wrapping(Wrap::within(SPAN)),
        );

        scope
            .tick(&mut objects, Duration::from_millis(millis))
            .expect("owned entity ticks");

        let entity = objects.get(id).expect("entity alive");
        prop_assert_eq!(entity.position().y, y);
        prop_assert_eq!(entity.rect().top(), y);
        prop_assert_eq!(entity.size(), Vec2::new(width, height));
        prop_assert_eq!(entity.velocity(), Vec2::new(velocity, 0.0));
    }

    #[test]
    fn wrapped_entities_move_back_by_one_cycle(
        y in coordinate(),
        width in extent(),
        velocity in speed(),
        overshoot in 0i32..200,
    ) {
        let x = if velocity > 0.0 {
            SPAN + overshoot as f32
        } else {
            -width - overshoot as f32
        };
        let mut objects = Objects::new();
        let mut scope = Scope::new();
        let id = scope.create(
            &mut objects,
            EntitySpec::new(EntityKind::Vehicle, Vec2::new(x, y), Vec2::new(width, 32.0))
                .with_velocity(Vec2::new(velocity, 0.0))
                .wrapping(Wrap::within(SPAN)),
        );

        scope.tick(&mut objects, Duration::ZERO).expect("owned entity ticks");

        let entity = objects.get(id).expect("entity alive");
        let overshoot = overshoot as f32;
        let expected = if velocity > 0.0 {
            -width + overshoot
        } else {
            SPAN - overshoot
        };
        prop_assert_eq!(entity.position(), Vec2::new(expected, y));
    }

    #[test]
    fn disjoint_rectangles_never_collide(
        x in coordinate(),
        y in coordinate(),
        width in extent(),
        height in extent(),
        gap in 0i32..100,
        other_width in extent(),
        other_height in extent(),
        horizontal in any::<bool>(),
    ) {
        let gap = gap as f32;
        let other_position = if horizontal {
            Vec2::new(x + width + gap, y)
        } else {
            Vec2::new(x, y + height + gap)
        };
        let mut objects = Objects::new();
        let mut scope = Scope::new();
        let first = scope.create(
            &mut objects,
            EntitySpec::new(EntityKind::Player, Vec2::new(x, y), Vec2::new(width, height))
                .collidable(),
        );
        let second = scope.create(
            &mut objects,
            EntitySpec::new(
                EntityKind::Vehicle,
                other_position,
                Vec2::new(other_width, other_height),
            )
            .collidable(),
        );

        prop_assert!(objects.collision(first).is_none());
        prop_assert!(objects.collision(second).is_none());
    }
}
