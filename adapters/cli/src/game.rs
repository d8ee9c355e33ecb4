//! Wiring between the phase table and the concrete controllers.

use crossing_core::{ControllerKind, Phase, PhaseMessage};
use crossing_engine::{Controller, ControllerFactory, EngineError, PhaseTable};
use crossing_highscores::HighScoreTable;
use crossing_system_hud::{FpsCounter, Popup, ScoreText};
use crossing_system_menus::{GameOver, HighScoreEntry, Menu, Scoreboard};
use crossing_system_player::Player;
use crossing_system_session::{self as session, Session};
use crossing_system_traffic::{self as traffic, Level};

/// Controllers active in each phase, in creation and dispatch order.
pub(crate) fn phase_table() -> PhaseTable {
    PhaseTable::new()
        .with_phase(
            Phase::Menu,
            [ControllerKind::Menu, ControllerKind::FpsCounter],
        )
        .with_phase(
            Phase::Game,
            [
                ControllerKind::Session,
                ControllerKind::Player,
                ControllerKind::Level,
                ControllerKind::ScoreText,
                ControllerKind::FpsCounter,
                ControllerKind::Popup,
            ],
        )
        .with_phase(
            Phase::GameOver,
            [
                ControllerKind::Session,
                ControllerKind::GameOver,
                ControllerKind::FpsCounter,
                ControllerKind::HighScoreEntry,
            ],
        )
        .with_phase(
            Phase::HighScores,
            [ControllerKind::Scoreboard, ControllerKind::FpsCounter],
        )
}

/// Builds controllers from the command-line configuration.
#[derive(Debug)]
pub(crate) struct GameFactory {
    highscores: HighScoreTable,
    traffic: traffic::Config,
    session: session::Config,
}

impl GameFactory {
    pub(crate) fn new(
        highscores: HighScoreTable,
        traffic: traffic::Config,
        session: session::Config,
    ) -> Self {
        Self {
            highscores,
            traffic,
            session,
        }
    }
}

impl ControllerFactory for GameFactory {
    fn build(
        &mut self,
        kind: ControllerKind,
        message: &PhaseMessage,
    ) -> Result<Box<dyn Controller>, EngineError> {
        let controller: Box<dyn Controller> = match kind {
            ControllerKind::Menu => Box::new(Menu::new()),
            ControllerKind::Session => Box::new(Session::new(self.session)),
            ControllerKind::Player => Box::new(Player::new()),
            ControllerKind::Level => Box::new(Level::new(self.traffic.clone())),
            ControllerKind::ScoreText => Box::new(ScoreText::new()),
            ControllerKind::Popup => Box::new(Popup::default()),
            ControllerKind::FpsCounter => Box::new(FpsCounter::new()),
            ControllerKind::GameOver => Box::new(GameOver::new(message)),
            ControllerKind::HighScoreEntry => {
                Box::new(HighScoreEntry::new(self.highscores.clone(), message))
            }
            ControllerKind::Scoreboard => Box::new(Scoreboard::new(self.highscores.clone())),
        };
        Ok(controller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossing_core::{Board, Key};
    use crossing_engine::{Engine, EngineConfig};
    use std::{fs, time::Duration};
    use tempfile::TempDir;

    const STEP: Duration = Duration::from_millis(16);

    fn engine(dir: &TempDir, debug_keys: bool) -> Engine<GameFactory> {
        let factory = GameFactory::new(
            HighScoreTable::new(dir.path().join("highscores.csv")),
            traffic::Config::default(),
            session::Config::new(3, 100, 10),
        );
        let config = EngineConfig::new(
            Phase::Menu,
            Board::default(),
            debug_keys,
            Duration::from_millis(50),
        );
        Engine::new(config, phase_table(), factory).expect("menu starts")
    }

    fn step(engine: &mut Engine<GameFactory>, keys: &[Key]) {
        let _ = engine.frame(STEP, keys).expect("frame succeeds");
    }

    fn active_kinds(engine: &Engine<GameFactory>) -> Vec<ControllerKind> {
        engine
            .controllers()
            .iter()
            .map(|controller| controller.kind())
            .collect()
    }

    #[test]
    fn factory_builds_every_kind_in_the_table() {
        let dir = TempDir::new().expect("temporary directory");
        let mut factory = GameFactory::new(
            HighScoreTable::new(dir.path().join("highscores.csv")),
            traffic::Config::default(),
            session::Config::default(),
        );
        let table = phase_table();

        for phase in [Phase::Menu, Phase::Game, Phase::GameOver, Phase::HighScores] {
            for kind in table.controllers(phase).expect("phase is listed") {
                let controller = factory
                    .build(*kind, &PhaseMessage::new())
                    .expect("controller builds");
                assert_eq!(controller.kind(), *kind);
            }
        }
    }

    #[test]
    fn a_full_round_records_a_high_score() {
        let dir = TempDir::new().expect("temporary directory");
        let mut engine = engine(&dir, true);
        assert_eq!(
            active_kinds(&engine),
            vec![ControllerKind::Menu, ControllerKind::FpsCounter]
        );

        step(&mut engine, &[Key::Enter]);
        assert_eq!(engine.phase(), Phase::Game);
        assert_eq!(active_kinds(&engine).len(), 6);

        for _ in 0..3 {
            step(&mut engine, &[Key::Char('m')]);
        }
        assert_eq!(engine.phase(), Phase::Game);
        step(&mut engine, &[]);
        assert_eq!(engine.phase(), Phase::GameOver);
        assert!(active_kinds(&engine).contains(&ControllerKind::HighScoreEntry));

        step(&mut engine, &[Key::Char('z'), Key::Char('e'), Key::Char('d')]);
        step(&mut engine, &[Key::Enter]);
        assert_eq!(engine.phase(), Phase::HighScores);
        let raw = fs::read_to_string(dir.path().join("highscores.csv")).expect("score saved");
        assert_eq!(raw, "zed,0\n");

        step(&mut engine, &[Key::Enter]);
        assert_eq!(engine.phase(), Phase::Menu);
        assert_eq!(
            active_kinds(&engine),
            vec![ControllerKind::Menu, ControllerKind::FpsCounter]
        );
    }

    #[test]
    fn escape_finishes_the_run() {
        let dir = TempDir::new().expect("temporary directory");
        let mut engine = engine(&dir, false);

        let frame = engine.frame(STEP, &[Key::Escape]).expect("frame succeeds");

        assert!(frame.finished);
        assert!(!engine.is_running());
        assert!(engine.controllers().is_empty());
    }
}
