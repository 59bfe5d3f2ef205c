use crate::error::GeometryError;
use crate::track::{RoadTrack, Seed, TrackGeometry};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info};

pub(crate) const MAX_SPEED: u8 = 5;
pub(crate) const DEFAULT_SPEED: u8 = 3;

/// Columns moved per arrow key press.
pub(crate) const KEY_STEP: i32 = 2;

pub(crate) const TICK_MICROS_MIN: u64 = 35_000;
pub(crate) const TICK_MICROS_MAX: u64 = 150_000;

/// HUD line, three sprite rows and one row of road ahead.
pub(crate) const MIN_ROWS: i32 = 5;

// car nose sits this many rows above the bottom edge
const PLAYER_ROW_FROM_BOTTOM: i32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputEvent {
    MoveLeft,
    MoveRight,
    SpeedUp,
    SpeedDown,
    SetColumn(i32),
    Restart,
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Phase {
    Running,
    /// Off the road; waiting for restart or quit.
    Paused,
    Terminated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PlayerCar {
    pub(crate) column: i32,
    pub(crate) row: i32,
    pub(crate) speed: u8,
    pub(crate) score: u64,
}

/// Tunables that survive restarts and resizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rules {
    pub(crate) half_width: i32,
    pub(crate) margin: i32,
    pub(crate) step_bound: i32,
    pub(crate) start_speed: u8,
    pub(crate) curvy_start: bool,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            half_width: 12,
            margin: 2,
            step_bound: 3,
            start_speed: DEFAULT_SPEED,
            curvy_start: false,
        }
    }
}

pub(crate) struct Game {
    rules: Rules,
    track: RoadTrack,
    player: PlayerCar,
    phase: Phase,
    rng: StdRng,
}

impl Game {
    pub(crate) fn new(
        width: i32,
        rows: i32,
        rules: Rules,
        seed: u64,
    ) -> Result<Self, GeometryError> {
        let track = build_track(width, rows, &rules)?;
        let column = track.geometry().mid_center();
        let mut game = Self {
            rules,
            track,
            player: PlayerCar {
                column,
                row: rows - PLAYER_ROW_FROM_BOTTOM,
                speed: rules.start_speed.min(MAX_SPEED),
                score: 0,
            },
            phase: Phase::Running,
            rng: StdRng::seed_from_u64(seed),
        };
        game.clamp_player();
        Ok(game)
    }

    pub(crate) fn apply_input(&mut self, ev: InputEvent) {
        match (self.phase, ev) {
            (Phase::Terminated, _) => {}
            (_, InputEvent::Quit) => self.phase = Phase::Terminated,
            (Phase::Paused, InputEvent::Restart) => self.restart(),
            (Phase::Paused, _) => {}
            (Phase::Running, ev) => {
                let p = &mut self.player;
                match ev {
                    InputEvent::MoveLeft => p.column -= KEY_STEP,
                    InputEvent::MoveRight => p.column += KEY_STEP,
                    InputEvent::SpeedUp => p.speed = (p.speed + 1).min(MAX_SPEED),
                    InputEvent::SpeedDown => p.speed = p.speed.saturating_sub(1),
                    InputEvent::SetColumn(x) => p.column = x,
                    InputEvent::Restart | InputEvent::Quit => {}
                }
                self.clamp_player();
            }
        }
    }

    /// Scrolls the road `1 + speed/2` rows and scores one point per row.
    /// Returns the number of rows scrolled.
    pub(crate) fn tick(&mut self) -> u32 {
        if self.phase != Phase::Running {
            return 0;
        }
        let steps = 1 + u32::from(self.player.speed) / 2;
        for _ in 0..steps {
            self.track.scroll_and_generate(&mut self.rng);
        }
        self.player.score += u64::from(steps);
        steps
    }

    /// Moves to `Paused` and returns true when the car has left the road.
    pub(crate) fn check_collision(&mut self) -> bool {
        if self.phase != Phase::Running || self.on_track() {
            return false;
        }
        info!(
            score = self.player.score,
            column = self.player.column,
            center = self.track.center_at(self.player.row),
            "crashed"
        );
        self.phase = Phase::Paused;
        true
    }

    pub(crate) fn on_track(&self) -> bool {
        self.track.contains(self.player.row, self.player.column)
    }

    pub(crate) fn restart(&mut self) {
        info!(previous_score = self.player.score, "restart");
        self.track.reseed_flat();
        self.player.column = self.track.geometry().mid_center();
        self.player.speed = self.rules.start_speed.min(MAX_SPEED);
        self.player.score = 0;
        self.phase = Phase::Running;
    }

    /// Rebuilds a flat track for the new terminal size and puts the car back
    /// on its center. Score, speed and phase are kept.
    pub(crate) fn resize(&mut self, width: i32, rows: i32) -> Result<(), GeometryError> {
        let flat = Rules {
            curvy_start: false,
            ..self.rules
        };
        self.track = build_track(width, rows, &flat)?;
        self.player.row = rows - PLAYER_ROW_FROM_BOTTOM;
        self.player.column = self.track.geometry().mid_center();
        self.clamp_player();
        debug!(width, rows, "track rebuilt after resize");
        Ok(())
    }

    fn clamp_player(&mut self) {
        let width = self.track.geometry().width;
        self.player.column = self.player.column.clamp(1, width - 2);
    }

    pub(crate) fn hud(&self) -> (u64, u8) {
        (self.player.score, self.player.speed)
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn player(&self) -> &PlayerCar {
        &self.player
    }

    pub(crate) fn track(&self) -> &RoadTrack {
        &self.track
    }
}

fn build_track(width: i32, rows: i32, rules: &Rules) -> Result<RoadTrack, GeometryError> {
    if rows < MIN_ROWS {
        return Err(GeometryError::TooShort {
            rows,
            required: MIN_ROWS,
        });
    }
    let geometry = TrackGeometry::new(width, rules.half_width, rules.margin, rules.step_bound)?;
    let mid = geometry.mid_center();
    let seed = if rules.curvy_start {
        Seed::curvy(mid)
    } else {
        Seed::Flat(mid)
    };
    RoadTrack::create(rows, geometry, seed)
}

/// Sleep between ticks, linear from `TICK_MICROS_MAX` at speed 0 down to
/// `TICK_MICROS_MIN` at top speed.
pub(crate) fn compute_tick_delay(speed_level: u8) -> Duration {
    let s = u64::from(speed_level.min(MAX_SPEED));
    let span = TICK_MICROS_MAX - TICK_MICROS_MIN;
    Duration::from_micros(TICK_MICROS_MAX - span * s / u64::from(MAX_SPEED))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_40x24() -> Game {
        Game::new(40, 24, Rules::default(), 1234).unwrap()
    }

    #[test]
    fn test_new_game_starts_centered_on_track() {
        let g = game_40x24();
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.player().column, 20);
        assert_eq!(g.player().row, 21);
        assert_eq!(g.hud(), (0, DEFAULT_SPEED));
        assert!(g.on_track());
    }

    #[test]
    fn test_new_game_rejects_degenerate_terminal() {
        assert!(matches!(
            Game::new(40, 4, Rules::default(), 0),
            Err(GeometryError::TooShort { rows: 4, required: 5 })
        ));
        assert!(matches!(
            Game::new(20, 24, Rules::default(), 0),
            Err(GeometryError::TooNarrow { .. })
        ));
    }

    #[test]
    fn test_tick_delay_endpoints_and_linearity() {
        assert_eq!(compute_tick_delay(5), Duration::from_micros(TICK_MICROS_MIN));
        assert_eq!(compute_tick_delay(0), Duration::from_micros(TICK_MICROS_MAX));
        assert_eq!(compute_tick_delay(3), Duration::from_micros(81_000));
        assert_eq!(compute_tick_delay(9), Duration::from_micros(TICK_MICROS_MIN));

        let delays: Vec<u128> = (0..=5).map(|s| compute_tick_delay(s).as_micros()).collect();
        let steps: Vec<u128> = delays.windows(2).map(|w| w[0] - w[1]).collect();
        assert!(steps.iter().all(|&d| d == 23_000));
    }

    #[test]
    fn test_tick_steps_follow_speed() {
        let mut g = game_40x24();
        let expected = [1, 1, 2, 2, 3, 3];
        for (speed, &steps) in expected.iter().enumerate() {
            g.player.speed = speed as u8;
            let before = g.player.score;
            assert_eq!(g.tick(), steps);
            assert_eq!(g.player.score - before, u64::from(steps));
        }
    }

    #[test]
    fn test_keyboard_moves_and_clamps() {
        let mut g = game_40x24();
        g.apply_input(InputEvent::MoveLeft);
        assert_eq!(g.player().column, 18);
        g.apply_input(InputEvent::MoveRight);
        g.apply_input(InputEvent::MoveRight);
        assert_eq!(g.player().column, 22);
        for _ in 0..40 {
            g.apply_input(InputEvent::MoveLeft);
        }
        assert_eq!(g.player().column, 1);
        for _ in 0..40 {
            g.apply_input(InputEvent::MoveRight);
        }
        assert_eq!(g.player().column, 38);
    }

    #[test]
    fn test_set_column_clamps_and_last_writer_wins() {
        let mut g = game_40x24();
        g.apply_input(InputEvent::SetColumn(-10));
        assert_eq!(g.player().column, 1);
        g.apply_input(InputEvent::SetColumn(500));
        assert_eq!(g.player().column, 38);
        g.apply_input(InputEvent::SetColumn(12));
        g.apply_input(InputEvent::SetColumn(27));
        assert_eq!(g.player().column, 27);
    }

    #[test]
    fn test_speed_is_bounded() {
        let mut g = game_40x24();
        for _ in 0..10 {
            g.apply_input(InputEvent::SpeedUp);
        }
        assert_eq!(g.player().speed, MAX_SPEED);
        for _ in 0..10 {
            g.apply_input(InputEvent::SpeedDown);
        }
        assert_eq!(g.player().speed, 0);
    }

    #[test]
    fn test_collision_pauses_and_freezes_input() {
        let mut g = game_40x24();
        g.apply_input(InputEvent::SetColumn(1));
        assert!(g.check_collision());
        assert_eq!(g.phase(), Phase::Paused);

        let frozen = *g.player();
        g.apply_input(InputEvent::MoveRight);
        g.apply_input(InputEvent::SpeedUp);
        g.apply_input(InputEvent::SetColumn(20));
        assert_eq!(*g.player(), frozen);
        assert_eq!(g.tick(), 0);
        assert!(!g.check_collision());
        assert_eq!(g.phase(), Phase::Paused);
    }

    #[test]
    fn test_boundary_column_is_a_collision() {
        let mut g = game_40x24();
        g.apply_input(InputEvent::SetColumn(9));
        assert!(!g.check_collision());
        g.apply_input(InputEvent::SetColumn(8));
        assert!(g.check_collision());
    }

    #[test]
    fn test_restart_after_crash_at_42() {
        let mut g = game_40x24();
        for _ in 0..30 {
            g.tick();
        }
        g.player.score = 42;
        g.player.speed = 5;
        g.apply_input(InputEvent::SetColumn(2));
        assert!(g.check_collision());

        g.apply_input(InputEvent::Restart);
        assert_eq!(g.phase(), Phase::Running);
        assert_eq!(g.hud(), (0, DEFAULT_SPEED));
        assert_eq!(g.player().column, 20);
        assert!(g.track().centers().all(|c| c == 20));
        assert!(g.on_track());
        assert!(!g.check_collision());
    }

    #[test]
    fn test_restart_ignored_while_running() {
        let mut g = game_40x24();
        g.tick();
        let score = g.player().score;
        g.apply_input(InputEvent::Restart);
        assert_eq!(g.player().score, score);
        assert_eq!(g.phase(), Phase::Running);
    }

    #[test]
    fn test_quit_from_any_phase() {
        let mut g = game_40x24();
        g.apply_input(InputEvent::Quit);
        assert_eq!(g.phase(), Phase::Terminated);
        g.apply_input(InputEvent::Restart);
        assert_eq!(g.phase(), Phase::Terminated);

        let mut g = game_40x24();
        g.apply_input(InputEvent::SetColumn(1));
        g.check_collision();
        g.apply_input(InputEvent::Quit);
        assert_eq!(g.phase(), Phase::Terminated);
    }

    #[test]
    fn test_resize_keeps_score_and_recenters_player() {
        let mut g = game_40x24();
        g.tick();
        g.apply_input(InputEvent::SetColumn(30));
        assert!(!g.check_collision());
        let (score, speed) = g.hud();

        g.resize(32, 10).unwrap();
        assert_eq!(g.hud(), (score, speed));
        assert_eq!(g.player().row, 7);
        assert_eq!(g.player().column, 16);
        assert_eq!(g.track().rows(), 10);
        assert!(g.on_track());
        assert!(!g.check_collision());
        assert_eq!(g.phase(), Phase::Running);

        assert!(g.resize(10, 10).is_err());
        assert_eq!(g.track().rows(), 10);
    }

    #[test]
    fn test_driving_centered_survives_long_run() {
        let mut g = game_40x24();
        for _ in 0..2000 {
            let center = g.track().center_at(g.player().row);
            g.apply_input(InputEvent::SetColumn(center));
            g.tick();
            assert!(!g.check_collision());
        }
        assert!(g.player().score >= 2000);
    }

    #[test]
    fn test_curvy_start_is_on_track() {
        let rules = Rules {
            curvy_start: true,
            ..Rules::default()
        };
        let g = Game::new(60, 30, rules, 9).unwrap();
        assert!(g.track().centers().any(|c| c != 30));
        assert!(g.on_track());
    }
}
