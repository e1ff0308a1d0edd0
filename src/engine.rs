use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::error::GameError;
use crate::food::FoodGenerator;
use crate::input::Key;
use crate::snake::{Direction, Snake};
use crate::{Coords, GridInt};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Coords,
    /// Direction the next update moves in
    pub direction: Direction,
    /// Direction of the last completed move, also checked by the reversal guard
    pub heading: Direction,
    pub score: u32,
    pub phase: Phase,
}

impl GameState {
    pub fn new(origin: Coords, food: Coords) -> Self {
        GameState {
            snake: Snake::new(origin),
            food,
            direction: Direction::Right,
            heading: Direction::Right,
            score: 0,
            phase: Phase::NotStarted,
        }
    }

    pub fn started(&self) -> bool {
        self.phase == Phase::Running
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameOverReport {
    /// Score reached before the reset
    pub score: u32,
    /// The snake filled the whole board
    pub won: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Moved,
    Ate { score: u32 },
    GameOver(GameOverReport),
}

/// Wall or self collision of the current head.
pub fn check_collision(state: &GameState, width: GridInt, height: GridInt) -> bool {
    let (x, y) = state.snake.head();

    if x < 0 || x >= width || y < 0 || y >= height {
        return true;
    }

    state.snake.head_hits_body()
}

pub struct GameEngine {
    config: GameConfig,
    state: GameState,
    food: FoodGenerator,
    rng: StdRng,
}

impl GameEngine {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let food = FoodGenerator::new(config.grid_width, config.grid_height);
        let state = Self::initial_state(&config, &food, &mut rng)?;

        Ok(GameEngine { config, state, food, rng })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn update(&mut self) -> Result<TickOutcome, GameError> {
        if !self.state.started() {
            return Ok(TickOutcome::Idle);
        }

        let direction = self.state.direction;
        let new_head = self.state.snake.push_head(direction);
        self.state.heading = direction;

        let mut outcome = TickOutcome::Moved;

        if new_head == self.state.food {
            self.state.score += 1;
            debug!(score = self.state.score, ?new_head, "ate food");

            match self.food.spawn(&self.state.snake, &mut self.rng) {
                Ok(food) => self.state.food = food,
                Err(GameError::BoardFull) => {
                    warn!(score = self.state.score, "snake fills the board");
                    return self.game_over(true).map(TickOutcome::GameOver);
                }
                Err(e) => return Err(e),
            }

            outcome = TickOutcome::Ate { score: self.state.score };
        } else {
            self.state.snake.drop_tail();
        }

        if check_collision(&self.state, self.config.grid_width, self.config.grid_height) {
            return self.game_over(false).map(TickOutcome::GameOver);
        }

        Ok(outcome)
    }

    /// Ends the round and resets the state in place. The report carries the score reached before the reset.
    pub fn game_over(&mut self, won: bool) -> Result<GameOverReport, GameError> {
        let report = GameOverReport { score: self.state.score, won };
        info!(score = report.score, won, head = ?self.state.snake.head(), "round over");

        self.state = Self::initial_state(&self.config, &self.food, &mut self.rng)?;
        Ok(report)
    }

    pub fn on_key(&mut self, key: Key) {
        let direction = match key {
            Key::Arrow(direction) => direction,
            Key::Quit | Key::Other => return,
        };

        if !self.state.started() {
            self.state.phase = Phase::Running;
            info!("round started");
        }

        // The pending direction and the last move are both guarded, so no
        // sequence of presses within one tick turns the snake back on itself
        if !direction.is_opposite(self.state.direction) && !direction.is_opposite(self.state.heading) {
            self.state.direction = direction;
        }
    }

    fn initial_state(config: &GameConfig, food: &FoodGenerator, rng: &mut StdRng) -> Result<GameState, GameError> {
        let snake = Snake::new(config.origin);
        let food = food.spawn(&snake, rng)?;
        Ok(GameState::new(config.origin, food))
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::*;

    fn engine() -> GameEngine {
        let config = GameConfig { seed: Some(3), ..Default::default() };
        GameEngine::new(config).unwrap()
    }

    fn segments(state: &GameState) -> Vec<Coords> {
        state.snake.body().iter().copied().collect()
    }

    fn state_with(segments: &[Coords], direction: Direction, food: Coords) -> GameState {
        GameState {
            snake: Snake::from_segments(segments).unwrap(),
            food,
            direction,
            heading: direction,
            score: 0,
            phase: Phase::Running,
        }
    }

    #[test]
    fn test_initial_state() {
        let engine = engine();
        let state = engine.state();

        assert_eq!(segments(state), vec![(10, 10)]);
        assert_eq!(state.direction, Right);
        assert_eq!(state.score, 0);
        assert!(!state.started());
        assert_ne!(state.food, (10, 10));
    }

    #[test]
    fn test_update_before_start_is_idle() {
        let mut engine = engine();
        let before = engine.state().clone();

        assert_eq!(engine.update(), Ok(TickOutcome::Idle));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_move_without_food() {
        let mut engine = engine();
        *engine.state_mut() = state_with(&[(10, 10)], Right, (3, 3));

        assert_eq!(engine.update(), Ok(TickOutcome::Moved));
        assert_eq!(segments(engine.state()), vec![(11, 10)]);
        assert_eq!(engine.state().score, 0);
    }

    #[test]
    fn test_move_onto_food_grows() {
        let mut engine = engine();
        *engine.state_mut() = state_with(&[(10, 10)], Right, (11, 10));

        assert_eq!(engine.update(), Ok(TickOutcome::Ate { score: 1 }));
        let state = engine.state();
        assert_eq!(segments(state), vec![(11, 10), (10, 10)]);
        assert_eq!(state.score, 1);
        assert!(!state.snake.contains(&state.food));
    }

    #[test]
    fn test_segments_follow_the_head() {
        let mut engine = engine();
        *engine.state_mut() = state_with(&[(5, 5), (4, 5), (3, 5)], Down, (15, 15));

        engine.update().unwrap();
        assert_eq!(segments(engine.state()), vec![(5, 6), (5, 5), (4, 5)]);
    }

    #[test]
    fn test_wall_collision_resets() {
        let mut engine = engine();
        let mut state = state_with(&[(0, 5)], Left, (3, 3));
        state.score = 4;
        *engine.state_mut() = state;

        let outcome = engine.update().unwrap();
        assert_eq!(outcome, TickOutcome::GameOver(GameOverReport { score: 4, won: false }));

        let state = engine.state();
        assert_eq!(segments(state), vec![(10, 10)]);
        assert_eq!(state.score, 0);
        assert_eq!(state.direction, Right);
        assert!(!state.started());
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine();
        // Head at (5,5) turning up into (5,4), which is still occupied after the tail moves
        *engine.state_mut() = state_with(&[(5, 5), (6, 5), (6, 4), (5, 4), (4, 4)], Up, (15, 15));

        let outcome = engine.update().unwrap();
        assert!(matches!(outcome, TickOutcome::GameOver(GameOverReport { won: false, .. })));
    }

    #[test]
    fn test_moving_into_vacated_tail_cell() {
        let mut engine = engine();
        *engine.state_mut() = state_with(&[(5, 5), (6, 5), (6, 4), (5, 4)], Up, (15, 15));

        assert_eq!(engine.update(), Ok(TickOutcome::Moved));
        assert_eq!(engine.state().snake.head(), (5, 4));
    }

    #[test]
    fn test_check_collision() {
        let inside = state_with(&[(0, 0)], Right, (5, 5));
        assert!(!check_collision(&inside, 20, 20));

        for head in [(-1, 3), (20, 3), (3, -1), (3, 20)].iter() {
            let state = state_with(&[*head], Right, (5, 5));
            assert!(check_collision(&state, 20, 20), "{:?} should collide", head);
        }

        let crossed = state_with(&[(2, 2), (2, 3), (3, 3), (2, 2)], Right, (5, 5));
        assert!(check_collision(&crossed, 20, 20));
    }

    #[test]
    fn test_reversal_is_ignored() {
        let mut engine = engine();
        engine.on_key(Key::Arrow(Right));
        engine.on_key(Key::Arrow(Left));

        assert_eq!(engine.state().direction, Right);
    }

    #[test]
    fn test_two_turns_within_one_tick_cannot_reverse() {
        let mut engine = engine();
        *engine.state_mut() = state_with(&[(5, 5), (4, 5), (3, 5)], Right, (15, 15));

        engine.on_key(Key::Arrow(Up));
        engine.on_key(Key::Arrow(Left));
        assert_eq!(engine.state().direction, Up);

        assert_eq!(engine.update(), Ok(TickOutcome::Moved));
        assert_eq!(engine.state().snake.head(), (5, 4));
    }

    #[test]
    fn test_pending_turn_cannot_be_reversed() {
        let mut engine = engine();
        *engine.state_mut() = state_with(&[(5, 5), (4, 5), (3, 5)], Right, (15, 15));

        engine.on_key(Key::Arrow(Up));
        engine.on_key(Key::Arrow(Down));
        assert_eq!(engine.state().direction, Up);

        assert_eq!(engine.update(), Ok(TickOutcome::Moved));
        assert_eq!(engine.state().snake.head(), (5, 4));
    }

    #[test]
    fn test_first_arrow_starts_and_turns() {
        let mut engine = engine();
        engine.on_key(Key::Arrow(Up));

        assert!(engine.state().started());
        assert_eq!(engine.state().direction, Up);
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let mut engine = engine();
        engine.on_key(Key::Other);
        engine.on_key(Key::Quit);

        assert!(!engine.state().started());
        assert_eq!(engine.state().direction, Right);
    }

    #[test]
    fn test_filling_the_board_wins() {
        let config = GameConfig { grid_width: 2, grid_height: 1, origin: (0, 0), seed: Some(9), ..Default::default() };
        let mut engine = GameEngine::new(config).unwrap();
        assert_eq!(engine.state().food, (1, 0));

        engine.on_key(Key::Arrow(Right));
        let outcome = engine.update().unwrap();

        assert_eq!(outcome, TickOutcome::GameOver(GameOverReport { score: 1, won: true }));
        assert_eq!(segments(engine.state()), vec![(0, 0)]);
    }

    #[test]
    fn test_random_play_stays_on_board() {
        let mut engine = engine();
        let turns = [Up, Left, Down, Right];

        for i in 0..2000 {
            if i % 7 == 0 {
                engine.on_key(Key::Arrow(turns[(i / 7) % turns.len()]));
            }

            let before = engine.state().clone();
            let outcome = engine.update().unwrap();
            let state = engine.state();

            for segment in state.snake.body() {
                assert!(engine.config().in_bounds(*segment));
            }
            assert!(engine.config().in_bounds(state.food));
            assert!(!state.snake.contains(&state.food));

            match outcome {
                TickOutcome::Moved => assert_eq!(state.snake.len(), before.snake.len()),
                TickOutcome::Ate { score } => {
                    assert_eq!(state.snake.len(), before.snake.len() + 1);
                    assert_eq!(score, before.score + 1);
                }
                TickOutcome::GameOver(report) => assert_eq!(report.score, before.score),
                TickOutcome::Idle => assert!(!before.started()),
            }
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = GameConfig { grid_width: 5, grid_height: 5, ..Default::default() };
        assert!(matches!(GameEngine::new(config), Err(GameError::InvalidConfig(_))));
    }
}
