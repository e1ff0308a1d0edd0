use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::GameError;
use crate::snake::Snake;
use crate::{Coords, GridInt};

/// Places food on a uniformly random cell the snake does not occupy.
pub struct FoodGenerator {
    cells: Vec<Coords>,
}

impl FoodGenerator {
    pub fn new(width: GridInt, height: GridInt) -> Self {
        let mut cells = Vec::with_capacity((width.max(0) * height.max(0)) as usize);

        for y in 0..height {
            for x in 0..width {
                cells.push((x, y));
            }
        }

        FoodGenerator { cells }
    }

    pub fn spawn<R: Rng + ?Sized>(&self, snake: &Snake, rng: &mut R) -> Result<Coords, GameError> {
        let choices: Vec<&Coords> = self.cells.iter().filter(|pos| !snake.contains(pos)).collect();

        let food = choices.choose(rng).copied().copied().ok_or(GameError::BoardFull)?;
        debug!(?food, free_cells = choices.len(), "spawned food");
        Ok(food)
    }
}
