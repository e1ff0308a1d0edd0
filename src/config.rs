use std::time::Duration;

use crate::error::GameError;
use crate::{Coords, GridInt};

/// Settings for one game session
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Play-field width in grid cells
    pub grid_width: GridInt,
    /// Play-field height in grid cells
    pub grid_height: GridInt,
    /// Pixel size of one grid cell on the drawing surface
    pub cell_size: GridInt,
    /// Time between two update steps
    pub tick: Duration,
    /// Cell the snake starts on after every reset
    pub origin: Coords,
    /// Fixed seed for food placement, random when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            grid_width: 20,
            grid_height: 20,
            cell_size: 20,
            tick: Duration::from_millis(100),
            origin: (10, 10),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.grid_width <= 0 || self.grid_height <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }

        match self.grid_width.checked_mul(self.grid_height) {
            Some(cells) if cells >= 2 => {}
            Some(_) => {
                return Err(GameError::InvalidConfig("grid needs room for the snake and one food".to_string()));
            }
            None => {
                return Err(GameError::InvalidConfig(format!(
                    "grid {}x{} has too many cells",
                    self.grid_width, self.grid_height
                )));
            }
        }

        if self.cell_size <= 0 {
            return Err(GameError::InvalidConfig(format!("cell size must be positive, got {}", self.cell_size)));
        }

        let surface_width = self.grid_width.checked_mul(self.cell_size);
        let surface_height = self.grid_height.checked_mul(self.cell_size);
        if surface_width.is_none() || surface_height.is_none() {
            return Err(GameError::InvalidConfig(format!(
                "a {}x{} grid of {}px cells does not fit the drawing surface",
                self.grid_width, self.grid_height, self.cell_size
            )));
        }

        if self.tick.as_millis() == 0 {
            return Err(GameError::InvalidConfig("tick period must be at least 1ms".to_string()));
        }

        if !self.in_bounds(self.origin) {
            return Err(GameError::InvalidConfig(format!(
                "origin {:?} lies outside the {}x{} grid",
                self.origin, self.grid_width, self.grid_height
            )));
        }

        Ok(())
    }

    pub fn in_bounds(&self, pos: Coords) -> bool {
        pos.0 >= 0 && pos.0 < self.grid_width && pos.1 >= 0 && pos.1 < self.grid_height
    }

    /// Surface size in pixels. Only meaningful for a validated config.
    pub fn surface_size(&self) -> (GridInt, GridInt) {
        (self.grid_width * self.cell_size, self.grid_height * self.cell_size)
    }
}
