//! Turns a game state into drawing commands in surface pixels.

use crate::config::GameConfig;
use crate::engine::GameState;
use crate::{Coords, GridInt};

pub const START_PROMPT: &str = "Press any arrow key to start";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Color {
    Black,
    Green,
    Red,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: GridInt,
    pub y: GridInt,
    pub width: GridInt,
    pub height: GridInt,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DrawCommand {
    ClearRect(Rect),
    FillRect(Rect, Color),
    StrokeRect(Rect, Color),
    /// Text horizontally centered on `(x, y)`
    FillText { text: String, x: GridInt, y: GridInt, color: Color },
}

pub fn render(state: &GameState, config: &GameConfig) -> Vec<DrawCommand> {
    let (width, height) = config.surface_size();
    let mut commands = Vec::with_capacity(state.snake.len() * 2 + 3);

    commands.push(DrawCommand::ClearRect(Rect { x: 0, y: 0, width, height }));

    if !state.started() {
        commands.push(DrawCommand::FillText {
            text: START_PROMPT.to_string(),
            x: width / 2,
            y: height / 2,
            color: Color::Black,
        });
    }

    for segment in state.snake.body() {
        let rect = cell_rect(*segment, config.cell_size);
        commands.push(DrawCommand::FillRect(rect, Color::Green));
        commands.push(DrawCommand::StrokeRect(rect, Color::Black));
    }

    commands.push(DrawCommand::FillRect(cell_rect(state.food, config.cell_size), Color::Red));
    commands
}

fn cell_rect(pos: Coords, cell_size: GridInt) -> Rect {
    Rect { x: pos.0 * cell_size, y: pos.1 * cell_size, width: cell_size, height: cell_size }
}
