use crate::config::GameConfig;
use crate::error::GameError;
use crate::game::Screen;
use crate::render::{self, DrawCommand, Rect};
use crate::{GridInt, TermInt};
use std::{io::{Stdout, Write, stdout}, time::Duration};

use anyhow::{Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::style::Color;
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{Event, KeyEvent, read, poll};

pub type TermCoords = (TermInt, TermInt);

/// Terminal columns used to draw one grid cell
const COLS_PER_CELL: GridInt = 2;
const SURFACE_BACKGROUND: Color = Color::White;

#[derive(Copy, Clone, Debug, PartialEq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Cell { ch: ' ', fg: Color::Reset, bg: Color::Reset }
    }
}

pub struct TermManager {
    width: TermInt,
    height: TermInt,
    stdout: Stdout,
    screen: Vec<Cell>,
    current_msg: Option<Message>,
    board: Board,
}

/// Where the drawing surface sits on the terminal, inside the border.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Board {
    grid_width: GridInt,
    grid_height: GridInt,
    cell_size: GridInt,
}

struct Message {
    top_left: TermCoords,
    width: TermInt,
    height: TermInt,
}

impl TermManager {
    pub fn new(config: &GameConfig) -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        let board = Board::new(config);

        let needed = board.terminal_size();
        if needed.0 > width || needed.1 > height {
            return Err(GameError::TerminalTooSmall { needed, actual: (width, height) }.into());
        }

        let stdout = stdout();
        let screen = vec![Cell::default(); width as usize * height as usize];
        Ok(TermManager { width, height, stdout, screen, current_msg: None, board })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        self.set_raw_mode(true)?;
        self.set_cursor_visibility(false)?;
        self.set_cursor_blink(false)
    }

    pub fn restore(&mut self) -> Result<()> {
        self.set_raw_mode(false)?;
        self.set_cursor_visibility(true)?;
        self.set_cursor_blink(true)?;
        execute!(self.stdout, style::ResetColor, LeaveAlternateScreen).context("Error leaving alt screen")
    }

    /// Waits up to `timeout` for the first key event, then drains whatever else is queued.
    pub fn read_key_events(&self, timeout: Duration) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];
        let mut wait = timeout;

        while poll(wait).context("Error polling input")? {
            if let Event::Key(ev) = read().context("Error reading input")? {
                events.push(ev);
            }
            wait = Duration::from_millis(0);
        }

        Ok(events)
    }

    pub fn draw_borders(&mut self) -> Result<()> {
        let (width, height) = self.board.terminal_size();
        let end_x = width - 1;
        let end_y = height - 2;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.print_at((x, 0), ch)?;
            self.print_at((x, end_y), ch)?;
        }

        for y in 1..end_y {
            self.print_at((0, y), '|')?;
            self.print_at((end_x, y), '|')?;
        }

        self.flush()
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All)).context("Error clearing")?;
        self.screen = vec![Cell::default(); self.width as usize * self.height as usize];
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    ///////////////////////////////////////////////////////////////////////////

    fn print_at(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        let cell = Cell { ch, ..Cell::default() };
        match self.cell_mut(pos) {
            Some(slot) => *slot = cell,
            None => return Ok(()),
        }
        self.print_cell(pos, cell)
    }

    fn print_at_no_save(&mut self, pos: TermCoords, ch: char) -> Result<()> {
        // To be used for printing messages, where we don't wanna overwrite our
        // local buffer to restore it when the message is hidden
        if pos.0 >= self.width || pos.1 >= self.height {
            return Ok(());
        }
        queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), style::ResetColor, style::Print(ch))
            .context("Error printing message")
    }

    fn print_cell(&mut self, pos: TermCoords, cell: Cell) -> Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(pos.0, pos.1),
            style::SetForegroundColor(cell.fg),
            style::SetBackgroundColor(cell.bg),
            style::Print(cell.ch),
            style::ResetColor
        ).context("Error printing cell")
    }

    fn index(&self, pos: TermCoords) -> usize {
        self.width as usize * pos.1 as usize + pos.0 as usize
    }

    fn cell(&self, pos: TermCoords) -> Option<Cell> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return None;
        }
        self.screen.get(self.index(pos)).copied()
    }

    fn cell_mut(&mut self, pos: TermCoords) -> Option<&mut Cell> {
        if pos.0 >= self.width || pos.1 >= self.height {
            return None;
        }
        let idx = self.index(pos);
        self.screen.get_mut(idx)
    }

    fn fill_cells(&mut self, rect: Rect, color: Color) {
        for pos in self.board.covered(rect) {
            if let Some(cell) = self.cell_mut(pos) {
                *cell = Cell { ch: ' ', fg: Color::Reset, bg: color };
            }
        }
    }

    fn stroke_cells(&mut self, rect: Rect, color: Color) {
        let covered = self.board.covered(rect);
        let left = covered.iter().map(|pos| pos.0).min();
        let right = covered.iter().map(|pos| pos.0).max();

        for pos in covered {
            let ch = if Some(pos.0) == left {
                '['
            } else if Some(pos.0) == right {
                ']'
            } else {
                continue;
            };

            if let Some(cell) = self.cell_mut(pos) {
                cell.ch = ch;
                cell.fg = color;
            }
        }
    }

    fn text_cells(&mut self, text: &str, x: GridInt, y: GridInt, color: Color) {
        let (row, center) = match self.board.to_term(x, y) {
            Some(pos) => pos,
            None => return,
        };
        let (board_width, _) = self.board.terminal_size();
        let start = center.saturating_sub(text.chars().count() as TermInt / 2).max(1);

        for (i, ch) in text.chars().enumerate() {
            let col = start + i as TermInt;
            if col >= board_width - 1 {
                break;
            }
            if let Some(cell) = self.cell_mut((col, row)) {
                cell.ch = ch;
                cell.fg = color;
            }
        }
    }

    fn set_raw_mode(&self, option: bool) -> Result<()> {
        let res = if option {
            terminal::enable_raw_mode()
        } else {
            terminal::disable_raw_mode()
        };

        res.context("Error setting raw mode")
    }

    fn set_cursor_blink(&mut self, option: bool) -> Result<()> {
        let res = if option {
            execute!(self.stdout, cursor::EnableBlinking)
        } else {
            execute!(self.stdout, cursor::DisableBlinking)
        };

        res.context("Error setting cursor blink")
    }

    fn set_cursor_visibility(&mut self, option: bool) -> Result<()> {
        let res = if option {
            execute!(self.stdout, cursor::Show)
        } else {
            execute!(self.stdout, cursor::Hide)
        };

        res.context("Error setting cursor visibility")
    }
}

impl Screen for TermManager {
    /// Executes drawing commands, addressed in surface pixels, on the board area.
    fn paint(&mut self, commands: &[DrawCommand]) -> Result<()> {
        for command in commands {
            match command {
                DrawCommand::ClearRect(rect) => self.fill_cells(*rect, SURFACE_BACKGROUND),
                DrawCommand::FillRect(rect, color) => self.fill_cells(*rect, term_color(*color)),
                DrawCommand::StrokeRect(rect, color) => self.stroke_cells(*rect, term_color(*color)),
                DrawCommand::FillText { text, x, y, color } => self.text_cells(text, *x, *y, term_color(*color)),
            }
        }

        let (width, height) = self.board.terminal_size();
        for y in 1..height - 2 {
            queue!(self.stdout, cursor::MoveTo(1, y)).context("Error moving cursor")?;
            for x in 1..width - 1 {
                let cell = self.screen[self.index((x, y))];
                queue!(
                    self.stdout,
                    style::SetForegroundColor(cell.fg),
                    style::SetBackgroundColor(cell.bg),
                    style::Print(cell.ch)
                ).context("Error drawing cell")?;
            }
        }

        queue!(self.stdout, style::ResetColor).context("Error resetting colors")?;
        self.flush()
    }

    fn show_score(&mut self, score: u32) -> Result<()> {
        let (width, height) = self.board.terminal_size();
        let line = format!("{:<width$}", format!("Score: {}", score), width = width as usize);

        for (x, ch) in line.chars().enumerate() {
            self.print_at((x as TermInt, height - 1), ch)?;
        }

        self.flush()
    }

    fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let (board_width, board_height) = self.board.terminal_size();
        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.len()).max().unwrap_or(0) + 2) as TermInt;
        let center = (board_width / 2, board_height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        // Print the top and bottom empty lines
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        // Print the message lines
        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as TermInt, y), ch)?;
            }
        }

        self.current_msg = Some(Message::new(msg_width, msg_height, top_left));
        self.flush()
    }

    fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };
        let top_left = msg.top_left();

        // Restore the content from the screen buffer
        for y_diff in 0..msg.height() {
            for x_diff in 0..msg.width() {
                let pos = (top_left.0 + x_diff, top_left.1 + y_diff);
                if let Some(cell) = self.cell(pos) {
                    self.print_cell(pos, cell)?;
                }
            }
        }

        self.flush()
    }

    fn read_key_blocking(&mut self) -> Result<KeyEvent> {
        loop {
            if let Event::Key(ev) = read().context("Error reading input")? {
                return Ok(ev);
            }
        }
    }
}

impl Board {
    fn new(config: &GameConfig) -> Self {
        Board { grid_width: config.grid_width, grid_height: config.grid_height, cell_size: config.cell_size }
    }

    /// Board plus border, plus the status line underneath.
    fn terminal_size(&self) -> TermCoords {
        let width = self.grid_width.saturating_mul(COLS_PER_CELL).saturating_add(2);
        let height = self.grid_height.saturating_add(3);
        (clamp_term(width), clamp_term(height))
    }

    /// Maps a surface pixel to a `(row, column)` terminal position.
    fn to_term(&self, x: GridInt, y: GridInt) -> Option<(TermInt, TermInt)> {
        let px_width = self.grid_width.saturating_mul(self.cell_size);
        let px_height = self.grid_height.saturating_mul(self.cell_size);
        if x < 0 || y < 0 || x >= px_width || y >= px_height {
            return None;
        }

        let row = 1 + y / self.cell_size;
        let col = 1 + (i64::from(x) * i64::from(COLS_PER_CELL) / i64::from(self.cell_size)) as GridInt;
        Some((clamp_term(row), clamp_term(col)))
    }

    /// Terminal cells covered by a pixel rectangle, clipped to the board.
    fn covered(&self, rect: Rect) -> Vec<TermCoords> {
        let cs = self.cell_size;
        let gx0 = (rect.x / cs).max(0);
        let gy0 = (rect.y / cs).max(0);
        let gx1 = (rect.x.saturating_add(rect.width).saturating_add(cs - 1) / cs).min(self.grid_width);
        let gy1 = (rect.y.saturating_add(rect.height).saturating_add(cs - 1) / cs).min(self.grid_height);

        let mut cells = vec![];
        for gy in gy0..gy1 {
            for col in gx0.saturating_mul(COLS_PER_CELL)..gx1.saturating_mul(COLS_PER_CELL) {
                cells.push((clamp_term(1 + col), clamp_term(1 + gy)));
            }
        }
        cells
    }
}

impl Message {
    pub fn new(width: TermInt, height: TermInt, top_left: TermCoords) -> Self {
        Message { width, height, top_left }
    }

    pub fn width(&self) -> TermInt {
        self.width
    }

    pub fn height(&self) -> TermInt {
        self.height
    }

    pub fn top_left(&self) -> TermCoords {
        self.top_left
    }
}

fn term_color(color: render::Color) -> Color {
    match color {
        render::Color::Black => Color::Black,
        render::Color::Green => Color::Green,
        render::Color::Red => Color::Red,
    }
}

fn clamp_term(value: GridInt) -> TermInt {
    value.max(0).min(TermInt::MAX as GridInt) as TermInt
}
