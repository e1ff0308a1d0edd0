use std::time::Instant;

use anyhow::Result;
use crossterm::event::KeyEvent;
use tracing::info;

use crate::config::GameConfig;
use crate::engine::{GameEngine, GameOverReport, TickOutcome};
use crate::input::{self, Key};
use crate::render::{render, DrawCommand};
use crate::term::TermManager;
use crate::timer::Ticker;

/// What the game loop shows to the player and reads back.
pub trait Screen {
    fn paint(&mut self, commands: &[DrawCommand]) -> Result<()>;
    fn show_score(&mut self, score: u32) -> Result<()>;
    fn show_message(&mut self, lines: &[&str]) -> Result<()>;
    fn hide_message(&mut self) -> Result<()>;
    fn read_key_blocking(&mut self) -> Result<KeyEvent>;
}

pub struct SnakeGame<S = TermManager> {
    engine: GameEngine,
    term: S,
    ticker: Ticker,
}

impl SnakeGame<TermManager> {
    pub fn new(config: GameConfig) -> Result<Self> {
        let ticker = Ticker::new(config.tick);
        let term = TermManager::new(&config)?;
        let engine = GameEngine::new(config)?;
        Ok(SnakeGame { engine, term, ticker })
    }

    pub fn initialize(&mut self) -> Result<()> {
        self.term.setup()?;
        self.term.clear()?;
        self.term.draw_borders()?;
        self.term.show_score(0)?;
        self.redraw()
    }

    /// Runs rounds back to back until the player quits.
    pub fn play(&mut self) -> Result<()> {
        info!(period_ms = self.ticker.period().as_millis() as u64, "game loop started");
        self.ticker.start(Instant::now());

        loop {
            let timeout = self.ticker.time_until_tick(Instant::now());

            for key_ev in self.term.read_key_events(timeout)? {
                match input::map_key(&key_ev) {
                    Key::Quit => return Ok(()),
                    key => self.engine.on_key(key),
                }
            }

            let now = Instant::now();
            if !self.ticker.is_due(now) {
                continue;
            }
            self.ticker.advance(now);

            match self.engine.update()? {
                TickOutcome::GameOver(report) => {
                    if !self.game_over(report)? {
                        return Ok(());
                    }
                }
                TickOutcome::Ate { score } => {
                    self.term.show_score(score)?;
                    self.redraw()?;
                }
                TickOutcome::Moved | TickOutcome::Idle => self.redraw()?,
            }
        }
    }

    pub fn restore(&mut self) -> Result<()> {
        self.term.restore()
    }
}

impl<S: Screen> SnakeGame<S> {
    fn redraw(&mut self) -> Result<()> {
        let commands = render(self.engine.state(), self.engine.config());
        self.term.paint(&commands)
    }

    /// Reports the finished round and waits for acknowledgment. Returns false when the player quits.
    fn game_over(&mut self, report: GameOverReport) -> Result<bool> {
        self.ticker.stop();

        let s = if report.won {"You won!"} else {"Game over!"};
        self.term.show_message(&[
            s,
            &*format!("Your score: {}", report.score),
            "",
            "Press any key to play again,",
            "or CTRL+C to quit."
        ])?;

        if input::is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(false);
        }

        self.term.hide_message()?;
        self.term.show_score(self.engine.state().score)?;
        self.redraw()?;
        self.ticker.start(Instant::now());
        Ok(true)
    }
}
