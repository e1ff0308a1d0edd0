use std::collections::VecDeque;

use crate::{Coords, GridInt};
use Direction::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn is_opposite(self, other: Direction) -> bool {
        matches!((self, other), (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right))
    }

    pub fn delta(self) -> (GridInt, GridInt) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }

    pub fn shift(self, pos: Coords) -> Coords {
        let (dx, dy) = self.delta();
        (pos.0 + dx, pos.1 + dy)
    }
}

/// Snake body, head first.
#[derive(Clone, Debug, PartialEq)]
pub struct Snake {
    body: VecDeque<Coords>,
}

impl Snake {
    pub fn new(head: Coords) -> Self {
        let mut body = VecDeque::new();
        body.push_back(head);
        Snake { body }
    }

    /// Builds a snake from explicit segments, head first. Returns `None` for an empty list.
    #[cfg(test)]
    pub fn from_segments(segments: &[Coords]) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        Some(Snake { body: segments.iter().copied().collect() })
    }

    pub fn body(&self) -> &VecDeque<Coords> {
        &self.body
    }

    pub fn head(&self) -> Coords {
        // Never empty: every constructor pushes at least one segment and
        // `drop_tail` keeps the head.
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn contains(&self, pos: &Coords) -> bool {
        self.body.contains(pos)
    }

    /// True when the head shares a cell with any other segment.
    pub fn head_hits_body(&self) -> bool {
        let head = self.head();
        self.body.iter().skip(1).any(|segment| *segment == head)
    }

    /// Prepends the cell next to the head in `direction` and returns it.
    pub fn push_head(&mut self, direction: Direction) -> Coords {
        let new_head = direction.shift(self.head());
        self.body.push_front(new_head);
        new_head
    }

    pub fn drop_tail(&mut self) -> Option<Coords> {
        if self.body.len() > 1 {
            self.body.pop_back()
        } else {
            None
        }
    }
}
