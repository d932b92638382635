//! Console board.
//!
//! Beeps and indicator changes are logged. Buttons are pressed by typing
//! `sw1` or `sw2` (or `1` / `2`) on stdin; a reader thread forwards presses
//! over a channel. Each press holds the button level high for enough polls to
//! pass the debouncer.

use std::io::{self, BufRead};
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use loralink_node::{Board, Button};
use tracing::{debug, info, warn};

/// Parse one console line as a button press.
pub fn parse_button(line: &str) -> Option<Button> {
    match line.trim().to_ascii_lowercase().as_str() {
        "sw1" | "1" => Some(Button::Sw1),
        "sw2" | "2" => Some(Button::Sw2),
        _ => None,
    }
}

/// A [`Board`] driven from the terminal.
#[derive(Debug)]
pub struct ConsoleBoard {
    presses: Receiver<Button>,
    /// Remaining polls each button reads as pressed, indexed like [`Button::ALL`].
    held: [u8; 2],
    hold_samples: u8,
    indicator: bool,
    beeps: u64,
}

impl ConsoleBoard {
    /// Create a board fed by the returned sender.
    pub fn channel(hold_samples: u8) -> (Sender<Button>, ConsoleBoard) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let board = ConsoleBoard {
            presses: rx,
            held: [0; 2],
            hold_samples: hold_samples.max(1),
            indicator: false,
            beeps: 0,
        };
        (tx, board)
    }

    /// Create a board whose buttons are read from stdin.
    pub fn spawn_stdin(hold_samples: u8) -> ConsoleBoard {
        let (tx, board) = Self::channel(hold_samples);
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!("stdin closed: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_button(&line) {
                    Some(button) => {
                        if tx.send(button).is_err() {
                            break;
                        }
                    }
                    None => warn!(input = %line.trim(), "unknown input, expected sw1 or sw2"),
                }
            }
            debug!("console reader finished");
        });
        board
    }

    pub fn indicator(&self) -> bool {
        self.indicator
    }

    /// Total beeps sounded.
    pub fn beeps(&self) -> u64 {
        self.beeps
    }

    fn index(button: Button) -> usize {
        match button {
            Button::Sw1 => 0,
            Button::Sw2 => 1,
        }
    }
}

impl Board for ConsoleBoard {
    fn beep(&mut self, count: u8) {
        self.beeps += u64::from(count);
        info!(count, "beep");
    }

    fn set_indicator(&mut self, on: bool) {
        if self.indicator != on {
            debug!(on, "indicator");
        }
        self.indicator = on;
    }

    fn button_pressed(&mut self, button: Button) -> bool {
        for pressed in self.presses.try_iter() {
            self.held[Self::index(pressed)] = self.hold_samples;
        }
        let held = &mut self.held[Self::index(button)];
        if *held > 0 {
            *held -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loralink_node::ButtonDebouncer;

    #[test]
    fn test_parse_button() {
        assert_eq!(parse_button("sw1\n"), Some(Button::Sw1));
        assert_eq!(parse_button("  SW2 "), Some(Button::Sw2));
        assert_eq!(parse_button("2"), Some(Button::Sw2));
        assert_eq!(parse_button("sw3"), None);
    }

    #[test]
    fn test_press_held_for_hold_samples() {
        let (tx, mut board) = ConsoleBoard::channel(2);
        tx.send(Button::Sw1).unwrap();

        let levels: Vec<bool> = (0..4).map(|_| board.button_pressed(Button::Sw1)).collect();
        assert_eq!(levels, vec![true, true, false, false]);
        assert!(!board.button_pressed(Button::Sw2));
    }

    #[test]
    fn test_press_passes_debouncer_once() {
        let (tx, mut board) = ConsoleBoard::channel(3);
        let mut debouncer = ButtonDebouncer::new(3);
        tx.send(Button::Sw2).unwrap();

        let edges = (0..6)
            .filter(|_| debouncer.update(board.button_pressed(Button::Sw2)))
            .count();
        assert_eq!(edges, 1);
    }

    #[test]
    fn test_beeps_and_indicator_tracked() {
        let (_tx, mut board) = ConsoleBoard::channel(1);
        board.beep(3);
        board.beep(1);
        board.set_indicator(true);
        assert_eq!(board.beeps(), 4);
        assert!(board.indicator());
    }
}
