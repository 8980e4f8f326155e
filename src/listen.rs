//! Key event polling loop

use std::error::Error;
use std::time::Duration;

use deck_sync_core::{ControlStates, Deck};
use tokio::time::MissedTickBehavior;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed(usize),
    Released(usize),
}

impl std::fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pressed(key) => write!(f, "press {key}"),
            Self::Released(key) => write!(f, "release {key}"),
        }
    }
}

/// Key transitions between two snapshots, in key order
pub fn key_events(previous: &ControlStates, next: &ControlStates) -> Vec<KeyEvent> {
    previous
        .keys
        .iter()
        .zip(&next.keys)
        .enumerate()
        .filter_map(|(key, (&was, &is))| match (was, is) {
            (false, true) => Some(KeyEvent::Pressed(key)),
            (true, false) => Some(KeyEvent::Released(key)),
            _ => None,
        })
        .collect()
}

/// Poll the deck every `interval` and print key events until ctrl-c
pub async fn listen(deck: &mut dyn Deck, interval: Duration) -> Result<(), Box<dyn Error>> {
    let count = deck.info().layout.count;
    let controls = deck
        .as_control_states()
        .ok_or("deck does not support key events")?;

    let mut previous = ControlStates::released(count);
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!("listening for key events, press ctrl-c to stop");
    loop {
        tokio::select! {
            res = &mut ctrl_c => {
                res?;
                debug!("interrupted");
                break;
            },
            _ = ticker.tick() => {
                let Some(states) = controls.read_control_states()? else {
                    continue;
                };
                for event in key_events(&previous, &states) {
                    println!("{event}");
                }
                previous = states;
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_then_release() {
        let released = ControlStates::released(15);
        let pressed = ControlStates::pressed(15, 6);

        assert_eq!(key_events(&released, &pressed), vec![KeyEvent::Pressed(6)]);
        assert_eq!(key_events(&pressed, &released), vec![KeyEvent::Released(6)]);
        assert!(key_events(&pressed, &pressed).is_empty());
    }

    #[test]
    fn switching_keys_reports_both() {
        let a = ControlStates::pressed(15, 2);
        let b = ControlStates::pressed(15, 9);
        assert_eq!(
            key_events(&a, &b),
            vec![KeyEvent::Released(2), KeyEvent::Pressed(9)]
        );
        assert_eq!(KeyEvent::Pressed(9).to_string(), "press 9");
    }
}
