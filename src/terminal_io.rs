use std::collections::BTreeMap;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

use crate::entities::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    Steer(Direction),
    Quit,
}

/// Key bindings: arrows, keypad 8/2 and w/s steer; any other press stops the
/// ship, and so does any release.
pub fn map_key(key: &KeyEvent) -> InputAction {
    if key.kind == KeyEventKind::Release {
        return InputAction::Steer(Direction::None);
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return InputAction::Quit;
    }
    let keypad = key.state.contains(KeyEventState::KEYPAD);
    let direction = match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Direction::Up,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Direction::Down,
        KeyCode::Char('8') if keypad => Direction::Up,
        KeyCode::Char('2') if keypad => Direction::Down,
        _ => Direction::None,
    };
    InputAction::Steer(direction)
}

/// Key events for headless runs, keyed by the frame they arrive on.
#[derive(Default)]
pub struct ScriptedInput {
    events: BTreeMap<u64, Vec<Event>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        ScriptedInput::default()
    }

    pub fn at(mut self, frame: u64, event: Event) -> Self {
        self.events.entry(frame).or_default().push(event);
        self
    }

    pub fn press(self, frame: u64, code: KeyCode) -> Self {
        self.at(frame, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    pub fn release(self, frame: u64, code: KeyCode) -> Self {
        let key = KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release);
        self.at(frame, Event::Key(key))
    }

    /// Climb, stop, dive, stop, climb again.
    pub fn default_script() -> Self {
        ScriptedInput::new()
            .press(1, KeyCode::Up)
            .release(120, KeyCode::Up)
            .press(200, KeyCode::Char('s'))
            .release(450, KeyCode::Char('s'))
            .press(460, KeyCode::Char('w'))
    }

    /// Events due on this frame, in the order they were scripted.
    pub fn take(&mut self, frame: u64) -> Vec<Event> {
        self.events.remove(&frame).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_up_and_down_bindings() {
        for code in [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')] {
            assert_eq!(map_key(&press(code)), InputAction::Steer(Direction::Up));
        }
        for code in [KeyCode::Down, KeyCode::Char('s')] {
            assert_eq!(map_key(&press(code)), InputAction::Steer(Direction::Down));
        }
    }

    #[test]
    fn test_keypad_digits_only_from_keypad() {
        let mut eight = press(KeyCode::Char('8'));
        assert_eq!(map_key(&eight), InputAction::Steer(Direction::None));
        eight.state = KeyEventState::KEYPAD;
        assert_eq!(map_key(&eight), InputAction::Steer(Direction::Up));

        let mut two = press(KeyCode::Char('2'));
        two.state = KeyEventState::KEYPAD;
        assert_eq!(map_key(&two), InputAction::Steer(Direction::Down));
    }

    #[test]
    fn test_other_keys_and_releases_stop() {
        assert_eq!(map_key(&press(KeyCode::Char('x'))), InputAction::Steer(Direction::None));
        let release = KeyEvent::new_with_kind(KeyCode::Up, KeyModifiers::NONE, KeyEventKind::Release);
        assert_eq!(map_key(&release), InputAction::Steer(Direction::None));
    }

    #[test]
    fn test_ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(&key), InputAction::Quit);
    }

    #[test]
    fn test_script_replays_by_frame() {
        let mut input = ScriptedInput::default_script();
        assert!(input.take(0).is_empty());
        let events = input.take(1);
        assert_eq!(events.len(), 1);
        let Event::Key(key) = events[0] else {
            panic!("expected key event");
        };
        assert_eq!(map_key(&key), InputAction::Steer(Direction::Up));
        assert!(input.take(1).is_empty());
    }

    #[test]
    fn test_script_keeps_same_frame_order() {
        let mut input = ScriptedInput::new()
            .press(3, KeyCode::Up)
            .release(3, KeyCode::Up)
            .press(3, KeyCode::Down);
        let actions: Vec<InputAction> = input
            .take(3)
            .iter()
            .filter_map(|e| match e {
                Event::Key(key) => Some(map_key(key)),
                _ => None,
            })
            .collect();
        assert_eq!(
            actions,
            vec![
                InputAction::Steer(Direction::Up),
                InputAction::Steer(Direction::None),
                InputAction::Steer(Direction::Down),
            ]
        );
    }
}
