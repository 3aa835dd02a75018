//! Key map - terminal keys to operator intents, per phase

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use troubadour_common::{OperatorIntent, Phase};

/// Longest serial accepted in the entry box
pub const MAX_ENTRY_LEN: usize = 64;

/// Map one key press. `entry` is the serial being typed; it is edited in
/// place during `EnterSerial` and handed over on Enter.
pub fn map_key(phase: Phase, key: KeyEvent, entry: &mut String) -> Option<OperatorIntent> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Esc / Ctrl+C quit everywhere
    match key.code {
        KeyCode::Esc => return Some(OperatorIntent::Quit),
        KeyCode::Char('c') | KeyCode::Char('C') if ctrl => return Some(OperatorIntent::Quit),
        _ => {}
    }

    if phase == Phase::EnterSerial {
        return edit_entry(key, ctrl, entry);
    }

    let letter = match key.code {
        KeyCode::Char(c) if !ctrl => Some(c.to_ascii_lowercase()),
        _ => None,
    };
    let enter = key.code == KeyCode::Enter;

    match phase {
        // Any key acknowledges the held pattern, q included
        Phase::DisplayTest => return Some(OperatorIntent::Confirm),
        Phase::FatalError => return Some(OperatorIntent::Quit),
        _ => {}
    }

    if letter == Some('q') {
        return Some(OperatorIntent::Quit);
    }

    match phase {
        Phase::ReviewInventory if enter || letter == Some('y') => Some(OperatorIntent::Confirm),
        Phase::ConfirmDisplay if enter || letter == Some('y') => Some(OperatorIntent::Confirm),
        Phase::ConfirmDisplay if letter == Some('n') => Some(OperatorIntent::Reject),
        Phase::SerialConfirmed if enter => Some(OperatorIntent::Confirm),
        Phase::SerialMismatch => match letter {
            Some('r') => Some(OperatorIntent::Retry),
            Some('b') => Some(OperatorIntent::Reboot),
            Some('s') => Some(OperatorIntent::Shutdown),
            _ => None,
        },
        Phase::Done if letter == Some('r') => Some(OperatorIntent::Rescan),
        Phase::Done if enter => Some(OperatorIntent::Quit),
        _ => None,
    }
}

fn edit_entry(key: KeyEvent, ctrl: bool, entry: &mut String) -> Option<OperatorIntent> {
    match key.code {
        KeyCode::Enter => Some(OperatorIntent::SubmitText(std::mem::take(entry))),
        KeyCode::Backspace => {
            entry.pop();
            None
        }
        KeyCode::Char(c) if !ctrl && !c.is_control() && entry.chars().count() < MAX_ENTRY_LEN => {
            entry.push(c);
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(phase: Phase, code: KeyCode) -> Option<OperatorIntent> {
        map_key(phase, key(code), &mut String::new())
    }

    #[test]
    fn test_escape_and_ctrl_c_quit_everywhere() {
        for phase in [Phase::CollectingInventory, Phase::DisplayTest, Phase::EnterSerial, Phase::Done] {
            assert_eq!(press(phase, KeyCode::Esc), Some(OperatorIntent::Quit));
            let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
            assert_eq!(map_key(phase, ctrl_c, &mut String::new()), Some(OperatorIntent::Quit));
        }
    }

    #[test]
    fn test_display_test_any_key_acknowledges() {
        assert_eq!(press(Phase::DisplayTest, KeyCode::Char('q')), Some(OperatorIntent::Confirm));
        assert_eq!(press(Phase::DisplayTest, KeyCode::Char(' ')), Some(OperatorIntent::Confirm));
        assert_eq!(press(Phase::DisplayTest, KeyCode::Enter), Some(OperatorIntent::Confirm));
    }

    #[test]
    fn test_confirm_display_keys() {
        assert_eq!(press(Phase::ConfirmDisplay, KeyCode::Enter), Some(OperatorIntent::Confirm));
        assert_eq!(press(Phase::ConfirmDisplay, KeyCode::Char('Y')), Some(OperatorIntent::Confirm));
        assert_eq!(press(Phase::ConfirmDisplay, KeyCode::Char('n')), Some(OperatorIntent::Reject));
        assert_eq!(press(Phase::ConfirmDisplay, KeyCode::Char('x')), None);
    }

    #[test]
    fn test_serial_entry_editing() {
        let mut entry = String::new();
        for c in "SN-4q".chars() {
            assert_eq!(map_key(Phase::EnterSerial, key(KeyCode::Char(c)), &mut entry), None);
        }
        map_key(Phase::EnterSerial, key(KeyCode::Backspace), &mut entry);
        map_key(Phase::EnterSerial, key(KeyCode::Char('2')), &mut entry);
        assert_eq!(entry, "SN-42");

        let submitted = map_key(Phase::EnterSerial, key(KeyCode::Enter), &mut entry);
        assert_eq!(submitted, Some(OperatorIntent::SubmitText("SN-42".to_string())));
        assert!(entry.is_empty());
    }

    #[test]
    fn test_serial_entry_length_limit() {
        let mut entry = "A".repeat(MAX_ENTRY_LEN);
        map_key(Phase::EnterSerial, key(KeyCode::Char('B')), &mut entry);
        assert_eq!(entry.len(), MAX_ENTRY_LEN);
    }

    #[test]
    fn test_mismatch_escalation_keys() {
        assert_eq!(press(Phase::SerialMismatch, KeyCode::Char('r')), Some(OperatorIntent::Retry));
        assert_eq!(press(Phase::SerialMismatch, KeyCode::Char('b')), Some(OperatorIntent::Reboot));
        assert_eq!(press(Phase::SerialMismatch, KeyCode::Char('S')), Some(OperatorIntent::Shutdown));
        assert_eq!(press(Phase::SerialMismatch, KeyCode::Enter), None);
    }

    #[test]
    fn test_done_and_fatal_keys() {
        assert_eq!(press(Phase::Done, KeyCode::Char('r')), Some(OperatorIntent::Rescan));
        assert_eq!(press(Phase::Done, KeyCode::Enter), Some(OperatorIntent::Quit));
        assert_eq!(press(Phase::Done, KeyCode::Char('q')), Some(OperatorIntent::Quit));
        assert_eq!(press(Phase::FatalError, KeyCode::Char('x')), Some(OperatorIntent::Quit));
    }

    #[test]
    fn test_busy_phases_ignore_keys() {
        assert_eq!(press(Phase::CollectingInventory, KeyCode::Enter), None);
        assert_eq!(press(Phase::WritingLog, KeyCode::Char('y')), None);
        assert_eq!(press(Phase::CollectingInventory, KeyCode::Char('q')), Some(OperatorIntent::Quit));
    }
}
