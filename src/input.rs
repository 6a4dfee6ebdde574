use std::thread;
use std::time::Duration;

use enigo::{Enigo, Key, KeyboardControllable, MouseButton, MouseControllable};
use serde::{Deserialize, Serialize};

/// Pause between characters when typing literal text.
const TYPE_DELAY: Duration = Duration::from_millis(10);

/// One controller event, tagged by `kind`. Unrecognized kinds land in
/// `Unknown` at the decode boundary so the endpoint can accept them
/// without executing anything.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    PointerMove {
        x: i32,
        y: i32,
    },
    PointerClick {
        #[serde(default = "default_button")]
        button: String,
        #[serde(default = "default_clicks")]
        clicks: u32,
    },
    PointerDown {
        #[serde(default = "default_button")]
        button: String,
    },
    PointerUp {
        #[serde(default = "default_button")]
        button: String,
    },
    Scroll {
        #[serde(default)]
        dy: i32,
        #[serde(default)]
        dx: i32,
    },
    KeyDown {
        key: String,
    },
    KeyUp {
        key: String,
    },
    TypeText {
        #[serde(default)]
        text: String,
    },
    Hotkey {
        keys: Vec<String>,
    },
    #[serde(other)]
    Unknown,
}

fn default_button() -> String {
    "left".to_string()
}

fn default_clicks() -> u32 {
    1
}

/// Result of executing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The mapped host action ran.
    Done,
    /// The event was accepted but nothing was executed.
    Ignored(&'static str),
}

/// Maps input events onto host input actions. Hosts without an input
/// session (headless deployments) acknowledge every event instead of
/// erroring, so viewer-only setups keep working.
pub struct InputDispatcher {
    enigo: Option<Enigo>,
}

impl InputDispatcher {
    pub fn new() -> Self {
        if input_supported() {
            Self {
                enigo: Some(Enigo::new()),
            }
        } else {
            Self::disabled()
        }
    }

    /// A dispatcher that acknowledges events without touching the host.
    pub fn disabled() -> Self {
        Self { enigo: None }
    }

    pub fn dispatch(&mut self, event: InputEvent) -> Result<Dispatch, String> {
        let enigo = match self.enigo.as_mut() {
            Some(enigo) => enigo,
            None => return Ok(Dispatch::Ignored("input not supported on this host")),
        };

        match event {
            InputEvent::PointerMove { x, y } => {
                enigo.mouse_move_to(x, y);
            }
            InputEvent::PointerClick { button, clicks } => {
                let button = map_button(&button)?;
                for _ in 0..clicks {
                    enigo.mouse_click(button);
                }
            }
            InputEvent::PointerDown { button } => {
                enigo.mouse_down(map_button(&button)?);
            }
            InputEvent::PointerUp { button } => {
                enigo.mouse_up(map_button(&button)?);
            }
            InputEvent::Scroll { dy, dx } => {
                // Vertical first, then horizontal
                enigo.mouse_scroll_y(dy);
                enigo.mouse_scroll_x(dx);
            }
            InputEvent::KeyDown { key } => {
                enigo.key_down(map_key(&key)?);
            }
            InputEvent::KeyUp { key } => {
                enigo.key_up(map_key(&key)?);
            }
            InputEvent::TypeText { text } => {
                for ch in text.chars() {
                    enigo.key_sequence(&ch.to_string());
                    thread::sleep(TYPE_DELAY);
                }
            }
            InputEvent::Hotkey { keys } => {
                // An empty chord is a valid request for nothing
                let keys = keys
                    .iter()
                    .map(|key| map_key(key))
                    .collect::<Result<Vec<_>, _>>()?;
                for key in &keys {
                    enigo.key_down(*key);
                }
                for key in keys.iter().rev() {
                    enigo.key_up(*key);
                }
            }
            InputEvent::Unknown => {
                return Ok(Dispatch::Ignored("ignored: unsupported event kind"));
            }
        }

        Ok(Dispatch::Done)
    }
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "linux")]
fn input_supported() -> bool {
    std::env::var_os("DISPLAY").is_some() || std::env::var_os("WAYLAND_DISPLAY").is_some()
}

#[cfg(not(target_os = "linux"))]
fn input_supported() -> bool {
    true
}

fn map_button(button: &str) -> Result<MouseButton, String> {
    match button {
        "left" => Ok(MouseButton::Left),
        "right" => Ok(MouseButton::Right),
        "middle" => Ok(MouseButton::Middle),
        _ => Err(format!("Unsupported mouse button: {}", button)),
    }
}

fn map_key(key: &str) -> Result<Key, String> {
    // Single characters type as-is, preserving case
    let mut chars = key.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Ok(Key::Layout(ch));
    }

    match key.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Ok(Key::Control),
        "alt" => Ok(Key::Alt),
        "shift" => Ok(Key::Shift),
        "meta" | "win" | "super" | "cmd" | "command" => Ok(Key::Meta),
        "enter" | "return" => Ok(Key::Return),
        "esc" | "escape" => Ok(Key::Escape),
        "space" => Ok(Key::Space),
        "tab" => Ok(Key::Tab),
        "backspace" => Ok(Key::Backspace),
        "delete" | "del" => Ok(Key::Delete),
        "home" => Ok(Key::Home),
        "end" => Ok(Key::End),
        "pageup" | "pgup" => Ok(Key::PageUp),
        "pagedown" | "pgdn" => Ok(Key::PageDown),
        "capslock" => Ok(Key::CapsLock),
        "up" | "arrowup" => Ok(Key::UpArrow),
        "down" | "arrowdown" => Ok(Key::DownArrow),
        "left" | "arrowleft" => Ok(Key::LeftArrow),
        "right" | "arrowright" => Ok(Key::RightArrow),
        "f1" => Ok(Key::F1),
        "f2" => Ok(Key::F2),
        "f3" => Ok(Key::F3),
        "f4" => Ok(Key::F4),
        "f5" => Ok(Key::F5),
        "f6" => Ok(Key::F6),
        "f7" => Ok(Key::F7),
        "f8" => Ok(Key::F8),
        "f9" => Ok(Key::F9),
        "f10" => Ok(Key::F10),
        "f11" => Ok(Key::F11),
        "f12" => Ok(Key::F12),
        _ => Err(format!("Unsupported key: {}", key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_click_defaults_to_single_left_click() {
        let event: InputEvent = serde_json::from_str(r#"{"kind":"pointer_click"}"#).unwrap();
        match event {
            InputEvent::PointerClick { button, clicks } => {
                assert_eq!(button, "left");
                assert_eq!(clicks, 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn scroll_defaults_to_zero_deltas() {
        let event: InputEvent = serde_json::from_str(r#"{"kind":"scroll"}"#).unwrap();
        match event {
            InputEvent::Scroll { dy, dx } => {
                assert_eq!(dy, 0);
                assert_eq!(dx, 0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn unrecognized_kind_decodes_to_unknown() {
        let event: InputEvent = serde_json::from_str(r#"{"kind":"warp_drive"}"#).unwrap();
        assert!(matches!(event, InputEvent::Unknown));
    }

    #[test]
    fn unknown_event_is_acknowledged_without_action() {
        let mut dispatcher = InputDispatcher::disabled();
        let result = dispatcher.dispatch(InputEvent::Unknown).unwrap();
        assert!(matches!(result, Dispatch::Ignored(_)));
    }

    #[test]
    fn disabled_dispatcher_acknowledges_everything() {
        let mut dispatcher = InputDispatcher::disabled();
        let result = dispatcher
            .dispatch(InputEvent::PointerMove { x: 10, y: 20 })
            .unwrap();
        assert_eq!(result, Dispatch::Ignored("input not supported on this host"));

        let result = dispatcher
            .dispatch(InputEvent::Hotkey { keys: vec![] })
            .unwrap();
        assert!(matches!(result, Dispatch::Ignored(_)));
    }

    #[test]
    fn key_names_cover_the_controller_protocol() {
        assert_eq!(map_key("ctrl").unwrap(), Key::Control);
        assert_eq!(map_key("Escape").unwrap(), Key::Escape);
        assert_eq!(map_key("enter").unwrap(), Key::Return);
        assert_eq!(map_key("f5").unwrap(), Key::F5);
        assert_eq!(map_key("A").unwrap(), Key::Layout('A'));
        assert!(map_key("hyperdrive").is_err());
    }

    #[test]
    fn button_names_map_or_fail() {
        assert_eq!(map_button("left").unwrap(), MouseButton::Left);
        assert_eq!(map_button("middle").unwrap(), MouseButton::Middle);
        assert!(map_button("fourth").is_err());
    }
}
