//! Key mapping for the cube
//!
//! Only the horizontal arrow keys do anything. Keys arrive either as Win32
//! virtual key codes (from the host window) or as DOM-style key names
//! (from scripted input).

use crate::domain::orientation::SpinDirection;

const VK_LEFT: u32 = 0x25;
const VK_RIGHT: u32 = 0x27;

/// Key events the controller understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// Turn the cube one step
    Spin(SpinDirection),
    /// Any other key, passed through untouched
    Ignored,
}

impl KeyEvent {
    /// Convert a Windows virtual key code to a KeyEvent
    pub fn from_vk_code(vk_code: u32) -> Self {
        match vk_code {
            VK_LEFT => KeyEvent::Spin(SpinDirection::Left),
            VK_RIGHT => KeyEvent::Spin(SpinDirection::Right),
            _ => KeyEvent::Ignored,
        }
    }

    /// Convert a DOM `KeyboardEvent.key` name to a KeyEvent
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "ArrowLeft" => KeyEvent::Spin(SpinDirection::Left),
            "ArrowRight" => KeyEvent::Spin(SpinDirection::Right),
            _ => KeyEvent::Ignored,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, KeyEvent::Ignored)
    }
}
