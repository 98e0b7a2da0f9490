use std::collections::HashSet;

use crate::coords::Vec2;

use super::types::{
    InputEvent,
    Modifiers,
    MouseButton,
    MouseButtonState,
    PointerButtonEvent,
    PointerMoveEvent,
};

/// Current pointer state for a single viewport.
///
/// Holds "is down" information and the pointer position while it is inside
/// the viewport.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current modifier state.
    pub modifiers: Modifiers,

    /// Whether the viewport is focused.
    pub focused: bool,

    /// Pointer position in logical pixels; `None` while outside the viewport.
    pub pointer_pos: Option<Vec2>,

    /// Set of currently held mouse buttons.
    pub buttons_down: HashSet<MouseButton>,
}

impl InputState {
    /// Applies a platform-agnostic input event to the current state.
    ///
    /// Returns the new pointer position when `ev` was a pointer move.
    pub fn apply_event(&mut self, ev: &InputEvent) -> Option<Vec2> {
        match ev {
            InputEvent::ModifiersChanged(m) => {
                self.modifiers = *m;
                None
            }

            InputEvent::Focused(f) => {
                self.focused = *f;
                if !*f {
                    // Releases are not delivered while unfocused.
                    self.buttons_down.clear();
                }
                None
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                let pos = Vec2::new(*x, *y);
                self.pointer_pos = Some(pos);
                Some(pos)
            }

            InputEvent::PointerLeft => {
                self.pointer_pos = None;
                None
            }

            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state,
                modifiers,
                ..
            }) => {
                self.modifiers = *modifiers;
                match state {
                    MouseButtonState::Pressed => {
                        self.buttons_down.insert(*button);
                    }
                    MouseButtonState::Released => {
                        self.buttons_down.remove(button);
                    }
                }
                None
            }
        }
    }

    pub fn button_down(&self, btn: MouseButton) -> bool {
        self.buttons_down.contains(&btn)
    }

    pub fn any_button_down(&self) -> bool {
        !self.buttons_down.is_empty()
    }

    pub fn pointer_inside(&self) -> bool {
        self.pointer_pos.is_some()
    }
}
