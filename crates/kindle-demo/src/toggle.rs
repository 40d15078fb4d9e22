use kindle_engine::coords::{Rect, Vec2};
use kindle_engine::input::{InputEvent, MouseButton, MouseButtonState, PointerButtonEvent, PointerMoveEvent};
use kindle_engine::paint::Color;
use kindle_engine::render::overlay::OverlayQuad;

/// Where the billboard toggle sits, in logical pixels.
pub const BUTTON_RECT: Rect = Rect::new(10.0, 10.0, 160.0, 40.0);

const BORDER: f32 = 1.0;
const INDICATOR: f32 = 16.0;

const BORDER_COLOR: Color = Color::from_premul(0.55, 0.55, 0.55, 1.0);
const FACE_COLOR: Color = Color::from_premul(0.18, 0.18, 0.18, 1.0);
const FACE_HOVER: Color = Color::from_premul(0.28, 0.28, 0.28, 1.0);
const FACE_PRESSED: Color = Color::from_premul(0.12, 0.12, 0.12, 1.0);
const ON_COLOR: Color = Color::from_premul(0.2, 0.75, 0.3, 1.0);
const OFF_COLOR: Color = Color::from_premul(0.8, 0.2, 0.2, 1.0);

/// Title text for stages that draw flat quads only.
pub const UNAVAILABLE_LABEL: &str = "Billboarding unavailable";

/// What a click on the toggle will do next.
pub fn toggle_label(billboarding: bool) -> &'static str {
    if billboarding {
        "Click to disable billboarding"
    } else {
        "Click to enable billboarding"
    }
}

/// Push button that turns billboarding on and off.
///
/// A click is a left press and release that both land inside the button.
#[derive(Debug, Clone)]
pub struct ToggleButton {
    rect: Rect,
    hovered: bool,
    armed: bool,
}

impl Default for ToggleButton {
    fn default() -> Self {
        Self::new(BUTTON_RECT)
    }
}

impl ToggleButton {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            hovered: false,
            armed: false,
        }
    }

    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.rect.contains(Vec2::new(x, y))
    }

    #[inline]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Feeds one input event; returns `true` when it completes a click.
    pub fn handle_event(&mut self, ev: &InputEvent) -> bool {
        match ev {
            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                self.hovered = self.contains(*x, *y);
                false
            }
            InputEvent::PointerLeft => {
                self.hovered = false;
                false
            }
            InputEvent::Focused(false) => {
                self.armed = false;
                false
            }
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state,
                x,
                y,
                ..
            }) => {
                let inside = self.contains(*x, *y);
                self.hovered = inside;
                match state {
                    MouseButtonState::Pressed => {
                        self.armed = inside;
                        false
                    }
                    MouseButtonState::Released => {
                        let clicked = self.armed && inside;
                        self.armed = false;
                        clicked
                    }
                }
            }
            _ => false,
        }
    }

    /// Border, face and a state indicator. `available` is false when the
    /// current stage has no billboarding; the button is then drawn dimmed.
    pub fn quads(&self, billboarding: bool, available: bool) -> Vec<OverlayQuad> {
        let face = if !available {
            FACE_COLOR
        } else if self.armed && self.hovered {
            FACE_PRESSED
        } else if self.hovered {
            FACE_HOVER
        } else {
            FACE_COLOR
        };

        let indicator = Rect::new(
            self.rect.max().x - BORDER - 12.0 - INDICATOR,
            self.rect.origin.y + (self.rect.size.y - INDICATOR) * 0.5,
            INDICATOR,
            INDICATOR,
        );
        let state_color = if billboarding && available { ON_COLOR } else { OFF_COLOR };
        let alpha = if available { 1.0 } else { 0.4 };

        vec![
            OverlayQuad {
                rect: self.rect,
                color: BORDER_COLOR.faded(alpha),
            },
            OverlayQuad {
                rect: self.rect.inflate(-BORDER),
                color: face.faded(alpha),
            },
            OverlayQuad {
                rect: indicator,
                color: state_color.faded(alpha),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kindle_engine::input::Modifiers;

    fn press(state: MouseButtonState, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton(PointerButtonEvent {
            button: MouseButton::Left,
            state,
            x,
            y,
            modifiers: Modifiers::default(),
        })
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    // ── clicks ────────────────────────────────────────────────────────────

    #[test]
    fn press_and_release_inside_clicks() {
        let mut b = ToggleButton::default();
        assert!(!b.handle_event(&press(MouseButtonState::Pressed, 20.0, 20.0)));
        assert!(b.handle_event(&press(MouseButtonState::Released, 30.0, 25.0)));
    }

    #[test]
    fn release_outside_cancels() {
        let mut b = ToggleButton::default();
        b.handle_event(&press(MouseButtonState::Pressed, 20.0, 20.0));
        assert!(!b.handle_event(&press(MouseButtonState::Released, 300.0, 300.0)));
    }

    #[test]
    fn drag_into_button_is_not_a_click() {
        let mut b = ToggleButton::default();
        b.handle_event(&press(MouseButtonState::Pressed, 300.0, 300.0));
        assert!(!b.handle_event(&press(MouseButtonState::Released, 20.0, 20.0)));
    }

    #[test]
    fn other_buttons_are_ignored() {
        let mut b = ToggleButton::default();
        let right = |state| {
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Right,
                state,
                x: 20.0,
                y: 20.0,
                modifiers: Modifiers::default(),
            })
        };
        b.handle_event(&right(MouseButtonState::Pressed));
        assert!(!b.handle_event(&right(MouseButtonState::Released)));
    }

    #[test]
    fn focus_loss_disarms() {
        let mut b = ToggleButton::default();
        b.handle_event(&press(MouseButtonState::Pressed, 20.0, 20.0));
        b.handle_event(&InputEvent::Focused(false));
        assert!(!b.handle_event(&press(MouseButtonState::Released, 20.0, 20.0)));
    }

    // ── hover ─────────────────────────────────────────────────────────────

    #[test]
    fn hover_follows_pointer() {
        let mut b = ToggleButton::default();
        b.handle_event(&moved(169.0, 49.0));
        assert!(b.is_hovered());
        b.handle_event(&moved(170.0, 49.0));
        assert!(!b.is_hovered());
        b.handle_event(&moved(50.0, 30.0));
        b.handle_event(&InputEvent::PointerLeft);
        assert!(!b.is_hovered());
    }

    #[test]
    fn hover_changes_face_color() {
        let mut b = ToggleButton::default();
        let idle = b.quads(true, true)[1].color;
        b.handle_event(&moved(50.0, 30.0));
        assert_ne!(b.quads(true, true)[1].color, idle);
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn indicator_reflects_state() {
        let b = ToggleButton::default();
        assert_eq!(b.quads(true, true)[2].color, ON_COLOR);
        assert_eq!(b.quads(false, true)[2].color, OFF_COLOR);
    }

    #[test]
    fn quads_stay_inside_button() {
        let b = ToggleButton::default();
        for q in b.quads(true, true).iter().skip(1) {
            assert!(b.contains(q.rect.origin.x, q.rect.origin.y));
            let max = q.rect.max();
            assert!(max.x <= BUTTON_RECT.max().x && max.y <= BUTTON_RECT.max().y);
        }
    }

    #[test]
    fn unavailable_button_is_dimmed() {
        let b = ToggleButton::default();
        assert!(b.quads(true, false)[0].color.a < 1.0);
    }

    #[test]
    fn labels() {
        assert_eq!(toggle_label(true), "Click to disable billboarding");
        assert_eq!(toggle_label(false), "Click to enable billboarding");
    }
}
