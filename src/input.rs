use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

use crate::scene::Session;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ActiveButton {
    None,
    Primary,
    Secondary,
    Tertiary,
}

/// Translates raw key/pointer events into camera commands and scene
/// toggles. Held keys repeat at whatever rate the window system delivers
/// events; there is no internal repeat timer.
pub struct InputMapper {
    active_button: ActiveButton,
    pressed: bool,
    ctrl_held: bool,
    exit_requested: bool,
}

impl InputMapper {
    pub fn new() -> Self {
        InputMapper {
            active_button: ActiveButton::None,
            pressed: false,
            ctrl_held: false,
            exit_requested: false,
        }
    }

    pub fn handle_modifiers(&mut self, ctrl_held: bool) {
        self.ctrl_held = ctrl_held;
    }

    pub fn take_exit(&mut self) -> bool {
        let v = self.exit_requested;
        self.exit_requested = false;
        v
    }

    pub fn handle_key(&mut self, session: &mut Session, code: KeyCode, state: ElementState) {
        let released = state == ElementState::Released;
        match code {
            KeyCode::Escape if !released => self.exit_requested = true,
            // Export fires on release; a held Ctrl+S still strafes below.
            KeyCode::KeyS if self.ctrl_held && released => session.scene.request_export(),
            KeyCode::KeyW if !released => session.camera.strafe_forward(1),
            KeyCode::KeyS if !released => session.camera.strafe_forward(-1),
            KeyCode::KeyA if !released => session.camera.strafe_tangent(-1),
            KeyCode::KeyD if !released => session.camera.strafe_tangent(1),
            KeyCode::KeyF if self.ctrl_held && released => session.scene.toggle_fill_faces(),
            KeyCode::KeyF if released => session.scene.toggle_wireframe(),
            KeyCode::ArrowLeft if !released => session.camera.roll(-1),
            KeyCode::ArrowRight if !released => session.camera.roll(1),
            KeyCode::ArrowDown if !released => session.camera.strafe_up(-1),
            KeyCode::ArrowUp if !released => session.camera.strafe_up(1),
            KeyCode::KeyC if released => session.camera.toggle_mode(),
            KeyCode::Minus if !released => session.scene.adjust_tess_outer(-1.0),
            KeyCode::Equal if !released => session.scene.adjust_tess_outer(1.0),
            KeyCode::Comma if !released => session.scene.adjust_tess_inner(-1.0),
            KeyCode::Period if !released => session.scene.adjust_tess_inner(1.0),
            KeyCode::Digit0 if !released => session.set_nesting_level(0),
            KeyCode::Digit1 if !released => session.set_nesting_level(1),
            KeyCode::Digit2 if !released => session.set_nesting_level(2),
            KeyCode::Digit3 if !released => session.set_nesting_level(3),
            KeyCode::Digit4 if !released => session.set_nesting_level(4),
            _ => {}
        }
    }

    pub fn handle_button(&mut self, button: MouseButton, state: ElementState) {
        if state.is_pressed() {
            self.pressed = true;
            self.active_button = match button {
                MouseButton::Left => ActiveButton::Primary,
                MouseButton::Right => ActiveButton::Secondary,
                MouseButton::Middle => ActiveButton::Tertiary,
                _ => ActiveButton::None,
            };
        } else {
            self.pressed = false;
        }
    }

    /// Pointer-move handler. Drag deltas are measured against the last
    /// seen cursor position, which updates even when no button is down.
    pub fn handle_cursor(&mut self, session: &mut Session, x: f32, y: f32) {
        let (last_x, last_y) = session.camera.last_cursor;
        if self.pressed {
            match self.active_button {
                ActiveButton::Primary => session.camera.rotate(last_x - x, last_y - y),
                ActiveButton::Secondary => {
                    if last_y > y {
                        session.camera.zoom(1);
                    } else if last_y < y {
                        session.camera.zoom(-1);
                    }
                }
                ActiveButton::Tertiary => {
                    if last_y > y {
                        session.camera.strafe_up(1);
                    } else if last_y < y {
                        session.camera.strafe_up(-1);
                    }
                    if last_x > x {
                        session.camera.strafe_tangent(-1);
                    } else if last_x < x {
                        session.camera.strafe_tangent(1);
                    }
                }
                ActiveButton::None => {}
            }
        }
        session.camera.last_cursor = (x, y);
    }
}

impl Default for InputMapper {
    fn default() -> Self {
        InputMapper::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraMode;
    use crate::sponge::MengerSponge;
    use cgmath::InnerSpace;

    fn session() -> Session {
        Session::new(None)
    }

    fn orbit_distance(session: &Session) -> f32 {
        match session.camera.mode {
            CameraMode::Orbit { distance } => distance,
            CameraMode::FirstPerson => panic!("expected orbit mode"),
        }
    }

    #[test]
    fn primary_drag_rotates_by_cursor_delta() {
        let mut mapper = InputMapper::new();
        let mut dragged = session();
        dragged.camera.last_cursor = (100.0, 100.0);
        mapper.handle_button(MouseButton::Left, ElementState::Pressed);
        mapper.handle_cursor(&mut dragged, 90.0, 80.0);

        let mut reference = session();
        reference.camera.rotate(10.0, 20.0);

        assert!((dragged.camera.look - reference.camera.look).magnitude() < 1e-6);
        assert!((dragged.camera.up - reference.camera.up).magnitude() < 1e-6);
        assert!((dragged.camera.eye - reference.camera.eye).magnitude() < 1e-6);
        assert_eq!(
            dragged.camera.last_cursor,
            (90.0, 80.0),
            "last cursor must track the new position"
        );
    }

    #[test]
    fn secondary_drag_up_zooms_in() {
        let mut mapper = InputMapper::new();
        let mut s = session();
        s.camera.last_cursor = (50.0, 50.0);
        let before = orbit_distance(&s);

        mapper.handle_button(MouseButton::Right, ElementState::Pressed);
        mapper.handle_cursor(&mut s, 50.0, 40.0);
        assert!(
            orbit_distance(&s) < before,
            "upward drag should shrink the orbit radius"
        );

        mapper.handle_cursor(&mut s, 50.0, 40.0);
        assert_eq!(
            orbit_distance(&s),
            before - 0.1,
            "equal y must be a zoom no-op"
        );
    }

    #[test]
    fn tertiary_drag_fires_both_axes_independently() {
        let mut mapper = InputMapper::new();
        let mut dragged = session();
        dragged.camera.last_cursor = (10.0, 10.0);
        mapper.handle_button(MouseButton::Middle, ElementState::Pressed);
        mapper.handle_cursor(&mut dragged, 20.0, 5.0);

        let mut reference = session();
        reference.camera.strafe_up(1);
        reference.camera.strafe_tangent(1);

        assert!((dragged.camera.eye - reference.camera.eye).magnitude() < 1e-6);
    }

    #[test]
    fn cursor_updates_even_without_a_drag() {
        let mut mapper = InputMapper::new();
        let mut s = session();
        let look_before = s.camera.look;

        mapper.handle_cursor(&mut s, 3.0, 7.0);

        assert_eq!(s.camera.last_cursor, (3.0, 7.0));
        assert!(
            (s.camera.look - look_before).magnitude() < 1e-9,
            "no button held, so the camera must not move"
        );
    }

    #[test]
    fn release_stops_dragging_but_keeps_tracking() {
        let mut mapper = InputMapper::new();
        let mut s = session();
        mapper.handle_button(MouseButton::Left, ElementState::Pressed);
        mapper.handle_button(MouseButton::Left, ElementState::Released);

        let eye_before = s.camera.eye;
        mapper.handle_cursor(&mut s, 42.0, 42.0);
        assert!((s.camera.eye - eye_before).magnitude() < 1e-9);
        assert_eq!(s.camera.last_cursor, (42.0, 42.0));
    }

    #[test]
    fn held_movement_keys_repeat_per_event() {
        let mut mapper = InputMapper::new();
        let mut s = session();
        let before = orbit_distance(&s);

        mapper.handle_key(&mut s, KeyCode::KeyW, ElementState::Pressed);
        mapper.handle_key(&mut s, KeyCode::KeyW, ElementState::Pressed);
        assert!(
            (orbit_distance(&s) - (before - 0.2)).abs() < 1e-6,
            "each delivered press moves one step"
        );

        mapper.handle_key(&mut s, KeyCode::KeyW, ElementState::Released);
        assert!(
            (orbit_distance(&s) - (before - 0.2)).abs() < 1e-6,
            "release is not a movement event"
        );
    }

    #[test]
    fn toggles_fire_on_release_only() {
        let mut mapper = InputMapper::new();
        let mut s = session();
        assert!(s.scene.wireframe);

        mapper.handle_key(&mut s, KeyCode::KeyF, ElementState::Pressed);
        assert!(s.scene.wireframe, "press alone must not toggle");
        mapper.handle_key(&mut s, KeyCode::KeyF, ElementState::Released);
        assert!(!s.scene.wireframe);

        mapper.handle_modifiers(true);
        mapper.handle_key(&mut s, KeyCode::KeyF, ElementState::Released);
        assert!(!s.scene.fill_faces, "ctrl+f flips face fill");
        assert!(!s.scene.wireframe, "ctrl+f must leave wireframe alone");
    }

    #[test]
    fn camera_mode_toggles_on_c_release() {
        let mut mapper = InputMapper::new();
        let mut s = session();
        mapper.handle_key(&mut s, KeyCode::KeyC, ElementState::Pressed);
        assert!(matches!(s.camera.mode, CameraMode::Orbit { .. }));
        mapper.handle_key(&mut s, KeyCode::KeyC, ElementState::Released);
        assert!(matches!(s.camera.mode, CameraMode::FirstPerson));
    }

    #[test]
    fn ctrl_s_requests_export_on_release() {
        let mut mapper = InputMapper::new();
        let mut s = session();

        mapper.handle_modifiers(true);
        mapper.handle_key(&mut s, KeyCode::KeyS, ElementState::Released);
        assert!(s.scene.take_export_request());

        mapper.handle_modifiers(false);
        mapper.handle_key(&mut s, KeyCode::KeyS, ElementState::Released);
        assert!(!s.scene.take_export_request(), "plain s is not an export");
    }

    #[test]
    fn tess_keys_clamp_at_both_bounds() {
        let mut mapper = InputMapper::new();
        let mut s = session();
        for _ in 0..60 {
            mapper.handle_key(&mut s, KeyCode::Minus, ElementState::Pressed);
            mapper.handle_key(&mut s, KeyCode::Comma, ElementState::Pressed);
        }
        assert_eq!(s.scene.tess_outer, 1.0);
        assert_eq!(s.scene.tess_inner, 1.0);
        for _ in 0..60 {
            mapper.handle_key(&mut s, KeyCode::Equal, ElementState::Pressed);
            mapper.handle_key(&mut s, KeyCode::Period, ElementState::Pressed);
        }
        assert_eq!(s.scene.tess_outer, 50.0);
        assert_eq!(s.scene.tess_inner, 50.0);
    }

    #[test]
    fn nesting_keys_need_an_attached_provider() {
        let mut mapper = InputMapper::new();
        let mut s = session();
        mapper.handle_key(&mut s, KeyCode::Digit3, ElementState::Pressed);
        assert_eq!(s.scene.nesting_level, 1, "ignored without a provider");

        let mut s = Session::new(Some(Box::new(MengerSponge::new(1))));
        s.provider.as_mut().unwrap().set_clean();
        mapper.handle_key(&mut s, KeyCode::Digit3, ElementState::Pressed);
        assert_eq!(s.scene.nesting_level, 3);
        assert!(s.provider.as_ref().unwrap().is_dirty());
    }

    #[test]
    fn escape_requests_shutdown_once() {
        let mut mapper = InputMapper::new();
        let mut s = session();
        mapper.handle_key(&mut s, KeyCode::Escape, ElementState::Pressed);
        assert!(mapper.take_exit());
        assert!(!mapper.take_exit(), "exit request drains on take");
    }
}
