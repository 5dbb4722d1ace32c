use crate::camera::Camera;
use crate::sponge::{MeshSource, MAX_NESTING_LEVEL};

pub const TESS_LEVEL_MIN: f32 = 1.0;
pub const TESS_LEVEL_MAX: f32 = 50.0;

/// Per-session render toggles and tessellation levels.
pub struct SceneState {
    pub tess_inner: f32,
    pub tess_outer: f32,
    pub wireframe: bool,
    pub fill_faces: bool,
    export_requested: bool,
    pub nesting_level: u32,
}

impl SceneState {
    pub fn new() -> Self {
        SceneState {
            tess_inner: 3.0,
            tess_outer: 3.0,
            wireframe: true,
            fill_faces: true,
            export_requested: false,
            nesting_level: 1,
        }
    }

    pub fn adjust_tess_inner(&mut self, delta: f32) {
        self.tess_inner = (self.tess_inner + delta).clamp(TESS_LEVEL_MIN, TESS_LEVEL_MAX);
    }

    pub fn adjust_tess_outer(&mut self, delta: f32) {
        self.tess_outer = (self.tess_outer + delta).clamp(TESS_LEVEL_MIN, TESS_LEVEL_MAX);
    }

    pub fn toggle_wireframe(&mut self) {
        self.wireframe = !self.wireframe;
    }

    pub fn toggle_fill_faces(&mut self) {
        self.fill_faces = !self.fill_faces;
    }

    pub fn request_export(&mut self) {
        self.export_requested = true;
    }

    pub fn take_export_request(&mut self) -> bool {
        let v = self.export_requested;
        self.export_requested = false;
        v
    }
}

impl Default for SceneState {
    fn default() -> Self {
        SceneState::new()
    }
}

/// The one aggregate a viewer session mutates: camera, scene toggles, and
/// the (optional) solid-mesh provider.
pub struct Session {
    pub camera: Camera,
    pub scene: SceneState,
    pub provider: Option<Box<dyn MeshSource>>,
}

impl Session {
    pub fn new(provider: Option<Box<dyn MeshSource>>) -> Self {
        Session {
            camera: Camera::new(),
            scene: SceneState::new(),
            provider,
        }
    }

    /// Forward a nesting level to the provider and mirror it in the scene.
    /// Without a provider this is a no-op.
    pub fn set_nesting_level(&mut self, level: u32) {
        let level = level.min(MAX_NESTING_LEVEL);
        if let Some(provider) = self.provider.as_mut() {
            provider.set_nesting_level(level);
            self.scene.nesting_level = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sponge::MengerSponge;

    #[test]
    fn tess_levels_stay_clamped_inclusive() {
        let mut scene = SceneState::new();
        for _ in 0..100 {
            scene.adjust_tess_inner(-1.0);
            scene.adjust_tess_outer(-1.0);
        }
        assert_eq!(scene.tess_inner, TESS_LEVEL_MIN);
        assert_eq!(scene.tess_outer, TESS_LEVEL_MIN);

        for _ in 0..100 {
            scene.adjust_tess_inner(1.0);
            scene.adjust_tess_outer(1.0);
        }
        assert_eq!(scene.tess_inner, TESS_LEVEL_MAX);
        assert_eq!(scene.tess_outer, TESS_LEVEL_MAX);
    }

    #[test]
    fn export_request_is_one_shot() {
        let mut scene = SceneState::new();
        assert!(!scene.take_export_request());
        scene.request_export();
        assert!(scene.take_export_request());
        assert!(!scene.take_export_request(), "the flag must reset on take");
    }

    #[test]
    fn nesting_level_without_provider_is_ignored() {
        let mut session = Session::new(None);
        let before = session.scene.nesting_level;
        session.set_nesting_level(3);
        assert_eq!(
            session.scene.nesting_level, before,
            "no provider means no state change"
        );
    }

    #[test]
    fn nesting_level_reaches_provider_and_scene() {
        let mut session = Session::new(Some(Box::new(MengerSponge::new(1))));
        session.provider.as_mut().unwrap().set_clean();

        session.set_nesting_level(3);

        assert_eq!(session.scene.nesting_level, 3);
        let provider = session.provider.as_ref().unwrap();
        assert!(provider.is_dirty(), "a level change must dirty the provider");
    }

    #[test]
    fn nesting_level_is_clamped_before_forwarding() {
        let mut session = Session::new(Some(Box::new(MengerSponge::new(0))));
        session.set_nesting_level(99);
        assert_eq!(session.scene.nesting_level, MAX_NESTING_LEVEL);
    }
}
