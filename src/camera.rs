use cgmath::{InnerSpace, Matrix3, Matrix4, Point3, Rad, Vector3};

const STRAFE_STEP: f32 = 0.1;
const ZOOM_STEP: f32 = 0.1;
const ROLL_STEP: f32 = 0.05;
const ORBIT_SWING_STEP: f32 = 0.05;
const ROTATE_RATE: f32 = 0.005;
const MIN_ORBIT_DISTANCE: f32 = 0.05;
pub const DEFAULT_ORBIT_DISTANCE: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraMode {
    Orbit { distance: f32 },
    FirstPerson,
}

/// Viewing camera. In `Orbit` mode every command revolves the eye around a
/// pivot derived as `eye + look * distance`; in `FirstPerson` mode the eye
/// translates freely. `look` and `up` are kept unit length and orthogonal
/// across all mutations.
pub struct Camera {
    pub eye: Point3<f32>,
    pub look: Vector3<f32>,
    pub up: Vector3<f32>,
    pub mode: CameraMode,
    pub last_cursor: (f32, f32),
}

impl Camera {
    pub fn new() -> Self {
        Camera {
            eye: Point3::new(0.0, 0.0, DEFAULT_ORBIT_DISTANCE),
            look: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            mode: CameraMode::Orbit {
                distance: DEFAULT_ORBIT_DISTANCE,
            },
            last_cursor: (0.0, 0.0),
        }
    }

    /// Re-establish the unit-length, orthogonal look/up pair after a
    /// rotation. The projection step counters accumulated float drift.
    fn renormalize(&mut self) {
        self.look = self.look.normalize();
        self.up = (self.up - self.look * self.up.dot(self.look)).normalize();
    }

    fn right(&self) -> Vector3<f32> {
        self.look.cross(self.up).normalize()
    }

    pub fn strafe_forward(&mut self, direction: i32) {
        let dir = direction as f32;
        match self.mode {
            CameraMode::Orbit { distance } => {
                let pivot = self.eye + self.look * distance;
                let new_distance = (distance - STRAFE_STEP * dir).max(MIN_ORBIT_DISTANCE);
                self.mode = CameraMode::Orbit {
                    distance: new_distance,
                };
                self.eye = pivot - self.look * new_distance;
            }
            CameraMode::FirstPerson => {
                self.eye += self.look * (STRAFE_STEP * dir);
            }
        }
    }

    pub fn strafe_tangent(&mut self, direction: i32) {
        let dir = direction as f32;
        match self.mode {
            CameraMode::Orbit { distance } => {
                let pivot = self.eye + self.look * distance;
                let swing = Matrix3::from_axis_angle(self.up, Rad(ORBIT_SWING_STEP * dir));
                self.look = swing * self.look;
                self.renormalize();
                self.eye = pivot - self.look * distance;
            }
            CameraMode::FirstPerson => {
                self.eye += self.right() * (STRAFE_STEP * dir);
            }
        }
    }

    pub fn strafe_up(&mut self, direction: i32) {
        let dir = direction as f32;
        match self.mode {
            CameraMode::Orbit { distance } => {
                let pivot = self.eye + self.look * distance;
                let swing = Matrix3::from_axis_angle(self.right(), Rad(-ORBIT_SWING_STEP * dir));
                self.look = swing * self.look;
                self.up = swing * self.up;
                self.renormalize();
                self.eye = pivot - self.look * distance;
            }
            CameraMode::FirstPerson => {
                self.eye += self.up * (STRAFE_STEP * dir);
            }
        }
    }

    /// Positive zoom moves the viewpoint toward what it is looking at: the
    /// orbit radius shrinks (never to zero), or the first-person eye
    /// dollies forward along `look`.
    pub fn zoom(&mut self, direction: i32) {
        let dir = direction as f32;
        match self.mode {
            CameraMode::Orbit { distance } => {
                let pivot = self.eye + self.look * distance;
                let new_distance = (distance - ZOOM_STEP * dir).max(MIN_ORBIT_DISTANCE);
                self.mode = CameraMode::Orbit {
                    distance: new_distance,
                };
                self.eye = pivot - self.look * new_distance;
            }
            CameraMode::FirstPerson => {
                self.eye += self.look * (ZOOM_STEP * dir);
            }
        }
    }

    /// Rodrigues rotation of `up` about the `look` axis.
    pub fn roll(&mut self, direction: i32) {
        let theta = ROLL_STEP * direction as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        let k = self.look;
        self.up = self.up * cos_t + k.cross(self.up) * sin_t + k * (k.dot(self.up) * (1.0 - cos_t));
        self.renormalize();
    }

    /// Yaw about the current `up` axis by `dx`, then pitch about the right
    /// axis by `dy`, both scaled from cursor pixels to radians. `up`
    /// follows the pitch so the basis can never fold onto itself. In orbit
    /// mode the pivot stays fixed and the eye is re-seated on the new
    /// look ray.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let pivot = match self.mode {
            CameraMode::Orbit { distance } => Some(self.eye + self.look * distance),
            CameraMode::FirstPerson => None,
        };

        let yaw = Matrix3::from_axis_angle(self.up, Rad(dx * ROTATE_RATE));
        self.look = yaw * self.look;
        let pitch = Matrix3::from_axis_angle(self.right(), Rad(dy * ROTATE_RATE));
        self.look = pitch * self.look;
        self.up = pitch * self.up;
        self.renormalize();

        if let (Some(pivot), CameraMode::Orbit { distance }) = (pivot, self.mode) {
            self.eye = pivot - self.look * distance;
        }
    }

    /// Switching modes keeps the eye/look/up triple, so the rendered view
    /// is continuous; re-entering orbit places the pivot ahead along
    /// `look` at the default radius.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            CameraMode::Orbit { .. } => CameraMode::FirstPerson,
            CameraMode::FirstPerson => CameraMode::Orbit {
                distance: DEFAULT_ORBIT_DISTANCE,
            },
        };
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        match self.mode {
            CameraMode::Orbit { .. } => Matrix4::look_at_rh(self.eye, self.eye + self.look, self.up),
            CameraMode::FirstPerson => Matrix4::look_to_rh(self.eye, self.look, self.up),
        }
    }
}
