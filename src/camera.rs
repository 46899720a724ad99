//! Free camera and projection.
//!
//! The camera keeps its orientation as yaw/pitch in degrees and a derived `front` vector.
//! Only pitch changes refresh `front`; yaw is read directly by the Euler view model.

use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use serde::Deserialize;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// How [`Camera::view_matrix`] turns position and angles into a view transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum ViewModel {
    /// `Rx(yaw) * Ry(pitch)` with the translation column overwritten by the camera position.
    /// Not orthonormal with respect to `front`. Yaw and pitch are rotated as degrees, never
    /// reinterpreted as radians.
    #[default]
    #[serde(rename = "euler")]
    #[value(name = "euler")]
    EulerApprox,
    /// A right-handed look-at from `position` towards `position + front`.
    #[serde(rename = "look_at")]
    #[value(name = "look-at")]
    LookAt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vector3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
}

impl Camera {
    pub const PITCH_LIMIT: f32 = 89.0;

    pub fn new<V: Into<Vector3<f32>>>(position: V, yaw: Deg<f32>, pitch: Deg<f32>) -> Self {
        let pitch = pitch.0.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        Self {
            position: position.into(),
            front: front_from_angles(yaw.0, pitch),
            up: Vector3::unit_y(),
            yaw: yaw.0,
            pitch,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    /// Move along `front` or along the strafe axis `front x up`.
    ///
    /// The strafe axis is normalized on every call but position is never re-projected,
    /// so long off-axis walks drift.
    pub fn apply_translation(&mut self, movement: Movement, speed: f32) {
        let strafe = self.front.cross(self.up);
        let strafe = if strafe.magnitude2() > f32::EPSILON {
            strafe.normalize()
        } else {
            Vector3::new(0.0, 0.0, 0.0)
        };
        match movement {
            Movement::Forward => self.position += self.front * speed,
            Movement::Backward => self.position -= self.front * speed,
            Movement::Left => self.position -= strafe * speed,
            Movement::Right => self.position += strafe * speed,
        }
    }

    pub fn apply_look_delta(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw += delta_yaw;
        self.pitch = (self.pitch + delta_pitch).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        if delta_pitch != 0.0 {
            self.front = front_from_angles(self.yaw, self.pitch);
        }
    }

    pub fn view_matrix(&self, model: ViewModel) -> Matrix4<f32> {
        match model {
            ViewModel::EulerApprox => {
                let mut view =
                    Matrix4::from_angle_x(Deg(self.yaw)) * Matrix4::from_angle_y(Deg(self.pitch));
                view.w.x = self.position.x;
                view.w.y = self.position.y;
                view.w.z = self.position.z;
                view
            }
            ViewModel::LookAt => {
                let eye = Point3::new(self.position.x, self.position.y, self.position.z);
                Matrix4::look_at_rh(eye, eye + self.front, self.up)
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new((0.0, 0.0, -10.0), Deg(-90.0), Deg(0.0))
    }
}

fn front_from_angles(yaw: f32, pitch: f32) -> Vector3<f32> {
    let (yaw, pitch) = (Rad::from(Deg(yaw)).0, Rad::from(Deg(pitch)).0);
    Vector3::new(pitch.cos() * yaw.cos(), pitch.sin(), pitch.cos() * yaw.sin()).normalize()
}

/// Fixed perspective projection; only the aspect ratio follows the window.
#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width.max(1) as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}
