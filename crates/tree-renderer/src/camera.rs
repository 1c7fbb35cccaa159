//! Camera and hand-driven framing

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

/// Camera uniform for GPU
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Billboard basis in world space
    pub right: [f32; 3],
    pub time: f32,
    pub up: [f32; 3],
    pub fog_near: f32,
    pub eye: [f32; 3],
    pub fog_far: f32,
}

/// Perspective camera that always looks at `target`
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: CameraRig::BASE_POSITION,
            target: Vec3::ZERO,
            aspect: width as f32 / height.max(1) as f32,
            fovy: 50.0_f32.to_radians(),
            znear: 0.1,
            zfar: 200.0,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * self.view_matrix()
    }

    pub fn to_uniform(&self, time: f32) -> CameraUniform {
        let view = self.view_matrix();
        CameraUniform {
            view_proj: self.build_view_projection_matrix().to_cols_array_2d(),
            right: view.row(0).truncate().to_array(),
            time,
            up: view.row(1).truncate().to_array(),
            fog_near: 10.0,
            eye: self.position.to_array(),
            fog_far: 50.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }
}

/// Eases the camera toward a goal derived from the hand, or an idle drift
/// when no hand steers it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    pub base: Vec3,
    /// World units per unit of hand offset, on X and Y
    pub hand_reach: Vec2,
    pub idle_amplitude: f32,
    pub idle_frequency: f32,
    /// Fraction of the gap closed per reference frame
    pub smoothing: f32,
    pub reference_rate: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self {
            base: Self::BASE_POSITION,
            hand_reach: Vec2::new(10.0, 5.0),
            idle_amplitude: 5.0,
            idle_frequency: 0.2,
            smoothing: 0.05,
            reference_rate: 60.0,
        }
    }
}

impl CameraRig {
    pub const BASE_POSITION: Vec3 = Vec3::new(0.0, 4.0, 20.0);

    /// Where the camera wants to be. `hand` is the centroid in [-1, 1] when
    /// a hand is steering, image Y pointing down.
    pub fn goal(&self, hand: Option<Vec2>, elapsed: f32) -> Vec3 {
        match hand {
            Some(hand) => Vec3::new(
                self.base.x + hand.x * self.hand_reach.x,
                self.base.y - hand.y * self.hand_reach.y,
                self.base.z,
            ),
            None => Vec3::new(
                self.base.x + (elapsed * self.idle_frequency).sin() * self.idle_amplitude,
                self.base.y,
                self.base.z,
            ),
        }
    }

    /// Lerp factor for `dt`, equal to `smoothing` at the reference rate
    pub fn blend(&self, dt: f32) -> f32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        1.0 - (1.0 - self.smoothing).powf(dt * self.reference_rate)
    }

    pub fn follow(&self, camera: &mut Camera, dt: f32, elapsed: f32, hand: Option<Vec2>) {
        let goal = self.goal(hand, elapsed);
        camera.position = camera.position.lerp(goal, self.blend(dt));
        camera.target = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 112);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = Camera::new(1280, 720);
        let clip = camera.build_view_projection_matrix() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5, "{ndc:?}");
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn billboard_basis_is_orthonormal() {
        let camera = Camera::new(800, 600);
        let uniform = camera.to_uniform(0.0);
        let right = Vec3::from_array(uniform.right);
        let up = Vec3::from_array(uniform.up);
        assert!((right.length() - 1.0).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!(right.dot(up).abs() < 1e-5);
        assert!(right.abs_diff_eq(Vec3::X, 1e-5), "camera on +Z looks down -Z");
    }

    #[test]
    fn hand_steers_goal() {
        let rig = CameraRig::default();
        assert_eq!(
            rig.goal(Some(Vec2::new(0.5, -1.0)), 3.0),
            Vec3::new(5.0, 9.0, 20.0)
        );
    }

    #[test]
    fn idle_goal_drifts_sideways() {
        let rig = CameraRig::default();
        assert_eq!(rig.goal(None, 0.0), CameraRig::BASE_POSITION);
        let t = std::f32::consts::FRAC_PI_2 / 0.2;
        assert!(rig.goal(None, t).abs_diff_eq(Vec3::new(5.0, 4.0, 20.0), 1e-4));
    }

    #[test]
    fn blend_is_five_percent_per_sixty_hz_frame() {
        let rig = CameraRig::default();
        assert!((rig.blend(1.0 / 60.0) - 0.05).abs() < 1e-6);
        assert_eq!(rig.blend(0.0), 0.0);
        assert_eq!(rig.blend(f32::NAN), 0.0);
    }

    #[test]
    fn smoothing_is_frame_rate_independent() {
        let rig = CameraRig::default();
        let hand = Some(Vec2::new(1.0, 0.0));

        let mut fast = Camera::new(100, 100);
        for _ in 0..120 {
            rig.follow(&mut fast, 1.0 / 120.0, 0.0, hand);
        }
        let mut slow = Camera::new(100, 100);
        for _ in 0..30 {
            rig.follow(&mut slow, 1.0 / 30.0, 0.0, hand);
        }

        assert!(
            fast.position.abs_diff_eq(slow.position, 1e-3),
            "{:?} vs {:?}",
            fast.position,
            slow.position
        );
    }
}
