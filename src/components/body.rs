//! Rigid body component with fixed-step integration and interpolated drawing.
//!
//! A [`Body`] keeps two physical states: the current one, advanced once per
//! fixed step, and the one from the step before. Between steps the renderer
//! reads [`Body::draw_transform`], which [`Body::blend`] computes by
//! interpolating those two states with the accumulator's leftover fraction.
//!
//! # Lifecycle
//!
//! 1. [`Body::place`] sets position, orientation and velocities and seeds the
//!    previous state with the same values, so the first blend is a no-op.
//! 2. Each fixed step, [`Body::advance`] copies the current state into the
//!    previous one and integrates velocities (forward Euler). Bodies with
//!    `movable == false` are never integrated.
//! 3. Each rendered frame, [`Body::blend`] writes the draw transform.
//!
//! # Rotation blending
//!
//! The orientation blend is an element-wise lerp of the two rotation matrices,
//! not a slerp. Fast spinners shear visibly between steps; that is the
//! accepted approximation and callers rely on its exact output.

use bevy_ecs::prelude::Component;
use glam::{Mat3, Mat4, Vec3};

use crate::components::boundingbox::BoundingBox;

/// Opaque reference to an externally owned drawable shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub &'static str);

/// Opaque reference to an externally owned material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub &'static str);

/// Position and orientation at one fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalState {
    pub center: Vec3,
    pub orientation: Mat3,
}

impl Default for PhysicalState {
    fn default() -> Self {
        Self {
            center: Vec3::ZERO,
            orientation: Mat3::IDENTITY,
        }
    }
}

/// Physical state of a simulated entity.
///
/// # Fields
/// - `center`, `orientation` - state at the latest fixed step (authoritative)
/// - `previous` - state at the fixed step before that
/// - `draw_transform` - blended transform; the only thing the renderer reads
/// - `linear_velocity` - world units per second
/// - `angular_velocity` - radians per second about `spin_axis`
/// - `size` - non-uniform scale applied at draw time
/// - `movable` - integration gate
/// - `breakable` - participates in the shatter rule
/// - `gravity` - receives the configured downward acceleration each step
/// - `bounds` - local-space bounding box, fixed per shape
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Body {
    pub center: Vec3,
    pub orientation: Mat3,
    pub previous: PhysicalState,
    pub draw_transform: Mat4,
    pub linear_velocity: Vec3,
    pub angular_velocity: f32,
    pub spin_axis: Vec3,
    pub size: Vec3,
    pub movable: bool,
    pub breakable: bool,
    pub gravity: bool,
    bounds: BoundingBox,
    pub shape: ShapeHandle,
    pub material: MaterialHandle,
}

impl Body {
    /// Create a body resting at the origin with identity orientation.
    pub fn new(
        shape: ShapeHandle,
        material: MaterialHandle,
        size: Vec3,
        bounds: BoundingBox,
        movable: bool,
        breakable: bool,
    ) -> Self {
        Self {
            center: Vec3::ZERO,
            orientation: Mat3::IDENTITY,
            previous: PhysicalState::default(),
            draw_transform: Mat4::from_scale(size),
            linear_velocity: Vec3::ZERO,
            angular_velocity: 0.0,
            spin_axis: Vec3::Y,
            size,
            movable,
            breakable,
            gravity: false,
            bounds,
            shape,
            material,
        }
    }

    /// Builder toggle for gravity.
    pub fn with_gravity(mut self, gravity: bool) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder form of [`Body::place`].
    pub fn placed(
        mut self,
        transform: Mat4,
        linear_velocity: Vec3,
        angular_velocity: f32,
        spin_axis: Option<Vec3>,
    ) -> Self {
        self.place(transform, linear_velocity, angular_velocity, spin_axis);
        self
    }

    /// Local-space bounding box.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Assign (or overwrite) the body's placement and velocities.
    ///
    /// The translation of `transform` becomes the center; the remaining linear
    /// part becomes the orientation. The previous state is reset to the same
    /// values and the draw transform is recomputed from them. When
    /// `spin_axis` is `None` the current axis is kept.
    pub fn place(
        &mut self,
        transform: Mat4,
        linear_velocity: Vec3,
        angular_velocity: f32,
        spin_axis: Option<Vec3>,
    ) {
        self.center = transform.w_axis.truncate();
        self.orientation = Mat3::from_mat4(transform);
        self.previous = self.state();
        self.linear_velocity = linear_velocity;
        self.angular_velocity = angular_velocity;
        if let Some(axis) = spin_axis {
            self.spin_axis = axis.normalize_or(Vec3::Y);
        }
        self.blend(1.0);
    }

    /// Current physical state.
    pub fn state(&self) -> PhysicalState {
        PhysicalState {
            center: self.center,
            orientation: self.orientation,
        }
    }

    /// Forward Euler step of `dt` seconds. No-op for immovable bodies.
    pub fn advance(&mut self, dt: f32) {
        if !self.movable {
            return;
        }
        self.previous = self.state();
        self.center += self.linear_velocity * dt;
        if self.angular_velocity != 0.0 {
            let spin = Mat3::from_axis_angle(self.spin_axis, self.angular_velocity * dt);
            self.orientation = spin * self.orientation;
        }
    }

    /// Element-wise lerp between the previous and current orientation.
    pub fn blend_rotation(&self, alpha: f32) -> Mat3 {
        let (from, to) = (self.previous.orientation, self.orientation);
        Mat3::from_cols(
            from.x_axis.lerp(to.x_axis, alpha),
            from.y_axis.lerp(to.y_axis, alpha),
            from.z_axis.lerp(to.z_axis, alpha),
        )
    }

    /// Write the draw transform for a point `alpha` of the way from the
    /// previous state to the current one.
    pub fn blend(&mut self, alpha: f32) {
        let center = self.previous.center.lerp(self.center, alpha);
        self.draw_transform = Mat4::from_translation(center)
            * Mat4::from_mat3(self.blend_rotation(alpha))
            * Mat4::from_scale(self.size);
    }

    /// World-space box of the body as currently drawn.
    pub fn world_bounds(&self) -> BoundingBox {
        self.bounds.transformed(&self.draw_transform)
    }

    /// Overlap test between the drawn (blended) boxes of two bodies.
    /// A body never collides with itself.
    pub fn is_colliding_with(&self, other: &Body) -> bool {
        if std::ptr::eq(self, other) {
            return false;
        }
        self.world_bounds().overlaps(&other.world_bounds())
    }

    pub fn is_at_rest(&self) -> bool {
        self.linear_velocity == Vec3::ZERO
    }
}

/// Placement transform looking along `direction` from `position`.
///
/// Pitch and yaw are taken as `atan(d.y / d.z)` and `atan(d.x / d.z)` of the
/// normalized direction, so headings with a negative z component fold onto
/// the forward hemisphere. A zero numerator yields a zero angle, which keeps
/// axis-aligned directions finite.
pub fn heading_transform(position: Vec3, direction: Vec3) -> Mat4 {
    let d = direction.normalize_or_zero();
    let pitch = ratio_atan(d.y, d.z);
    let yaw = ratio_atan(d.x, d.z);
    Mat4::from_translation(position) * Mat4::from_rotation_x(-pitch) * Mat4::from_rotation_y(yaw)
}

fn ratio_atan(numerator: f32, denominator: f32) -> f32 {
    if numerator == 0.0 {
        0.0
    } else {
        (numerator / denominator).atan()
    }
}
