use bevy::math::Vec2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    pub fn from_center(x: f32, y: f32, width: f32, height: f32) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        Self {
            min_x: x - hw,
            min_y: y - hh,
            max_x: x + hw,
            max_y: y + hh,
        }
    }

    pub fn from_min_max(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Strict intersection: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max_x > other.min_x
            && self.min_x < other.max_x
            && self.max_y > other.min_y
            && self.min_y < other.max_y
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StepParams {
    pub dt: f32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub restitution: Vec2,
    pub collide_platforms: bool,
    pub collide_world_bounds: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepResult {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub grounded: bool,
}

pub fn apply_gravity(vy: &mut f32, gravity: f32, dt: f32) {
    *vy += gravity * dt;
}

/// Velocity after hitting an obstacle while moving into it.
fn bounce(v: f32, restitution: f32) -> f32 {
    -v * restitution
}

/// Moves one body for one tick: x axis first, then y, then world bounds.
///
/// Platforms the body already overlapped before moving are ignored on that
/// axis so an embedded body gets pushed out along y instead of teleporting
/// sideways.
pub fn step_body(params: StepParams, platforms: &[Aabb], world: &Aabb) -> StepResult {
    let StepParams {
        dt,
        x,
        y,
        vx,
        vy,
        width,
        height,
        restitution,
        collide_platforms,
        collide_world_bounds,
    } = params;
    let mut out = StepResult {
        x,
        y,
        vx,
        vy,
        grounded: false,
    };

    let dx = vx * dt;
    if dx != 0.0 {
        let before = Aabb::from_center(out.x, out.y, width, height);
        out.x += dx;
        if collide_platforms {
            let moved = Aabb::from_center(out.x, out.y, width, height);
            for plat in platforms {
                if before.overlaps(plat) || !moved.overlaps(plat) {
                    continue;
                }
                if dx > 0.0 {
                    out.x = plat.min_x - width / 2.0;
                } else {
                    out.x = plat.max_x + width / 2.0;
                }
                out.vx = bounce(out.vx, restitution.x);
                break;
            }
        }
    }

    let dy = vy * dt;
    if dy != 0.0 {
        let before = Aabb::from_center(out.x, out.y, width, height);
        out.y += dy;
        if collide_platforms {
            let moved = Aabb::from_center(out.x, out.y, width, height);
            let mut landing: Option<f32> = None;
            for plat in platforms {
                if !moved.overlaps(plat) {
                    continue;
                }
                if before.overlaps(plat) && !(dy > 0.0 && before.min_y < plat.min_y) {
                    continue;
                }
                if dy > 0.0 {
                    let top = plat.min_y - height / 2.0;
                    landing = Some(landing.map_or(top, |v: f32| v.min(top)));
                } else {
                    let bottom = plat.max_y + height / 2.0;
                    landing = Some(landing.map_or(bottom, |v: f32| v.max(bottom)));
                }
            }
            if let Some(snap_y) = landing {
                out.y = snap_y;
                out.vy = bounce(out.vy, restitution.y);
                out.grounded = dy > 0.0;
            }
        }
    }

    if collide_world_bounds {
        let hw = width / 2.0;
        let hh = height / 2.0;
        if out.x - hw < world.min_x {
            out.x = world.min_x + hw;
            if out.vx < 0.0 {
                out.vx = bounce(out.vx, restitution.x);
            }
        } else if out.x + hw > world.max_x {
            out.x = world.max_x - hw;
            if out.vx > 0.0 {
                out.vx = bounce(out.vx, restitution.x);
            }
        }
        if out.y - hh < world.min_y {
            out.y = world.min_y + hh;
            if out.vy < 0.0 {
                out.vy = bounce(out.vy, restitution.y);
            }
        } else if out.y + hh >= world.max_y && dy >= 0.0 {
            out.y = world.max_y - hh;
            if out.vy > 0.0 {
                out.vy = bounce(out.vy, restitution.y);
            }
            out.grounded = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn world() -> Aabb {
        Aabb::from_min_max(0.0, 0.0, 800.0, 1200.0)
    }

    fn params(x: f32, y: f32, vx: f32, vy: f32) -> StepParams {
        StepParams {
            dt: DT,
            x,
            y,
            vx,
            vy,
            width: 40.0,
            height: 40.0,
            restitution: Vec2::ZERO,
            collide_platforms: true,
            collide_world_bounds: true,
        }
    }

    #[test]
    fn edge_contact_is_not_overlap() {
        let a = Aabb::from_center(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::from_center(10.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&b));
        let c = Aabb::from_center(9.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&c));
    }

    #[test]
    fn falling_body_lands_on_platform_top() {
        let ground = Aabb::from_center(400.0, 584.0, 800.0, 32.0);
        let out = step_body(params(100.0, 547.0, 0.0, 300.0), &[ground], &world());
        assert!((out.y - 548.0).abs() < 0.001);
        assert_eq!(out.vy, 0.0);
        assert!(out.grounded);
    }

    #[test]
    fn landing_applies_restitution() {
        let ground = Aabb::from_center(400.0, 584.0, 800.0, 32.0);
        let mut p = params(100.0, 547.0, 0.0, 300.0);
        p.restitution = Vec2::new(0.1, 0.1);
        let out = step_body(p, &[ground], &world());
        assert!((out.vy + 30.0).abs() < 0.001);
        assert!(out.grounded);
    }

    #[test]
    fn rising_body_bonks_platform_underside() {
        let plat = Aabb::from_center(100.0, 400.0, 64.0, 16.0);
        let out = step_body(params(100.0, 429.0, 0.0, -500.0), &[plat], &world());
        assert!((out.y - 428.0).abs() < 0.001);
        assert_eq!(out.vy, 0.0);
        assert!(!out.grounded);
    }

    #[test]
    fn horizontal_move_stops_at_platform_side() {
        let plat = Aabb::from_center(200.0, 500.0, 64.0, 16.0);
        let out = step_body(params(147.0, 500.0, 200.0, 0.0), &[plat], &world());
        assert!((out.x - 148.0).abs() < 0.001);
        assert_eq!(out.vx, 0.0);
    }

    #[test]
    fn embedded_body_is_pushed_out_upward() {
        let plat = Aabb::from_center(500.0, 420.0, 64.0, 16.0);
        let mut p = params(500.0, 420.0, 0.0, 10.0);
        p.width = 24.0;
        p.height = 24.0;
        let out = step_body(p, &[plat], &world());
        assert!((out.y - 400.0).abs() < 0.001);
        assert!(out.grounded);
    }

    #[test]
    fn world_bounds_clamp_and_bounce() {
        let mut p = params(795.0, 300.0, 100.0, 0.0);
        p.restitution = Vec2::ONE;
        let out = step_body(p, &[], &world());
        assert_eq!(out.x, 780.0);
        assert_eq!(out.vx, -100.0);

        let mut p = params(150.0, -50.0, 0.0, 0.0);
        p.height = 20.0;
        let out = step_body(p, &[], &world());
        assert_eq!(out.y, 10.0);
    }

    #[test]
    fn bodies_without_platform_collision_pass_through() {
        let plat = Aabb::from_center(100.0, 400.0, 64.0, 16.0);
        let mut p = params(100.0, 380.0, 0.0, 600.0);
        p.collide_platforms = false;
        let out = step_body(p, &[plat], &world());
        assert!((out.y - 390.0).abs() < 0.001);
        assert_eq!(out.vy, 600.0);
    }
}
