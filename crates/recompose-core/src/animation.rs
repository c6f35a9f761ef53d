//! Animation curves as pure functions of play time.
//!
//! Every spec answers three questions for a single `f32` component: value at
//! time t, velocity at time t, and how long until it settles. Multi-component
//! values (colors, offsets) run each component through the same curve.

use std::sync::OnceLock;

use smallvec::SmallVec;
use web_time::Duration;

use crate::{Color, Dp, Vec2};

const MILLIS_TO_NANOS: u64 = 1_000_000;
const SECONDS_TO_NANOS: f64 = 1_000_000_000.0;

pub const DEFAULT_DURATION_MILLIS: u64 = 300;

/// Spring constants, named after the toolkit presets.
pub mod spring {
    pub const DAMPING_RATIO_HIGH_BOUNCY: f32 = 0.2;
    pub const DAMPING_RATIO_MEDIUM_BOUNCY: f32 = 0.5;
    pub const DAMPING_RATIO_LOW_BOUNCY: f32 = 0.75;
    pub const DAMPING_RATIO_NO_BOUNCY: f32 = 1.0;

    pub const STIFFNESS_HIGH: f32 = 10_000.0;
    pub const STIFFNESS_MEDIUM: f32 = 1_500.0;
    pub const STIFFNESS_MEDIUM_LOW: f32 = 400.0;
    pub const STIFFNESS_LOW: f32 = 200.0;
    pub const STIFFNESS_VERY_LOW: f32 = 50.0;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Cubic bezier through (0,0), (x1,y1), (x2,y2), (1,1).
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    pub const FAST_OUT_SLOW_IN: Easing = Easing::CubicBezier(0.4, 0.0, 0.2, 1.0);
    pub const LINEAR_OUT_SLOW_IN: Easing = Easing::CubicBezier(0.0, 0.0, 0.2, 1.0);
    pub const FAST_OUT_LINEAR_IN: Easing = Easing::CubicBezier(0.4, 0.0, 1.0, 1.0);

    pub fn interpolate(&self, t: f32) -> f32 {
        match *self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicBezier(a, b, c, d) => cubic_bezier(a, b, c, d, t),
        }
    }
}

fn bezier_coord(p1: f32, p2: f32, m: f32) -> f32 {
    3.0 * p1 * (1.0 - m) * (1.0 - m) * m + 3.0 * p2 * (1.0 - m) * m * m + m * m * m
}

fn cubic_bezier(a: f32, b: f32, c: f32, d: f32, fraction: f32) -> f32 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }
    let (mut start, mut end) = (0.0f32, 1.0f32);
    let mut mid = 0.5;
    for _ in 0..64 {
        mid = (start + end) / 2.0;
        let estimate = bezier_coord(a, c, mid);
        if (fraction - estimate).abs() < 0.0001 {
            break;
        }
        if estimate < fraction {
            start = mid;
        } else {
            end = mid;
        }
    }
    bezier_coord(b, d, mid)
}

/// Target based animation curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationSpec {
    /// Jump to the target once `delay` has passed.
    Snap { delay: Duration },
    Tween {
        duration: Duration,
        delay: Duration,
        easing: Easing,
    },
    /// Physics spring. `visibility_threshold` overrides the per-type default
    /// distance under which the spring counts as settled.
    Spring {
        damping_ratio: f32,
        stiffness: f32,
        visibility_threshold: Option<f32>,
    },
}

impl Default for AnimationSpec {
    fn default() -> Self {
        Self::spring()
    }
}

impl AnimationSpec {
    pub fn snap() -> Self {
        Self::Snap {
            delay: Duration::ZERO,
        }
    }
    /// Tween with the default duration and fast-out-slow-in easing.
    pub fn tween_default() -> Self {
        Self::tween(Duration::from_millis(DEFAULT_DURATION_MILLIS), Easing::FAST_OUT_SLOW_IN)
    }
    pub fn tween(duration: Duration, easing: Easing) -> Self {
        Self::Tween {
            duration,
            delay: Duration::ZERO,
            easing,
        }
    }
    pub fn tween_millis(duration_ms: u64, delay_ms: u64) -> Self {
        Self::Tween {
            duration: Duration::from_millis(duration_ms),
            delay: Duration::from_millis(delay_ms),
            easing: Easing::FAST_OUT_SLOW_IN,
        }
    }
    pub fn spring() -> Self {
        Self::spring_with(spring::DAMPING_RATIO_NO_BOUNCY, spring::STIFFNESS_MEDIUM)
    }
    pub fn spring_with(damping_ratio: f32, stiffness: f32) -> Self {
        Self::Spring {
            damping_ratio,
            stiffness,
            visibility_threshold: None,
        }
    }
    pub fn fast() -> Self {
        Self::tween(Duration::from_millis(150), Easing::EaseOut)
    }
    pub fn slow() -> Self {
        Self::tween(Duration::from_millis(600), Easing::EaseInOut)
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        match self {
            Self::Snap { .. } => Self::Snap { delay },
            Self::Tween {
                duration, easing, ..
            } => Self::Tween {
                duration,
                delay,
                easing,
            },
            // Springs start immediately
            spring @ Self::Spring { .. } => spring,
        }
    }

    pub fn with_visibility_threshold(self, threshold: f32) -> Self {
        match self {
            Self::Spring {
                damping_ratio,
                stiffness,
                ..
            } => Self::Spring {
                damping_ratio,
                stiffness,
                visibility_threshold: Some(threshold),
            },
            other => other,
        }
    }

    /// Value of one component `play_nanos` into the animation.
    pub fn value_at(&self, play_nanos: u64, start: f32, end: f32, v0: f32, threshold: f32) -> f32 {
        match *self {
            AnimationSpec::Snap { delay } => {
                if play_nanos < nanos(delay) {
                    start
                } else {
                    end
                }
            }
            AnimationSpec::Tween {
                duration,
                delay,
                easing,
            } => {
                let play = play_nanos.saturating_sub(nanos(delay));
                let total = nanos(duration);
                let fraction = if total == 0 {
                    1.0
                } else {
                    (play as f64 / total as f64).clamp(0.0, 1.0) as f32
                };
                start + (end - start) * easing.interpolate(fraction)
            }
            AnimationSpec::Spring {
                damping_ratio,
                stiffness,
                visibility_threshold,
            } => {
                // within the threshold the spring has landed
                let threshold = visibility_threshold.unwrap_or(threshold);
                let settle = spring_duration_nanos(damping_ratio, stiffness, start - end, v0, threshold);
                if play_nanos >= settle {
                    return end;
                }
                let (disp, _) = spring_state(damping_ratio, stiffness, start - end, v0, secs(play_nanos));
                end + disp
            }
        }
    }

    pub fn velocity_at(
        &self,
        play_nanos: u64,
        start: f32,
        end: f32,
        v0: f32,
        threshold: f32,
    ) -> f32 {
        match *self {
            AnimationSpec::Snap { .. } => 0.0,
            AnimationSpec::Tween { .. } => {
                // finite difference over the last millisecond
                let prev = play_nanos.saturating_sub(MILLIS_TO_NANOS);
                let dt = secs(play_nanos - prev);
                if dt == 0.0 {
                    return 0.0;
                }
                (self.value_at(play_nanos, start, end, v0, threshold)
                    - self.value_at(prev, start, end, v0, threshold))
                    / dt
            }
            AnimationSpec::Spring {
                damping_ratio,
                stiffness,
                ..
            } => spring_state(damping_ratio, stiffness, start - end, v0, secs(play_nanos)).1,
        }
    }

    pub fn duration_nanos(&self, start: f32, end: f32, v0: f32, threshold: f32) -> u64 {
        match *self {
            AnimationSpec::Snap { delay } => nanos(delay),
            AnimationSpec::Tween {
                duration, delay, ..
            } => nanos(delay) + nanos(duration),
            AnimationSpec::Spring {
                damping_ratio,
                stiffness,
                visibility_threshold,
            } => {
                let threshold = visibility_threshold.unwrap_or(threshold);
                spring_duration_nanos(damping_ratio, stiffness, start - end, v0, threshold)
            }
        }
    }
}

fn nanos(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

fn secs(n: u64) -> f32 {
    (n as f64 / SECONDS_TO_NANOS) as f32
}

/// Displacement from the rest position and velocity of a damped spring `t`
/// seconds after release with displacement `x0` and velocity `v0`.
fn spring_state(damping_ratio: f32, stiffness: f32, x0: f32, v0: f32, t: f32) -> (f32, f32) {
    let (x0, v0, t) = (x0 as f64, v0 as f64, t as f64);
    let zeta = damping_ratio.max(0.0) as f64;
    let omega = (stiffness.max(0.0001) as f64).sqrt();

    let (disp, vel) = if zeta > 1.0 {
        // Overdamped
        let root = (zeta * zeta - 1.0).sqrt();
        let gamma_plus = -zeta * omega + omega * root;
        let gamma_minus = -zeta * omega - omega * root;
        let coeff_b = (gamma_minus * x0 - v0) / (gamma_minus - gamma_plus);
        let coeff_a = x0 - coeff_b;
        let disp = coeff_a * (gamma_minus * t).exp() + coeff_b * (gamma_plus * t).exp();
        let vel = coeff_a * gamma_minus * (gamma_minus * t).exp()
            + coeff_b * gamma_plus * (gamma_plus * t).exp();
        (disp, vel)
    } else if zeta == 1.0 {
        // Critically damped
        let coeff_a = x0;
        let coeff_b = v0 + omega * x0;
        let decay = (-omega * t).exp();
        let disp = (coeff_a + coeff_b * t) * decay;
        let vel = (coeff_a + coeff_b * t) * decay * -omega + coeff_b * decay;
        (disp, vel)
    } else {
        // Underdamped
        let damped_freq = omega * (1.0 - zeta * zeta).sqrt();
        let cos_coeff = x0;
        let sin_coeff = (zeta * omega * x0 + v0) / damped_freq;
        let decay = (-zeta * omega * t).exp();
        let (sin, cos) = (damped_freq * t).sin_cos();
        let disp = decay * (cos_coeff * cos + sin_coeff * sin);
        let vel = disp * (-omega * zeta)
            + decay * (-damped_freq * cos_coeff * sin + damped_freq * sin_coeff * cos);
        (disp, vel)
    };
    (disp as f32, vel as f32)
}

/// Velocity below `threshold * VELOCITY_THRESHOLD_MULTIPLIER` units/s counts
/// as at rest.
const VELOCITY_THRESHOLD_MULTIPLIER: f32 = 62.5;
const MAX_SPRING_NANOS: u64 = 60_000 * MILLIS_TO_NANOS;

fn spring_duration_nanos(damping_ratio: f32, stiffness: f32, x0: f32, v0: f32, threshold: f32) -> u64 {
    let threshold = threshold.max(f32::EPSILON);
    let at_rest = |disp: f32, vel: f32| {
        disp.abs() < threshold && vel.abs() < threshold * VELOCITY_THRESHOLD_MULTIPLIER
    };
    if at_rest(x0, v0) {
        return 0;
    }
    let mut t = 0u64;
    while t < MAX_SPRING_NANOS {
        t += MILLIS_TO_NANOS;
        let (disp, vel) = spring_state(damping_ratio, stiffness, x0, v0, secs(t));
        if at_rest(disp, vel) {
            return t;
        }
    }
    MAX_SPRING_NANOS
}

/// Velocity based (fling) curve: no target, the value glides to rest.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DecayAnimationSpec {
    Exponential {
        friction_multiplier: f32,
        abs_velocity_threshold: f32,
    },
    /// The platform's scroll fling curve; `density` is px per dp.
    SplineBased { density: f32 },
}

impl DecayAnimationSpec {
    pub fn exponential() -> Self {
        Self::exponential_with(1.0, 0.1)
    }
    pub fn exponential_with(friction_multiplier: f32, abs_velocity_threshold: f32) -> Self {
        Self::Exponential {
            friction_multiplier,
            abs_velocity_threshold,
        }
    }
    pub fn spline_based(density: f32) -> Self {
        Self::SplineBased { density }
    }

    pub fn value_at(&self, play_nanos: u64, start: f32, v0: f32) -> f32 {
        match *self {
            DecayAnimationSpec::Exponential {
                friction_multiplier,
                ..
            } => {
                let friction = exp_friction(friction_multiplier);
                let t = secs(play_nanos);
                start - v0 / friction + v0 / friction * (friction * t).exp()
            }
            DecayAnimationSpec::SplineBased { density } => {
                let fling = Fling::new(v0, density);
                start + fling.distance_at(play_nanos)
            }
        }
    }

    pub fn velocity_at(&self, play_nanos: u64, _start: f32, v0: f32) -> f32 {
        match *self {
            DecayAnimationSpec::Exponential {
                friction_multiplier,
                ..
            } => v0 * (secs(play_nanos) * exp_friction(friction_multiplier)).exp(),
            DecayAnimationSpec::SplineBased { density } => {
                Fling::new(v0, density).velocity_at(play_nanos)
            }
        }
    }

    pub fn duration_nanos(&self, _start: f32, v0: f32) -> u64 {
        match *self {
            DecayAnimationSpec::Exponential {
                friction_multiplier,
                abs_velocity_threshold,
            } => {
                if v0.abs() <= abs_velocity_threshold {
                    return 0;
                }
                let friction = exp_friction(friction_multiplier);
                let secs = (abs_velocity_threshold / v0.abs()).ln() / friction;
                (secs.max(0.0) as f64 * SECONDS_TO_NANOS) as u64
            }
            DecayAnimationSpec::SplineBased { density } => Fling::new(v0, density).duration_nanos,
        }
    }

    /// Where the value comes to rest.
    pub fn target(&self, start: f32, v0: f32) -> f32 {
        match *self {
            DecayAnimationSpec::Exponential {
                friction_multiplier,
                ..
            } => start - v0 / exp_friction(friction_multiplier),
            DecayAnimationSpec::SplineBased { density } => {
                start + Fling::new(v0, density).signed_distance()
            }
        }
    }
}

const EXPONENTIAL_DECAY_FRICTION: f32 = -4.2;

fn exp_friction(multiplier: f32) -> f32 {
    EXPONENTIAL_DECAY_FRICTION * multiplier.max(0.0001)
}

// Fling curve constants (scroll friction, earth gravity, inch per meter).
const SCROLL_FRICTION: f32 = 0.015;
const GRAVITY_EARTH: f32 = 9.806_65;
const INCHES_PER_METER: f32 = 39.37;
const DECELERATION_FRICTION: f32 = 0.84;
const INFLECTION: f32 = 0.35;
const START_TENSION: f32 = 0.5;
const END_TENSION: f32 = 1.0;
const SPLINE_SAMPLES: usize = 100;

fn deceleration_rate() -> f32 {
    0.78f32.ln() / 0.9f32.ln()
}

fn spline_positions() -> &'static [f32; SPLINE_SAMPLES + 1] {
    static TABLE: OnceLock<[f32; SPLINE_SAMPLES + 1]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let p1 = START_TENSION * INFLECTION;
        let p2 = 1.0 - END_TENSION * (1.0 - INFLECTION);
        let mut table = [0.0f32; SPLINE_SAMPLES + 1];
        let mut x_min = 0.0f32;
        for (i, slot) in table.iter_mut().take(SPLINE_SAMPLES).enumerate() {
            let alpha = i as f32 / SPLINE_SAMPLES as f32;
            let mut x_max = 1.0f32;
            let (mut x, mut coef);
            let mut iterations = 0;
            loop {
                x = x_min + (x_max - x_min) / 2.0;
                coef = 3.0 * x * (1.0 - x);
                let tx = coef * ((1.0 - x) * p1 + x * p2) + x * x * x;
                iterations += 1;
                if (tx - alpha).abs() < 1e-5 || iterations > 64 {
                    break;
                }
                if tx > alpha {
                    x_max = x;
                } else {
                    x_min = x;
                }
            }
            *slot = coef * ((1.0 - x) * START_TENSION + x) + x * x * x;
        }
        table[SPLINE_SAMPLES] = 1.0;
        table
    })
}

/// (distance fraction, velocity coefficient) at time fraction `t`.
fn spline_at(t: f32) -> (f32, f32) {
    let table = spline_positions();
    let t = t.clamp(0.0, 1.0);
    let index = (SPLINE_SAMPLES as f32 * t) as usize;
    if index >= SPLINE_SAMPLES {
        return (1.0, 0.0);
    }
    let t_inf = index as f32 / SPLINE_SAMPLES as f32;
    let t_sup = (index + 1) as f32 / SPLINE_SAMPLES as f32;
    let d_inf = table[index];
    let d_sup = table[index + 1];
    let velocity_coef = (d_sup - d_inf) / (t_sup - t_inf);
    (d_inf + (t - t_inf) * velocity_coef, velocity_coef)
}

struct Fling {
    sign: f32,
    distance: f32,
    duration_nanos: u64,
}

impl Fling {
    fn new(v0: f32, density: f32) -> Self {
        if v0 == 0.0 || !v0.is_finite() {
            return Self {
                sign: 0.0,
                distance: 0.0,
                duration_nanos: 0,
            };
        }
        let physical_coeff =
            GRAVITY_EARTH * INCHES_PER_METER * density.max(0.01) * 160.0 * DECELERATION_FRICTION;
        let l = (INFLECTION * v0.abs() / (SCROLL_FRICTION * physical_coeff)).ln();
        let rate = deceleration_rate();
        let duration_ms = 1000.0 * (l / (rate - 1.0)).exp();
        let distance = SCROLL_FRICTION * physical_coeff * (rate / (rate - 1.0) * l).exp();
        Self {
            sign: v0.signum(),
            distance,
            duration_nanos: (duration_ms as f64 * MILLIS_TO_NANOS as f64) as u64,
        }
    }

    fn signed_distance(&self) -> f32 {
        self.sign * self.distance
    }

    fn fraction(&self, play_nanos: u64) -> f32 {
        if self.duration_nanos == 0 {
            1.0
        } else {
            (play_nanos as f64 / self.duration_nanos as f64) as f32
        }
    }

    fn distance_at(&self, play_nanos: u64) -> f32 {
        self.sign * self.distance * spline_at(self.fraction(play_nanos)).0
    }

    fn velocity_at(&self, play_nanos: u64) -> f32 {
        if self.duration_nanos == 0 {
            return 0.0;
        }
        let (_, coef) = spline_at(self.fraction(play_nanos));
        self.sign * coef * self.distance / secs(self.duration_nanos)
    }
}

/// Components of an animated value.
pub type AnimVector = SmallVec<[f32; 4]>;

/// Maps a value to and from the float components the curves operate on.
pub trait VectorConverter: Clone + PartialEq + 'static {
    /// Distance (per component) under which a spring counts as settled.
    const VISIBILITY_THRESHOLD: f32 = 0.01;

    fn to_vector(&self) -> AnimVector;
    fn from_vector(v: &[f32]) -> Self;
}

impl VectorConverter for f32 {
    fn to_vector(&self) -> AnimVector {
        smallvec::smallvec![*self]
    }
    fn from_vector(v: &[f32]) -> Self {
        v.first().copied().unwrap_or(0.0)
    }
}

impl VectorConverter for Dp {
    const VISIBILITY_THRESHOLD: f32 = 0.1;

    fn to_vector(&self) -> AnimVector {
        smallvec::smallvec![self.0]
    }
    fn from_vector(v: &[f32]) -> Self {
        Dp(v.first().copied().unwrap_or(0.0))
    }
}

impl VectorConverter for Vec2 {
    const VISIBILITY_THRESHOLD: f32 = 0.5;

    fn to_vector(&self) -> AnimVector {
        smallvec::smallvec![self.x, self.y]
    }
    fn from_vector(v: &[f32]) -> Self {
        Vec2 {
            x: v.first().copied().unwrap_or(0.0),
            y: v.get(1).copied().unwrap_or(0.0),
        }
    }
}

impl VectorConverter for Color {
    const VISIBILITY_THRESHOLD: f32 = 0.5;

    fn to_vector(&self) -> AnimVector {
        smallvec::smallvec![self.0 as f32, self.1 as f32, self.2 as f32, self.3 as f32]
    }
    fn from_vector(v: &[f32]) -> Self {
        let ch = |i: usize| v.get(i).copied().unwrap_or(0.0).round().clamp(0.0, 255.0) as u8;
        Color(ch(0), ch(1), ch(2), ch(3))
    }
}

fn component(v: &AnimVector, i: usize) -> f32 {
    v.get(i).copied().unwrap_or(0.0)
}

/// A target based animation frozen at its start conditions.
#[derive(Clone, Debug)]
pub struct TargetBasedAnimation {
    spec: AnimationSpec,
    initial: AnimVector,
    target: AnimVector,
    initial_velocity: AnimVector,
    threshold: f32,
    duration_nanos: u64,
}

impl TargetBasedAnimation {
    pub fn new(
        spec: AnimationSpec,
        initial: AnimVector,
        target: AnimVector,
        initial_velocity: AnimVector,
        threshold: f32,
    ) -> Self {
        let duration_nanos = (0..target.len())
            .map(|i| {
                spec.duration_nanos(
                    component(&initial, i),
                    component(&target, i),
                    component(&initial_velocity, i),
                    threshold,
                )
            })
            .max()
            .unwrap_or(0);
        Self {
            spec,
            initial,
            target,
            initial_velocity,
            threshold,
            duration_nanos,
        }
    }

    pub fn duration_nanos(&self) -> u64 {
        self.duration_nanos
    }

    pub fn is_finished_at(&self, play_nanos: u64) -> bool {
        play_nanos >= self.duration_nanos
    }

    pub fn target(&self) -> &AnimVector {
        &self.target
    }

    /// Exactly the target once the animation has finished.
    pub fn value_at(&self, play_nanos: u64) -> AnimVector {
        if self.is_finished_at(play_nanos) {
            return self.target.clone();
        }
        (0..self.target.len())
            .map(|i| {
                self.spec.value_at(
                    play_nanos,
                    component(&self.initial, i),
                    component(&self.target, i),
                    component(&self.initial_velocity, i),
                    self.threshold,
                )
            })
            .collect()
    }

    pub fn velocity_at(&self, play_nanos: u64) -> AnimVector {
        if self.is_finished_at(play_nanos) {
            return self.target.iter().map(|_| 0.0).collect();
        }
        (0..self.target.len())
            .map(|i| {
                self.spec.velocity_at(
                    play_nanos,
                    component(&self.initial, i),
                    component(&self.target, i),
                    component(&self.initial_velocity, i),
                    self.threshold,
                )
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
pub struct DecayAnimation {
    spec: DecayAnimationSpec,
    initial: AnimVector,
    initial_velocity: AnimVector,
    target: AnimVector,
    duration_nanos: u64,
}

impl DecayAnimation {
    pub fn new(spec: DecayAnimationSpec, initial: AnimVector, initial_velocity: AnimVector) -> Self {
        let dims = initial.len();
        let target = (0..dims)
            .map(|i| spec.target(component(&initial, i), component(&initial_velocity, i)))
            .collect();
        let duration_nanos = (0..dims)
            .map(|i| spec.duration_nanos(component(&initial, i), component(&initial_velocity, i)))
            .max()
            .unwrap_or(0);
        Self {
            spec,
            initial,
            initial_velocity,
            target,
            duration_nanos,
        }
    }

    pub fn duration_nanos(&self) -> u64 {
        self.duration_nanos
    }

    pub fn target(&self) -> &AnimVector {
        &self.target
    }

    pub fn is_finished_at(&self, play_nanos: u64) -> bool {
        play_nanos >= self.duration_nanos
    }

    pub fn value_at(&self, play_nanos: u64) -> AnimVector {
        if self.is_finished_at(play_nanos) {
            return self.target.clone();
        }
        (0..self.initial.len())
            .map(|i| {
                self.spec.value_at(
                    play_nanos,
                    component(&self.initial, i),
                    component(&self.initial_velocity, i),
                )
            })
            .collect()
    }

    pub fn velocity_at(&self, play_nanos: u64) -> AnimVector {
        if self.is_finished_at(play_nanos) {
            return self.initial.iter().map(|_| 0.0).collect();
        }
        (0..self.initial.len())
            .map(|i| {
                self.spec.velocity_at(
                    play_nanos,
                    component(&self.initial, i),
                    component(&self.initial_velocity, i),
                )
            })
            .collect()
    }
}
