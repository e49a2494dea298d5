//! Classic control tasks with the standard gym dynamics.
//!
//! Physics is integrated in `f64` and observations are reported as `f32`.

use ndarray::{array, Array1};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use std::f64::consts::PI;

use super::{check_action, episode_finished, Environment, Step};
use crate::error::Result;

/// Pole balancing on a cart. Two actions: push left, push right.
pub struct CartPole {
    x: f64,
    x_dot: f64,
    theta: f64,
    theta_dot: f64,

    gravity: f64,
    mass_cart: f64,
    mass_pole: f64,
    length: f64,
    force_mag: f64,
    tau: f64,
    theta_threshold: f64,
    x_threshold: f64,

    needs_reset: bool,
    rng: StdRng,
}

impl CartPole {
    pub fn new() -> Self {
        CartPole {
            x: 0.0,
            x_dot: 0.0,
            theta: 0.0,
            theta_dot: 0.0,
            gravity: 9.8,
            mass_cart: 1.0,
            mass_pole: 0.1,
            length: 0.5, // half the pole's length
            force_mag: 10.0,
            tau: 0.02,
            theta_threshold: 12.0 * 2.0 * PI / 360.0,
            x_threshold: 2.4,
            needs_reset: true,
            rng: StdRng::from_entropy(),
        }
    }

    fn observation(&self) -> Array1<f32> {
        array![self.x as f32, self.x_dot as f32, self.theta as f32, self.theta_dot as f32]
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CartPole {
    fn id(&self) -> &str {
        "CartPole-v1"
    }

    fn reset(&mut self) -> Array1<f32> {
        let init = Uniform::new(-0.05, 0.05);
        self.x = init.sample(&mut self.rng);
        self.x_dot = init.sample(&mut self.rng);
        self.theta = init.sample(&mut self.rng);
        self.theta_dot = init.sample(&mut self.rng);
        self.needs_reset = false;
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        check_action(action, self.action_space_size())?;
        if self.needs_reset {
            return Err(episode_finished());
        }

        let force = if action == 1 { self.force_mag } else { -self.force_mag };
        let cos_theta = self.theta.cos();
        let sin_theta = self.theta.sin();
        let total_mass = self.mass_cart + self.mass_pole;
        let pole_mass_length = self.mass_pole * self.length;

        let temp = (force + pole_mass_length * self.theta_dot * self.theta_dot * sin_theta) / total_mass;
        let theta_acc = (self.gravity * sin_theta - cos_theta * temp)
            / (self.length * (4.0 / 3.0 - self.mass_pole * cos_theta * cos_theta / total_mass));
        let x_acc = temp - pole_mass_length * theta_acc * cos_theta / total_mass;

        // Explicit Euler, as in the reference task
        self.x += self.tau * self.x_dot;
        self.x_dot += self.tau * x_acc;
        self.theta += self.tau * self.theta_dot;
        self.theta_dot += self.tau * theta_acc;

        let terminated = self.x.abs() > self.x_threshold || self.theta.abs() > self.theta_threshold;
        self.needs_reset = terminated;

        Ok(Step::new(self.observation(), 1.0, terminated))
    }

    fn action_space_size(&self) -> usize {
        2
    }

    fn observation_size(&self) -> usize {
        4
    }

    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

/// Under-powered car in a valley. Three actions: push left, no push, push right.
pub struct MountainCar {
    position: f64,
    velocity: f64,

    min_position: f64,
    max_position: f64,
    max_speed: f64,
    goal_position: f64,
    goal_velocity: f64,
    force: f64,
    gravity: f64,

    needs_reset: bool,
    rng: StdRng,
}

impl MountainCar {
    pub fn new() -> Self {
        MountainCar {
            position: -0.5,
            velocity: 0.0,
            min_position: -1.2,
            max_position: 0.6,
            max_speed: 0.07,
            goal_position: 0.5,
            goal_velocity: 0.0,
            force: 0.001,
            gravity: 0.0025,
            needs_reset: true,
            rng: StdRng::from_entropy(),
        }
    }

    fn observation(&self) -> Array1<f32> {
        array![self.position as f32, self.velocity as f32]
    }
}

impl Default for MountainCar {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for MountainCar {
    fn id(&self) -> &str {
        "MountainCar-v0"
    }

    fn reset(&mut self) -> Array1<f32> {
        self.position = Uniform::new(-0.6, -0.4).sample(&mut self.rng);
        self.velocity = 0.0;
        self.needs_reset = false;
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        check_action(action, self.action_space_size())?;
        if self.needs_reset {
            return Err(episode_finished());
        }

        self.velocity += (action as f64 - 1.0) * self.force - (3.0 * self.position).cos() * self.gravity;
        self.velocity = self.velocity.clamp(-self.max_speed, self.max_speed);
        self.position += self.velocity;
        self.position = self.position.clamp(self.min_position, self.max_position);
        if self.position <= self.min_position && self.velocity < 0.0 {
            self.velocity = 0.0;
        }

        let terminated = self.position >= self.goal_position && self.velocity >= self.goal_velocity;
        self.needs_reset = terminated;

        Ok(Step::new(self.observation(), -1.0, terminated))
    }

    fn action_space_size(&self) -> usize {
        3
    }

    fn observation_size(&self) -> usize {
        2
    }

    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

const ACROBOT_DT: f64 = 0.2;
const LINK_LENGTH_1: f64 = 1.0;
const LINK_MASS_1: f64 = 1.0;
const LINK_MASS_2: f64 = 1.0;
const LINK_COM_POS_1: f64 = 0.5;
const LINK_COM_POS_2: f64 = 0.5;
const LINK_MOI: f64 = 1.0;
const MAX_VEL_1: f64 = 4.0 * PI;
const MAX_VEL_2: f64 = 9.0 * PI;
const AVAIL_TORQUE: [f64; 3] = [-1.0, 0.0, 1.0];

/// Two-link pendulum actuated at the middle joint. Three torques: -1, 0, +1.
///
/// Observation: `[cos θ1, sin θ1, cos θ2, sin θ2, θ1', θ2']`.
pub struct Acrobot {
    state: [f64; 4],
    needs_reset: bool,
    rng: StdRng,
}

impl Acrobot {
    pub fn new() -> Self {
        Acrobot {
            state: [0.0; 4],
            needs_reset: true,
            rng: StdRng::from_entropy(),
        }
    }

    fn observation(&self) -> Array1<f32> {
        let [theta1, theta2, dtheta1, dtheta2] = self.state;
        array![
            theta1.cos() as f32,
            theta1.sin() as f32,
            theta2.cos() as f32,
            theta2.sin() as f32,
            dtheta1 as f32,
            dtheta2 as f32
        ]
    }

    fn is_terminal(&self) -> bool {
        let [theta1, theta2, _, _] = self.state;
        -theta1.cos() - (theta2 + theta1).cos() > 1.0
    }

    fn derivatives(s: [f64; 4], torque: f64) -> [f64; 4] {
        let (m1, m2) = (LINK_MASS_1, LINK_MASS_2);
        let l1 = LINK_LENGTH_1;
        let (lc1, lc2) = (LINK_COM_POS_1, LINK_COM_POS_2);
        let (i1, i2) = (LINK_MOI, LINK_MOI);
        let g = 9.8;
        let [theta1, theta2, dtheta1, dtheta2] = s;

        let d1 = m1 * lc1 * lc1 + m2 * (l1 * l1 + lc2 * lc2 + 2.0 * l1 * lc2 * theta2.cos()) + i1 + i2;
        let d2 = m2 * (lc2 * lc2 + l1 * lc2 * theta2.cos()) + i2;
        let phi2 = m2 * lc2 * g * (theta1 + theta2 - PI / 2.0).cos();
        let phi1 = -m2 * l1 * lc2 * dtheta2 * dtheta2 * theta2.sin()
            - 2.0 * m2 * l1 * lc2 * dtheta2 * dtheta1 * theta2.sin()
            + (m1 * lc1 + m2 * l1) * g * (theta1 - PI / 2.0).cos()
            + phi2;
        let ddtheta2 = (torque + d2 / d1 * phi1 - m2 * l1 * lc2 * dtheta1 * dtheta1 * theta2.sin() - phi2)
            / (m2 * lc2 * lc2 + i2 - d2 * d2 / d1);
        let ddtheta1 = -(d2 * ddtheta2 + phi1) / d1;

        [dtheta1, dtheta2, ddtheta1, ddtheta2]
    }

    fn rk4(s: [f64; 4], torque: f64, dt: f64) -> [f64; 4] {
        let offset = |base: [f64; 4], k: [f64; 4], h: f64| {
            let mut out = base;
            for i in 0..4 {
                out[i] += h * k[i];
            }
            out
        };
        let k1 = Self::derivatives(s, torque);
        let k2 = Self::derivatives(offset(s, k1, dt / 2.0), torque);
        let k3 = Self::derivatives(offset(s, k2, dt / 2.0), torque);
        let k4 = Self::derivatives(offset(s, k3, dt), torque);

        let mut next = s;
        for i in 0..4 {
            next[i] += dt / 6.0 * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]);
        }
        next
    }
}

impl Default for Acrobot {
    fn default() -> Self {
        Self::new()
    }
}

fn wrap(mut x: f64, low: f64, high: f64) -> f64 {
    let diff = high - low;
    while x > high {
        x -= diff;
    }
    while x < low {
        x += diff;
    }
    x
}

impl Environment for Acrobot {
    fn id(&self) -> &str {
        "Acrobot-v1"
    }

    fn reset(&mut self) -> Array1<f32> {
        let init = Uniform::new(-0.1, 0.1);
        for s in self.state.iter_mut() {
            *s = init.sample(&mut self.rng);
        }
        self.needs_reset = false;
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        check_action(action, self.action_space_size())?;
        if self.needs_reset {
            return Err(episode_finished());
        }

        let mut next = Self::rk4(self.state, AVAIL_TORQUE[action], ACROBOT_DT);
        next[0] = wrap(next[0], -PI, PI);
        next[1] = wrap(next[1], -PI, PI);
        next[2] = next[2].clamp(-MAX_VEL_1, MAX_VEL_1);
        next[3] = next[3].clamp(-MAX_VEL_2, MAX_VEL_2);
        self.state = next;

        let terminated = self.is_terminal();
        self.needs_reset = terminated;
        let reward = if terminated { 0.0 } else { -1.0 };

        Ok(Step::new(self.observation(), reward, terminated))
    }

    fn action_space_size(&self) -> usize {
        3
    }

    fn observation_size(&self) -> usize {
        6
    }

    fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}
