use bevy::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Deserialize;
use std::f32::consts::{PI, TAU};

/// How target points are placed on the sphere shell
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub(crate) enum SphereSampling {
    /// theta uniform over [0, pi). Bunches up at the poles.
    #[default]
    Polar,
    /// cos(theta) uniform over [-1, 1), even coverage
    Uniform,
    /// Golden-angle spiral, no randomness at all
    Fibonacci,
}

pub(crate) fn fibonacci_sphere_point(i: u32, n: u32) -> Vec3 {
    if n < 2 {
        return Vec3::Y;
    }
    let phi = PI * (5.0f32.sqrt() - 1.0);

    let y = 1.0 - (i as f32 / (n as f32 - 1.0)) * 2.0;
    let radius = (1.0 - y * y).max(0.0).sqrt();

    let theta = phi * i as f32;

    let x = theta.cos() * radius;
    let z = theta.sin() * radius;

    Vec3::new(x, y, z)
}

/// Spherical to cartesian, theta measured from +z
fn shell_point(radius: f32, theta: f32, phi: f32) -> Vec3 {
    Vec3::new(
        radius * theta.sin() * phi.cos(),
        radius * theta.sin() * phi.sin(),
        radius * theta.cos(),
    )
}

/// The two position sets, index i in both belongs to particle i
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SampledPositions {
    pub(crate) scattered: Vec<Vec3>,
    pub(crate) shell: Vec<Vec3>,
}

pub(crate) struct PointSampler {
    rng: StdRng,
    /// Edge length of the scatter cube
    pub(crate) extent: f32,
    pub(crate) radius: f32,
    pub(crate) sampling: SphereSampling,
}

impl PointSampler {
    pub(crate) fn new(
        extent: f32,
        radius: f32,
        sampling: SphereSampling,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            extent,
            radius,
            sampling,
        }
    }

    /// Independent uniform draw per axis in [-extent/2, extent/2)
    pub(crate) fn scattered_point(&mut self) -> Vec3 {
        let mut axis = || (self.rng.random::<f32>() - 0.5) * self.extent;
        let x = axis();
        let y = axis();
        let z = axis();
        Vec3::new(x, y, z)
    }

    /// One random point on the shell. Fibonacci has no random form and falls
    /// back to the polar method here, use `shell` for the spiral.
    pub(crate) fn shell_point(&mut self) -> Vec3 {
        let phi = self.rng.random::<f32>() * TAU;
        let theta = match self.sampling {
            SphereSampling::Uniform => (self.rng.random::<f32>() * 2.0 - 1.0).acos(),
            SphereSampling::Polar | SphereSampling::Fibonacci => self.rng.random::<f32>() * PI,
        };
        shell_point(self.radius, theta, phi)
    }

    pub(crate) fn scattered(&mut self, n: usize) -> Vec<Vec3> {
        (0..n).map(|_| self.scattered_point()).collect()
    }

    pub(crate) fn shell(&mut self, n: usize) -> Vec<Vec3> {
        match self.sampling {
            SphereSampling::Fibonacci => (0..n as u32)
                .map(|i| fibonacci_sphere_point(i, n as u32) * self.radius)
                .collect(),
            _ => (0..n).map(|_| self.shell_point()).collect(),
        }
    }

    /// Scattered set first, then the shell, both from the same stream
    pub(crate) fn sample(&mut self, n: usize) -> SampledPositions {
        let scattered = self.scattered(n);
        let shell = self.shell(n);
        SampledPositions { scattered, shell }
    }
}
