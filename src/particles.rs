use bevy::{
    asset::RenderAssetUsages,
    prelude::*,
    render::mesh::{PrimitiveTopology::PointList, VertexAttributeValues},
};
use rayon::prelude::*;

use crate::{
    config::MorphConfig,
    sampler::{PointSampler, SampledPositions},
    tween::{Ease, Timeline},
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Particle {
    pub(crate) initial: Vec3,
    pub(crate) current: Vec3,
    pub(crate) target: Vec3,
}

/// Flat xyz triples handed to the renderer. Slot i is particle i.
#[derive(Debug, Default)]
pub(crate) struct PositionBuffer {
    positions: Vec<[f32; 3]>,
    needs_update: bool,
}

impl PositionBuffer {
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }

    /// The `3N` floats, particle i at `3i..3i + 3`
    #[cfg(test)]
    pub(crate) fn as_flat(&self) -> &[f32] {
        self.positions.as_flattened()
    }

    #[cfg(test)]
    pub(crate) fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub(crate) fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Hands back the positions if they changed since the last call
    pub(crate) fn take_update(&mut self) -> Option<&[[f32; 3]]> {
        if !self.needs_update {
            return None;
        }
        self.needs_update = false;
        Some(&self.positions)
    }
}

#[derive(Component, Debug)]
pub(crate) struct ParticleField {
    pub(crate) particles: Vec<Particle>,
    /// Scratch copy of the current positions the timeline renders into
    currents: Vec<Vec3>,
    pub(crate) buffer: PositionBuffer,
}

impl ParticleField {
    pub(crate) fn new(SampledPositions { scattered, shell }: SampledPositions) -> Self {
        let particles: Vec<_> = scattered
            .into_iter()
            .zip(shell)
            .map(|(initial, target)| Particle {
                initial,
                current: initial,
                target,
            })
            .collect();
        let currents = particles.iter().map(|p| p.current).collect();
        let mut field = Self {
            particles,
            currents,
            buffer: PositionBuffer::default(),
        };
        field.write_buffer();
        field
    }

    pub(crate) fn len(&self) -> usize {
        self.particles.len()
    }

    /// One tween per particle, all starting together
    pub(crate) fn timeline(&self, duration: f32, ease: Ease) -> Timeline {
        let mut timeline = Timeline::default();
        for (i, particle) in self.particles.iter().enumerate() {
            timeline.to(i, particle.initial, particle.target, duration, ease, 0.0);
        }
        timeline
    }

    /// Lets the timeline move the particles, refreshing the buffer if it did
    pub(crate) fn update(&mut self, timeline: &mut Timeline) -> bool {
        if !timeline.render(&mut self.currents) {
            return false;
        }
        for (particle, &current) in self.particles.iter_mut().zip(&self.currents) {
            particle.current = current;
        }
        self.write_buffer();
        true
    }

    /// Copies every current position into its buffer slot and flags the
    /// buffer for upload
    pub(crate) fn write_buffer(&mut self) {
        let positions = &mut self.buffer.positions;
        positions.resize(self.particles.len(), [0.0; 3]);
        positions
            .par_iter_mut()
            .zip(self.particles.par_iter())
            .for_each(|(slot, particle)| *slot = particle.current.to_array());
        self.buffer.needs_update = true;
    }

    pub(crate) fn mesh(&self) -> Mesh {
        Mesh::new(
            PointList,
            RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, self.buffer.positions.clone())
    }
}

#[derive(Component)]
pub(crate) struct Spin(pub(crate) f32);

pub(crate) fn setup_particles(
    config: Res<MorphConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut commands: Commands,
) {
    let mut sampler = PointSampler::new(
        config.scatter_extent,
        config.sphere_radius,
        config.sphere_sampling,
        config.seed,
    );
    let field = ParticleField::new(sampler.sample(config.particle_count));
    let mut timeline = field.timeline(config.morph_duration, config.ease);
    if config.autoplay {
        timeline.play();
    } else {
        timeline.pause();
    }

    // Validated at startup, fall back to the default blue regardless
    let color = config
        .point_color()
        .unwrap_or(Color::srgb_u8(0x11, 0x13, 0xDB));

    info!(
        "spawning {} particles, {:?} shell of radius {}",
        field.len(),
        config.sphere_sampling,
        config.sphere_radius
    );

    commands.spawn((
        Mesh3d(meshes.add(field.mesh())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: color,
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..Default::default()
        })),
        Transform::IDENTITY,
        Spin(config.spin_speed),
        field,
        timeline,
    ));
}

/// Time driven playback, a no-op while the timeline is paused
pub(crate) fn advance_timeline(time: Res<Time>, mut timelines: Query<&mut Timeline>) {
    for mut timeline in timelines.iter_mut() {
        if !timeline.is_paused() {
            timeline.advance(time.delta_secs());
        }
    }
}

pub(crate) fn update_particles(mut fields: Query<(&mut ParticleField, &mut Timeline)>) {
    for (mut field, mut timeline) in fields.iter_mut() {
        field.update(&mut timeline);
    }
}

/// Re-uploads the point mesh whenever the buffer was rewritten
pub(crate) fn upload_positions(
    mut fields: Query<(&mut ParticleField, &Mesh3d)>,
    mut meshes: ResMut<Assets<Mesh>>,
) {
    for (mut field, mesh) in fields.iter_mut() {
        if !field.buffer.needs_update() {
            continue;
        }
        let Some(mesh) = meshes.get_mut(&mesh.0) else {
            continue;
        };
        let Some(positions) = field.buffer.take_update() else {
            continue;
        };
        if let Some(VertexAttributeValues::Float32x3(existing)) =
            mesh.attribute_mut(Mesh::ATTRIBUTE_POSITION)
        {
            if existing.len() == positions.len() {
                existing.copy_from_slice(positions);
                continue;
            }
        }
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions.to_vec());
    }
}

pub(crate) fn spin_particles(mut query: Query<(&mut Transform, &Spin)>) {
    for (mut transform, spin) in query.iter_mut() {
        transform.rotate_y(spin.0);
    }
}
