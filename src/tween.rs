use bevy::prelude::*;
use serde::Deserialize;

// powerN raises to the N+1th power, power3 is a quartic
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Ease {
    Linear,
    Power1In,
    Power1Out,
    Power1InOut,
    Power2In,
    Power2Out,
    Power2InOut,
    Power3In,
    #[default]
    Power3Out,
    Power3InOut,
    Power4In,
    Power4Out,
    Power4InOut,
}

fn ease_in(t: f32, power: i32) -> f32 {
    t.powi(power)
}

fn ease_out(t: f32, power: i32) -> f32 {
    1.0 - (1.0 - t).powi(power)
}

fn ease_in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        ease_in(t * 2.0, power) / 2.0
    } else {
        1.0 - ease_in((1.0 - t) * 2.0, power) / 2.0
    }
}

impl Ease {
    pub(crate) fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1In => ease_in(t, 2),
            Ease::Power1Out => ease_out(t, 2),
            Ease::Power1InOut => ease_in_out(t, 2),
            Ease::Power2In => ease_in(t, 3),
            Ease::Power2Out => ease_out(t, 3),
            Ease::Power2InOut => ease_in_out(t, 3),
            Ease::Power3In => ease_in(t, 4),
            Ease::Power3Out => ease_out(t, 4),
            Ease::Power3InOut => ease_in_out(t, 4),
            Ease::Power4In => ease_in(t, 5),
            Ease::Power4Out => ease_out(t, 5),
            Ease::Power4InOut => ease_in_out(t, 5),
        }
    }
}

pub(crate) trait ProgressSink {
    fn set_progress(&mut self, progress: f32);
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tween {
    pub(crate) target: usize,
    pub(crate) from: Vec3,
    pub(crate) to: Vec3,
    pub(crate) start: f32,
    pub(crate) duration: f32,
    pub(crate) ease: Ease,
}

impl Tween {
    pub(crate) fn value_at(&self, time: f32) -> Vec3 {
        let local = if self.duration > 0.0 {
            (time - self.start) / self.duration
        } else if time >= self.start {
            1.0
        } else {
            0.0
        };
        self.from.lerp(self.to, self.ease.apply(local))
    }

    fn end(&self) -> f32 {
        self.start + self.duration
    }
}

#[derive(Component, Debug, Default)]
pub(crate) struct Timeline {
    tweens: Vec<Tween>,
    time: f32,
    paused: bool,
    needs_render: bool,
}

impl Timeline {
    pub(crate) fn to(
        &mut self,
        target: usize,
        from: Vec3,
        to: Vec3,
        duration: f32,
        ease: Ease,
        start: f32,
    ) -> &mut Self {
        self.tweens.push(Tween {
            target,
            from,
            to,
            start,
            duration: duration.max(0.0),
            ease,
        });
        self.needs_render = true;
        self
    }

    #[cfg(test)]
    pub(crate) fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    pub(crate) fn duration(&self) -> f32 {
        self.tweens.iter().map(Tween::end).fold(0.0, f32::max)
    }

    #[cfg(test)]
    pub(crate) fn time(&self) -> f32 {
        self.time
    }

    pub(crate) fn progress(&self) -> f32 {
        let duration = self.duration();
        if duration > 0.0 {
            self.time / duration
        } else {
            0.0
        }
    }

    pub(crate) fn pause(&mut self) {
        self.paused = true;
    }

    pub(crate) fn play(&mut self) {
        self.paused = false;
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn advance(&mut self, delta: f32) {
        if self.paused || delta == 0.0 {
            return;
        }
        self.time = (self.time + delta).clamp(0.0, self.duration());
        self.needs_render = true;
    }

    /// Writes every tween's value at the playhead into `values`. Returns
    /// whether anything was written, i.e. whether the update callback fires.
    pub(crate) fn render(&mut self, values: &mut [Vec3]) -> bool {
        if !self.needs_render {
            return false;
        }
        for tween in &self.tweens {
            if let Some(value) = values.get_mut(tween.target) {
                *value = tween.value_at(self.time);
            }
        }
        self.needs_render = false;
        true
    }
}

impl ProgressSink for Timeline {
    fn set_progress(&mut self, progress: f32) {
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.time = progress * self.duration();
        self.needs_render = true;
    }
}
