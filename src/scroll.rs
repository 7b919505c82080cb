use bevy::{
    input::mouse::{MouseScrollUnit, MouseWheel},
    prelude::*,
    window::{PrimaryWindow, WindowResized},
};

use crate::{
    config::MorphConfig,
    tween::{ProgressSink, Timeline},
};

/// `offset / max_scrollable_height`, pinned to [0, 1]. None when there is
/// nothing to scroll, so callers leave the timeline where it is.
pub(crate) fn progress_at(offset: f32, max_scrollable_height: f32) -> Option<f32> {
    if !max_scrollable_height.is_finite() || max_scrollable_height <= 0.0 || !offset.is_finite() {
        return None;
    }
    Some((offset / max_scrollable_height).clamp(0.0, 1.0))
}

/// A virtual page: a scroll container taller than the window
#[derive(Resource, Debug, Clone, PartialEq)]
pub(crate) struct ScrollState {
    pub(crate) offset: f32,
    pub(crate) content_height: f32,
    pub(crate) viewport_height: f32,
}

impl ScrollState {
    pub(crate) fn new(content_height: f32, viewport_height: f32) -> Self {
        Self {
            offset: 0.0,
            content_height,
            viewport_height,
        }
    }

    pub(crate) fn max_scrollable_height(&self) -> f32 {
        self.content_height - self.viewport_height
    }

    pub(crate) fn progress(&self) -> Option<f32> {
        progress_at(self.offset, self.max_scrollable_height())
    }

    /// Jumps to `offset` and pushes the resulting progress into `sink`.
    /// The offset is kept inside the page the way a browser keeps scrollY.
    pub(crate) fn on_scroll<S: ProgressSink + ?Sized>(
        &mut self,
        offset: f32,
        sink: &mut S,
    ) -> Option<f32> {
        let max = self.max_scrollable_height().max(0.0);
        if offset.is_finite() {
            self.offset = offset.clamp(0.0, max);
        }
        let progress = self.progress()?;
        sink.set_progress(progress);
        Some(progress)
    }

    pub(crate) fn scroll_by<S: ProgressSink + ?Sized>(
        &mut self,
        delta: f32,
        sink: &mut S,
    ) -> Option<f32> {
        self.on_scroll(self.offset + delta, sink)
    }

    /// New viewport height, so a new scrollable height. The offset is
    /// re-clamped and the progress recomputed against it.
    pub(crate) fn on_resize<S: ProgressSink + ?Sized>(
        &mut self,
        viewport_height: f32,
        sink: &mut S,
    ) -> Option<f32> {
        self.viewport_height = viewport_height;
        self.on_scroll(self.offset, sink)
    }
}

impl ProgressSink for Query<'_, '_, &mut Timeline> {
    fn set_progress(&mut self, progress: f32) {
        for mut timeline in self.iter_mut() {
            timeline.set_progress(progress);
        }
    }
}

/// Wheel delta in logical pixels, positive when scrolling down the page
pub(crate) fn wheel_pixels(event: &MouseWheel, line_height: f32) -> f32 {
    match event.unit {
        MouseScrollUnit::Line => -event.y * line_height,
        MouseScrollUnit::Pixel => -event.y,
    }
}

pub(crate) fn setup_scroll(
    config: Res<MorphConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut commands: Commands,
) {
    let viewport_height = windows.get_single().map(Window::height).unwrap_or(0.0);
    let scroll = ScrollState::new(config.content_height, viewport_height);

    if scroll.max_scrollable_height() <= 0.0 {
        warn!(
            "content height {} does not exceed the viewport {}, scrolling will not morph",
            scroll.content_height, scroll.viewport_height
        );
    } else {
        info!("scrollable height {}", scroll.max_scrollable_height());
    }

    commands.insert_resource(scroll);
}

pub(crate) fn scroll_wheel(
    mut wheel: EventReader<MouseWheel>,
    config: Res<MorphConfig>,
    mut scroll: ResMut<ScrollState>,
    mut timelines: Query<&mut Timeline>,
) {
    for event in wheel.read() {
        scroll.scroll_by(wheel_pixels(event, config.line_height), &mut timelines);
    }
}

pub(crate) fn scroll_resize(
    mut resized: EventReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
    mut scroll: ResMut<ScrollState>,
    mut timelines: Query<&mut Timeline>,
) {
    for event in resized.read() {
        if primary.get(event.window).is_err() {
            continue;
        }
        let progress = scroll.on_resize(event.height, &mut timelines);
        debug!(
            "viewport {}x{}, scrollable height {}, progress {:?}",
            event.width,
            event.height,
            scroll.max_scrollable_height(),
            progress
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::Ease;
    use bevy::window::WindowResolution;

    /// Remembers everything it was told
    #[derive(Default)]
    struct Recorder(Vec<f32>);

    impl ProgressSink for Recorder {
        fn set_progress(&mut self, progress: f32) {
            self.0.push(progress);
        }
    }

    #[test]
    fn progress_endpoints() {
        assert_eq!(progress_at(0.0, 200.0), Some(0.0));
        assert_eq!(progress_at(200.0, 200.0), Some(1.0));
        assert_eq!(progress_at(100.0, 200.0), Some(0.5));
    }

    #[test]
    fn progress_is_monotonic() {
        let mut last = 0.0;
        for step in 0..=300 {
            let progress = progress_at(step as f32, 200.0).unwrap();
            assert!(progress >= last);
            last = progress;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn halfway_scroll_forwards_exactly_half() {
        let mut scroll = ScrollState::new(1000.0, 800.0);
        assert_eq!(scroll.max_scrollable_height(), 200.0);
        let mut sink = Recorder::default();
        assert_eq!(scroll.on_scroll(100.0, &mut sink), Some(0.5));
        assert_eq!(sink.0, vec![0.5]);
    }

    #[test]
    fn nothing_to_scroll_is_a_no_op() {
        let mut sink = Recorder::default();
        for viewport in [1000.0, 1200.0] {
            let mut scroll = ScrollState::new(1000.0, viewport);
            assert_eq!(scroll.on_scroll(100.0, &mut sink), None);
            assert_eq!(scroll.offset, 0.0);
        }
        assert!(sink.0.is_empty());
        assert_eq!(progress_at(10.0, 0.0), None);
        assert_eq!(progress_at(10.0, f32::NAN), None);
    }

    #[test]
    fn offset_stays_on_the_page() {
        let mut scroll = ScrollState::new(1000.0, 800.0);
        let mut sink = Recorder::default();
        assert_eq!(scroll.on_scroll(-50.0, &mut sink), Some(0.0));
        assert_eq!(scroll.on_scroll(5000.0, &mut sink), Some(1.0));
        assert_eq!(scroll.offset, 200.0);
        assert_eq!(scroll.scroll_by(-100.0, &mut sink), Some(0.5));
    }

    #[test]
    fn resize_recomputes_the_scrollable_height() {
        let mut scroll = ScrollState::new(1000.0, 800.0);
        let mut sink = Recorder::default();
        scroll.on_scroll(100.0, &mut sink);

        assert_eq!(scroll.on_resize(600.0, &mut sink), Some(0.25));
        assert_eq!(scroll.max_scrollable_height(), 400.0);

        // Shrinking the page past the offset pulls it back in
        assert_eq!(scroll.on_resize(950.0, &mut sink), Some(1.0));
        assert_eq!(scroll.offset, 50.0);

        assert_eq!(scroll.on_resize(1100.0, &mut sink), None);
        assert_eq!(sink.0, vec![0.5, 0.25, 1.0]);
    }

    #[test]
    fn wheel_units() {
        let down = |unit, y| MouseWheel {
            unit,
            x: 0.0,
            y,
            window: Entity::PLACEHOLDER,
        };
        assert_eq!(wheel_pixels(&down(MouseScrollUnit::Line, -2.0), 40.0), 80.0);
        assert_eq!(wheel_pixels(&down(MouseScrollUnit::Pixel, -15.0), 40.0), 15.0);
        assert_eq!(wheel_pixels(&down(MouseScrollUnit::Line, 1.0), 40.0), -40.0);
    }

    fn scroll_app(content_height: f32, viewport_height: f32) -> App {
        let mut app = App::new();
        app.add_event::<MouseWheel>()
            .insert_resource(MorphConfig::default())
            .insert_resource(ScrollState::new(content_height, viewport_height))
            .add_systems(Update, scroll_wheel);

        let mut timeline = Timeline::default();
        timeline.to(0, Vec3::ZERO, Vec3::X, 1.0, Ease::Power3Out, 0.0);
        timeline.pause();
        app.world_mut().spawn(timeline);
        app
    }

    fn wheel(app: &mut App, lines: f32) {
        app.world_mut().send_event(MouseWheel {
            unit: MouseScrollUnit::Line,
            x: 0.0,
            y: -lines,
            window: Entity::PLACEHOLDER,
        });
        app.update();
    }

    fn timeline_progress(app: &mut App) -> f32 {
        app.world_mut()
            .query::<&Timeline>()
            .single(app.world())
            .progress()
    }

    #[test]
    fn wheel_scrubs_the_timeline() {
        // 400px to scroll, 40px per line
        let mut app = scroll_app(1200.0, 800.0);

        wheel(&mut app, 5.0);
        assert_eq!(timeline_progress(&mut app), 0.5);
        assert_eq!(app.world().resource::<ScrollState>().offset, 200.0);

        wheel(&mut app, 50.0);
        assert_eq!(timeline_progress(&mut app), 1.0);

        wheel(&mut app, -10.0);
        assert_eq!(timeline_progress(&mut app), 0.0);
    }

    #[test]
    fn wheel_on_a_short_page_leaves_the_timeline_alone() {
        let mut app = scroll_app(500.0, 800.0);
        wheel(&mut app, 5.0);
        assert_eq!(timeline_progress(&mut app), 0.0);
        assert_eq!(app.world().resource::<ScrollState>().offset, 0.0);
    }

    fn window(width: f32, height: f32) -> Window {
        Window {
            resolution: WindowResolution::new(width, height),
            ..Default::default()
        }
    }

    /// Startup reads the viewport from the primary window, returns the
    /// app and that window
    fn windowed_app(content_height: f32) -> (App, Entity) {
        let mut app = App::new();
        app.add_event::<WindowResized>()
            .insert_resource(MorphConfig {
                content_height,
                ..Default::default()
            })
            .add_systems(Startup, setup_scroll)
            .add_systems(Update, scroll_resize);

        let primary = app.world_mut().spawn((window(1280.0, 800.0), PrimaryWindow)).id();
        let mut timeline = Timeline::default();
        timeline.to(0, Vec3::ZERO, Vec3::X, 1.0, Ease::Power3Out, 0.0);
        timeline.pause();
        app.world_mut().spawn(timeline);
        app.update();
        (app, primary)
    }

    fn resize(app: &mut App, window: Entity, height: f32) {
        app.world_mut().send_event(WindowResized {
            window,
            width: 1280.0,
            height,
        });
        app.update();
    }

    #[test]
    fn startup_measures_the_primary_window() {
        let (app, _) = windowed_app(1000.0);
        let scroll = app.world().resource::<ScrollState>();
        assert_eq!(scroll.viewport_height, 800.0);
        assert_eq!(scroll.max_scrollable_height(), 200.0);
        assert_eq!(scroll.offset, 0.0);
    }

    #[test]
    fn startup_without_a_window_has_nothing_to_scroll_past() {
        let mut app = App::new();
        app.insert_resource(MorphConfig {
            content_height: 1000.0,
            ..Default::default()
        })
        .add_systems(Startup, setup_scroll);
        app.update();
        let scroll = app.world().resource::<ScrollState>();
        assert_eq!(scroll.viewport_height, 0.0);
        assert_eq!(scroll.max_scrollable_height(), 1000.0);
    }

    #[test]
    fn primary_resize_pushes_progress_again() {
        let (mut app, primary) = windowed_app(1000.0);
        app.world_mut().resource_mut::<ScrollState>().offset = 100.0;

        resize(&mut app, primary, 600.0);
        assert_eq!(app.world().resource::<ScrollState>().max_scrollable_height(), 400.0);
        assert_eq!(timeline_progress(&mut app), 0.25);

        resize(&mut app, primary, 900.0);
        assert_eq!(app.world().resource::<ScrollState>().offset, 100.0);
        assert_eq!(timeline_progress(&mut app), 1.0);
    }

    #[test]
    fn other_windows_resizing_is_ignored() {
        let (mut app, _) = windowed_app(1000.0);
        app.world_mut().resource_mut::<ScrollState>().offset = 100.0;
        let other = app.world_mut().spawn(window(640.0, 480.0)).id();

        resize(&mut app, other, 300.0);
        let scroll = app.world().resource::<ScrollState>();
        assert_eq!(scroll.viewport_height, 800.0);
        assert_eq!(scroll.max_scrollable_height(), 200.0);
        assert_eq!(timeline_progress(&mut app), 0.0);
    }
}
