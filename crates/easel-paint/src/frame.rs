use glam::Mat4;

use crate::camera::DisplaySize;
use crate::controller::{ControllerIndex, Controllers};
use crate::event::{EventQueue, SceneEvent};
use crate::interaction::{Mark, PointerPainter};
use crate::ray::Ray;
use crate::scene::{Scene, SceneConfig};
use crate::session::{EligibilityPolicy, InteractionGate, SessionMode};
use crate::surface::SurfaceBuffer;

/// What happened to one select-start.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SelectOutcome {
    /// Discarded by the eligibility gate.
    Ineligible,
    /// The pointer ray missed the panel.
    Missed,
    Painted(Mark),
}

/// Summary of one [`FrameContext::process_events`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub selects: Vec<(ControllerIndex, SelectOutcome)>,
    pub session_changed: bool,
    pub resized: Option<DisplaySize>,
}

impl FrameReport {
    pub fn painted(&self) -> usize {
        self.selects
            .iter()
            .filter(|(_, o)| matches!(o, SelectOutcome::Painted(_)))
            .count()
    }
}

/// All mutable state of the running scene.
///
/// Owned by the render loop. Device, session and display notifications are
/// queued with [`push`](Self::push) and applied in order by
/// [`process_events`](Self::process_events), once per frame.
#[derive(Debug)]
pub struct FrameContext {
    scene: Scene,
    surface: SurfaceBuffer,
    controllers: Controllers,
    gate: InteractionGate,
    painter: PointerPainter,
    display: DisplaySize,
    queue: EventQueue,
    /// Poses polled this frame, applied to controllers that connect during
    /// the next `process_events`.
    polled: [Option<Mat4>; 2],
}

impl FrameContext {
    pub fn new(config: &SceneConfig, policy: EligibilityPolicy, display: DisplaySize) -> Self {
        let (w, h) = config.surface_size;
        Self {
            scene: Scene::new(config, display),
            surface: SurfaceBuffer::new(w, h, config.surface_fill),
            controllers: Controllers::new(),
            gate: InteractionGate::new(policy),
            painter: PointerPainter::default(),
            display,
            queue: EventQueue::new(),
            polled: [None; 2],
        }
    }

    #[inline]
    pub fn push(&mut self, event: SceneEvent) {
        self.queue.push(event);
    }

    /// Stores a polled controller pose.
    ///
    /// A controller whose connection is still queued picks the pose up when
    /// the connection is processed, so a select in the same frame uses it.
    pub fn update_pose(&mut self, index: ControllerIndex, pose: Mat4) {
        self.polled[index.index()] = Some(pose);
        self.controllers.update_pose(index, pose);
    }

    /// Moves the camera to the tracked head pose while immersive.
    pub fn set_viewer_pose(&mut self, pose: &Mat4) {
        if self.gate.mode() == SessionMode::Immersive {
            self.scene.camera.set_pose(pose);
        }
    }

    /// Applies every queued event in arrival order.
    pub fn process_events(&mut self) -> FrameReport {
        let mut report = FrameReport::default();
        let events: Vec<SceneEvent> = self.queue.drain().collect();

        for event in events {
            match event {
                SceneEvent::SessionStarted => {
                    if self.gate.on_session_start() {
                        log::info!("immersive session started");
                        report.session_changed = true;
                    }
                }
                SceneEvent::SessionEnded => {
                    if self.gate.on_session_end() {
                        log::info!("immersive session ended");
                        report.session_changed = true;
                    }
                    self.scene.camera.reset();
                }
                SceneEvent::ControllerConnected(i) => {
                    if self.controllers.connect(i) {
                        log::info!("{i} connected");
                    }
                    if let Some(pose) = self.polled[i.index()] {
                        self.controllers.update_pose(i, pose);
                    }
                    self.gate.on_controller_connected();
                }
                SceneEvent::ControllerDisconnected(i) => {
                    if self.controllers.disconnect(i) {
                        log::info!("{i} disconnected");
                    }
                }
                SceneEvent::SelectStart(i) => {
                    let outcome = self.select(i);
                    report.selects.push((i, outcome));
                }
                SceneEvent::DisplayResized { width, height } => {
                    let size = DisplaySize::new(width, height);
                    self.resize(size);
                    report.resized = Some(size);
                }
            }
        }

        self.polled = [None; 2];
        report
    }

    fn select(&mut self, index: ControllerIndex) -> SelectOutcome {
        let controller = self.controllers.get(index);
        let pose = match controller.pose() {
            Some(pose) if self.gate.is_eligible(controller.is_connected()) => pose,
            _ => {
                log::trace!("select from {index} ignored (not eligible)");
                return SelectOutcome::Ineligible;
            }
        };

        let ray = Ray::from_pose(&pose);
        match self.painter.paint(&ray, &self.scene.panel, &mut self.surface) {
            Some(mark) => {
                log::debug!(
                    "{index} painted at ({:.1}, {:.1}) uv ({:.3}, {:.3})",
                    mark.pixel.x,
                    mark.pixel.y,
                    mark.uv.x,
                    mark.uv.y
                );
                SelectOutcome::Painted(mark)
            }
            None => {
                log::trace!("select from {index} missed the panel");
                SelectOutcome::Missed
            }
        }
    }

    fn resize(&mut self, size: DisplaySize) {
        self.display = size;
        if !size.is_empty() {
            self.scene.camera.set_aspect(size.aspect());
        }
    }

    /// Returns the surface if it changed since the last upload, clearing the flag.
    pub fn take_surface_upload(&mut self) -> Option<&SurfaceBuffer> {
        if self.surface.take_dirty() {
            Some(&self.surface)
        } else {
            None
        }
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn surface(&self) -> &SurfaceBuffer {
        &self.surface
    }

    /// Direct surface access for startup decoration (the label).
    #[inline]
    pub fn surface_mut(&mut self) -> &mut SurfaceBuffer {
        &mut self.surface
    }

    #[inline]
    pub fn controllers(&self) -> &Controllers {
        &self.controllers
    }

    #[inline]
    pub fn session_mode(&self) -> SessionMode {
        self.gate.mode()
    }

    #[inline]
    pub fn policy(&self) -> EligibilityPolicy {
        self.gate.policy()
    }

    #[inline]
    pub fn display(&self) -> DisplaySize {
        self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Rgba8;
    use glam::{Quat, Vec2, Vec3};

    const P: ControllerIndex = ControllerIndex::Primary;
    const S: ControllerIndex = ControllerIndex::Secondary;

    fn ctx(policy: EligibilityPolicy) -> FrameContext {
        let config = SceneConfig {
            label: None,
            ..SceneConfig::default()
        };
        let mut ctx = FrameContext::new(&config, policy, DisplaySize::new(800, 600));
        ctx.take_surface_upload();
        ctx
    }

    /// Pose at `origin` whose -Z axis points at `target`.
    fn aim(origin: Vec3, target: Vec3) -> Mat4 {
        let dir = (target - origin).normalize();
        Mat4::from_rotation_translation(Quat::from_rotation_arc(Vec3::NEG_Z, dir), origin)
    }

    fn ready(policy: EligibilityPolicy) -> FrameContext {
        let mut c = ctx(policy);
        c.push(SceneEvent::SessionStarted);
        c.push(SceneEvent::ControllerConnected(P));
        c.process_events();
        c
    }

    fn painted_mark(outcome: &SelectOutcome) -> Mark {
        match outcome {
            SelectOutcome::Painted(mark) => *mark,
            other => panic!("expected a paint, got {other:?}"),
        }
    }

    // ── eligibility ───────────────────────────────────────────────────────

    #[test]
    fn select_without_controller_or_session_is_ignored() {
        let mut c = ctx(EligibilityPolicy::SessionDriven);
        let before = c.surface().clone();

        c.push(SceneEvent::SelectStart(P));
        let report = c.process_events();

        assert_eq!(report.selects, vec![(P, SelectOutcome::Ineligible)]);
        assert_eq!(c.surface(), &before);
        assert!(c.take_surface_upload().is_none());
    }

    #[test]
    fn session_driven_requires_session() {
        let mut c = ctx(EligibilityPolicy::SessionDriven);
        c.push(SceneEvent::ControllerConnected(P));
        c.push(SceneEvent::SelectStart(P));
        let report = c.process_events();
        assert_eq!(report.selects[0].1, SelectOutcome::Ineligible);
    }

    #[test]
    fn heuristic_accepts_connection_alone() {
        let mut c = ctx(EligibilityPolicy::ControllerHeuristic);
        c.push(SceneEvent::ControllerConnected(P));
        c.process_events();
        c.update_pose(P, aim(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 1.6, -2.0)));

        c.push(SceneEvent::SelectStart(P));
        assert_eq!(c.process_events().painted(), 1);
    }

    #[test]
    fn disconnected_controller_cannot_paint() {
        let mut c = ready(EligibilityPolicy::ControllerHeuristic);
        c.update_pose(P, aim(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 1.6, -2.0)));
        let before = c.surface().clone();

        c.push(SceneEvent::ControllerDisconnected(P));
        c.push(SceneEvent::SelectStart(P));
        let report = c.process_events();

        assert_eq!(report.selects[0].1, SelectOutcome::Ineligible);
        assert_eq!(c.surface(), &before);
    }

    #[test]
    fn pose_polled_with_queued_connection_is_used() {
        let mut c = ctx(EligibilityPolicy::SessionDriven);
        c.push(SceneEvent::SessionStarted);
        c.process_events();

        c.push(SceneEvent::ControllerConnected(P));
        c.push(SceneEvent::SelectStart(P));
        c.update_pose(P, aim(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 1.6, -2.0)));
        let report = c.process_events();

        let mark = painted_mark(&report.selects[0].1);
        assert!((mark.pixel - Vec2::new(160.0, 90.0)).length() < 0.01, "{:?}", mark.pixel);
    }

    #[test]
    fn reconnect_does_not_reuse_pose_from_before_disconnect() {
        let mut c = ready(EligibilityPolicy::SessionDriven);
        c.update_pose(P, aim(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 1.6, -2.0)));
        c.push(SceneEvent::ControllerDisconnected(P));
        c.process_events();

        c.push(SceneEvent::ControllerConnected(P));
        c.push(SceneEvent::SelectStart(P));
        assert_eq!(c.process_events().selects[0].1, SelectOutcome::Missed);
    }

    #[test]
    fn other_controller_still_needs_its_own_connection() {
        let mut c = ready(EligibilityPolicy::SessionDriven);
        c.push(SceneEvent::SelectStart(S));
        assert_eq!(c.process_events().selects[0].1, SelectOutcome::Ineligible);
    }

    // ── painting ──────────────────────────────────────────────────────────

    #[test]
    fn centre_hit_marks_centre() {
        let mut c = ready(EligibilityPolicy::SessionDriven);
        c.update_pose(P, aim(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 1.6, -2.0)));

        c.push(SceneEvent::SelectStart(P));
        let report = c.process_events();
        let mark = painted_mark(&report.selects[0].1);

        assert!((mark.pixel - Vec2::new(160.0, 90.0)).length() < 0.01, "{:?}", mark.pixel);
        assert_eq!(c.surface().pixel(160, 90), Some(Rgba8::RED));
        assert!(c.take_surface_upload().is_some());
        assert!(c.take_surface_upload().is_none());
    }

    #[test]
    fn bottom_left_hit_is_clamped_into_buffer() {
        let mut c = ready(EligibilityPolicy::SessionDriven);
        c.update_pose(P, aim(Vec3::new(0.0, 1.6, 0.0), Vec3::new(-1.6, 0.7, -2.0)));

        c.push(SceneEvent::SelectStart(P));
        let mark = painted_mark(&c.process_events().selects[0].1);

        assert!(mark.pixel.x.abs() < 0.01, "{:?}", mark.pixel);
        assert!((mark.pixel.y - 179.0).abs() < 0.01, "{:?}", mark.pixel);
        assert_eq!(c.surface().pixel(0, 179), Some(Rgba8::RED));
    }

    #[test]
    fn miss_is_a_noop() {
        let mut c = ready(EligibilityPolicy::SessionDriven);
        c.update_pose(P, aim(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 5.0, -2.0)));
        let before = c.surface().clone();

        c.push(SceneEvent::SelectStart(P));
        let report = c.process_events();

        assert_eq!(report.selects[0].1, SelectOutcome::Missed);
        assert_eq!(c.surface(), &before);
        assert!(c.take_surface_upload().is_none());
    }

    #[test]
    fn repeated_select_accumulates() {
        let mut c = ready(EligibilityPolicy::SessionDriven);
        c.update_pose(P, aim(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 1.6, -2.0)));

        c.push(SceneEvent::SelectStart(P));
        c.push(SceneEvent::SelectStart(P));
        assert_eq!(c.process_events().painted(), 2);
    }

    #[test]
    fn session_end_stops_painting() {
        let mut c = ready(EligibilityPolicy::SessionDriven);
        c.update_pose(P, aim(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 1.6, -2.0)));

        c.push(SceneEvent::SessionEnded);
        c.push(SceneEvent::SelectStart(P));
        let report = c.process_events();
        assert!(report.session_changed);
        assert_eq!(report.painted(), 0);
        assert_eq!(c.session_mode(), SessionMode::Flat);
    }

    // ── display / camera ──────────────────────────────────────────────────

    #[test]
    fn resize_updates_aspect_only() {
        let mut c = ctx(EligibilityPolicy::SessionDriven);
        let panel = c.scene().panel;
        let surface = c.surface().clone();

        c.push(SceneEvent::DisplayResized {
            width: 1920,
            height: 1080,
        });
        let report = c.process_events();

        assert_eq!(report.resized, Some(DisplaySize::new(1920, 1080)));
        assert_eq!(c.display(), DisplaySize::new(1920, 1080));
        assert!((c.scene().camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(c.scene().panel, panel);
        assert_eq!(c.surface(), &surface);
        assert_eq!((c.surface().width(), c.surface().height()), (320, 180));
    }

    #[test]
    fn viewer_pose_applies_only_while_immersive() {
        let mut c = ctx(EligibilityPolicy::SessionDriven);
        let head = Mat4::from_translation(Vec3::new(0.0, 1.7, 0.5));

        c.set_viewer_pose(&head);
        assert_eq!(c.scene().camera.position(), Vec3::new(0.0, 1.6, 3.0));

        c.push(SceneEvent::SessionStarted);
        c.process_events();
        c.set_viewer_pose(&head);
        assert!((c.scene().camera.position() - Vec3::new(0.0, 1.7, 0.5)).length() < 1e-6);

        c.push(SceneEvent::SessionEnded);
        c.process_events();
        assert_eq!(c.scene().camera.position(), Vec3::new(0.0, 1.6, 3.0));
    }
}
