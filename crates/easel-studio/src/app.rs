use glam::{Mat4, Vec3};
use winit::event::WindowEvent;

use easel_engine::color::Color;
use easel_engine::core::{App, AppControl, FrameCtx};
use easel_engine::input::{Key, MouseButton};
use easel_engine::render::{
    overlay_transform, LightRig, LitMeshRenderer, MeshInstance, QuadMode, RenderCtx,
    RenderTarget, TexturedQuad, TexturedQuadRenderer,
};
use easel_engine::text::{FontId, FontSystem};
use easel_engine::xr::{self, XrConfig, XrEvent, XrRuntime, XrSupport};
use easel_paint::{
    ControllerIndex, DisplaySize, FrameContext, LabelConfig, Rgba8, SceneEvent, SessionMode,
    SurfaceBuffer,
};

use crate::button::{EntryButton, EntryState, BUTTON_HEIGHT, BUTTON_WIDTH};
use crate::config::StudioConfig;

const GRIP_SIZE: Vec3 = Vec3::new(0.04, 0.04, 0.12);
const GRIP_COLOR: u32 = 0x8a8a8a;
const RAY_LENGTH: f32 = 5.0;
const RAY_WIDTH: f32 = 0.004;

/// GPU objects, created on the first frame.
struct GpuScene {
    quads: TexturedQuadRenderer,
    meshes: LitMeshRenderer,
    panel: TexturedQuad,
    button: TexturedQuad,
}

pub struct EaselApp {
    frame: FrameContext,
    fonts: FontSystem,
    font: Option<FontId>,

    xr_config: XrConfig,
    xr: Option<XrRuntime>,
    xr_events: Vec<XrEvent>,
    entry_failed: bool,
    support: XrSupport,

    button: EntryButton,
    gpu: Option<GpuScene>,
}

impl EaselApp {
    pub fn new(config: &StudioConfig, support: XrSupport, xr: Option<XrRuntime>) -> Self {
        let size = config.runtime.initial_size;
        let display = DisplaySize::new(size.width as u32, size.height as u32);
        let mut frame = FrameContext::new(&config.scene, config.eligibility, display);

        let mut fonts = FontSystem::new();
        let font = match config.read_font().map(|bytes| fonts.load_font(&bytes)) {
            Some(Ok(id)) => Some(id),
            Some(Err(e)) => {
                log::warn!("{e}; panel label and button text disabled");
                None
            }
            None => {
                log::warn!("no font found; set EASEL_FONT to draw the panel label");
                None
            }
        };

        if let (Some(label), Some(id)) = (config.scene.label.as_ref(), font) {
            draw_label(frame.surface_mut(), &fonts, id, label);
        }

        let button = EntryButton::new(EntryState::from_support(support), &fonts, font);

        Self {
            frame,
            fonts,
            font,
            xr_config: config.xr.clone(),
            xr,
            xr_events: Vec::new(),
            entry_failed: false,
            support,
            button,
            gpu: None,
        }
    }

    // ── session entry ──────────────────────────────────────────────────────

    fn toggle_session(&mut self) {
        if let Some(rt) = self.xr.as_mut().filter(|rt| rt.has_session()) {
            log::info!("ending immersive session");
            rt.request_end();
            return;
        }

        if self.xr.is_none() {
            let (support, runtime) = xr::probe(&self.xr_config);
            self.support = support;
            self.xr = runtime;
        }

        let result = match self.xr.as_mut() {
            Some(rt) => rt.start_session(),
            None => Err(anyhow::anyhow!("immersive VR is {}", self.support)),
        };

        match result {
            Ok(()) => {
                log::info!("immersive session requested");
                self.entry_failed = false;
            }
            Err(e) => {
                log::error!("failed to enter immersive session: {e:#}");
                self.entry_failed = true;
            }
        }
    }

    fn entry_state(&self) -> EntryState {
        if self.frame.session_mode() == SessionMode::Immersive {
            EntryState::Active
        } else if self.entry_failed {
            EntryState::Unavailable
        } else {
            EntryState::from_support(self.support)
        }
    }

    // ── per-frame input ────────────────────────────────────────────────────

    fn poll_xr(&mut self) {
        let Some(rt) = self.xr.as_mut() else { return };

        self.xr_events.clear();
        if let Err(e) = rt.poll_frame(&mut self.xr_events) {
            log::error!("XR frame failed: {e:#}");
            rt.request_end();
        }

        for ev in self.xr_events.drain(..) {
            if let Some(scene_event) = scene_event(ev) {
                self.frame.push(scene_event);
            }
        }

        for index in ControllerIndex::ALL {
            if let Some(pose) = rt.controller_pose(index.index()) {
                self.frame.update_pose(index, pose);
            }
        }
        if let Some(head) = rt.head_pose() {
            self.frame.set_viewer_pose(&head);
        }
    }

    // ── drawing ────────────────────────────────────────────────────────────

    fn draw(&mut self, rctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if self.gpu.is_none() {
            self.gpu = create_gpu_scene(rctx, self.frame.surface());
        }
        let Some(gpu) = self.gpu.as_mut() else { return };

        if let Some(surface) = self.frame.take_surface_upload() {
            gpu.panel.upload(rctx.queue, surface.as_bytes());
        }
        if let Some(face) = self.button.take_face_upload() {
            gpu.button.upload(rctx.queue, face.as_bytes());
        }

        let scene = self.frame.scene();
        let view_proj = scene.camera.view_proj();

        gpu.quads.draw(
            rctx,
            target,
            &gpu.panel,
            view_proj * scene.panel.model_matrix(),
            QuadMode::World,
        );

        let instances: Vec<MeshInstance> = self
            .frame
            .controllers()
            .iter()
            .filter(|c| c.is_connected())
            .filter_map(|c| c.pose())
            .flat_map(controller_meshes)
            .collect();

        let rig = LightRig {
            view_proj,
            ambient: linear(scene.ambient.color).scaled(scene.ambient.intensity),
            light_direction: scene.directional.direction(),
            light: linear(scene.directional.color).scaled(scene.directional.intensity),
        };
        gpu.meshes.draw(rctx, target, &rig, &instances);

        let rect = EntryButton::rect(rctx.viewport);
        gpu.quads.draw(
            rctx,
            target,
            &gpu.button,
            overlay_transform(rect, rctx.viewport),
            QuadMode::Overlay,
        );
    }
}

impl App for EaselApp {
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        if let WindowEvent::Resized(size) = event {
            self.frame.push(SceneEvent::DisplayResized {
                width: size.width,
                height: size.height,
            });
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.poll_xr();

        let (w, h) = ctx.window.logical_size();
        let viewport = easel_engine::coords::Viewport::new(w, h);

        let clicked = ctx
            .input_frame
            .click(MouseButton::Left)
            .is_some_and(|(x, y)| EntryButton::hit(viewport, x, y));
        if clicked || ctx.input_frame.key_pressed(Key::Enter) {
            self.toggle_session();
        }

        if ctx.input_frame.key_pressed(Key::Escape) {
            match self.xr.as_mut().filter(|rt| rt.has_session()) {
                Some(rt) => rt.request_end(),
                None => return AppControl::Exit,
            }
        }

        let report = self.frame.process_events();
        if report.session_changed {
            ctx.runtime.set_title(match self.frame.session_mode() {
                SessionMode::Immersive => "Easel (immersive)",
                SessionMode::Flat => "Easel",
            });
        }

        let state = self.entry_state();
        self.button.set_state(state, &self.fonts, self.font);

        let clear = linear(self.frame.scene().background);
        ctx.render(clear, |rctx, target| self.draw(rctx, target))
    }
}

fn scene_event(ev: XrEvent) -> Option<SceneEvent> {
    Some(match ev {
        XrEvent::SessionStarted => SceneEvent::SessionStarted,
        XrEvent::SessionEnded => SceneEvent::SessionEnded,
        XrEvent::Connected(i) => SceneEvent::ControllerConnected(ControllerIndex::from_index(i)?),
        XrEvent::Disconnected(i) => {
            SceneEvent::ControllerDisconnected(ControllerIndex::from_index(i)?)
        }
        XrEvent::SelectStart(i) => SceneEvent::SelectStart(ControllerIndex::from_index(i)?),
    })
}

/// Grip box and pointer ray for one controller pose.
fn controller_meshes(pose: Mat4) -> [MeshInstance; 2] {
    let grip = MeshInstance {
        model: pose * Mat4::from_scale(GRIP_SIZE),
        color: Color::from_hex(GRIP_COLOR),
        unlit: false,
    };
    let ray = MeshInstance {
        model: pose
            * Mat4::from_translation(Vec3::new(0.0, 0.0, -RAY_LENGTH * 0.5))
            * Mat4::from_scale(Vec3::new(RAY_WIDTH, RAY_WIDTH, RAY_LENGTH)),
        color: Color::WHITE,
        unlit: true,
    };
    [grip, ray]
}

fn create_gpu_scene(rctx: &RenderCtx<'_>, surface: &SurfaceBuffer) -> Option<GpuScene> {
    let mut quads = TexturedQuadRenderer::new();
    let panel = quads.create_quad(rctx, surface.width(), surface.height(), "easel panel")?;
    let button = quads.create_quad(rctx, BUTTON_WIDTH, BUTTON_HEIGHT, "easel entry button")?;

    Some(GpuScene {
        quads,
        meshes: LitMeshRenderer::new(),
        panel,
        button,
    })
}

fn draw_label(surface: &mut SurfaceBuffer, fonts: &FontSystem, font: FontId, label: &LabelConfig) {
    let Some(mask) = fonts.rasterize_line(&label.text, font, label.px) else {
        log::warn!("label {:?} rasterized to nothing", label.text);
        return;
    };

    let (x, baseline_y) = label.origin;
    surface.blit_mask(
        x.round() as i32,
        (baseline_y - mask.baseline).round() as i32,
        mask.width,
        mask.height,
        &mask.coverage,
        label.color,
    );
}

fn linear(c: Rgba8) -> Color {
    Color::from_srgb_u8(c.r, c.g, c.b, c.a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xr_events_map_to_scene_events() {
        assert_eq!(
            scene_event(XrEvent::SelectStart(1)),
            Some(SceneEvent::SelectStart(ControllerIndex::Secondary))
        );
        assert_eq!(
            scene_event(XrEvent::Connected(0)),
            Some(SceneEvent::ControllerConnected(ControllerIndex::Primary))
        );
        assert_eq!(scene_event(XrEvent::SessionEnded), Some(SceneEvent::SessionEnded));
        assert_eq!(scene_event(XrEvent::SelectStart(7)), None);
    }

    #[test]
    fn ray_extends_forward_from_controller() {
        let pose = Mat4::from_translation(Vec3::new(0.0, 1.2, -0.5));
        let [_, ray] = controller_meshes(pose);

        let near = ray.model.transform_point3(Vec3::new(0.0, 0.0, 0.5));
        let far = ray.model.transform_point3(Vec3::new(0.0, 0.0, -0.5));
        assert!(near.abs_diff_eq(Vec3::new(0.0, 1.2, -0.5), 1e-5));
        assert!(far.abs_diff_eq(Vec3::new(0.0, 1.2, -5.5), 1e-5));
        assert!(ray.unlit);
    }

    #[test]
    fn background_is_linearized() {
        let c = linear(Rgba8::from_hex(0x505050));
        assert!(c.r > 0.07 && c.r < 0.09);
        assert_eq!(c.a, 1.0);
    }
}
