use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputFrame, InputState};

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "Easel".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Requests an app makes of the window during a frame.
///
/// Applied once the frame callback has returned.
#[derive(Default)]
pub struct RuntimeCtx {
    requests: Vec<Request>,
}

impl RuntimeCtx {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.requests.push(Request::Title(title.into()));
    }

    pub fn exit(&mut self) {
        self.requests.push(Request::Exit);
    }
}

enum Request {
    Title(String),
    Exit,
}

pub struct Runtime;

impl Runtime {
    /// Opens the window, brings up the GPU and drives `app` until it exits.
    ///
    /// A window or GPU failure at startup ends the loop and is returned here.
    pub fn run<A: App + 'static>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let mut host = Host {
            config,
            gpu_init,
            app,
            live: None,
            failure: None,
            closing: false,
        };

        event_loop
            .run_app(&mut host)
            .context("event loop terminated with error")?;

        host.failure.map_or(Ok(()), Err)
    }
}

/// The window plus everything whose lifetime is tied to it.
#[self_referencing]
struct LiveWindow {
    input: InputState,
    input_frame: InputFrame,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl LiveWindow {
    fn open(event_loop: &ActiveEventLoop, config: &RuntimeConfig, gpu_init: GpuInit) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        LiveWindowTryBuilder {
            input: InputState::default(),
            input_frame: InputFrame::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")
    }

    fn redraw_later(&self) {
        self.with_window(|w| w.request_redraw());
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.with_gpu_mut(|gpu| gpu.resize(size));
        self.redraw_later();
    }
}

struct Host<A: App + 'static> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    live: Option<LiveWindow>,
    failure: Option<anyhow::Error>,
    closing: bool,
}

impl<A: App + 'static> Host<A> {
    fn close(&mut self, event_loop: &ActiveEventLoop) {
        self.closing = true;
        event_loop.exit();
    }

    /// Feeds `event` to input tracking and the app; returns the app's verdict.
    fn dispatch(&mut self, event: &WindowEvent) -> AppControl {
        let (app, Some(live)) = (&mut self.app, self.live.as_mut()) else {
            return AppControl::Continue;
        };

        live.with_mut(|f| {
            if let Some(ev) = translate_window_event(f.window, event) {
                f.input.apply_event(f.input_frame, ev);
            }
        });
        app.on_window_event(event)
    }

    fn frame(&mut self) -> RuntimeCtx {
        let mut runtime = RuntimeCtx::default();
        let (app, Some(live)) = (&mut self.app, self.live.as_mut()) else {
            return runtime;
        };

        live.with_mut(|f| {
            let control = app.on_frame(&mut FrameCtx {
                window: WindowCtx { window: f.window },
                gpu: f.gpu,
                input: f.input,
                input_frame: f.input_frame,
                runtime: &mut runtime,
            });
            if control == AppControl::Exit {
                runtime.exit();
            }
            f.input_frame.clear();
        });
        runtime
    }

    fn apply(&mut self, event_loop: &ActiveEventLoop, runtime: RuntimeCtx) {
        for request in runtime.requests {
            match request {
                Request::Title(title) => {
                    if let Some(live) = self.live.as_ref() {
                        live.with_window(|w| w.set_title(&title));
                    }
                }
                Request::Exit => self.close(event_loop),
            }
        }
    }
}

impl<A: App + 'static> ApplicationHandler for Host<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.live.is_some() {
            return;
        }

        match LiveWindow::open(event_loop, &self.config, self.gpu_init.clone()) {
            Ok(live) => {
                live.redraw_later();
                self.live = Some(live);
            }
            Err(e) => {
                log::error!("startup failed: {e:#}");
                self.failure = Some(e);
                self.close(event_loop);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.closing {
            event_loop.exit();
            return;
        }

        // Redraw every iteration; pacing comes from present or the XR runtime.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(live) = self.live.as_ref() {
            live.redraw_later();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.closing {
            event_loop.exit();
            return;
        }

        if self.dispatch(&event) == AppControl::Exit {
            self.close(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.live = None;
                self.close(event_loop);
            }
            WindowEvent::Resized(size) => {
                if let Some(live) = self.live.as_mut() {
                    live.resize(size);
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(live) = self.live.as_mut() {
                    let size = live.with_window(|w| w.inner_size());
                    live.resize(size);
                }
            }
            WindowEvent::RedrawRequested => {
                let runtime = self.frame();
                self.apply(event_loop, runtime);
            }
            _ => {}
        }
    }
}
