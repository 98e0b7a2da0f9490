use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Vec2;
use crate::core::{App, AppControl, Host};
use crate::input::{Environment, InputState};

use super::translate::translate_window_event;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Capabilities reported to the app through [`Host::environment`].
    pub environment: Environment,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "halo".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            environment: Environment::desktop(),
        }
    }
}

/// Entry point for the runtime.
///
/// Drives one window: pointer events are translated and dispatched on the
/// host's event target as they arrive; the host's frame scheduler runs once
/// per redraw.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: App + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState::new(config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct RuntimeState<A: App> {
    config: RuntimeConfig,
    app: A,
    host: Host,

    window: Option<Window>,
    input: InputState,

    started: bool,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<A: App> RuntimeState<A> {
    fn new(config: RuntimeConfig, app: A) -> Self {
        let host = Host::new(config.environment);
        Self {
            config,
            app,
            host,
            window: None,
            input: InputState::default(),
            started: false,
            exit_requested: false,
            failure: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        if !self.exit_requested {
            self.exit_requested = true;
            if self.started {
                self.app.on_exit();
            }
        }
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.request_exit(event_loop);
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        self.host.set_viewport(logical_size(&window));
        self.window = Some(window);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let time = self.host.scheduler().run_frame();

        if self.app.on_frame(&self.host, time) == AppControl::Exit {
            self.request_exit(event_loop);
        }
    }
}

impl<A: App> ApplicationHandler for RuntimeState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            self.host.scheduler().reset_clock();
            return;
        }

        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        match self.app.on_start(&self.host) {
            Ok(()) => self.started = true,
            Err(e) => {
                self.fail(event_loop, e.context("application failed to start"));
                return;
            }
        }

        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: consumers animate toward the pointer even
        // while no new input arrives.
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(window) = self.window.as_ref().filter(|w| w.id() == window_id) else {
            return;
        };
        let scale_factor = window.scale_factor();

        if let Some(ev) = translate_window_event(scale_factor, &self.input, &event) {
            self.input.apply_event(&ev);
            self.host.event_target().dispatch(&ev);
        }

        match &event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(w) = &self.window {
                    let size = logical_size(w);
                    self.host.set_viewport(size);
                    self.app.on_resize(&self.host, size);
                    w.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

fn logical_size(window: &Window) -> Vec2 {
    let logical: LogicalSize<f64> = window.inner_size().to_logical(window.scale_factor());
    Vec2::new(logical.width as f32, logical.height as f32)
}
