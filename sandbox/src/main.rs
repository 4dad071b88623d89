// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// hd Sandbox
// Spins a vertex-colored triangle through the render context.

use std::mem;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context as _, Result};
use hd_core::config::RenderConfig;
use hd_core::renderer::*;
use hd_core::math::LinearRgba;
use hd_core::ProgramConstant;
use hd_infra::{GlBackend, GlutinWindow, GlutinWindowBuilder};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::WindowId;

const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/sandbox.ron");
const SHADER_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/triangle.glsl");

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

impl Vertex {
    const STRIDE: u32 = mem::size_of::<Vertex>() as u32;

    fn layout() -> [VertexElement; 2] {
        [
            // location 0: position
            VertexElement::new(VertexElementType::Float3, 0, 0, 0),
            // location 1: color
            VertexElement::new(VertexElementType::Float3, 1, 0, mem::size_of::<[f32; 3]>() as u32),
        ]
    }
}

const VERTICES: &[Vertex] = &[
    Vertex {
        position: [0.0, 0.5, 0.0],
        color: [1.0, 0.0, 0.0],
    },
    Vertex {
        position: [-0.5, -0.5, 0.0],
        color: [0.0, 1.0, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0],
    },
];

const INDICES: &[u16] = &[0, 1, 2];

/// GPU resources of the demo scene.
struct Scene {
    vertex_format: VertexFormatHandle,
    vertex_buffer: VertexBufferHandle,
    index_buffer: IndexBufferHandle,
    program: ProgramHandle,
    time: ProgramConstant,
}

impl Scene {
    fn new(context: &mut RenderContext<GlBackend>) -> Result<Self> {
        log::info!("Sandbox: creating scene resources...");
        let vertices: &[u8] = bytemuck::cast_slice(VERTICES);
        let indices: &[u8] = bytemuck::cast_slice(INDICES);

        let vertex_format = context.create_vertex_format(&Vertex::layout())?;
        let vertex_buffer = context.create_vertex_buffer(Some(vertices), vertices.len(), BufferUsage::Static)?;
        let index_buffer = context.create_index_buffer(Some(indices), indices.len(), BufferUsage::Static)?;
        let program = context
            .create_program_from_file(SHADER_PATH, "PULSE")
            .context("failed to build the triangle program")?;
        let time = context.program_constant(program, "u_time")?;
        if !time.is_valid() {
            log::warn!("Program has no 'u_time' constant, the triangle will not spin");
        }
        log::info!(" -> {:?}", context.registry().counts());

        Ok(Self {
            vertex_format,
            vertex_buffer,
            index_buffer,
            program,
            time,
        })
    }

    fn render(&self, context: &mut RenderContext<GlBackend>, seconds: f32) -> Result<()> {
        context.clear_render_target(LinearRgba::rgb(0.08, 0.08, 0.1))?;
        context.clear_depth_stencil(1.0, 0)?;
        context.set_depth_state(true, CompareFunc::Less, true)?;
        context.set_blend_state(BlendMode::Replace, ColorMask::ALL)?;
        context.set_rasterizer_state(CullFace::None, FillMode::Solid, FrontFace::Ccw, PolygonOffset::default())?;

        context.bind_program(self.program)?;
        if self.time.is_valid() {
            context.set_program_constant(self.time, seconds)?;
        }
        context.bind_vertex_format(self.vertex_format)?;
        context.bind_vertex_buffer(self.vertex_buffer, 0, 0, Vertex::STRIDE)?;
        context.bind_index_buffer(self.index_buffer)?;
        context.draw_indexed(PrimitiveType::Triangles, INDICES.len() as u32, 0, IndexType::Ushort)?;
        Ok(())
    }
}

/// Event loop state. The render context is declared before the window so it
/// releases its resources while the GL context is still alive.
struct SandboxState {
    config: RenderConfig,
    context: RenderContext<GlBackend>,
    scene: Option<Scene>,
    window: Option<GlutinWindow>,
    started: Instant,
    frames: u64,
}

impl SandboxState {
    fn new(config: RenderConfig) -> Self {
        Self {
            config,
            context: RenderContext::new(),
            scene: None,
            window: None,
            started: Instant::now(),
            frames: 0,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = GlutinWindowBuilder::from_config(&self.config).build(event_loop)?;
        self.context.create(&window)?;
        self.scene = Some(Scene::new(&mut self.context)?);
        self.window = Some(window);
        self.started = Instant::now();
        Ok(())
    }

    fn redraw(&mut self) {
        let (Some(window), Some(scene)) = (self.window.as_ref(), self.scene.as_ref()) else {
            return;
        };
        let seconds = self.started.elapsed().as_secs_f32();
        if let Err(e) = scene.render(&mut self.context, seconds) {
            log::error!("Rendering error: {e}");
        }
        if let Err(e) = window.swap_buffers() {
            log::error!("Failed to present: {e}");
        }

        self.frames += 1;
        if self.frames % 600 == 0 {
            let stats = self.context.stats();
            log::info!(
                "Frame {}: {} native state calls, {} skipped, {} draws",
                self.frames,
                stats.native_state_calls,
                stats.skipped_state_calls,
                stats.draw_calls
            );
        }
    }

    fn shutdown(&mut self) {
        self.scene = None;
        self.context.destroy();
        self.window = None;
    }
}

impl ApplicationHandler for SandboxState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        log::info!("Application resumed. Initializing window and render context...");
        if let Err(e) = self.init(event_loop) {
            log::error!("Sandbox initialization failed: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(|window| window.window().id()) != Some(id) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(window) = self.window.as_ref() {
                    log::info!("Window resized to: {}x{}", size.width, size.height);
                    window.resize(size.width, size.height);
                    let viewport = Viewport::new(0, 0, size.width as i32, size.height as i32);
                    if let Err(e) = self.context.set_viewport(viewport) {
                        log::error!("Failed to update the viewport: {e}");
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn load_config(path: &Path) -> RenderConfig {
    let loaded = RenderConfig::load(path).and_then(|config| config.validate().map(|()| config));
    match loaded {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{e}; falling back to the default configuration");
            RenderConfig::default()
        }
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config(Path::new(CONFIG_PATH));
    let event_loop = EventLoop::new()?;
    let mut state = SandboxState::new(config);
    event_loop.run_app(&mut state)?;
    Ok(())
}
