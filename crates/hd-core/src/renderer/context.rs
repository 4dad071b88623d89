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

//! The [`RenderContext`] facade.

use super::api::*;
use super::cache::{BindingCache, RenderStats};
use super::error::{ContractViolation, NativeError, RenderResult};
use super::registry::*;
use super::traits::RenderBackend;
use crate::config::ContextSettings;
use crate::handle::{Handle, HandleTag};
use crate::math::LinearRgba;
use crate::platform::RenderWindow;

/// Logs a failed operation once, at the boundary, and passes the result on.
pub(crate) fn logged<T>(operation: &str, result: RenderResult<T>) -> RenderResult<T> {
    if let Err(err) = &result {
        log::error!("{operation} failed: {err}");
    }
    result
}

/// The render context: owns the native backend, every resource created
/// through it and the mirror of the native binding state.
///
/// A context starts uninitialized. [`create`](Self::create) attaches it to a
/// window; [`destroy`](Self::destroy) releases every resource and returns it
/// to the uninitialized state. Resources are referenced through typed
/// [`Handle`]s only.
///
/// Every operation returns a [`RenderResult`]. Broken preconditions come back
/// as [`RenderError::Contract`](crate::RenderError::Contract), native failures as
/// [`RenderError::Native`](crate::RenderError::Native);
/// both are logged at `error` level before being returned.
///
/// The context is single-threaded: it must be used on the thread that owns the
/// native graphics context.
pub struct RenderContext<B: RenderBackend> {
    pub(crate) backend: Option<B>,
    pub(crate) settings: ContextSettings,
    pub(crate) registry: ResourceRegistry<B>,
    pub(crate) cache: BindingCache<B>,
}

impl<B: RenderBackend> Default for RenderContext<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: RenderBackend> Drop for RenderContext<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<B: RenderBackend> RenderContext<B> {
    /// An uninitialized context.
    pub fn new() -> Self {
        Self {
            backend: None,
            settings: ContextSettings::default(),
            registry: ResourceRegistry::default(),
            cache: BindingCache::default(),
        }
    }

    /// Returns `true` between [`create`](Self::create) and [`destroy`](Self::destroy).
    pub fn is_created(&self) -> bool {
        self.backend.is_some()
    }

    /// Settings of the graphics context the context was created on.
    pub fn settings(&self) -> &ContextSettings {
        &self.settings
    }

    /// The backend, when created.
    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// The backend, mutably. Native calls made through it bypass the cache.
    pub fn backend_mut(&mut self) -> Option<&mut B> {
        self.backend.as_mut()
    }

    /// The resource registry.
    pub fn registry(&self) -> &ResourceRegistry<B> {
        &self.registry
    }

    /// Counters of native state calls, suppressed calls and draws.
    pub fn stats(&self) -> RenderStats {
        self.cache.stats()
    }

    /// Zeroes the counters.
    pub fn reset_stats(&mut self) {
        self.cache.reset_stats();
    }

    /// Attaches the context to a window, loading the backend through the
    /// window's graphics context.
    ///
    /// A created context is destroyed first, even if loading then fails.
    pub fn create(&mut self, window: &dyn RenderWindow) -> RenderResult<()> {
        self.destroy();
        let result = Self::load_backend(window);
        match logged("create", result) {
            Ok(backend) => self.create_with_backend(window, backend),
            Err(err) => Err(err),
        }
    }

    fn load_backend(window: &dyn RenderWindow) -> RenderResult<B> {
        if !window.has_graphics_context() {
            return Err(NativeError::ContextUnavailable(window.title().to_owned()).into());
        }
        Ok(B::load(window)?)
    }

    /// Attaches the context to a window using an already loaded backend.
    pub fn create_with_backend(&mut self, window: &dyn RenderWindow, mut backend: B) -> RenderResult<()> {
        self.destroy();

        let Some(settings) = window.context_settings() else {
            return logged(
                "create",
                Err(NativeError::ContextUnavailable(window.title().to_owned()).into()),
            );
        };
        self.settings = settings.clone();

        if self.settings.debug && !backend.enable_debug_output() {
            log::warn!("Debug output requested but not supported by the {} backend", backend.name());
        }

        let (width, height) = window.inner_size();
        log::info!(
            "Render context created for '{}' ({}x{}, {} backend, version {}.{}{})",
            window.title(),
            width,
            height,
            backend.name(),
            self.settings.major_version,
            self.settings.minor_version,
            if self.settings.core_profile { " core" } else { "" },
        );

        self.backend = Some(backend);
        self.set_viewport(Viewport::new(0, 0, width as i32, height as i32))
    }

    /// Releases every resource and returns to the uninitialized state.
    ///
    /// Safe to call at any time, any number of times.
    pub fn destroy(&mut self) {
        let Some(mut backend) = self.backend.take() else {
            return;
        };
        let counts = self.registry.counts();
        let registry = &mut self.registry;

        for record in registry.vertex_formats.drain() {
            backend.destroy_vertex_format(record.native);
        }
        let buffers = registry
            .vertex_buffers
            .drain()
            .into_iter()
            .map(|r| (BufferKind::Vertex, r.native))
            .chain(registry.index_buffers.drain().into_iter().map(|r| (BufferKind::Index, r.native)))
            .chain(registry.constant_buffers.drain().into_iter().map(|r| (BufferKind::Constant, r.native)));
        for (kind, native) in buffers {
            backend.destroy_buffer(kind, native);
        }
        let textures = registry
            .textures_2d
            .drain()
            .into_iter()
            .chain(registry.texture_2d_arrays.drain())
            .map(|r| r.native);
        for native in textures {
            backend.destroy_texture(native);
        }
        for record in registry.sampler_states.drain() {
            backend.destroy_sampler(record.native);
        }
        for record in registry.programs.drain() {
            backend.destroy_program(record.native);
        }

        self.cache.reset();
        log::info!("Render context destroyed ({} resources released)", counts.total());
    }

    pub(crate) fn parts(&mut self) -> Result<(&mut B, &mut ResourceRegistry<B>, &mut BindingCache<B>), ContractViolation> {
        match self.backend.as_mut() {
            Some(backend) => Ok((backend, &mut self.registry, &mut self.cache)),
            None => Err(ContractViolation::NotCreated),
        }
    }
}

// --- Clears, draws and fixed-function state ---
impl<B: RenderBackend> RenderContext<B> {
    /// Clears the color target.
    pub fn clear_render_target(&mut self, color: LinearRgba) -> RenderResult<()> {
        let result = self.parts().map(|(backend, _, _)| backend.clear_color(color));
        logged("clear_render_target", result.map_err(Into::into))
    }

    /// Clears the depth buffer.
    pub fn clear_depth(&mut self, depth: f32) -> RenderResult<()> {
        let result = self.parts().map(|(backend, _, _)| backend.clear_depth(depth));
        logged("clear_depth", result.map_err(Into::into))
    }

    /// Clears the stencil buffer.
    pub fn clear_stencil(&mut self, value: i32) -> RenderResult<()> {
        let result = self.parts().map(|(backend, _, _)| backend.clear_stencil(value));
        logged("clear_stencil", result.map_err(Into::into))
    }

    /// Clears depth and stencil together.
    pub fn clear_depth_stencil(&mut self, depth: f32, stencil: i32) -> RenderResult<()> {
        let result = self
            .parts()
            .map(|(backend, _, _)| backend.clear_depth_stencil(depth, stencil));
        logged("clear_depth_stencil", result.map_err(Into::into))
    }

    fn check_draw(&mut self, indexed: bool) -> Result<&mut B, ContractViolation> {
        let (backend, _, cache) = self.parts()?;
        if cache.program().is_none() {
            return Err(ContractViolation::NoProgramBound);
        }
        if cache.vertex_format().is_none() {
            return Err(ContractViolation::MissingBinding("vertex format"));
        }
        if indexed && cache.index_buffer().is_none() {
            return Err(ContractViolation::MissingBinding("index buffer"));
        }
        cache.count_draw();
        Ok(backend)
    }

    /// Draws `vertex_count` vertices starting at `first_vertex`.
    pub fn draw(&mut self, primitive: PrimitiveType, vertex_count: u32, first_vertex: u32) -> RenderResult<()> {
        let result = self
            .check_draw(false)
            .map(|backend| backend.draw(primitive, first_vertex, vertex_count));
        logged("draw", result.map_err(Into::into))
    }

    /// Draws `instance_count` instances of `vertex_count` vertices.
    pub fn draw_instanced(
        &mut self,
        primitive: PrimitiveType,
        vertex_count: u32,
        first_vertex: u32,
        instance_count: u32,
    ) -> RenderResult<()> {
        let result = self
            .check_draw(false)
            .map(|backend| backend.draw_instanced(primitive, first_vertex, vertex_count, instance_count));
        logged("draw_instanced", result.map_err(Into::into))
    }

    /// Draws `index_count` indices of the bound index buffer starting at `first_index`.
    pub fn draw_indexed(
        &mut self,
        primitive: PrimitiveType,
        index_count: u32,
        first_index: u32,
        index_type: IndexType,
    ) -> RenderResult<()> {
        let result = self
            .check_draw(true)
            .map(|backend| backend.draw_indexed(primitive, index_type, first_index, index_count));
        logged("draw_indexed", result.map_err(Into::into))
    }

    /// Draws `instance_count` instances of indexed geometry.
    pub fn draw_indexed_instanced(
        &mut self,
        primitive: PrimitiveType,
        index_count: u32,
        first_index: u32,
        index_type: IndexType,
        instance_count: u32,
    ) -> RenderResult<()> {
        let result = self.check_draw(true).map(|backend| {
            backend.draw_indexed_instanced(primitive, index_type, first_index, index_count, instance_count)
        });
        logged("draw_indexed_instanced", result.map_err(Into::into))
    }

    /// Sets the depth test, comparison and write mask.
    pub fn set_depth_state(&mut self, test_enabled: bool, func: CompareFunc, write_mask: bool) -> RenderResult<()> {
        let state = DepthState {
            test_enabled,
            func,
            write_mask,
        };
        let result = self
            .parts()
            .map(|(backend, _, cache)| cache.set_depth_state(backend, state));
        logged("set_depth_state", result.map_err(Into::into))
    }

    /// Sets the stencil test.
    pub fn set_stencil_state(&mut self, enabled: bool, desc: StencilTestDesc, reference: i32) -> RenderResult<()> {
        let state = StencilState {
            enabled,
            desc,
            reference,
        };
        let result = self
            .parts()
            .map(|(backend, _, cache)| cache.set_stencil_state(backend, state));
        logged("set_stencil_state", result.map_err(Into::into))
    }

    /// Sets the blend equation, from a preset or a full description, and the color write mask.
    pub fn set_blend_state(&mut self, desc: impl Into<BlendModeDesc>, mask: ColorMask) -> RenderResult<()> {
        let desc = desc.into();
        let result = self
            .parts()
            .map(|(backend, _, cache)| cache.set_blend_state(backend, desc, mask));
        logged("set_blend_state", result.map_err(Into::into))
    }

    /// Sets the constant color read by `ConstantColor` blend factors.
    pub fn set_blend_constant(&mut self, color: LinearRgba) -> RenderResult<()> {
        let result = self
            .parts()
            .map(|(backend, _, cache)| cache.set_blend_constant(backend, color));
        logged("set_blend_constant", result.map_err(Into::into))
    }

    /// Sets culling, fill mode, winding and depth offset.
    pub fn set_rasterizer_state(
        &mut self,
        cull_face: CullFace,
        fill_mode: FillMode,
        front_face: FrontFace,
        polygon_offset: PolygonOffset,
    ) -> RenderResult<()> {
        let state = RasterizerState {
            cull_face,
            fill_mode,
            front_face,
            polygon_offset,
        };
        let result = self
            .parts()
            .map(|(backend, _, cache)| cache.set_rasterizer_state(backend, state));
        logged("set_rasterizer_state", result.map_err(Into::into))
    }

    /// Sets the viewport.
    pub fn set_viewport(&mut self, viewport: Viewport) -> RenderResult<()> {
        let result = self
            .parts()
            .map(|(backend, _, cache)| cache.set_viewport(backend, viewport));
        logged("set_viewport", result.map_err(Into::into))
    }
}

/// Removes a record from an arena on behalf of a `destroy_*` call.
///
/// Invalid handles are a no-op. On an uninitialized context every resource was
/// already released, so the handle is only invalidated.
pub(crate) fn take_record<T: HandleTag, R>(
    created: bool,
    arena: &mut Arena<T, R>,
    handle: &mut Handle<T>,
) -> Result<Option<R>, ContractViolation> {
    if !handle.is_valid() {
        return Ok(None);
    }
    if !created {
        handle.invalidate();
        return Ok(None);
    }
    let record = arena.remove(*handle)?;
    handle.invalidate();
    Ok(Some(record))
}
