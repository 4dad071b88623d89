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

//! The binding-state cache.
//!
//! The cache mirrors what has been bound or set through one render context and
//! drops requests that would not change anything. Every setter follows the
//! same order: compare, update the mirror, then call the backend. Composite
//! states are compared whole first and, on a miss, per native sub-call so only
//! the parts that changed reach the driver.
//!
//! A slot of `None` means "nothing bound" for bindings and "unknown" for
//! fixed-function state; unknown state is always emitted in full.

use crate::math::{LinearRgba, STATE_EPSILON};
use crate::renderer::api::*;
use crate::renderer::traits::{RenderBackend, StencilFace};
use approx::AbsDiffEq;

/// Counters of the calls the cache let through or suppressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Native state and binding calls issued.
    pub native_state_calls: u64,
    /// Requests dropped because the state already matched.
    pub skipped_state_calls: u64,
    /// Draw calls submitted.
    pub draw_calls: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VertexBufferBinding<N> {
    buffer: N,
    offset: u32,
    stride: u32,
}

const SLOTS: usize = MAX_VERTEX_BUFFERS as usize;
const UNITS: usize = MAX_TEXTURES as usize;

/// Mirror of the native binding state.
pub struct BindingCache<B: RenderBackend> {
    vertex_format: Option<B::VertexFormat>,
    vertex_buffers: [Option<VertexBufferBinding<B::Buffer>>; SLOTS],
    index_buffer: Option<B::Buffer>,
    constant_buffers: [Option<B::Buffer>; MAX_CONSTANT_BUFFERS as usize],
    textures: [Option<(TextureKind, B::Texture)>; UNITS],
    samplers: [Option<B::Sampler>; MAX_SAMPLER_STATES as usize],
    program: Option<B::Program>,
    depth: Option<DepthState>,
    stencil: Option<StencilState>,
    blend: Option<(BlendModeDesc, ColorMask)>,
    blend_constant: Option<LinearRgba>,
    rasterizer: Option<RasterizerState>,
    viewport: Option<Viewport>,
    stats: RenderStats,
}

impl<B: RenderBackend> Default for BindingCache<B> {
    fn default() -> Self {
        Self {
            vertex_format: None,
            vertex_buffers: [None; SLOTS],
            index_buffer: None,
            constant_buffers: [None; MAX_CONSTANT_BUFFERS as usize],
            textures: [None; UNITS],
            samplers: [None; MAX_SAMPLER_STATES as usize],
            program: None,
            depth: None,
            stencil: None,
            blend: None,
            blend_constant: None,
            rasterizer: None,
            viewport: None,
            stats: RenderStats::default(),
        }
    }
}

impl<B: RenderBackend> BindingCache<B> {
    /// Forgets everything, counters included.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Current counters.
    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Zeroes the counters.
    pub fn reset_stats(&mut self) {
        self.stats = RenderStats::default();
    }

    pub(crate) fn count_draw(&mut self) {
        self.stats.draw_calls += 1;
    }

    fn issued(&mut self) {
        self.stats.native_state_calls += 1;
    }

    fn skipped(&mut self) {
        self.stats.skipped_state_calls += 1;
    }

    // --- Queries ---

    /// The vertex format believed bound.
    pub fn vertex_format(&self) -> Option<B::VertexFormat> {
        self.vertex_format
    }

    /// The index buffer believed bound.
    pub fn index_buffer(&self) -> Option<B::Buffer> {
        self.index_buffer
    }

    /// The program believed current.
    pub fn program(&self) -> Option<B::Program> {
        self.program
    }

    /// The texture believed bound to `unit`.
    pub fn texture(&self, unit: u32) -> Option<B::Texture> {
        self.textures.get(unit as usize).copied().flatten().map(|(_, texture)| texture)
    }

    /// The viewport believed set.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    // --- Bindings ---

    /// Binds a vertex format. Switching formats forgets the vertex and index
    /// buffer bindings when the backend stores them inside the format.
    pub fn bind_vertex_format(&mut self, backend: &mut B, format: B::VertexFormat) {
        if self.vertex_format == Some(format) {
            self.skipped();
            return;
        }
        self.vertex_format = Some(format);
        if backend.vertex_input_owned_by_format() {
            self.vertex_buffers = [None; SLOTS];
            self.index_buffer = None;
        }
        self.issued();
        backend.bind_vertex_format(Some(format));
    }

    /// Binds a vertex buffer to a slot below [`MAX_VERTEX_BUFFERS`].
    pub fn bind_vertex_buffer(&mut self, backend: &mut B, slot: u32, buffer: B::Buffer, offset: u32, stride: u32) {
        let binding = Some(VertexBufferBinding { buffer, offset, stride });
        if self.vertex_buffers[slot as usize] == binding {
            self.skipped();
            return;
        }
        self.vertex_buffers[slot as usize] = binding;
        self.issued();
        backend.bind_vertex_buffer(slot, Some(buffer), offset, stride);
    }

    /// Binds the index buffer.
    pub fn bind_index_buffer(&mut self, backend: &mut B, buffer: B::Buffer) {
        if self.index_buffer == Some(buffer) {
            self.skipped();
            return;
        }
        self.index_buffer = Some(buffer);
        self.issued();
        backend.bind_index_buffer(Some(buffer));
    }

    /// Binds a constant buffer to a slot below [`MAX_CONSTANT_BUFFERS`].
    pub fn bind_constant_buffer(&mut self, backend: &mut B, slot: u32, buffer: B::Buffer) {
        if self.constant_buffers[slot as usize] == Some(buffer) {
            self.skipped();
            return;
        }
        self.constant_buffers[slot as usize] = Some(buffer);
        self.issued();
        backend.bind_constant_buffer(slot, Some(buffer));
    }

    /// Binds a texture to a unit below [`MAX_TEXTURES`].
    pub fn bind_texture(&mut self, backend: &mut B, unit: u32, kind: TextureKind, texture: B::Texture) {
        if self.textures[unit as usize] == Some((kind, texture)) {
            self.skipped();
            return;
        }
        self.textures[unit as usize] = Some((kind, texture));
        self.issued();
        backend.bind_texture(unit, kind, Some(texture));
    }

    /// Binds a sampler to a unit below [`MAX_SAMPLER_STATES`].
    pub fn bind_sampler(&mut self, backend: &mut B, unit: u32, sampler: B::Sampler) {
        if self.samplers[unit as usize] == Some(sampler) {
            self.skipped();
            return;
        }
        self.samplers[unit as usize] = Some(sampler);
        self.issued();
        backend.bind_sampler(unit, Some(sampler));
    }

    /// Makes a program current.
    pub fn bind_program(&mut self, backend: &mut B, program: B::Program) {
        if self.program == Some(program) {
            self.skipped();
            return;
        }
        self.program = Some(program);
        self.issued();
        backend.bind_program(Some(program));
    }

    // --- Invalidation on destroy ---

    /// Forgets a destroyed vertex format, along with the vertex input it owned.
    pub fn forget_vertex_format(&mut self, format: B::VertexFormat, owned_vertex_input: bool) {
        if self.vertex_format == Some(format) {
            self.vertex_format = None;
            if owned_vertex_input {
                self.vertex_buffers = [None; SLOTS];
                self.index_buffer = None;
            }
        }
    }

    /// Forgets every slot holding a destroyed buffer.
    pub fn forget_buffer(&mut self, buffer: B::Buffer) {
        for slot in &mut self.vertex_buffers {
            if slot.is_some_and(|binding| binding.buffer == buffer) {
                *slot = None;
            }
        }
        if self.index_buffer == Some(buffer) {
            self.index_buffer = None;
        }
        for slot in &mut self.constant_buffers {
            if *slot == Some(buffer) {
                *slot = None;
            }
        }
    }

    /// Forgets every unit holding a destroyed texture.
    pub fn forget_texture(&mut self, texture: B::Texture) {
        for unit in &mut self.textures {
            if unit.is_some_and(|(_, bound)| bound == texture) {
                *unit = None;
            }
        }
    }

    /// Forgets every unit holding a destroyed sampler.
    pub fn forget_sampler(&mut self, sampler: B::Sampler) {
        for unit in &mut self.samplers {
            if *unit == Some(sampler) {
                *unit = None;
            }
        }
    }

    /// Forgets a destroyed program.
    pub fn forget_program(&mut self, program: B::Program) {
        if self.program == Some(program) {
            self.program = None;
        }
    }

    // --- Fixed-function state ---

    /// Sets the depth state.
    pub fn set_depth_state(&mut self, backend: &mut B, state: DepthState) {
        let previous = self.depth;
        if previous == Some(state) {
            self.skipped();
            return;
        }
        self.depth = Some(state);

        if previous.map(|p| p.test_enabled) != Some(state.test_enabled) {
            self.issued();
            backend.set_depth_test(state.test_enabled);
        }
        if previous.map(|p| p.func) != Some(state.func) {
            self.issued();
            backend.set_depth_func(state.func);
        }
        if previous.map(|p| p.write_mask) != Some(state.write_mask) {
            self.issued();
            backend.set_depth_mask(state.write_mask);
        }
    }

    /// Sets the stencil state.
    pub fn set_stencil_state(&mut self, backend: &mut B, state: StencilState) {
        let previous = self.stencil;
        if previous == Some(state) {
            self.skipped();
            return;
        }
        self.stencil = Some(state);
        let desc = state.desc;

        if previous.map(|p| p.enabled) != Some(state.enabled) {
            self.issued();
            backend.set_stencil_test(state.enabled);
        }
        let func = |s: StencilState| (s.desc.front_func, s.desc.back_func, s.reference, s.desc.read_mask);
        if previous.map(func) != Some(func(state)) {
            self.issued();
            backend.set_stencil_func(desc.front_func, desc.back_func, state.reference, desc.read_mask);
        }
        let front = |s: StencilState| (s.desc.front_fail, s.desc.front_depth_fail, s.desc.front_pass);
        if previous.map(front) != Some(front(state)) {
            self.issued();
            backend.set_stencil_op(StencilFace::Front, desc.front_fail, desc.front_depth_fail, desc.front_pass);
        }
        let back = |s: StencilState| (s.desc.back_fail, s.desc.back_depth_fail, s.desc.back_pass);
        if previous.map(back) != Some(back(state)) {
            self.issued();
            backend.set_stencil_op(StencilFace::Back, desc.back_fail, desc.back_depth_fail, desc.back_pass);
        }
        if previous.map(|p| p.desc.write_mask) != Some(desc.write_mask) {
            self.issued();
            backend.set_stencil_write_mask(desc.write_mask);
        }
    }

    /// Sets the blend equation and color write mask.
    pub fn set_blend_state(&mut self, backend: &mut B, desc: BlendModeDesc, mask: ColorMask) {
        let previous = self.blend;
        if previous == Some((desc, mask)) {
            self.skipped();
            return;
        }
        self.blend = Some((desc, mask));

        if previous.map(|(p, _)| p.blend_enable) != Some(desc.blend_enable) {
            self.issued();
            backend.set_blend_enabled(desc.blend_enable);
        }
        let func = |d: BlendModeDesc| (d.src_blend, d.dst_blend, d.src_blend_alpha, d.dst_blend_alpha);
        if previous.map(|(p, _)| func(p)) != Some(func(desc)) {
            self.issued();
            backend.set_blend_func(desc.src_blend, desc.dst_blend, desc.src_blend_alpha, desc.dst_blend_alpha);
        }
        let op = |d: BlendModeDesc| (d.blend_op, d.blend_op_alpha);
        if previous.map(|(p, _)| op(p)) != Some(op(desc)) {
            self.issued();
            backend.set_blend_op(desc.blend_op, desc.blend_op_alpha);
        }
        if previous.map(|(_, m)| m) != Some(mask) {
            self.issued();
            backend.set_color_mask(mask);
        }
    }

    /// Sets the blend constant color, compared within [`STATE_EPSILON`].
    pub fn set_blend_constant(&mut self, backend: &mut B, color: LinearRgba) {
        if self
            .blend_constant
            .is_some_and(|current| current.abs_diff_eq(&color, STATE_EPSILON))
        {
            self.skipped();
            return;
        }
        self.blend_constant = Some(color);
        self.issued();
        backend.set_blend_constant(color);
    }

    /// Sets the rasterizer state. The polygon offset compares within [`STATE_EPSILON`].
    pub fn set_rasterizer_state(&mut self, backend: &mut B, state: RasterizerState) {
        let previous = self.rasterizer;
        if previous == Some(state) {
            self.skipped();
            return;
        }
        self.rasterizer = Some(state);

        if previous.map(|p| p.cull_face) != Some(state.cull_face) {
            self.issued();
            backend.set_cull_face(state.cull_face);
        }
        if previous.map(|p| p.fill_mode) != Some(state.fill_mode) {
            self.issued();
            backend.set_fill_mode(state.fill_mode);
        }
        if previous.map(|p| p.front_face) != Some(state.front_face) {
            self.issued();
            backend.set_front_face(state.front_face);
        }
        if previous.map(|p| p.polygon_offset) != Some(state.polygon_offset) {
            self.issued();
            backend.set_polygon_offset(state.polygon_offset);
        }
    }

    /// Sets the viewport.
    pub fn set_viewport(&mut self, backend: &mut B, viewport: Viewport) {
        if self.viewport == Some(viewport) {
            self.skipped();
            return;
        }
        self.viewport = Some(viewport);
        self.issued();
        backend.set_viewport(viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backends::{HeadlessBackend, NativeCall};

    fn setup() -> (BindingCache<HeadlessBackend>, HeadlessBackend) {
        (BindingCache::default(), HeadlessBackend::new())
    }

    #[test]
    fn repeated_program_bind_is_skipped() {
        let (mut cache, mut backend) = setup();
        cache.bind_program(&mut backend, 3);
        cache.bind_program(&mut backend, 3);
        assert_eq!(backend.calls(), &[NativeCall::BindProgram(Some(3))]);
        assert_eq!(cache.stats().native_state_calls, 1);
        assert_eq!(cache.stats().skipped_state_calls, 1);
    }

    #[test]
    fn unknown_depth_state_is_emitted_in_full() {
        let (mut cache, mut backend) = setup();
        cache.set_depth_state(&mut backend, DepthState::default());
        assert_eq!(backend.calls().len(), 3);
    }

    #[test]
    fn depth_state_diff_only_touches_changed_parts() {
        let (mut cache, mut backend) = setup();
        cache.set_depth_state(&mut backend, DepthState::default());
        backend.clear_calls();

        cache.set_depth_state(
            &mut backend,
            DepthState {
                func: CompareFunc::LessEqual,
                ..DepthState::default()
            },
        );
        assert_eq!(backend.calls(), &[NativeCall::DepthFunc(CompareFunc::LessEqual)]);
    }

    #[test]
    fn stencil_read_and_write_masks_are_independent() {
        let (mut cache, mut backend) = setup();
        let mut state = StencilState {
            enabled: true,
            desc: StencilTestDesc::default(),
            reference: 1,
        };
        cache.set_stencil_state(&mut backend, state);
        backend.clear_calls();

        state.desc.read_mask = 0xff;
        cache.set_stencil_state(&mut backend, state);
        assert_eq!(
            backend.calls(),
            &[NativeCall::StencilFunc {
                front: CompareFunc::Always,
                back: CompareFunc::Always,
                reference: 1,
                read_mask: 0xff,
            }]
        );
        backend.clear_calls();

        state.desc.write_mask = 0x0f;
        cache.set_stencil_state(&mut backend, state);
        assert_eq!(backend.calls(), &[NativeCall::StencilWriteMask(0x0f)]);
    }

    #[test]
    fn blend_preset_switch_emits_changed_groups() {
        let (mut cache, mut backend) = setup();
        cache.set_blend_state(&mut backend, BlendMode::Add.desc(), ColorMask::ALL);
        backend.clear_calls();

        // Add -> Subtract only changes the operation.
        cache.set_blend_state(&mut backend, BlendMode::Subtract.desc(), ColorMask::ALL);
        assert_eq!(
            backend.calls(),
            &[NativeCall::BlendOp {
                op: BlendOp::RevSubtract,
                op_alpha: BlendOp::RevSubtract,
            }]
        );
    }

    #[test]
    fn blend_constant_tolerates_epsilon_noise() {
        let (mut cache, mut backend) = setup();
        let color = LinearRgba::new(0.25, 0.5, 0.75, 1.0);
        cache.set_blend_constant(&mut backend, color);
        cache.set_blend_constant(&mut backend, LinearRgba { r: color.r + f32::EPSILON * 0.1, ..color });
        assert_eq!(backend.calls().len(), 1);
        cache.set_blend_constant(&mut backend, LinearRgba { r: 0.3, ..color });
        assert_eq!(backend.calls().len(), 2);
    }

    #[test]
    fn polygon_offset_noise_is_a_cache_hit() {
        let (mut cache, mut backend) = setup();
        let state = RasterizerState {
            polygon_offset: PolygonOffset::new(1.0, 1.0),
            ..Default::default()
        };
        cache.set_rasterizer_state(&mut backend, state);
        backend.clear_calls();

        let mut noisy = state;
        noisy.polygon_offset.units += f32::EPSILON * 0.5;
        cache.set_rasterizer_state(&mut backend, noisy);
        assert!(backend.calls().is_empty());

        noisy.polygon_offset.units = 2.0;
        cache.set_rasterizer_state(&mut backend, noisy);
        assert_eq!(backend.calls(), &[NativeCall::PolygonOffset(noisy.polygon_offset)]);
    }

    #[test]
    fn format_switch_forgets_owned_vertex_input() {
        let (mut cache, mut backend) = setup();
        cache.bind_vertex_format(&mut backend, 1);
        cache.bind_vertex_buffer(&mut backend, 0, 10, 0, 16);
        cache.bind_index_buffer(&mut backend, 11);
        cache.bind_vertex_format(&mut backend, 2);
        backend.clear_calls();

        cache.bind_vertex_buffer(&mut backend, 0, 10, 0, 16);
        cache.bind_index_buffer(&mut backend, 11);
        assert_eq!(backend.calls().len(), 2);
    }

    #[test]
    fn format_switch_keeps_free_vertex_input() {
        let mut cache = BindingCache::<HeadlessBackend>::default();
        let mut backend = HeadlessBackend::new().with_vertex_input_owned_by_format(false);
        cache.bind_vertex_format(&mut backend, 1);
        cache.bind_vertex_buffer(&mut backend, 0, 10, 0, 16);
        cache.bind_vertex_format(&mut backend, 2);
        backend.clear_calls();

        cache.bind_vertex_buffer(&mut backend, 0, 10, 0, 16);
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn forgetting_a_buffer_clears_every_slot_holding_it() {
        let (mut cache, mut backend) = setup();
        cache.bind_vertex_buffer(&mut backend, 0, 5, 0, 8);
        cache.bind_vertex_buffer(&mut backend, 3, 5, 0, 8);
        cache.bind_constant_buffer(&mut backend, 1, 5);
        cache.forget_buffer(5);
        backend.clear_calls();

        cache.bind_vertex_buffer(&mut backend, 0, 5, 0, 8);
        cache.bind_vertex_buffer(&mut backend, 3, 5, 0, 8);
        cache.bind_constant_buffer(&mut backend, 1, 5);
        assert_eq!(backend.calls().len(), 3);
    }

    #[test]
    fn reset_forgets_state_and_counters() {
        let (mut cache, mut backend) = setup();
        cache.set_viewport(&mut backend, Viewport::new(0, 0, 4, 4));
        cache.reset();
        assert_eq!(cache.stats(), RenderStats::default());
        assert_eq!(cache.viewport(), None);
    }
}
