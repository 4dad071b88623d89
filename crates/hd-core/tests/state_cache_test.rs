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

use anyhow::Result;
use hd_core::math::LinearRgba;
use hd_core::renderer::backends::{HeadlessBackend, HeadlessWindow, NativeCall};
use hd_core::renderer::{
    BlendFactor, BlendMode, BlendOp, BufferUsage, ColorMask, CompareFunc, ContractViolation, CullFace, FillMode,
    FrontFace, IndexType, PolygonOffset, PrimitiveType, RenderContext, StencilOp, StencilTestDesc, TextureFormat,
    VertexBufferHandle, VertexElement, VertexElementType, VertexFormatHandle, Viewport,
};

fn context_with(backend: HeadlessBackend) -> Result<RenderContext<HeadlessBackend>> {
    let window = HeadlessWindow::new("cache", 640, 480);
    let mut context = RenderContext::new();
    context.create_with_backend(&window, backend)?;
    clear(&mut context);
    Ok(context)
}

fn clear(context: &mut RenderContext<HeadlessBackend>) {
    if let Some(backend) = context.backend_mut() {
        backend.clear_calls();
    }
    context.reset_stats();
}

fn calls(context: &RenderContext<HeadlessBackend>) -> Vec<NativeCall> {
    context.backend().map(|b| b.calls().to_vec()).unwrap_or_default()
}

fn count(context: &RenderContext<HeadlessBackend>, predicate: impl Fn(&NativeCall) -> bool) -> usize {
    context.backend().map_or(0, |b| b.count_calls(predicate))
}

#[test]
fn test_texture_rebinding_is_filtered() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = context_with(HeadlessBackend::new())?;
    let a = context.create_texture_2d(None, 2, 2, TextureFormat::Rgba8)?;
    let b = context.create_texture_2d(None, 2, 2, TextureFormat::Rgba8)?;
    clear(&mut context);
    let binds = |c: &NativeCall| matches!(c, NativeCall::BindTexture { unit: 0, .. });

    // --- 2. ACT & 3. ASSERT ---
    context.bind_texture_2d(a, 0)?;
    context.bind_texture_2d(b, 0)?;
    assert_eq!(count(&context, binds), 2);

    context.bind_texture_2d(b, 0)?;
    assert_eq!(count(&context, binds), 2, "rebinding the bound texture is dropped");

    context.bind_texture_2d(a, 0)?;
    assert_eq!(count(&context, binds), 3);

    let stats = context.stats();
    assert_eq!(stats.native_state_calls, 3);
    assert_eq!(stats.skipped_state_calls, 1);
    Ok(())
}

#[test]
fn test_texture_unit_out_of_range() -> Result<()> {
    let mut context = context_with(HeadlessBackend::new())?;
    let texture = context.create_texture_2d(None, 1, 1, TextureFormat::R8)?;

    let result = context.bind_texture_2d(texture, 8);

    assert_eq!(
        result.unwrap_err().as_contract(),
        Some(&ContractViolation::SlotOutOfRange {
            kind: "texture",
            slot: 8,
            max: 8
        })
    );
    Ok(())
}

#[test]
fn test_alpha_blend_preset_expansion() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = context_with(HeadlessBackend::new())?;

    // --- 2. ACT ---
    context.set_blend_state(BlendMode::Alpha, ColorMask::ALL)?;

    // --- 3. ASSERT ---
    assert_eq!(
        calls(&context),
        vec![
            NativeCall::BlendEnabled(true),
            NativeCall::BlendFunc {
                src: BlendFactor::SrcAlpha,
                dst: BlendFactor::InvSrcAlpha,
                src_alpha: BlendFactor::SrcAlpha,
                dst_alpha: BlendFactor::InvSrcAlpha,
            },
            NativeCall::BlendOp {
                op: BlendOp::Add,
                op_alpha: BlendOp::Add
            },
            NativeCall::ColorMask(ColorMask::ALL),
        ]
    );

    clear(&mut context);
    context.set_blend_state(BlendMode::Alpha, ColorMask::ALL)?;
    assert!(calls(&context).is_empty());
    assert_eq!(context.stats().skipped_state_calls, 1);

    // Only the parts that differ from Alpha reach the backend.
    context.set_blend_state(BlendMode::Replace, ColorMask::ALL)?;
    assert_eq!(
        calls(&context),
        vec![
            NativeCall::BlendEnabled(false),
            NativeCall::BlendFunc {
                src: BlendFactor::One,
                dst: BlendFactor::Zero,
                src_alpha: BlendFactor::One,
                dst_alpha: BlendFactor::Zero,
            },
        ]
    );
    Ok(())
}

#[test]
fn test_blend_constant_compares_within_epsilon() -> Result<()> {
    let mut context = context_with(HeadlessBackend::new())?;
    let color = LinearRgba::new(0.25, 0.5, 0.75, 1.0);

    context.set_blend_constant(color)?;
    context.set_blend_constant(LinearRgba::new(0.25, 0.5, 0.75, 1.0 + f32::EPSILON / 2.0))?;
    context.set_blend_constant(LinearRgba::new(0.3, 0.5, 0.75, 1.0))?;

    assert_eq!(count(&context, |c| matches!(c, NativeCall::BlendConstant(_))), 2);
    Ok(())
}

#[test]
fn test_depth_state_emits_only_changed_parts() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = context_with(HeadlessBackend::new())?;
    context.set_depth_state(true, CompareFunc::Less, true)?;
    assert_eq!(calls(&context).len(), 3, "unknown state is emitted in full");
    clear(&mut context);

    // --- 2. ACT ---
    context.set_depth_state(true, CompareFunc::LessEqual, true)?;

    // --- 3. ASSERT ---
    assert_eq!(calls(&context), vec![NativeCall::DepthFunc(CompareFunc::LessEqual)]);
    Ok(())
}

#[test]
fn test_stencil_state_diff() -> Result<()> {
    let mut context = context_with(HeadlessBackend::new())?;
    let desc = StencilTestDesc::default();
    context.set_stencil_state(true, desc, 1)?;
    assert_eq!(calls(&context).len(), 5);
    clear(&mut context);

    context.set_stencil_state(true, desc, 2)?;
    assert_eq!(
        calls(&context),
        vec![NativeCall::StencilFunc {
            front: CompareFunc::Always,
            back: CompareFunc::Always,
            reference: 2,
            read_mask: u32::MAX
        }]
    );
    clear(&mut context);

    let replace_back = StencilTestDesc {
        back_pass: StencilOp::Replace,
        ..desc
    };
    context.set_stencil_state(true, replace_back, 2)?;
    assert_eq!(calls(&context).len(), 1);
    Ok(())
}

#[test]
fn test_rasterizer_polygon_offset_epsilon() -> Result<()> {
    let mut context = context_with(HeadlessBackend::new())?;
    let offset = PolygonOffset::new(1.0, 2.0);

    context.set_rasterizer_state(CullFace::Back, FillMode::Solid, FrontFace::Ccw, offset)?;
    clear(&mut context);
    context.set_rasterizer_state(
        CullFace::Back,
        FillMode::Solid,
        FrontFace::Ccw,
        PolygonOffset::new(1.0 + f32::EPSILON / 4.0, 2.0),
    )?;
    context.set_rasterizer_state(CullFace::None, FillMode::Solid, FrontFace::Ccw, offset)?;

    assert_eq!(calls(&context), vec![NativeCall::CullFace(CullFace::None)]);
    assert_eq!(context.stats().skipped_state_calls, 1);
    Ok(())
}

#[test]
fn test_viewport_is_cached_from_creation() -> Result<()> {
    let mut context = context_with(HeadlessBackend::new())?;

    context.set_viewport(Viewport::new(0, 0, 640, 480))?;
    context.set_viewport(Viewport::new(0, 0, 320, 240))?;

    assert_eq!(calls(&context), vec![NativeCall::Viewport(Viewport::new(0, 0, 320, 240))]);
    Ok(())
}

fn vertex_setup(
    context: &mut RenderContext<HeadlessBackend>,
) -> Result<(VertexFormatHandle, VertexFormatHandle, VertexBufferHandle)> {
    let position = [VertexElement::new(VertexElementType::Float3, 0, 0, 0)];
    let uv = [VertexElement::new(VertexElementType::Float2, 0, 0, 0)];
    let first = context.create_vertex_format(&position)?;
    let second = context.create_vertex_format(&uv)?;
    let buffer = context.create_vertex_buffer(None, 48, BufferUsage::Static)?;
    Ok((first, second, buffer))
}

#[test]
fn test_format_switch_resets_owned_vertex_input() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = context_with(HeadlessBackend::new())?;
    let (first, second, buffer) = vertex_setup(&mut context)?;
    context.bind_vertex_format(first)?;
    context.bind_vertex_buffer(buffer, 0, 0, 12)?;
    clear(&mut context);

    // --- 2. ACT ---
    context.bind_vertex_format(second)?;
    context.bind_vertex_buffer(buffer, 0, 0, 12)?;

    // --- 3. ASSERT ---
    assert_eq!(count(&context, |c| matches!(c, NativeCall::BindVertexBuffer { .. })), 1);
    Ok(())
}

#[test]
fn test_format_switch_keeps_shared_vertex_input() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = context_with(HeadlessBackend::new().with_vertex_input_owned_by_format(false))?;
    let (first, second, buffer) = vertex_setup(&mut context)?;
    context.bind_vertex_format(first)?;
    context.bind_vertex_buffer(buffer, 0, 0, 12)?;
    clear(&mut context);

    // --- 2. ACT ---
    context.bind_vertex_format(second)?;
    context.bind_vertex_buffer(buffer, 0, 0, 12)?;

    // --- 3. ASSERT ---
    assert_eq!(count(&context, |c| matches!(c, NativeCall::BindVertexBuffer { .. })), 0);
    Ok(())
}

#[test]
fn test_vertex_format_creation_keeps_the_bound_format() -> Result<()> {
    let mut context = context_with(HeadlessBackend::new())?;
    let (first, _, _) = vertex_setup(&mut context)?;
    context.bind_vertex_format(first)?;
    clear(&mut context);

    context.create_vertex_format(&[VertexElement::new(VertexElementType::Float4, 2, 1, 0)])?;
    context.bind_vertex_format(first)?;

    assert_eq!(count(&context, |c| matches!(c, NativeCall::BindVertexFormat(_))), 0);
    Ok(())
}

#[test]
fn test_zero_stride_is_rejected() -> Result<()> {
    let mut context = context_with(HeadlessBackend::new())?;
    let (_, _, buffer) = vertex_setup(&mut context)?;

    let result = context.bind_vertex_buffer(buffer, 0, 0, 0);

    assert_eq!(result.unwrap_err().as_contract(), Some(&ContractViolation::ZeroStride));
    Ok(())
}

#[test]
fn test_destroyed_bindings_are_forgotten() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = context_with(HeadlessBackend::new())?;
    let mut texture = context.create_texture_2d(None, 1, 1, TextureFormat::R8)?;
    let replacement = context.create_texture_2d(None, 1, 1, TextureFormat::R8)?;
    context.bind_texture_2d(texture, 3)?;

    // --- 2. ACT ---
    context.destroy_texture_2d(&mut texture)?;
    clear(&mut context);
    context.bind_texture_2d(replacement, 3)?;

    // --- 3. ASSERT ---
    assert_eq!(count(&context, |c| matches!(c, NativeCall::BindTexture { unit: 3, .. })), 1);
    Ok(())
}

#[test]
fn test_draw_requirements() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = context_with(HeadlessBackend::new())?;
    let (format, _, buffer) = vertex_setup(&mut context)?;
    let indices = context.create_index_buffer(Some(bytemuck::cast_slice(&[0u16, 1, 2])), 6, BufferUsage::Static)?;
    let program = context.create_program("flat", "void main() {}", "void main() {}", "")?;

    // --- 2. ACT & 3. ASSERT ---
    let no_program = context.draw(PrimitiveType::Triangles, 3, 0);
    assert_eq!(no_program.unwrap_err().as_contract(), Some(&ContractViolation::NoProgramBound));

    context.bind_program(program)?;
    let no_format = context.draw(PrimitiveType::Triangles, 3, 0);
    assert_eq!(
        no_format.unwrap_err().as_contract(),
        Some(&ContractViolation::MissingBinding("vertex format"))
    );

    context.bind_vertex_format(format)?;
    context.bind_vertex_buffer(buffer, 0, 0, 12)?;
    context.draw(PrimitiveType::Triangles, 3, 0)?;
    let no_indices = context.draw_indexed(PrimitiveType::Triangles, 3, 0, IndexType::Ushort);
    assert_eq!(
        no_indices.unwrap_err().as_contract(),
        Some(&ContractViolation::MissingBinding("index buffer"))
    );

    context.bind_index_buffer(indices)?;
    context.draw_indexed_instanced(PrimitiveType::Triangles, 3, 0, IndexType::Ushort, 4)?;

    assert_eq!(context.stats().draw_calls, 2);
    assert!(calls(&context).contains(&NativeCall::DrawIndexed {
        primitive: PrimitiveType::Triangles,
        index_type: IndexType::Ushort,
        first: 0,
        count: 3,
        instances: Some(4),
    }));
    Ok(())
}

#[test]
fn test_clears_reach_the_backend() -> Result<()> {
    let mut context = context_with(HeadlessBackend::new())?;

    context.clear_render_target(LinearRgba::BLACK)?;
    context.clear_depth_stencil(1.0, 0)?;

    assert_eq!(
        calls(&context),
        vec![NativeCall::ClearColor(LinearRgba::BLACK), NativeCall::ClearDepthStencil(1.0, 0)]
    );
    Ok(())
}
