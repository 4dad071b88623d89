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
use hd_core::renderer::backends::{HeadlessBackend, HeadlessWindow, NativeCall};
use hd_core::renderer::{
    BufferAccess, BufferUsage, ContractViolation, NativeError, RenderContext, SamplerDesc, SamplerFilter,
    TextureFormat, VertexBufferHandle, VertexElement, VertexElementType,
};

fn created_context() -> Result<RenderContext<HeadlessBackend>> {
    let window = HeadlessWindow::new("lifecycle", 800, 600);
    let mut context = RenderContext::new();
    context.create(&window)?;
    Ok(context)
}

fn live_objects(context: &RenderContext<HeadlessBackend>) -> usize {
    context.backend().map_or(0, HeadlessBackend::live_objects)
}

#[test]
fn test_context_creation_and_destruction() -> Result<()> {
    // --- 1. ARRANGE ---
    let window = HeadlessWindow::new("lifecycle", 800, 600);
    let mut context = RenderContext::<HeadlessBackend>::new();
    assert!(!context.is_created());

    // --- 2. ACT ---
    context.create(&window)?;

    // --- 3. ASSERT ---
    assert!(context.is_created());
    assert_eq!(context.stats().native_state_calls, 1, "the viewport is set on creation");
    let backend = context.backend().expect("backend is loaded");
    assert!(backend.calls().contains(&NativeCall::Viewport(hd_core::renderer::Viewport::new(0, 0, 800, 600))));

    context.destroy();
    assert!(!context.is_created());
    context.destroy();
    assert!(!context.is_created());
    Ok(())
}

#[test]
fn test_window_without_context_is_rejected() {
    // --- 1. ARRANGE ---
    let window = HeadlessWindow::new("no context", 320, 240).with_context_settings(None);
    let mut context = RenderContext::<HeadlessBackend>::new();

    // --- 2. ACT ---
    let result = context.create(&window);

    // --- 3. ASSERT ---
    let err = result.expect_err("creation must fail");
    assert!(matches!(err.as_native(), Some(NativeError::ContextUnavailable(title)) if title == "no context"));
    assert!(!context.is_created());
}

#[test]
fn test_operations_need_a_created_context() {
    let mut context = RenderContext::<HeadlessBackend>::new();

    let result = context.create_vertex_buffer(None, 64, BufferUsage::Static);

    assert_eq!(result.unwrap_err().as_contract(), Some(&ContractViolation::NotCreated));
}

#[test]
fn test_vertex_buffer_lifecycle() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = created_context()?;
    let data: Vec<u8> = (0..64).collect();

    // --- 2. ACT ---
    let mut buffer = context.create_vertex_buffer(Some(&data), 64, BufferUsage::Static)?;
    let copy = buffer;

    // --- 3. ASSERT ---
    assert!(buffer.is_valid());
    let record = *context.registry().vertex_buffer(buffer)?;
    assert_eq!(record.size, 64);
    assert_eq!(context.backend().unwrap().buffer_contents(record.native), Some(&data[..]));

    context.update_vertex_buffer_data_range(buffer, &[0xAA; 16], 48)?;
    let out_of_bounds = context.update_vertex_buffer_data_range(buffer, &[0; 16], 56);
    assert_eq!(
        out_of_bounds.unwrap_err().as_contract(),
        Some(&ContractViolation::OutOfBounds {
            offset: 56,
            size: 16,
            capacity: 64
        })
    );
    let contents = context.backend().unwrap().buffer_contents(record.native).unwrap();
    assert!(contents[48..].iter().all(|&b| b == 0xAA));
    assert_eq!(contents[47], 47);

    context.destroy_vertex_buffer(&mut buffer)?;
    assert!(!buffer.is_valid());
    assert_eq!(live_objects(&context), 0);

    // Destroying the invalidated handle again does nothing.
    context.destroy_vertex_buffer(&mut buffer)?;

    // A copy taken before destruction is stale.
    let stale = context.bind_vertex_buffer(copy, 0, 0, 16);
    assert_eq!(
        stale.unwrap_err().as_contract(),
        Some(&ContractViolation::StaleHandle { kind: "vertex buffer" })
    );
    Ok(())
}

#[test]
fn test_buffer_creation_validates_sizes() -> Result<()> {
    let mut context = created_context()?;

    let zero = context.create_index_buffer(None, 0, BufferUsage::Static);
    assert_eq!(
        zero.unwrap_err().as_contract(),
        Some(&ContractViolation::ZeroSize { kind: "index buffer" })
    );

    let mismatched = context.create_constant_buffer(Some(&[0; 8]), 16, BufferUsage::Dynamic);
    assert_eq!(
        mismatched.unwrap_err().as_contract(),
        Some(&ContractViolation::DataSizeMismatch { expected: 16, actual: 8 })
    );
    assert_eq!(context.registry().counts().total(), 0);
    Ok(())
}

#[test]
fn test_buffer_respecification_changes_capacity() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = created_context()?;
    let buffer = context.create_constant_buffer(None, 16, BufferUsage::Dynamic)?;

    // --- 2. ACT ---
    context.set_constant_buffer_data(buffer, None, 256)?;

    // --- 3. ASSERT ---
    assert_eq!(context.registry().constant_buffer(buffer)?.size, 256);
    context.update_constant_buffer_data_range(buffer, &[1; 64], 192)?;
    let whole = context.update_constant_buffer_data(buffer, &[0; 16]);
    assert!(matches!(
        whole.unwrap_err().as_contract(),
        Some(ContractViolation::DataSizeMismatch { expected: 256, actual: 16 })
    ));
    Ok(())
}

#[test]
fn test_mapping_is_scoped_to_the_closure() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = created_context()?;
    let buffer = context.create_index_buffer(Some(&[1, 2, 3, 4]), 4, BufferUsage::Dynamic)?;
    let native = context.registry().index_buffer(buffer)?.native;

    // --- 2. ACT ---
    let sum = context.map_index_buffer(buffer, BufferAccess::Read, |bytes| {
        let sum: u32 = bytes.iter().map(|&b| u32::from(b)).sum();
        bytes.fill(0);
        sum
    })?;
    context.map_index_buffer(buffer, BufferAccess::Write, |bytes| bytes.copy_from_slice(&[9, 8, 7, 6]))?;

    // --- 3. ASSERT ---
    assert_eq!(sum, 10);
    assert_eq!(context.backend().unwrap().buffer_contents(native), Some(&[9, 8, 7, 6][..]));
    Ok(())
}

#[test]
fn test_texture_creation_validates_data_size() -> Result<()> {
    let mut context = created_context()?;

    let zero = context.create_texture_2d(None, 0, 4, TextureFormat::Rgba8);
    assert!(matches!(
        zero.unwrap_err().as_contract(),
        Some(ContractViolation::ZeroDimensions { width: 0, .. })
    ));

    let short = context.create_texture_2d_array(Some(&[0; 16]), 2, 2, TextureFormat::Rgba8, 2);
    assert_eq!(
        short.unwrap_err().as_contract(),
        Some(&ContractViolation::DataSizeMismatch { expected: 32, actual: 16 })
    );

    let array = context.create_texture_2d_array(None, 2, 2, TextureFormat::R32F, 2)?;
    let layer = context.set_texture_2d_array_layer_data(array, 2, &[0; 16]);
    assert_eq!(
        layer.unwrap_err().as_contract(),
        Some(&ContractViolation::LayerOutOfRange { layer: 2, layers: 2 })
    );
    context.set_texture_2d_array_layer_data(array, 1, &[1; 16])?;
    Ok(())
}

#[test]
fn test_oversized_texture_is_rejected_without_panicking() -> Result<()> {
    let mut context = created_context()?;

    let huge = context.create_texture_2d(Some(&[0; 16]), u32::MAX, u32::MAX, TextureFormat::Rgba32F);
    let array = context.create_texture_2d_array(None, u32::MAX, u32::MAX, TextureFormat::Rgba32F, u32::MAX);

    // u32::MAX squared texels of 16 bytes overflow a 64-bit usize.
    assert_eq!(
        huge.unwrap_err().as_contract(),
        Some(&ContractViolation::TextureTooLarge {
            width: u32::MAX,
            height: u32::MAX,
            layers: 1
        })
    );
    assert!(matches!(
        array.unwrap_err().as_contract(),
        Some(ContractViolation::TextureTooLarge { layers: u32::MAX, .. })
    ));
    assert_eq!(context.registry().counts().total(), 0);
    assert_eq!(live_objects(&context), 0);
    Ok(())
}

#[test]
fn test_sampler_creation_validates_anisotropy() -> Result<()> {
    let mut context = created_context()?;

    let too_much = SamplerDesc::new(SamplerFilter::Anisotropic).with_max_anisotropy(32);
    assert_eq!(
        context.create_sampler_state(&too_much).unwrap_err().as_contract(),
        Some(&ContractViolation::AnisotropyOutOfRange(32))
    );

    let sampler = context.create_sampler_state(&SamplerDesc::new(SamplerFilter::Trilinear))?;
    assert!(sampler.is_valid());
    Ok(())
}

#[test]
fn test_create_destroy_symmetry() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = created_context()?;
    let elements = [
        VertexElement::new(VertexElementType::Float3, 0, 0, 0),
        VertexElement::new(VertexElementType::Float2, 1, 0, 12),
    ];

    // --- 2. ACT ---
    let mut format = context.create_vertex_format(&elements)?;
    let mut vertices = context.create_vertex_buffer(None, 60, BufferUsage::Static)?;
    let mut indices = context.create_index_buffer(None, 12, BufferUsage::Static)?;
    let mut constants = context.create_constant_buffer(None, 64, BufferUsage::Dynamic)?;
    let mut texture = context.create_texture_2d(None, 4, 4, TextureFormat::Rgba8)?;
    let mut array = context.create_texture_2d_array(None, 4, 4, TextureFormat::R8, 3)?;
    let mut sampler = context.create_sampler_state(&SamplerDesc::default())?;
    let mut program = context.create_program("flat", "void main() {}", "void main() {}", "")?;
    assert_eq!(context.registry().counts().total(), 8);
    assert_eq!(live_objects(&context), 8);

    context.destroy_vertex_format(&mut format)?;
    context.destroy_vertex_buffer(&mut vertices)?;
    context.destroy_index_buffer(&mut indices)?;
    context.destroy_constant_buffer(&mut constants)?;
    context.destroy_texture_2d(&mut texture)?;
    context.destroy_texture_2d_array(&mut array)?;
    context.destroy_sampler_state(&mut sampler)?;
    context.destroy_program(&mut program)?;

    // --- 3. ASSERT ---
    assert_eq!(context.registry().counts().total(), 0);
    assert_eq!(live_objects(&context), 0);
    for handle_is_valid in [
        format.is_valid(),
        vertices.is_valid(),
        indices.is_valid(),
        constants.is_valid(),
        texture.is_valid(),
        array.is_valid(),
        sampler.is_valid(),
        program.is_valid(),
    ] {
        assert!(!handle_is_valid);
    }
    Ok(())
}

#[test]
fn test_context_destroy_releases_everything() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = created_context()?;
    let mut buffer = context.create_vertex_buffer(None, 16, BufferUsage::Static)?;
    context.create_texture_2d(None, 2, 2, TextureFormat::Rgba8)?;
    context.create_program("p", "void main() {}", "void main() {}", "")?;

    // --- 2. ACT ---
    context.destroy();

    // --- 3. ASSERT ---
    assert_eq!(context.registry().counts().total(), 0);
    // Handles outliving the context are only invalidated.
    context.destroy_vertex_buffer(&mut buffer)?;
    assert_eq!(buffer, VertexBufferHandle::INVALID);
    Ok(())
}

#[test]
fn test_vertex_format_validation() -> Result<()> {
    let mut context = created_context()?;

    assert_eq!(
        context.create_vertex_format(&[]).unwrap_err().as_contract(),
        Some(&ContractViolation::EmptyVertexFormat)
    );

    let out_of_range = VertexElement::new(VertexElementType::Float, 16, 0, 0);
    assert!(matches!(
        context.create_vertex_format(&[out_of_range]).unwrap_err().as_contract(),
        Some(ContractViolation::VertexElementOutOfRange { field: "index", value: 16, .. })
    ));
    Ok(())
}

#[test]
fn test_handles_stay_stale_across_context_recreation() -> Result<()> {
    // --- 1. ARRANGE ---
    let window = HeadlessWindow::new("recreate", 320, 240);
    let mut context = created_context()?;
    let old = context.create_vertex_buffer(None, 64, BufferUsage::Static)?;
    let mut stale = old;

    // --- 2. ACT ---
    context.destroy();
    context.create(&window)?;
    let fresh = context.create_vertex_buffer(None, 128, BufferUsage::Static)?;

    // --- 3. ASSERT ---
    assert_ne!(old, fresh);
    assert_eq!(
        context.registry().vertex_buffer(stale).unwrap_err(),
        ContractViolation::StaleHandle { kind: "vertex buffer" }
    );
    let destroyed = context.destroy_vertex_buffer(&mut stale);
    assert_eq!(
        destroyed.unwrap_err().as_contract(),
        Some(&ContractViolation::StaleHandle { kind: "vertex buffer" })
    );
    assert_eq!(context.registry().vertex_buffer(fresh)?.size, 128);
    assert_eq!(live_objects(&context), 1);
    Ok(())
}

#[test]
fn test_failed_recreation_still_destroys_the_old_context() -> Result<()> {
    // --- 1. ARRANGE ---
    let mut context = created_context()?;
    context.create_vertex_buffer(None, 16, BufferUsage::Static)?;
    let no_context = HeadlessWindow::new("no context", 320, 240).with_context_settings(None);

    // --- 2. ACT ---
    let result = context.create(&no_context);

    // --- 3. ASSERT ---
    assert!(result.is_err());
    assert!(!context.is_created());
    assert_eq!(context.registry().counts().total(), 0);
    Ok(())
}
