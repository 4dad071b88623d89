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

//! Defines the hierarchy of error types for the render layer.
//!
//! Two families exist. A [`ContractViolation`] means the caller broke a
//! precondition (bad handle, zero size, slot out of range, ...). A
//! [`NativeError`] means the native API or driver refused a request that was
//! well formed. Neither is recovered from inside the library; both surface
//! through [`RenderError`] so the application decides whether to abort.

use thiserror::Error;

/// A precondition of a render operation was not met by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// The operation needs a created context.
    #[error("the render context has not been created")]
    NotCreated,
    /// The handle holds the invalid sentinel.
    #[error("invalid {kind} handle")]
    InvalidHandle {
        /// The resource kind.
        kind: &'static str,
    },
    /// The handle refers to a resource that has been destroyed.
    #[error("stale {kind} handle (the resource was destroyed)")]
    StaleHandle {
        /// The resource kind.
        kind: &'static str,
    },
    /// A buffer was requested with zero bytes.
    #[error("{kind} size must be non-zero")]
    ZeroSize {
        /// The resource kind.
        kind: &'static str,
    },
    /// A texture was requested with a zero width, height or layer count.
    #[error("texture dimensions must be non-zero, got {width}x{height}x{layers}")]
    ZeroDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Requested layer count.
        layers: u32,
    },
    /// The texture holds more bytes than the address space can describe.
    #[error("texture of {width}x{height}x{layers} is too large")]
    TextureTooLarge {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Requested layer count.
        layers: u32,
    },
    /// More texture array layers were requested than a `u32` counts.
    #[error("{0} texture array layers exceed the maximum of {max}", max = u32::MAX)]
    TooManyLayers(usize),
    /// A vertex format was requested without elements.
    #[error("a vertex format needs at least one element")]
    EmptyVertexFormat,
    /// A vertex element references an attribute index or slot that does not exist.
    #[error("vertex element {field} {value} exceeds the maximum of {max}")]
    VertexElementOutOfRange {
        /// Which element field is out of range.
        field: &'static str,
        /// The offending value.
        value: u32,
        /// The largest accepted value.
        max: u32,
    },
    /// A shader stage was given no source text.
    #[error("{stage} shader source is empty")]
    EmptyShaderSource {
        /// The stage that is missing.
        stage: &'static str,
    },
    /// A binding slot or unit index is past the configured maximum.
    #[error("{kind} slot {slot} is out of range (max {max})")]
    SlotOutOfRange {
        /// The binding kind.
        kind: &'static str,
        /// The requested slot.
        slot: u32,
        /// The number of slots available.
        max: u32,
    },
    /// A partial update reaches past the end of the buffer.
    #[error("range {offset}+{size} exceeds buffer capacity {capacity}")]
    OutOfBounds {
        /// Offset of the update.
        offset: usize,
        /// Size of the update.
        size: usize,
        /// Capacity of the buffer.
        capacity: usize,
    },
    /// A vertex buffer was bound with a zero stride.
    #[error("vertex buffer stride must be non-zero")]
    ZeroStride,
    /// A program constant holds the `-1` sentinel.
    #[error("program constant is invalid")]
    InvalidConstant,
    /// A constant name was empty.
    #[error("program constant name is empty")]
    EmptyConstantName,
    /// An operation needs a bound program.
    #[error("no program is bound")]
    NoProgramBound,
    /// A draw was issued without a required binding.
    #[error("draw requires a bound {0}")]
    MissingBinding(&'static str),
    /// A texture array layer is past the layer count.
    #[error("layer {layer} is out of range (array has {layers} layers)")]
    LayerOutOfRange {
        /// Requested layer.
        layer: u32,
        /// Layer count of the array.
        layers: u32,
    },
    /// Initial or update data does not match the size the resource requires.
    #[error("data is {actual} bytes but {expected} are required")]
    DataSizeMismatch {
        /// Bytes required.
        expected: usize,
        /// Bytes provided.
        actual: usize,
    },
    /// An image loaded into a texture array does not match the array size.
    #[error("image is {width}x{height} but the texture array is {expected_width}x{expected_height}")]
    ImageSizeMismatch {
        /// Width of the image.
        width: u32,
        /// Height of the image.
        height: u32,
        /// Width of the array.
        expected_width: u32,
        /// Height of the array.
        expected_height: u32,
    },
    /// Min, mag and mip filters disagree on anisotropic or comparison sampling.
    #[error("min/mag/mip filters disagree on {0} sampling")]
    FilterMismatch(&'static str),
    /// Max anisotropy outside of `1..=16`.
    #[error("max anisotropy {0} is outside of 1..=16")]
    AnisotropyOutOfRange(u32),
}

/// The native API refused a well formed request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    /// The window has no graphics context to render with.
    #[error("window '{0}' has no graphics context")]
    ContextUnavailable(String),
    /// Entry points could not be loaded.
    #[error("failed to load native entry points: {0}")]
    Loader(String),
    /// The driver could not allocate an object.
    #[error("failed to allocate {kind}: {reason}")]
    Allocation {
        /// The resource kind.
        kind: &'static str,
        /// Driver message.
        reason: String,
    },
    /// A shader stage failed to compile.
    #[error("failed to compile {stage} shader of program '{program}':\n{log}")]
    ShaderCompile {
        /// Program name.
        program: String,
        /// Stage name.
        stage: &'static str,
        /// Compiler log.
        log: String,
    },
    /// The program failed to link.
    #[error("failed to link program '{program}':\n{log}")]
    ProgramLink {
        /// Program name.
        program: String,
        /// Linker log.
        log: String,
    },
    /// The linked program failed validation.
    #[error("program '{program}' failed validation:\n{log}")]
    ProgramValidate {
        /// Program name.
        program: String,
        /// Validation log.
        log: String,
    },
    /// The native API lacks a feature the context requires.
    #[error("unsupported feature: {0}")]
    FeatureUnsupported(String),
}

/// Any failure of a render operation.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A caller precondition was broken.
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
    /// The native API failed.
    #[error("native failure: {0}")]
    Native(#[from] NativeError),
    /// Reading a source stream or file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Decoding an image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

impl RenderError {
    /// Returns the contract violation, if that is what this error is.
    pub fn as_contract(&self) -> Option<&ContractViolation> {
        match self {
            RenderError::Contract(violation) => Some(violation),
            _ => None,
        }
    }

    /// Returns the native failure, if that is what this error is.
    pub fn as_native(&self) -> Option<&NativeError> {
        match self {
            RenderError::Native(error) => Some(error),
            _ => None,
        }
    }
}

/// Shorthand result type of the render layer.
pub type RenderResult<T> = Result<T, RenderError>;
