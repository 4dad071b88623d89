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

//! Provides the backend-agnostic render context of the `hd` render layer.
//!
//! This module holds the portable vocabulary (`api`), the [`RenderBackend`]
//! seam a native graphics API implements, the registry of live resources, the
//! binding-state cache and the [`RenderContext`] facade that ties them
//! together. Concrete backends live in `hd-infra`; a headless recording
//! backend is available in [`backends`] for tests and tools.

pub mod api;
pub mod backends;
pub mod cache;
pub mod context;
pub mod error;
pub mod registry;
pub mod traits;

mod loading;
mod resources;

// Re-export the most important types for easier use.
pub use self::api::*;
pub use self::cache::{BindingCache, RenderStats};
pub use self::context::RenderContext;
pub use self::error::{ContractViolation, NativeError, RenderError, RenderResult};
pub use self::registry::{
    ConstantBufferHandle, IndexBufferHandle, ProgramHandle, RegistryCounts, ResourceRegistry, SamplerStateHandle,
    Texture2DArrayHandle, Texture2DHandle, VertexBufferHandle, VertexFormatHandle,
};
pub use self::traits::{RenderBackend, StencilFace};
