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

//! # HD Core
//!
//! Backend-agnostic part of the `hd` render layer: typed resource handles, the
//! resource registry, the binding-state cache and the [`RenderContext`] facade
//! that ties them to a concrete [`RenderBackend`].

#![warn(missing_docs)]

pub mod config;
pub mod handle;
pub mod math;
pub mod platform;
pub mod renderer;

pub use config::RenderConfig;
pub use handle::{Handle, ProgramConstant};
pub use renderer::{RenderBackend, RenderContext, RenderError};
