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

//! The window contract a render context is created against.

use crate::config::ContextSettings;
use raw_window_handle::RawWindowHandle;
use std::ffi::{c_void, CStr};

/// A trait that abstracts what the render layer needs from a window.
///
/// Any windowing backend (winit + glutin, SDL2, a headless test double, ...) can
/// implement this trait to host a [`RenderContext`](crate::renderer::RenderContext).
/// All methods are called from the thread that owns the native graphics context.
pub trait RenderWindow {
    /// Returns the title the window was created with.
    fn title(&self) -> &str;

    /// Returns the physical dimensions (width, height) of the window's inner area.
    fn inner_size(&self) -> (u32, u32);

    /// Returns the settings of the graphics context attached to this window,
    /// or `None` if the window was created without one.
    fn context_settings(&self) -> Option<&ContextSettings>;

    /// Resolves a native API entry point by name.
    ///
    /// Returns a null pointer when the symbol is unknown.
    fn get_proc_address(&self, symbol: &CStr) -> *const c_void;

    /// Returns the raw OS window handle, if the window has one.
    fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        None
    }

    /// Convenience for `context_settings().is_some()`.
    fn has_graphics_context(&self) -> bool {
        self.context_settings().is_some()
    }
}
