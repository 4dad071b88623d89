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

//! A `winit` window with a `glutin` OpenGL context, implementing [`RenderWindow`].

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version};
use glutin::display::{Display, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use hd_core::config::{ContextSettings, RenderConfig};
use hd_core::platform::RenderWindow;
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, RawWindowHandle, WindowHandle,
};
use std::ffi::{c_void, CStr};
use std::num::NonZeroU32;
use thiserror::Error;
use winit::dpi::PhysicalSize;
use winit::error::OsError;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window};

/// An error raised while creating a [`GlutinWindow`].
#[derive(Debug, Error)]
pub enum PlatformError {
    /// `winit` failed to create the window.
    #[error("failed to create window: {0}")]
    Os(#[from] OsError),
    /// The window exposes no usable raw handle.
    #[error("window handle unavailable: {0}")]
    Handle(#[from] HandleError),
    /// `glutin` failed to create the display, surface or context.
    #[error("OpenGL context creation failed: {0}")]
    Gl(#[from] glutin::error::Error),
    /// No framebuffer config matches the requested depth and stencil sizes.
    #[error("no framebuffer config matches {depth_bits} depth bits and {stencil_bits} stencil bits")]
    NoConfig {
        /// Requested depth bits.
        depth_bits: u8,
        /// Requested stencil bits.
        stencil_bits: u8,
    },
    /// No framebuffer config offers the requested MSAA sample count.
    #[error("MSAA x{0} is not supported")]
    UnsupportedMsaa(u8),
    /// The window was requested with a zero width or height.
    #[error("window dimensions must be non-zero, got {0}x{1}")]
    ZeroSize(u32, u32),
}

/// A builder for [`GlutinWindow`].
pub struct GlutinWindowBuilder {
    title: String,
    width: u32,
    height: u32,
    vsync: bool,
    fullscreen: bool,
    context: ContextSettings,
}

impl GlutinWindowBuilder {
    /// Creates a builder with default window and context settings.
    pub fn new() -> Self {
        Self::from_config(&RenderConfig::default())
    }

    /// Creates a builder from a loaded [`RenderConfig`].
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            title: config.window.title.clone(),
            width: config.window.width,
            height: config.window.height,
            vsync: config.window.vsync,
            fullscreen: config.window.fullscreen,
            context: config.context.clone(),
        }
    }

    /// Sets the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the initial inner dimensions in physical pixels.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Sets whether buffer swaps wait for vertical sync.
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Sets the graphics context to request.
    pub fn with_context_settings(mut self, settings: ContextSettings) -> Self {
        self.context = settings;
        self
    }

    /// Opens the window and makes a new OpenGL context current on it.
    ///
    /// # Errors
    /// Fails when the window cannot be created, when no framebuffer config
    /// satisfies the requested depth, stencil and MSAA settings, or when
    /// `glutin` cannot create the context.
    pub fn build(self, event_loop: &ActiveEventLoop) -> Result<GlutinWindow, PlatformError> {
        let (Some(width), Some(height)) = (NonZeroU32::new(self.width), NonZeroU32::new(self.height)) else {
            return Err(PlatformError::ZeroSize(self.width, self.height));
        };
        log::info!(
            "Building window with title: '{}' and size: {}x{} (OpenGL {}.{})",
            self.title,
            self.width,
            self.height,
            self.context.major_version,
            self.context.minor_version
        );

        let mut attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.width, self.height))
            .with_visible(true);
        if self.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = event_loop.create_window(attributes)?;

        let raw_window = window.window_handle()?.as_raw();
        let display = unsafe { Display::new(window.display_handle()?.as_raw(), display_preference())? };
        let config = self.choose_config(&display, raw_window)?;

        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(raw_window, width, height);
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes)? };

        let version = Version::new(
            u8::try_from(self.context.major_version).unwrap_or(u8::MAX),
            u8::try_from(self.context.minor_version).unwrap_or(u8::MAX),
        );
        let profile = if self.context.core_profile {
            GlProfile::Core
        } else {
            GlProfile::Compatibility
        };
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(version)))
            .with_profile(profile)
            .with_debug(self.context.debug)
            .build(Some(raw_window));
        let context = unsafe { display.create_context(&config, &context_attributes)? }.make_current(&surface)?;

        let interval = if self.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(err) = surface.set_swap_interval(&context, interval) {
            log::warn!("Failed to set swap interval (vsync {}): {err}", self.vsync);
        }

        let settings = ContextSettings {
            depth_bits: config.depth_size(),
            stencil_bits: config.stencil_size(),
            msaa_samples: config.num_samples(),
            ..self.context
        };
        log::info!(
            "OpenGL context created (id: {:?}, depth: {}, stencil: {}, msaa: {}).",
            window.id(),
            settings.depth_bits,
            settings.stencil_bits,
            settings.msaa_samples
        );

        Ok(GlutinWindow {
            context,
            surface,
            display,
            window,
            settings,
            title: self.title,
        })
    }

    fn choose_config(&self, display: &Display, raw_window: RawWindowHandle) -> Result<Config, PlatformError> {
        let samples = self.context.msaa_samples;
        let mut template = ConfigTemplateBuilder::new()
            .with_depth_size(self.context.depth_bits)
            .with_stencil_size(self.context.stencil_bits)
            .compatible_with_native_window(raw_window);
        if samples > 1 {
            template = template.with_multisampling(samples);
        }

        let configs: Vec<Config> = unsafe { display.find_configs(template.build())? }.collect();
        if configs.is_empty() {
            return Err(PlatformError::NoConfig {
                depth_bits: self.context.depth_bits,
                stencil_bits: self.context.stencil_bits,
            });
        }
        log::debug!("{} framebuffer configs match the request", configs.len());

        configs
            .into_iter()
            .filter(|config| samples <= 1 || config.num_samples() >= samples)
            .min_by_key(|config| config.num_samples())
            .ok_or(PlatformError::UnsupportedMsaa(samples))
    }
}

impl Default for GlutinWindowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "windows")]
fn display_preference() -> DisplayApiPreference {
    log::debug!("Using WGL for the OpenGL context.");
    DisplayApiPreference::Wgl(None)
}

#[cfg(target_os = "macos")]
fn display_preference() -> DisplayApiPreference {
    log::debug!("Using CGL for the OpenGL context.");
    DisplayApiPreference::Cgl
}

#[cfg(all(unix, not(target_os = "macos")))]
fn display_preference() -> DisplayApiPreference {
    log::debug!("Using EGL for the OpenGL context.");
    DisplayApiPreference::Egl
}

/// A desktop window owning a current OpenGL context.
///
/// Fields drop in declaration order, so the context goes before the surface,
/// the surface before the display and the display before the window.
pub struct GlutinWindow {
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    display: Display,
    window: Window,
    settings: ContextSettings,
    title: String,
}

impl GlutinWindow {
    /// The underlying `winit` window.
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Presents the back buffer.
    pub fn swap_buffers(&self) -> Result<(), PlatformError> {
        self.surface.swap_buffers(&self.context)?;
        Ok(())
    }

    /// Resizes the surface after the window was resized. Zero sizes (minimized
    /// windows) are ignored.
    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(width), Some(height)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, width, height);
        }
    }

    /// Requests that the window be redrawn.
    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }
}

impl HasWindowHandle for GlutinWindow {
    fn window_handle(&self) -> Result<WindowHandle<'_>, HandleError> {
        self.window.window_handle()
    }
}

impl HasDisplayHandle for GlutinWindow {
    fn display_handle(&self) -> Result<DisplayHandle<'_>, HandleError> {
        self.window.display_handle()
    }
}

impl RenderWindow for GlutinWindow {
    fn title(&self) -> &str {
        &self.title
    }

    fn inner_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn context_settings(&self) -> Option<&ContextSettings> {
        Some(&self.settings)
    }

    fn get_proc_address(&self, symbol: &CStr) -> *const c_void {
        self.display.get_proc_address(symbol)
    }

    fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        self.window.window_handle().ok().map(|handle| handle.as_raw())
    }
}
