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

//! Shader source preprocessing and program constant values.
//!
//! Before a stage is handed to the native compiler its source is prefixed with
//! a version directive matching the context, one `#define` per requested
//! define and a `#line 1` reset so compiler diagnostics point at the user's
//! own line numbers.

use crate::config::ContextSettings;

/// Marker starting the vertex section of a combined source file.
pub const VERTEX_SECTION_MARKER: &str = "@VertexShader";
/// Marker starting the pixel section of a combined source file.
pub const PIXEL_SECTION_MARKER: &str = "@PixelShader";

const LINE_RESET: &str = "#line 1\n";

/// Computes the `#version` line for a context.
///
/// The packed version is `major * 100 + minor * 10`. Versions below 3.0 map
/// to the GLSL 1.x numbering (2.0 -> 110, 2.1 -> 120) and versions below 3.3
/// to 1.30/1.40/1.50; from 3.3 on the GLSL and API versions agree.
pub fn version_directive(settings: &ContextSettings) -> String {
    let mut version = settings.packed_version();
    if version < 300 {
        version = version.saturating_sub(90);
    } else if version < 330 {
        version -= 170;
    }
    let profile = if settings.core_profile { " core" } else { "" };
    format!("#version {version}{profile}\n")
}

/// Expands a semicolon-separated define list into `#define` lines.
///
/// Entries are trimmed and empty entries skipped. `NAME=VALUE` becomes
/// `#define NAME VALUE`.
pub fn define_block(defines: &str) -> String {
    defines
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((name, value)) => format!("#define {} {}\n", name.trim(), value.trim()),
            None => format!("#define {entry}\n"),
        })
        .collect()
}

/// The text prepended to every stage of one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPreamble {
    version: String,
    defines: String,
}

impl ShaderPreamble {
    /// Builds the preamble for a context and define list.
    pub fn new(settings: &ContextSettings, defines: &str) -> Self {
        Self {
            version: version_directive(settings),
            defines: define_block(defines),
        }
    }

    /// Returns the full source of a stage.
    pub fn apply(&self, code: &str) -> String {
        let mut source =
            String::with_capacity(self.version.len() + self.defines.len() + LINE_RESET.len() + code.len());
        source.push_str(&self.version);
        source.push_str(&self.defines);
        source.push_str(LINE_RESET);
        source.push_str(code);
        source
    }
}

/// A combined source file split into its stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedSource {
    /// Vertex stage code.
    pub vertex: String,
    /// Pixel stage code.
    pub pixel: String,
}

/// Splits a combined source on its section markers.
///
/// A line containing a marker (case-insensitive) switches the target stage and
/// is dropped. Lines before any marker belong to the vertex stage.
pub fn split_combined_source(text: &str) -> CombinedSource {
    let vertex_marker = VERTEX_SECTION_MARKER.to_ascii_lowercase();
    let pixel_marker = PIXEL_SECTION_MARKER.to_ascii_lowercase();

    let mut out = CombinedSource::default();
    let mut to_pixel = false;
    for line in text.lines() {
        let lowered = line.to_ascii_lowercase();
        if lowered.contains(&vertex_marker) {
            to_pixel = false;
        } else if lowered.contains(&pixel_marker) {
            to_pixel = true;
        } else {
            let target = if to_pixel { &mut out.pixel } else { &mut out.vertex };
            target.push_str(line);
            target.push('\n');
        }
    }
    out
}

/// A value written to a program constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstantValue<'a> {
    /// `int`
    Int(i32),
    /// `float`
    Float(f32),
    /// `vec2`
    Vec2([f32; 2]),
    /// `vec3`
    Vec3([f32; 3]),
    /// `vec4`
    Vec4([f32; 4]),
    /// `mat4`, column-major.
    Mat4([f32; 16]),
    /// `int[]`
    IntArray(&'a [i32]),
    /// `float[]`
    FloatArray(&'a [f32]),
    /// `vec2[]`
    Vec2Array(&'a [[f32; 2]]),
    /// `vec3[]`
    Vec3Array(&'a [[f32; 3]]),
    /// `vec4[]`
    Vec4Array(&'a [[f32; 4]]),
    /// `mat4[]`, column-major.
    Mat4Array(&'a [[f32; 16]]),
}

impl ConstantValue<'_> {
    /// Number of array elements (1 for scalars).
    pub fn count(&self) -> usize {
        match self {
            ConstantValue::Int(_)
            | ConstantValue::Float(_)
            | ConstantValue::Vec2(_)
            | ConstantValue::Vec3(_)
            | ConstantValue::Vec4(_)
            | ConstantValue::Mat4(_) => 1,
            ConstantValue::IntArray(v) => v.len(),
            ConstantValue::FloatArray(v) => v.len(),
            ConstantValue::Vec2Array(v) => v.len(),
            ConstantValue::Vec3Array(v) => v.len(),
            ConstantValue::Vec4Array(v) => v.len(),
            ConstantValue::Mat4Array(v) => v.len(),
        }
    }

    /// Float components flattened, or `None` for integer values.
    pub fn floats(&self) -> Option<&[f32]> {
        match self {
            ConstantValue::Int(_) | ConstantValue::IntArray(_) => None,
            ConstantValue::Float(v) => Some(std::slice::from_ref(v)),
            ConstantValue::Vec2(v) => Some(&v[..]),
            ConstantValue::Vec3(v) => Some(&v[..]),
            ConstantValue::Vec4(v) => Some(&v[..]),
            ConstantValue::Mat4(v) => Some(&v[..]),
            ConstantValue::FloatArray(v) => Some(*v),
            ConstantValue::Vec2Array(v) => Some(bytemuck::cast_slice(*v)),
            ConstantValue::Vec3Array(v) => Some(bytemuck::cast_slice(*v)),
            ConstantValue::Vec4Array(v) => Some(bytemuck::cast_slice(*v)),
            ConstantValue::Mat4Array(v) => Some(bytemuck::cast_slice(*v)),
        }
    }

    /// Integer components, or `None` for float values.
    pub fn ints(&self) -> Option<&[i32]> {
        match self {
            ConstantValue::Int(v) => Some(std::slice::from_ref(v)),
            ConstantValue::IntArray(v) => Some(*v),
            _ => None,
        }
    }
}

macro_rules! constant_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl<'a> From<$ty> for ConstantValue<'a> {
            fn from(value: $ty) -> Self {
                ConstantValue::$variant(value)
            }
        })*
    };
}

constant_from! {
    i32 => Int,
    f32 => Float,
    [f32; 2] => Vec2,
    [f32; 3] => Vec3,
    [f32; 4] => Vec4,
    [f32; 16] => Mat4,
    &'a [i32] => IntArray,
    &'a [f32] => FloatArray,
    &'a [[f32; 2]] => Vec2Array,
    &'a [[f32; 3]] => Vec3Array,
    &'a [[f32; 4]] => Vec4Array,
    &'a [[f32; 16]] => Mat4Array,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(major: u32, minor: u32, core: bool) -> ContextSettings {
        ContextSettings {
            major_version: major,
            minor_version: minor,
            core_profile: core,
            ..Default::default()
        }
    }

    #[test]
    fn version_directive_numbering() {
        assert_eq!(version_directive(&settings(4, 5, true)), "#version 450 core\n");
        assert_eq!(version_directive(&settings(3, 3, false)), "#version 330\n");
        assert_eq!(version_directive(&settings(3, 2, true)), "#version 150 core\n");
        assert_eq!(version_directive(&settings(3, 0, false)), "#version 130\n");
        assert_eq!(version_directive(&settings(2, 1, false)), "#version 120\n");
        assert_eq!(version_directive(&settings(2, 0, false)), "#version 110\n");
    }

    #[test]
    fn define_block_expansion() {
        assert_eq!(define_block(""), "");
        assert_eq!(define_block("SHADOWS"), "#define SHADOWS\n");
        assert_eq!(
            define_block("SHADOWS; MAX_LIGHTS=4;;"),
            "#define SHADOWS\n#define MAX_LIGHTS 4\n"
        );
    }

    #[test]
    fn preamble_order() {
        let preamble = ShaderPreamble::new(&settings(4, 5, true), "A");
        assert_eq!(
            preamble.apply("void main() {}\n"),
            "#version 450 core\n#define A\n#line 1\nvoid main() {}\n"
        );
    }

    #[test]
    fn combined_source_split() {
        let text = "// header\n@VertexShader\nvs line\n@pixelshader\nps line\n";
        let split = split_combined_source(text);
        assert_eq!(split.vertex, "// header\nvs line\n");
        assert_eq!(split.pixel, "ps line\n");
    }

    #[test]
    fn constant_value_views() {
        let matrices = [[0.0f32; 16]; 2];
        let value = ConstantValue::from(&matrices[..]);
        assert_eq!(value.count(), 2);
        assert_eq!(value.floats().map(<[f32]>::len), Some(32));
        assert_eq!(ConstantValue::from(3i32).ints(), Some(&[3][..]));
        assert!(ConstantValue::from(1.0f32).ints().is_none());
    }
}
