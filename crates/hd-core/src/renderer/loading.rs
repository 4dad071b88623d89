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

//! Texture and program creation from streams and files.

use super::api::*;
use super::context::{logged, RenderContext};
use super::error::{ContractViolation, RenderResult};
use super::registry::*;
use super::traits::RenderBackend;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// An image decoded to tightly packed RGBA8.
struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

fn decode(mut reader: impl Read) -> RenderResult<DecodedImage> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let rgba = image::load_from_memory(&bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

fn layer_count(len: usize) -> Result<u32, ContractViolation> {
    u32::try_from(len).map_err(|_| ContractViolation::TooManyLayers(len))
}

fn open(path: &Path) -> RenderResult<BufReader<File>> {
    log::debug!("Loading '{}'", path.display());
    Ok(BufReader::new(File::open(path)?))
}

fn stream_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl<B: RenderBackend> RenderContext<B> {
    /// Decodes an image from `reader` into an RGBA8 2D texture.
    pub fn create_texture_2d_from_reader(&mut self, reader: impl Read) -> RenderResult<Texture2DHandle> {
        let result = decode(reader);
        match logged("create_texture_2d_from_reader", result) {
            Ok(image) => self.create_texture_2d(Some(&image.pixels), image.width, image.height, TextureFormat::Rgba8),
            Err(err) => Err(err),
        }
    }

    /// Decodes an image file into an RGBA8 2D texture.
    pub fn create_texture_2d_from_file(&mut self, path: impl AsRef<Path>) -> RenderResult<Texture2DHandle> {
        let result = open(path.as_ref());
        match logged("create_texture_2d_from_file", result) {
            Ok(reader) => self.create_texture_2d_from_reader(reader),
            Err(err) => Err(err),
        }
    }

    /// Builds an RGBA8 texture array with one layer per image file.
    ///
    /// Every image must have the size of the first one.
    pub fn create_texture_2d_array_from_files<P: AsRef<Path>>(
        &mut self,
        paths: &[P],
    ) -> RenderResult<Texture2DArrayHandle> {
        let result = Self::decode_layers(paths);
        match logged("create_texture_2d_array_from_files", result) {
            Ok((width, height, layers, pixels)) => {
                self.create_texture_2d_array(Some(&pixels), width, height, TextureFormat::Rgba8, layers)
            }
            Err(err) => Err(err),
        }
    }

    fn decode_layers<P: AsRef<Path>>(paths: &[P]) -> RenderResult<(u32, u32, u32, Vec<u8>)> {
        let layers = layer_count(paths.len())?;
        let mut size = None;
        let mut pixels = Vec::new();
        for path in paths {
            let image = decode(open(path.as_ref())?)?;
            let (width, height) = *size.get_or_insert((image.width, image.height));
            if (image.width, image.height) != (width, height) {
                return Err(ContractViolation::ImageSizeMismatch {
                    width: image.width,
                    height: image.height,
                    expected_width: width,
                    expected_height: height,
                }
                .into());
            }
            pixels.extend_from_slice(&image.pixels);
        }
        let Some((width, height)) = size else {
            return Err(ContractViolation::ZeroDimensions {
                width: 0,
                height: 0,
                layers: 0,
            }
            .into());
        };
        Ok((width, height, layers, pixels))
    }

    /// Replaces one layer of a texture array with an image decoded from `reader`.
    pub fn set_texture_2d_array_layer_data_from_reader(
        &mut self,
        handle: Texture2DArrayHandle,
        layer: u32,
        reader: impl Read,
    ) -> RenderResult<()> {
        let result = self.decode_layer(handle, reader);
        match logged("set_texture_2d_array_layer_data_from_reader", result) {
            Ok(pixels) => self.set_texture_2d_array_layer_data(handle, layer, &pixels),
            Err(err) => Err(err),
        }
    }

    fn decode_layer(&self, handle: Texture2DArrayHandle, reader: impl Read) -> RenderResult<Vec<u8>> {
        let desc = self.registry.texture_2d_arrays.get(handle)?.desc;
        let image = decode(reader)?;
        if (image.width, image.height) != (desc.width, desc.height) {
            return Err(ContractViolation::ImageSizeMismatch {
                width: image.width,
                height: image.height,
                expected_width: desc.width,
                expected_height: desc.height,
            }
            .into());
        }
        Ok(image.pixels)
    }

    /// Replaces one layer of a texture array with a decoded image file.
    pub fn set_texture_2d_array_layer_data_from_file(
        &mut self,
        handle: Texture2DArrayHandle,
        layer: u32,
        path: impl AsRef<Path>,
    ) -> RenderResult<()> {
        let result = open(path.as_ref());
        match logged("set_texture_2d_array_layer_data_from_file", result) {
            Ok(reader) => self.set_texture_2d_array_layer_data_from_reader(handle, layer, reader),
            Err(err) => Err(err),
        }
    }

    /// Builds a program from a combined source split by
    /// `@VertexShader` / `@PixelShader` markers.
    pub fn create_program_from_reader(
        &mut self,
        name: &str,
        mut reader: impl Read,
        defines: &str,
    ) -> RenderResult<ProgramHandle> {
        let mut text = String::new();
        let result = reader.read_to_string(&mut text).map_err(Into::into);
        logged("create_program_from_reader", result)?;
        let source = shader::split_combined_source(&text);
        self.create_program(name, &source.vertex, &source.pixel, defines)
    }

    /// Builds a program from a combined source file. The program is named after the file.
    pub fn create_program_from_file(&mut self, path: impl AsRef<Path>, defines: &str) -> RenderResult<ProgramHandle> {
        let path = path.as_ref();
        let result = open(path);
        let reader = logged("create_program_from_file", result)?;
        self.create_program_from_reader(&stream_name(path), reader, defines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::backends::{HeadlessBackend, HeadlessWindow};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::{Cursor, Write};

    fn png_bytes(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn context() -> RenderContext<HeadlessBackend> {
        let window = HeadlessWindow::new("loading", 64, 64);
        let mut context = RenderContext::new();
        context.create(&window).unwrap();
        context
    }

    #[test]
    fn texture_from_reader_is_rgba8() {
        let mut context = context();
        let bytes = png_bytes(4, 2, [10, 20, 30, 255]);

        let texture = context.create_texture_2d_from_reader(Cursor::new(bytes)).unwrap();

        let record = *context.registry().texture_2d(texture).unwrap();
        assert_eq!((record.desc.width, record.desc.height), (4, 2));
        assert_eq!(record.desc.format, TextureFormat::Rgba8);
        let contents = context.backend().unwrap().texture_contents(record.native).unwrap();
        assert_eq!(&contents[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn undecodable_stream_is_an_image_error() {
        let mut context = context();
        let result = context.create_texture_2d_from_reader(Cursor::new(b"not an image".to_vec()));
        assert!(matches!(result, Err(crate::RenderError::Image(_))));
        assert_eq!(context.registry().counts().total(), 0);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let mut context = context();
        let result = context.create_texture_2d_from_file("does/not/exist.png");
        assert!(matches!(result, Err(crate::RenderError::Io(_))));
    }

    #[test]
    fn layer_count_must_fit_a_u32() {
        assert_eq!(layer_count(3), Ok(3));
        assert_eq!(layer_count(u32::MAX as usize), Ok(u32::MAX));
        let past = (u32::MAX as usize).saturating_add(1);
        if past > u32::MAX as usize {
            assert_eq!(layer_count(past), Err(ContractViolation::TooManyLayers(past)));
        }
    }

    #[test]
    fn array_from_files_requires_matching_sizes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        let c = dir.path().join("c.png");
        std::fs::write(&a, png_bytes(2, 2, [255, 0, 0, 255])).unwrap();
        std::fs::write(&b, png_bytes(2, 2, [0, 255, 0, 255])).unwrap();
        std::fs::write(&c, png_bytes(4, 4, [0, 0, 255, 255])).unwrap();
        let mut context = context();

        let array = context.create_texture_2d_array_from_files(&[&a, &b]).unwrap();
        assert_eq!(context.registry().texture_2d_array(array).unwrap().desc.layers, 2);

        let mismatched = context.create_texture_2d_array_from_files(&[&a, &c]);
        assert!(matches!(
            mismatched.unwrap_err().as_contract(),
            Some(ContractViolation::ImageSizeMismatch { width: 4, .. })
        ));
    }

    #[test]
    fn layer_from_reader_replaces_one_layer() {
        let mut context = context();
        let array = context
            .create_texture_2d_array(None, 2, 2, TextureFormat::Rgba8, 3)
            .unwrap();

        context
            .set_texture_2d_array_layer_data_from_reader(array, 1, Cursor::new(png_bytes(2, 2, [9, 9, 9, 9])))
            .unwrap();

        let native = context.registry().texture_2d_array(array).unwrap().native;
        let contents = context.backend().unwrap().texture_contents(native).unwrap();
        assert!(contents[..16].iter().all(|&b| b == 0));
        assert!(contents[16..32].iter().all(|&b| b == 9));
        assert!(contents[32..].iter().all(|&b| b == 0));
    }

    #[test]
    fn program_from_file_is_named_after_the_file() {
        let mut file = tempfile::Builder::new().suffix(".glsl").tempfile().unwrap();
        writeln!(
            file,
            "@VertexShader\nvoid main() {{ gl_Position = vec4(0.0); }}\n@PixelShader\nvoid main() {{ }}"
        )
        .unwrap();
        let mut context = context();

        let program = context.create_program_from_file(file.path(), "").unwrap();

        let expected = file.path().file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(context.registry().program(program).unwrap().name, expected);
    }
}
