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

//! Vertex input layout description.

/// Data type of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexElementType {
    /// One 32-bit float.
    Float,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
}

impl VertexElementType {
    /// Number of components.
    pub fn component_count(self) -> u32 {
        match self {
            VertexElementType::Float => 1,
            VertexElementType::Float2 => 2,
            VertexElementType::Float3 => 3,
            VertexElementType::Float4 => 4,
        }
    }

    /// Size in bytes of one attribute value.
    pub fn size(self) -> u32 {
        self.component_count() * std::mem::size_of::<f32>() as u32
    }
}

/// One attribute of a vertex format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexElement {
    /// Data type of the attribute.
    pub element_type: VertexElementType,
    /// Shader input location.
    pub index: u32,
    /// Vertex buffer slot the attribute is read from.
    pub slot: u32,
    /// Byte offset inside one vertex of that slot.
    pub offset: u32,
    /// Whether integer data is normalized. Has no effect on float data.
    pub normalized: bool,
    /// Whether the attribute advances per instance instead of per vertex.
    pub per_instance: bool,
}

impl VertexElement {
    /// A per-vertex, non-normalized attribute.
    pub const fn new(element_type: VertexElementType, index: u32, slot: u32, offset: u32) -> Self {
        Self {
            element_type,
            index,
            slot,
            offset,
            normalized: false,
            per_instance: false,
        }
    }

    /// Marks the attribute as advancing once per instance.
    pub const fn per_instance(mut self) -> Self {
        self.per_instance = true;
        self
    }

    /// Marks the attribute as normalized.
    pub const fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_sizes() {
        assert_eq!(VertexElementType::Float.size(), 4);
        assert_eq!(VertexElementType::Float3.size(), 12);
        assert_eq!(VertexElementType::Float4.component_count(), 4);
    }

    #[test]
    fn builder_flags() {
        let element = VertexElement::new(VertexElementType::Float2, 1, 0, 12).per_instance();
        assert!(element.per_instance);
        assert!(!element.normalized);
        assert_eq!(element.offset, 12);
    }
}
