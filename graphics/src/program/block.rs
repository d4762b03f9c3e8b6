//! std140 uniform block layouts.

use crate::error::GraphicsError;

use super::uniforms::{GlslType, UniformSet, UniformValue};

/// One member of a uniform block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockField {
    /// Member name as declared in GLSL.
    pub name: String,
    /// Member type.
    pub ty: GlslType,
    /// Byte offset from the start of the block.
    pub offset: u32,
}

/// Layout of a `layout(std140, binding = N) uniform Name { ... }` block.
///
/// Field offsets are computed from the field types as they are added, so the
/// declaration order must match the GLSL source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBlockLayout {
    /// Block name.
    pub name: String,
    /// Binding index.
    pub binding: u32,
    fields: Vec<BlockField>,
    end: u32,
}

fn align_up(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}

impl UniformBlockLayout {
    /// Create an empty block layout.
    pub fn new(name: impl Into<String>, binding: u32) -> Self {
        Self {
            name: name.into(),
            binding,
            fields: Vec::new(),
            end: 0,
        }
    }

    /// Append a field, placing it at the next std140-aligned offset.
    pub fn with_field(mut self, name: impl Into<String>, ty: GlslType) -> Self {
        let offset = align_up(self.end, ty.std140_alignment());
        self.end = offset + ty.std140_size();
        self.fields.push(BlockField {
            name: name.into(),
            ty,
            offset,
        });
        self
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[BlockField] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&BlockField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Total block size, rounded up to a multiple of 16.
    pub fn size(&self) -> u32 {
        align_up(self.end, 16)
    }

    /// Field names and types, for building a [`UniformSet`].
    pub fn declarations(&self) -> impl Iterator<Item = (&str, GlslType)> {
        self.fields.iter().map(|f| (f.name.as_str(), f.ty))
    }

    /// Pack the block's fields from a uniform set into std140 bytes.
    ///
    /// Every field must be present with its declared type. Padding is zero.
    pub fn pack(&self, uniforms: &UniformSet) -> Result<Vec<u8>, GraphicsError> {
        let mut bytes = vec![0u8; self.size() as usize];
        for field in &self.fields {
            let value = uniforms.require_typed(&field.name, field.ty)?;
            value.write_std140(&mut bytes[field.offset as usize..])?;
        }
        log::debug!(
            "Packed uniform block {} ({} bytes, {} fields)",
            self.name,
            bytes.len(),
            self.fields.len()
        );
        Ok(bytes)
    }

    /// Read one field back from packed block bytes.
    pub fn read(&self, bytes: &[u8], field: &str) -> Result<UniformValue, GraphicsError> {
        let field = self
            .field(field)
            .ok_or_else(|| GraphicsError::MissingUniform(format!("{}.{field}", self.name)))?;
        bytes
            .get(field.offset as usize..)
            .and_then(|tail| UniformValue::read_std140(field.ty, tail))
            .ok_or_else(|| {
                GraphicsError::InvalidParameter(format!(
                    "block {} data is {} bytes, field {} needs {}",
                    self.name,
                    bytes.len(),
                    field.name,
                    field.offset + field.ty.std140_size()
                ))
            })
    }

    /// Unpack every field into a uniform set.
    pub fn unpack(&self, bytes: &[u8]) -> Result<UniformSet, GraphicsError> {
        let mut set = UniformSet::for_declarations(self.declarations());
        for field in &self.fields {
            set.set(&field.name, self.read(bytes, &field.name)?)?;
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use glsandbox_core::math::{Vec3, Vec4};

    use super::*;

    fn light_info() -> UniformBlockLayout {
        UniformBlockLayout::new("LightInfo", 1)
            .with_field("LightPosition", GlslType::Vec4)
            .with_field("Kd", GlslType::Vec3)
            .with_field("Ld", GlslType::Vec3)
    }

    #[test]
    fn test_blob_settings_offsets() {
        let layout = UniformBlockLayout::new("BlobSettings", 0)
            .with_field("InnerColor", GlslType::Vec4)
            .with_field("OuterColor", GlslType::Vec4)
            .with_field("RadiusInner", GlslType::Float)
            .with_field("RadiusOuter", GlslType::Float);

        let offsets: Vec<u32> = layout.fields().iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 16, 32, 36]);
        assert_eq!(layout.size(), 48);
    }

    #[test]
    fn test_vec3_aligns_to_16() {
        let layout = light_info();
        assert_eq!(layout.field("Kd").unwrap().offset, 16);
        assert_eq!(layout.field("Ld").unwrap().offset, 32);
        assert_eq!(layout.size(), 48);
    }

    #[test]
    fn test_float_packs_after_vec3() {
        let layout = UniformBlockLayout::new("Packed", 0)
            .with_field("Direction", GlslType::Vec3)
            .with_field("Strength", GlslType::Float);
        assert_eq!(layout.field("Strength").unwrap().offset, 12);
        assert_eq!(layout.size(), 16);
    }

    #[test]
    fn test_matrices_offsets() {
        let layout = UniformBlockLayout::new("Matrices", 0)
            .with_field("ModelViewMatrix", GlslType::Mat4)
            .with_field("NormalMatrix", GlslType::Mat3)
            .with_field("ProjectionMatrix", GlslType::Mat4)
            .with_field("MVP", GlslType::Mat4);
        let offsets: Vec<u32> = layout.fields().iter().map(|f| f.offset).collect();
        assert_eq!(offsets, vec![0, 64, 112, 176]);
        assert_eq!(layout.size(), 240);
    }

    #[test]
    fn test_pack_and_read_field() {
        let layout = light_info();
        let set = UniformSet::for_declarations(layout.declarations())
            .with("LightPosition", Vec4::new(5.0, 5.0, 2.0, 1.0))
            .unwrap()
            .with("Kd", Vec3::new(0.9, 0.5, 0.3))
            .unwrap()
            .with("Ld", Vec3::new(1.0, 1.0, 1.0))
            .unwrap();

        let bytes = layout.pack(&set).unwrap();
        assert_eq!(bytes.len(), 48);
        // Padding after Kd stays zero.
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
        assert_eq!(
            layout.read(&bytes, "Kd").unwrap(),
            UniformValue::Vec3(Vec3::new(0.9, 0.5, 0.3))
        );

        let unpacked = layout.unpack(&bytes).unwrap();
        assert_eq!(unpacked.get("Ld"), set.get("Ld"));
    }

    #[test]
    fn test_pack_missing_field() {
        let layout = light_info();
        let set = UniformSet::new().with("Kd", Vec3::zeros()).unwrap();
        assert_eq!(
            layout.pack(&set).unwrap_err(),
            GraphicsError::MissingUniform("LightPosition".to_string())
        );
    }

    #[test]
    fn test_read_truncated() {
        let layout = light_info();
        assert!(matches!(
            layout.read(&[0u8; 40], "Ld"),
            Err(GraphicsError::InvalidParameter(_))
        ));
        assert!(matches!(
            layout.read(&[0u8; 48], "Nope"),
            Err(GraphicsError::MissingUniform(_))
        ));
    }
}
