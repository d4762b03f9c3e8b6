//! Host-side uniform values.
//!
//! [`UniformValue`] is a tagged GLSL value, [`UniformSet`] a name-keyed
//! collection of them. A set created for a program stage only accepts the
//! names that stage declares; values for unknown names are logged and
//! dropped, values of the wrong type are rejected.

use std::collections::{BTreeMap, HashMap};

use glsandbox_core::math::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::error::GraphicsError;

/// GLSL types a uniform, attribute or varying can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlslType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Int,
    UInt,
    Bool,
    Mat2,
    Mat3,
    Mat4,
}

impl GlslType {
    /// GLSL keyword for this type.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Bool => "bool",
            Self::Mat2 => "mat2",
            Self::Mat3 => "mat3",
            Self::Mat4 => "mat4",
        }
    }

    /// Parse a GLSL keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "float" => Self::Float,
            "vec2" => Self::Vec2,
            "vec3" => Self::Vec3,
            "vec4" => Self::Vec4,
            "int" => Self::Int,
            "uint" => Self::UInt,
            "bool" => Self::Bool,
            "mat2" => Self::Mat2,
            "mat3" => Self::Mat3,
            "mat4" => Self::Mat4,
            _ => return None,
        })
    }

    /// Number of scalar components.
    pub fn components(self) -> usize {
        match self {
            Self::Float | Self::Int | Self::UInt | Self::Bool => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// Number of matrix columns, or `None` for scalars and vectors.
    pub fn columns(self) -> Option<usize> {
        match self {
            Self::Mat2 => Some(2),
            Self::Mat3 => Some(3),
            Self::Mat4 => Some(4),
            _ => None,
        }
    }

    /// std140 base alignment in bytes.
    ///
    /// Matrix columns are rounded up to vec4 alignment.
    pub fn std140_alignment(self) -> u32 {
        match self {
            Self::Float | Self::Int | Self::UInt | Self::Bool => 4,
            Self::Vec2 => 8,
            Self::Vec3 | Self::Vec4 | Self::Mat2 | Self::Mat3 | Self::Mat4 => 16,
        }
    }

    /// std140 size in bytes (matrix columns padded to 16 bytes each).
    pub fn std140_size(self) -> u32 {
        match self.columns() {
            Some(columns) => 16 * columns as u32,
            None => 4 * self.components() as u32,
        }
    }
}

impl std::fmt::Display for GlslType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A uniform value tagged with its GLSL type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Int(i32),
    UInt(u32),
    Bool(bool),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

impl UniformValue {
    /// GLSL type of this value.
    pub fn glsl_type(&self) -> GlslType {
        match self {
            Self::Float(_) => GlslType::Float,
            Self::Vec2(_) => GlslType::Vec2,
            Self::Vec3(_) => GlslType::Vec3,
            Self::Vec4(_) => GlslType::Vec4,
            Self::Int(_) => GlslType::Int,
            Self::UInt(_) => GlslType::UInt,
            Self::Bool(_) => GlslType::Bool,
            Self::Mat2(_) => GlslType::Mat2,
            Self::Mat3(_) => GlslType::Mat3,
            Self::Mat4(_) => GlslType::Mat4,
        }
    }

    /// Write the value in std140 form at the start of `out`.
    ///
    /// Fails if `out` is shorter than `glsl_type().std140_size()`. Matrix
    /// padding bytes are left untouched; booleans are written as 0 / 1.
    pub fn write_std140(&self, out: &mut [u8]) -> Result<(), GraphicsError> {
        let size = self.glsl_type().std140_size() as usize;
        if out.len() < size {
            return Err(GraphicsError::InvalidParameter(format!(
                "{} needs {size} bytes, buffer has {}",
                self.glsl_type(),
                out.len()
            )));
        }
        match self {
            Self::Float(v) => write_floats(out, &[*v]),
            Self::Vec2(v) => write_floats(out, v.as_slice()),
            Self::Vec3(v) => write_floats(out, v.as_slice()),
            Self::Vec4(v) => write_floats(out, v.as_slice()),
            Self::Int(v) => out[..4].copy_from_slice(bytemuck::bytes_of(v)),
            Self::UInt(v) => out[..4].copy_from_slice(bytemuck::bytes_of(v)),
            Self::Bool(v) => out[..4].copy_from_slice(bytemuck::bytes_of(&u32::from(*v))),
            Self::Mat2(m) => write_columns(out, m.as_slice(), 2),
            Self::Mat3(m) => write_columns(out, m.as_slice(), 3),
            Self::Mat4(m) => write_columns(out, m.as_slice(), 4),
        }
        Ok(())
    }

    /// Read a std140-encoded value of type `ty` from the start of `bytes`.
    ///
    /// Returns `None` if `bytes` is shorter than the std140 size.
    pub fn read_std140(ty: GlslType, bytes: &[u8]) -> Option<Self> {
        if bytes.len() < ty.std140_size() as usize {
            return None;
        }
        let f = |i: usize| bytemuck::pod_read_unaligned::<f32>(&bytes[i * 4..i * 4 + 4]);
        // Column-major read skipping the vec4 padding of each column.
        let col = |c: usize, r: usize| f(c * 4 + r);

        Some(match ty {
            GlslType::Float => Self::Float(f(0)),
            GlslType::Vec2 => Self::Vec2(Vec2::new(f(0), f(1))),
            GlslType::Vec3 => Self::Vec3(Vec3::new(f(0), f(1), f(2))),
            GlslType::Vec4 => Self::Vec4(Vec4::new(f(0), f(1), f(2), f(3))),
            GlslType::Int => Self::Int(bytemuck::pod_read_unaligned(&bytes[..4])),
            GlslType::UInt => Self::UInt(bytemuck::pod_read_unaligned(&bytes[..4])),
            GlslType::Bool => Self::Bool(bytemuck::pod_read_unaligned::<u32>(&bytes[..4]) != 0),
            GlslType::Mat2 => Self::Mat2(Mat2::from_fn(|r, c| col(c, r))),
            GlslType::Mat3 => Self::Mat3(Mat3::from_fn(|r, c| col(c, r))),
            GlslType::Mat4 => Self::Mat4(Mat4::from_fn(|r, c| col(c, r))),
        })
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec4(&self) -> Option<Vec4> {
        match self {
            Self::Vec4(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_mat3(&self) -> Option<Mat3> {
        match self {
            Self::Mat3(m) => Some(*m),
            _ => None,
        }
    }

    pub fn as_mat4(&self) -> Option<Mat4> {
        match self {
            Self::Mat4(m) => Some(*m),
            _ => None,
        }
    }
}

fn write_floats(out: &mut [u8], values: &[f32]) {
    let bytes: &[u8] = bytemuck::cast_slice(values);
    out[..bytes.len()].copy_from_slice(bytes);
}

fn write_columns(out: &mut [u8], column_major: &[f32], columns: usize) {
    let rows = column_major.len() / columns;
    for (c, column) in column_major.chunks_exact(rows).enumerate() {
        write_floats(&mut out[c * 16..], column);
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_value!(
    f32 => Float,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    i32 => Int,
    u32 => UInt,
    bool => Bool,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
);

/// Name-keyed uniform values for one draw call.
///
/// A set built with [`UniformSet::for_declarations`] knows the declared type
/// of each name; [`UniformSet::new`] accepts anything.
#[derive(Debug, Clone, Default)]
pub struct UniformSet {
    declared: Option<HashMap<String, GlslType>>,
    values: BTreeMap<String, UniformValue>,
}

impl UniformSet {
    /// Create an unrestricted set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set that accepts only the given names and types.
    pub fn for_declarations<'a>(declarations: impl IntoIterator<Item = (&'a str, GlslType)>) -> Self {
        Self {
            declared: Some(
                declarations
                    .into_iter()
                    .map(|(name, ty)| (name.to_string(), ty))
                    .collect(),
            ),
            values: BTreeMap::new(),
        }
    }

    /// Set a uniform value.
    ///
    /// Unknown names are logged and ignored. A value whose type differs from
    /// the declaration is an error and leaves the set unchanged.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<(), GraphicsError> {
        let value = value.into();
        if let Some(declared) = &self.declared {
            let Some(expected) = declared.get(name) else {
                log::warn!("Shader program has no uniform with name \"{name}\"");
                return Ok(());
            };
            if *expected != value.glsl_type() {
                return Err(GraphicsError::UniformTypeMismatch {
                    name: name.to_string(),
                    expected: expected.keyword(),
                    found: value.glsl_type().keyword(),
                });
            }
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Builder form of [`UniformSet::set`].
    pub fn with(mut self, name: &str, value: impl Into<UniformValue>) -> Result<Self, GraphicsError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Get a value by name.
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    /// Get a value by name, failing with [`GraphicsError::MissingUniform`].
    pub fn require(&self, name: &str) -> Result<&UniformValue, GraphicsError> {
        self.values
            .get(name)
            .ok_or_else(|| GraphicsError::MissingUniform(name.to_string()))
    }

    /// Get a value by name and check its type.
    pub fn require_typed(&self, name: &str, ty: GlslType) -> Result<UniformValue, GraphicsError> {
        let value = *self.require(name)?;
        if value.glsl_type() != ty {
            return Err(GraphicsError::UniformTypeMismatch {
                name: name.to_string(),
                expected: ty.keyword(),
                found: value.glsl_type().keyword(),
            });
        }
        Ok(value)
    }

    /// Check whether a name is declared (always true for unrestricted sets).
    pub fn accepts(&self, name: &str) -> bool {
        self.declared
            .as_ref()
            .is_none_or(|declared| declared.contains_key(name))
    }

    /// Number of values set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value has been set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_std140_sizes() {
        assert_eq!(GlslType::Float.std140_size(), 4);
        assert_eq!(GlslType::Vec3.std140_size(), 12);
        assert_eq!(GlslType::Vec3.std140_alignment(), 16);
        assert_eq!(GlslType::Mat3.std140_size(), 48);
        assert_eq!(GlslType::Mat4.std140_size(), 64);
        assert_eq!(GlslType::Mat2.std140_size(), 32);
    }

    #[test]
    fn test_keyword_roundtrip() {
        for ty in [
            GlslType::Float,
            GlslType::Vec4,
            GlslType::UInt,
            GlslType::Bool,
            GlslType::Mat3,
        ] {
            assert_eq!(GlslType::from_keyword(ty.keyword()), Some(ty));
        }
        assert_eq!(GlslType::from_keyword("double"), None);
    }

    #[test]
    fn test_mat3_write_pads_columns() {
        let m = Mat3::new(1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0);
        let mut bytes = vec![0u8; 48];
        UniformValue::Mat3(m).write_std140(&mut bytes).unwrap();

        let floats: &[f32] = bytemuck::cast_slice(&bytes);
        assert_eq!(&floats[0..4], &[1.0, 4.0, 7.0, 0.0]);
        assert_eq!(&floats[4..8], &[2.0, 5.0, 8.0, 0.0]);
        assert_eq!(&floats[8..12], &[3.0, 6.0, 9.0, 0.0]);

        assert_eq!(
            UniformValue::read_std140(GlslType::Mat3, &bytes),
            Some(UniformValue::Mat3(m))
        );
    }

    #[test]
    fn test_bool_written_as_u32() {
        let mut bytes = vec![0xffu8; 4];
        UniformValue::Bool(true).write_std140(&mut bytes).unwrap();
        assert_eq!(bytes, 1u32.to_ne_bytes());
        UniformValue::Bool(false).write_std140(&mut bytes).unwrap();
        assert_eq!(bytes, 0u32.to_ne_bytes());
    }

    #[test]
    fn test_write_short_buffer() {
        let mut bytes = vec![0u8; 40];
        let err = UniformValue::Mat3(Mat3::identity())
            .write_std140(&mut bytes)
            .unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidParameter(_)));
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_read_short_buffer() {
        assert!(UniformValue::read_std140(GlslType::Vec4, &[0u8; 12]).is_none());
    }

    #[test]
    fn test_unknown_uniform_is_ignored() {
        let mut set = UniformSet::for_declarations([("Kd", GlslType::Vec3)]);
        set.set("kd_typo", Vec3::new(1.0, 1.0, 1.0)).unwrap();
        assert!(set.is_empty());
        assert!(!set.accepts("kd_typo"));
    }

    #[test]
    fn test_type_mismatch_is_error() {
        let mut set = UniformSet::for_declarations([("Kd", GlslType::Vec3)]);
        let err = set.set("Kd", 1.0f32).unwrap_err();
        assert_eq!(
            err,
            GraphicsError::UniformTypeMismatch {
                name: "Kd".to_string(),
                expected: "vec3",
                found: "float",
            }
        );
        assert!(set.get("Kd").is_none());
    }

    #[test]
    fn test_unrestricted_set_accepts_anything() {
        let set = UniformSet::new()
            .with("anything", 3i32)
            .unwrap()
            .with("other", Vec4::zeros())
            .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("anything"), Some(&UniformValue::Int(3)));
    }

    #[test]
    fn test_require_missing() {
        let set = UniformSet::new();
        assert_eq!(
            set.require("MVP").unwrap_err(),
            GraphicsError::MissingUniform("MVP".to_string())
        );
    }
}
