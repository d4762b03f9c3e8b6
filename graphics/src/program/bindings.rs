//! Shader stages and the uniform binding layout a program expects.

/// Shader stage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader.
    Vertex,
    /// Fragment shader.
    Fragment,
    /// Compute shader.
    Compute,
}

impl ShaderStage {
    /// Visibility flag for this stage.
    pub fn flags(self) -> ShaderStageFlags {
        match self {
            Self::Vertex => ShaderStageFlags::VERTEX,
            Self::Fragment => ShaderStageFlags::FRAGMENT,
            Self::Compute => ShaderStageFlags::COMPUTE,
        }
    }

    /// Preprocessor macro defined while composing this stage.
    pub fn define(self) -> &'static str {
        match self {
            Self::Vertex => "VERTEX",
            Self::Fragment => "FRAGMENT",
            Self::Compute => "COMPUTE",
        }
    }

    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
            Self::Compute => naga::ShaderStage::Compute,
        }
    }
}

/// Type of resource that can be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    /// Uniform block backed by a buffer.
    UniformBuffer,

    /// Individually located uniform variable (`layout(location = N) uniform`).
    LooseUniform,
}

/// Describes a single binding slot in a layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingLayoutEntry {
    /// Binding index for blocks, location for loose uniforms.
    pub binding: u32,

    /// Type of resource expected at this binding.
    pub binding_type: BindingType,

    /// Shader stages that can access this binding.
    pub visibility: ShaderStageFlags,

    /// Optional label for debugging.
    pub label: Option<String>,
}

impl BindingLayoutEntry {
    /// Create a new binding layout entry.
    pub fn new(binding: u32, binding_type: BindingType) -> Self {
        Self {
            binding,
            binding_type,
            visibility: ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT,
            label: None,
        }
    }

    /// Set the shader stage visibility.
    pub fn with_visibility(mut self, visibility: ShaderStageFlags) -> Self {
        self.visibility = visibility;
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

bitflags::bitflags! {
    /// Shader stages that can access a binding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        /// Vertex shader stage.
        const VERTEX = 1 << 0;
        /// Fragment shader stage.
        const FRAGMENT = 1 << 1;
        /// Compute shader stage.
        const COMPUTE = 1 << 2;
    }
}

/// Describes the uniform bindings of one program stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingLayout {
    /// The binding entries in this layout.
    pub entries: Vec<BindingLayoutEntry>,

    /// Optional label for debugging.
    pub label: Option<String>,
}

impl BindingLayout {
    /// Create a new empty binding layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding entry to the layout.
    pub fn with_entry(mut self, entry: BindingLayoutEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add a uniform buffer binding.
    pub fn with_uniform_buffer(self, binding: u32) -> Self {
        self.with_entry(BindingLayoutEntry::new(binding, BindingType::UniformBuffer))
    }

    /// Add a loose uniform at an explicit location.
    pub fn with_loose_uniform(self, location: u32) -> Self {
        self.with_entry(BindingLayoutEntry::new(location, BindingType::LooseUniform))
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Find the entry of a given type at a binding index.
    pub fn find(&self, binding_type: BindingType, binding: u32) -> Option<&BindingLayoutEntry> {
        self.entries
            .iter()
            .find(|e| e.binding_type == binding_type && e.binding == binding)
    }

    /// Check that no two entries of the same type share a binding index.
    pub fn validate(&self) -> Result<(), String> {
        for (i, a) in self.entries.iter().enumerate() {
            for b in &self.entries[i + 1..] {
                if a.binding_type == b.binding_type && a.binding == b.binding {
                    return Err(format!(
                        "{:?} binding {} declared twice ({:?} and {:?})",
                        a.binding_type, a.binding, a.label, b.label
                    ));
                }
            }
        }
        Ok(())
    }
}
