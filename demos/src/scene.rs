//! Builds the program and mesh for each demo and renders them.

use glsandbox_core::math::{Vec4, model_rotation};
use glsandbox_core::mesh::CpuMesh;
use glsandbox_core::mesh::generators::{
    generate_blob_quad, generate_color_triangle, generate_sphere, generate_torus,
};
use glsandbox_graphics::program::blob_settings_layout;
use glsandbox_graphics::{
    BlobParams, BlobProgram, Camera, DiffuseProgram, DiffuseUniforms, DrawStats, Framebuffer,
    GraphicsError, Light, LoadedStage, ProgramId, RotationProgram, ShaderComposer, ShadingProgram,
    StageContract, StageRegistry, UniformSet,
};

use crate::args::{CliMesh, DemoArgs};

/// Background behind every program.
pub const CLEAR_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.0, 1.0);

/// Mesh a program is drawn with.
pub fn mesh_for(args: &DemoArgs) -> CpuMesh {
    match args.program_id() {
        ProgramId::BlobUniforms | ProgramId::BlobBlock => generate_blob_quad(),
        ProgramId::RotatingTriangle => generate_color_triangle(),
        ProgramId::Diffuse => match args.mesh {
            CliMesh::Torus => generate_torus(0.7, 0.3, 60, 60),
            CliMesh::Sphere => generate_sphere(0.8, 64, 32),
        },
    }
}

/// Render the selected program into a new framebuffer.
///
/// Uniform values take the same route a GL host would: the loose-uniform
/// blob and the diffuse program go through their contract's uniform set, the
/// block programs through packed std140 bytes.
pub fn render(args: &DemoArgs) -> Result<(Framebuffer, DrawStats), GraphicsError> {
    let id = args.program_id();
    let contract = id.contract();
    contract.validate_linkage()?;
    contract.log_interface();

    let mesh = mesh_for(args);
    let mut fb = Framebuffer::new(args.width, args.height, CLEAR_COLOR)?;

    let stats = match id {
        ProgramId::BlobUniforms => {
            let mut uniforms = contract.uniform_set();
            BlobParams::default().write_uniforms(&mut uniforms)?;
            draw(&mut fb, &BlobProgram::from_uniforms(&uniforms)?, &mesh)?
        }
        ProgramId::BlobBlock => {
            let layout = blob_settings_layout();
            let mut uniforms = UniformSet::for_declarations(layout.declarations());
            BlobParams::default().write_uniforms(&mut uniforms)?;
            draw(&mut fb, &BlobProgram::from_block(&layout.pack(&uniforms)?)?, &mesh)?
        }
        ProgramId::RotatingTriangle => {
            let block = RotationProgram::with_angle(args.angle).block();
            let program = RotationProgram::from_block(bytemuck::bytes_of(&block))?;
            draw(&mut fb, &program, &mesh)?
        }
        ProgramId::Diffuse => {
            let camera = Camera::default();
            let aspect = args.width as f32 / args.height as f32;
            let computed = DiffuseUniforms::from_transforms(
                &model_rotation(args.angle_x, args.angle_y),
                &camera.view(),
                &camera.projection(aspect),
                Light::default(),
            )?;
            let mut uniforms = contract.uniform_set();
            computed.write_uniforms(&mut uniforms)?;
            let program = DiffuseProgram::new(DiffuseUniforms::from_uniforms(&uniforms)?);
            draw(&mut fb, &program, &mesh)?
        }
    };
    Ok((fb, stats))
}

fn draw<P: ShadingProgram>(
    fb: &mut Framebuffer,
    program: &P,
    mesh: &CpuMesh,
) -> Result<DrawStats, GraphicsError> {
    let stats = fb.draw(program, mesh)?;
    log::info!(
        "{}: {} triangles ({} culled), {} fragments",
        program.id().name(),
        stats.triangles,
        stats.culled,
        stats.fragments
    );
    Ok(stats)
}

/// Both stages of the selected program.
///
/// With `--shader-dir` the stage files are read from that directory and each
/// is checked against the program's stage contract; otherwise the built-in
/// copies are used.
pub fn program_stages(args: &DemoArgs) -> Result<[LoadedStage; 2], GraphicsError> {
    let contract = args.program_id().contract();
    let Some(dir) = &args.shader_dir else {
        return Ok([
            LoadedStage::builtin(contract.vertex.source),
            LoadedStage::builtin(contract.fragment.source),
        ]);
    };

    let mut registry = StageRegistry::new();
    for stage in [&contract.vertex, &contract.fragment] {
        let key = stage.source.path();
        registry.load_stage(key, dir.join(key), stage.stage)?;
    }

    let composer = ShaderComposer::with_standard_library();
    let checked = |stage: &StageContract| -> Result<LoadedStage, GraphicsError> {
        let key = stage.source.path();
        let loaded = registry
            .get_stage(key)
            .ok_or_else(|| GraphicsError::Internal(format!("stage {key} was not loaded")))?;
        stage.check_loaded(&composer, loaded)?;
        Ok(loaded.clone())
    };
    Ok([checked(&contract.vertex)?, checked(&contract.fragment)?])
}

/// Both stages of the selected program with includes expanded.
pub fn resolved_sources(args: &DemoArgs) -> Result<[(String, String); 2], GraphicsError> {
    let composer = ShaderComposer::with_standard_library();
    let [vertex, fragment] = program_stages(args)?;
    let resolve = |stage: LoadedStage| -> Result<(String, String), GraphicsError> {
        Ok((stage.path.display().to_string(), composer.resolve_glsl(&stage.source)?))
    };
    Ok([resolve(vertex)?, resolve(fragment)?])
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use glsandbox_graphics::StageSource;
    use rstest::rstest;

    use super::*;

    fn args(program: &str) -> DemoArgs {
        DemoArgs::try_parse_from([
            "shading_demo",
            "--program",
            program,
            "--width",
            "32",
            "--height",
            "24",
        ])
        .unwrap()
    }

    fn shader_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("glsandbox-demo-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[rstest]
    #[case::blob_uniforms("blob-uniforms")]
    #[case::blob_block("blob-block")]
    #[case::rotating_triangle("rotating-triangle")]
    #[case::diffuse("diffuse")]
    fn test_every_program_renders(#[case] program: &str) {
        let (fb, stats) = render(&args(program)).unwrap();
        assert_eq!((fb.width(), fb.height()), (32, 24));
        assert!(stats.fragments > 0);
    }

    #[test]
    fn test_blob_paths_render_identically() {
        let (a, _) = render(&args("blob-uniforms")).unwrap();
        let (b, _) = render(&args("blob-block")).unwrap();
        assert_eq!(a.to_image(), b.to_image());
    }

    #[test]
    fn test_resolved_sources_expand_includes() {
        let [(vert_path, vert), (frag_path, frag)] =
            resolved_sources(&args("diffuse")).unwrap();
        assert_eq!(vert_path, "diffuse.vert");
        assert_eq!(frag_path, "diffuse.frag");
        assert!(vert.contains("vec3 diffuse_intensity("));
        assert!(!frag.contains("#include"));
    }

    #[test]
    fn test_shader_dir_stages_are_checked() {
        let dir = shader_dir("edited");
        for source in [StageSource::RotationVert, StageSource::VertexColorFrag] {
            std::fs::write(dir.join(source.path()), source.source()).unwrap();
        }
        let mut args = args("rotating-triangle");
        args.shader_dir = Some(dir.clone());

        let [vert, frag] = program_stages(&args).unwrap();
        assert_eq!(vert.path, dir.join("rotation.vert"));
        assert_eq!(frag.source, StageSource::VertexColorFrag.source());

        let broken = StageSource::VertexColorFrag
            .source()
            .replace("in vec3 Color;", "in vec4 Color;");
        std::fs::write(dir.join("vertex_color.frag"), broken).unwrap();
        assert!(matches!(
            program_stages(&args),
            Err(GraphicsError::InterfaceMismatch(_))
        ));
    }

    #[test]
    fn test_missing_shader_dir_file_fails() {
        let mut args = args("diffuse");
        args.shader_dir = Some(shader_dir("empty"));
        assert!(matches!(
            program_stages(&args),
            Err(GraphicsError::ShaderCompilationFailed(_))
        ));
    }
}
