use glam::{ Mat3, Vec3 };
use glow::HasContext;

use super::gl_state::{ set_capability, GlStateSnapshot };
use crate::engine::components::{ Camera, Mesh, NodeId, SceneGraph };
use crate::engine::error::{ SceneError, SceneResult };

const VERTEX_BODY: &str = r#"
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

uniform mat4 u_model;
uniform mat4 u_view_proj;
uniform mat3 u_normal_matrix;

out vec3 v_normal;
out vec3 v_world;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world = world.xyz;
    v_normal = u_normal_matrix * a_normal;
    gl_Position = u_view_proj * world;
}
"#;

const FRAGMENT_BODY: &str = r#"
in vec3 v_normal;
in vec3 v_world;

uniform vec4 u_color;
uniform vec3 u_emissive;
uniform int u_flat;
uniform vec3 u_light_dir;

out vec4 frag_color;

void main() {
    vec3 normal = u_flat == 1
        ? normalize(cross(dFdx(v_world), dFdy(v_world)))
        : normalize(v_normal);
    float diffuse = max(dot(normal, -u_light_dir), 0.0);
    vec3 lit = u_color.rgb * (0.55 + 0.6 * diffuse) + u_emissive;
    frag_color = vec4(min(lit, vec3(1.0)), u_color.a);
}
"#;

/// GLSL preamble for the context flavour Slint hands us
pub fn shader_header(is_embedded: bool) -> &'static str {
    if is_embedded {
        "#version 300 es\nprecision highp float;\n"
    } else {
        "#version 330 core\n"
    }
}

/// Mesh instances under `root`, opaque ones first so blended ones composite over them
pub fn draw_order(graph: &SceneGraph, root: NodeId) -> Vec<(NodeId, usize)> {
    let is_transparent = |mesh: usize| {
        graph.materials
            .get(graph.meshes[mesh].material)
            .is_some_and(|m| m.transparent)
    };
    let (opaque, blended): (Vec<_>, Vec<_>) = graph
        .mesh_instances(root)
        .into_iter()
        .partition(|(_, mesh)| !is_transparent(*mesh));
    opaque.into_iter().chain(blended).collect()
}

struct GpuMesh {
    vao: glow::VertexArray,
    buffers: [glow::Buffer; 3],
    index_count: i32,
}

/// GPU buffers for every mesh of one scene graph, indexed like `SceneGraph::meshes`
pub struct GpuScene {
    meshes: Vec<Option<GpuMesh>>,
}

impl GpuScene {
    pub fn mesh_count(&self) -> usize {
        self.meshes.iter().flatten().count()
    }
}

struct Uniforms {
    model: Option<glow::UniformLocation>,
    view_proj: Option<glow::UniformLocation>,
    normal_matrix: Option<glow::UniformLocation>,
    color: Option<glow::UniformLocation>,
    emissive: Option<glow::UniformLocation>,
    flat: Option<glow::UniformLocation>,
    light_dir: Option<glow::UniformLocation>,
}

/// Draws scene graphs underneath the Slint UI
pub struct SceneRenderer {
    gl: glow::Context,
    program: glow::Program,
    uniforms: Uniforms,
    clear_color: [f32; 4],
    light_dir: Vec3,
    saved_state: Option<GlStateSnapshot>,
}

impl SceneRenderer {
    pub fn new(gl: glow::Context) -> SceneResult<Self> {
        let header = shader_header(gl.version().is_embedded);
        let program = unsafe {
            create_program(
                &gl,
                &format!("{header}{VERTEX_BODY}"),
                &format!("{header}{FRAGMENT_BODY}")
            )?
        };

        let uniforms = unsafe {
            Uniforms {
                model: gl.get_uniform_location(program, "u_model"),
                view_proj: gl.get_uniform_location(program, "u_view_proj"),
                normal_matrix: gl.get_uniform_location(program, "u_normal_matrix"),
                color: gl.get_uniform_location(program, "u_color"),
                emissive: gl.get_uniform_location(program, "u_emissive"),
                flat: gl.get_uniform_location(program, "u_flat"),
                light_dir: gl.get_uniform_location(program, "u_light_dir"),
            }
        };

        log::info!("[UNDERLAY] Scene shader ready ({})", header.lines().next().unwrap_or_default());

        Ok(Self {
            gl,
            program,
            uniforms,
            clear_color: [0.04, 0.05, 0.07, 1.0],
            light_dir: Vec3::new(-0.4, -1.0, -0.6).normalize(),
            saved_state: None,
        })
    }

    pub fn set_clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.clear_color = [r, g, b, a];
    }

    pub fn upload(&self, graph: &SceneGraph) -> SceneResult<GpuScene> {
        let meshes = upload_each(
            &graph.meshes,
            |mesh| unsafe { upload_mesh(&self.gl, mesh) },
            |mesh| self.release_mesh(mesh)
        )?;
        log::debug!("[UNDERLAY] Uploaded {} meshes", meshes.iter().flatten().count());
        Ok(GpuScene { meshes })
    }

    pub fn release(&self, scene: GpuScene) {
        for mesh in scene.meshes.into_iter().flatten() {
            self.release_mesh(mesh);
        }
    }

    fn release_mesh(&self, mesh: GpuMesh) {
        unsafe {
            self.gl.delete_vertex_array(mesh.vao);
            for buffer in mesh.buffers {
                self.gl.delete_buffer(buffer);
            }
        }
    }

    pub fn begin_frame(&mut self, width: u32, height: u32) {
        self.saved_state = Some(GlStateSnapshot::capture(&self.gl));
        let gl = &self.gl;
        unsafe {
            gl.viewport(0, 0, width as i32, height as i32);
            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);
            gl.depth_mask(true);
            gl.disable(glow::CULL_FACE);
            gl.cull_face(glow::BACK);
            gl.front_face(glow::CCW);
            let [r, g, b, a] = self.clear_color;
            gl.clear_color(r, g, b, a);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    /// Draw everything under `root`
    pub fn draw(&self, scene: &GpuScene, graph: &SceneGraph, root: NodeId, camera: &Camera) {
        let gl = &self.gl;
        let u = &self.uniforms;
        unsafe {
            gl.use_program(Some(self.program));
            gl.uniform_matrix_4_f32_slice(u.view_proj.as_ref(), false, &camera.view_projection().to_cols_array());
            gl.uniform_3_f32(u.light_dir.as_ref(), self.light_dir.x, self.light_dir.y, self.light_dir.z);

            for (node, mesh_index) in draw_order(graph, root) {
                let Some(Some(gpu_mesh)) = scene.meshes.get(mesh_index) else {
                    continue;
                };
                let material = &graph.materials[graph.meshes[mesh_index].material];

                let model = graph.world_matrix(node);
                let normal_matrix = Mat3::from_mat4(model).inverse().transpose();
                gl.uniform_matrix_4_f32_slice(u.model.as_ref(), false, &model.to_cols_array());
                gl.uniform_matrix_3_f32_slice(u.normal_matrix.as_ref(), false, &normal_matrix.to_cols_array());

                let c = material.base_color;
                gl.uniform_4_f32(u.color.as_ref(), c.x, c.y, c.z, material.opacity);
                let e = material.emissive_term();
                gl.uniform_3_f32(u.emissive.as_ref(), e.x, e.y, e.z);
                gl.uniform_1_i32(u.flat.as_ref(), material.flat_shading as i32);

                set_capability(gl, glow::BLEND, material.transparent);
                if material.transparent {
                    gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
                }
                gl.depth_mask(!material.transparent);
                set_capability(gl, glow::CULL_FACE, material.culls_back_faces());

                gl.bind_vertex_array(Some(gpu_mesh.vao));
                gl.draw_elements(glow::TRIANGLES, gpu_mesh.index_count, glow::UNSIGNED_INT, 0);
            }

            gl.bind_vertex_array(None);
            gl.depth_mask(true);
        }
    }

    pub fn end_frame(&mut self) {
        if let Some(state) = self.saved_state.take() {
            state.restore(&self.gl);
        }
    }
}

impl Drop for SceneRenderer {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.program);
        }
        log::info!("[UNDERLAY] Scene renderer released");
    }
}

/// Uploads every valid mesh in order, leaving `None` for the rest.
///
/// On the first failure the meshes already uploaded are handed to `release`
/// before the error is returned.
fn upload_each<T>(
    meshes: &[Mesh],
    mut upload: impl FnMut(&Mesh) -> SceneResult<T>,
    mut release: impl FnMut(T)
) -> SceneResult<Vec<Option<T>>> {
    let mut uploaded = Vec::with_capacity(meshes.len());
    for mesh in meshes {
        if !mesh.is_valid() {
            uploaded.push(None);
            continue;
        }
        match upload(mesh) {
            Ok(gpu) => uploaded.push(Some(gpu)),
            Err(e) => {
                uploaded.into_iter().flatten().for_each(&mut release);
                return Err(e);
            }
        }
    }
    Ok(uploaded)
}

unsafe fn compile_shader(gl: &glow::Context, shader_type: u32, source: &str) -> SceneResult<glow::Shader> {
    let stage = if shader_type == glow::VERTEX_SHADER { "vertex" } else { "fragment" };
    let shader = gl.create_shader(shader_type).map_err(SceneError::Gl)?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(SceneError::Shader { stage, log });
    }
    Ok(shader)
}

unsafe fn create_program(gl: &glow::Context, vertex_source: &str, fragment_source: &str) -> SceneResult<glow::Program> {
    let vs = compile_shader(gl, glow::VERTEX_SHADER, vertex_source)?;
    let fs = compile_shader(gl, glow::FRAGMENT_SHADER, fragment_source)?;

    let program = gl.create_program().map_err(SceneError::Gl)?;
    gl.attach_shader(program, vs);
    gl.attach_shader(program, fs);
    gl.link_program(program);

    gl.delete_shader(vs);
    gl.delete_shader(fs);

    if !gl.get_program_link_status(program) {
        let log = gl.get_program_info_log(program);
        gl.delete_program(program);
        return Err(SceneError::Shader { stage: "link", log });
    }
    Ok(program)
}

unsafe fn create_buffers(gl: &glow::Context) -> SceneResult<[glow::Buffer; 3]> {
    let mut created = Vec::with_capacity(3);
    for _ in 0..3 {
        match gl.create_buffer() {
            Ok(buffer) => created.push(buffer),
            Err(e) => {
                for buffer in created {
                    gl.delete_buffer(buffer);
                }
                return Err(SceneError::Gl(e));
            }
        }
    }
    Ok([created[0], created[1], created[2]])
}

unsafe fn upload_mesh(gl: &glow::Context, mesh: &Mesh) -> SceneResult<GpuMesh> {
    let vao = gl.create_vertex_array().map_err(SceneError::Gl)?;
    let [positions, normals, ebo] = match create_buffers(gl) {
        Ok(buffers) => buffers,
        Err(e) => {
            gl.delete_vertex_array(vao);
            return Err(e);
        }
    };
    gl.bind_vertex_array(Some(vao));

    let setup_attrib = |buffer: glow::Buffer, location: u32, data: &[u8]| {
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
        gl.enable_vertex_attrib_array(location);
        gl.vertex_attrib_pointer_f32(location, 3, glow::FLOAT, false, 12, 0);
    };

    setup_attrib(positions, 0, bytemuck::cast_slice(&mesh.positions));
    setup_attrib(normals, 1, bytemuck::cast_slice(&mesh.normals));

    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
    gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, bytemuck::cast_slice(&mesh.indices), glow::STATIC_DRAW);

    gl.bind_vertex_array(None);
    gl.bind_buffer(glow::ARRAY_BUFFER, None);

    Ok(GpuMesh {
        vao,
        buffers: [positions, normals, ebo],
        index_count: mesh.index_count() as i32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::components::{ Material, Transform };
    use pretty_assertions::assert_eq;

    fn triangle(material: usize) -> Mesh {
        Mesh::new(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], None, None, material)
    }

    #[test]
    fn transparent_meshes_draw_last() {
        let mut graph = SceneGraph::new();
        graph.materials.push(Material::default());
        let mut glass = Material::new("glass", Vec3::ONE);
        glass.transparent = true;
        graph.materials.push(glass);

        let root = graph.add_node("root", None, Transform::identity());
        let a = graph.add_node("a", Some(root), Transform::identity());
        let b = graph.add_node("b", Some(root), Transform::identity());
        graph.attach_mesh(a, triangle(1));
        graph.attach_mesh(b, triangle(0));

        assert_eq!(draw_order(&graph, root), vec![(b, 1), (a, 0)]);
    }

    #[test]
    fn failed_upload_releases_what_came_before() {
        let meshes = vec![triangle(0), Mesh::new(Vec::new(), None, None, 0), triangle(0), triangle(0)];
        let mut released = Vec::new();
        let mut calls = 0;

        let result = upload_each(
            &meshes,
            |_| {
                calls += 1;
                if calls == 3 { Err(SceneError::Gl("out of memory".into())) } else { Ok(calls) }
            },
            |id| released.push(id)
        );

        assert!(matches!(result, Err(SceneError::Gl(_))));
        assert_eq!(released, vec![1, 2]);
    }

    #[test]
    fn invalid_meshes_are_skipped_not_uploaded() {
        let meshes = vec![Mesh::new(Vec::new(), None, None, 0), triangle(0)];
        let uploaded = upload_each(&meshes, |_| Ok(7), |_: i32| panic!("nothing to release")).unwrap();
        assert_eq!(uploaded, vec![None, Some(7)]);
    }

    #[test]
    fn header_matches_context_flavour() {
        assert!(shader_header(true).starts_with("#version 300 es"));
        assert!(shader_header(false).starts_with("#version 330 core"));
    }
}
