use view::DrawingSurface;

#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use std::borrow::Cow;
    use wasm_bindgen::prelude::*;

    use crate::batch::{Globals, LineVertex, MeshVertex, SceneBatch};

    #[derive(Debug)]
    pub struct WgpuContext {
        pub _instance: &'static ::wgpu::Instance,
        pub surface: ::wgpu::Surface<'static>,
        pub device: ::wgpu::Device,
        pub queue: ::wgpu::Queue,
        pub config: ::wgpu::SurfaceConfiguration,
        pub canvas: web_sys::HtmlCanvasElement,
        pub clear_color: ::wgpu::Color,
        pub mesh_pipeline: ::wgpu::RenderPipeline,
        pub edge_pipeline: ::wgpu::RenderPipeline,
        pub globals_buffer: ::wgpu::Buffer,
        pub globals_bind_group: ::wgpu::BindGroup,
        pub depth_view: ::wgpu::TextureView,
        pub vertex_buffer: Option<::wgpu::Buffer>,
        pub index_buffer: Option<::wgpu::Buffer>,
        pub index_count: u32,
        pub edge_buffer: Option<::wgpu::Buffer>,
        pub edge_vertex_count: u32,
    }

    const MESH_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    sky: vec4<f32>,
    ground: vec4<f32>,
    highlight: vec4<f32>,
    edge_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) normal: vec3<f32>,
    @location(1) room: f32,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) room: f32,
) -> VsOut {
    return VsOut(globals.view_proj * vec4<f32>(position, 1.0), normal, room);
}

@fragment
fn fs_main(fs_in: VsOut) -> @location(0) vec4<f32> {
    let n = normalize(fs_in.normal);
    // Hemisphere light: ground color facing down, sky color facing up.
    let w = 0.5 * n.y + 0.5;
    let irradiance = mix(globals.ground.rgb, globals.sky.rgb, w) * globals.sky.a;

    let base = vec3<f32>(0.8, 0.8, 0.8);
    var color = base * irradiance;

    let slot = globals.highlight.a;
    if (slot > 0.5 && abs(fs_in.room - slot) < 0.5) {
        color = mix(color, globals.highlight.rgb, 0.6);
    }
    return vec4<f32>(color, 1.0);
}
"#;

    const EDGE_SHADER: &str = r#"
struct Globals {
    view_proj: mat4x4<f32>,
    sky: vec4<f32>,
    ground: vec4<f32>,
    highlight: vec4<f32>,
    edge_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return globals.view_proj * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return globals.edge_color;
}
"#;

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("house-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    #[allow(clippy::too_many_arguments)]
    fn create_pipeline(
        device: &::wgpu::Device,
        layout: &::wgpu::PipelineLayout,
        label: &str,
        shader: &::wgpu::ShaderModule,
        vertex_layout: ::wgpu::VertexBufferLayout<'_>,
        topology: ::wgpu::PrimitiveTopology,
        format: ::wgpu::TextureFormat,
        blend: ::wgpu::BlendState,
        depth: ::wgpu::DepthStencilState,
    ) -> ::wgpu::RenderPipeline {
        device.create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: ::wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(::wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(::wgpu::ColorTargetState {
                    format,
                    blend: Some(blend),
                    write_mask: ::wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: ::wgpu::PrimitiveState {
                topology,
                // Exported models mix windings and interior walls are seen from both sides.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth),
            multisample: ::wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    pub async fn init_wgpu(
        canvas: web_sys::HtmlCanvasElement,
        background: [f32; 3],
    ) -> Result<WgpuContext, JsValue> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        // The surface borrows the instance for 'static; the viewer lives as long as the page.
        let instance: &'static ::wgpu::Instance =
            Box::leak(Box::new(::wgpu::Instance::new(&::wgpu::InstanceDescriptor {
                backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                ..Default::default()
            })));

        let surface = instance
            .create_surface(::wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| JsValue::from_str(&format!("surface error: {e}")))?;

        let adapter = instance
            .request_adapter(&::wgpu::RequestAdapterOptions {
                power_preference: ::wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("adapter error: {e}")))?;

        let (device, queue) = adapter
            .request_device(&::wgpu::DeviceDescriptor {
                label: Some("house-wgpu-device"),
                required_features: ::wgpu::Features::empty(),
                required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                ..Default::default()
            })
            .await
            .map_err(|e| JsValue::from_str(&format!("device error: {e}")))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| JsValue::from_str("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(::wgpu::CompositeAlphaMode::Auto);

        let config = ::wgpu::SurfaceConfiguration {
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            desired_maximum_frame_latency: 2,
            present_mode: ::wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, &config);

        let mesh_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("house-mesh-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(MESH_SHADER)),
        });

        let edge_shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
            label: Some("house-edge-shader"),
            source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(EDGE_SHADER)),
        });

        let globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("house-globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_bind_group_layout =
            device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("house-globals-bgl"),
                entries: &[::wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: ::wgpu::BindingType::Buffer {
                        ty: ::wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("house-globals-bg"),
            layout: &globals_bind_group_layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
            label: Some("house-pipeline-layout"),
            bind_group_layouts: &[&globals_bind_group_layout],
            immediate_size: 0,
        });

        let mesh_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            "house-mesh-pipeline",
            &mesh_shader,
            ::wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as ::wgpu::BufferAddress,
                step_mode: ::wgpu::VertexStepMode::Vertex,
                attributes: &::wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32],
            },
            ::wgpu::PrimitiveTopology::TriangleList,
            config.format,
            ::wgpu::BlendState::REPLACE,
            ::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: true,
                depth_compare: ::wgpu::CompareFunction::Less,
                stencil: ::wgpu::StencilState::default(),
                // Faces sit slightly behind coplanar edge lines.
                bias: ::wgpu::DepthBiasState {
                    constant: 1,
                    slope_scale: 1.0,
                    clamp: 0.0,
                },
            },
        );

        let edge_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            "house-edge-pipeline",
            &edge_shader,
            ::wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as ::wgpu::BufferAddress,
                step_mode: ::wgpu::VertexStepMode::Vertex,
                attributes: &::wgpu::vertex_attr_array![0 => Float32x3],
            },
            ::wgpu::PrimitiveTopology::LineList,
            config.format,
            ::wgpu::BlendState::ALPHA_BLENDING,
            ::wgpu::DepthStencilState {
                format: ::wgpu::TextureFormat::Depth24Plus,
                depth_write_enabled: false,
                depth_compare: ::wgpu::CompareFunction::LessEqual,
                stencil: ::wgpu::StencilState::default(),
                bias: ::wgpu::DepthBiasState::default(),
            },
        );

        // Initialize uniforms so the first render doesn't read uninitialized memory.
        queue.write_buffer(
            &globals_buffer,
            0,
            bytemuck::bytes_of(&<Globals as bytemuck::Zeroable>::zeroed()),
        );

        let [r, g, b] = background;
        Ok(WgpuContext {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            canvas,
            clear_color: ::wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
            mesh_pipeline,
            edge_pipeline,
            globals_buffer,
            globals_bind_group,
            depth_view,
            vertex_buffer: None,
            index_buffer: None,
            index_count: 0,
            edge_buffer: None,
            edge_vertex_count: 0,
        })
    }

    /// Replaces the GPU copies of the model geometry.
    pub fn upload_scene(ctx: &mut WgpuContext, batch: &SceneBatch) {
        if batch.is_empty() {
            ctx.vertex_buffer = None;
            ctx.index_buffer = None;
            ctx.index_count = 0;
        } else {
            ctx.vertex_buffer = Some(ctx.device.create_buffer_init(
                &::wgpu::util::BufferInitDescriptor {
                    label: Some("house-mesh-vertices"),
                    contents: bytemuck::cast_slice(&batch.vertices),
                    usage: ::wgpu::BufferUsages::VERTEX,
                },
            ));
            ctx.index_buffer = Some(ctx.device.create_buffer_init(
                &::wgpu::util::BufferInitDescriptor {
                    label: Some("house-mesh-indices"),
                    contents: bytemuck::cast_slice(&batch.indices),
                    usage: ::wgpu::BufferUsages::INDEX,
                },
            ));
            ctx.index_count = batch.indices.len() as u32;
        }

        if batch.edges.is_empty() {
            ctx.edge_buffer = None;
            ctx.edge_vertex_count = 0;
        } else {
            ctx.edge_buffer = Some(ctx.device.create_buffer_init(
                &::wgpu::util::BufferInitDescriptor {
                    label: Some("house-edge-vertices"),
                    contents: bytemuck::cast_slice(&batch.edges),
                    usage: ::wgpu::BufferUsages::VERTEX,
                },
            ));
            ctx.edge_vertex_count = batch.edges.len() as u32;
        }
    }

    pub fn resize_wgpu(ctx: &mut WgpuContext, width: u32, height: u32) {
        ctx.config.width = width.max(1);
        ctx.config.height = height.max(1);
        ctx.canvas.set_width(ctx.config.width);
        ctx.canvas.set_height(ctx.config.height);
        ctx.surface.configure(&ctx.device, &ctx.config);
        ctx.depth_view = create_depth_view(&ctx.device, &ctx.config);
    }

    pub fn render_frame(ctx: &WgpuContext, globals: &Globals) -> Result<(), JsValue> {
        let frame = ctx
            .surface
            .get_current_texture()
            .map_err(|e| JsValue::from_str(&format!("surface acquire failed: {e}")))?;
        let view = frame
            .texture
            .create_view(&::wgpu::TextureViewDescriptor::default());

        ctx.queue
            .write_buffer(&ctx.globals_buffer, 0, bytemuck::bytes_of(globals));

        let mut encoder = ctx
            .device
            .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                label: Some("house-frame-encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                label: Some("house-scene-pass"),
                color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: ::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(ctx.clear_color),
                        store: ::wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_view,
                    depth_ops: Some(::wgpu::Operations {
                        load: ::wgpu::LoadOp::Clear(1.0),
                        store: ::wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            rpass.set_bind_group(0, &ctx.globals_bind_group, &[]);

            if let (Some(vertices), Some(indices)) = (&ctx.vertex_buffer, &ctx.index_buffer) {
                rpass.set_pipeline(&ctx.mesh_pipeline);
                rpass.set_vertex_buffer(0, vertices.slice(..));
                rpass.set_index_buffer(indices.slice(..), ::wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..ctx.index_count, 0, 0..1);
            }

            if let Some(edges) = &ctx.edge_buffer {
                rpass.set_pipeline(&ctx.edge_pipeline);
                rpass.set_vertex_buffer(0, edges.slice(..));
                rpass.draw(0..ctx.edge_vertex_count, 0..1);
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use wasm_bindgen::prelude::JsValue;

    use crate::batch::{Globals, SceneBatch};

    #[derive(Debug, Default)]
    pub struct WgpuContext {
        pub width: u32,
        pub height: u32,
    }

    pub async fn init_wgpu(
        _canvas: web_sys::HtmlCanvasElement,
        _background: [f32; 3],
    ) -> Result<WgpuContext, JsValue> {
        Err(JsValue::from_str(
            "wgpu initialization is only available on wasm32 targets",
        ))
    }

    pub fn upload_scene(_ctx: &mut WgpuContext, _batch: &SceneBatch) {}

    pub fn resize_wgpu(ctx: &mut WgpuContext, width: u32, height: u32) {
        ctx.width = width.max(1);
        ctx.height = height.max(1);
    }

    pub fn render_frame(_ctx: &WgpuContext, _globals: &Globals) -> Result<(), JsValue> {
        Err(JsValue::from_str(
            "wgpu rendering is only available on wasm32 targets",
        ))
    }
}

pub use imp::{WgpuContext, init_wgpu, render_frame, resize_wgpu, upload_scene};

impl DrawingSurface for WgpuContext {
    fn set_size(&mut self, width: u32, height: u32) {
        resize_wgpu(self, width, height);
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::WgpuContext;
    use view::{Projection, ViewMode, ViewportSize, create_cameras, on_resize};

    #[test]
    fn resize_drives_the_drawing_buffer() {
        let config = formats::ViewerConfig::default();
        let mut rig = create_cameras(ViewportSize::new(640.0, 480.0), ViewMode::ThreeD, &config);
        let mut ctx = WgpuContext::default();

        assert!(on_resize(
            Some(ViewportSize::new(0.0, 300.0)),
            Some(&mut rig),
            Some(&mut ctx),
            config.frustum_size,
        ));
        assert_eq!((ctx.width, ctx.height), (1, 300));

        assert!(on_resize(
            Some(ViewportSize::new(900.0, 300.0)),
            Some(&mut rig),
            Some(&mut ctx),
            config.frustum_size,
        ));
        assert_eq!((ctx.width, ctx.height), (900, 300));
        match rig.perspective.projection {
            Projection::Perspective { aspect, .. } => assert_eq!(aspect, 3.0),
            other => panic!("unexpected projection {other:?}"),
        }
    }
}
