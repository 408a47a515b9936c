//! Native engine surface.
//!
//! The native engine owns all the WebGL state. The bridge reaches it through
//! the [`NativeEngine`] trait, which has one method per native function. The
//! methods are named `<namespace>_<operation>`, where the namespace is one of
//! `webgl` (WebGL 1 and the context lifecycle), `webgl2` (WebGL 2 only),
//! `text_encoder` and `image_asset`. Their parameters are ordered with the
//! semantic parameters first, then any slice, and the owning
//! [`ContextHandle`] last.
//!
//! The whole surface is declared once with the `native_surface!` macro, which
//! also implements it for [`RecordingEngine`].

use crate::handle::{ContextHandle, GlObject, SyncHandle};
use recording::{Arg, FromReply, RecordingEngine};

pub mod recording;

/// Value returned by the native parameter queries.
///
/// This is the result of `getParameter` and the other `get*Parameter`
/// functions, whose type depends on the parameter name.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Parameter {
    /// No value. Script sees `null`.
    #[default]
    None,
    /// `GLboolean`.
    Bool(bool),
    /// `GLint` or `GLenum` with a signed representation.
    I32(i32),
    /// `GLuint` or `GLenum`.
    U32(u32),
    /// `GLint64`.
    I64(i64),
    /// `GLfloat`.
    F32(f32),
    /// Sequence of `GLboolean`.
    BoolArray(Vec<bool>),
    /// `Int32Array`.
    I32Array(Vec<i32>),
    /// `Uint32Array`.
    U32Array(Vec<u32>),
    /// `Float32Array`.
    F32Array(Vec<f32>),
    /// `DOMString`.
    String(String),
    /// `WebGLActiveInfo`.
    ActiveInfo {
        /// Name of the variable.
        name: String,
        /// Array size of the variable.
        size: i32,
        /// Type of the variable.
        kind: u32,
    },
    /// GPU object. Script sees a wrapper of the right class.
    Object(GlObject),
}

/// Image decoder.
///
/// Decoding an image asset can take a long time, so the bridge runs it on a
/// worker thread. This is the only part of the native surface that is called
/// off the engine thread, which is why it is a separate trait.
pub trait ImageDecoder: Send + Sync {
    /// Decodes `bytes` into the image asset `asset`.
    fn load_from_bytes(&self, asset: u32, bytes: &[u8]) -> anyhow::Result<()>;
}

macro_rules! native_surface {
    (
        free {
            $($(#[$fmeta:meta])* fn $fname:ident($($farg:ident: $fty:ty),* $(,)?) $(-> $fret:ty)?;)*
        }
        bound {
            $($(#[$bmeta:meta])* fn $bname:ident($($barg:ident: $bty:ty),* $(,)?) $(-> $bret:ty)?;)*
        }
    ) => {
        /// Native rendering engine.
        ///
        /// The functions in the `free` part of the surface do not belong to a
        /// rendering context. All the other functions take the handle of the
        /// rendering context as their last parameter. The bridge calls each
        /// function at most once per script call, and never interprets the
        /// handles that the engine returns.
        pub trait NativeEngine {
            $(
                $(#[$fmeta])*
                fn $fname(&mut self, $($farg: $fty),*) $(-> $fret)?;
            )*
            $(
                $(#[$bmeta])*
                fn $bname(&mut self, $($barg: $bty,)* context: ContextHandle) $(-> $bret)?;
            )*
        }

        impl NativeEngine for RecordingEngine {
            $(
                fn $fname(&mut self, $($farg: $fty),*) $(-> $fret)? {
                    let _reply = self.record(stringify!($fname), vec![$(Arg::from($farg)),*], None);
                    $(<$fret as FromReply>::from_reply(_reply, self))?
                }
            )*
            $(
                fn $bname(&mut self, $($barg: $bty,)* context: ContextHandle) $(-> $bret)? {
                    let _reply = self.record(
                        stringify!($bname),
                        vec![$(Arg::from($barg)),*],
                        Some(context),
                    );
                    $(<$bret as FromReply>::from_reply(_reply, self))?
                }
            )*
        }
    };
}

native_surface! {
    free {
        /// Creates a rendering context and returns its handle.
        fn webgl_create(
            version: &str,
            alpha: bool,
            antialias: bool,
            depth: bool,
            fail_if_major_performance_caveat: bool,
            power_preference: &str,
            premultiplied_alpha: bool,
            preserve_drawing_buffer: bool,
            stencil: bool,
            desynchronized: bool,
            xr_compatible: bool,
        ) -> ContextHandle;
        /// Creates a text encoder for `encoding` and returns its handle.
        fn text_encoder_create(encoding: &str) -> u32;
        /// Returns the normalized label of the encoding of an encoder.
        fn text_encoder_get_encoding(encoder: u32) -> String;
        /// Encodes `text` and returns the bytes.
        fn text_encoder_encode(encoder: u32, text: &str) -> Vec<u8>;
        /// Creates an empty image asset and returns its handle.
        fn image_asset_create() -> u32;
        fn image_asset_width(asset: u32) -> u32;
        fn image_asset_height(asset: u32) -> u32;
        /// Returns the error of the last failed load, or an empty string.
        fn image_asset_error(asset: u32) -> String;
        /// Decodes `bytes` into an image asset on the calling thread.
        fn image_asset_load_from_bytes(asset: u32, bytes: &[u8]) -> bool;
        /// Creates an image bitmap from an image asset and returns the handle
        /// of the new asset that holds it.
        ///
        /// The source rectangle is only used if `has_rect` is set. The resize
        /// dimensions are `NaN` when not given.
        fn image_bitmap_create_from_asset(
            asset: u32,
            has_rect: bool,
            sx: f32,
            sy: f32,
            sw: f32,
            sh: f32,
            flip_y: bool,
            premultiply_alpha: i32,
            color_space_conversion: i32,
            resize_quality: i32,
            resize_width: f32,
            resize_height: f32,
        ) -> u32;
        /// Creates an image bitmap from encoded bytes.
        ///
        /// The parameters after `bytes` are those of
        /// [`NativeEngine::image_bitmap_create_from_asset`].
        fn image_bitmap_create_from_bytes(
            bytes: &[u8],
            has_rect: bool,
            sx: f32,
            sy: f32,
            sw: f32,
            sh: f32,
            flip_y: bool,
            premultiply_alpha: i32,
            color_space_conversion: i32,
            resize_quality: i32,
            resize_width: f32,
            resize_height: f32,
        ) -> u32;
    }
    bound {
        /// Releases a rendering context.
        fn webgl_destroy();
        fn webgl_get_drawing_buffer_width() -> i32;
        fn webgl_get_drawing_buffer_height() -> i32;

        fn webgl_active_texture(texture: u32);
        fn webgl_attach_shader(program: u32, shader: u32);
        fn webgl_bind_attrib_location(program: u32, index: u32, name: &str);
        fn webgl_bind_buffer(target: u32, buffer: u32);
        fn webgl_bind_framebuffer(target: u32, framebuffer: u32);
        fn webgl_bind_renderbuffer(target: u32, renderbuffer: u32);
        fn webgl_bind_texture(target: u32, texture: u32);
        fn webgl_blend_color(red: f32, green: f32, blue: f32, alpha: f32);
        fn webgl_blend_equation(mode: u32);
        fn webgl_blend_equation_separate(mode_rgb: u32, mode_alpha: u32);
        fn webgl_blend_func(sfactor: u32, dfactor: u32);
        fn webgl_blend_func_separate(src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);
        fn webgl_buffer_data(target: u32, usage: u32, src_data: &[u8]);
        /// `bufferData` with a size instead of data.
        fn webgl_buffer_data_none(target: u32, size: isize, usage: u32);
        fn webgl_buffer_sub_data(target: u32, offset: isize, src_data: &[u8]);
        fn webgl_check_framebuffer_status(target: u32) -> u32;
        fn webgl_clear(mask: u32);
        fn webgl_clear_color(red: f32, green: f32, blue: f32, alpha: f32);
        fn webgl_clear_depth(depth: f32);
        fn webgl_clear_stencil(stencil: i32);
        fn webgl_color_mask(red: bool, green: bool, blue: bool, alpha: bool);
        fn webgl_compile_shader(shader: u32);
        fn webgl_create_buffer() -> u32;
        fn webgl_create_framebuffer() -> u32;
        fn webgl_create_program() -> u32;
        fn webgl_create_renderbuffer() -> u32;
        fn webgl_create_shader(shader_type: u32) -> u32;
        fn webgl_create_texture() -> u32;
        fn webgl_cull_face(mode: u32);
        fn webgl_delete_buffer(buffer: u32);
        fn webgl_delete_framebuffer(framebuffer: u32);
        fn webgl_delete_program(program: u32);
        fn webgl_delete_renderbuffer(renderbuffer: u32);
        fn webgl_delete_shader(shader: u32);
        fn webgl_delete_texture(texture: u32);
        fn webgl_depth_func(func: u32);
        fn webgl_depth_mask(flag: bool);
        fn webgl_disable(cap: u32);
        fn webgl_disable_vertex_attrib_array(index: u32);
        fn webgl_draw_arrays(mode: u32, first: i32, count: i32);
        fn webgl_draw_elements(mode: u32, count: i32, element_type: u32, offset: isize);
        fn webgl_enable(cap: u32);
        fn webgl_enable_vertex_attrib_array(index: u32);
        fn webgl_finish();
        fn webgl_flush();
        fn webgl_framebuffer_renderbuffer(
            target: u32,
            attachment: u32,
            renderbuffer_target: u32,
            renderbuffer: u32,
        );
        fn webgl_framebuffer_texture2d(
            target: u32,
            attachment: u32,
            textarget: u32,
            texture: u32,
            level: i32,
        );
        fn webgl_generate_mipmap(target: u32);
        fn webgl_get_attrib_location(program: u32, name: &str) -> i32;
        fn webgl_get_error() -> u32;
        /// Enables the extension called `name`. Returns `false` if the engine
        /// does not support it.
        fn webgl_get_extension(name: &str) -> bool;
        fn webgl_get_parameter(pname: u32) -> Parameter;
        fn webgl_get_program_info_log(program: u32) -> String;
        fn webgl_get_program_parameter(program: u32, pname: u32) -> Parameter;
        fn webgl_get_shader_info_log(shader: u32) -> String;
        fn webgl_get_shader_parameter(shader: u32, pname: u32) -> Parameter;
        fn webgl_get_supported_extensions() -> Vec<String>;
        /// Returns the location of a uniform, or -1 if the program has no
        /// active uniform called `name`.
        fn webgl_get_uniform_location(program: u32, name: &str) -> i32;
        fn webgl_link_program(program: u32);
        fn webgl_pixel_storei(pname: u32, param: i32);
        /// Reads pixels into `pixels`.
        fn webgl_read_pixels(
            x: i32,
            y: i32,
            width: i32,
            height: i32,
            format: u32,
            pixel_type: u32,
            pixels: &mut [u8],
        );
        fn webgl_renderbuffer_storage(target: u32, internal_format: u32, width: i32, height: i32);
        fn webgl_scissor(x: i32, y: i32, width: i32, height: i32);
        fn webgl_shader_source(shader: u32, source: &str);
        fn webgl_tex_image2d(
            target: u32,
            level: i32,
            internalformat: i32,
            width: i32,
            height: i32,
            border: i32,
            format: u32,
            pixel_type: u32,
            pixels: &[u8],
        );
        /// `texImage2D` with `null` pixels.
        fn webgl_tex_image2d_none(
            target: u32,
            level: i32,
            internalformat: i32,
            width: i32,
            height: i32,
            border: i32,
            format: u32,
            pixel_type: u32,
        );
        /// `texImage2D` from an image asset.
        fn webgl_tex_image2d_asset(
            target: u32,
            level: i32,
            internalformat: i32,
            format: u32,
            pixel_type: u32,
            asset: u32,
        );
        fn webgl_tex_parameterf(target: u32, pname: u32, param: f32);
        fn webgl_tex_parameteri(target: u32, pname: u32, param: i32);
        fn webgl_uniform1f(location: i32, v0: f32);
        fn webgl_uniform2f(location: i32, v0: f32, v1: f32);
        fn webgl_uniform3f(location: i32, v0: f32, v1: f32, v2: f32);
        fn webgl_uniform4f(location: i32, v0: f32, v1: f32, v2: f32, v3: f32);
        fn webgl_uniform1i(location: i32, v0: i32);
        fn webgl_uniform2i(location: i32, v0: i32, v1: i32);
        fn webgl_uniform3i(location: i32, v0: i32, v1: i32, v2: i32);
        fn webgl_uniform4i(location: i32, v0: i32, v1: i32, v2: i32, v3: i32);
        fn webgl_uniform1fv(location: i32, value: &[f32]);
        fn webgl_uniform2fv(location: i32, value: &[f32]);
        fn webgl_uniform3fv(location: i32, value: &[f32]);
        fn webgl_uniform4fv(location: i32, value: &[f32]);
        fn webgl_uniform1iv(location: i32, value: &[i32]);
        fn webgl_uniform2iv(location: i32, value: &[i32]);
        fn webgl_uniform3iv(location: i32, value: &[i32]);
        fn webgl_uniform4iv(location: i32, value: &[i32]);
        fn webgl_uniform_matrix2fv(location: i32, transpose: bool, value: &[f32]);
        fn webgl_uniform_matrix3fv(location: i32, transpose: bool, value: &[f32]);
        fn webgl_uniform_matrix4fv(location: i32, transpose: bool, value: &[f32]);
        fn webgl_use_program(program: u32);
        fn webgl_vertex_attrib_pointer(
            index: u32,
            size: i32,
            attrib_type: u32,
            normalized: bool,
            stride: i32,
            offset: isize,
        );
        fn webgl_viewport(x: i32, y: i32, width: i32, height: i32);

        fn webgl2_begin_query(target: u32, query: u32);
        fn webgl2_begin_transform_feedback(primitive_mode: u32);
        fn webgl2_bind_buffer_base(target: u32, index: u32, buffer: u32);
        fn webgl2_bind_buffer_range(target: u32, index: u32, buffer: u32, offset: isize, size: isize);
        fn webgl2_bind_sampler(unit: u32, sampler: u32);
        fn webgl2_bind_transform_feedback(target: u32, transform_feedback: u32);
        fn webgl2_bind_vertex_array(vertex_array: u32);
        fn webgl2_blit_framebuffer(
            src_x0: i32,
            src_y0: i32,
            src_x1: i32,
            src_y1: i32,
            dst_x0: i32,
            dst_y0: i32,
            dst_x1: i32,
            dst_y1: i32,
            mask: u32,
            filter: u32,
        );
        fn webgl2_clear_bufferfi(buffer: u32, drawbuffer: i32, depth: f32, stencil: i32);
        fn webgl2_clear_bufferfv(buffer: u32, drawbuffer: i32, values: &[f32]);
        fn webgl2_clear_bufferiv(buffer: u32, drawbuffer: i32, values: &[i32]);
        fn webgl2_clear_bufferuiv(buffer: u32, drawbuffer: i32, values: &[u32]);
        /// Waits on a sync object and returns one of `ALREADY_SIGNALED`,
        /// `TIMEOUT_EXPIRED`, `CONDITION_SATISFIED` or `WAIT_FAILED`.
        fn webgl2_client_wait_sync(sync: SyncHandle, flags: u32, timeout: isize) -> u32;
        /// `compressedTexSubImage3D` with data from a buffer view.
        ///
        /// `src_offset` and `src_length_override` are in bytes. A
        /// `src_length_override` of zero means the rest of the view.
        fn webgl2_compressed_tex_sub_image3d(
            target: u32,
            level: i32,
            xoffset: i32,
            yoffset: i32,
            zoffset: i32,
            width: i32,
            height: i32,
            depth: i32,
            format: u32,
            src: &[u8],
            src_offset: usize,
            src_length_override: usize,
        );
        /// `compressedTexSubImage3D` with data from the bound pixel unpack
        /// buffer.
        fn webgl2_compressed_tex_sub_image3d_none(
            target: u32,
            level: i32,
            xoffset: i32,
            yoffset: i32,
            zoffset: i32,
            width: i32,
            height: i32,
            depth: i32,
            format: u32,
            image_size: i32,
            offset: i32,
        );
        fn webgl2_copy_buffer_sub_data(
            read_target: u32,
            write_target: u32,
            read_offset: isize,
            write_offset: isize,
            size: isize,
        );
        fn webgl2_copy_tex_sub_image3d(
            target: u32,
            level: i32,
            xoffset: i32,
            yoffset: i32,
            zoffset: i32,
            x: i32,
            y: i32,
            width: i32,
            height: i32,
        );
        fn webgl2_create_query() -> u32;
        fn webgl2_create_sampler() -> u32;
        fn webgl2_create_transform_feedback() -> u32;
        fn webgl2_create_vertex_array() -> u32;
        fn webgl2_delete_query_with_query(query: u32);
        fn webgl2_delete_sampler_with_sampler(sampler: u32);
        fn webgl2_delete_sync_with_sync(sync: SyncHandle);
        fn webgl2_delete_transform_feedback(transform_feedback: u32);
        fn webgl2_delete_vertex_array_with_vertex_array(vertex_array: u32);
        fn webgl2_draw_arrays_instanced(mode: u32, first: i32, count: i32, instance_count: i32);
        fn webgl2_draw_buffers(buffers: &[u32]);
        fn webgl2_draw_elements_instanced(
            mode: u32,
            count: i32,
            element_type: u32,
            offset: isize,
            instance_count: i32,
        );
        fn webgl2_draw_range_elements(
            mode: u32,
            start: u32,
            end: u32,
            count: i32,
            element_type: u32,
            offset: isize,
        );
        fn webgl2_end_query(target: u32);
        fn webgl2_end_transform_feedback();
        /// Inserts a fence and returns a pointer to the native sync object.
        fn webgl2_fence_sync(condition: u32, flags: u32) -> SyncHandle;
        fn webgl2_framebuffer_texture_layer(
            target: u32,
            attachment: u32,
            texture: u32,
            level: i32,
            layer: i32,
        );
        fn webgl2_get_active_uniform_block_name(program: u32, uniform_block_index: u32) -> String;
        fn webgl2_get_active_uniform_block_parameter(
            program: u32,
            uniform_block_index: u32,
            pname: u32,
        ) -> Parameter;
        fn webgl2_get_active_uniforms(program: u32, pname: u32, uniform_indices: &[u32]) -> Parameter;
        /// Reads buffer data into `dst_data`, starting at byte `dst_offset`
        /// and copying `length` bytes (zero for the rest of `dst_data`).
        fn webgl2_get_buffer_sub_data(
            target: u32,
            src_byte_offset: isize,
            dst_data: &mut [u8],
            dst_offset: usize,
            length: usize,
        );
        fn webgl2_get_frag_data_location(program: u32, name: &str) -> i32;
        fn webgl2_get_indexed_parameter(target: u32, index: u32) -> Parameter;
        fn webgl2_get_internalformat_parameter(target: u32, internalformat: u32, pname: u32) -> Parameter;
        fn webgl2_get_query_parameter(query: u32, pname: u32) -> Parameter;
        fn webgl2_get_query(target: u32, pname: u32) -> Parameter;
        fn webgl2_get_sampler_parameter(sampler: u32, pname: u32) -> Parameter;
        fn webgl2_get_sync_parameter(sync: SyncHandle, pname: u32) -> Parameter;
        fn webgl2_get_transform_feedback_varying(program: u32, index: u32) -> Parameter;
        fn webgl2_get_uniform_block_index(program: u32, uniform_block_name: &str) -> u32;
        fn webgl2_get_uniform_indices(program: u32, uniform_names: &[&str]) -> Vec<u32>;
        fn webgl2_invalidate_framebuffer(target: u32, attachments: &[u32]);
        fn webgl2_invalidate_sub_framebuffer(
            target: u32,
            x: i32,
            y: i32,
            width: i32,
            height: i32,
            attachments: &[u32],
        );
        fn webgl2_is_query(query: u32) -> bool;
        fn webgl2_is_sampler(sampler: u32) -> bool;
        fn webgl2_is_sync(sync: SyncHandle) -> bool;
        fn webgl2_is_transform_feedback(transform_feedback: u32) -> bool;
        fn webgl2_is_vertex_array(vertex_array: u32) -> bool;
        fn webgl2_pause_transform_feedback();
        fn webgl2_read_buffer(src: u32);
        fn webgl2_renderbuffer_storage_multisample(
            target: u32,
            samples: i32,
            internal_format: u32,
            width: i32,
            height: i32,
        );
        fn webgl2_resume_transform_feedback();
        fn webgl2_sampler_parameterf(sampler: u32, pname: u32, param: f32);
        fn webgl2_sampler_parameteri(sampler: u32, pname: u32, param: i32);
        /// `texImage3D` with data from a buffer view. `src_offset` is in
        /// bytes.
        fn webgl2_tex_image3d(
            target: u32,
            level: i32,
            internalformat: i32,
            width: i32,
            height: i32,
            depth: i32,
            border: i32,
            format: u32,
            pixel_type: u32,
            src: &[u8],
            src_offset: usize,
        );
        /// `texImage3D` with `null` data.
        fn webgl2_tex_image3d_none(
            target: u32,
            level: i32,
            internalformat: i32,
            width: i32,
            height: i32,
            depth: i32,
            border: i32,
            format: u32,
            pixel_type: u32,
        );
        /// `texImage3D` with data from the bound pixel unpack buffer.
        fn webgl2_tex_image3d_offset(
            target: u32,
            level: i32,
            internalformat: i32,
            width: i32,
            height: i32,
            depth: i32,
            border: i32,
            format: u32,
            pixel_type: u32,
            offset: isize,
        );
        /// `texImage3D` from an image asset.
        fn webgl2_tex_image3d_asset(
            target: u32,
            level: i32,
            internalformat: i32,
            width: i32,
            height: i32,
            depth: i32,
            border: i32,
            format: u32,
            pixel_type: u32,
            asset: u32,
        );
        fn webgl2_tex_storage2d(target: u32, levels: i32, internalformat: u32, width: i32, height: i32);
        fn webgl2_tex_storage3d(
            target: u32,
            levels: i32,
            internalformat: u32,
            width: i32,
            height: i32,
            depth: i32,
        );
        fn webgl2_tex_sub_image3d(
            target: u32,
            level: i32,
            xoffset: i32,
            yoffset: i32,
            zoffset: i32,
            width: i32,
            height: i32,
            depth: i32,
            format: u32,
            pixel_type: u32,
            src: &[u8],
            src_offset: usize,
        );
        fn webgl2_tex_sub_image3d_offset(
            target: u32,
            level: i32,
            xoffset: i32,
            yoffset: i32,
            zoffset: i32,
            width: i32,
            height: i32,
            depth: i32,
            format: u32,
            pixel_type: u32,
            offset: isize,
        );
        fn webgl2_tex_sub_image3d_asset(
            target: u32,
            level: i32,
            xoffset: i32,
            yoffset: i32,
            zoffset: i32,
            width: i32,
            height: i32,
            depth: i32,
            format: u32,
            pixel_type: u32,
            asset: u32,
        );
        fn webgl2_transform_feedback_varyings(program: u32, buffer_mode: u32, varyings: &[&str]);
        fn webgl2_uniform1ui(location: i32, v0: u32);
        fn webgl2_uniform2ui(location: i32, v0: u32, v1: u32);
        fn webgl2_uniform3ui(location: i32, v0: u32, v1: u32, v2: u32);
        fn webgl2_uniform4ui(location: i32, v0: u32, v1: u32, v2: u32, v3: u32);
        fn webgl2_uniform1uiv(location: i32, data: &[u32]);
        fn webgl2_uniform2uiv(location: i32, data: &[u32]);
        fn webgl2_uniform3uiv(location: i32, data: &[u32]);
        fn webgl2_uniform4uiv(location: i32, data: &[u32]);
        fn webgl2_uniform_block_binding(
            program: u32,
            uniform_block_index: u32,
            uniform_block_binding: u32,
        );
        fn webgl2_uniform_matrix2x3fv(location: i32, transpose: bool, data: &[f32]);
        fn webgl2_uniform_matrix2x4fv(location: i32, transpose: bool, data: &[f32]);
        fn webgl2_uniform_matrix3x2fv(location: i32, transpose: bool, data: &[f32]);
        fn webgl2_uniform_matrix3x4fv(location: i32, transpose: bool, data: &[f32]);
        fn webgl2_uniform_matrix4x2fv(location: i32, transpose: bool, data: &[f32]);
        fn webgl2_uniform_matrix4x3fv(location: i32, transpose: bool, data: &[f32]);
        fn webgl2_vertex_attrib_divisor(index: u32, divisor: u32);
        fn webgl2_vertex_attrib_i4i(index: u32, x: i32, y: i32, z: i32, w: i32);
        fn webgl2_vertex_attrib_i4iv(index: u32, value: &[i32]);
        fn webgl2_vertex_attrib_i4ui(index: u32, x: u32, y: u32, z: u32, w: u32);
        fn webgl2_vertex_attrib_i4uiv(index: u32, value: &[u32]);
    }
}
