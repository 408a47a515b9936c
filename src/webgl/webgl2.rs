//! Forwarders of the methods that only `WebGL2RenderingContext` has.

use super::webgl1::out_of_range;
use crate::dispatch::{
    creators, deleters, forwarders, predicates, vector_forwarders, Invocation,
};
use crate::error::ArgumentError;
use crate::handle::GlObject;
use crate::registry::ContextMethod;
use crate::value::Value;

forwarders! {
    begin_query => webgl2_begin_query(target: number_u32, query: index(Query));
    begin_transform_feedback => webgl2_begin_transform_feedback(primitive_mode: u32);
    bind_buffer_base => webgl2_bind_buffer_base(
        target: number_u32,
        index: number_u32,
        buffer: nullable(Buffer),
    );
    bind_buffer_range => webgl2_bind_buffer_range(
        target: u32,
        index: u32,
        buffer: nullable(Buffer),
        offset: isize,
        size: isize,
    );
    bind_sampler => webgl2_bind_sampler(unit: number_u32, sampler: nullable(Sampler));
    bind_transform_feedback => webgl2_bind_transform_feedback(
        target: number_u32,
        transform_feedback: nullable(TransformFeedback),
    );
    bind_vertex_array => webgl2_bind_vertex_array(vertex_array: nullable(VertexArray));
    blit_framebuffer => webgl2_blit_framebuffer(
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
    clear_bufferfi => webgl2_clear_bufferfi(buffer: u32, drawbuffer: i32, depth: f32, stencil: i32);
    client_wait_sync => webgl2_client_wait_sync(sync: sync, flags: u32, timeout: isize) -> ret;
    copy_buffer_sub_data => webgl2_copy_buffer_sub_data(
        read_target: u32,
        write_target: u32,
        read_offset: isize,
        write_offset: isize,
        size: isize,
    );
    copy_tex_sub_image3d => webgl2_copy_tex_sub_image3d(
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
    draw_arrays_instanced => webgl2_draw_arrays_instanced(
        mode: u32,
        first: i32,
        count: i32,
        instance_count: i32,
    );
    draw_elements_instanced => webgl2_draw_elements_instanced(
        mode: u32,
        count: i32,
        element_type: u32,
        offset: isize,
        instance_count: i32,
    );
    draw_range_elements => webgl2_draw_range_elements(
        mode: u32,
        start: u32,
        end: u32,
        count: i32,
        element_type: u32,
        offset: isize,
    );
    end_query => webgl2_end_query(target: number_u32);
    end_transform_feedback => webgl2_end_transform_feedback();
    framebuffer_texture_layer => webgl2_framebuffer_texture_layer(
        target: u32,
        attachment: u32,
        texture: nullable(Texture),
        level: i32,
        layer: i32,
    );
    get_active_uniform_block_name => webgl2_get_active_uniform_block_name(
        program: index(Program),
        uniform_block_index: u32,
    ) -> ret;
    get_active_uniform_block_parameter => webgl2_get_active_uniform_block_parameter(
        program: index(Program),
        uniform_block_index: u32,
        pname: u32,
    ) -> ret_parameter;
    get_frag_data_location => webgl2_get_frag_data_location(
        program: index(Program),
        name: string,
    ) -> ret;
    get_indexed_parameter => webgl2_get_indexed_parameter(target: u32, index: u32) -> ret_parameter;
    get_internalformat_parameter => webgl2_get_internalformat_parameter(
        target: u32,
        internalformat: u32,
        pname: u32,
    ) -> ret_parameter;
    get_query_parameter => webgl2_get_query_parameter(
        query: index(Query),
        pname: u32,
    ) -> ret_parameter;
    get_query => webgl2_get_query(target: u32, pname: u32) -> ret_parameter;
    get_sampler_parameter => webgl2_get_sampler_parameter(
        sampler: index(Sampler),
        pname: u32,
    ) -> ret_parameter;
    get_sync_parameter => webgl2_get_sync_parameter(sync: sync, pname: u32) -> ret_parameter;
    get_transform_feedback_varying => webgl2_get_transform_feedback_varying(
        program: index(Program),
        index: u32,
    ) -> ret_parameter;
    get_uniform_block_index => webgl2_get_uniform_block_index(
        program: index(Program),
        uniform_block_name: string,
    ) -> ret;
    pause_transform_feedback => webgl2_pause_transform_feedback();
    read_buffer => webgl2_read_buffer(src: u32);
    renderbuffer_storage_multisample => webgl2_renderbuffer_storage_multisample(
        target: u32,
        samples: i32,
        internal_format: u32,
        width: i32,
        height: i32,
    );
    resume_transform_feedback => webgl2_resume_transform_feedback();
    sampler_parameterf => webgl2_sampler_parameterf(sampler: index(Sampler), pname: u32, param: f32);
    sampler_parameteri => webgl2_sampler_parameteri(sampler: index(Sampler), pname: u32, param: i32);
    tex_storage2d => webgl2_tex_storage2d(
        target: u32,
        levels: i32,
        internalformat: u32,
        width: i32,
        height: i32,
    );
    tex_storage3d => webgl2_tex_storage3d(
        target: u32,
        levels: i32,
        internalformat: u32,
        width: i32,
        height: i32,
        depth: i32,
    );
    uniform1ui => webgl2_uniform1ui(location: location, v0: u32);
    uniform2ui => webgl2_uniform2ui(location: location, v0: u32, v1: u32);
    uniform3ui => webgl2_uniform3ui(location: location, v0: u32, v1: u32, v2: u32);
    uniform4ui => webgl2_uniform4ui(location: location, v0: u32, v1: u32, v2: u32, v3: u32);
    uniform_block_binding => webgl2_uniform_block_binding(
        program: index(Program),
        uniform_block_index: u32,
        uniform_block_binding: u32,
    );
    vertex_attrib_divisor => webgl2_vertex_attrib_divisor(index: u32, divisor: u32);
    vertex_attrib_i4i => webgl2_vertex_attrib_i4i(index: u32, x: i32, y: i32, z: i32, w: i32);
    vertex_attrib_i4ui => webgl2_vertex_attrib_i4ui(index: u32, x: u32, y: u32, z: u32, w: u32);
}

vector_forwarders! {
    clear_bufferfv => webgl2_clear_bufferfv(buffer: u32, drawbuffer: i32, [f32] range);
    clear_bufferiv => webgl2_clear_bufferiv(buffer: u32, drawbuffer: i32, [i32] range);
    clear_bufferuiv => webgl2_clear_bufferuiv(buffer: u32, drawbuffer: i32, [u32] range);
    draw_buffers => webgl2_draw_buffers([u32]);
    invalidate_framebuffer => webgl2_invalidate_framebuffer(target: u32, [u32]);
    uniform1uiv => webgl2_uniform1uiv(location: location, [u32] range);
    uniform2uiv => webgl2_uniform2uiv(location: location, [u32] range);
    uniform3uiv => webgl2_uniform3uiv(location: location, [u32] range);
    uniform4uiv => webgl2_uniform4uiv(location: location, [u32] range);
    uniform_matrix2x3fv => webgl2_uniform_matrix2x3fv(location: location, transpose: bool, [f32] range);
    uniform_matrix2x4fv => webgl2_uniform_matrix2x4fv(location: location, transpose: bool, [f32] range);
    uniform_matrix3x2fv => webgl2_uniform_matrix3x2fv(location: location, transpose: bool, [f32] range);
    uniform_matrix3x4fv => webgl2_uniform_matrix3x4fv(location: location, transpose: bool, [f32] range);
    uniform_matrix4x2fv => webgl2_uniform_matrix4x2fv(location: location, transpose: bool, [f32] range);
    uniform_matrix4x3fv => webgl2_uniform_matrix4x3fv(location: location, transpose: bool, [f32] range);
    vertex_attrib_i4iv => webgl2_vertex_attrib_i4iv(index: u32, [i32]);
    vertex_attrib_i4uiv => webgl2_vertex_attrib_i4uiv(index: u32, [u32]);
}

creators! {
    create_query => webgl2_create_query() as Query;
    create_sampler => webgl2_create_sampler() as Sampler;
    create_transform_feedback => webgl2_create_transform_feedback() as TransformFeedback;
    create_vertex_array => webgl2_create_vertex_array() as VertexArray;
}

deleters! {
    delete_query => webgl2_delete_query_with_query(Query);
    delete_sampler => webgl2_delete_sampler_with_sampler(Sampler);
    delete_transform_feedback => webgl2_delete_transform_feedback(TransformFeedback);
    delete_vertex_array => webgl2_delete_vertex_array_with_vertex_array(VertexArray);
}

predicates! {
    is_query => webgl2_is_query(Query);
    is_sampler => webgl2_is_sampler(Sampler);
    is_transform_feedback => webgl2_is_transform_feedback(TransformFeedback);
    is_vertex_array => webgl2_is_vertex_array(VertexArray);
}

fn fence_sync(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(2)?;
    let mut args = inv.cursor();
    let condition = args.u32()?;
    let flags = args.u32()?;
    let context = inv.context();
    let sync = inv.native().webgl2_fence_sync(condition, flags, context);
    inv.ret_object(GlObject::Sync(sync));
    Ok(())
}

fn delete_sync(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(1)?;
    if inv.arg(0).is_nullish() {
        return Ok(());
    }
    let sync = inv.cursor().sync()?;
    let context = inv.context();
    inv.native().webgl2_delete_sync_with_sync(sync, context);
    Ok(())
}

fn is_sync(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(1)?;
    if inv.arg(0).is_nullish() {
        inv.ret(false);
        return Ok(());
    }
    let sync = inv.cursor().sync()?;
    let context = inv.context();
    let result = inv.native().webgl2_is_sync(sync, context);
    inv.ret(result);
    Ok(())
}

/// `compressedTexSubImage3D`.
///
/// The tenth argument is either the image size, for data taken from the
/// bound pixel unpack buffer, or a view with the compressed data.
fn compressed_tex_sub_image3d(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(10)?;
    let mut args = inv.cursor();
    let target = args.u32()?;
    let level = args.i32()?;
    let xoffset = args.i32()?;
    let yoffset = args.i32()?;
    let zoffset = args.i32()?;
    let width = args.i32()?;
    let height = args.i32()?;
    let depth = args.i32()?;
    let format = args.u32()?;
    let context = inv.context();
    if inv.arg(9).is_number() {
        let image_size = args.i32()?;
        let offset = args.i32()?;
        inv.native().webgl2_compressed_tex_sub_image3d_none(
            target, level, xoffset, yoffset, zoffset, width, height, depth, format, image_size,
            offset, context,
        );
        return Ok(());
    }
    args.skip();
    let src_offset = args.optional_usize()?;
    let src_length_override = args.optional_usize()?;
    inv.view(9, |native, bytes, element_size| {
        let offset = src_offset.checked_mul(element_size)?;
        let length = src_length_override.checked_mul(element_size)?;
        if offset.checked_add(length)? > bytes.len() {
            return None;
        }
        native.webgl2_compressed_tex_sub_image3d(
            target, level, xoffset, yoffset, zoffset, width, height, depth, format, bytes, offset,
            length, context,
        );
        Some(())
    })?
    .ok_or_else(|| out_of_range(10))
}

fn get_active_uniforms(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(3)?;
    let mut args = inv.cursor();
    let program = args.index(crate::handle::ObjectKind::Program)?;
    args.skip();
    let pname = args.u32()?;
    let context = inv.context();
    let result = inv.vector::<u32, _>(1, (0, 0), |native, indices| {
        native.webgl2_get_active_uniforms(program, pname, indices, context)
    })?;
    inv.ret_parameter(result);
    Ok(())
}

fn get_buffer_sub_data(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(3)?;
    let mut args = inv.cursor();
    let target = args.u32()?;
    let src_byte_offset = args.isize()?;
    args.skip();
    let dst_offset = args.optional_usize()?;
    let length = args.optional_usize()?;
    let context = inv.context();
    inv.view_mut(2, |native, bytes, element_size| {
        let dst_offset = dst_offset.checked_mul(element_size)?;
        let length = length.checked_mul(element_size)?;
        if dst_offset.checked_add(length)? > bytes.len() {
            return None;
        }
        native.webgl2_get_buffer_sub_data(target, src_byte_offset, bytes, dst_offset, length, context);
        Some(())
    })?
    .ok_or_else(|| out_of_range(3))
}

fn get_uniform_indices(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(2)?;
    let program = inv.cursor().index(crate::handle::ObjectKind::Program)?;
    let names = inv.strings(1)?;
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let context = inv.context();
    let indices = inv
        .native()
        .webgl2_get_uniform_indices(program, &names, context);
    inv.ret(Value::array(indices.into_iter().map(Value::from)));
    Ok(())
}

fn invalidate_sub_framebuffer(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(6)?;
    let mut args = inv.cursor();
    let target = args.u32()?;
    args.skip();
    let x = args.i32()?;
    let y = args.i32()?;
    let width = args.i32()?;
    let height = args.i32()?;
    let context = inv.context();
    inv.vector::<u32, _>(1, (0, 0), |native, attachments| {
        native.webgl2_invalidate_sub_framebuffer(target, x, y, width, height, attachments, context)
    })
}

/// `texImage3D`.
///
/// The source is `null`, an offset into the bound pixel unpack buffer, an
/// `ImageAsset` or a view.
fn tex_image3d(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(10)?;
    let mut args = inv.cursor();
    let target = args.u32()?;
    let level = args.i32()?;
    let internalformat = args.i32()?;
    let width = args.i32()?;
    let height = args.i32()?;
    let depth = args.i32()?;
    let border = args.i32()?;
    let format = args.u32()?;
    let pixel_type = args.u32()?;
    let context = inv.context();
    let source = inv.arg(9);
    if source.is_nullish() {
        inv.native().webgl2_tex_image3d_none(
            target, level, internalformat, width, height, depth, border, format, pixel_type,
            context,
        );
        return Ok(());
    }
    if source.is_number() {
        let offset = args.isize()?;
        inv.native().webgl2_tex_image3d_offset(
            target, level, internalformat, width, height, depth, border, format, pixel_type,
            offset, context,
        );
        return Ok(());
    }
    if let Some(asset) = inv.asset(9) {
        inv.native().webgl2_tex_image3d_asset(
            target, level, internalformat, width, height, depth, border, format, pixel_type,
            asset, context,
        );
        return Ok(());
    }
    args.skip();
    let src_offset = args.optional_usize()?;
    inv.view(9, |native, bytes, element_size| {
        let offset = src_offset.checked_mul(element_size)?;
        if offset > bytes.len() {
            return None;
        }
        native.webgl2_tex_image3d(
            target, level, internalformat, width, height, depth, border, format, pixel_type,
            bytes, offset, context,
        );
        Some(())
    })?
    .ok_or_else(|| out_of_range(10))
}

/// `texSubImage3D`.
///
/// The source is an offset into the bound pixel unpack buffer, an
/// `ImageAsset` or a view.
fn tex_sub_image3d(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(11)?;
    let mut args = inv.cursor();
    let target = args.u32()?;
    let level = args.i32()?;
    let xoffset = args.i32()?;
    let yoffset = args.i32()?;
    let zoffset = args.i32()?;
    let width = args.i32()?;
    let height = args.i32()?;
    let depth = args.i32()?;
    let format = args.u32()?;
    let pixel_type = args.u32()?;
    let context = inv.context();
    if inv.arg(10).is_number() {
        let offset = args.isize()?;
        inv.native().webgl2_tex_sub_image3d_offset(
            target, level, xoffset, yoffset, zoffset, width, height, depth, format, pixel_type,
            offset, context,
        );
        return Ok(());
    }
    if let Some(asset) = inv.asset(10) {
        inv.native().webgl2_tex_sub_image3d_asset(
            target, level, xoffset, yoffset, zoffset, width, height, depth, format, pixel_type,
            asset, context,
        );
        return Ok(());
    }
    args.skip();
    let src_offset = args.optional_usize()?;
    inv.view(10, |native, bytes, element_size| {
        let offset = src_offset.checked_mul(element_size)?;
        if offset > bytes.len() {
            return None;
        }
        native.webgl2_tex_sub_image3d(
            target, level, xoffset, yoffset, zoffset, width, height, depth, format, pixel_type,
            bytes, offset, context,
        );
        Some(())
    })?
    .ok_or_else(|| out_of_range(11))
}

fn transform_feedback_varyings(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(3)?;
    let mut args = inv.cursor();
    let program = args.index(crate::handle::ObjectKind::Program)?;
    args.skip();
    let buffer_mode = args.u32()?;
    let varyings = inv.strings(1)?;
    let varyings: Vec<&str> = varyings.iter().map(String::as_str).collect();
    let context = inv.context();
    inv.native()
        .webgl2_transform_feedback_varyings(program, buffer_mode, &varyings, context);
    Ok(())
}

/// Methods of `WebGL2RenderingContext` only.
pub(crate) const METHODS: &[(&str, ContextMethod)] = &[
    ("beginQuery", begin_query),
    ("beginTransformFeedback", begin_transform_feedback),
    ("bindBufferBase", bind_buffer_base),
    ("bindBufferRange", bind_buffer_range),
    ("bindSampler", bind_sampler),
    ("bindTransformFeedback", bind_transform_feedback),
    ("bindVertexArray", bind_vertex_array),
    ("blitFramebuffer", blit_framebuffer),
    ("clearBufferfi", clear_bufferfi),
    ("clearBufferfv", clear_bufferfv),
    ("clearBufferiv", clear_bufferiv),
    ("clearBufferuiv", clear_bufferuiv),
    ("clientWaitSync", client_wait_sync),
    ("compressedTexSubImage3D", compressed_tex_sub_image3d),
    ("copyBufferSubData", copy_buffer_sub_data),
    ("copyTexSubImage3D", copy_tex_sub_image3d),
    ("createQuery", create_query),
    ("createSampler", create_sampler),
    ("createTransformFeedback", create_transform_feedback),
    ("createVertexArray", create_vertex_array),
    ("deleteQuery", delete_query),
    ("deleteSampler", delete_sampler),
    ("deleteSync", delete_sync),
    ("deleteTransformFeedback", delete_transform_feedback),
    ("deleteVertexArray", delete_vertex_array),
    ("drawArraysInstanced", draw_arrays_instanced),
    ("drawBuffers", draw_buffers),
    ("drawElementsInstanced", draw_elements_instanced),
    ("drawRangeElements", draw_range_elements),
    ("endQuery", end_query),
    ("endTransformFeedback", end_transform_feedback),
    ("fenceSync", fence_sync),
    ("framebufferTextureLayer", framebuffer_texture_layer),
    ("getActiveUniformBlockName", get_active_uniform_block_name),
    ("getActiveUniformBlockParameter", get_active_uniform_block_parameter),
    ("getActiveUniforms", get_active_uniforms),
    ("getBufferSubData", get_buffer_sub_data),
    ("getFragDataLocation", get_frag_data_location),
    ("getIndexedParameter", get_indexed_parameter),
    ("getInternalformatParameter", get_internalformat_parameter),
    ("getQueryParameter", get_query_parameter),
    ("getQuery", get_query),
    ("getSamplerParameter", get_sampler_parameter),
    ("getSyncParameter", get_sync_parameter),
    ("getTransformFeedbackVarying", get_transform_feedback_varying),
    ("getUniformBlockIndex", get_uniform_block_index),
    ("getUniformIndices", get_uniform_indices),
    ("invalidateFramebuffer", invalidate_framebuffer),
    ("invalidateSubFramebuffer", invalidate_sub_framebuffer),
    ("isQuery", is_query),
    ("isSampler", is_sampler),
    ("isSync", is_sync),
    ("isTransformFeedback", is_transform_feedback),
    ("isVertexArray", is_vertex_array),
    ("pauseTransformFeedback", pause_transform_feedback),
    ("readBuffer", read_buffer),
    ("renderbufferStorageMultisample", renderbuffer_storage_multisample),
    ("resumeTransformFeedback", resume_transform_feedback),
    ("samplerParameterf", sampler_parameterf),
    ("samplerParameteri", sampler_parameteri),
    ("texImage3D", tex_image3d),
    ("texStorage2D", tex_storage2d),
    ("texStorage3D", tex_storage3d),
    ("texSubImage3D", tex_sub_image3d),
    ("transformFeedbackVaryings", transform_feedback_varyings),
    ("uniform1ui", uniform1ui),
    ("uniform2ui", uniform2ui),
    ("uniform3ui", uniform3ui),
    ("uniform4ui", uniform4ui),
    ("uniform1uiv", uniform1uiv),
    ("uniform2uiv", uniform2uiv),
    ("uniform3uiv", uniform3uiv),
    ("uniform4uiv", uniform4uiv),
    ("uniformBlockBinding", uniform_block_binding),
    ("uniformMatrix2x3fv", uniform_matrix2x3fv),
    ("uniformMatrix2x4fv", uniform_matrix2x4fv),
    ("uniformMatrix3x2fv", uniform_matrix3x2fv),
    ("uniformMatrix3x4fv", uniform_matrix3x4fv),
    ("uniformMatrix4x2fv", uniform_matrix4x2fv),
    ("uniformMatrix4x3fv", uniform_matrix4x3fv),
    ("vertexAttribDivisor", vertex_attrib_divisor),
    ("vertexAttribI4i", vertex_attrib_i4i),
    ("vertexAttribI4iv", vertex_attrib_i4iv),
    ("vertexAttribI4ui", vertex_attrib_i4ui),
    ("vertexAttribI4uiv", vertex_attrib_i4uiv),
];
