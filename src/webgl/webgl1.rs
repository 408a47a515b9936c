//! Forwarders of the methods shared by both rendering context classes.

use super::extensions::{get_extension, get_supported_extensions};
use crate::dispatch::{
    creators, deleters, forwarders, vector_forwarders, Invocation,
};
use crate::error::ArgumentError;
use crate::registry::ContextMethod;

forwarders! {
    active_texture => webgl_active_texture(texture: u32);
    attach_shader => webgl_attach_shader(program: index(Program), shader: index(Shader));
    bind_attrib_location => webgl_bind_attrib_location(
        program: index(Program),
        index: u32,
        name: string,
    );
    bind_buffer => webgl_bind_buffer(target: u32, buffer: nullable(Buffer));
    bind_framebuffer => webgl_bind_framebuffer(target: u32, framebuffer: nullable(Framebuffer));
    bind_renderbuffer => webgl_bind_renderbuffer(
        target: u32,
        renderbuffer: nullable(Renderbuffer),
    );
    bind_texture => webgl_bind_texture(target: u32, texture: nullable(Texture));
    blend_color => webgl_blend_color(red: f32, green: f32, blue: f32, alpha: f32);
    blend_equation => webgl_blend_equation(mode: u32);
    blend_equation_separate => webgl_blend_equation_separate(mode_rgb: u32, mode_alpha: u32);
    blend_func => webgl_blend_func(sfactor: u32, dfactor: u32);
    blend_func_separate => webgl_blend_func_separate(
        src_rgb: u32,
        dst_rgb: u32,
        src_alpha: u32,
        dst_alpha: u32,
    );
    check_framebuffer_status => webgl_check_framebuffer_status(target: u32) -> ret;
    clear => webgl_clear(mask: u32);
    clear_color => webgl_clear_color(red: f32, green: f32, blue: f32, alpha: f32);
    clear_depth => webgl_clear_depth(depth: f32);
    clear_stencil => webgl_clear_stencil(stencil: i32);
    color_mask => webgl_color_mask(red: bool, green: bool, blue: bool, alpha: bool);
    compile_shader => webgl_compile_shader(shader: index(Shader));
    cull_face => webgl_cull_face(mode: u32);
    depth_func => webgl_depth_func(func: u32);
    depth_mask => webgl_depth_mask(flag: bool);
    disable => webgl_disable(cap: u32);
    disable_vertex_attrib_array => webgl_disable_vertex_attrib_array(index: u32);
    draw_arrays => webgl_draw_arrays(mode: u32, first: i32, count: i32);
    draw_elements => webgl_draw_elements(mode: u32, count: i32, element_type: u32, offset: isize);
    enable => webgl_enable(cap: u32);
    enable_vertex_attrib_array => webgl_enable_vertex_attrib_array(index: u32);
    finish => webgl_finish();
    flush => webgl_flush();
    framebuffer_renderbuffer => webgl_framebuffer_renderbuffer(
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: nullable(Renderbuffer),
    );
    framebuffer_texture2d => webgl_framebuffer_texture2d(
        target: u32,
        attachment: u32,
        textarget: u32,
        texture: nullable(Texture),
        level: i32,
    );
    generate_mipmap => webgl_generate_mipmap(target: u32);
    get_attrib_location => webgl_get_attrib_location(program: index(Program), name: string) -> ret;
    get_error => webgl_get_error() -> ret;
    get_parameter => webgl_get_parameter(pname: u32) -> ret_parameter;
    get_program_info_log => webgl_get_program_info_log(program: index(Program)) -> ret;
    get_program_parameter => webgl_get_program_parameter(
        program: index(Program),
        pname: u32,
    ) -> ret_parameter;
    get_shader_info_log => webgl_get_shader_info_log(shader: index(Shader)) -> ret;
    get_shader_parameter => webgl_get_shader_parameter(
        shader: index(Shader),
        pname: u32,
    ) -> ret_parameter;
    get_uniform_location => webgl_get_uniform_location(
        program: index(Program),
        name: string,
    ) -> ret_location;
    link_program => webgl_link_program(program: index(Program));
    pixel_storei => webgl_pixel_storei(pname: u32, param: i32);
    renderbuffer_storage => webgl_renderbuffer_storage(
        target: u32,
        internal_format: u32,
        width: i32,
        height: i32,
    );
    scissor => webgl_scissor(x: i32, y: i32, width: i32, height: i32);
    shader_source => webgl_shader_source(shader: index(Shader), source: string);
    tex_parameterf => webgl_tex_parameterf(target: u32, pname: u32, param: f32);
    tex_parameteri => webgl_tex_parameteri(target: u32, pname: u32, param: i32);
    uniform1f => webgl_uniform1f(location: location, v0: f32);
    uniform2f => webgl_uniform2f(location: location, v0: f32, v1: f32);
    uniform3f => webgl_uniform3f(location: location, v0: f32, v1: f32, v2: f32);
    uniform4f => webgl_uniform4f(location: location, v0: f32, v1: f32, v2: f32, v3: f32);
    uniform1i => webgl_uniform1i(location: location, v0: i32);
    uniform2i => webgl_uniform2i(location: location, v0: i32, v1: i32);
    uniform3i => webgl_uniform3i(location: location, v0: i32, v1: i32, v2: i32);
    uniform4i => webgl_uniform4i(location: location, v0: i32, v1: i32, v2: i32, v3: i32);
    use_program => webgl_use_program(program: nullable(Program));
    vertex_attrib_pointer => webgl_vertex_attrib_pointer(
        index: u32,
        size: i32,
        attrib_type: u32,
        normalized: bool,
        stride: i32,
        offset: isize,
    );
    viewport => webgl_viewport(x: i32, y: i32, width: i32, height: i32);
}

vector_forwarders! {
    uniform1fv => webgl_uniform1fv(location: location, [f32] range);
    uniform2fv => webgl_uniform2fv(location: location, [f32] range);
    uniform3fv => webgl_uniform3fv(location: location, [f32] range);
    uniform4fv => webgl_uniform4fv(location: location, [f32] range);
    uniform1iv => webgl_uniform1iv(location: location, [i32] range);
    uniform2iv => webgl_uniform2iv(location: location, [i32] range);
    uniform3iv => webgl_uniform3iv(location: location, [i32] range);
    uniform4iv => webgl_uniform4iv(location: location, [i32] range);
    uniform_matrix2fv => webgl_uniform_matrix2fv(location: location, transpose: bool, [f32] range);
    uniform_matrix3fv => webgl_uniform_matrix3fv(location: location, transpose: bool, [f32] range);
    uniform_matrix4fv => webgl_uniform_matrix4fv(location: location, transpose: bool, [f32] range);
}

creators! {
    create_buffer => webgl_create_buffer() as Buffer;
    create_framebuffer => webgl_create_framebuffer() as Framebuffer;
    create_program => webgl_create_program() as Program;
    create_renderbuffer => webgl_create_renderbuffer() as Renderbuffer;
    create_shader => webgl_create_shader(shader_type: u32) as Shader;
    create_texture => webgl_create_texture() as Texture;
}

deleters! {
    delete_buffer => webgl_delete_buffer(Buffer);
    delete_framebuffer => webgl_delete_framebuffer(Framebuffer);
    delete_program => webgl_delete_program(Program);
    delete_renderbuffer => webgl_delete_renderbuffer(Renderbuffer);
    delete_shader => webgl_delete_shader(Shader);
    delete_texture => webgl_delete_texture(Texture);
}

/// Returns the part of a byte source selected by an element offset and an
/// element count. A count of zero selects the rest of the source.
pub(crate) fn sub_bytes(
    bytes: &[u8],
    element_size: usize,
    offset: usize,
    length: usize,
) -> Option<&[u8]> {
    let start = offset.checked_mul(element_size)?;
    let bytes = bytes.get(start..)?;
    match length {
        0 => Some(bytes),
        n => bytes.get(..n.checked_mul(element_size)?),
    }
}

pub(crate) fn out_of_range(index: usize) -> ArgumentError {
    ArgumentError::WrongType {
        index,
        expected: "an offset within the source",
    }
}

fn buffer_data(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(3)?;
    let mut args = inv.cursor();
    let target = args.u32()?;
    args.skip();
    let usage = args.u32()?;
    let src_offset = args.optional_usize()?;
    let length = args.optional_usize()?;
    let context = inv.context();
    if inv.arg(1).is_number() {
        let size = inv.arg(1).to_integer() as isize;
        inv.native().webgl_buffer_data_none(target, size, usage, context);
        return Ok(());
    }
    inv.view(1, |native, bytes, element_size| {
        let data = sub_bytes(bytes, element_size, src_offset, length)?;
        native.webgl_buffer_data(target, usage, data, context);
        Some(())
    })?
    .ok_or_else(|| out_of_range(3))
}

fn buffer_sub_data(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(3)?;
    let mut args = inv.cursor();
    let target = args.u32()?;
    let offset = args.isize()?;
    args.skip();
    let src_offset = args.optional_usize()?;
    let length = args.optional_usize()?;
    let context = inv.context();
    inv.view(2, |native, bytes, element_size| {
        let data = sub_bytes(bytes, element_size, src_offset, length)?;
        native.webgl_buffer_sub_data(target, offset, data, context);
        Some(())
    })?
    .ok_or_else(|| out_of_range(3))
}

fn read_pixels(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(7)?;
    let mut args = inv.cursor();
    let x = args.i32()?;
    let y = args.i32()?;
    let width = args.i32()?;
    let height = args.i32()?;
    let format = args.u32()?;
    let pixel_type = args.u32()?;
    args.skip();
    let dst_offset = args.optional_usize()?;
    let context = inv.context();
    inv.view_mut(6, |native, bytes, element_size| {
        let start = dst_offset.checked_mul(element_size)?;
        let pixels = bytes.get_mut(start..)?;
        native.webgl_read_pixels(x, y, width, height, format, pixel_type, pixels, context);
        Some(())
    })?
    .ok_or_else(|| out_of_range(7))
}

/// `texImage2D`.
///
/// The nine argument overload takes a pixel source, which may be `null`. The
/// six argument overload takes an `ImageAsset`.
fn tex_image2d(inv: &mut Invocation<'_, '_>) -> Result<(), ArgumentError> {
    inv.require(6)?;
    let context = inv.context();
    let mut args = inv.cursor();
    let target = args.u32()?;
    let level = args.i32()?;
    let internalformat = args.i32()?;
    if inv.len() < 9 {
        let format = args.u32()?;
        let pixel_type = args.u32()?;
        let asset = inv.asset(5).ok_or(ArgumentError::WrongInstance {
            index: 5,
            expected: "ImageAsset",
        })?;
        inv.native().webgl_tex_image2d_asset(
            target,
            level,
            internalformat,
            format,
            pixel_type,
            asset,
            context,
        );
        return Ok(());
    }
    let width = args.i32()?;
    let height = args.i32()?;
    let border = args.i32()?;
    let format = args.u32()?;
    let pixel_type = args.u32()?;
    args.skip();
    let src_offset = args.optional_usize()?;
    if inv.arg(8).is_nullish() {
        inv.native().webgl_tex_image2d_none(
            target,
            level,
            internalformat,
            width,
            height,
            border,
            format,
            pixel_type,
            context,
        );
        return Ok(());
    }
    inv.view(8, |native, bytes, element_size| {
        let pixels = sub_bytes(bytes, element_size, src_offset, 0)?;
        native.webgl_tex_image2d(
            target,
            level,
            internalformat,
            width,
            height,
            border,
            format,
            pixel_type,
            pixels,
            context,
        );
        Some(())
    })?
    .ok_or_else(|| out_of_range(9))
}

/// Methods of both rendering context classes.
pub(crate) const METHODS: &[(&str, ContextMethod)] = &[
    ("activeTexture", active_texture),
    ("attachShader", attach_shader),
    ("bindAttribLocation", bind_attrib_location),
    ("bindBuffer", bind_buffer),
    ("bindFramebuffer", bind_framebuffer),
    ("bindRenderbuffer", bind_renderbuffer),
    ("bindTexture", bind_texture),
    ("blendColor", blend_color),
    ("blendEquation", blend_equation),
    ("blendEquationSeparate", blend_equation_separate),
    ("blendFunc", blend_func),
    ("blendFuncSeparate", blend_func_separate),
    ("bufferData", buffer_data),
    ("bufferSubData", buffer_sub_data),
    ("checkFramebufferStatus", check_framebuffer_status),
    ("clear", clear),
    ("clearColor", clear_color),
    ("clearDepth", clear_depth),
    ("clearStencil", clear_stencil),
    ("colorMask", color_mask),
    ("compileShader", compile_shader),
    ("createBuffer", create_buffer),
    ("createFramebuffer", create_framebuffer),
    ("createProgram", create_program),
    ("createRenderbuffer", create_renderbuffer),
    ("createShader", create_shader),
    ("createTexture", create_texture),
    ("cullFace", cull_face),
    ("deleteBuffer", delete_buffer),
    ("deleteFramebuffer", delete_framebuffer),
    ("deleteProgram", delete_program),
    ("deleteRenderbuffer", delete_renderbuffer),
    ("deleteShader", delete_shader),
    ("deleteTexture", delete_texture),
    ("depthFunc", depth_func),
    ("depthMask", depth_mask),
    ("disable", disable),
    ("disableVertexAttribArray", disable_vertex_attrib_array),
    ("drawArrays", draw_arrays),
    ("drawElements", draw_elements),
    ("enable", enable),
    ("enableVertexAttribArray", enable_vertex_attrib_array),
    ("finish", finish),
    ("flush", flush),
    ("framebufferRenderbuffer", framebuffer_renderbuffer),
    ("framebufferTexture2D", framebuffer_texture2d),
    ("generateMipmap", generate_mipmap),
    ("getAttribLocation", get_attrib_location),
    ("getError", get_error),
    ("getExtension", get_extension),
    ("getParameter", get_parameter),
    ("getProgramInfoLog", get_program_info_log),
    ("getProgramParameter", get_program_parameter),
    ("getShaderInfoLog", get_shader_info_log),
    ("getShaderParameter", get_shader_parameter),
    ("getSupportedExtensions", get_supported_extensions),
    ("getUniformLocation", get_uniform_location),
    ("linkProgram", link_program),
    ("pixelStorei", pixel_storei),
    ("readPixels", read_pixels),
    ("renderbufferStorage", renderbuffer_storage),
    ("scissor", scissor),
    ("shaderSource", shader_source),
    ("texImage2D", tex_image2d),
    ("texParameterf", tex_parameterf),
    ("texParameteri", tex_parameteri),
    ("uniform1f", uniform1f),
    ("uniform2f", uniform2f),
    ("uniform3f", uniform3f),
    ("uniform4f", uniform4f),
    ("uniform1i", uniform1i),
    ("uniform2i", uniform2i),
    ("uniform3i", uniform3i),
    ("uniform4i", uniform4i),
    ("uniform1fv", uniform1fv),
    ("uniform2fv", uniform2fv),
    ("uniform3fv", uniform3fv),
    ("uniform4fv", uniform4fv),
    ("uniform1iv", uniform1iv),
    ("uniform2iv", uniform2iv),
    ("uniform3iv", uniform3iv),
    ("uniform4iv", uniform4iv),
    ("uniformMatrix2fv", uniform_matrix2fv),
    ("uniformMatrix3fv", uniform_matrix3fv),
    ("uniformMatrix4fv", uniform_matrix4fv),
    ("useProgram", use_program),
    ("vertexAttribPointer", vertex_attrib_pointer),
    ("viewport", viewport),
];

#[cfg(test)]
mod test {
    use super::*;
    use crate::isolate::Isolate;
    use crate::native::recording::{Arg, RecordingEngine, Reply};
    use crate::value::{Array, TypedArray, Value};
    use crate::webgl::test::webgl2;

    #[test]
    fn sub_bytes_scales_offsets() {
        let bytes = [0u8, 1, 2, 3, 4, 5, 6, 7];
        assert_eq!(sub_bytes(&bytes, 4, 1, 0), Some(&bytes[4..]));
        assert_eq!(sub_bytes(&bytes, 2, 1, 2), Some(&bytes[2..6]));
        assert_eq!(sub_bytes(&bytes, 4, 3, 0), None);
        assert_eq!(sub_bytes(&bytes, 1, 0, 9), None);
    }

    #[test]
    fn every_method_is_installed() {
        let isolate = Isolate::new(RecordingEngine::new());
        let context = webgl2(&isolate);
        let scope = isolate.enter();
        let template = scope
            .registry()
            .template_of(context.as_object().unwrap().class().unwrap())
            .unwrap();
        for (name, _) in METHODS {
            assert!(template.has_method(name), "{name}");
        }
    }

    #[test]
    fn create_and_bind() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl2(&isolate);
        let scope = isolate.enter();
        engine.reply("webgl_create_buffer", Reply::U32(42));
        let buffer = scope
            .call_method(&context, "createBuffer", Vec::new())
            .unwrap()
            .unwrap();
        assert!(scope.instance_of(&buffer, &scope.global("WebGLBuffer")));
        engine.clear();
        scope
            .call_method(&context, "bindBuffer", vec![Value::from(0x8892), buffer])
            .unwrap();
        scope
            .call_method(&context, "bindBuffer", vec![Value::from(0x8892), Value::Null])
            .unwrap();
        let calls = engine.calls_to("webgl_bind_buffer");
        assert_eq!(calls[0].args, vec![Arg::U32(0x8892), Arg::U32(42)]);
        assert_eq!(calls[1].args, vec![Arg::U32(0x8892), Arg::U32(0)]);
    }

    #[test]
    fn wrong_class_is_never_forwarded() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl2(&isolate);
        let scope = isolate.enter();
        let texture = scope
            .call_method(&context, "createTexture", Vec::new())
            .unwrap()
            .unwrap();
        engine.clear();
        for (method, args) in [
            ("bindBuffer", vec![Value::from(0x8892), texture.clone()]),
            ("useProgram", vec![texture.clone()]),
            ("deleteShader", vec![texture.clone()]),
            ("compileShader", vec![Value::from(1)]),
            ("uniform1f", vec![texture.clone(), Value::from(1.0)]),
        ] {
            let result = scope.call_method(&context, method, args).unwrap();
            assert!(result.is_none());
        }
        assert_eq!(engine.call_count(), 0);
    }

    #[test]
    fn uniform_locations() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl2(&isolate);
        let scope = isolate.enter();
        let program = scope
            .call_method(&context, "createProgram", Vec::new())
            .unwrap()
            .unwrap();
        engine.reply("webgl_get_uniform_location", Reply::I32(-1));
        let missing = scope
            .call_method(&context, "getUniformLocation", vec![program.clone(), Value::from("u_none")])
            .unwrap()
            .unwrap();
        assert!(matches!(missing, Value::Null));
        engine.reply("webgl_get_uniform_location", Reply::I32(3));
        let location = scope
            .call_method(&context, "getUniformLocation", vec![program, Value::from("u_color")])
            .unwrap()
            .unwrap();
        engine.clear();
        scope
            .call_method(
                &context,
                "uniform4fv",
                vec![
                    location,
                    Value::Array(Array::from_values([1.0, 0.5, 0.25, 1.0].map(Value::from))),
                ],
            )
            .unwrap();
        assert_eq!(
            engine.last().unwrap().args,
            vec![Arg::I32(3), Arg::F32s(vec![1.0, 0.5, 0.25, 1.0])]
        );
    }

    #[test]
    fn string_arguments() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl2(&isolate);
        let scope = isolate.enter();
        engine.reply("webgl_create_program", Reply::U32(7));
        let program = scope
            .call_method(&context, "createProgram", Vec::new())
            .unwrap()
            .unwrap();
        engine.reply("webgl_create_shader", Reply::U32(9));
        let shader = scope
            .call_method(&context, "createShader", vec![Value::from(0x8B31)])
            .unwrap()
            .unwrap();
        engine.clear();

        scope
            .call_method(&context, "shaderSource", vec![shader, Value::from("void main() {}")])
            .unwrap();
        assert_eq!(
            engine.last().unwrap().args,
            vec![Arg::U32(9), Arg::Str("void main() {}".to_string())]
        );

        scope
            .call_method(
                &context,
                "bindAttribLocation",
                vec![program.clone(), Value::from(0), Value::from("a_position")],
            )
            .unwrap();
        assert_eq!(
            engine.last().unwrap().args,
            vec![Arg::U32(7), Arg::U32(0), Arg::Str("a_position".to_string())]
        );

        engine.reply("webgl_get_attrib_location", Reply::I32(2));
        let attrib = scope
            .call_method(&context, "getAttribLocation", vec![program.clone(), Value::from("a_uv")])
            .unwrap()
            .unwrap();
        assert!(attrib.strict_equals(&Value::from(2)));
        assert_eq!(
            engine.last().unwrap().args,
            vec![Arg::U32(7), Arg::Str("a_uv".to_string())]
        );

        scope
            .call_method(&context, "getUniformLocation", vec![program, Value::from(5)])
            .unwrap();
        let call = engine.last().unwrap();
        assert_eq!(call.op, "webgl_get_uniform_location");
        assert_eq!(call.args, vec![Arg::U32(7), Arg::Str("5".to_string())]);
        assert_eq!(engine.call_count(), 4);
    }

    #[test]
    fn buffer_data_overloads() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl2(&isolate);
        let scope = isolate.enter();
        engine.clear();
        scope
            .call_method(
                &context,
                "bufferData",
                vec![Value::from(0x8892), Value::from(1024), Value::from(0x88E4)],
            )
            .unwrap();
        let data = TypedArray::from_slice(&[1u16, 2, 3]);
        scope
            .call_method(
                &context,
                "bufferData",
                vec![
                    Value::from(0x8892),
                    Value::from(data),
                    Value::from(0x88E4),
                    Value::from(1),
                ],
            )
            .unwrap();
        let calls = engine.calls();
        assert_eq!(calls[0].op, "webgl_buffer_data_none");
        assert_eq!(
            calls[0].args,
            vec![Arg::U32(0x8892), Arg::Isize(1024), Arg::U32(0x88E4)]
        );
        assert_eq!(calls[1].op, "webgl_buffer_data");
        assert_eq!(
            calls[1].args,
            vec![
                Arg::U32(0x8892),
                Arg::U32(0x88E4),
                Arg::Bytes(bytemuck::cast_slice(&[2u16, 3]).to_vec()),
            ]
        );
    }

    #[test]
    fn tex_image2d_overloads() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl2(&isolate);
        let scope = isolate.enter();
        engine.clear();
        let mut args: Vec<Value> = [0x0DE1, 0, 0x1908, 2, 1, 0, 0x1908, 0x1401]
            .into_iter()
            .map(Value::from)
            .collect();
        args.push(Value::Null);
        scope.call_method(&context, "texImage2D", args.clone()).unwrap();
        args[8] = Value::from(TypedArray::from_slice(&[255u8; 8]));
        scope.call_method(&context, "texImage2D", args).unwrap();
        let ops: Vec<_> = engine.calls().into_iter().map(|call| call.op).collect();
        assert_eq!(ops, vec!["webgl_tex_image2d_none", "webgl_tex_image2d"]);
        assert_eq!(engine.last().unwrap().args[8], Arg::Bytes(vec![255; 8]));
    }

    #[test]
    fn read_pixels_writes_into_view() {
        let engine = RecordingEngine::new();
        let isolate = Isolate::new(engine.clone());
        let context = webgl2(&isolate);
        let scope = isolate.enter();
        engine.clear();
        let pixels = TypedArray::new(crate::value::ElementKind::Uint8, 16);
        let mut args: Vec<Value> = [0, 0, 2, 2, 0x1908, 0x1401]
            .into_iter()
            .map(Value::from)
            .collect();
        args.push(Value::from(pixels));
        scope.call_method(&context, "readPixels", args).unwrap();
        let call = engine.last().unwrap();
        assert_eq!(call.op, "webgl_read_pixels");
        assert_eq!(call.args[6], Arg::Bytes(vec![0; 16]));
    }
}
