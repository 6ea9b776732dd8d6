//! Static pass tables
//!
//! Core passes follow the Linux OpenGL ABI: libGL must export GL 1.2 and
//! GLX 1.3 directly. Everything newer goes through glXGetProcAddressARB.
//! Order matters: baseline first, then each version's additions.

use super::pass::{LibraryKind, ResolutionPass};

// ============================================================================
// Core (exported, mandatory)
// ============================================================================

#[rustfmt::skip]
const GL_1_1: &[&str] = &[
    "glAccum", "glAlphaFunc", "glAreTexturesResident", "glArrayElement", "glBegin",
    "glBindTexture", "glBitmap", "glBlendFunc", "glCallList", "glCallLists", "glClear",
    "glClearAccum", "glClearColor", "glClearDepth", "glClearIndex", "glClearStencil",
    "glClipPlane", "glColor3f", "glColor3fv", "glColor3ub", "glColor3ubv", "glColor4f",
    "glColor4fv", "glColor4ub", "glColor4ubv", "glColorMask", "glColorMaterial",
    "glColorPointer", "glCopyPixels", "glCopyTexImage1D", "glCopyTexImage2D",
    "glCopyTexSubImage1D", "glCopyTexSubImage2D", "glCullFace", "glDeleteLists",
    "glDeleteTextures", "glDepthFunc", "glDepthMask", "glDepthRange", "glDisable",
    "glDisableClientState", "glDrawArrays", "glDrawBuffer", "glDrawElements", "glDrawPixels",
    "glEdgeFlag", "glEnable", "glEnableClientState", "glEnd", "glEndList", "glEvalCoord2f",
    "glFeedbackBuffer", "glFinish", "glFlush", "glFogf", "glFogfv", "glFogi", "glFrontFace",
    "glFrustum", "glGenLists", "glGenTextures", "glGetBooleanv", "glGetDoublev", "glGetError",
    "glGetFloatv", "glGetIntegerv", "glGetLightfv", "glGetMaterialfv", "glGetPointerv",
    "glGetString", "glGetTexEnvfv", "glGetTexImage", "glGetTexLevelParameteriv",
    "glGetTexParameteriv", "glHint", "glIndexPointer", "glInitNames", "glInterleavedArrays",
    "glIsEnabled", "glIsList", "glIsTexture", "glLightModelf", "glLightModelfv",
    "glLightModeli", "glLightf", "glLightfv", "glLineStipple", "glLineWidth", "glListBase",
    "glLoadIdentity", "glLoadMatrixd", "glLoadMatrixf", "glLoadName", "glLogicOp",
    "glMaterialf", "glMaterialfv", "glMatrixMode", "glMultMatrixd", "glMultMatrixf",
    "glNewList", "glNormal3f", "glNormal3fv", "glNormalPointer", "glOrtho", "glPassThrough",
    "glPixelStoref", "glPixelStorei", "glPixelTransferf", "glPixelZoom", "glPointSize",
    "glPolygonMode", "glPolygonOffset", "glPolygonStipple", "glPopAttrib",
    "glPopClientAttrib", "glPopMatrix", "glPopName", "glPrioritizeTextures", "glPushAttrib",
    "glPushClientAttrib", "glPushMatrix", "glPushName", "glRasterPos2f", "glRasterPos2i",
    "glRasterPos3f", "glReadBuffer", "glReadPixels", "glRectf", "glRecti", "glRenderMode",
    "glRotated", "glRotatef", "glScaled", "glScalef", "glScissor", "glSelectBuffer",
    "glShadeModel", "glStencilFunc", "glStencilMask", "glStencilOp", "glTexCoord1f",
    "glTexCoord2f", "glTexCoord2fv", "glTexCoord3f", "glTexCoord4f", "glTexCoordPointer",
    "glTexEnvf", "glTexEnvfv", "glTexEnvi", "glTexGenf", "glTexGenfv", "glTexGeni",
    "glTexImage1D", "glTexImage2D", "glTexParameterf", "glTexParameterfv", "glTexParameteri",
    "glTexParameteriv", "glTexSubImage1D", "glTexSubImage2D", "glTranslated", "glTranslatef",
    "glVertex2f", "glVertex2fv", "glVertex2i", "glVertex3f", "glVertex3fv", "glVertex3i",
    "glVertex4f", "glVertexPointer", "glViewport",
];

#[rustfmt::skip]
const GL_1_2: &[&str] = &[
    "glDrawRangeElements",
    "glTexImage3D",
    "glTexSubImage3D",
    "glCopyTexSubImage3D",
];

#[rustfmt::skip]
const GLX_1_0: &[&str] = &[
    "glXChooseVisual", "glXCreateContext", "glXDestroyContext", "glXMakeCurrent",
    "glXCopyContext", "glXSwapBuffers", "glXCreateGLXPixmap", "glXDestroyGLXPixmap",
    "glXQueryExtension", "glXQueryVersion", "glXIsDirect", "glXGetConfig",
    "glXGetCurrentContext", "glXGetCurrentDrawable", "glXWaitGL", "glXWaitX", "glXUseXFont",
];

#[rustfmt::skip]
const GLX_1_1: &[&str] = &[
    "glXQueryExtensionsString",
    "glXQueryServerString",
    "glXGetClientString",
];

#[rustfmt::skip]
const GLX_1_2: &[&str] = &["glXGetCurrentDisplay"];

#[rustfmt::skip]
const GLX_1_3: &[&str] = &[
    "glXGetFBConfigs", "glXChooseFBConfig", "glXGetFBConfigAttrib",
    "glXGetVisualFromFBConfig", "glXCreateWindow", "glXDestroyWindow", "glXCreatePixmap",
    "glXDestroyPixmap", "glXCreatePbuffer", "glXDestroyPbuffer", "glXQueryDrawable",
    "glXCreateNewContext", "glXMakeContextCurrent", "glXGetCurrentReadDrawable",
    "glXQueryContext", "glXSelectEvent", "glXGetSelectedEvent",
];

#[rustfmt::skip]
const GLU_1_3: &[&str] = &[
    "gluBuild1DMipmaps", "gluBuild2DMipmaps", "gluCheckExtension", "gluCylinder",
    "gluDeleteQuadric", "gluDeleteTess", "gluDisk", "gluErrorString", "gluGetString",
    "gluLookAt", "gluNewQuadric", "gluNewTess", "gluOrtho2D", "gluPartialDisk",
    "gluPerspective", "gluPickMatrix", "gluProject", "gluQuadricDrawStyle",
    "gluQuadricNormals", "gluQuadricTexture", "gluScaleImage", "gluSphere",
    "gluTessBeginContour", "gluTessBeginPolygon", "gluTessCallback", "gluTessEndContour",
    "gluTessEndPolygon", "gluTessVertex", "gluUnProject",
];

/// Mandatory passes against libGL, in dependency order
#[rustfmt::skip]
pub static GL_CORE_PASSES: &[ResolutionPass] = &[
    ResolutionPass::core("GL_VERSION_1_1", LibraryKind::Gl, GL_1_1),
    ResolutionPass::core("GL_VERSION_1_2", LibraryKind::Gl, GL_1_2),
    ResolutionPass::core("GLX_VERSION_1_0", LibraryKind::Gl, GLX_1_0),
    ResolutionPass::core("GLX_VERSION_1_1", LibraryKind::Gl, GLX_1_1),
    ResolutionPass::core("GLX_VERSION_1_2", LibraryKind::Gl, GLX_1_2),
    ResolutionPass::core("GLX_VERSION_1_3", LibraryKind::Gl, GLX_1_3),
];

/// Mandatory pass against libGLU (only when GLU is requested)
#[rustfmt::skip]
pub static GLU_CORE_PASSES: &[ResolutionPass] =
    &[ResolutionPass::core("GLU_VERSION_1_3", LibraryKind::Glu, GLU_1_3)];

// ============================================================================
// Version additions (queried, gated on GL_VERSION)
// ============================================================================

#[rustfmt::skip]
const GL_1_3: &[&str] = &[
    "glActiveTexture", "glClientActiveTexture", "glCompressedTexImage1D",
    "glCompressedTexImage2D", "glCompressedTexImage3D", "glCompressedTexSubImage1D",
    "glCompressedTexSubImage2D", "glCompressedTexSubImage3D", "glGetCompressedTexImage",
    "glLoadTransposeMatrixf", "glLoadTransposeMatrixd", "glMultTransposeMatrixf",
    "glMultTransposeMatrixd", "glMultiTexCoord1f", "glMultiTexCoord2f", "glMultiTexCoord2fv",
    "glMultiTexCoord3f", "glMultiTexCoord3fv", "glMultiTexCoord4f", "glMultiTexCoord4fv",
    "glSampleCoverage",
];

#[rustfmt::skip]
const GL_1_4: &[&str] = &[
    "glBlendColor", "glBlendEquation", "glBlendFuncSeparate", "glFogCoordf", "glFogCoordfv",
    "glFogCoordPointer", "glMultiDrawArrays", "glMultiDrawElements", "glPointParameterf",
    "glPointParameterfv", "glPointParameteri", "glPointParameteriv", "glSecondaryColor3f",
    "glSecondaryColor3fv", "glSecondaryColor3ub", "glSecondaryColorPointer", "glWindowPos2f",
    "glWindowPos2i", "glWindowPos3f", "glWindowPos3i",
];

#[rustfmt::skip]
const GL_1_5: &[&str] = &[
    "glGenQueries", "glDeleteQueries", "glIsQuery", "glBeginQuery", "glEndQuery",
    "glGetQueryiv", "glGetQueryObjectiv", "glGetQueryObjectuiv", "glBindBuffer",
    "glDeleteBuffers", "glGenBuffers", "glIsBuffer", "glBufferData", "glBufferSubData",
    "glGetBufferSubData", "glMapBuffer", "glUnmapBuffer", "glGetBufferParameteriv",
    "glGetBufferPointerv",
];

#[rustfmt::skip]
const GL_2_0: &[&str] = &[
    "glBlendEquationSeparate", "glDrawBuffers", "glStencilOpSeparate",
    "glStencilFuncSeparate", "glStencilMaskSeparate", "glAttachShader",
    "glBindAttribLocation", "glCompileShader", "glCreateProgram", "glCreateShader",
    "glDeleteProgram", "glDeleteShader", "glDetachShader", "glDisableVertexAttribArray",
    "glEnableVertexAttribArray", "glGetActiveAttrib", "glGetActiveUniform",
    "glGetAttachedShaders", "glGetAttribLocation", "glGetProgramiv", "glGetProgramInfoLog",
    "glGetShaderiv", "glGetShaderInfoLog", "glGetShaderSource", "glGetUniformLocation",
    "glGetUniformfv", "glGetUniformiv", "glIsProgram", "glIsShader", "glLinkProgram",
    "glShaderSource", "glUseProgram", "glUniform1f", "glUniform2f", "glUniform3f",
    "glUniform4f", "glUniform1i", "glUniform2i", "glUniform3i", "glUniform4i",
    "glUniform1fv", "glUniform2fv", "glUniform3fv", "glUniform4fv", "glUniform1iv",
    "glUniformMatrix2fv", "glUniformMatrix3fv", "glUniformMatrix4fv", "glValidateProgram",
    "glVertexAttrib1f", "glVertexAttrib2f", "glVertexAttrib3f", "glVertexAttrib4f",
    "glVertexAttribPointer",
];

/// Version passes, oldest first
#[rustfmt::skip]
pub static VERSION_PASSES: &[ResolutionPass] = &[
    ResolutionPass::version("GL_VERSION_1_3", 1, 3, GL_1_3),
    ResolutionPass::version("GL_VERSION_1_4", 1, 4, GL_1_4),
    ResolutionPass::version("GL_VERSION_1_5", 1, 5, GL_1_5),
    ResolutionPass::version("GL_VERSION_2_0", 2, 0, GL_2_0),
];

// ============================================================================
// Extensions (queried, gated on extension tokens)
// ============================================================================

/// Optional extension passes
#[rustfmt::skip]
pub static EXTENSION_PASSES: &[ResolutionPass] = &[
    ResolutionPass::extension("GL_ARB_multitexture", "GL_ARB_multitexture", &[
        "glActiveTextureARB", "glClientActiveTextureARB", "glMultiTexCoord1fARB",
        "glMultiTexCoord2fARB", "glMultiTexCoord2fvARB", "glMultiTexCoord3fARB",
        "glMultiTexCoord3fvARB", "glMultiTexCoord4fARB", "glMultiTexCoord4fvARB",
    ]),
    ResolutionPass::extension("GL_ARB_transpose_matrix", "GL_ARB_transpose_matrix", &[
        "glLoadTransposeMatrixfARB", "glLoadTransposeMatrixdARB",
        "glMultTransposeMatrixfARB", "glMultTransposeMatrixdARB",
    ]),
    ResolutionPass::extension("GL_ARB_multisample", "GL_ARB_multisample", &[
        "glSampleCoverageARB",
    ]),
    ResolutionPass::extension("GL_ARB_texture_compression", "GL_ARB_texture_compression", &[
        "glCompressedTexImage1DARB", "glCompressedTexImage2DARB", "glCompressedTexImage3DARB",
        "glCompressedTexSubImage1DARB", "glCompressedTexSubImage2DARB",
        "glCompressedTexSubImage3DARB", "glGetCompressedTexImageARB",
    ]),
    ResolutionPass::extension("GL_EXT_texture3D", "GL_EXT_texture3D", &[
        "glTexImage3DEXT", "glTexSubImage3DEXT",
    ]),
    ResolutionPass::extension("GL_EXT_blend_color", "GL_EXT_blend_color", &[
        "glBlendColorEXT",
    ]),
    ResolutionPass::extension("GL_EXT_blend_minmax", "GL_EXT_blend_minmax", &[
        "glBlendEquationEXT",
    ]),
    ResolutionPass::extension("GL_EXT_blend_func_separate", "GL_EXT_blend_func_separate", &[
        "glBlendFuncSeparateEXT",
    ]),
    ResolutionPass::extension("GL_ARB_point_parameters", "GL_ARB_point_parameters", &[
        "glPointParameterfARB", "glPointParameterfvARB",
    ]),
    ResolutionPass::extension("GL_EXT_point_parameters", "GL_EXT_point_parameters", &[
        "glPointParameterfEXT", "glPointParameterfvEXT",
    ]),
    ResolutionPass::extension("GL_EXT_secondary_color", "GL_EXT_secondary_color", &[
        "glSecondaryColor3fEXT", "glSecondaryColor3fvEXT", "glSecondaryColor3ubEXT",
        "glSecondaryColorPointerEXT",
    ]),
    ResolutionPass::extension("GL_EXT_fog_coord", "GL_EXT_fog_coord", &[
        "glFogCoordfEXT", "glFogCoordfvEXT", "glFogCoordPointerEXT",
    ]),
    ResolutionPass::extension("GL_EXT_multi_draw_arrays", "GL_EXT_multi_draw_arrays", &[
        "glMultiDrawArraysEXT", "glMultiDrawElementsEXT",
    ]),
    ResolutionPass::extension("GL_ARB_window_pos", "GL_ARB_window_pos", &[
        "glWindowPos2fARB", "glWindowPos2iARB", "glWindowPos3fARB", "glWindowPos3iARB",
    ]),
    ResolutionPass::extension("GL_ARB_vertex_buffer_object", "GL_ARB_vertex_buffer_object", &[
        "glBindBufferARB", "glDeleteBuffersARB", "glGenBuffersARB", "glIsBufferARB",
        "glBufferDataARB", "glBufferSubDataARB", "glGetBufferSubDataARB", "glMapBufferARB",
        "glUnmapBufferARB", "glGetBufferParameterivARB", "glGetBufferPointervARB",
    ]),
    ResolutionPass::extension("GL_ARB_occlusion_query", "GL_ARB_occlusion_query", &[
        "glGenQueriesARB", "glDeleteQueriesARB", "glIsQueryARB", "glBeginQueryARB",
        "glEndQueryARB", "glGetQueryivARB", "glGetQueryObjectivARB", "glGetQueryObjectuivARB",
    ]),
    ResolutionPass::extension("GL_ARB_shader_objects", "GL_ARB_shader_objects", &[
        "glDeleteObjectARB", "glGetHandleARB", "glDetachObjectARB", "glCreateShaderObjectARB",
        "glShaderSourceARB", "glCompileShaderARB", "glCreateProgramObjectARB",
        "glAttachObjectARB", "glLinkProgramARB", "glUseProgramObjectARB",
        "glValidateProgramARB", "glUniform1fARB", "glUniform2fARB", "glUniform3fARB",
        "glUniform4fARB", "glUniform1iARB", "glUniform2iARB", "glUniform3iARB",
        "glUniform4iARB", "glUniform1fvARB", "glUniform2fvARB", "glUniform3fvARB",
        "glUniform4fvARB", "glUniform1ivARB", "glUniformMatrix2fvARB",
        "glUniformMatrix3fvARB", "glUniformMatrix4fvARB", "glGetObjectParameterivARB",
        "glGetInfoLogARB", "glGetAttachedObjectsARB", "glGetUniformLocationARB",
        "glGetActiveUniformARB", "glGetUniformfvARB", "glGetUniformivARB",
        "glGetShaderSourceARB",
    ]),
    ResolutionPass::extension("GL_ARB_vertex_shader", "GL_ARB_vertex_shader", &[
        "glBindAttribLocationARB", "glGetActiveAttribARB", "glGetAttribLocationARB",
        "glVertexAttrib1fARB", "glVertexAttrib2fARB", "glVertexAttrib3fARB",
        "glVertexAttrib4fARB", "glVertexAttribPointerARB", "glEnableVertexAttribArrayARB",
        "glDisableVertexAttribArrayARB",
    ]),
    ResolutionPass::extension("GL_ARB_draw_buffers", "GL_ARB_draw_buffers", &[
        "glDrawBuffersARB",
    ]),
    ResolutionPass::extension("GL_ATI_draw_buffers", "GL_ATI_draw_buffers", &[
        "glDrawBuffersATI",
    ]),
    ResolutionPass::extension("GL_EXT_stencil_two_side", "GL_EXT_stencil_two_side", &[
        "glActiveStencilFaceEXT",
    ]),
    ResolutionPass::extension("GL_EXT_framebuffer_object", "GL_EXT_framebuffer_object", &[
        "glIsRenderbufferEXT", "glBindRenderbufferEXT", "glDeleteRenderbuffersEXT",
        "glGenRenderbuffersEXT", "glRenderbufferStorageEXT",
        "glGetRenderbufferParameterivEXT", "glIsFramebufferEXT", "glBindFramebufferEXT",
        "glDeleteFramebuffersEXT", "glGenFramebuffersEXT", "glCheckFramebufferStatusEXT",
        "glFramebufferTexture1DEXT", "glFramebufferTexture2DEXT", "glFramebufferTexture3DEXT",
        "glFramebufferRenderbufferEXT", "glGetFramebufferAttachmentParameterivEXT",
        "glGenerateMipmapEXT",
    ]),
    ResolutionPass::extension("GL_ARB_framebuffer_object", "GL_ARB_framebuffer_object", &[
        "glIsRenderbuffer", "glBindRenderbuffer", "glDeleteRenderbuffers",
        "glGenRenderbuffers", "glRenderbufferStorage", "glGetRenderbufferParameteriv",
        "glIsFramebuffer", "glBindFramebuffer", "glDeleteFramebuffers", "glGenFramebuffers",
        "glCheckFramebufferStatus", "glFramebufferTexture1D", "glFramebufferTexture2D",
        "glFramebufferTexture3D", "glFramebufferRenderbuffer",
        "glGetFramebufferAttachmentParameteriv", "glGenerateMipmap", "glBlitFramebuffer",
        "glRenderbufferStorageMultisample", "glFramebufferTextureLayer",
    ]),
    ResolutionPass::extension("GL_EXT_framebuffer_blit", "GL_EXT_framebuffer_blit", &[
        "glBlitFramebufferEXT",
    ]),
    ResolutionPass::extension(
        "GL_EXT_framebuffer_multisample",
        "GL_EXT_framebuffer_multisample",
        &["glRenderbufferStorageMultisampleEXT"],
    ),
    ResolutionPass::extension("GLX_SGIX_fbconfig", "GLX_SGIX_fbconfig", &[
        "glXGetFBConfigAttribSGIX", "glXChooseFBConfigSGIX", "glXCreateGLXPixmapWithConfigSGIX",
        "glXCreateContextWithConfigSGIX", "glXGetVisualFromFBConfigSGIX",
        "glXGetFBConfigFromVisualSGIX",
    ]),
    ResolutionPass::extension("GLX_SGIX_pbuffer", "GLX_SGIX_pbuffer", &[
        "glXCreateGLXPbufferSGIX", "glXDestroyGLXPbufferSGIX", "glXQueryGLXPbufferSGIX",
        "glXSelectEventSGIX", "glXGetSelectedEventSGIX",
    ]),
    ResolutionPass::extension("GLX_SGI_swap_control", "GLX_SGI_swap_control", &[
        "glXSwapIntervalSGI",
    ]),
    ResolutionPass::extension("GLX_SGI_video_sync", "GLX_SGI_video_sync", &[
        "glXGetVideoSyncSGI", "glXWaitVideoSyncSGI",
    ]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_passes() -> impl Iterator<Item = &'static ResolutionPass> {
        GL_CORE_PASSES
            .iter()
            .chain(GLU_CORE_PASSES)
            .chain(VERSION_PASSES)
            .chain(EXTENSION_PASSES)
    }

    #[test]
    fn test_no_duplicate_entries() {
        let mut seen = HashSet::new();
        for pass in all_passes() {
            for name in pass.entries {
                assert!(seen.insert(*name), "{} listed twice ({})", name, pass.name);
            }
        }
    }

    #[test]
    fn test_core_passes_are_mandatory() {
        assert!(GL_CORE_PASSES.iter().all(|p| p.is_mandatory()));
        assert!(GLU_CORE_PASSES.iter().all(|p| p.is_mandatory()));
        assert!(!VERSION_PASSES.iter().any(|p| p.is_mandatory()));
        assert!(!EXTENSION_PASSES.iter().any(|p| p.is_mandatory()));
    }

    #[test]
    fn test_core_contains_extension_string_query() {
        assert!(GL_1_1.contains(&"glGetString"));
        assert!(GLX_1_1.contains(&"glXQueryExtensionsString"));
    }
}
