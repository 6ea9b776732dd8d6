//! Official-name aliasing
//!
//! Binds each official entry-point name to the first resolved candidate
//! (ARB before EXT before vendor) when the driver does not export it under
//! the official name. Runs after every pass has finished.

use log::{debug, trace};

use super::table::SymbolTable;

/// One official name and its fallbacks, highest priority first
#[derive(Debug, Clone, Copy)]
pub struct AliasRule {
    pub official: &'static str,
    pub candidates: &'static [&'static str],
}

impl AliasRule {
    pub const fn new(official: &'static str, candidates: &'static [&'static str]) -> Self {
        Self {
            official,
            candidates,
        }
    }
}

/// Applies a rule list to a symbol table
#[derive(Debug, Clone, Copy)]
pub struct ExtensionAliasBinder<'a> {
    rules: &'a [AliasRule],
}

impl<'a> ExtensionAliasBinder<'a> {
    pub fn new(rules: &'a [AliasRule]) -> Self {
        Self { rules }
    }

    /// Bind every unresolved official name that has a resolved candidate.
    ///
    /// Returns the names bound by this call. Running it again binds nothing
    /// new, since bound names are already resolved.
    pub fn bind(&self, table: &mut SymbolTable) -> Vec<&'static str> {
        let mut bound = Vec::new();

        for rule in self.rules {
            if table.is_resolved(rule.official) {
                continue;
            }
            let hit = rule
                .candidates
                .iter()
                .find_map(|&c| table.get(c).map(|addr| (c, addr)));
            match hit {
                Some((candidate, addr)) => {
                    trace!("{} -> {}", rule.official, candidate);
                    table.bind_alias(rule.official, addr);
                    bound.push(rule.official);
                }
                None => trace!("{}: unsupported", rule.official),
            }
        }

        debug!("Alias binding: {} names bound", bound.len());
        bound
    }
}

/// Official names and their extension fallbacks
pub static ALIASES: &[AliasRule] = &[
    // GL 1.2
    AliasRule::new("glTexImage3D", &["glTexImage3DEXT"]),
    AliasRule::new("glTexSubImage3D", &["glTexSubImage3DEXT"]),
    // GL 1.3
    AliasRule::new("glActiveTexture", &["glActiveTextureARB"]),
    AliasRule::new("glClientActiveTexture", &["glClientActiveTextureARB"]),
    AliasRule::new("glMultiTexCoord1f", &["glMultiTexCoord1fARB"]),
    AliasRule::new("glMultiTexCoord2f", &["glMultiTexCoord2fARB"]),
    AliasRule::new("glMultiTexCoord2fv", &["glMultiTexCoord2fvARB"]),
    AliasRule::new("glMultiTexCoord3f", &["glMultiTexCoord3fARB"]),
    AliasRule::new("glMultiTexCoord3fv", &["glMultiTexCoord3fvARB"]),
    AliasRule::new("glMultiTexCoord4f", &["glMultiTexCoord4fARB"]),
    AliasRule::new("glMultiTexCoord4fv", &["glMultiTexCoord4fvARB"]),
    AliasRule::new("glLoadTransposeMatrixf", &["glLoadTransposeMatrixfARB"]),
    AliasRule::new("glLoadTransposeMatrixd", &["glLoadTransposeMatrixdARB"]),
    AliasRule::new("glMultTransposeMatrixf", &["glMultTransposeMatrixfARB"]),
    AliasRule::new("glMultTransposeMatrixd", &["glMultTransposeMatrixdARB"]),
    AliasRule::new("glSampleCoverage", &["glSampleCoverageARB"]),
    AliasRule::new("glCompressedTexImage1D", &["glCompressedTexImage1DARB"]),
    AliasRule::new("glCompressedTexImage2D", &["glCompressedTexImage2DARB"]),
    AliasRule::new("glCompressedTexImage3D", &["glCompressedTexImage3DARB"]),
    AliasRule::new("glCompressedTexSubImage1D", &["glCompressedTexSubImage1DARB"]),
    AliasRule::new("glCompressedTexSubImage2D", &["glCompressedTexSubImage2DARB"]),
    AliasRule::new("glCompressedTexSubImage3D", &["glCompressedTexSubImage3DARB"]),
    AliasRule::new("glGetCompressedTexImage", &["glGetCompressedTexImageARB"]),
    // GL 1.4
    AliasRule::new("glBlendColor", &["glBlendColorEXT"]),
    AliasRule::new("glBlendEquation", &["glBlendEquationEXT"]),
    AliasRule::new("glBlendFuncSeparate", &["glBlendFuncSeparateEXT"]),
    AliasRule::new("glPointParameterf", &["glPointParameterfARB", "glPointParameterfEXT"]),
    AliasRule::new("glPointParameterfv", &["glPointParameterfvARB", "glPointParameterfvEXT"]),
    AliasRule::new("glSecondaryColor3f", &["glSecondaryColor3fEXT"]),
    AliasRule::new("glSecondaryColor3fv", &["glSecondaryColor3fvEXT"]),
    AliasRule::new("glSecondaryColor3ub", &["glSecondaryColor3ubEXT"]),
    AliasRule::new("glSecondaryColorPointer", &["glSecondaryColorPointerEXT"]),
    AliasRule::new("glFogCoordf", &["glFogCoordfEXT"]),
    AliasRule::new("glFogCoordfv", &["glFogCoordfvEXT"]),
    AliasRule::new("glFogCoordPointer", &["glFogCoordPointerEXT"]),
    AliasRule::new("glMultiDrawArrays", &["glMultiDrawArraysEXT"]),
    AliasRule::new("glMultiDrawElements", &["glMultiDrawElementsEXT"]),
    AliasRule::new("glWindowPos2f", &["glWindowPos2fARB"]),
    AliasRule::new("glWindowPos2i", &["glWindowPos2iARB"]),
    AliasRule::new("glWindowPos3f", &["glWindowPos3fARB"]),
    AliasRule::new("glWindowPos3i", &["glWindowPos3iARB"]),
    // GL 1.5
    AliasRule::new("glGenQueries", &["glGenQueriesARB"]),
    AliasRule::new("glDeleteQueries", &["glDeleteQueriesARB"]),
    AliasRule::new("glIsQuery", &["glIsQueryARB"]),
    AliasRule::new("glBeginQuery", &["glBeginQueryARB"]),
    AliasRule::new("glEndQuery", &["glEndQueryARB"]),
    AliasRule::new("glGetQueryiv", &["glGetQueryivARB"]),
    AliasRule::new("glGetQueryObjectiv", &["glGetQueryObjectivARB"]),
    AliasRule::new("glGetQueryObjectuiv", &["glGetQueryObjectuivARB"]),
    AliasRule::new("glBindBuffer", &["glBindBufferARB"]),
    AliasRule::new("glDeleteBuffers", &["glDeleteBuffersARB"]),
    AliasRule::new("glGenBuffers", &["glGenBuffersARB"]),
    AliasRule::new("glIsBuffer", &["glIsBufferARB"]),
    AliasRule::new("glBufferData", &["glBufferDataARB"]),
    AliasRule::new("glBufferSubData", &["glBufferSubDataARB"]),
    AliasRule::new("glGetBufferSubData", &["glGetBufferSubDataARB"]),
    AliasRule::new("glMapBuffer", &["glMapBufferARB"]),
    AliasRule::new("glUnmapBuffer", &["glUnmapBufferARB"]),
    AliasRule::new("glGetBufferParameteriv", &["glGetBufferParameterivARB"]),
    AliasRule::new("glGetBufferPointerv", &["glGetBufferPointervARB"]),
    // GL 2.0 (ARB shader objects use handle-based names)
    AliasRule::new("glDrawBuffers", &["glDrawBuffersARB", "glDrawBuffersATI"]),
    AliasRule::new("glCreateShader", &["glCreateShaderObjectARB"]),
    AliasRule::new("glShaderSource", &["glShaderSourceARB"]),
    AliasRule::new("glCompileShader", &["glCompileShaderARB"]),
    AliasRule::new("glCreateProgram", &["glCreateProgramObjectARB"]),
    AliasRule::new("glAttachShader", &["glAttachObjectARB"]),
    AliasRule::new("glDetachShader", &["glDetachObjectARB"]),
    AliasRule::new("glLinkProgram", &["glLinkProgramARB"]),
    AliasRule::new("glUseProgram", &["glUseProgramObjectARB"]),
    AliasRule::new("glValidateProgram", &["glValidateProgramARB"]),
    AliasRule::new("glDeleteShader", &["glDeleteObjectARB"]),
    AliasRule::new("glDeleteProgram", &["glDeleteObjectARB"]),
    AliasRule::new("glGetShaderiv", &["glGetObjectParameterivARB"]),
    AliasRule::new("glGetProgramiv", &["glGetObjectParameterivARB"]),
    AliasRule::new("glGetShaderInfoLog", &["glGetInfoLogARB"]),
    AliasRule::new("glGetProgramInfoLog", &["glGetInfoLogARB"]),
    AliasRule::new("glGetUniformLocation", &["glGetUniformLocationARB"]),
    AliasRule::new("glGetActiveUniform", &["glGetActiveUniformARB"]),
    AliasRule::new("glGetUniformfv", &["glGetUniformfvARB"]),
    AliasRule::new("glGetUniformiv", &["glGetUniformivARB"]),
    AliasRule::new("glGetShaderSource", &["glGetShaderSourceARB"]),
    AliasRule::new("glUniform1f", &["glUniform1fARB"]),
    AliasRule::new("glUniform2f", &["glUniform2fARB"]),
    AliasRule::new("glUniform3f", &["glUniform3fARB"]),
    AliasRule::new("glUniform4f", &["glUniform4fARB"]),
    AliasRule::new("glUniform1i", &["glUniform1iARB"]),
    AliasRule::new("glUniform2i", &["glUniform2iARB"]),
    AliasRule::new("glUniform3i", &["glUniform3iARB"]),
    AliasRule::new("glUniform4i", &["glUniform4iARB"]),
    AliasRule::new("glUniform1fv", &["glUniform1fvARB"]),
    AliasRule::new("glUniform2fv", &["glUniform2fvARB"]),
    AliasRule::new("glUniform3fv", &["glUniform3fvARB"]),
    AliasRule::new("glUniform4fv", &["glUniform4fvARB"]),
    AliasRule::new("glUniform1iv", &["glUniform1ivARB"]),
    AliasRule::new("glUniformMatrix2fv", &["glUniformMatrix2fvARB"]),
    AliasRule::new("glUniformMatrix3fv", &["glUniformMatrix3fvARB"]),
    AliasRule::new("glUniformMatrix4fv", &["glUniformMatrix4fvARB"]),
    AliasRule::new("glBindAttribLocation", &["glBindAttribLocationARB"]),
    AliasRule::new("glGetActiveAttrib", &["glGetActiveAttribARB"]),
    AliasRule::new("glGetAttribLocation", &["glGetAttribLocationARB"]),
    AliasRule::new("glVertexAttrib1f", &["glVertexAttrib1fARB"]),
    AliasRule::new("glVertexAttrib2f", &["glVertexAttrib2fARB"]),
    AliasRule::new("glVertexAttrib3f", &["glVertexAttrib3fARB"]),
    AliasRule::new("glVertexAttrib4f", &["glVertexAttrib4fARB"]),
    AliasRule::new("glVertexAttribPointer", &["glVertexAttribPointerARB"]),
    AliasRule::new("glEnableVertexAttribArray", &["glEnableVertexAttribArrayARB"]),
    AliasRule::new("glDisableVertexAttribArray", &["glDisableVertexAttribArrayARB"]),
    // Framebuffer objects (GL 3.0 / ARB_framebuffer_object names)
    AliasRule::new("glIsRenderbuffer", &["glIsRenderbufferEXT"]),
    AliasRule::new("glBindRenderbuffer", &["glBindRenderbufferEXT"]),
    AliasRule::new("glDeleteRenderbuffers", &["glDeleteRenderbuffersEXT"]),
    AliasRule::new("glGenRenderbuffers", &["glGenRenderbuffersEXT"]),
    AliasRule::new("glRenderbufferStorage", &["glRenderbufferStorageEXT"]),
    AliasRule::new("glGetRenderbufferParameteriv", &["glGetRenderbufferParameterivEXT"]),
    AliasRule::new("glIsFramebuffer", &["glIsFramebufferEXT"]),
    AliasRule::new("glBindFramebuffer", &["glBindFramebufferEXT"]),
    AliasRule::new("glDeleteFramebuffers", &["glDeleteFramebuffersEXT"]),
    AliasRule::new("glGenFramebuffers", &["glGenFramebuffersEXT"]),
    AliasRule::new("glCheckFramebufferStatus", &["glCheckFramebufferStatusEXT"]),
    AliasRule::new("glFramebufferTexture1D", &["glFramebufferTexture1DEXT"]),
    AliasRule::new("glFramebufferTexture2D", &["glFramebufferTexture2DEXT"]),
    AliasRule::new("glFramebufferTexture3D", &["glFramebufferTexture3DEXT"]),
    AliasRule::new("glFramebufferRenderbuffer", &["glFramebufferRenderbufferEXT"]),
    AliasRule::new(
        "glGetFramebufferAttachmentParameteriv",
        &["glGetFramebufferAttachmentParameterivEXT"],
    ),
    AliasRule::new("glGenerateMipmap", &["glGenerateMipmapEXT"]),
    AliasRule::new("glBlitFramebuffer", &["glBlitFramebufferEXT"]),
    AliasRule::new(
        "glRenderbufferStorageMultisample",
        &["glRenderbufferStorageMultisampleEXT"],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::passes::{EXTENSION_PASSES, GL_CORE_PASSES, VERSION_PASSES};
    use crate::resolve::table::fake_addr;

    static POINT: &[AliasRule] = &[AliasRule::new(
        "glPointParameterf",
        &["glPointParameterfARB", "glPointParameterfEXT"],
    )];

    #[test]
    fn test_prefers_arb_over_ext() {
        let mut table = SymbolTable::new();
        table.set("glPointParameterf", None);
        table.set("glPointParameterfEXT", Some(fake_addr(2)));
        table.set("glPointParameterfARB", Some(fake_addr(1)));

        let bound = ExtensionAliasBinder::new(POINT).bind(&mut table);
        assert_eq!(bound, vec!["glPointParameterf"]);
        assert_eq!(table.get("glPointParameterf"), Some(fake_addr(1)));
    }

    #[test]
    fn test_falls_back_to_ext() {
        let mut table = SymbolTable::new();
        table.set("glPointParameterfARB", None);
        table.set("glPointParameterfEXT", Some(fake_addr(2)));

        ExtensionAliasBinder::new(POINT).bind(&mut table);
        assert_eq!(table.get("glPointParameterf"), Some(fake_addr(2)));
    }

    #[test]
    fn test_core_export_left_alone() {
        let mut table = SymbolTable::new();
        table.set("glPointParameterf", Some(fake_addr(9)));
        table.set("glPointParameterfARB", Some(fake_addr(1)));

        let bound = ExtensionAliasBinder::new(POINT).bind(&mut table);
        assert!(bound.is_empty());
        assert_eq!(table.get("glPointParameterf"), Some(fake_addr(9)));
        assert_eq!(table.aliases().count(), 0);
    }

    #[test]
    fn test_no_candidate_stays_null() {
        let mut table = SymbolTable::new();
        table.set("glPointParameterfARB", None);

        let bound = ExtensionAliasBinder::new(POINT).bind(&mut table);
        assert!(bound.is_empty());
        assert!(!table.is_resolved("glPointParameterf"));
    }

    #[test]
    fn test_binding_is_idempotent() {
        let mut table = SymbolTable::new();
        table.set("glGenFramebuffersEXT", Some(fake_addr(3)));
        table.set("glFramebufferTexture2DEXT", Some(fake_addr(4)));

        let binder = ExtensionAliasBinder::new(ALIASES);
        let first = binder.bind(&mut table);
        let aliases_after_first: Vec<_> = table.aliases().collect();
        let snapshot = table.clone();

        let second = binder.bind(&mut table);
        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
        assert_eq!(table.aliases().collect::<Vec<_>>(), aliases_after_first);
        assert_eq!(table.get("glGenFramebuffers"), snapshot.get("glGenFramebuffers"));
        assert_eq!(table.len(), snapshot.len());
    }

    #[test]
    fn test_every_candidate_belongs_to_a_pass() {
        let known: std::collections::HashSet<&str> = GL_CORE_PASSES
            .iter()
            .chain(VERSION_PASSES)
            .chain(EXTENSION_PASSES)
            .flat_map(|p| p.entries.iter().copied())
            .collect();
        for rule in ALIASES {
            for c in rule.candidates {
                assert!(known.contains(c), "{} has no resolving pass", c);
            }
        }
    }
}
