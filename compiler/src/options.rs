/// Settings of one compilation run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOptions {
    /// Fail on malformed declarations and verifier findings. When false, the
    /// offending blocks are skipped with a warning.
    pub strict:  bool,
    pub codegen: CodegenOptions,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            strict:  true,
            codegen: CodegenOptions::default(),
        }
    }
}

/// Names the generated sources depend on.
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenOptions {
    pub namespace:       String,
    /// Static class every generated class is nested in.
    pub container:       String,
    /// Class every base and top-level type extends.
    pub root_class:      String,
    /// Generic class every function extends, parameterized by its result.
    pub function_class:  String,
    /// Converter attached to properties; string-encoded 64-bit integers use
    /// its `Int64` member.
    pub converter:       String,
    pub objects_dir:     String,
    pub functions_dir:   String,
    pub extension:       String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        CodegenOptions {
            namespace:      "Tl".to_string(),
            container:      "Api".to_string(),
            root_class:     "Object".to_string(),
            function_class: "Function".to_string(),
            converter:      "Converter".to_string(),
            objects_dir:    "Objects".to_string(),
            functions_dir:  "Functions".to_string(),
            extension:      "cs".to_string(),
        }
    }
}
