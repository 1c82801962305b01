use serde::Serialize;

/// Schema spelling of the raw byte blob alias. It is not a scalar of its own:
/// every occurrence stands for `vector<byte>`.
pub const BYTES_ALIAS: &str = "bytes";

/// The generic token a `bytes` field is rewritten to.
pub const BYTES_EXPANSION: &str = "vector<byte>";

/// Scalars the compiler knows without a declaration.
///
/// Each builtin has two spellings: the one used in schema files (`int53`) and
/// the normalized one stored in the type graph, which is also the scalar name
/// the generated classes use (`long`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Builtin {
    Bool,
    Byte,
    Int32,
    Int53,
    Int64,
    Double,
    String,
}

impl Builtin {
    /// Seeding order of the type graph.
    pub const ALL: [Builtin; 7] = [
        Builtin::Bool,
        Builtin::Byte,
        Builtin::Int32,
        Builtin::Int53,
        Builtin::Int64,
        Builtin::Double,
        Builtin::String,
    ];

    pub fn schema_name(self) -> &'static str {
        match self {
            Builtin::Bool   => "Bool",
            Builtin::Byte   => "byte",
            Builtin::Int32  => "int32",
            Builtin::Int53  => "int53",
            Builtin::Int64  => "int64",
            Builtin::Double => "double",
            Builtin::String => "string",
        }
    }

    /// Normalized name, e.g. `int53` becomes `long`.
    pub fn normalized_name(self) -> &'static str {
        match self {
            Builtin::Bool   => "bool",
            Builtin::Byte   => "byte",
            Builtin::Int32  => "int",
            Builtin::Int53  => "long",
            Builtin::Int64  => "Int64",
            Builtin::Double => "double?",
            Builtin::String => "string",
        }
    }

    /// Looks a bare token up by either spelling.
    pub fn from_token(token: &str) -> Option<Builtin> {
        Builtin::ALL
            .iter()
            .copied()
            .find(|b| b.schema_name() == token || b.normalized_name() == token)
    }

    /// 64-bit integers travel as JSON strings so they survive
    /// double-precision parsers.
    pub fn is_string_encoded(self) -> bool {
        self == Builtin::Int64
    }
}

/// Rewrites a single token to its normalized spelling.
///
/// Bare builtin names are replaced, `bytes` expands to `vector<byte>`, and
/// the same rules apply to the argument of every angle-bracket level. Any
/// other text passes through unchanged.
pub fn normalize(token: &str) -> String {
    if let (Some(begin), Some(end)) = (token.find('<'), token.rfind('>')) {
        if begin < end {
            return format!(
                "{}<{}>{}",
                &token[..begin],
                normalize(&token[begin + 1..end]),
                &token[end + 1..]
            );
        }
    }
    if token == BYTES_ALIAS {
        return normalize(BYTES_EXPANSION);
    }
    match Builtin::from_token(token) {
        Some(builtin) => builtin.normalized_name().to_string(),
        None => token.to_string(),
    }
}

/// Union names used by the schema prelude to declare the builtins themselves
/// (`int53 = Int53;`, `boolTrue = Bool;`, `vector {t:Type} # [ t ] = Vector t;`).
pub const PRELUDE_UNIONS: [&str; 8] = [
    "Bool", "Double", "String", "Int32", "Int53", "Int64", "Bytes", "Vector",
];
