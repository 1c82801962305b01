use tlgen_schema::{Builtin, Field, Function, GraphError, TypeGraph, TypeId, PRELUDE_UNIONS};
use tracing::{debug, warn};

use crate::{
    error::TlError,
    parser::{Declaration, Item},
    utils::quote,
};

/// Which schema file a declaration comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Type,
    Function,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub declared: usize,
    pub skipped:  usize,
}

fn declaration_error(file: &str, line: usize, err: GraphError) -> TlError {
    TlError::DeclarationError {
        file: file.to_string(),
        msg:  err.to_string(),
        line,
    }
}

fn resolve_fields(graph: &mut TypeGraph, decl: &Declaration) -> Result<Vec<Field>, GraphError> {
    decl.fields
        .iter()
        .map(|field| {
            Ok(Field {
                name:        field.name.clone(),
                description: decl.docs.field(&field.name).map(str::to_string),
                type_:       graph.resolve(&field.type_)?,
            })
        })
        .collect()
}

/// Checks every token of a declaration for well-formedness.
fn check_tokens(decl: &Declaration) -> Result<(), GraphError> {
    TypeGraph::check_token(&decl.name)?;
    TypeGraph::check_token(&decl.result)?;
    decl.fields
        .iter()
        .try_for_each(|field| TypeGraph::check_token(&field.type_))
}

/// Fails if `name` is already a concrete type and so cannot become a union.
fn check_union(graph: &TypeGraph, name: &str) -> Result<(), GraphError> {
    match graph.lookup(name).map(|id| graph.get(id)) {
        Some(ty) if ty.declared && !ty.is_builtin() => Err(GraphError::ConcreteUsedAsBase(ty.name.clone())),
        _ => Ok(()),
    }
}

/// Runs every check `build_type` would hit against the current graph, so a
/// rejected declaration leaves no records behind.
fn check_type(graph: &TypeGraph, decl: &Declaration) -> Result<(), GraphError> {
    check_tokens(decl)?;

    let id = graph.lookup(&decl.name);
    if let Some(ty) = id.map(|id| graph.get(id)) {
        if ty.declared {
            return Err(GraphError::AlreadyDeclared(ty.name.clone()));
        }
        if ty.is_abstract_base {
            return Err(GraphError::AbstractBaseHasFields(ty.name.clone()));
        }
    }
    // A type whose union is itself is concrete, not a union.
    if graph.lookup(&decl.result) != id {
        check_union(graph, &decl.result)?;
    }
    Ok(())
}

/// Adds a type declaration to the graph and registers it as a variant of its
/// union. Returns `None` for constructors of builtin unions such as
/// `boolTrue = Bool;`.
pub fn build_type(graph: &mut TypeGraph, decl: &Declaration) -> Result<Option<TypeId>, GraphError> {
    if PRELUDE_UNIONS.contains(&decl.result.as_str()) || Builtin::from_token(&decl.result).is_some() {
        debug!("skipping builtin constructor {}", quote(&decl.name));
        return Ok(None);
    }
    check_type(graph, decl)?;

    let id = graph.declare(&decl.name, decl.docs.description())?;
    let fields = resolve_fields(graph, decl)?;
    let base = graph.resolve(&decl.result)?;

    graph.define(id, fields)?;
    if base != id {
        graph.mark_abstract_base(base)?;
    }
    graph.set_base(id, base);

    Ok(Some(id))
}

/// Adds a function declaration to the graph.
///
/// A result that is still an undeclared placeholder is marked as a union, the
/// same way a type declaration marks its union. Declared, builtin and generic
/// results are left alone.
pub fn build_function(graph: &mut TypeGraph, decl: &Declaration) -> Result<(), GraphError> {
    check_tokens(decl)?;
    if graph.function(&decl.name).is_some() {
        return Err(GraphError::DuplicateFunction(decl.name.clone()));
    }

    let args = resolve_fields(graph, decl)?;
    let result = graph.resolve(&decl.result)?;

    let ty = graph.get(result);
    if !ty.declared && !ty.is_generic() {
        graph.mark_abstract_base(result)?;
    }

    graph.add_function(Function {
        name:        decl.name.clone(),
        description: decl.docs.description().map(str::to_string),
        args,
        result,
    })
}

/// Documents a union from a `//@class` block.
pub fn build_class_doc(
    graph: &mut TypeGraph,
    name: &str,
    description: Option<&str>,
) -> Result<TypeId, GraphError> {
    TypeGraph::check_token(name)?;
    check_union(graph, name)?;
    let id = graph.resolve(name)?;
    graph.mark_abstract_base(id)?;
    graph.describe(id, description);
    Ok(id)
}

/// Feeds every parsed item of one file into the graph.
pub fn build_items(
    graph: &mut TypeGraph,
    file: &str,
    kind: DeclarationKind,
    items: &[Item],
    strict: bool,
) -> Result<BuildStats, TlError> {
    let mut stats = BuildStats::default();

    for item in items {
        let (line, outcome) = match item {
            Item::Declaration(decl) => {
                let outcome = match kind {
                    DeclarationKind::Type     => build_type(graph, decl).map(|id| id.is_some()),
                    DeclarationKind::Function => build_function(graph, decl).map(|_| true),
                };
                (decl.line, outcome)
            }
            Item::ClassDoc { name, description, line } => {
                let outcome = build_class_doc(graph, name, description.as_deref()).map(|_| false);
                (*line, outcome)
            }
        };

        match outcome {
            Ok(true) => stats.declared += 1,
            Ok(false) => {}
            Err(err) if !strict => {
                warn!("{}:{}: skipping declaration: {}", file, line, err);
                stats.skipped += 1;
            }
            Err(err) => return Err(declaration_error(file, line, err)),
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_schema;

    fn build(graph: &mut TypeGraph, kind: DeclarationKind, text: &str) -> Result<BuildStats, TlError> {
        let items = parse_schema("test.tl", text, true)?;
        build_items(graph, "test.tl", kind, &items, true)
    }

    #[test]
    fn test_sum_type_grouping() {
        let mut graph = TypeGraph::new();
        let stats = build(&mut graph, DeclarationKind::Type, "a f:int53 = U;\n\nb g:string = U;\n").unwrap();
        assert_eq!(stats, BuildStats { declared: 2, skipped: 0 });

        let u = graph.lookup("U").unwrap();
        let a = graph.lookup("a").unwrap();
        let b = graph.lookup("b").unwrap();
        assert!(graph.get(u).is_abstract_base);
        assert!(graph.get(u).fields.is_empty());
        assert_eq!(graph.get(a).base, Some(u));
        assert_eq!(graph.get(b).base, Some(u));
        assert_eq!(graph.variants_of(u).collect::<Vec<_>>(), vec![a, b]);

        let field = &graph.get(a).fields[0];
        assert_eq!(field.name, "f");
        assert_eq!(field.type_, graph.builtin(Builtin::Int53));
    }

    #[test]
    fn test_descriptions_are_attached() {
        let mut graph = TypeGraph::new();
        let text = "//@description A message @id Identifier\nmessage id:int53 = Message;\n";
        build(&mut graph, DeclarationKind::Type, text).unwrap();

        let message = graph.get(graph.lookup("message").unwrap());
        assert_eq!(message.description.as_deref(), Some("A message"));
        assert_eq!(message.fields[0].description.as_deref(), Some("Identifier"));
        assert_eq!(graph.get(graph.lookup("Message").unwrap()).description, None);
    }

    #[test]
    fn test_forward_reference_is_filled_later() {
        let mut graph = TypeGraph::new();
        let text = "chat photo:chatPhoto = Chat;\n\nchatPhoto id:int64 = ChatPhoto;\n";
        build(&mut graph, DeclarationKind::Type, text).unwrap();

        let chat = graph.get(graph.lookup("chat").unwrap());
        let photo = chat.fields[0].type_;
        assert_eq!(Some(photo), graph.lookup("chatPhoto"));
        assert!(graph.get(photo).declared);
        assert_eq!(graph.get(photo).fields.len(), 1);
    }

    #[test]
    fn test_self_based_type_is_not_abstract() {
        let mut graph = TypeGraph::new();
        build(&mut graph, DeclarationKind::Type, "point x:double = point;\n").unwrap();
        let point = graph.lookup("point").unwrap();
        assert!(!graph.get(point).is_abstract_base);
        assert_eq!(graph.get(point).base, Some(point));
    }

    #[test]
    fn test_redeclaration_is_rejected() {
        let mut graph = TypeGraph::new();
        let err = build(&mut graph, DeclarationKind::Type, "a = A;\n\na x:int32 = A;\n").unwrap_err();
        match err {
            TlError::DeclarationError { line, msg, .. } => {
                assert_eq!(line, 3);
                assert!(msg.contains("declared twice"), "{}", msg);
            }
            other => panic!("expected a DeclarationError but got {:?}", other),
        }
    }

    #[test]
    fn test_base_never_receives_fields() {
        let mut graph = TypeGraph::new();
        let err = build(&mut graph, DeclarationKind::Type, "a = U;\n\nU x:int32 = Other;\n").unwrap_err();
        assert!(matches!(err, TlError::DeclarationError { line: 3, .. }), "got {:?}", err);
        let u = graph.lookup("U").unwrap();
        assert!(graph.get(u).fields.is_empty());
        assert!(graph.get(u).is_abstract_base);
    }

    #[test]
    fn test_lenient_mode_skips_rejected_declarations() {
        let mut graph = TypeGraph::new();
        let items = parse_schema("test.tl", "a = A;\n\na x:int32 = A;\n\nb = B;\n", true).unwrap();
        let stats = build_items(&mut graph, "test.tl", DeclarationKind::Type, &items, false).unwrap();
        assert_eq!(stats, BuildStats { declared: 2, skipped: 1 });
        assert!(graph.get(graph.lookup("a").unwrap()).fields.is_empty());
    }

    fn build_lenient(graph: &mut TypeGraph, kind: DeclarationKind, text: &str) -> BuildStats {
        let items = parse_schema("test.tl", text, false).unwrap();
        build_items(graph, "test.tl", kind, &items, false).unwrap()
    }

    #[test]
    fn test_rejected_redeclaration_leaves_no_records() {
        let mut graph = TypeGraph::new();
        build_lenient(&mut graph, DeclarationKind::Type, "a = A;\n");
        let before = graph.len();

        let stats = build_lenient(&mut graph, DeclarationKind::Type, "//@description Other\na x:ghost = B;\n");
        assert_eq!(stats, BuildStats { declared: 0, skipped: 1 });
        assert_eq!(graph.len(), before);
        assert_eq!(graph.lookup("ghost"), None);
        assert_eq!(graph.lookup("B"), None);
        assert_eq!(graph.get(graph.lookup("a").unwrap()).description, None);
    }

    #[test]
    fn test_rejected_variant_of_concrete_type_leaves_no_records() {
        let mut graph = TypeGraph::new();
        let stats = build_lenient(
            &mut graph,
            DeclarationKind::Type,
            "point x:int32 = point;\n\nfoo y:int32 = point;\n",
        );
        assert_eq!(stats, BuildStats { declared: 1, skipped: 1 });
        assert_eq!(graph.lookup("foo"), None);
        assert!(!graph.get(graph.lookup("point").unwrap()).is_abstract_base);
    }

    #[test]
    fn test_rejected_fields_on_base_leave_no_records() {
        let mut graph = TypeGraph::new();
        let stats = build_lenient(&mut graph, DeclarationKind::Type, "a = U;\n\nU x:orphan = Other;\n");
        assert_eq!(stats, BuildStats { declared: 1, skipped: 1 });
        assert_eq!(graph.lookup("orphan"), None);
        assert_eq!(graph.lookup("Other"), None);
    }

    #[test]
    fn test_malformed_field_leaves_no_records() {
        let mut graph = TypeGraph::new();
        let decl = crate::parser::parse_declaration("test.tl", "a x:first y:vector<> = A;", 1).unwrap();
        assert_eq!(
            build_type(&mut graph, &decl),
            Err(GraphError::MalformedType("vector<>".into()))
        );
        assert_eq!(graph.lookup("a"), None);
        assert_eq!(graph.lookup("first"), None);
    }

    #[test]
    fn test_rejected_function_leaves_no_records() {
        let mut graph = TypeGraph::new();
        let text = "getUser id:int53 = User;\n\ngetUser id:stray = Stray;\n";
        let stats = build_lenient(&mut graph, DeclarationKind::Function, text);
        assert_eq!(stats, BuildStats { declared: 1, skipped: 1 });
        assert_eq!(graph.lookup("stray"), None);
        assert_eq!(graph.lookup("Stray"), None);
    }

    #[test]
    fn test_class_doc_on_concrete_type_is_rejected() {
        let mut graph = TypeGraph::new();
        build(&mut graph, DeclarationKind::Type, "user id:int53 = user;\n").unwrap();
        let err = build_class_doc(&mut graph, "user", Some("Not a union")).unwrap_err();
        assert_eq!(err, GraphError::ConcreteUsedAsBase("user".into()));
        assert_eq!(graph.get(graph.lookup("user").unwrap()).description, None);
    }

    #[test]
    fn test_builtin_constructors_are_skipped() {
        let mut graph = TypeGraph::new();
        let stats = build(&mut graph, DeclarationKind::Type, "boolFalse = Bool;\n\nboolTrue = Bool;\n").unwrap();
        assert_eq!(stats.declared, 0);
        assert_eq!(graph.lookup("boolTrue"), None);
    }

    #[test]
    fn test_function_result_marking() {
        let mut graph = TypeGraph::new();
        build(&mut graph, DeclarationKind::Type, "user id:int53 = User;\n\npoint x:double = point;\n").unwrap();
        let text = "\
//@description Returns a user @user_id Identifier
getUser user_id:int53 = User;

getPoint = point;

getCount = int32;

getIds = vector<int53>;
";
        let stats = build(&mut graph, DeclarationKind::Function, text).unwrap();
        assert_eq!(stats.declared, 4);

        let get_user = graph.function("getUser").unwrap();
        assert_eq!(get_user.description.as_deref(), Some("Returns a user"));
        assert_eq!(get_user.args[0].description.as_deref(), Some("Identifier"));
        assert!(graph.get(get_user.result).is_abstract_base);

        let point = graph.function("getPoint").unwrap().result;
        assert!(!graph.get(point).is_abstract_base);
        let count = graph.function("getCount").unwrap().result;
        assert!(!graph.get(count).is_abstract_base);
        let ids = graph.function("getIds").unwrap().result;
        assert!(!graph.get(ids).is_abstract_base);
    }

    #[test]
    fn test_class_doc_marks_and_describes_the_base() {
        let mut graph = TypeGraph::new();
        let text = "//@class MessageContent @description Contains the content of a message\n\n\
                    messageText text:string = MessageContent;\n";
        build(&mut graph, DeclarationKind::Type, text).unwrap();
        let base = graph.get(graph.lookup("MessageContent").unwrap());
        assert!(base.is_abstract_base);
        assert_eq!(base.description.as_deref(), Some("Contains the content of a message"));
    }

    #[test]
    fn test_dedup_across_files() {
        let mut graph = TypeGraph::new();
        build(&mut graph, DeclarationKind::Type, "chat ids:vector<int53> = Chat;\n").unwrap();
        let before = graph.len();
        build(&mut graph, DeclarationKind::Function, "getChats ids:vector<int53> = Chats;\n").unwrap();

        let from_type = graph.get(graph.lookup("chat").unwrap()).fields[0].type_;
        let from_function = graph.function("getChats").unwrap().args[0].type_;
        assert_eq!(from_type, from_function);
        // Only the `Chats` placeholder is new.
        assert_eq!(graph.len(), before + 1);
    }
}
