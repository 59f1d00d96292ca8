use super::*;
use crate::environment::TypeEnvironment;
use crate::fixtures::World;
use crate::types::TypeData;

impl TypeNameResolver for World {
    fn resolve_type_name(&self, name: &str, args: &[TypeId]) -> Result<TypeId, ConfigurationError> {
        let simple = [
            ("Object", self.object),
            ("Null", self.null),
            ("Function", self.function),
            ("bool", self.bool_),
            ("num", self.num),
            ("int", self.int),
            ("String", self.string),
        ];
        if let Some(&(_, ty)) = simple.iter().find(|(n, _)| *n == name) {
            if !args.is_empty() {
                return Err(ConfigurationError::ArityMismatch {
                    generic: name.to_string(),
                    expected: 0,
                    actual: args.len(),
                });
            }
            return Ok(ty);
        }
        let generic = match name {
            "Iterable" => self.iterable,
            "List" => self.list,
            "Map" => self.map,
            _ => {
                return Err(ConfigurationError::UnknownType {
                    name: name.to_string(),
                });
            }
        };
        if args.iter().any(|&a| self.interner.contains_type_params(a)) {
            return Ok(self.interner.application(generic, args.to_vec()));
        }
        self.instantiate_generic(generic, args)
    }
}

fn parse(w: &World, src: &str) -> Result<TypeId, ParseError> {
    TypeParser::new(&w.interner, w, src).parse()
}

#[test]
fn test_parse_keywords() {
    let w = World::new();
    assert_eq!(parse(&w, "dynamic"), Ok(TypeId::DYNAMIC));
    assert_eq!(parse(&w, " void "), Ok(TypeId::VOID));
    assert_eq!(parse(&w, "bottom"), Ok(TypeId::BOTTOM));
}

#[test]
fn test_parse_class_types() {
    let w = World::new();
    assert_eq!(parse(&w, "int"), Ok(w.int));
    let list_int = w.inst(w.list, &[w.int]);
    assert_eq!(parse(&w, "List<int>"), Ok(list_int));
    let map = w.inst(w.map, &[w.string, w.bool_]);
    assert_eq!(parse(&w, "Map<String,bool>"), Ok(map));
}

#[test]
fn test_parse_round_trips_rendered_strings() {
    let w = World::new();
    for src in [
        "List<int>",
        "Map<String, bool>",
        "List<Map<String, bool>>",
        "(bool, [String]) => int",
        "(bool, {b: String}) => int",
        "(bool) => int",
        "() => void",
        "([int]) => dynamic",
        "<T>(T) => List<T>",
        "<T extends num>(T, T) => T",
        "((int) => bool) => (String) => void",
    ] {
        let ty = parse(&w, src).unwrap_or_else(|e| panic!("{src}: {e}"));
        assert_eq!(w.render(ty), src);
    }
}

#[test]
fn test_parse_accepts_arrow_alias() {
    let w = World::new();
    assert_eq!(parse(&w, "(bool) -> int"), parse(&w, "(bool) => int"));
}

#[test]
fn test_parse_type_params_are_scoped() {
    let w = World::new();
    let ty = parse(&w, "<T>(T) => T").expect("parses");
    let shape = w.interner.as_function(ty).expect("function");
    assert!(matches!(
        w.interner.data(shape.return_type),
        TypeData::TypeParameter(_)
    ));

    // Outside the binder, T is an ordinary name.
    assert!(matches!(
        parse(&w, "T"),
        Err(ParseError::Resolve(ConfigurationError::UnknownType { .. }))
    ));
}

#[test]
fn test_parse_with_outer_type_params() {
    let w = World::new();
    let e = w.interner.intern_string("E");
    let ty = TypeParser::new(&w.interner, &w, "List<E>")
        .with_type_params(&[e])
        .parse()
        .expect("parses");
    assert!(matches!(
        w.interner.data(ty),
        TypeData::Application { generic, .. } if generic == w.list
    ));
}

#[test]
fn test_parse_errors_report_offset() {
    let w = World::new();
    match parse(&w, "List<int") {
        Err(ParseError::Syntax { offset, .. }) => assert_eq!(offset, 8),
        other => panic!("expected syntax error, got {other:?}"),
    }
    assert!(matches!(parse(&w, ""), Err(ParseError::Syntax { .. })));
    assert!(matches!(
        parse(&w, "int int"),
        Err(ParseError::Syntax { offset: 4, .. })
    ));
    assert!(matches!(parse(&w, "(int)"), Err(ParseError::Syntax { .. })));
}

#[test]
fn test_parse_resolver_errors_propagate() {
    let w = World::new();
    let err = parse(&w, "Set<int>").expect_err("unknown");
    assert_eq!(err.to_string(), "unknown type 'Set'");
    assert!(matches!(
        parse(&w, "List<int, int>"),
        Err(ParseError::Resolve(ConfigurationError::ArityMismatch { .. }))
    ));
}
