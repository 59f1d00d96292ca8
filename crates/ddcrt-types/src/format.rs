//! Type rendering.
//!
//! Output is stable and deterministic for a given `TypeId`:
//! - classes: `List<int>`, `Map<String, bool>`, `Object` (no brackets without args)
//! - functions: `(bool, [String]) => int`, `(bool, {b: String}) => int`,
//!   `<T extends num>(T, T) => T`
//! - typedefs render by name, with arguments for generic typedefs
//!
//! `TypeParser` accepts everything this module produces.

use crate::intern::TypeInterner;
use crate::types::{FunctionShape, TypeData, TypeId, TypeListId};

pub struct TypeFormatter<'a> {
    interner: &'a TypeInterner,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        Self { interner }
    }

    pub fn format(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write_type(&mut out, id);
        out
    }

    /// Render a comma separated list of types (`int, String`).
    pub fn format_list(&self, ids: &[TypeId]) -> String {
        let mut out = String::new();
        self.write_list(&mut out, ids);
        out
    }

    fn write_type(&self, out: &mut String, id: TypeId) {
        match self.interner.data(id) {
            TypeData::Dynamic => out.push_str("dynamic"),
            TypeData::Void => out.push_str("void"),
            TypeData::Bottom => out.push_str("bottom"),
            TypeData::TypeParameter(name) => out.push_str(&self.interner.resolve_atom(name)),
            TypeData::Class(class) => match self.interner.defs.class(class) {
                Some(def) => {
                    out.push_str(&self.interner.resolve_atom(def.name));
                    self.write_args(out, def.type_args);
                }
                None => out.push_str("<unknown class>"),
            },
            TypeData::Application { generic, args } => {
                match self.interner.defs.generic(generic) {
                    Some(info) => out.push_str(&self.interner.resolve_atom(info.name)),
                    None => out.push_str("<unknown generic>"),
                }
                self.write_args(out, args);
            }
            TypeData::Typedef(typedef) => match self.interner.defs.typedef(typedef) {
                Some(def) => {
                    out.push_str(&self.interner.resolve_atom(def.name));
                    self.write_args(out, def.type_args);
                }
                None => out.push_str("<unknown typedef>"),
            },
            TypeData::Function(shape_id) => {
                let shape = self.interner.function_shape(shape_id);
                self.write_function(out, &shape);
            }
        }
    }

    fn write_args(&self, out: &mut String, args: TypeListId) {
        let items = self.interner.type_list_items(args);
        if items.is_empty() {
            return;
        }
        out.push('<');
        self.write_list(out, &items);
        out.push('>');
    }

    fn write_list(&self, out: &mut String, ids: &[TypeId]) {
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_type(out, id);
        }
    }

    fn write_function(&self, out: &mut String, shape: &FunctionShape) {
        if shape.is_generic() {
            out.push('<');
            for (i, param) in shape.type_params.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&self.interner.resolve_atom(param.name));
                if let Some(bound) = param.bound {
                    out.push_str(" extends ");
                    self.write_type(out, bound);
                }
            }
            out.push('>');
        }

        out.push('(');
        self.write_list(out, &shape.required);
        let has_required = !shape.required.is_empty();
        if !shape.optional.is_empty() {
            if has_required {
                out.push_str(", ");
            }
            out.push('[');
            self.write_list(out, &shape.optional);
            out.push(']');
        } else if !shape.named.is_empty() {
            if has_required {
                out.push_str(", ");
            }
            out.push('{');
            for (i, param) in shape.named.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&self.interner.resolve_atom(param.name));
                out.push_str(": ");
                self.write_type(out, param.type_id);
            }
            out.push('}');
        }
        out.push_str(") => ");
        self.write_type(out, shape.return_type);
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
