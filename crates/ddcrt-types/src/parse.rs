//! Type expression parsing.
//!
//! Accepts the forms `TypeFormatter` renders:
//!
//! ```text
//! type      := generic_fn | function | named
//! generic_fn:= '<' IDENT ('extends' type)? (',' ...)* '>' function
//! function  := '(' params ')' ('=>' | '->') type
//! params    := (type (',' type)*)? (','? ('[' types ']' | '{' IDENT ':' type, ... '}'))?
//! named     := IDENT ('<' type (',' type)* '>')?
//! ```
//!
//! `dynamic`, `void`, `bottom` and type variables in scope are handled here. Every
//! other name goes through the [`TypeNameResolver`].

use crate::errors::ConfigurationError;
use crate::intern::TypeInterner;
use crate::types::{FunctionShape, NamedParam, TypeId, TypeParamInfo};
use ddcrt_common::Atom;
use std::fmt;

/// Maps a named type with its (already parsed) arguments to a `TypeId`.
pub trait TypeNameResolver {
    fn resolve_type_name(&self, name: &str, args: &[TypeId]) -> Result<TypeId, ConfigurationError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    Syntax { offset: usize, message: String },
    Resolve(ConfigurationError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax { offset, message } => write!(f, "{message} at offset {offset}"),
            Self::Resolve(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Resolve(err) => Some(err),
            Self::Syntax { .. } => None,
        }
    }
}

impl From<ConfigurationError> for ParseError {
    fn from(err: ConfigurationError) -> Self {
        Self::Resolve(err)
    }
}

pub struct TypeParser<'a> {
    interner: &'a TypeInterner,
    resolver: &'a dyn TypeNameResolver,
    src: &'a str,
    pos: usize,
    scope: Vec<Atom>,
}

impl<'a> TypeParser<'a> {
    pub fn new(interner: &'a TypeInterner, resolver: &'a dyn TypeNameResolver, src: &'a str) -> Self {
        Self {
            interner,
            resolver,
            src,
            pos: 0,
            scope: Vec::new(),
        }
    }

    /// Treat `names` as type variables while parsing.
    pub fn with_type_params(mut self, names: &[Atom]) -> Self {
        self.scope.extend_from_slice(names);
        self
    }

    /// Parse the whole input as one type.
    pub fn parse(mut self) -> Result<TypeId, ParseError> {
        let ty = self.parse_type()?;
        self.skip_ws();
        if self.pos < self.src.len() {
            return Err(self.error("unexpected trailing input"));
        }
        Ok(ty)
    }

    fn error(&self, message: &str) -> ParseError {
        ParseError::Syntax {
            offset: self.pos,
            message: message.to_string(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.rest().chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), ParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{token}'")))
        }
    }

    fn ident(&mut self) -> Result<&'a str, ParseError> {
        self.skip_ws();
        let rest = self.rest();
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn parse_type(&mut self) -> Result<TypeId, ParseError> {
        match self.peek() {
            Some('<') => self.parse_generic_function(),
            Some('(') => self.parse_function(Vec::new()),
            Some(_) => self.parse_named(),
            None => Err(self.error("expected a type")),
        }
    }

    fn parse_generic_function(&mut self) -> Result<TypeId, ParseError> {
        self.expect("<")?;
        let mark = self.scope.len();
        let result = self.parse_type_params().and_then(|params| self.parse_function(params));
        self.scope.truncate(mark);
        result
    }

    /// `T, U extends num>`: each name is in scope for its own bound and
    /// everything after it.
    fn parse_type_params(&mut self) -> Result<Vec<TypeParamInfo>, ParseError> {
        let mut params = Vec::new();
        loop {
            let name = self.interner.intern_string(self.ident()?);
            self.scope.push(name);
            let param = if self.eat_keyword("extends") {
                TypeParamInfo::bounded(name, self.parse_type()?)
            } else {
                TypeParamInfo::new(name)
            };
            params.push(param);
            if !self.eat(",") {
                break;
            }
        }
        self.expect(">")?;
        Ok(params)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        self.skip_ws();
        let Some(after) = self.rest().strip_prefix(keyword) else {
            return false;
        };
        let boundary = after
            .chars()
            .next()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_' || c == '$'));
        if boundary {
            self.pos += keyword.len();
            true
        } else {
            false
        }
    }

    fn parse_function(&mut self, type_params: Vec<TypeParamInfo>) -> Result<TypeId, ParseError> {
        self.expect("(")?;
        let mut required = Vec::new();
        let mut optional = Vec::new();
        let mut named = Vec::new();

        if !self.eat(")") {
            loop {
                match self.peek() {
                    Some('[') => {
                        self.expect("[")?;
                        optional = self.parse_type_list("]")?;
                        self.expect("]")?;
                        break;
                    }
                    Some('{') => {
                        self.expect("{")?;
                        named = self.parse_named_params()?;
                        self.expect("}")?;
                        break;
                    }
                    _ => required.push(self.parse_type()?),
                }
                if !self.eat(",") {
                    break;
                }
            }
            self.expect(")")?;
        }

        if !(self.eat("=>") || self.eat("->")) {
            return Err(self.error("expected '=>'"));
        }
        let return_type = self.parse_type()?;
        let shape = FunctionShape::new(return_type, required)
            .with_optional(optional)
            .with_named(named)
            .with_type_params(type_params);
        self.interner.try_function(shape).map_err(ParseError::Resolve)
    }

    fn parse_named_params(&mut self) -> Result<Vec<NamedParam>, ParseError> {
        let mut named = Vec::new();
        if self.peek() == Some('}') {
            return Ok(named);
        }
        loop {
            let name = self.interner.intern_string(self.ident()?);
            self.expect(":")?;
            let type_id = self.parse_type()?;
            named.push(NamedParam { name, type_id });
            if !self.eat(",") {
                return Ok(named);
            }
        }
    }

    fn parse_type_list(&mut self, close: &str) -> Result<Vec<TypeId>, ParseError> {
        let mut types = Vec::new();
        self.skip_ws();
        if self.rest().starts_with(close) {
            return Ok(types);
        }
        loop {
            types.push(self.parse_type()?);
            if !self.eat(",") {
                return Ok(types);
            }
        }
    }

    fn parse_named(&mut self) -> Result<TypeId, ParseError> {
        let name = self.ident()?;
        let args = if self.eat("<") {
            let args = self.parse_type_list(">")?;
            self.expect(">")?;
            args
        } else {
            Vec::new()
        };

        match name {
            "dynamic" if args.is_empty() => return Ok(TypeId::DYNAMIC),
            "void" if args.is_empty() => return Ok(TypeId::VOID),
            "bottom" if args.is_empty() => return Ok(TypeId::BOTTOM),
            _ => {}
        }
        if args.is_empty()
            && let Some(atom) = self.interner.lookup_string(name)
            && self.scope.contains(&atom)
        {
            return Ok(self.interner.type_param(atom));
        }
        Ok(self.resolver.resolve_type_name(name, &args)?)
    }
}

#[cfg(test)]
#[path = "../tests/parse_tests.rs"]
mod tests;
