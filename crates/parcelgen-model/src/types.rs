use derive_more::Display;
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;

///
/// PrimitiveKind
///
/// The eight Java primitive kinds. Everything else is a reference type.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PrimitiveKind {
    #[display("boolean")]
    Boolean,
    #[display("byte")]
    Byte,
    #[display("char")]
    Char,
    #[display("double")]
    Double,
    #[display("float")]
    Float,
    #[display("int")]
    Int,
    #[display("long")]
    Long,
    #[display("short")]
    Short,
}

impl PrimitiveKind {
    pub const ALL: [Self; 8] = [
        Self::Boolean,
        Self::Byte,
        Self::Char,
        Self::Double,
        Self::Float,
        Self::Int,
        Self::Long,
        Self::Short,
    ];

    /// Java keyword spelling.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Double => "double",
            Self::Float => "float",
            Self::Int => "int",
            Self::Long => "long",
            Self::Short => "short",
        }
    }

    #[must_use]
    pub fn from_keyword(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == s)
    }
}

///
/// TypeRef
///
/// A declared type as written in source. Class names are kept fully
/// qualified; shortening is a rendering concern.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TypeRef {
    Void,
    Primitive(PrimitiveKind),
    Class { name: String, args: Vec<Self> },
    Array(Box<Self>),
}

impl TypeRef {
    #[must_use]
    pub fn class(name: impl Into<String>) -> Self {
        Self::Class {
            name: name.into(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn generic(name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Class {
            name: name.into(),
            args,
        }
    }

    #[must_use]
    pub fn array(elem: Self) -> Self {
        Self::Array(Box::new(elem))
    }

    #[must_use]
    pub fn string() -> Self {
        Self::class("java.lang.String")
    }

    #[must_use]
    pub const fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Qualified class name for class types, `None` otherwise.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Class { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Canonical source text (fully qualified, generics included).
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Strip type arguments, keeping array dimensions. This is the form a
    /// class literal needs.
    #[must_use]
    pub fn erasure(&self) -> Self {
        match self {
            Self::Class { name, .. } => Self::class(name.clone()),
            Self::Array(elem) => Self::array(elem.erasure()),
            other => other.clone(),
        }
    }

    /// Visit every class name referenced by this type, outermost first.
    pub fn for_each_class(&self, f: &mut impl FnMut(&str)) {
        match self {
            Self::Class { name, args } => {
                f(name);
                for arg in args {
                    arg.for_each_class(f);
                }
            }
            Self::Array(elem) => elem.for_each_class(f),
            Self::Void | Self::Primitive(_) => {}
        }
    }

    /// Render with a custom class-name mapping.
    pub fn write_with<F>(&self, out: &mut String, name_of: &F)
    where
        F: Fn(&str) -> String,
    {
        match self {
            Self::Void => out.push_str("void"),
            Self::Primitive(kind) => out.push_str(kind.keyword()),
            Self::Class { name, args } => {
                out.push_str(&name_of(name));
                if !args.is_empty() {
                    out.push('<');
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        arg.write_with(out, name_of);
                    }
                    out.push('>');
                }
            }
            Self::Array(elem) => {
                elem.write_with(out, name_of);
                out.push_str("[]");
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_with(&mut out, &str::to_string);

        f.write_str(&out)
    }
}

impl From<PrimitiveKind> for TypeRef {
    fn from(kind: PrimitiveKind) -> Self {
        Self::Primitive(kind)
    }
}

///
/// TypeParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("cannot parse type '{input}' at offset {offset}: {reason}")]
pub struct TypeParseError {
    pub input: String,
    pub offset: usize,
    pub reason: &'static str,
}

impl FromStr for TypeRef {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser { input: s, pos: 0 };
        let ty = parser.parse_type()?;

        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(parser.error("trailing input"));
        }

        Ok(ty)
    }
}

// Recursive-descent parser for Java type text:
// name ('<' type (',' type)* '>')? ('[' ']')*
struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl TypeParser<'_> {
    fn parse_type(&mut self) -> Result<TypeRef, TypeParseError> {
        self.skip_ws();
        let name = self.parse_name()?;

        let mut ty = if name == "void" {
            TypeRef::Void
        } else if let Some(kind) = PrimitiveKind::from_keyword(&name) {
            TypeRef::Primitive(kind)
        } else {
            let mut args = Vec::new();
            self.skip_ws();
            if self.eat('<') {
                loop {
                    args.push(self.parse_type()?);
                    self.skip_ws();
                    if self.eat(',') {
                        continue;
                    }
                    if self.eat('>') {
                        break;
                    }
                    return Err(self.error("expected ',' or '>'"));
                }
                if args.is_empty() {
                    return Err(self.error("empty type argument list"));
                }
            }

            TypeRef::Class { name, args }
        };

        loop {
            self.skip_ws();
            if !self.eat('[') {
                break;
            }
            self.skip_ws();
            if !self.eat(']') {
                return Err(self.error("expected ']'"));
            }
            if matches!(ty, TypeRef::Void) {
                return Err(self.error("void cannot be an array element"));
            }
            ty = TypeRef::array(ty);
        }

        Ok(ty)
    }

    fn parse_name(&mut self) -> Result<String, TypeParseError> {
        let start = self.pos;
        let mut expect_segment = true;

        while let Some(c) = self.peek() {
            if expect_segment {
                if c.is_alphabetic() || c == '_' || c == '$' {
                    expect_segment = false;
                } else {
                    break;
                }
            } else if c == '.' {
                expect_segment = true;
            } else if !(c.is_alphanumeric() || c == '_' || c == '$') {
                break;
            }
            self.pos += c.len_utf8();
        }

        if self.pos == start {
            return Err(self.error("expected a type name"));
        }
        if expect_segment {
            return Err(self.error("dangling '.' in type name"));
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn error(&self, reason: &'static str) -> TypeParseError {
        TypeParseError {
            input: self.input.to_string(),
            offset: self.pos,
            reason,
        }
    }
}

///
/// TESTS
///
