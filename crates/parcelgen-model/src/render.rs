//! Java source rendering for declarations, plus the import bookkeeping used
//! to shorten qualified names.

use crate::{
    decl::{Expr, FieldDecl, Member, MethodDecl, Modifiers, Stmt},
    types::TypeRef,
};
use std::{borrow::Cow, collections::BTreeMap};

const INDENT: &str = "    ";

/// Packages visible without an import.
const IMPLICIT_PACKAGE: &str = "java.lang";

///
/// QualifiedName
///
/// A dotted class name split into package, top-level class and nested tail.
/// Package segments are the leading lower-case segments.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QualifiedName<'a> {
    pub package: &'a str,
    pub top_level: &'a str,
    pub nested: &'a str,
}

impl<'a> QualifiedName<'a> {
    #[must_use]
    pub fn split(name: &'a str) -> Self {
        let mut offset = 0;
        for segment in name.split('.') {
            if segment.starts_with(char::is_uppercase) {
                break;
            }
            offset += segment.len() + 1;
        }

        // no upper-case segment: treat the last segment as the class
        if offset >= name.len() {
            offset = name.rfind('.').map_or(0, |i| i + 1);
        }

        let package = name[..offset].trim_end_matches('.');
        let rest = &name[offset..];
        let (top_level, nested) = rest.find('.').map_or((rest, ""), |i| rest.split_at(i));

        Self {
            package,
            top_level,
            nested,
        }
    }

    /// `package.TopLevel` without the nested tail.
    #[must_use]
    pub fn import_path(&self) -> String {
        if self.package.is_empty() {
            self.top_level.to_string()
        } else {
            format!("{}.{}", self.package, self.top_level)
        }
    }
}

///
/// ImportSet
///
/// Imports of one compilation unit, keyed by simple name so that two
/// classes with the same simple name never shadow each other.
///

#[derive(Clone, Debug, Default)]
pub struct ImportSet {
    package: String,
    by_simple: BTreeMap<String, String>,
}

impl ImportSet {
    #[must_use]
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            by_simple: BTreeMap::new(),
        }
    }

    /// Import the top-level class behind `qualified`. Returns false when the
    /// simple name is already taken by a different class.
    pub fn try_import(&mut self, qualified: &str) -> bool {
        let name = QualifiedName::split(qualified);
        if name.package.is_empty() || self.is_implicit(name.package) {
            return self
                .by_simple
                .get(name.top_level)
                .is_none_or(|path| *path == name.import_path());
        }

        let path = name.import_path();
        match self.by_simple.get(name.top_level) {
            Some(existing) => *existing == path,
            None => {
                self.by_simple.insert(name.top_level.to_string(), path);
                true
            }
        }
    }

    /// Shortest unambiguous spelling of `qualified` under these imports.
    #[must_use]
    pub fn short_name<'a>(&self, qualified: &'a str) -> Cow<'a, str> {
        let name = QualifiedName::split(qualified);
        let visible = match self.by_simple.get(name.top_level) {
            Some(path) => *path == name.import_path(),
            None => name.package.is_empty() || self.is_implicit(name.package),
        };

        if visible {
            Cow::Owned(format!("{}{}", name.top_level, name.nested))
        } else {
            Cow::Borrowed(qualified)
        }
    }

    /// Import lines in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        let mut paths: Vec<&str> = self.by_simple.values().map(String::as_str).collect();
        paths.sort_unstable();
        paths.into_iter()
    }

    fn is_implicit(&self, package: &str) -> bool {
        package == IMPLICIT_PACKAGE || package == self.package
    }
}

///
/// Names
///
/// How class names are spelled while rendering.
///

#[derive(Clone, Copy, Debug)]
pub enum Names<'a> {
    Qualified,
    Short(&'a ImportSet),
}

impl Names<'_> {
    fn spell(&self, name: &str) -> String {
        match self {
            Self::Qualified => name.to_string(),
            Self::Short(imports) => imports.short_name(name).into_owned(),
        }
    }
}

///
/// SourceWriter
///

pub struct SourceWriter<'a> {
    out: String,
    depth: usize,
    names: Names<'a>,
}

impl<'a> SourceWriter<'a> {
    #[must_use]
    pub const fn new(names: Names<'a>) -> Self {
        Self {
            out: String::new(),
            depth: 0,
            names,
        }
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    pub const fn set_names(&mut self, names: Names<'a>) {
        self.names = names;
    }

    pub const fn indent(&mut self) {
        self.depth += 1;
    }

    pub const fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Write one full line at the current depth.
    pub fn line(&mut self, text: &str) {
        self.pad();
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn member(&mut self, member: &Member) {
        match member {
            Member::Constructor(m) | Member::Method(m) => self.method(m),
            Member::Field(f) => self.field(f),
        }
    }

    pub fn field(&mut self, field: &FieldDecl) {
        self.pad();
        self.modifiers(&field.modifiers);
        self.ty(&field.ty);
        self.out.push(' ');
        self.out.push_str(&field.name);
        if let Some(init) = &field.initializer {
            self.out.push_str(" = ");
            self.expr(init);
        }
        self.out.push_str(";\n");
    }

    pub fn method(&mut self, method: &MethodDecl) {
        for annotation in &method.annotations {
            self.line(&format!("@{annotation}"));
        }

        self.pad();
        self.modifiers(&method.modifiers);
        if let Some(ty) = &method.return_type {
            self.ty(ty);
            self.out.push(' ');
        }
        self.out.push_str(&method.name);
        self.out.push('(');
        for (i, param) in method.params.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.ty(&param.ty);
            self.out.push(' ');
            self.out.push_str(&param.name);
        }
        self.out.push(')');

        match &method.body {
            None => self.out.push_str(";\n"),
            Some(body) if body.is_empty() => self.out.push_str(" {}\n"),
            Some(body) => {
                self.out.push_str(" {\n");
                self.indent();
                for stmt in body {
                    self.stmt(stmt);
                }
                self.dedent();
                self.line("}");
            }
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        self.pad();
        match stmt {
            Stmt::Local { ty, name, init } => {
                self.ty(ty);
                self.out.push(' ');
                self.out.push_str(name);
                self.out.push_str(" = ");
                self.expr(init);
            }
            Stmt::Assign { target, value } => {
                self.expr(target);
                self.out.push_str(" = ");
                self.expr(value);
            }
            Stmt::Expr(expr) => self.expr(expr),
            Stmt::Return(expr) => {
                self.out.push_str("return ");
                self.expr(expr);
            }
            Stmt::SuperCall(args) => {
                self.out.push_str("super");
                self.args(args);
            }
            Stmt::Raw(text) => {
                self.out.push_str(text.trim().trim_end_matches(';'));
            }
        }
        self.out.push_str(";\n");
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Name(name) => self.out.push_str(name),
            Expr::Str(s) => {
                self.out.push('"');
                self.out.push_str(&escape(s));
                self.out.push('"');
            }
            Expr::Int(n) => self.out.push_str(&n.to_string()),
            Expr::Call {
                target,
                method,
                args,
            } => {
                if let Some(target) = target {
                    self.expr(target);
                    self.out.push('.');
                }
                self.out.push_str(method);
                self.args(args);
            }
            Expr::New { ty, args } => {
                self.out.push_str("new ");
                self.ty(ty);
                self.args(args);
            }
            Expr::NewArray { elem, len } => {
                self.out.push_str("new ");
                self.ty(elem);
                self.out.push('[');
                self.expr(len);
                self.out.push(']');
            }
            Expr::ClassLiteral(ty) => {
                self.ty(ty);
                self.out.push_str(".class");
            }
            Expr::Anonymous { ty, methods } => {
                self.out.push_str("new ");
                self.ty(ty);
                self.out.push_str("() {\n");
                self.indent();
                for (i, method) in methods.iter().enumerate() {
                    if i > 0 {
                        self.blank();
                    }
                    self.method(method);
                }
                self.dedent();
                self.pad();
                self.out.push('}');
            }
            Expr::Raw(text) => self.out.push_str(text.trim()),
        }
    }

    fn args(&mut self, args: &[Expr]) {
        self.out.push('(');
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(arg);
        }
        self.out.push(')');
    }

    fn ty(&mut self, ty: &TypeRef) {
        let names = self.names;
        ty.write_with(&mut self.out, &|name| names.spell(name));
    }

    fn modifiers(&mut self, modifiers: &Modifiers) {
        for keyword in modifiers.keywords() {
            self.out.push_str(keyword);
            self.out.push(' ');
        }
    }

    fn pad(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }
}

/// Render a single member with qualified names.
#[must_use]
pub fn render_member(member: &Member) -> String {
    let mut writer = SourceWriter::new(Names::Qualified);
    writer.member(member);
    writer.finish()
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }

    out
}

///
/// TESTS
///
