//! In-process host: an arena of classes and members that implements
//! [`ClassModel`] and renders back to Java source.

mod spec;

pub use spec::*;

use crate::{
    decl::{Expr, Member, MethodDecl, Modifiers, TypeDecl, TypeKind},
    error::HostError,
    host::{
        Anchor, BodyItem, ClassId, ClassInfo, ClassModel, FieldInfo, MemberId, MethodInfo,
        NestedTypeInfo,
    },
    render::{ImportSet, Names, SourceWriter},
    types::TypeRef,
};

///
/// ClassHeader
///
/// Everything needed to declare a top-level class.
///

#[derive(Clone, Debug, Default)]
pub struct ClassHeader {
    pub package: String,
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub superclass: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
}

impl ClassHeader {
    #[must_use]
    pub fn class(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            modifiers: Modifiers::public(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn interface(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Interface,
            ..Self::class(package, name)
        }
    }

    #[must_use]
    pub fn extends(mut self, superclass: TypeRef) -> Self {
        self.superclass = Some(superclass);
        self
    }

    #[must_use]
    pub fn implements(mut self, ty: TypeRef) -> Self {
        self.implements.push(ty);
        self
    }
}

// ClassEntry
#[derive(Debug)]
struct ClassEntry {
    package: String,
    name: String,
    outer: Option<ClassId>,
    kind: TypeKind,
    modifiers: Modifiers,
    superclass: Option<TypeRef>,
    implements: Vec<TypeRef>,
    body: Vec<BodyItem>,

    // only consulted on top-level classes
    imports: ImportSet,
}

// MemberEntry
#[derive(Debug)]
struct MemberEntry {
    owner: ClassId,
    decl: Member,
    shortened: bool,
}

///
/// MemoryModel
///

#[derive(Debug, Default)]
pub struct MemoryModel {
    classes: Vec<ClassEntry>,
    members: Vec<Option<MemberEntry>>,
}

impl MemoryModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a top-level class.
    pub fn add_class(&mut self, header: ClassHeader) -> ClassId {
        let imports = ImportSet::new(header.package.clone());

        self.push_class(ClassEntry {
            package: header.package,
            name: header.name,
            outer: None,
            kind: header.kind,
            modifiers: header.modifiers,
            superclass: header.superclass,
            implements: header.implements,
            body: Vec::new(),
            imports,
        })
    }

    /// Append a hand-written member. Its references are taken as already
    /// written against the unit's imports.
    pub fn add_member(&mut self, class: ClassId, member: Member) -> Result<MemberId, HostError> {
        let id = self.insert_member(class, member, Anchor::End)?;
        self.member_entry_mut(id)?.shortened = true;

        Ok(id)
    }

    /// Record an import on the compilation unit that owns `class`.
    pub fn add_import(&mut self, class: ClassId, path: &str) -> Result<bool, HostError> {
        let unit = self.unit_of(class)?;

        Ok(self.class_mut(unit)?.imports.try_import(path))
    }

    /// Look a class up by qualified name.
    #[must_use]
    pub fn find_class(&self, qualified: &str) -> Option<ClassId> {
        (0..self.classes.len())
            .map(class_id)
            .find(|&id| self.qualified_name(id).is_ok_and(|name| name == qualified))
    }

    /// Look a class up by simple name; `None` when absent or ambiguous.
    #[must_use]
    pub fn find_by_simple_name(&self, name: &str) -> Option<ClassId> {
        let mut found = self
            .classes
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.name == name)
            .map(|(i, _)| class_id(i));

        let first = found.next()?;
        found.next().is_none().then_some(first)
    }

    pub fn qualified_name(&self, class: ClassId) -> Result<String, HostError> {
        let entry = self.class(class)?;

        Ok(match entry.outer {
            Some(outer) => format!("{}.{}", self.qualified_name(outer)?, entry.name),
            None if entry.package.is_empty() => entry.name.clone(),
            None => format!("{}.{}", entry.package, entry.name),
        })
    }

    #[must_use]
    pub fn member(&self, member: MemberId) -> Option<&Member> {
        self.slot(member).map(|entry| &entry.decl)
    }

    /// Body items of `class` in source order.
    pub fn body(&self, class: ClassId) -> Result<&[BodyItem], HostError> {
        Ok(&self.class(class)?.body)
    }

    /// Import paths of the compilation unit that owns `class`.
    pub fn imports(&self, class: ClassId) -> Result<Vec<String>, HostError> {
        let unit = self.unit_of(class)?;

        Ok(self
            .class(unit)?
            .imports
            .paths()
            .map(str::to_string)
            .collect())
    }

    /// Render the compilation unit of a top-level class.
    pub fn render_class(&self, class: ClassId) -> Result<String, HostError> {
        let unit = self.unit_of(class)?;
        let entry = self.class(unit)?;
        let mut writer = SourceWriter::new(Names::Short(&entry.imports));

        if !entry.package.is_empty() {
            writer.line(&format!("package {};", entry.package));
            writer.blank();
        }

        let mut has_imports = false;
        for path in entry.imports.paths() {
            writer.line(&format!("import {path};"));
            has_imports = true;
        }
        if has_imports {
            writer.blank();
        }

        self.write_class(&mut writer, unit, &entry.imports)?;

        Ok(writer.finish())
    }

    fn write_class<'a>(
        &'a self,
        writer: &mut SourceWriter<'a>,
        class: ClassId,
        imports: &'a ImportSet,
    ) -> Result<(), HostError> {
        let entry = self.class(class)?;
        let short = |ty: &TypeRef| {
            let mut out = String::new();
            ty.write_with(&mut out, &|name| imports.short_name(name).into_owned());
            out
        };

        let mut header = String::new();
        for keyword in entry.modifiers.keywords() {
            header.push_str(keyword);
            header.push(' ');
        }
        header.push_str(&format!("{} {}", entry.kind, entry.name));

        if let Some(superclass) = &entry.superclass {
            header.push_str(&format!(" extends {}", short(superclass)));
        }
        if !entry.implements.is_empty() {
            let keyword = match entry.kind {
                TypeKind::Class => "implements",
                TypeKind::Interface => "extends",
            };
            let list: Vec<String> = entry.implements.iter().map(short).collect();
            header.push_str(&format!(" {keyword} {}", list.join(", ")));
        }
        header.push_str(" {");
        writer.line(&header);
        writer.indent();

        let mut previous_was_field = None;
        for item in &entry.body {
            let is_field = match item {
                BodyItem::Member(id) => self.member_entry(*id)?.decl.as_field().is_some(),
                BodyItem::Type(_) => false,
            };
            match previous_was_field {
                Some(true) if is_field => {}
                Some(_) => writer.blank(),
                None => {}
            }
            previous_was_field = Some(is_field);

            match item {
                BodyItem::Member(id) => {
                    let member = self.member_entry(*id)?;
                    writer.set_names(if member.shortened {
                        Names::Short(imports)
                    } else {
                        Names::Qualified
                    });
                    writer.member(&member.decl);
                }
                BodyItem::Type(nested) => self.write_class(writer, *nested, imports)?,
            }
        }

        writer.dedent();
        writer.line("}");

        Ok(())
    }

    // ---------------------------------------------------------------------
    // arena access
    // ---------------------------------------------------------------------

    fn push_class(&mut self, entry: ClassEntry) -> ClassId {
        self.classes.push(entry);
        class_id(self.classes.len() - 1)
    }

    fn class(&self, class: ClassId) -> Result<&ClassEntry, HostError> {
        self.classes
            .get(class.0 as usize)
            .ok_or(HostError::UnknownClass(class))
    }

    fn class_mut(&mut self, class: ClassId) -> Result<&mut ClassEntry, HostError> {
        self.classes
            .get_mut(class.0 as usize)
            .ok_or(HostError::UnknownClass(class))
    }

    fn slot(&self, member: MemberId) -> Option<&MemberEntry> {
        self.members.get(member.0 as usize)?.as_ref()
    }

    fn member_entry(&self, member: MemberId) -> Result<&MemberEntry, HostError> {
        self.slot(member).ok_or(HostError::UnknownMember(member))
    }

    fn member_entry_mut(&mut self, member: MemberId) -> Result<&mut MemberEntry, HostError> {
        self.members
            .get_mut(member.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(HostError::UnknownMember(member))
    }

    // the top-level class whose compilation unit holds `class`
    fn unit_of(&self, class: ClassId) -> Result<ClassId, HostError> {
        let mut current = class;
        while let Some(outer) = self.class(current)?.outer {
            current = outer;
        }

        Ok(current)
    }

    fn members_of(
        &self,
        class: ClassId,
    ) -> Result<impl Iterator<Item = (MemberId, &Member)>, HostError> {
        Ok(self.class(class)?.body.iter().filter_map(|item| match item {
            BodyItem::Member(id) => self.slot(*id).map(|entry| (*id, &entry.decl)),
            BodyItem::Type(_) => None,
        }))
    }
}

impl ClassModel for MemoryModel {
    fn class_info(&self, class: ClassId) -> Result<ClassInfo, HostError> {
        let entry = self.class(class)?;

        Ok(ClassInfo {
            id: class,
            name: entry.name.clone(),
            qualified_name: self.qualified_name(class)?,
            kind: entry.kind,
            superclass: entry.superclass.clone(),
            implements: entry.implements.clone(),
        })
    }

    fn fields(&self, class: ClassId) -> Result<Vec<FieldInfo>, HostError> {
        Ok(self
            .members_of(class)?
            .filter_map(|(id, member)| {
                let field = member.as_field()?;

                Some(FieldInfo {
                    id,
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                    is_static: field.modifiers.is_static,
                    is_transient: field.modifiers.is_transient,
                    has_initializer: field.initializer.is_some(),
                })
            })
            .collect())
    }

    fn constructors(&self, class: ClassId) -> Result<Vec<MethodInfo>, HostError> {
        Ok(self
            .members_of(class)?
            .filter_map(|(id, member)| match member {
                Member::Constructor(m) => Some(method_info(id, m, true)),
                _ => None,
            })
            .collect())
    }

    fn methods_by_name(&self, class: ClassId, name: &str) -> Result<Vec<MethodInfo>, HostError> {
        Ok(self
            .members_of(class)?
            .filter_map(|(id, member)| match member {
                Member::Method(m) if m.name == name => Some(method_info(id, m, false)),
                _ => None,
            })
            .collect())
    }

    fn nested_types(&self, class: ClassId) -> Result<Vec<NestedTypeInfo>, HostError> {
        let entry = self.class(class)?;

        entry
            .body
            .iter()
            .filter_map(|item| match item {
                BodyItem::Type(id) => Some(*id),
                BodyItem::Member(_) => None,
            })
            .map(|id| {
                let nested = self.class(id)?;

                Ok(NestedTypeInfo {
                    id,
                    name: nested.name.clone(),
                    kind: nested.kind,
                })
            })
            .collect()
    }

    fn resolve(&self, ty: &TypeRef) -> Option<ClassId> {
        let name = ty.class_name()?;

        self.find_class(name).or_else(|| {
            if name.contains('.') {
                None
            } else {
                self.find_by_simple_name(name)
            }
        })
    }

    fn delete_member(&mut self, member: MemberId) -> Result<(), HostError> {
        let owner = self.member_entry(member)?.owner;

        self.class_mut(owner)?
            .body
            .retain(|item| *item != BodyItem::Member(member));
        self.members[member.0 as usize] = None;

        Ok(())
    }

    fn insert_member(
        &mut self,
        class: ClassId,
        member: Member,
        anchor: Anchor,
    ) -> Result<MemberId, HostError> {
        member.validate()?;

        let entry = self.class(class)?;
        if let Member::Constructor(ctor) = &member {
            if entry.kind == TypeKind::Interface {
                return Err(HostError::rejected(
                    "insert_member",
                    format!("interface '{}' cannot declare constructors", entry.name),
                ));
            }
            if ctor.name != entry.name {
                return Err(HostError::rejected(
                    "insert_member",
                    format!("constructor '{}' in class '{}'", ctor.name, entry.name),
                ));
            }
        }

        let position = match anchor {
            Anchor::End => entry.body.len(),
            Anchor::Before(item) => entry.body.iter().position(|i| *i == item).ok_or_else(|| {
                HostError::rejected("insert_member", format!("anchor {item:?} is not in {class}"))
            })?,
        };

        let id = member_id(self.members.len());
        self.members.push(Some(MemberEntry {
            owner: class,
            decl: member,
            shortened: false,
        }));
        self.class_mut(class)?
            .body
            .insert(position, BodyItem::Member(id));

        Ok(id)
    }

    fn add_nested_type(&mut self, class: ClassId, decl: TypeDecl) -> Result<ClassId, HostError> {
        decl.validate()?;

        if self.nested_types(class)?.iter().any(|n| n.name == decl.name) {
            return Err(HostError::rejected(
                "add_nested_type",
                format!("'{}' already declares '{}'", self.class(class)?.name, decl.name),
            ));
        }

        let package = self.class(class)?.package.clone();
        let id = self.push_class(ClassEntry {
            package: package.clone(),
            name: decl.name,
            outer: Some(class),
            kind: decl.kind,
            modifiers: decl.modifiers,
            superclass: None,
            implements: Vec::new(),
            body: Vec::new(),
            imports: ImportSet::new(package),
        });
        self.class_mut(class)?.body.push(BodyItem::Type(id));

        Ok(id)
    }

    fn set_field_initializer(&mut self, field: MemberId, init: Expr) -> Result<(), HostError> {
        match &mut self.member_entry_mut(field)?.decl {
            Member::Field(decl) => {
                decl.initializer = Some(init);
                Ok(())
            }
            _ => Err(HostError::NotAField { member: field }),
        }
    }

    fn shorten_references(&mut self, member: MemberId) -> Result<(), HostError> {
        let entry = self.member_entry(member)?;
        let unit = self.unit_of(entry.owner)?;

        let mut names = Vec::new();
        entry
            .decl
            .for_each_type(&mut |ty| ty.for_each_class(&mut |name| names.push(name.to_string())));

        let imports = &mut self.class_mut(unit)?.imports;
        for name in &names {
            imports.try_import(name);
        }
        self.member_entry_mut(member)?.shortened = true;

        Ok(())
    }

    fn add_capability(&mut self, class: ClassId, ty: &TypeRef) -> Result<(), HostError> {
        let unit = self.unit_of(class)?;
        let entry = self.class_mut(class)?;
        if entry.implements.contains(ty) {
            return Ok(());
        }
        entry.implements.push(ty.clone());

        if let Some(name) = ty.class_name() {
            let name = name.to_string();
            self.class_mut(unit)?.imports.try_import(&name);
        }

        Ok(())
    }
}

fn method_info(id: MemberId, decl: &MethodDecl, is_constructor: bool) -> MethodInfo {
    MethodInfo {
        id,
        name: decl.name.clone(),
        params: decl.param_types(),
        has_body: decl.body.is_some(),
        is_constructor,
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn class_id(index: usize) -> ClassId {
    ClassId(index as u32)
}

#[allow(clippy::cast_possible_truncation)]
const fn member_id(index: usize) -> MemberId {
    MemberId(index as u32)
}
