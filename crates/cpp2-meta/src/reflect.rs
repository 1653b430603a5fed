//! Reflective views over declarations.
//!
//! A view is a (handle, services) pair. It never exposes the
//! [`DeclarationNode`] it points at; reads go through short-lived borrows of
//! the tree and writes go through [`DeclarationRequests`], so the node's own
//! policy decides what is accepted.
//!
//! The views layer by capability: [`Declaration`] works for every kind, and
//! [`FunctionDeclaration`], [`ObjectDeclaration`] and [`TypeDeclaration`]
//! add kind-specific queries. Each specialized view derefs to
//! [`Declaration`], which derefs to [`CompilerServices`], so `require` is
//! available on any view.

use std::ops::Deref;

use cpp2_common::span::SourcePosition;
use cpp2_parser::{
    Accessibility, DeclId, DeclarationNode, DeclarationRequests, DeclaredThatFunctions,
    MemberFilter, PassingStyle,
};

use crate::services::CompilerServices;

// ── Declaration ────────────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub struct Declaration<'a> {
    node: DeclId,
    services: &'a CompilerServices<'a>,
}

impl<'a> Declaration<'a> {
    /// # Panics
    ///
    /// Panics if `node` is not a handle into the services' tree.
    pub fn new(node: DeclId, services: &'a CompilerServices<'a>) -> Self {
        assert!(
            services.tree().contains(node),
            "reflection requires a declaration that exists, got {node:?}"
        );
        Self { node, services }
    }

    pub fn id(&self) -> DeclId {
        self.node
    }

    fn with_node<R>(&self, f: impl FnOnce(&DeclarationNode) -> R) -> R {
        f(self.services.tree().node(self.node))
    }

    fn with_parent<R>(&self, f: impl FnOnce(&DeclarationNode) -> R) -> Option<R> {
        let tree = self.services.tree();
        tree.parent_node(self.node).map(f)
    }

    pub fn position(&self) -> SourcePosition {
        self.with_node(|n| n.position)
    }

    /// Access level as written, `Default` when no keyword was given.
    pub fn access(&self) -> Accessibility {
        self.with_node(|n| n.access)
    }

    pub fn is_public(&self) -> bool {
        self.services.tree().effective_access(self.node) == Accessibility::Public
    }

    pub fn is_protected(&self) -> bool {
        self.services.tree().effective_access(self.node) == Accessibility::Protected
    }

    pub fn is_private(&self) -> bool {
        self.services.tree().effective_access(self.node) == Accessibility::Private
    }

    pub fn is_default_access(&self) -> bool {
        self.access() == Accessibility::Default
    }

    pub fn has_name(&self) -> bool {
        self.with_node(DeclarationNode::has_name)
    }

    pub fn has_name_eq(&self, name: &str) -> bool {
        self.with_node(|n| n.has_name_eq(name))
    }

    /// The declared name, or an empty string for unnamed declarations.
    pub fn name(&self) -> String {
        self.with_node(|n| n.name.clone().unwrap_or_default())
    }

    pub fn has_initializer(&self) -> bool {
        self.with_node(DeclarationNode::has_initializer)
    }

    /// Declared at file scope (or not yet attached to any scope).
    pub fn is_global(&self) -> bool {
        self.services.tree().parent(self.node).is_none()
    }

    pub fn is_function(&self) -> bool {
        self.with_node(DeclarationNode::is_function)
    }

    pub fn is_object(&self) -> bool {
        self.with_node(DeclarationNode::is_object)
    }

    pub fn is_type(&self) -> bool {
        self.with_node(DeclarationNode::is_type)
    }

    pub fn is_namespace(&self) -> bool {
        self.with_node(DeclarationNode::is_namespace)
    }

    pub fn is_alias(&self) -> bool {
        self.with_node(DeclarationNode::is_alias)
    }

    pub fn parent_is_function(&self) -> bool {
        self.with_parent(DeclarationNode::is_function).unwrap_or(false)
    }

    pub fn parent_is_object(&self) -> bool {
        self.with_parent(DeclarationNode::is_object).unwrap_or(false)
    }

    pub fn parent_is_type(&self) -> bool {
        self.with_parent(DeclarationNode::is_type).unwrap_or(false)
    }

    pub fn parent_is_namespace(&self) -> bool {
        self.with_parent(DeclarationNode::is_namespace).unwrap_or(false)
    }

    pub fn parent_is_alias(&self) -> bool {
        self.with_parent(DeclarationNode::is_alias).unwrap_or(false)
    }

    pub fn parent_is_polymorphic(&self) -> bool {
        let tree = self.services.tree();
        tree.parent(self.node)
            .is_some_and(|p| tree.node(p).is_type() && tree.is_polymorphic(p))
    }

    pub fn make_public(&self) -> bool {
        self.request_access(Accessibility::Public)
    }

    pub fn make_protected(&self) -> bool {
        self.request_access(Accessibility::Protected)
    }

    pub fn make_private(&self) -> bool {
        self.request_access(Accessibility::Private)
    }

    fn request_access(&self, level: Accessibility) -> bool {
        self.services.tree_mut().request_access(self.node, level)
    }

    pub fn as_function(&self) -> FunctionDeclaration<'a> {
        FunctionDeclaration::new(self.node, self.services)
    }

    pub fn as_object(&self) -> ObjectDeclaration<'a> {
        ObjectDeclaration::new(self.node, self.services)
    }

    pub fn as_type(&self) -> TypeDeclaration<'a> {
        TypeDeclaration::new(self.node, self.services)
    }
}

impl<'a> Deref for Declaration<'a> {
    type Target = CompilerServices<'a>;

    fn deref(&self) -> &Self::Target {
        self.services
    }
}

// ── FunctionDeclaration ────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub struct FunctionDeclaration<'a> {
    decl: Declaration<'a>,
}

impl<'a> FunctionDeclaration<'a> {
    /// # Panics
    ///
    /// Panics if `node` is not a function.
    pub fn new(node: DeclId, services: &'a CompilerServices<'a>) -> Self {
        let decl = Declaration::new(node, services);
        assert!(decl.is_function(), "{node:?} is not a function declaration");
        Self { decl }
    }

    fn param_pass(&self, name: &str) -> Option<PassingStyle> {
        self.decl.with_node(|n| {
            let sig = n.signature()?;
            sig.params.iter().find(|p| p.name == name).map(|p| p.passing())
        })
    }

    pub fn index_of_parameter_named(&self, name: &str) -> Option<usize> {
        self.decl
            .with_node(|n| n.signature()?.index_of_parameter_named(name))
    }

    pub fn has_parameter_named(&self, name: &str) -> bool {
        self.param_pass(name).is_some()
    }

    pub fn has_in_parameter_named(&self, name: &str) -> bool {
        self.param_pass(name) == Some(PassingStyle::In)
    }

    pub fn has_out_parameter_named(&self, name: &str) -> bool {
        self.param_pass(name) == Some(PassingStyle::Out)
    }

    pub fn has_move_parameter_named(&self, name: &str) -> bool {
        self.param_pass(name) == Some(PassingStyle::Move)
    }

    pub fn has_this(&self) -> bool {
        self.decl.with_node(DeclarationNode::has_this)
    }

    pub fn is_virtual(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_virtual)
    }

    pub fn is_constructor(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_constructor)
    }

    pub fn is_constructor_with_that(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_constructor_with_that)
    }

    pub fn is_constructor_with_in_that(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_constructor_with_in_that)
    }

    pub fn is_constructor_with_move_that(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_constructor_with_move_that)
    }

    pub fn is_assignment(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_assignment)
    }

    pub fn is_assignment_with_that(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_assignment_with_that)
    }

    pub fn is_assignment_with_in_that(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_assignment_with_in_that)
    }

    pub fn is_assignment_with_move_that(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_assignment_with_move_that)
    }

    pub fn is_destructor(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_destructor)
    }

    /// A copy or move constructor or assignment.
    pub fn is_copy_or_move(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_copy_or_move)
    }

    pub fn make_function_virtual(&self) -> bool {
        self.decl.services.tree_mut().request_virtual(self.decl.node)
    }

    /// Which copy/move operations the enclosing type already declares.
    pub fn query_declared_that_functions(&self) -> DeclaredThatFunctions {
        self.decl
            .services
            .tree()
            .find_declared_that_functions(self.decl.node)
    }
}

impl<'a> Deref for FunctionDeclaration<'a> {
    type Target = Declaration<'a>;

    fn deref(&self) -> &Self::Target {
        &self.decl
    }
}

// ── ObjectDeclaration ──────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub struct ObjectDeclaration<'a> {
    decl: Declaration<'a>,
}

impl<'a> ObjectDeclaration<'a> {
    /// # Panics
    ///
    /// Panics if `node` is not an object.
    pub fn new(node: DeclId, services: &'a CompilerServices<'a>) -> Self {
        let decl = Declaration::new(node, services);
        assert!(decl.is_object(), "{node:?} is not an object declaration");
        Self { decl }
    }

    pub fn is_const(&self) -> bool {
        self.decl.with_node(DeclarationNode::is_const)
    }

    /// Declared without a type (`x := 1;` or `x: _ = 1;`).
    pub fn has_wildcard_type(&self) -> bool {
        self.decl.with_node(DeclarationNode::has_wildcard_type)
    }
}

impl<'a> Deref for ObjectDeclaration<'a> {
    type Target = Declaration<'a>;

    fn deref(&self) -> &Self::Target {
        &self.decl
    }
}

// ── TypeDeclaration ────────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub struct TypeDeclaration<'a> {
    decl: Declaration<'a>,
}

impl<'a> TypeDeclaration<'a> {
    /// # Panics
    ///
    /// Panics if `node` is not a type.
    pub fn new(node: DeclId, services: &'a CompilerServices<'a>) -> Self {
        let decl = Declaration::new(node, services);
        assert!(decl.is_type(), "{node:?} is not a type declaration");
        Self { decl }
    }

    pub fn is_polymorphic(&self) -> bool {
        self.decl.services.tree().is_polymorphic(self.decl.node)
    }

    /// Meta-function annotations in declared order.
    pub fn meta_functions(&self) -> Vec<String> {
        self.decl.with_node(|n| n.meta_functions().to_vec())
    }

    fn members(&self, filter: MemberFilter) -> Vec<DeclId> {
        self.decl
            .services
            .tree()
            .type_scope_declarations(self.decl.node, filter)
    }

    pub fn get_member_functions(&self) -> Vec<FunctionDeclaration<'a>> {
        let services = self.decl.services;
        self.members(MemberFilter::Functions)
            .into_iter()
            .map(|id| FunctionDeclaration::new(id, services))
            .collect()
    }

    pub fn get_member_objects(&self) -> Vec<ObjectDeclaration<'a>> {
        let services = self.decl.services;
        self.members(MemberFilter::Objects)
            .into_iter()
            .map(|id| ObjectDeclaration::new(id, services))
            .collect()
    }

    pub fn get_member_types(&self) -> Vec<TypeDeclaration<'a>> {
        let services = self.decl.services;
        self.members(MemberFilter::Types)
            .into_iter()
            .map(|id| TypeDeclaration::new(id, services))
            .collect()
    }

    pub fn get_members(&self) -> Vec<Declaration<'a>> {
        let services = self.decl.services;
        self.members(MemberFilter::All)
            .into_iter()
            .map(|id| Declaration::new(id, services))
            .collect()
    }

    /// Compile `source` as one declaration and append it as a member.
    ///
    /// Returns false, leaving the type unchanged, when the fragment does not
    /// parse.
    pub fn add_member(&self, source: &str) -> bool {
        let services = self.decl.services;
        match services.parse_statement(source) {
            Some(member) => services.tree_mut().add_type_member(self.decl.node, member),
            None => false,
        }
    }
}

impl<'a> Deref for TypeDeclaration<'a> {
    type Target = Declaration<'a>;

    fn deref(&self) -> &Self::Target {
        &self.decl
    }
}
