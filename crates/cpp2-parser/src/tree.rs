//! Arena syntax tree for Cpp2 declarations.
//!
//! Every declaration lives in one [`SyntaxTree`] arena and is addressed by a
//! [`DeclId`] handle. Handles stay valid for the lifetime of the tree: nodes
//! are never removed, only appended, except that a failed parse rolls the
//! arena back to where it started ([`SyntaxTree::truncate`]).
//!
//! The tree also owns the mutation policy. Callers outside this module never
//! set access or virtuality directly; they go through
//! [`DeclarationRequests`], which decides whether a request is accepted.

use cpp2_common::span::SourcePosition;

/// Stable handle to a declaration in a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Access level as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    /// No access keyword was written.
    Default,
    Public,
    Protected,
    Private,
}

impl Accessibility {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Accessibility::Default => None,
            Accessibility::Public => Some("public"),
            Accessibility::Protected => Some("protected"),
            Accessibility::Private => Some("private"),
        }
    }
}

/// Parameter passing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassingStyle {
    In,
    Inout,
    Out,
    Copy,
    Move,
    Forward,
}

impl PassingStyle {
    pub fn keyword(self) -> &'static str {
        match self {
            PassingStyle::In => "in",
            PassingStyle::Inout => "inout",
            PassingStyle::Out => "out",
            PassingStyle::Copy => "copy",
            PassingStyle::Move => "move",
            PassingStyle::Forward => "forward",
        }
    }
}

/// Specifier on a `this` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThisSpecifier {
    Virtual,
    Override,
    Final,
}

impl ThisSpecifier {
    pub fn keyword(self) -> &'static str {
        match self {
            ThisSpecifier::Virtual => "virtual",
            ThisSpecifier::Override => "override",
            ThisSpecifier::Final => "final",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// Passing mode as written; `None` means the implicit `in`.
    pub pass: Option<PassingStyle>,
    pub this_spec: Option<ThisSpecifier>,
    pub ty: Option<String>,
    pub default: Option<String>,
}

impl Parameter {
    /// The effective passing mode.
    pub fn passing(&self) -> PassingStyle {
        self.pass.unwrap_or(PassingStyle::In)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionSig {
    pub params: Vec<Parameter>,
    pub returns: Option<String>,
}

impl FunctionSig {
    /// The `this` parameter, if the function has a receiver.
    pub fn this_param(&self) -> Option<&Parameter> {
        self.params.first().filter(|p| p.name == "this")
    }

    pub fn index_of_parameter_named(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }
}

/// What an alias declaration (`==`) names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasOf {
    Type,
    Namespace,
    /// An object alias, with its declared type if one was written.
    Object(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    Function(FunctionSig),
    Object {
        /// `None` for a wildcard (`x := 1;` or `x: _ = 1;`).
        ty: Option<String>,
        is_const: bool,
    },
    Type {
        members: Vec<DeclId>,
        /// Meta-function annotations in declared order.
        meta_functions: Vec<String>,
    },
    Namespace {
        members: Vec<DeclId>,
    },
    Alias {
        of: AliasOf,
        target: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializerKind {
    /// `= { ... }`
    Block,
    /// `= expr;`
    Expr,
}

/// Initializer text exactly as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initializer {
    pub text: String,
    pub kind: InitializerKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationNode {
    /// `None` for unnamed declarations (`_: int = 0;`).
    pub name: Option<String>,
    pub position: SourcePosition,
    pub access: Accessibility,
    pub kind: DeclKind,
    pub initializer: Option<Initializer>,
    pub parent: Option<DeclId>,
}

impl DeclarationNode {
    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    pub fn has_name_eq(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Types and namespaces always carry their `{ ... }` body.
    pub fn has_initializer(&self) -> bool {
        self.initializer.is_some()
            || matches!(self.kind, DeclKind::Type { .. } | DeclKind::Namespace { .. })
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, DeclKind::Function(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.kind, DeclKind::Object { .. })
    }

    pub fn is_type(&self) -> bool {
        matches!(self.kind, DeclKind::Type { .. })
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, DeclKind::Namespace { .. })
    }

    pub fn is_alias(&self) -> bool {
        matches!(self.kind, DeclKind::Alias { .. })
    }

    pub fn signature(&self) -> Option<&FunctionSig> {
        match &self.kind {
            DeclKind::Function(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn members(&self) -> &[DeclId] {
        match &self.kind {
            DeclKind::Type { members, .. } | DeclKind::Namespace { members } => members,
            _ => &[],
        }
    }

    pub fn meta_functions(&self) -> &[String] {
        match &self.kind {
            DeclKind::Type { meta_functions, .. } => meta_functions,
            _ => &[],
        }
    }

    // ── Function roles ─────────────────────────────────────────────────

    pub fn has_this(&self) -> bool {
        self.this_param().is_some()
    }

    fn this_param(&self) -> Option<&Parameter> {
        self.signature().and_then(FunctionSig::this_param)
    }

    fn this_pass(&self) -> Option<PassingStyle> {
        self.this_param().map(Parameter::passing)
    }

    /// Passing mode of a second parameter named `that`.
    fn that_pass(&self) -> Option<PassingStyle> {
        let sig = self.signature()?;
        match sig.params.as_slice() {
            [_, that] if that.name == "that" => Some(that.passing()),
            _ => None,
        }
    }

    fn is_operator_assign(&self) -> bool {
        self.has_name_eq("operator=")
    }

    pub fn is_virtual(&self) -> bool {
        self.this_param()
            .is_some_and(|p| p.this_spec == Some(ThisSpecifier::Virtual))
    }

    pub fn is_constructor(&self) -> bool {
        self.is_operator_assign() && self.this_pass() == Some(PassingStyle::Out)
    }

    pub fn is_constructor_with_that(&self) -> bool {
        self.is_constructor() && self.that_pass().is_some()
    }

    pub fn is_constructor_with_in_that(&self) -> bool {
        self.is_constructor() && self.that_pass() == Some(PassingStyle::In)
    }

    pub fn is_constructor_with_move_that(&self) -> bool {
        self.is_constructor() && self.that_pass() == Some(PassingStyle::Move)
    }

    pub fn is_assignment(&self) -> bool {
        self.is_operator_assign() && self.this_pass() == Some(PassingStyle::Inout)
    }

    pub fn is_assignment_with_that(&self) -> bool {
        self.is_assignment() && self.that_pass().is_some()
    }

    pub fn is_assignment_with_in_that(&self) -> bool {
        self.is_assignment() && self.that_pass() == Some(PassingStyle::In)
    }

    pub fn is_assignment_with_move_that(&self) -> bool {
        self.is_assignment() && self.that_pass() == Some(PassingStyle::Move)
    }

    pub fn is_destructor(&self) -> bool {
        self.is_operator_assign()
            && self.this_pass() == Some(PassingStyle::Move)
            && self.signature().is_some_and(|sig| sig.params.len() == 1)
    }

    pub fn is_copy_or_move(&self) -> bool {
        self.is_constructor_with_that() || self.is_assignment_with_that()
    }

    // ── Objects ────────────────────────────────────────────────────────

    pub fn is_const(&self) -> bool {
        matches!(self.kind, DeclKind::Object { is_const: true, .. })
    }

    pub fn has_wildcard_type(&self) -> bool {
        matches!(self.kind, DeclKind::Object { ty: None, .. })
    }
}

/// Which members of a type scope to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberFilter {
    Functions,
    Objects,
    Types,
    All,
}

/// Which canonical copy/move operations a type already declares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeclaredThatFunctions {
    pub out_this_in_that: bool,
    pub out_this_move_that: bool,
    pub inout_this_in_that: bool,
    pub inout_this_move_that: bool,
}

/// Mutation requests a declaration may accept or refuse.
pub trait DeclarationRequests {
    /// Set the access level. Refused when a different level was already
    /// written explicitly.
    fn request_access(&mut self, id: DeclId, level: Accessibility) -> bool;

    /// Mark a member function virtual. Refused for functions without a
    /// `this` parameter.
    fn request_virtual(&mut self, id: DeclId) -> bool;

    /// Append a detached declaration to a type's member list.
    fn add_type_member(&mut self, ty: DeclId, member: DeclId) -> bool;
}

/// Arena of declarations plus the ordered list of file-scope roots.
#[derive(Debug, Clone, Default)]
pub struct SyntaxTree {
    nodes: Vec<DeclarationNode>,
    roots: Vec<DeclId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: DeclId) -> bool {
        id.index() < self.nodes.len()
    }

    /// Append a node and return its handle.
    pub fn alloc(&mut self, node: DeclarationNode) -> DeclId {
        let id = DeclId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Record a detached node as a file-scope declaration.
    pub fn push_root(&mut self, id: DeclId) {
        assert!(self.contains(id), "declaration handle {id:?} is not in this tree");
        debug_assert!(self.nodes[id.index()].parent.is_none());
        self.roots.push(id);
    }

    pub fn roots(&self) -> &[DeclId] {
        &self.roots
    }

    /// Current arena length, for a later [`truncate`](Self::truncate).
    pub fn mark(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node allocated since `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.nodes.truncate(mark);
        self.roots.retain(|id| id.index() < mark);
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    pub fn node(&self, id: DeclId) -> &DeclarationNode {
        assert!(self.contains(id), "declaration handle {id:?} is not in this tree");
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: DeclId) -> &mut DeclarationNode {
        assert!(self.contains(id), "declaration handle {id:?} is not in this tree");
        &mut self.nodes[id.index()]
    }

    pub fn parent(&self, id: DeclId) -> Option<DeclId> {
        self.node(id).parent
    }

    pub fn parent_node(&self, id: DeclId) -> Option<&DeclarationNode> {
        self.parent(id).map(|p| self.node(p))
    }

    pub fn is_detached(&self, id: DeclId) -> bool {
        self.node(id).parent.is_none() && !self.roots.contains(&id)
    }

    /// Access after resolving `Default` the way the language does: objects
    /// inside a type are private, everything else is public.
    pub fn effective_access(&self, id: DeclId) -> Accessibility {
        let node = self.node(id);
        match node.access {
            Accessibility::Default => {
                let in_type = self.parent_node(id).is_some_and(DeclarationNode::is_type);
                if in_type && node.is_object() {
                    Accessibility::Private
                } else {
                    Accessibility::Public
                }
            }
            explicit => explicit,
        }
    }

    /// Members of a type or namespace, filtered and in declaration order.
    pub fn type_scope_declarations(&self, scope: DeclId, filter: MemberFilter) -> Vec<DeclId> {
        self.node(scope)
            .members()
            .iter()
            .copied()
            .filter(|&m| {
                let node = self.node(m);
                match filter {
                    MemberFilter::Functions => node.is_function(),
                    MemberFilter::Objects => node.is_object(),
                    MemberFilter::Types => node.is_type(),
                    MemberFilter::All => true,
                }
            })
            .collect()
    }

    /// A type is polymorphic once it has a virtual member function or a
    /// base (a member object named `this`).
    pub fn is_polymorphic(&self, ty: DeclId) -> bool {
        self.node(ty).members().iter().any(|&m| {
            let node = self.node(m);
            let virtual_receiver = node
                .signature()
                .and_then(FunctionSig::this_param)
                .is_some_and(|p| p.this_spec.is_some());
            virtual_receiver || (node.is_object() && node.has_name_eq("this"))
        })
    }

    /// Scan the type enclosing `function` for the four copy/move shapes.
    pub fn find_declared_that_functions(&self, function: DeclId) -> DeclaredThatFunctions {
        let mut found = DeclaredThatFunctions::default();
        let Some(ty) = self.parent(function).filter(|&p| self.node(p).is_type()) else {
            return found;
        };
        for &m in self.node(ty).members() {
            let node = self.node(m);
            found.out_this_in_that |= node.is_constructor_with_in_that();
            found.out_this_move_that |= node.is_constructor_with_move_that();
            found.inout_this_in_that |= node.is_assignment_with_in_that();
            found.inout_this_move_that |= node.is_assignment_with_move_that();
        }
        found
    }
}

impl DeclarationRequests for SyntaxTree {
    fn request_access(&mut self, id: DeclId, level: Accessibility) -> bool {
        let node = self.node_mut(id);
        if node.access != Accessibility::Default && node.access != level {
            return false;
        }
        node.access = level;
        true
    }

    fn request_virtual(&mut self, id: DeclId) -> bool {
        let DeclKind::Function(sig) = &mut self.node_mut(id).kind else {
            return false;
        };
        match sig.params.first_mut() {
            Some(this) if this.name == "this" => {
                if this.this_spec.is_none() {
                    this.this_spec = Some(ThisSpecifier::Virtual);
                }
                true
            }
            _ => false,
        }
    }

    fn add_type_member(&mut self, ty: DeclId, member: DeclId) -> bool {
        if ty == member || !self.contains(member) || !self.is_detached(member) {
            return false;
        }
        let DeclKind::Type { members, .. } = &mut self.node_mut(ty).kind else {
            return false;
        };
        members.push(member);
        self.node_mut(member).parent = Some(ty);
        true
    }
}
