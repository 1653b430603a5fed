//! Recursive descent parser for one Cpp2 declaration.
//!
//! The parser works on the tokens of a single declaration group and the text
//! those tokens were lexed from. It allocates nodes straight into the
//! caller's [`SyntaxTree`]; the first error aborts the parse and the caller
//! rolls the arena back.

use cpp2_common::span::{SourcePosition, Span};
use cpp2_common::token::{Token, TokenKind};

use crate::error::ParseError;
use crate::tree::{
    Accessibility, AliasOf, DeclId, DeclKind, DeclarationNode, FunctionSig, Initializer,
    InitializerKind, Parameter, PassingStyle, SyntaxTree, ThisSpecifier,
};

pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    source: &'a str,
    tree: &'a mut SyntaxTree,
}

/// Where a balanced token run (type-id, expression) is allowed to stop.
#[derive(Clone, Copy)]
enum Stop {
    /// A type-id: stops before `=`, `==`, `;`, `,`, `)` or `{` at depth zero.
    TypeId,
    /// An initializer expression: stops before `;`.
    Statement,
    /// A parameter default: stops before `,` or `)`.
    Argument,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: &'a [Token], source: &'a str, tree: &'a mut SyntaxTree) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            tree,
        }
    }

    /// Parse one declaration that must consume every token.
    pub(crate) fn parse_whole(mut self) -> Result<DeclId, ParseError> {
        let id = self.declaration()?;
        if !self.at(TokenKind::Eof) {
            return Err(self.error("unexpected tokens after the end of the declaration"));
        }
        Ok(id)
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    fn nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn current(&self) -> TokenKind {
        self.nth(0)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    fn current_text(&self) -> &'a str {
        self.tokens
            .get(self.pos)
            .map_or("", |t| t.text(self.source))
    }

    /// Span and position of the current token, or of the end of the group
    /// when every token has been consumed.
    fn current_location(&self) -> (Span, SourcePosition) {
        if let Some(token) = self.tokens.get(self.pos) {
            return (token.span, token.position);
        }
        match self.tokens.last() {
            Some(last) => {
                let end = Span::new(last.span.end, last.span.end);
                let mut position = last.position;
                position.col += last.span.len();
                (end, position)
            }
            None => (Span::default(), SourcePosition::default()),
        }
    }

    fn current_position(&self) -> SourcePosition {
        self.current_location().1
    }

    // ── Token consumption ──────────────────────────────────────────────

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, message: &str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.error(message))
        }
    }

    fn expect_ident(&mut self, message: &str) -> Result<String, ParseError> {
        if !self.at(TokenKind::Ident) {
            return Err(self.error(message));
        }
        let text = self.current_text().to_string();
        self.advance();
        Ok(text)
    }

    /// Source text covering tokens `start..self.pos`.
    fn text_since(&self, start: usize) -> String {
        match (self.tokens.get(start), self.tokens.get(self.pos.saturating_sub(1))) {
            (Some(first), Some(last)) if start < self.pos => {
                self.source[first.span.start as usize..last.span.end as usize].to_string()
            }
            _ => String::new(),
        }
    }

    fn error(&self, message: &str) -> ParseError {
        let (span, position) = self.current_location();
        let found = if self.at(TokenKind::Eof) {
            "end of declaration".to_string()
        } else {
            format!("'{}'", self.current_text())
        };
        ParseError::new(format!("{message}, found {found}"), span, position)
    }

    // ── Declarations ───────────────────────────────────────────────────

    fn declaration(&mut self) -> Result<DeclId, ParseError> {
        let access = self.access();
        let position = self.current_position();
        let name = self.expect_ident("expected a declaration name")?;
        let name = (name != "_").then_some(name);
        self.expect(TokenKind::Colon, "expected ':' after the declaration name")?;

        let (meta_span, meta_position) = self.current_location();
        let meta_functions = self.meta_functions()?;

        let (kind, initializer) = match self.current() {
            TokenKind::LParen => self.function_body()?,
            TokenKind::Type => self.scope_body(true)?,
            TokenKind::Namespace => self.scope_body(false)?,
            _ => self.object_body()?,
        };

        if !meta_functions.is_empty() && !matches!(kind, DeclKind::Type { .. }) {
            return Err(ParseError::new(
                "meta functions may only be applied to type declarations",
                meta_span,
                meta_position,
            ));
        }
        let kind = match kind {
            DeclKind::Type { members, .. } => DeclKind::Type {
                members,
                meta_functions,
            },
            other => other,
        };

        let id = self.tree.alloc(DeclarationNode {
            name,
            position,
            access,
            kind,
            initializer,
            parent: None,
        });
        let members = self.tree.node(id).members().to_vec();
        for member in members {
            self.tree.node_mut(member).parent = Some(id);
        }
        Ok(id)
    }

    fn access(&mut self) -> Accessibility {
        let access = match self.current() {
            TokenKind::Public => Accessibility::Public,
            TokenKind::Protected => Accessibility::Protected,
            TokenKind::Private => Accessibility::Private,
            _ => return Accessibility::Default,
        };
        self.advance();
        access
    }

    /// `@name` or `@ns::name`, any number of times.
    fn meta_functions(&mut self) -> Result<Vec<String>, ParseError> {
        let mut names = Vec::new();
        while self.eat(TokenKind::At) {
            let mut name = self.expect_ident("expected a meta function name after '@'")?;
            while self.eat(TokenKind::ColonColon) {
                name.push_str("::");
                name.push_str(&self.expect_ident("expected a name after '::'")?);
            }
            names.push(name);
        }
        Ok(names)
    }

    fn function_body(&mut self) -> Result<(DeclKind, Option<Initializer>), ParseError> {
        let params = self.parameter_list()?;
        let returns = if self.eat(TokenKind::Arrow) {
            Some(self.balanced(Stop::TypeId, "expected a return type after '->'")?)
        } else {
            None
        };
        let initializer = self.initializer("expected '=' or ';' after the function signature")?;
        Ok((DeclKind::Function(FunctionSig { params, returns }), initializer))
    }

    fn parameter_list(&mut self) -> Result<Vec<Parameter>, ParseError> {
        self.expect(TokenKind::LParen, "expected '('")?;
        let mut params = Vec::new();
        if self.eat(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            params.push(self.parameter()?);
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen, "expected ',' or ')' in the parameter list")?;
            return Ok(params);
        }
    }

    fn parameter(&mut self) -> Result<Parameter, ParseError> {
        let (span, position) = self.current_location();
        let this_spec = match self.current() {
            TokenKind::Virtual => Some(ThisSpecifier::Virtual),
            TokenKind::Override => Some(ThisSpecifier::Override),
            TokenKind::Final => Some(ThisSpecifier::Final),
            _ => None,
        };
        if this_spec.is_some() {
            self.advance();
        }
        let pass = match self.current() {
            TokenKind::In => Some(PassingStyle::In),
            TokenKind::Inout => Some(PassingStyle::Inout),
            TokenKind::Out => Some(PassingStyle::Out),
            TokenKind::Copy => Some(PassingStyle::Copy),
            TokenKind::Move => Some(PassingStyle::Move),
            TokenKind::Forward => Some(PassingStyle::Forward),
            _ => None,
        };
        if pass.is_some() {
            self.advance();
        }
        let name = self.expect_ident("expected a parameter name")?;
        if this_spec.is_some() && name != "this" {
            return Err(ParseError::new(
                "'virtual', 'override' and 'final' only apply to 'this'",
                span,
                position,
            ));
        }
        let ty = if self.eat(TokenKind::Colon) {
            Some(self.balanced(Stop::TypeId, "expected a parameter type after ':'")?)
        } else {
            None
        };
        let default = if self.eat(TokenKind::Eq) {
            Some(self.balanced(Stop::Argument, "expected a default value after '='")?)
        } else {
            None
        };
        Ok(Parameter {
            name,
            pass,
            this_spec,
            ty,
            default,
        })
    }

    /// `type = { ... }`, `type == target;` and the namespace forms.
    fn scope_body(&mut self, is_type: bool) -> Result<(DeclKind, Option<Initializer>), ParseError> {
        self.advance(); // `type` / `namespace`
        if self.eat(TokenKind::EqEq) {
            let target = self.balanced(Stop::Statement, "expected an alias target after '=='")?;
            self.expect(TokenKind::Semicolon, "expected ';' after the alias")?;
            let of = if is_type { AliasOf::Type } else { AliasOf::Namespace };
            return Ok((DeclKind::Alias { of, target }, None));
        }
        self.expect(TokenKind::Eq, "expected '=' or '=='")?;
        let open = self.current_position();
        self.expect(TokenKind::LBrace, "expected '{' to start the body")?;
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Eof) {
                return Err(self
                    .error("expected '}' to close the body")
                    .with_related("opened here", open));
            }
            members.push(self.declaration()?);
        }
        self.advance();
        self.eat(TokenKind::Semicolon);
        let kind = if is_type {
            DeclKind::Type {
                members,
                meta_functions: Vec::new(),
            }
        } else {
            DeclKind::Namespace { members }
        };
        Ok((kind, None))
    }

    fn object_body(&mut self) -> Result<(DeclKind, Option<Initializer>), ParseError> {
        let is_const = self.eat(TokenKind::Const);
        let ty = match self.current() {
            TokenKind::Eq | TokenKind::EqEq | TokenKind::Semicolon if !is_const => None,
            _ => {
                let ty = self.balanced(Stop::TypeId, "expected a type")?;
                (ty != "_").then_some(ty)
            }
        };

        if self.eat(TokenKind::EqEq) {
            let target = self.balanced(Stop::Statement, "expected an alias target after '=='")?;
            self.expect(TokenKind::Semicolon, "expected ';' after the alias")?;
            let kind = DeclKind::Alias {
                of: AliasOf::Object(ty),
                target,
            };
            return Ok((kind, None));
        }

        let initializer = self.initializer("expected '=' or ';' after the object type")?;
        if ty.is_none() && initializer.is_none() {
            return Err(self.error("an object with a deduced type needs an initializer"));
        }
        Ok((DeclKind::Object { ty, is_const }, initializer))
    }

    /// `;`, `= { ... }` (optionally followed by `;`) or `= expr;`.
    fn initializer(&mut self, message: &str) -> Result<Option<Initializer>, ParseError> {
        if self.eat(TokenKind::Semicolon) {
            return Ok(None);
        }
        self.expect(TokenKind::Eq, message)?;
        if self.at(TokenKind::LBrace) {
            let text = self.block()?;
            self.eat(TokenKind::Semicolon);
            return Ok(Some(Initializer {
                text,
                kind: InitializerKind::Block,
            }));
        }
        let text = self.balanced(Stop::Statement, "expected an initializer after '='")?;
        self.expect(TokenKind::Semicolon, "expected ';' after the initializer")?;
        Ok(Some(Initializer {
            text,
            kind: InitializerKind::Expr,
        }))
    }

    /// A `{ ... }` block, returned verbatim.
    fn block(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let open = self.current_position();
        let mut depth = 0u32;
        loop {
            let kind = self.current();
            if kind == TokenKind::Eof {
                return Err(self
                    .error("expected '}' to close the block")
                    .with_related("opened here", open));
            }
            self.advance();
            if kind.is_open_delimiter() {
                depth += 1;
            } else if kind.is_close_delimiter() {
                depth -= 1;
                if depth == 0 {
                    return Ok(self.text_since(start));
                }
            }
        }
    }

    /// A run of tokens with balanced delimiters, ending before the first
    /// depth-zero token that `stop` names.
    fn balanced(&mut self, stop: Stop, message: &str) -> Result<String, ParseError> {
        let start = self.pos;
        let mut depth = 0u32;
        let mut angles = 0u32;
        loop {
            let kind = self.current();
            if kind == TokenKind::Eof {
                break;
            }
            if depth == 0 {
                let stops_here = match stop {
                    Stop::TypeId => {
                        angles == 0
                            && matches!(
                                kind,
                                TokenKind::Eq
                                    | TokenKind::EqEq
                                    | TokenKind::Semicolon
                                    | TokenKind::Comma
                                    | TokenKind::LBrace
                            )
                    }
                    Stop::Statement => kind == TokenKind::Semicolon,
                    Stop::Argument => kind == TokenKind::Comma,
                };
                if stops_here || kind.is_close_delimiter() {
                    break;
                }
            }
            if kind.is_open_delimiter() {
                depth += 1;
            } else if kind.is_close_delimiter() {
                depth -= 1;
            } else if matches!(stop, Stop::TypeId) && depth == 0 {
                match kind {
                    TokenKind::Lt => angles += 1,
                    TokenKind::Gt => angles = angles.saturating_sub(1),
                    _ => {}
                }
            }
            self.advance();
        }
        if self.pos == start {
            return Err(self.error(message));
        }
        Ok(self.text_since(start))
    }
}
