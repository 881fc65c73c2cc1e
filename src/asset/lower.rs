//! ES2015 syntax the oxc transformer leaves in place: template literals and
//! `let`/`const` declarations.
//!
//! Template literals become string concatenation. Block-scoped declarations
//! become `var`; a binding declared in a nested block is renamed first when
//! its name is used anywhere else in the file, so hoisting cannot capture
//! another binding. A loop binding captured by a closure in the same loop
//! needs a fresh binding per iteration, which `var` cannot express, so that
//! case is reported as an error instead of miscompiled.

use oxc::allocator::Allocator;
use oxc::ast::AstBuilder;
use oxc::ast::ast::{
    ArrowFunctionExpression, BindingIdentifier, DoWhileStatement, Expression, ForInStatement,
    ForOfStatement, ForStatement, ForStatementLeft, Function, IdentifierReference, Program,
    VariableDeclaration, VariableDeclarationKind, WhileStatement,
};
use oxc::ast_visit::{Visit, VisitMut, walk, walk_mut};
use oxc::semantic::{ScopeFlags, ScopeId, Scoping, SymbolFlags, SymbolId};
use oxc::span::{Atom, SPAN, Span};
use oxc::syntax::operator::BinaryOperator;
use oxc::transformer::{ESFeature, EngineTargets};
use rustc_hash::{FxHashMap, FxHashSet};

use super::AssetError;

/// Which lowerings the configured engines need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Es2015Lowering {
    template_literals: bool,
    block_scoping: bool,
}

impl Es2015Lowering {
    pub fn for_targets(targets: &EngineTargets) -> Self {
        // `has_feature` is true when the feature is missing on some target
        Self {
            template_literals: targets.has_feature(ESFeature::ES2015TemplateLiterals),
            block_scoping: targets.has_feature(ESFeature::ES2015BlockScoping),
        }
    }

    pub fn is_noop(self) -> bool {
        !self.template_literals && !self.block_scoping
    }

    /// Rewrite `program` in place. `scoping` must describe `program`.
    pub fn apply<'a>(
        self,
        allocator: &'a Allocator,
        program: &mut Program<'a>,
        scoping: &Scoping,
    ) -> Result<(), AssetError> {
        if self.is_noop() {
            return Ok(());
        }

        let renames = if self.block_scoping {
            let mut captures = LoopCaptures::new(scoping);
            captures.visit_program(program);
            if let Some(symbol) = captures.first_conflict() {
                return Err(AssetError::Transform(format!(
                    "`{}` is captured by a closure inside its loop and cannot be lowered to `var`",
                    scoping.symbol_name(symbol)
                )));
            }
            plan_renames(scoping)
        } else {
            FxHashMap::default()
        };

        let mut rewriter = Rewriter {
            ast: AstBuilder::new(allocator),
            lowering: self,
            scoping,
            renames,
        };
        rewriter.visit_program(program);
        Ok(())
    }
}

/// The scope a `var` declared in `scope` would hoist to.
fn hoist_scope(scoping: &Scoping, mut scope: ScopeId) -> ScopeId {
    while !scoping.scope_flags(scope).is_var() {
        match scoping.scope_parent_id(scope) {
            Some(parent) => scope = parent,
            None => break,
        }
    }
    scope
}

/// New names for block-scoped bindings that would collide once hoisted.
fn plan_renames(scoping: &Scoping) -> FxHashMap<SymbolId, String> {
    let mut uses: FxHashMap<String, usize> = FxHashMap::default();
    for symbol in scoping.symbol_ids() {
        *uses.entry(scoping.symbol_name(symbol).to_string()).or_default() += 1;
    }
    for name in scoping.root_unresolved_references().keys() {
        *uses.entry(name.to_string()).or_default() += 1;
    }

    let mut taken: FxHashSet<String> = uses.keys().cloned().collect();
    let mut renames = FxHashMap::default();

    for symbol in scoping.symbol_ids() {
        if !scoping
            .symbol_flags(symbol)
            .contains(SymbolFlags::BlockScopedVariable)
        {
            continue;
        }
        let scope = scoping.symbol_scope_id(symbol);
        let name = scoping.symbol_name(symbol);
        if scope == hoist_scope(scoping, scope) || uses.get(name).copied().unwrap_or(0) < 2 {
            continue;
        }

        let fresh = fresh_name(name, &taken);
        taken.insert(fresh.clone());
        renames.insert(symbol, fresh);
    }
    renames
}

/// `_name`, then `_name2`, `_name3`, ... until one is unused.
fn fresh_name(name: &str, taken: &FxHashSet<String>) -> String {
    let base = format!("_{name}");
    if !taken.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(base)
}

#[derive(Debug, Default, Clone, Copy)]
struct Frame {
    loops: u32,
    in_loop_closure: bool,
}

/// Finds `let`/`const` bindings declared in a loop and referenced from a
/// function created inside that loop.
struct LoopCaptures<'s> {
    scoping: &'s Scoping,
    frames: Vec<Frame>,
    loop_bound: Vec<SymbolId>,
    captured: FxHashSet<SymbolId>,
}

impl<'s> LoopCaptures<'s> {
    fn new(scoping: &'s Scoping) -> Self {
        Self {
            scoping,
            frames: vec![Frame::default()],
            loop_bound: Vec::new(),
            captured: FxHashSet::default(),
        }
    }

    fn frame(&self) -> Frame {
        self.frames.last().copied().unwrap_or_default()
    }

    fn in_loop(&mut self, body: impl FnOnce(&mut Self)) {
        if let Some(frame) = self.frames.last_mut() {
            frame.loops += 1;
        }
        body(self);
        if let Some(frame) = self.frames.last_mut() {
            frame.loops -= 1;
        }
    }

    fn in_function(&mut self, body: impl FnOnce(&mut Self)) {
        let parent = self.frame();
        self.frames.push(Frame {
            loops: 0,
            in_loop_closure: parent.loops > 0 || parent.in_loop_closure,
        });
        body(self);
        self.frames.pop();
    }

    fn first_conflict(&self) -> Option<SymbolId> {
        self.loop_bound
            .iter()
            .copied()
            .find(|symbol| self.captured.contains(symbol))
    }
}

impl<'a> Visit<'a> for LoopCaptures<'_> {
    fn visit_binding_identifier(&mut self, it: &BindingIdentifier<'a>) {
        let Some(symbol) = it.symbol_id.get() else {
            return;
        };
        if self.frame().loops > 0
            && self
                .scoping
                .symbol_flags(symbol)
                .contains(SymbolFlags::BlockScopedVariable)
        {
            self.loop_bound.push(symbol);
        }
    }

    fn visit_identifier_reference(&mut self, it: &IdentifierReference<'a>) {
        if !self.frame().in_loop_closure {
            return;
        }
        if let Some(symbol) = it
            .reference_id
            .get()
            .and_then(|reference| self.scoping.get_reference(reference).symbol_id())
        {
            self.captured.insert(symbol);
        }
    }

    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        self.in_function(|v| walk::walk_function(v, it, flags));
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        self.in_function(|v| walk::walk_arrow_function_expression(v, it));
    }

    fn visit_for_statement(&mut self, it: &ForStatement<'a>) {
        self.in_loop(|v| walk::walk_for_statement(v, it));
    }

    fn visit_for_in_statement(&mut self, it: &ForInStatement<'a>) {
        self.in_loop(|v| walk::walk_for_in_statement(v, it));
    }

    fn visit_for_of_statement(&mut self, it: &ForOfStatement<'a>) {
        self.in_loop(|v| walk::walk_for_of_statement(v, it));
    }

    fn visit_while_statement(&mut self, it: &WhileStatement<'a>) {
        self.in_loop(|v| walk::walk_while_statement(v, it));
    }

    fn visit_do_while_statement(&mut self, it: &DoWhileStatement<'a>) {
        self.in_loop(|v| walk::walk_do_while_statement(v, it));
    }
}

struct Rewriter<'a, 's> {
    ast: AstBuilder<'a>,
    lowering: Es2015Lowering,
    scoping: &'s Scoping,
    renames: FxHashMap<SymbolId, String>,
}

impl<'a> Rewriter<'a, '_> {
    fn string(&self, span: Span, value: Atom<'a>, lone_surrogates: bool) -> Expression<'a> {
        self.ast
            .expression_string_literal_with_lone_surrogates(span, value, None, lone_surrogates)
    }

    /// `` `a${b}c` `` to `"a" + b + "c"`. The leading string keeps `+` a
    /// string concatenation even when the first quasi is empty.
    fn concatenate(&self, expr: &mut Expression<'a>) {
        let Expression::TemplateLiteral(template) = expr else {
            return;
        };
        let span = template.span;
        let quasis: Vec<(Span, Atom<'a>, bool)> = template
            .quasis
            .iter()
            .map(|quasi| {
                let text = quasi.value.cooked.unwrap_or(quasi.value.raw);
                (quasi.span, text, quasi.lone_surrogates)
            })
            .collect();
        let expressions = std::mem::replace(&mut template.expressions, self.ast.vec());

        let mut quasis = quasis.into_iter();
        let mut result = match quasis.next() {
            Some((span, text, lone)) => self.string(span, text, lone),
            None => self.string(span, Atom::from(""), false),
        };
        for (expression, (quasi_span, text, lone)) in expressions.into_iter().zip(quasis) {
            result = self
                .ast
                .expression_binary(span, result, BinaryOperator::Addition, expression);
            if !text.is_empty() {
                let text = self.string(quasi_span, text, lone);
                result = self
                    .ast
                    .expression_binary(span, result, BinaryOperator::Addition, text);
            }
        }
        *expr = result;
    }

    fn to_var(&self, declaration: &mut VariableDeclaration<'a>, initialize: bool) {
        let was_let = declaration.kind == VariableDeclarationKind::Let;
        declaration.kind = VariableDeclarationKind::Var;
        for declarator in &mut declaration.declarations {
            declarator.kind = VariableDeclarationKind::Var;
            // `let x;` resets `x` each time it runs; `var x;` does not
            if initialize && was_let && declarator.init.is_none() {
                declarator.init = Some(self.ast.void_0(SPAN));
            }
        }
    }

    fn lower_for_each_head(&self, left: &mut ForStatementLeft<'a>) {
        if let ForStatementLeft::VariableDeclaration(declaration) = left
            && is_block_scoped(declaration.kind)
        {
            self.to_var(declaration, false);
        }
    }

    fn renamed(&self, symbol: Option<SymbolId>) -> Option<&str> {
        symbol
            .and_then(|symbol| self.renames.get(&symbol))
            .map(String::as_str)
    }
}

fn is_block_scoped(kind: VariableDeclarationKind) -> bool {
    matches!(
        kind,
        VariableDeclarationKind::Let | VariableDeclarationKind::Const
    )
}

impl<'a> VisitMut<'a> for Rewriter<'a, '_> {
    fn visit_expression(&mut self, it: &mut Expression<'a>) {
        walk_mut::walk_expression(self, it);
        if self.lowering.template_literals {
            self.concatenate(it);
        }
    }

    fn visit_variable_declaration(&mut self, it: &mut VariableDeclaration<'a>) {
        walk_mut::walk_variable_declaration(self, it);
        if self.lowering.block_scoping && is_block_scoped(it.kind) {
            self.to_var(it, true);
        }
    }

    fn visit_for_in_statement(&mut self, it: &mut ForInStatement<'a>) {
        if self.lowering.block_scoping {
            self.lower_for_each_head(&mut it.left);
        }
        walk_mut::walk_for_in_statement(self, it);
    }

    fn visit_for_of_statement(&mut self, it: &mut ForOfStatement<'a>) {
        if self.lowering.block_scoping {
            self.lower_for_each_head(&mut it.left);
        }
        walk_mut::walk_for_of_statement(self, it);
    }

    fn visit_binding_identifier(&mut self, it: &mut BindingIdentifier<'a>) {
        if let Some(name) = self.renamed(it.symbol_id.get()) {
            it.name = self.ast.ident(name);
        }
    }

    fn visit_identifier_reference(&mut self, it: &mut IdentifierReference<'a>) {
        let symbol = it
            .reference_id
            .get()
            .and_then(|reference| self.scoping.get_reference(reference).symbol_id());
        if let Some(name) = self.renamed(symbol) {
            it.name = self.ast.ident(name);
        }
    }
}
