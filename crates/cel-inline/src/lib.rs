// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Variable inlining pass for CEL expressions.
//!
//! Replaces free variable references in an expression tree:
//! - `x` → `5` when `x` is bound in the constant table
//! - `y` → `z` when `y` is bound in the alias table
//!
//! The input tree is never modified. Every rebuilt node keeps the id of the
//! node it replaces. Composite nodes (select, call, list, struct,
//! comprehension) are always rebuilt; untouched leaves are shared with the
//! input.
//!
//! Names bound by a comprehension are not tracked. A table key that is also
//! an `iter_var` or `accu_var` is substituted inside the loop body as well;
//! callers must only pass names that are free where they want them replaced.
//!
//! Rewriting is not idempotent when an alias target is itself a table key:
//! with `y → z` and `z → 1`, one pass turns `y` into `z` and a second pass
//! turns that into `1`.

pub mod iterative;

use std::collections::HashMap;
use std::sync::Arc;

use cel_ast::{Comprehension, Constant, Entry, EntryKey, Expr, ExprId, ExprKind};
use thiserror::Error;

pub use iterative::rewrite_iterative;

/// Variable name → literal that replaces it.
pub type ConstantTable = HashMap<String, Constant>;

/// Variable name → variable name that replaces it.
pub type AliasTable = HashMap<String, String>;

/// Errors raised while rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    #[error("unknown expression kind `{kind}` at node {id}")]
    UnknownNodeKind { id: ExprId, kind: &'static str },
}

/// Replace variables with constants only.
pub fn inline_constants(
    expr: &Arc<Expr>,
    constants: &ConstantTable,
) -> Result<Arc<Expr>, RewriteError> {
    rewrite(expr, constants, &AliasTable::new())
}

/// Replace variables with constants or with other variables.
///
/// A name present in both tables becomes the constant. With both tables
/// empty the input is returned as is, without walking it.
pub fn rewrite(
    expr: &Arc<Expr>,
    constants: &ConstantTable,
    aliases: &AliasTable,
) -> Result<Arc<Expr>, RewriteError> {
    let rewriter = Rewriter::new(constants, aliases);
    if rewriter.is_noop() {
        return Ok(Arc::clone(expr));
    }
    rewriter.expr(expr)
}

/// Like [`rewrite`], for an optional slot such as a call target.
pub fn rewrite_opt(
    expr: Option<&Arc<Expr>>,
    constants: &ConstantTable,
    aliases: &AliasTable,
) -> Result<Option<Arc<Expr>>, RewriteError> {
    expr.map(|e| rewrite(e, constants, aliases)).transpose()
}

/// The substitution context.
pub(crate) struct Rewriter<'a> {
    constants: &'a ConstantTable,
    aliases: &'a AliasTable,
}

impl<'a> Rewriter<'a> {
    pub(crate) fn new(constants: &'a ConstantTable, aliases: &'a AliasTable) -> Self {
        Self { constants, aliases }
    }

    pub(crate) fn is_noop(&self) -> bool {
        self.constants.is_empty() && self.aliases.is_empty()
    }

    fn expr(&self, expr: &Arc<Expr>) -> Result<Arc<Expr>, RewriteError> {
        self.step(expr, |child| self.expr(child))
    }

    /// Rewrite a single node, using `child` to obtain the rewritten form of
    /// each direct sub-expression.
    ///
    /// `child` is called once per sub-expression, in [`Expr::children`]
    /// order.
    pub(crate) fn step<F>(&self, expr: &Arc<Expr>, mut child: F) -> Result<Arc<Expr>, RewriteError>
    where
        F: FnMut(&Arc<Expr>) -> Result<Arc<Expr>, RewriteError>,
    {
        let kind = match &expr.kind {
            ExprKind::NotSet => {
                return Err(RewriteError::UnknownNodeKind {
                    id: expr.id,
                    kind: expr.kind.name(),
                })
            }
            ExprKind::Const(_) => return Ok(Arc::clone(expr)),
            ExprKind::Ident(name) => return Ok(self.ident(expr, name)),
            ExprKind::Select {
                operand,
                field,
                test_only,
            } => ExprKind::Select {
                operand: child(operand)?,
                field: field.clone(),
                test_only: *test_only,
            },
            ExprKind::Call {
                target,
                function,
                args,
            } => ExprKind::Call {
                target: target.as_ref().map(&mut child).transpose()?,
                function: function.clone(),
                args: args.iter().map(&mut child).collect::<Result<_, _>>()?,
            },
            ExprKind::List { elements } => ExprKind::List {
                elements: elements.iter().map(&mut child).collect::<Result<_, _>>()?,
            },
            ExprKind::Struct {
                message_name,
                entries,
            } => {
                let mut rewritten = Vec::with_capacity(entries.len());
                for entry in entries {
                    let value = child(&entry.value)?;
                    let key = match &entry.key {
                        EntryKey::Field(name) => EntryKey::Field(name.clone()),
                        EntryKey::MapKey(key) => EntryKey::MapKey(child(key)?),
                    };
                    rewritten.push(Entry {
                        id: entry.id,
                        key,
                        value,
                    });
                }
                ExprKind::Struct {
                    message_name: message_name.clone(),
                    entries: rewritten,
                }
            }
            ExprKind::Comprehension(c) => ExprKind::Comprehension(Box::new(Comprehension {
                iter_var: c.iter_var.clone(),
                iter_range: child(&c.iter_range)?,
                accu_var: c.accu_var.clone(),
                accu_init: child(&c.accu_init)?,
                loop_condition: child(&c.loop_condition)?,
                loop_step: child(&c.loop_step)?,
                result: child(&c.result)?,
            })),
        };
        Ok(Arc::new(Expr { id: expr.id, kind }))
    }

    fn ident(&self, expr: &Arc<Expr>, name: &str) -> Arc<Expr> {
        if let Some(value) = self.constants.get(name) {
            return Arc::new(Expr {
                id: expr.id,
                kind: ExprKind::Const(value.clone()),
            });
        }
        if let Some(alias) = self.aliases.get(name) {
            return Arc::new(Expr {
                id: expr.id,
                kind: ExprKind::Ident(alias.clone()),
            });
        }
        Arc::clone(expr)
    }
}
