// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.

use std::sync::Arc;

use crate::{Constant, ExprId};

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Expr {
    pub id: ExprId,
    pub kind: ExprKind,
}

/// The kind of expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExprKind {
    /// Kind slot left empty.
    ///
    /// Produced when decoding a node whose kind was missing on the wire or
    /// carried a variant this build does not understand. Passes reject it.
    NotSet,
    /// Literal value
    Const(Constant),
    /// Variable reference
    Ident(String),
    /// Field selection (`a.b`), or presence test (`has(a.b)`) when `test_only`
    Select {
        operand: Arc<Expr>,
        field: String,
        test_only: bool,
    },
    /// Function call, or method call when `target` is present
    Call {
        target: Option<Arc<Expr>>,
        function: String,
        args: Vec<Arc<Expr>>,
    },
    /// List literal (`[a, b]`)
    List { elements: Vec<Arc<Expr>> },
    /// Message literal (`pkg.Msg{f: v}`) or map literal (`{k: v}`)
    Struct {
        message_name: Option<String>,
        entries: Vec<Entry>,
    },
    /// Expanded comprehension macro (`all`, `exists`, `map`, `filter`, ...)
    Comprehension(Box<Comprehension>),
}

/// An entry of a message or map literal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    pub id: ExprId,
    pub key: EntryKey,
    pub value: Arc<Expr>,
}

/// The key of a literal entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryKey {
    /// Field name of a message literal.
    Field(String),
    /// Key expression of a map literal.
    MapKey(Arc<Expr>),
}

/// A fold over `iter_range`.
///
/// `accu_var` starts as `accu_init`; for each element bound to `iter_var`,
/// while `loop_condition` holds, `accu_var` becomes `loop_step`. The value of
/// the whole expression is `result`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Comprehension {
    pub iter_var: String,
    pub iter_range: Arc<Expr>,
    pub accu_var: String,
    pub accu_init: Arc<Expr>,
    pub loop_condition: Arc<Expr>,
    pub loop_step: Arc<Expr>,
    pub result: Arc<Expr>,
}

impl ExprKind {
    /// Short tag for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ExprKind::NotSet => "not_set",
            ExprKind::Const(_) => "const",
            ExprKind::Ident(_) => "ident",
            ExprKind::Select { .. } => "select",
            ExprKind::Call { .. } => "call",
            ExprKind::List { .. } => "list",
            ExprKind::Struct { .. } => "struct",
            ExprKind::Comprehension(_) => "comprehension",
        }
    }
}

impl Expr {
    pub fn new(id: i64, kind: ExprKind) -> Self {
        Self {
            id: ExprId(id),
            kind,
        }
    }

    pub fn constant(id: i64, value: impl Into<Constant>) -> Arc<Expr> {
        Arc::new(Expr::new(id, ExprKind::Const(value.into())))
    }

    pub fn ident(id: i64, name: impl Into<String>) -> Arc<Expr> {
        Arc::new(Expr::new(id, ExprKind::Ident(name.into())))
    }

    pub fn select(id: i64, operand: Arc<Expr>, field: impl Into<String>) -> Arc<Expr> {
        Arc::new(Expr::new(
            id,
            ExprKind::Select {
                operand,
                field: field.into(),
                test_only: false,
            },
        ))
    }

    pub fn call(
        id: i64,
        target: Option<Arc<Expr>>,
        function: impl Into<String>,
        args: Vec<Arc<Expr>>,
    ) -> Arc<Expr> {
        Arc::new(Expr::new(
            id,
            ExprKind::Call {
                target,
                function: function.into(),
                args,
            },
        ))
    }

    pub fn list(id: i64, elements: Vec<Arc<Expr>>) -> Arc<Expr> {
        Arc::new(Expr::new(id, ExprKind::List { elements }))
    }

    /// Direct sub-expressions, in the order passes visit them.
    ///
    /// Map entries yield their value before their key.
    pub fn children(&self) -> Vec<&Arc<Expr>> {
        match &self.kind {
            ExprKind::NotSet | ExprKind::Const(_) | ExprKind::Ident(_) => Vec::new(),
            ExprKind::Select { operand, .. } => vec![operand],
            ExprKind::Call { target, args, .. } => target.iter().chain(args.iter()).collect(),
            ExprKind::List { elements } => elements.iter().collect(),
            ExprKind::Struct { entries, .. } => {
                let mut children = Vec::with_capacity(entries.len() * 2);
                for entry in entries {
                    children.push(&entry.value);
                    if let EntryKey::MapKey(key) = &entry.key {
                        children.push(key);
                    }
                }
                children
            }
            ExprKind::Comprehension(c) => vec![
                &c.iter_range,
                &c.accu_init,
                &c.loop_condition,
                &c.loop_step,
                &c.result,
            ],
        }
    }
}

/// Dropping unlinks the subtree with a work list instead of recursing, so
/// releasing a deeply nested tree cannot exhaust the stack.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(std::mem::replace(&mut self.kind, ExprKind::NotSet), &mut pending);
        while let Some(child) = pending.pop() {
            // Shared children only lose a reference here.
            if let Some(mut expr) = Arc::into_inner(child) {
                detach_children(std::mem::replace(&mut expr.kind, ExprKind::NotSet), &mut pending);
            }
        }
    }
}

fn detach_children(kind: ExprKind, pending: &mut Vec<Arc<Expr>>) {
    match kind {
        ExprKind::NotSet | ExprKind::Const(_) | ExprKind::Ident(_) => {}
        ExprKind::Select { operand, .. } => pending.push(operand),
        ExprKind::Call { target, args, .. } => {
            pending.extend(target);
            pending.extend(args);
        }
        ExprKind::List { elements } => pending.extend(elements),
        ExprKind::Struct { entries, .. } => {
            for entry in entries {
                pending.push(entry.value);
                if let EntryKey::MapKey(key) = entry.key {
                    pending.push(key);
                }
            }
        }
        ExprKind::Comprehension(c) => {
            let c = *c;
            pending.extend([c.iter_range, c.accu_init, c.loop_condition, c.loop_step, c.result]);
        }
    }
}
