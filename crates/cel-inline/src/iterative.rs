// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Explicit-stack variant of the rewrite.
//!
//! Produces exactly what [`crate::rewrite`] produces, including which node
//! an error is reported for, but keeps its work list on the heap so that
//! nesting depth is bounded by memory rather than by the thread's stack.

use std::sync::Arc;

use cel_ast::Expr;

use crate::{AliasTable, ConstantTable, RewriteError, Rewriter};

enum Task<'e> {
    /// Rewrite the children of this node, then the node.
    Visit(&'e Arc<Expr>),
    /// Children are done and sit on top of the result stack.
    Build(&'e Arc<Expr>),
}

/// Drop-in replacement for [`crate::rewrite`] for very deep trees.
///
/// On failure the partly rebuilt subtrees are released without recursion,
/// so the error comes back even when it follows a very deep sibling.
pub fn rewrite_iterative(
    expr: &Arc<Expr>,
    constants: &ConstantTable,
    aliases: &AliasTable,
) -> Result<Arc<Expr>, RewriteError> {
    let rewriter = Rewriter::new(constants, aliases);
    if rewriter.is_noop() {
        return Ok(Arc::clone(expr));
    }

    let mut tasks = vec![Task::Visit(expr)];
    let mut results: Vec<Arc<Expr>> = Vec::new();

    while let Some(task) = tasks.pop() {
        match task {
            Task::Visit(node) => {
                let children = node.children();
                if children.is_empty() {
                    results.push(rewriter.step(node, |c| Ok(Arc::clone(c)))?);
                    continue;
                }
                tasks.push(Task::Build(node));
                // Reversed so the first child is visited first.
                tasks.extend(children.into_iter().rev().map(Task::Visit));
            }
            Task::Build(node) => {
                let arity = node.children().len();
                debug_assert!(results.len() >= arity, "children of node {} missing", node.id);
                let mut done = results.split_off(results.len() - arity).into_iter();
                let rebuilt = rewriter.step(node, |_| {
                    Ok(done
                        .next()
                        .unwrap_or_else(|| unreachable!("fewer results than children")))
                })?;
                results.push(rebuilt);
            }
        }
    }

    // An early `?` above drops partial results; `Expr`'s drop does not recurse.
    debug_assert_eq!(results.len(), 1);
    Ok(results
        .pop()
        .unwrap_or_else(|| unreachable!("root is always rebuilt last")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cel_ast::{Constant, ExprId, ExprKind};

    #[test]
    fn matches_recursive_on_call() {
        let expr = Expr::call(
            1,
            Some(Expr::ident(2, "t")),
            "f",
            vec![Expr::ident(3, "x"), Expr::list(4, vec![Expr::ident(5, "y")])],
        );
        let constants: ConstantTable = [("x".to_string(), Constant::Int(1))].into_iter().collect();
        let aliases: AliasTable = [("y".to_string(), "z".to_string())].into_iter().collect();

        let recursive = crate::rewrite(&expr, &constants, &aliases).unwrap();
        let iterative = rewrite_iterative(&expr, &constants, &aliases).unwrap();
        assert_eq!(recursive, iterative);
    }

    #[test]
    fn leaf_root() {
        let expr = Expr::ident(9, "x");
        let constants: ConstantTable = [("x".to_string(), Constant::Uint(2))].into_iter().collect();
        let out = rewrite_iterative(&expr, &constants, &AliasTable::new()).unwrap();
        assert_eq!(out, Expr::constant(9, Constant::Uint(2)));
    }

    #[test]
    fn reports_first_unknown_node() {
        let expr = Expr::list(
            1,
            vec![
                Expr::select(2, Arc::new(Expr::new(3, ExprKind::NotSet)), "f"),
                Arc::new(Expr::new(4, ExprKind::NotSet)),
            ],
        );
        let aliases: AliasTable = [("a".to_string(), "b".to_string())].into_iter().collect();
        let err = rewrite_iterative(&expr, &ConstantTable::new(), &aliases).unwrap_err();
        assert_eq!(
            err,
            RewriteError::UnknownNodeKind {
                id: ExprId(3),
                kind: "not_set",
            }
        );
    }
}
