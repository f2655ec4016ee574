// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rewrite requests read from JSON files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cel_ast::Expr;
use cel_inline::{AliasTable, ConstantTable, RewriteError};
use serde::Deserialize;
use thiserror::Error;

/// One tree plus the tables to apply to it.
///
/// ```json
/// { "expr": { "id": 1, "kind": { "Ident": "x" } },
///   "constants": { "x": { "Int": 5 } },
///   "aliases": { "y": "z" } }
/// ```
#[derive(Debug, Deserialize)]
pub struct Request {
    pub expr: Arc<Expr>,
    #[serde(default)]
    pub constants: ConstantTable,
    #[serde(default)]
    pub aliases: AliasTable,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid request in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Rewrite(#[from] RewriteError),
    #[error("cannot encode result: {0}")]
    Encode(serde_json::Error),
}

impl Request {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| CliError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
