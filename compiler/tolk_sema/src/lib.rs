//! Tolk semantic core: name resolution, type inference and serialized size
//! estimation over [`tolk_ir`] syntax trees.
//!
//! A [`Session`] owns the files being analyzed and answers every query:
//!
//! - [`Session::resolve`] / [`Session::multi_resolve`]: the declaration an
//!   identifier refers to
//! - [`Session::infer_type`]: the [`Ty`] of an expression, type or
//!   declaration
//! - [`Session::estimate_size`]: bit and reference ranges of packed values
//! - [`Session::find_references`]: uses of a declaration
//!
//! Results are memoized per node and dropped whenever a file changes. The
//! engines only see the session through the [`Db`] trait.

mod cache;
mod config;
mod db;
mod error;
mod imports;
mod session;
mod state;
mod stubs;

pub mod decl;
pub mod index;
pub mod infer;
pub mod references;
pub mod resolve;
pub mod size;
pub mod ty;

use std::sync::Once;

pub use cache::{Caches, QueryCache};
pub use config::SessionConfig;
pub use db::{Db, Resolver, TypeOracle};
pub use decl::{Decl, DeclKind};
pub use error::{CancellationToken, SearchError, SessionError};
pub use imports::{normalize_path, resolve_import};
pub use references::FindReferencesOptions;
pub use session::{Session, SourceFile};
pub use size::SizeOf;
pub use state::ResolveState;
pub use stubs::{STUBS_PATH, STUBS_SOURCE};
pub use ty::{Nominal, Substitution, Ty, UnionTy};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=tolk_sema=debug`;
/// set `TOLK_LOG_TREE=1` as well for an indented tree of nested queries.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        // A subscriber installed by the host wins.
        let _ = if std::env::var("TOLK_LOG_TREE").is_ok() {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init()
        };
    });
}
