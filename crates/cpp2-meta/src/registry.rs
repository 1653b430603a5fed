//! Meta-function lookup and dispatch.

use rustc_hash::FxHashMap;

use cpp2_parser::DeclId;

use crate::interface;
use crate::reflect::TypeDeclaration;
use crate::services::CompilerServices;

/// Every built-in meta-function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaFunction {
    Interface,
}

impl MetaFunction {
    pub fn name(self) -> &'static str {
        match self {
            MetaFunction::Interface => "interface",
        }
    }

    pub fn apply(self, t: TypeDeclaration<'_>) {
        match self {
            MetaFunction::Interface => interface::interface(t),
        }
    }
}

const BUILTINS: &[MetaFunction] = &[MetaFunction::Interface];

/// Name to meta-function table, matched by exact name.
#[derive(Debug, Clone)]
pub struct MetaFunctionRegistry {
    by_name: FxHashMap<&'static str, MetaFunction>,
}

impl Default for MetaFunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaFunctionRegistry {
    /// A registry holding every built-in.
    pub fn new() -> Self {
        let by_name = BUILTINS.iter().map(|&mf| (mf.name(), mf)).collect();
        Self { by_name }
    }

    pub fn lookup(&self, name: &str) -> Option<MetaFunction> {
        self.by_name.get(name).copied()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.by_name.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Run the annotations of type `node` left to right.
    ///
    /// Each meta-function gets a fresh view of the type. The first unknown
    /// name is reported at the type, stops the remaining annotations and
    /// makes the whole declaration fail.
    pub fn apply_type_meta_functions(&self, services: &CompilerServices<'_>, node: DeclId) -> bool {
        let names = TypeDeclaration::new(node, services).meta_functions();
        for name in names {
            let t = TypeDeclaration::new(node, services);
            match self.lookup(&name) {
                Some(mf) => {
                    log::debug!("applying @{} to type '{}'", mf.name(), t.name());
                    mf.apply(t);
                }
                None => {
                    log::warn!("unknown meta function '{name}' on type '{}'", t.name());
                    t.require_at(
                        false,
                        &format!(
                            "unrecognized meta function name '{name}' - currently only unqualified 'interface' is supported"
                        ),
                        t.position(),
                    );
                    return false;
                }
            }
        }
        true
    }
}
