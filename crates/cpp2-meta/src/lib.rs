//! Compile-time reflection and meta-functions for Cpp2 type declarations.
//!
//! While a type declaration carrying `@name` annotations is compiled, the
//! [`MetaFunctionRegistry`] runs each named meta-function against a
//! [`TypeDeclaration`] view of it. Meta-functions inspect members through
//! the reflective views, report violations through
//! [`CompilerServices::require`], and add members by handing source text to
//! [`CompilerServices::parse_statement`], which compiles it exactly like
//! user-written code.
//!
//! [`CompilationUnit`] ties it together for a whole source file.

pub mod diagnostics;
pub mod generated;
pub mod interface;
pub mod reflect;
pub mod registry;
pub mod services;
pub mod unit;

pub use diagnostics::{render_diagnostic, DiagnosticOptions};
pub use generated::GeneratedSources;
pub use reflect::{Declaration, FunctionDeclaration, ObjectDeclaration, TypeDeclaration};
pub use registry::{MetaFunction, MetaFunctionRegistry};
pub use services::CompilerServices;
pub use unit::{CompilationUnit, MetaReport};
