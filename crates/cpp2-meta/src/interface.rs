//! The `interface` meta-function: turn a type into a pure abstract base.

use crate::reflect::TypeDeclaration;

/// Source of the destructor added to interfaces that lack one.
pub const VIRTUAL_DESTRUCTOR: &str = "operator=: (virtual move this) = { }";

/// No data, every function public and virtual, always polymorphically
/// destructible.
///
/// Violations are reported and processing continues; every member function
/// is made virtual whether or not it passed the checks.
pub fn interface(t: TypeDeclaration<'_>) {
    interface_with_destructor(t, VIRTUAL_DESTRUCTOR);
}

/// [`interface`] with the synthesized destructor's source supplied.
pub(crate) fn interface_with_destructor(t: TypeDeclaration<'_>, destructor: &str) {
    let mut has_dtor = false;

    for m in t.get_members() {
        let position = m.position();
        m.require_at(
            !m.is_object(),
            "interfaces may not contain data objects",
            position,
        );
        if m.is_function() {
            let mf = m.as_function();
            mf.require_at(
                !mf.is_copy_or_move(),
                "interfaces may not copy or move; consider a virtual clone() instead",
                position,
            );
            mf.require_at(
                !mf.has_initializer(),
                "interface functions must not have a function body; remove the '=' initializer",
                position,
            );
            mf.require_at(
                mf.make_public(),
                "interface functions must be public",
                position,
            );
            mf.make_function_virtual();
            has_dtor |= mf.is_destructor();
        }
    }

    if !has_dtor {
        t.require_at(
            t.add_member(destructor),
            "could not add pure virtual destructor",
            t.position(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::CompilationUnit;

    #[test]
    fn unparsable_destructor_is_reported_at_the_type() {
        let unit = CompilationUnit::parse("i: type = {\n    f: (this);\n}");
        let services = unit.services();
        let t = TypeDeclaration::new(unit.tree().roots()[0], &services);

        interface_with_destructor(t, "operator=: (virtual move this)");

        let diags = unit.diagnostics();
        let last = &diags.as_slice()[diags.len() - 1];
        assert_eq!(last.message, "could not add pure virtual destructor");
        assert_eq!(last.position.to_string(), "1:1");
        assert_eq!(t.get_members().len(), 1);
        assert!(t.get_member_functions()[0].is_virtual());
    }
}
