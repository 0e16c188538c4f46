//! Model declaration selection.
//!
//! A model is an interface carrying the model doc tag. Interfaces nested in
//! namespaces are found too. With `exported_only`, an interface must be
//! visible outside its unit; top-level declarations of script units always
//! are, since they are globals.

use crate::core::program::{Checker, InterfaceRef, UnitId};

/// Tagged interfaces of `unit`, in source order.
pub fn select_models<'a>(
    checker: &Checker<'a>,
    unit: UnitId,
    model_tag: &str,
    exported_only: bool,
) -> Vec<InterfaceRef<'a>> {
    checker
        .unit_interfaces(unit)
        .into_iter()
        .filter(|(_, visible)| *visible || !exported_only)
        .map(|(iface, _)| iface)
        .filter(|iface| checker.doc_tags(iface.unit, iface.doc_pos).has(model_tag))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::core::program::Program;

    fn names(code: &str, exported_only: bool) -> Vec<String> {
        let program = Program::from_sources(&[("models.ts", code)]).unwrap();
        let checker = Checker::new(&program);
        select_models(&checker, 0, "realm", exported_only)
            .iter()
            .map(|iface| iface.name())
            .collect()
    }

    const MODULE: &str = r#"
/** @realm */
export interface Article { title: string }

export interface Untagged { x: string }

/** @realm */
interface Local { y: string }

export namespace Blog {
  /** @realm */
  export interface Post { body: string }
  /** @realm */
  interface Draft { body: string }
}

/**
 * A person.
 * @realm
 */
export default interface Author { name: string }
"#;

    #[test]
    fn test_selects_tagged_exported_interfaces() {
        assert_eq!(names(MODULE, true), vec!["Article", "Post", "Author"]);
    }

    #[test]
    fn test_selects_unexported_when_allowed() {
        assert_eq!(
            names(MODULE, false),
            vec!["Article", "Local", "Post", "Draft", "Author"]
        );
    }

    #[test]
    fn test_script_units_count_as_exported() {
        let code = r#"
/** @realm */
interface Article { title: string }
/** not a model */
interface Other { title: string }
"#;
        assert_eq!(names(code, true), vec!["Article"]);
    }

    #[test]
    fn test_line_comments_are_not_doc_comments() {
        let code = "// @realm\nexport interface Article { title: string }";
        assert!(names(code, true).is_empty());
    }
}
