// SPDX-License-Identifier: MIT
// Copyright (c) 2023 Kagati Foundation

pub mod basic;
pub mod config;
pub mod class_node;
pub mod class_table;
pub mod consts;

mod cgen;
mod expr;

pub use cgen::CodeGenerator;
pub use class_node::*;
pub use class_table::ClassTable;
pub use config::*;

use coolc_ast::Program;
use coolc_const::ConstPool;
use coolc_errors::CodegenResult;

/// Generates the SPIM assembly for a type-checked program.
pub fn cgen(program: &Program, config: &CodegenConfig) -> CodegenResult<String> {
    let table = ClassTable::new(program)?;

    let mut pool = ConstPool::new();
    consts::collect_constants(&table, &mut pool);

    let mut generator = CodeGenerator::new(&table, &pool, config);
    generator.code()?;
    Ok(generator.into_code())
}

#[cfg(test)]
mod tests {
    use coolc_ast::{Attr, Branch, Class, Expr, Feature, Formal, Method, Program};
    use coolc_errors::CodegenError;

    use super::*;

    fn main_with(body: Expr, extra: Vec<Feature>) -> Program {
        let mut features = extra;
        features.push(Feature::Method(Method::new("main", vec![], "Object", body)));
        Program { classes: vec![Class::new("Main", Some("IO"), features, "main.cl")] }
    }

    fn gen(program: &Program) -> String {
        cgen(program, &CodegenConfig::default()).unwrap()
    }

    /// Lines of the routine starting at `label`, up to its return.
    fn routine<'s>(asm: &'s str, label: &str) -> Vec<&'s str> {
        asm.lines()
            .skip_while(|line| *line != format!("{label}:"))
            .take_while(|line| !line.starts_with("\tjr"))
            .collect()
    }

    /// True when consecutive lines start with the given prefixes.
    fn has_run(lines: &[&str], run: &[&str]) -> bool {
        lines
            .windows(run.len())
            .any(|window| window.iter().zip(run).all(|(line, prefix)| line.starts_with(prefix)))
    }

    #[test]
    fn test_global_sections_are_ordered() {
        let asm = gen(&main_with(Expr::int(1), vec![]));
        let positions: Vec<_> = [
            "_int_tag:",
            "_MemMgr_INITIALIZER:",
            "class_nameTab:",
            "class_objTab:",
            "Object_dispTab:",
            "Object_protObj:",
            "heap_start:",
            "\t.text",
            "Object_init:",
            "Main.main:"
        ]
        .iter()
        .map(|needle| asm.find(needle).unwrap_or_else(|| panic!("missing {needle:?}")))
        .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_builtin_methods_have_no_bodies() {
        let asm = gen(&main_with(Expr::int(1), vec![]));
        assert!(asm.contains("\t.word\tIO.out_string\n"));
        assert!(!asm.contains("IO.out_string:"));
        assert!(asm.contains("String_init:"));
    }

    #[test]
    fn test_prototype_defaults() {
        let prog = main_with(
            Expr::int(1),
            vec![
                Feature::Attr(Attr::new("n", "Int", Expr::no_expr())),
                Feature::Attr(Attr::new("s", "String", Expr::no_expr())),
                Feature::Attr(Attr::new("b", "Bool", Expr::no_expr())),
                Feature::Attr(Attr::new("o", "Object", Expr::no_expr()))
            ]
        );
        let asm = gen(&prog);
        let proto: Vec<_> = asm
            .lines()
            .skip_while(|line| *line != "Main_protObj:")
            .skip(1)
            .take(7)
            .collect();
        assert_eq!(proto[1], "\t.word\t7");
        assert_eq!(proto[2], "\t.word\tMain_dispTab");
        assert!(proto[3].starts_with("\t.word\tint_const"));
        assert!(proto[4].starts_with("\t.word\tstr_const"));
        assert_eq!(proto[5], "\t.word\tbool_const0");
        assert_eq!(proto[6], "\t.word\t0");
    }

    #[test]
    fn test_method_frame_pops_arguments() {
        let prog = Program {
            classes: vec![Class::new(
                "Main",
                Some("Object"),
                vec![
                    Feature::Method(Method::new(
                        "f",
                        vec![Formal::new("a", "Int"), Formal::new("b", "Int")],
                        "Int",
                        Expr::object("a", "Int")
                    )),
                    Feature::Method(Method::new("main", vec![], "Object", Expr::no_expr()))
                ],
                "main.cl"
            )]
        };
        let asm = gen(&prog);
        let f = routine(&asm, "Main.f");
        assert!(f.contains(&"\tlw\t$a0 16($fp)"));
        assert_eq!(f.last(), Some(&"\taddiu\t$sp $sp 20"));
    }

    #[test]
    fn test_let_and_arith_use_stack_offsets() {
        let body = Expr::let_in(
            "x",
            "Int",
            Expr::int(1),
            Expr::plus(Expr::int(2), Expr::object("x", "Int"))
        );
        let asm = gen(&main_with(body, vec![]));
        let main = routine(&asm, "Main.main");
        // `x` sits under the pushed left operand
        assert!(main.contains(&"\tlw\t$a0 8($sp)"));
        assert!(main.contains(&"\tjal\tObject.copy"));
        assert!(main.contains(&"\tadd\t$t1 $t1 $t2"));
    }

    #[test]
    fn test_case_tests_most_specific_branch_first() {
        let prog = Program {
            classes: vec![
                Class::new("A", Some("Object"), vec![], "main.cl"),
                Class::new(
                    "Main",
                    Some("A"),
                    vec![Feature::Method(Method::new(
                        "main",
                        vec![],
                        "Object",
                        Expr::case(
                            Expr::self_ref(),
                            vec![
                                Branch::new("o", "Object", Expr::int(0)),
                                Branch::new("a", "A", Expr::int(1)),
                                Branch::new("m", "Main", Expr::int(2))
                            ],
                            "Int"
                        )
                    ))],
                    "main.cl"
                )
            ]
        };
        let table = ClassTable::new(&prog).unwrap();
        let main_tag = table.tag_of("Main").unwrap();
        let a_tag = table.tag_of("A").unwrap();

        let asm = gen(&prog);
        let lower_bounds: Vec<_> = routine(&asm, "Main.main")
            .into_iter()
            .filter(|line| line.starts_with("\tblt\t$t2"))
            .collect();
        assert_eq!(lower_bounds.len(), 3);
        assert!(lower_bounds[0].starts_with(&format!("\tblt\t$t2 {main_tag} ")));
        assert!(lower_bounds[1].starts_with(&format!("\tblt\t$t2 {a_tag} ")));
        assert!(lower_bounds[2].starts_with("\tblt\t$t2 0 "));
        assert!(asm.contains("\tjal\t_case_abort2"));
    }

    #[test]
    fn test_dispatch_checks_void_receiver() {
        let body = Expr::dispatch(
            Expr::self_ref(),
            "out_string",
            vec![Expr::string("hi\n")],
            "SELF_TYPE"
        )
        .at_line(4);
        let asm = gen(&main_with(body, vec![]));
        let main = routine(&asm, "Main.main");
        assert!(main.contains(&"\tjal\t_dispatch_abort"));
        assert!(main.contains(&"\tli\t$t1 4"));
        // out_string follows the three Object methods
        assert!(main.contains(&"\tlw\t$t1 12($t1)"));
        assert!(main.contains(&"\tjalr\t$t1"));
    }

    #[test]
    fn test_generational_gc_guards_attribute_stores() {
        let prog = main_with(
            Expr::assign("n", Expr::int(3)),
            vec![Feature::Attr(Attr::new("n", "Int", Expr::no_expr()))]
        );
        let config = CodegenConfig::builder().gc(GcMode::Generational).gc_test(true).build();
        let asm = cgen(&prog, &config).unwrap();
        assert!(asm.contains("\t.word\t_GenGC_Init"));
        assert!(asm.contains("_MemMgr_TEST:\n\t.word\t1"));
        assert!(asm.contains("\tjal\t_GenGC_Assign"));

        let plain = gen(&prog);
        assert!(plain.contains("\t.word\t_NoGC_Init"));
        assert!(!plain.contains("_GenGC_Assign"));
    }

    #[test]
    fn test_unbound_identifier_is_internal() {
        let err = cgen(&main_with(Expr::object("ghost", "Int"), vec![]), &CodegenConfig::default())
            .unwrap_err();
        assert!(matches!(err, CodegenError::UnboundIdentifier { .. }));
        assert!(err.is_internal());
    }

    #[test]
    fn test_static_dispatch_jumps_to_definer() {
        let f = |body| Feature::Method(Method::new("f", vec![Formal::new("x", "Int")], "Int", body));
        let prog = Program {
            classes: vec![
                Class::new("A", Some("Object"), vec![f(Expr::object("x", "Int"))], "main.cl"),
                Class::new(
                    "Main",
                    Some("A"),
                    vec![
                        f(Expr::int(0)),
                        Feature::Method(Method::new(
                            "main",
                            vec![],
                            "Int",
                            Expr::static_dispatch(Expr::self_ref(), "A", "f", vec![Expr::int(1)], "Int")
                        ))
                    ],
                    "main.cl"
                )
            ]
        };
        let asm = gen(&prog);
        let main = routine(&asm, "Main.main");
        assert!(has_run(&main, &["\tjal\t_dispatch_abort", "label", "\tjal\tA.f"]));
        assert!(!main.contains(&"\tjal\tMain.f"));
        assert!(!main.iter().any(|line| line.starts_with("\tjalr")));
    }

    #[test]
    fn test_new_goes_through_prototype_or_obj_tab() {
        let body = Expr::block(vec![Expr::new_object("Main"), Expr::new_object("SELF_TYPE")]);
        let asm = gen(&main_with(body, vec![]));
        let main = routine(&asm, "Main.main");
        assert!(has_run(&main, &["\tla\t$a0 Main_protObj", "\tjal\tObject.copy", "\tjal\tMain_init"]));
        assert!(has_run(
            &main,
            &[
                "\tla\t$t1 class_objTab",
                "\tlw\t$t2 0($s0)",
                "\tsll\t$t2 $t2 3",
                "\taddu\t$t1 $t1 $t2",
                "\tsw\t$t1 0($sp)",
                "\taddiu\t$sp $sp -4",
                "\tlw\t$a0 0($t1)",
                "\tjal\tObject.copy",
                "\tlw\t$t1 4($sp)",
                "\taddiu\t$sp $sp 4",
                "\tlw\t$t1 4($t1)",
                "\tjalr\t$t1"
            ]
        ));
    }

    #[test]
    fn test_equality_short_circuits_identical_objects() {
        let asm = gen(&main_with(Expr::eq(Expr::string("a"), Expr::string("b")), vec![]));
        let main = routine(&asm, "Main.main");
        assert!(has_run(
            &main,
            &[
                "\tmove\t$t2 $a0",
                "\tla\t$a0 bool_const1",
                "\tbeq\t$t1 $t2 label",
                "\tla\t$a1 bool_const0",
                "\tjal\tequality_test",
                "label"
            ]
        ));
    }

    #[test]
    fn test_loop_and_conditional() {
        let body = Expr::block(vec![
            Expr::while_loop(Expr::lt(Expr::int(1), Expr::int(2)), Expr::neg(Expr::int(3))),
            Expr::cond(
                Expr::leq(Expr::int(1), Expr::int(2)),
                Expr::int(4),
                Expr::divide(Expr::int(8), Expr::int(2)),
                "Int"
            )
        ]);
        let asm = gen(&main_with(body, vec![]));
        let main = routine(&asm, "Main.main");

        let compare = |branch: &str| {
            [
                "\tlw\t$t1 12($t1)",
                "\tlw\t$t2 12($a0)",
                "\tla\t$a0 bool_const1",
                branch,
                "\tla\t$a0 bool_const0",
                "label"
            ]
            .map(str::to_string)
        };
        let lt = compare("\tblt\t$t1 $t2 label");
        let leq = compare("\tble\t$t1 $t2 label");
        assert!(has_run(&main, &lt.iter().map(String::as_str).collect::<Vec<_>>()));
        assert!(has_run(&main, &leq.iter().map(String::as_str).collect::<Vec<_>>()));

        // the loop body, then back to the test; the loop itself is void
        assert!(has_run(
            &main,
            &["\tjal\tObject.copy", "\tlw\t$t1 12($a0)", "\tneg\t$t1 $t1", "\tsw\t$t1 12($a0)"]
        ));
        assert!(has_run(&main, &["\tb\tlabel", "label", "\tmove\t$a0 $zero"]));

        assert!(has_run(&main, &["\tlw\t$t1 12($a0)", "\tbeqz\t$t1 label"]));
        assert!(has_run(&main, &["\tla\t$a0 int_const", "\tb\tlabel", "label"]));
        assert!(has_run(
            &main,
            &["\tlw\t$t1 12($t1)", "\tlw\t$t2 12($a0)", "\tdiv\t$t1 $t1 $t2", "\tsw\t$t1 12($a0)"]
        ));
    }

    #[test]
    fn test_isvoid_and_not_produce_bools() {
        let body = Expr::block(vec![
            Expr::is_void(Expr::object("o", "Object")),
            Expr::not(Expr::bool(true))
        ]);
        let prog = main_with(body, vec![Feature::Attr(Attr::new("o", "Object", Expr::no_expr()))]);
        let asm = gen(&prog);
        let main = routine(&asm, "Main.main");
        assert!(has_run(
            &main,
            &[
                "\tlw\t$a0 12($s0)",
                "\tmove\t$t1 $a0",
                "\tla\t$a0 bool_const1",
                "\tbeqz\t$t1 label",
                "\tla\t$a0 bool_const0",
                "label"
            ]
        ));
        assert!(has_run(
            &main,
            &[
                "\tla\t$a0 bool_const1",
                "\tlw\t$t1 12($a0)",
                "\tla\t$a0 bool_const1",
                "\tbeqz\t$t1 label",
                "\tla\t$a0 bool_const0"
            ]
        ));
    }
}
