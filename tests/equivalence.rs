//! Ambas rutas de ejecución deben coincidir en programas que no dependen
//! de sus diferencias: sin casillas 6 y 7, sin textos.

use proptest::prelude::*;
use runtime::Fault;
use welt::{run_compiled, run_welt, Error, Scripted};

const MAX_STATEMENTS: usize = 12;
const MAX_OPERATORS: usize = 4;

const OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "MOD", "=", "!=", "<", ">", "<=", ">=",
];
const COMPARISONS: &[&str] = &["=", "!=", "<", ">", "<=", ">="];

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..=300).prop_map(|number| number.to_string()),
        (0u8..=5).prop_map(|slot| format!("DING {}", slot)),
    ]
}

fn expr() -> impl Strategy<Value = String> {
    let operator = proptest::sample::select(OPERATORS);
    let tail = proptest::collection::vec((operator, leaf()), 0..=MAX_OPERATORS);

    (leaf(), tail).prop_map(|(first, tail)| {
        tail.into_iter()
            .fold(first, |expr, (op, leaf)| format!("{} {} {}", expr, op, leaf))
    })
}

fn statement() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u8..=5, expr()).prop_map(|(slot, value)| format!("DING {} = {}", slot, value)),
        expr().prop_map(|value| format!("VORSTELLUNG {}", value)),
    ]
}

fn program() -> impl Strategy<Value = String> {
    proptest::collection::vec(statement(), 1..=MAX_STATEMENTS)
        .prop_map(|statements| format!("ERWACHE\n{}\nVERNEINUNG\n", statements.join("\n")))
}

/// Salidas de ambas rutas, y si cada una terminó sin fallar.
fn both(source: &str) -> ((Vec<String>, bool), (Vec<String>, bool)) {
    both_with(source, &[])
}

fn both_with(source: &str, inputs: &[&str]) -> ((Vec<String>, bool), (Vec<String>, bool)) {
    let mut interpreted = Scripted::with_inputs(inputs.iter().copied());
    let welt = run_welt(source, &mut interpreted, None);

    let mut compiled = Scripted::with_inputs(inputs.iter().copied());
    let grund = run_compiled(source, &mut compiled, None);

    (
        (interpreted.into_outputs(), welt.is_ok()),
        (compiled.into_outputs(), grund.is_ok()),
    )
}

proptest! {
    #[test]
    fn straight_line_programs_agree(source in program()) {
        let (welt, grund) = both(&source);
        prop_assert_eq!(welt, grund, "pipelines disagree on:\n{}", source);
    }

    #[test]
    fn final_memory_agrees(source in program()) {
        let welt = run_welt(&source, Scripted::new(), None);
        let grund = run_compiled(&source, Scripted::new(), None);

        if let (Ok(welt), Ok(grund)) = (welt, grund) {
            prop_assert_eq!(&welt[..6], &grund[..6], "memory differs for:\n{}", source);
        }
    }
}

#[test]
fn wenn_branch_matrix() {
    for &op in COMPARISONS {
        for (a, b) in [(5u8, 3u8), (3, 5), (5, 5)] {
            let source = format!(
                "ERWACHE
                DING 0 = {a}
                DING 1 = {b}
                WENN DING 0 {op} DING 1 DANN
                    VORSTELLUNG \"ja\"
                SONST
                    VORSTELLUNG \"nein\"
                ENDE
                VERNEINUNG",
                a = a,
                b = b,
                op = op,
            );

            let expected = match op {
                "=" => a == b,
                "!=" => a != b,
                "<" => a < b,
                ">" => a > b,
                "<=" => a <= b,
                ">=" => a >= b,
                _ => unreachable!(),
            };

            let expected = if expected { "ja" } else { "nein" };
            let (welt, grund) = both(&source);

            assert_eq!(welt, (vec![expected.to_owned()], true), "{} {} {}", a, op, b);
            assert_eq!(grund, welt, "{} {} {}", a, op, b);
        }
    }
}

#[test]
fn solange_condition_matrix() {
    for &op in COMPARISONS {
        let source = format!(
            "ERWACHE
            DING 0 = 0
            SOLANGE DING 0 {} 3
                VORSTELLUNG DING 0
                DING 0 = DING 0 + 1
                WENN DING 0 > 6 DANN
                    VERNEINUNG
                ENDE
            ENDE
            VERNEINUNG",
            op
        );

        let (welt, grund) = both(&source);
        assert!(welt.1, "{}", op);
        assert_eq!(grund, welt, "{}", op);
    }
}

#[test]
fn modulo_after_carry() {
    let source = "
        ERWACHE
        DING 0 = 255 + 1
        VORSTELLUNG 17 MOD 5
        VORSTELLUNG 17 MOD 5
        VERNEINUNG
    ";

    let (welt, grund) = both(source);
    assert_eq!(welt, (vec!["3".to_owned(), "2".to_owned()], true));
    assert_eq!(grund, welt);
}

#[test]
fn modulo_by_zero_is_its_own_fault() {
    let source = "ERWACHE\nVORSTELLUNG 1\nVORSTELLUNG 1 MOD 0\nVERNEINUNG";

    for result in [
        run_welt(source, Scripted::new(), None),
        run_compiled(source, Scripted::new(), None),
    ] {
        match result {
            Err(Error::Fault(fault)) => assert!(matches!(fault.val(), Fault::ModuloByZero)),
            other => panic!("expected a modulo fault, got {:?}", other),
        }
    }
}

#[test]
fn blank_input_is_zero() {
    let source = "
        ERWACHE
        WILLE 0
        VORSTELLUNG DING 0 + 1
        VERNEINUNG
    ";

    let (welt, grund) = both_with(source, &[""]);
    assert_eq!(welt, (vec!["1".to_owned()], true));
    assert_eq!(grund, welt);
}

#[test]
fn empty_text_is_false() {
    let source = "
        ERWACHE
        WENN \"\" DANN
            VORSTELLUNG \"ja\"
        SONST
            VORSTELLUNG \"nein\"
        ENDE
        VERNEINUNG
    ";

    let (welt, grund) = both(source);
    assert_eq!(welt, (vec!["nein".to_owned()], true));
    assert_eq!(grund, welt);
}
