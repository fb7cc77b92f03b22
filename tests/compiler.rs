use runtime::{
    asm,
    console::NO_HALT_NOTICE,
    machine::MAX_STEPS,
    Fault,
};
use welt::{compile_welt, parse::ParserError, run_compiled, Error, Memory, Scripted, Value};

fn compiled(source: &str) -> (Result<Memory, Error>, Scripted) {
    let mut console = Scripted::new();
    let result = run_compiled(source, &mut console, None);
    (result, console)
}

fn outputs(source: &str) -> Vec<String> {
    let (result, console) = compiled(source);
    result.expect("compiled program should not fail");
    console.into_outputs()
}

fn line(text: &str, comment: &str) -> String {
    format!("  {:24}; {}", text, comment)
}

#[test]
fn listing_has_header_data_and_code() {
    let source = "ERWACHE\nVORSTELLUNG \"Hallo\"\nVORSTELLUNG \"Hallo\"\nVERNEINUNG";
    let listing = compile_welt(source, Some("hallo.welt")).unwrap();

    let expected = [
        "; === GRUND (DAS-8 Q4) ===".to_owned(),
        "; source: hallo.welt".to_owned(),
        format!("; compiled by welt {}", env!("CARGO_PKG_VERSION")),
        String::new(),
        ".data".to_owned(),
        "  s0: \"Hallo\"".to_owned(),
        String::new(),
        ".code".to_owned(),
        line("tar  r7, s0", "VORSTELLUNG \"Hallo\""),
        "  mav  r7".to_owned(),
        line("tar  r7, s0", "VORSTELLUNG \"Hallo\""),
        "  mav  r7".to_owned(),
        line("nov", "VERNEINUNG"),
    ];

    assert_eq!(listing.lines().collect::<Vec<_>>(), expected);
}

#[test]
fn listing_without_text_has_no_data_section() {
    let listing = compile_welt("ERWACHE\nVORSTELLUNG 1\nVERNEINUNG", None).unwrap();

    assert!(!listing.contains(".data"));
    assert!(!listing.contains("; source:"));
    assert!(listing.contains("\n.code\n"));
}

#[test]
fn data_entries_are_deduplicated_and_escaped() {
    let source = "
        ERWACHE
        DING 0 = \"zeile\\neins\"
        DING 1 = \"sagt \\\"hallo\\\"\"
        DING 2 = \"zeile\\neins\"
        VERNEINUNG
    ";

    let listing = compile_welt(source, None).unwrap();
    let data: Vec<_> = listing
        .lines()
        .filter(|line| line.trim_start().starts_with('s') && line.contains(": \""))
        .collect();

    assert_eq!(data, [r#"  s0: "zeile\neins""#, r#"  s1: "sagt \"hallo\"""#]);
}

#[test]
fn listing_reassembles() {
    let source = "
        ERWACHE
        DING 0 = 3
        SOLANGE DING 0 > 0
            WENN DING 0 MOD 2 = 1 DANN
                VORSTELLUNG \"ungerade\"
            SONST
                VORSTELLUNG DING 0
            ENDE
            DING 0 = DING 0 - 1
        ENDE
        VERNEINUNG
    ";

    let listing = compile_welt(source, None).unwrap();
    let program = asm::parse(&listing).unwrap();

    assert!(program.label(".L0").is_some());
    assert!(program.data("s0").is_some());
}

#[test]
fn compiled_programs_print_like_interpreted_ones() {
    let source = "
        ERWACHE
        DING 0 = 5
        SOLANGE DING 0 > 0
            VORSTELLUNG DING 0
            DING 0 = DING 0 - 1
        ENDE
        VORSTELLUNG 6 * 7
        VORSTELLUNG 7 / 2
        VORSTELLUNG 17 MOD 5
        VERNEINUNG
    ";

    assert_eq!(outputs(source), ["5", "4", "3", "2", "1", "42", "3", "2"]);
}

#[test]
fn compound_right_operand_spills_through_the_ring() {
    let source = "
        ERWACHE
        VORSTELLUNG 8 - 2 * 3
        VORSTELLUNG 100 - 10 * 5 - 6 / 2
        VERNEINUNG
    ";

    let listing = compile_welt(source, None).unwrap();
    assert!(listing.contains("tin  r7"));
    assert!(listing.contains("tab  r7"));

    assert_eq!(outputs(source), ["2", "47"]);
}

#[test]
fn constant_text_concatenation_is_folded() {
    let source = "ERWACHE\nVORSTELLUNG \"a\" + \"b\" + \"c\"\nVERNEINUNG";

    let listing = compile_welt(source, None).unwrap();
    assert!(listing.contains("s0: \"abc\""));
    assert!(!listing.contains("kur"));

    assert_eq!(outputs(source), ["abc"]);
}

#[test]
fn runtime_text_concatenation_uses_kur() {
    let source = "ERWACHE\nDING 0 = 4\nVORSTELLUNG \"DING \" + DING 0\nVERNEINUNG";

    assert!(compile_welt(source, None).unwrap().contains("kur"));
    assert_eq!(outputs(source), ["DING 4"]);
}

#[test]
fn comparisons_as_values() {
    let source = "
        ERWACHE
        DING 0 = 5
        DING 1 = 3
        VORSTELLUNG DING 0 > DING 1
        VORSTELLUNG DING 0 < DING 1
        VORSTELLUNG DING 0 >= 5
        VORSTELLUNG DING 1 <= 2
        VORSTELLUNG DING 0 = DING 0
        VORSTELLUNG DING 0 != DING 0
        DING 0 = DING 0 != DING 1
        VORSTELLUNG DING 0
        VERNEINUNG
    ";

    assert_eq!(outputs(source), ["1", "0", "1", "0", "1", "0", "1"]);
}

#[test]
fn carry_leaks_in_compiled_code_too() {
    let source = "
        ERWACHE
        VORSTELLUNG 200 + 100
        VORSTELLUNG 50 + 50
        VERNEINUNG
    ";

    assert_eq!(outputs(source), ["44", "101"]);
}

#[test]
fn seeded_registers_reach_compiled_code() {
    let source = "ERWACHE\nVORSTELLUNG DING 0 + DING 1\nVERNEINUNG";
    let seed = runtime::value::memory_from([30, 38].map(Value::Number));

    let mut console = Scripted::new();
    run_compiled(source, &mut console, Some(seed)).unwrap();

    assert_eq!(console.outputs(), ["68"]);
}

#[test]
fn missing_verneinung_is_noticed_by_the_machine() {
    assert_eq!(outputs("ERWACHE\nVORSTELLUNG 1"), ["1", NO_HALT_NOTICE]);
}

#[test]
fn endless_compiled_loop_overheats_on_total_steps() {
    let (result, _) = compiled("ERWACHE\nSOLANGE 1\nENDE\nVERNEINUNG");

    match result {
        Err(Error::Fault(fault)) => {
            assert_eq!(fault.line(), 0);
            assert!(matches!(fault.val(), Fault::Overheat(MAX_STEPS)));
        }

        other => panic!("expected overheat, got {:?}", other),
    }
}

#[test]
fn division_by_zero_faults_in_the_machine() {
    let (result, console) = compiled("ERWACHE\nVORSTELLUNG 1\nVORSTELLUNG 1 / 0");

    assert!(matches!(
        result,
        Err(Error::Fault(fault)) if matches!(fault.val(), Fault::DivisionByZero)
    ));

    assert_eq!(console.outputs(), ["1"]);
}

#[test]
fn syntax_errors_stop_compilation() {
    match compile_welt("; nichts\nVORSTELLUNG 1", None) {
        Err(Error::Parser(error)) => {
            assert_eq!(error.split(), (2, ParserError::MissingErwache));
        }

        other => panic!("expected a syntax error, got {:?}", other),
    }
}
