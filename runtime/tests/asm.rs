use runtime::{
    asm::{self, Opcode, Operand, Reg},
    AsmError,
};

#[test]
fn code_section_is_implicit() {
    let program = asm::parse("; comentario\nbasura sin sentido\ntar r0, 1\nnov").unwrap();

    let opcodes: Vec<_> = program.instructions().iter().map(|i| i.opcode).collect();
    assert_eq!(opcodes, [Opcode::Tar, Opcode::Nov]);
    assert_eq!(program.instructions()[0].line, 3);
}

#[test]
fn labels_point_at_next_instruction() {
    let program = asm::parse(".code\n.start:\ntar r0, 1\n.end:\nnov\n.tail:").unwrap();

    assert_eq!(program.label(".start"), Some(0));
    assert_eq!(program.label(".end"), Some(1));
    assert_eq!(program.label(".tail"), Some(2));
    assert_eq!(program.label(".missing"), None);
}

#[test]
fn operands_split_on_commas_and_spaces() {
    let program = asm::parse("KUR r0,r1 , r2").unwrap();
    let instruction = &program.instructions()[0];

    assert_eq!(instruction.opcode, Opcode::Kur);
    assert_eq!(
        instruction.operands,
        [0, 1, 2].map(|r| Operand::Register(Reg(r)))
    );
    assert_eq!(instruction.to_string(), "kur r0, r1, r2");
}

#[test]
fn comment_marker_inside_data_is_literal() {
    let program = asm::parse(".data\ns0: \"a;b\" ; real comment\n.code\ntar r0, s0").unwrap();
    assert_eq!(program.data("s0"), Some("a;b"));
}

#[test]
fn unknown_opcode_is_rejected_with_line() {
    let error = asm::parse(".code\ntar r0, 1\nfly r0").unwrap_err();

    assert_eq!(error.line(), 3);
    assert_eq!(error.val(), &AsmError::UnknownOpcode("fly".into()));
}

#[test]
fn invalid_operands_are_rejected() {
    let error = asm::parse("tar r0, banana").unwrap_err();
    assert_eq!(error.val(), &AsmError::InvalidOperand("banana".into()));

    let error = asm::parse("tar r9, 1").unwrap_err();
    assert_eq!(error.val(), &AsmError::RegisterOutOfRange("r9".into()));
}

#[test]
fn undefined_data_is_rejected_at_parse_time() {
    let error = asm::parse(".data\ns0: \"x\"\n.code\ntar r0, s1\nnov").unwrap_err();

    assert_eq!(error.line(), 4);
    assert_eq!(error.val(), &AsmError::UndefinedData("s1".into()));
}

#[test]
fn malformed_data_entry_is_rejected() {
    let error = asm::parse(".data\ns0 = \"x\"").unwrap_err();

    assert_eq!(error.line(), 2);
    assert!(matches!(error.val(), AsmError::InvalidDataEntry(_)));
}
