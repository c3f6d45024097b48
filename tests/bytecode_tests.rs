// Tests for the packed instruction encoding: operand widths, big-endian
// layout, the disassembly format, and disassemble/re-assemble round trips.

use brio::bytecode::{assemble, fmt_instructions, make, read_operands, Opcode};

fn concat(parts: Vec<Vec<u8>>) -> Vec<u8> {
    parts.into_iter().flatten().collect()
}

#[test]
fn make_encodes_big_endian_operands() {
    let cases: Vec<(Opcode, Vec<usize>, Vec<u8>)> = vec![
        (Opcode::Constant, vec![65534], vec![Opcode::Constant as u8, 255, 254]),
        (Opcode::Add, vec![], vec![Opcode::Add as u8]),
        (Opcode::GetLocal, vec![255], vec![Opcode::GetLocal as u8, 255]),
        (
            Opcode::Closure,
            vec![65534, 255],
            vec![Opcode::Closure as u8, 255, 254, 255],
        ),
    ];
    for (op, operands, expected) in cases {
        assert_eq!(make(op, &operands), expected, "encoding {}", op.mnemonic());
    }
}

#[test]
fn read_operands_inverts_make() {
    let cases: Vec<(Opcode, Vec<usize>, usize)> = vec![
        (Opcode::Constant, vec![65535], 2),
        (Opcode::GetLocal, vec![255], 1),
        (Opcode::Closure, vec![65535, 255], 3),
        (Opcode::Jump, vec![12], 2),
        (Opcode::Call, vec![3], 1),
    ];
    for (op, operands, bytes) in cases {
        let instruction = make(op, &operands);
        let (decoded, read) = read_operands(op, &instruction[1..]);
        assert_eq!(read, bytes, "operand bytes for {}", op.mnemonic());
        assert_eq!(decoded, operands, "operands for {}", op.mnemonic());
    }
}

#[test]
fn instructions_format_one_per_line_with_offsets() {
    let instructions = concat(vec![
        make(Opcode::Add, &[]),
        make(Opcode::GetLocal, &[1]),
        make(Opcode::Constant, &[2]),
        make(Opcode::Constant, &[65535]),
        make(Opcode::Closure, &[65535, 255]),
    ]);
    let expected = "\
0000 ADD
0001 GET_LOCAL 1
0003 CONSTANT 2
0006 CONSTANT 65535
0009 CLOSURE 65535 255
";
    assert_eq!(fmt_instructions(&instructions), expected);
}

#[test]
fn disassembly_reassembles_byte_identically() {
    let instructions = concat(vec![
        make(Opcode::True, &[]),
        make(Opcode::JumpNotTruthy, &[10]),
        make(Opcode::Constant, &[0]),
        make(Opcode::Jump, &[11]),
        make(Opcode::Null, &[]),
        make(Opcode::Pop, &[]),
        make(Opcode::Closure, &[2, 1]),
        make(Opcode::GetFree, &[0]),
        make(Opcode::Call, &[1]),
        make(Opcode::ReturnValue, &[]),
        make(Opcode::Hash, &[4]),
        make(Opcode::GetBuiltin, &[5]),
        make(Opcode::CurrentClosure, &[]),
    ]);
    let text = fmt_instructions(&instructions);
    let reassembled = assemble(&text).expect("reassembly failed");
    assert_eq!(reassembled, instructions);
}

#[test]
fn every_opcode_round_trips_through_its_byte() {
    for byte in 1..=30u8 {
        let op = Opcode::from_u8(byte).expect("contiguous opcode range");
        assert_eq!(op as u8, byte);
        assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
    }
    assert_eq!(Opcode::from_u8(0), None);
    assert_eq!(Opcode::from_u8(31), None);
}
