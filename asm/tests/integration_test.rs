use super32::RunState;
use super32_asm::{assemble, assemble_and_load, format, OutputMode, ProgramKind};

#[test]
fn constant_load_lands_in_the_right_register() {
    let source = "\
ORG 0
START
LI R5,R0,1234
END
";
    let mut emulator = assemble_and_load(source, ProgramKind::WholeProgram).unwrap();
    emulator.run().unwrap();
    assert_eq!(emulator.state.registers[5], 1234);
}

#[test]
fn add_combines_two_registers() {
    let source = "\
ORG 0
START
LI R1,R0,7
LI R2,R0,35
ADD R3,R1,R2
END
";
    let mut emulator = assemble_and_load(source, ProgramKind::WholeProgram).unwrap();
    emulator.run().unwrap();
    assert_eq!(emulator.state.registers[3], 42);
}

#[test]
fn branch_taken_loop_counts_down_to_zero() {
    let source = "\
ORG 0
START
LI R1,R0,3
LI R2,R0,1
LOOP: BEQ R1,R0,DONE
SUB R1,R1,R2
BEQ R0,R0,LOOP
DONE: LI R3,R0,99
END
";
    let mut emulator = assemble_and_load(source, ProgramKind::WholeProgram).unwrap();
    emulator.run().unwrap();
    assert_eq!(emulator.state.registers[1], 0);
    assert_eq!(emulator.state.registers[3], 99);
    assert_eq!(emulator.run_state, RunState::Halted);
}

#[test]
fn branch_not_taken_falls_through_to_the_next_instruction() {
    let source = "\
ORG 0
START
LI R1,R0,1
LI R2,R0,2
BEQ R1,R2,SKIPPED
LI R3,R0,5
SKIPPED: LI R4,R0,9
END
";
    let mut emulator = assemble_and_load(source, ProgramKind::WholeProgram).unwrap();
    emulator.run().unwrap();
    assert_eq!(emulator.state.registers[3], 5);
    assert_eq!(emulator.state.registers[4], 9);
}

#[test]
fn store_then_load_round_trips_a_value_through_memory() {
    let source = "\
ORG 0
DEFINE 0
DEFINE 0
START
LI R1,R0,777
SW R1,R0,$4
LW R2,R0,$4
END
";
    let mut emulator = assemble_and_load(source, ProgramKind::WholeProgram).unwrap();
    emulator.run().unwrap();
    assert_eq!(emulator.state.registers[2], 777);
}

#[test]
fn program_halts_once_and_stays_halted() {
    let source = "ORG 0\nSTART\nADD R1,R2,R3\nEND\n";
    let mut emulator = assemble_and_load(source, ProgramKind::WholeProgram).unwrap();
    emulator.run().unwrap();
    assert_eq!(emulator.run_state, RunState::Halted);
    let row_before = emulator.state.row;
    emulator.step().unwrap();
    assert_eq!(emulator.state.row, row_before);
}

#[test]
fn assembling_twice_from_the_same_source_produces_identical_images() {
    let source = "\
ORG 0
START
ADD R1,R2,R3
SUB R4,R1,R2
END
";
    let first = assemble(source, ProgramKind::WholeProgram).unwrap();
    let second = assemble(source, ProgramKind::WholeProgram).unwrap();
    assert_eq!(first.image.as_slice(), second.image.as_slice());
}

#[test]
fn lines_and_stream_outputs_carry_the_same_bits() {
    let source = "ORG 0\nSTART\nADD R1,R2,R3\nEND\n";
    let assembly = assemble(source, ProgramKind::WholeProgram).unwrap();
    let lines = format::format_image(&assembly.image, OutputMode::Lines);
    let stream = format::format_image(&assembly.image, OutputMode::Stream);
    assert_eq!(lines.replace('\n', ""), stream);
}

#[test]
fn image_is_bracketed_by_start_and_halt_vectors() {
    let source = "\
ORG 0
DEFINE 0
START
ADD R1,R2,R3
END
";
    let assembly = assemble(source, ProgramKind::WholeProgram).unwrap();
    let last = assembly.image.len() as u32 - 1;
    let (_, _, _, halt_imm) = super32::bitfield::unpack_i(assembly.image.read(last).unwrap());
    assert_eq!(halt_imm, -1);
}
