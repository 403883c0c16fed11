// Integration tests for the HP-GL lexer and interpreter

use hpstep::interpreter::{InterpretError, Machine, PlotterState};
use hpstep::parser::{tokenize, Lexer};

const SAMPLE_PLOT: &str = "IN;SP1;\n\
PU0,0;\n\
PA 100,100;PD;\n\
PR 50,0;PR 0,50;PR -50,0;PR 0,-50;\n\
DT@;LBBox corner@\n\
PU;PA;SP0;\n";

#[test]
fn test_sample_plot_lexes_in_order() {
    let instructions = tokenize(SAMPLE_PLOT);
    let commands: Vec<&str> = instructions.iter().map(|i| i.command.as_str()).collect();
    assert_eq!(
        commands,
        vec!["IN", "SP", "PU", "PA", "PD", "PR", "PR", "PR", "PR", "DT", "LB", "PU", "PA", "SP"]
    );
    assert_eq!(instructions[10].argument, "Box corner");
    assert_eq!(instructions[10].source, b"LBBox corner@");
}

#[test]
fn test_sample_plot_traces_a_square() {
    let mut machine = Machine::new();
    let mut corners = Vec::new();

    for instruction in tokenize(SAMPLE_PLOT) {
        machine.run_instruction(&instruction).unwrap();
        if instruction.command == "PR" {
            corners.push((machine.plotter.x, machine.plotter.y));
        }
    }

    assert_eq!(corners, vec![(150, 100), (150, 150), (100, 150), (100, 100)]);
    assert_eq!(machine.plotter, PlotterState { x: 0, y: 0, pen_down: false });
    assert_eq!(machine.lexer.terminator, b'@');
}

#[test]
fn test_concatenated_sources_reproduce_the_stream() {
    let source = "IN; PA 1,2;\nLB a b\u{3};PU; ";
    let instructions = tokenize(source);
    let wire: Vec<u8> = instructions.iter().flat_map(|i| i.source.clone()).collect();
    assert_eq!(wire, source.replace('\n', "").into_bytes());
}

#[test]
fn test_non_utf8_label_bytes_are_sent_verbatim() {
    let source = b"LB\xb0C\x03PU;";
    let instructions = Lexer::from_bytes(source).tokenize();
    assert_eq!(instructions.len(), 2);
    assert_eq!(instructions[0].source, b"LB\xb0C\x03");
    assert_eq!(instructions[1].command, "PU");
}

#[test]
fn test_malformed_coordinates_are_reported() {
    let mut state = PlotterState::new();
    let instructions = tokenize("PA10;PA10,20;");

    let err = state.apply(&instructions[0]).unwrap_err();
    assert!(matches!(err, InterpretError::InvalidNumericArgument { .. }));
    assert_eq!(err.to_string(), "invalid numeric argument for PA: \"10\"");

    state.apply(&instructions[1]).unwrap();
    assert_eq!((state.x, state.y), (10, 20));
}
