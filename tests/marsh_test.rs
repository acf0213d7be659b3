//! End-to-end tests: parameter file → marsh → forcing → layer logs.

use std::collections::BTreeMap;
use std::io::Write;

use marsh_rs::io::{CSV_HEADER, parse_forcing, read_parameter_file};
use marsh_rs::{CellInput, CellLog, Marsh, MarshError, MarshLog, Parameters, Simulation};
use tempfile::NamedTempFile;

fn parameter_file() -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    write!(
        file,
        r#"
ids = [1, "...", 3]
surface_area = [1.0, "..."]
top_elevation = [0.0, 1.0, 2.0]
bottom_elevation = -30.0
initial_surface_biomass = [0.0105, 0.012, 0.0]
labile_fraction = 0.8
"#
    )
    .unwrap();
    file
}

#[test]
fn test_marsh_from_parameter_file() {
    let file = parameter_file();
    let params = read_parameter_file(file.path()).unwrap();
    let marsh = Marsh::new(&params).unwrap();

    assert_eq!(marsh.ids().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(marsh.cell(2).unwrap().elevation(), 1.0);
    assert_eq!(marsh.cell(2).unwrap().depth(), 31.0);
    assert_eq!(marsh.cell(3).unwrap().biomass_weight(), 0.0);
}

#[test]
fn test_marsh_steps_and_logs() {
    let file = parameter_file();
    let params = read_parameter_file(file.path()).unwrap();
    let mut marsh = Marsh::new(&params).unwrap();
    let mut logs = MarshLog::for_marsh(&marsh);
    logs.record(&marsh).unwrap();

    let inputs = BTreeMap::from([
        (1, CellInput::new(0.5, 0.011)),
        (2, CellInput::new(-0.2, 0.012)),
    ]);
    for _ in 0..3 {
        marsh.advance(&inputs, 1.0, 2).unwrap();
        logs.record(&marsh).unwrap();
    }

    assert!((marsh.cell(1).unwrap().elevation() - 1.5).abs() < 1e-9);
    assert!((marsh.cell(2).unwrap().elevation() - 0.4).abs() < 1e-9);
    // cell 3 had no input but still aged
    assert_eq!(marsh.cell(3).unwrap().elevation(), 2.0);
    assert_eq!(marsh.cell(3).unwrap().elapsed(), 3.0);
    assert!(marsh.cells().all(|c| c.layer_count() == 7));

    let log = logs.get(1).unwrap();
    assert_eq!(log.steps(), 4);
    assert_eq!(log.len(), 1 + 3 + 5 + 7);

    let dir = tempfile::tempdir().unwrap();
    let paths = logs.write_csv_dir(dir.path()).unwrap();
    let text = std::fs::read_to_string(&paths[0]).unwrap();
    assert_eq!(text.lines().next(), Some(CSV_HEADER));
    assert_eq!(text.lines().count(), 1 + log.len());
}

#[test]
fn test_marsh_rejects_unknown_cell() {
    let mut marsh = Marsh::new(&[Parameters::with_id(1)]).unwrap();
    let inputs = BTreeMap::from([(2, CellInput::new(0.1, 0.01))]);
    assert_eq!(
        marsh.advance(&inputs, 1.0, 1),
        Err(MarshError::UnknownCell(2))
    );
}

#[test]
fn test_forcing_run_with_log() {
    let forcing = parse_forcing(
        "# cell: 1\n\
         0.0 0.0 0.0105\n\
         1.0 0.3 0.0110\n\
         2.0 0.3 0.0115\n\
         3.0 -0.2 0.0110\n\
         4.0 0.4 0.0120\n",
    )
    .unwrap();
    let mut cell = marsh_rs::Cell::new(&Parameters::with_id(1)).unwrap();
    let mut log = CellLog::new(cell.id());

    let result = Simulation::new(forcing)
        .with_sub_steps(3)
        .run_with_callback(&mut cell, |cell, _| log.record(cell));

    assert!(result.success);
    assert_eq!(result.n_steps, 4);
    assert!((result.final_elevation - 0.8).abs() < 1e-9);
    assert_eq!(result.layer_count, 1 + 4 * 3);
    assert_eq!(log.steps(), 5);

    let file = NamedTempFile::new().unwrap();
    log.write_csv(file.path()).unwrap();
    let text = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(text.lines().count(), 1 + log.len());
}
