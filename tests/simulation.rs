use std::fs;

use toruslife::config::Params;
use toruslife::evolve::{EvolutionEngine, step};
use toruslife::neighbors::block_live_count;
use toruslife::pattern::{TextPattern, parse_pattern};
use toruslife::render::NullRenderer;
use toruslife::simulation::{EndState, Simulation};
use toruslife::snapshot::SnapshotWriter;
use toruslife::{ALIVE, Cell, Grid};

fn with_cells(w: usize, h: usize, cells: &[(i64, i64)]) -> Grid<Cell> {
    let mut g = Grid::new(w, h);
    for &(x, y) in cells {
        g.set(x, y, ALIVE);
    }
    g
}

const GLIDER: [(i64, i64); 5] = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];

fn glider_at(dx: i64, dy: i64) -> Grid<Cell> {
    let shifted: Vec<_> = GLIDER.iter().map(|&(x, y)| (x + dx, y + dy)).collect();
    with_cells(20, 20, &shifted)
}

#[test]
fn wrap_around_neighbor_is_counted() {
    let g = with_cells(10, 7, &[(0, 0)]);
    assert_eq!(block_live_count(&g, 9, 6), 1);
}

#[test]
fn glider_translates_one_cell_diagonally_every_four_steps() {
    let engine = EvolutionEngine::new(None).unwrap();
    let mut cur = glider_at(5, 5);
    let mut next = Grid::new(20, 20);

    for t in 0..4 {
        assert!(engine.step(&cur, &mut next, t), "step {t} reported no change");
        std::mem::swap(&mut cur, &mut next);
    }
    assert_eq!(cur, glider_at(6, 6));
}

#[test]
fn glider_crosses_the_seam() {
    // 20 full periods move the glider once around the 20x20 torus.
    let mut cur = glider_at(17, 17);
    let mut next = Grid::new(20, 20);
    for t in 0..80 {
        assert!(step(&cur, &mut next, t));
        std::mem::swap(&mut cur, &mut next);
    }
    assert_eq!(cur, glider_at(17, 17));
}

#[test]
fn blinker_flips_and_returns() {
    let vertical = with_cells(5, 5, &[(2, 2), (2, 3), (2, 4)]);
    let horizontal = with_cells(5, 5, &[(1, 3), (2, 3), (3, 3)]);

    let mut a = Grid::new(5, 5);
    let mut b = Grid::new(5, 5);
    assert!(step(&vertical, &mut a, 0));
    assert_eq!(a, horizontal);
    assert!(step(&a, &mut b, 1));
    assert_eq!(b, vertical);
}

#[test]
fn parallel_and_single_threaded_agree() {
    let soup = parse_pattern(
        "0110100101\n1011001110\n0100111010\n1110010001\n0011101100\n\
         1001011011\n0110110100\n1100100111\n0011011010\n1010010101\n",
        10,
        10,
    );
    let single = EvolutionEngine::new(Some(1)).unwrap();
    let many = EvolutionEngine::new(Some(4)).unwrap();

    let (mut a, mut b) = (soup.clone(), soup);
    let (mut a_next, mut b_next) = (Grid::new(10, 10), Grid::new(10, 10));
    for t in 0..12 {
        let ca = single.step(&a, &mut a_next, t);
        let cb = many.step(&b, &mut b_next, t);
        assert_eq!(ca, cb);
        assert_eq!(a_next, b_next);
        std::mem::swap(&mut a, &mut a_next);
        std::mem::swap(&mut b, &mut b_next);
    }
}

#[test]
fn snapshot_of_diagonal_grid() {
    let dir = std::env::temp_dir().join(format!("toruslife-it-snap-{}", std::process::id()));
    let writer = SnapshotWriter::new(&dir, "output", "");
    let path = writer.write(&with_cells(2, 2, &[(0, 0), (1, 1)]), 0).unwrap();
    assert_eq!(path, dir.join("output_0.vtk"));

    let bytes = fs::read(&path).unwrap();
    let marker = b"LOOKUP_TABLE default\n";
    let header_end = bytes
        .windows(marker.len())
        .position(|w| w == marker)
        .unwrap()
        + marker.len();
    let header = std::str::from_utf8(&bytes[..header_end]).unwrap();
    assert!(header.contains("DIMENSIONS 2 2 1\n"));
    assert!(header.contains("POINT_DATA 4\n"));

    let payload = &bytes[header_end..];
    assert_eq!(payload.len(), 16);
    let values: Vec<f32> = payload
        .chunks_exact(4)
        .map(|b| f32::from_be_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    assert_eq!(values, vec![1.0, 0.0, 0.0, 1.0]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn glider_run_writes_frames_until_exhausted() {
    let dir = std::env::temp_dir().join(format!("toruslife-it-run-{}", std::process::id()));
    let mut params = Params::headless(20, 20, 4);
    params.snapshots = true;
    params.out_dir = dir.clone();
    params.prefix = "glider".into();

    let pattern = TextPattern {
        text: "010\n001\n111\n".into(),
    };
    let mut sim = Simulation::new(&params, &pattern).unwrap();
    let summary = sim.run(&mut NullRenderer).unwrap();

    assert_eq!(summary.end, EndState::Exhausted);
    assert_eq!(summary.steps, 4);
    assert_eq!(sim.current(), &glider_at(1, 1));
    for t in 0..4 {
        assert!(dir.join(format!("glider_{t}.vtk")).exists());
    }
    assert!(!dir.join("glider_4.vtk").exists());

    fs::remove_dir_all(&dir).unwrap();
}
