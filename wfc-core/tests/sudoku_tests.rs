// wfc-core/tests/sudoku_tests.rs
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use wfc_core::{
    run_with_retry, ConstraintPropagator, ConstraintRule, DepthFirstPropagator,
    EntropyCalculator, OptionCountEntropy, PossibilityGrid, ProgressInfo, Runner,
    SelectionStrategy, SudokuRule, WfcConfig, WfcError,
};
use wfc_rules::{BlockLayout, Digit, Symbol};

const SOLUTION: [&str; 9] = [
    "534678912",
    "672195348",
    "198342567",
    "859761423",
    "426853791",
    "713924856",
    "961537284",
    "287419635",
    "345286179",
];

fn solution_givens() -> [[u8; 9]; 9] {
    let mut givens = [[0u8; 9]; 9];
    for (y, row) in SOLUTION.iter().enumerate() {
        for (x, ch) in row.bytes().enumerate() {
            givens[y][x] = ch - b'0';
        }
    }
    givens
}

fn values(grid: &PossibilityGrid<Digit>) -> Vec<Vec<u8>> {
    (0..grid.height)
        .map(|y| {
            (0..grid.width)
                .map(|x| grid.get(x, y).and_then(|c| c.value()).map_or(0, Digit::get))
                .collect()
        })
        .collect()
}

fn assert_all_different(group: impl IntoIterator<Item = u8>) {
    let seen: HashSet<u8> = group.into_iter().collect();
    assert_eq!(seen, (1..=9).collect::<HashSet<u8>>());
}

fn solve(seed: u64) -> Result<PossibilityGrid<Digit>, WfcError> {
    let (runner, _) = run_with_retry(2000, Some(seed), |seed| {
        Runner::sudoku(
            BlockLayout::Quotient,
            WfcConfig::builder().maybe_seed(seed).build(),
        )
    })?;
    Ok(runner.into_grid())
}

#[test]
fn test_solved_grid_has_complete_rows_columns_and_boxes() {
    let grid = solve(0).expect("some attempt should complete");
    assert!(grid.is_fully_resolved());
    let v = values(&grid);
    for i in 0..9 {
        assert_all_different(v[i].iter().copied());
        assert_all_different((0..9).map(|r| v[r][i]));
        let (top, left) = ((i / 3) * 3, (i % 3) * 3);
        assert_all_different(
            (top..top + 3).flat_map(|r| (left..left + 3).map(move |c| (r, c))).map(|(r, c)| v[r][c]),
        );
    }
}

#[test]
fn test_resolved_values_stay_in_alphabet() {
    let grid = solve(40).expect("some attempt should complete");
    for cell in grid.iter() {
        let value = cell.value().expect("resolved");
        assert!(Digit::ALL.contains(&value));
        assert_eq!(cell.option_count(), 0);
    }
}

#[test]
fn test_option_sets_only_shrink() {
    let mut previous: Option<Vec<usize>> = None;
    let config = WfcConfig::builder()
        .seed(3)
        .progress_callback(move |info: &ProgressInfo<'_, Digit>| {
            let sizes: Vec<usize> = info
                .grid
                .iter()
                .map(|c| if c.is_resolved() { 1 } else { c.option_count() })
                .collect();
            if let Some(before) = &previous {
                if before.iter().zip(&sizes).any(|(b, s)| s > b) {
                    return Err(WfcError::Callback("option set grew".into()));
                }
            }
            previous = Some(sizes);
            Ok(())
        })
        .build();
    let mut runner = Runner::sudoku(BlockLayout::Quotient, config).unwrap();
    match runner.run() {
        Ok(_) | Err(WfcError::Contradiction(..)) => {}
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_solution_minus_one_cell_resolves_to_the_missing_digit() {
    let mut givens = solution_givens();
    givens[4][4] = 0;
    let mut runner = Runner::sudoku(BlockLayout::Quotient, WfcConfig::builder().seed(9).build()).unwrap();
    runner.seed_givens(&givens).unwrap();
    runner.run().unwrap();
    let cell = runner.grid().get(4, 4).unwrap();
    assert_eq!(cell.value(), Digit::new(5).ok());
    assert_eq!(values(runner.grid()), solution_givens().map(|row| row.to_vec()).to_vec());
}

#[test]
fn test_conflicting_givens_contradict() {
    let mut givens = [[0u8; 9]; 9];
    givens[0][0] = 4;
    givens[0][8] = 4;
    let mut runner = Runner::sudoku(BlockLayout::Quotient, WfcConfig::default()).unwrap();
    assert_eq!(runner.seed_givens(&givens), Err(WfcError::Contradiction(8, 0)));
}

#[test]
fn test_propagation_is_idempotent_once_settled() {
    let mut givens = solution_givens();
    for y in 0..9 {
        for x in (y % 3..9).step_by(3) {
            givens[y][x] = 0;
        }
    }
    let mut runner = Runner::sudoku(BlockLayout::Quotient, WfcConfig::default()).unwrap();
    runner.seed_givens(&givens).unwrap();

    let rule = *runner.rule();
    let mut grid = runner.grid().clone();
    let settled = grid.clone();
    let mut propagator = DepthFirstPropagator::new();
    for (x, y) in settled.coords() {
        let report = propagator.propagate(&mut grid, (x, y), &rule).unwrap();
        assert_eq!(report.removed, 0);
    }
    assert_eq!(grid, settled);
}

#[test]
fn test_residue_layout_strikes_the_paired_box() {
    let rule = SudokuRule::new(BlockLayout::Residue);
    let mut grid = PossibilityGrid::<Digit>::new(9, 9).unwrap();
    let two = Digit::new(2).unwrap();
    grid.get_mut(1, 1).unwrap().commit(two).unwrap();
    DepthFirstPropagator::new()
        .propagate(&mut grid, (1, 1), &rule)
        .unwrap();
    assert!(!grid.get(4, 4).unwrap().has_option(two));
    assert!(grid.get(0, 0).unwrap().has_option(two));
    assert_eq!(rule.neighbors(1, 1, 9, 9).len(), 25);
}

#[test]
fn test_tie_break_is_reproducible_with_the_same_seed() {
    let mut grid = PossibilityGrid::<Digit>::new(9, 9).unwrap();
    let drop: Vec<Digit> = Digit::ALL[..4].to_vec();
    for (x, y) in [(2, 7), (6, 1), (5, 5)] {
        grid.get_mut(x, y).unwrap().remove_options(&drop).unwrap();
    }
    let pick = |seed| {
        let mut rng = StdRng::seed_from_u64(seed);
        OptionCountEntropy
            .select_lowest_entropy_cell(&grid, SelectionStrategy::RandomLowest, &mut rng)
            .unwrap()
    };
    for seed in 0..16 {
        let first = pick(seed);
        assert!([(2, 7), (6, 1), (5, 5)].contains(&first));
        assert_eq!(pick(seed), first);
    }
}

#[test]
fn test_same_seed_same_solve() {
    let run = || {
        let mut runner =
            Runner::sudoku(BlockLayout::Quotient, WfcConfig::builder().seed(77).build()).unwrap();
        let result = runner.run().map(|s| s.iterations);
        (result, values(runner.grid()))
    };
    assert_eq!(run(), run());
}

#[test]
fn test_solved_grid_passes_verification() {
    let (runner, _) = run_with_retry(2000, Some(77), |seed| {
        Runner::sudoku(
            BlockLayout::Quotient,
            WfcConfig::builder().maybe_seed(seed).build(),
        )
    })
    .unwrap();
    assert_eq!(runner.verify(), Ok(()));
}
