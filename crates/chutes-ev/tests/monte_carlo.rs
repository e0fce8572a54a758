use chutes_ev::{
    build, cross_check, expected_values, Board, OverrunRule, RowKind, ValidationConfig,
};

const TOLERANCE: f64 = 0.5;

#[test]
fn standard_board_matches_simulation() {
    let config = ValidationConfig {
        trials: 100_000,
        seed: 1337,
        tolerance: TOLERANCE,
    };
    let check = cross_check(&Board::standard(), &config).expect("standard board solves");
    assert!(
        check.within_tolerance,
        "analytic {:.4} vs simulated {:.4}",
        check.analytic,
        check.estimate.mean
    );
}

#[test]
fn respin_rule_matches_simulation() {
    let board = Board::standard().with_overrun(OverrunRule::Respin);
    let config = ValidationConfig {
        trials: 50_000,
        seed: 7,
        tolerance: TOLERANCE,
    };
    let check = cross_check(&board, &config).expect("respin board solves");
    assert!(check.within_tolerance, "{check:?}");

    // Free respins can only make the game shorter
    let forfeit = expected_values(&Board::standard()).expect("standard board solves");
    assert!(check.analytic < forfeit.get(0).expect("start square"));
}

#[test]
fn custom_board_from_json() {
    let json = r#"{
        "start": 0,
        "finish": 25,
        "spinPositions": 4,
        "chutes": { "23": 3, "14": 5 },
        "ladders": { "2": 11, "19": 25 }
    }"#;
    let board: Board = serde_json::from_str(json).expect("board parses");

    let system = build(&board).expect("board is valid");
    assert_eq!(system.dim(), 25);
    assert!(system.triplets().all(|(_, col, _)| col < 25));
    assert!(matches!(system.rows()[19].kind, RowKind::Shortcut(_)));

    let ev = expected_values(&board).expect("board solves");
    assert!(ev.get(19).unwrap().abs() < 1e-9);
    assert!((ev.get(23).unwrap() - ev.get(3).unwrap()).abs() < 1e-9);

    let config = ValidationConfig {
        trials: 40_000,
        seed: 99,
        tolerance: TOLERANCE,
    };
    let check = cross_check(&board, &config).expect("cross-check runs");
    assert!(check.within_tolerance, "{check:?}");
}
