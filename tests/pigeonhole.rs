use relay_sat::config::Config;
use relay_sat::solver::{SolveStatus, Solver};

/// The variable asserting pigeon `p` sits in hole `h`, with `holes` holes in play.
fn pigeon_var(p: i32, h: i32, holes: i32) -> i32 {
    (p - 1) * holes + h
}

/// The standard encoding: every pigeon in some hole, no two pigeons in one hole.
fn pigeonhole_formula(pigeons: i32, holes: i32) -> Vec<Vec<i32>> {
    let mut formula = Vec::new();

    for p in 1..=pigeons {
        formula.push((1..=holes).map(|h| pigeon_var(p, h, holes)).collect());
    }

    for h in 1..=holes {
        for p in 1..=pigeons {
            for q in (p + 1)..=pigeons {
                formula.push(vec![-pigeon_var(p, h, holes), -pigeon_var(q, h, holes)]);
            }
        }
    }

    formula
}

#[test]
fn one_hole() {
    let mut solver = Solver::new(&pigeonhole_formula(2, 1), Config::default());
    assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
}

#[test]
fn more_pigeons_than_holes_is_unsatisfiable() {
    for holes in 2..=4 {
        let mut solver = Solver::new(&pigeonhole_formula(holes + 1, holes), Config::default());
        assert_eq!(
            solver.solve(),
            SolveStatus::Unsatisfiable,
            "{} pigeons into {holes} holes",
            holes + 1
        );
    }
}

#[test]
fn matching_pigeons_to_holes_is_satisfiable() {
    let formula = pigeonhole_formula(4, 4);
    let mut solver = Solver::new(&formula, Config::default());

    assert_eq!(solver.solve(), SolveStatus::Satisfiable);

    let assignment = solver.assignment();
    for clause in &formula {
        assert!(clause.iter().any(|l| assignment.satisfies((*l).into())));
    }
}
