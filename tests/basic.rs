use relay_sat::config::Config;
use relay_sat::solver::{SolveStatus, Solver};
use relay_sat::structures::valuation::Assignment;

fn satisfies_formula(assignment: &Assignment, formula: &[Vec<i32>]) -> bool {
    formula
        .iter()
        .all(|clause| clause.iter().any(|l| assignment.satisfies((*l).into())))
}

mod basic {
    use super::*;

    #[test]
    fn empty_formula_is_satisfiable() {
        let mut solver = Solver::new(&[], Config::default());
        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
    }

    #[test]
    fn empty_clause_is_unsatisfiable_with_empty_core() {
        let mut solver = Solver::new(&[vec![]], Config::default());
        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
        assert!(solver.unsat_core().is_empty());
    }

    #[test]
    fn one_literal() {
        let mut solver = Solver::new(&[vec![1]], Config::default());
        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        assert_eq!(solver.assignment().value_of(1), Some(true));
    }

    #[test]
    fn contradictory_units_conflict_at_level_zero() {
        let mut solver = Solver::new(&[vec![1], vec![-1]], Config::default());
        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
        assert!(solver.unsat_core().is_empty());
        assert_eq!(solver.statistics().decisions, 0);
    }

    #[test]
    fn unit_propagation_chain() {
        let formula = vec![vec![1], vec![-1, 2], vec![-2, 3]];
        let mut solver = Solver::new(&formula, Config::default());

        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        let assignment = solver.assignment();
        assert_eq!(assignment.value_of(1), Some(true));
        assert_eq!(assignment.value_of(2), Some(true));
        assert_eq!(assignment.value_of(3), Some(true));
    }

    #[test]
    fn three_clause_scenario() {
        let formula = vec![vec![1, 2], vec![-1, 3], vec![-2, -3]];
        let mut solver = Solver::new(&formula, Config::default());

        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        assert!(satisfies_formula(&solver.assignment(), &formula));
    }

    #[test]
    fn satisfied_clause_is_not_conflicting() {
        // Propagating 1 satisfies the last clause while falsifying its leading literal.
        let formula = vec![vec![1], vec![-1, 2], vec![-2, 1]];
        let mut solver = Solver::new(&formula, Config::default());

        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        assert_eq!(solver.statistics().conflicts, 0);
    }

    #[test]
    fn all_polarity_combinations_conflict() {
        let formula = vec![vec![1, 2], vec![-1, -2], vec![1, -2], vec![-1, 2]];
        let mut solver = Solver::new(&formula, Config::default());

        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
    }

    #[test]
    fn repeat_solves_agree() {
        let formula = vec![vec![1, 2], vec![-1, 3], vec![-2, -3]];
        let mut solver = Solver::new(&formula, Config::default());

        let first = solver.solve();
        let second = solver.solve();
        assert_eq!(first, second);

        let mut unsat = Solver::new(&[vec![1], vec![-1]], Config::default());
        assert_eq!(unsat.solve(), unsat.solve());
    }

    #[test]
    fn assignment_soundness_on_larger_satisfiable_formula() {
        // A chain of implications with some side constraints.
        let formula = vec![
            vec![1, 2, 3],
            vec![-1, 4],
            vec![-4, 5],
            vec![-5, -2],
            vec![2, 6],
            vec![-6, -3, 7],
            vec![-7, 8],
            vec![3, -8, 1],
        ];
        let mut solver = Solver::new(&formula, Config::default());

        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        assert!(satisfies_formula(&solver.assignment(), &formula));
    }
}
