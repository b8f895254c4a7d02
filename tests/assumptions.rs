use relay_sat::config::Config;
use relay_sat::solver::{SolveStatus, Solver};

fn core_ints(solver: &Solver) -> Vec<i32> {
    solver.unsat_core().iter().map(|l| l.as_int()).collect()
}

mod assumptions {
    use super::*;

    #[test]
    fn assumptions_bind_the_solve() {
        let mut solver = Solver::new(&[vec![1, 2]], Config::default());

        solver.set_assumptions(&[-1]);
        assert_eq!(solver.solve(), SolveStatus::Satisfiable);

        let assignment = solver.assignment();
        assert_eq!(assignment.value_of(1), Some(false));
        assert_eq!(assignment.value_of(2), Some(true));
    }

    #[test]
    fn contradictory_pair_is_the_core() {
        let mut solver = Solver::new(&[vec![1, 2]], Config::default());

        solver.set_assumptions(&[1, 2, -1]);
        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);

        let core = core_ints(&solver);
        assert!(core.contains(&1));
        assert!(core.contains(&-1));
        assert_eq!(core.len(), 2);
    }

    #[test]
    fn failed_assumptions_form_the_core() {
        let mut solver = Solver::new(&[vec![1, 2], vec![-1, 3]], Config::default());

        solver.set_assumptions(&[1, -3]);
        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);

        let core = core_ints(&solver);
        assert!(core.contains(&1));
        assert!(core.contains(&-3));
    }

    #[test]
    fn core_is_a_subset_of_the_assumptions() {
        let formula = vec![vec![1, 2], vec![-1, 3], vec![-2, -3]];
        let mut solver = Solver::new(&formula, Config::default());

        solver.set_assumptions(&[1, 2, 3]);
        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);

        let core = core_ints(&solver);
        assert!(!core.is_empty());
        assert!(core.iter().all(|l| [1, 2, 3].contains(l)));

        // The core still implies unsatisfiability when asserted as units.
        let mut checker = Solver::new(&formula, Config::default());
        for literal in &core {
            checker.add_clause(&[*literal]);
        }
        assert_eq!(checker.solve(), SolveStatus::Unsatisfiable);
    }

    #[test]
    fn core_through_a_propagation_chain() {
        let formula = vec![vec![-1, 2], vec![-3, 4], vec![-4, 5], vec![-2, -5]];
        let mut solver = Solver::new(&formula, Config::default());

        solver.set_assumptions(&[1, 3, 6]);
        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);

        let core = core_ints(&solver);
        assert!(core.contains(&1));
        assert!(core.contains(&3));
        assert!(!core.contains(&6));
    }

    #[test]
    fn clearing_assumptions_restores_satisfiability() {
        let mut solver = Solver::new(&[vec![1, 2], vec![-1, 3]], Config::default());

        solver.set_assumptions(&[1, -3]);
        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);

        solver.clear_assumptions();
        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
    }

    #[test]
    fn set_then_clear_behaves_as_empty() {
        let formula = vec![vec![1, 2], vec![-2, 3]];

        let mut cleared = Solver::new(&formula, Config::default());
        cleared.set_assumptions(&[-1, -3]);
        cleared.clear_assumptions();

        let mut fresh = Solver::new(&formula, Config::default());

        assert_eq!(cleared.solve(), fresh.solve());
        assert!(cleared.unsat_core().is_empty());
    }

    #[test]
    fn solve_with_assumptions_replaces_prior_assumptions() {
        let mut solver = Solver::new(&[vec![1, 2]], Config::default());

        solver.set_assumptions(&[-1, -2]);
        assert_eq!(solver.solve_with_assumptions(&[1]), SolveStatus::Satisfiable);
    }

    #[test]
    fn assumptions_on_unconstrained_variables() {
        let mut solver = Solver::new(&[vec![1, 2]], Config::default());
        let fresh = solver.new_variable();

        solver.set_assumptions(&[fresh as i32]);
        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        assert_eq!(solver.assignment().value_of(fresh), Some(true));
    }
}
