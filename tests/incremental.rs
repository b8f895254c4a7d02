use relay_sat::config::Config;
use relay_sat::solver::{SolveStatus, Solver};

mod incremental {
    use super::*;

    #[test]
    fn added_clauses_only_shrink_the_models() {
        let mut solver = Solver::new(&[vec![1, 2]], Config::default());
        assert_eq!(solver.solve(), SolveStatus::Satisfiable);

        solver.add_clause(&[-1]);
        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        let assignment = solver.assignment();
        assert_eq!(assignment.value_of(1), Some(false));
        assert_eq!(assignment.value_of(2), Some(true));

        solver.add_clause(&[-2]);
        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
    }

    #[test]
    fn temporary_clauses_bind_one_solve() {
        let mut solver = Solver::new(&[vec![1, 2]], Config::default());

        solver.add_temporary_clause(&[-1]);
        solver.add_temporary_clause(&[-2]);
        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);

        // The next solve behaves as if the temporary clauses were never added.
        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
    }

    #[test]
    fn temporary_clause_shapes_the_assignment_it_binds() {
        let mut solver = Solver::new(&[vec![1, 2]], Config::default());

        solver.add_temporary_clause(&[-1]);
        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        assert_eq!(solver.assignment().value_of(1), Some(false));
    }

    #[test]
    fn fresh_variables_are_unconstrained() {
        let mut solver = Solver::new(&[vec![1]], Config::default());

        let fresh = solver.new_variable();
        assert_eq!(fresh, 2);

        solver.add_clause(&[-(fresh as i32), -1]);
        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        assert_eq!(solver.assignment().value_of(fresh), Some(false));
    }

    #[test]
    fn forced_polarities_steer_decisions() {
        let mut config = Config::default();
        config.random_polarity_freq = 0.0;
        let mut solver = Solver::new(&[vec![1, 2]], config);

        solver.set_decision_polarity(1, false);
        solver.set_decision_polarity(2, true);

        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        let assignment = solver.assignment();
        assert_eq!(assignment.value_of(1), Some(false));
        assert_eq!(assignment.value_of(2), Some(true));
    }

    #[test]
    fn clauses_may_introduce_variables() {
        let mut solver = Solver::new(&[vec![1]], Config::default());
        assert_eq!(solver.variable_count(), 1);

        solver.add_clause(&[-1, 7]);
        assert_eq!(solver.variable_count(), 7);

        assert_eq!(solver.solve(), SolveStatus::Satisfiable);
        assert_eq!(solver.assignment().value_of(7), Some(true));
    }
}

mod coloring {
    use super::*;

    const COLORS: i32 = 3;

    /// The variable asserting vertex `v` takes color `c`, with both counted from zero.
    fn color_var(v: i32, c: i32) -> i32 {
        v * COLORS + c + 1
    }

    /// A 3-colorability formula over `vertex_count` vertices and the given edges.
    fn coloring_formula(vertex_count: i32, edges: &[(i32, i32)]) -> Vec<Vec<i32>> {
        let mut formula = Vec::new();

        for v in 0..vertex_count {
            formula.push((0..COLORS).map(|c| color_var(v, c)).collect());
            for c in 0..COLORS {
                for d in (c + 1)..COLORS {
                    formula.push(vec![-color_var(v, c), -color_var(v, d)]);
                }
            }
        }

        for (u, v) in edges {
            for c in 0..COLORS {
                formula.push(vec![-color_var(*u, c), -color_var(*v, c)]);
            }
        }

        formula
    }

    #[test]
    fn triangle_is_three_colorable_until_k4() {
        let triangle = [(0, 1), (1, 2), (0, 2)];
        let formula = coloring_formula(5, &triangle);
        let mut solver = Solver::new(&formula, Config::default());

        assert_eq!(solver.solve(), SolveStatus::Satisfiable);

        // The triangle's vertices hold three distinct colors.
        let assignment = solver.assignment();
        for (u, v) in &triangle {
            for c in 0..COLORS {
                assert!(
                    !(assignment.satisfies(color_var(*u, c).into())
                        && assignment.satisfies(color_var(*v, c).into()))
                );
            }
        }

        // Completing K4 over the first four vertices breaks colorability.
        for (u, v) in [(0, 3), (1, 3), (2, 3)] {
            for c in 0..COLORS {
                solver.add_clause(&[-color_var(u, c), -color_var(v, c)]);
            }
        }
        assert_eq!(solver.solve(), SolveStatus::Unsatisfiable);
    }
}
