use std::time::{Duration, Instant};

use relay_sat::portfolio::{Portfolio, TerminationReason};

fn coloring_formula(vertex_count: i32, edges: &[(i32, i32)]) -> Vec<Vec<i32>> {
    let mut formula = Vec::new();
    for v in 0..vertex_count {
        formula.push((0..3).map(|c| v * 3 + c + 1).collect());
        for c in 0..3 {
            for d in (c + 1)..3 {
                formula.push(vec![-(v * 3 + c + 1), -(v * 3 + d + 1)]);
            }
        }
    }
    for (u, v) in edges {
        for c in 0..3 {
            formula.push(vec![-(u * 3 + c + 1), -(v * 3 + c + 1)]);
        }
    }
    formula
}

fn pigeonhole_formula(pigeons: i32, holes: i32) -> Vec<Vec<i32>> {
    let mut formula = Vec::new();
    for p in 1..=pigeons {
        formula.push((1..=holes).map(|h| (p - 1) * holes + h).collect());
    }
    for h in 1..=holes {
        for p in 1..=pigeons {
            for q in (p + 1)..=pigeons {
                formula.push(vec![-((p - 1) * holes + h), -((q - 1) * holes + h)]);
            }
        }
    }
    formula
}

#[test]
fn a_satisfiable_race_publishes_a_valid_assignment() {
    let formula = coloring_formula(6, &[(0, 1), (1, 2), (0, 2), (3, 4)]);
    let mut portfolio = Portfolio::new(formula.clone(), Duration::from_secs(30), 4);

    assert!(portfolio.solve());

    let solution = portfolio.solution().expect("the winner published");
    for clause in &formula {
        assert!(clause.iter().any(|l| solution.satisfies((*l).into())));
    }
    assert!(portfolio.winner().is_some());
}

#[test]
fn an_unsatisfiable_race_reports_false() {
    let mut portfolio = Portfolio::new(pigeonhole_formula(4, 3), Duration::from_secs(30), 4);

    assert!(!portfolio.solve());
    assert!(portfolio.solution().is_none());
    assert!(portfolio.winner().is_none());
}

#[test]
fn the_race_respects_its_deadline() {
    // Hard enough that workers will still be searching when the deadline lands.
    let formula = pigeonhole_formula(10, 9);
    let timeout = Duration::from_millis(200);
    let mut portfolio = Portfolio::new(formula, timeout, 4);

    let start = Instant::now();
    let result = portfolio.solve();
    let elapsed = start.elapsed();

    assert!(!result);
    // Cancellation is cooperative; allow generous slack over the deadline.
    assert!(elapsed < timeout + Duration::from_secs(5));
}

#[test]
fn termination_reasons_account_for_every_worker() {
    let formula = coloring_formula(6, &[(0, 1), (1, 2), (0, 2)]);
    let mut portfolio = Portfolio::new(formula, Duration::from_secs(30), 4);

    let satisfiable = portfolio.solve();
    assert!(satisfiable);

    let reports = portfolio.statistics();
    assert!(!reports.is_empty());

    let winners = reports
        .iter()
        .filter(|report| report.reason == TerminationReason::Solution)
        .count();
    assert_eq!(winners, 1);

    for report in reports {
        assert!(matches!(
            report.reason,
            TerminationReason::Solution
                | TerminationReason::Unsat
                | TerminationReason::Timeout
                | TerminationReason::Resource
                | TerminationReason::ExternalStop
        ));
    }

    let winner = portfolio.winner().expect("a winning worker");
    assert!(reports.iter().any(|report| report.worker == winner));
}

#[test]
fn a_tight_memory_budget_caps_the_workers() {
    let formula = pigeonhole_formula(4, 3);
    let mut portfolio = Portfolio::new(formula, Duration::from_secs(30), 4);
    portfolio.set_memory_budget(1);

    assert!(!portfolio.solve());
    assert_eq!(portfolio.statistics().len(), 1);
}

#[test]
fn worker_statistics_are_recorded() {
    let mut portfolio = Portfolio::new(pigeonhole_formula(4, 3), Duration::from_secs(30), 2);

    portfolio.solve();

    for report in portfolio.statistics() {
        assert!(report.stats.conflicts > 0 || report.reason != TerminationReason::Unsat);
        assert!(report.estimated_memory > 0);
    }
}
