/*!
The stored form of a clause, together with its metadata.

A clause is stored as an ordered sequence of literals with:
- A `learned` flag, true for clauses derived by conflict analysis.
- A `core` flag, true for original constraints. A clause with neither flag is a temporary
  constraint, valid only until the next solve boundary.
- An activity, bumped when the clause takes part in a conflict and consulted during reduction.
- The literal block distance (lbd) recorded when the clause was learned.
- The watched pair. A clause with two or more literals watches two distinct literals, a unit
  clause watches its only literal with [Literal::NONE] in the vacant slot, and an empty clause
  watches nothing.
*/

use crate::config::Activity;
use crate::structures::literal::Literal;

/// A clause in its stored form.
#[derive(Clone, Debug)]
pub struct StoredClause {
    /// The literals of the clause.
    literals: Vec<Literal>,

    /// True only if the clause was derived by conflict analysis.
    learned: bool,

    /// True only if the clause is an original constraint.
    core: bool,

    /// Activity, for reduction heuristics.
    activity: Activity,

    /// Literal block distance at the moment the clause was learned.
    lbd: u32,

    /// The watched pair.
    watched: (Literal, Literal),
}

impl StoredClause {
    pub fn new(literals: Vec<Literal>, learned: bool, core: bool) -> Self {
        let watched = match literals.len() {
            0 => (Literal::NONE, Literal::NONE),
            1 => (literals[0], Literal::NONE),
            _ => (literals[0], literals[1]),
        };

        StoredClause {
            literals,
            learned,
            core,
            activity: 0.0,
            lbd: 0,
            watched,
        }
    }

    /// The literals of the clause.
    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// A count of the literals of the clause.
    pub fn size(&self) -> usize {
        self.literals.len()
    }

    /// True only if the clause was derived by conflict analysis.
    pub fn is_learned(&self) -> bool {
        self.learned
    }

    /// True only if the clause is an original constraint.
    pub fn is_core(&self) -> bool {
        self.core
    }

    /// The activity of the clause.
    pub fn activity(&self) -> Activity {
        self.activity
    }

    pub fn set_activity(&mut self, activity: Activity) {
        self.activity = activity;
    }

    /// The literal block distance recorded for the clause.
    pub fn lbd(&self) -> u32 {
        self.lbd
    }

    pub fn set_lbd(&mut self, lbd: u32) {
        self.lbd = lbd;
    }

    /// The watched pair of the clause.
    pub fn watched(&self) -> (Literal, Literal) {
        self.watched
    }

    /// Swaps the two watch slots.
    pub fn swap_watched(&mut self) {
        std::mem::swap(&mut self.watched.0, &mut self.watched.1);
    }

    /// Replaces `old` with `new` in whichever watch slot holds `old`.
    pub fn replace_watch(&mut self, old: Literal, new: Literal) {
        if self.watched.0 == old {
            self.watched.0 = new;
        } else if self.watched.1 == old {
            self.watched.1 = new;
        } else {
            log::warn!(
                target: crate::misc::log::targets::CLAUSE_DB,
                "Watch update for a literal which is not watched: {old}"
            );
        }
    }

    /// Resets the watched pair to the leading literals of the clause.
    pub fn reset_watched(&mut self) {
        self.watched = match self.literals.len() {
            0 => (Literal::NONE, Literal::NONE),
            1 => (self.literals[0], Literal::NONE),
            _ => (self.literals[0], self.literals[1]),
        };
    }
}
