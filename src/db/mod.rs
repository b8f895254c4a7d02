/*!
The clause database.

The database owns every clause.
Everything else --- watch lists, trail antecedents, core extraction --- refers to clauses by
[ClauseId], a stable index into the database's slot vector: deletion vacates a slot but never
renumbers live clauses, so a stale id held elsewhere resolves to nothing rather than to the
wrong clause.

For each literal the database keeps the list of clauses watching that literal.
With *V* variables there are *2V + 1* buckets: positive literal *v* indexes bucket *v* and
negative literal *-v* indexes bucket *V + v*, with bucket zero unused.
Growing *V* shifts the negative buckets, so watch lists are rebuilt with [init_watches](ClauseDb::init_watches)
at the start of each solve rather than patched in place.

Learned clauses carry an activity, bumped on involvement in a conflict with the usual
rescale-on-overflow idiom, and are deleted under [reduce](ClauseDb::reduce) when the learned
population passes its cap or the advisory memory ceiling is crossed.

None of the operations here fail: an invalid or vacant id is silently ignored, and callers must
treat a vacant slot as a deleted clause.
*/

pub mod clause;
pub mod trail;

use std::collections::HashSet;

use crate::config::{Activity, ClauseDbConfig};
use crate::db::clause::StoredClause;
use crate::db::trail::Trail;
use crate::misc::log::targets;
use crate::structures::literal::{Literal, Variable};

/// A stable handle to a clause in the database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClauseId(u32);

impl ClauseId {
    /// The slot index of the handle.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ClauseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Rescale clause activities when any activity passes this bound.
const CLAUSE_ACTIVITY_BOUND: Activity = 1e20;

/// A database of clause related things.
pub struct ClauseDb {
    /// Clause database specific configuration parameters.
    config: ClauseDbConfig,

    /// Every clause, live or vacated. Ids index this vector and are never reused.
    slots: Vec<Option<StoredClause>>,

    /// For each literal bucket, the clauses watching the literal.
    watches: Vec<Vec<ClauseId>>,

    /// Positive and negative occurrence counts, by variable.
    occurrence: Vec<[u32; 2]>,

    /// A count of variables the database indexes.
    variable_count: usize,

    /// A count of live non-learned clauses.
    original_count: usize,

    /// A count of live learned clauses.
    learned_active: usize,

    /// A count of learned clauses over the life of the database.
    learned_total: usize,

    /// A count of deleted learned clauses.
    learned_deleted: usize,

    /// The activity with which the next bumped clause will be bumped, dynamically adjusted.
    activity_inc: Activity,
}

impl ClauseDb {
    /// A new database over `variable_count` variables.
    pub fn new(variable_count: usize, config: ClauseDbConfig) -> Self {
        ClauseDb {
            config,
            slots: Vec::default(),
            watches: vec![Vec::default(); 2 * variable_count + 1],
            occurrence: vec![[0, 0]; variable_count + 1],
            variable_count,
            original_count: 0,
            learned_active: 0,
            learned_total: 0,
            learned_deleted: 0,
            activity_inc: 1.0,
        }
    }

    /// The cap on the learned clause population.
    pub fn max_learnts(&self) -> usize {
        self.config
            .max_learnts
            .unwrap_or(4 * self.variable_count.max(1))
    }

    /// Revises the cap on the learned clause population.
    pub fn set_max_learnts(&mut self, cap: usize) {
        self.config.max_learnts = Some(cap);
    }

    /// A count of variables the database indexes.
    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// A count of live clauses.
    pub fn clause_count(&self) -> usize {
        self.original_count + self.learned_active
    }

    /// A count of live learned clauses.
    pub fn learned_count(&self) -> usize {
        self.learned_active
    }

    /// A count of learned clauses deleted over the life of the database.
    pub fn learned_deleted(&self) -> usize {
        self.learned_deleted
    }

    /// A count of learned clauses stored over the life of the database.
    pub fn learned_total(&self) -> usize {
        self.learned_total
    }

    /// The clause stored at `id`, unless the slot has been vacated.
    pub fn clause(&self, id: ClauseId) -> Option<&StoredClause> {
        self.slots.get(id.index()).and_then(|slot| slot.as_ref())
    }

    /// Mutable access to the clause stored at `id`, unless the slot has been vacated.
    pub fn clause_mut(&mut self, id: ClauseId) -> Option<&mut StoredClause> {
        self.slots.get_mut(id.index()).and_then(|slot| slot.as_mut())
    }

    /// An iterator over the ids and contents of all live clauses.
    pub fn clauses(&self) -> impl Iterator<Item = (ClauseId, &StoredClause)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref().map(|clause| (ClauseId(index as u32), clause))
        })
    }

    /// A count of slots, for id-order iteration.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The id of the slot at `index`, without any check the slot is live.
    pub fn id_at(&self, index: usize) -> ClauseId {
        ClauseId(index as u32)
    }

    /// The positive and negative occurrence counts of `variable`.
    pub fn occurrence_of(&self, variable: Variable) -> (u32, u32) {
        let counts = self.occurrence[variable as usize];
        (counts[0], counts[1])
    }
}

// Storage.
impl ClauseDb {
    /// Interns a clause, registers watches on its leading literals, and updates counters.
    ///
    /// Original constraints are added with `learned` false, and are core.
    pub fn add_clause(&mut self, literals: Vec<Literal>, learned: bool) -> ClauseId {
        self.store(StoredClause::new(literals, learned, !learned))
    }

    /// Interns a temporary constraint: not learned, and not core, so dropped at the next
    /// [clear_learned](ClauseDb::clear_learned).
    pub fn add_temporary(&mut self, literals: Vec<Literal>) -> ClauseId {
        self.store(StoredClause::new(literals, false, false))
    }

    /// Interns a learned clause with its literal block distance.
    pub fn add_learned(&mut self, literals: Vec<Literal>, lbd: u32) -> ClauseId {
        let mut clause = StoredClause::new(literals, true, false);
        clause.set_lbd(lbd);
        clause.set_activity(self.activity_inc);
        self.store(clause)
    }

    fn store(&mut self, clause: StoredClause) -> ClauseId {
        let id = ClauseId(self.slots.len() as u32);

        for literal in clause.literals() {
            let counts = &mut self.occurrence[literal.variable() as usize];
            match literal.polarity() {
                true => counts[0] += 1,
                false => counts[1] += 1,
            }
        }

        match clause.is_learned() {
            true => {
                self.learned_active += 1;
                self.learned_total += 1;
            }
            false => self.original_count += 1,
        }

        self.attach_watches(id, &clause);

        log::trace!(
            target: targets::CLAUSE_DB,
            "{id}: {:?} (learned: {})",
            clause.literals(),
            clause.is_learned()
        );

        self.slots.push(Some(clause));
        id
    }

    /// Detaches the clause at `id` from its watch lists, updates counters, and vacates the slot.
    ///
    /// A vacant or invalid id is silently ignored.
    pub fn remove_clause(&mut self, id: ClauseId) {
        let Some(clause) = self.slots.get_mut(id.index()).and_then(Option::take) else {
            return;
        };

        let (first, second) = clause.watched();
        for watch in [first, second] {
            if !watch.is_none() {
                let bucket = watch.watch_index(self.variable_count);
                self.watches[bucket].retain(|watcher| *watcher != id);
            }
        }

        for literal in clause.literals() {
            let counts = &mut self.occurrence[literal.variable() as usize];
            match literal.polarity() {
                true => counts[0] = counts[0].saturating_sub(1),
                false => counts[1] = counts[1].saturating_sub(1),
            }
        }

        match clause.is_learned() {
            true => {
                self.learned_active -= 1;
                self.learned_deleted += 1;
            }
            false => self.original_count -= 1,
        }

        log::trace!(target: targets::CLAUSE_DB, "Removed {id}");
    }

    /// Introduces a fresh variable, extending the occurrence map and watch storage.
    ///
    /// Watch buckets are indexed against the variable count, so existing lists are stale until
    /// the rebuild at the start of the next solve.
    pub fn new_variable(&mut self) -> Variable {
        self.variable_count += 1;
        self.occurrence.push([0, 0]);
        self.watches.resize(2 * self.variable_count + 1, Vec::default());
        self.variable_count as Variable
    }
}

// Watches.
impl ClauseDb {
    fn attach_watches(&mut self, id: ClauseId, clause: &StoredClause) {
        let (first, second) = clause.watched();
        for watch in [first, second] {
            if !watch.is_none() {
                let bucket = watch.watch_index(self.variable_count);
                self.watches[bucket].push(id);
            }
        }
    }

    /// Clears and re-registers every watch list from the stored clauses.
    ///
    /// Watched pairs are reset to the leading literals of each clause.
    pub fn init_watches(&mut self) {
        for bucket in self.watches.iter_mut() {
            bucket.clear();
        }
        self.watches.resize(2 * self.variable_count + 1, Vec::default());

        for index in 0..self.slots.len() {
            let id = ClauseId(index as u32);
            if let Some(clause) = &mut self.slots[index] {
                clause.reset_watched();
                let (first, second) = clause.watched();
                for watch in [first, second] {
                    if !watch.is_none() {
                        let bucket = watch.watch_index(self.variable_count);
                        self.watches[bucket].push(id);
                    }
                }
            }
        }
    }

    /// A read-only view of the clauses watching `literal`.
    pub fn watches_of(&self, literal: Literal) -> &[ClauseId] {
        &self.watches[literal.watch_index(self.variable_count)]
    }

    /// Migrates one watch of the clause at `id` from `old` to `new`, in both the watch lists and
    /// the stored pair.
    pub fn update_watches(&mut self, id: ClauseId, old: Literal, new: Literal) {
        let Some(clause) = self.slots.get_mut(id.index()).and_then(|slot| slot.as_mut()) else {
            return;
        };
        clause.replace_watch(old, new);

        let old_bucket = old.watch_index(self.variable_count);
        self.watches[old_bucket].retain(|watcher| *watcher != id);
        let new_bucket = new.watch_index(self.variable_count);
        self.watches[new_bucket].push(id);
    }

    /// True only if every live clause is watched by exactly the buckets of its watched pair.
    ///
    /// A diagnostic, for tests and debugging.
    pub fn watches_consistent(&self) -> bool {
        for (id, clause) in self.clauses() {
            let (first, second) = clause.watched();
            for watch in [first, second] {
                if watch.is_none() {
                    continue;
                }
                let bucket = watch.watch_index(self.variable_count);
                if !self.watches[bucket].contains(&id) {
                    log::error!(target: targets::CLAUSE_DB, "{id} missing from the bucket of {watch}");
                    return false;
                }
            }
        }

        for (bucket, watchers) in self.watches.iter().enumerate() {
            for id in watchers {
                let Some(clause) = self.clause(*id) else {
                    continue;
                };
                let (first, second) = clause.watched();
                let covered = [first, second].iter().any(|watch| {
                    !watch.is_none() && watch.watch_index(self.variable_count) == bucket
                });
                if !covered {
                    log::error!(target: targets::CLAUSE_DB, "{id} watched by a stale bucket");
                    return false;
                }
            }
        }

        true
    }
}

// Activity.
impl ClauseDb {
    /// Bumps the activity of the learned clause at `id`, rescaling all clause activities if any
    /// would pass the bound.
    pub fn bump_activity(&mut self, id: ClauseId) {
        let Some(clause) = self.slots.get(id.index()).and_then(|slot| slot.as_ref()) else {
            return;
        };
        if !clause.is_learned() {
            return;
        }

        let bumped = clause.activity() + self.activity_inc;
        if bumped > CLAUSE_ACTIVITY_BOUND {
            for slot in self.slots.iter_mut() {
                if let Some(clause) = slot {
                    if clause.is_learned() {
                        clause.set_activity(clause.activity() * 1e-20);
                    }
                }
            }
            self.activity_inc *= 1e-20;
        }

        if let Some(clause) = self.slots[id.index()].as_mut() {
            let refreshed = clause.activity() + self.activity_inc;
            clause.set_activity(refreshed);
        }
    }

    /// Decays clause activities, by inflating the next bump.
    pub fn decay_activities(&mut self) {
        self.activity_inc /= self.config.clause_decay;
    }
}

// Literal block distance.
impl ClauseDb {
    /// The literal block distance of `literals` under the levels recorded on `trail`: a count of
    /// the distinct nonzero decision levels among the literals.
    pub fn compute_lbd(literals: &[Literal], trail: &Trail) -> u32 {
        let mut levels = HashSet::new();
        for literal in literals {
            let level = trail.level_of(literal.variable());
            if level > 0 {
                levels.insert(level);
            }
        }
        levels.len() as u32
    }
}

// Reduction.
impl ClauseDb {
    /// True only if the learned population exceeds its cap.
    pub fn over_cap(&self) -> bool {
        self.learned_active > self.max_learnts()
    }

    /// True only if the estimated footprint has crossed the advisory memory ceiling.
    pub fn over_memory_ceiling(&self) -> bool {
        self.estimated_memory_bytes() > self.config.memory_limit_mb * 1024 * 1024
    }

    /// An estimate of the database footprint, in bytes.
    pub fn estimated_memory_bytes(&self) -> usize {
        let mut total = 0;
        for slot in &self.slots {
            if let Some(clause) = slot {
                total += std::mem::size_of::<StoredClause>()
                    + clause.size() * std::mem::size_of::<Literal>();
            }
        }
        for bucket in &self.watches {
            total += bucket.len() * std::mem::size_of::<ClauseId>();
        }
        total
    }

    /// Deletes low-quality learned clauses until the population returns to roughly three
    /// quarters of the cap.
    ///
    /// Learned clauses satisfied under the current valuation are swept first. If the population
    /// is still over the cap, the remaining learned clauses are ranked by `activity / max(lbd, 1)`
    /// ascending, preserving clauses with lbd at or below the keep bound and clauses which are
    /// the antecedent of a trail entry.
    ///
    /// Returns a count of the clauses deleted.
    pub fn reduce(&mut self, trail: &Trail) -> usize {
        if !self.config.deletion_allowed || self.learned_active <= self.max_learnts() {
            return 0;
        }

        let locked: HashSet<ClauseId> = trail
            .entries()
            .iter()
            .filter_map(|entry| entry.antecedent)
            .collect();

        let mut removed = self.sweep_satisfied(trail, &locked);

        if self.learned_active > self.max_learnts() {
            let mut ranked: Vec<(ClauseId, f64)> = Vec::new();
            for (id, clause) in self.clauses() {
                if !clause.is_learned() || locked.contains(&id) {
                    continue;
                }
                if clause.lbd() <= self.config.lbd_keep_bound {
                    continue;
                }
                let score = clause.activity() / clause.lbd().max(1) as f64;
                ranked.push((id, score));
            }
            ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

            let target = self.max_learnts() * 3 / 4;
            for (id, _) in ranked {
                if self.learned_active <= target {
                    break;
                }
                self.remove_clause(id);
                removed += 1;
            }
        }

        log::info!(
            target: targets::REDUCTION,
            "Reduction removed {removed} clauses, {} learned remain",
            self.learned_active
        );
        removed
    }

    /// Removes learned clauses whose disjunction is satisfied under the current valuation.
    fn sweep_satisfied(&mut self, trail: &Trail, locked: &HashSet<ClauseId>) -> usize {
        let mut satisfied = Vec::new();
        for (id, clause) in self.clauses() {
            if !clause.is_learned() || clause.is_core() || locked.contains(&id) {
                continue;
            }
            if clause
                .literals()
                .iter()
                .any(|literal| trail.value_of_literal(*literal) == Some(true))
            {
                satisfied.push(id);
            }
        }

        for id in &satisfied {
            self.remove_clause(*id);
        }
        satisfied.len()
    }

    /// Drops all non-core clauses in place and rebuilds the watch lists.
    ///
    /// This is the solve-boundary operation: learned clauses and temporary clauses vanish
    /// together. Ids of surviving core clauses are unchanged.
    pub fn clear_learned(&mut self) {
        self.clear_where(|clause| !clause.is_core());

        log::info!(
            target: targets::CLAUSE_DB,
            "Cleared non-core clauses, {} original clauses remain",
            self.original_count
        );
    }

    /// Drops learned clauses only, leaving temporary clauses in force.
    ///
    /// Used by stall recovery, which forgets the search so far mid-solve: the temporary
    /// constraints of the solve must keep binding it.
    pub fn drop_learned_clauses(&mut self) {
        self.clear_where(|clause| clause.is_learned());

        log::info!(
            target: targets::CLAUSE_DB,
            "Dropped learned clauses, {} clauses remain",
            self.clause_count()
        );
    }

    fn clear_where(&mut self, condition: impl Fn(&StoredClause) -> bool) {
        for index in 0..self.slots.len() {
            let drop = match &self.slots[index] {
                Some(clause) => condition(clause),
                None => false,
            };
            if drop {
                self.remove_clause(ClauseId(index as u32));
            }
        }

        self.init_watches();
        self.activity_inc = 1.0;
        self.learned_total = 0;
        self.learned_deleted = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literals(ints: &[i32]) -> Vec<Literal> {
        ints.iter().map(|i| Literal::from(*i)).collect()
    }

    #[test]
    fn ids_are_stable_across_removal() {
        let mut db = ClauseDb::new(3, ClauseDbConfig::default());
        let a = db.add_clause(literals(&[1, 2]), false);
        let b = db.add_clause(literals(&[2, 3]), false);
        let c = db.add_clause(literals(&[-1, -3]), false);

        db.remove_clause(b);

        assert!(db.clause(b).is_none());
        assert_eq!(db.clause(a).map(|c| c.size()), Some(2));
        assert_eq!(db.clause(c).map(|c| c.size()), Some(2));

        // Removal of a vacant id is silently ignored.
        db.remove_clause(b);
        assert_eq!(db.clause_count(), 2);
    }

    #[test]
    fn watches_cover_leading_literals() {
        let mut db = ClauseDb::new(3, ClauseDbConfig::default());
        let id = db.add_clause(literals(&[1, -2, 3]), false);

        assert!(db.watches_of(Literal::from(1)).contains(&id));
        assert!(db.watches_of(Literal::from(-2)).contains(&id));
        assert!(!db.watches_of(Literal::from(3)).contains(&id));
    }

    #[test]
    fn watch_migration() {
        let mut db = ClauseDb::new(3, ClauseDbConfig::default());
        let id = db.add_clause(literals(&[1, -2, 3]), false);

        db.update_watches(id, Literal::from(1), Literal::from(3));

        assert!(!db.watches_of(Literal::from(1)).contains(&id));
        assert!(db.watches_of(Literal::from(3)).contains(&id));
        let (first, _) = db.clause(id).unwrap().watched();
        assert_eq!(first, Literal::from(3));
    }

    #[test]
    fn lbd_is_bound_by_clause_size() {
        let mut trail = Trail::default();
        trail.ensure_capacity(4);
        trail.assign(Literal::from(-1), 1, None, true);
        trail.assign(Literal::from(-2), 1, None, false);
        trail.assign(Literal::from(-3), 2, None, true);
        trail.assign(Literal::from(-4), 0, None, false);

        let clause = literals(&[1, 2, 3, 4]);
        let lbd = ClauseDb::compute_lbd(&clause, &trail);

        // Levels 1, 1, 2 and a zero level: two distinct nonzero levels.
        assert_eq!(lbd, 2);
        assert!(lbd as usize <= clause.len());
    }

    #[test]
    fn clear_learned_keeps_core_ids() {
        let mut db = ClauseDb::new(3, ClauseDbConfig::default());
        let core = db.add_clause(literals(&[1, 2]), false);
        let temporary = db.add_temporary(literals(&[2, 3]));
        let learned = db.add_learned(literals(&[-1, -2]), 2);

        db.clear_learned();

        assert!(db.clause(core).is_some());
        assert!(db.clause(temporary).is_none());
        assert!(db.clause(learned).is_none());
        assert_eq!(db.clause_count(), 1);
    }

    #[test]
    fn watch_lists_stay_consistent() {
        let mut db = ClauseDb::new(4, ClauseDbConfig::default());
        let a = db.add_clause(literals(&[1, -2, 3]), false);
        let b = db.add_clause(literals(&[-1, 4]), false);
        db.add_learned(literals(&[2, -3, -4]), 2);
        assert!(db.watches_consistent());

        db.update_watches(a, Literal::from(1), Literal::from(3));
        db.remove_clause(b);
        assert!(db.watches_consistent());

        db.init_watches();
        assert!(db.watches_consistent());

        db.clear_learned();
        assert!(db.watches_consistent());
    }

    #[test]
    fn occurrence_counts_follow_storage() {
        let mut db = ClauseDb::new(2, ClauseDbConfig::default());
        let id = db.add_clause(literals(&[1, -2]), false);
        db.add_clause(literals(&[1, 2]), false);

        assert_eq!(db.occurrence_of(1), (2, 0));
        assert_eq!(db.occurrence_of(2), (1, 1));

        db.remove_clause(id);
        assert_eq!(db.occurrence_of(1), (1, 0));
        assert_eq!(db.occurrence_of(2), (1, 0));
    }
}
