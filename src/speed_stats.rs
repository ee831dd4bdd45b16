use crate::round_log::RoundLog;

/// Why the cache cannot be read yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    NeverComputed,
    WindowSetChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Stale(StaleReason),
    Fresh,
}

/// A concrete window of rounds: the span [start, stop) over the log,
/// containing exactly the configured number of correct rounds plus any
/// interleaved given-up ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStat {
    pub total: f64,
    pub first_key_total: f64,
    pub start: usize,
    pub stop: usize,
}

/// Everything the display needs for one configured window size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowReport {
    pub window: usize,
    pub last_total: Option<f64>,
    pub last_first_key_total: Option<f64>,
    pub best_total: Option<f64>,
    pub best_total_range: Option<(usize, usize)>,
    pub best_first_key_total: Option<f64>,
    pub best_first_key_range: Option<(usize, usize)>,
}

/// Minima over windows already closed by a later correct round. The
/// still-open window is merged in at read time, never captured here;
/// that keeps incremental updates equal to a full rebuild.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct FrozenBest {
    total: Option<(f64, usize, usize)>,
    first_key: Option<(f64, usize, usize)>,
}

impl FrozenBest {
    fn offer(&mut self, stat: WindowStat) {
        if self.total.map_or(true, |(t, _, _)| stat.total < t) {
            self.total = Some((stat.total, stat.start, stat.stop));
        }
        if self
            .first_key
            .map_or(true, |(t, _, _)| stat.first_key_total < t)
        {
            self.first_key = Some((stat.first_key_total, stat.start, stat.stop));
        }
    }
}

/// Rolling speed statistics over a RoundLog.
///
/// Holds prefix sums of the derived round spans so both the current
/// window and each newly closed window cost O(1) per window size. The
/// best cache is keyed by the window-size set: changing the set marks
/// it stale and the next `update` or `recompute` rescans history;
/// appending rounds only folds in what the new round closed.
#[derive(Debug)]
pub struct SpeedStats {
    sizes: Vec<usize>,
    state: CacheState,
    prefix: Vec<f64>,
    bonuses: Vec<f64>,
    good: Vec<usize>,
    frozen: Vec<FrozenBest>,
}

fn normalize(sizes: &[usize]) -> Vec<usize> {
    let mut out: Vec<usize> = sizes.iter().copied().filter(|&c| c > 0).collect();
    out.sort_unstable();
    out.dedup();
    out
}

impl SpeedStats {
    pub fn new(sizes: &[usize]) -> Self {
        let sizes = normalize(sizes);
        let frozen = vec![FrozenBest::default(); sizes.len()];
        Self {
            sizes,
            state: CacheState::Stale(StaleReason::NeverComputed),
            prefix: vec![0.0],
            bonuses: Vec::new(),
            good: Vec::new(),
            frozen,
        }
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn window_sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Smallest configured window; the one the descriptor names.
    pub fn primary(&self) -> Option<usize> {
        self.sizes.first().copied()
    }

    /// (correct rounds, total rounds) seen so far.
    pub fn counts(&self) -> (usize, usize) {
        (self.good.len(), self.processed())
    }

    /// Swap the window-size set. A different set invalidates every
    /// best slot; an equal one (order and duplicates aside) is a no-op.
    pub fn set_window_sizes(&mut self, sizes: &[usize]) {
        let sizes = normalize(sizes);
        if sizes == self.sizes {
            return;
        }
        self.frozen = vec![FrozenBest::default(); sizes.len()];
        self.sizes = sizes;
        self.state = CacheState::Stale(StaleReason::WindowSetChanged);
    }

    fn processed(&self) -> usize {
        self.prefix.len() - 1
    }

    fn window_between(&self, start: usize, stop: usize) -> WindowStat {
        let total = self.prefix[stop] - self.prefix[start];
        WindowStat {
            total,
            first_key_total: total - self.bonuses[start],
            start,
            stop,
        }
    }

    /// Full rescan of the log: rebuild the derived sequences and score
    /// every closed window from scratch.
    pub fn recompute(&mut self, log: &RoundLog) {
        self.prefix = Vec::with_capacity(log.len() + 1);
        self.prefix.push(0.0);
        self.bonuses = Vec::with_capacity(log.len());
        self.good.clear();

        let mut sum = 0.0;
        for (i, span) in log.spans().iter().enumerate() {
            sum += span.secs;
            self.prefix.push(sum);
            self.bonuses.push(span.bonus_secs);
            if span.correct {
                self.good.push(i);
            }
        }

        self.frozen = self
            .sizes
            .iter()
            .map(|&c| {
                let mut best = FrozenBest::default();
                if self.good.len() > c {
                    for k in 0..(self.good.len() - c) {
                        best.offer(self.window_between(self.good[k], self.good[k + c]));
                    }
                }
                best
            })
            .collect();
        self.state = CacheState::Fresh;
    }

    /// Fold newly appended rounds into the cache. Falls back to a full
    /// rescan when the cache is stale. For each correct round this
    /// freezes the window that round closed, one per window size.
    pub fn update(&mut self, log: &RoundLog) {
        if self.state != CacheState::Fresh {
            self.recompute(log);
            return;
        }
        for i in self.processed()..log.len() {
            let span = match log.span_at(i) {
                Some(span) => span,
                None => break,
            };
            let sum = self.prefix[i] + span.secs;
            self.prefix.push(sum);
            self.bonuses.push(span.bonus_secs);
            if !span.correct {
                continue;
            }
            self.good.push(i);
            let m = self.good.len();
            for (slot, &c) in self.sizes.iter().enumerate() {
                if m > c {
                    // The window holding the previous c correct rounds
                    // just closed at this round's index.
                    let start = self.good[m - 1 - c];
                    let stat = self.window_between(start, i);
                    self.frozen[slot].offer(stat);
                }
            }
        }
    }

    /// The span covering the most recent `c` correct rounds, up to the
    /// end of the log. None until `c` correct rounds exist.
    pub fn current_window(&self, c: usize) -> Option<WindowStat> {
        if c == 0 || self.good.len() < c {
            return None;
        }
        let start = self.good[self.good.len() - c];
        Some(self.window_between(start, self.processed()))
    }

    /// Stats tuple for one configured window size. The open window
    /// competes with the frozen minima here, at read time.
    pub fn report(&self, c: usize) -> Option<WindowReport> {
        debug_assert_eq!(self.state, CacheState::Fresh);
        let slot = self.sizes.iter().position(|&s| s == c)?;
        let last = self.current_window(c);

        let mut best = self.frozen[slot];
        if let Some(stat) = last {
            best.offer(stat);
        }

        Some(WindowReport {
            window: c,
            last_total: last.map(|s| s.total),
            last_first_key_total: last.map(|s| s.first_key_total),
            best_total: best.total.map(|(t, _, _)| t),
            best_total_range: best.total.map(|(_, a, b)| (a, b)),
            best_first_key_total: best.first_key.map(|(t, _, _)| t),
            best_first_key_range: best.first_key.map(|(_, a, b)| (a, b)),
        })
    }

    pub fn reports(&self) -> Vec<WindowReport> {
        self.sizes.iter().filter_map(|&c| self.report(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round_log::RoundEvent;
    use assert_matches::assert_matches;
    use std::time::{Duration, SystemTime};

    // Build a log from (duration, bonus, correct) triples, chaining
    // completion times so each round's span comes out as requested.
    fn log_of(rounds: &[(f64, f64, bool)]) -> RoundLog {
        let anchor = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        let mut log = RoundLog::new(anchor);
        let mut prev = anchor;
        for &(secs, bonus, correct) in rounds {
            let completed_at = prev + Duration::from_secs_f64(secs);
            log.append(RoundEvent {
                word: "dart".to_string(),
                completed_at,
                first_key_at: prev + Duration::from_secs_f64(bonus),
                penalty: Duration::ZERO,
                correct,
            });
            prev = completed_at;
        }
        log
    }

    fn fresh(sizes: &[usize], log: &RoundLog) -> SpeedStats {
        let mut stats = SpeedStats::new(sizes);
        stats.recompute(log);
        stats
    }

    #[test]
    fn test_window_spans_include_interleaved_incorrect_rounds() {
        // T T F T with durations 5 3 10 4: the last two correct rounds
        // straddle the abandoned one, so its 10 seconds count too.
        let log = log_of(&[
            (5.0, 0.0, true),
            (3.0, 0.0, true),
            (10.0, 0.0, false),
            (4.0, 0.0, true),
        ]);
        let stats = fresh(&[2], &log);
        let report = stats.report(2).unwrap();
        assert_eq!(report.last_total, Some(17.0));
        assert_eq!(report.best_total, Some(17.0));
        assert_eq!(report.best_total_range, Some((1, 4)));
    }

    #[test]
    fn test_open_window_absorbs_trailing_incorrect_rounds() {
        // Same history truncated before the final correct round: the
        // only window runs to the end of the log and owns the trailing
        // abandoned round.
        let log = log_of(&[(5.0, 0.0, true), (3.0, 0.0, true), (10.0, 0.0, false)]);
        let stats = fresh(&[2], &log);
        let report = stats.report(2).unwrap();
        assert_eq!(report.last_total, Some(18.0));
        assert_eq!(report.best_total, Some(18.0));
        assert_eq!(report.best_total_range, Some((0, 3)));
    }

    #[test]
    fn test_best_survives_slower_current_window() {
        let log = log_of(&[(5.0, 0.0, true), (3.0, 0.0, true), (9.0, 0.0, true)]);
        let stats = fresh(&[1], &log);
        let report = stats.report(1).unwrap();
        assert_eq!(report.last_total, Some(9.0));
        assert_eq!(report.best_total, Some(3.0));
        assert_eq!(report.best_total_range, Some((1, 2)));
    }

    #[test]
    fn test_best_total_and_first_key_can_disagree() {
        // First round: slow overall but nearly all think time. Second:
        // faster wall clock, slower fingers.
        let log = log_of(&[(5.0, 4.0, true), (3.0, 0.5, true)]);
        let stats = fresh(&[1], &log);
        let report = stats.report(1).unwrap();
        assert_eq!(report.best_total, Some(3.0));
        assert_eq!(report.best_total_range, Some((1, 2)));
        assert_eq!(report.best_first_key_total, Some(1.0));
        assert_eq!(report.best_first_key_range, Some((0, 1)));
    }

    #[test]
    fn test_first_key_total_removes_only_first_bonus() {
        let log = log_of(&[(5.0, 2.0, true), (3.0, 1.0, true)]);
        let stats = fresh(&[2], &log);
        let report = stats.report(2).unwrap();
        assert_eq!(report.last_total, Some(8.0));
        // Only the window-opening round's think time comes off.
        assert_eq!(report.last_first_key_total, Some(6.0));
    }

    #[test]
    fn test_insufficient_history_is_none_not_error() {
        let log = log_of(&[(5.0, 0.0, true), (7.0, 0.0, false)]);
        let stats = fresh(&[3], &log);
        let report = stats.report(3).unwrap();
        assert_eq!(report.last_total, None);
        assert_eq!(report.best_total, None);
        assert_eq!(stats.counts(), (1, 2));
    }

    #[test]
    fn test_incremental_matches_full_rebuild_at_every_step() {
        let rounds = [
            (5.0, 1.0, true),
            (12.5, 3.0, false),
            (3.0, 0.5, true),
            (4.0, 0.0, true),
            (20.0, 6.0, false),
            (2.5, 0.25, true),
            (6.0, 2.0, true),
        ];
        let sizes = [1, 2, 3];

        let anchor = SystemTime::UNIX_EPOCH + Duration::from_secs(1000);
        let mut log = RoundLog::new(anchor);
        let mut prev = anchor;
        let mut incremental = SpeedStats::new(&sizes);
        incremental.recompute(&log);

        for &(secs, bonus, correct) in &rounds {
            let completed_at = prev + Duration::from_secs_f64(secs);
            log.append(RoundEvent {
                word: "dart".to_string(),
                completed_at,
                first_key_at: prev + Duration::from_secs_f64(bonus),
                penalty: Duration::ZERO,
                correct,
            });
            prev = completed_at;

            incremental.update(&log);
            let rebuilt = fresh(&sizes, &log);
            for &c in &sizes {
                assert_eq!(
                    incremental.report(c),
                    rebuilt.report(c),
                    "window {c} diverged at log length {}",
                    log.len()
                );
            }
        }
    }

    #[test]
    fn test_penalties_are_part_of_window_totals() {
        let anchor = SystemTime::UNIX_EPOCH;
        let mut log = RoundLog::new(anchor);
        log.append(RoundEvent {
            word: "dart".to_string(),
            completed_at: anchor + Duration::from_secs(5),
            first_key_at: anchor + Duration::from_secs(1),
            penalty: Duration::from_secs(2),
            correct: true,
        });
        let stats = fresh(&[1], &log);
        assert_eq!(stats.report(1).unwrap().last_total, Some(7.0));
    }

    #[test]
    fn test_changing_window_set_goes_stale_then_rescans() {
        let log = log_of(&[
            (5.0, 0.0, true),
            (3.0, 0.0, true),
            (10.0, 0.0, false),
            (4.0, 0.0, true),
        ]);
        let mut stats = fresh(&[2], &log);
        assert_matches!(stats.state(), CacheState::Fresh);

        stats.set_window_sizes(&[1, 2]);
        assert_matches!(
            stats.state(),
            CacheState::Stale(StaleReason::WindowSetChanged)
        );

        // update() notices the staleness and rescans everything.
        stats.update(&log);
        assert_matches!(stats.state(), CacheState::Fresh);
        assert_eq!(stats.report(1), fresh(&[1, 2], &log).report(1));
        assert_eq!(stats.report(2), fresh(&[1, 2], &log).report(2));
    }

    #[test]
    fn test_same_window_set_is_not_an_invalidation() {
        let log = log_of(&[(5.0, 0.0, true)]);
        let mut stats = fresh(&[2, 5], &log);
        stats.set_window_sizes(&[5, 2, 2]);
        assert_matches!(stats.state(), CacheState::Fresh);
    }

    #[test]
    fn test_new_engine_starts_stale() {
        let stats = SpeedStats::new(&[10]);
        assert_matches!(
            stats.state(),
            CacheState::Stale(StaleReason::NeverComputed)
        );
        assert_eq!(stats.primary(), Some(10));
    }

    #[test]
    fn test_sizes_are_sorted_and_deduped() {
        let stats = SpeedStats::new(&[10, 3, 10, 0]);
        assert_eq!(stats.window_sizes(), &[3, 10]);
        assert_eq!(stats.primary(), Some(3));
    }
}
