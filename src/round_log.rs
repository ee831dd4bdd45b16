use std::time::{Duration, SystemTime};

/// One finished round: win, loss, or give-up. Created exactly once at
/// the terminal transition and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundEvent {
    pub word: String,
    pub completed_at: SystemTime,
    pub first_key_at: SystemTime,
    pub penalty: Duration,
    pub correct: bool,
}

/// Per-round view derived from the log: wall-clock span since the
/// previous round ended (plus penalty), and the think-time before the
/// round's first keystroke.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSpan {
    pub word: String,
    pub secs: f64,
    pub bonus_secs: f64,
    pub correct: bool,
}

/// Append-only audit trail of finished rounds, anchored at the session
/// start instant. Every statistic is derived from this; nothing in it
/// is ever edited or removed.
#[derive(Debug)]
pub struct RoundLog {
    anchor: SystemTime,
    events: Vec<RoundEvent>,
}

impl RoundLog {
    pub fn new(anchor: SystemTime) -> Self {
        Self {
            anchor,
            events: Vec::new(),
        }
    }

    /// The only mutator. Completion times must be non-decreasing.
    pub fn append(&mut self, event: RoundEvent) {
        debug_assert!(self
            .events
            .last()
            .map_or(true, |last| last.completed_at <= event.completed_at));
        self.events.push(event);
    }

    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Derived span for round `i`; the anchor stands in for the end of
    /// the round before the first one.
    pub fn span_at(&self, i: usize) -> Option<RoundSpan> {
        let ev = self.events.get(i)?;
        let prev = if i == 0 {
            self.anchor
        } else {
            self.events[i - 1].completed_at
        };
        let secs = ev
            .completed_at
            .duration_since(prev)
            .unwrap_or_default()
            .as_secs_f64()
            + ev.penalty.as_secs_f64();
        let bonus_secs = ev
            .first_key_at
            .duration_since(prev)
            .unwrap_or_default()
            .as_secs_f64();
        Some(RoundSpan {
            word: ev.word.clone(),
            secs,
            bonus_secs,
            correct: ev.correct,
        })
    }

    pub fn spans(&self) -> Vec<RoundSpan> {
        (0..self.events.len())
            .filter_map(|i| self.span_at(i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(anchor: SystemTime, secs: u64) -> SystemTime {
        anchor + Duration::from_secs(secs)
    }

    fn event(
        anchor: SystemTime,
        done: u64,
        first_key: u64,
        penalty: Duration,
        correct: bool,
    ) -> RoundEvent {
        RoundEvent {
            word: "dart".to_string(),
            completed_at: at(anchor, done),
            first_key_at: at(anchor, first_key),
            penalty,
            correct,
        }
    }

    #[test]
    fn test_span_durations_chain_from_anchor() {
        let anchor = SystemTime::UNIX_EPOCH;
        let mut log = RoundLog::new(anchor);
        log.append(event(anchor, 5, 1, Duration::ZERO, true));
        log.append(event(anchor, 8, 6, Duration::ZERO, true));

        let spans = log.spans();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].secs, 5.0);
        assert_eq!(spans[0].bonus_secs, 1.0);
        // Second round is measured from the first round's end.
        assert_eq!(spans[1].secs, 3.0);
        assert_eq!(spans[1].bonus_secs, 1.0);
    }

    #[test]
    fn test_penalty_extends_span_not_bonus() {
        let anchor = SystemTime::UNIX_EPOCH;
        let mut log = RoundLog::new(anchor);
        log.append(event(anchor, 10, 2, Duration::from_millis(1500), false));

        let span = log.span_at(0).unwrap();
        assert_eq!(span.secs, 11.5);
        assert_eq!(span.bonus_secs, 2.0);
        assert!(!span.correct);
    }

    #[test]
    fn test_bonus_never_exceeds_span() {
        let anchor = SystemTime::UNIX_EPOCH;
        let mut log = RoundLog::new(anchor);
        log.append(event(anchor, 4, 4, Duration::ZERO, true));
        log.append(event(anchor, 9, 5, Duration::from_secs(2), true));

        for span in log.spans() {
            assert!(span.bonus_secs <= span.secs);
        }
    }

    #[test]
    fn test_span_out_of_range_is_none() {
        let log = RoundLog::new(SystemTime::UNIX_EPOCH);
        assert!(log.span_at(0).is_none());
        assert!(log.is_empty());
    }
}
