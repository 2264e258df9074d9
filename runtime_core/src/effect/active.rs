use std::time::Duration;

use stat_core::{EntityId, Timestamp};

use super::StatusEffect;

/// A tracked effect instance on one target
#[derive(Debug)]
pub struct ActiveEffect {
    effect: Box<dyn StatusEffect>,
    target: EntityId,
    potency: f64,
    stacks: u32,
    applied_at: Timestamp,
    expires_at: Option<Timestamp>,
    next_tick: Option<Timestamp>,
    tick_interval: Option<Duration>,
}

impl ActiveEffect {
    pub(crate) fn new(effect: Box<dyn StatusEffect>, target: EntityId, now: Timestamp) -> Self {
        let tick_interval = effect.tick_interval().filter(|interval| !interval.is_zero());
        ActiveEffect {
            potency: effect.potency(),
            stacks: 1,
            applied_at: now,
            expires_at: effect.duration().map(|duration| now + duration),
            next_tick: tick_interval.map(|interval| now + interval),
            tick_interval,
            target,
            effect,
        }
    }

    pub fn key(&self) -> &str {
        self.effect.key()
    }

    pub fn target(&self) -> EntityId {
        self.target
    }

    pub fn potency(&self) -> f64 {
        self.potency
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    pub fn applied_at(&self) -> Timestamp {
        self.applied_at
    }

    /// `None` when permanent
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at
    }

    /// `None` when the effect never ticks
    pub fn next_tick(&self) -> Option<Timestamp> {
        self.next_tick
    }

    pub fn is_permanent(&self) -> bool {
        self.expires_at.is_none()
    }

    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expiry| now >= expiry)
    }

    pub fn remaining(&self, now: Timestamp) -> Option<Duration> {
        self.expires_at.map(|expiry| expiry.saturating_duration_since(now))
    }

    pub(crate) fn tick_due(&self, now: Timestamp) -> bool {
        self.next_tick.is_some_and(|next| now >= next)
    }

    /// Move the schedule forward by one interval from the previous deadline
    pub(crate) fn advance_tick(&mut self) {
        if let (Some(next), Some(interval)) = (self.next_tick, self.tick_interval) {
            self.next_tick = Some(next + interval);
        }
    }

    pub(crate) fn effect_mut(&mut self) -> &mut dyn StatusEffect {
        self.effect.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::StatModifierEffect;
    use crate::effect::PeriodicEffect;
    use uuid::Uuid;

    #[test]
    fn test_schedule_from_application_time() {
        let now = Timestamp::from_millis(1_000);
        let active = ActiveEffect::new(
            Box::new(PeriodicEffect::regeneration(5.0, Duration::from_secs(3), Duration::from_secs(1))),
            Uuid::new_v4(),
            now,
        );
        assert_eq!(active.expires_at(), Some(Timestamp::from_millis(4_000)));
        assert_eq!(active.next_tick(), Some(Timestamp::from_millis(2_000)));
        assert_eq!(active.stacks(), 1);
        assert!(!active.is_expired(Timestamp::from_millis(3_999)));
        assert!(active.is_expired(Timestamp::from_millis(4_000)));
    }

    #[test]
    fn test_advance_is_relative_to_previous_deadline() {
        let mut active = ActiveEffect::new(
            Box::new(PeriodicEffect::poison(1.0, Duration::from_secs(10), Duration::from_millis(500))),
            Uuid::new_v4(),
            Timestamp::ZERO,
        );
        // a late tick does not push the schedule out
        assert!(active.tick_due(Timestamp::from_millis(730)));
        active.advance_tick();
        assert_eq!(active.next_tick(), Some(Timestamp::from_millis(1_000)));
    }

    #[test]
    fn test_permanent_non_ticking() {
        let active = ActiveEffect::new(
            Box::new(StatModifierEffect::permanent("blessing", Default::default())),
            Uuid::new_v4(),
            Timestamp::ZERO,
        );
        assert!(active.is_permanent());
        assert_eq!(active.next_tick(), None);
        assert!(!active.is_expired(Timestamp::from_millis(u64::MAX)));
        assert_eq!(active.remaining(Timestamp::ZERO), None);
    }
}
