use common::ConnectionId;
use common::games::tictactoe::Mark;

use super::declined::Declined;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Claimant {
    /// A connection that claimed the slot. The name is kept current on rename so
    /// the slot can still be credited after the connection has gone.
    Participant { id: ConnectionId, name: String },
    Automated,
}

impl Claimant {
    pub fn participant_id(&self) -> Option<&ConnectionId> {
        match self {
            Claimant::Participant { id, .. } => Some(id),
            Claimant::Automated => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Claim {
    pub mark: Mark,
    pub evicted: Option<Claimant>,
}

#[derive(Debug, Default)]
pub struct RoleRegistry {
    x: Option<Claimant>,
    o: Option<Claimant>,
    current_turn: Option<Mark>,
    match_started: bool,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, mark: Mark) -> &Option<Claimant> {
        match mark {
            Mark::X => &self.x,
            Mark::O => &self.o,
        }
    }

    fn slot_mut(&mut self, mark: Mark) -> &mut Option<Claimant> {
        match mark {
            Mark::X => &mut self.x,
            Mark::O => &mut self.o,
        }
    }

    pub fn holder(&self, mark: Mark) -> Option<&Claimant> {
        self.slot(mark).as_ref()
    }

    pub fn has(&self, mark: Mark) -> bool {
        self.slot(mark).is_some()
    }

    pub fn mark_of(&self, id: &ConnectionId) -> Option<Mark> {
        [Mark::X, Mark::O]
            .into_iter()
            .find(|&mark| self.holder(mark).and_then(Claimant::participant_id) == Some(id))
    }

    pub fn current_turn(&self) -> Option<Mark> {
        self.current_turn
    }

    pub fn set_current_turn(&mut self, mark: Option<Mark>) {
        self.current_turn = mark;
    }

    pub fn advance_turn(&mut self, played: Mark) {
        self.current_turn = Some(played.opponent());
    }

    pub fn is_match_started(&self) -> bool {
        self.match_started
    }

    pub fn start_match(&mut self) {
        self.match_started = true;
    }

    /// Hands the first free mark (X before O) to an observer on their first move.
    /// Unlike an explicit claim this works mid-match, as long as a slot is free.
    pub fn claim_on_move(&mut self, id: &ConnectionId, name: &str) -> Option<Mark> {
        if self.mark_of(id).is_some() {
            return None;
        }

        let mark = [Mark::X, Mark::O].into_iter().find(|&mark| !self.has(mark))?;
        *self.slot_mut(mark) = Some(Claimant::Participant {
            id: id.clone(),
            name: name.to_string(),
        });
        if self.current_turn.is_none() {
            self.current_turn = Some(mark);
        }
        Some(mark)
    }

    pub fn claim_explicit(
        &mut self,
        id: &ConnectionId,
        name: &str,
        mark: Mark,
    ) -> Result<Claim, Declined> {
        if self.match_started {
            return Err(Declined::MatchStarted);
        }

        if let Some(held) = self.mark_of(id) {
            if held == mark {
                return Ok(Claim {
                    mark,
                    evicted: None,
                });
            }
            *self.slot_mut(held) = None;
        }

        let evicted = self.slot_mut(mark).replace(Claimant::Participant {
            id: id.clone(),
            name: name.to_string(),
        });
        if self.current_turn.is_none() {
            self.current_turn = Some(mark);
        }
        Ok(Claim { mark, evicted })
    }

    pub fn attach_automated(&mut self, mark: Mark) -> Option<Claimant> {
        self.slot_mut(mark).replace(Claimant::Automated)
    }

    /// A disconnect keeps the slot claimed; the round carries on with an absent holder.
    pub fn release_participant(&self, id: &ConnectionId) -> Option<Mark> {
        self.mark_of(id)
    }

    pub fn rename(&mut self, id: &ConnectionId, new_name: &str) {
        for slot in [&mut self.x, &mut self.o] {
            if let Some(Claimant::Participant { id: holder, name }) = slot
                && holder == id
            {
                *name = new_name.to_string();
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::from(value)
    }

    #[test]
    fn test_claim_on_move_prefers_x_then_o() {
        let mut registry = RoleRegistry::new();

        assert_eq!(registry.claim_on_move(&id("a"), "a"), Some(Mark::X));
        assert_eq!(registry.claim_on_move(&id("b"), "b"), Some(Mark::O));
        assert_eq!(registry.claim_on_move(&id("c"), "c"), None);
        assert_eq!(registry.mark_of(&id("c")), None);
    }

    #[test]
    fn test_claim_on_move_sets_turn_for_first_claimant() {
        let mut registry = RoleRegistry::new();

        registry.claim_on_move(&id("a"), "a");
        registry.claim_on_move(&id("b"), "b");

        assert_eq!(registry.current_turn(), Some(Mark::X));
    }

    #[test]
    fn test_claim_on_move_ignores_existing_player() {
        let mut registry = RoleRegistry::new();
        registry.claim_on_move(&id("a"), "a");

        assert_eq!(registry.claim_on_move(&id("a"), "a"), None);
        assert!(!registry.has(Mark::O));
    }

    #[test]
    fn test_claim_on_move_takes_free_slot_after_start() {
        let mut registry = RoleRegistry::new();
        registry.claim_on_move(&id("a"), "a");
        registry.start_match();
        registry.advance_turn(Mark::X);

        assert_eq!(registry.claim_on_move(&id("b"), "b"), Some(Mark::O));
        assert_eq!(registry.current_turn(), Some(Mark::O));
        assert_eq!(registry.claim_on_move(&id("c"), "c"), None);
    }

    #[test]
    fn test_claim_explicit_evicts_holder() {
        let mut registry = RoleRegistry::new();
        registry.claim_on_move(&id("a"), "alice");

        let claim = registry.claim_explicit(&id("b"), "bob", Mark::X).unwrap();

        assert_eq!(
            claim.evicted,
            Some(Claimant::Participant {
                id: id("a"),
                name: "alice".to_string()
            })
        );
        assert_eq!(registry.mark_of(&id("b")), Some(Mark::X));
        assert_eq!(registry.mark_of(&id("a")), None);
    }

    #[test]
    fn test_claim_explicit_switching_mark_frees_previous_slot() {
        let mut registry = RoleRegistry::new();
        registry.claim_explicit(&id("a"), "a", Mark::O).unwrap();

        registry.claim_explicit(&id("a"), "a", Mark::X).unwrap();

        assert!(!registry.has(Mark::O));
        assert_eq!(registry.mark_of(&id("a")), Some(Mark::X));
    }

    #[test]
    fn test_claim_explicit_declined_after_start() {
        let mut registry = RoleRegistry::new();
        registry.claim_on_move(&id("a"), "a");
        registry.start_match();

        let result = registry.claim_explicit(&id("b"), "b", Mark::X);

        assert_eq!(result, Err(Declined::MatchStarted));
        assert_eq!(registry.mark_of(&id("a")), Some(Mark::X));
    }

    #[test]
    fn test_each_mark_has_at_most_one_claimant() {
        let mut registry = RoleRegistry::new();
        let names = ["a", "b", "c", "d"];

        for (step, name) in names.iter().cycle().take(12).enumerate() {
            let mark = if step % 3 == 0 { Mark::O } else { Mark::X };
            registry.claim_explicit(&id(name), name, mark).unwrap();

            let holders = names
                .iter()
                .filter(|n| registry.mark_of(&id(n)).is_some())
                .count();
            assert!(holders <= 2);
            assert_ne!(registry.holder(Mark::X), registry.holder(Mark::O));
        }
    }

    #[test]
    fn test_release_keeps_slot() {
        let mut registry = RoleRegistry::new();
        registry.claim_on_move(&id("a"), "a");

        assert_eq!(registry.release_participant(&id("a")), Some(Mark::X));
        assert!(registry.has(Mark::X));
    }

    #[test]
    fn test_rename_updates_claimant() {
        let mut registry = RoleRegistry::new();
        registry.claim_on_move(&id("a"), "old");

        registry.rename(&id("a"), "new");

        assert_eq!(
            registry.holder(Mark::X),
            Some(&Claimant::Participant {
                id: id("a"),
                name: "new".to_string()
            })
        );
    }

    #[test]
    fn test_attach_automated_evicts_and_reports() {
        let mut registry = RoleRegistry::new();
        registry.claim_explicit(&id("a"), "a", Mark::O).unwrap();

        let evicted = registry.attach_automated(Mark::O);

        assert!(evicted.is_some());
        assert_eq!(registry.holder(Mark::O), Some(&Claimant::Automated));
        assert_eq!(registry.mark_of(&id("a")), None);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut registry = RoleRegistry::new();
        registry.claim_on_move(&id("a"), "a");
        registry.start_match();

        registry.clear();

        assert!(!registry.has(Mark::X));
        assert!(!registry.is_match_started());
        assert_eq!(registry.current_turn(), None);
    }
}
