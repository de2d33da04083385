use std::collections::HashMap;
use std::time::Duration;

use common::games::tictactoe::{Board, Mark, Outcome, Role, evaluate};
use common::proto::{
    ChatHistoryNotification, ChatMessage, CheckedResultNotification, GameStateNotification,
    YouAreNotification, server_message::Message,
};
use common::{ConnectionId, log, log_warn};

use crate::chat_history::ChatHistory;
use super::chat_command::{ChatCommand, HELP_TEXT, parse_chat};
use super::declined::Declined;
use super::effects::{Effects, Timer};
use super::registry::{Claimant, RoleRegistry};
use super::standings::{Side, Standings};

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub auto_move_delay: Duration,
    pub auto_restart_delay: Duration,
    pub automated_name: String,
    pub chat_history_limit: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            auto_move_delay: Duration::from_millis(500),
            auto_restart_delay: Duration::from_millis(3000),
            automated_name: "AI".to_string(),
            chat_history_limit: 100,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutoOpponent {
    pub role: Mark,
    pub human_starts_next: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingPlayers,
    InProgress,
    Resolved,
}

/// A snapshot handed to the search worker. The result is only applied if the
/// session still matches it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub board: Board,
    pub mover: Mark,
}

#[derive(Debug)]
struct Participant {
    display_name: String,
    joined_seq: u64,
}

/// The one shared game. Every method runs to completion and reports what
/// should be sent or scheduled; nothing here touches the network or the clock.
#[derive(Debug)]
pub struct Session {
    board: Board,
    registry: RoleRegistry,
    resolved: bool,
    auto_opponent: Option<AutoOpponent>,
    standings: Standings,
    participants: HashMap<ConnectionId, Participant>,
    next_join_seq: u64,
    chat_history: ChatHistory,
    generation: u64,
    settings: SessionSettings,
}

impl Session {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            board: Board::new(),
            registry: RoleRegistry::new(),
            resolved: false,
            auto_opponent: None,
            standings: Standings::new(),
            participants: HashMap::new(),
            next_join_seq: 0,
            chat_history: ChatHistory::new(settings.chat_history_limit),
            generation: 0,
            settings,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.resolved {
            Phase::Resolved
        } else if self.registry.is_match_started() {
            Phase::InProgress
        } else {
            Phase::AwaitingPlayers
        }
    }

    pub fn role_of(&self, client_id: &ConnectionId) -> Role {
        self.registry
            .mark_of(client_id)
            .map_or(Role::Observer, Role::Player)
    }

    pub fn display_name(&self, client_id: &ConnectionId) -> Option<String> {
        self.participants
            .get(client_id)
            .map(|participant| participant.display_name.clone())
    }

    pub fn connect(&mut self, client_id: &ConnectionId) -> Effects {
        let display_name = client_id.short_name();
        self.participants.insert(
            client_id.clone(),
            Participant {
                display_name: display_name.clone(),
                joined_seq: self.next_join_seq,
            },
        );
        self.next_join_seq += 1;
        log!(
            "Participant {} connected as '{}' ({:?})",
            client_id,
            display_name,
            self.phase()
        );

        let mut effects = Effects::new();
        effects.to_client(client_id, you_are(Role::Observer));
        effects.to_client(
            client_id,
            Message::ChatHistory(ChatHistoryNotification {
                messages: self.chat_history.snapshot(),
            }),
        );
        effects.to_client(client_id, self.game_state_message());
        self.announce(&mut effects, format!("User {} joined the game", display_name));
        effects
    }

    pub fn disconnect(&mut self, client_id: &ConnectionId) -> Effects {
        let mut effects = Effects::new();
        let Some(participant) = self.participants.remove(client_id) else {
            return effects;
        };

        match self.registry.release_participant(client_id) {
            Some(mark) => log!(
                "Participant {} ('{}') disconnected while holding {}",
                client_id,
                participant.display_name,
                mark
            ),
            None => log!("Participant {} ('{}') disconnected", client_id, participant.display_name),
        }
        self.announce(
            &mut effects,
            format!("User {} left the game", participant.display_name),
        );
        effects
    }

    /// Declined moves are only logged; the board click simply does nothing.
    pub fn handle_move(&mut self, client_id: &ConnectionId, cell: usize) -> Effects {
        let mut effects = Effects::new();
        if let Err(declined) = self.try_move(client_id, cell, &mut effects) {
            log!("Move by {} on cell {} declined: {}", client_id, cell, declined);
        }
        effects
    }

    pub fn check(&mut self) -> Effects {
        let mut effects = Effects::new();
        self.check_into(&mut effects);
        effects
    }

    pub fn reset(&mut self) -> Effects {
        let mut effects = Effects::new();
        self.reset_round(&mut effects);
        effects.to_all(self.game_state_message());
        effects
    }

    pub fn handle_chat(&mut self, client_id: &ConnectionId, text: &str) -> Effects {
        let mut effects = Effects::new();
        let Some(name) = self.display_name(client_id) else {
            return effects;
        };

        let result = match parse_chat(text) {
            ChatCommand::Empty => Ok(()),
            ChatCommand::Say(text) => {
                self.say(client_id, &name, text, &mut effects);
                Ok(())
            }
            ChatCommand::Reset => {
                log!("Game reset on /reset command by {}", name);
                self.reset_round(&mut effects);
                self.announce(&mut effects, format!("Game was reset by user {}", name));
                effects.to_all(self.game_state_message());
                Ok(())
            }
            ChatCommand::ClaimRole { mark, name: new_name } => {
                self.claim_role(client_id, mark, new_name, &mut effects)
            }
            ChatCommand::Rename(new_name) => self.rename(client_id, new_name, &mut effects),
            ChatCommand::ListParticipants => {
                notice(&mut effects, client_id, self.participant_listing());
                Ok(())
            }
            ChatCommand::Rank => {
                notice(&mut effects, client_id, self.standings.format_ranking());
                Ok(())
            }
            ChatCommand::ActivateAutomated => self.activate_automated(client_id, &mut effects),
            ChatCommand::StopAutomated => self.stop_automated(client_id, &mut effects),
            ChatCommand::Check => {
                self.check_into(&mut effects);
                Ok(())
            }
            ChatCommand::Help => {
                notice(&mut effects, client_id, HELP_TEXT.to_string());
                Ok(())
            }
            ChatCommand::Unknown(word) => {
                log!("Unknown command '{}' from {}", word, client_id);
                notice(&mut effects, client_id, "Error: Unknown command".to_string());
                Ok(())
            }
        };

        if let Err(declined) = result {
            log!("Command from {} declined: {}", client_id, declined);
            notice(&mut effects, client_id, declined.to_string());
        }
        effects
    }

    /// The snapshot for a due automated move, or `None` when the timer that asked
    /// for it belongs to a finished round.
    pub fn auto_move_request(&self, generation: u64) -> Option<SearchRequest> {
        if generation != self.generation || self.resolved {
            return None;
        }
        let auto = self.auto_opponent?;
        if self.registry.current_turn() != Some(auto.role) {
            return None;
        }
        Some(SearchRequest {
            generation,
            board: self.board,
            mover: auto.role,
        })
    }

    pub fn apply_auto_move(&mut self, request: &SearchRequest, cell: Option<usize>) -> Effects {
        let mut effects = Effects::new();
        if self.auto_move_request(request.generation).as_ref() != Some(request) {
            log!("Ignoring stale automated move for generation {}", request.generation);
            return effects;
        }
        let Some(cell) = cell else {
            log_warn!("Search returned no move for {} on\n{}", request.mover, request.board);
            return effects;
        };
        if let Err(declined) = self.land_move(request.mover, cell, &mut effects) {
            log_warn!("Automated move on cell {} declined: {}", cell, declined);
        }
        effects
    }

    /// Starts the next round against the automated opponent, alternating who opens.
    pub fn restart_round(&mut self, generation: u64) -> Effects {
        let mut effects = Effects::new();
        if generation != self.generation || !self.resolved {
            log!("Ignoring stale restart for generation {}", generation);
            return effects;
        }
        let Some(auto) = self.auto_opponent else {
            return effects;
        };

        let first = if auto.human_starts_next {
            auto.role.opponent()
        } else {
            auto.role
        };
        self.auto_opponent = Some(AutoOpponent {
            human_starts_next: !auto.human_starts_next,
            ..auto
        });
        self.board = Board::new();
        self.resolved = false;
        self.generation += 1;
        self.registry.set_current_turn(Some(first));
        self.registry.start_match();
        log!("New automated round, generation {}, {} opens", self.generation, first);

        self.announce(&mut effects, format!("New round, {} moves first", first));
        effects.to_all(self.game_state_message());
        self.schedule_follow_up(&mut effects);
        effects
    }

    fn try_move(
        &mut self,
        client_id: &ConnectionId,
        cell: usize,
        effects: &mut Effects,
    ) -> Result<(), Declined> {
        if self.resolved {
            return Err(Declined::RoundResolved);
        }
        let name = self
            .display_name(client_id)
            .ok_or(Declined::NoRoleAvailable)?;

        let mark = match self.registry.mark_of(client_id) {
            Some(mark) => mark,
            None => {
                let mark = self
                    .registry
                    .claim_on_move(client_id, &name)
                    .ok_or(Declined::NoRoleAvailable)?;
                effects.to_client(client_id, you_are(Role::Player(mark)));
                self.announce(effects, format!("User {} joined as player {}", name, mark));
                mark
            }
        };

        self.land_move(mark, cell, effects)
    }

    fn land_move(&mut self, mark: Mark, cell: usize, effects: &mut Effects) -> Result<(), Declined> {
        if self.registry.current_turn().is_some_and(|turn| turn != mark) {
            return Err(Declined::NotYourTurn);
        }
        self.board.apply_move(cell, mark)?;
        self.registry.advance_turn(mark);
        self.registry.start_match();

        let outcome = evaluate(&self.board);
        if outcome.is_terminal() {
            let first_report = self.resolve(&outcome);
            self.push_outcome(&outcome, first_report, effects);
        }
        effects.to_all(self.game_state_message());
        self.schedule_follow_up(effects);
        Ok(())
    }

    fn check_into(&mut self, effects: &mut Effects) {
        let outcome = evaluate(&self.board);
        let first_report = self.resolve(&outcome);
        if first_report {
            self.schedule_follow_up(effects);
        }
        self.push_outcome(&outcome, first_report, effects);
    }

    /// Records the round exactly once; later calls for the same round are no-ops.
    fn resolve(&mut self, outcome: &Outcome) -> bool {
        if self.resolved || !outcome.is_terminal() {
            return false;
        }
        self.resolved = true;

        let x_side = self.side_of(Mark::X);
        let o_side = self.side_of(Mark::O);
        let counted = self.standings.record_round(&x_side, &o_side, outcome);
        log!(
            "Round resolved: {:?} (X: {:?}, O: {:?}, counted: {})",
            outcome,
            x_side,
            o_side,
            counted
        );
        true
    }

    fn side_of(&self, mark: Mark) -> Side {
        match self.registry.holder(mark) {
            Some(Claimant::Participant { name, .. }) => Side::Named(name.clone()),
            Some(Claimant::Automated) => Side::Automated(self.settings.automated_name.clone()),
            None => Side::Empty,
        }
    }

    /// Repeat reports of an already resolved round are broadcast but kept out of
    /// the chat history.
    fn push_outcome(&mut self, outcome: &Outcome, first_report: bool, effects: &mut Effects) {
        let text = match outcome {
            Outcome::Won { mark, .. } => Some(format!("Player {} wins!", mark)),
            Outcome::Draw => Some("Draw!".to_string()),
            Outcome::InProgress => None,
        };
        if let Some(text) = text {
            let message = ChatMessage {
                speaker_label: String::new(),
                text,
            };
            if first_report {
                self.broadcast_chat(effects, message);
            } else {
                effects.to_all(Message::Chat(message));
            }
        }
        effects.to_all(self.checked_result_message(outcome));
    }

    fn schedule_follow_up(&self, effects: &mut Effects) {
        let Some(auto) = self.auto_opponent else {
            return;
        };
        if self.resolved {
            effects.schedule(Timer::Restart {
                generation: self.generation,
                delay: self.settings.auto_restart_delay,
            });
        } else if self.registry.current_turn() == Some(auto.role) {
            effects.schedule(Timer::AutoMove {
                generation: self.generation,
                delay: self.settings.auto_move_delay,
            });
        }
    }

    fn reset_round(&mut self, effects: &mut Effects) {
        let demoted: Vec<ConnectionId> = [Mark::X, Mark::O]
            .into_iter()
            .filter_map(|mark| self.registry.holder(mark))
            .filter_map(Claimant::participant_id)
            .filter(|id| self.participants.contains_key(*id))
            .cloned()
            .collect();

        self.board = Board::new();
        self.resolved = false;
        self.registry.clear();
        self.auto_opponent = None;
        self.generation += 1;
        log!("Round reset, generation {}", self.generation);

        for client_id in &demoted {
            effects.to_client(client_id, you_are(Role::Observer));
        }
    }

    fn claim_role(
        &mut self,
        client_id: &ConnectionId,
        mark: Mark,
        new_name: Option<&str>,
        effects: &mut Effects,
    ) -> Result<(), Declined> {
        if self.registry.is_match_started() {
            return Err(Declined::MatchStarted);
        }
        if let Some(new_name) = new_name {
            self.ensure_name_available(new_name)?;
            self.set_display_name(client_id, new_name);
        }
        let name = self
            .display_name(client_id)
            .ok_or(Declined::NoRoleAvailable)?;

        let claim = self.registry.claim_explicit(client_id, &name, mark)?;
        if let Some(evicted) = claim.evicted {
            self.announce_eviction(evicted, claim.mark, effects);
        }
        effects.to_client(client_id, you_are(Role::Player(claim.mark)));
        self.announce(effects, format!("User {} joined as player {}", name, claim.mark));
        Ok(())
    }

    fn activate_automated(
        &mut self,
        client_id: &ConnectionId,
        effects: &mut Effects,
    ) -> Result<(), Declined> {
        if self.auto_opponent.is_some() {
            return Err(Declined::AutomatedAlreadyActive);
        }
        if self.registry.is_match_started() {
            return Err(Declined::MatchStarted);
        }
        let name = self
            .display_name(client_id)
            .ok_or(Declined::NoRoleAvailable)?;

        let human_mark = self
            .registry
            .mark_of(client_id)
            .or_else(|| {
                [Mark::X, Mark::O]
                    .into_iter()
                    .find(|&mark| !self.registry.has(mark))
            })
            .unwrap_or(Mark::X);
        let auto_mark = human_mark.opponent();

        let claim = self.registry.claim_explicit(client_id, &name, human_mark)?;
        if let Some(evicted) = claim.evicted {
            self.announce_eviction(evicted, human_mark, effects);
        }
        if let Some(evicted) = self.registry.attach_automated(auto_mark) {
            self.announce_eviction(evicted, auto_mark, effects);
        }

        self.auto_opponent = Some(AutoOpponent {
            role: auto_mark,
            human_starts_next: true,
        });
        self.registry.set_current_turn(Some(auto_mark));
        self.registry.start_match();
        log!("{} started a game against the AI, AI plays {}", name, auto_mark);

        effects.to_client(client_id, you_are(Role::Player(human_mark)));
        self.announce(
            effects,
            format!(
                "User {} plays {} against {} ({})",
                name, human_mark, self.settings.automated_name, auto_mark
            ),
        );
        effects.to_all(self.game_state_message());
        self.schedule_follow_up(effects);
        Ok(())
    }

    fn stop_automated(
        &mut self,
        client_id: &ConnectionId,
        effects: &mut Effects,
    ) -> Result<(), Declined> {
        if self.auto_opponent.is_none() {
            return Err(Declined::AutomatedNotActive);
        }
        let name = self.display_name(client_id).unwrap_or_default();

        self.reset_round(effects);
        self.announce(
            effects,
            format!("User {} stopped the game against {}", name, self.settings.automated_name),
        );
        effects.to_all(self.game_state_message());
        Ok(())
    }

    fn announce_eviction(&mut self, evicted: Claimant, mark: Mark, effects: &mut Effects) {
        let name = match evicted {
            Claimant::Participant { id, name } => {
                if self.participants.contains_key(&id) {
                    effects.to_client(&id, you_are(Role::Observer));
                }
                name
            }
            Claimant::Automated => self.settings.automated_name.clone(),
        };
        self.announce(effects, format!("User {} lost role {}", name, mark));
    }

    fn rename(
        &mut self,
        client_id: &ConnectionId,
        new_name: &str,
        effects: &mut Effects,
    ) -> Result<(), Declined> {
        self.ensure_name_available(new_name)?;
        let Some(old_name) = self.display_name(client_id) else {
            return Ok(());
        };
        if old_name == new_name {
            return Ok(());
        }
        self.set_display_name(client_id, new_name);
        self.announce(effects, format!("{} is now {}", old_name, new_name));
        Ok(())
    }

    /// The automated opponent's name keys its standings row; nobody else may take it.
    fn ensure_name_available(&self, name: &str) -> Result<(), Declined> {
        if name.eq_ignore_ascii_case(&self.settings.automated_name) {
            return Err(Declined::NameReserved);
        }
        Ok(())
    }

    fn set_display_name(&mut self, client_id: &ConnectionId, new_name: &str) {
        let Some(participant) = self.participants.get_mut(client_id) else {
            return;
        };
        if participant.display_name.eq_ignore_ascii_case(new_name) {
            return;
        }
        participant.display_name = new_name.to_string();
        self.registry.rename(client_id, new_name);
    }

    fn participant_listing(&self) -> String {
        let mut participants: Vec<(&ConnectionId, &Participant)> = self.participants.iter().collect();
        participants.sort_by_key(|(_, participant)| participant.joined_seq);

        let names: Vec<String> = participants
            .into_iter()
            .map(|(client_id, participant)| match self.registry.mark_of(client_id) {
                Some(mark) => format!("{} ({})", participant.display_name, mark),
                None => participant.display_name.clone(),
            })
            .collect();
        format!("Online users: {}", names.join(", "))
    }

    fn say(&mut self, client_id: &ConnectionId, name: &str, text: &str, effects: &mut Effects) {
        let speaker_label = match self.role_of(client_id).mark() {
            Some(mark) => format!("{} ({})", name, mark),
            None => name.to_string(),
        };
        self.broadcast_chat(
            effects,
            ChatMessage {
                speaker_label,
                text: text.to_string(),
            },
        );
    }

    fn announce(&mut self, effects: &mut Effects, text: String) {
        self.broadcast_chat(
            effects,
            ChatMessage {
                speaker_label: String::new(),
                text,
            },
        );
    }

    fn broadcast_chat(&mut self, effects: &mut Effects, message: ChatMessage) {
        self.chat_history.record(message.clone());
        effects.to_all(Message::Chat(message));
    }

    fn game_state_message(&self) -> Message {
        Message::GameState(GameStateNotification {
            board: self.board.to_proto(),
            current_turn: Mark::option_to_proto(self.registry.current_turn()),
        })
    }

    fn checked_result_message(&self, outcome: &Outcome) -> Message {
        Message::CheckedResult(CheckedResultNotification {
            board: self.board.to_proto(),
            current_turn: Mark::option_to_proto(self.registry.current_turn()),
            outcome: outcome.to_proto(),
            winning_line: outcome
                .winning_line()
                .map(|line| line.iter().map(|&cell| cell as u32).collect())
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
impl Session {
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Option<Mark> {
        self.registry.current_turn()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn auto_opponent(&self) -> Option<AutoOpponent> {
        self.auto_opponent
    }

    pub fn standings(&self) -> &Standings {
        &self.standings
    }
}

fn you_are(role: Role) -> Message {
    Message::YouAre(YouAreNotification {
        role: role.to_proto(),
    })
}

fn notice(effects: &mut Effects, client_id: &ConnectionId, text: String) {
    effects.to_client(
        client_id,
        Message::Chat(ChatMessage {
            speaker_label: String::new(),
            text,
        }),
    );
}
