use std::fmt;

use crate::classify::WasteCategory;
use crate::console;
use crate::premium::PremiumFlag;
use crate::score::{RankedScore, ScoreTable};
use crate::storage::KeyValueStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    username: String,
    total_points: u32,
    waste_history: Vec<WasteCategory>,
}

impl Session {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    pub fn waste_history(&self) -> &[WasteCategory] {
        &self.waste_history
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Active(Session),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    EmptyUsername,
    AlreadyLoggedIn,
    NotLoggedIn,
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::EmptyUsername => write!(f, "Please enter your name first!"),
            GameError::AlreadyLoggedIn => write!(f, "already logged in"),
            GameError::NotLoggedIn => write!(f, "no active session"),
        }
    }
}

impl std::error::Error for GameError {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOutcome {
    pub earned: u32,
    pub total_points: u32,
}

pub struct Game<S> {
    store: S,
    scores: ScoreTable,
    premium: PremiumFlag,
    state: SessionState,
}

impl<S: KeyValueStore> Game<S> {
    pub fn load(store: S) -> Self {
        let scores = ScoreTable::load(&store);
        let premium = PremiumFlag::load(&store);
        Self {
            store,
            scores,
            premium,
            state: SessionState::LoggedOut,
        }
    }

    pub fn scores(&self) -> &ScoreTable {
        &self.scores
    }

    pub fn ranking(&self) -> Vec<RankedScore<'_>> {
        self.scores.ranking()
    }

    pub fn premium(&self) -> PremiumFlag {
        self.premium
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            SessionState::Active(session) => Some(session),
            SessionState::LoggedOut => None,
        }
    }

    pub fn login(&mut self, raw_username: &str) -> Result<&Session, GameError> {
        if matches!(self.state, SessionState::Active(_)) {
            return Err(GameError::AlreadyLoggedIn);
        }
        let username = raw_username.trim();
        if username.is_empty() {
            return Err(GameError::EmptyUsername);
        }

        let (total_points, inserted) = self.scores.ensure(username);
        if inserted {
            self.persist_scores();
        }
        console::info(&format!("login {username} ({total_points} pts)"));

        self.state = SessionState::Active(Session {
            username: username.to_string(),
            total_points,
            waste_history: Vec::new(),
        });
        match &self.state {
            SessionState::Active(session) => Ok(session),
            SessionState::LoggedOut => Err(GameError::NotLoggedIn),
        }
    }

    pub fn scan(&mut self, category: WasteCategory) -> Result<ScanOutcome, GameError> {
        let earned = self.premium.multiplier();
        let SessionState::Active(session) = &mut self.state else {
            return Err(GameError::NotLoggedIn);
        };
        session.total_points = session.total_points.saturating_add(earned);
        session.waste_history.push(category);
        let total_points = session.total_points;
        self.scores.set(&session.username, total_points);
        self.persist_scores();
        Ok(ScanOutcome {
            earned,
            total_points,
        })
    }

    pub fn reset(&mut self) -> Result<(), GameError> {
        let SessionState::Active(session) = &mut self.state else {
            return Err(GameError::NotLoggedIn);
        };
        session.total_points = 0;
        session.waste_history.clear();
        self.scores.set(&session.username, 0);
        self.persist_scores();
        Ok(())
    }

    pub fn toggle_premium(&mut self) -> PremiumFlag {
        self.premium.toggle(&self.store);
        self.premium
    }

    fn persist_scores(&self) {
        if let Err(err) = self.scores.persist(&self.store) {
            console::warn(&format!("could not save scores: {err}"));
        }
    }
}
