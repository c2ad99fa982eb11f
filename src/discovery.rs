//! Session file discovery
//!
//! Session files are named `<type>-<x>-<phase>-<y>-<ca>-<peer>-<location>.dtx`,
//! for example `cog-01-base-a-albert-lydia-indoor.dtx`. Only the type, phase,
//! pair and location fields are interpreted.

use crate::error::ScoreError;
use crate::types::{Location, ParticipantPair, Phase, ScenarioGroup, SessionType};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of session record files
pub const SESSION_EXTENSION: &str = "dtx";

const FIELD_COUNT: usize = 7;

/// Source of session files for a pair and scenario group
pub trait SessionSource {
    /// Paths of every session file recorded for `pair` under `group`
    fn sessions_for(&self, pair: &ParticipantPair, group: &ScenarioGroup) -> Vec<PathBuf>;
}

/// Grouping fields decoded from a session filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFileName {
    pub path: PathBuf,
    pub group: ScenarioGroup,
    pub pair: ParticipantPair,
}

impl SessionFileName {
    /// Decode a session filename; `None` if it does not follow the convention
    pub fn parse(path: &Path) -> Option<Self> {
        if !is_session_extension(path) {
            return None;
        }

        let stem = path.file_stem()?.to_str()?;
        let fields: Vec<&str> = stem.split('-').collect();
        if fields.len() != FIELD_COUNT {
            return None;
        }

        let session_type = SessionType::from_code(fields[0])?;
        let phase = Phase::from_code(fields[2])?;
        let location = Location::from_code(fields[6])?;

        Some(Self {
            path: path.to_path_buf(),
            group: ScenarioGroup::new(session_type, location, phase),
            pair: ParticipantPair::new(fields[4], fields[5]),
        })
    }
}

fn is_session_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(SESSION_EXTENSION)
}

/// Index of the session files in one data directory
#[derive(Debug, Clone, Default)]
pub struct SessionIndex {
    sessions: Vec<SessionFileName>,
}

impl SessionIndex {
    /// Scan a directory (non-recursively) for session files
    pub fn scan(dir: &Path) -> Result<Self, ScoreError> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let index = Self::from_paths(paths);
        log::info!(
            "indexed {} session files in {}",
            index.len(),
            dir.display()
        );
        Ok(index)
    }

    /// Build an index from a list of paths, skipping non-conforming names
    pub fn from_paths<I>(paths: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut sessions = Vec::new();
        for path in paths {
            match SessionFileName::parse(&path) {
                Some(session) => sessions.push(session),
                None if is_session_extension(&path) => {
                    log::warn!("ignoring {}: name does not follow the session convention", path.display())
                }
                None => log::debug!("skipping {}: not a session file", path.display()),
            }
        }
        Self { sessions }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn sessions(&self) -> &[SessionFileName] {
        &self.sessions
    }

    /// Sorted list of distinct (ca, peer) pairs
    pub fn unique_pairs(&self) -> Vec<ParticipantPair> {
        self.sessions
            .iter()
            .map(|s| s.pair.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl SessionSource for SessionIndex {
    fn sessions_for(&self, pair: &ParticipantPair, group: &ScenarioGroup) -> Vec<PathBuf> {
        self.sessions
            .iter()
            .filter(|s| &s.pair == pair && &s.group == group)
            .map(|s| s.path.clone())
            .collect()
    }
}
