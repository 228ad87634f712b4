use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use strum_macros::Display;

static SNIPPET_DIR: Dir = include_dir!("src/snippets");

/// Difficulty tier a snippet belongs to. Selectable from the CLI and the
/// config file; locked while a session is active (enforced by the app,
/// which refuses tier changes mid-run).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    fn file_name(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner.json",
            Difficulty::Intermediate => "intermediate.json",
            Difficulty::Advanced => "advanced.json",
        }
    }
}

/// A code sample to reproduce. Loaded once from the embedded bank and
/// never mutated.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Snippet {
    pub language: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
struct TierFile {
    tier: String,
    snippets: Vec<Snippet>,
}

/// The embedded snippet bank, one non-empty list per difficulty tier.
#[derive(Clone, Debug)]
pub struct SnippetBank {
    tiers: [Vec<Snippet>; 3],
}

impl SnippetBank {
    /// Load the bank compiled into the binary. Embedded assets are
    /// build-time data, so malformed files panic here rather than
    /// surfacing a runtime error path nobody can act on.
    pub fn load() -> Self {
        Self {
            tiers: Difficulty::ALL.map(load_tier),
        }
    }

    pub fn tier(&self, difficulty: Difficulty) -> &[Snippet] {
        &self.tiers[difficulty as usize]
    }

    /// Snippet at `index`, wrapping past the end of the tier so cycling
    /// with a bare increment is safe.
    pub fn get(&self, difficulty: Difficulty, index: usize) -> &Snippet {
        let tier = self.tier(difficulty);
        &tier[index % tier.len()]
    }

    pub fn random(&self, difficulty: Difficulty) -> &Snippet {
        let tier = self.tier(difficulty);
        tier.choose(&mut rand::thread_rng())
            .expect("snippet tiers are never empty")
    }

    pub fn len(&self, difficulty: Difficulty) -> usize {
        self.tier(difficulty).len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.iter().all(|tier| tier.is_empty())
    }
}

fn load_tier(difficulty: Difficulty) -> Vec<Snippet> {
    let file = SNIPPET_DIR
        .get_file(difficulty.file_name())
        .expect("snippet tier file not found");

    let contents = file
        .contents_utf8()
        .expect("snippet tier file is not valid utf-8");

    let tier: TierFile = from_str(contents).expect("unable to deserialize snippet tier json");
    assert_eq!(tier.tier, difficulty.to_string(), "tier file mislabeled");
    assert!(!tier.snippets.is_empty(), "snippet tier must not be empty");

    tier.snippets
}
