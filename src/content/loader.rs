use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::definition::{
    build_question_set, index_tests, RawNpc, RawNpcsFile, RawQuestionFile, RawTestsFile, TestDefinition,
};
use crate::config::{FlavorNpcConfig, GameConfig};
use crate::error::{GameError, GameResult};
use crate::game::Npc;
use crate::quiz::{QuestionSet, TestKind};

/// Source of tests, NPCs and question sets. Read once per screen construction.
pub trait ContentLoader {
    fn load_tests(&self) -> GameResult<BTreeMap<u32, TestDefinition>>;

    /// Data-driven NPCs followed by the configured flavor NPCs
    fn load_npcs(&self) -> GameResult<Vec<Npc>>;

    fn load_questions(&self, kind: TestKind, content_ref: &str) -> GameResult<QuestionSet>;
}

fn read_file(path: &Path) -> GameResult<String> {
    std::fs::read_to_string(path).map_err(|e| GameError::io(path, e))
}

fn from_toml<T: DeserializeOwned>(content: &str, source: &Path) -> GameResult<T> {
    toml::from_str(content).map_err(|e| GameError::parse(source, e))
}

/// Parse `tests.toml` contents
pub fn parse_tests(content: &str, source: &Path) -> GameResult<BTreeMap<u32, TestDefinition>> {
    let raw: RawTestsFile = from_toml(content, source)?;
    let tests = index_tests(raw.tests.into_iter().map(TestDefinition::from_raw).collect())?;
    log::info!("Loaded {} test definitions from {:?}", tests.len(), source);
    Ok(tests)
}

/// Parse `npcs.toml` contents and append the configured flavor NPCs
pub fn parse_npcs(content: Option<&str>, source: &Path, flavor_npcs: &[FlavorNpcConfig]) -> GameResult<Vec<Npc>> {
    let mut npcs: Vec<Npc> = match content {
        Some(content) => {
            let raw: RawNpcsFile = from_toml(content, source)?;
            raw.npcs.iter().map(RawNpc::to_npc).collect()
        }
        None => {
            log::warn!("No NPC file at {:?}", source);
            Vec::new()
        }
    };
    let data_count = npcs.len();
    npcs.extend(flavor_npcs.iter().map(FlavorNpcConfig::to_npc));
    log::info!("Loaded {} NPCs ({} from data, {} flavor)", npcs.len(), data_count, npcs.len() - data_count);
    Ok(npcs)
}

/// Parse a `questions/<content>.toml` file as the given shape
pub fn parse_questions(kind: TestKind, content_ref: &str, content: &str, source: &Path) -> GameResult<QuestionSet> {
    let raw: RawQuestionFile = from_toml(content, source)?;
    let set = build_question_set(kind, raw.questions, content_ref)?;
    log::info!("Loaded {} {} questions from {:?}", set.len(), kind.label(), source);
    Ok(set)
}

/// Relative location of a question set under the data directory
pub fn question_file(content_ref: &str) -> PathBuf {
    Path::new("questions").join(format!("{}.toml", content_ref))
}

/// TOML files under a data directory, read on demand
#[derive(Debug, Clone)]
pub struct DirectoryContent {
    data_dir: PathBuf,
    flavor_npcs: Vec<FlavorNpcConfig>,
}

impl DirectoryContent {
    pub fn new(data_dir: impl Into<PathBuf>, flavor_npcs: Vec<FlavorNpcConfig>) -> Self {
        Self {
            data_dir: data_dir.into(),
            flavor_npcs,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.data_dir.clone(), config.flavor_npcs.clone())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl ContentLoader for DirectoryContent {
    fn load_tests(&self) -> GameResult<BTreeMap<u32, TestDefinition>> {
        let path = self.data_dir.join("tests.toml");
        parse_tests(&read_file(&path)?, &path)
    }

    fn load_npcs(&self) -> GameResult<Vec<Npc>> {
        let path = self.data_dir.join("npcs.toml");
        let content = if path.exists() { Some(read_file(&path)?) } else { None };
        parse_npcs(content.as_deref(), &path, &self.flavor_npcs)
    }

    fn load_questions(&self, kind: TestKind, content_ref: &str) -> GameResult<QuestionSet> {
        let path = self.data_dir.join(question_file(content_ref));
        parse_questions(kind, content_ref, &read_file(&path)?, &path)
    }
}

/// Content held in memory, for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryContent {
    tests: BTreeMap<u32, TestDefinition>,
    npcs: Vec<Npc>,
    questions: HashMap<String, QuestionSet>,
}

impl MemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_test(mut self, test: TestDefinition, questions: QuestionSet) -> Self {
        self.questions.insert(test.content.clone(), questions);
        self.tests.insert(test.id, test);
        self
    }

    pub fn with_npc(mut self, npc: Npc) -> Self {
        self.npcs.push(npc);
        self
    }

    pub fn with_npcs(mut self, npcs: Vec<Npc>) -> Self {
        self.npcs.extend(npcs);
        self
    }
}

impl ContentLoader for MemoryContent {
    fn load_tests(&self) -> GameResult<BTreeMap<u32, TestDefinition>> {
        index_tests(self.tests.values().cloned().collect())
    }

    fn load_npcs(&self) -> GameResult<Vec<Npc>> {
        Ok(self.npcs.clone())
    }

    fn load_questions(&self, kind: TestKind, content_ref: &str) -> GameResult<QuestionSet> {
        let set = self
            .questions
            .get(content_ref)
            .cloned()
            .ok_or_else(|| GameError::malformed(content_ref, "no such question set"))?;
        if set.kind() != kind {
            return Err(GameError::malformed(
                content_ref,
                format!("expected {} questions, found {}", kind.label(), set.kind().label()),
            ));
        }
        if set.is_empty() {
            return Err(GameError::malformed(content_ref, "question set is empty"));
        }
        Ok(set)
    }
}
