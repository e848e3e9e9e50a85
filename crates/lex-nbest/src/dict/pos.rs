use std::fmt;
use std::str::FromStr;

/// Coarse part-of-speech role of a class id, used for segment boundaries.
///
/// The numeric values match the role bytes stored alongside a
/// `ConnectionMatrix`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PosRole {
    /// Nouns and other non-conjugating independent words.
    #[default]
    ContentWord = 0,
    /// 助詞 / 助動詞
    FunctionWord = 1,
    /// 接尾
    Suffix = 2,
    /// 接頭詞
    Prefix = 3,
    /// 非自立
    NonIndependent = 4,
    /// 代名詞
    Pronoun = 5,
    /// 固有名詞,人名
    PersonName = 6,
    /// Conjugating independent words (用言: verb and adjective stems).
    Conjugating = 7,
}

impl PosRole {
    pub fn from_u8(b: u8) -> Self {
        match b {
            1 => PosRole::FunctionWord,
            2 => PosRole::Suffix,
            3 => PosRole::Prefix,
            4 => PosRole::NonIndependent,
            5 => PosRole::Pronoun,
            6 => PosRole::PersonName,
            7 => PosRole::Conjugating,
            _ => PosRole::ContentWord,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Noun-like words after which a trailing functional tail can be trimmed.
    pub fn is_content_noun(self) -> bool {
        matches!(
            self,
            PosRole::ContentWord | PosRole::Pronoun | PosRole::PersonName
        )
    }

    /// Words that never start a segment of their own.
    pub fn attaches_to_previous(self) -> bool {
        matches!(
            self,
            PosRole::FunctionWord | PosRole::Suffix | PosRole::NonIndependent
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            PosRole::ContentWord => "content",
            PosRole::FunctionWord => "function",
            PosRole::Suffix => "suffix",
            PosRole::Prefix => "prefix",
            PosRole::NonIndependent => "non_independent",
            PosRole::Pronoun => "pronoun",
            PosRole::PersonName => "person_name",
            PosRole::Conjugating => "conjugating",
        }
    }
}

impl fmt::Display for PosRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PosRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(PosRole::ContentWord),
            "function" => Ok(PosRole::FunctionWord),
            "suffix" => Ok(PosRole::Suffix),
            "prefix" => Ok(PosRole::Prefix),
            "non_independent" => Ok(PosRole::NonIndependent),
            "pronoun" => Ok(PosRole::Pronoun),
            "person_name" => Ok(PosRole::PersonName),
            "conjugating" => Ok(PosRole::Conjugating),
            other => Err(format!("unknown POS role: {other}")),
        }
    }
}

/// Class id → role table consumed by the boundary policy.
pub trait PosTable: Send + Sync {
    fn pos_role(&self, id: u16) -> PosRole;
}
