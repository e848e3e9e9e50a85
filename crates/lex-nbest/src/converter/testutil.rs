#![cfg(test)]

use crate::dict::connection::ConnectionMatrix;
use crate::dict::{DictEntry, TrieDictionary, PosRole};

fn entry(surface: &str, cost: i16, id: u16) -> DictEntry {
    DictEntry {
        surface: surface.to_string(),
        cost,
        left_id: id,
        right_id: id,
    }
}

/// Shared test dictionary for converter tests.
///
/// Contains entries for a representative set of words used across
/// lattice and viterbi tests.
pub fn test_dict() -> TrieDictionary {
    let entries = vec![
        (
            "きょう".to_string(),
            vec![entry("今日", 3000, 100), entry("京", 5000, 101)],
        ),
        ("は".to_string(), vec![entry("は", 2000, 200)]),
        ("いい".to_string(), vec![entry("良い", 3500, 300)]),
        ("てんき".to_string(), vec![entry("天気", 4000, 400)]),
        ("き".to_string(), vec![entry("木", 4500, 500)]),
        ("い".to_string(), vec![entry("胃", 6000, 600)]),
        ("てん".to_string(), vec![entry("天", 5000, 700)]),
        ("です".to_string(), vec![entry("です", 2500, 800)]),
        ("ね".to_string(), vec![entry("ね", 2000, 900)]),
        ("わたし".to_string(), vec![entry("私", 3000, 1000)]),
        ("がくせい".to_string(), vec![entry("学生", 4000, 1100)]),
    ];
    TrieDictionary::from_entries(entries)
}

fn zero_matrix_text(num_ids: u16) -> String {
    let n = num_ids as usize;
    format!("{num_ids} {num_ids}\n{}", "0\n".repeat(n * n))
}

/// Create a zero-cost connection matrix with the given function-word ID range.
pub fn zero_conn_with_fw(num_ids: u16, fw_min: u16, fw_max: u16) -> ConnectionMatrix {
    ConnectionMatrix::from_text_with_roles(&zero_matrix_text(num_ids), fw_min, fw_max, Vec::new())
        .unwrap()
}

/// Create a zero-cost connection matrix carrying a role byte per class id.
pub fn zero_conn_with_roles(num_ids: u16, roles: Vec<u8>) -> ConnectionMatrix {
    ConnectionMatrix::from_text_with_roles(&zero_matrix_text(num_ids), 0, 0, roles).unwrap()
}

// Class ids of the scenario fixtures.
pub const NOUN: u16 = 1;
pub const FUNCTION: u16 = 2;
pub const SUFFIX: u16 = 3;
pub const VERB: u16 = 4;
pub const PRONOUN: u16 = 5;
pub const PERSON: u16 = 6;

/// Zero-cost matrix whose role table matches the scenario class ids.
pub fn scenario_conn() -> ConnectionMatrix {
    let mut roles = vec![PosRole::ContentWord.as_u8(); 8];
    roles[FUNCTION as usize] = PosRole::FunctionWord.as_u8();
    roles[SUFFIX as usize] = PosRole::Suffix.as_u8();
    roles[VERB as usize] = PosRole::Conjugating.as_u8();
    roles[PRONOUN as usize] = PosRole::Pronoun.as_u8();
    roles[PERSON as usize] = PosRole::PersonName.as_u8();
    zero_conn_with_roles(8, roles)
}

/// Dictionary covering the scenario keys:
/// - しんこう|する
/// - わたしのなまえはなかのです
/// - とうきょうかなごやにいきたい
pub fn scenario_dict() -> TrieDictionary {
    let entries = vec![
        (
            "しんこう".to_string(),
            vec![
                entry("進行", 1000, NOUN),
                entry("信仰", 2000, NOUN),
                entry("深耕", 3000, NOUN),
            ],
        ),
        ("する".to_string(), vec![entry("する", 500, SUFFIX)]),
        ("わたし".to_string(), vec![entry("私", 1000, PRONOUN)]),
        ("の".to_string(), vec![entry("の", 100, FUNCTION)]),
        ("なまえ".to_string(), vec![entry("名前", 1000, NOUN)]),
        ("は".to_string(), vec![entry("は", 100, FUNCTION)]),
        (
            "なかの".to_string(),
            vec![entry("中野", 1000, PERSON), entry("仲野", 2000, NOUN)],
        ),
        ("です".to_string(), vec![entry("です", 100, FUNCTION)]),
        ("とうきょう".to_string(), vec![entry("東京", 1000, NOUN)]),
        ("か".to_string(), vec![entry("か", 100, FUNCTION)]),
        ("なごや".to_string(), vec![entry("名古屋", 1000, NOUN)]),
        ("に".to_string(), vec![entry("に", 100, FUNCTION)]),
        ("いき".to_string(), vec![entry("行き", 1000, VERB)]),
        ("たい".to_string(), vec![entry("たい", 100, FUNCTION)]),
    ];
    TrieDictionary::from_entries(entries)
}
