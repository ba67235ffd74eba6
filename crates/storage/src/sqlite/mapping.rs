use std::collections::BTreeMap;

use assess_core::model::{
    AttemptId, AttemptOutcome, AttemptResult, CodingProblem, ItemId, Language, McqOption,
    McqQuestion, ParagraphPrompt, TestCase, TestType,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn item_id_to_i64(id: ItemId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("item id overflow".into()))
}

pub(crate) fn item_id_from_i64(v: i64) -> Result<ItemId, StorageError> {
    u64::try_from(v)
        .map(ItemId::new)
        .map_err(|_| StorageError::Serialization("item id sign overflow".into()))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn u8_from_i64(field: &'static str, v: i64) -> Result<u8, StorageError> {
    u8::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn map_mcq_row(row: &SqliteRow) -> Result<McqQuestion, StorageError> {
    let correct: String = row.try_get("correct_answer").map_err(ser)?;
    McqQuestion::new(
        item_id_from_i64(row.try_get("id").map_err(ser)?)?,
        row.try_get::<String, _>("question").map_err(ser)?,
        [
            row.try_get("option_a").map_err(ser)?,
            row.try_get("option_b").map_err(ser)?,
            row.try_get("option_c").map_err(ser)?,
            row.try_get("option_d").map_err(ser)?,
        ],
        McqOption::from_letter(&correct).map_err(ser)?,
    )
    .map_err(ser)
}

/// Starter code is stored as a JSON object keyed by language slug.
pub(crate) fn starter_code_to_json(
    starter: &BTreeMap<Language, String>,
) -> Result<String, StorageError> {
    serde_json::to_string(starter).map_err(ser)
}

pub(crate) fn test_cases_to_json(cases: &[TestCase]) -> Result<String, StorageError> {
    serde_json::to_string(cases).map_err(ser)
}

pub(crate) fn map_coding_row(row: &SqliteRow) -> Result<CodingProblem, StorageError> {
    let starter_json: String = row.try_get("starter_code").map_err(ser)?;
    let cases_json: String = row.try_get("test_cases").map_err(ser)?;
    let starter: BTreeMap<Language, String> = serde_json::from_str(&starter_json).map_err(ser)?;
    let cases: Vec<TestCase> = serde_json::from_str(&cases_json).map_err(ser)?;

    CodingProblem::new(
        item_id_from_i64(row.try_get("id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("prompt").map_err(ser)?,
        starter,
        cases,
    )
    .map_err(ser)
}

pub(crate) fn map_paragraph_row(row: &SqliteRow) -> Result<ParagraphPrompt, StorageError> {
    ParagraphPrompt::new(
        item_id_from_i64(row.try_get("id").map_err(ser)?)?,
        row.try_get::<String, _>("prompt").map_err(ser)?,
        u32_from_i64("word_limit", row.try_get("word_limit").map_err(ser)?)?,
    )
    .map_err(ser)
}

pub(crate) fn map_result_row(row: &SqliteRow) -> Result<AttemptResult, StorageError> {
    let attempt_id: String = row.try_get("attempt_id").map_err(ser)?;
    let test_type: String = row.try_get("test_type").map_err(ser)?;
    let outcome: String = row.try_get("outcome").map_err(ser)?;

    Ok(AttemptResult {
        attempt_id: attempt_id.parse::<AttemptId>().map_err(ser)?,
        test_type: test_type.parse::<TestType>().map_err(ser)?,
        score: u8_from_i64("score", row.try_get("score").map_err(ser)?)?,
        total_items: u32_from_i64("total_items", row.try_get("total_items").map_err(ser)?)?,
        answered: u32_from_i64("answered", row.try_get("answered").map_err(ser)?)?,
        skipped: u32_from_i64("skipped", row.try_get("skipped").map_err(ser)?)?,
        violation_count: u8_from_i64(
            "violation_count",
            row.try_get("violation_count").map_err(ser)?,
        )?,
        outcome: outcome.parse::<AttemptOutcome>().map_err(ser)?,
        elapsed_secs: u32_from_i64("elapsed_secs", row.try_get("elapsed_secs").map_err(ser)?)?,
        started_at: row.try_get("started_at").map_err(ser)?,
        finished_at: row.try_get("finished_at").map_err(ser)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_ids_reject_negative_rows() {
        assert!(item_id_from_i64(-1).is_err());
        assert_eq!(item_id_from_i64(7).unwrap(), ItemId::new(7));
        assert_eq!(item_id_to_i64(ItemId::new(7)).unwrap(), 7);
        assert!(item_id_to_i64(ItemId::new(u64::MAX)).is_err());
    }

    #[test]
    fn starter_code_json_uses_language_slugs() {
        let mut starter = BTreeMap::new();
        starter.insert(Language::Cpp, "int main() {}".to_string());
        starter.insert(Language::JavaScript, "// js".to_string());
        let json = starter_code_to_json(&starter).unwrap();
        assert!(json.contains("\"cpp\""));
        assert!(json.contains("\"javascript\""));
    }
}
