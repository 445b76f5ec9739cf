use super::normalizer::normalize_label;
use crate::workflows::assessment::ClinicalField;
use serde::{Deserialize, Deserializer};
use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FindingKind {
    Tender,
    Swollen,
    Clinical(ClinicalField),
}

#[derive(Debug)]
pub(crate) struct FindingRecord {
    pub(crate) line: u64,
    pub(crate) finding: String,
    pub(crate) kind: Option<FindingKind>,
    pub(crate) region: Option<String>,
    pub(crate) joint: Option<String>,
    pub(crate) value: Option<f64>,
}

pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<FindingRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |position| position.line());
        let row: FindingRow = record.deserialize(Some(&headers))?;

        records.push(FindingRecord {
            line,
            kind: finding_kind(&row.finding),
            finding: row.finding,
            region: row.region,
            joint: row.joint,
            value: row.value,
        });
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct FindingRow {
    #[serde(rename = "Finding")]
    finding: String,
    #[serde(rename = "Region", default, deserialize_with = "empty_string_as_none")]
    region: Option<String>,
    #[serde(rename = "Joint", default, deserialize_with = "empty_string_as_none")]
    joint: Option<String>,
    #[serde(rename = "Value", default)]
    value: Option<f64>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn finding_kind(value: &str) -> Option<FindingKind> {
    match normalize_label(value).as_str() {
        "tender" | "tender joint" => Some(FindingKind::Tender),
        "swollen" | "swollen joint" => Some(FindingKind::Swollen),
        other => other.parse::<ClinicalField>().ok().map(FindingKind::Clinical),
    }
}

#[cfg(test)]
pub(crate) fn finding_kind_for_tests(value: &str) -> Option<FindingKind> {
    finding_kind(value)
}
