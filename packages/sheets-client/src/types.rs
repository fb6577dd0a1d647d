use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// `spreadsheets.values` resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Absent in responses when the range holds no data.
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    /// Cells as display strings; numbers and booleans are stringified.
    pub fn into_string_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Subset of the `spreadsheets` resource used to resolve worksheet ids.
#[derive(Debug, Deserialize)]
pub(crate) struct SpreadsheetMeta {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

/// `insertDimension` + `updateCells` writing `cells` into the new row.
///
/// Sent as one `batchUpdate`, so the row never exists empty.
pub fn insert_row_requests(sheet_id: i64, row_index: usize, cells: &[String]) -> Vec<Value> {
    let values: Vec<Value> = cells
        .iter()
        .map(|c| json!({ "userEnteredValue": { "stringValue": c } }))
        .collect();

    vec![
        json!({
            "insertDimension": {
                "range": {
                    "sheetId": sheet_id,
                    "dimension": "ROWS",
                    "startIndex": row_index,
                    "endIndex": row_index + 1
                },
                "inheritFromBefore": false
            }
        }),
        json!({
            "updateCells": {
                "start": { "sheetId": sheet_id, "rowIndex": row_index, "columnIndex": 0 },
                "rows": [ { "values": values } ],
                "fields": "userEnteredValue"
            }
        }),
    ]
}

/// `deleteDimension` over rows `[start_index, end_index)` (0-based).
pub fn delete_rows_request(sheet_id: i64, start_index: usize, end_index: usize) -> Value {
    json!({
        "deleteDimension": {
            "range": {
                "sheetId": sheet_id,
                "dimension": "ROWS",
                "startIndex": start_index,
                "endIndex": end_index
            }
        }
    })
}
