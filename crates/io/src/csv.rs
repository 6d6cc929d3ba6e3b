// CSV collection format: row 1 display names (human reading only), row 2
// field keys, rows 3+ data.

use std::io::Read;
use std::path::Path;

use paperstack_config::SchemaConfig;
use paperstack_record::{FieldValue, Record};

use crate::error::StoreError;

pub fn read_csv(path: &Path, schema: &SchemaConfig) -> Result<Vec<Record>, StoreError> {
    let content = read_file_as_utf8(path)?;
    parse_csv(&content, schema).map_err(|msg| StoreError::Parse {
        path: path.display().to_string(),
        msg,
    })
}

pub fn write_csv(path: &Path, records: &[Record], schema: &SchemaConfig) -> Result<(), StoreError> {
    let content = render_csv(records, schema)?;
    std::fs::write(path, content).map_err(|e| StoreError::Io(e.to_string()))
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252 exports
/// from spreadsheet tools).
fn read_file_as_utf8(path: &Path) -> Result<String, StoreError> {
    let mut file = std::fs::File::open(path).map_err(|e| StoreError::Io(e.to_string()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| StoreError::Io(e.to_string()))?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(strip_bom(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(strip_bom(decoded.into_owned()))
        }
    }
}

fn strip_bom(s: String) -> String {
    s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)
}

fn parse_csv(content: &str, schema: &SchemaConfig) -> Result<Vec<Record>, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for row in reader.records() {
        rows.push(row.map_err(|e| e.to_string())?);
    }

    if rows.len() < 2 {
        return Err("missing header rows (display names + field keys)".into());
    }

    let keys: Vec<String> = rows[1].iter().map(|k| k.trim().to_string()).collect();

    let mut records = Vec::new();
    for row in &rows[2..] {
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let mut record = Record::new();
        for (i, key) in keys.iter().enumerate() {
            if key.is_empty() {
                continue;
            }
            // Short rows are padded with empties; unknown columns ignored.
            let raw = row.get(i).unwrap_or("").trim();
            if raw.is_empty() {
                continue;
            }
            let field = match schema.field(key) {
                Some(field) => field,
                None => continue,
            };
            record.set(key.clone(), FieldValue::coerce(raw, field.kind));
        }
        records.push(record);
    }

    Ok(records)
}

fn render_csv(records: &[Record], schema: &SchemaConfig) -> Result<String, StoreError> {
    let fields = schema.active_fields();

    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    let display_row: Vec<&str> = fields.iter().map(|f| f.label.as_str()).collect();
    writer.write_record(&display_row).map_err(|e| StoreError::Io(e.to_string()))?;

    let key_row: Vec<&str> = fields.iter().map(|f| f.key.as_str()).collect();
    writer.write_record(&key_row).map_err(|e| StoreError::Io(e.to_string()))?;

    for record in records {
        let row: Vec<String> = fields
            .iter()
            .map(|f| record.get(&f.key).map(FieldValue::text).unwrap_or_default())
            .collect();
        writer.write_record(&row).map_err(|e| StoreError::Io(e.to_string()))?;
    }

    let bytes = writer.into_inner().map_err(|e| StoreError::Io(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| StoreError::Io(e.to_string()))
}
