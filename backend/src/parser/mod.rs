//! CSV loader for raw retail transactions, with encoding and delimiter auto-detection.
//!
//! Produces [`RawTransaction`] rows. No derived metrics here; see
//! [`crate::transform::enrich`] for that.

pub mod product_list;

pub use product_list::parse_product_list;

use csv::{ReaderBuilder, Trim};
use std::path::Path;

use crate::error::{DataLoadError, LoadResult};
use crate::models::{RawTransaction, REQUIRED_COLUMNS};

/// Result of loading with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed transactions, in file order
    pub records: Vec<RawTransaction>,
    /// Detected encoding
    pub encoding: String,
    /// Detected delimiter
    pub delimiter: char,
    /// Column headers as found in the file
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 is always reported as `utf-8`; chardet only classifies the rest.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let decoded: String = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(e) => {
                return Err(DataLoadError::Encoding(format!("invalid UTF-8: {}", e)));
            }
        },
        // Each byte is the code point of the same value
        "iso-8859-1" | "latin-1" | "latin1" => bytes.iter().map(|&b| char::from(b)).collect(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            // Unknown charset: lossy UTF-8
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Falls back to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Load a transaction CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = load_transactions("retail_promo.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Transactions: {}", result.records.len());
/// ```
pub fn load_transactions<P: AsRef<Path>>(path: P) -> LoadResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_transactions_bytes(&bytes)
}

/// Parse transaction CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_transactions_bytes(bytes: &[u8]) -> LoadResult<ParseResult> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(DataLoadError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);

    parse_transactions_str(&content, delimiter, encoding)
}

/// Parse transaction CSV text with an explicit delimiter.
pub fn parse_transactions_str(
    content: &str,
    delimiter: char,
    encoding: String,
) -> LoadResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(DataLoadError::EmptyFile);
    }

    let delimiter_byte = u8::try_from(delimiter).map_err(|_| DataLoadError::Malformed {
        line: 1,
        message: format!("unsupported delimiter {:?}", delimiter),
    })?;

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let header_record = reader
        .headers()
        .map_err(|e| DataLoadError::Malformed { line: 1, message: e.to_string() })?
        .clone();
    let headers: Vec<String> = header_record.iter().map(|h| h.to_string()).collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        // header is line 1
        let fallback_line = idx as u64 + 2;
        let row = row.map_err(|e| DataLoadError::Malformed {
            line: e.position().map(|p| p.line()).unwrap_or(fallback_line),
            message: e.to_string(),
        })?;
        let line = row.position().map(|p| p.line()).unwrap_or(fallback_line);

        let record: RawTransaction = row
            .deserialize(Some(&header_record))
            .map_err(|e| DataLoadError::Malformed { line, message: e.to_string() })?;

        if record.total_cost < 0.0 || !record.total_cost.is_finite() {
            return Err(DataLoadError::Malformed {
                line,
                message: format!("total_cost must be a non-negative number, got {}", record.total_cost),
            });
        }

        records.push(record);
    }

    if records.is_empty() {
        return Err(DataLoadError::NoRecords);
    }

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str =
        "date,total_cost,total_items,product,promotion,customer_category,store_type,payment_method";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_simple_load() {
        let csv = csv_with(&[
            r#"2024-01-05,10,2,"['Milk', 'Soap']",BOGO,Student,Convenience Store,Cash"#,
            r#"2024-01-06,5,1,['Milk'],,Retiree,Supermarket,Debit Card"#,
        ]);
        let result = parse_transactions_bytes(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ',');
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].product, "['Milk', 'Soap']");
        assert_eq!(result.records[0].promotion.as_deref(), Some("BOGO"));
        assert_eq!(result.records[0].total_items, 2);
        assert_eq!(result.records[1].promotion, None);
        assert_eq!(result.records[1].store_type, "Supermarket");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "transaction_id,date,total_cost,total_items,product,promotion,customer_category,store_type,payment_method,city\n\
                   1,2024-03-01,4.5,3,['Bread'],None,Student,Pharmacy,Cash,Boston";
        let result = parse_transactions_bytes(csv.as_bytes()).unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].total_cost, 4.5);
        assert_eq!(result.headers.len(), 10);
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = "date;total_cost;total_items;product;promotion;customer_category;store_type;payment_method\n\
                   2024-01-05;10;2;['Milk', 'Soap'];BOGO;Student;Pharmacy;Cash";
        let result = parse_transactions_bytes(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.records[0].product, "['Milk', 'Soap']");
    }

    #[test]
    fn test_missing_columns_error() {
        let csv = "date,total_cost,product\n2024-01-05,10,['Milk']";
        let err = parse_transactions_bytes(csv.as_bytes()).unwrap_err();

        match err {
            DataLoadError::MissingColumns(cols) => {
                assert!(cols.contains(&"total_items".to_string()));
                assert!(cols.contains(&"payment_method".to_string()));
                assert!(!cols.contains(&"date".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_number_error() {
        let csv = csv_with(&[
            "2024-01-05,10,2,['Milk'],BOGO,Student,Pharmacy,Cash",
            "2024-01-06,ten,1,['Milk'],,Student,Pharmacy,Cash",
        ]);
        let err = parse_transactions_bytes(csv.as_bytes()).unwrap_err();

        match err {
            DataLoadError::Malformed { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_negative_cost_rejected() {
        let csv = csv_with(&["2024-01-05,-1,2,['Milk'],BOGO,Student,Pharmacy,Cash"]);
        let err = parse_transactions_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_empty_source_errors() {
        assert!(matches!(
            parse_transactions_bytes(b"").unwrap_err(),
            DataLoadError::EmptyFile
        ));
        assert!(matches!(
            parse_transactions_bytes(HEADER.as_bytes()).unwrap_err(),
            DataLoadError::NoRecords
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_transactions("/definitely/not/here/retail_promo.csv").unwrap_err();
        assert!(matches!(err, DataLoadError::Io(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            csv_with(&["2023-07-14 10:00:00,3,4,\"['Soap', 'Iron']\",Discount on Selected Items,Professional,Warehouse Club,Credit Card"])
        )
        .unwrap();

        let result = load_transactions(file.path()).unwrap();
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.records[0].promotion.as_deref(), Some("Discount on Selected Items"));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_latin1_decoding() {
        // "Épicerie" in ISO-8859-1
        let bytes: &[u8] = &[0xC9, 0x70, 0x69, 0x63, 0x65, 0x72, 0x69, 0x65];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Épicerie");

        // bytes where ISO-8859-15 differs: "½ Gallon ¼ ¤"
        let bytes: &[u8] = &[0xBD, b' ', b'G', b'a', b'l', b'l', b'o', b'n', b' ', 0xBC, b' ', 0xA4];
        assert_eq!(decode_content(bytes, "iso-8859-1").unwrap(), "½ Gallon ¼ ¤");
    }

    #[test]
    fn test_valid_utf8_is_not_redetected() {
        let csv = csv_with(&["2024-01-05,10,2,\"['Crème brûlée', 'Pâté']\",BOGO,Étudiant,Épicerie fine,Carte"]);
        assert_eq!(detect_encoding(csv.as_bytes()), "utf-8");

        let result = parse_transactions_bytes(csv.as_bytes()).unwrap();
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.records[0].product, "['Crème brûlée', 'Pâté']");
        assert_eq!(result.records[0].customer_category, "Étudiant");
    }

    #[test]
    fn test_windows_1252_decoding() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode("Café – 5€");
        assert_eq!(decode_content(&bytes, "windows-1252").unwrap(), "Café – 5€");
    }

    #[test]
    fn test_negative_cost_line_after_multiline_field() {
        // first record spans lines 2-3
        let csv = csv_with(&[
            "2024-01-05,10,2,\"['Milk',\n'Soap']\",BOGO,Student,Pharmacy,Cash",
            "2024-01-06,-5,1,['Milk'],,Student,Pharmacy,Cash",
        ]);
        let err = parse_transactions_bytes(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataLoadError::Malformed { line: 4, .. }), "got {err:?}");
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(csv_with(&["2024-01-05,10,2,['Milk'],BOGO,Student,Pharmacy,Cash"]).as_bytes());
        let result = parse_transactions_bytes(&bytes).unwrap();
        assert_eq!(result.headers[0], "date");
    }
}
