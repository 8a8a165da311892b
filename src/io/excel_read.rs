use calamine::{DataType, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, warn};

use crate::config::BlankRowPolicy;
use crate::error::{Result, ToolError};
use crate::io::walk::SourceFile;
use crate::model::{CellValue, StudentRecord, SubjectData, Topic, iso_date};

/// Label expected in A1.
pub const DATE_LABEL: &str = "Date";
/// Label expected in C1.
pub const TOTAL_MARKS_LABEL: &str = "Total Marks";
/// Label expected in A2.
pub const NAME_LABEL: &str = "Name";
/// Label expected in B2.
pub const MARKS_LABEL: &str = "Marks";
/// Textual marks recorded for students who did not sit the assessment.
pub const ABSENCE_MARKERS: [&str; 2] = ["AB", "ABS"];

const HEADER_WIDTH: u32 = 4;
const FIRST_DATA_ROW: u32 = 2;

/// Metadata carried by the first header row.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicHeader {
    /// Raw B1 value.
    pub date: CellValue,
    /// Raw D1 value.
    pub total_marks: CellValue,
}

/// Reads every worksheet of the workbook behind `source` into a subject.
///
/// Sheets with an invalid header are logged and left out; any other failure
/// aborts the whole workbook.
pub fn read_subject(source: &SourceFile, blank_rows: BlankRowPolicy) -> Result<SubjectData> {
    let mut workbook: Xlsx<_> = open_workbook(&source.path)?;
    let mut subject = SubjectData::new(&source.subject_name, &source.class_name);

    let sheet_names = workbook.sheet_names().to_vec();
    for sheet_name in &sheet_names {
        let range = read_sheet(&mut workbook, sheet_name)?;
        if let Some(topic) = parse_sheet_with(&range, sheet_name, blank_rows) {
            subject.topics.push(topic);
        }
    }

    debug!(
        subject = %subject.subject_name,
        topic_count = subject.topics.len(),
        "workbook read"
    );
    Ok(subject)
}

fn read_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::MissingSheet(name.to_string()))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

/// Turns one worksheet into a topic, skipping blank-name rows.
///
/// Returns `None` and logs a warning when the header is invalid.
pub fn parse_sheet(range: &Range<DataType>, sheet_name: &str) -> Option<Topic> {
    parse_sheet_with(range, sheet_name, BlankRowPolicy::Skip)
}

/// Like [`parse_sheet`], with an explicit policy for rows without a name.
pub fn parse_sheet_with(
    range: &Range<DataType>,
    sheet_name: &str,
    blank_rows: BlankRowPolicy,
) -> Option<Topic> {
    let header = match parse_header(range) {
        Ok(header) => header,
        Err(error) => {
            warn!(sheet = %sheet_name, "Skipping sheet '{sheet_name}': {error}");
            return None;
        }
    };

    Some(Topic {
        topic_name: sheet_name.to_string(),
        date: format_date(&header.date),
        total_marks: header.total_marks.to_json(),
        students: read_students(range, blank_rows),
    })
}

/// Validates the two header rows and returns the metadata from B1 and D1.
pub fn parse_header(range: &Range<DataType>) -> Result<TopicHeader> {
    let width = range.end().map_or(0, |(_, last_col)| last_col + 1);
    if width < HEADER_WIDTH {
        return Err(ToolError::HeaderTooNarrow);
    }

    expect_label(range, "A1", (0, 0), DATE_LABEL)?;
    expect_label(range, "C1", (0, 2), TOTAL_MARKS_LABEL)?;
    expect_label(range, "A2", (1, 0), NAME_LABEL)?;
    expect_label(range, "B2", (1, 1), MARKS_LABEL)?;

    Ok(TopicHeader {
        date: cell(range, 0, 1),
        total_marks: cell(range, 0, 3),
    })
}

fn expect_label(
    range: &Range<DataType>,
    cell_name: &'static str,
    (row, col): (u32, u32),
    expected: &'static str,
) -> Result<()> {
    match cell(range, row, col) {
        CellValue::Text(value) if value == expected => Ok(()),
        found => Err(ToolError::HeaderCell {
            cell: cell_name,
            expected,
            found: found.to_string(),
        }),
    }
}

fn read_students(range: &Range<DataType>, blank_rows: BlankRowPolicy) -> Vec<StudentRecord> {
    let last_row = match range.end() {
        Some((last_row, _)) => last_row,
        None => return Vec::new(),
    };

    let mut students = Vec::new();
    for row in FIRST_DATA_ROW..=last_row {
        let name = cell(range, row, 0);
        if name.is_blank() {
            match blank_rows {
                BlankRowPolicy::Skip => continue,
                BlankRowPolicy::Stop => break,
            }
        }

        students.push(StudentRecord {
            name: name.to_string(),
            marks: normalize_marks(&cell(range, row, 1)),
            comments: cell(range, row, 2).to_optional_string(),
        });
    }
    students
}

/// Reads a mark, mapping absence markers and unreadable values to `None`.
pub fn normalize_marks(raw: &CellValue) -> Option<f64> {
    match raw {
        CellValue::Text(text) if is_absence_marker(text) => None,
        CellValue::Number(value) => Some(*value).filter(|value| value.is_finite()),
        CellValue::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite()),
        CellValue::Empty | CellValue::Bool(_) | CellValue::Date(_) => None,
    }
}

fn is_absence_marker(text: &str) -> bool {
    let text = text.trim();
    ABSENCE_MARKERS
        .iter()
        .any(|marker| marker.eq_ignore_ascii_case(text))
}

/// Renders the header date as `YYYY-MM-DD`, or as raw text when it is not a date.
pub fn format_date(value: &CellValue) -> String {
    match value {
        CellValue::Date(date) => iso_date(date),
        other => other.to_string(),
    }
}

fn cell(range: &Range<DataType>, row: u32, col: u32) -> CellValue {
    CellValue::from(range.get_value((row, col)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> DataType {
        DataType::String(value.to_string())
    }

    fn sheet(rows: Vec<Vec<DataType>>) -> Range<DataType> {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (row_idx, row) in rows.into_iter().enumerate() {
            for (col_idx, value) in row.into_iter().enumerate() {
                range.set_value((row_idx as u32, col_idx as u32), value);
            }
        }
        range
    }

    fn header_rows() -> Vec<Vec<DataType>> {
        vec![
            vec![
                text("Date"),
                DataType::DateTime(45301.0),
                text("Total Marks"),
                DataType::Float(100.0),
            ],
            vec![text("Name"), text("Marks"), text("Comments"), DataType::Empty],
        ]
    }

    #[test]
    fn valid_header_yields_b1_and_d1() {
        let mut rows = header_rows();
        rows[0][1] = text("Week 3");
        rows[0][3] = DataType::Float(25.0);
        let header = parse_header(&sheet(rows)).expect("header accepted");
        assert_eq!(header.date, CellValue::Text("Week 3".into()));
        assert_eq!(header.total_marks, CellValue::Number(25.0));
    }

    #[test]
    fn header_mismatch_names_cell_and_value() {
        let cases: Vec<(usize, usize, DataType, &str)> = vec![
            (0, 0, text("Day"), "Cell A1 should be 'Date', found 'Day'"),
            (0, 2, DataType::Empty, "Cell C1 should be 'Total Marks', found 'None'"),
            (1, 0, text("Student"), "Cell A2 should be 'Name', found 'Student'"),
            (1, 1, DataType::Float(5.0), "Cell B2 should be 'Marks', found '5'"),
        ];

        for (row, col, value, message) in cases {
            let mut rows = header_rows();
            rows[row][col] = value;
            let error = parse_header(&sheet(rows)).expect_err("header rejected");
            assert_eq!(error.to_string(), message);
            assert!(error.is_sheet_level());
        }
    }

    #[test]
    fn narrow_or_empty_sheet_is_rejected() {
        let narrow = sheet(vec![
            vec![text("Date"), text("2024-01-10"), text("Total Marks")],
            vec![text("Name"), text("Marks"), DataType::Empty],
        ]);
        assert!(matches!(parse_header(&narrow), Err(ToolError::HeaderTooNarrow)));

        let empty: Range<DataType> = Range::empty();
        assert!(matches!(parse_header(&empty), Err(ToolError::HeaderTooNarrow)));
        assert_eq!(parse_sheet(&empty, "Blank"), None);
    }

    #[test]
    fn absence_markers_clear_marks() {
        for marker in ["AB", "ABS", "ab", "abs", "Abs", " AB "] {
            assert_eq!(normalize_marks(&CellValue::Text(marker.into())), None, "{marker}");
        }
    }

    #[test]
    fn numbers_and_numeric_text_become_floats() {
        assert_eq!(normalize_marks(&CellValue::Number(85.0)), Some(85.0));
        assert_eq!(normalize_marks(&CellValue::Number(85.5)), Some(85.5));
        assert_eq!(normalize_marks(&CellValue::Text("90".into())), Some(90.0));
        assert_eq!(normalize_marks(&CellValue::Text(" 72.5 ".into())), Some(72.5));
    }

    #[test]
    fn unreadable_marks_become_none() {
        assert_eq!(normalize_marks(&CellValue::Text("N/A".into())), None);
        assert_eq!(normalize_marks(&CellValue::Text(String::new())), None);
        assert_eq!(normalize_marks(&CellValue::Text("NaN".into())), None);
        assert_eq!(normalize_marks(&CellValue::Empty), None);
        assert_eq!(normalize_marks(&CellValue::Bool(true)), None);
    }

    #[test]
    fn normalization_is_idempotent() {
        for raw in [
            CellValue::Text("AB".into()),
            CellValue::Text("90".into()),
            CellValue::Number(85.5),
            CellValue::Text("N/A".into()),
        ] {
            let once = normalize_marks(&raw);
            let again = normalize_marks(&once.map(CellValue::Number).unwrap_or(CellValue::Empty));
            assert_eq!(once, again);
        }
    }

    #[test]
    fn dates_render_as_iso_or_raw_text() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        assert_eq!(format_date(&CellValue::Date(date)), "2024-01-10");
        assert_eq!(format_date(&CellValue::Text("10/01/2024".into())), "10/01/2024");
        assert_eq!(format_date(&CellValue::Number(3.0)), "3");
    }

    #[test]
    fn sheet_rows_become_students() {
        let mut rows = header_rows();
        rows.push(vec![text("Alice"), DataType::Float(88.0), text("good"), DataType::Empty]);
        rows.push(vec![text("Bob"), text("ABS"), DataType::Empty, DataType::Empty]);
        rows.push(vec![text("Cara"), text("91"), DataType::Empty, DataType::Empty]);

        let topic = parse_sheet(&sheet(rows), "Algebra").expect("topic parsed");

        assert_eq!(topic.topic_name, "Algebra");
        assert_eq!(topic.date, "2024-01-10");
        assert_eq!(topic.total_marks, serde_json::json!(100));
        assert_eq!(
            topic.students,
            vec![
                StudentRecord {
                    name: "Alice".into(),
                    marks: Some(88.0),
                    comments: Some("good".into()),
                },
                StudentRecord {
                    name: "Bob".into(),
                    marks: None,
                    comments: None,
                },
                StudentRecord {
                    name: "Cara".into(),
                    marks: Some(91.0),
                    comments: None,
                },
            ]
        );
    }

    fn rows_with_gap() -> Range<DataType> {
        let mut rows = header_rows();
        rows.push(vec![text("Alice"), DataType::Float(70.0), DataType::Empty, DataType::Empty]);
        rows.push(vec![DataType::Empty, DataType::Float(12.0), text("stray"), DataType::Empty]);
        rows.push(vec![text(""), DataType::Empty, DataType::Empty, DataType::Empty]);
        rows.push(vec![text("Bob"), DataType::Float(64.0), DataType::Empty, DataType::Empty]);
        sheet(rows)
    }

    #[test]
    fn blank_name_rows_are_skipped_not_terminal() {
        let topic = parse_sheet(&rows_with_gap(), "Gaps").expect("topic parsed");
        let names: Vec<&str> = topic.students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn stop_policy_ends_scan_at_first_blank_name() {
        let topic =
            parse_sheet_with(&rows_with_gap(), "Gaps", BlankRowPolicy::Stop).expect("topic parsed");
        let names: Vec<&str> = topic.students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alice"]);
    }

    #[test]
    fn header_only_sheet_has_no_students() {
        let topic = parse_sheet(&sheet(header_rows()), "Empty").expect("topic parsed");
        assert!(topic.students.is_empty());
    }
}
