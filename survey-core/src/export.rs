//! CSV export of recorded answers and aggregated scores.
//!
//! The answer export quotes the question and answer text but does not
//! escape quotes inside it; the files are read back by spreadsheet tools
//! that accept this.

use crate::database::Database;
use crate::error::Result;
use std::io::Write;
use std::path::Path;

pub const ANSWERS_HEADER: [&str; 5] = ["Timestamp", "Student", "Question", "Answer", "Score"];
pub const SCORES_HEADER: [&str; 3] = ["Student", "Score", "Timestamp"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One exported line: a respondent's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRow {
    pub respondent_timestamp: i64,
    pub respondent: String,
    pub question: String,
    pub answer: String,
    pub score: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub respondent: String,
    pub score: i64,
    pub evaluated_at: i64,
}

pub fn format_timestamp(timestamp: i64) -> String {
    match chrono::DateTime::from_timestamp(timestamp, 0) {
        Some(datetime) => datetime.format(TIMESTAMP_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}

fn quoted(text: &str) -> String {
    format!("\"{text}\"")
}

fn csv_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer)
}

pub fn write_answers_csv<W: Write>(rows: &[AnswerRow], writer: W) -> Result<()> {
    let mut csv = csv_writer(writer);
    csv.write_record(ANSWERS_HEADER)?;
    for row in rows {
        csv.write_record([
            format_timestamp(row.respondent_timestamp),
            row.respondent.clone(),
            quoted(&row.question),
            quoted(&row.answer),
            row.score.to_string(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_scores_csv<W: Write>(rows: &[ScoreRow], writer: W) -> Result<()> {
    let mut csv = csv_writer(writer);
    csv.write_record(SCORES_HEADER)?;
    for row in rows {
        csv.write_record([
            row.respondent.clone(),
            row.score.to_string(),
            format_timestamp(row.evaluated_at),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write to a temporary file next to `path` and move it into place once complete.
fn write_file_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut std::fs::File) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    write(file.as_file_mut())?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// CSV export
impl Database {
    /// Rows for every answer that still has a selected option, ordered by
    /// respondent timestamp and then by question ordering index.
    pub fn answer_rows(&self) -> Result<Vec<AnswerRow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT p.created_at, COALESCE(p.name, p.id), q.text, o.text, o.score
                FROM answers a
                JOIN respondents p ON p.id = a.respondent_id
                JOIN questions q ON q.id = a.question_id
                JOIN options o ON o.id = a.option_id
                ORDER BY p.created_at ASC, p.rowid ASC, q.order_index ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AnswerRow {
                respondent_timestamp: row.get(0)?,
                respondent: row.get(1)?,
                question: row.get(2)?,
                answer: row.get(3)?,
                score: row.get(4)?,
            })
        })?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }

        Ok(result)
    }

    /// Latest aggregated score per respondent.
    pub fn score_rows(&self) -> Result<Vec<ScoreRow>> {
        let latest = self.latest_results()?;
        let mut rows = Vec::with_capacity(latest.len());
        for result in latest {
            let respondent = self.get_respondent(&result.respondent_id)?;
            rows.push(ScoreRow {
                respondent: respondent.label().to_string(),
                score: result.average_score,
                evaluated_at: result.evaluated_at,
            });
        }
        Ok(rows)
    }

    /// Export all answers to `path`. Returns the number of data rows written.
    pub fn export_answers(&self, path: &Path) -> Result<usize> {
        let rows = self.answer_rows()?;
        write_file_atomically(path, |file| write_answers_csv(&rows, file))?;

        tracing::info!("Exported {} answer rows to {}", rows.len(), path.display());
        Ok(rows.len())
    }

    /// Export the latest score of each respondent to `path`. Returns the number of data rows written.
    pub fn export_scores(&self, path: &Path) -> Result<usize> {
        let rows = self.score_rows()?;
        if rows.is_empty() {
            tracing::warn!("No aggregated results to export; run score aggregation first");
        }
        write_file_atomically(path, |file| write_scores_csv(&rows, file))?;

        tracing::info!("Exported {} score rows to {}", rows.len(), path.display());
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(question: &str, answer: &str, score: i64) -> AnswerRow {
        AnswerRow {
            respondent_timestamp: 1_722_211_200,
            respondent: "Aoi".to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            score,
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp(1_722_211_200), "2024-07-29 00:00:00");
    }

    #[test]
    fn test_answers_csv_layout() {
        let rows = vec![
            row("Do you sleep well?", "Often", 20),
            row("Do you eat breakfast?", "Never", 0),
        ];
        let mut out = Vec::new();
        write_answers_csv(&rows, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Timestamp,Student,Question,Answer,Score");
        assert_eq!(
            lines[1],
            "2024-07-29 00:00:00,Aoi,\"Do you sleep well?\",\"Often\",20"
        );
        assert_eq!(
            lines[2],
            "2024-07-29 00:00:00,Aoi,\"Do you eat breakfast?\",\"Never\",0"
        );
    }

    #[test]
    fn test_embedded_quotes_are_not_escaped() {
        let rows = vec![row("Say \"hi\"?", "Yes, \"hi\"", 1)];
        let mut out = Vec::new();
        write_answers_csv(&rows, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(",\"Say \"hi\"?\",\"Yes, \"hi\"\",1"));
    }

    #[test]
    fn test_scores_csv_layout() {
        let rows = vec![ScoreRow {
            respondent: "Aoi".to_string(),
            score: 15,
            evaluated_at: 0,
        }];
        let mut out = Vec::new();
        write_scores_csv(&rows, &mut out).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Student,Score,Timestamp\nAoi,15,1970-01-01 00:00:00\n"
        );
    }

    #[test]
    fn test_write_file_atomically_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        write_file_atomically(&path, |file| {
            write_scores_csv(&[], file)?;
            Ok(())
        })
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Student,Score,Timestamp\n"
        );
    }
}
